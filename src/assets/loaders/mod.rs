#[cfg(feature = "gltf")]
mod gltf;

#[cfg(feature = "gltf")]
pub use self::gltf::{GltfImport, GltfLoader, SYNTHETIC_ROOT_NAME};
