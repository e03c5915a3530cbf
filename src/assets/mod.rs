//! Asset Import
//!
//! - [`import`]: the plain-data contract between scene importers and the
//!   animation subsystem
//! - [`loaders`]: concrete importers (glTF 2.0 behind the `gltf` feature)

pub mod import;
pub mod loaders;

pub use import::{ImportedAnimation, ImportedChannel, ImportedModel, ImportedNode};
#[cfg(feature = "gltf")]
pub use loaders::{GltfImport, GltfLoader};
