use glam::Mat4;
use smallvec::SmallVec;

use crate::assets::import::ImportedNode;

/// Index of a node inside its [`Skeleton`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const ROOT: Self = Self(0);

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One joint of the bind-pose hierarchy.
#[derive(Debug, Clone)]
pub struct SkeletonNode {
    pub name: String,
    pub bind_transform: Mat4,
    pub children: SmallVec<[NodeIndex; 4]>,
}

/// Immutable bind-pose tree, stored as a pre-order arena.
///
/// `nodes[0]` is the root and every parent precedes its children. Children keep
/// their import order.
#[derive(Debug, Clone)]
pub struct Skeleton {
    nodes: Vec<SkeletonNode>,
}

impl Skeleton {
    /// Copies names, bind transforms and child order from the imported graph.
    #[must_use]
    pub fn build(root: &ImportedNode) -> Self {
        let mut nodes = Vec::with_capacity(root.count());
        Self::push_subtree(&mut nodes, root);
        Self { nodes }
    }

    fn push_subtree(nodes: &mut Vec<SkeletonNode>, src: &ImportedNode) -> NodeIndex {
        let index = NodeIndex(nodes.len() as u32);
        nodes.push(SkeletonNode {
            name: src.name.clone(),
            bind_transform: src.transform,
            children: SmallVec::new(),
        });

        for child in &src.children {
            let child_index = Self::push_subtree(nodes, child);
            nodes[index.index()].children.push(child_index);
        }

        index
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeIndex {
        NodeIndex::ROOT
    }

    #[inline]
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &SkeletonNode {
        &self.nodes[index.index()]
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: NodeIndex) -> Option<&SkeletonNode> {
        self.nodes.get(index.index())
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[SkeletonNode] {
        &self.nodes
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a skeleton has at least its root.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node (in pre-order) with the given name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeIndex(i as u32))
    }

    /// Depth-first walk yielding `(node, parent)` in child order.
    pub fn depth_first(&self) -> impl Iterator<Item = (NodeIndex, Option<NodeIndex>)> + '_ {
        let mut stack: Vec<(NodeIndex, Option<NodeIndex>)> = vec![(self.root(), None)];
        std::iter::from_fn(move || {
            let (index, parent) = stack.pop()?;
            let node = self.node(index);
            stack.extend(node.children.iter().rev().map(|&c| (c, Some(index))));
            Some((index, parent))
        })
    }

    /// Global bind transform of every node, indexed like [`nodes`](Self::nodes).
    #[must_use]
    pub fn bind_globals(&self) -> Vec<Mat4> {
        let mut globals = vec![Mat4::IDENTITY; self.nodes.len()];
        for (index, parent) in self.depth_first() {
            let parent_global = parent.map_or(Mat4::IDENTITY, |p| globals[p.index()]);
            globals[index.index()] = parent_global * self.node(index).bind_transform;
        }
        globals
    }
}
