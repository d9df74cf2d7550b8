//! Graph node types for the cached type hierarchy.
//!
//! Nodes live in an arena owned by [`TypeGraph`](crate::TypeGraph) and refer
//! to each other through [`NodeId`] handles, never through owning pointers.
//! Super/subtype back-references therefore cannot form ownership cycles.

use smallvec::SmallVec;

/// Arena handle for a [`TypeNode`].
///
/// Handles are only meaningful for the graph that issued them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Direct neighbours of a node. Most types declare only a handful.
pub type NodeEdges = SmallVec<[NodeId; 4]>;

/// One qualified type name in the hierarchy.
#[derive(Clone, Debug)]
pub struct TypeNode {
    name: String,
    supertypes: NodeEdges,
    subtypes: NodeEdges,
    complete_down: bool,
}

impl TypeNode {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertypes: NodeEdges::new(),
            subtypes: NodeEdges::new(),
            complete_down: false,
        }
    }

    /// Qualified name of the type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directly declared supertypes.
    pub fn supertypes(&self) -> &[NodeId] {
        &self.supertypes
    }

    /// Directly declared subtypes.
    pub fn subtypes(&self) -> &[NodeId] {
        &self.subtypes
    }

    /// Whether the whole transitive subtype subtree has been loaded.
    pub fn is_complete_down(&self) -> bool {
        self.complete_down
    }

    /// Monotonic: there is no way back to incomplete.
    pub(crate) fn mark_complete_down(&mut self) {
        self.complete_down = true;
    }

    /// Returns `false` if the edge was already present.
    pub(crate) fn add_supertype(&mut self, id: NodeId) -> bool {
        if self.supertypes.contains(&id) {
            return false;
        }
        self.supertypes.push(id);
        true
    }

    /// Returns `false` if the edge was already present.
    pub(crate) fn add_subtype(&mut self, id: NodeId) -> bool {
        if self.subtypes.contains(&id) {
            return false;
        }
        self.subtypes.push(id);
        true
    }
}

/// Snapshot of graph size and provider traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub nodes: usize,
    pub complete_nodes: usize,
    /// Number of subtype edges (each edge is also recorded as a supertype edge).
    pub edges: usize,
    pub provider_lookups: u64,
    pub failed_lookups: u64,
}
