//! Lazily populated type hierarchy graph.
//!
//! `TypeGraph` is the cache behind every query. It owns one [`TypeNode`] per
//! qualified name, seeds the primitive lattice on construction, and pulls
//! subtype trees from a [`TypeProvider`] only when a query needs them.
//!
//! A node is *complete-down* once its whole transitive subtype subtree is in
//! the graph. Completeness is monotonic, so each subtree is fetched from the
//! provider at most once per session. Failed lookups leave the node
//! incomplete and are retried by the next query that needs them.

use crate::primitives::{PRIMITIVE_TYPES, WIDENING_EDGES};
use crate::provider::{SubtypeHierarchy, TypeProvider};
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::{GraphStats, NodeId, TypeNode};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace, warn};

/// Remaining stack below which the subtree walk switches to a new segment.
const STACK_RED_ZONE: usize = 32 * 1024;
/// Size of each additional stack segment for deep hierarchies.
const STACK_GROWTH: usize = 2 * 1024 * 1024;

/// What [`TypeGraph::ensure_subtree_loaded`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The node was already complete; the provider was not consulted.
    AlreadyComplete,
    /// The subtree was fetched and fully linked.
    Loaded { nodes_added: usize },
    /// The provider does not know the name.
    Unresolved,
    /// The provider reported an error.
    Failed,
    /// The walk hit a recursion limit; part of the subtree stays incomplete.
    Truncated,
}

impl LoadStatus {
    /// True if the node is complete-down afterwards.
    pub fn is_complete(self) -> bool {
        matches!(self, Self::AlreadyComplete | Self::Loaded { .. })
    }
}

/// Arena of type nodes keyed by qualified name.
#[derive(Debug, Clone)]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
    index: FxHashMap<String, NodeId>,
    load_profile: RecursionProfile,
    provider_lookups: u64,
    failed_lookups: u64,
}

impl Default for TypeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeGraph {
    /// Create a graph holding only the primitive lattice.
    pub fn new() -> Self {
        Self::with_load_profile(RecursionProfile::SubtreeLoad)
    }

    /// Create a graph whose subtree walks use `profile` limits.
    pub fn with_load_profile(profile: RecursionProfile) -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            index: FxHashMap::default(),
            load_profile: profile,
            provider_lookups: 0,
            failed_lookups: 0,
        };
        graph.install_primitives();
        graph
    }

    fn install_primitives(&mut self) {
        for name in PRIMITIVE_TYPES {
            self.get_or_create(name);
        }
        for (subtype, supertype) in WIDENING_EDGES {
            let sub = self.get_or_create(subtype);
            let sup = self.get_or_create(supertype);
            self.link(sup, sub);
        }
        for name in PRIMITIVE_TYPES {
            let id = self.get_or_create(name);
            self.nodes[id.index()].mark_complete_down();
        }
    }

    // -------------------------------------------------------------------------
    // Node access
    // -------------------------------------------------------------------------

    /// Return the node for `name`, creating an edge-less incomplete one if needed.
    pub fn get_or_create(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(TypeNode::new(name));
        self.index.insert(name.to_string(), id);
        trace!(type_name = name, node = id.0, "created type node");
        id
    }

    /// Look up an existing node without creating one.
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// # Panics
    ///
    /// If `id` was not issued by this graph.
    pub fn node(&self, id: NodeId) -> &TypeNode {
        &self.nodes[id.index()]
    }

    pub fn node_by_name(&self, name: &str) -> Option<&TypeNode> {
        self.lookup(name).map(|id| self.node(id))
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.node(id).name()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_complete_down(&self, name: &str) -> bool {
        self.node_by_name(name)
            .is_some_and(TypeNode::is_complete_down)
    }

    /// Record `subtype` as a direct subtype of `supertype`, on both nodes.
    pub fn link(&mut self, supertype: NodeId, subtype: NodeId) {
        let added_down = self.nodes[supertype.index()].add_subtype(subtype);
        let added_up = self.nodes[subtype.index()].add_supertype(supertype);
        debug_assert_eq!(added_down, added_up, "type graph edges out of sync");
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.nodes.len(),
            complete_nodes: self.nodes.iter().filter(|n| n.is_complete_down()).count(),
            edges: self.nodes.iter().map(|n| n.subtypes().len()).sum(),
            provider_lookups: self.provider_lookups,
            failed_lookups: self.failed_lookups,
        }
    }

    // -------------------------------------------------------------------------
    // Lazy loading
    // -------------------------------------------------------------------------

    /// Make sure the whole subtree below `name` is in the graph.
    ///
    /// Provider failures are logged and leave the node incomplete; they are
    /// never returned as errors.
    pub fn ensure_subtree_loaded<P>(&mut self, name: &str, provider: &P) -> LoadStatus
    where
        P: TypeProvider + ?Sized,
    {
        let id = self.get_or_create(name);
        if self.node(id).is_complete_down() {
            return LoadStatus::AlreadyComplete;
        }

        self.provider_lookups += 1;
        let hierarchy = match provider.lookup_subtype_hierarchy(name) {
            Ok(Some(hierarchy)) => hierarchy,
            Ok(None) => {
                self.failed_lookups += 1;
                warn!(
                    type_name = name,
                    "type provider could not resolve type; assuming no known subtypes"
                );
                return LoadStatus::Unresolved;
            }
            Err(err) => {
                self.failed_lookups += 1;
                warn!(type_name = name, error = %err, "type hierarchy lookup failed");
                return LoadStatus::Failed;
            }
        };

        let before = self.nodes.len();
        let mut guard = RecursionGuard::with_profile(self.load_profile);
        self.add_in_hierarchy(name, id, &hierarchy, &mut guard);
        let truncated = guard.is_exceeded();
        drop(guard);
        // The snapshot can be as large as the provider's whole project model.
        drop(hierarchy);

        if truncated {
            warn!(
                type_name = name,
                max_depth = self.load_profile.max_depth(),
                "subtype hierarchy exceeded load limits; subtree left incomplete"
            );
            return LoadStatus::Truncated;
        }

        let nodes_added = self.nodes.len() - before;
        debug!(type_name = name, nodes_added, "loaded subtype hierarchy");
        LoadStatus::Loaded { nodes_added }
    }

    /// Depth-first walk linking every subtype of `name` reported by `hierarchy`.
    ///
    /// Returns whether the node ended up complete-down.
    fn add_in_hierarchy(
        &mut self,
        name: &str,
        id: NodeId,
        hierarchy: &SubtypeHierarchy,
        guard: &mut RecursionGuard<NodeId>,
    ) -> bool {
        if self.node(id).is_complete_down() {
            return true;
        }
        match guard.enter(id) {
            RecursionResult::Entered => {}
            // An ancestor frame is already walking this node.
            RecursionResult::Cycle => return true,
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => return false,
        }

        let mut complete = true;
        for sub_name in hierarchy.direct_subtypes(name) {
            let sub_id = self.get_or_create(sub_name);
            self.link(id, sub_id);
            let sub_complete = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
                self.add_in_hierarchy(sub_name, sub_id, hierarchy, guard)
            });
            complete &= sub_complete;
        }
        guard.leave(id);

        if complete {
            self.nodes[id.index()].mark_complete_down();
        }
        complete
    }

    // -------------------------------------------------------------------------
    // Reachability
    // -------------------------------------------------------------------------

    /// True if `supertype` is `subtype` itself or reachable from it over
    /// supertype edges.
    pub fn is_ancestor(&self, subtype: NodeId, supertype: NodeId) -> bool {
        if subtype == supertype {
            return true;
        }
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut stack = vec![subtype];
        visited.insert(subtype);
        while let Some(current) = stack.pop() {
            for &parent in self.node(current).supertypes() {
                if parent == supertype {
                    return true;
                }
                if visited.insert(parent) {
                    stack.push(parent);
                }
            }
        }
        false
    }

    /// Every node reachable from `id` over subtype edges, `id` included.
    pub fn subtype_closure(&self, id: NodeId) -> FxHashSet<NodeId> {
        let mut closure: FxHashSet<NodeId> = FxHashSet::default();
        let mut stack = vec![id];
        closure.insert(id);
        while let Some(current) = stack.pop() {
            for &child in self.node(current).subtypes() {
                if closure.insert(child) {
                    stack.push(child);
                }
            }
        }
        closure
    }

    /// Names in [`subtype_closure`](Self::subtype_closure), sorted.
    pub fn subtype_closure_names(&self, name: &str) -> Vec<&str> {
        let Some(id) = self.lookup(name) else {
            return Vec::new();
        };
        let mut names: Vec<&str> = self
            .subtype_closure(id)
            .into_iter()
            .map(|id| self.name(id))
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
#[path = "../tests/graph_tests.rs"]
mod tests;
