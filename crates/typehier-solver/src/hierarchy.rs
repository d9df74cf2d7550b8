//! Session-level entry point: one cached graph plus its provider.
//!
//! Create one [`CachedTypeHierarchy`] per analysis session and hand it (or a
//! `&dyn TypeHierarchy`) to every analysis that needs type relations. There
//! is no process-wide instance.
//!
//! The graph sits behind a single mutex. A query, including any subtree load
//! it triggers, holds the lock from start to finish, so loads of overlapping
//! subtrees never interleave.

use crate::config::HierarchyConfig;
use crate::error::QueryError;
use crate::graph::{LoadStatus, TypeGraph};
use crate::provider::TypeProvider;
use crate::query_trace;
use crate::subtype::SubtypeQueryEngine;
use crate::types::GraphStats;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Type relation queries consumed by analyses.
pub trait TypeHierarchy {
    /// Is `sub` usable where `sup` is expected?
    fn is_subtype_compatible(&self, sub: &str, sup: &str) -> Result<bool, QueryError>;

    /// Could one concrete type satisfy both `t1` and `t2`?
    fn exists_common_subtype(&self, t1: &str, t2: &str) -> Result<bool, QueryError> {
        self.exists_common_subtype_with(t1, t2, false, false)
    }

    /// Like [`exists_common_subtype`](Self::exists_common_subtype), skipping
    /// the `t1 <: t2` and/or `t2 <: t1` shortcut tests.
    fn exists_common_subtype_with(
        &self,
        t1: &str,
        t2: &str,
        skip_forward: bool,
        skip_backward: bool,
    ) -> Result<bool, QueryError>;
}

/// A lazily populated type hierarchy for one session.
#[derive(Debug)]
pub struct CachedTypeHierarchy<P> {
    graph: Mutex<TypeGraph>,
    provider: P,
    config: HierarchyConfig,
}

impl<P: TypeProvider> CachedTypeHierarchy<P> {
    /// Create a session with default configuration.
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, HierarchyConfig::default())
    }

    /// Create a session. With `preload_root` set, the root type's subtree
    /// is fetched immediately (failures are logged, not returned).
    pub fn with_config(provider: P, config: HierarchyConfig) -> Self {
        let mut graph = TypeGraph::with_load_profile(config.load_profile());
        if config.preload_root {
            let status = graph.ensure_subtree_loaded(&config.root_type, &provider);
            debug!(root = %config.root_type, ?status, "preloaded root hierarchy");
        }
        Self {
            graph: Mutex::new(graph),
            provider,
            config,
        }
    }

    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn stats(&self) -> GraphStats {
        self.lock().stats()
    }

    /// Whether `name` has a node (it was referenced or loaded).
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    pub fn is_complete_down(&self, name: &str) -> bool {
        self.lock().is_complete_down(name)
    }

    /// Load `name`'s subtree now instead of on first use.
    pub fn preload(&self, name: &str) -> LoadStatus {
        self.lock().ensure_subtree_loaded(name, &self.provider)
    }

    /// Sorted names of `name` and all its known subtypes.
    pub fn known_subtypes(&self, name: &str) -> Vec<String> {
        self.lock()
            .subtype_closure_names(name)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Run `f` against a read-only view of the graph.
    pub fn with_graph<T>(&self, f: impl FnOnce(&TypeGraph) -> T) -> T {
        f(&self.lock())
    }

    /// A panic mid-query cannot leave half an edge behind, and completeness
    /// is only set after a finished walk, so a poisoned graph is still usable.
    fn lock(&self) -> MutexGuard<'_, TypeGraph> {
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_query(
        &self,
        op: &'static str,
        left: &str,
        right: &str,
        query: impl FnOnce(&mut SubtypeQueryEngine<'_, P>) -> Result<bool, QueryError>,
    ) -> Result<bool, QueryError> {
        let trace_enabled = query_trace::enabled();
        let query_id = if trace_enabled {
            let id = query_trace::next_query_id();
            query_trace::relation_start(id, op, left, right);
            id
        } else {
            0
        };

        let mut graph = self.lock();
        let mut engine = SubtypeQueryEngine::new(&mut graph, &self.provider, &self.config);
        let result = query(&mut engine);
        drop(engine);

        if trace_enabled {
            query_trace::relation_end(query_id, op, result.as_ref().ok().copied(), graph.len());
        }
        result
    }
}

impl<P: TypeProvider> TypeHierarchy for CachedTypeHierarchy<P> {
    fn is_subtype_compatible(&self, sub: &str, sup: &str) -> Result<bool, QueryError> {
        self.run_query("is_subtype_compatible", sub, sup, |engine| {
            engine.is_subtype_compatible(sub, sup)
        })
    }

    fn exists_common_subtype_with(
        &self,
        t1: &str,
        t2: &str,
        skip_forward: bool,
        skip_backward: bool,
    ) -> Result<bool, QueryError> {
        self.run_query("exists_common_subtype", t1, t2, |engine| {
            engine.exists_common_subtype_with(t1, t2, skip_forward, skip_backward)
        })
    }
}

#[cfg(test)]
#[path = "../tests/hierarchy_tests.rs"]
mod tests;
