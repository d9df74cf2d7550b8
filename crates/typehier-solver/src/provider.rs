//! The external type-information boundary.
//!
//! The graph never resolves names itself. It asks a [`TypeProvider`] for the
//! subtype hierarchy rooted at a name and incorporates the answer. Providers
//! are expected to be expensive (a project model, a class-path index), which
//! is why the graph caches everything it learns.

use crate::error::ProviderError;
use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxBuildHasher, FxHashMap};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

// =============================================================================
// SubtypeHierarchy - provider snapshot
// =============================================================================

/// Owned snapshot of the subtypes below one root, as returned by a provider.
///
/// Only direct subtype relations are stored; the graph recurses through them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtypeHierarchy {
    root: String,
    subtypes: FxHashMap<String, Vec<String>>,
}

impl SubtypeHierarchy {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            subtypes: FxHashMap::default(),
        }
    }

    /// Record `subtype` as a direct subtype of `supertype`.
    pub fn add_subtype(&mut self, supertype: impl Into<String>, subtype: impl Into<String>) {
        let subtype = subtype.into();
        let entry = self.subtypes.entry(supertype.into()).or_default();
        if !entry.contains(&subtype) {
            entry.push(subtype);
        }
    }

    /// Builder form of [`add_subtype`](Self::add_subtype).
    pub fn with_subtype(mut self, supertype: impl Into<String>, subtype: impl Into<String>) -> Self {
        self.add_subtype(supertype, subtype);
        self
    }

    /// The type this snapshot was requested for.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Direct subtypes of `name`, empty if the snapshot knows none.
    pub fn direct_subtypes(&self, name: &str) -> &[String] {
        self.subtypes.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of types with at least one recorded subtype.
    pub fn len(&self) -> usize {
        self.subtypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subtypes.is_empty()
    }
}

// =============================================================================
// TypeProvider
// =============================================================================

/// Source of subtype hierarchies.
///
/// - `Ok(Some(h))`: the name resolved; `h` describes everything below it.
/// - `Ok(None)`: the name is unknown to the provider.
/// - `Err(e)`: the provider itself failed.
///
/// The graph treats both non-success cases as "no information" and never
/// propagates them to query callers.
pub trait TypeProvider {
    fn lookup_subtype_hierarchy(
        &self,
        qualified_name: &str,
    ) -> Result<Option<SubtypeHierarchy>, ProviderError>;
}

impl<P: TypeProvider + ?Sized> TypeProvider for &P {
    fn lookup_subtype_hierarchy(
        &self,
        qualified_name: &str,
    ) -> Result<Option<SubtypeHierarchy>, ProviderError> {
        (**self).lookup_subtype_hierarchy(qualified_name)
    }
}

impl<P: TypeProvider + ?Sized> TypeProvider for Box<P> {
    fn lookup_subtype_hierarchy(
        &self,
        qualified_name: &str,
    ) -> Result<Option<SubtypeHierarchy>, ProviderError> {
        (**self).lookup_subtype_hierarchy(qualified_name)
    }
}

impl<P: TypeProvider + ?Sized> TypeProvider for Arc<P> {
    fn lookup_subtype_hierarchy(
        &self,
        qualified_name: &str,
    ) -> Result<Option<SubtypeHierarchy>, ProviderError> {
        (**self).lookup_subtype_hierarchy(qualified_name)
    }
}

// =============================================================================
// StaticTypeProvider - in-memory declarations
// =============================================================================

/// Provider backed by declared `(subtype, supertype)` edges.
///
/// Useful for tests and for hosts that already hold their class table in
/// memory. Every declared name resolves, including types with no subtypes.
#[derive(Debug, Default)]
pub struct StaticTypeProvider {
    /// supertype -> direct subtypes, in declaration order.
    subtypes: IndexMap<String, IndexSet<String, FxBuildHasher>, FxBuildHasher>,
    known: IndexSet<String, FxBuildHasher>,
    lookups: AtomicU64,
}

impl StaticTypeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `name` resolvable without giving it any relations.
    pub fn declare_type(&mut self, name: impl Into<String>) {
        self.known.insert(name.into());
    }

    /// Declare `subtype` as a direct subtype of `supertype`.
    pub fn declare(&mut self, subtype: impl Into<String>, supertype: impl Into<String>) {
        let subtype = subtype.into();
        let supertype = supertype.into();
        self.known.insert(subtype.clone());
        self.known.insert(supertype.clone());
        self.subtypes.entry(supertype).or_default().insert(subtype);
    }

    /// Declare one subtype with several direct supertypes.
    pub fn declare_all<I, S>(&mut self, subtype: &str, supertypes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for supertype in supertypes {
            self.declare(subtype, supertype);
        }
    }

    /// Builder form of [`declare`](Self::declare).
    pub fn with_edge(mut self, subtype: impl Into<String>, supertype: impl Into<String>) -> Self {
        self.declare(subtype, supertype);
        self
    }

    /// Builder form of [`declare_type`](Self::declare_type).
    pub fn with_type(mut self, name: impl Into<String>) -> Self {
        self.declare_type(name);
        self
    }

    /// How many lookups have been served (resolved or not).
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known.contains(name)
    }
}

impl TypeProvider for StaticTypeProvider {
    fn lookup_subtype_hierarchy(
        &self,
        qualified_name: &str,
    ) -> Result<Option<SubtypeHierarchy>, ProviderError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if !self.known.contains(qualified_name) {
            return Ok(None);
        }

        let mut hierarchy = SubtypeHierarchy::new(qualified_name);
        let mut seen: IndexSet<&str, FxBuildHasher> = IndexSet::default();
        let mut queue = VecDeque::from([qualified_name]);
        seen.insert(qualified_name);
        while let Some(current) = queue.pop_front() {
            let Some(children) = self.subtypes.get(current) else {
                continue;
            };
            for child in children {
                hierarchy.add_subtype(current, child.as_str());
                if seen.insert(child.as_str()) {
                    queue.push_back(child.as_str());
                }
            }
        }
        Ok(Some(hierarchy))
    }
}

// =============================================================================
// DeadlineProvider - bounded lookups
// =============================================================================

/// Wraps a provider so that each lookup gives up after `timeout`.
///
/// The lookup runs on a worker thread. When the deadline passes the query
/// proceeds with [`ProviderError::TimedOut`]; the worker's late answer is
/// discarded.
#[derive(Debug)]
pub struct DeadlineProvider<P> {
    inner: Arc<P>,
    timeout: Duration,
}

impl<P> DeadlineProvider<P> {
    pub fn new(inner: P, timeout: Duration) -> Self {
        Self::from_arc(Arc::new(inner), timeout)
    }

    pub fn from_arc(inner: Arc<P>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P> TypeProvider for DeadlineProvider<P>
where
    P: TypeProvider + Send + Sync + 'static,
{
    fn lookup_subtype_hierarchy(
        &self,
        qualified_name: &str,
    ) -> Result<Option<SubtypeHierarchy>, ProviderError> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let name = qualified_name.to_string();
        thread::Builder::new()
            .name("typehier-lookup".to_string())
            .spawn(move || {
                // The receiver is gone if the deadline already passed.
                let _ = tx.send(inner.lookup_subtype_hierarchy(&name));
            })
            .map_err(|err| ProviderError::Backend {
                name: qualified_name.to_string(),
                message: err.to_string(),
            })?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ProviderError::TimedOut {
                name: qualified_name.to_string(),
                timeout: self.timeout,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(ProviderError::Disconnected {
                name: qualified_name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "../tests/provider_tests.rs"]
mod tests;
