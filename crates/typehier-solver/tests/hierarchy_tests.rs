use super::*;
use crate::error::{GenericParseError, ProviderError};
use crate::provider::{DeadlineProvider, StaticTypeProvider, SubtypeHierarchy};
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

fn jdk() -> StaticTypeProvider {
    StaticTypeProvider::new()
        .with_edge("java.util.Collection", "java.lang.Object")
        .with_edge("java.util.List", "java.util.Collection")
        .with_edge("java.util.Set", "java.util.Collection")
        .with_edge("java.util.ArrayList", "java.util.List")
        .with_edge("java.util.HashSet", "java.util.Set")
        .with_edge("java.lang.Number", "java.lang.Object")
        .with_edge("java.lang.Integer", "java.lang.Number")
        .with_edge("java.lang.String", "java.lang.Object")
}

fn lazy_config() -> HierarchyConfig {
    HierarchyConfig::default().with_preload_root(false)
}

struct StalledProvider;

impl TypeProvider for StalledProvider {
    fn lookup_subtype_hierarchy(
        &self,
        qualified_name: &str,
    ) -> Result<Option<SubtypeHierarchy>, ProviderError> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(Some(SubtypeHierarchy::new(qualified_name)))
    }
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_session_is_thread_safe() {
    assert_send_sync::<CachedTypeHierarchy<StaticTypeProvider>>();
    assert_send_sync::<CachedTypeHierarchy<DeadlineProvider<StaticTypeProvider>>>();
}

#[test]
fn test_construction_preloads_root_tree() {
    let hierarchy = CachedTypeHierarchy::new(jdk());
    assert_eq!(hierarchy.provider().lookup_count(), 1);
    assert!(hierarchy.is_complete_down("java.lang.Object"));
    assert!(hierarchy.is_complete_down("java.util.ArrayList"));

    // Everything below the root is already cached.
    assert!(hierarchy
        .is_subtype_compatible("java.util.ArrayList", "java.util.Collection")
        .unwrap());
    assert!(hierarchy
        .is_subtype_compatible("java.lang.Integer", "java.lang.Number")
        .unwrap());
    assert_eq!(hierarchy.provider().lookup_count(), 1);
}

#[test]
fn test_lazy_session_loads_on_demand() {
    let hierarchy = CachedTypeHierarchy::with_config(jdk(), lazy_config());
    assert_eq!(hierarchy.provider().lookup_count(), 0);
    assert!(!hierarchy.contains("java.util.List"));
    assert_eq!(hierarchy.stats().nodes, 8);

    assert!(hierarchy
        .is_subtype_compatible("java.util.ArrayList<java.lang.String>", "java.util.List")
        .unwrap());
    assert_eq!(hierarchy.provider().lookup_count(), 1);
    assert!(hierarchy.is_complete_down("java.util.List"));
    assert!(!hierarchy.is_complete_down("java.util.Collection"));
}

#[test]
fn test_unresolvable_root_is_not_fatal() {
    let provider = StaticTypeProvider::new().with_edge("B", "A");
    let hierarchy = CachedTypeHierarchy::new(provider);
    let stats = hierarchy.stats();
    assert_eq!(stats.provider_lookups, 1);
    assert_eq!(stats.failed_lookups, 1);
    assert!(!hierarchy.is_complete_down("java.lang.Object"));
    assert!(hierarchy.is_subtype_compatible("B", "A").unwrap());
    assert!(hierarchy.is_subtype_compatible("B", "Object").unwrap());
}

#[test]
fn test_queries_through_trait_object() {
    fn check(types: &dyn TypeHierarchy) -> Result<Vec<bool>, QueryError> {
        Ok(vec![
            types.is_subtype_compatible("java.util.HashSet", "java.util.Collection")?,
            types.is_subtype_compatible("java.util.Collection", "java.util.Set")?,
            types.exists_common_subtype("java.util.List", "java.util.Set")?,
            types.exists_common_subtype("java.util.Collection", "java.util.Set")?,
            types.exists_common_subtype("void", "int")?,
            types.exists_common_subtype_with("java.util.List", "java.util.Collection", true, true)?,
        ])
    }

    let hierarchy = CachedTypeHierarchy::new(jdk());
    assert_eq!(
        check(&hierarchy).unwrap(),
        vec![true, false, false, true, false, true]
    );
}

#[test]
fn test_parse_errors_reach_the_caller() {
    let hierarchy = CachedTypeHierarchy::new(jdk());
    let err = hierarchy
        .is_subtype_compatible("java.util.List<java.lang.String", "java.util.Collection")
        .unwrap_err();
    assert!(matches!(
        err,
        QueryError::Parse(GenericParseError::UnclosedBracket { .. })
    ));
    assert!(hierarchy
        .is_subtype_compatible("java.util.List", "java.util.Collection")
        .unwrap());
}

#[test]
fn test_known_subtypes_and_graph_view() {
    let hierarchy = CachedTypeHierarchy::new(jdk());
    assert_eq!(
        hierarchy.known_subtypes("java.util.List"),
        vec!["java.util.ArrayList".to_string(), "java.util.List".to_string()]
    );
    let edges = hierarchy.with_graph(|graph| graph.stats().edges);
    assert_eq!(edges, hierarchy.stats().edges);
}

#[test]
fn test_explicit_preload() {
    let hierarchy = CachedTypeHierarchy::with_config(jdk(), lazy_config());
    assert_eq!(
        hierarchy.preload("java.util.Collection"),
        LoadStatus::Loaded { nodes_added: 4 }
    );
    assert_eq!(
        hierarchy.preload("java.util.Set"),
        LoadStatus::AlreadyComplete
    );
    assert_eq!(hierarchy.preload("com.acme.Missing"), LoadStatus::Unresolved);
}

#[test]
fn test_concurrent_queries_share_one_cache() {
    let hierarchy = Arc::new(CachedTypeHierarchy::with_config(jdk(), lazy_config()));
    let queries: Vec<(&str, &str, bool)> = (0..64)
        .flat_map(|_| {
            [
                ("java.util.ArrayList", "java.util.List", true),
                ("java.util.HashSet", "java.util.Collection", true),
                ("java.lang.Integer", "java.lang.Number", true),
                ("java.lang.String", "java.util.List", false),
                ("java.util.List<java.lang.Integer>", "java.util.Collection<java.lang.Number>", true),
            ]
        })
        .collect();

    let results: Vec<bool> = queries
        .par_iter()
        .map(|(sub, sup, _)| hierarchy.is_subtype_compatible(sub, sup).unwrap())
        .collect();
    for ((sub, sup, expected), actual) in queries.iter().zip(results) {
        assert_eq!(*expected, actual, "{sub} <: {sup}");
    }

    // One lookup per distinct supertype subtree, however the queries interleaved.
    let lookups = hierarchy.provider().lookup_count();
    assert!(lookups <= 4, "subtrees fetched more than once: {lookups}");
    assert!(hierarchy.is_complete_down("java.util.Collection"));
}

#[test]
fn test_poisoned_lock_is_recovered() {
    let hierarchy = CachedTypeHierarchy::new(jdk());
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        hierarchy.with_graph(|_| panic!("analysis crashed while inspecting graph"))
    }));
    assert!(outcome.is_err());
    assert!(hierarchy
        .is_subtype_compatible("java.util.ArrayList", "java.util.Collection")
        .unwrap());
}

#[test]
fn test_slow_provider_times_out_to_no_relation() {
    let provider = DeadlineProvider::new(StalledProvider, Duration::from_millis(10));
    let hierarchy = CachedTypeHierarchy::with_config(provider, lazy_config());
    assert!(!hierarchy
        .is_subtype_compatible("com.acme.Impl", "com.acme.Api")
        .unwrap());
    let stats = hierarchy.stats();
    assert_eq!(stats.failed_lookups, 1);
    assert!(!hierarchy.is_complete_down("com.acme.Api"));
}

#[test]
fn test_query_trace_events_do_not_disturb_results() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
    let hierarchy = CachedTypeHierarchy::new(jdk());
    assert!(hierarchy
        .exists_common_subtype("java.util.Collection<java.lang.Integer>", "java.util.List<java.lang.Number>")
        .unwrap());
}
