//! Cached Type Hierarchy Solver
//!
//! Answers two relation queries over qualified type names, including
//! generic instantiations such as `java.util.Map<K,java.util.List<V>>`:
//!
//! - **Subtype compatibility**: may `A` be used where `B` is expected?
//! - **Common subtype**: could one concrete type satisfy both `A` and `B`?
//!
//! Type information comes from an injected [`TypeProvider`], which is
//! assumed to be expensive. Results are cached in a [`TypeGraph`] that is
//! populated lazily, one subtree at a time, and never evicted during a
//! session.
//!
//! ```ignore
//! let provider = StaticTypeProvider::new()
//!     .with_edge("java.util.List", "java.util.Collection")
//!     .with_edge("java.util.ArrayList", "java.util.List");
//! let types = CachedTypeHierarchy::new(provider);
//! assert!(types.is_subtype_compatible("java.util.ArrayList<String>", "java.util.Collection")?);
//! assert!(!types.is_subtype_compatible("java.util.ArrayList", "java.util.List<String>")?);
//! ```
pub mod config;
pub mod error;
pub mod generics;
pub mod graph;
mod hierarchy;
pub mod primitives;
pub mod provider;
mod query_trace;
pub mod recursion;
pub mod subtype;
pub mod types;

pub use config::HierarchyConfig;
pub use error::{GenericParseError, ProviderError, QueryError};
pub use generics::{
    ArgumentList, ParsedType, TypeRef, parse_type_and_arguments, parse_type_ref,
    split_top_level_arguments,
};
pub use graph::{LoadStatus, TypeGraph};
pub use hierarchy::{CachedTypeHierarchy, TypeHierarchy};
pub use provider::{DeadlineProvider, StaticTypeProvider, SubtypeHierarchy, TypeProvider};
pub use subtype::SubtypeQueryEngine;
pub use types::{GraphStats, NodeId, TypeNode};
