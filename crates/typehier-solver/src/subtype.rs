//! Subtype and common-subtype queries over the cached graph.
//!
//! The engine answers two questions about (possibly generic) type names:
//!
//! - [`is_subtype_compatible`](SubtypeQueryEngine::is_subtype_compatible):
//!   may a value of `sub` be used where `sup` is expected?
//! - [`exists_common_subtype`](SubtypeQueryEngine::exists_common_subtype):
//!   could one concrete type satisfy both constraints at once?
//!
//! Base types are related through the graph. Generic arguments are related
//! positionally by recursing on each pair; there is no declared variance.
//! Raw usages follow erasure: a raw supertype accepts any instantiation, a
//! raw subtype never satisfies a parameterized supertype.
//!
//! An engine borrows the graph for the duration of one top-level query.

use crate::config::HierarchyConfig;
use crate::error::QueryError;
use crate::generics::{ArgumentList, parse_type_and_arguments, split_top_level_arguments};
use crate::graph::TypeGraph;
use crate::provider::TypeProvider;
use crate::recursion::DepthCounter;
use tracing::{trace, warn};

/// Which relation to apply to each pair of generic arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgumentRelation {
    SubtypeCompatible,
    CommonSubtype,
}

pub struct SubtypeQueryEngine<'a, P: TypeProvider + ?Sized> {
    graph: &'a mut TypeGraph,
    provider: &'a P,
    config: &'a HierarchyConfig,
    generic_depth: DepthCounter,
}

impl<'a, P: TypeProvider + ?Sized> SubtypeQueryEngine<'a, P> {
    pub fn new(graph: &'a mut TypeGraph, provider: &'a P, config: &'a HierarchyConfig) -> Self {
        Self {
            graph,
            provider,
            config,
            generic_depth: DepthCounter::new(config.max_generic_depth),
        }
    }

    /// Is `sub` usable where `sup` is expected?
    ///
    /// Rules are applied in order; the first that matches decides:
    /// 1. `sup` is the root type: always true, even for `void`.
    /// 2. `sub` is `void`: true only if `sup` is `void`.
    /// 3. `sup` is `void`: false.
    /// 4. `sup`'s base must be reachable from `sub`'s base over supertype
    ///    edges, after loading `sup`'s subtree.
    /// 5. Generic arguments must then be compatible (see module docs).
    pub fn is_subtype_compatible(&mut self, sub: &str, sup: &str) -> Result<bool, QueryError> {
        if self.config.is_root(sup) {
            return Ok(true);
        }
        if self.config.is_void(sub) {
            return Ok(self.config.is_void(sup));
        }
        if self.config.is_void(sup) {
            return Ok(false);
        }

        let sub_ref = parse_type_and_arguments(sub)?;
        let sup_ref = parse_type_and_arguments(sup)?;

        let sub_id = self.graph.get_or_create(sub_ref.base);
        let sup_id = self.graph.get_or_create(sup_ref.base);
        self.graph.ensure_subtree_loaded(sup_ref.base, self.provider);

        if !self.graph.is_ancestor(sub_id, sup_id) {
            trace!(sub, sup, "base types unrelated");
            return Ok(false);
        }
        self.is_subtype_compatible_generics(sub_ref.args, sup_ref.args)
    }

    fn is_subtype_compatible_generics(
        &mut self,
        sub_args: &str,
        sup_args: &str,
    ) -> Result<bool, QueryError> {
        if sup_args.is_empty() {
            return Ok(true);
        }
        if sub_args.is_empty() {
            trace!(sup_args, "raw subtype cannot satisfy parameterized supertype");
            return Ok(false);
        }
        let sub_list = split_top_level_arguments(sub_args)?;
        let sup_list = split_top_level_arguments(sup_args)?;
        self.relate_arguments(&sub_list, &sup_list, ArgumentRelation::SubtypeCompatible)
    }

    /// Could some type be subtype-compatible with both `t1` and `t2`?
    pub fn exists_common_subtype(&mut self, t1: &str, t2: &str) -> Result<bool, QueryError> {
        self.exists_common_subtype_with(t1, t2, false, false)
    }

    /// [`exists_common_subtype`](Self::exists_common_subtype) for callers
    /// that already know one direction of the base-type relation fails.
    ///
    /// `skip_forward` skips testing `t1 <: t2`, `skip_backward` skips
    /// `t2 <: t1`.
    pub fn exists_common_subtype_with(
        &mut self,
        t1: &str,
        t2: &str,
        skip_forward: bool,
        skip_backward: bool,
    ) -> Result<bool, QueryError> {
        if self.config.is_root(t1) || self.config.is_root(t2) {
            return Ok(true);
        }
        if self.config.is_void(t1) || self.config.is_void(t2) {
            return Ok(false);
        }

        let ref1 = parse_type_and_arguments(t1)?;
        let ref2 = parse_type_and_arguments(t2)?;
        let id1 = self.graph.get_or_create(ref1.base);
        let id2 = self.graph.get_or_create(ref2.base);

        if !skip_forward && self.is_subtype_compatible(ref1.base, ref2.base)? {
            return self.exists_common_subtype_generics(ref1.args, ref2.args);
        }
        if !skip_backward && self.is_subtype_compatible(ref2.base, ref1.base)? {
            return self.exists_common_subtype_generics(ref1.args, ref2.args);
        }

        self.graph.ensure_subtree_loaded(ref1.base, self.provider);
        self.graph.ensure_subtree_loaded(ref2.base, self.provider);

        let subs1 = self.graph.subtype_closure(id1);
        let subs2 = self.graph.subtype_closure(id2);
        let (smaller, larger) = if subs1.len() <= subs2.len() {
            (&subs1, &subs2)
        } else {
            (&subs2, &subs1)
        };
        if smaller.iter().any(|id| larger.contains(id)) {
            // The arguments of the original operands are compared, whichever
            // shared descendant was found.
            return self.exists_common_subtype_generics(ref1.args, ref2.args);
        }
        trace!(t1, t2, "no shared subtype");
        Ok(false)
    }

    fn exists_common_subtype_generics(
        &mut self,
        args1: &str,
        args2: &str,
    ) -> Result<bool, QueryError> {
        if args1.is_empty() || args2.is_empty() {
            return Ok(true);
        }
        let list1 = split_top_level_arguments(args1)?;
        let list2 = split_top_level_arguments(args2)?;
        self.relate_arguments(&list1, &list2, ArgumentRelation::CommonSubtype)
    }

    /// Pairwise relation over two argument lists of equal arity.
    fn relate_arguments(
        &mut self,
        left: &ArgumentList<'_>,
        right: &ArgumentList<'_>,
        relation: ArgumentRelation,
    ) -> Result<bool, QueryError> {
        if left.len() != right.len() {
            trace!(
                left = left.len(),
                right = right.len(),
                "generic arity mismatch"
            );
            return Ok(false);
        }
        if !self.generic_depth.enter() {
            warn!(
                max_depth = self.config.max_generic_depth,
                "generic arguments nested too deeply; treating as unrelated"
            );
            return Ok(false);
        }

        let mut result = Ok(true);
        for (l, r) in left.iter().zip(right.iter()) {
            let related = match relation {
                ArgumentRelation::SubtypeCompatible => self.is_subtype_compatible(l, r),
                ArgumentRelation::CommonSubtype => self.exists_common_subtype(l, r),
            };
            match related {
                Ok(true) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }
        self.generic_depth.leave();
        result
    }
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
