//! Structured tracing for public query entry points.
//!
//! Events use target `typehier::query_json` and are intended to be consumed
//! with a JSON `tracing-subscriber` layer filtered to
//! `typehier::query_json=trace`.
//!
//! Environment:
//! - `TYPEHIER_QUERY_RUN_ID`: optional run identifier attached to every event.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Level, trace};

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);
static QUERY_RUN_ID: OnceLock<String> = OnceLock::new();

#[inline]
pub(crate) fn enabled() -> bool {
    tracing::enabled!(target: "typehier::query_json", Level::TRACE)
}

#[inline]
pub(crate) fn next_query_id() -> u64 {
    NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed)
}

#[inline]
fn run_id() -> &'static str {
    QUERY_RUN_ID
        .get_or_init(|| {
            std::env::var("TYPEHIER_QUERY_RUN_ID").unwrap_or_else(|_| "default".to_string())
        })
        .as_str()
}

#[inline]
pub(crate) fn relation_start(query_id: u64, op: &'static str, left: &str, right: &str) {
    trace!(
        target: "typehier::query_json",
        event = "query",
        phase = "start",
        run_id = run_id(),
        query_id,
        op,
        left,
        right
    );
}

#[inline]
pub(crate) fn relation_end(query_id: u64, op: &'static str, result: Option<bool>, nodes: usize) {
    trace!(
        target: "typehier::query_json",
        event = "query",
        phase = "end",
        run_id = run_id(),
        query_id,
        op,
        result = ?result,
        graph_nodes = nodes
    );
}
