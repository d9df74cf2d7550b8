//! Error types for generic parsing, provider lookups and queries.

use std::time::Duration;
use thiserror::Error;

/// Malformed generic argument syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenericParseError {
    /// A `<` with no matching `>`.
    #[error("unclosed '<' at offset {position} in generic type `{input}`")]
    UnclosedBracket { input: String, position: usize },
    /// A `>` with no preceding `<`.
    #[error("unmatched '>' at offset {position} in generic type `{input}`")]
    UnmatchedClose { input: String, position: usize },
}

/// Failure reported by a [`TypeProvider`](crate::TypeProvider).
///
/// These never abort a query: the graph logs them and answers as if the
/// type had no known subtypes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("type hierarchy lookup for `{name}` did not finish within {timeout:?}")]
    TimedOut { name: String, timeout: Duration },
    #[error("type hierarchy lookup for `{name}` was abandoned by the provider")]
    Disconnected { name: String },
    #[error("type hierarchy lookup for `{name}` failed: {message}")]
    Backend { name: String, message: String },
}

impl ProviderError {
    /// Name of the type whose lookup failed.
    pub fn type_name(&self) -> &str {
        match self {
            Self::TimedOut { name, .. }
            | Self::Disconnected { name }
            | Self::Backend { name, .. } => name,
        }
    }
}

/// Error returned by a subtype query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] GenericParseError),
}
