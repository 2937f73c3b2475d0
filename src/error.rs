//! Error types for the search core.
//!
//! Follows the teacher's convention of small `enum`s with manual `Display` /
//! `std::error::Error` impls at module boundaries rather than a blanket
//! `anyhow::Error`.

use std::fmt;

/// Errors that can surface from constructing or running a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Bad input at the public boundary: an unparsable FEN, a non-positive
    /// iteration/time budget, or a model that failed to load.
    Configuration(String),
    /// The evaluator failed to produce a policy/value for a position. Never
    /// escapes as an `Err` to a caller of `SearchDriver` - it is logged and
    /// downgraded to a rollout evaluation (spec's evaluate-falls-back-to-
    /// rollout contract).
    Evaluation(String),
    /// An internal invariant was violated. Constructed only to immediately
    /// `panic!` with its `Display` text; matches the teacher's `expect`-heavy
    /// internal assertions rather than being propagated as a `Result`.
    Invariant(String),
    /// `advance_tree` was asked to descend into a move with no matching
    /// child. Recovered, non-fatal: the driver rebuilds a fresh root instead.
    UnknownMove(String),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::Configuration(msg) => write!(f, "invalid search configuration: {msg}"),
            SearchError::Evaluation(msg) => write!(f, "evaluator failed: {msg}"),
            SearchError::Invariant(msg) => write!(f, "search invariant violated: {msg}"),
            SearchError::UnknownMove(msg) => write!(f, "move not found in tree: {msg}"),
        }
    }
}

impl std::error::Error for SearchError {}
