//! Tunable search parameters. A plain struct with a `Default` impl, not a
//! config-file crate - the teacher's own binaries configure themselves with
//! CLI flags layered over struct defaults, and `harrier` follows suit.

/// Numeric knobs for one search (spec §6). None of these are invariants;
/// they may be freely overridden by a caller (e.g. `search_cli`'s `clap`
/// flags).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchConfig {
    pub max_iterations: u32,
    pub max_seconds: f64,
    pub cpuct: f64,
    pub rollout_depth_cap: u32,
    pub policy_dim: usize,
    pub encoding_planes: usize,
}

impl Default for SearchConfig {
    fn default() -> SearchConfig {
        SearchConfig {
            max_iterations: 15_000,
            max_seconds: 5.0,
            cpuct: 2.0,
            rollout_depth_cap: crate::game::chess::ROLLOUT_DEPTH_CAP,
            policy_dim: crate::evaluator::POLICY_DIM,
            encoding_planes: crate::evaluator::ENCODING_PLANES,
        }
    }
}

impl SearchConfig {
    /// Validates the budget fields, used at the `Search::new` boundary to
    /// turn a bad configuration into a `SearchError::Configuration` instead
    /// of a silently degenerate search.
    pub fn validate(&self) -> Result<(), crate::error::SearchError> {
        if self.max_iterations == 0 {
            return Err(crate::error::SearchError::Configuration(
                "max_iterations must be positive".to_string(),
            ));
        }
        if self.max_seconds <= 0.0 {
            return Err(crate::error::SearchError::Configuration(
                "max_seconds must be positive".to_string(),
            ));
        }
        if self.cpuct <= 0.0 {
            return Err(crate::error::SearchError::Configuration(
                "cpuct must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
