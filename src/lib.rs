//! # harrier
//!
//! An AlphaZero-style Monte Carlo Tree Search engine for chess: a generic
//! search core (`mcts`) built around a `GameAdapter` abstraction (`game`),
//! wired here to chess rules (`game::chess`) and a pluggable neural
//! `Evaluator` (`evaluator`). The chess rules themselves - board
//! representation, move generation, classical evaluation - are an external
//! collaborator the core only ever touches through `GameAdapter`.
//!
//! It provides modules for:
//! - Board representation (`board`, `board_utils`)
//! - Move generation and application (`move_generation`, `make_move`)
//! - Evaluation (`eval`, `eval_constants`) - used only as the rollout
//!   fallback's material heuristic
//! - The game abstraction (`game`) and its chess instantiation (`game::chess`)
//! - The learned-model seam (`evaluator`)
//! - The search core (`mcts`) and its public shell (`Search`, this module)
//! - Core types and utilities (`move_types`, `piece_types`, `bits`, `utils`)
//! - Configuration (`config`) and error handling (`error`)
//!
//! The peripheral shell (`Search`, and `bin/search_cli.rs`) is the thin
//! layer that accepts a FEN, runs a search, and reports a UCI move; none of
//! the interesting engineering lives there.

pub mod bits;
pub mod board;
pub mod board_utils;
pub mod config;
pub mod error;
pub mod eval;
pub mod eval_constants;
pub mod evaluator;
pub mod game;
pub mod make_move;
pub mod mcts;
pub mod move_generation;
pub mod move_types;
pub mod piece_types;
pub mod utils;

use std::time::Duration;

use board::Board;
use config::SearchConfig;
use error::SearchError;
use evaluator::{Evaluator, NodeEvaluation};
use game::chess::ChessAdapter;
use game::GameAdapter;
use mcts::{SearchDriver, SearchSummary};

impl Evaluator<ChessAdapter> for Box<dyn Evaluator<ChessAdapter>> {
    fn evaluate(&self, pos: &Board) -> Result<NodeEvaluation, SearchError> {
        (**self).evaluate(pos)
    }
}

/// The peripheral-shell entry point: a chess search over a `ChessAdapter`
/// tree with an optional boxed neural evaluator (pure-rollout mode when
/// `None`). Wraps the generic `SearchDriver` so callers outside this crate
/// don't need to name the evaluator's concrete type.
pub struct Search {
    driver: SearchDriver<ChessAdapter, Box<dyn Evaluator<ChessAdapter>>>,
    adapter: ChessAdapter,
    /// Set once `driver.search()` has run for the current root; cleared by
    /// `advance`. Without this, a second `best_move()` call on the same
    /// root would run another full budget's worth of iterations on top of
    /// the already-populated tree instead of just reading it.
    summary: Option<SearchSummary>,
}

impl Search {
    /// Constructs a search rooted at `initial_position_fen`. Returns
    /// `SearchError::Configuration` for a malformed FEN or a non-positive
    /// iteration/time budget; never panics on bad input.
    pub fn new_search(
        initial_position_fen: &str,
        max_iterations: u32,
        max_seconds: f64,
        cpuct: f64,
        evaluator: Option<Box<dyn Evaluator<ChessAdapter>>>,
    ) -> Result<Search, SearchError> {
        validate_fen(initial_position_fen)?;
        let config = SearchConfig {
            max_iterations,
            max_seconds,
            cpuct,
            ..SearchConfig::default()
        };
        config.validate()?;

        let adapter = ChessAdapter::new();
        let position = adapter.position_from_fen(initial_position_fen);
        Ok(Search {
            driver: SearchDriver::new(position, ChessAdapter::new(), evaluator, config),
            adapter,
            summary: None,
        })
    }

    /// Runs the search to completion (budget-bound) and returns the chosen
    /// move's UCI string. `None` when the root has no legal moves (a
    /// terminal starting position). Calling this again without an
    /// intervening `advance` does not re-run the search; it just re-reads
    /// the already-populated tree.
    pub fn best_move(&mut self) -> Option<String> {
        let (uci, _) = self.best_move_with_summary();
        uci
    }

    /// Runs the search (once per root - see `summary`) and returns the
    /// chosen move alongside the debug summary (spec §6's optional
    /// observability surface).
    pub fn best_move_with_summary(&mut self) -> (Option<String>, SearchSummary) {
        let summary = self.ensure_searched();
        let best = self
            .driver
            .best_move()
            .map(|mv| self.adapter.move_to_uci(mv));
        (best, summary)
    }

    /// Runs `driver.search()` exactly once per root, caching and returning
    /// its summary on subsequent calls instead of accumulating more
    /// iterations on top of an already-searched tree.
    fn ensure_searched(&mut self) -> SearchSummary {
        if self.summary.is_none() {
            self.summary = Some(self.driver.search());
        }
        self.summary.clone().expect("just set above")
    }

    /// Advances the tree by an externally observed move (opponent's reply
    /// or this engine's own chosen move), given as a UCI string. Reuses the
    /// corresponding subtree's statistics when it was explored; otherwise
    /// the tree restarts fresh from the resulting position.
    pub fn advance(&mut self, uci: &str) -> Result<(), SearchError> {
        let pos = self.driver.root().borrow().state.clone();
        let mv = self
            .adapter
            .legal_moves(&pos)
            .into_iter()
            .find(|m| self.adapter.move_to_uci(*m) == uci)
            .ok_or_else(|| SearchError::UnknownMove(uci.to_string()))?;
        self.driver.advance(mv);
        self.summary = None;
        Ok(())
    }
}

fn validate_fen(fen: &str) -> Result<(), SearchError> {
    let parts: Vec<&str> = fen.split(' ').collect();
    if parts.len() < 2 {
        return Err(SearchError::Configuration(format!(
            "FEN must have at least a board and a side to move: {fen}"
        )));
    }
    if parts[0].matches('/').count() != 7 {
        return Err(SearchError::Configuration(format!(
            "FEN board must have 8 ranks separated by '/': {fen}"
        )));
    }
    if parts[1] != "w" && parts[1] != "b" {
        return Err(SearchError::Configuration(format!(
            "FEN side to move must be 'w' or 'b': {fen}"
        )));
    }
    Ok(())
}

/// Convenience used by `search_cli`: runs one bounded search from a fresh
/// `Search` and returns the elapsed wall time alongside the chosen move.
pub fn search_once(
    fen: &str,
    config: SearchConfig,
    evaluator: Option<Box<dyn Evaluator<ChessAdapter>>>,
) -> Result<(Option<String>, Duration), SearchError> {
    let mut search = Search::new_search(
        fen,
        config.max_iterations,
        config.max_seconds,
        config.cpuct,
        evaluator,
    )?;
    let start = std::time::Instant::now();
    let best = search.best_move();
    Ok((best, start.elapsed()))
}
