//! The MCTS search core: tree node, PUCT selection, and the driver loop.
//! Everything here is generic over `game::GameAdapter`; chess is just the
//! one instantiation the rest of this crate wires up.

pub mod driver;
pub mod node;

pub use driver::{SearchDriver, SearchSummary};
pub use node::{NodeRef, SearchNode};
