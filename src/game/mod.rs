//! The abstraction layer the search core consumes instead of depending on
//! chess directly. `GameAdapter` is generic so the concrete position/move
//! types are known statically throughout `SearchNode`/`SearchDriver` - no
//! runtime downcast of an abstract state is needed.

pub mod chess;

/// One of the two fixed, global reference sides every value scalar in the
/// tree is expressed against. For chess this is White/Black; `Side::A` is
/// always the same physical side across the whole search, never "the side
/// to move at this node."
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// The outcome of a terminal position, before conversion to a SideA-
/// perspective scalar.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameResult {
    AWins,
    BWins,
    Draw,
}

impl GameResult {
    /// Converts to the SideA-perspective scalar in {0.0, 0.5, 1.0} every
    /// value in the tree is expressed in.
    pub fn side_a_value(self) -> f64 {
        match self {
            GameResult::AWins => 1.0,
            GameResult::BWins => 0.0,
            GameResult::Draw => 0.5,
        }
    }
}

/// The game-rules collaborator: presents positions, legal moves, move
/// application, terminal detection, side-to-move, and a random rollout.
/// Everything the search core touches about the game goes through this
/// trait; the chess rules behind `ChessAdapter` are out of scope for the
/// core itself.
pub trait GameAdapter {
    type Position: Clone;
    type Move: Copy + PartialEq + Eq + std::fmt::Debug;

    /// Legal moves from `pos`. Order is implementation-defined but must be
    /// deterministic for a given position - it determines expansion order.
    fn legal_moves(&self, pos: &Self::Position) -> Vec<Self::Move>;

    /// Applies `mv` to a copy of `pos`, returning the resulting position.
    /// Does not mutate `pos`.
    fn apply(&self, pos: &Self::Position, mv: Self::Move) -> Self::Position;

    fn is_terminal(&self, pos: &Self::Position) -> bool;

    /// Defined only when `is_terminal(pos)`.
    fn terminal_result(&self, pos: &Self::Position) -> GameResult;

    fn side_to_move(&self, pos: &Self::Position) -> Side;

    /// Plays up to a bounded number of random legal moves. If a terminal
    /// position is reached, returns its exact SideA-perspective value;
    /// otherwise returns a bounded heuristic normalized into [0,1] from
    /// SideA's perspective. Used only when no `Evaluator` is supplied.
    fn rollout(&self, pos: &Self::Position) -> f64;

    /// Canonical UCI-style string for `mv`. MUST match the keys the
    /// `Evaluator` uses for its priors exactly.
    fn move_to_uci(&self, mv: Self::Move) -> String;

    fn move_equals(&self, a: Self::Move, b: Self::Move) -> bool {
        a == b
    }
}
