//! Core move representation shared by board representation and move generation.

use crate::piece_types::{BISHOP, KNIGHT, QUEEN, ROOK};

/// A single chess move: origin square, destination square, and an optional
/// promotion piece type (knight/bishop/rook/queen, using the indices from
/// `piece_types`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Move {
    pub from: usize,
    pub to: usize,
    pub promotion: Option<usize>,
}

/// Sentinel null move, used as a placeholder before a real move is known.
pub const NULL_MOVE: Move = Move {
    from: 0,
    to: 0,
    promotion: None,
};

impl Move {
    pub fn new(from: usize, to: usize, promotion: Option<usize>) -> Move {
        Move {
            from,
            to,
            promotion,
        }
    }

    pub fn null() -> Move {
        NULL_MOVE
    }

    pub fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    /// Canonical UCI string for this move, e.g. `"e2e4"`, `"e7e8q"`.
    ///
    /// This is the single place that must agree with whatever the
    /// `Evaluator` uses as its policy keys (see `evaluator::Evaluator`).
    pub fn to_uci(&self) -> String {
        let mut s = crate::board_utils::sq_ind_to_algebraic(self.from);
        s.push_str(&crate::board_utils::sq_ind_to_algebraic(self.to));
        if let Some(p) = self.promotion {
            s.push(promotion_char(p));
        }
        s
    }
}

fn promotion_char(piece: usize) -> char {
    match piece {
        KNIGHT => 'n',
        BISHOP => 'b',
        ROOK => 'r',
        QUEEN => 'q',
        _ => panic!("invalid promotion piece type {piece}"),
    }
}

/// Castling rights for both sides, tracked independently for king- and
/// queenside.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl Default for CastlingRights {
    fn default() -> Self {
        CastlingRights {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }
}
