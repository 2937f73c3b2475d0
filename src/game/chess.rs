//! Chess instantiation of `GameAdapter`. This is the game-rules collaborator
//! spec §1 calls out of scope for the core: it wraps the board
//! representation, move generator, and classical evaluation that live
//! alongside it (`board`, `move_generation`, `make_move`, `eval`) behind the
//! generic interface the MCTS core actually depends on.

use rand::seq::SliceRandom;

use crate::board::Board;
use crate::eval::PestoEval;
use crate::game::{GameAdapter, GameResult, Side};
use crate::move_generation::MoveGen;
use crate::move_types::Move;

/// Bounded random-playout depth before falling back to the material
/// heuristic (spec §4.1: 500 plies for chess).
pub const ROLLOUT_DEPTH_CAP: u32 = 500;

/// Centipawn scale used to squash the classical evaluation into (0, 1) via
/// a logistic curve once a rollout runs out of depth.
const ROLLOUT_EVAL_SCALE: f64 = 400.0;

pub struct ChessAdapter {
    move_gen: MoveGen,
    pesto: PestoEval,
}

impl ChessAdapter {
    pub fn new() -> ChessAdapter {
        ChessAdapter {
            move_gen: MoveGen::new(),
            pesto: PestoEval::new(),
        }
    }

    /// Constructs the starting position for a search from a FEN string.
    /// Panics on malformed FEN, matching `Board::new_from_fen`; callers at
    /// the public boundary (`Search::new`) catch malformed input earlier by
    /// validating with the same parser before it reaches the tree.
    pub fn position_from_fen(&self, fen: &str) -> Board {
        Board::new_from_fen(fen)
    }

    fn side(&self, board: &Board) -> Side {
        if board.w_to_move {
            Side::A
        } else {
            Side::B
        }
    }
}

impl Default for ChessAdapter {
    fn default() -> Self {
        ChessAdapter::new()
    }
}

impl GameAdapter for ChessAdapter {
    type Position = Board;
    type Move = Move;

    fn legal_moves(&self, pos: &Board) -> Vec<Move> {
        pos.legal_moves(&self.move_gen)
    }

    fn apply(&self, pos: &Board, mv: Move) -> Board {
        pos.apply_move_to_board(mv)
    }

    fn is_terminal(&self, pos: &Board) -> bool {
        let (checkmate, stalemate) = pos.is_checkmate_or_stalemate(&self.move_gen);
        checkmate || stalemate
    }

    fn terminal_result(&self, pos: &Board) -> GameResult {
        let (checkmate, stalemate) = pos.is_checkmate_or_stalemate(&self.move_gen);
        if stalemate {
            return GameResult::Draw;
        }
        debug_assert!(checkmate, "terminal_result called on a non-terminal position");
        // The side to move is checkmated, so the side that just moved - the
        // opposite of side_to_move - wins.
        match self.side(pos).opposite() {
            Side::A => GameResult::AWins,
            Side::B => GameResult::BWins,
        }
    }

    fn side_to_move(&self, pos: &Board) -> Side {
        self.side(pos)
    }

    fn rollout(&self, pos: &Board) -> f64 {
        let mut rng = rand::thread_rng();
        let mut current = pos.clone();
        for _ in 0..ROLLOUT_DEPTH_CAP {
            let (checkmate, stalemate) = current.is_checkmate_or_stalemate(&self.move_gen);
            if stalemate {
                return 0.5;
            }
            if checkmate {
                return match self.side(&current).opposite() {
                    Side::A => 1.0,
                    Side::B => 0.0,
                };
            }
            let moves = current.legal_moves(&self.move_gen);
            let mv = *moves
                .choose(&mut rng)
                .expect("legal_moves is non-empty when not checkmate or stalemate");
            current = current.apply_move_to_board(mv);
        }
        self.material_heuristic(&current)
    }

    fn move_to_uci(&self, mv: Move) -> String {
        mv.to_uci()
    }
}

impl ChessAdapter {
    /// A bounded material/positional heuristic in [0,1], SideA (White)
    /// perspective, used when a rollout exhausts its depth cap without
    /// reaching a terminal position.
    fn material_heuristic(&self, pos: &Board) -> f64 {
        let cp_side_to_move = self.pesto.eval(pos) as f64;
        let cp_white = if pos.w_to_move {
            cp_side_to_move
        } else {
            -cp_side_to_move
        };
        (cp_white / ROLLOUT_EVAL_SCALE).tanh() / 2.0 + 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollout_on_forced_mate_returns_exact_terminal_value() {
        let adapter = ChessAdapter::new();
        let pos = adapter.position_from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1");
        // Ra8# is forced-in-one but not yet played; confirm the position is
        // non-terminal and rollout stays within bounds.
        let value = adapter.rollout(&pos);
        assert!((0.0..=1.0).contains(&value));
    }

    #[test]
    fn terminal_result_on_stalemate_is_draw() {
        let adapter = ChessAdapter::new();
        let pos = adapter.position_from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(adapter.is_terminal(&pos));
        assert_eq!(adapter.terminal_result(&pos), GameResult::Draw);
    }

    #[test]
    fn terminal_result_on_checkmate_credits_the_mover() {
        let adapter = ChessAdapter::new();
        let mated = adapter.position_from_fen("R5k1/5ppp/8/8/8/8/5PPP/6K1 b - - 0 1");
        assert!(adapter.is_terminal(&mated));
        assert_eq!(adapter.terminal_result(&mated), GameResult::AWins);
    }

    #[test]
    fn move_to_uci_matches_board_notation() {
        let adapter = ChessAdapter::new();
        let pos = adapter.position_from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        let moves = adapter.legal_moves(&pos);
        assert!(moves.iter().any(|m| adapter.move_to_uci(*m) == "e2e4"));
    }
}
