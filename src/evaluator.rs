//! The learned-model collaborator: encodes a position to a tensor, runs a
//! forward pass through a loaded model, and turns the raw policy/value
//! output into a `NodeEvaluation` the tree can consume. The model itself -
//! its file format and weights - is out of scope; this module only
//! consumes something that implements `Model`.

use std::collections::HashMap;

use crate::board::Board;
use crate::error::SearchError;
use crate::game::chess::ChessAdapter;
use crate::game::GameAdapter;
use crate::move_generation::MoveGen;
use crate::piece_types::{BISHOP, BLACK, KING, KNIGHT, PAWN, QUEEN, ROOK, WHITE};

/// Dense policy vector length: `from_square * 64 + to_square`.
pub const POLICY_DIM: usize = 4096;
/// Encoding planes: one binary plane per (piece_type, color).
pub const ENCODING_PLANES: usize = 12;

/// `(priors, value)` produced by evaluating one position. Priors are keyed
/// by UCI string and defined only over the position's legal moves; value is
/// in [0,1] from SideA's (White's) perspective.
#[derive(Clone, Debug)]
pub struct NodeEvaluation {
    pub priors: HashMap<String, f64>,
    pub value: f64,
}

impl NodeEvaluation {
    /// An evaluation with no priors: used both for terminal nodes (no
    /// expansion ever follows) and for a rollout fallback (no policy to
    /// key priors by). A child with no prior falls back to plain UCT in
    /// `select_best_child`.
    pub fn without_priors(value: f64) -> NodeEvaluation {
        NodeEvaluation {
            priors: HashMap::new(),
            value,
        }
    }
}

/// A loaded model exposing a forward pass: a 768-element encoded position in,
/// a 4096-dim policy logit vector and a scalar value out. The weight format
/// and loading mechanics are out of scope; this is the seam the core depends
/// on instead.
pub trait Model {
    fn forward(&self, tensor: &[f32; ENCODING_PLANES * 64]) -> Result<(Vec<f32>, f32), SearchError>;
}

/// Wraps a `Model` to produce `NodeEvaluation`s for chess positions.
pub trait Evaluator<G: GameAdapter> {
    fn evaluate(&self, pos: &G::Position) -> Result<NodeEvaluation, SearchError>;
}

/// Encodes a position into the plane layout this evaluator's models are
/// trained on: plane `6*color + piece_type`, square index identical to
/// `board_utils`' `sq_ind` (a1 = 0, h8 = 63), no vertical flip. Any deviation
/// here silently corrupts policy alignment downstream.
pub fn encode_position(pos: &Board) -> [f32; ENCODING_PLANES * 64] {
    let mut tensor = [0f32; ENCODING_PLANES * 64];
    for color in [WHITE, BLACK] {
        for piece in [PAWN, KNIGHT, BISHOP, ROOK, QUEEN, KING] {
            let plane = 6 * color + piece;
            for sq in crate::bits::bits(&pos.get_piece_bitboard(color, piece)) {
                tensor[plane * 64 + sq] = 1.0;
            }
        }
    }
    tensor
}

/// Builds the priors map for `moves` from the dense policy logit vector,
/// exponentiating and normalizing over exactly the legal moves of the
/// evaluated position (spec step 3/4). Promotions sharing a (from, to) pair
/// naturally receive equal priors since they read the same logit.
pub fn normalize_priors(
    policy_logits: &[f32],
    moves: &[crate::move_types::Move],
) -> HashMap<String, f64> {
    let exp_weights: Vec<f64> = moves
        .iter()
        .map(|mv| {
            let index = mv.from * 64 + mv.to;
            (policy_logits[index] as f64).exp()
        })
        .collect();
    let total: f64 = exp_weights.iter().sum();
    let mut priors = HashMap::with_capacity(moves.len());
    if total > 0.0 {
        for (mv, weight) in moves.iter().zip(exp_weights.iter()) {
            priors.insert(mv.to_uci(), weight / total);
        }
    } else {
        let uniform = 1.0 / moves.len() as f64;
        for mv in moves {
            priors.insert(mv.to_uci(), uniform);
        }
    }
    priors
}

/// Converts a tanh-range value output (assumed side-to-move perspective, per
/// the convention documented in DESIGN.md) into SideA's [0,1] frame.
pub fn side_a_value_from_tanh(value: f32, side_to_move_is_a: bool) -> f64 {
    let v01 = (value as f64 + 1.0) / 2.0;
    if side_to_move_is_a {
        v01
    } else {
        1.0 - v01
    }
}

/// The `Evaluator<ChessAdapter>` used in production: a real loaded `Model`
/// plus the move generator needed to enumerate legal moves for encoding and
/// prior construction.
pub struct NeuralEvaluator<M: Model> {
    model: M,
    move_gen: MoveGen,
}

impl<M: Model> NeuralEvaluator<M> {
    pub fn new(model: M) -> NeuralEvaluator<M> {
        NeuralEvaluator {
            model,
            move_gen: MoveGen::new(),
        }
    }
}

impl<M: Model> Evaluator<ChessAdapter> for NeuralEvaluator<M> {
    fn evaluate(&self, pos: &Board) -> Result<NodeEvaluation, SearchError> {
        let tensor = encode_position(pos);
        let (policy_logits, value) = self.model.forward(&tensor)?;
        if policy_logits.len() != POLICY_DIM {
            return Err(SearchError::Evaluation(format!(
                "model returned policy of length {}, expected {POLICY_DIM}",
                policy_logits.len()
            )));
        }
        let moves = pos.legal_moves(&self.move_gen);
        let priors = normalize_priors(&policy_logits, &moves);
        let value = side_a_value_from_tanh(value, pos.w_to_move);
        Ok(NodeEvaluation { priors, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_types::Move;

    #[test]
    fn encode_position_sets_one_bit_per_piece() {
        let board = Board::new();
        let tensor = encode_position(&board);
        assert_eq!(tensor.iter().filter(|&&b| b != 0.0).count(), 32);
    }

    #[test]
    fn normalize_priors_falls_back_to_uniform_on_zero_sum() {
        let moves = vec![Move::new(8, 16, None), Move::new(9, 17, None)];
        // A very negative logit exponentiates to 0.0 in f64, driving the sum to zero.
        let mut logits = vec![f32::NEG_INFINITY; POLICY_DIM];
        logits[8 * 64 + 16] = f32::NEG_INFINITY;
        logits[9 * 64 + 17] = f32::NEG_INFINITY;
        let priors = normalize_priors(&logits, &moves);
        assert!((priors["a2a3"] - 0.5).abs() < 1e-9);
        assert!((priors["b2b3"] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn side_a_value_from_tanh_flips_for_black_to_move() {
        assert!((side_a_value_from_tanh(0.6, true) - 0.8).abs() < 1e-9);
        assert!((side_a_value_from_tanh(0.6, false) - 0.2).abs() < 1e-9);
    }
}
