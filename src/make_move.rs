//! Applying a move to a board to produce the resulting position.

use crate::board::Board;
use crate::board_utils::sq_ind_to_bit;
use crate::move_types::Move;
use crate::piece_types::{BLACK, KING, PAWN, ROOK, WHITE};

/// Applies `mv` to `board`, returning the resulting position. Does not
/// validate legality - the caller is expected to generate `mv` from
/// `MoveGen::gen_pseudo_legal_moves` and filter with `Board::is_legal`
/// afterwards.
pub fn apply_move(board: &Board, mv: Move) -> Board {
    let mut new_board = board.clone();
    let color = board.side_to_move();
    let enemy = 1 - color;

    let (from_piece_color, from_piece_type) = board
        .get_piece(mv.from)
        .expect("apply_move called with no piece on the origin square");
    debug_assert_eq!(from_piece_color, color, "apply_move: origin piece belongs to the side not to move");

    new_board.halfmove_clock = board.halfmove_clock + 1;

    if let Some((_, captured_type)) = board.get_piece(mv.to) {
        new_board.pieces[enemy][captured_type] &= !sq_ind_to_bit(mv.to);
        new_board.halfmove_clock = 0;
        if captured_type == ROOK {
            revoke_castling_rights_for_rook_square(&mut new_board, mv.to);
        }
    }

    let previous_en_passant = board.en_passant;
    new_board.en_passant = None;

    if from_piece_type == PAWN {
        new_board.halfmove_clock = 0;
        let distance = mv.to as i32 - mv.from as i32;
        if distance.abs() == 16 {
            new_board.en_passant = Some(((mv.from as i32 + mv.to as i32) / 2) as u8);
        } else if Some(mv.to as u8) == previous_en_passant {
            let captured_sq = if color == WHITE { mv.to - 8 } else { mv.to + 8 };
            new_board.pieces[enemy][PAWN] &= !sq_ind_to_bit(captured_sq);
        }
    }

    new_board.pieces[color][from_piece_type] &= !sq_ind_to_bit(mv.from);
    match mv.promotion {
        Some(promoted_to) => new_board.pieces[color][promoted_to] |= sq_ind_to_bit(mv.to),
        None => new_board.pieces[color][from_piece_type] |= sq_ind_to_bit(mv.to),
    }

    if from_piece_type == KING {
        if color == WHITE {
            new_board.castling_rights.white_kingside = false;
            new_board.castling_rights.white_queenside = false;
            if mv.from == 4 && mv.to == 6 {
                new_board.pieces[WHITE][ROOK] &= !sq_ind_to_bit(7);
                new_board.pieces[WHITE][ROOK] |= sq_ind_to_bit(5);
            } else if mv.from == 4 && mv.to == 2 {
                new_board.pieces[WHITE][ROOK] &= !sq_ind_to_bit(0);
                new_board.pieces[WHITE][ROOK] |= sq_ind_to_bit(3);
            }
        } else {
            new_board.castling_rights.black_kingside = false;
            new_board.castling_rights.black_queenside = false;
            if mv.from == 60 && mv.to == 62 {
                new_board.pieces[BLACK][ROOK] &= !sq_ind_to_bit(63);
                new_board.pieces[BLACK][ROOK] |= sq_ind_to_bit(61);
            } else if mv.from == 60 && mv.to == 58 {
                new_board.pieces[BLACK][ROOK] &= !sq_ind_to_bit(56);
                new_board.pieces[BLACK][ROOK] |= sq_ind_to_bit(59);
            }
        }
    } else if from_piece_type == ROOK {
        revoke_castling_rights_for_rook_square(&mut new_board, mv.from);
    }

    new_board.w_to_move = !board.w_to_move;
    if color == BLACK {
        new_board.fullmove_number = board.fullmove_number + 1;
    }
    new_board.update_occupancy();
    new_board
}

fn revoke_castling_rights_for_rook_square(board: &mut Board, sq_ind: usize) {
    match sq_ind {
        0 => board.castling_rights.white_queenside = false,
        7 => board.castling_rights.white_kingside = false,
        56 => board.castling_rights.black_queenside = false,
        63 => board.castling_rights.black_kingside = false,
        _ => {}
    }
}
