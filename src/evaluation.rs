use shakmaty::{Chess, Color, Position, Role};

use crate::pst;
use crate::types::{Score, DRAW_SCORE, EVAL_LIMIT, MATE_SCORE};

/// Evaluates a position using material counts and piece-square tables.
/// Returns score from perspective of side to move
pub fn evaluate(pos: &Chess) -> Score {
    // Terminal states dominate whatever material is left
    if pos.is_checkmate() {
        return -MATE_SCORE;
    }
    if pos.is_stalemate() || pos.is_insufficient_material() {
        return DRAW_SCORE;
    }

    let score = clamp_eval(material(pos) + positional(pos));

    if pos.turn() == Color::White {
        score
    } else {
        -score
    }
}

/// Material balance relative to White.
pub fn material(pos: &Chess) -> Score {
    let board = pos.board();
    Role::ALL
        .iter()
        .map(|&role| {
            let pieces = board.by_role(role);
            let white = (pieces & board.by_color(Color::White)).count() as Score;
            let black = (pieces & board.by_color(Color::Black)).count() as Score;
            (white - black) * pst::piece_value(role)
        })
        .sum()
}

/// Piece-square bonus relative to White, king included.
pub fn positional(pos: &Chess) -> Score {
    let board = pos.board();
    let mut score = 0;
    for role in Role::ALL {
        let table = pst::table(role);
        let pieces = board.by_role(role);
        for sq in pieces & board.by_color(Color::White) {
            score += table[sq as usize];
        }
        for sq in pieces & board.by_color(Color::Black) {
            score -= table[sq.flip_vertical() as usize];
        }
    }
    score
}

/// Keeps static scores strictly inside the mate sentinel.
pub fn clamp_eval(score: Score) -> Score {
    score.clamp(-EVAL_LIMIT, EVAL_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Game;

    fn eval_fen(fen: &str) -> Score {
        evaluate(Game::from_fen(fen).unwrap().position())
    }

    /// Colour-reverse a FEN without castling or en passant: flip ranks, swap case and side.
    fn mirror_fen(fen: &str) -> String {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        let placement: Vec<String> = fields[0]
            .split('/')
            .rev()
            .map(|rank| {
                rank.chars()
                    .map(|c| {
                        if c.is_ascii_uppercase() {
                            c.to_ascii_lowercase()
                        } else {
                            c.to_ascii_uppercase()
                        }
                    })
                    .collect()
            })
            .collect();
        let side = if fields[1] == "w" { "b" } else { "w" };
        format!("{} {} - - {} {}", placement.join("/"), side, fields[4], fields[5])
    }

    #[test]
    fn test_startpos_is_zero() {
        assert_eq!(evaluate(Game::default().position()), 0);
    }

    #[test]
    fn test_white_up_queen() {
        let score = eval_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert!(score > 800, "White up a queen should score high, got {}", score);
    }

    #[test]
    fn test_black_to_move_sees_negated_score() {
        let white = eval_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        let black = eval_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1");
        assert_eq!(black, -white);
    }

    #[test]
    fn test_colour_symmetry() {
        let fens = [
            "r1bq1rk1/pp2ppbp/2np2p1/2n5/P3PP2/N1P2N2/1PB3PP/R1B1QRK1 b - - 0 10",
            "8/5k2/8/8/8/8/4K3/4R3 w - - 0 1",
            "2r3k1/1q3ppp/p3p3/1p1n4/3P4/1B3N2/PP3PPP/2RQ2K1 w - - 3 24",
        ];
        for fen in fens {
            let mirrored = mirror_fen(fen);
            assert_eq!(eval_fen(fen), eval_fen(&mirrored), "{} vs {}", fen, mirrored);
        }
    }

    #[test]
    fn test_checkmate_is_loss_for_mover() {
        // Fool's mate, White to move and mated
        assert_eq!(eval_fen("rnb1kbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"), -MATE_SCORE);
        // Back-rank mate, Black to move and mated
        assert_eq!(eval_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 1 1"), -MATE_SCORE);
    }

    #[test]
    fn test_stalemate_and_bare_kings_are_draws() {
        assert_eq!(eval_fen("k7/2Q5/1K6/8/8/8/8/8 b - - 0 1"), DRAW_SCORE);
        assert_eq!(eval_fen("8/8/4k3/8/8/3K4/8/8 w - - 0 1"), DRAW_SCORE);
        assert_eq!(eval_fen("8/8/4k3/8/8/3KN3/8/8 w - - 0 1"), DRAW_SCORE);
    }

    #[test]
    fn test_lone_pawn_material_and_table() {
        // e2 pawn: 100 material, -20 from the pawn table; kings cancel on e1/e8
        let score = eval_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        assert_eq!(score, 80);
    }

    #[test]
    fn test_clamp_stays_below_mate() {
        assert_eq!(clamp_eval(12_345), EVAL_LIMIT);
        assert_eq!(clamp_eval(-12_345), -EVAL_LIMIT);
        assert_eq!(clamp_eval(250), 250);
    }
}
