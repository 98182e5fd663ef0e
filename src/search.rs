use log::{debug, trace};
use shakmaty::Move;

use crate::evaluation::evaluate;
use crate::position::Game;
use crate::types::{MoveSource, Score, SearchResult, Window, MATE_SCORE, NO_MOVE_SCORE};

/// Mutable search state shared across recursion
#[derive(Default)]
pub struct SearchState {
    pub nodes: u64,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.nodes = 0;
    }
}

/// Fixed-depth root search. Returns the first move with the highest score,
/// or no move when the side to move has none.
pub fn search(game: &mut Game, state: &mut SearchState, depth: u8, window: Window) -> SearchResult {
    let mut best_move: Option<Move> = None;
    let mut best_value = NO_MOVE_SCORE;
    let mut alpha = window.alpha;
    let beta = window.beta;

    for mv in game.legal_moves() {
        let value = {
            let mut child = game.push_scoped(&mv);
            -alpha_beta(&mut child, state, -beta, -alpha, depth.saturating_sub(1))
        };
        trace!("root {} -> {}", game.uci(&mv), value);

        if value > best_value {
            best_value = value;
            best_move = Some(mv);
        }
        if value > alpha {
            alpha = value;
        }
    }

    if best_move.is_none() {
        // Game already decided; report the terminal score
        best_value = evaluate(game.position());
    }

    debug!(
        "search depth {} score {} nodes {} best {}",
        depth,
        best_value,
        state.nodes,
        best_move.as_ref().map_or_else(|| "0000".to_string(), |m| game.uci(m))
    );

    SearchResult {
        best_move,
        score: best_value,
        depth,
        nodes: state.nodes,
        source: MoveSource::Search,
    }
}

/// Negamax with alpha-beta pruning (fail-hard at the cutoff, best score otherwise).
pub fn alpha_beta(game: &mut Game, state: &mut SearchState, mut alpha: Score, beta: Score, depth_left: u8) -> Score {
    // Leaf node: switch to quiescence search
    if depth_left == 0 {
        return quiescence(game, state, alpha, beta);
    }

    state.nodes += 1;

    let moves = game.legal_moves();

    // Checkmate or stalemate: score it like the evaluator does, not as a loss
    if moves.is_empty() {
        return evaluate(game.position());
    }

    let mut best_score = -MATE_SCORE;

    for mv in &moves {
        let score = {
            let mut child = game.push_scoped(mv);
            -alpha_beta(&mut child, state, -beta, -alpha, depth_left - 1)
        };

        // Beta cutoff
        if score >= beta {
            return score;
        }
        if score > best_score {
            best_score = score;
        }
        if score > alpha {
            alpha = score;
        }
    }

    best_score
}

/// Quiescence search — explores captures only, standing pat on the static evaluation.
pub fn quiescence(game: &mut Game, state: &mut SearchState, mut alpha: Score, beta: Score) -> Score {
    state.nodes += 1;

    let stand_pat = evaluate(game.position());
    if stand_pat >= beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    for mv in &game.captures() {
        let score = {
            let mut child = game.push_scoped(mv);
            -quiescence(&mut child, state, -beta, -alpha)
        };

        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DRAW_SCORE;

    const SCHOLARS_MATE: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
    const BACK_RANK: &str = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1";
    const FOOLS_MATE: &str = "rnb1kbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
    const STALEMATE: &str = "k7/2Q5/1K6/8/8/8/8/8 b - - 0 1";
    const QUIET: &str = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1";
    // Black queen on d5 hangs to the e4 pawn
    const HANGING_QUEEN: &str = "4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1";

    fn game(fen: &str) -> Game {
        Game::from_fen(fen).unwrap()
    }

    #[test]
    fn test_search_finds_move() {
        let mut g = Game::default();
        let mut state = SearchState::new();
        let result = search(&mut g, &mut state, 2, Window::default());
        assert!(result.best_move.is_some());
        assert!(result.nodes > 0);
        assert_eq!(result.source, MoveSource::Search);
    }

    #[test]
    fn test_search_finds_mate_in_one() {
        for depth in 1..=2 {
            let mut g = game(SCHOLARS_MATE);
            let mut state = SearchState::new();
            let result = search(&mut g, &mut state, depth, Window::default());
            let best = result.best_move.unwrap();
            assert_eq!(g.uci(&best), "h5f7", "Expected Qxf7# at depth {}", depth);
            assert_eq!(result.score, MATE_SCORE);
        }
    }

    #[test]
    fn test_back_rank_mate_at_depth_three() {
        let mut g = game(BACK_RANK);
        let mut state = SearchState::new();
        let result = search(&mut g, &mut state, 3, Window::default());
        let best = result.best_move.unwrap();
        assert_eq!(g.uci(&best), "a1a8");
        assert_eq!(result.score, MATE_SCORE);
    }

    #[test]
    fn test_checkmate_score() {
        let mut g = game(FOOLS_MATE);
        let mut state = SearchState::new();
        let score = alpha_beta(&mut g, &mut state, -100_000, 100_000, 2);
        assert_eq!(score, -MATE_SCORE);
    }

    #[test]
    fn test_interior_stalemate_scores_draw() {
        let mut g = game(STALEMATE);
        let mut state = SearchState::new();
        for depth in 0..=3 {
            assert_eq!(alpha_beta(&mut g, &mut state, -100_000, 100_000, depth), DRAW_SCORE);
        }
    }

    #[test]
    fn test_no_moves_returns_null_move() {
        let mut g = game(STALEMATE);
        let mut state = SearchState::new();
        let result = search(&mut g, &mut state, 3, Window::default());
        assert!(result.best_move.is_none());
        assert_eq!(result.score, DRAW_SCORE);
    }

    #[test]
    fn test_quiescence_without_captures_is_static_eval() {
        let mut g = game(QUIET);
        let mut state = SearchState::new();
        let expected = evaluate(g.position());
        assert!(g.captures().is_empty());
        assert_eq!(quiescence(&mut g, &mut state, -100_000, 100_000), expected);
    }

    #[test]
    fn test_quiescence_fails_high_to_beta() {
        let mut g = game(QUIET);
        let mut state = SearchState::new();
        let stand_pat = evaluate(g.position());
        assert_eq!(quiescence(&mut g, &mut state, stand_pat - 50, stand_pat - 10), stand_pat - 10);
    }

    #[test]
    fn test_quiescence_resolves_hanging_queen() {
        let mut g = game(HANGING_QUEEN);
        let mut state = SearchState::new();
        let stand_pat = evaluate(g.position());
        let score = quiescence(&mut g, &mut state, -100_000, 100_000);
        assert!(stand_pat < 0, "Black is up a queen statically, got {}", stand_pat);
        assert!(score > 0, "exd5 should win the queen back, got {}", score);
    }

    #[test]
    fn test_depth_zero_is_quiescence() {
        for fen in [HANGING_QUEEN, SCHOLARS_MATE, QUIET] {
            let mut g = game(fen);
            let mut state = SearchState::new();
            let q = quiescence(&mut g, &mut state, -500, 500);
            let ab = alpha_beta(&mut g, &mut state, -500, 500, 0);
            assert_eq!(q, ab, "{}", fen);
        }
    }

    #[test]
    fn test_search_restores_position() {
        let mut g = game("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let fen_before = g.fen();
        let key_before = g.zobrist();
        let mut state = SearchState::new();
        search(&mut g, &mut state, 2, Window::default());
        assert_eq!(g.fen(), fen_before);
        assert_eq!(g.zobrist(), key_before);
        assert_eq!(g.ply(), 0);
    }

    #[test]
    fn test_search_is_deterministic() {
        let mut g = game("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4");
        let mut state = SearchState::new();
        let first = search(&mut g, &mut state, 2, Window::default());
        state.reset();
        let second = search(&mut g, &mut state, 2, Window::default());
        assert_eq!(first.best_move, second.best_move);
        assert_eq!(first.score, second.score);
        assert_eq!(first.nodes, second.nodes);
    }

    #[test]
    fn test_best_move_is_legal() {
        let mut g = game("2r3k1/1q3ppp/p3p3/1p1n4/3P4/1B3N2/PP3PPP/2RQ2K1 w - - 3 24");
        let mut state = SearchState::new();
        let result = search(&mut g, &mut state, 2, Window::default());
        let best = result.best_move.unwrap();
        assert!(g.legal_moves().contains(&best));
    }
}
