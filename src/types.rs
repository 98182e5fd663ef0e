use std::path::PathBuf;

use shakmaty::{Color, Move};

use crate::error::EngineError;

pub type Score = i32;

/// Score of a checkmated side to move. No static evaluation reaches it.
pub const MATE_SCORE: Score = 9_999;
/// Largest magnitude a non-terminal evaluation may take.
pub const EVAL_LIMIT: Score = MATE_SCORE - 1;
pub const DRAW_SCORE: Score = 0;
/// Root "nothing found yet" value, below every reachable score.
pub const NO_MOVE_SCORE: Score = -99_999;
/// Default root window bound, wide enough never to clip a real score.
pub const WINDOW_BOUND: Score = 100_000;

pub const DEFAULT_DEPTH: u8 = 3;
pub const DEFAULT_BOOK_PATH: &str = "bookfish.bin";

/// Alpha-beta bounds handed to the root search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub alpha: Score,
    pub beta: Score,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            alpha: -WINDOW_BOUND,
            beta: WINDOW_BOUND,
        }
    }
}

pub struct EngineConfig {
    /// Side the engine plays in the interactive loop.
    pub side: Color,
    pub depth: u8,
    pub window: Window,
    /// Starting position; `None` is the standard initial layout.
    pub fen: Option<String>,
    /// Polyglot book consulted before searching; `None` disables it.
    pub book: Option<PathBuf>,
    /// Seed for weighted book choices; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            side: Color::White,
            depth: DEFAULT_DEPTH,
            window: Window::default(),
            fen: None,
            book: Some(PathBuf::from(DEFAULT_BOOK_PATH)),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.depth == 0 {
            return Err(EngineError::Config("search depth must be at least 1".to_string()));
        }
        // Bounds are negated at every ply
        for bound in [self.window.alpha, self.window.beta] {
            if bound.checked_neg().is_none() {
                return Err(EngineError::Config(format!("window bound {} cannot be negated", bound)));
            }
        }
        if self.window.alpha >= self.window.beta {
            return Err(EngineError::Config(format!(
                "alpha ({}) must be below beta ({})",
                self.window.alpha, self.window.beta
            )));
        }
        Ok(())
    }
}

/// Where a selected move came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveSource {
    Book,
    Search,
}

#[derive(Clone, Debug)]
pub struct SearchResult {
    /// `None` when the side to move has no legal moves.
    pub best_move: Option<Move>,
    pub score: Score,
    pub depth: u8,
    pub nodes: u64,
    pub source: MoveSource,
}
