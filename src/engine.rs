use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::book::OpeningBook;
use crate::error::EngineError;
use crate::evaluation::evaluate;
use crate::position::Game;
use crate::search::{self, SearchState};
use crate::types::{EngineConfig, MoveSource, SearchResult};

/// Owns the game and everything the move selector needs between turns.
pub struct Engine {
    game: Game,
    config: EngineConfig,
    book: Option<OpeningBook>,
    rng: StdRng,
    state: SearchState,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let game = match &config.fen {
            Some(fen) => Game::from_fen(fen)?,
            None => Game::default(),
        };
        let book = config.book.as_ref().map(OpeningBook::new);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            game,
            config,
            book,
            rng,
            state: SearchState::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    /// Chooses a move for the side to move at the configured depth.
    pub fn select_move(&mut self) -> SearchResult {
        self.select_move_at(self.config.depth)
    }

    /// Opening book first; otherwise a full fixed-depth search.
    /// The position is unchanged on return.
    pub fn select_move_at(&mut self, depth: u8) -> SearchResult {
        if let Some(book) = &self.book {
            if let Some(mv) = book.lookup(self.game.position(), &mut self.rng) {
                info!("book move {}", self.game.uci(&mv));
                return SearchResult {
                    best_move: Some(mv),
                    score: evaluate(self.game.position()),
                    depth: 0,
                    nodes: 0,
                    source: MoveSource::Book,
                };
            }
        }

        info!("Thinking.....");
        self.state.reset();
        let result = search::search(&mut self.game, &mut self.state, depth, self.config.window);
        info!(
            "depth {} score {} nodes {}",
            result.depth, result.score, result.nodes
        );
        result
    }
}
