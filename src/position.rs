use std::fmt;
use std::ops::{Deref, DerefMut};

use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{
    CastlingMode, Chess, Color, EnPassantMode, File, Move, MoveList, Outcome, Position, Rank,
    Square,
};

use crate::error::EngineError;

const SEVENTYFIVE_MOVE_PLIES: u32 = 150;

struct Undo {
    position: Chess,
    mv: Move,
}

/// Mutable game state: the current position plus everything needed to take moves back.
///
/// Moves pushed with [`Game::push`] must be undone with [`Game::pop`]. Search code uses
/// [`Game::push_scoped`] instead, which undoes the move when the guard is dropped.
pub struct Game {
    position: Chess,
    undo: Vec<Undo>,
    /// Moves below this depth belong to live guards and cannot be popped.
    floor: usize,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Chess::default())
    }
}

impl Game {
    pub fn new(position: Chess) -> Self {
        Self {
            position,
            undo: Vec::new(),
            floor: 0,
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        let parsed: Fen = fen.parse().map_err(|e: shakmaty::fen::ParseFenError| EngineError::Fen {
            fen: fen.to_string(),
            reason: e.to_string(),
        })?;
        let position: Chess =
            parsed
                .into_position(CastlingMode::Standard)
                .map_err(|e| EngineError::Setup {
                    fen: fen.to_string(),
                    reason: e.to_string(),
                })?;
        Ok(Self::new(position))
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn legal_moves(&self) -> MoveList {
        self.position.legal_moves()
    }

    /// Legal captures, en passant included.
    pub fn captures(&self) -> MoveList {
        let mut moves = self.position.legal_moves();
        moves.retain(|m| m.is_capture());
        moves
    }

    /// Checkmate, stalemate, insufficient material, the 75-move rule or fivefold repetition.
    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.position.outcome().or_else(|| {
            (self.is_seventyfive_moves() || self.is_fivefold_repetition()).then_some(Outcome::Draw)
        })
    }

    /// 150 plies without a capture or pawn move.
    pub fn is_seventyfive_moves(&self) -> bool {
        self.position.halfmoves() >= SEVENTYFIVE_MOVE_PLIES
    }

    /// The current position has occurred five times. Only positions since the last
    /// capture or pawn move can repeat it.
    pub fn is_fivefold_repetition(&self) -> bool {
        let key = self.zobrist();
        let window = self.position.halfmoves() as usize;
        let repeats = self
            .undo
            .iter()
            .rev()
            .take(window)
            .filter(|u| polyglot_key(&u.position) == key)
            .count();
        repeats + 1 >= 5
    }

    /// Number of moves currently on the undo stack.
    pub fn ply(&self) -> usize {
        self.undo.len()
    }

    /// Moves played since construction, oldest first.
    pub fn moves(&self) -> impl Iterator<Item = &Move> {
        self.undo.iter().map(|u| &u.mv)
    }

    /// Play a move the caller knows to be legal in the current position.
    pub fn push(&mut self, mv: &Move) {
        self.undo.push(Undo {
            position: self.position.clone(),
            mv: mv.clone(),
        });
        self.position.play_unchecked(mv);
    }

    /// Take back the last pushed move. Returns `None` on an empty stack, or when the
    /// last move is held by a [`MoveGuard`].
    pub fn pop(&mut self) -> Option<Move> {
        if self.undo.len() <= self.floor {
            return None;
        }
        let undo = self.undo.pop()?;
        self.position = undo.position;
        Some(undo.mv)
    }

    /// Push a move for the lifetime of the returned guard.
    pub fn push_scoped(&mut self, mv: &Move) -> MoveGuard<'_> {
        let ply = self.ply();
        let floor = self.floor;
        self.push(mv);
        self.floor = ply + 1;
        MoveGuard { game: self, ply, floor }
    }

    /// Restore the position as it was when the undo stack held `ply` moves.
    fn unwind_to(&mut self, ply: usize) {
        if ply < self.undo.len() {
            let undo = self.undo.swap_remove(ply);
            self.position = undo.position;
            self.undo.truncate(ply);
        }
    }

    /// Parse SAN against the current position without playing it.
    pub fn parse_san(&self, input: &str) -> Result<Move, EngineError> {
        let san: SanPlus = input.trim().parse().map_err(|e: shakmaty::san::ParseSanError| {
            EngineError::MoveSyntax {
                input: input.to_string(),
                reason: e.to_string(),
            }
        })?;
        san.san
            .to_move(&self.position)
            .map_err(|e| EngineError::IllegalMove {
                input: input.to_string(),
                reason: e.to_string(),
            })
    }

    /// Parse and play an externally supplied SAN move. The position is untouched on error.
    pub fn push_san(&mut self, input: &str) -> Result<Move, EngineError> {
        let mv = self.parse_san(input)?;
        self.push(&mv);
        Ok(mv)
    }

    pub fn san(&self, mv: &Move) -> String {
        San::from_move(&self.position, mv).to_string()
    }

    pub fn uci(&self, mv: &Move) -> String {
        mv.to_uci(CastlingMode::Standard).to_string()
    }

    pub fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    /// Polyglot-compatible Zobrist key of the current position.
    pub fn zobrist(&self) -> u64 {
        polyglot_key(&self.position)
    }
}

pub fn polyglot_key(position: &Chess) -> u64 {
    position.zobrist_hash::<Zobrist64>(EnPassantMode::Legal).0
}

/// Board diagram, rank 8 first, `.` for empty squares.
impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = self.position.board();
        for (i, rank) in Rank::ALL.iter().rev().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, file) in File::ALL.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                let sq = Square::from_coords(*file, *rank);
                match board.piece_at(sq) {
                    Some(piece) => write!(f, "{}", piece.char())?,
                    None => write!(f, ".")?,
                }
            }
        }
        Ok(())
    }
}

/// A move pushed onto a [`Game`]; dropping the guard restores the position from before
/// the push on every exit path. Moves pushed through the guard are unwound with it, and
/// the guarded move itself cannot be popped through it.
pub struct MoveGuard<'a> {
    game: &'a mut Game,
    ply: usize,
    floor: usize,
}

impl Deref for MoveGuard<'_> {
    type Target = Game;

    fn deref(&self) -> &Game {
        self.game
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Game {
        self.game
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        self.game.unwind_to(self.ply);
        self.game.floor = self.floor;
    }
}
