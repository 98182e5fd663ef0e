use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::debug;
use rand::Rng;
use shakmaty::{Chess, File as BoardFile, Move, Position, Rank, Role, Square};

use crate::error::BookError;
use crate::position::polyglot_key;

const ENTRY_SIZE: u64 = 16;

/// Decoded Polyglot move: from/to squares plus promotion role.
/// Castling is stored as king-takes-own-rook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl BookMove {
    pub fn decode(raw: u16) -> Result<Self, BookError> {
        let square = |file: u16, rank: u16| {
            Square::from_coords(BoardFile::new(u32::from(file)), Rank::new(u32::from(rank)))
        };
        let to = square(raw & 7, (raw >> 3) & 7);
        let from = square((raw >> 6) & 7, (raw >> 9) & 7);
        let promotion = match (raw >> 12) & 7 {
            0 => None,
            1 => Some(Role::Knight),
            2 => Some(Role::Bishop),
            3 => Some(Role::Rook),
            4 => Some(Role::Queen),
            _ => return Err(BookError::UndecodableMove(raw)),
        };
        if from == to {
            return Err(BookError::UndecodableMove(raw));
        }
        Ok(Self { from, to, promotion })
    }

    /// Finds the legal move this book move denotes, if any.
    pub fn to_legal(self, pos: &Chess) -> Option<Move> {
        pos.legal_moves().into_iter().find(|m| match *m {
            Move::Castle { king, rook } => king == self.from && rook == self.to,
            _ => m.from() == Some(self.from) && m.to() == self.to && m.promotion() == self.promotion,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookEntry {
    pub key: u64,
    pub mv: u16,
    pub weight: u16,
    pub learn: u32,
}

impl BookEntry {
    fn from_bytes(buf: &[u8; ENTRY_SIZE as usize]) -> Self {
        Self {
            key: u64::from_be_bytes([buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7]]),
            mv: u16::from_be_bytes([buf[8], buf[9]]),
            weight: u16::from_be_bytes([buf[10], buf[11]]),
            learn: u32::from_be_bytes([buf[12], buf[13], buf[14], buf[15]]),
        }
    }

    pub fn to_bytes(self) -> [u8; ENTRY_SIZE as usize] {
        let mut buf = [0u8; ENTRY_SIZE as usize];
        buf[0..8].copy_from_slice(&self.key.to_be_bytes());
        buf[8..10].copy_from_slice(&self.mv.to_be_bytes());
        buf[10..12].copy_from_slice(&self.weight.to_be_bytes());
        buf[12..16].copy_from_slice(&self.learn.to_be_bytes());
        buf
    }
}

/// Polyglot opening book on disk. The file is opened per lookup and closed on return,
/// so a missing or broken book never leaves state behind.
pub struct OpeningBook {
    path: PathBuf,
}

impl OpeningBook {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// All records stored for `key`, in file order.
    pub fn entries(&self, key: u64) -> Result<Vec<BookEntry>, BookError> {
        let mut file = File::open(&self.path)?;
        let count = file.metadata()?.len() / ENTRY_SIZE;

        // Lower bound: first record whose key is >= `key`
        let (mut lo, mut hi) = (0, count);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if read_entry(&mut file, mid)?.key < key {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        let mut entries = Vec::new();
        for index in lo..count {
            let entry = read_entry(&mut file, index)?;
            if entry.key != key {
                break;
            }
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Picks a book move for `pos` with probability proportional to its weight.
    /// Records with zero weight, an undecodable move or a move illegal in `pos` are
    /// skipped before drawing.
    pub fn weighted_choice<R: Rng + ?Sized>(&self, pos: &Chess, rng: &mut R) -> Result<Option<Move>, BookError> {
        let mut candidates: Vec<(Move, u32)> = Vec::new();
        for entry in self.entries(polyglot_key(pos))? {
            if entry.weight == 0 {
                continue;
            }
            let legal = match BookMove::decode(entry.mv) {
                Ok(book_move) => book_move.to_legal(pos),
                Err(e) => {
                    debug!("skipping book record: {}", e);
                    None
                }
            };
            if let Some(mv) = legal {
                candidates.push((mv, u32::from(entry.weight)));
            }
        }

        let total: u32 = candidates.iter().map(|(_, weight)| weight).sum();
        if total == 0 {
            return Ok(None);
        }

        let choice = rng.gen_range(0..total);
        let mut upto = 0;
        for (mv, weight) in candidates {
            upto += weight;
            if upto > choice {
                return Ok(Some(mv));
            }
        }
        Ok(None)
    }

    /// Book answer for `pos`, or `None` when the book has nothing usable.
    /// Any fault reading the book counts as a miss.
    pub fn lookup<R: Rng + ?Sized>(&self, pos: &Chess, rng: &mut R) -> Option<Move> {
        match self.weighted_choice(pos, rng) {
            Ok(Some(mv)) => Some(mv),
            Ok(None) => {
                debug!("no book entry in {}", self.path.display());
                None
            }
            Err(e) => {
                debug!("book {} unavailable: {}", self.path.display(), e);
                None
            }
        }
    }
}

fn read_entry(file: &mut File, index: u64) -> Result<BookEntry, BookError> {
    let mut buf = [0u8; ENTRY_SIZE as usize];
    file.seek(SeekFrom::Start(index * ENTRY_SIZE))?;
    file.read_exact(&mut buf)?;
    Ok(BookEntry::from_bytes(&buf))
}

/// Polyglot encoding of a from/to move, used to build book fixtures.
#[cfg(test)]
pub(crate) fn encode_move(from: Square, to: Square, promotion: Option<Role>) -> u16 {
    let promo = match promotion {
        None => 0,
        Some(Role::Knight) => 1,
        Some(Role::Bishop) => 2,
        Some(Role::Rook) => 3,
        Some(_) => 4,
    };
    let sq = |s: Square| ((s.rank() as u16) << 3) | s.file() as u16;
    (promo << 12) | (sq(from) << 6) | sq(to)
}
