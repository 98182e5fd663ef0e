use std::io;

/// Errors surfaced to the driver: bad setup, bad configuration, rejected input.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("invalid FEN {fen:?}: {reason}")]
    Fen { fen: String, reason: String },

    #[error("illegal starting position {fen:?}: {reason}")]
    Setup { fen: String, reason: String },

    /// Input is not SAN at all.
    #[error("cannot parse move {input:?}: {reason}")]
    MoveSyntax { input: String, reason: String },

    /// Well-formed SAN that is not legal in the current position.
    #[error("illegal move {input:?}: {reason}")]
    IllegalMove { input: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Opening book faults. Never fatal: the selector falls back to searching.
#[derive(thiserror::Error, Debug)]
pub enum BookError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("undecodable book move {0:#06x}")]
    UndecodableMove(u16),
}
