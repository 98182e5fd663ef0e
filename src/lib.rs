pub mod book;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod play;
pub mod position;
pub mod pst;
pub mod search;
pub mod types;
