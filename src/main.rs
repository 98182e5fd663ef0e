use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use shakmaty::Color;

use shallowblue::engine::Engine;
use shallowblue::play::play;
use shallowblue::types::{EngineConfig, Window, DEFAULT_BOOK_PATH, DEFAULT_DEPTH, WINDOW_BOUND};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Side the engine plays
    #[arg(long, value_enum, default_value_t = Side::White)]
    side: Side,

    /// Fixed search depth in plies
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    depth: u8,

    /// Lower bound of the root search window
    #[arg(long, default_value_t = -WINDOW_BOUND, allow_negative_numbers = true)]
    alpha: i32,

    /// Upper bound of the root search window
    #[arg(long, default_value_t = WINDOW_BOUND, allow_negative_numbers = true)]
    beta: i32,

    /// Start from this FEN instead of the initial position
    #[arg(long)]
    fen: Option<String>,

    /// Polyglot opening book
    #[arg(long, default_value = DEFAULT_BOOK_PATH)]
    book: PathBuf,

    /// Never consult the opening book
    #[arg(long)]
    no_book: bool,

    /// Seed for weighted book choices
    #[arg(long)]
    seed: Option<u64>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn into_config(self) -> EngineConfig {
        EngineConfig {
            side: self.side.into(),
            depth: self.depth,
            window: Window {
                alpha: self.alpha,
                beta: self.beta,
            },
            fen: self.fen,
            book: (!self.no_book).then_some(self.book),
            seed: self.seed,
        }
    }
}

fn main() {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .target(env_logger::Target::Stderr)
        .init();

    let mut engine = match Engine::new(args.into_config()) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if let Err(e) = play(&mut engine, stdin.lock(), &mut stdout) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
