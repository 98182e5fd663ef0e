use std::io::{BufRead, Write};

use log::debug;
use shakmaty::Outcome;

use crate::engine::Engine;
use crate::error::EngineError;

pub const INVALID_MOVE_MSG: &str = "Not a valid san input/ Move is illegal. Enter a new move";

/// Interactive game: the engine plays its configured side, the opponent's SAN moves
/// are read line by line from `input`. Returns the outcome, or `None` if input ran out first.
pub fn play<R: BufRead, W: Write>(engine: &mut Engine, input: R, out: &mut W) -> Result<Option<Outcome>, EngineError> {
    let mut lines = input.lines();

    while !engine.game().is_game_over() {
        if engine.game().turn() == engine.config().side {
            let result = engine.select_move();
            let Some(mv) = result.best_move else {
                break;
            };
            let uci = engine.game().uci(&mv);
            engine.game_mut().push(&mv);
            writeln!(out, "My Move :  {}", uci)?;
            writeln!(out, "{}", engine.game())?;
        } else {
            write!(out, "Enter your move : ")?;
            out.flush()?;

            let Some(line) = lines.next() else {
                writeln!(out)?;
                return Ok(None);
            };
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            if let Err(e) = engine.game_mut().push_san(&line) {
                debug!("rejected opponent move: {}", e);
                writeln!(out, "{}", INVALID_MOVE_MSG)?;
            }
        }
    }

    writeln!(out, "Good Game !")?;
    let outcome = engine.game().outcome();
    if let Some(outcome) = outcome {
        writeln!(out, "{}", outcome)?;
    }
    Ok(outcome)
}
