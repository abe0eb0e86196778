//! Line-oriented interactive session: one analysis per input line.

use std::io::{BufRead, Write};

use stresslens_ai::Pipeline;
use stresslens_core::is_blank;
use tracing::debug;

use crate::display;
use crate::history::SessionHistory;

pub const EMPTY_INPUT_WARNING: &str = "Please enter some text to analyze!";

const HELP: &str = "\
Type some text and press enter to analyze it.
  :history   show the last 10 analyses
  :help      show this message
  :quit      end the session";

/// Analyse each line from `input` until EOF or `:quit`.
pub fn run<R: BufRead, W: Write>(
    pipeline: &Pipeline,
    input: R,
    out: &mut W,
) -> anyhow::Result<SessionHistory> {
    let mut history = SessionHistory::new();
    writeln!(out, "{HELP}")?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;
        if is_blank(&line) {
            writeln!(out, "{EMPTY_INPUT_WARNING}")?;
            continue;
        }

        match line.trim() {
            ":quit" | ":q" => break,
            ":help" => writeln!(out, "{HELP}")?,
            ":history" => display::write_history(out, &history)?,
            _ => {
                let results = pipeline.predict(&line)?;
                display::write_results(out, &results)?;
                history.record(&line, results);
            }
        }
    }

    debug!(analyses = history.len(), "session ended");
    Ok(history)
}
