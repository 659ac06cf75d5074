//! # Imaginarium CLI
//!
//! A line-oriented command loop over one [`OntologyContext`]. Each line is
//! a declaration or a command; output goes to the writer and errors are
//! reported without ending the session.
//!
//! ```bash
//! cargo run --bin imaginarium -- --seed 7 --definitions worlds/
//! ```

use std::io::{BufRead, Write};

use imaginarium::OntologyContext;

pub mod cli;

/// Prompt, read and execute until the input runs out or `quit`.
pub fn run(
    context: &mut OntologyContext,
    input: impl BufRead,
    mut output: impl Write,
    prompt: bool,
) -> std::io::Result<()> {
    let mut lines = input.lines();
    loop {
        if prompt {
            write!(output, "> ")?;
            output.flush()?;
        }
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let line = line.trim();
        if matches!(line, "quit" | "exit") {
            break;
        }
        if !prompt && !line.is_empty() {
            writeln!(output, "> {line}")?;
        }
        match context.execute(line) {
            Ok(result) => {
                let text = result.to_string();
                if !text.is_empty() {
                    writeln!(output, "{text}")?;
                }
            }
            Err(error) => writeln!(output, "error: {error}")?,
        }
    }
    Ok(())
}
