//! fermat — a small statically typed, JIT-compiled expression language.
//!
//! With no argument, reads standard input: a rustyline-backed REPL at a
//! terminal, plain batch parsing when piped. With a path argument, runs the
//! file in batch mode (no prompts, no value echo).

use std::fs::File;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use inkwell::context::Context;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use fermat_codegen::Driver;
use fermat_core::Source;

#[derive(Parser)]
#[command(name = "fermat", version, about = "A small JIT-compiled expression language")]
struct Cli {
    /// Source file to run; reads standard input when omitted.
    path: Option<PathBuf>,
}

/// Feeds the byte-oriented lexer from a line editor. The lexer pulls bytes
/// whenever it needs the next token, so the prompt appears exactly when
/// more input is required.
struct ReplInput {
    editor: DefaultEditor,
    buffer: Vec<u8>,
    cursor: usize,
}

impl ReplInput {
    fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
            buffer: Vec::new(),
            cursor: 0,
        })
    }
}

impl Read for ReplInput {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        while self.cursor >= self.buffer.len() {
            match self.editor.readline("ready> ") {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());
                    self.buffer = line.into_bytes();
                    self.buffer.push(b'\n');
                    self.cursor = 0;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => return Ok(0),
                Err(err) => return Err(io::Error::other(err)),
            }
        }
        let n = out.len().min(self.buffer.len() - self.cursor);
        out[..n].copy_from_slice(&self.buffer[self.cursor..self.cursor + n]);
        self.cursor += n;
        Ok(n)
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let (source, interactive, echo_values) = match &cli.path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("could not open file {}", path.display()))?;
            (Source::from_file(file, path.clone()), false, false)
        }
        None if io::stdin().is_terminal() => {
            let input = ReplInput::new().context("could not initialize the line editor")?;
            (Source::new(Box::new(input), "."), true, true)
        }
        None => (Source::new(Box::new(io::stdin()), "."), false, true),
    };

    let context = Context::create();
    let mut driver =
        Driver::new(&context, source, interactive, echo_values).context("could not start JIT")?;
    driver.run();
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
