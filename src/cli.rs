//! Command-line entry points: `run <file>`, `repl`, and `tape <file>`.
//!
//! This module is the CLI-facing shell around the interpreter core — parsing
//! arguments, opening files, and wiring trace output to a colorized stdout.
//! None of the language semantics live here; every subcommand bottoms out in
//! [`crate::repl::run`] or a handful of constructor calls that replay what
//! the reader's own sugar already does.

use std::io::{self, Read as _, Write as _};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::arena::{Arena, NIL};
use crate::error::{AitError, AitResult};
use crate::eval::{self, EvalState};
use crate::printer;
use crate::reader::Reader;
use crate::symbols::Symbols;
use crate::tape;

#[derive(Debug, Parser)]
#[command(
    name = "aitlisp",
    version,
    about = "A minimalist LISP for algorithmic-information-theory experiments."
)]
pub struct AitArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read a whole script file and evaluate it top to bottom, printing the
    /// same expression/value trace lines the reference interpreter does.
    Run {
        /// The script file to run.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Interactive read-eval-print loop over stdin.
    Repl,
    /// Feed a literal tape file to a `run-utm-on`-style evaluation, without
    /// the program needing to build the tape itself with `bits`.
    Tape {
        /// The tape file: text whose bytes become the bit stream `read-exp`
        /// parses as one record.
        #[arg(required = true)]
        file: PathBuf,
    },
}

/// Parses `std::env::args`, dispatches, and exits the process with status 1
/// printing a `miette` diagnostic on failure.
pub fn run() {
    let args = AitArgs::parse();

    let result = match &args.command {
        Command::Run { file } => handle_run(file),
        Command::Repl => handle_repl(),
        Command::Tape { file } => handle_tape(file),
    };

    if let Err(err) = result {
        print_error(err);
        std::process::exit(1);
    }
}

/// Prints an [`AitError`] with full miette diagnostics: source spans, help
/// text, and error codes where the variant carries them.
fn print_error(error: AitError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}

/// Writes one trace line to stdout, colorized by its label. Opens a fresh
/// `StandardStream` per call rather than threading one through, matching the
/// teacher's own `print_result`/`set_output_color` style of grabbing stdout
/// locally wherever output happens.
fn print_line(line: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let color = if line.starts_with("value") {
        Some(Color::Green)
    } else if line.starts_with("expression") {
        Some(Color::Cyan)
    } else if line.starts_with("define") {
        Some(Color::Yellow)
    } else {
        None
    };
    if let Some(color) = color {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)));
    }
    let _ = write!(stdout, "{line}");
    let _ = stdout.reset();
}

fn read_file_to_string(path: &Path) -> AitResult<String> {
    std::fs::read_to_string(path).map_err(|source| AitError::io(path.display().to_string(), source))
}

/// Handles the `run` subcommand: drives the ordinary REPL loop over a file's
/// contents instead of stdin.
fn handle_run(path: &Path) -> AitResult<()> {
    let source = read_file_to_string(path)?;
    let mut arena = Arena::new();
    let symbols = Symbols::install(&mut arena);
    let mut reader = Reader::new(source.as_bytes());
    let mut state = EvalState::new(Box::new(print_line));
    crate::repl::run(&mut arena, &symbols, &mut reader, &mut state, print_line)
}

/// Handles the `repl` subcommand: the same loop, reading stdin to EOF first
/// since [`Reader`] borrows a byte slice rather than streaming interactively.
fn handle_repl() -> AitResult<()> {
    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .map_err(|source| AitError::io("<stdin>", source))?;
    let mut arena = Arena::new();
    let symbols = Symbols::install(&mut arena);
    let mut reader = Reader::new(source.as_bytes());
    let mut state = EvalState::new(Box::new(print_line));
    crate::repl::run(&mut arena, &symbols, &mut reader, &mut state, print_line)
}

/// Handles the `tape` subcommand: builds the same `(car (cdr (try
/// no-time-limit '(eval (read-exp)) <tape>)))` expression the reader builds
/// for `run-utm-on`, with `<tape>` being the literal file content encoded as
/// a bit stream instead of a parsed sub-expression.
fn handle_tape(path: &Path) -> AitResult<()> {
    let bytes = std::fs::read(path).map_err(|source| AitError::io(path.display().to_string(), source))?;
    let mut arena = Arena::new();
    let symbols = Symbols::install(&mut arena);
    let tape_bits = tape::bits_from_bytes(&mut arena, &symbols, &bytes);
    // `try`'s third operand is evaluated like any other argument, so a bit
    // list built in Rust (rather than produced by a primitive call like
    // `bits`) needs an explicit `quote` — otherwise `eval` would read the
    // list itself as a nested call and collapse it to its first bit.
    let tape_bits_nil = arena.cons(tape_bits, NIL);
    let quoted_tape = arena.cons(symbols.quote, tape_bits_nil);

    let read_exp_call = arena.cons(symbols.read_exp, NIL);
    let read_exp_call_nil = arena.cons(read_exp_call, NIL);
    let eval_call = arena.cons(symbols.eval_, read_exp_call_nil);
    let eval_call_nil = arena.cons(eval_call, NIL);
    let quoted = arena.cons(symbols.quote, eval_call_nil);
    let quoted_tape_nil = arena.cons(quoted_tape, NIL);
    let quoted_quoted_tape_nil = arena.cons(quoted, quoted_tape_nil);
    let no_time_limit_args = arena.cons(symbols.no_time_limit, quoted_quoted_tape_nil);
    let try_expr = arena.cons(symbols.try_, no_time_limit_args);
    let try_expr_nil = arena.cons(try_expr, NIL);
    let cdr_expr = arena.cons(symbols.cdr, try_expr_nil);
    let cdr_expr_nil = arena.cons(cdr_expr, NIL);
    let expr = arena.cons(symbols.car, cdr_expr_nil);

    let mut state = EvalState::new(Box::new(print_line));
    let value = match eval::eval_top(&mut arena, &symbols, &mut state, expr) {
        Ok(v) => v,
        Err(err) => err,
    };
    print_line(&printer::render_trace_line(&arena, "value", value));
    print_line("\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_parses_run_with_a_file_argument() {
        let args = AitArgs::parse_from(["aitlisp", "run", "script.l"]);
        match args.command {
            Command::Run { file } => assert_eq!(file, PathBuf::from("script.l")),
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn command_parses_repl_with_no_arguments() {
        let args = AitArgs::parse_from(["aitlisp", "repl"]);
        assert!(matches!(args.command, Command::Repl));
    }

    #[test]
    fn command_parses_tape_with_a_file_argument() {
        let args = AitArgs::parse_from(["aitlisp", "tape", "program.tape"]);
        match args.command {
            Command::Tape { file } => assert_eq!(file, PathBuf::from("program.tape")),
            other => panic!("expected Tape, got {other:?}"),
        }
    }
}
