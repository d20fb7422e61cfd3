//! simple-lang command line driver
//!
//! Reads one source file, runs the front end over it and writes the
//! diagnostics (or, with `--emit tokens`, the token stream).
//!
//! Exit codes: 0 when the file is clean, 1 when diagnostics were reported,
//! 2 when the input or output could not be accessed.

use clap::{ArgAction, Parser, ValueEnum};
use simple_lang::parser::lexer::{Token, TokenKind};
use simple_lang::{compile_with, tokenize, CompileOptions};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "simple-lang", about = "Check a simple-lang source file")]
struct Cli {
    /// Source file to check
    input: PathBuf,

    /// Write output to this file instead of stderr
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What to produce
    #[arg(long, value_enum, default_value_t = Emit::Diagnostics)]
    emit: Emit,

    /// Print diagnostics as they are raised instead of after checking
    #[arg(long)]
    stream: bool,

    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// One `CODE literal` line per token
    Tokens,
    /// Parse and check, then list diagnostics
    Diagnostics,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),

    #[error("{count} diagnostic(s) reported")]
    Diagnostics { count: usize },
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Diagnostics { .. } => 1,
            CliError::Read { .. } | CliError::Write(_) => 2,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_ansi(false)
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let source = fs::read_to_string(&cli.input).map_err(|source| CliError::Read {
        path: cli.input.clone(),
        source,
    })?;
    let name = cli.input.display().to_string();

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(fs::File::create(path)?),
        None => Box::new(io::stderr()),
    };

    let errors = match cli.emit {
        Emit::Tokens => {
            let (tokens, errors) = tokenize(&name, &source);
            for token in tokens.iter().filter(|t| t.kind != TokenKind::Eof) {
                writeln!(out, "{}", dump_token(token))?;
            }
            write!(out, "{}", errors.render())?;
            errors
        }
        Emit::Diagnostics => {
            let options = CompileOptions { stream: cli.stream };
            let compilation = compile_with(&name, &source, options);
            // Streamed diagnostics already went to stderr.
            if !(cli.stream && cli.output.is_none()) {
                write!(out, "{}", compilation.errors.render())?;
            }
            compilation.errors
        }
    };
    out.flush()?;

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CliError::Diagnostics { count: errors.len() })
    }
}

/// `CODE literal`, with the quotes of char and string literals removed.
fn dump_token(token: &Token) -> String {
    let quote = match token.kind {
        TokenKind::CharLit => Some('\''),
        TokenKind::StrLit => Some('"'),
        _ => None,
    };
    let lit = quote
        .and_then(|q| token.lit.strip_prefix(q)?.strip_suffix(q))
        .unwrap_or(&token.lit);
    format!("{} {}", token.kind.code(), lit)
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "simple_lang=info",
        1 => "simple_lang=debug",
        _ => "simple_lang=trace",
    }
}
