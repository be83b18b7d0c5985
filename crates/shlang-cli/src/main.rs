//! shlang CLI - prints the token stream of shlang source code.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use shlang_lexer::{Lexer, LexerConfig, LexerError};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "shlang")]
#[command(version, about = "Tokenize shlang source code", long_about = None)]
struct Cli {
    /// Source file to tokenize
    file: Option<PathBuf>,

    /// Tokenize code given on the command line
    #[arg(short, long, value_name = "CODE", conflicts_with = "file")]
    eval: Option<String>,

    /// Start the REPL after processing the input
    #[arg(short, long)]
    interactive: bool,

    /// Prefix each token with its line:column
    #[arg(long)]
    positions: bool,

    /// Scan `1.5` as NUMBER `1` followed by an error
    #[arg(long)]
    integers_only: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// How tokens are lexed and printed.
#[derive(Debug, Clone, Copy)]
struct Options {
    config: LexerConfig,
    positions: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install a stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) -> Result<()> {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .without_time();

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))
}

fn run(cli: Cli) -> Result<()> {
    let options = Options {
        config: LexerConfig {
            fractional_numbers: !cli.integers_only,
        },
        positions: cli.positions,
    };

    if let Some(code) = &cli.eval {
        lex_source(code, "<eval>", options)?;
    } else if let Some(path) = &cli.file {
        info!(path = %path.display(), "reading source");
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        lex_source(&source, &path.display().to_string(), options)?;
    } else {
        return start_repl(options);
    }

    if cli.interactive {
        start_repl(options)?;
    }
    Ok(())
}

/// Print every token of `source` to stdout, stopping at the first error.
fn lex_source(source: &str, name: &str, options: Options) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut count = 0usize;

    for result in Lexer::with_config(source, options.config) {
        let tok = result.map_err(|e| anyhow!(render_error(source, name, &e)))?;
        if options.positions {
            write!(out, "{} ", tok.start)?;
        }
        writeln!(out, "{}", tok)?;
        count += 1;
    }

    debug!(name, tokens = count, "lexed");
    Ok(())
}

/// Format a lexer error with the offending source line and a caret.
fn render_error(source: &str, name: &str, err: &LexerError) -> String {
    let line_text = Lexer::new(source).line_text_at(err.offset());
    let gutter = err.line().to_string();
    // Tabs before the column are kept so the caret lines up with the source.
    let indent: String = line_text
        .chars()
        .take(err.column() - 1)
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();

    format!(
        "{err}\n {pad} --> {name}:{line}:{column}\n {gutter} | {line_text}\n {pad} | {indent}^",
        pad = " ".repeat(gutter.len()),
        line = err.line(),
        column = err.column(),
    )
}

fn start_repl(options: Options) -> Result<()> {
    println!(
        "shlang {} - Type 'exit' or Ctrl+D to quit",
        env!("CARGO_PKG_VERSION")
    );
    println!();

    let mut rl = DefaultEditor::new().context("failed to create editor")?;
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { ">>> " } else { "... " };

        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if buffer.is_empty() && (trimmed == "exit" || trimmed == "quit") {
                    break;
                }

                if buffer.is_empty() && trimmed.starts_with('/') {
                    if !handle_command(trimmed) {
                        break;
                    }
                    continue;
                }

                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                if is_complete(&buffer) {
                    if !buffer.trim().is_empty() {
                        rl.add_history_entry(buffer.trim()).ok();
                        if let Err(e) = lex_source(&buffer, "<repl>", options) {
                            eprintln!("error: {:#}", e);
                        }
                    }
                    buffer.clear();
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("readline error"),
        }
    }

    Ok(())
}

/// Whether the REPL input is complete: strings closed and brackets balanced.
fn is_complete(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;

    for c in input.chars() {
        match c {
            '"' => in_string = !in_string,
            '(' | '{' if !in_string => depth += 1,
            ')' | '}' if !in_string => depth -= 1,
            _ => {}
        }
    }

    depth <= 0 && !in_string
}

/// Run a `/command`. Returns false when the REPL should exit.
fn handle_command(cmd: &str) -> bool {
    let command = cmd[1..]
        .split_whitespace()
        .next()
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match command.as_str() {
        "help" => {
            println!(
                r#"
REPL Commands:
  /help     Show this help
  /clear    Clear the screen
  /exit     Exit the REPL
"#
            );
        }
        "clear" => {
            print!("\x1B[2J\x1B[1;1H");
        }
        "exit" | "quit" => return false,
        _ => {
            println!(
                "Unknown command: /{}. Type /help for available commands.",
                command
            );
        }
    }
    true
}
