//! cmdtree CLI — run, complete, and inspect the built-in demo command grammar.

mod demo;
mod render;

use std::io::Read;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::demo::Invoker;
use crate::render::{render_error, render_records, render_suggestions, render_usage, Format};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "cmdtree",
    version,
    about = "Run, complete, and inspect commands against the demo grammar"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Act as an admin (unlocks the gated commands).
    #[arg(long, global = true)]
    admin: bool,

    /// Display name of the acting user.
    #[arg(long, global = true, default_value = "console")]
    user: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Parse and execute one command line.
    Run {
        /// The command line, e.g. "math add 2 3"; "-" reads it from stdin.
        #[arg(value_name = "INPUT")]
        input: String,
    },

    /// Print the completions valid at a cursor position.
    Suggest {
        /// The (possibly partial) command line.
        #[arg(value_name = "INPUT")]
        input: String,
        /// Cursor byte offset; defaults to the end of the input.
        #[arg(long, value_name = "POS")]
        cursor: Option<usize>,
    },

    /// Print the usage of every registered command.
    Usage {
        /// Condensed one-line-per-command form.
        #[arg(long)]
        smart: bool,
    },
}

// ── Entry point ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());
    let invoker = Invoker {
        name: cli.user.clone(),
        admin: cli.admin,
    };
    let code = match run(cli.cmd, format, invoker).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            2
        }
    };
    process::exit(code);
}

/// Resolve "-" to the contents of stdin, one command line.
fn resolve_input(raw: String) -> anyhow::Result<String> {
    if raw != "-" {
        return Ok(raw);
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("reading command line from stdin")?;
    Ok(buffer.trim_end_matches(['\r', '\n']).to_owned())
}

async fn run(cmd: Cmd, format: Format, invoker: Invoker) -> anyhow::Result<i32> {
    let dispatcher = demo::dispatcher();
    let code = match cmd {
        Cmd::Run { input } => {
            let input = resolve_input(input)?;
            match dispatcher.execute(&input, invoker).await {
                Ok(records) => {
                    render_records(format, &input, &records);
                    if records.iter().all(|r| r.is_success()) {
                        0
                    } else {
                        1
                    }
                }
                Err(error) => {
                    render_error(format, &input, &error);
                    1
                }
            }
        }
        Cmd::Suggest { input, cursor } => {
            let parse = dispatcher.parse(&input, invoker).await;
            let cursor = cursor.unwrap_or(input.len()).min(input.len());
            let suggestions = dispatcher.completion_suggestions_at(&parse, cursor).await;
            render_suggestions(format, &input, &suggestions);
            0
        }
        Cmd::Usage { smart } => {
            let lines = if smart {
                dispatcher
                    .smart_usage(dispatcher.root(), &invoker)
                    .into_iter()
                    .map(|(_, text)| text)
                    .collect()
            } else {
                dispatcher.all_usage(dispatcher.root(), &invoker, true)
            };
            render_usage(format, &lines);
            0
        }
    };
    Ok(code)
}
