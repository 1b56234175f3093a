//! Output rendering for the CLI.
//!
//! Command errors carry a reader pinned at the failure position, so pretty
//! mode can underline the offending part of the input with ariadne. JSON mode
//! emits a stable machine-readable envelope for scripting.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use cmdtree_core::{CommandError, ExecRecord, Suggestions};

/// Pseudo file name shown in pretty reports.
const INPUT_NAME: &str = "<input>";

// ── Output format ───────────────────────────────────────────────────────

/// Output format for results and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Resolve an explicit request, defaulting on whether stdout is a TTY.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Errors ──────────────────────────────────────────────────────────────

/// Render a command failure against the input line it came from.
pub(crate) fn render_error(format: Format, input: &str, error: &CommandError) {
    match format {
        Format::Pretty => render_error_pretty(input, error),
        Format::Json => {
            let envelope = serde_json::json!({
                "ok": false,
                "input": input,
                "error": {
                    "message": error.kind().to_string(),
                    "cursor": error.cursor(),
                },
            });
            println!("{envelope}");
        }
    }
}

fn render_error_pretty(input: &str, error: &CommandError) {
    let cursor = error.cursor().unwrap_or(0).min(input.len());
    // Underline from the failure position to the end of the current token.
    let end = input[cursor..]
        .find(' ')
        .map(|offset| cursor + offset)
        .unwrap_or(input.len())
        .max(cursor + usize::from(cursor < input.len()));

    Report::build(ReportKind::Error, INPUT_NAME, cursor)
        .with_message(error.kind().to_string())
        .with_config(Config::default().with_compact(false))
        .with_label(
            Label::new((INPUT_NAME, cursor..end))
                .with_message("here")
                .with_color(Color::Red),
        )
        .finish()
        .eprint((INPUT_NAME, Source::from(input)))
        .ok();
}

// ── Results ─────────────────────────────────────────────────────────────

/// Render the per-branch records of a successful execution.
pub(crate) fn render_records(format: Format, input: &str, records: &[ExecRecord]) {
    match format {
        Format::Pretty => {
            for (index, record) in records.iter().enumerate() {
                match record {
                    ExecRecord::Success { value: Some(value) } => {
                        eprintln!("branch {index}: ok ({value})");
                    }
                    ExecRecord::Success { value: None } => eprintln!("branch {index}: ok"),
                    ExecRecord::Failure { error } => eprintln!("branch {index}: {error}"),
                }
            }
        }
        Format::Json => {
            let branches: Vec<serde_json::Value> = records
                .iter()
                .map(|record| match record {
                    ExecRecord::Success { value } => serde_json::json!({
                        "ok": true,
                        "value": value,
                    }),
                    ExecRecord::Failure { error } => serde_json::json!({
                        "ok": false,
                        "message": error.kind().to_string(),
                    }),
                })
                .collect();
            let envelope = serde_json::json!({
                "ok": true,
                "input": input,
                "branches": branches,
            });
            println!("{envelope}");
        }
    }
}

/// Render a suggestion set.
pub(crate) fn render_suggestions(format: Format, input: &str, suggestions: &Suggestions) {
    match format {
        Format::Pretty => {
            if suggestions.is_empty() {
                eprintln!("no suggestions");
                return;
            }
            for entry in suggestions.entries() {
                match &entry.tooltip {
                    Some(tooltip) => println!("{}\t({tooltip})", entry.text),
                    None => println!("{}", entry.text),
                }
            }
        }
        Format::Json => {
            let envelope = serde_json::json!({
                "ok": true,
                "input": input,
                "range": suggestions.range(),
                "texts": suggestions.texts(),
                "suggestions": suggestions,
            });
            println!("{envelope}");
        }
    }
}

/// Render usage lines.
pub(crate) fn render_usage(format: Format, lines: &[String]) {
    match format {
        Format::Pretty => {
            for line in lines {
                println!("{line}");
            }
        }
        Format::Json => {
            let envelope = serde_json::json!({ "ok": true, "usage": lines });
            println!("{envelope}");
        }
    }
}
