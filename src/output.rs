//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Process
//!
//! ```text
//! photos/a.jpg → out/a-thumb.jpg (150 x 150)
//!     Original - w: 1000 | h: 500 (0.50 MP)
//!     New - w: 300 | h: 150
//!     ZC - start: (75,0) | box: 150 x 150
//! ```
//!
//! A declined run leads with the reason instead of a size:
//!
//! ```text
//! photos/missing.jpg → out/x.jpg declined: File not found: photos/missing.jpg
//!     File not found: photos/missing.jpg  *** Skipping ***
//! ```
//!
//! ## Batch
//!
//! ```text
//! Processing 3 jobs
//! 001 a.jpg → out/a.jpg (150 x 150)
//! 002 b.jpg declined: File not found: photos/b.jpg
//!     File not found: photos/b.jpg  *** Skipping ***
//! 003 c.png → out/c.webp (800 x 600)
//! Done: 2 written, 1 declined
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary};
use crate::imaging::{Outcome, Status};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn report_lines<'a>(lines: impl IntoIterator<Item = &'a String>) -> impl Iterator<Item = String> {
    lines.into_iter().map(|line| format!("{}{}", indent(1), line))
}

/// Format the result of a single `process` run.
pub fn format_outcome(input: &Path, output: &Path, outcome: &Outcome) -> Vec<String> {
    let header = match &outcome.status {
        Status::Done(plan) => format!(
            "{} → {} ({})",
            input.display(),
            output.display(),
            plan.final_dimensions
        ),
        Status::Declined(err) => format!(
            "{} → {} declined: {}",
            input.display(),
            output.display(),
            err
        ),
    };
    std::iter::once(header)
        .chain(report_lines(outcome.report.lines()))
        .collect()
}

pub fn print_outcome(input: &Path, output: &Path, outcome: &Outcome) {
    for line in format_outcome(input, output, outcome) {
        println!("{}", line);
    }
}

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total } => {
            let noun = if *total == 1 { "job" } else { "jobs" };
            vec![format!("Processing {} {}", total, noun)]
        }
        BatchEvent::JobFinished {
            index,
            input,
            output,
            written,
            error,
            report,
        } => {
            let status = match (written, error) {
                (Some(dims), _) => format!("→ {} ({})", output.display(), dims),
                (None, Some(reason)) => format!("declined: {}", reason),
                (None, None) => "declined".to_string(),
            };
            std::iter::once(format!(
                "{} {} {}",
                format_index(*index),
                file_name(input),
                status
            ))
            .chain(report_lines(report))
            .collect()
        }
    }
}

pub fn format_batch_summary(summary: &BatchSummary) -> String {
    format!(
        "Done: {} written, {} declined",
        summary.succeeded, summary.declined
    )
}
