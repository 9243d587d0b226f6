//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Checking out working copy → libraries/
//! Generate routing configuration
//!     2 routes
//! Transpile scripts
//! Generate pages
//!     2 pages
//! Transpile stylesheets
//! Make bundle
//! Build complete
//! ```
//!
//! ## Watch
//!
//! ```text
//! Rebuilt sources/app.scss {stylesheets}
//! Rebuild failed for sources/components/Home.jsx
//!     `yarn build:babel` exited with code 1:
//!     SyntaxError: Unexpected token (3:4)
//! ```
//!
//! ## Routes
//!
//! ```text
//! Routes
//! 001 Home → /Home.html
//! 002 BlogPost → /blog/Post.html
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::pipeline::BuildEvent;
use crate::routes::RouteTable;
use crate::types::PipelineStage;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, singular: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {singular}s")
    }
}

/// Display `path` relative to `root` when it lies under it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Heading printed when a stage starts.
pub fn stage_title(stage: PipelineStage) -> &'static str {
    match stage {
        PipelineStage::RouteGeneration => "Generate routing configuration",
        PipelineStage::ScriptTranspile => "Transpile scripts",
        PipelineStage::PageRender => "Generate pages",
        PipelineStage::StylesheetTranspile => "Transpile stylesheets",
        PipelineStage::Bundle => "Make bundle",
    }
}

// ============================================================================
// Build progress
// ============================================================================

/// Format one build event as display lines. Paths are shown relative to
/// `root`.
pub fn format_build_event(event: &BuildEvent, root: &Path) -> Vec<String> {
    match event {
        BuildEvent::CheckoutStarted { output } => vec![format!(
            "Checking out working copy \u{2192} {}/",
            display_path(output, root)
        )],
        BuildEvent::StageStarted { stage } => vec![stage_title(*stage).to_string()],
        BuildEvent::StageFinished { .. } => Vec::new(),
        BuildEvent::RoutesWritten { count } => {
            vec![format!("{}{}", indent(1), plural(*count, "route"))]
        }
        BuildEvent::PagesWritten { count } => {
            vec![format!("{}{}", indent(1), plural(*count, "page"))]
        }
        BuildEvent::BuildSucceeded => vec!["Build complete".to_string()],
        BuildEvent::RebuildSucceeded { path, stages } => {
            vec![format!("Rebuilt {} {}", display_path(path, root), stages)]
        }
        BuildEvent::RebuildFailed { path, message } => {
            let mut lines = vec![format!("Rebuild failed for {}", display_path(path, root))];
            lines.extend(message.lines().map(|l| format!("{}{}", indent(1), l)));
            lines
        }
    }
}

pub fn print_build_event(event: &BuildEvent, root: &Path) {
    for line in format_build_event(event, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Route table
// ============================================================================

/// Format the route table in generation order.
pub fn format_route_table(table: &RouteTable) -> Vec<String> {
    let mut lines = vec!["Routes".to_string()];
    if table.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }
    for (i, entry) in table.entries().iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            entry.identifier,
            entry.url()
        ));
    }
    lines
}

pub fn print_route_table(table: &RouteTable) {
    for line in format_route_table(table) {
        println!("{}", line);
    }
}
