//! # Sitewright
//!
//! A build orchestrator for a component-based static site. The project's
//! JavaScript component tree is the data source: every script under the
//! components directory becomes a page route, and a fixed pipeline of
//! external tools turns the sources into a deployable output directory.
//!
//! # Architecture: Five-Stage Pipeline
//!
//! ```text
//! 1. Route generation      components/  →  sources/routing.js
//! 2. Script transpile      sources/     →  transpiled scripts
//! 3. Page render           routes       →  libraries/<route>.html
//! 4. Stylesheet transpile  *.scss       →  compiled stylesheets
//! 5. Bundle                transpiled   →  application bundle
//! ```
//!
//! Stage 1 is native. Stage 3 is native by default and can delegate to a
//! configured renderer command. Stages 2, 4 and 5 are package scripts run
//! through `yarn` or `npm`.
//!
//! A one-shot build runs all five stages. Watch mode then follows the sources
//! tree and, for each file whose content actually changed, runs only the
//! stages that file can affect:
//!
//! ```text
//! notify → FsEvent queue → ChangeDetector → StageClassifier → Orchestrator
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Orchestrator: stage order, working-copy checkout, build events |
//! | [`routes`] | Stage 1: component tree → route table → route module text |
//! | [`render`] | Stage 3: page renderers (external command or built-in shell) |
//! | [`watch`] | Watch mode: `notify` subscription and the single-consumer loop |
//! | [`detect`] | Change detection against content fingerprints |
//! | [`classify`] | Changed path → stages to run |
//! | [`cache`] | SHA-256 fingerprints and the in-memory fingerprint cache |
//! | [`tools`] | External command seam (`ToolRunner`) |
//! | [`package_manager`] | `yarn`/`npm` detection and command lines |
//! | [`config`] | `sitewright.toml` loading, merging, and validation |
//! | [`naming`] | Component file name → route path and identifier |
//! | [`types`] | Pipeline stages and ordered stage sets |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Content Fingerprints Over Timestamps
//!
//! Editors and version control touch files without changing them. Watch mode
//! compares SHA-256 digests of file contents, so a save with no edits, a
//! permission change, or a duplicate notification never starts a rebuild.
//!
//! ## One Consumer, No Concurrency
//!
//! The external tools write into shared directories and are not safe to run
//! side by side. Watch events queue on a bounded channel and a single loop
//! handles them one at a time; each rebuild finishes before the next event is
//! read.
//!
//! ## A Tool Runner Trait
//!
//! Every external command goes through [`tools::ToolRunner`]. Production uses
//! [`tools::CommandRunner`]; tests record command lines instead, which lets the
//! whole pipeline be exercised without Node installed.

pub mod cache;
pub mod classify;
pub mod config;
pub mod detect;
pub mod naming;
pub mod output;
pub mod package_manager;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod tools;
pub mod types;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;
