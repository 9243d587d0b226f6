//! Watch mode.
//!
//! A `notify` watcher on the sources tree feeds a bounded channel of typed
//! [`FsEvent`]s. A single consumer, [`WatchLoop`], takes them in arrival
//! order and runs each through the [`ChangeDetector`], the
//! [`StageClassifier`], and finally the [`Orchestrator`]. One rebuild runs to
//! completion before the next event is looked at, so external tools never
//! run concurrently.
//!
//! A failed rebuild is reported and the loop keeps going. The fingerprint was
//! already updated, so saving the same broken content again does not retrigger;
//! the next real edit does.

use crate::classify::{FileCategory, StageClassifier};
use crate::detect::{ChangeDetector, Detection, FsEvent};
use crate::pipeline::{Orchestrator, PipelineError};
use crate::tools::ToolRunner;
use crate::types::StageSet;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Component, Path};
use std::sync::mpsc::{Receiver, sync_channel};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("File watcher error: {0}")]
    Notify(#[from] notify::Error),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Translate one `notify` event into zero or more [`FsEvent`]s.
///
/// Renames become a removal of the old path and an addition of the new one.
/// Metadata-only modifications come through as `Changed` and are collapsed
/// by the detector.
pub fn translate(event: Event) -> Vec<FsEvent> {
    let Event { kind, paths, .. } = event;
    match kind {
        EventKind::Create(_) => paths.into_iter().map(FsEvent::Added).collect(),
        EventKind::Remove(_) => paths.into_iter().map(FsEvent::Removed).collect(),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => paths.into_iter().map(FsEvent::Removed).collect(),
            RenameMode::To => paths.into_iter().map(FsEvent::Added).collect(),
            RenameMode::Both => {
                let mut paths = paths.into_iter();
                let mut events = Vec::with_capacity(2);
                if let Some(from) = paths.next() {
                    events.push(FsEvent::Removed(from));
                }
                if let Some(to) = paths.next() {
                    events.push(FsEvent::Added(to));
                }
                events
            }
            // Backends that cannot tell the two halves apart.
            RenameMode::Any | RenameMode::Other => paths
                .into_iter()
                .map(|p| {
                    if p.exists() {
                        FsEvent::Added(p)
                    } else {
                        FsEvent::Removed(p)
                    }
                })
                .collect(),
        },
        EventKind::Modify(_) => paths.into_iter().map(FsEvent::Changed).collect(),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

/// True if any segment of `path` below `root` starts with a dot.
pub fn is_hidden(path: &Path, root: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// Whether the loop should ever see `event`.
fn wanted(event: &FsEvent, root: &Path) -> bool {
    FileCategory::of(event.path()).is_watched() && !is_hidden(event.path(), root)
}

/// Start watching `sources` recursively.
///
/// Returns the watcher, which must be kept alive, and the receiving end of a
/// channel holding at most `capacity` pending events. When the channel is
/// full the watcher's thread blocks until the consumer catches up.
pub fn subscribe(
    sources: &Path,
    capacity: usize,
) -> Result<(RecommendedWatcher, Receiver<FsEvent>), WatchError> {
    let (tx, rx) = sync_channel(capacity);
    let root = sources.to_path_buf();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            for fs_event in translate(event) {
                if wanted(&fs_event, &root) {
                    // Consumer gone means the loop is shutting down.
                    let _ = tx.send(fs_event);
                }
            }
        }
        Err(e) => tracing::warn!(error = %e, "file watcher reported an error"),
    })?;
    watcher.watch(sources, RecursiveMode::Recursive)?;

    tracing::info!(path = %sources.display(), "watching for changes");
    Ok((watcher, rx))
}

/// What the loop did with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The detector found nothing to build.
    Skipped(Detection),
    /// The file could not be read, typically because it vanished again.
    Unreadable,
    Rebuilt(StageSet),
    Failed(String),
}

/// Single consumer of watch events.
pub struct WatchLoop<R: ToolRunner> {
    orchestrator: Orchestrator<R>,
    detector: ChangeDetector,
    classifier: StageClassifier,
}

impl<R: ToolRunner> WatchLoop<R> {
    /// The fingerprint cache starts empty apart from the generated route
    /// module, so the first sighting of every source file triggers a build.
    pub fn new(orchestrator: Orchestrator<R>) -> Self {
        let classifier = StageClassifier::new(&orchestrator.layout().components);
        let mut watch_loop = Self {
            orchestrator,
            detector: ChangeDetector::new(),
            classifier,
        };
        if watch_loop.orchestrator.layout().route_module.is_file() {
            watch_loop.track_route_module();
        }
        watch_loop
    }

    pub fn orchestrator(&self) -> &Orchestrator<R> {
        &self.orchestrator
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    /// Process one event to completion.
    pub fn handle(&mut self, event: &FsEvent) -> Outcome {
        let detection = match self.detector.observe(event) {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!(
                    path = %event.path().display(),
                    error = %e,
                    "cannot fingerprint"
                );
                return Outcome::Unreadable;
            }
        };
        if !detection.triggers_build() {
            tracing::debug!(path = %event.path().display(), ?detection, "no rebuild");
            return Outcome::Skipped(detection);
        }

        let path = event.path();
        let classification = self.classifier.classify(path);
        tracing::info!(path = %path.display(), stages = %classification.stages, "rebuilding");
        let result = self.orchestrator.incremental_build(path, &classification);
        // Route generation runs first, so the module is rewritten even when a
        // later stage fails.
        if classification.requires_route_regeneration() {
            self.track_route_module();
        }
        match result {
            Ok(()) => Outcome::Rebuilt(classification.stages),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "rebuild failed");
                Outcome::Failed(e.to_string())
            }
        }
    }

    /// The route module lives in the watched tree. Fingerprint it after the
    /// build writes it so the watcher's echo is not taken for an edit.
    fn track_route_module(&mut self) {
        let module = &self.orchestrator.layout().route_module;
        if let Err(e) = self.detector.track(module) {
            tracing::debug!(
                path = %module.display(),
                error = %e,
                "cannot fingerprint route module"
            );
        }
    }

    /// Consume events until every sender is gone.
    pub fn run(&mut self, events: Receiver<FsEvent>) {
        for event in events {
            self.handle(&event);
        }
    }
}

/// Full build, then watch the sources tree forever.
///
/// Returns only if the initial build fails, the watcher cannot be set up, or
/// the watcher's channel closes.
pub fn watch<R: ToolRunner>(
    mut orchestrator: Orchestrator<R>,
    queue_capacity: usize,
) -> Result<(), WatchError> {
    orchestrator.full_build()?;
    let sources = orchestrator.layout().sources.clone();
    let (_watcher, events) = subscribe(&sources, queue_capacity)?;
    WatchLoop::new(orchestrator).run(events);
    Ok(())
}
