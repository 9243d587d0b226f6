//! Change detection: collapsing filesystem events into build triggers.
//!
//! The watcher reports every add, modify, and remove it sees. Many of those
//! events carry no content change, so [`ChangeDetector`] checks each one
//! against the [`FingerprintCache`] and only reports a trigger when the
//! file's bytes are new or different.
//!
//! | Event | Cache state | Outcome |
//! |---|---|---|
//! | added | not cached | fingerprint stored, **New** |
//! | added | cached | **AlreadyTracked** (duplicate notification) |
//! | changed | fingerprint differs or not cached | fingerprint stored, **Changed** |
//! | changed | fingerprint equal | **Unchanged** |
//! | removed | any | entry dropped, **Removed** |
//!
//! Paths outside the watched extension set are **Unwatched** and never touch
//! the cache.

use crate::cache::{FingerprintCache, fingerprint_file};
use crate::classify::FileCategory;
use std::io;
use std::path::{Path, PathBuf};

/// A typed filesystem event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsEvent {
    Added(PathBuf),
    Changed(PathBuf),
    Removed(PathBuf),
}

impl FsEvent {
    pub fn path(&self) -> &Path {
        match self {
            FsEvent::Added(p) | FsEvent::Changed(p) | FsEvent::Removed(p) => p,
        }
    }
}

/// Outcome of running one event through the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// First sighting of a watched file.
    New,
    /// Content differs from the recorded fingerprint.
    Changed,
    /// Content identical to the recorded fingerprint.
    Unchanged,
    /// `added` for a path that is already tracked.
    AlreadyTracked,
    /// Tracking dropped.
    Removed,
    /// Extension not in the watched set.
    Unwatched,
}

impl Detection {
    pub fn triggers_build(self) -> bool {
        matches!(self, Detection::New | Detection::Changed)
    }
}

/// Owns the fingerprint cache for one watch loop.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    cache: FingerprintCache,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &FingerprintCache {
        &self.cache
    }

    /// Run one event through the detector.
    ///
    /// Reads the file for `Added` and `Changed` events. A read failure is
    /// returned as-is and leaves the cache untouched.
    pub fn observe(&mut self, event: &FsEvent) -> io::Result<Detection> {
        if !FileCategory::of(event.path()).is_watched() {
            return Ok(Detection::Unwatched);
        }

        match event {
            FsEvent::Added(path) => {
                if self.cache.contains(path) {
                    return Ok(Detection::AlreadyTracked);
                }
                let fingerprint = fingerprint_file(path)?;
                self.cache.insert(path.clone(), fingerprint);
                Ok(Detection::New)
            }
            FsEvent::Changed(path) => {
                let fingerprint = fingerprint_file(path)?;
                if self.cache.get(path) == Some(fingerprint.as_str()) {
                    return Ok(Detection::Unchanged);
                }
                self.cache.insert(path.clone(), fingerprint);
                Ok(Detection::Changed)
            }
            FsEvent::Removed(path) => {
                self.cache.remove(path);
                Ok(Detection::Removed)
            }
        }
    }

    /// Record the current content of a file the build itself wrote, so the
    /// watcher echoing that write does not count as a change.
    pub fn track(&mut self, path: &Path) -> io::Result<()> {
        let fingerprint = fingerprint_file(path)?;
        self.cache.insert(path.to_path_buf(), fingerprint);
        Ok(())
    }
}
