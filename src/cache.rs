//! Content fingerprints for watched source files.
//!
//! Editors and version-control operations fire filesystem events that do not
//! change file contents: atomic saves, `touch`, checkouts that reset mtimes.
//! The watch loop compares each event against a fingerprint of the file's
//! bytes, so only genuine edits reach the build pipeline.
//!
//! ## Fingerprints
//!
//! A fingerprint is the SHA-256 of the file's contents as a hex string.
//! Content-based rather than mtime-based, so a touch or a checkout that
//! rewrites identical bytes compares equal.
//!
//! ## Lifetime
//!
//! [`FingerprintCache`] lives in memory for the lifetime of the watch loop.
//! It is never written to disk: a restart always begins with a full build and
//! an empty cache.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// SHA-256 of a byte slice, as a lowercase hex string.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA-256 of a file's contents, as a lowercase hex string.
pub fn fingerprint_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(fingerprint_bytes(&bytes))
}

/// In-memory map from watched path to content fingerprint.
#[derive(Debug, Default)]
pub struct FingerprintCache {
    entries: HashMap<PathBuf, String>,
}

impl FingerprintCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Record a fingerprint, returning the previous one if any.
    pub fn insert(&mut self, path: PathBuf, fingerprint: String) -> Option<String> {
        self.entries.insert(path, fingerprint)
    }

    pub fn remove(&mut self, path: &Path) -> Option<String> {
        self.entries.remove(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn fingerprint_file_deterministic() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("app.scss");
        fs::write(&path, "body { margin: 0; }").unwrap();

        let h1 = fingerprint_file(&path).unwrap();
        let h2 = fingerprint_file(&path).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn fingerprint_file_changes_with_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Home.jsx");

        fs::write(&path, "export default 1;").unwrap();
        let h1 = fingerprint_file(&path).unwrap();

        fs::write(&path, "export default 2;").unwrap();
        let h2 = fingerprint_file(&path).unwrap();

        assert_ne!(h1, h2);
    }

    #[test]
    fn fingerprint_file_matches_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.js");
        fs::write(&path, b"hello world").unwrap();
        assert_eq!(
            fingerprint_file(&path).unwrap(),
            fingerprint_bytes(b"hello world")
        );
    }

    #[test]
    fn fingerprint_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(fingerprint_file(&tmp.path().join("gone.js")).is_err());
    }

    #[test]
    fn cache_insert_get_remove() {
        let mut cache = FingerprintCache::new();
        let path = PathBuf::from("sources/app.scss");
        assert!(cache.is_empty());

        assert_eq!(cache.insert(path.clone(), "aaa".into()), None);
        assert_eq!(cache.get(&path), Some("aaa"));
        assert_eq!(cache.insert(path.clone(), "bbb".into()), Some("aaa".into()));
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.remove(&path), Some("bbb".into()));
        assert!(!cache.contains(&path));
    }
}
