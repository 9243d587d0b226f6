//! Shared test utilities for the sitewright test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_project();
//! let orchestrator = orchestrator(tmp.path(), MockRunner::new());
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::{PackageManagerChoice, SiteConfig};
use crate::pipeline::Orchestrator;
use crate::tools::tests::MockRunner;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/project/` to a temp directory and return it.
///
/// The copy has no output directory, so the first build materializes one.
pub fn setup_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/project");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

/// Like [`setup_project`], with the output directory already present.
pub fn setup_project_with_output() -> TempDir {
    let tmp = setup_project();
    std::fs::create_dir_all(tmp.path().join("libraries")).unwrap();
    tmp
}

/// Mirrored by `copy_dir` in `tests/incremental.rs`.
fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

// =========================================================================
// Pipeline construction
// =========================================================================

/// Stock config pinned to yarn so command lines do not depend on `PATH`.
pub fn test_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.tools.package_manager = PackageManagerChoice::Yarn;
    config
}

pub fn orchestrator(root: &Path, runner: MockRunner) -> Orchestrator<MockRunner> {
    Orchestrator::new(root, &test_config(), runner)
}
