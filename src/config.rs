//! Project configuration module.
//!
//! Handles loading, validating, and merging `sitewright.toml`. Stock defaults
//! describe the conventional project layout; a `sitewright.toml` at the
//! project root overrides any subset of them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [layout]
//! sources = "sources"                  # Watched source tree
//! components = "sources/components"    # Page components (route tree root)
//! route_module = "sources/routing.js"  # Generated route module
//! page_shell = "sources/skeleton.pug"  # Page-shell template for the renderer
//! output = "libraries"                 # Output directory (working copy)
//!
//! [tools]
//! package_manager = "auto"             # auto | yarn | npm
//! transpile_scripts = "build:babel"    # Package script name...
//! transpile_stylesheets = "build:scss"
//! bundle = { command = "webpack" }     # ...or an explicit command line
//! render = "node render.js {route} {shell}"  # Optional page renderer
//!
//! [checkout]
//! branch = "master"                    # Branch materialized into the output dir
//!
//! [watch]
//! queue_capacity = 256                 # Bounded watcher event queue
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project config file, looked up in the project root.
pub const CONFIG_FILENAME: &str = "sitewright.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `sitewright.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Where sources live and where artifacts go.
    pub layout: LayoutConfig,
    /// External tool invocations for each stage.
    pub tools: ToolsConfig,
    /// Working-copy checkout settings.
    pub checkout: CheckoutConfig,
    /// Watch loop settings.
    pub watch: WatchConfig,
}

impl SiteConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        for (key, value) in [
            ("layout.sources", &layout.sources),
            ("layout.components", &layout.components),
            ("layout.route_module", &layout.route_module),
            ("layout.page_shell", &layout.page_shell),
            ("layout.output", &layout.output),
        ] {
            if value.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if !layout.components.starts_with(&layout.sources) {
            return Err(ConfigError::Validation(
                "layout.components must lie under layout.sources".into(),
            ));
        }
        if self.watch.queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "watch.queue_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Project layout, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub sources: PathBuf,
    pub components: PathBuf,
    pub route_module: PathBuf,
    pub page_shell: PathBuf,
    pub output: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            sources: PathBuf::from("sources"),
            components: PathBuf::from("sources/components"),
            route_module: PathBuf::from("sources/routing.js"),
            page_shell: PathBuf::from("sources/skeleton.pug"),
            output: PathBuf::from("libraries"),
        }
    }
}

/// Which package manager runs package scripts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManagerChoice {
    /// `yarn` when it is on `PATH`, otherwise `npm`.
    #[default]
    Auto,
    Yarn,
    Npm,
}

/// How a stage's external tool is invoked.
///
/// A bare string names a package script (`"build:babel"` runs
/// `yarn build:babel` or `npm run build:babel`); a table with `command`
/// gives a full command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolSpec {
    Script(String),
    Command { command: String },
}

/// External tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub package_manager: PackageManagerChoice,
    pub transpile_scripts: ToolSpec,
    pub transpile_stylesheets: ToolSpec,
    pub bundle: ToolSpec,
    /// Per-route render command. `{route}` expands to the route url and
    /// `{shell}` to the page-shell path; stdout is the rendered page. When
    /// absent, the built-in client-side shell is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render: Option<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            package_manager: PackageManagerChoice::Auto,
            transpile_scripts: ToolSpec::Script("build:babel".to_string()),
            transpile_stylesheets: ToolSpec::Script("build:scss".to_string()),
            bundle: ToolSpec::Script("build:webpack".to_string()),
            render: None,
        }
    }
}

/// Working-copy checkout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckoutConfig {
    pub branch: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            branch: "master".to_string(),
        }
    }
}

/// Watch loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Capacity of the bounded event queue between watcher and build loop.
    pub queue_capacity: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `sitewright.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `sitewright.toml` in the project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `sitewright.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sitewright configuration
# ========================
#
# Every option is optional. Values shown are the defaults.
# Paths are relative to the project root.

[layout]
# Source tree watched in `build --watch`.
sources = "sources"
# Page components. Every .js/.jsx file below this directory becomes a route.
components = "sources/components"
# Generated route module (rewritten by the route generation stage).
route_module = "sources/routing.js"
# Page-shell template handed to the page renderer.
page_shell = "sources/skeleton.pug"
# Output directory. Materialized from a checkout on first build.
output = "libraries"

[tools]
# Package manager for package scripts: "auto", "yarn" or "npm".
# "auto" uses yarn when it is on PATH and falls back to npm.
package_manager = "auto"
# Each tool is either a package script name, or a table with a full
# command line, e.g. bundle = { command = "webpack --mode production" }.
transpile_scripts = "build:babel"
transpile_stylesheets = "build:scss"
bundle = "build:webpack"
# Per-route page renderer. {route} expands to the route url (/blog/Post.html)
# and {shell} to the page-shell path. Its stdout becomes the page.
# When unset, pages are client-side shells that mount the bundle, and the
# page-shell template is not read.
# render = "node render.js {route} {shell}"

[checkout]
# Branch checked out into the output directory when it does not exist yet.
branch = "master"

[watch]
# Capacity of the queue between the filesystem watcher and the build loop.
queue_capacity = 256
"##
}
