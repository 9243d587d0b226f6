//! Package manager selection.
//!
//! Stage tools default to package scripts (`build:babel`, `build:scss`,
//! `build:webpack`), run through whichever package manager the machine has.
//! `yarn` is preferred when it is on `PATH`; `npm` is the fallback.

use crate::config::{PackageManagerChoice, ToolSpec};
use std::env;
use std::ffi::OsStr;
use std::path::Path;

/// A concrete package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Yarn,
    Npm,
}

impl PackageManager {
    /// Resolve a config choice, probing `PATH` for `auto`.
    pub fn resolve(choice: PackageManagerChoice) -> Self {
        match choice {
            PackageManagerChoice::Yarn => PackageManager::Yarn,
            PackageManagerChoice::Npm => PackageManager::Npm,
            PackageManagerChoice::Auto => Self::detect(env::var_os("PATH").as_deref()),
        }
    }

    /// `Yarn` if any directory in `path_var` contains a yarn executable.
    pub fn detect(path_var: Option<&OsStr>) -> Self {
        let found = path_var
            .map(|paths| env::split_paths(paths).any(|dir| has_yarn(&dir)))
            .unwrap_or(false);
        if found {
            PackageManager::Yarn
        } else {
            PackageManager::Npm
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            PackageManager::Yarn => "yarn",
            PackageManager::Npm => "npm",
        }
    }

    /// Command line running a package script.
    pub fn script_command(self, script: &str) -> String {
        match self {
            PackageManager::Yarn => format!("yarn {script}"),
            PackageManager::Npm => format!("npm run {script}"),
        }
    }

    /// Command line passing `args` straight to the package manager.
    pub fn proxy_command(self, args: &[String]) -> String {
        let mut line = self.program().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Command line for a configured stage tool.
    pub fn tool_command(self, spec: &ToolSpec) -> String {
        match spec {
            ToolSpec::Script(script) => self.script_command(script),
            ToolSpec::Command { command } => command.clone(),
        }
    }
}

fn has_yarn(dir: &Path) -> bool {
    ["yarn", "yarn.cmd", "yarn.exe"]
        .iter()
        .any(|name| dir.join(name).is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn detect_yarn_on_path() {
        let empty = TempDir::new().unwrap();
        let with_yarn = TempDir::new().unwrap();
        fs::write(with_yarn.path().join("yarn"), "#!/bin/sh\n").unwrap();

        let path_var = env::join_paths([empty.path(), with_yarn.path()]).unwrap();
        assert_eq!(
            PackageManager::detect(Some(path_var.as_os_str())),
            PackageManager::Yarn
        );
    }

    #[test]
    fn detect_falls_back_to_npm() {
        let empty = TempDir::new().unwrap();
        let path_var = env::join_paths([empty.path()]).unwrap();
        assert_eq!(PackageManager::detect(Some(path_var.as_os_str())), PackageManager::Npm);
        assert_eq!(PackageManager::detect(None), PackageManager::Npm);
    }

    #[test]
    fn detect_ignores_yarn_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("yarn")).unwrap();
        let path_var = env::join_paths([dir.path()]).unwrap();
        assert_eq!(PackageManager::detect(Some(path_var.as_os_str())), PackageManager::Npm);
    }

    #[test]
    fn explicit_choice_skips_detection() {
        assert_eq!(
            PackageManager::resolve(PackageManagerChoice::Npm),
            PackageManager::Npm
        );
        assert_eq!(
            PackageManager::resolve(PackageManagerChoice::Yarn),
            PackageManager::Yarn
        );
    }

    #[test]
    fn script_commands() {
        assert_eq!(
            PackageManager::Yarn.script_command("build:babel"),
            "yarn build:babel"
        );
        assert_eq!(
            PackageManager::Npm.script_command("build:babel"),
            "npm run build:babel"
        );
    }

    #[test]
    fn proxy_command_passes_args_through() {
        let args = vec!["add".to_string(), "react".to_string()];
        assert_eq!(PackageManager::Yarn.proxy_command(&args), "yarn add react");
        assert_eq!(PackageManager::Npm.proxy_command(&[]), "npm");
    }

    #[test]
    fn tool_command_for_script_and_explicit_command() {
        let script = ToolSpec::Script("build:scss".into());
        let explicit = ToolSpec::Command {
            command: "sass sources:libraries/styles".into(),
        };
        assert_eq!(PackageManager::Npm.tool_command(&script), "npm run build:scss");
        assert_eq!(
            PackageManager::Yarn.tool_command(&explicit),
            "sass sources:libraries/styles"
        );
    }
}
