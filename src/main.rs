use clap::{Parser, Subcommand};
use sitewright::config::{self, ConfigError, SiteConfig};
use sitewright::output;
use sitewright::package_manager::PackageManager;
use sitewright::pipeline::{Layout, Orchestrator, PipelineError};
use sitewright::routes::{self, RouteError};
use sitewright::tools::{CommandRunner, RunOptions, ToolError, ToolRunner};
use sitewright::watch::{self, WatchError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Called once, by clap, at startup.
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "sitewright")]
#[command(about = "Build orchestrator for component-based static sites")]
#[command(long_about = "\
Build orchestrator for component-based static sites

Every script under the components directory becomes a page route. A build
runs five stages in order:

  1. Generate routing configuration   components/ → sources/routing.js
  2. Transpile scripts                 package script build:babel
  3. Generate pages                    one libraries/<route>.html per route
  4. Transpile stylesheets             package script build:scss
  5. Make bundle                       package script build:webpack

Project structure:

  .
  ├── sitewright.toml          # Optional config
  ├── package.json             # Defines the build:* scripts
  ├── sources/
  │   ├── routing.js           # Generated, do not edit
  │   ├── skeleton.pug         # Page shell
  │   ├── app.scss
  │   └── components/
  │       ├── Home.jsx         # → /Home.html
  │       └── blog/
  │           └── Post.jsx     # → /blog/Post.html
  └── libraries/               # Output, checked out on first build

`build --watch` rebuilds only the stages a changed file affects.

Run 'sitewright gen-config' to generate a documented sitewright.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project root
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Output directory (overrides layout.output)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline once
    Build {
        /// Keep running and rebuild on source changes
        #[arg(long)]
        watch: bool,
    },
    /// Run yarn (or npm when yarn is not installed) with the given arguments
    Yarnpm {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        commands: Vec<String>,
    },
    /// Print the route table without writing the route module
    Routes {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock sitewright.toml with all options documented
    GenConfig,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Routes(#[from] RouteError),
    #[error("{0}")]
    Tool(#[from] ToolError),
    #[error("Build failed: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("{0}")]
    Watch(#[from] WatchError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Tool(e) => e.exit_code(),
            CliError::Pipeline(e) | CliError::Watch(WatchError::Pipeline(e)) => e.exit_code(),
            _ => 1,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let root = std::fs::canonicalize(&cli.root)?;

    match cli.command {
        Command::Build { watch } => {
            let config = load_config(&root, cli.output.as_deref())?;
            build(&root, &config, watch)?;
        }
        Command::Yarnpm { commands } => {
            let config = load_config(&root, cli.output.as_deref())?;
            let pm = PackageManager::resolve(config.tools.package_manager);
            let command = pm.proxy_command(&commands);
            CommandRunner.run(&command, &RunOptions::in_dir(&root).inherit())?;
        }
        Command::Routes { json } => {
            let config = load_config(&root, cli.output.as_deref())?;
            let layout = Layout::resolve(&root, &config.layout);
            let table = routes::scan_routes(&layout.components)?;
            if json {
                println!("{}", serde_json::to_string_pretty(table.entries())?);
            } else {
                output::print_route_table(&table);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `sitewright.toml` and apply the `--output` override.
fn load_config(root: &Path, output: Option<&Path>) -> Result<SiteConfig, ConfigError> {
    let mut config = config::load_config(root)?;
    if let Some(output) = output {
        config.layout.output = output.to_path_buf();
        config.validate()?;
    }
    Ok(config)
}

fn build(root: &Path, config: &SiteConfig, watch: bool) -> Result<(), CliError> {
    let (tx, rx) = std::sync::mpsc::channel();
    let printer_root = root.to_path_buf();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_build_event(&event, &printer_root);
        }
    });

    let orchestrator = Orchestrator::new(root, config, CommandRunner).with_events(tx);
    let result = if watch {
        watch::watch(orchestrator, config.watch.queue_capacity).map_err(CliError::from)
    } else {
        let mut orchestrator = orchestrator;
        orchestrator.full_build().map_err(CliError::from)
    };

    // The orchestrator, and with it the sender, is gone by now.
    let _ = printer.join();
    result
}
