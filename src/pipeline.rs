//! Build orchestration.
//!
//! The [`Orchestrator`] runs pipeline stages in a fixed order:
//!
//! ```text
//! 1. RouteGeneration      components/  →  route module
//! 2. ScriptTranspile      sources/     →  transpiled scripts   (imports the route module)
//! 3. PageRender           routes       →  one .html per route  (loads transpiled routes)
//! 4. StylesheetTranspile  *.scss       →  compiled stylesheets
//! 5. Bundle               transpiled   →  application bundle
//! ```
//!
//! A **full build** runs all five. An **incremental build** runs the stages a
//! [`Classification`] names, still in this order. Stages run strictly one
//! after another on the caller's thread; the first failure aborts the build
//! and is returned unchanged. Nothing is rolled back.
//!
//! Before the first build the output directory is materialized with a
//! version-control checkout of the project when it does not exist. This
//! happens at most once per orchestrator.
//!
//! Progress is reported as [`BuildEvent`]s on an optional channel. The
//! orchestrator's own bookkeeping lives in [`BuildState`].

use crate::classify::Classification;
use crate::config::{LayoutConfig, SiteConfig, ToolSpec};
use crate::package_manager::PackageManager;
use crate::render::{CommandRenderer, PageRenderer, RenderError, RenderRequest, ShellRenderer};
use crate::routes::{self, RouteError, RouteTable};
use crate::tools::{RunOptions, ToolError, ToolRunner};
use crate::types::{PipelineStage, StageSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Route generation failed: {0}")]
    Routes(#[from] RouteError),
    #[error("{0}")]
    Tool(#[from] ToolError),
    #[error("Page rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl PipelineError {
    /// Exit code to propagate to the process boundary.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Tool(e) | PipelineError::Render(RenderError::Tool(e)) => e.exit_code(),
            _ => 1,
        }
    }
}

/// Absolute project paths, resolved from [`LayoutConfig`] against a root.
#[derive(Debug, Clone)]
pub struct Layout {
    pub root: PathBuf,
    pub sources: PathBuf,
    pub components: PathBuf,
    pub route_module: PathBuf,
    pub page_shell: PathBuf,
    pub output: PathBuf,
    /// Output directory as configured, used as the checkout target.
    output_rel: PathBuf,
}

impl Layout {
    pub fn resolve(root: &Path, config: &LayoutConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            sources: root.join(&config.sources),
            components: root.join(&config.components),
            route_module: root.join(&config.route_module),
            page_shell: root.join(&config.page_shell),
            output: root.join(&config.output),
            output_rel: config.output.clone(),
        }
    }

    /// Output file for a route path: `<output>/<path>.html`.
    pub fn page_path(&self, route_path: &str) -> PathBuf {
        self.output.join(format!("{route_path}.html"))
    }
}

/// Progress reported while building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// The output directory is being materialized from a checkout.
    CheckoutStarted { output: PathBuf },
    StageStarted { stage: PipelineStage },
    /// `trigger` is the changed file for incremental builds.
    StageFinished {
        stage: PipelineStage,
        trigger: Option<PathBuf>,
    },
    RoutesWritten { count: usize },
    PagesWritten { count: usize },
    BuildSucceeded,
    RebuildSucceeded { path: PathBuf, stages: StageSet },
    RebuildFailed { path: PathBuf, message: String },
}

/// Orchestrator bookkeeping, owned by one [`Orchestrator`].
#[derive(Debug, Clone, Default)]
pub struct BuildState {
    /// The output directory has been checked (and materialized if needed).
    pub working_copy_ready: bool,
    /// Routes from the most recent route generation, used by page rendering.
    pub routes: Option<RouteTable>,
    pub full_builds: u32,
    pub rebuilds: u32,
    pub failures: u32,
}

/// Runs full and incremental builds.
pub struct Orchestrator<R: ToolRunner> {
    layout: Layout,
    tools: ToolCommands,
    render_command: Option<String>,
    checkout_branch: String,
    runner: R,
    state: BuildState,
    events: Option<Sender<BuildEvent>>,
}

/// Resolved command lines for the tool-backed stages.
#[derive(Debug, Clone)]
struct ToolCommands {
    transpile_scripts: String,
    transpile_stylesheets: String,
    bundle: String,
}

impl ToolCommands {
    fn resolve(
        pm: PackageManager,
        scripts: &ToolSpec,
        stylesheets: &ToolSpec,
        bundle: &ToolSpec,
    ) -> Self {
        Self {
            transpile_scripts: pm.tool_command(scripts),
            transpile_stylesheets: pm.tool_command(stylesheets),
            bundle: pm.tool_command(bundle),
        }
    }
}

impl<R: ToolRunner> Orchestrator<R> {
    pub fn new(root: &Path, config: &SiteConfig, runner: R) -> Self {
        let pm = PackageManager::resolve(config.tools.package_manager);
        let tools = &config.tools;
        Self {
            layout: Layout::resolve(root, &config.layout),
            tools: ToolCommands::resolve(
                pm,
                &tools.transpile_scripts,
                &tools.transpile_stylesheets,
                &tools.bundle,
            ),
            render_command: tools.render.clone(),
            checkout_branch: config.checkout.branch.clone(),
            runner,
            state: BuildState::default(),
            events: None,
        }
    }

    /// Report progress on `events`.
    pub fn with_events(mut self, events: Sender<BuildEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn state(&self) -> &BuildState {
        &self.state
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run every stage once, in order.
    pub fn full_build(&mut self) -> Result<(), PipelineError> {
        let result = self
            .ensure_working_copy()
            .and_then(|()| self.run_stages(&StageSet::full(), None));
        match result {
            Ok(()) => {
                self.state.full_builds += 1;
                self.emit(BuildEvent::BuildSucceeded);
                Ok(())
            }
            Err(e) => {
                self.state.failures += 1;
                Err(e)
            }
        }
    }

    /// Run the stages implied by one changed file.
    ///
    /// An empty classification is a no-op and does not touch the output
    /// directory.
    pub fn incremental_build(
        &mut self,
        path: &Path,
        classification: &Classification,
    ) -> Result<(), PipelineError> {
        if classification.is_empty() {
            return Ok(());
        }
        let result = self
            .ensure_working_copy()
            .and_then(|()| self.run_stages(&classification.stages, Some(path)));
        match result {
            Ok(()) => {
                self.state.rebuilds += 1;
                self.emit(BuildEvent::RebuildSucceeded {
                    path: path.to_path_buf(),
                    stages: classification.stages.clone(),
                });
                Ok(())
            }
            Err(e) => {
                self.state.failures += 1;
                self.emit(BuildEvent::RebuildFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Materialize the output directory from a checkout if it is missing.
    pub fn ensure_working_copy(&mut self) -> Result<(), PipelineError> {
        if self.state.working_copy_ready {
            return Ok(());
        }
        if !self.layout.output.exists() {
            self.emit(BuildEvent::CheckoutStarted {
                output: self.layout.output.clone(),
            });
            let command = format!(
                "git clone --branch {} . {}",
                self.checkout_branch,
                self.layout.output_rel.display()
            );
            self.runner
                .run(&command, &RunOptions::in_dir(&self.layout.root))?;
        }
        self.state.working_copy_ready = true;
        Ok(())
    }

    fn run_stages(
        &mut self,
        stages: &StageSet,
        trigger: Option<&Path>,
    ) -> Result<(), PipelineError> {
        for stage in stages.iter() {
            self.emit(BuildEvent::StageStarted { stage });
            self.run_stage(stage)?;
            self.emit(BuildEvent::StageFinished {
                stage,
                trigger: trigger.map(Path::to_path_buf),
            });
        }
        Ok(())
    }

    fn run_stage(&mut self, stage: PipelineStage) -> Result<(), PipelineError> {
        match stage {
            PipelineStage::RouteGeneration => {
                let table =
                    routes::generate_routes(&self.layout.components, &self.layout.route_module)?;
                self.emit(BuildEvent::RoutesWritten { count: table.len() });
                self.state.routes = Some(table);
            }
            PipelineStage::ScriptTranspile => {
                let command = self.tools.transpile_scripts.clone();
                self.run_tool(&command)?;
            }
            PipelineStage::PageRender => self.render_pages()?,
            PipelineStage::StylesheetTranspile => {
                let command = self.tools.transpile_stylesheets.clone();
                self.run_tool(&command)?;
            }
            PipelineStage::Bundle => {
                let command = self.tools.bundle.clone();
                self.run_tool(&command)?;
            }
        }
        Ok(())
    }

    fn run_tool(&self, command: &str) -> Result<(), ToolError> {
        self.runner
            .run(command, &RunOptions::in_dir(&self.layout.root))
            .map(|_| ())
    }

    fn render_pages(&mut self) -> Result<(), PipelineError> {
        // Without a prior route generation in this process, read the tree
        // as it stands; the route module on disk was produced from it.
        let table = match self.state.routes.take() {
            Some(table) => table,
            None => routes::scan_routes(&self.layout.components)?,
        };

        let result = match &self.render_command {
            Some(template) => {
                let renderer = CommandRenderer::new(&self.runner, template, &self.layout.root);
                write_pages(&self.layout, &table, &renderer)
            }
            None => write_pages(&self.layout, &table, &ShellRenderer::default()),
        };
        self.state.routes = Some(table);

        let count = result?;
        self.emit(BuildEvent::PagesWritten { count });
        Ok(())
    }

    fn emit(&self, event: BuildEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

/// Render and write every route's page. Returns the number written.
fn write_pages(
    layout: &Layout,
    table: &RouteTable,
    renderer: &impl PageRenderer,
) -> Result<usize, PipelineError> {
    for route in table.entries() {
        let html = renderer.render(&RenderRequest {
            route,
            routes: table,
            shell: &layout.page_shell,
        })?;
        let page = layout.page_path(&route.path);
        if let Some(parent) = page.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&page, format!("{}\n", html.trim()))?;
    }
    Ok(table.len())
}
