//! Page rendering.
//!
//! The page render stage writes one HTML file per route. Rendering itself is
//! delegated to a [`PageRenderer`]:
//!
//! - [`CommandRenderer`] runs a configured external command once per route
//!   and takes its stdout as the page. This is how server-side rendering
//!   plugs in: the command loads the transpiled route module and the page
//!   shell, and renders the route it is given.
//! - [`ShellRenderer`] needs no external tooling. It emits a client-side shell
//!   with an empty `#context` mount point and the bundled application
//!   script, which renders the route in the browser.
//!
//! The page-shell template (`layout.page_shell`) is only meaningful to a
//! [`CommandRenderer`]: it is handed over as `{shell}`. [`ShellRenderer`]
//! never reads it, so without a `tools.render` command a template edit
//! rewrites the same pages.

use crate::routes::{RouteEntry, RouteTable};
use crate::tools::{RunOptions, ToolError, ToolRunner};
use maud::{DOCTYPE, Markup, html};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Renderer failed: {0}")]
    Tool(#[from] ToolError),
    #[error("Renderer output for {route} is not UTF-8")]
    Utf8 { route: String },
}

/// Everything a renderer gets for one page.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub route: &'a RouteEntry,
    pub routes: &'a RouteTable,
    pub shell: &'a Path,
}

/// Produces the HTML for one route.
pub trait PageRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<String, RenderError>;
}

/// Renders by running an external command per route.
///
/// `{route}` in the template expands to the route url, `{shell}` to the
/// page-shell path.
pub struct CommandRenderer<'a, R: ToolRunner> {
    runner: &'a R,
    template: &'a str,
    cwd: PathBuf,
}

impl<'a, R: ToolRunner> CommandRenderer<'a, R> {
    pub fn new(runner: &'a R, template: &'a str, cwd: &Path) -> Self {
        Self {
            runner,
            template,
            cwd: cwd.to_path_buf(),
        }
    }

    pub fn command_for(&self, request: &RenderRequest<'_>) -> String {
        self.template
            .replace("{route}", &request.route.url())
            .replace("{shell}", &request.shell.to_string_lossy())
    }
}

impl<R: ToolRunner> PageRenderer for CommandRenderer<'_, R> {
    fn render(&self, request: &RenderRequest<'_>) -> Result<String, RenderError> {
        let command = self.command_for(request);
        let output = self.runner.run(&command, &RunOptions::in_dir(&self.cwd))?;
        String::from_utf8(output.stdout).map_err(|_| RenderError::Utf8 {
            route: request.route.url(),
        })
    }
}

/// Client-side shell document for a route.
///
/// The document is fixed; [`RenderRequest::shell`] is ignored.
#[derive(Debug, Clone)]
pub struct ShellRenderer {
    /// Url of the bundled application script.
    pub script_src: String,
}

impl Default for ShellRenderer {
    fn default() -> Self {
        Self {
            script_src: "/resources/application.js".to_string(),
        }
    }
}

impl ShellRenderer {
    fn document(&self, route: &RouteEntry) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (route.identifier) }
                }
                body {
                    div id="context" data-route=(route.url()) {}
                    script src=(self.script_src) {}
                }
            }
        }
    }
}

impl PageRenderer for ShellRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<String, RenderError> {
        Ok(self.document(request.route).into_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tests::MockRunner;

    fn post() -> RouteEntry {
        RouteEntry {
            identifier: "BlogPost".into(),
            path: "blog/Post".into(),
        }
    }

    #[test]
    fn command_template_expansion() {
        let runner = MockRunner::new();
        let renderer =
            CommandRenderer::new(&runner, "node render.js {route} {shell}", Path::new("."));
        let route = post();
        let routes = RouteTable::new();
        let request = RenderRequest {
            route: &route,
            routes: &routes,
            shell: Path::new("sources/skeleton.pug"),
        };
        assert_eq!(
            renderer.command_for(&request),
            "node render.js /blog/Post.html sources/skeleton.pug"
        );
    }

    #[test]
    fn command_renderer_returns_stdout() {
        let runner = MockRunner::new().respond_when("/blog/Post.html", "<main>post</main>\n");
        let renderer = CommandRenderer::new(&runner, "node render.js {route}", Path::new("."));
        let route = post();
        let routes = RouteTable::new();
        let html = renderer
            .render(&RenderRequest {
                route: &route,
                routes: &routes,
                shell: Path::new("skeleton.pug"),
            })
            .unwrap();
        assert_eq!(html, "<main>post</main>\n");
        assert_eq!(runner.recorded(), vec!["node render.js /blog/Post.html"]);
    }

    #[test]
    fn command_renderer_failure_is_tool_error() {
        let runner = MockRunner::new().fail_when("render.js", 7);
        let renderer = CommandRenderer::new(&runner, "node render.js {route}", Path::new("."));
        let route = post();
        let routes = RouteTable::new();
        let err = renderer
            .render(&RenderRequest {
                route: &route,
                routes: &routes,
                shell: Path::new("skeleton.pug"),
            })
            .unwrap_err();
        assert!(matches!(err, RenderError::Tool(_)));
    }

    #[test]
    fn shell_renderer_ignores_shell_template() {
        let route = post();
        let routes = RouteTable::new();
        let render = |shell: &str| {
            ShellRenderer::default()
                .render(&RenderRequest {
                    route: &route,
                    routes: &routes,
                    shell: Path::new(shell),
                })
                .unwrap()
        };
        assert_eq!(render("sources/skeleton.pug"), render("elsewhere/other.pug"));
    }

    #[test]
    fn shell_includes_mount_point_and_bundle() {
        let route = post();
        let routes = RouteTable::new();
        let html = ShellRenderer::default()
            .render(&RenderRequest {
                route: &route,
                routes: &routes,
                shell: Path::new("skeleton.pug"),
            })
            .unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<div id="context" data-route="/blog/Post.html"></div>"#));
        assert!(html.contains(r#"<script src="/resources/application.js"></script>"#));
        assert!(html.contains("<title>BlogPost</title>"));
    }
}
