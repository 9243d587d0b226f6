//! Route table generation.
//!
//! Stage 1 of the build pipeline. Walks the components directory, derives one
//! route per script component, and writes the route module that the
//! transpiled application imports.
//!
//! ## Component Tree
//!
//! ```text
//! sources/components/            # Route tree root
//! ├── Home.jsx                   # → Home       /Home.html
//! ├── logo.svg                   # skipped (not a script)
//! └── blog/
//!     ├── Index.jsx              # → BlogIndex  /blog/Index.html
//!     └── Post.jsx               # → BlogPost   /blog/Post.html
//! ```
//!
//! Traversal is depth-first pre-order with siblings sorted by file name, so
//! the table (and the module text) is identical for an unchanged tree.
//! Dotfiles and dot-directories are skipped.
//!
//! ## Route Module
//!
//! ```text
//! import Home from './components/Home';
//! import BlogPost from './components/blog/Post';
//!
//! const routes = [
//!     { path: '/Home.html', exact: true, component: Home },
//!     { path: '/blog/Post.html', exact: true, component: BlogPost }
//! ];
//!
//! export default routes;
//! ```
//!
//! ## Identifier Collisions
//!
//! Two paths can normalise to the same identifier (`blog/Post.jsx` and
//! `blogPost.jsx`, or `a/bc.jsx` and `ab/c.jsx`). The later path in
//! traversal order wins, the entry keeps the position of the first one, and
//! a warning is logged. A path with no
//! letters at all (`404.jsx`) has no usable identifier and is skipped with a
//! warning.

use crate::naming::{self, ComponentName};
use serde::Serialize;
use std::fs;
use std::path::{Component, Path};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to inspect component tree: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Node type in an inspected tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

/// One file or directory in the component tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub kind: NodeKind,
    /// Ordered children. Always empty for files.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            children: Vec::new(),
        }
    }

    pub fn dir(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            children,
        }
    }
}

/// A single route: identifier and extension-free posix path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub identifier: String,
    pub path: String,
}

impl RouteEntry {
    /// Page url: `/` + path + `.html`.
    pub fn url(&self) -> String {
        format!("/{}.html", self.path)
    }
}

/// Insertion-ordered map from identifier to route path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a route. An existing identifier is overwritten in place and
    /// the replaced path is returned.
    pub fn insert(&mut self, identifier: String, path: String) -> Option<String> {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.identifier == identifier) {
            return Some(std::mem::replace(&mut existing.path, path));
        }
        self.entries.push(RouteEntry { identifier, path });
        None
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.identifier == identifier)
            .map(|e| e.path.as_str())
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Recursively list `root` into a [`TreeNode`].
///
/// Siblings are sorted by file name and dotfiles are skipped.
pub fn inspect_tree(root: &Path) -> Result<TreeNode, RouteError> {
    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    // Open directories from the root down to the current entry's parent.
    let mut stack = vec![TreeNode::dir(root_name, Vec::new())];

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = entry?;
        while stack.len() > entry.depth() {
            close_directory(&mut stack);
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().is_dir() {
            stack.push(TreeNode::dir(name, Vec::new()));
        } else if let Some(parent) = stack.last_mut() {
            parent.children.push(TreeNode::file(name));
        }
    }

    while stack.len() > 1 {
        close_directory(&mut stack);
    }
    stack
        .pop()
        .ok_or_else(|| std::io::Error::other("component tree walk lost its root").into())
}

fn close_directory(stack: &mut Vec<TreeNode>) {
    if let Some(done) = stack.pop()
        && let Some(parent) = stack.last_mut()
    {
        parent.children.push(done);
    }
}

/// Derive the route table from an inspected component tree.
///
/// The root node is the components directory itself; its name is not part
/// of any route path.
pub fn build_route_table(root: &TreeNode) -> RouteTable {
    let mut table = RouteTable::new();
    collect_routes(&root.children, "", &mut table);
    table
}

fn collect_routes(nodes: &[TreeNode], prefix: &str, table: &mut RouteTable) {
    for node in nodes {
        match node.kind {
            NodeKind::Directory => {
                let dir_path = naming::join_route_path(prefix, &node.name);
                collect_routes(&node.children, &dir_path, table);
            }
            NodeKind::File => {
                let Some(ComponentName {
                    route_path,
                    identifier,
                }) = naming::component_name(prefix, &node.name)
                else {
                    continue;
                };
                if identifier.is_empty() {
                    tracing::warn!(
                        path = %route_path,
                        "component has no letters to name it; skipped"
                    );
                    continue;
                }
                if let Some(previous) = table.insert(identifier.clone(), route_path.clone()) {
                    tracing::warn!(
                        %identifier,
                        replaced = %previous,
                        by = %route_path,
                        "route identifier collision"
                    );
                }
            }
        }
    }
}

/// Import base for components, relative to the route module's directory.
///
/// `sources/routing.js` + `sources/components` → `./components`.
pub fn import_base(route_module: &Path, components_dir: &Path) -> String {
    let from: Vec<Component> = route_module
        .parent()
        .map(|p| p.components().collect())
        .unwrap_or_default();
    let to: Vec<Component> = components_dir.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<String> = Vec::new();
    parts.extend(std::iter::repeat_n("..".to_string(), from.len() - common));
    parts.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    if parts.first().is_none_or(|p| p != "..") {
        parts.insert(0, ".".to_string());
    }
    parts.join("/")
}

/// Render the route module text.
pub fn render_route_module(table: &RouteTable, import_base: &str) -> String {
    let imports = table
        .entries()
        .iter()
        .map(|e| format!("import {} from '{}/{}';", e.identifier, import_base, e.path))
        .collect::<Vec<_>>()
        .join("\n");

    let routes = table
        .entries()
        .iter()
        .map(|e| {
            format!(
                "{{ path: '{}', exact: true, component: {} }}",
                e.url(),
                e.identifier
            )
        })
        .collect::<Vec<_>>()
        .join(",\n    ");

    let sections = [
        imports,
        format!("const routes = [\n    {routes}\n];"),
        "export default routes;".to_string(),
    ];
    format!("{}\n", sections.join("\n\n"))
}

/// Inspect the components tree and derive its route table without writing.
pub fn scan_routes(components_dir: &Path) -> Result<RouteTable, RouteError> {
    let tree = inspect_tree(components_dir)?;
    Ok(build_route_table(&tree))
}

/// Regenerate the route module on disk and return the table it describes.
pub fn generate_routes(
    components_dir: &Path,
    route_module: &Path,
) -> Result<RouteTable, RouteError> {
    let table = scan_routes(components_dir)?;
    let module = render_route_module(&table, &import_base(route_module, components_dir));
    if let Some(parent) = route_module.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(route_module, module)?;
    tracing::debug!(routes = table.len(), module = %route_module.display(), "route module written");
    Ok(table)
}
