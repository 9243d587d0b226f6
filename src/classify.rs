//! Stage classification for changed files.
//!
//! Maps one changed path to the stages an incremental build must run. The
//! decision depends only on the file's extension category and on whether it
//! lies under the components tree. File contents are never inspected.
//!
//! | Category | Extensions | Stages |
//! |---|---|---|
//! | Page template | `.pug` | PageRender |
//! | Stylesheet | `.scss` | StylesheetTranspile |
//! | Script under components | `.js`, `.jsx` | RouteGeneration, ScriptTranspile, Bundle |
//! | Other script | `.js`, `.jsx` | ScriptTranspile, Bundle |
//! | Other | anything else | none |

use crate::naming::SCRIPT_EXTENSIONS;
use crate::types::{PipelineStage, StageSet};
use std::path::{Path, PathBuf};

const PAGE_TEMPLATE_EXTENSIONS: &[&str] = &["pug"];
const STYLESHEET_EXTENSIONS: &[&str] = &["scss"];

/// Extension category of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    PageTemplate,
    Stylesheet,
    Script,
    Other,
}

impl FileCategory {
    /// Categorise by extension. Evaluated in priority order: page template,
    /// stylesheet, script.
    pub fn of(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return FileCategory::Other;
        };
        if PAGE_TEMPLATE_EXTENSIONS.contains(&ext) {
            FileCategory::PageTemplate
        } else if STYLESHEET_EXTENSIONS.contains(&ext) {
            FileCategory::Stylesheet
        } else if SCRIPT_EXTENSIONS.contains(&ext) {
            FileCategory::Script
        } else {
            FileCategory::Other
        }
    }

    /// Whether the watch loop tracks files of this category.
    pub fn is_watched(self) -> bool {
        !matches!(self, FileCategory::Other)
    }
}

/// Stages implied by one changed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: FileCategory,
    pub stages: StageSet,
}

impl Classification {
    /// True when the route module must be regenerated before transpiling.
    pub fn requires_route_regeneration(&self) -> bool {
        self.stages.contains(PipelineStage::RouteGeneration)
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Classifies changed paths against a components directory.
///
/// `components_dir` must be expressed the same way as the paths passed to
/// [`classify`](Self::classify): both absolute, or both relative to the same
/// root.
#[derive(Debug, Clone)]
pub struct StageClassifier {
    components_dir: PathBuf,
}

impl StageClassifier {
    pub fn new(components_dir: impl Into<PathBuf>) -> Self {
        Self {
            components_dir: components_dir.into(),
        }
    }

    pub fn components_dir(&self) -> &Path {
        &self.components_dir
    }

    pub fn classify(&self, path: &Path) -> Classification {
        let category = FileCategory::of(path);
        let stages: StageSet = match category {
            FileCategory::PageTemplate => [PipelineStage::PageRender].into_iter().collect(),
            FileCategory::Stylesheet => [PipelineStage::StylesheetTranspile].into_iter().collect(),
            FileCategory::Script if path.starts_with(&self.components_dir) => [
                PipelineStage::RouteGeneration,
                PipelineStage::ScriptTranspile,
                PipelineStage::Bundle,
            ]
            .into_iter()
            .collect(),
            FileCategory::Script => [PipelineStage::ScriptTranspile, PipelineStage::Bundle]
                .into_iter()
                .collect(),
            FileCategory::Other => StageSet::empty(),
        };
        Classification { category, stages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> StageClassifier {
        StageClassifier::new("sources/components")
    }

    fn stages(path: &str) -> Vec<PipelineStage> {
        classifier().classify(Path::new(path)).stages.iter().collect()
    }

    #[test]
    fn category_by_extension() {
        assert_eq!(FileCategory::of(Path::new("a/skeleton.pug")), FileCategory::PageTemplate);
        assert_eq!(FileCategory::of(Path::new("app.scss")), FileCategory::Stylesheet);
        assert_eq!(FileCategory::of(Path::new("Home.jsx")), FileCategory::Script);
        assert_eq!(FileCategory::of(Path::new("util.js")), FileCategory::Script);
        assert_eq!(FileCategory::of(Path::new("logo.png")), FileCategory::Other);
        assert_eq!(FileCategory::of(Path::new("Makefile")), FileCategory::Other);
    }

    #[test]
    fn page_template_renders_pages() {
        assert_eq!(stages("sources/skeleton.pug"), vec![PipelineStage::PageRender]);
    }

    #[test]
    fn stylesheet_transpiles_stylesheets() {
        assert_eq!(
            stages("sources/app.scss"),
            vec![PipelineStage::StylesheetTranspile]
        );
    }

    #[test]
    fn component_script_regenerates_routes() {
        let c = classifier().classify(Path::new("sources/components/About.jsx"));
        assert!(c.requires_route_regeneration());
        assert_eq!(
            c.stages.iter().collect::<Vec<_>>(),
            vec![
                PipelineStage::RouteGeneration,
                PipelineStage::ScriptTranspile,
                PipelineStage::Bundle,
            ]
        );
    }

    #[test]
    fn nested_component_script_regenerates_routes() {
        assert!(classifier()
            .classify(Path::new("sources/components/blog/Post.jsx"))
            .requires_route_regeneration());
    }

    #[test]
    fn other_script_transpiles_and_bundles() {
        let c = classifier().classify(Path::new("sources/application.js"));
        assert!(!c.requires_route_regeneration());
        assert_eq!(
            c.stages.iter().collect::<Vec<_>>(),
            vec![PipelineStage::ScriptTranspile, PipelineStage::Bundle]
        );
    }

    #[test]
    fn sibling_with_common_prefix_is_not_a_component() {
        // Path::starts_with compares whole components, not string prefixes.
        assert!(!classifier()
            .classify(Path::new("sources/components-old/Home.jsx"))
            .requires_route_regeneration());
    }

    #[test]
    fn unmatched_extension_is_empty() {
        assert!(classifier().classify(Path::new("sources/logo.svg")).is_empty());
        assert!(classifier().classify(Path::new("sources/components/notes.md")).is_empty());
    }

    #[test]
    fn absolute_paths_classify_against_absolute_components_dir() {
        let classifier = StageClassifier::new("/site/sources/components");
        assert!(classifier
            .classify(Path::new("/site/sources/components/Home.jsx"))
            .requires_route_regeneration());
    }

    #[test]
    fn script_transpile_always_followed_by_bundle() {
        for path in [
            "sources/components/Home.jsx",
            "sources/components/blog/Post.js",
            "sources/application.js",
            "sources/lib/util.jsx",
        ] {
            let set = classifier().classify(Path::new(path)).stages;
            let transpile = set.position(PipelineStage::ScriptTranspile).unwrap();
            let bundle = set.position(PipelineStage::Bundle).unwrap();
            assert!(transpile < bundle, "{path}");
            if let Some(routes) = set.position(PipelineStage::RouteGeneration) {
                assert!(routes < transpile, "{path}");
            }
        }
    }
}
