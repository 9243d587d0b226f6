//! Shared types used across the pipeline.
//!
//! [`PipelineStage`] declares the stages in full-build order, and the derived
//! `Ord` follows declaration order. [`StageSet`] is backed by a `BTreeSet`, so
//! iterating any set of stages always yields them in full-build order. An
//! incremental run is therefore an order-consistent subsequence of a full
//! build by construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One discrete unit of the build pipeline.
///
/// Variant order is the full-build order:
///
/// ```text
/// RouteGeneration → ScriptTranspile → PageRender → StylesheetTranspile → Bundle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Regenerate the route module from the components tree.
    RouteGeneration,
    /// Transpile scripts (the transpiled registry imports the route module).
    ScriptTranspile,
    /// Render one HTML page per route (loads the transpiled route module).
    PageRender,
    /// Compile stylesheets.
    StylesheetTranspile,
    /// Bundle the transpiled scripts into the application payload.
    Bundle,
}

impl PipelineStage {
    /// Every stage, in full-build order.
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::RouteGeneration,
        PipelineStage::ScriptTranspile,
        PipelineStage::PageRender,
        PipelineStage::StylesheetTranspile,
        PipelineStage::Bundle,
    ];

    /// Short human-readable label used in status output.
    pub fn label(self) -> &'static str {
        match self {
            PipelineStage::RouteGeneration => "routes",
            PipelineStage::ScriptTranspile => "scripts",
            PipelineStage::PageRender => "pages",
            PipelineStage::StylesheetTranspile => "stylesheets",
            PipelineStage::Bundle => "bundle",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An ordered set of stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageSet(BTreeSet<PipelineStage>);

impl StageSet {
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// All five stages.
    pub fn full() -> Self {
        PipelineStage::ALL.into_iter().collect()
    }

    pub fn insert(&mut self, stage: PipelineStage) {
        self.0.insert(stage);
    }

    pub fn contains(&self, stage: PipelineStage) -> bool {
        self.0.contains(&stage)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Stages in full-build order.
    pub fn iter(&self) -> impl Iterator<Item = PipelineStage> + '_ {
        self.0.iter().copied()
    }

    /// Position of `stage` within this set's execution order.
    pub fn position(&self, stage: PipelineStage) -> Option<usize> {
        self.iter().position(|s| s == stage)
    }
}

impl FromIterator<PipelineStage> for StageSet {
    fn from_iter<I: IntoIterator<Item = PipelineStage>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for StageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.iter().map(PipelineStage::label).collect();
        write!(f, "{{{}}}", labels.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_set_iterates_in_build_order() {
        let order: Vec<_> = StageSet::full().iter().collect();
        assert_eq!(order, PipelineStage::ALL.to_vec());
    }

    #[test]
    fn insertion_order_does_not_affect_iteration() {
        let set: StageSet = [
            PipelineStage::Bundle,
            PipelineStage::RouteGeneration,
            PipelineStage::ScriptTranspile,
        ]
        .into_iter()
        .collect();

        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![
                PipelineStage::RouteGeneration,
                PipelineStage::ScriptTranspile,
                PipelineStage::Bundle,
            ]
        );
    }

    #[test]
    fn duplicate_stages_collapse() {
        let mut set = StageSet::empty();
        set.insert(PipelineStage::PageRender);
        set.insert(PipelineStage::PageRender);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn display_lists_labels() {
        let set: StageSet = [PipelineStage::ScriptTranspile, PipelineStage::Bundle]
            .into_iter()
            .collect();
        assert_eq!(set.to_string(), "{scripts, bundle}");
        assert_eq!(StageSet::empty().to_string(), "{}");
    }

    #[test]
    fn position_follows_build_order() {
        let set = StageSet::full();
        assert_eq!(set.position(PipelineStage::RouteGeneration), Some(0));
        assert_eq!(set.position(PipelineStage::Bundle), Some(4));
        assert_eq!(StageSet::empty().position(PipelineStage::Bundle), None);
    }
}
