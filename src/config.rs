use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Analysis parameters
// ---------------------------------------------------------------------------

/// Smallest tree count the UI accepts; the tree-count control steps by this.
pub const TREE_STEP: usize = 10;

/// Parameters for one Analyze run.
///
/// Only `n_estimators` and `random_state` are exposed in the side panel; the
/// remaining fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of trees in the forest.
    pub n_estimators: usize,
    /// Seed of the forest's random number streams.
    pub random_state: u64,
    /// Maximum tree depth (unbounded when `None`).
    pub max_depth: Option<usize>,
    /// Minimum samples to split a node.
    pub min_samples_split: usize,
    /// Minimum samples per leaf.
    pub min_samples_leaf: usize,
    /// Histogram bins on the pair grid diagonal; chosen from the row count
    /// when `None`.
    pub histogram_bins: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            random_state: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            histogram_bins: None,
        }
    }
}

impl AnalysisConfig {
    /// Histogram bin count for `n` observations (Sturges' rule unless fixed).
    pub fn bins_for(&self, n: usize) -> usize {
        self.histogram_bins
            .unwrap_or_else(|| ((n.max(1) as f64).log2().ceil() as usize + 1).clamp(5, 50))
    }
}
