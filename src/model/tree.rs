//! Variance-reduction regression tree (CART)

use ndarray::{Array1, Array2};

use crate::error::ModelError;

/// Best split found for one node
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    /// Reduction of the summed squared error, i.e. `n * impurity decrease`
    gain: f64,
}

/// Regression tree grown on a (possibly bootstrapped) set of row indices.
///
/// Only the impurity decrease of each split is kept; the fitted tree is
/// summarised by its importances, leaf count and depth.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    feature_importances: Option<Array1<f64>>,
    n_leaves: usize,
    depth: usize,
}

impl Default for RegressionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RegressionTree {
    pub fn new() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            feature_importances: None,
            n_leaves: 0,
            depth: 0,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Fit on the rows listed in `indices` (duplicates allowed).
    ///
    /// Importances are normalized to sum to 1, or left at zero when the tree
    /// never splits.
    pub fn fit(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
    ) -> Result<&mut Self, ModelError> {
        if x.nrows() != y.len() {
            return Err(ModelError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        if indices.is_empty() {
            return Err(ModelError::EmptyInput);
        }

        let mut importances = vec![0.0; x.ncols()];
        let mut indices = indices.to_vec();
        self.n_leaves = 0;
        self.depth = self.grow(x, y, &mut indices, 0, &mut importances);

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    /// Split `indices` recursively; returns the depth of the subtree.
    fn grow(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &mut [usize],
        depth: usize,
        importances: &mut [f64],
    ) -> usize {
        let n_samples = indices.len();

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.is_some_and(|d| depth >= d)
            || is_pure(y, indices);

        let split = if should_stop {
            None
        } else {
            self.find_best_split(x, y, indices)
        };
        let Some(split) = split else {
            self.n_leaves += 1;
            return depth;
        };

        importances[split.feature_idx] += split.gain;

        // Stable in-place partition: left block first.
        indices.sort_by_key(|&i| x[[i, split.feature_idx]] > split.threshold);
        let n_left = indices
            .iter()
            .take_while(|&&i| x[[i, split.feature_idx]] <= split.threshold)
            .count();
        let (left_idx, right_idx) = indices.split_at_mut(n_left);

        let left = self.grow(x, y, left_idx, depth + 1, importances);
        let right = self.grow(x, y, right_idx, depth + 1, importances);
        left.max(right)
    }

    /// Scan every feature with sorted prefix sums and return the split with
    /// the largest squared-error reduction.
    ///
    /// A split must remove more than a `1e-12` share of the node's squared
    /// error, so the cut-off follows the scale of the target.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let parent_sse = total_sq - total_sum * total_sum / n as f64;
        if parent_sse <= 0.0 {
            return None;
        }
        let min_gain = parent_sse * 1e-12;

        let mut best: Option<SplitCandidate> = None;
        let mut order: Vec<usize> = indices.to_vec();

        for feature_idx in 0..x.ncols() {
            order.sort_by(|&a, &b| x[[a, feature_idx]].total_cmp(&x[[b, feature_idx]]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for pos in 1..n {
                let yi = y[order[pos - 1]];
                left_sum += yi;
                left_sq += yi * yi;

                let lo = x[[order[pos - 1], feature_idx]];
                let hi = x[[order[pos], feature_idx]];
                if lo >= hi {
                    continue;
                }
                let n_left = pos;
                let n_right = n - pos;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = left_sq - left_sum * left_sum / n_left as f64;
                let right_sse = right_sq - right_sum * right_sum / n_right as f64;
                let gain = parent_sse - left_sse - right_sse;

                if gain > best.as_ref().map_or(min_gain, |b| b.gain) {
                    let mid = lo + (hi - lo) / 2.0;
                    let threshold = if mid >= hi { lo } else { mid };
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Number of leaves of the fitted tree
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    /// Depth of the fitted tree (0 for a single leaf)
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// All targets equal up to rounding at their own magnitude.
fn is_pure(y: &Array1<f64>, indices: &[usize]) -> bool {
    let first = y[indices[0]];
    let scale = indices.iter().fold(0.0_f64, |m, &i| m.max(y[i].abs()));
    let tol = f64::EPSILON * scale;
    indices.iter().all(|&i| (y[i] - first).abs() <= tol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fits_step_function() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![0.0, 0.0, 0.0, 5.0, 5.0, 5.0];
        let indices: Vec<usize> = (0..6).collect();

        let mut tree = RegressionTree::new();
        tree.fit(&x, &y, &indices).unwrap();

        // One split separates the two plateaus; both sides are pure.
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.feature_importances().unwrap()[0], 1.0);
    }

    #[test]
    fn test_importance_goes_to_informative_feature() {
        let x = array![
            [1.0, 7.0],
            [2.0, 7.0],
            [3.0, 7.0],
            [4.0, 7.0],
        ];
        let y = array![1.0, 2.0, 3.0, 4.0];
        let indices: Vec<usize> = (0..4).collect();

        let mut tree = RegressionTree::new();
        tree.fit(&x, &y, &indices).unwrap();

        let imp = tree.feature_importances().unwrap();
        assert!((imp[0] - 1.0).abs() < 1e-12);
        assert_eq!(imp[1], 0.0);
        assert_eq!(tree.n_leaves(), 4);
    }

    #[test]
    fn test_constant_target_has_no_splits() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![4.0, 4.0, 4.0];

        let mut tree = RegressionTree::new();
        tree.fit(&x, &y, &[0, 1, 2]).unwrap();

        assert_eq!(tree.feature_importances().unwrap().sum(), 0.0);
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_small_scale_target_still_splits() {
        let x = array![[1.0, 3.0], [2.0, 1.0], [3.0, 4.0], [4.0, 2.0]];
        let y = array![1e-8, 2e-8, 3e-8, 4e-8];

        let mut tree = RegressionTree::new();
        tree.fit(&x, &y, &[0, 1, 2, 3]).unwrap();

        let imp = tree.feature_importances().unwrap();
        assert!(imp[0] > imp[1], "importances = {imp}");
        assert_eq!(tree.n_leaves(), 4);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];

        let mut tree = RegressionTree::new().with_max_depth(Some(1));
        tree.fit(&x, &y, &[0, 1, 2, 3]).unwrap();

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn test_shape_mismatch() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0];
        let err = RegressionTree::new().fit(&x, &y, &[0]).unwrap_err();
        assert!(matches!(err, ModelError::ShapeError { .. }));
    }
}
