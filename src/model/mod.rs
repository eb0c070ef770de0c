/// Feature-importance model: a bootstrapped forest of variance-reduction
/// regression trees, and the sorted importance table derived from it.

pub mod forest;
pub mod importance;
pub mod tree;

pub use importance::{feature_importances, ImportanceTable};
