use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::forest::RandomForestRegressor;
use crate::config::AnalysisConfig;
use crate::data::model::Table;
use crate::error::ModelError;

// ---------------------------------------------------------------------------
// Feature-importance table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// One row per model input column, sorted by descending importance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImportanceTable {
    rows: Vec<FeatureImportance>,
}

impl ImportanceTable {
    /// Pair names with scores and sort descending. Ties keep input order.
    pub fn new(features: &[String], scores: &[f64]) -> Self {
        let mut rows: Vec<FeatureImportance> = features
            .iter()
            .zip(scores)
            .map(|(feature, &importance)| FeatureImportance {
                feature: feature.clone(),
                importance,
            })
            .collect();
        rows.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        ImportanceTable { rows }
    }

    pub fn rows(&self) -> &[FeatureImportance] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature names, most important first.
    pub fn ranking(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.feature.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Training entry-point
// ---------------------------------------------------------------------------

/// Numeric values of a column, refusing text and missing cells.
fn numeric_column(table: &Table, name: &str) -> Result<Vec<f64>, ModelError> {
    let column = table
        .column(name)
        .ok_or_else(|| ModelError::UnknownColumn(name.to_string()))?;
    column
        .values
        .iter()
        .map(|v| v.as_f64().filter(|f| f.is_finite()))
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| ModelError::NonNumericColumn(name.to_string()))
}

/// Fit a random forest of `features` against `target` and rank the features.
pub fn feature_importances(
    table: &Table,
    features: &[String],
    target: &str,
    config: &AnalysisConfig,
) -> Result<ImportanceTable, ModelError> {
    if features.is_empty() {
        return Err(ModelError::NoFeatures);
    }
    if table.is_empty() {
        return Err(ModelError::EmptyInput);
    }

    let y = Array1::from_vec(numeric_column(table, target)?);

    let n_rows = table.len();
    let mut x = Array2::<f64>::zeros((n_rows, features.len()));
    for (j, name) in features.iter().enumerate() {
        let values = numeric_column(table, name)?;
        for (i, v) in values.into_iter().enumerate() {
            x[[i, j]] = v;
        }
    }

    let mut forest = RandomForestRegressor::new(config.n_estimators)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split)
        .with_min_samples_leaf(config.min_samples_leaf)
        .with_random_state(config.random_state);
    forest.fit(&x, &y)?;

    let scores = forest
        .feature_importances()
        .ok_or(ModelError::NotFitted)?
        .to_vec();

    log::info!(
        "trained {} trees on {} rows, {} features",
        forest.n_trees(),
        n_rows,
        features.len()
    );

    Ok(ImportanceTable::new(features, &scores))
}
