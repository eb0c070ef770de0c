use serde::{Deserialize, Serialize};

use super::model::Table;
use crate::error::SelectionError;

// ---------------------------------------------------------------------------
// Column roles
// ---------------------------------------------------------------------------

/// The user's column-role assignment.
///
/// Roles are kept disjoint by construction: choosing a result column removes
/// it from the predictors, the numeric set is always a subset of the
/// predictors, and the hue is always one of the discrete predictors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSelection {
    pub result: Option<String>,
    predictors: Vec<String>,
    numeric: Vec<String>,
    hue: Option<String>,
}

impl ColumnSelection {
    /// Initial selection for a freshly loaded table: the first column is the
    /// result, nothing else is chosen.
    pub fn for_table(table: &Table) -> Self {
        ColumnSelection {
            result: table.column_names().into_iter().next(),
            ..Default::default()
        }
    }

    pub fn predictors(&self) -> &[String] {
        &self.predictors
    }

    /// Numeric predictors, in predictor order.
    pub fn numeric(&self) -> Vec<String> {
        self.predictors
            .iter()
            .filter(|p| self.numeric.contains(p))
            .cloned()
            .collect()
    }

    /// Predictors not marked numeric, in predictor order.
    pub fn discrete(&self) -> Vec<String> {
        self.predictors
            .iter()
            .filter(|p| !self.numeric.contains(p))
            .cloned()
            .collect()
    }

    pub fn hue(&self) -> Option<&str> {
        self.hue.as_deref()
    }

    pub fn is_predictor(&self, column: &str) -> bool {
        self.predictors.iter().any(|p| p == column)
    }

    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric.iter().any(|p| p == column)
    }

    pub fn set_result(&mut self, column: String) {
        self.predictors.retain(|p| *p != column);
        self.numeric.retain(|p| *p != column);
        self.result = Some(column);
        self.reconcile_hue();
    }

    /// Add or remove a predictor. The result column can never be a predictor.
    pub fn set_predictor(&mut self, column: &str, selected: bool) {
        if selected {
            if self.result.as_deref() != Some(column) && !self.is_predictor(column) {
                self.predictors.push(column.to_string());
            }
        } else {
            self.predictors.retain(|p| p != column);
            self.numeric.retain(|p| p != column);
        }
        self.reconcile_hue();
    }

    /// Mark a predictor as numeric (or back to discrete).
    pub fn set_numeric(&mut self, column: &str, numeric: bool) {
        if numeric {
            if self.is_predictor(column) && !self.is_numeric(column) {
                self.numeric.push(column.to_string());
            }
        } else {
            self.numeric.retain(|p| p != column);
        }
        self.reconcile_hue();
    }

    /// Choose the hue column; ignored unless it is a discrete predictor.
    pub fn set_hue(&mut self, column: &str) {
        if self.discrete().iter().any(|d| d == column) {
            self.hue = Some(column.to_string());
        }
    }

    /// Keep the hue pointing at a discrete predictor, falling back to the
    /// first one (or none) when the current choice is no longer valid.
    fn reconcile_hue(&mut self) {
        let discrete = self.discrete();
        let still_valid = self
            .hue
            .as_ref()
            .is_some_and(|h| discrete.contains(h));
        if !still_valid {
            self.hue = discrete.into_iter().next();
        }
    }

    /// Check the selection against the table it will be applied to.
    pub fn validate(&self, table: &Table) -> Result<(), SelectionError> {
        let result = self.result.as_ref().ok_or(SelectionError::NoResultColumn)?;
        if !table.has_column(result) {
            return Err(SelectionError::UnknownColumn(result.clone()));
        }
        if self.is_predictor(result) {
            return Err(SelectionError::ResultIsPredictor(result.clone()));
        }
        for column in self.predictors.iter().chain(self.hue.iter()) {
            if !table.has_column(column) {
                return Err(SelectionError::UnknownColumn(column.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column, ColumnKind};

    fn table() -> Table {
        let col = |name: &str| Column::new(name, ColumnKind::Integer, vec![CellValue::Integer(1)]);
        Table::from_columns(vec![col("y"), col("a"), col("b"), col("c")]).unwrap()
    }

    #[test]
    fn result_defaults_to_first_column() {
        let sel = ColumnSelection::for_table(&table());
        assert_eq!(sel.result.as_deref(), Some("y"));
        assert!(sel.predictors().is_empty());
        assert_eq!(sel.hue(), None);
    }

    #[test]
    fn result_column_cannot_be_a_predictor() {
        let mut sel = ColumnSelection::for_table(&table());
        sel.set_predictor("y", true);
        assert!(sel.predictors().is_empty());

        sel.set_predictor("a", true);
        sel.set_numeric("a", true);
        sel.set_result("a".into());
        assert!(sel.predictors().is_empty());
        assert!(sel.numeric().is_empty());
        assert!(sel.validate(&table()).is_ok());
    }

    #[test]
    fn discrete_is_complement_of_numeric() {
        let mut sel = ColumnSelection::for_table(&table());
        for c in ["a", "b", "c"] {
            sel.set_predictor(c, true);
        }
        sel.set_numeric("b", true);
        assert_eq!(sel.numeric(), vec!["b"]);
        assert_eq!(sel.discrete(), vec!["a", "c"]);
    }

    #[test]
    fn hue_follows_discrete_predictors() {
        let mut sel = ColumnSelection::for_table(&table());
        sel.set_predictor("a", true);
        sel.set_predictor("c", true);
        assert_eq!(sel.hue(), Some("a"));

        sel.set_hue("c");
        assert_eq!(sel.hue(), Some("c"));

        // Numeric columns are not valid hues.
        sel.set_numeric("c", true);
        assert_eq!(sel.hue(), Some("a"));
        sel.set_hue("c");
        assert_eq!(sel.hue(), Some("a"));

        sel.set_predictor("a", false);
        assert_eq!(sel.hue(), None);
    }

    #[test]
    fn validate_reports_unknown_columns() {
        let mut sel = ColumnSelection::for_table(&table());
        sel.set_predictor("zzz", true);
        assert_eq!(
            sel.validate(&table()),
            Err(SelectionError::UnknownColumn("zzz".into()))
        );

        let empty = ColumnSelection::default();
        assert_eq!(empty.validate(&table()), Err(SelectionError::NoResultColumn));
    }
}
