use std::path::Path;
use std::time::{Duration, Instant};

use crate::analysis::{run_analysis, AnalysisReport};
use crate::config::{AnalysisConfig, TREE_STEP};
use crate::data::loader::{read_tagged, FileFormat};
use crate::data::model::Table;
use crate::data::selection::ColumnSelection;
use crate::data::validation::{check_data_types, TypeCheck};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The raw bytes of the chosen file, kept so a format change can re-parse.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Last chosen file (None until the user picks one).
    pub source: Option<SourceFile>,

    /// Declared format used to parse `source`.
    pub format: FileFormat,

    /// Parsed table; None when nothing is loaded or parsing failed.
    pub table: Option<Table>,

    /// Column roles chosen in the side panel.
    pub selection: ColumnSelection,

    /// Model and plot parameters.
    pub config: AnalysisConfig,

    /// Advisory dtype warnings for the current selection.
    pub type_check: Option<TypeCheck>,

    /// Output of the last Analyze click.
    pub report: Option<AnalysisReport>,

    /// Wall-clock time of the last Analyze run.
    pub last_run: Option<Duration>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            source: None,
            format: FileFormat::Csv,
            table: None,
            selection: ColumnSelection::default(),
            config: AnalysisConfig::default(),
            type_check: None,
            report: None,
            last_run: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Take a newly chosen file and parse it with the current format.
    pub fn load_bytes(&mut self, name: String, bytes: Vec<u8>) {
        self.source = Some(SourceFile { name, bytes });
        self.reload();
    }

    /// Take a dropped file, inferring the format from its extension.
    pub fn load_dropped(&mut self, path: &Path, bytes: Vec<u8>) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match FileFormat::from_path(path) {
            Ok(format) => {
                self.format = format;
                self.load_bytes(name, bytes);
            }
            Err(e) => {
                log::error!("Rejected {name}: {e}");
                self.source = None;
                self.clear_table();
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Switch the declared format and re-parse the current file.
    pub fn set_format(&mut self, format: FileFormat) {
        if self.format != format {
            self.format = format;
            self.reload();
        }
    }

    fn reload(&mut self) {
        let Some(source) = &self.source else {
            return;
        };

        match read_tagged(&source.bytes, self.format.tag()) {
            Ok(table) => {
                log::info!(
                    "Loaded {} ({}): {} rows, columns {:?}",
                    source.name,
                    self.format,
                    table.len(),
                    table.column_names()
                );
                self.set_table(table);
            }
            Err(e) => {
                let msg = format!("Error reading the file: {e}");
                log::error!("{msg}");
                self.clear_table();
                self.status_message = Some(msg);
            }
        }
    }

    /// Ingest a parsed table and reset everything derived from the old one.
    pub fn set_table(&mut self, table: Table) {
        self.selection = ColumnSelection::for_table(&table);
        self.table = Some(table);
        self.report = None;
        self.last_run = None;
        self.status_message = None;
        self.refresh_type_check();
    }

    fn clear_table(&mut self) {
        self.table = None;
        self.selection = ColumnSelection::default();
        self.type_check = None;
        self.report = None;
        self.last_run = None;
    }

    /// Re-run the dtype check; call after every selection change.
    pub fn refresh_type_check(&mut self) {
        self.type_check = self.table.as_ref().map(|table| {
            check_data_types(table, &self.selection.numeric(), &self.selection.discrete())
        });
    }

    /// Whether the current check lets the run go on.
    pub fn can_analyze(&self) -> bool {
        self.table.is_some() && self.type_check.as_ref().map_or(true, |c| c.proceed)
    }

    /// Run the whole pipeline for the current selection.
    pub fn analyze(&mut self) {
        if !self.can_analyze() {
            return;
        }
        if let Some(table) = &self.table {
            log::info!(
                "Analyzing with {} trees, seed {}",
                self.config.n_estimators,
                self.config.random_state
            );
            let started = Instant::now();
            let report = run_analysis(table, &self.selection, &self.config);
            let elapsed = started.elapsed();
            log::info!("Analysis finished in {:.2?}", elapsed);

            self.status_message = report
                .has_errors()
                .then(|| "Analysis finished with errors; see the report.".to_string());
            self.last_run = Some(elapsed);
            self.report = Some(report);
        }
    }

    /// Move the tree count by whole steps, never below one step. A count off
    /// the grid is first rounded down to a multiple of the step.
    pub fn step_trees(&mut self, steps: i64) {
        let current = (self.config.n_estimators - self.config.n_estimators % TREE_STEP) as i64;
        let next = (current + steps * TREE_STEP as i64).max(TREE_STEP as i64);
        self.config.n_estimators = next as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "price,area,city\n10,1,A\n20,2,B\n30,3,A\n40,4,B\n";

    #[test]
    fn loading_sets_up_selection() {
        let mut state = AppState::default();
        state.load_bytes("houses.csv".into(), CSV.as_bytes().to_vec());

        let table = state.table.as_ref().unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(state.selection.result.as_deref(), Some("price"));
        assert!(state.status_message.is_none());
        assert!(state.type_check.as_ref().unwrap().warnings.is_empty());
    }

    #[test]
    fn switching_format_reparses() {
        let mut state = AppState::default();
        state.load_bytes("houses.csv".into(), CSV.as_bytes().to_vec());
        state.set_format(FileFormat::Txt);

        // Tab-delimited parsing sees a single column.
        assert_eq!(state.table.as_ref().unwrap().n_columns(), 1);
        state.set_format(FileFormat::Csv);
        assert_eq!(state.table.as_ref().unwrap().n_columns(), 3);
    }

    #[test]
    fn unsupported_drop_yields_no_table_and_no_run() {
        let mut state = AppState::default();
        state.load_dropped(Path::new("houses.xlsx"), CSV.as_bytes().to_vec());

        assert!(state.table.is_none());
        assert!(state
            .status_message
            .as_deref()
            .unwrap()
            .contains("Unsupported file type"));

        state.analyze();
        assert!(state.report.is_none());
    }

    #[test]
    fn parse_failure_clears_previous_table() {
        let mut state = AppState::default();
        state.load_bytes("houses.csv".into(), CSV.as_bytes().to_vec());
        state.load_bytes("bad.csv".into(), b"a,b\n1,2,3\n".to_vec());

        assert!(state.table.is_none());
        assert!(state
            .status_message
            .as_deref()
            .unwrap()
            .starts_with("Error reading the file"));
    }

    #[test]
    fn discrete_numeric_column_warns_but_allows_analyze() {
        let mut state = AppState::default();
        state.load_bytes("houses.csv".into(), CSV.as_bytes().to_vec());
        state.selection.set_predictor("area", true);
        state.selection.set_predictor("city", true);
        state.refresh_type_check();

        assert_eq!(state.type_check.as_ref().unwrap().warnings.len(), 1);
        assert!(state.can_analyze());

        state.config.n_estimators = 10;
        state.analyze();
        assert!(state.report.is_some());
        assert!(state.last_run.is_some());
    }

    #[test]
    fn failed_steps_are_flagged_in_the_status() {
        let mut state = AppState::default();
        state.load_bytes("houses.csv".into(), CSV.as_bytes().to_vec());
        // Numeric predictor only: no hue, so both plot builders report errors.
        state.selection.set_predictor("area", true);
        state.selection.set_numeric("area", true);
        state.config.n_estimators = 10;
        state.analyze();

        assert!(state.report.as_ref().unwrap().importances().is_some());
        assert!(state
            .status_message
            .as_deref()
            .unwrap()
            .contains("finished with errors"));

        state.load_bytes("houses.csv".into(), CSV.as_bytes().to_vec());
        assert!(state.last_run.is_none());
        assert!(state.status_message.is_none());
    }

    #[test]
    fn tree_count_moves_in_steps() {
        let mut state = AppState::default();
        state.step_trees(1);
        assert_eq!(state.config.n_estimators, 110);
        state.step_trees(-20);
        assert_eq!(state.config.n_estimators, TREE_STEP);

        state.config.n_estimators = 57;
        state.step_trees(0);
        assert_eq!(state.config.n_estimators, 50);
    }
}
