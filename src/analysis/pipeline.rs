use serde::Serialize;

use super::plots::{pair_grid, relationship_plots, PairGrid, RelationshipPlot};
use crate::config::AnalysisConfig;
use crate::data::encoding::one_hot_encode;
use crate::data::model::Table;
use crate::data::selection::ColumnSelection;
use crate::error::EncodeError;
use crate::model::{feature_importances, ImportanceTable};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A message shown inline in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

/// One entry of the report, rendered top to bottom in production order.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportItem {
    Notice(Notice),
    Heading(String),
    PairGrid(PairGrid),
    Importances(ImportanceTable),
    Relationship(RelationshipPlot),
}

/// Everything one Analyze run produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisReport {
    pub items: Vec<ReportItem>,
    /// Model input columns (numeric + indicator), in matrix order.
    pub features: Vec<String>,
}

impl AnalysisReport {
    fn push_notice(&mut self, severity: Severity, text: String) {
        match severity {
            Severity::Info => log::info!("{text}"),
            Severity::Warning => log::warn!("{text}"),
            Severity::Error => log::error!("{text}"),
        }
        self.items.push(ReportItem::Notice(Notice { severity, text }));
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter().filter_map(|item| match item {
            ReportItem::Notice(n) => Some(n),
            _ => None,
        })
    }

    pub fn has_errors(&self) -> bool {
        self.notices().any(|n| n.severity == Severity::Error)
    }

    pub fn importances(&self) -> Option<&ImportanceTable> {
        self.items.iter().find_map(|item| match item {
            ReportItem::Importances(t) => Some(t),
            _ => None,
        })
    }

    pub fn relationship_plots(&self) -> impl Iterator<Item = &RelationshipPlot> {
        self.items.iter().filter_map(|item| match item {
            ReportItem::Relationship(p) => Some(p),
            _ => None,
        })
    }

    pub fn pair_grid(&self) -> Option<&PairGrid> {
        self.items.iter().find_map(|item| match item {
            ReportItem::PairGrid(g) => Some(g),
            _ => None,
        })
    }

    /// Importance table plus the run parameters, as pretty JSON.
    pub fn importances_json(&self, config: &AnalysisConfig) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Export<'a> {
            config: &'a AnalysisConfig,
            features: &'a [String],
            importances: Option<&'a ImportanceTable>,
        }
        serde_json::to_string_pretty(&Export {
            config,
            features: &self.features,
            importances: self.importances(),
        })
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run encoding, plotting and modeling once, from scratch.
///
/// Every failure becomes a notice in the report; later steps still run when
/// they can.
pub fn run_analysis(
    table: &Table,
    selection: &ColumnSelection,
    config: &AnalysisConfig,
) -> AnalysisReport {
    let mut report = AnalysisReport::default();

    if let Err(e) = selection.validate(table) {
        report.push_notice(Severity::Error, e.to_string());
        return report;
    }
    let Some(result) = selection.result.as_deref() else {
        return report;
    };

    let numeric = selection.numeric();
    let discrete = selection.discrete();
    let hue = selection.hue();

    // Encoding. An indicator named like the hue column would shadow it.
    let encoded = one_hot_encode(table, &discrete).and_then(|encoded| match hue {
        Some(h) if encoded.new_columns.iter().any(|c| c == h) => {
            Err(EncodeError::NameCollision(h.to_string()))
        }
        _ => Ok(encoded),
    });
    let (mut working, encoded_vars) = match encoded {
        Ok(encoded) => (encoded.table, encoded.new_columns),
        Err(e) => {
            report.push_notice(
                Severity::Error,
                format!("Error during one-hot encoding: {e}"),
            );
            (table.clone(), Vec::new())
        }
    };
    report.features = numeric.iter().chain(&encoded_vars).cloned().collect();

    // Keep the hue column for coloring even when encoding removed it.
    if let Some(h) = hue {
        if !working.has_column(h) {
            if let Some(original) = table.column(h) {
                if working.push_column(original.clone()).is_err() {
                    report.push_notice(
                        Severity::Error,
                        format!("Could not restore the hue column '{h}' after encoding."),
                    );
                }
            }
        }
    }

    // Pair plot
    report.items.push(ReportItem::Heading(
        "Pair plot of numerical variables".to_string(),
    ));
    match pair_grid(&working, &numeric, hue, config) {
        Ok(grid) => report.items.push(ReportItem::PairGrid(grid)),
        Err(e) => report.push_notice(Severity::Error, e.to_string()),
    }

    // Model
    match feature_importances(&working, &report.features, result, config) {
        Ok(importances) => report.items.push(ReportItem::Importances(importances)),
        Err(e) => report.push_notice(
            Severity::Error,
            format!("Error training the feature-importance model: {e}"),
        ),
    }

    // Relationship plots
    if !numeric.is_empty() {
        match relationship_plots(&working, result, &numeric, hue) {
            Ok(plots) => report
                .items
                .extend(plots.into_iter().map(ReportItem::Relationship)),
            Err(e) => report.push_notice(Severity::Error, e.to_string()),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{read_table, FileFormat};

    fn houses() -> Table {
        let mut csv = String::from("price,area,rooms,city,garage\n");
        let cities = ["Oslo", "Bergen", "Tromso"];
        for i in 0..30 {
            let area = 40 + i * 3;
            let rooms = 1 + i % 4;
            let city = cities[i % 3];
            let garage = if i % 2 == 0 { "yes" } else { "no" };
            let price = area * 10 + rooms * 5 + (i % 3) * 20;
            csv.push_str(&format!("{price},{area},{rooms},{city},{garage}\n"));
        }
        read_table(csv.as_bytes(), FileFormat::Csv).unwrap()
    }

    fn selection(table: &Table, predictors: &[&str], numeric: &[&str]) -> ColumnSelection {
        let mut sel = ColumnSelection::for_table(table);
        sel.set_result("price".into());
        for p in predictors {
            sel.set_predictor(p, true);
        }
        for n in numeric {
            sel.set_numeric(n, true);
        }
        sel
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            n_estimators: 20,
            ..Default::default()
        }
    }

    #[test]
    fn full_run_produces_plots_in_order() {
        let table = houses();
        let sel = selection(&table, &["area", "rooms", "city", "garage"], &["area", "rooms"]);
        let report = run_analysis(&table, &sel, &config());

        assert!(!report.has_errors(), "{:?}", report.notices().collect::<Vec<_>>());
        assert_eq!(
            report.features,
            vec![
                "area",
                "rooms",
                "city_Bergen",
                "city_Oslo",
                "city_Tromso",
                "garage_no",
                "garage_yes"
            ]
        );

        let kinds: Vec<&str> = report
            .items
            .iter()
            .map(|item| match item {
                ReportItem::Notice(_) => "notice",
                ReportItem::Heading(_) => "heading",
                ReportItem::PairGrid(_) => "pair",
                ReportItem::Importances(_) => "importance",
                ReportItem::Relationship(_) => "relationship",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["heading", "pair", "importance", "relationship", "relationship"]
        );

        let importances = report.importances().unwrap();
        assert_eq!(importances.len(), report.features.len());
        assert_eq!(report.pair_grid().unwrap().hue, "city");
        assert_eq!(report.relationship_plots().next().unwrap().series.len(), 3);
    }

    #[test]
    fn missing_hue_skips_plots_but_trains() {
        let table = houses();
        let sel = selection(&table, &["area", "rooms"], &["area", "rooms"]);
        assert_eq!(sel.hue(), None);

        let report = run_analysis(&table, &sel, &config());
        let errors: Vec<_> = report
            .notices()
            .filter(|n| n.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].text.contains("pair plot"));
        assert!(errors[1].text.contains("relationship plots"));
        assert!(report.pair_grid().is_none());
        assert_eq!(report.relationship_plots().count(), 0);
        assert_eq!(report.importances().unwrap().len(), 2);
    }

    #[test]
    fn encoding_failure_falls_back_to_numeric_predictors() {
        let mut table = houses();
        // An existing column that clashes with an indicator name.
        let clash = table.column("area").unwrap().clone();
        table
            .push_column(crate::data::model::Column {
                name: "garage_no".into(),
                ..clash
            })
            .unwrap();

        let sel = selection(&table, &["area", "garage"], &["area"]);
        let report = run_analysis(&table, &sel, &config());

        let first = report.notices().next().unwrap();
        assert_eq!(first.severity, Severity::Error);
        assert!(first.text.starts_with("Error during one-hot encoding"));
        assert_eq!(report.features, vec!["area"]);
        assert_eq!(report.importances().unwrap().ranking(), vec!["area"]);
        // The hue was never removed, so plots still render.
        assert!(report.pair_grid().is_some());
    }

    #[test]
    fn indicator_named_like_hue_keeps_original_hue() {
        let mut csv = String::from("y,x,a,a_b\n");
        for i in 0..12 {
            let a = if i % 2 == 0 { "b" } else { "c" };
            let colour = if i % 3 == 0 { "red" } else { "blue" };
            csv.push_str(&format!("{},{i},{a},{colour}\n", i * 2));
        }
        let table = read_table(csv.as_bytes(), FileFormat::Csv).unwrap();

        let mut sel = selection(&table, &["x", "a", "a_b"], &["x"]);
        sel.set_hue("a_b");
        assert_eq!(sel.hue(), Some("a_b"));

        let report = run_analysis(&table, &sel, &config());
        let first = report.notices().next().unwrap();
        assert_eq!(first.severity, Severity::Error);
        assert!(first.text.starts_with("Error during one-hot encoding"));
        assert!(first.text.contains("'a_b'"));

        let grid = report.pair_grid().unwrap();
        assert_eq!(grid.hue, "a_b");
        assert_eq!(grid.levels, vec!["blue", "red"]);
        assert_eq!(report.features, vec!["x"]);
    }

    #[test]
    fn invalid_selection_stops_the_run() {
        let table = houses();
        let report = run_analysis(&table, &ColumnSelection::default(), &config());
        assert_eq!(report.items.len(), 1);
        assert!(report.has_errors());
    }

    #[test]
    fn text_target_is_reported_not_fatal() {
        let table = houses();
        let mut sel = ColumnSelection::for_table(&table);
        sel.set_result("city".into());
        sel.set_predictor("area", true);
        sel.set_numeric("area", true);
        sel.set_predictor("garage", true);

        let report = run_analysis(&table, &sel, &config());
        assert!(report.importances().is_none());
        assert!(report
            .notices()
            .any(|n| n.text.contains("feature-importance model")));
        assert_eq!(report.relationship_plots().count(), 1);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let table = houses();
        let sel = selection(&table, &["area", "rooms", "city"], &["area", "rooms"]);
        let a = run_analysis(&table, &sel, &config());
        let b = run_analysis(&table, &sel, &config());
        assert_eq!(a.importances(), b.importances());
    }

    #[test]
    fn json_export_contains_ranking() {
        let table = houses();
        let sel = selection(&table, &["area", "city"], &["area"]);
        let report = run_analysis(&table, &sel, &config());
        let json = report.importances_json(&config()).unwrap();
        assert!(json.contains("\"n_estimators\": 20"));
        assert!(json.contains("\"feature\": \"area\""));
    }
}
