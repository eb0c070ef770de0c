use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::TREE_STEP;
use crate::data::loader::FileFormat;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – column roles and model parameters
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("CSV/TXT Analysis");
    ui.separator();

    // ---- File type ----
    ui.strong("Select the file type:");
    ui.horizontal(|ui: &mut Ui| {
        let mut format = state.format;
        for f in FileFormat::ALL {
            ui.radio_value(&mut format, f, f.tag());
        }
        state.set_format(format);
    });
    if ui.button("Choose a CSV or TXT file…").clicked() {
        open_file_dialog(state);
    }
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No dataset loaded.");
        return;
    };
    let columns = table.column_names();

    let mut selection_changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Result column ----
            ui.strong("Select the result column");
            let current = state.selection.result.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("result_column")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for col in &columns {
                        if ui.selectable_label(current == *col, col).clicked() && current != *col {
                            state.selection.set_result(col.clone());
                            selection_changed = true;
                        }
                    }
                });
            ui.add_space(6.0);

            // ---- Predictors ----
            egui::CollapsingHeader::new(RichText::new("Select the variables").strong())
                .id_salt("predictors")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    for col in &columns {
                        if state.selection.result.as_deref() == Some(col.as_str()) {
                            continue;
                        }
                        let mut checked = state.selection.is_predictor(col);
                        if ui.checkbox(&mut checked, col).changed() {
                            state.selection.set_predictor(col, checked);
                            selection_changed = true;
                        }
                    }
                });

            // ---- Numeric subset ----
            egui::CollapsingHeader::new(RichText::new("Select numerical variables").strong())
                .id_salt("numeric")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    let predictors = state.selection.predictors().to_vec();
                    if predictors.is_empty() {
                        ui.weak("Choose variables first.");
                    }
                    for col in &predictors {
                        let mut checked = state.selection.is_numeric(col);
                        if ui.checkbox(&mut checked, col).changed() {
                            state.selection.set_numeric(col, checked);
                            selection_changed = true;
                        }
                    }
                });

            // ---- Hue ----
            ui.strong("Select the discrete variable for hue in pair plot");
            let discrete = state.selection.discrete();
            let current_hue = state.selection.hue().unwrap_or_default().to_string();
            egui::ComboBox::from_id_salt("hue_column")
                .selected_text(&current_hue)
                .show_ui(ui, |ui: &mut Ui| {
                    for col in &discrete {
                        if ui.selectable_label(current_hue == *col, col).clicked() {
                            state.selection.set_hue(col);
                        }
                    }
                });

            // ---- Type warnings ----
            if let Some(check) = &state.type_check {
                for warning in &check.warnings {
                    ui.label(RichText::new(warning).color(Color32::from_rgb(220, 160, 0)));
                }
            }
            ui.separator();

            // ---- Model parameters ----
            ui.strong("Number of trees in the forest (multiples of 10)");
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("−").clicked() {
                    state.step_trees(-1);
                }
                let drag = ui.add(
                    egui::DragValue::new(&mut state.config.n_estimators)
                        .range(TREE_STEP..=10_000)
                        .speed(TREE_STEP as f64),
                );
                if drag.changed() {
                    state.step_trees(0);
                }
                if ui.small_button("+").clicked() {
                    state.step_trees(1);
                }
            });

            ui.strong("Random state");
            ui.add(
                egui::DragValue::new(&mut state.config.random_state)
                    .range(0..=u32::MAX as u64),
            );
            ui.add_space(8.0);

            let analyze = ui.add_enabled(
                state.can_analyze(),
                egui::Button::new(RichText::new("Analyze").strong()),
            );
            if analyze
                .on_hover_text(
                    "The window is busy until training ends; \
                     large files with many trees take a while.",
                )
                .clicked()
            {
                state.analyze();
            }
            if let Some(elapsed) = state.last_run {
                ui.weak(format!("Last run took {:.1} s", elapsed.as_secs_f64()));
            }
        });

    if selection_changed {
        state.refresh_type_check();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(source), Some(table)) = (&state.source, &state.table) {
            ui.label(format!(
                "{}: {} rows × {} columns ({})",
                source.name,
                table.len(),
                table.n_columns(),
                state.format
            ));
        }

        if let Some(report) = &state.report {
            if report.importances().is_some() {
                ui.separator();
                if ui.button("Copy importances as JSON").clicked() {
                    match report.importances_json(&state.config) {
                        Ok(json) => ui.ctx().copy_text(json),
                        Err(e) => log::error!("Failed to serialize importances: {e}"),
                    }
                }
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Choose a CSV or TXT file")
        .add_filter("Supported files", &["csv", "txt", "tsv"])
        .add_filter("CSV", &["csv"])
        .add_filter("TXT", &["txt", "tsv"])
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        let read = std::fs::read(&path).with_context(|| format!("reading {}", path.display()));
        match read {
            Ok(bytes) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                state.load_bytes(name, bytes);
            }
            Err(e) => {
                log::error!("Failed to open file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
