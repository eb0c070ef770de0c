use eframe::egui::{self, Layout, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::Table;

/// Rows shown in the preview grid.
pub const PREVIEW_ROWS: usize = 50;

/// Read-only grid of the first rows, one header per column with its kind.
pub fn preview(ui: &mut Ui, table: &Table) {
    let shown = table.len().min(PREVIEW_ROWS);
    ui.weak(format!("Showing {shown} of {} rows", table.len()));

    let row_height = egui::TextStyle::Body.resolve(ui.style()).size + 6.0;

    egui::ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            let mut builder = TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .vscroll(false)
                .cell_layout(Layout::left_to_right(egui::Align::Center))
                .column(TableColumn::exact(40.0));
            for _ in table.columns() {
                builder = builder.column(TableColumn::initial(90.0).at_least(40.0));
            }

            builder
                .header(36.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("#");
                    });
                    for col in table.columns() {
                        header.col(|ui| {
                            ui.vertical(|ui: &mut Ui| {
                                ui.strong(&col.name);
                                ui.label(RichText::new(col.kind.to_string()).small().weak());
                            });
                        });
                    }
                })
                .body(|body| {
                    body.rows(row_height, shown, |mut row| {
                        let idx = row.index();
                        row.col(|ui| {
                            ui.weak(idx.to_string());
                        });
                        for col in table.columns() {
                            row.col(|ui| {
                                ui.label(col.values[idx].to_string());
                            });
                        }
                    });
                });
        });
}
