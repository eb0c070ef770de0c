use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::analysis::plots::{PairGrid, RelationshipPlot};
use crate::analysis::{Notice, ReportItem, Severity};
use crate::color::HueColors;
use crate::model::ImportanceTable;
use crate::state::AppState;
use crate::ui::table;

// ---------------------------------------------------------------------------
// Central panel: preview + report
// ---------------------------------------------------------------------------

/// Render the data preview and the last analysis report.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let Some(data) = &state.table else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Choose a CSV or TXT file to start  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::CollapsingHeader::new(RichText::new("Data preview").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| table::preview(ui, data));

            let Some(report) = &state.report else {
                ui.add_space(12.0);
                ui.label("Choose the columns on the left, then press Analyze.");
                return;
            };

            for (idx, item) in report.items.iter().enumerate() {
                ui.add_space(8.0);
                match item {
                    ReportItem::Notice(notice) => notice_label(ui, notice),
                    ReportItem::Heading(text) => {
                        ui.heading(text);
                    }
                    ReportItem::PairGrid(grid) => pair_grid(ui, grid),
                    ReportItem::Importances(importances) => importance_chart(ui, importances),
                    ReportItem::Relationship(plot) => relationship_plot(ui, plot, idx),
                }
            }
        });
}

fn notice_label(ui: &mut Ui, notice: &Notice) {
    let color = match notice.severity {
        Severity::Info => ui.visuals().text_color(),
        Severity::Warning => Color32::from_rgb(220, 160, 0),
        Severity::Error => Color32::RED,
    };
    ui.label(RichText::new(&notice.text).color(color));
}

fn legend(ui: &mut Ui, colors: &HueColors) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.strong(&colors.column);
        for (label, color) in colors.legend_entries() {
            ui.label(RichText::new(format!("● {label}")).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Pair plot
// ---------------------------------------------------------------------------

/// Scatter-plot matrix; histograms on the diagonal.
fn pair_grid(ui: &mut Ui, grid: &PairGrid) {
    let colors = HueColors::new(&grid.hue, &grid.levels);
    legend(ui, &colors);

    let n = grid.size();
    let cell = ((ui.available_width() - 8.0 * n as f32) / n as f32).clamp(120.0, 240.0);

    egui::Grid::new("pair_grid")
        .spacing([4.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            for row in 0..n {
                for col in 0..n {
                    let mut plot = Plot::new(format!("pair_{row}_{col}"))
                        .width(cell)
                        .height(cell)
                        .allow_drag(false)
                        .allow_scroll(false)
                        .allow_zoom(false)
                        .allow_boxed_zoom(false)
                        .show_x(false)
                        .show_y(false);
                    if row == n - 1 {
                        plot = plot.x_axis_label(grid.variables[col].clone());
                    }
                    if col == 0 {
                        plot = plot.y_axis_label(grid.variables[row].clone());
                    }

                    plot.show(ui, |plot_ui| {
                        if row == col {
                            let hist = &grid.histograms[row];
                            for (level, counts) in hist.counts.iter().enumerate() {
                                let bars: Vec<Bar> = counts
                                    .iter()
                                    .enumerate()
                                    .map(|(i, &c)| {
                                        Bar::new(hist.bin_center(i), c as f64)
                                            .width(hist.bin_width)
                                    })
                                    .collect();
                                plot_ui.bar_chart(
                                    BarChart::new(bars)
                                        .color(colors.color_at(level).gamma_multiply(0.6))
                                        .name(&grid.levels[level]),
                                );
                            }
                        } else {
                            for level in 0..grid.levels.len() {
                                let points = grid.scatter(row, col, level);
                                plot_ui.points(
                                    Points::new(PlotPoints::from(points))
                                        .radius(2.0)
                                        .color(colors.color_at(level))
                                        .name(&grid.levels[level]),
                                );
                            }
                        }
                    });
                }
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Feature importances
// ---------------------------------------------------------------------------

/// Horizontal bars, most important feature at the top.
fn importance_chart(ui: &mut Ui, importances: &ImportanceTable) {
    ui.heading("Feature Importances");

    let n = importances.len();
    let label_names: Vec<String> = importances.ranking().iter().map(|s| s.to_string()).collect();
    let palette = crate::color::generate_palette(n.max(1));

    let bars: Vec<Bar> = importances
        .rows()
        .iter()
        .enumerate()
        .map(|(rank, row)| {
            Bar::new((n - 1 - rank) as f64, row.importance)
                .width(0.8)
                .name(format!("{}: {:.4}", row.feature, row.importance))
                .fill(palette[rank % palette.len()])
        })
        .collect();

    Plot::new("feature_importances")
        .height((n as f32 * 24.0).clamp(160.0, 600.0))
        .x_axis_label("Importance")
        .y_axis_label("Features")
        .allow_scroll(false)
        .y_axis_formatter(move |mark, _range| {
            let v = mark.value;
            if v < 0.0 || v.fract() != 0.0 {
                return String::new();
            }
            let pos = v as usize;
            if pos >= n {
                return String::new();
            }
            label_names[n - 1 - pos].clone()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name("importance"));
        });
}

// ---------------------------------------------------------------------------
// Relationship plots
// ---------------------------------------------------------------------------

/// Scatter of one predictor against the result, one fitted line per hue level.
fn relationship_plot(ui: &mut Ui, plot: &RelationshipPlot, idx: usize) {
    ui.heading(&plot.title);

    let labels: Vec<String> = plot.series.iter().map(|s| s.label.clone()).collect();
    let colors = HueColors::new(&plot.hue, &labels);

    let width = ui.available_width();
    Plot::new(format!("relationship_{idx}"))
        .width(width)
        .height(width / 2.0)
        .legend(Legend::default())
        .x_axis_label(plot.x_label.clone())
        .y_axis_label(plot.y_label.clone())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (level, series) in plot.series.iter().enumerate() {
                let color = colors.color_at(level);
                plot_ui.points(
                    Points::new(PlotPoints::from(series.points.clone()))
                        .radius(3.0)
                        .color(color)
                        .name(&series.label),
                );
                if let Some(fit) = &series.fit {
                    plot_ui.line(
                        Line::new(PlotPoints::from(fit.segment().to_vec()))
                            .color(color)
                            .width(2.0)
                            .name(&series.label),
                    );
                }
            }
        });
}
