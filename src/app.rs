use std::path::PathBuf;

use anyhow::Context;
use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct EdaApp {
    pub state: AppState,
}

impl EdaApp {
    /// Load the first file dropped onto the window, if any.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };

        let path = file
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&file.name));
        let bytes = match file.bytes {
            Some(bytes) => Ok(bytes.to_vec()),
            None => std::fs::read(&path).with_context(|| format!("reading {}", path.display())),
        };

        match bytes {
            Ok(bytes) => self.state.load_dropped(&path, bytes),
            Err(e) => {
                log::error!("Failed to load dropped file: {e:#}");
                self.state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

impl eframe::App for EdaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: column roles ----
        egui::SidePanel::left("selection_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: preview + report ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::central_panel(ui, &self.state);
        });
    }
}
