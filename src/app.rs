use std::time::{Duration, Instant};

use eframe::egui;

use sheet_search::config::Settings;

use crate::state::AppState;
use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SheetSearchApp {
    pub state: AppState,
}

impl SheetSearchApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: AppState::new(settings),
        }
    }
}

impl eframe::App for SheetSearchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Background work: finished loads, due searches ----
        self.state.poll_load();
        let now = Instant::now();
        self.state.poll_search(now);
        if let Some(left) = self.state.debouncer.remaining(now) {
            ctx.request_repaint_after(left + Duration::from_millis(1));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: columns and modes ----
        egui::SidePanel::left("search_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: search box + results ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::search_bar(ui, &mut self.state);
            ui.separator();
            table::results_table(ui, &self.state);
        });

        panels::info_window(ctx, &mut self.state);
    }
}
