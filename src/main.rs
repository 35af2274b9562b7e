mod app;
mod debounce;
mod state;
mod ui;

use std::path::PathBuf;

use app::SheetSearchApp;
use eframe::egui;
use sheet_search::config::Settings;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::load(None).unwrap_or_else(|e| {
        log::error!("{e}; using default settings");
        Settings::default()
    });
    // Optional file to open on startup.
    let initial = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sheet Search",
        options,
        Box::new(move |cc| {
            let mut app = SheetSearchApp::new(settings);
            if let Some(path) = initial {
                let ctx = cc.egui_ctx.clone();
                app.state.start_load(path, move || ctx.request_repaint());
            }
            Ok(Box::new(app))
        }),
    )
}
