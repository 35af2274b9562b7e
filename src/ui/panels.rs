use std::time::Instant;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use sheet_search::data::patterns;
use sheet_search::format;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – column selection and search options
// ---------------------------------------------------------------------------

/// Render the left panel: which columns to search and how.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Search options");
    ui.separator();

    let mut changed = false;
    changed |= ui
        .checkbox(&mut state.options.case_sensitive, "Case sensitive")
        .changed();
    changed |= ui
        .checkbox(&mut state.options.exact_match, "Exact match")
        .changed();
    changed |= ui
        .checkbox(&mut state.options.use_regex, "Regular expression")
        .changed();

    ui.add_space(8.0);
    ui.heading("Columns");
    ui.separator();

    let Some(loaded) = &state.loaded else {
        ui.label("No file loaded.");
        return;
    };
    let names = loaded.table.column_names();

    let mut auto_select = state.auto_select;
    if ui
        .checkbox(
            &mut auto_select,
            format!("Auto-select first {}", state.settings.default_column_count),
        )
        .changed()
    {
        state.set_auto_select(auto_select);
        changed = true;
    }

    let n_selected = state.selected_columns.iter().filter(|&&f| f).count();
    ui.label(RichText::new(format!("{n_selected}/{} selected", names.len())).weak());

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (name, selected) in names.iter().zip(state.selected_columns.iter_mut()) {
                changed |= ui.checkbox(selected, name).changed();
            }
        });

    if changed {
        state.on_query_changed(Instant::now());
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
                open_file_dialog(ui.ctx(), state);
                ui.close_menu();
            }
            let can_export = state.visible_table().is_some_and(|t| !t.is_empty());
            if ui
                .add_enabled(can_export, egui::Button::new("Export results…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.menu_button("Patterns", |ui: &mut Ui| {
            for name in patterns::preset_names() {
                if ui.button(name).clicked() {
                    if let Some(pattern) = patterns::preset(name) {
                        state.query = pattern.to_string();
                        state.options.use_regex = true;
                        state.run_search();
                    }
                    ui.close_menu();
                }
            }
        });

        if ui
            .add_enabled(state.loaded.is_some(), egui::Button::new("File info"))
            .clicked()
        {
            state.show_info = !state.show_info;
        }

        ui.separator();

        if let Some(loaded) = &state.loaded {
            ui.label(format!(
                "{} rows loaded, {} matching",
                loaded.info.rows,
                state.visible_total()
            ));
        }
        if state.loading {
            ui.spinner();
        } else if state.debouncer.is_pending() {
            ui.label(RichText::new("searching…").weak());
        }
    });
}

// ---------------------------------------------------------------------------
// Search bar and status line
// ---------------------------------------------------------------------------

/// Render the search box with its buttons, then the status line.
pub fn search_bar(ui: &mut Ui, state: &mut AppState) {
    let enabled = state.loaded.is_some();
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Search:");
        let width = (ui.available_width() - 140.0).max(120.0);
        let response = ui.add_enabled(
            enabled,
            egui::TextEdit::singleline(&mut state.query)
                .hint_text("Type to search…")
                .desired_width(width),
        );
        if response.changed() {
            state.on_query_changed(Instant::now());
        }
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            state.run_search();
        }
        if ui.add_enabled(enabled, egui::Button::new("Search")).clicked() {
            state.run_search();
        }
        if ui.add_enabled(enabled, egui::Button::new("Clear")).clicked() {
            state.clear_search();
        }
    });

    if let Some(msg) = &state.status_message {
        ui.label(msg);
    }
    if let Some(msg) = &state.error_message {
        ui.label(RichText::new(msg).color(Color32::RED));
    }
}

// ---------------------------------------------------------------------------
// File info window
// ---------------------------------------------------------------------------

/// Floating window with file facts and a per-column summary.
pub fn info_window(ctx: &egui::Context, state: &mut AppState) {
    let mut open = state.show_info;
    let Some(loaded) = &state.loaded else {
        return;
    };
    let info = &loaded.info;

    egui::Window::new("File info")
        .open(&mut open)
        .default_width(420.0)
        .show(ctx, |ui: &mut Ui| {
            egui::Grid::new("file_facts").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("Path");
                ui.label(info.path.display().to_string());
                ui.end_row();
                ui.label("Size");
                ui.label(format::file_size(info.file_size_bytes));
                ui.end_row();
                ui.label("Dimensions");
                ui.label(format!("{} rows × {} columns", info.rows, info.columns));
                ui.end_row();
                ui.label("Load time");
                ui.label(format::duration(info.load_time));
                ui.end_row();
                if let Some(encoding) = info.encoding {
                    ui.label("Encoding");
                    ui.label(encoding);
                    ui.end_row();
                }
            });

            ui.separator();
            ui.strong("Columns");
            ScrollArea::vertical().max_height(320.0).show(ui, |ui: &mut Ui| {
                for col in loaded.table.column_info() {
                    egui::CollapsingHeader::new(RichText::new(&col.name).strong())
                        .id_salt(&col.name)
                        .show(ui, |ui: &mut Ui| {
                            ui.label(format!("Type: {}", col.kind));
                            ui.label(format!("Non-null: {}  Null: {}", col.non_null, col.nulls));
                            ui.label(format!("Unique: {}", col.distinct));
                            if !col.samples.is_empty() {
                                ui.label(format!("Sample: {}", col.samples.join(", ")));
                            }
                        });
                }
            });
        });

    state.show_info = open;
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(ctx: &egui::Context, state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open spreadsheet")
        .add_filter("Supported files", &["xlsx", "xls", "csv"])
        .add_filter("Excel", &["xlsx", "xls"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        let ctx = ctx.clone();
        state.start_load(path, move || ctx.request_repaint());
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let default_name = state
        .loaded
        .as_ref()
        .and_then(|l| l.info.path.file_stem())
        .map(|stem| format!("{}_results.xlsx", stem.to_string_lossy()))
        .unwrap_or_else(|| "results.xlsx".to_string());

    let file = rfd::FileDialog::new()
        .set_title("Export results")
        .set_file_name(default_name)
        .add_filter("Excel", &["xlsx"])
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_to(&path) {
            log::error!("Export failed: {e:#}");
            state.error_message = Some(format!("Error: {e:#}"));
        }
    }
}
