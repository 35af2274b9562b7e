use eframe::egui::{self, Align, Layout, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use sheet_search::format;

use crate::state::AppState;

/// Cells longer than this are clipped with `...` in the grid.
const MAX_CELL_CHARS: usize = 100;

// ---------------------------------------------------------------------------
// Result table (central panel)
// ---------------------------------------------------------------------------

/// Render the visible table: search results, or the whole file.
pub fn results_table(ui: &mut Ui, state: &AppState) {
    let Some(table) = state.visible_table() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to start searching  (File → Open…)");
        });
        return;
    };

    if table.is_empty() {
        ui.label("No results found");
        return;
    }

    let shown = table.n_rows().min(state.settings.display_limit);
    let total = state.visible_total();
    let caption = if total > shown {
        format!("Showing first {shown} of {total} results")
    } else {
        format!("Showing {total} results")
    };
    ui.label(RichText::new(caption).weak());

    let path = state
        .loaded
        .as_ref()
        .map(|l| l.info.path.clone())
        .unwrap_or_default();

    // Fresh id per file so column widths reset when the schema changes.
    ui.push_id(path, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(Layout::left_to_right(Align::Center))
                .columns(
                    Column::initial(140.0).at_least(60.0).clip(true),
                    table.n_cols(),
                )
                .min_scrolled_height(0.0)
                .header(22.0, |mut header| {
                    for column in table.columns() {
                        header.col(|ui: &mut Ui| {
                            ui.strong(&column.name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(20.0, shown, |mut row| {
                        let r = row.index();
                        for value in table.row(r) {
                            row.col(|ui: &mut Ui| {
                                let text = value.as_text();
                                ui.add(
                                    egui::Label::new(format::clip(&text, MAX_CELL_CHARS))
                                        .truncate(),
                                );
                            });
                        }
                    });
                });
        });
    });
}
