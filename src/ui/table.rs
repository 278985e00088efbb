use eframe::egui::{RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Scrollable preview of the filtered rows, every column, source order.
pub fn data_preview(ui: &mut Ui, state: &AppState) {
    ui.heading("Filtered Data");
    let table = &state.table;
    let rows = &state.view.rows;
    if rows.is_empty() {
        ui.label("No team-seasons match the current filters.");
        return;
    }

    ScrollArea::horizontal().id_salt("preview_scroll").show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(true)
            .max_scroll_height(320.0)
            .columns(Column::auto().at_least(60.0).resizable(true), table.columns().len())
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for name in table.columns() {
                    header.col(|ui: &mut Ui| {
                        ui.label(RichText::new(name).strong());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    let rec = table.record(rows[row.index()]);
                    for cell in &rec.cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell.to_string());
                        });
                    }
                });
            });
    });
}
