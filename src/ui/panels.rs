use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::distinct_values;
use crate::data::loader::{SUPPORTED_EXTENSIONS, load_file};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – column choice and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: key column, filter columns, per-column values.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Columns");
    ui.separator();

    let table = match &state.table {
        Some(t) => t,
        None => {
            ui.label("No file loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the loop.
    let columns = table.columns().to_vec();
    let options: Vec<_> = state
        .filter_columns
        .iter()
        .map(|col| (col.clone(), distinct_values(table, col)))
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Key column ----
            ui.strong("Text column");
            let current_key = state.key_column.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("key_column")
                .selected_text(&current_key)
                .show_ui(ui, |ui: &mut Ui| {
                    for col in &columns {
                        if ui.selectable_label(current_key == *col, col).clicked() && current_key != *col {
                            state.set_key_column(col.clone());
                        }
                    }
                });
            ui.separator();

            // ---- Filter dimensions ----
            ui.strong("Filter by");
            for col in columns.iter().filter(|c| **c != current_key) {
                let mut active = state.filter_columns.contains(col);
                if ui.checkbox(&mut active, col).changed() {
                    state.toggle_filter_column(col);
                }
            }
            ui.separator();

            // ---- Per-column value widgets (collapsible) ----
            for (col, values) in &options {
                if !state.filter_columns.contains(col) {
                    continue;
                }
                let n_selected = state.selection.get(col).map_or(0, |s| s.len());
                let header_text = if n_selected == 0 {
                    format!("{col}  (any of {})", values.len())
                } else {
                    format!("{col}  ({n_selected}/{})", values.len())
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(col);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(col);
                            }
                        });

                        for val in values {
                            let mut checked = state.is_selected(col, val);
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                state.toggle_filter_value(col, val);
                            }
                        }
                    });
            }
        });
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

        if let Some(table) = &state.table {
            let name = state
                .source
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let kept = state
                .analysis
                .as_ref()
                .map_or(table.len(), |a| a.rows.len());
            ui.label(format!("{name}: {} rows loaded, {kept} after filters", table.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open spreadsheet")
        .add_filter("Supported files", SUPPORTED_EXTENSIONS)
        .add_filter("Excel", &["xlsx", "xlsm", "xlsb", "xls"])
        .add_filter("OpenDocument", &["ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        open_path(state, path);
    }
}

/// Load `path` into the state, reporting failures in the status line.
pub fn open_path(state: &mut AppState, path: PathBuf) {
    match load_file(&path) {
        Ok(table) => {
            log::info!(
                "Loaded {} rows with columns {:?} from {}",
                table.len(),
                table.columns(),
                path.display()
            );
            state.set_table(table, path);
        }
        Err(e) => {
            log::error!("Failed to load {}: {e:#}", path.display());
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
