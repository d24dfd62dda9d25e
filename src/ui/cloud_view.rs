use anyhow::Result;
use eframe::egui::{self, ColorImage, RichText, TextureHandle, TextureOptions, Ui};
use egui_extras::{Column, TableBuilder};

use crate::cloud::WordCloud;
use crate::cloud::export::PngExport;
use crate::data::model::Table;
use crate::pipeline::Outcome;
use crate::state::AppState;

/// Rows shown in the data preview.
const PREVIEW_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Central panel – preview, cloud, download
// ---------------------------------------------------------------------------

/// Render the central panel. `texture` caches the uploaded cloud image and is
/// cleared by the caller whenever the analysis changes.
pub fn central_panel(ui: &mut Ui, state: &mut AppState, texture: &mut Option<TextureHandle>) {
    let Some(table) = &state.table else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a spreadsheet to start  (File → Open…)");
        });
        return;
    };

    ui.strong("Preview");
    preview_table(ui, table);
    ui.separator();

    if table.is_empty() {
        ui.label(RichText::new("The file has a header row but no data rows.").italics());
        return;
    }

    let Some(analysis) = &state.analysis else {
        return;
    };

    let mut save_result = None;
    match &analysis.outcome {
        Outcome::InsufficientData => {
            ui.label(
                RichText::new("Not enough keywords to build a word cloud. Check the data or the filters.")
                    .italics(),
            );
        }
        Outcome::Rendered(cloud) => {
            ui.horizontal(|ui: &mut Ui| {
                ui.label(format!(
                    "{} tokens, {} words drawn",
                    analysis.tokens.len(),
                    cloud.words.len()
                ));
                if ui.button("Download PNG").clicked() {
                    save_result = Some(save_cloud(cloud));
                }
            });

            let tex = texture.get_or_insert_with(|| {
                let size = [cloud.image.width() as usize, cloud.image.height() as usize];
                let image = ColorImage::from_rgba_unmultiplied(size, cloud.image.as_raw());
                ui.ctx().load_texture("wordcloud", image, TextureOptions::LINEAR)
            });
            ui.add(
                egui::Image::new(&*tex)
                    .max_width(ui.available_width())
                    .maintain_aspect_ratio(true),
            );
        }
    }

    if let Some(Err(e)) = save_result {
        log::error!("Failed to save word cloud: {e:#}");
        state.status_message = Some(format!("Error: {e:#}"));
    }
}

/// First rows of the table, like a dataframe `head()`.
fn preview_table(ui: &mut Ui, table: &Table) {
    egui::ScrollArea::horizontal().id_salt("preview_scroll").show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(Column::auto().at_least(60.0).clip(true), table.columns().len())
            .header(20.0, |mut header| {
                for name in table.columns() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|mut body| {
                for row in table.rows().iter().take(PREVIEW_ROWS) {
                    body.row(18.0, |mut cells| {
                        for cell in row {
                            cells.col(|ui: &mut Ui| {
                                ui.label(cell.to_string());
                            });
                        }
                    });
                }
            });
    });
}

/// Ask where to save and write the PNG. Cancelling the dialog is not an error.
fn save_cloud(cloud: &WordCloud) -> Result<()> {
    let export = PngExport::from_image(&cloud.image)?;
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save word cloud")
        .set_file_name(export.file_name)
        .add_filter("PNG image", &["png"])
        .save_file()
    else {
        return Ok(());
    };
    export.write_to(&path)
}
