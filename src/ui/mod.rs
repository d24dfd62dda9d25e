pub mod cloud_view;
pub mod panels;

use std::sync::Arc;

use eframe::egui;

use crate::cloud::font::CloudFont;

/// Register the cloud font with egui as a fallback face, so column names and
/// values in CJK scripts render in the panels too.
pub fn install_fonts(ctx: &egui::Context, font: &CloudFont) {
    let Some(data) = font.egui_font_data() else {
        return;
    };
    let name = font.name().to_owned();
    let mut fonts = egui::FontDefinitions::default();
    fonts.font_data.insert(name.clone(), Arc::new(data));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts.families.entry(family).or_default().push(name.clone());
    }
    ctx.set_fonts(fonts);
}
