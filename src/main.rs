mod app;
mod cloud;
mod color;
mod config;
mod data;
mod pipeline;
mod state;
mod text;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use app::WordCloudApp;
use cloud::CloudRenderer;
use cloud::font::CloudFont;
use config::CloudConfig;
use eframe::egui;
use pipeline::Pipeline;
use text::{Segmenter, StopwordSet};

fn main() -> Result<()> {
    env_logger::init();

    let config = CloudConfig::load().context("loading configuration")?;
    let font = CloudFont::load(config.font_path.as_deref(), config.font_index)
        .context("loading cloud font")?;
    let pipeline = Pipeline::new(
        Segmenter::new(),
        StopwordSet::with_extra(&config.extra_stopwords),
        CloudRenderer::new(font, &config),
    );

    // Optional file to open at startup.
    let initial_file = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Word Cloud Explorer",
        options,
        Box::new(move |cc| {
            ui::install_fonts(&cc.egui_ctx, pipeline.renderer().font());
            let mut app = WordCloudApp::new(pipeline);
            if let Some(path) = initial_file {
                ui::panels::open_path(&mut app.state, path);
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow!("running UI: {e}"))
}
