use eframe::egui;

use crate::pipeline::Pipeline;
use crate::state::AppState;
use crate::ui::{cloud_view, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct WordCloudApp {
    pub state: AppState,
    pipeline: Pipeline,
    /// Uploaded cloud image; dropped whenever the analysis is recomputed.
    texture: Option<egui::TextureHandle>,
}

impl WordCloudApp {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            state: AppState::default(),
            pipeline,
            texture: None,
        }
    }
}

impl eframe::App for WordCloudApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: columns & filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // Any interaction above reruns the pipeline from the raw table.
        if self.state.dirty {
            self.state.recompute(&self.pipeline);
            self.texture = None;
        }

        // ---- Central panel: preview & cloud ----
        egui::CentralPanel::default().show(ctx, |ui| {
            cloud_view::central_panel(ui, &mut self.state, &mut self.texture);
        });
    }
}
