use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, InvalidFont, PxScale, ScaleFont};
use eframe::egui;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use thiserror::Error;

/// Name of egui's bundled proportional face, used when no CJK font is found.
const BUNDLED_FACE: &str = "Ubuntu-Light";

/// Font looked for in the working directory before the system locations.
pub const LOCAL_FONT: &str = "msyh.ttc";

/// Common install locations of CJK-capable faces, tried in order.
const SYSTEM_CJK_FONTS: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Medium.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
];

#[derive(Debug, Error)]
pub enum FontError {
    #[error("reading font {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("font {name} is not a valid TrueType/OpenType face: {source}")]
    Invalid { name: String, source: InvalidFont },
    #[error("bundled font '{0}' is not available")]
    MissingBundled(&'static str),
}

/// Anything that can report the pixel box of a rendered string.
pub trait TextMeasure {
    /// `(width, height)` of `text` drawn at `px` pixels.
    fn text_size(&self, text: &str, px: f32) -> (u32, u32);
}

/// `./msyh.ttc` first, then the system CJK faces.
pub fn font_candidates() -> Vec<PathBuf> {
    std::iter::once(PathBuf::from(LOCAL_FONT))
        .chain(SYSTEM_CJK_FONTS.iter().map(PathBuf::from))
        .collect()
}

// ---------------------------------------------------------------------------
// CloudFont
// ---------------------------------------------------------------------------

/// The face used to rasterize cloud words.
pub struct CloudFont {
    font: FontVec,
    name: String,
    /// Raw bytes and face index, kept to share the face with egui.
    bytes: Vec<u8>,
    index: u32,
    bundled: bool,
}

impl CloudFont {
    /// Load a font file (`.ttf`, `.otf`, or a face of a `.ttc`).
    pub fn from_file(path: &Path, index: u32) -> Result<Self, FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".to_string());
        Self::from_bytes(name, bytes, index, false)
    }

    /// egui's bundled proportional face. It has no CJK glyphs.
    pub fn bundled() -> Result<Self, FontError> {
        let defs = egui::FontDefinitions::default();
        let data = defs
            .font_data
            .get(BUNDLED_FACE)
            .ok_or(FontError::MissingBundled(BUNDLED_FACE))?;
        Self::from_bytes(BUNDLED_FACE.to_string(), data.font.to_vec(), data.index, true)
    }

    /// Configured font if any, else the first usable CJK face from
    /// [`font_candidates`], else the bundled face.
    pub fn load(path: Option<&Path>, index: u32) -> Result<Self, FontError> {
        match path {
            Some(path) => {
                let font = Self::from_file(path, index)?;
                log::info!("Using cloud font {}", path.display());
                Ok(font)
            }
            None => Self::discover(&font_candidates()),
        }
    }

    /// First candidate that exists and parses (face 0). Broken candidates are
    /// skipped with a warning.
    fn discover(candidates: &[PathBuf]) -> Result<Self, FontError> {
        for candidate in candidates.iter().filter(|p| p.is_file()) {
            match Self::from_file(candidate, 0) {
                Ok(font) => {
                    log::info!("Using cloud font {}", candidate.display());
                    return Ok(font);
                }
                Err(e) => log::warn!("Skipping font {}: {e}", candidate.display()),
            }
        }
        log::warn!(
            "No CJK font found; falling back to {BUNDLED_FACE}, \
             which cannot draw Chinese characters. Set font_path in {}",
            crate::config::DEFAULT_CONFIG_FILE
        );
        Self::bundled()
    }

    fn from_bytes(name: String, bytes: Vec<u8>, index: u32, bundled: bool) -> Result<Self, FontError> {
        let font = FontVec::try_from_vec_and_index(bytes.clone(), index).map_err(|source| {
            FontError::Invalid {
                name: name.clone(),
                source,
            }
        })?;
        Ok(Self {
            font,
            name,
            bytes,
            index,
            bundled,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Font data to register with egui, or `None` for the bundled face
    /// (egui already has it).
    pub fn egui_font_data(&self) -> Option<egui::FontData> {
        if self.bundled {
            return None;
        }
        let mut data = egui::FontData::from_owned(self.bytes.clone());
        data.index = self.index;
        Some(data)
    }

    /// Draw `text` with its top-left corner at `(x, y)`; clipped to the canvas.
    pub fn draw_text(&self, canvas: &mut RgbaImage, text: &str, px: f32, x: u32, y: u32, color: Rgba<u8>) {
        draw_text_mut(canvas, color, x as i32, y as i32, PxScale::from(px), &self.font, text);
    }
}

impl TextMeasure for CloudFont {
    /// Advance width from imageproc, line height (ascent to descent) from the face.
    fn text_size(&self, text: &str, px: f32) -> (u32, u32) {
        let scale = PxScale::from(px);
        let (width, _) = text_size(scale, &self.font, text);
        let height = self.font.as_scaled(scale).height().ceil().max(0.0) as u32;
        (width, height)
    }
}
