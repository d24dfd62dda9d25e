use std::path::Path;

use anyhow::{Context, Result};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

/// File name offered for the downloaded image.
pub const EXPORT_FILE_NAME: &str = "wordcloud.png";

/// An encoded cloud ready to hand to the user.
#[derive(Debug, Clone)]
pub struct PngExport {
    pub file_name: &'static str,
    pub bytes: Vec<u8>,
}

impl PngExport {
    pub fn from_image(image: &RgbaImage) -> Result<Self> {
        Ok(Self {
            file_name: EXPORT_FILE_NAME,
            bytes: encode_png(image)?,
        })
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Saved {} bytes to {}", self.bytes.len(), path.display());
        Ok(())
    }
}

/// Encode an RGBA image as PNG, in memory.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .context("encoding PNG")?;
    Ok(bytes)
}
