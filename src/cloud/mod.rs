/// Cloud layer: frequencies → layout → raster → PNG.
///
/// ```text
///   "项目 进度 项目 …"
///        │  word_frequencies
///        ▼
///   ┌──────────┐
///   │  layout   │  sizes + free boxes (imageproc integral image)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  font     │  imageproc draw_text_mut onto RgbaImage
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  PNG bytes, "wordcloud.png"
///   └──────────┘
/// ```

pub mod export;
pub mod font;
pub mod layout;

use std::time::Instant;

use image::RgbaImage;

use crate::color::{generate_palette, rgb};
use crate::config::CloudConfig;
use font::CloudFont;
use layout::{LayoutParams, PlacedWord, layout_words, word_frequencies};

/// A rendered cloud and the words it contains.
pub struct WordCloud {
    pub image: RgbaImage,
    pub words: Vec<PlacedWord>,
}

/// Turns a space-joined token string into a cloud image.
pub struct CloudRenderer {
    font: CloudFont,
    params: LayoutParams,
    background: [u8; 3],
    max_words: usize,
    min_word_length: usize,
}

impl CloudRenderer {
    pub fn new(font: CloudFont, config: &CloudConfig) -> Self {
        Self {
            font,
            params: LayoutParams {
                width: config.width,
                height: config.height,
                min_font_size: config.min_font_size,
                max_font_size: config.max_font_size,
                relative_scaling: config.relative_scaling,
                margin: config.margin,
            },
            background: config.background,
            max_words: config.max_words,
            min_word_length: config.min_word_length,
        }
    }

    pub fn font(&self) -> &CloudFont {
        &self.font
    }

    /// Render `text`; `None` when it holds no word of `min_word_length`
    /// characters or more.
    pub fn render(&self, text: &str) -> Option<WordCloud> {
        let frequencies = word_frequencies(text, self.max_words, self.min_word_length);
        if frequencies.is_empty() {
            return None;
        }

        let started = Instant::now();
        let words = layout_words(&frequencies, &self.params, &self.font);
        if words.len() < frequencies.len() {
            log::debug!("Placed {} of {} words", words.len(), frequencies.len());
        }

        let mut image = RgbaImage::from_pixel(self.params.width, self.params.height, rgb(self.background));
        let colors = generate_palette(words.len());
        for (word, color) in words.iter().zip(colors) {
            self.font
                .draw_text(&mut image, &word.text, word.font_size as f32, word.x, word.y, color);
        }

        log::debug!(
            "Rendered {} words with {} in {}ms",
            words.len(),
            self.font.name(),
            started.elapsed().as_millis()
        );
        Some(WordCloud { image, words })
    }
}
