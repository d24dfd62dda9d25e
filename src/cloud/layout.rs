use std::collections::HashMap;
use std::f32::consts::TAU;

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::integral_image::{integral_image, sum_image_pixels};
use imageproc::rect::Rect;

use super::font::TextMeasure;

/// Distance between spiral turns, in pixels.
const SPIRAL_GAP: f32 = 4.0;
/// Arc length between consecutive spiral samples, in pixels.
const SPIRAL_STRIDE: f32 = 2.0;

// ---------------------------------------------------------------------------
// Word frequencies
// ---------------------------------------------------------------------------

/// Count whitespace-separated words of at least `min_len` characters, most
/// frequent first (ties by word), keep the top `max_words` and normalize so
/// the top word has frequency 1.0.
pub fn word_frequencies(text: &str, max_words: usize, min_len: usize) -> Vec<(String, f32)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in text.split_whitespace().filter(|w| w.chars().count() >= min_len) {
        *counts.entry(word).or_default() += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(max_words);

    let Some(&(_, top)) = ranked.first() else {
        return Vec::new();
    };
    ranked
        .into_iter()
        .map(|(word, count)| (word.to_string(), count as f32 / top as f32))
        .collect()
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct LayoutParams {
    pub width: u32,
    pub height: u32,
    pub min_font_size: u32,
    pub max_font_size: Option<u32>,
    pub relative_scaling: f32,
    pub margin: u32,
}

/// A word that made it onto the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub font_size: u32,
    /// Top-left of the text box (inside the margin).
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Greedy placement, most frequent word first.
///
/// Each word's size follows the previous one scaled by relative frequency; a
/// word that finds no free spot along the spiral shrinks one pixel at a time.
/// Layout ends at the first word that no longer fits at `min_font_size`.
pub fn layout_words<M: TextMeasure>(
    frequencies: &[(String, f32)],
    params: &LayoutParams,
    measure: &M,
) -> Vec<PlacedWord> {
    let mut occupancy = Occupancy::new(params.width, params.height);
    let mut placed = Vec::new();

    let mut font_size = match params.max_font_size {
        Some(max) => max as f32,
        None => initial_font_size(frequencies, params, measure),
    };
    let mut last_freq = 1.0f32;
    let rs = params.relative_scaling;

    for (word, freq) in frequencies {
        if *freq <= 0.0 {
            continue;
        }
        if rs != 0.0 {
            font_size = ((rs * (freq / last_freq) + (1.0 - rs)) * font_size).round();
        }

        let mut spot = None;
        while font_size >= params.min_font_size as f32 {
            let (w, h) = measure.text_size(word, font_size);
            let box_w = w + 2 * params.margin;
            let box_h = h + 2 * params.margin;
            if let Some((x, y)) = occupancy.find_spot(box_w, box_h) {
                spot = Some((x, y, w, h, box_w, box_h));
                break;
            }
            font_size -= 1.0;
        }
        let Some((x, y, w, h, box_w, box_h)) = spot else {
            log::debug!("Canvas full after {} words", placed.len());
            break;
        };

        occupancy.occupy(x, y, box_w, box_h);
        placed.push(PlacedWord {
            text: word.clone(),
            font_size: font_size as u32,
            x: x + params.margin,
            y: y + params.margin,
            width: w,
            height: h,
        });
        last_freq = *freq;
    }

    placed
}

/// Largest size, stepping down from the canvas height, at which the two most
/// frequent words both fit.
fn initial_font_size<M: TextMeasure>(
    frequencies: &[(String, f32)],
    params: &LayoutParams,
    measure: &M,
) -> f32 {
    let mut size = params.height as f32;
    let [(first, f1), (second, f2), ..] = frequencies else {
        return size;
    };
    let rs = params.relative_scaling;
    let ratio = if *f1 > 0.0 { f2 / f1 } else { 1.0 };

    while size > params.min_font_size as f32 {
        let second_size = ((rs * ratio + (1.0 - rs)) * size).round();
        let mut occupancy = Occupancy::new(params.width, params.height);
        let fits = [(first, size), (second, second_size)].iter().all(|(word, px)| {
            let (w, h) = measure.text_size(word, *px);
            let (box_w, box_h) = (w + 2 * params.margin, h + 2 * params.margin);
            match occupancy.find_spot(box_w, box_h) {
                Some((x, y)) => {
                    occupancy.occupy(x, y, box_w, box_h);
                    true
                }
                None => false,
            }
        });
        if fits {
            return size;
        }
        size = (size * 0.9).floor();
    }
    params.min_font_size as f32
}

// ---------------------------------------------------------------------------
// Occupancy map (mask of taken boxes + its integral image)
// ---------------------------------------------------------------------------

struct Occupancy {
    mask: GrayImage,
    integral: ImageBuffer<Luma<u32>, Vec<u32>>,
}

impl Occupancy {
    fn new(width: u32, height: u32) -> Self {
        let mask = GrayImage::new(width, height);
        let integral = integral_image::<_, u32>(&mask);
        Self { mask, integral }
    }

    /// `w` and `h` must be non-zero.
    fn is_free(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        sum_image_pixels(&self.integral, x, y, x + w - 1, y + h - 1)[0] == 0
    }

    /// First free top-left position for a `w × h` box along an elliptical
    /// spiral from the canvas centre, stretched to the canvas aspect ratio.
    fn find_spot(&self, w: u32, h: u32) -> Option<(u32, u32)> {
        let (width, height) = self.mask.dimensions();
        if w == 0 || h == 0 || w > width || h > height {
            return None;
        }
        let max_x = (width - w) as f32;
        let max_y = (height - h) as f32;
        let (cx, cy) = (max_x / 2.0, max_y / 2.0);
        let aspect = width as f32 / height as f32;
        let max_radius = height as f32;

        let mut theta = 0.0f32;
        loop {
            let r = SPIRAL_GAP * theta / TAU;
            if r > max_radius {
                return None;
            }
            let x = (cx + aspect * r * theta.cos()).round();
            let y = (cy + r * theta.sin()).round();
            if (0.0..=max_x).contains(&x) && (0.0..=max_y).contains(&y) {
                let (x, y) = (x as u32, y as u32);
                if self.is_free(x, y, w, h) {
                    return Some((x, y));
                }
            }
            theta += (SPIRAL_STRIDE / r.max(1.0)).min(0.5);
        }
    }

    fn occupy(&mut self, x: u32, y: u32, w: u32, h: u32) {
        if w == 0 || h == 0 {
            return;
        }
        draw_filled_rect_mut(&mut self.mask, Rect::at(x as i32, y as i32).of_size(w, h), Luma([1]));
        self.integral = integral_image::<_, u32>(&self.mask);
    }
}
