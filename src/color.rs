use image::Rgba;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct word colours using evenly spaced hues.
///
/// Lightness stays below 50% so every colour reads on a white canvas.
pub fn generate_palette(n: usize) -> Vec<Rgba<u8>> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            // Golden-angle stepping keeps neighbouring (similar-sized) words apart in hue.
            let hue = (i as f32 * 137.508) % 360.0;
            let hsl = Hsl::new(hue, 0.8, 0.4);
            let rgb: Srgb = hsl.into_color();
            Rgba([
                (rgb.red * 255.0).round() as u8,
                (rgb.green * 255.0).round() as u8,
                (rgb.blue * 255.0).round() as u8,
                255,
            ])
        })
        .collect()
}

/// Opaque colour from an `[r, g, b]` triple.
pub fn rgb(c: [u8; 3]) -> Rgba<u8> {
    Rgba([c[0], c[1], c[2], 255])
}
