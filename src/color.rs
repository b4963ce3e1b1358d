use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// An 8-bit sRGB colour usable by both the on-screen and exported plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8(pub u8, pub u8, pub u8);

impl Rgb8 {
    pub fn color32(self) -> Color32 {
        Color32::from_rgb(self.0, self.1, self.2)
    }

    pub fn plotters(self) -> RGBColor {
        RGBColor(self.0, self.1, self.2)
    }
}

/// Generates `n` visually distinct colours using evenly spaced hues,
/// starting at red.
pub fn generate_palette(n: usize) -> Vec<Rgb8> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            Rgb8(
                (rgb.red * 255.0).round() as u8,
                (rgb.green * 255.0).round() as u8,
                (rgb.blue * 255.0).round() as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Plot theme
// ---------------------------------------------------------------------------

/// Colours shared by the interactive plots and the image export.
#[derive(Debug, Clone, Copy)]
pub struct PlotTheme {
    pub spectrum: Rgb8,
    pub time_series: Rgb8,
    /// Dashed marker at the selected frequency.
    pub marker: Rgb8,
}

impl Default for PlotTheme {
    fn default() -> Self {
        // red, green, blue
        let p = generate_palette(3);
        Self {
            marker: p[0],
            time_series: p[1],
            spectrum: p[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_distinct() {
        let p = generate_palette(6);
        assert_eq!(p.len(), 6);
        for (i, a) in p.iter().enumerate() {
            for b in &p[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn theme_marker_is_red_dominant() {
        let Rgb8(r, g, b) = PlotTheme::default().marker;
        assert!(r > g && r > b);
    }
}
