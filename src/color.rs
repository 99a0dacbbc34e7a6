use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

/// Colour of the ungrouped histogram.
pub const SINGLE_SERIES: Rgb = Rgb(0x34, 0x98, 0xdb);

/// Fallback for labels without an assigned colour.
pub const DEFAULT_COLOR: Rgb = Rgb(0x7f, 0x8c, 0x8d);

/// 8-bit sRGB triple, independent of any UI toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: class label → Rgb
// ---------------------------------------------------------------------------

/// Maps each class of the dataset to a distinct colour, in class order.
#[derive(Debug, Clone)]
pub struct ClassColors {
    mapping: Vec<(String, Rgb)>,
}

impl ClassColors {
    pub fn new(classes: &[String]) -> Self {
        let palette = generate_palette(classes.len());
        ClassColors {
            mapping: classes.iter().cloned().zip(palette).collect(),
        }
    }

    /// Look up the colour for a class label.
    pub fn color_for(&self, class: &str) -> Rgb {
        self.mapping
            .iter()
            .find(|(c, _)| c == class)
            .map(|(_, rgb)| *rgb)
            .unwrap_or(DEFAULT_COLOR)
    }

    /// Return the legend entries (label → colour).
    pub fn legend_entries(&self) -> &[(String, Rgb)] {
        &self.mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colors_are_distinct() {
        let colors = generate_palette(3);
        assert_eq!(colors.len(), 3);
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
        assert_ne!(colors[0], colors[2]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn class_lookup_falls_back_to_default() {
        let colors = ClassColors::new(&["a".to_string(), "b".to_string()]);
        assert_eq!(colors.legend_entries().len(), 2);
        assert_ne!(colors.color_for("a"), colors.color_for("b"));
        assert_eq!(colors.color_for("zzz"), DEFAULT_COLOR);
    }
}
