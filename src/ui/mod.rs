use eframe::egui::Color32;

use crate::color::Rgb;

pub mod panels;
pub mod plot;
pub mod table;
pub mod text;

/// Convert a toolkit-neutral colour, applying `opacity` as alpha.
pub fn to_color32(rgb: Rgb, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(rgb.0, rgb.1, rgb.2, alpha)
}
