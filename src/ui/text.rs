use eframe::egui::{self, RichText, Ui};

use crate::artifact::TextNode;

fn heading_size(level: u8) -> f32 {
    match level {
        0..=2 => 22.0,
        3 => 18.0,
        4 => 16.0,
        _ => 14.0,
    }
}

/// Walk a text tree: headings sized by level, leaf sections boxed.
pub fn text_tree(ui: &mut Ui, node: &TextNode) {
    match node {
        TextNode::Line { text } => {
            ui.label(text.as_str());
        }
        TextNode::Section {
            heading,
            level,
            children,
        } => {
            let leaf = children.iter().all(|c| matches!(c, TextNode::Line { .. }));
            let body = |ui: &mut Ui| {
                ui.label(RichText::new(heading.as_str()).size(heading_size(*level)).strong());
                for child in children {
                    text_tree(ui, child);
                }
            };
            if leaf && *level >= 5 {
                egui::Frame::group(ui.style()).show(ui, body);
                ui.add_space(4.0);
            } else {
                ui.indent(heading.as_str(), body);
            }
        }
    }
}
