use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::data::model::Row;
use crate::data::stats::Bins;

// ---------------------------------------------------------------------------
// Artifact – what a derivation produces and a render slot holds
// ---------------------------------------------------------------------------

/// Renderer-agnostic output of a derivation.
///
/// This is also the JSON contract of exported snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Artifact {
    Chart(ChartSpec),
    Table(TableArtifact),
    Text(TextNode),
}

impl Artifact {
    pub fn as_chart(&self) -> Option<&ChartSpec> {
        match self {
            Artifact::Chart(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableArtifact> {
        match self {
            Artifact::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Artifact::Text(t) => Some(t),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartSpec {
    Scatter(ScatterSpec),
    Histogram(HistogramSpec),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Scatter(s) => &s.title,
            ChartSpec::Histogram(h) => &h.title,
        }
    }
}

/// A 2-D point cloud, one series per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ScatterSeries>,
}

#[cfg(test)]
impl ScatterSpec {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterSeries {
    pub name: String,
    pub color: Rgb,
    pub points: Vec<[f64; 2]>,
}

/// Binned counts; every series shares the same `bins`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bins: Bins,
    /// Series are drawn on top of each other rather than side by side.
    pub overlay: bool,
    pub series: Vec<HistogramSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSeries {
    pub name: String,
    pub color: Rgb,
    pub opacity: f32,
    /// One count per bin.
    pub counts: Vec<u32>,
}

#[cfg(test)]
impl HistogramSeries {
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Leading rows of the dataset; `columns` is the features then the label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableArtifact {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

// ---------------------------------------------------------------------------
// Text tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TextNode {
    /// A heading (`level` 1 is the largest) followed by its children.
    Section {
        heading: String,
        level: u8,
        children: Vec<TextNode>,
    },
    Line {
        text: String,
    },
}

impl TextNode {
    pub fn section(heading: impl Into<String>, level: u8, children: Vec<TextNode>) -> Self {
        TextNode::Section {
            heading: heading.into(),
            level,
            children,
        }
    }

    pub fn line(text: impl Into<String>) -> Self {
        TextNode::Line { text: text.into() }
    }
}

#[cfg(test)]
impl TextNode {
    /// Find the first section with this heading, depth-first.
    pub fn find_section(&self, wanted: &str) -> Option<&TextNode> {
        match self {
            TextNode::Section {
                heading, children, ..
            } => {
                if heading == wanted {
                    return Some(self);
                }
                children.iter().find_map(|c| c.find_section(wanted))
            }
            TextNode::Line { .. } => None,
        }
    }

    /// Text of the direct `Line` children of a section.
    pub fn lines(&self) -> Vec<&str> {
        match self {
            TextNode::Section { children, .. } => children
                .iter()
                .filter_map(|c| match c {
                    TextNode::Line { text } => Some(text.as_str()),
                    TextNode::Section { .. } => None,
                })
                .collect(),
            TextNode::Line { text } => vec![text.as_str()],
        }
    }
}
