pub mod derive;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifact::{Artifact, ChartSpec};
use crate::color::ClassColors;
use crate::data::model::Dataset;
use crate::reactive::binding::{Binding, BindingError, BindingGraph};
use crate::reactive::controls::{
    Control, ControlError, ControlRegistry, ControlValue, Domain, InputSnapshot, SetOutcome,
};
use crate::reactive::render::SlotStore;

// ---------------------------------------------------------------------------
// Control and slot identifiers
// ---------------------------------------------------------------------------

pub const X_FEATURE: &str = "x-axis-dropdown";
pub const Y_FEATURE: &str = "y-axis-dropdown";
pub const HISTOGRAM_FEATURE: &str = "histogram-dropdown";
pub const GROUP_BY_CLASS: &str = "species-checkbox";
pub const TABLE_ROWS: &str = "table-rows-input";

pub const SCATTER_SLOT: &str = "scatter-plot";
pub const HISTOGRAM_SLOT: &str = "histogram-plot";
pub const TABLE_SLOT: &str = "data-table";
pub const STATISTICS_SLOT: &str = "statistics-output";

/// The single option of the group-by checklist.
pub const GROUP_OPTION: &str = "yes";

const DEFAULT_TABLE_ROWS: i64 = 10;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Control(#[from] ControlError),
    #[error(transparent)]
    Binding(#[from] BindingError),
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// One dashboard instance: its own controls and slots over a shared dataset.
pub struct Dashboard {
    dataset: Arc<Dataset>,
    colors: ClassColors,
    controls: ControlRegistry,
    graph: BindingGraph<Dataset>,
    slots: SlotStore,
}

impl Dashboard {
    /// Register the controls, wire the four derivations and render every
    /// slot once.
    pub fn new(dataset: Arc<Dataset>) -> Result<Self, DashboardError> {
        let colors = ClassColors::new(dataset.classes());
        let controls = build_controls(&dataset)?;
        let graph = BindingGraph::new(build_bindings(&colors), &controls)?;

        let mut slots = SlotStore::new();
        let rendered = graph.render_all(&*dataset, &controls, &mut slots);
        log::debug!("initial render filled {} slots", rendered.len());

        Ok(Self {
            dataset,
            colors,
            controls,
            graph,
            slots,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn colors(&self) -> &ClassColors {
        &self.colors
    }

    pub fn controls(&self) -> &ControlRegistry {
        &self.controls
    }

    pub fn slot(&self, id: &str) -> Option<&Artifact> {
        self.slots.get(id)
    }

    /// Update a control and re-render its subscribers.
    ///
    /// Returns the slots that changed, or the reason the value was refused
    /// (in which case nothing was re-rendered).
    pub fn apply(&mut self, id: &str, value: ControlValue) -> Result<Vec<String>, ControlError> {
        log::debug!("control '{id}' ← {value}");
        if let SetOutcome::Clamped { requested, applied } = self.controls.set(id, value)? {
            log::warn!("control '{id}': {requested} is out of range, using {applied}");
        }
        Ok(self
            .graph
            .propagate(id, &*self.dataset, &self.controls, &mut self.slots))
    }

    /// Like [`Dashboard::apply`] but a refused value is logged and ignored.
    /// This is the path UI interaction takes.
    pub fn set(&mut self, id: &str, value: ControlValue) -> Vec<String> {
        self.apply(id, value).unwrap_or_else(|e| {
            log::warn!("ignoring update: {e}");
            Vec::new()
        })
    }

    /// Parse `raw` for the control's kind, then [`Dashboard::apply`] it.
    pub fn apply_raw(&mut self, id: &str, raw: &str) -> Result<Vec<String>, ControlError> {
        let value = self.controls.parse(id, raw)?;
        self.apply(id, value)
    }

    /// Current control values and slot contents.
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            controls: self.controls.values(),
            slots: self
                .slots
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

fn build_controls(dataset: &Dataset) -> Result<ControlRegistry, ControlError> {
    let features = dataset.features();
    let first = features[0].clone();
    let second = features.get(1).unwrap_or(&features[0]).clone();

    let mut controls = ControlRegistry::new();
    controls.register(Control::new(
        X_FEATURE,
        "Select X-axis feature:",
        Domain::one_of(features.iter().cloned()),
        ControlValue::One(first.clone()),
    )?)?;
    controls.register(Control::new(
        Y_FEATURE,
        "Select Y-axis feature:",
        Domain::one_of(features.iter().cloned()),
        ControlValue::One(second),
    )?)?;
    controls.register(Control::new(
        HISTOGRAM_FEATURE,
        "Select feature for histogram:",
        Domain::one_of(features.iter().cloned()),
        ControlValue::One(first),
    )?)?;
    controls.register(Control::new(
        GROUP_BY_CLASS,
        format!("Group by {}:", dataset.label_name()),
        Domain::subset_of([GROUP_OPTION]),
        ControlValue::Many(BTreeSet::from([GROUP_OPTION.to_string()])),
    )?)?;
    controls.register(Control::new(
        TABLE_ROWS,
        "Number of rows to display:",
        Domain::Range {
            min: 1,
            max: dataset.len() as i64,
        },
        ControlValue::Number(DEFAULT_TABLE_ROWS),
    )?)?;
    Ok(controls)
}

fn build_bindings(colors: &ClassColors) -> Vec<Binding<Dataset>> {
    let scatter_colors = colors.clone();
    let histogram_colors = colors.clone();
    vec![
        Binding::new(
            "scatter",
            &[X_FEATURE, Y_FEATURE],
            SCATTER_SLOT,
            move |ds: &Dataset, inputs: &InputSnapshot| {
                let spec = derive::scatter(
                    ds,
                    &scatter_colors,
                    inputs.one(X_FEATURE)?,
                    inputs.one(Y_FEATURE)?,
                )?;
                Ok(Artifact::Chart(ChartSpec::Scatter(spec)))
            },
        ),
        Binding::new(
            "histogram",
            &[HISTOGRAM_FEATURE, GROUP_BY_CLASS],
            HISTOGRAM_SLOT,
            move |ds: &Dataset, inputs: &InputSnapshot| {
                let spec = derive::histogram(
                    ds,
                    &histogram_colors,
                    inputs.one(HISTOGRAM_FEATURE)?,
                    inputs.checked(GROUP_BY_CLASS, GROUP_OPTION)?,
                )?;
                Ok(Artifact::Chart(ChartSpec::Histogram(spec)))
            },
        ),
        Binding::new("table", &[TABLE_ROWS], TABLE_SLOT, |ds: &Dataset, inputs: &InputSnapshot| {
            Ok(Artifact::Table(derive::table(ds, inputs.number(TABLE_ROWS)?)))
        }),
        Binding::new(
            "statistics",
            &[HISTOGRAM_FEATURE],
            STATISTICS_SLOT,
            |ds: &Dataset, inputs: &InputSnapshot| {
                Ok(Artifact::Text(derive::statistics(
                    ds,
                    inputs.one(HISTOGRAM_FEATURE)?,
                )?))
            },
        ),
    ]
}

// ---------------------------------------------------------------------------
// Snapshot export
// ---------------------------------------------------------------------------

/// Everything the dashboard currently shows, in its JSON wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub controls: BTreeMap<String, ControlValue>,
    pub slots: BTreeMap<String, Artifact>,
}

impl DashboardSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the snapshot as pretty JSON.
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let json = self.to_json().context("serializing dashboard snapshot")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("exported dashboard snapshot to {}", path.display());
        Ok(())
    }
}
