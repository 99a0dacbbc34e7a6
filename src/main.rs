mod app;
mod artifact;
mod color;
mod config;
mod dashboard;
mod data;
mod reactive;
mod ui;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use app::IrisExplorerApp;
use config::Config;
use dashboard::Dashboard;

fn main() -> Result<()> {
    let config = Config::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter()))
        .init();

    // A dataset that fails to load is fatal: nothing below runs on partial data.
    let dataset = match &config.data {
        Some(path) => data::loader::load_file(path, &config.label_column)?,
        None => data::loader::load()?,
    };
    log::info!(
        "Loaded {} rows with features {:?} and classes {:?}",
        dataset.len(),
        dataset.features(),
        dataset.classes()
    );

    let mut dashboard = Dashboard::new(Arc::new(dataset))?;
    for (id, raw) in &config.presets {
        dashboard
            .apply_raw(id, raw)
            .with_context(|| format!("applying --set {id}={raw}"))?;
    }

    if let Some(path) = &config.export {
        return dashboard.snapshot().write(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.width, config.height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Iris Dataset Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(IrisExplorerApp::new(dashboard)))),
    )
    .map_err(|e| anyhow::anyhow!("running the UI: {e}"))
}
