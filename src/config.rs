use std::path::PathBuf;

use clap::Parser;

use crate::data::loader::IRIS_LABEL;

/// Interactive explorer for a small labelled dataset (Iris by default).
#[derive(Debug, Parser)]
#[command(name = "iris-explorer", version, about)]
pub struct Config {
    /// Load this .csv/.json/.parquet file instead of the embedded Iris data.
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Name of the class label column in `--data`.
    #[arg(long, value_name = "NAME", default_value = IRIS_LABEL)]
    pub label_column: String,

    /// Preset a control before the first frame, e.g. `table-rows-input=25`.
    /// Checklists take a comma-separated list. Repeatable.
    #[arg(long = "set", value_name = "ID=VALUE", value_parser = parse_preset)]
    pub presets: Vec<(String, String)>,

    /// Write the dashboard snapshot as JSON to PATH and exit without a window.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long)]
    pub debug: bool,

    /// Initial window width in points.
    #[arg(long, default_value_t = 1200.0)]
    pub width: f32,

    /// Initial window height in points.
    #[arg(long, default_value_t = 900.0)]
    pub height: f32,
}

impl Config {
    /// Default `env_logger` filter when RUST_LOG is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

fn parse_preset(raw: &str) -> Result<(String, String), String> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=VALUE, got '{raw}'"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing control id in '{raw}'"));
    }
    Ok((id.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::try_parse_from(["iris-explorer"]).unwrap();
        assert!(cfg.data.is_none());
        assert_eq!(cfg.label_column, "species");
        assert!(cfg.presets.is_empty());
        assert_eq!(cfg.log_filter(), "info");
        assert_eq!(cfg.width, 1200.0);
    }

    #[test]
    fn presets_and_flags() {
        let cfg = Config::try_parse_from([
            "iris-explorer",
            "--set",
            "table-rows-input=25",
            "--set",
            "species-checkbox=",
            "--export",
            "out.json",
            "--debug",
        ])
        .unwrap();
        assert_eq!(
            cfg.presets,
            vec![
                ("table-rows-input".to_string(), "25".to_string()),
                ("species-checkbox".to_string(), String::new()),
            ]
        );
        assert_eq!(cfg.export, Some(PathBuf::from("out.json")));
        assert_eq!(cfg.log_filter(), "debug");
    }

    #[test]
    fn malformed_preset_is_a_usage_error() {
        assert!(Config::try_parse_from(["iris-explorer", "--set", "rows"]).is_err());
        assert!(Config::try_parse_from(["iris-explorer", "--set", "=3"]).is_err());
    }
}
