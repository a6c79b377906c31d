use crate::record::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pipeline configuration, passed explicitly through every stage.
///
/// Defaults reproduce the fixed paths of the original analysis scripts:
/// `results.txt` in the working directory, `parsed_results.csv` next to it,
/// charts and the text summary under `visualization/`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub csv_out: PathBuf,
    pub out_dir: PathBuf,
    pub format: LogFormat,
    /// Padding added below/above the throughput extremes when clamping the
    /// bar-chart y-axis.
    pub y_margin: f64,
    /// Vertical offset of the value annotation above each bar top.
    pub annotate_offset: f64,
    pub render_charts: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("results.txt"),
            csv_out: PathBuf::from("parsed_results.csv"),
            out_dir: PathBuf::from("visualization"),
            format: LogFormat::AverageTwoParam,
            y_margin: 0.01,
            annotate_offset: 0.001,
            render_charts: true,
        }
    }
}

/// Optional overrides loaded from a TOML profile file. Unset fields keep the
/// current configuration value; CLI flags are applied after the profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileOverride {
    pub input: Option<PathBuf>,
    pub csv_out: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub format: Option<LogFormat>,
    pub y_margin: Option<f64>,
    pub annotate_offset: Option<f64>,
}

impl ProfileOverride {
    pub fn apply_to(&self, config: &mut AnalysisConfig) {
        if let Some(v) = &self.input {
            config.input = v.clone();
        }
        if let Some(v) = &self.csv_out {
            config.csv_out = v.clone();
        }
        if let Some(v) = &self.out_dir {
            config.out_dir = v.clone();
        }
        if let Some(v) = self.format {
            config.format = v;
        }
        if let Some(v) = self.y_margin {
            config.y_margin = v;
        }
        if let Some(v) = self.annotate_offset {
            config.annotate_offset = v;
        }
    }
}
