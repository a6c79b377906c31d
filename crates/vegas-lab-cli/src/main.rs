use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use vegas_lab_abstract::{AnalysisConfig, LogFormat, ProfileOverride};
use vegas_lab_cli::runner;
use vegas_lab_report::AnalysisReport;

#[derive(Parser, Debug)]
#[command(author, version, about = "Analyze ns-3 TCP Vegas experiment logs")]
struct Args {
    /// Log file produced by the experiment run.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Log format: average-two-param, flow-detail or average-three-param.
    #[arg(long)]
    format: Option<String>,

    /// Destination of the parsed CSV table.
    #[arg(long)]
    csv_out: Option<PathBuf>,

    /// Directory receiving charts and the text summary.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// TOML profile applied before the command-line flags.
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Write a JSON report of the finished run.
    #[arg(long)]
    report_out: Option<PathBuf>,

    /// Parse and summarize without rendering charts.
    #[arg(long, default_value_t = false)]
    no_charts: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt::init();
    info!("vegas-lab starting…");

    let config = args.build_config()?;
    let outcome = runner::run_analysis(&config)?;

    if let Some(path) = &args.report_out {
        let report = AnalysisReport {
            config: &config,
            record_count: outcome.record_count,
            file_sizes: outcome.file_sizes.clone(),
            best_worst: &outcome.best_worst,
        };
        let data =
            serde_json::to_vec_pretty(&report).context("Failed to serialize run report")?;
        fs::write(path, &data)
            .with_context(|| format!("Failed to write report file {}", path.display()))?;
    }

    println!(
        "Data has been parsed and saved to {}",
        config.csv_out.display()
    );
    Ok(())
}

impl Args {
    fn build_config(&self) -> Result<AnalysisConfig> {
        let mut config = AnalysisConfig::default();

        if let Some(path) = &self.profile {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read profile file {}", path.display()))?;
            let profile: ProfileOverride =
                toml::from_str(&content).context("Failed to parse profile file")?;
            profile.apply_to(&mut config);
        }

        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(name) = &self.format {
            config.format = LogFormat::by_name(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown log format {name:?}"))?;
        }
        if let Some(path) = &self.csv_out {
            config.csv_out = path.clone();
        }
        if let Some(path) = &self.out_dir {
            config.out_dir = path.clone();
        }
        if self.no_charts {
            config.render_charts = false;
        }
        Ok(config)
    }
}
