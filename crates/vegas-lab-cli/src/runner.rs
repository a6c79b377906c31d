use anyhow::{Context, Result};
use std::fs;
use tracing::{info, warn};
use vegas_lab_abstract::AnalysisConfig;
use vegas_lab_parser::ResultTable;
use vegas_lab_report::summary::{self, BestWorst};
use vegas_lab_report::charts;

/// Outcome of one analysis run, fed into the optional JSON report.
#[derive(Debug)]
pub struct RunSummary {
    pub record_count: usize,
    pub file_sizes: Vec<u32>,
    pub best_worst: Vec<BestWorst>,
}

/// Execute the full pipeline: read log, parse, write CSV, render the
/// per-group charts, compute and write the best/worst summary.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunSummary> {
    let text = fs::read_to_string(&config.input)
        .with_context(|| format!("Failed to read log file {}", config.input.display()))?;
    let table = ResultTable::from_text(config.format, &text)?;
    info!("Parsed {} records ({} format)", table.len(), config.format);

    table.write_csv(&config.csv_out)?;
    info!("Wrote {}", config.csv_out.display());

    if table.is_empty() {
        warn!("No records matched the template; skipping charts and summary");
        return Ok(RunSummary {
            record_count: 0,
            file_sizes: Vec::new(),
            best_worst: Vec::new(),
        });
    }

    fs::create_dir_all(&config.out_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.out_dir.display()
        )
    })?;

    if config.render_charts {
        for group in table.groups() {
            let path = config
                .out_dir
                .join(format!("throughput_{}MB.png", group.file_size_mb));
            charts::render_bar(&group, config, &path)?;
            if config.format.has_gamma() {
                let path = config
                    .out_dir
                    .join(format!("violin_{}MB.png", group.file_size_mb));
                charts::render_violin(&group, &path)?;
            }
        }
        if config.format.has_gamma() || config.format.has_flow_stats() {
            charts::render_pairplot(&table, &config.out_dir.join("pairplot.png"))?;
        }
    }

    let best_worst = summary::summarize(&table)?;
    summary::write_text_summary(&best_worst, &config.out_dir.join("max_min_results.txt"))?;
    if config.render_charts {
        charts::render_best_worst(
            &best_worst,
            config,
            &config.out_dir.join("max_min_results.png"),
        )?;
    }

    Ok(RunSummary {
        record_count: table.len(),
        file_sizes: table.file_sizes(),
        best_worst,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use vegas_lab_abstract::LogFormat;

    const LOG: &str = "\
Alpha: 1 Beta: 3 FileSize: 10MB Average Throughput: 4.9 Mbps
Alpha: 2 Beta: 4 FileSize: 10MB Average Throughput: 5.1234 Mbps
Alpha: 1 Beta: 3 FileSize: 20MB Average Throughput: 5.8 Mbps
";

    fn config_in(dir: &Path, log: &str) -> AnalysisConfig {
        fs::write(dir.join("results.txt"), log).unwrap();
        AnalysisConfig {
            input: dir.join("results.txt"),
            csv_out: dir.join("parsed_results.csv"),
            out_dir: dir.join("visualization"),
            render_charts: false,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn pipeline_writes_csv_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), LOG);
        let outcome = run_analysis(&config).unwrap();
        assert_eq!(outcome.record_count, 3);
        assert_eq!(outcome.file_sizes, vec![10, 20]);

        let csv = fs::read_to_string(&config.csv_out).unwrap();
        assert!(csv.starts_with("Alpha,Beta,FileSize,Average_Throughput\n"));
        assert_eq!(csv.lines().count(), 4);

        let summary = fs::read_to_string(config.out_dir.join("max_min_results.txt")).unwrap();
        assert!(summary.starts_with("File Size: 10MB\n"));
        assert!(summary.contains("Best - Alpha: 2, Beta: 4, Throughput: 5.1234 Mbps"));
        assert!(summary.contains("File Size: 20MB"));
    }

    #[test]
    fn second_run_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), LOG);
        run_analysis(&config).unwrap();
        let csv_first = fs::read(&config.csv_out).unwrap();
        let summary_first = fs::read(config.out_dir.join("max_min_results.txt")).unwrap();

        run_analysis(&config).unwrap();
        assert_eq!(csv_first, fs::read(&config.csv_out).unwrap());
        assert_eq!(
            summary_first,
            fs::read(config.out_dir.join("max_min_results.txt")).unwrap()
        );
    }

    #[test]
    fn zero_match_input_leaves_header_only_csv() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "no template occurrences here\n");
        let outcome = run_analysis(&config).unwrap();
        assert_eq!(outcome.record_count, 0);
        assert!(outcome.best_worst.is_empty());

        let csv = fs::read_to_string(&config.csv_out).unwrap();
        assert_eq!(csv, "Alpha,Beta,FileSize,Average_Throughput\n");
        assert!(!config.out_dir.exists());
    }

    #[test]
    fn missing_input_fails_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            input: dir.path().join("absent.txt"),
            csv_out: dir.path().join("parsed_results.csv"),
            out_dir: dir.path().join("visualization"),
            ..AnalysisConfig::default()
        };
        let err = run_analysis(&config).unwrap_err();
        assert!(err.to_string().contains("absent.txt"));
    }

    #[test]
    fn malformed_record_aborts_before_csv() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(
            dir.path(),
            "Alpha: 1 Beta: 3 FileSize: tenMB Average Throughput: 4.9 Mbps\n",
        );
        let err = run_analysis(&config).unwrap_err();
        assert!(err.to_string().contains("line 1"));
        assert!(!config.csv_out.exists());
    }

    #[test]
    fn three_param_run_renders_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = String::new();
        for alpha in [1u32, 2] {
            for beta in [2u32, 4] {
                for gamma in [1u32, 2] {
                    log.push_str(&format!(
                        "Alpha: {alpha} Beta: {beta} Gamma: {gamma} FileSize: 10MB \
                         Average Throughput: {}.{alpha}{beta}{gamma} Mbps\n",
                        4 + alpha
                    ));
                }
            }
        }
        let mut config = config_in(dir.path(), &log);
        config.format = LogFormat::AverageThreeParam;
        config.render_charts = true;
        run_analysis(&config).unwrap();

        for artifact in [
            "throughput_10MB.png",
            "violin_10MB.png",
            "pairplot.png",
            "max_min_results.png",
            "max_min_results.txt",
        ] {
            assert!(config.out_dir.join(artifact).exists(), "missing {artifact}");
        }
    }
}
