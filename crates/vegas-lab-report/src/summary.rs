//! Best/worst throughput selection per file-size group.

use anyhow::Context;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use thiserror::Error;
use vegas_lab_abstract::{Record, TuningParams};
use vegas_lab_parser::{Group, ResultTable};

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("no records for file size {file_size_mb}MB")]
    NoRecords { file_size_mb: u32 },
}

/// Snapshot of one extreme row: the parameter combination and its metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extreme {
    pub params: TuningParams,
    pub throughput_mbps: f64,
}

impl Extreme {
    fn of(record: &Record) -> Self {
        Self {
            params: record.params,
            throughput_mbps: record.throughput_mbps,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestWorst {
    pub file_size_mb: u32,
    pub best: Extreme,
    pub worst: Extreme,
}

/// Select the records with maximum and minimum throughput in the group.
/// Ties resolve to the first-encountered record under table order.
pub fn best_worst(group: &Group<'_>) -> Result<BestWorst, SummaryError> {
    let mut records = group.records.iter().copied();
    let first = records.next().ok_or(SummaryError::NoRecords {
        file_size_mb: group.file_size_mb,
    })?;
    let mut best: &Record = first;
    let mut worst: &Record = first;
    for record in records {
        if record.throughput_mbps > best.throughput_mbps {
            best = record;
        }
        if record.throughput_mbps < worst.throughput_mbps {
            worst = record;
        }
    }
    Ok(BestWorst {
        file_size_mb: group.file_size_mb,
        best: Extreme::of(best),
        worst: Extreme::of(worst),
    })
}

/// Best/worst pairs for every group, in first-appearance order of file sizes.
pub fn summarize(table: &ResultTable) -> Result<Vec<BestWorst>, SummaryError> {
    table.groups().iter().map(best_worst).collect()
}

/// Render the human-readable summary, one block per file size.
pub fn format_text_summary(entries: &[BestWorst]) -> String {
    let mut text = String::new();
    for entry in entries {
        // write! into a String cannot fail
        let _ = writeln!(text, "File Size: {}MB", entry.file_size_mb);
        let _ = writeln!(
            text,
            "Best - {}, Throughput: {} Mbps",
            entry.best.params.describe(),
            entry.best.throughput_mbps
        );
        let _ = writeln!(
            text,
            "Worst - {}, Throughput: {} Mbps",
            entry.worst.params.describe(),
            entry.worst.throughput_mbps
        );
        text.push('\n');
    }
    text
}

pub fn write_text_summary(entries: &[BestWorst], path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, format_text_summary(entries))
        .with_context(|| format!("Failed to write summary file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vegas_lab_abstract::LogFormat;

    fn three_param_table(throughputs: &[f64]) -> ResultTable {
        let records = throughputs
            .iter()
            .enumerate()
            .map(|(i, t)| Record {
                params: TuningParams::with_gamma(i as u32 + 1, (i as u32 + 1) * 2, 1),
                file_size_mb: 10,
                throughput_mbps: *t,
                flow: None,
            })
            .collect();
        ResultTable::new(LogFormat::AverageThreeParam, records)
    }

    #[test]
    fn selects_extremes_within_group() {
        let table = three_param_table(&[3.0, 7.5, 1.2]);
        let entry = best_worst(&table.group(10)).unwrap();
        assert_eq!(entry.best.throughput_mbps, 7.5);
        assert_eq!(entry.worst.throughput_mbps, 1.2);
        for record in table.records() {
            assert!(entry.best.throughput_mbps >= record.throughput_mbps);
            assert!(entry.worst.throughput_mbps <= record.throughput_mbps);
        }
    }

    #[test]
    fn singleton_group_is_both_best_and_worst() {
        let table = three_param_table(&[4.2]);
        let entry = best_worst(&table.group(10)).unwrap();
        assert_eq!(entry.best, entry.worst);
    }

    #[test]
    fn ties_resolve_to_first_encountered() {
        let table = three_param_table(&[5.0, 5.0, 5.0]);
        let entry = best_worst(&table.group(10)).unwrap();
        assert_eq!(entry.best.params.alpha, 1);
        assert_eq!(entry.worst.params.alpha, 1);
    }

    #[test]
    fn empty_group_is_an_explicit_error() {
        let table = three_param_table(&[]);
        let err = best_worst(&table.group(10)).unwrap_err();
        assert_eq!(err.to_string(), "no records for file size 10MB");
    }

    #[test]
    fn summary_blocks_follow_first_appearance_order() {
        let records = vec![
            Record {
                params: TuningParams::new(1, 3),
                file_size_mb: 50,
                throughput_mbps: 4.9,
                flow: None,
            },
            Record {
                params: TuningParams::new(2, 4),
                file_size_mb: 10,
                throughput_mbps: 5.1234,
                flow: None,
            },
            Record {
                params: TuningParams::new(2, 6),
                file_size_mb: 50,
                throughput_mbps: 5.4,
                flow: None,
            },
        ];
        let table = ResultTable::new(LogFormat::AverageTwoParam, records);
        let entries = summarize(&table).unwrap();
        assert_eq!(entries[0].file_size_mb, 50);
        assert_eq!(entries[1].file_size_mb, 10);

        let text = format_text_summary(&entries);
        assert_eq!(
            text,
            "File Size: 50MB\n\
             Best - Alpha: 2, Beta: 6, Throughput: 5.4 Mbps\n\
             Worst - Alpha: 1, Beta: 3, Throughput: 4.9 Mbps\n\
             \n\
             File Size: 10MB\n\
             Best - Alpha: 2, Beta: 4, Throughput: 5.1234 Mbps\n\
             Worst - Alpha: 2, Beta: 4, Throughput: 5.1234 Mbps\n\
             \n"
        );
    }

    #[test]
    fn written_summary_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("max_min_results.txt");
        let table = three_param_table(&[3.0, 7.5, 1.2]);
        let entries = summarize(&table).unwrap();
        write_text_summary(&entries, &path).unwrap();
        let first = std::fs::read(&path).unwrap();
        write_text_summary(&entries, &path).unwrap();
        assert_eq!(first, std::fs::read(&path).unwrap());
    }
}
