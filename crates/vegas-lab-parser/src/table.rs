//! Typed result table assembled from raw template captures.

use crate::error::{ParseError, Position};
use crate::template::{LogTemplate, RawField, RawRecord};
use anyhow::Context;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;
use vegas_lab_abstract::{FlowStats, LogFormat, Record, TuningParams};

/// Records sharing one `FileSize` value, in table order. The unit of chart
/// rendering and of best/worst selection.
#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub file_size_mb: u32,
    pub records: Vec<&'a Record>,
}

/// Ordered sequence of records sharing one schema. Insertion order is the
/// order of appearance in the source text.
#[derive(Debug, Clone)]
pub struct ResultTable {
    format: LogFormat,
    records: Vec<Record>,
}

impl ResultTable {
    pub fn new(format: LogFormat, records: Vec<Record>) -> Self {
        Self { format, records }
    }

    /// Parse the full log text into a typed table.
    pub fn from_text(format: LogFormat, text: &str) -> Result<Self, ParseError> {
        let template = LogTemplate::for_format(format);
        let raw = template.extract(text)?;
        let records = raw
            .iter()
            .map(|occurrence| build_record(format, occurrence, text))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = records.len(), %format, "parsed log records");
        Ok(Self { format, records })
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct file sizes in first-appearance order.
    pub fn file_sizes(&self) -> Vec<u32> {
        let mut sizes = Vec::new();
        for record in &self.records {
            if !sizes.contains(&record.file_size_mb) {
                sizes.push(record.file_size_mb);
            }
        }
        sizes
    }

    /// All records with the given file size, in table order.
    pub fn group(&self, file_size_mb: u32) -> Group<'_> {
        Group {
            file_size_mb,
            records: self
                .records
                .iter()
                .filter(|r| r.file_size_mb == file_size_mb)
                .collect(),
        }
    }

    /// One group per distinct file size, in first-appearance order.
    pub fn groups(&self) -> Vec<Group<'_>> {
        self.file_sizes()
            .into_iter()
            .map(|size| self.group(size))
            .collect()
    }

    pub fn csv_header(&self) -> &'static [&'static str] {
        match self.format {
            LogFormat::AverageTwoParam => {
                &["Alpha", "Beta", "FileSize", "Average_Throughput"]
            }
            LogFormat::AverageThreeParam => {
                &["Alpha", "Beta", "Gamma", "FileSize", "Average_Throughput"]
            }
            LogFormat::FlowDetail => &[
                "Alpha",
                "Beta",
                "FileSize",
                "Flow_ID",
                "Src_Addr",
                "Dst_Addr",
                "Tx_Packets",
                "Rx_Packets",
                "Duration",
                "Throughput",
            ],
        }
    }

    fn csv_row(&self, record: &Record) -> Vec<String> {
        let mut row = vec![
            record.params.alpha.to_string(),
            record.params.beta.to_string(),
        ];
        if let Some(gamma) = record.params.gamma {
            row.push(gamma.to_string());
        }
        row.push(record.file_size_mb.to_string());
        if let Some(flow) = &record.flow {
            row.push(flow.flow_id.to_string());
            row.push(flow.src_addr.to_string());
            row.push(flow.dst_addr.to_string());
            row.push(flow.tx_packets.to_string());
            row.push(flow.rx_packets.to_string());
            row.push(flow.duration_s.to_string());
        }
        row.push(record.throughput_mbps.to_string());
        row
    }

    /// Serialize the table, header row included, overwriting any prior file.
    pub fn write_csv(&self, path: &Path) -> anyhow::Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
        writer.write_record(self.csv_header())?;
        for record in &self.records {
            writer.write_record(self.csv_row(record))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write CSV file {}", path.display()))?;
        Ok(())
    }
}

fn parse_field<T: FromStr>(field: &RawField<'_>, text: &str) -> Result<T, ParseError> {
    field.text.parse().map_err(|_| ParseError::Cast {
        field: field.field,
        value: field.text.to_string(),
        position: Position::locate(text, field.offset),
    })
}

fn build_record(
    format: LogFormat,
    occurrence: &RawRecord<'_>,
    text: &str,
) -> Result<Record, ParseError> {
    let f = &occurrence.fields;
    match format {
        LogFormat::AverageTwoParam => Ok(Record {
            params: TuningParams::new(parse_field(&f[0], text)?, parse_field(&f[1], text)?),
            file_size_mb: parse_field(&f[2], text)?,
            throughput_mbps: parse_field(&f[3], text)?,
            flow: None,
        }),
        LogFormat::AverageThreeParam => Ok(Record {
            params: TuningParams::with_gamma(
                parse_field(&f[0], text)?,
                parse_field(&f[1], text)?,
                parse_field(&f[2], text)?,
            ),
            file_size_mb: parse_field(&f[3], text)?,
            throughput_mbps: parse_field(&f[4], text)?,
            flow: None,
        }),
        LogFormat::FlowDetail => Ok(Record {
            params: TuningParams::new(parse_field(&f[0], text)?, parse_field(&f[1], text)?),
            file_size_mb: parse_field(&f[2], text)?,
            flow: Some(FlowStats {
                flow_id: parse_field(&f[3], text)?,
                src_addr: parse_field(&f[4], text)?,
                dst_addr: parse_field(&f[5], text)?,
                tx_packets: parse_field(&f[6], text)?,
                rx_packets: parse_field(&f[7], text)?,
                duration_s: parse_field(&f[8], text)?,
            }),
            throughput_mbps: parse_field(&f[9], text)?,
        }),
    }
}
