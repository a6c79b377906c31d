//! Field-rule template engine for the experiment log formats.
//!
//! A template is an ordered list of anchored rules, one per field, each
//! carrying its literal label and separator. A trigger pattern locates
//! candidate record starts (a line beginning with `Alpha: `); from there the
//! rules consume the text sequentially at a cursor. A span that triggers the
//! template but deviates from the rule sequence is reported with its exact
//! position instead of being dropped.

use crate::error::{ParseError, Position};
use regex::Regex;
use vegas_lab_abstract::LogFormat;

pub struct FieldRule {
    pub field: &'static str,
    pattern: Regex,
}

fn rule(field: &'static str, pattern: &str) -> FieldRule {
    FieldRule {
        field,
        pattern: Regex::new(pattern).unwrap(),
    }
}

/// One raw capture: the field it belongs to, the matched text, and the byte
/// offset of the capture within the source document.
#[derive(Debug, Clone, Copy)]
pub struct RawField<'a> {
    pub field: &'static str,
    pub text: &'a str,
    pub offset: usize,
}

/// All captures of one record occurrence, in rule order.
#[derive(Debug, Clone)]
pub struct RawRecord<'a> {
    pub offset: usize,
    pub fields: Vec<RawField<'a>>,
}

pub struct LogTemplate {
    format: LogFormat,
    trigger: Regex,
    rules: Vec<FieldRule>,
}

const UINT: &str = r"(\d+)";
const DECIMAL: &str = r"([0-9.]+)";
const IPV4: &str = r"(\d{1,3}(?:\.\d{1,3}){3})";

impl LogTemplate {
    pub fn for_format(format: LogFormat) -> Self {
        let mut rules = vec![
            rule("Alpha", &format!(r"^Alpha: {UINT}")),
            rule("Beta", &format!(r"^ Beta: {UINT}")),
        ];
        if format.has_gamma() {
            rules.push(rule("Gamma", &format!(r"^ Gamma: {UINT}")));
        }
        rules.push(rule("FileSize", &format!(r"^ FileSize: {UINT}MB")));
        match format {
            LogFormat::AverageTwoParam | LogFormat::AverageThreeParam => {
                rules.push(rule(
                    "Average Throughput",
                    &format!(r"^ Average Throughput: {DECIMAL} Mbps"),
                ));
            }
            LogFormat::FlowDetail => {
                rules.push(rule("Flow ID", &format!(r"^\r?\nFlow ID: {UINT}")));
                rules.push(rule("Src Addr", &format!(r"^ Src Addr {IPV4}")));
                rules.push(rule("Dst Addr", &format!(r"^ Dst Addr {IPV4}")));
                rules.push(rule("Tx Packets", &format!(r"^\r?\nTx Packets = {UINT}")));
                rules.push(rule("Rx Packets", &format!(r"^\r?\nRx Packets = {UINT}")));
                rules.push(rule("Duration", &format!(r"^\r?\nDuration: {DECIMAL}")));
                rules.push(rule(
                    "Throughput",
                    &format!(r"^\r?\nThroughput: {DECIMAL} Mbps"),
                ));
            }
        }
        Self {
            format,
            trigger: Regex::new(r"(?m)^Alpha: \d").unwrap(),
            rules,
        }
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Number of fields each record yields.
    pub fn arity(&self) -> usize {
        self.rules.len()
    }

    /// Extract every record occurrence from `text`, in document order.
    ///
    /// Text that never triggers the template is skipped silently; a trigger
    /// followed by a rule mismatch is a positioned error.
    pub fn extract<'a>(&self, text: &'a str) -> Result<Vec<RawRecord<'a>>, ParseError> {
        let mut records = Vec::new();
        let mut at = 0;
        while let Some(found) = self.trigger.find_at(text, at) {
            let start = found.start();
            let mut cursor = start;
            let mut fields = Vec::with_capacity(self.rules.len());
            for rule in &self.rules {
                let caps = rule.pattern.captures(&text[cursor..]).ok_or_else(|| {
                    ParseError::Template {
                        position: Position::locate(text, cursor),
                        expected: rule.field,
                    }
                })?;
                let capture = caps.get(1).expect("field rule has one capture group");
                fields.push(RawField {
                    field: rule.field,
                    text: capture.as_str(),
                    offset: cursor + capture.start(),
                });
                cursor += caps.get(0).expect("regex match has group 0").end();
            }
            records.push(RawRecord { offset: start, fields });
            at = cursor;
        }
        Ok(records)
    }
}
