use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Which log template the experiment run emitted.
///
/// The ns-3 driver grew in three steps: an alpha/beta sweep printing one
/// averaged throughput line per run, the same sweep printing the full
/// FlowMonitor block per flow, and an alpha/beta/gamma sweep back on the
/// averaged line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    /// `Alpha: .. Beta: .. FileSize: ..MB Average Throughput: .. Mbps`
    AverageTwoParam,
    /// Multi-line FlowMonitor block per flow (Flow ID, addresses, packet
    /// counters, duration, throughput).
    FlowDetail,
    /// As `AverageTwoParam` with a `Gamma:` field between Beta and FileSize.
    AverageThreeParam,
}

impl LogFormat {
    /// Resolve a format from its CLI / profile name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "average-two-param" => Some(Self::AverageTwoParam),
            "flow-detail" => Some(Self::FlowDetail),
            "average-three-param" => Some(Self::AverageThreeParam),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AverageTwoParam => "average-two-param",
            Self::FlowDetail => "flow-detail",
            Self::AverageThreeParam => "average-three-param",
        }
    }

    /// True for the formats that carry a `Gamma` tuning parameter.
    pub fn has_gamma(&self) -> bool {
        matches!(self, Self::AverageThreeParam)
    }

    /// True for the formats that carry the per-flow FlowMonitor fields.
    pub fn has_flow_stats(&self) -> bool {
        matches!(self, Self::FlowDetail)
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// TCP Vegas tuning parameters of one experiment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuningParams {
    pub alpha: u32,
    pub beta: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<u32>,
}

impl TuningParams {
    pub fn new(alpha: u32, beta: u32) -> Self {
        Self {
            alpha,
            beta,
            gamma: None,
        }
    }

    pub fn with_gamma(alpha: u32, beta: u32, gamma: u32) -> Self {
        Self {
            alpha,
            beta,
            gamma: Some(gamma),
        }
    }

    /// Chart category label, e.g. `Alpha 2, Beta 4` or `Alpha 2, Beta 4, Gamma 1`.
    pub fn label(&self) -> String {
        match self.gamma {
            Some(g) => format!("Alpha {}, Beta {}, Gamma {}", self.alpha, self.beta, g),
            None => format!("Alpha {}, Beta {}", self.alpha, self.beta),
        }
    }

    /// Summary-file form, e.g. `Alpha: 2, Beta: 4` or `Alpha: 2, Beta: 4, Gamma: 1`.
    pub fn describe(&self) -> String {
        match self.gamma {
            Some(g) => format!("Alpha: {}, Beta: {}, Gamma: {}", self.alpha, self.beta, g),
            None => format!("Alpha: {}, Beta: {}", self.alpha, self.beta),
        }
    }
}

/// FlowMonitor fields of one flow (`flow-detail` format only).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowStats {
    pub flow_id: u32,
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub duration_s: f64,
}

/// One parsed experiment record. Immutable once built; duplicates are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub params: TuningParams,
    pub file_size_mb: u32,
    pub throughput_mbps: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_round_trip() {
        for format in [
            LogFormat::AverageTwoParam,
            LogFormat::FlowDetail,
            LogFormat::AverageThreeParam,
        ] {
            assert_eq!(LogFormat::by_name(format.name()), Some(format));
        }
        assert_eq!(LogFormat::by_name("reno"), None);
    }

    #[test]
    fn labels_include_gamma_only_when_present() {
        assert_eq!(TuningParams::new(2, 4).label(), "Alpha 2, Beta 4");
        assert_eq!(
            TuningParams::with_gamma(2, 4, 1).label(),
            "Alpha 2, Beta 4, Gamma 1"
        );
        assert_eq!(
            TuningParams::with_gamma(2, 4, 1).describe(),
            "Alpha: 2, Beta: 4, Gamma: 1"
        );
    }
}
