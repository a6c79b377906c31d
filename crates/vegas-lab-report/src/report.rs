use crate::summary::BestWorst;
use serde::Serialize;
use vegas_lab_abstract::AnalysisConfig;

/// Serializable snapshot of a finished analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport<'a> {
    pub config: &'a AnalysisConfig,
    pub record_count: usize,
    pub file_sizes: Vec<u32>,
    pub best_worst: &'a [BestWorst],
}
