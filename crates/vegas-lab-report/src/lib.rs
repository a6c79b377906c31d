pub mod charts;
pub mod report;
pub mod summary;

pub use report::AnalysisReport;
pub use summary::{BestWorst, Extreme, SummaryError};
