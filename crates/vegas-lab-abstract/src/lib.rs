pub mod config;
pub mod record;

pub use config::{AnalysisConfig, ProfileOverride};
pub use record::{FlowStats, LogFormat, Record, TuningParams};
