pub mod config;
pub mod experiment;
pub mod fault;
pub mod frame;
pub mod metrics;
pub mod properties;
pub mod report;
pub mod runner;
pub mod scenario;

pub use config::{load_or_default, ExperimentConfig, CONFIG_ENV};
pub use experiment::ExperimentMode;
pub use fault::{div_by_zero, divide, Fault};
pub use frame::{Frame, StackSnapshot};
pub use metrics::TraceMetrics;
pub use properties::verify;
pub use report::{ensure_report_file, update_sections, ReportSection, DEFAULT_REPORT_TEMPLATE};
pub use runner::{Observation, Runner};
pub use scenario::{Expectation, Outcome, Scenario};
