pub mod config;
pub mod error;
pub mod llm;
pub mod probe;
pub mod report;

// Re-export commonly used types
pub use config::ProbeConfig;
pub use error::ProbeError;
pub use llm::ProbeClient;
pub use probe::{ModelListing, ProbeOutcome, Prober};
pub use report::ProbeReport;
