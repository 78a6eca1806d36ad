//! Shared foundation of the faultline crates.
//!
//! [`FaultlineError`] is the error type every library crate returns, and
//! [`FaultlineConfig`] is what `.faultline.toml` deserializes into. The
//! [`RunReport`] wrapper carries a run's output together with the items it
//! had to leave out.

mod config;
mod error;
mod types;

pub use config::{FaultlineConfig, FilterConfig, HistoryConfig, LinkerConfig};
pub use error::FaultlineError;
pub use types::{OutputFormat, RunReport, Skipped};

/// Result alias over [`FaultlineError`].
pub type Result<T> = std::result::Result<T, FaultlineError>;
