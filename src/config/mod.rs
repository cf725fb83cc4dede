//! Configuration loading and management for the payroll engine.
//!
//! This module provides functionality to load the pay schedule from YAML
//! files: the per-category rate table and the leave policy.
//!
//! # Example
//!
//! ```no_run
//! use survey_payroll::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/standard").unwrap();
//! println!("Loaded schedule: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{LeavePolicy, PayrollConfig, PayrollMetadata, PayrollSettings, RateTable, RatesFile};
