//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::SurveyCategory;

use super::types::{LeavePolicy, PayrollConfig, PayrollMetadata, PayrollSettings, RateTable, RatesFile};

/// Loads and provides access to payroll configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to query rates and the leave policy.
///
/// # Directory Structure
///
/// ```text
/// config/standard/
/// ├── payroll.yaml   # Schedule metadata and leave policy
/// └── rates.yaml     # Per-unit rate for every survey category
/// ```
///
/// # Example
///
/// ```no_run
/// use survey_payroll::config::ConfigLoader;
/// use survey_payroll::models::SurveyCategory;
///
/// let loader = ConfigLoader::load("./config/standard").unwrap();
/// let rate = loader.get_rate(SurveyCategory::Yours).unwrap();
/// println!("Yours pays {} per survey", rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - A category has no rate, or a non-positive one
    /// - The leave deduction divisor is zero
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings_path = path.join("payroll.yaml");
        let settings = Self::load_yaml::<PayrollSettings>(&settings_path)?;

        let rates_path = path.join("rates.yaml");
        let rates_file = Self::load_yaml::<RatesFile>(&rates_path)?;
        let rates = RateTable::new(rates_file.rates)?;

        if settings.leave.deduction_divisor == 0 {
            return Err(EngineError::ConfigParseError {
                path: settings_path.display().to_string(),
                message: "leave.deduction_divisor must be greater than zero".to_string(),
            });
        }

        info!(
            schedule = %settings.payroll.name,
            version = %settings.payroll.version,
            "Loaded payroll configuration"
        );

        Ok(Self {
            config: PayrollConfig::new(settings.payroll, rates, settings.leave),
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: PayrollConfig) -> Self {
        Self { config }
    }

    /// The built-in standard schedule, without touching the filesystem.
    pub fn standard() -> Self {
        Self::from_config(PayrollConfig::standard())
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the schedule metadata.
    pub fn metadata(&self) -> &PayrollMetadata {
        self.config.metadata()
    }

    /// Returns the rate table.
    pub fn rates(&self) -> &RateTable {
        self.config.rates()
    }

    /// Returns the leave policy.
    pub fn leave_policy(&self) -> &LeavePolicy {
        self.config.leave()
    }

    /// Gets the per-unit rate for a category.
    pub fn get_rate(&self, category: SurveyCategory) -> EngineResult<Decimal> {
        self.config.rates().rate(category)
    }
}
