use crate::error::ConfigError;
use core_types::{SeriesRole, ValueUnit};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub sources: Sources,
    pub loader: LoaderSettings,
    pub metrics: MetricsSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Rejects values that would make the pipeline misbehave rather than degrade.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let confidence = self.metrics.var_confidence;
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "metrics.var_confidence must be strictly between 0 and 1, got {confidence}"
            )));
        }
        if self.loader.fetch_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "loader.fetch_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.server.refresh_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "server.refresh_interval_secs must be greater than 0".to_string(),
            ));
        }
        for role in SeriesRole::ALL {
            if self.sources.for_role(role).candidates.iter().any(|c| c.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "sources.{role}.candidates contains an empty locator"
                )));
            }
        }
        Ok(())
    }
}

/// The candidate sources for each logical series.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Sources {
    pub returns: SourceSet,
    pub risk_free: SourceSet,
    pub benchmark: SourceSet,
}

impl Sources {
    pub fn for_role(&self, role: SeriesRole) -> &SourceSet {
        match role {
            SeriesRole::Returns => &self.returns,
            SeriesRole::RiskFree => &self.risk_free,
            SeriesRole::Benchmark => &self.benchmark,
        }
    }
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            returns: SourceSet::single("public/Returns.csv"),
            risk_free: SourceSet::single("public/RF.csv"),
            benchmark: SourceSet::single("public/SP500.csv"),
        }
    }
}

/// An ordered list of locators tried one after another, plus the unit of their values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceSet {
    /// URLs (`http://`, `https://`), `file://` locators or plain paths, in priority order.
    pub candidates: Vec<String>,
    /// Unit of the value column. When absent, the role's conventional unit applies.
    pub unit: Option<ValueUnit>,
}

impl SourceSet {
    pub fn single(locator: impl Into<String>) -> Self {
        Self {
            candidates: vec![locator.into()],
            unit: None,
        }
    }

    pub fn unit_for(&self, role: SeriesRole) -> ValueUnit {
        self.unit.unwrap_or_else(|| role.default_unit())
    }
}

/// Parameters for fetching candidate sources.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Deadline for a single candidate fetch, in milliseconds.
    pub fetch_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 5_000,
            user_agent: concat!("fundstats/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Parameters for the metrics engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsSettings {
    /// Confidence level of the historical VaR (0.95 reads the 5th percentile).
    pub var_confidence: f64,
    /// Pair unmatched months with the benchmark by position. Approximate; off by default.
    pub allow_positional_correlation: bool,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            var_confidence: 0.95,
            allow_positional_correlation: false,
        }
    }
}

/// Parameters for the HTTP service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Newline-delimited allow-list of e-mail addresses.
    pub allowlist_path: PathBuf,
    /// Seconds between two refreshes of the performance report.
    pub refresh_interval_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            allowlist_path: PathBuf::from("public/emails.csv"),
            refresh_interval_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive, used when `RUST_LOG` is not set.
    pub level: String,
    pub format: LogFormat,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            directory: None,
        }
    }
}
