use serde::{Deserialize, Serialize};
use std::fmt;

/// The semantic role a series plays in the performance pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesRole {
    /// The fund's own periodic returns.
    Returns,
    /// The risk-free rate used as the Sharpe/Sortino hurdle.
    RiskFree,
    /// The benchmark the fund is correlated against.
    Benchmark,
}

impl SeriesRole {
    pub const ALL: [SeriesRole; 3] = [
        SeriesRole::Returns,
        SeriesRole::RiskFree,
        SeriesRole::Benchmark,
    ];

    /// The unit a source for this role is assumed to carry when configuration is silent.
    pub fn default_unit(&self) -> ValueUnit {
        match self {
            SeriesRole::RiskFree => ValueUnit::Percent,
            SeriesRole::Returns | SeriesRole::Benchmark => ValueUnit::Fraction,
        }
    }
}

impl fmt::Display for SeriesRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeriesRole::Returns => "returns",
            SeriesRole::RiskFree => "risk_free",
            SeriesRole::Benchmark => "benchmark",
        };
        f.write_str(name)
    }
}

/// The unit of the value column of a source file.
///
/// Every value is normalized to a fraction exactly once, at ingestion, so that the
/// aggregator can always compound with `(1 + v)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueUnit {
    /// `0.01` means 1%.
    Fraction,
    /// `1.0` means 1%.
    Percent,
    /// `100.0` means 1%.
    BasisPoints,
}

impl ValueUnit {
    /// Converts a raw value in this unit into a fraction.
    pub fn to_fraction(&self, raw: f64) -> f64 {
        match self {
            ValueUnit::Fraction => raw,
            ValueUnit::Percent => raw / 100.0,
            ValueUnit::BasisPoints => raw / 10_000.0,
        }
    }
}

/// Where the values of a `Series` came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "locator", rename_all = "snake_case")]
pub enum SeriesOrigin {
    /// Parsed from a real source, identified by its locator.
    Source(String),
    /// The built-in example dataset, substituted because every source failed.
    Placeholder,
}
