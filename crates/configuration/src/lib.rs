use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;

// Re-export the core types to provide a clean public API.
pub use settings::{
    LogFormat, LoaderSettings, LoggingSettings, MetricsSettings, ServerSettings, Settings, SourceSet,
    Sources,
};
pub use telemetry::init_tracing;

/// Prefix of the environment variables that override file settings,
/// e.g. `FUNDSTATS__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "FUNDSTATS";

const LIST_KEYS: [&str; 3] = [
    "sources.returns.candidates",
    "sources.risk_free.candidates",
    "sources.benchmark.candidates",
];

/// Loads the application configuration.
///
/// Built-in defaults are overlaid by the TOML file (the given path, which must exist, or an
/// optional `config.toml` in the working directory) and then by `FUNDSTATS__*` environment
/// variables. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config").required(false),
    };
    build(file, environment())
}

fn environment() -> config::Environment {
    LIST_KEYS.iter().fold(
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .list_separator(",")
            .try_parsing(true),
        |env, key| env.with_list_parse_key(key),
    )
}

fn build<F>(file: F, env: config::Environment) -> Result<Settings, ConfigError>
where
    F: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(env)
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{SeriesRole, ValueUnit};
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_apply_when_nothing_is_configured() {
        let settings = build(
            config::File::with_name("does-not-exist").required(false),
            env_from(&[]),
        )
        .unwrap();

        assert_eq!(settings.server.port, 4000);
        assert_eq!(settings.metrics.var_confidence, 0.95);
        assert!(!settings.metrics.allow_positional_correlation);
        assert_eq!(settings.sources.returns.candidates, vec!["public/Returns.csv"]);
        assert_eq!(
            settings.sources.risk_free.unit_for(SeriesRole::RiskFree),
            ValueUnit::Percent
        );
    }

    #[test]
    fn file_values_override_defaults() {
        let file = toml_file(
            r#"
            [sources.benchmark]
            candidates = ["https://example.com/SP500.csv", "data/SP500.csv"]
            unit = "percent"

            [metrics]
            var_confidence = 0.99
            "#,
        );

        let settings = build(config::File::from(file.path()), env_from(&[])).unwrap();

        assert_eq!(settings.sources.benchmark.candidates.len(), 2);
        assert_eq!(
            settings.sources.benchmark.unit_for(SeriesRole::Benchmark),
            ValueUnit::Percent
        );
        assert_eq!(settings.metrics.var_confidence, 0.99);
        // Untouched sections keep their defaults.
        assert_eq!(settings.sources.returns.candidates, vec!["public/Returns.csv"]);
    }

    #[test]
    fn environment_overrides_file() {
        let file = toml_file("[server]\nport = 9000\n");
        let settings = build(
            config::File::from(file.path()),
            env_from(&[
                ("FUNDSTATS__SERVER__PORT", "9100"),
                ("FUNDSTATS__SOURCES__RETURNS__CANDIDATES", "a.csv,b.csv"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.sources.returns.candidates, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn validation_rejects_out_of_range_confidence() {
        let file = toml_file("[metrics]\nvar_confidence = 1.5\n");
        let err = build(config::File::from(file.path()), env_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn validation_rejects_zero_timeout() {
        let mut settings = Settings::default();
        settings.loader.fetch_timeout_ms = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }
}
