pub mod aggregation;
pub mod config;
pub mod cross_filter;
pub mod dashboard;
pub mod fetch_cache;
pub mod models;
pub mod normalizer;
pub mod registry;
pub mod report;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, RegistryConfig};
use crate::models::{FilterSet, FilterValue};
use crate::registry::{CachedRegistry, RegistryError};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Output {
    /// Compact statistics payload.
    Aggregated,
    /// Normalized dataset, after `--filter`.
    Dataset,
    /// Both, with fetch time and data source.
    Report,
}

#[derive(Parser, Debug)]
#[command(name = "cohortscope", version)]
#[command(about = "Fetch clinical registry records and print cohort aggregates as JSON")]
pub struct Cli {
    /// What to analyse, e.g. "patient demographics" or "common vitals".
    /// Decides which resource kinds are fetched.
    #[arg(required = true)]
    pub query: Vec<String>,

    #[arg(long, value_enum, default_value_t = Output::Aggregated)]
    pub output: Output,

    /// Narrow the dataset, `field=value`. Repeat for more values or fields.
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() && !value.trim().is_empty() => {
            Ok((field.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected field=value, got {raw:?}")),
    }
}

impl Cli {
    pub fn filter_set(&self) -> FilterSet {
        let mut set = FilterSet::new();
        for (field, value) in &self.filters {
            set.push_unique(field, FilterValue::text(value.as_str()));
        }
        set
    }
}

/// Install the global tracing subscriber, writing to stderr.
/// `RUST_LOG` wins over the built-in default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run(cli: Cli) -> Result<(), RunError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = RegistryConfig::from_env()?;
    tracing::info!(
        base_url = %config.base_url,
        cache_ttl_minutes = config.cache_ttl_minutes,
        "Registry configured"
    );
    let registry = CachedRegistry::new(config)?;

    let query = cli.query.join(" ");
    let data = report::load_report_data(&registry, &query, None, false).await;

    let json = match cli.output {
        Output::Aggregated => serde_json::to_string_pretty(&data.aggregated)?,
        Output::Dataset => {
            let filtered = dashboard::apply_filters(&data.source_data, &cli.filter_set());
            serde_json::to_string_pretty(&filtered)?
        }
        Output::Report => serde_json::to_string_pretty(&data)?,
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_query_and_filters() {
        let cli = Cli::try_parse_from([
            "cohortscope",
            "--output",
            "dataset",
            "--filter",
            "gender=female",
            "--filter",
            "gender=male",
            "patient",
            "overview",
        ])
        .unwrap();

        assert_eq!(cli.query, vec!["patient", "overview"]);
        assert_eq!(cli.output, Output::Dataset);
        assert_eq!(cli.filter_set().get("gender").len(), 2);
    }

    #[test]
    fn malformed_filter_is_rejected() {
        assert!(Cli::try_parse_from(["cohortscope", "--filter", "gender", "q"]).is_err());
        assert!(parse_filter("=x").is_err());
        assert_eq!(parse_filter(" age = 42 ").unwrap(), ("age".into(), "42".into()));
    }

    #[test]
    fn query_is_required() {
        assert!(Cli::try_parse_from(["cohortscope"]).is_err());
    }
}
