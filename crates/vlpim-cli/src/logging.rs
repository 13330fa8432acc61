use anyhow::bail;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "vlpim=debug,info";

/// `--log-level` wins over `RUST_LOG`, which wins over the default filter.
pub fn init(level: Option<&str>) -> anyhow::Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::new(parse_level(level)?),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

pub fn parse_level(level: &str) -> anyhow::Result<&'static str> {
    Ok(match level.trim().to_ascii_uppercase().as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" | "WARN" => "warn",
        "ERROR" => "error",
        other => bail!("unknown log level '{other}' (expected DEBUG, INFO, WARNING or ERROR)"),
    })
}
