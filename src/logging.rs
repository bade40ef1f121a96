//! Tracing subscriber setup for the binary.

pub const LOG_ENV_VAR: &str = "ALGOTRADER_LOG";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// `ALGOTRADER_LOG` when set, else the first of `cli_level` and
/// `config_level` that is present, else `info`.
pub fn resolve_filter(cli_level: Option<&str>, config_level: Option<&str>) -> String {
    std::env::var(LOG_ENV_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| cli_level.map(str::to_string))
        .or_else(|| config_level.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// Install a stderr fmt subscriber. Fails only on a malformed filter.
///
/// A second call in the same process (tests drive `cli::run` repeatedly) keeps
/// the subscriber already installed and returns `Ok`.
pub fn init_tracing(filter: &str) -> Result<(), String> {
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;

    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        tracing::debug!(error = %err, filter, "tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_beats_config_level() {
        if std::env::var(LOG_ENV_VAR).is_ok() {
            return;
        }
        assert_eq!(resolve_filter(Some("debug"), Some("warn")), "debug");
        assert_eq!(resolve_filter(None, Some("warn")), "warn");
        assert_eq!(resolve_filter(None, None), "info");
    }

    #[test]
    fn malformed_filter_is_rejected() {
        assert!(init_tracing("algotrader=notalevel").is_err());
    }

    #[test]
    fn repeated_init_is_harmless() {
        assert!(init_tracing("warn").is_ok());
        assert!(init_tracing("debug").is_ok());
    }
}
