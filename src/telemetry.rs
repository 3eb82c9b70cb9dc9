use std::fmt;

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

#[derive(Debug)]
pub enum TelemetryError {
    Filter { directives: String, source: ParseError },
    Init(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Filter { directives, .. } => {
                write!(f, "invalid log filter directives '{directives}'")
            }
            TelemetryError::Init(err) => write!(f, "subscriber already installed: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Filter { source, .. } => Some(source),
            TelemetryError::Init(err) => Some(&**err),
        }
    }
}

/// Expand a bare level like `info` into directives scoped to this crate, so
/// dependency noise stays at the configured level while placement workflow
/// events log at least as verbosely. Full directive strings pass through.
fn filter_directives(log_level: &str) -> String {
    if log_level.contains(['=', ',']) {
        log_level.to_string()
    } else {
        format!("{log_level},placement_match={log_level},tower_http=warn")
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directives = filter_directives(&config.log_level);
            EnvFilter::try_new(&directives)
                .map_err(|source| TelemetryError::Filter { directives, source })?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::Init)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_levels_are_scoped_to_the_crate() {
        assert_eq!(
            filter_directives("debug"),
            "debug,placement_match=debug,tower_http=warn"
        );
    }

    #[test]
    fn directive_strings_pass_through_untouched() {
        assert_eq!(
            filter_directives("warn,placement_match=trace"),
            "warn,placement_match=trace"
        );
    }

    #[test]
    fn malformed_directives_are_rejected() {
        let directives = filter_directives("not==valid");
        assert!(EnvFilter::try_new(&directives).is_err());
    }
}
