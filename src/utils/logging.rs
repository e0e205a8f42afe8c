//! Diagnostic logging through `tracing`, written to stderr.

use tracing_subscriber::EnvFilter;

/// Overrides the verbosity flags when set, e.g. `MOCKCHAT_LOG=mockchat=debug`
pub(crate) const LOG_ENV_VAR: &str = "MOCKCHAT_LOG";

pub(crate) fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "off",
        1 => "warn",
        2 => "info",
        _ => "debug",
    }
}

fn filter(verbose: u8) -> EnvFilter {
    match std::env::var(LOG_ENV_VAR) {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(&directives).unwrap_or_else(|err| {
                crate::warn!("ignoring invalid {}: {}", LOG_ENV_VAR, err);

                EnvFilter::new(level_for_verbosity(verbose))
            })
        }
        _ => EnvFilter::new(level_for_verbosity(verbose)),
    }
}

pub(crate) fn init_logging(verbose: u8) {
    let ansi = matches!(crate::color::color_mode(), crate::cli::ColorMode::On);

    let res = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter(verbose))
        .with_target(false)
        .with_ansi(ansi)
        .try_init();

    if let Err(err) = res {
        crate::warn!("failed to initialize logging: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for_verbosity(0), "off");
        assert_eq!(level_for_verbosity(1), "warn");
        assert_eq!(level_for_verbosity(2), "info");
        assert_eq!(level_for_verbosity(3), "debug");
        assert_eq!(level_for_verbosity(9), "debug");
    }
}
