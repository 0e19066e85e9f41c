//! # Logging
//!
//! CUPS reads a filter's stderr line by line and acts on the prefix:
//!
//! | Prefix | Meaning |
//! |--------|---------|
//! | `ERROR:` | Shown to the user, job marked as failed on exit |
//! | `WARNING:` | Shown to the user |
//! | `INFO:` | Printer state message |
//! | `DEBUG:` | Written to the error log at `LogLevel debug` |
//! | `PAGE:` | Page accounting (`PAGE: page copies`) |
//!
//! Records are sent through the `log` facade; `PAGE:` lines use the
//! [`PAGE_TARGET`] target.

use std::io::Write;

use env_logger::{Builder, Env, Target};
use log::{Level, LevelFilter};

/// Log target for page accounting records.
pub const PAGE_TARGET: &str = "page";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "TECRASTER_LOG";

/// CUPS prefix of a record.
pub fn cups_prefix(level: Level, target: &str) -> &'static str {
    if target == PAGE_TARGET {
        return "PAGE";
    }
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug | Level::Trace => "DEBUG",
    }
}

/// Logger configured from `env`, with CUPS prefixes on stderr.
///
/// `PAGE:` records pass whatever level the filter asks for; CUPS counts
/// pages from them.
pub fn builder(env: Env<'_>) -> Builder {
    let mut builder = Builder::from_env(env);
    builder
        .filter(Some(PAGE_TARGET), LevelFilter::Info)
        .format(|buf, record| {
            writeln!(
                buf,
                "{}: {}",
                cups_prefix(record.level(), record.target()),
                record.args()
            )
        })
        .target(Target::Stderr);
    builder
}

/// Install the stderr logger. `verbose` lowers the default filter to
/// `debug`; [`LOG_ENV`] still takes precedence.
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };

    let result = builder(Env::new().filter_or(LOG_ENV, default_filter)).try_init();

    if let Err(e) = result {
        eprintln!("DEBUG: Logger already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_prefixes() {
        assert_eq!(cups_prefix(Level::Error, "tecraster"), "ERROR");
        assert_eq!(cups_prefix(Level::Warn, "tecraster::session"), "WARNING");
        assert_eq!(cups_prefix(Level::Info, "tecraster"), "INFO");
        assert_eq!(cups_prefix(Level::Debug, "tecraster"), "DEBUG");
        assert_eq!(cups_prefix(Level::Trace, "tecraster"), "DEBUG");
    }

    #[test]
    fn test_page_target() {
        assert_eq!(cups_prefix(Level::Info, PAGE_TARGET), "PAGE");
    }

    #[test]
    fn test_page_records_pass_a_quiet_filter() {
        use log::{Log, Metadata};

        fn at(level: Level, target: &str) -> Metadata<'_> {
            Metadata::builder().level(level).target(target).build()
        }

        let logger = builder(Env::new().filter_or("TECRASTER_LOG_UNSET_FOR_TEST", "warn")).build();

        assert!(logger.enabled(&at(Level::Info, PAGE_TARGET)));
        assert!(!logger.enabled(&at(Level::Info, "tecraster::job")));
        assert!(logger.enabled(&at(Level::Warn, "tecraster::job")));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
        log::info!("logger ready");
    }
}
