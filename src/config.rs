//! Configuration
//!
//! Settings come from CLI flags, falling back to environment variables and
//! then to a `.env` file in the working directory.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use jiff::tz::TimeZone;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::warn;

use crate::money::{AmountError, currency_from_code};

/// Errors raised while resolving configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The currency code is not supported.
    #[error("Invalid currency: {0}")]
    Currency(#[from] AmountError),

    /// The time zone name is not known.
    #[error("Invalid time zone {name:?}: {source}")]
    TimeZone {
        /// Name that failed to resolve
        name: String,

        /// Underlying error
        #[source]
        source: jiff::Error,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Register settings shared by every command.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Directory holding the persisted register state
    #[arg(long, env = "TILL_DATA_DIR", default_value = ".till", global = true)]
    pub data_dir: PathBuf,

    /// ISO currency code prices are kept in
    #[arg(long, env = "TILL_CURRENCY", default_value = "INR", global = true)]
    pub currency: String,

    /// IANA time zone used for dates; defaults to the system zone
    #[arg(long, env = "TZ", global = true)]
    pub time_zone: Option<String>,

    /// Simulated payment processing delay, in milliseconds
    #[arg(long, env = "TILL_CHECKOUT_DELAY_MS", default_value_t = 0, global = true)]
    pub checkout_delay_ms: u64,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Resolve the configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Currency`] if the code is not supported.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        Ok(currency_from_code(&self.currency)?)
    }

    /// Resolve the configured time zone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TimeZone`] if the name is not in the time zone database.
    pub fn time_zone(&self) -> Result<TimeZone, ConfigError> {
        let Some(name) = self.time_zone.as_deref().map(str::trim) else {
            return Ok(TimeZone::system());
        };

        if name.is_empty() {
            return Ok(TimeZone::system());
        }

        // POSIX `TZ` values such as `:/etc/localtime` name a file, not a zone
        if name.starts_with(':') {
            warn!(time_zone = name, "not an IANA time zone name, using the system zone");

            return Ok(TimeZone::system());
        }

        TimeZone::get(name).map_err(|source| ConfigError::TimeZone {
            name: name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn flags_override_defaults() -> TestResult {
        let cli = TestCli::try_parse_from([
            "till",
            "--data-dir",
            "/tmp/shop",
            "--currency",
            "gbp",
            "--time-zone",
            "UTC",
            "--log-format",
            "json",
            "--checkout-delay-ms",
            "250",
        ])?;

        assert_eq!(cli.config.data_dir, PathBuf::from("/tmp/shop"));
        assert_eq!(cli.config.currency()?, iso::GBP);
        assert_eq!(cli.config.time_zone()?.iana_name(), Some("UTC"));
        assert_eq!(cli.config.logging.log_format, LogFormat::Json);
        assert_eq!(cli.config.checkout_delay_ms, 250);

        Ok(())
    }

    #[test]
    fn unknown_currency_is_rejected() -> TestResult {
        let cli = TestCli::try_parse_from(["till", "--currency", "XYZ"])?;

        assert!(matches!(cli.config.currency(), Err(ConfigError::Currency(_))));

        Ok(())
    }

    #[test]
    fn posix_tz_path_falls_back_to_system_zone() -> TestResult {
        let cli = TestCli::try_parse_from(["till", "--time-zone", ":/etc/localtime"])?;

        assert_eq!(cli.config.time_zone()?, TimeZone::system());

        Ok(())
    }

    #[test]
    fn unknown_time_zone_is_rejected() -> TestResult {
        let cli = TestCli::try_parse_from(["till", "--time-zone", "Mars/Olympus_Mons"])?;

        assert!(matches!(
            cli.config.time_zone(),
            Err(ConfigError::TimeZone { .. })
        ));

        Ok(())
    }
}
