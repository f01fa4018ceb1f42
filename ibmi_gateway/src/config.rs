//! Gateway connection configuration.
//!
//! Settings come from `IBMI_*` environment variables (a `.env` file is
//! loaded by the binary before anything reads them). The loaded value is
//! passed explicitly into the bridge; nothing below this module reads
//! ambient process state.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::env::Environment;
use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Authentication-phase bound. Old IBM i SSH servers negotiate slowly
/// and a busy LPAR can sit on the auth exchange for minutes, so this is
/// deliberately much longer than the TCP connect timeout.
pub const AUTH_TIMEOUT_SECS: u64 = 200;

/// Connection settings for the remote system.
#[derive(Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    pub connect_timeout: Duration,
}

// Manual Debug keeps the password out of logs.
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl GatewayConfig {
    /// Load connection settings from the environment.
    ///
    /// # Errors
    /// Returns `Error::Config` when a required variable is missing or a
    /// numeric variable does not parse.
    pub fn from_env(env: &dyn Environment) -> Result<Self> {
        let host = required(env, "IBMI_HOST")?;
        let user = required(env, "IBMI_USER")?;
        let password = required(env, "IBMI_PASS")?;
        let port: u16 = parsed(env, "IBMI_PORT", DEFAULT_PORT)?;
        let timeout_secs: u64 = parsed(env, "IBMI_SSH_TIMEOUT", DEFAULT_CONNECT_TIMEOUT_SECS)?;

        let config = Self {
            host,
            user,
            password,
            port,
            connect_timeout: Duration::from_secs(timeout_secs),
        };
        debug!(host = %config.host, port = config.port, "gateway configuration loaded");
        Ok(config)
    }
}

fn required(env: &dyn Environment, key: &str) -> Result<String> {
    env.var(key).filter(|v| !v.is_empty()).ok_or_else(|| {
        Error::Config(format!(
            "missing required variable {key}; set IBMI_HOST, IBMI_USER and IBMI_PASS"
        ))
    })
}

fn parsed<T: FromStr>(env: &dyn Environment, key: &str, default: T) -> Result<T> {
    match env.var(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{key} must be numeric, got {raw:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::{GatewayConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_PORT};
    use crate::env::MockEnvironment;
    use crate::error::Error;
    use rstest::rstest;
    use std::time::Duration;

    fn full_env() -> MockEnvironment {
        MockEnvironment::default()
            .with_var("IBMI_HOST", "as400.example.com")
            .with_var("IBMI_USER", "QPGMR")
            .with_var("IBMI_PASS", "secret")
    }

    #[test]
    fn loads_with_defaults() {
        let config = GatewayConfig::from_env(&full_env()).unwrap();
        assert_eq!(config.host, "as400.example.com");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(
            config.connect_timeout,
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn explicit_port_and_timeout_win() {
        let env = full_env()
            .with_var("IBMI_PORT", "2222")
            .with_var("IBMI_SSH_TIMEOUT", "5");
        let config = GatewayConfig::from_env(&env).unwrap();
        assert_eq!(config.port, 2222);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[rstest]
    #[case("IBMI_HOST")]
    #[case("IBMI_USER")]
    #[case("IBMI_PASS")]
    fn missing_required_variable_is_a_config_error(#[case] key: &str) {
        let mut env = full_env();
        env.env_vars.remove(key);
        let err = GatewayConfig::from_env(&env).unwrap_err();
        match err {
            Error::Config(message) => assert!(message.contains(key), "{message}"),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn empty_password_counts_as_missing() {
        let env = full_env().with_var("IBMI_PASS", "");
        assert!(matches!(
            GatewayConfig::from_env(&env),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn non_numeric_port_is_a_config_error() {
        let env = full_env().with_var("IBMI_PORT", "twenty-two");
        assert!(matches!(
            GatewayConfig::from_env(&env),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = GatewayConfig::from_env(&full_env()).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
