//! Environment-driven configuration.
//!
//! Settings live in process environment variables, optionally overlaid
//! with a dotenv file (`ENV_FILE`, default `./.env`). Values from the
//! file override already-set variables, so one file fully describes a
//! target device.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::debug;
use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

const DEFAULT_WS_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 300;
const DEFAULT_OUT_FILE: &str = "./mistgrep-report.txt";

/// Everything a run needs, resolved from the environment.
#[derive(Debug)]
pub struct Config {
    /// Cloud console or API host, e.g. `manage.mist.com`.
    pub host: String,

    /// API host derived from `host`.
    pub api_host: String,

    /// API token. Only ever displayed through [`Config::redacted_token`].
    pub token: SecretString,

    /// Site the device belongs to.
    pub site_id: String,

    /// Device whose shell gets driven.
    pub device_id: String,

    /// Substring handed to the remote `match` filter.
    pub log_match: String,

    /// Per-read timeout.
    pub read_timeout: Duration,

    /// Overall session deadline.
    pub session_timeout: Duration,

    /// Where the report lands.
    pub out_file: PathBuf,
}

impl Config {
    /// Resolve configuration from the environment.
    ///
    /// A missing dotenv file is fine; missing or empty required variables
    /// and unparseable numbers are not.
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_file = env::var("ENV_FILE").unwrap_or_else(|_| ".env".to_string());
        let env_path = expand_home(&env_file);
        if dotenvy::from_path_override(&env_path).is_ok() {
            debug!("loaded environment from {}", env_path.display());
        }

        let host = require("MIST_HOST")?;
        let api_host = derive_api_host(&host)?;
        let token = SecretString::from(first_token(&require("MIST_APITOKEN")?).to_owned());
        let site_id = require("MIST_SITE_ID")?;
        let device_id = require("MIST_DEVICE_ID")?;
        let log_match = require("LOG_MATCH")?;

        let read_timeout = Duration::from_secs(parse_secs("WS_TIMEOUT", DEFAULT_WS_TIMEOUT_SECS)?);
        let session_timeout = Duration::from_secs(parse_secs(
            "SESSION_TIMEOUT",
            DEFAULT_SESSION_TIMEOUT_SECS,
        )?);

        let out_file = env::var("OUT_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| expand_home(v.trim()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_FILE));

        Ok(Self {
            host,
            api_host,
            token,
            site_id,
            device_id,
            log_match,
            read_timeout,
            session_timeout,
            out_file,
        })
    }

    /// Token rendered as its first and last six characters.
    pub fn redacted_token(&self) -> String {
        redact(self.token.expose_secret())
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse_secs(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            value.trim().parse().map_err(|_| ConfigError::Invalid {
                name,
                value: value.clone(),
            })
        }
        _ => Ok(default),
    }
}

/// Accepts either flavor of Mist console host and yields the API host.
fn derive_api_host(host: &str) -> Result<String, ConfigError> {
    if host.starts_with("api.") {
        Ok(host.to_string())
    } else if let Some(rest) = host.strip_prefix("manage.") {
        Ok(format!("api.{rest}"))
    } else {
        Err(ConfigError::UnsupportedHost(host.to_string()))
    }
}

/// Mist tokens are sometimes pasted as `key,comment`; only the first
/// comma-separated field is the credential.
fn first_token(raw: &str) -> &str {
    raw.split(',').next().unwrap_or(raw).trim()
}

/// Expand a leading `~/` against the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// First and last six characters with the middle elided; anything short
/// enough that this would leak most of it is fully masked.
fn redact(token: &str) -> String {
    match (token.get(..6), token.get(token.len().saturating_sub(6)..)) {
        (Some(head), Some(tail)) if token.len() > 12 => format!("{head}...{tail}"),
        _ => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_api_host() {
        assert_eq!(derive_api_host("api.mist.com").unwrap(), "api.mist.com");
        assert_eq!(derive_api_host("manage.mist.com").unwrap(), "api.mist.com");
        assert_eq!(
            derive_api_host("manage.eu.mist.com").unwrap(),
            "api.eu.mist.com"
        );
        assert!(matches!(
            derive_api_host("portal.example.com"),
            Err(ConfigError::UnsupportedHost(_))
        ));
    }

    #[test]
    fn test_first_token_drops_comment_field() {
        assert_eq!(first_token("abcdef123456"), "abcdef123456");
        assert_eq!(first_token("abcdef123456,my laptop"), "abcdef123456");
        assert_eq!(first_token(" abc , x"), "abc");
    }

    #[test]
    fn test_redact_keeps_ends_only() {
        assert_eq!(redact("0123456789abcdefghij"), "012345...efghij");
        assert_eq!(redact("short"), "***");
        // Exactly twelve characters would echo the whole thing back
        assert_eq!(redact("exactly12chr"), "***");
        // Multibyte tokens that split mid-character fall back to the mask
        assert_eq!(redact("aééééééééé"), "***");
    }

    #[test]
    fn test_expand_home_passthrough() {
        assert_eq!(expand_home("./report.txt"), PathBuf::from("./report.txt"));
        assert_eq!(expand_home("/tmp/report.txt"), PathBuf::from("/tmp/report.txt"));
    }

    // Env-twiddling tests each own their variable names so they stay
    // independent under the parallel test runner.

    #[test]
    fn test_require_trims_and_rejects_blank() {
        unsafe { env::set_var("MISTGREP_TEST_REQUIRE_SET", "  value  ") };
        assert_eq!(require("MISTGREP_TEST_REQUIRE_SET").unwrap(), "value");

        unsafe { env::remove_var("MISTGREP_TEST_REQUIRE_UNSET") };
        assert!(matches!(
            require("MISTGREP_TEST_REQUIRE_UNSET"),
            Err(ConfigError::Missing("MISTGREP_TEST_REQUIRE_UNSET"))
        ));

        unsafe { env::set_var("MISTGREP_TEST_REQUIRE_BLANK", "   ") };
        assert!(matches!(
            require("MISTGREP_TEST_REQUIRE_BLANK"),
            Err(ConfigError::Missing(_))
        ));
    }

    #[test]
    fn test_parse_secs_defaults_and_rejects_garbage() {
        unsafe { env::remove_var("MISTGREP_TEST_SECS_UNSET") };
        assert_eq!(parse_secs("MISTGREP_TEST_SECS_UNSET", 30).unwrap(), 30);

        unsafe { env::set_var("MISTGREP_TEST_SECS_SET", " 45 ") };
        assert_eq!(parse_secs("MISTGREP_TEST_SECS_SET", 30).unwrap(), 45);

        unsafe { env::set_var("MISTGREP_TEST_SECS_BAD", "soon") };
        assert!(matches!(
            parse_secs("MISTGREP_TEST_SECS_BAD", 30),
            Err(ConfigError::Invalid {
                name: "MISTGREP_TEST_SECS_BAD",
                ..
            })
        ));
    }

    #[test]
    fn test_from_env_dotenv_overrides_process_vars() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join("device.env");
        std::fs::write(&env_path, "LOG_MATCH=from-file\nWS_TIMEOUT=7\n").unwrap();

        // The only test touching the real variable names
        unsafe {
            env::set_var("ENV_FILE", &env_path);
            env::set_var("MIST_HOST", "manage.mist.com");
            env::set_var("MIST_APITOKEN", "0123456789abcdefghij,laptop");
            env::set_var("MIST_SITE_ID", "site-1");
            env::set_var("MIST_DEVICE_ID", "dev-1");
            // The dotenv value must win over this one
            env::set_var("LOG_MATCH", "from-process");
            env::remove_var("SESSION_TIMEOUT");
            env::remove_var("OUT_FILE");
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.host, "manage.mist.com");
        assert_eq!(config.api_host, "api.mist.com");
        assert_eq!(config.site_id, "site-1");
        assert_eq!(config.device_id, "dev-1");
        assert_eq!(config.log_match, "from-file");
        assert_eq!(config.read_timeout, Duration::from_secs(7));
        assert_eq!(config.session_timeout, Duration::from_secs(300));
        assert_eq!(config.redacted_token(), "012345...efghij");
        assert_eq!(config.out_file, PathBuf::from(DEFAULT_OUT_FILE));
    }
}
