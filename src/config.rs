//! Relay configuration
//!
//! Settings come from command-line flags, the environment (a `.env` file is
//! loaded by `main` before parsing) or the `[default]` section of an INI file,
//! in that order of precedence. The result is an immutable [`RelayConfig`]
//! built once at startup.

use clap::Parser;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::broker::Credentials;
use crate::robinhood::DEFAULT_BASE_URL;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Args {
    /// Robinhood username (shown on the page as the user email)
    #[arg(long, env = "ROBINHOOD_USERNAME")]
    pub username: Option<String>,

    /// Robinhood password
    #[arg(long, env = "ROBINHOOD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// One-time MFA code for login
    #[arg(long, env = "MFA_CODE", hide_env_values = true)]
    pub mfa_code: Option<String>,

    /// Master trade-signal endpoint
    #[arg(long, env = "MASTER_TRADE_SIGNAL_URL")]
    pub master_url: Option<String>,

    /// Token sent to the master service
    #[arg(long, env = "USER_TOKEN", hide_env_values = true)]
    pub user_token: Option<String>,

    /// Symbol to request signals for
    #[arg(long, env = "SYMBOL")]
    pub symbol: Option<String>,

    /// Run one trade at startup (true/false)
    #[arg(long, env = "AUTO_TRADE")]
    pub auto_trade: Option<String>,

    /// Robinhood API base URL
    #[arg(long, env = "ROBINHOOD_API_URL")]
    pub robinhood_api_url: Option<String>,

    /// Interface to bind the web server on
    #[arg(long, env = "RELAY_HOST")]
    pub host: Option<String>,

    /// Port to run the web server on
    #[arg(short, long, env = "RELAY_PORT")]
    pub port: Option<u16>,

    /// INI file with a [default] section
    #[arg(short, long, env = "RELAY_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("{path}:{line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },
}

/// Keys of the `[default]` section of an INI file, lowercased
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IniSection {
    values: HashMap<String, String>,
}

impl IniSection {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text).map_err(|(line, message)| ConfigError::Parse {
            path: path.display().to_string(),
            line,
            message,
        })
    }

    /// Parse INI text, keeping only the `[default]` section.
    ///
    /// Errors carry the 1-based line number.
    pub fn parse(text: &str) -> Result<Self, (usize, String)> {
        let mut values = HashMap::new();
        let mut section: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| (idx + 1, format!("unterminated section header {:?}", line)))?;
                section = Some(name.trim().to_lowercase());
                continue;
            }

            let Some(current) = section.as_deref() else {
                return Err((idx + 1, "key outside of any section".to_string()));
            };

            let split = line
                .find(|c: char| c == '=' || c == ':')
                .ok_or_else(|| (idx + 1, format!("expected key = value, got {:?}", line)))?;
            let (key, value) = (line[..split].trim(), line[split + 1..].trim());
            if key.is_empty() {
                return Err((idx + 1, "empty key".to_string()));
            }

            if current == "default" {
                values.insert(key.to_lowercase(), value.to_string());
            }
        }

        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_lowercase()).map(String::as_str)
    }
}

/// Immutable process-wide settings
#[derive(Clone)]
pub struct RelayConfig {
    pub credentials: Credentials,
    pub master_url: String,
    pub user_token: String,
    pub symbol: String,
    pub auto_trade: bool,
    pub robinhood_api_url: String,
    pub host: String,
    pub port: u16,
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("credentials", &self.credentials)
            .field("master_url", &self.master_url)
            .field("user_token", &"***")
            .field("symbol", &self.symbol)
            .field("auto_trade", &self.auto_trade)
            .field("robinhood_api_url", &self.robinhood_api_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Flag/env value first, then the INI value; blank values count as unset
fn pick(flag: Option<String>, ini: &IniSection, key: &str) -> Option<String> {
    let non_blank = |v: &str| Some(v.trim().to_string()).filter(|v| !v.is_empty());
    flag.as_deref()
        .and_then(non_blank)
        .or_else(|| ini.get(key).and_then(non_blank))
}

fn require(
    flag: Option<String>,
    ini: &IniSection,
    key: &'static str,
) -> Result<String, ConfigError> {
    pick(flag, ini, key).ok_or(ConfigError::Missing(key))
}

/// Only `true` (any case) turns a flag on; anything else leaves it off
pub fn parse_flag(key: &str, value: &str) -> bool {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        return true;
    }
    if !value.eq_ignore_ascii_case("false") {
        warn!("{} has unrecognized value {:?}, treating it as false", key, value);
    }
    false
}

fn require_http_url(key: &'static str, value: String) -> Result<String, ConfigError> {
    match reqwest::Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(value),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}

impl RelayConfig {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let ini = match args.config.as_deref() {
            Some(path) => IniSection::load(path)?,
            None => IniSection::default(),
        };
        Self::resolve(args, &ini)
    }

    pub fn resolve(args: Args, ini: &IniSection) -> Result<Self, ConfigError> {
        let credentials = Credentials {
            username: require(args.username, ini, "ROBINHOOD_USERNAME")?,
            password: require(args.password, ini, "ROBINHOOD_PASSWORD")?,
            mfa_code: pick(args.mfa_code, ini, "MFA_CODE"),
        };

        let master_url = require_http_url(
            "MASTER_TRADE_SIGNAL_URL",
            require(args.master_url, ini, "MASTER_TRADE_SIGNAL_URL")?,
        )?;
        let robinhood_api_url = require_http_url(
            "ROBINHOOD_API_URL",
            pick(args.robinhood_api_url, ini, "ROBINHOOD_API_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        )?;

        let auto_trade = pick(args.auto_trade, ini, "AUTO_TRADE")
            .map(|v| parse_flag("AUTO_TRADE", &v))
            .unwrap_or(false);

        let port = match args.port {
            Some(port) => port,
            None => match ini.get("RELAY_PORT") {
                Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                    key: "RELAY_PORT",
                    value: v.to_string(),
                })?,
                None => DEFAULT_PORT,
            },
        };

        Ok(Self {
            credentials,
            master_url,
            user_token: require(args.user_token, ini, "USER_TOKEN")?,
            symbol: require(args.symbol, ini, "SYMBOL")?,
            auto_trade,
            robinhood_api_url,
            host: pick(args.host, ini, "RELAY_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }
}
