use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Server settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Snapshot file for the file-backed store; `None` keeps rows in memory only.
    pub data_file: Option<PathBuf>,
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_file: None,
            cors: true,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let host = lookup("APP_HOST").unwrap_or(defaults.host);

        let port = match lookup("APP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .context("APP_PORT must be a valid u16")?,
            None => defaults.port,
        };

        let data_file = lookup("THINGBOOK_DATA_FILE")
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);

        let cors = match lookup("THINGBOOK_CORS") {
            Some(raw) => parse_flag(&raw).context("THINGBOOK_CORS must be true or false")?,
            None => defaults.cors,
        };

        Ok(Self {
            host,
            port,
            data_file,
            cors,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("unrecognized flag value '{other}'")),
    }
}

/// Client-side settings for remote field checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Quiet period after the last edit before a check is issued.
    pub debounce: Duration,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
        }
    }
}

impl ValidatorConfig {
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn reads_every_variable() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "9000"),
            ("THINGBOOK_DATA_FILE", "/var/lib/thingbook/things.json"),
            ("THINGBOOK_CORS", "off"),
        ]))
        .unwrap();

        assert_eq!(config.address(), "127.0.0.1:9000");
        assert_eq!(
            config.data_file,
            Some(PathBuf::from("/var/lib/thingbook/things.json"))
        );
        assert!(!config.cors);
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(ServerConfig::from_lookup(lookup(&[("APP_PORT", "eighty")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("THINGBOOK_CORS", "maybe")])).is_err());
    }
}
