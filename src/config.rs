use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_ENV: &str = "COVID_DASH_CONFIG";

/// Server and data-source settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
    /// Path or URL of the time-series table.
    pub historical_source: String,
    /// Path or URL of the latest-snapshot table.
    pub latest_source: String,
    /// Directory served under `/assets`.
    pub assets_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            host: "0.0.0.0".to_string(),
            port: 1050,
            historical_source: "data/owid-covid-data.csv".to_string(),
            latest_source: "data/owid-covid-latest.csv".to_string(),
            assets_dir: PathBuf::from("assets"),
        }
    }
}

impl DashboardConfig {
    /// Defaults, then the TOML file named by `COVID_DASH_CONFIG`, then
    /// `COVID_DASH_*` variables.
    pub fn load() -> Result<Self> {
        let base = match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {path}"))?;
                Self::from_toml(&text).with_context(|| format!("parsing config file {path}"))?
            }
            Err(_) => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `COVID_DASH_*` overrides looked up through `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(host) = lookup("COVID_DASH_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("COVID_DASH_PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("COVID_DASH_PORT={port} is not a port number"))?;
        }
        if let Some(source) = lookup("COVID_DASH_HISTORICAL") {
            self.historical_source = source;
        }
        if let Some(source) = lookup("COVID_DASH_LATEST") {
            self.latest_source = source;
        }
        if let Some(dir) = lookup("COVID_DASH_ASSETS") {
            self.assets_dir = PathBuf::from(dir);
        }
        Ok(self)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("host '{}' is not an IP address", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn toml_fills_in_missing_fields_from_defaults() {
        let cfg = DashboardConfig::from_toml("port = 8050\nlatest_source = \"latest.json\"\n").unwrap();
        assert_eq!(cfg.port, 8050);
        assert_eq!(cfg.latest_source, "latest.json");
        assert_eq!(cfg.host, "0.0.0.0");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(DashboardConfig::from_toml("debug = true\n").is_err());
    }

    #[test]
    fn environment_overrides_win() {
        let env: HashMap<&str, &str> = [("COVID_DASH_PORT", "9000"), ("COVID_DASH_HOST", "127.0.0.1")]
            .into_iter()
            .collect();
        let cfg = DashboardConfig::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(cfg.socket_addr().unwrap(), "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn bad_port_is_an_error() {
        let result = DashboardConfig::default()
            .with_overrides(|k| (k == "COVID_DASH_PORT").then(|| "http".to_string()));
        assert!(result.is_err());
    }
}
