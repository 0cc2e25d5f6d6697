//! Configuration types

use crate::Error;
use serde::Deserialize;

/// User-defined configuration (config.toml)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub firewall: FirewallConfig,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    /// Listen address for switch connections
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Policy driving the switches
    #[serde(default)]
    pub policy: PolicyKind,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            policy: PolicyKind::default(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:6633".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Hub,
    Firewall,
}

impl std::str::FromStr for PolicyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hub" => Ok(PolicyKind::Hub),
            "firewall" => Ok(PolicyKind::Firewall),
            other => Err(Error::Config(format!("unknown policy '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FirewallConfig {
    /// Destination addresses to block
    #[serde(default)]
    pub blacklist: Vec<String>,
    /// Source addresses exempt from blocking
    #[serde(default)]
    pub whitelist: Vec<String>,
    /// Drop rule idle timeout in seconds (0 = permanent)
    #[serde(default)]
    pub idle_timeout: u16,
    /// Drop rule hard timeout in seconds (0 = permanent)
    #[serde(default)]
    pub hard_timeout: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.controller.listen, "0.0.0.0:6633");
        assert_eq!(config.controller.policy, PolicyKind::Hub);
        assert!(config.firewall.blacklist.is_empty());
        assert_eq!(config.firewall.idle_timeout, 0);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [controller]
            listen = "127.0.0.1:6653"
            policy = "firewall"

            [firewall]
            blacklist = ["10.0.0.5", "10.0.0.6"]
            whitelist = ["1.1.1.1"]
            idle_timeout = 30

            [log]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.controller.listen, "127.0.0.1:6653");
        assert_eq!(config.controller.policy, PolicyKind::Firewall);
        assert_eq!(config.firewall.blacklist, vec!["10.0.0.5", "10.0.0.6"]);
        assert_eq!(config.firewall.whitelist, vec!["1.1.1.1"]);
        assert_eq!(config.firewall.idle_timeout, 30);
        assert_eq!(config.firewall.hard_timeout, 0);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, "json");
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("hub".parse::<PolicyKind>().unwrap(), PolicyKind::Hub);
        assert_eq!(
            "Firewall".parse::<PolicyKind>().unwrap(),
            PolicyKind::Firewall
        );
        assert!("l2-learning".parse::<PolicyKind>().is_err());
    }
}
