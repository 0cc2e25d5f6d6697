//! Configuration validation

use super::{Config, PolicyKind};
use std::net::{Ipv4Addr, SocketAddr};

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn print_diagnostics(&self) {
        for warning in &self.warnings {
            println!("[WARN] {}", warning);
        }
        for error in &self.errors {
            println!("[ERROR] {}", error);
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate configuration and return warnings/errors
pub fn validate(config: &Config) -> ValidationResult {
    let mut result = ValidationResult::new();

    validate_listen(config, &mut result);
    validate_firewall(config, &mut result);
    validate_log(config, &mut result);

    result
}

fn validate_listen(config: &Config, result: &mut ValidationResult) {
    if config.controller.listen.parse::<SocketAddr>().is_err() {
        result.error(format!(
            "controller.listen: '{}' is not a valid socket address",
            config.controller.listen
        ));
    }
}

fn validate_firewall(config: &Config, result: &mut ValidationResult) {
    // Entries must be plain dotted-quad addresses. CIDR ranges, hostnames
    // and octets with leading zeros are all rejected here rather than
    // surfacing as surprises at flow-install time.
    for (field, entries) in [
        ("blacklist", &config.firewall.blacklist),
        ("whitelist", &config.firewall.whitelist),
    ] {
        for (i, entry) in entries.iter().enumerate() {
            let addr = entry.trim();
            if addr.is_empty() {
                continue;
            }
            if addr.parse::<Ipv4Addr>().is_err() {
                result.error(format!(
                    "firewall.{}[{}]: invalid IPv4 address '{}'",
                    field, i, addr
                ));
            }
        }
    }

    match config.controller.policy {
        PolicyKind::Firewall => {
            if config.firewall.blacklist.is_empty() {
                result.warn("firewall.blacklist: empty, all traffic will be allowed");
            }
        }
        PolicyKind::Hub => {
            if !config.firewall.blacklist.is_empty() || !config.firewall.whitelist.is_empty() {
                result.warn("firewall: address lists are ignored while policy is 'hub'");
            }
        }
    }
}

fn validate_log(config: &Config, result: &mut ValidationResult) {
    let level = config.log.level.to_lowercase();
    if !["error", "warn", "info", "debug", "trace"].contains(&level.as_str()) {
        result.warn(format!(
            "log.level: unknown level '{}', falling back to 'info'",
            config.log.level
        ));
    }

    if !["pretty", "compact", "json"].contains(&config.log.format.as_str()) {
        result.warn(format!(
            "log.format: unknown format '{}', falling back to 'pretty'",
            config.log.format
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FirewallConfig;

    fn make_config() -> Config {
        let mut config = Config::default();
        config.controller.policy = PolicyKind::Firewall;
        config.firewall = FirewallConfig {
            blacklist: vec!["10.0.0.5".to_string()],
            whitelist: vec!["10.0.0.1".to_string()],
            idle_timeout: 0,
            hard_timeout: 0,
        };
        config
    }

    #[test]
    fn test_valid_config() {
        let result = validate(&make_config());
        assert!(!result.has_errors());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_listen_without_port() {
        let mut config = make_config();
        config.controller.listen = "0.0.0.0".to_string();

        let result = validate(&config);
        assert!(result.has_errors());
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("controller.listen")));
    }

    #[test]
    fn test_leading_zero_octet_rejected() {
        let mut config = make_config();
        config.firewall.blacklist.push("010.0.0.5".to_string()); // Not canonical

        let result = validate(&config);
        assert!(result.has_errors());
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("firewall.blacklist[1]") && e.contains("010.0.0.5")));
    }

    #[test]
    fn test_cidr_rejected() {
        let mut config = make_config();
        config.firewall.whitelist = vec!["10.0.0.0/24".to_string()];

        let result = validate(&config);
        assert!(result.has_errors());
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("firewall.whitelist[0]")));
    }

    #[test]
    fn test_blank_entries_skipped() {
        let mut config = make_config();
        config.firewall.blacklist.push("  ".to_string());

        let result = validate(&config);
        assert!(!result.has_errors());
    }

    #[test]
    fn test_empty_blacklist_warns() {
        let mut config = make_config();
        config.firewall.blacklist.clear();
        config.firewall.whitelist.clear();

        let result = validate(&config);
        assert!(!result.has_errors());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("all traffic will be allowed")));
    }

    #[test]
    fn test_hub_ignores_address_lists() {
        let mut config = make_config();
        config.controller.policy = PolicyKind::Hub;

        let result = validate(&config);
        assert!(!result.has_errors());
        assert!(result.warnings.iter().any(|w| w.contains("ignored")));
    }

    #[test]
    fn test_unknown_log_level_warns() {
        let mut config = make_config();
        config.log.level = "verbose".to_string();

        let result = validate(&config);
        assert!(!result.has_errors());
        assert!(result.warnings.iter().any(|w| w.contains("log.level")));
    }
}
