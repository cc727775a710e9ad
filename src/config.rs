use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use log::LevelFilter;

use crate::optimizer::PackingConfig;
use crate::planner::{DEFAULT_MAX_PAYLOAD, DEFAULT_MAX_STACK_HEIGHT, MAX_BOX_TYPES, PlannerConfig};

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub planner: PlannerSettings,
    pub log_level: LevelFilter,
}

impl AppConfig {
    const LOG_LEVEL_VAR: &'static str = "PALLET_PLANNER_LOG_LEVEL";
    const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            planner: PlannerSettings::from_env(),
            log_level: env_string(Self::LOG_LEVEL_VAR)
                .and_then(|raw| parse_log_level(&raw, Self::LOG_LEVEL_VAR))
                .unwrap_or(Self::DEFAULT_LOG_LEVEL),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "PALLET_PLANNER_API_HOST";
    const PORT_VAR: &'static str = "PALLET_PLANNER_API_PORT";

    fn from_env() -> Self {
        let host_value =
            env_string(Self::HOST_VAR).unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, display_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                eprintln!(
                    "⚠️ Could not parse {} ('{}'): {}. Using {}.",
                    Self::HOST_VAR,
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = env_string(Self::PORT_VAR)
            .and_then(|raw| parse_port(&raw, Self::PORT_VAR))
            .unwrap_or(Self::DEFAULT_PORT);

        Self {
            bind_ip,
            display_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            display_host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
        }
    }
}

/// Planner defaults and packing tunables.
#[derive(Clone, Debug, Default)]
pub struct PlannerSettings {
    planner: PlannerConfig,
}

impl PlannerSettings {
    const STACK_HEIGHT_VAR: &'static str = "PALLET_PLANNER_DEFAULT_STACK_HEIGHT";
    const PAYLOAD_VAR: &'static str = "PALLET_PLANNER_DEFAULT_PAYLOAD";
    const SUPPORT_RATIO_VAR: &'static str = "PALLET_PLANNER_SUPPORT_RATIO";
    const COLLISION_TOLERANCE_VAR: &'static str = "PALLET_PLANNER_COLLISION_TOLERANCE";
    const SUPPORT_HEIGHT_TOLERANCE_VAR: &'static str = "PALLET_PLANNER_SUPPORT_HEIGHT_TOLERANCE";
    const MAX_BOX_TYPES_VAR: &'static str = "PALLET_PLANNER_MAX_BOX_TYPES";
    const PLACEMENT_BUDGET_VAR: &'static str = "PALLET_PLANNER_PLACEMENT_BUDGET";

    fn from_env() -> Self {
        let default_stack_height = load_f64_with_warning(
            Self::STACK_HEIGHT_VAR,
            DEFAULT_MAX_STACK_HEIGHT,
            |value| value > 0.0,
            "must be greater than 0",
            "Warning: Adjusted default stack height changes every plan without maxStackHeight",
        );

        let default_payload = load_f64_with_warning(
            Self::PAYLOAD_VAR,
            DEFAULT_MAX_PAYLOAD,
            |value| value > 0.0,
            "must be greater than 0",
            "Warning: Adjusted default payload changes every plan without maxPayload",
        );

        let min_support_ratio = load_f64_with_warning(
            Self::SUPPORT_RATIO_VAR,
            PackingConfig::DEFAULT_MIN_SUPPORT_RATIO,
            |value| (0.0..=1.0).contains(&value),
            "must be between 0 and 1",
            "Warning: Adjusted minimum support may lead to unstable stacks",
        );

        let collision_tolerance = load_f64_with_warning(
            Self::COLLISION_TOLERANCE_VAR,
            PackingConfig::DEFAULT_COLLISION_TOLERANCE,
            |value| value >= 0.0,
            "must not be negative",
            "Warning: Adjusted collision tolerance may let boxes overlap",
        );

        let support_height_tolerance = load_f64_with_warning(
            Self::SUPPORT_HEIGHT_TOLERANCE_VAR,
            PackingConfig::DEFAULT_SUPPORT_HEIGHT_TOLERANCE,
            |value| value > 0.0,
            "must be greater than 0",
            "Warning: Adjusted support tolerance may cause unexpected placements",
        );

        let max_box_types = load_usize(Self::MAX_BOX_TYPES_VAR, MAX_BOX_TYPES);
        let placement_budget = load_usize(
            Self::PLACEMENT_BUDGET_VAR,
            PackingConfig::DEFAULT_PLACEMENT_BUDGET,
        );

        let packing = PackingConfig::builder()
            .collision_tolerance(collision_tolerance)
            .min_support_ratio(min_support_ratio)
            .support_height_tolerance(support_height_tolerance)
            .placement_budget(placement_budget)
            .build();

        Self {
            planner: PlannerConfig {
                default_stack_height,
                default_payload,
                max_box_types,
                packing,
            },
        }
    }

    /// Returns the configured PlannerConfig.
    pub fn planner_config(&self) -> PlannerConfig {
        self.planner
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            eprintln!(
                "⚠️ Access to {} failed: {}. Using default value.",
                name, err
            );
            None
        }
    }
}

fn parse_port(raw: &str, var_name: &str) -> Option<u16> {
    match raw.trim().parse::<u16>() {
        Ok(0) => {
            eprintln!("⚠️ {} must not be 0. Using default value.", var_name);
            None
        }
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!(
                "⚠️ Could not parse {} ('{}'): {}. Using default value.",
                var_name, raw, err
            );
            None
        }
    }
}

fn parse_log_level(raw: &str, var_name: &str) -> Option<LevelFilter> {
    match raw.trim().parse::<LevelFilter>() {
        Ok(level) => Some(level),
        Err(err) => {
            eprintln!(
                "⚠️ Could not parse {} ('{}'): {}. Using default value.",
                var_name, raw, err
            );
            None
        }
    }
}

/// Parses a positive integer; zero and garbage fall back to the default.
fn parse_positive_usize(raw: &str, var_name: &str) -> Option<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) => {
            eprintln!(
                "⚠️ {} must be greater than 0. Using default value.",
                var_name
            );
            None
        }
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!(
                "⚠️ Could not parse {} ('{}') as integer: {}. Using default value.",
                var_name, raw, err
            );
            None
        }
    }
}

fn load_usize(var_name: &str, default: usize) -> usize {
    env_string(var_name)
        .and_then(|raw| parse_positive_usize(&raw, var_name))
        .unwrap_or(default)
}

fn load_f64_with_warning(
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    warning: &str,
) -> f64 {
    match env_string(var_name) {
        Some(raw) => parse_f64_with_warning(&raw, var_name, default, validator, invalid_hint, warning),
        None => default,
    }
}

fn parse_f64_with_warning(
    raw: &str,
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    warning: &str,
) -> f64 {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && validator(value) => {
            let tolerance = (default.abs().max(1.0)) * 1e-9;
            if (value - default).abs() > tolerance {
                println!("⚠️ {} ({} = {}).", warning, var_name, value);
            }
            value
        }
        Ok(_) => {
            eprintln!(
                "⚠️ {} contains invalid value '{}': {}. Using {}.",
                var_name, raw, invalid_hint, default
            );
            default
        }
        Err(err) => {
            eprintln!(
                "⚠️ Could not parse {} ('{}') as number: {}. Using {}.",
                var_name, raw, err, default
            );
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_values() {
        assert_eq!(parse_port("8080", "TEST_VAR"), Some(8080));
        assert_eq!(parse_port(" 3000 ", "TEST_VAR"), Some(3000));
        assert_eq!(parse_port("0", "TEST_VAR"), None);
        assert_eq!(parse_port("70000", "TEST_VAR"), None);
        assert_eq!(parse_port("http", "TEST_VAR"), None);
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("debug", "TEST_VAR"), Some(LevelFilter::Debug));
        assert_eq!(parse_log_level(" WARN ", "TEST_VAR"), Some(LevelFilter::Warn));
        assert_eq!(parse_log_level("off", "TEST_VAR"), Some(LevelFilter::Off));
        assert_eq!(parse_log_level("chatty", "TEST_VAR"), None);
    }

    #[test]
    fn test_parse_positive_usize() {
        assert_eq!(parse_positive_usize("5", "TEST_VAR"), Some(5));
        assert_eq!(parse_positive_usize("  50000 ", "TEST_VAR"), Some(50_000));
        assert_eq!(parse_positive_usize("0", "TEST_VAR"), None);
        assert_eq!(parse_positive_usize("-3", "TEST_VAR"), None);
        assert_eq!(parse_positive_usize("many", "TEST_VAR"), None);
    }

    #[test]
    fn test_parse_f64_accepts_valid_values() {
        let ratio = parse_f64_with_warning(
            "0.9",
            "TEST_VAR",
            0.8,
            |v| (0.0..=1.0).contains(&v),
            "must be between 0 and 1",
            "Warning",
        );
        assert_eq!(ratio, 0.9);
    }

    #[test]
    fn test_parse_f64_falls_back_on_invalid_values() {
        let check = |raw: &str| {
            parse_f64_with_warning(
                raw,
                "TEST_VAR",
                0.8,
                |v| (0.0..=1.0).contains(&v),
                "must be between 0 and 1",
                "Warning",
            )
        };
        assert_eq!(check("1.5"), 0.8);
        assert_eq!(check("-0.1"), 0.8);
        assert_eq!(check("NaN"), 0.8);
        assert_eq!(check("inf"), 0.8);
        assert_eq!(check("abc"), 0.8);
    }

    #[test]
    fn test_unset_variables_use_defaults() {
        // Randomized name so no real environment variable can interfere.
        let missing = "PALLET_PLANNER_TEST_UNSET_3F9A1C";
        assert_eq!(load_usize(missing, 7), 7);
        assert_eq!(
            load_f64_with_warning(missing, 1500.0, |v| v > 0.0, "", ""),
            1500.0
        );
    }

    #[test]
    fn test_default_settings_match_planner_defaults() {
        let settings = PlannerSettings::default();
        assert_eq!(settings.planner_config(), PlannerConfig::default());

        let api = ApiConfig::default();
        assert_eq!(api.port(), 8080);
        assert!(api.binds_to_all_interfaces());
        assert_eq!(api.socket_addr().to_string(), "0.0.0.0:8080");
    }
}
