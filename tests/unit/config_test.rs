//! Tests for configuration validation

use std::collections::HashMap;
use std::time::Duration;

use rate_gate::config::{
    ENV_CAPACITY, ENV_RETRY_INTERVAL_MS, ENV_WINDOW_MS, RegistryConfig, SchedulerConfig,
};
use rate_gate::core::RateLimits;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_scheduler_config_validation() {
    let valid = SchedulerConfig {
        capacity: 10,
        window_ms: 1000,
        retry_interval_ms: 10,
    };
    assert!(valid.validate().is_ok());
}

#[test]
fn test_scheduler_config_invalid_capacity() {
    let invalid = SchedulerConfig {
        capacity: 0,
        window_ms: 1000,
        retry_interval_ms: 10,
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_scheduler_config_invalid_window() {
    let invalid = SchedulerConfig {
        capacity: 10,
        window_ms: 0,
        retry_interval_ms: 10,
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_scheduler_config_invalid_retry_interval() {
    let invalid = SchedulerConfig {
        capacity: 10,
        window_ms: 1000,
        retry_interval_ms: 0,
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_scheduler_config_from_json_defaults() {
    let config = SchedulerConfig::from_json_str(r#"{ "capacity": 3 }"#).unwrap();
    assert_eq!(config, SchedulerConfig::new(3));
    assert_eq!(config.window(), Duration::from_millis(1000));
    assert_eq!(config.retry_interval(), Duration::from_millis(10));
}

#[test]
fn test_scheduler_config_from_json_rejects_zero() {
    let err = SchedulerConfig::from_json_str(r#"{ "capacity": 0 }"#).unwrap_err();
    assert!(err.contains("capacity"));
}

#[test]
fn test_scheduler_config_from_json_parse_error() {
    let err = SchedulerConfig::from_json_str("{ capacity: }").unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_scheduler_config_from_lookup() {
    let config = SchedulerConfig::from_lookup(lookup(&[
        (ENV_CAPACITY, "4"),
        (ENV_WINDOW_MS, " 250 "),
        (ENV_RETRY_INTERVAL_MS, "5"),
    ]))
    .unwrap();
    assert_eq!(config.capacity, 4);
    assert_eq!(config.window_ms, 250);
    assert_eq!(config.retry_interval_ms, 5);
}

#[test]
fn test_scheduler_config_from_lookup_requires_capacity() {
    let err = SchedulerConfig::from_lookup(lookup(&[(ENV_WINDOW_MS, "250")])).unwrap_err();
    assert!(err.contains(ENV_CAPACITY));
}

#[test]
fn test_scheduler_config_from_lookup_rejects_garbage() {
    let err = SchedulerConfig::from_lookup(lookup(&[(ENV_CAPACITY, "-1")])).unwrap_err();
    assert!(err.contains("non-negative integer"));
}

#[test]
fn test_rate_limits_from_config() {
    let config = SchedulerConfig {
        capacity: 2,
        window_ms: 500,
        retry_interval_ms: 20,
    };
    let limits = RateLimits::try_from(&config).unwrap();
    assert_eq!(limits.capacity(), 2);
    assert_eq!(limits.window(), Duration::from_millis(500));
    assert_eq!(limits.retry_interval(), Duration::from_millis(20));

    assert!(RateLimits::try_from(&SchedulerConfig::new(0)).is_err());
}

#[test]
fn test_registry_config_validation() {
    let mut schedulers = HashMap::new();
    schedulers.insert("search".to_string(), SchedulerConfig::new(5));

    let config = RegistryConfig { schedulers };
    assert!(config.validate().is_ok());
}

#[test]
fn test_registry_config_empty() {
    let config = RegistryConfig {
        schedulers: HashMap::new(),
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_registry_config_names_invalid_entry() {
    let mut schedulers = HashMap::new();
    schedulers.insert("billing".to_string(), SchedulerConfig::new(0));

    let err = RegistryConfig { schedulers }.validate().unwrap_err();
    assert!(err.contains("billing"));
}

#[test]
fn test_registry_config_from_json() {
    let json = r#"{
        "schedulers": {
            "search": { "capacity": 10 },
            "billing": { "capacity": 2, "window_ms": 60000, "retry_interval_ms": 100 }
        }
    }"#;

    let config = RegistryConfig::from_json_str(json).unwrap();
    assert_eq!(config.schedulers.len(), 2);
    assert_eq!(config.schedulers["billing"].window_ms, 60000);
}
