//! Tests for builder modules

use std::collections::HashMap;
use std::time::Duration;

use rate_gate::builders::{build_schedulers, SchedulerBuilder};
use rate_gate::config::{RegistryConfig, SchedulerConfig};
use rate_gate::core::DEFAULT_SCHEDULER_NAME;
use rate_gate::runtime::TokioSpawner;

#[test]
fn test_scheduler_builder_defaults() {
    let scheduler = SchedulerBuilder::new(3).build().unwrap();

    assert_eq!(scheduler.name(), DEFAULT_SCHEDULER_NAME);
    assert_eq!(scheduler.limits().capacity(), 3);
    assert_eq!(scheduler.limits().window(), Duration::from_millis(1000));
    assert_eq!(scheduler.limits().retry_interval(), Duration::from_millis(10));
}

#[test]
fn test_scheduler_builder_overrides() {
    let scheduler = SchedulerBuilder::new(1)
        .name("search-api")
        .capacity(8)
        .window(Duration::from_secs(60))
        .retry_interval(Duration::from_millis(250))
        .build()
        .unwrap();

    assert_eq!(scheduler.name(), "search-api");
    assert_eq!(scheduler.limits().capacity(), 8);
    assert_eq!(scheduler.limits().window(), Duration::from_secs(60));
    assert_eq!(scheduler.limits().retry_interval(), Duration::from_millis(250));
}

#[test]
fn test_scheduler_builder_rejects_invalid() {
    assert!(SchedulerBuilder::new(0).build().is_err());
    assert!(SchedulerBuilder::new(1).window(Duration::ZERO).build().is_err());
    assert!(SchedulerBuilder::new(1)
        .retry_interval(Duration::ZERO)
        .build()
        .is_err());
}

#[test]
fn test_scheduler_builder_from_config() {
    let cfg = SchedulerConfig {
        capacity: 2,
        window_ms: 500,
        retry_interval_ms: 25,
    };
    let scheduler = SchedulerBuilder::from_config("billing", &cfg).build().unwrap();

    assert_eq!(scheduler.name(), "billing");
    assert_eq!(scheduler.limits().window(), Duration::from_millis(500));
    assert_eq!(scheduler.limits().retry_interval(), Duration::from_millis(25));
}

#[test]
fn test_build_schedulers_from_registry() {
    let mut schedulers = HashMap::new();
    schedulers.insert("search".to_string(), SchedulerConfig::new(10));
    schedulers.insert("billing".to_string(), SchedulerConfig::new(1));
    let cfg = RegistryConfig { schedulers };

    let built = build_schedulers(&cfg, TokioSpawner::ambient()).unwrap();

    assert_eq!(built.len(), 2);
    assert_eq!(built["search"].limits().capacity(), 10);
    assert_eq!(built["billing"].name(), "billing");
}

#[test]
fn test_build_schedulers_rejects_invalid_registry() {
    let cfg = RegistryConfig {
        schedulers: HashMap::new(),
    };
    let err = build_schedulers(&cfg, TokioSpawner::ambient()).unwrap_err();
    assert!(err.is_configuration());
}
