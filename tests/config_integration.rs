//! ---
//! herd_section: "15-testing-qa-runbook"
//! herd_subsection: "integration-tests"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Checks that shipped configuration files load and validate."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
use std::fs;
use std::path::Path;
use std::time::Duration;

use herd_common::{AppConfig, ScheduleMode, SpreadPattern};

fn read(path: &str) -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let full = Path::new(manifest_dir).join("..").join(path);
    fs::read_to_string(&full)
        .unwrap_or_else(|err| panic!("failed to read {}: {}", full.display(), err))
}

#[test]
fn example_config_is_valid() {
    let config: AppConfig = read("configs/example.toml")
        .parse()
        .expect("example config should parse and validate");
    assert_eq!(config.herd.count, 10);
    assert_eq!(config.herd.spread.pattern, SpreadPattern::Ring);
    assert_eq!(config.schedule.mode, ScheduleMode::Sequential);
    assert_eq!(config.schedule.cycle_period, Duration::from_secs(20));
    assert_eq!(
        config.api.endpoint_url().unwrap().path(),
        "/api/tracking/tracker-data"
    );
}

#[test]
fn concurrent_example_config_is_valid() {
    let config: AppConfig = read("configs/concurrent.toml")
        .parse()
        .expect("concurrent config should parse and validate");
    assert_eq!(config.schedule.mode, ScheduleMode::Concurrent);
    assert_eq!(config.herd.spread.pattern, SpreadPattern::SharedPasture);
    assert!(config.schedule.duration.is_some());
}

#[test]
fn config_files_carry_frontmatter() {
    for file in ["configs/example.toml", "configs/concurrent.toml"] {
        assert!(
            read(file).starts_with("# ---"),
            "{file} must include frontmatter header"
        );
    }
}
