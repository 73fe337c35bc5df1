//! Configuration resolution through the YAML store.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use discoveryctl_cli::infra::config::YamlConfigStore;
use tempfile::TempDir;

fn store_with(yaml: &str) -> (TempDir, YamlConfigStore) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, yaml).expect("write config");
    let store = YamlConfigStore::new(Some(&path));
    (dir, store)
}

const VALID: &str = "\
INFOBLOX_API_URL: https://gm.example.net/
INFOBLOX_API_USERNAME: discovery
INFOBLOX_API_PASSWORD: s3cret
SCHEDULED_DISCOVERY_NETWORK_VIEW: default
SCHEDULED_DISCOVERY_DEFAULT_NETWORK: 10.20.30.40/16
SOME_OTHER_SCRIPT_SETTING: ignored
";

#[test]
fn valid_file_resolves_with_defaults() {
    let (_dir, store) = store_with(VALID);
    let run = store.load().expect("load").resolve(None, false).expect("resolve");

    assert_eq!(run.wapi_base(), "https://gm.example.net/wapi/v2.12");
    assert_eq!(run.target_view, "default");
    assert_eq!(run.fallback_cidr().as_deref(), Some("10.20.0.0/16"));
    assert!(!run.verify_tls);
    assert_eq!(run.poll.interval, Duration::from_secs(5));
    assert_eq!(run.poll.stop_timeout, Duration::from_secs(60));
    assert_eq!(run.poll.start_timeout, Duration::from_secs(15));
    assert_eq!(run.scan.mode, "ICMP");
}

#[test]
fn command_line_view_overrides_file() {
    let (_dir, store) = store_with(VALID);
    let run = store
        .load()
        .expect("load")
        .resolve(Some("lab"), true)
        .expect("resolve");
    assert_eq!(run.target_view, "lab");
    assert!(run.force);
}

#[test]
fn every_problem_is_reported_at_once() {
    let (_dir, store) = store_with(
        "INFOBLOX_API_URL: not a url\nSCHEDULED_DISCOVERY_DEFAULT_NETWORK: 10.0.0.0/99\n",
    );
    let err = store.load().expect("load").resolve(None, false).unwrap_err();

    let text = err.to_string();
    for key in [
        "INFOBLOX_API_URL",
        "INFOBLOX_API_USERNAME",
        "INFOBLOX_API_PASSWORD",
        "SCHEDULED_DISCOVERY_NETWORK_VIEW",
        "SCHEDULED_DISCOVERY_DEFAULT_NETWORK",
    ] {
        assert!(text.contains(key), "missing {key} in: {text}");
    }
}

#[test]
fn debug_output_hides_password() {
    let (_dir, store) = store_with(VALID);
    let run = store.load().expect("load").resolve(None, false).expect("resolve");
    let debug = format!("{run:?}");
    assert!(!debug.contains("s3cret"));
    assert!(debug.contains("<redacted>"));
}
