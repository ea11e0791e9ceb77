//! End-to-end: config file to scraped metrics.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use tcpstats::config::Config;
use tcpstats::metrics::{Metrics, Timestamp, TCP_QUEUE_LENGTH, TCP_QUEUE_SIZE};
use tcpstats::receiver::Receiver;
use tcpstats::scraper::Scraper;
use tcpstats::ConfigError;

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name)
}

fn load(name: &str) -> Result<Config, ConfigError> {
    Config::load_from_file(&testdata(name))
}

// =============================================================================
// Config files
// =============================================================================

#[test]
fn load_config_file() {
    let config = load("config.yaml").unwrap();

    assert_eq!(config.path, PathBuf::from("testdata/tcp"));
    assert_eq!(config.portfilter, "39112,45334");
    assert_eq!(config.collection_interval, Duration::from_secs(10));
    assert_eq!(config.initial_delay, Duration::ZERO);
    assert!(config.metrics.tcp_queue_size.enabled);
    assert!(!config.metrics.tcp_queue_length.enabled);
}

#[test]
fn config_file_errors() {
    assert!(matches!(
        load("config_empty_path.yaml"),
        Err(ConfigError::EmptyPath)
    ));
    assert!(matches!(
        load("config_bad_filter.yaml"),
        Err(ConfigError::InvalidPortFilter(_))
    ));
    assert!(matches!(
        load("config_unknown_key.yaml"),
        Err(ConfigError::Yaml(_))
    ));
    assert!(matches!(
        load("config_missing.yaml"),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn default_yaml_loads_as_default() {
    let config = Config::from_yaml(&Config::default_yaml()).unwrap();
    assert_eq!(config, Config::default());
    config.validate().unwrap();
}

// =============================================================================
// Scraping
// =============================================================================

fn fixture_config() -> Config {
    Config {
        path: testdata("tcp"),
        ..Config::default()
    }
}

#[test]
fn scrape_from_config_file() {
    let mut config = load("config.yaml").unwrap();
    config.path = testdata("tcp");

    let metrics = Scraper::from_config(&config).scrape().unwrap();

    assert_eq!(metrics.metric_count(), 1);
    assert!(metrics.metric(TCP_QUEUE_LENGTH).is_none());
    let size = metrics.metric(TCP_QUEUE_SIZE).unwrap();
    let values: Vec<u64> = size.data_points.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![10, 4, 0, 12]);
}

#[test]
fn metrics_json_shape() {
    let metrics = Scraper::from_config(&fixture_config())
        .scrape_at(Timestamp::from_unix_nanos(1_000))
        .unwrap();

    let json = serde_json::to_value(&metrics).unwrap();

    let first = &json["metrics"][0];
    assert_eq!(first["name"], "tcp.queue.size");
    assert_eq!(first["unit"], "By");
    assert_eq!(first["data_points"][0]["timestamp"], 1_000);
    assert_eq!(first["data_points"][0]["value"], 10);
    assert_eq!(
        first["data_points"][0]["attributes"],
        serde_json::json!({
            "direction": "tx",
            "local_address": "192.168.1.10",
            "local_port": 39112,
        })
    );

    let second = &json["metrics"][1];
    assert_eq!(second["name"], "tcp.queue.length");
    assert_eq!(second["unit"], "{connections}");
    assert_eq!(second["data_points"][1]["value"], 2);
}

#[test]
fn receiver_delivers_batches() {
    let config = Config {
        initial_delay: Duration::ZERO,
        collection_interval: Duration::from_millis(10),
        ..fixture_config()
    };
    let (tx, rx) = mpsc::channel();

    let handle = Receiver::new(&config)
        .start(move |metrics: Metrics| {
            let _ = tx.send(metrics);
        })
        .unwrap();

    let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    handle.shutdown();

    assert_eq!(first.data_point_count(), 6);
    assert_eq!(second.data_point_count(), 6);
}
