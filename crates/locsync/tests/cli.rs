//! Exit codes and outputs of the `locsync` binary.

use locsync_config::ConfigKey;
use locsync_test_utils::{MockInfoblox, MockServiceNow};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::Output;
use tempfile::TempDir;
use tokio::process::Command;

fn write_config(dir: &TempDir, servicenow: &str, infoblox: &str) -> std::path::PathBuf {
    let log_dir = dir.path().join("logs");
    let contents = format!(
        "SERVICENOW_API_ENDPOINT: \"{servicenow}\"\n\
         SERVICENOW_API_USERNAME: \"svc-sync\"\n\
         SERVICENOW_API_TOKEN: \"snow-token\"\n\
         SERVICE_NOW_API_LIMIT: 1000\n\
         INFOBLOX_API_ENDPOINT: \"{infoblox}\"\n\
         INFOBLOX_API_USERNAME: \"admin\"\n\
         INFOBLOX_API_PASSWORD: \"infoblox\"\n\
         LOG_DIR: \"{}\"\n\
         LOG_LEVEL: \"DEBUG\"\n",
        log_dir.display()
    );
    let path = dir.path().join("config.yaml");
    fs::write(&path, contents).expect("write config");
    path
}

async fn locsync(config: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_locsync"));
    command.arg("--config").arg(config).args(args);
    for key in ConfigKey::ALL {
        command.env_remove(key.as_str());
    }
    command.env_remove("RUST_LOG");
    command.output().await.expect("run locsync")
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_succeeds_and_writes_log_file() {
    let snow = MockServiceNow::start().await;
    snow.set_names(&["US/NYC/HQ", "US"]);
    let infoblox = MockInfoblox::start().await;
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir, &snow.endpoint(), &infoblox.endpoint());

    let output = locsync(&config, &["sync"]).await;
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("EA 'Location' updated with 2 values"));

    let log = fs::read_to_string(dir.path().join("logs").join("locsync-sync.log"))
        .expect("log file");
    assert!(log.contains(" - INFO - synchronization completed successfully"));
    assert_eq!(
        infoblox.values(),
        Some(vec!["US".to_string(), "US/NYC/HQ".to_string()])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_failure_exits_with_one() {
    let snow = MockServiceNow::start().await;
    snow.fail_with(503, "maintenance");
    let infoblox = MockInfoblox::start().await;
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir, &snow.endpoint(), &infoblox.endpoint());

    let output = locsync(&config, &["sync"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("synchronization failed"));
    assert!(infoblox.requests().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn flush_requires_confirmation() {
    let infoblox = MockInfoblox::start_with("Location", &["A"]).await;
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir, "https://unused.example.com", &infoblox.endpoint());

    let output = locsync(&config, &["flush"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--yes"));
    assert!(infoblox.requests().is_empty());

    let output = locsync(&config, &["flush", "--yes"]).await;
    assert!(output.status.success(), "{output:?}");
    assert_eq!(infoblox.values(), Some(vec!["CLEARED".to_string()]));
    assert!(dir.path().join("logs").join("locsync-flush.log").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_keys_are_reported_together() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.yaml");
    fs::write(&path, "INFOBLOX_API_ENDPOINT: \"https://gm.example.com/wapi/v2.12\"\n")
        .expect("write config");

    let output = locsync(&path, &["flush", "--yes"]).await;
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("INFOBLOX_API_USERNAME"));
    assert!(stderr.contains("INFOBLOX_API_PASSWORD"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreadable_config_exits_with_one() {
    let dir = TempDir::new().expect("tempdir");
    let output = locsync(&dir.path().join("absent.yaml"), &["sync"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load config"));
}
