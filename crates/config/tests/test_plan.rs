//! Test plan for the `livestream-config` crate.
//!
//! These tests exercise the configuration loader across default handling,
//! file discovery, environment overrides, and network resolution.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use livestream_config::{load, AppConfig, HttpConfig, ProxyConfig, StorageConfig, TlsConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "LIVESTREAM_CONFIG",
    "LIVESTREAM__API__BASE_URL",
    "LIVESTREAM__API__REQUEST_TIMEOUT_SECONDS",
    "LIVESTREAM__HTTP__ADDRESS",
    "LIVESTREAM__HTTP__NETWORK_IP",
    "LIVESTREAM__HTTP__PORT",
    "LIVESTREAM__PROXY__CHANGE_ORIGIN",
    "LIVESTREAM__PROXY__TARGET",
    "LIVESTREAM__STORAGE__BUCKET",
    "LIVESTREAM__STORAGE__REGION",
    "LIVESTREAM__TLS__ENABLED",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        Self {
            vars: Vec::new(),
            original_dir: None,
        }
    }

    fn reset_environment(&mut self) {
        for key in ENV_VARS_TO_RESET {
            self.remove_var(key);
        }
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir =
                Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }

        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }
}

fn write_config_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create config directories");
    }
    fs::write(path, contents).expect("failed to write config file");
}

fn isolated() -> (TempDir, TestContext) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());
    (temp_dir, ctx)
}

#[test]
#[serial]
fn load_uses_default_values_when_no_files_found() {
    let (_temp_dir, _ctx) = isolated();

    let config = load().expect("configuration load should succeed without files");
    let defaults = AppConfig::default();

    assert_eq!(config.http.address, defaults.http.address);
    assert_eq!(config.http.port, defaults.http.port);
    assert_eq!(config.http.network_ip, defaults.http.network_ip);
    assert_eq!(config.api.base_url, defaults.api.base_url);
    assert_eq!(
        config.api.request_timeout_seconds,
        defaults.api.request_timeout_seconds
    );
    assert_eq!(config.proxy.target, defaults.proxy.target);
    assert_eq!(config.proxy.api_prefix, "/api");
    assert_eq!(config.proxy.socket_prefix, "/socket.io");
    assert!(config.proxy.change_origin);
    assert_eq!(config.tls.cert_path, defaults.tls.cert_path);
    assert_eq!(config.storage.default_expiry_seconds, 3600);
    assert!(config.storage.bucket.is_none());
}

#[test]
#[serial]
fn load_picks_first_available_file_in_search_order() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "livestream.toml",
        r#"
        [http]
        port = 4242
        "#,
    );
    write_config_file(
        temp_dir.path(),
        "config/livestream.toml",
        r#"
        [http]
        port = 5151
        "#,
    );

    let config = load().expect("configuration load should pick the first file");
    assert_eq!(config.http.port, 4242);
}

#[test]
#[serial]
fn load_merges_partial_file_with_defaults() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "livestream.toml",
        r#"
        [proxy]
        target = "http://10.0.0.5:5000"

        [storage]
        bucket = "inube-media"
        region = "us-east-1"
        "#,
    );

    let config = load().expect("configuration load should succeed");
    let defaults = AppConfig::default();

    assert_eq!(config.proxy.target, "http://10.0.0.5:5000");
    assert_eq!(config.proxy.api_prefix, defaults.proxy.api_prefix);
    assert_eq!(config.storage.bucket.as_deref(), Some("inube-media"));
    assert_eq!(config.storage.region, "us-east-1");
    assert_eq!(config.http.port, defaults.http.port);
}

#[test]
#[serial]
fn load_applies_environment_overrides() {
    let (temp_dir, mut ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "livestream.toml",
        r#"
        [http]
        port = 3030
        "#,
    );

    ctx.set_var("LIVESTREAM__HTTP__PORT", "8443");
    ctx.set_var("LIVESTREAM__TLS__ENABLED", "false");

    let config = load().expect("configuration load should honour env overrides");
    assert_eq!(config.http.port, 8443);
    assert!(!config.tls.enabled);
}

#[test]
#[serial]
fn load_reads_explicit_config_path() {
    let (temp_dir, mut ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "elsewhere/custom.toml",
        r#"
        [api]
        base_url = "https://admin.example.test"
        "#,
    );
    ctx.set_var(
        "LIVESTREAM_CONFIG",
        temp_dir.path().join("elsewhere/custom.toml").display().to_string(),
    );

    let config = load().expect("explicit configuration file should load");
    assert_eq!(config.api.base_url, "https://admin.example.test");
}

#[test]
#[serial]
fn load_errors_on_invalid_toml_contents() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "livestream.toml",
        r#"
        [http]
        port = "not-a-number
        "#,
    );

    let error = load().expect_err("invalid TOML should cause load to fail");
    let message = error.to_string();
    assert!(
        message.contains("invalid configuration")
            || message.contains("unable to build configuration"),
        "unexpected error message: {message}"
    );
}

#[test]
fn http_config_defaults_match_expected_host_and_port() {
    let defaults = HttpConfig::default();
    assert_eq!(defaults.address, "0.0.0.0");
    assert_eq!(defaults.port, 3000);
    assert_eq!(defaults.protocol(true), "https");
    assert_eq!(defaults.protocol(false), "http");
}

#[test]
fn public_origin_uses_https_only_when_certificates_exist() {
    let temp = TempDir::new().expect("temp dir");
    let mut config = AppConfig::default();
    config.tls.cert_path = temp.path().join("cert.pem");
    config.tls.key_path = temp.path().join("key.pem");

    assert!(!config.tls_active());
    assert_eq!(config.public_origin(), "http://192.168.1.10:3000");

    fs::write(&config.tls.cert_path, "cert").unwrap();
    fs::write(&config.tls.key_path, "key").unwrap();
    assert!(config.tls_active());
    assert_eq!(config.public_origin(), "https://192.168.1.10:3000");

    config.tls.enabled = false;
    assert!(!config.tls_active());
}

#[test]
fn tls_subject_alt_names_default_to_localhost_and_lan_address() {
    let tls = TlsConfig::default();
    assert_eq!(
        tls.resolved_subject_alt_names("192.168.1.10"),
        vec!["localhost".to_string(), "192.168.1.10".to_string()]
    );

    let custom = TlsConfig {
        subject_alt_names: vec!["dev.inube.test".to_string()],
        ..TlsConfig::default()
    };
    assert_eq!(
        custom.resolved_subject_alt_names("192.168.1.10"),
        vec!["dev.inube.test".to_string()]
    );
}

#[test]
fn proxy_and_storage_defaults() {
    let proxy = ProxyConfig::default();
    assert_eq!(proxy.target, "http://localhost:5000");
    assert!(!proxy.strip_api_prefix);

    let storage = StorageConfig::default();
    assert_eq!(storage.region, "ap-south-1");
    assert!(storage.access_key_id.is_none());
}
