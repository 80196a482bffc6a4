use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "livestream.toml",
    "config/livestream.toml",
    "crates/config/livestream.toml",
    "../livestream.toml",
    "../config/livestream.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub api: ApiConfig,
    pub proxy: ProxyConfig,
    pub tls: TlsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Socket address the dev server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http.address, self.http.port)
    }

    /// Whether the dev server should serve HTTPS: TLS must be enabled and
    /// both PEM files must already exist.
    pub fn tls_active(&self) -> bool {
        self.tls.enabled && self.tls.cert_path.exists() && self.tls.key_path.exists()
    }

    /// Origin other devices on the LAN use to reach the dev server.
    ///
    /// ```
    /// use livestream_config::AppConfig;
    ///
    /// let mut config = AppConfig::default();
    /// config.tls.enabled = false;
    /// assert_eq!(config.public_origin(), "http://192.168.1.10:3000");
    /// ```
    pub fn public_origin(&self) -> String {
        format!(
            "{}://{}:{}",
            self.http.protocol(self.tls_active()),
            self.http.network_ip,
            self.http.port
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
    /// LAN address advertised to other devices and baked into the dev certificate.
    pub network_ip: String,
    pub static_dir: PathBuf,
}

impl HttpConfig {
    pub fn protocol(&self, tls_active: bool) -> &'static str {
        if tls_active {
            "https"
        } else {
            "http"
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 3000,
            network_ip: "192.168.1.10".to_string(),
            static_dir: PathBuf::from("dist"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "ApiConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
    pub token_path: PathBuf,
}

impl ApiConfig {
    const fn default_request_timeout() -> u64 {
        30
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout_seconds: Self::default_request_timeout(),
            token_path: PathBuf::from(".livestream/token"),
        }
    }
}

/// Where the dev server forwards `/api` and `/socket.io` traffic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub target: String,
    pub api_prefix: String,
    pub socket_prefix: String,
    #[serde(default = "ProxyConfig::default_change_origin")]
    pub change_origin: bool,
    #[serde(default)]
    pub strip_api_prefix: bool,
}

impl ProxyConfig {
    const fn default_change_origin() -> bool {
        true
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            target: "http://localhost:5000".to_string(),
            api_prefix: "/api".to_string(),
            socket_prefix: "/socket.io".to_string(),
            change_origin: Self::default_change_origin(),
            strip_api_prefix: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    pub enabled: bool,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    #[serde(default)]
    pub subject_alt_names: Vec<String>,
}

impl TlsConfig {
    /// Names the dev certificate is issued for. Falls back to `localhost`
    /// plus the LAN address when none are configured.
    pub fn resolved_subject_alt_names(&self, network_ip: &str) -> Vec<String> {
        if !self.subject_alt_names.is_empty() {
            return self.subject_alt_names.clone();
        }

        let mut names = vec!["localhost".to_string()];
        if !network_ip.is_empty() && network_ip != "localhost" {
            names.push(network_ip.to_string());
        }
        names
    }
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cert_path: PathBuf::from("certs/cert.pem"),
            key_path: PathBuf::from("certs/key.pem"),
            subject_alt_names: Vec::new(),
        }
    }
}

/// Static S3 configuration used to mint pre-signed URLs.
///
/// ```
/// use livestream_config::StorageConfig;
///
/// let storage = StorageConfig::default();
/// assert_eq!(storage.default_expiry_seconds, 3600);
/// assert!(storage.bucket.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "StorageConfig::default_region")]
    pub region: String,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default = "StorageConfig::default_expiry")]
    pub default_expiry_seconds: u64,
}

impl StorageConfig {
    fn default_region() -> String {
        "ap-south-1".to_string()
    }

    const fn default_expiry() -> u64 {
        3600
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            region: Self::default_region(),
            bucket: None,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            default_expiry_seconds: Self::default_expiry(),
        }
    }
}

fn path_value(path: &Path) -> String {
    path.display().to_string()
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use livestream_config::load;
///
/// std::env::remove_var("LIVESTREAM_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let api_timeout = i64::try_from(defaults.api.request_timeout_seconds).unwrap_or(i64::MAX);
    let storage_expiry =
        i64::try_from(defaults.storage.default_expiry_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("http.network_ip", defaults.http.network_ip.clone())?
        .set_default("http.static_dir", path_value(&defaults.http.static_dir))?
        .set_default("api.base_url", defaults.api.base_url.clone())?
        .set_default("api.request_timeout_seconds", api_timeout)?
        .set_default("api.token_path", path_value(&defaults.api.token_path))?
        .set_default("proxy.target", defaults.proxy.target.clone())?
        .set_default("proxy.api_prefix", defaults.proxy.api_prefix.clone())?
        .set_default("proxy.socket_prefix", defaults.proxy.socket_prefix.clone())?
        .set_default("proxy.change_origin", defaults.proxy.change_origin)?
        .set_default("proxy.strip_api_prefix", defaults.proxy.strip_api_prefix)?
        .set_default("tls.enabled", defaults.tls.enabled)?
        .set_default("tls.cert_path", path_value(&defaults.tls.cert_path))?
        .set_default("tls.key_path", path_value(&defaults.tls.key_path))?
        .set_default("storage.region", defaults.storage.region.clone())?
        .set_default("storage.default_expiry_seconds", storage_expiry)?;

    let environment_overrides = config::Environment::with_prefix("LIVESTREAM").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("LIVESTREAM_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via LIVESTREAM_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(
        bind = %config.bind_address(),
        proxy_target = %config.proxy.target,
        "loaded livestream configuration"
    );
    Ok(config)
}
