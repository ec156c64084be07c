//! Configuration for the edgenet poller.
//!
//! TOML file + `EDGENET_` environment layering, per-target credential
//! resolution (env var, keyring, plaintext), and translation into the
//! runtime types of `edgenet-core`.

mod source;

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use edgenet_api::{Credentials, RetryPolicy, TlsMode, TransportConfig};
use edgenet_core::{PollerConfig, TargetConfig, router_url};

pub use source::FileTargetSource;

/// Keyring service name; entries are keyed by tenant.
pub const KEYRING_SERVICE: &str = "edgenet";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for tenant '{tenant}'")]
    NoCredentials { tenant: String },

    #[error("unknown tenant '{tenant}'")]
    UnknownTenant { tenant: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub poller: PollerSection,
    #[serde(default)]
    pub router: RouterSection,
    #[serde(default)]
    pub sink: SinkSection,
    #[serde(default)]
    pub targets: Vec<TargetEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollerSection {
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_target_timeout")]
    pub target_timeout_secs: u64,
}

impl Default for PollerSection {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            concurrency: default_concurrency(),
            target_timeout_secs: default_target_timeout(),
        }
    }
}

/// HTTP settings for router connections.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouterSection {
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_router_retry_delay")]
    pub retry_delay_secs: u64,
    /// Verify router TLS certificates. Off by default: routers ship
    /// self-signed certificates.
    #[serde(default)]
    pub verify_tls: bool,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_router_retry_delay(),
            verify_tls: false,
        }
    }
}

/// Telemetry endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SinkSection {
    pub url: Option<String>,
    #[serde(default = "default_sink_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_sink_retry_delay")]
    pub retry_delay_secs: u64,
}

impl Default for SinkSection {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_sink_timeout(),
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_sink_retry_delay(),
        }
    }
}

/// One `[[targets]]` entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetEntry {
    /// Tenant identifier, also the keyring account name.
    pub tenant: String,

    /// Router host, IP, or URL. Bare hosts get `http://`.
    pub router: String,

    #[serde(default = "default_username")]
    pub username: String,

    /// Plaintext password (prefer `password_env` or the keyring).
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Per-target cadence; defaults to the poller interval.
    pub poll_interval_secs: Option<u64>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_interval() -> u64 {
    30
}
fn default_concurrency() -> usize {
    2
}
fn default_target_timeout() -> u64 {
    120
}
fn default_request_timeout() -> u64 {
    15
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_max_attempts() -> u32 {
    3
}
fn default_router_retry_delay() -> u64 {
    2
}
fn default_sink_timeout() -> u64 {
    10
}
fn default_sink_retry_delay() -> u64 {
    5
}
fn default_username() -> String {
    "admin".into()
}
fn default_enabled() -> bool {
    true
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "edgenet", "edgenet").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("edgenet");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from defaults, the TOML file, and `EDGENET_*`
/// environment variables (nested keys split on `__`).
///
/// A missing file is not an error; a malformed one is.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    debug!(path = %path.display(), "loading configuration");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("EDGENET_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Translation to runtime types ────────────────────────────────────

impl Config {
    /// Router transport settings.
    pub fn router_transport(&self) -> TransportConfig {
        let r = &self.router;
        TransportConfig {
            tls: if r.verify_tls {
                TlsMode::System
            } else {
                TlsMode::DangerAcceptInvalid
            },
            timeout: Duration::from_secs(r.request_timeout_secs),
            connect_timeout: Duration::from_secs(r.connect_timeout_secs),
            retry: RetryPolicy {
                max_attempts: r.max_attempts,
                delay: Duration::from_secs(r.retry_delay_secs),
            },
        }
    }

    /// Poller settings. A zero cycle interval is rejected.
    pub fn poller_config(&self) -> Result<PollerConfig, ConfigError> {
        if self.poller.interval_secs == 0 {
            return Err(ConfigError::Validation {
                field: "poller.interval_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(PollerConfig {
            interval: Duration::from_secs(self.poller.interval_secs),
            concurrency: self.poller.concurrency,
            target_timeout: Duration::from_secs(self.poller.target_timeout_secs),
            transport: self.router_transport(),
        })
    }

    /// Telemetry endpoint and its transport settings.
    pub fn sink_endpoint(&self) -> Result<(Url, TransportConfig), ConfigError> {
        let raw = self.sink.url.as_deref().ok_or_else(|| ConfigError::Validation {
            field: "sink.url".into(),
            reason: "not set".into(),
        })?;
        let url = Url::parse(raw).map_err(|e| ConfigError::Validation {
            field: "sink.url".into(),
            reason: format!("{raw:?}: {e}"),
        })?;
        let transport = TransportConfig {
            tls: TlsMode::System,
            timeout: Duration::from_secs(self.sink.timeout_secs),
            retry: RetryPolicy {
                max_attempts: self.sink.max_attempts,
                delay: Duration::from_secs(self.sink.retry_delay_secs),
            },
            ..TransportConfig::default()
        };
        Ok((url, transport))
    }

    /// Find an entry by tenant, enabled or not.
    pub fn target(&self, tenant: &str) -> Result<&TargetEntry, ConfigError> {
        self.targets
            .iter()
            .find(|t| t.tenant == tenant)
            .ok_or_else(|| ConfigError::UnknownTenant {
                tenant: tenant.into(),
            })
    }

    /// Resolve every enabled target. Entries that fail (bad address, no
    /// password) are returned separately so the rest still load.
    pub fn resolve_targets(&self) -> ResolvedTargets {
        let mut resolved = ResolvedTargets::default();
        for entry in self.targets.iter().filter(|t| t.enabled) {
            match self.resolve_target(entry) {
                Ok(target) => resolved.targets.push(target),
                Err(e) => resolved.errors.push((entry.tenant.clone(), e)),
            }
        }
        resolved
    }

    /// Resolve one entry into a runtime [`TargetConfig`].
    pub fn resolve_target(&self, entry: &TargetEntry) -> Result<TargetConfig, ConfigError> {
        if entry.tenant.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "targets.tenant".into(),
                reason: "must not be empty".into(),
            });
        }
        let router = router_url(&entry.router).map_err(|e| ConfigError::Validation {
            field: format!("targets[{}].router", entry.tenant),
            reason: e.to_string(),
        })?;
        let password = resolve_password(entry)?;
        let poll_interval = Duration::from_secs(
            entry
                .poll_interval_secs
                .unwrap_or(self.poller.interval_secs),
        );

        Ok(TargetConfig {
            tenant_id: entry.tenant.clone(),
            router,
            credentials: Credentials::new(entry.username.clone(), password),
            poll_interval,
        })
    }
}

/// Outcome of [`Config::resolve_targets`].
#[derive(Debug, Default)]
pub struct ResolvedTargets {
    pub targets: Vec<TargetConfig>,
    /// `(tenant, error)` for each entry that could not be resolved.
    pub errors: Vec<(String, ConfigError)>,
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a target's password: `password_env` variable, then the system
/// keyring (`edgenet` / tenant), then plaintext config.
pub fn resolve_password(entry: &TargetEntry) -> Result<SecretString, ConfigError> {
    // 1. Named env var
    if let Some(ref env_name) = entry.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &entry.tenant) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = entry.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        tenant: entry.tenant.clone(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
        [poller]
        interval_secs = 60
        concurrency = 4

        [router]
        max_attempts = 5

        [sink]
        url = "https://ingest.example.com/api/telemetry"

        [[targets]]
        tenant = "acme"
        router = "192.168.0.1"
        password = "hunter2"

        [[targets]]
        tenant = "globex"
        router = "https://10.1.0.1"
        username = "ops"
        password_env = "GLOBEX_ROUTER_PASSWORD"
        poll_interval_secs = 300

        [[targets]]
        tenant = "retired"
        router = "10.9.9.9"
        password = "x"
        enabled = false
    "#;

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|jail| {
            let config = load_config(Some(&jail.directory().join("missing.toml"))).unwrap();
            assert_eq!(config.poller.interval_secs, 30);
            assert_eq!(config.poller.concurrency, 2);
            assert_eq!(config.poller.target_timeout_secs, 120);
            assert_eq!(config.router.request_timeout_secs, 15);
            assert_eq!(config.router.connect_timeout_secs, 10);
            assert_eq!(config.router.max_attempts, 3);
            assert_eq!(config.router.retry_delay_secs, 2);
            assert_eq!(config.sink.retry_delay_secs, 5);
            assert!(config.targets.is_empty());
            Ok(())
        });
    }

    #[test]
    fn file_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("EDGENET_POLLER__CONCURRENCY", "1");
            jail.set_env("EDGENET_ROUTER__RETRY_DELAY_SECS", "7");

            let config = load_config(Some(&jail.directory().join("config.toml"))).unwrap();
            assert_eq!(config.poller.interval_secs, 60);
            assert_eq!(config.poller.concurrency, 1);
            assert_eq!(config.router.max_attempts, 5);
            assert_eq!(config.router.retry_delay_secs, 7);
            assert_eq!(config.targets.len(), 3);
            assert_eq!(config.targets[0].username, "admin");
            assert!(config.targets[0].enabled);
            Ok(())
        });
    }

    #[test]
    fn malformed_file_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[poller\ninterval_secs = ")?;
            let err = load_config(Some(&jail.directory().join("config.toml"))).unwrap_err();
            assert!(matches!(err, ConfigError::Figment(_)));
            Ok(())
        });
    }

    #[test]
    fn resolves_enabled_targets_and_credentials() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("GLOBEX_ROUTER_PASSWORD", "from-env");

            let config = load_config(Some(&jail.directory().join("config.toml"))).unwrap();
            let resolved = config.resolve_targets();
            assert!(resolved.errors.is_empty());
            assert_eq!(resolved.targets.len(), 2);

            let acme = &resolved.targets[0];
            assert_eq!(acme.tenant_id, "acme");
            assert_eq!(acme.router.as_str(), "http://192.168.0.1/");
            assert_eq!(acme.poll_interval, Duration::from_secs(60));

            let globex = &resolved.targets[1];
            assert_eq!(globex.credentials.username, "ops");
            assert_eq!(globex.credentials.password.expose_secret(), "from-env");
            assert_eq!(globex.poll_interval, Duration::from_secs(300));
            Ok(())
        });
    }

    #[test]
    fn missing_password_only_fails_that_target() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [[targets]]
                tenant = "ok"
                router = "192.168.0.1"
                password = "pw"

                [[targets]]
                tenant = "nopass-7f3a"
                router = "192.168.0.2"
                password_env = "EDGENET_TEST_UNSET_VARIABLE"
                "#,
            )?;

            let config = load_config(Some(&jail.directory().join("config.toml"))).unwrap();
            let resolved = config.resolve_targets();
            assert_eq!(resolved.targets.len(), 1);
            assert_eq!(resolved.errors.len(), 1);
            assert_eq!(resolved.errors[0].0, "nopass-7f3a");
            assert!(matches!(
                resolved.errors[0].1,
                ConfigError::NoCredentials { .. }
            ));
            Ok(())
        });
    }

    #[test]
    fn transport_and_sink_translation() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            let config = load_config(Some(&jail.directory().join("config.toml"))).unwrap();

            let poller = config.poller_config().unwrap();
            assert_eq!(poller.interval, Duration::from_secs(60));
            assert_eq!(poller.transport.retry.max_attempts, 5);
            assert_eq!(poller.transport.timeout, Duration::from_secs(15));
            assert_eq!(poller.transport.tls, TlsMode::DangerAcceptInvalid);

            let (url, transport) = config.sink_endpoint().unwrap();
            assert_eq!(url.path(), "/api/telemetry");
            assert_eq!(transport.retry.delay, Duration::from_secs(5));
            Ok(())
        });
    }

    #[test]
    fn zero_interval_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("EDGENET_POLLER__INTERVAL_SECS", "0");

            let config = load_config(Some(&jail.directory().join("config.toml"))).unwrap();
            match config.poller_config() {
                Err(ConfigError::Validation { field, .. }) => {
                    assert_eq!(field, "poller.interval_secs");
                }
                other => panic!("expected validation error, got {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn lookup_by_tenant() {
        let config = Config {
            targets: vec![TargetEntry {
                tenant: "acme".into(),
                router: "192.168.0.1".into(),
                username: "admin".into(),
                password: None,
                password_env: None,
                poll_interval_secs: None,
                enabled: false,
            }],
            ..Config::default()
        };
        assert!(config.target("acme").is_ok());
        assert!(matches!(
            config.target("other"),
            Err(ConfigError::UnknownTenant { .. })
        ));
        assert!(config.sink_endpoint().is_err());
    }
}
