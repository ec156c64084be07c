// ── Runtime polling configuration ──
//
// These types describe *what* to poll and *how hard*. They carry
// credential data and tuning, but never touch disk: the config crate
// builds them from files and the environment and hands them in.

use std::time::Duration;

use edgenet_api::{Credentials, TransportConfig};
use url::Url;

use crate::error::CoreError;

/// Upper bound on concurrently polled routers.
pub const MAX_CONCURRENCY: usize = 8;

/// Interval used in place of a zero cycle interval.
pub const FALLBACK_INTERVAL: Duration = Duration::from_secs(1);

/// One router polled on behalf of one tenant.
#[derive(Debug, Clone)]
pub struct TargetConfig {
    pub tenant_id: String,
    /// Router base URL (e.g. `http://192.168.0.1`).
    pub router: Url,
    pub credentials: Credentials,
    pub poll_interval: Duration,
}

/// Poller-wide settings.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between cycle triggers.
    pub interval: Duration,
    /// Routers polled at once within a cycle.
    pub concurrency: usize,
    /// Upper bound for one target's login + reads + delivery.
    pub target_timeout: Duration,
    /// HTTP settings for every router client.
    pub transport: TransportConfig,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            concurrency: 2,
            target_timeout: Duration::from_secs(120),
            transport: TransportConfig::default(),
        }
    }
}

impl PollerConfig {
    /// Concurrency clamped to `1..=MAX_CONCURRENCY`.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
    }

    /// Cycle interval, with zero replaced by [`FALLBACK_INTERVAL`].
    pub fn effective_interval(&self) -> Duration {
        if self.interval.is_zero() {
            FALLBACK_INTERVAL
        } else {
            self.interval
        }
    }
}

/// Parse a router address. Bare hosts and IPs get an `http://` scheme.
pub fn router_url(address: &str) -> Result<Url, CoreError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(CoreError::Config {
            message: "router address is empty".into(),
        });
    }
    let candidate = if address.contains("://") {
        address.to_owned()
    } else {
        format!("http://{address}")
    };
    Url::parse(&candidate).map_err(|e| CoreError::Config {
        message: format!("invalid router address {address:?}: {e}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bare_hosts_get_http_scheme() {
        assert_eq!(router_url("192.168.0.1").unwrap().as_str(), "http://192.168.0.1/");
        assert_eq!(router_url("router.lan:8080").unwrap().as_str(), "http://router.lan:8080/");
        assert_eq!(router_url("https://10.0.0.1").unwrap().as_str(), "https://10.0.0.1/");
    }

    #[test]
    fn empty_or_garbage_addresses_are_config_errors() {
        assert!(matches!(router_url("  "), Err(CoreError::Config { .. })));
        assert!(matches!(router_url("http://"), Err(CoreError::Config { .. })));
    }

    #[test]
    fn concurrency_is_clamped() {
        let mut cfg = PollerConfig {
            concurrency: 0,
            ..PollerConfig::default()
        };
        assert_eq!(cfg.effective_concurrency(), 1);
        cfg.concurrency = 64;
        assert_eq!(cfg.effective_concurrency(), MAX_CONCURRENCY);
        cfg.concurrency = 3;
        assert_eq!(cfg.effective_concurrency(), 3);
    }

    #[test]
    fn zero_interval_falls_back() {
        let mut cfg = PollerConfig {
            interval: Duration::ZERO,
            ..PollerConfig::default()
        };
        assert_eq!(cfg.effective_interval(), FALLBACK_INTERVAL);
        cfg.interval = Duration::from_millis(250);
        assert_eq!(cfg.effective_interval(), Duration::from_millis(250));
    }
}
