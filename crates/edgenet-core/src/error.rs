// ── Core error types ──
//
// Per-target failures as the poller reports them. The
// `From<edgenet_api::Error>` impl folds transport-level detail into
// domain variants; HTTP specifics only survive in messages.

use std::time::Duration;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Router errors ────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Router session expired and could not be re-established")]
    SessionExpired,

    #[error("Router request timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    #[error("Cannot connect to router: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Router RPC error: {message}")]
    Rpc {
        message: String,
        /// HTTP status or envelope status code, when one applies.
        status: Option<i64>,
    },

    // ── Poller errors ────────────────────────────────────────────────
    #[error("Target {tenant} did not finish within {timeout:?}")]
    TargetTimeout { tenant: String, timeout: Duration },

    #[error("Failed to load targets: {message}")]
    TargetLoad { message: String },

    #[error("Telemetry sink failed: {message}")]
    Sink { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` for credential and session failures.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. } | Self::SessionExpired)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<edgenet_api::Error> for CoreError {
    fn from(err: edgenet_api::Error) -> Self {
        use edgenet_api::Error as Api;

        match err {
            Api::ChallengeMissing { reason } => CoreError::AuthenticationFailed {
                message: format!("router sent no usable challenge ({reason})"),
            },
            Api::AuthRejected => CoreError::AuthenticationFailed {
                message: "router rejected the credentials".into(),
            },
            Api::SessionExpired => CoreError::SessionExpired,
            Api::Timeout { attempts } => CoreError::Timeout { attempts },
            Api::Connection { message, .. } => CoreError::ConnectionFailed { reason: message },
            Api::RpcProtocol { status, body } => CoreError::Rpc {
                message: format!("HTTP {status}: {body}"),
                status: Some(i64::from(status)),
            },
            Api::RpcStatus { code } => CoreError::Rpc {
                message: format!("router returned status {code}"),
                status: Some(code),
            },
            Api::Deserialization { message, .. } => CoreError::Rpc {
                message: format!("unexpected response shape: {message}"),
                status: None,
            },
            Api::Transport(e) => CoreError::Rpc {
                message: e.to_string(),
                status: e.status().map(|s| i64::from(s.as_u16())),
            },
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid router address: {e}"),
            },
            Api::ClientBuild(message) => CoreError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_auth_variants() {
        assert!(CoreError::from(edgenet_api::Error::AuthRejected).is_auth());
        assert!(CoreError::from(edgenet_api::Error::SessionExpired).is_auth());
        assert!(
            CoreError::from(edgenet_api::Error::ChallengeMissing {
                reason: "no header".into()
            })
            .is_auth()
        );
        assert!(!CoreError::from(edgenet_api::Error::Timeout { attempts: 1 }).is_auth());
        assert!(
            !CoreError::TargetTimeout {
                tenant: "acme".into(),
                timeout: Duration::from_secs(5),
            }
            .is_auth()
        );
    }

    #[test]
    fn protocol_errors_keep_status() {
        let err = CoreError::from(edgenet_api::Error::RpcProtocol {
            status: 500,
            body: "boom".into(),
        });
        assert!(matches!(err, CoreError::Rpc { status: Some(500), .. }));
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[test]
    fn transport_exhaustion_keeps_attempts() {
        let err = CoreError::from(edgenet_api::Error::Timeout { attempts: 3 });
        assert!(matches!(err, CoreError::Timeout { attempts: 3 }));
    }
}
