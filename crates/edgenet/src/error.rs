//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use edgenet_config::ConfigError;
use edgenet_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CONFIG: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to router")]
    #[diagnostic(
        code(edgenet::connection_failed),
        help("Check that the router is reachable from this host.\nReason: {reason}")
    )]
    ConnectionFailed { reason: String },

    #[error("Router did not answer after {attempts} attempt(s)")]
    #[diagnostic(
        code(edgenet::timeout),
        help("Raise router.request_timeout_secs or router.max_attempts in the config.")
    )]
    Timeout { attempts: u32 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(edgenet::auth_failed),
        help("Verify the target's username and password.")
    )]
    AuthFailed { message: String },

    #[error("No password configured for tenant '{tenant}'")]
    #[diagnostic(
        code(edgenet::no_credentials),
        help(
            "Set `password_env` or `password` on the target,\n\
             or store one in the system keyring under service 'edgenet', user '{tenant}'."
        )
    )]
    NoCredentials { tenant: String },

    // ── Targets ──────────────────────────────────────────────────────
    #[error("Tenant '{tenant}' is not configured")]
    #[diagnostic(
        code(edgenet::unknown_tenant),
        help("Run: edgenet targets to see configured tenants")
    )]
    UnknownTenant { tenant: String },

    #[error("{failed} of {total} target(s) failed")]
    #[diagnostic(code(edgenet::cycle_failed))]
    CycleFailed { failed: usize, total: usize },

    // ── Router ───────────────────────────────────────────────────────
    #[error("Router error: {message}")]
    #[diagnostic(code(edgenet::router))]
    Router { message: String },

    #[error("Telemetry endpoint error: {message}")]
    #[diagnostic(code(edgenet::sink))]
    Sink { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(edgenet::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid configuration: {message}")]
    #[diagnostic(
        code(edgenet::config_invalid),
        help("Default config location: {path}")
    )]
    ConfigInvalid { message: String, path: String },

    #[error(transparent)]
    #[diagnostic(code(edgenet::config))]
    Config(Box<figment::Error>),

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::UnknownTenant { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            Self::ConfigInvalid { .. } | Self::Config(_) => exit_code::CONFIG,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::SessionExpired => CliError::AuthFailed {
                message: "session expired and re-login failed".into(),
            },
            CoreError::Timeout { attempts } => CliError::Timeout { attempts },
            CoreError::TargetTimeout { .. } => CliError::Timeout { attempts: 1 },
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },
            CoreError::Rpc { message, .. } => CliError::Router { message },
            CoreError::Sink { message } => CliError::Sink { message },
            CoreError::TargetLoad { message } | CoreError::Config { message } => {
                CliError::ConfigInvalid {
                    message,
                    path: edgenet_config::config_path().display().to_string(),
                }
            }
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<edgenet_api::Error> for CliError {
    fn from(err: edgenet_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { tenant } => CliError::NoCredentials { tenant },
            ConfigError::UnknownTenant { tenant } => CliError::UnknownTenant { tenant },
            ConfigError::Figment(inner) => CliError::Config(inner),
            ConfigError::Validation { field, reason } => CliError::ConfigInvalid {
                message: format!("{field}: {reason}"),
                path: edgenet_config::config_path().display().to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let auth = CliError::from(CoreError::SessionExpired);
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let missing = CliError::from(ConfigError::UnknownTenant {
            tenant: "acme".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let timeout = CliError::from(edgenet_api::Error::Timeout { attempts: 3 });
        assert!(matches!(timeout, CliError::Timeout { attempts: 3 }));
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);

        let invalid = CliError::from(ConfigError::Validation {
            field: "sink.url".into(),
            reason: "not set".into(),
        });
        assert_eq!(invalid.exit_code(), exit_code::CONFIG);
    }
}
