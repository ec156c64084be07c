use thiserror::Error;

/// Top-level error type for the `edgenet-api` crate.
///
/// Covers every failure mode of a router conversation: the digest
/// handshake, the HTTP transport, and the JSON-RPC envelope.
/// `edgenet-core` maps these into per-target diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The probe did not yield a usable challenge (wrong status, no
    /// `anweb-authenticate` header, or no `nonce` in it).
    #[error("Authentication challenge missing: {reason}")]
    ChallengeMissing { reason: String },

    /// The router answered the authenticated probe with HTTP 401.
    #[error("Authentication rejected -- check router username and password")]
    AuthRejected,

    /// A call was rejected with 401 again right after re-authenticating.
    #[error("Session expired -- re-authentication did not restore access")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// Every attempt timed out.
    #[error("Request timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    /// Every attempt failed to connect.
    #[error("Connection failed after {attempts} attempt(s): {message}")]
    Connection { attempts: u32, message: String },

    /// Other HTTP transport error (body read, redirect loop, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── JSON-RPC ────────────────────────────────────────────────────
    /// Non-200, non-401 HTTP status from the RPC endpoint.
    /// `body` is truncated to 200 characters.
    #[error("RPC endpoint returned HTTP {status}: {body}")]
    RpcProtocol { status: u16, body: String },

    /// The envelope carried a status code other than 0 or 20.
    #[error("Router rejected the request (status {code})")]
    RpcStatus { code: i64 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` for failures the fixed-delay retry policy covers:
    /// timeouts and connection errors. 401 handling is separate.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connection { .. })
    }

    /// Returns `true` if the failure came from the digest handshake.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::ChallengeMissing { .. } | Self::AuthRejected | Self::SessionExpired
        )
    }

    /// Classify a `reqwest` send failure made on the given attempt.
    pub(crate) fn from_send(err: reqwest::Error, attempts: u32) -> Self {
        if err.is_timeout() {
            Self::Timeout { attempts }
        } else if err.is_connect() {
            Self::Connection {
                attempts,
                message: err.to_string(),
            }
        } else {
            Self::Transport(err)
        }
    }
}

/// Truncate a response body for error messages without splitting a UTF-8 char.
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
