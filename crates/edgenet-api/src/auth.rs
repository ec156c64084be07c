use secrecy::SecretString;

use crate::error::Error;

/// Non-standard challenge header the router sends instead of `WWW-Authenticate`.
pub const CHALLENGE_HEADER: &str = "anweb-authenticate";

/// Device-info endpoint probed (unauthenticated) to obtain a challenge.
pub const PROBE_PATH: &str = "/devinfo";

/// JSON-RPC endpoint. Also the digest `uri`.
pub const RPC_PATH: &str = "/jsonrpc";

/// Cookie the router may set on the challenge response.
pub const SESSION_COOKIE: &str = "device-session-id";

/// Realm assumed when the challenge omits one.
const DEFAULT_REALM: &str = "domain";

/// Router login credentials.
///
/// The password is a [`SecretString`] so `Debug` output never reveals it.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Where a session is in the two-step handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    /// Challenge parsed, authenticated probe not yet confirmed.
    ChallengeReceived,
    Authenticated,
    /// Last login attempt failed. A new `login()` may be attempted.
    Failed,
}

/// A parsed `anweb-authenticate` challenge. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    pub realm: String,
    pub nonce: String,
    /// Quality-of-protection tag, normally `auth`. `None` selects the
    /// legacy digest variant without `nc`/`cnonce`.
    pub qop: Option<String>,
    pub opaque: Option<String>,
}

impl AuthChallenge {
    /// Parse the challenge header value.
    ///
    /// Accepts `key="value"` and `key=value` pairs separated by commas,
    /// optionally preceded by a scheme token such as `Digest`. A missing
    /// or empty `nonce` is [`Error::ChallengeMissing`].
    pub fn parse(header: &str) -> Result<Self, Error> {
        let params = parse_params(header);
        let find = |name: &str| {
            params
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };

        let nonce = find("nonce")
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::ChallengeMissing {
                reason: "challenge header has no nonce".into(),
            })?;

        Ok(Self {
            realm: find("realm").unwrap_or_else(|| DEFAULT_REALM.into()),
            nonce,
            qop: find("qop").and_then(|q| select_qop(&q)),
            opaque: find("opaque"),
        })
    }
}

/// Pick one qop token. Servers may offer a list such as `auth,auth-int`.
fn select_qop(raw: &str) -> Option<String> {
    let mut tokens = raw.split(',').map(str::trim).filter(|t| !t.is_empty());
    let first = tokens.clone().next()?;
    if tokens.any(|t| t.eq_ignore_ascii_case("auth")) {
        Some("auth".into())
    } else {
        Some(first.to_owned())
    }
}

fn parse_params(header: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut rest = header.trim();

    // Leading scheme token (`Digest realm=...`).
    if let Some((first, tail)) = rest.split_once(char::is_whitespace) {
        if !first.contains('=') {
            rest = tail;
        }
    }

    loop {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        let Some(eq) = rest.find('=') else { break };
        let key = rest[..eq].trim().to_ascii_lowercase();
        rest = &rest[eq + 1..];

        let value = if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted.find('"').unwrap_or(quoted.len());
            let value = &quoted[..end];
            rest = quoted.get(end + 1..).unwrap_or("");
            value
        } else {
            let end = rest
                .find(|c: char| c == ',' || c.is_whitespace())
                .unwrap_or(rest.len());
            let value = &rest[..end];
            rest = &rest[end..];
            value
        };

        if !key.is_empty() {
            params.push((key, value.to_owned()));
        }
    }

    params
}
