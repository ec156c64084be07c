// Per-router session state
//
// Owned by exactly one `RouterClient`. Nothing here is shared across
// targets, so no interior mutability: callers go through `&mut`.

use std::collections::BTreeMap;
use std::fmt;

use crate::auth::{AuthChallenge, AuthState};
use crate::digest::DigestAuthorization;

/// Mutable state of one authenticated conversation with a router.
#[derive(Default)]
pub struct Session {
    state: AuthState,
    cookies: BTreeMap<String, String>,
    challenge: Option<AuthChallenge>,
    authorization: Option<String>,
    /// Incremented once per digest computation. Never reset, including
    /// across re-logins, so a value is never reused within this session.
    nonce_count: u32,
}

// Cookie values and the authorization header are credentials.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("cookies", &self.cookies.keys().collect::<Vec<_>>())
            .field("nonce_count", &self.nonce_count)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    pub fn nonce_count(&self) -> u32 {
        self.nonce_count
    }

    pub fn challenge(&self) -> Option<&AuthChallenge> {
        self.challenge.as_ref()
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// The last computed `Authorization` header value.
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    /// Advance and return the nonce count for the next digest.
    pub(crate) fn next_nonce_count(&mut self) -> u32 {
        self.nonce_count = self.nonce_count.saturating_add(1);
        self.nonce_count
    }

    /// Drop everything tied to the previous login. The nonce count survives.
    pub(crate) fn reset(&mut self) {
        self.state = AuthState::Unauthenticated;
        self.cookies.clear();
        self.challenge = None;
        self.authorization = None;
    }

    pub(crate) fn set_challenge(&mut self, challenge: AuthChallenge) {
        self.challenge = Some(challenge);
        self.state = AuthState::ChallengeReceived;
    }

    pub(crate) fn set_authorization(&mut self, digest: &DigestAuthorization) {
        self.authorization = Some(digest.to_string());
    }

    pub(crate) fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    pub(crate) fn mark_authenticated(&mut self) {
        self.state = AuthState::Authenticated;
    }

    pub(crate) fn mark_failed(&mut self) {
        self.state = AuthState::Failed;
        self.authorization = None;
    }

    /// `Cookie` header value for the stored cookies, if any.
    pub(crate) fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
