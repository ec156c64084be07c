// Digest codec
//
// Pure computation of the router's digest authorization value. MD5 is what
// the firmware expects; any other hash breaks interoperability.

use std::fmt;

use md5::{Digest, Md5};
use rand::Rng;
use secrecy::ExposeSecret;

use crate::auth::{AuthChallenge, Credentials};

/// Everything that goes into an `Authorization: Digest ...` header.
#[derive(Clone, PartialEq, Eq)]
pub struct DigestAuthorization {
    pub username: String,
    pub realm: String,
    pub nonce: String,
    pub uri: String,
    pub response: String,
    pub qop: Option<String>,
    /// Nonce count as 8 lowercase hex digits.
    pub nc: String,
    pub cnonce: String,
    pub opaque: Option<String>,
}

// The response hash is a password-equivalent for this nonce; keep it out of logs.
impl fmt::Debug for DigestAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestAuthorization")
            .field("username", &self.username)
            .field("realm", &self.realm)
            .field("uri", &self.uri)
            .field("qop", &self.qop)
            .field("nc", &self.nc)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for DigestAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"Digest username="{}", realm="{}", nonce="{}", uri="{}", response="{}""#,
            self.username, self.realm, self.nonce, self.uri, self.response
        )?;
        if let Some(ref qop) = self.qop {
            write!(f, r#", qop={qop}, nc={}, cnonce="{}""#, self.nc, self.cnonce)?;
        }
        if let Some(ref opaque) = self.opaque {
            write!(f, r#", opaque="{opaque}""#)?;
        }
        Ok(())
    }
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", Md5::digest(input.as_bytes()))
}

/// Compute the digest authorization for one request.
///
/// `HA1 = MD5(username:realm:password)`, `HA2 = MD5(method:uri)`, and the
/// response is `MD5(HA1:nonce:nc:cnonce:qop:HA2)` when the challenge carries
/// a qop, else `MD5(HA1:nonce:HA2)`. Deterministic for fixed inputs.
pub fn compute(
    challenge: &AuthChallenge,
    credentials: &Credentials,
    method: &str,
    uri: &str,
    nonce_count: u32,
    cnonce: &str,
) -> DigestAuthorization {
    let nc = format!("{nonce_count:08x}");

    let ha1 = md5_hex(&format!(
        "{}:{}:{}",
        credentials.username,
        challenge.realm,
        credentials.password.expose_secret()
    ));
    let ha2 = md5_hex(&format!("{method}:{uri}"));

    let response = match challenge.qop {
        Some(ref qop) => md5_hex(&format!(
            "{ha1}:{}:{nc}:{cnonce}:{qop}:{ha2}",
            challenge.nonce
        )),
        None => md5_hex(&format!("{ha1}:{}:{ha2}", challenge.nonce)),
    };

    DigestAuthorization {
        username: credentials.username.clone(),
        realm: challenge.realm.clone(),
        nonce: challenge.nonce.clone(),
        uri: uri.to_owned(),
        response,
        qop: challenge.qop.clone(),
        nc,
        cnonce: cnonce.to_owned(),
        opaque: challenge.opaque.clone(),
    }
}

/// A fresh 16-hex-digit client nonce.
pub fn generate_cnonce() -> String {
    format!("{:016x}", rand::thread_rng().r#gen::<u64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge(realm: &str, nonce: &str, qop: Option<&str>) -> AuthChallenge {
        AuthChallenge {
            realm: realm.into(),
            nonce: nonce.into(),
            qop: qop.map(Into::into),
            opaque: None,
        }
    }

    #[test]
    fn rfc2617_reference_vector() {
        let c = challenge(
            "testrealm@host.com",
            "dcd98b7102dd2f0e8b11d0f600bfb0c093",
            Some("auth"),
        );
        let creds = Credentials::new("Mufasa", "Circle Of Life".to_string());
        let d = compute(&c, &creds, "GET", "/dir/index.html", 1, "0a4f113b");
        assert_eq!(d.response, "6629fae49393a05397450978507c4ef1");
        assert_eq!(d.nc, "00000001");
    }

    #[test]
    fn router_vector_changes_with_nonce_count() {
        let c = challenge("domain", "abc123", Some("auth"));
        let creds = Credentials::new("admin", "secret".to_string());

        let first = compute(&c, &creds, "POST", "/jsonrpc", 1, "0123456789abcdef");
        let second = compute(&c, &creds, "POST", "/jsonrpc", 2, "0123456789abcdef");

        assert_eq!(first.response, "d5fb1e8740d50d9702caa4ea9694e62a");
        assert_eq!(second.response, "a3592762c2562728f8f9e3a74f9f8708");
        assert_eq!(second.nc, "00000002");
    }

    #[test]
    fn no_qop_uses_legacy_formula() {
        let c = challenge(
            "testrealm@host.com",
            "dcd98b7102dd2f0e8b11d0f600bfb0c093",
            None,
        );
        let creds = Credentials::new("Mufasa", "Circle Of Life".to_string());
        let d = compute(&c, &creds, "GET", "/dir/index.html", 1, "ignored");
        assert_eq!(d.response, "670fd8c2df070c60b045671b8b24ff02");
        assert!(!d.to_string().contains("qop="));
    }

    #[test]
    fn deterministic_for_fixed_inputs() {
        let c = challenge("domain", "abc123", Some("auth"));
        let creds = Credentials::new("admin", "secret".to_string());
        let a = compute(&c, &creds, "POST", "/jsonrpc", 7, "feedface");
        let b = compute(&c, &creds, "POST", "/jsonrpc", 7, "feedface");
        assert_eq!(a, b);
    }

    #[test]
    fn header_layout() {
        let c = challenge("domain", "abc123", Some("auth"));
        let creds = Credentials::new("admin", "secret".to_string());
        let d = compute(&c, &creds, "POST", "/jsonrpc", 1, "0123456789abcdef");
        assert_eq!(
            d.to_string(),
            "Digest username=\"admin\", realm=\"domain\", nonce=\"abc123\", uri=\"/jsonrpc\", \
             response=\"d5fb1e8740d50d9702caa4ea9694e62a\", qop=auth, nc=00000001, \
             cnonce=\"0123456789abcdef\""
        );
    }

    #[test]
    fn nonce_count_is_lowercase_hex() {
        let c = challenge("domain", "abc123", Some("auth"));
        let creds = Credentials::new("admin", "secret".to_string());
        let d = compute(&c, &creds, "POST", "/jsonrpc", 0xAB, "x");
        assert_eq!(d.nc, "000000ab");
    }

    #[test]
    fn cnonce_is_sixteen_hex_digits() {
        let cnonce = generate_cnonce();
        assert_eq!(cnonce.len(), 16);
        assert!(cnonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(cnonce, generate_cnonce());
    }
}
