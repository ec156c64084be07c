// Router digest login
//
// Two-step handshake: an unauthenticated probe of `/devinfo?need_auth=1`
// returns 401 with an `anweb-authenticate` challenge, then a digest-signed
// read of the wireless table on `/jsonrpc` confirms the credentials.
// Session cookies and the authorization header live in `Session`.

use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::auth::{AuthChallenge, CHALLENGE_HEADER, PROBE_PATH, RPC_PATH};
use crate::digest;
use crate::error::{Error, preview};
use crate::router::client::RouterClient;
use crate::rpc::{RpcCall, RpcRequest, TableId};

/// Cookie names the admin UI sets after a successful login.
const USER_LOGIN_COOKIE: &str = "user_login";
const DEVICE_MODE_COOKIE: &str = "device_mode";

impl RouterClient {
    /// Run the digest handshake and establish an authenticated session.
    ///
    /// Any previous session is discarded first. The nonce count carries
    /// over, so the signed `nc` value keeps increasing across logins.
    /// On failure the session is left in the `Failed` state.
    pub async fn login(&mut self) -> Result<(), Error> {
        let result = self.negotiate().await;
        if let Err(e) = &result {
            if e.is_auth() {
                warn!(router = %self.base_url(), error = %e, "router rejected login");
            } else {
                debug!(router = %self.base_url(), error = %e, "router login did not complete");
            }
            self.session_mut().mark_failed();
        }
        result
    }

    /// Forget the session locally. The firmware has no logout endpoint;
    /// the next call logs in again.
    pub fn logout(&mut self) {
        if self.session().is_authenticated() {
            debug!(router = %self.base_url(), "dropping router session");
        }
        self.session_mut().reset();
    }

    async fn negotiate(&mut self) -> Result<(), Error> {
        self.session_mut().reset();

        let challenge = self.request_challenge().await?;
        debug!(realm = %challenge.realm, qop = ?challenge.qop, "auth challenge received");

        let nonce_count = self.session_mut().next_nonce_count();
        let authorization = digest::compute(
            &challenge,
            self.credentials(),
            "POST",
            RPC_PATH,
            nonce_count,
            &digest::generate_cnonce(),
        );
        self.session_mut().set_challenge(challenge);
        self.session_mut().set_authorization(&authorization);

        // Reading the wireless table is the cheapest authenticated call.
        let request = RpcRequest::new(&RpcCall::read(TableId::WifiClients), self.next_request_id());
        let url = self.url(RPC_PATH)?;
        let resp = self
            .authorized(self.http().post(url).json(&request))
            .send()
            .await
            .map_err(|e| Error::from_send(e, 1))?;

        match resp.status() {
            StatusCode::OK => {
                let username = self.credentials().username.clone();
                let session = self.session_mut();
                session.set_cookie(USER_LOGIN_COOKIE, username);
                session.set_cookie(DEVICE_MODE_COOKIE, "router");
                session.mark_authenticated();
                info!(router = %self.base_url(), nc = nonce_count, "router login successful");
                Ok(())
            }
            StatusCode::UNAUTHORIZED => Err(Error::AuthRejected),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(Error::RpcProtocol {
                    status: status.as_u16(),
                    body: preview(&body),
                })
            }
        }
    }

    /// Probe for a challenge and keep any cookies the probe sets.
    async fn request_challenge(&mut self) -> Result<AuthChallenge, Error> {
        let mut url = self.url(PROBE_PATH)?;
        url.query_pairs_mut().append_pair("need_auth", "1");

        debug!(%url, "requesting auth challenge");

        let resp = self
            .http()
            .get(url)
            .send()
            .await
            .map_err(|e| Error::from_send(e, 1))?;

        let status = resp.status();
        if status != StatusCode::UNAUTHORIZED {
            return Err(Error::ChallengeMissing {
                reason: format!("probe returned HTTP {status}, expected 401"),
            });
        }

        let header = resp
            .headers()
            .get(CHALLENGE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::ChallengeMissing {
                reason: format!("no `{CHALLENGE_HEADER}` header on probe response"),
            })?;
        let challenge = AuthChallenge::parse(header)?;

        let cookies: Vec<(String, String)> = resp
            .cookies()
            .map(|c| (c.name().to_owned(), c.value().to_owned()))
            .collect();
        for (name, value) in cookies {
            debug!(cookie = %name, "session cookie set by probe");
            self.session_mut().set_cookie(name, value);
        }

        Ok(challenge)
    }
}
