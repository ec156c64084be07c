// Router HTTP client
//
// Wraps `reqwest::Client` with the router's URL layout, session headers,
// and the sessioned RPC contract: login on demand, one re-login on 401,
// fixed-delay retry on transport failures. Table operations live in
// `tables.rs` and the handshake in `auth.rs` as inherent methods.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, COOKIE, HeaderMap, HeaderValue, ORIGIN, REFERER};
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::{Credentials, RPC_PATH};
use crate::error::{Error, preview};
use crate::rpc::{RpcCall, RpcRequest, RpcResponse};
use crate::session::Session;
use crate::transport::{RetryPolicy, TransportConfig};

/// Client for one router's admin interface.
///
/// Owns its [`Session`] exclusively; every operation that may touch the
/// session takes `&mut self`, so a client is driven by one task at a time.
pub struct RouterClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    retry: RetryPolicy,
    session: Session,
    next_id: u64,
}

impl RouterClient {
    /// Create a client for the router at `base_url` (e.g. `http://192.168.0.1`).
    ///
    /// No network traffic happens until the first [`login`](Self::login)
    /// or [`call`](Self::call).
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let origin = base_url.as_str().trim_end_matches('/').to_owned();
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&origin) {
            headers.insert(ORIGIN, value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("{origin}/admin/index.html")) {
            headers.insert(REFERER, value);
        }
        let http = transport.build_client_with_headers(headers)?;

        Ok(Self {
            http,
            base_url,
            credentials,
            retry: transport.retry,
            session: Session::new(),
            next_id: 1,
        })
    }

    /// The router base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Read-only view of the session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    pub(crate) fn next_request_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Attach the session's authorization and cookies to a request.
    pub(crate) fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut builder = builder;
        if let Some(auth) = self.session.authorization() {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if let Some(cookies) = self.session.cookie_header() {
            builder = builder.header(COOKIE, cookies);
        }
        builder
    }

    // ── Sessioned RPC ────────────────────────────────────────────────

    /// Issue one JSON-RPC call and return the parsed envelope.
    ///
    /// Logs in first when the session is not authenticated. A 401 triggers
    /// exactly one re-login and one resend; a second 401 is
    /// [`Error::SessionExpired`]. Timeouts and connection failures are
    /// retried per the transport's [`RetryPolicy`], independently of the
    /// 401 path. Any other non-200 status is [`Error::RpcProtocol`].
    ///
    /// The envelope status is not checked here; see [`RpcResponse::status`].
    pub async fn call(&mut self, call: &RpcCall) -> Result<RpcResponse, Error> {
        if !self.session.is_authenticated() {
            debug!("session not authenticated, logging in");
            self.login().await?;
        }

        let request = RpcRequest::new(call, self.next_request_id());
        let mut resp = self.send_rpc(&request).await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            warn!(table = %call.table(), "session rejected (401), re-authenticating");
            self.session.reset();
            self.login().await?;

            resp = self.send_rpc(&request).await?;
            if resp.status() == StatusCode::UNAUTHORIZED {
                self.session.mark_failed();
                return Err(Error::SessionExpired);
            }
        }

        parse_rpc(resp).await
    }

    /// POST one request to the RPC endpoint with transport retry.
    /// Returns the response whatever its HTTP status.
    async fn send_rpc(&self, request: &RpcRequest) -> Result<reqwest::Response, Error> {
        let url = self.url(RPC_PATH)?;
        self.retry
            .run(|attempt| {
                let builder = self.authorized(self.http.post(url.clone()).json(request));
                async move {
                    trace!(attempt, method = request.method, id = request.id, "POST /jsonrpc");
                    builder
                        .send()
                        .await
                        .map_err(|e| Error::from_send(e, attempt))
                }
            })
            .await
    }
}

/// Turn a 200 response into an envelope; anything else is a protocol error.
pub(crate) async fn parse_rpc(resp: reqwest::Response) -> Result<RpcResponse, Error> {
    let status = resp.status();
    if status != StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::RpcProtocol {
            status: status.as_u16(),
            body: preview(&body),
        });
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body,
    })
}
