// Telemetry HTTP client
//
// Delivers JSON batches to the ingestion endpoint. Separate from the
// router client: no session, just a POST with fixed-delay retry.

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::{Error, preview};
use crate::transport::{RetryPolicy, TransportConfig};

/// Client for the telemetry ingestion endpoint.
#[derive(Clone)]
pub struct TelemetryClient {
    http: reqwest::Client,
    url: Url,
    retry: RetryPolicy,
}

impl TelemetryClient {
    /// `url` is the full ingestion endpoint; the retry policy comes from
    /// `transport`.
    pub fn new(url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            url,
            retry: transport.retry,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// POST one JSON body. Timeouts and connection failures are retried;
    /// a non-2xx status is returned as [`Error::RpcProtocol`] without retry.
    pub async fn post_batch<T: Serialize + Sync>(&self, body: &T) -> Result<(), Error> {
        let resp = self
            .retry
            .run(|attempt| {
                let request = self.http.post(self.url.clone()).json(body);
                async move {
                    debug!(attempt, "posting telemetry batch");
                    request
                        .send()
                        .await
                        .map_err(|e| Error::from_send(e, attempt))
                }
            })
            .await?;
        ensure_success(resp).await
    }

    /// `GET <origin>/health`; `Ok` when the endpoint answers 2xx.
    pub async fn health(&self) -> Result<(), Error> {
        let url = self.url.join("/health")?;
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::from_send(e, 1))?;
        ensure_success(resp).await
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::RpcProtocol {
        status: status.as_u16(),
        body: if body.is_empty() {
            status.canonical_reason().unwrap_or_default().to_owned()
        } else {
            preview(&body)
        },
    })
}
