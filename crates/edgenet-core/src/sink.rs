// ── Telemetry sinks ──
//
// Where reconciled batches go. The poller only needs `deliver`; retry
// and durability are the sink's business.

use std::future::Future;

use chrono::{DateTime, Utc};
use edgenet_api::TelemetryClient;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::DeviceRecord;

/// One tenant's devices at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceBatch {
    pub tenant_id: String,
    pub timestamp: DateTime<Utc>,
    pub devices: Vec<DeviceRecord>,
}

impl DeviceBatch {
    /// Batch stamped with the current time.
    pub fn new(tenant_id: impl Into<String>, devices: Vec<DeviceRecord>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            timestamp: Utc::now(),
            devices,
        }
    }
}

/// Receiver of device batches.
///
/// Implementations must be shareable across the poller's worker tasks.
pub trait TelemetrySink: Send + Sync + 'static {
    fn deliver(&self, batch: &DeviceBatch) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Posts batches as JSON to the telemetry endpoint.
#[derive(Clone)]
pub struct HttpSink {
    client: TelemetryClient,
}

impl HttpSink {
    pub fn new(client: TelemetryClient) -> Self {
        Self { client }
    }
}

impl TelemetrySink for HttpSink {
    async fn deliver(&self, batch: &DeviceBatch) -> Result<(), CoreError> {
        self.client
            .post_batch(batch)
            .await
            .map_err(|e| CoreError::Sink {
                message: e.to_string(),
            })?;
        debug!(tenant = %batch.tenant_id, devices = batch.devices.len(), "batch delivered");
        Ok(())
    }
}

/// Logs batches instead of sending them (dry runs).
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    async fn deliver(&self, batch: &DeviceBatch) -> Result<(), CoreError> {
        info!(
            tenant = %batch.tenant_id,
            timestamp = %batch.timestamp,
            devices = batch.devices.len(),
            "dry run: batch not sent"
        );
        for device in &batch.devices {
            debug!(tenant = %batch.tenant_id, mac = %device.mac, hostname = ?device.hostname, ip = ?device.ip, "device");
        }
        Ok(())
    }
}
