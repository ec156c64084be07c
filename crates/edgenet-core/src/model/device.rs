// ── Canonical device record ──
//
// One physical wireless client, merged from the wireless-clients table
// and the DHCP lease table. Serialized as-is into telemetry batches.

use serde::{Deserialize, Serialize};

use super::MacAddress;

/// Canonical per-device record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub mac: MacAddress,
    pub hostname: Option<String>,
    pub ip: Option<String>,
    pub ssid: Option<String>,
    pub band: Option<String>,
    /// `802.11x` family name.
    pub wireless_mode: Option<String>,
    /// 0..=100, absent when the router reports nothing numeric.
    pub signal: Option<u8>,
    pub online_minutes: u64,
    /// Raw association time; not part of the wire schema.
    #[serde(skip)]
    pub online_seconds: u64,
    /// Mbit/s.
    pub last_tx_rate: Option<u64>,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub power_saving: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_remaining_secs: Option<u64>,
}

/// Why a wireless record produced no device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingMac,
    InvalidMac(String),
    /// Second and later rows for a MAC already emitted this cycle.
    DuplicateMac(MacAddress),
}

/// A wireless record that was dropped, with its position in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: SkipReason,
}

/// Output of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// One record per unique valid wireless MAC, in table order.
    pub devices: Vec<DeviceRecord>,
    pub skipped: Vec<SkippedRecord>,
    /// DHCP leases with no wireless counterpart (dropped, counted only).
    pub dhcp_only: usize,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
