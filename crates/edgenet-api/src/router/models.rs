// Router table record types
//
// Raw rows as the firmware returns them. Field presence and types vary
// between firmware builds: counters arrive as numbers or strings, so
// those stay as `serde_json::Value` and are normalized downstream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of the wireless-clients table (id 64).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WifiClientRecord {
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub band: Option<String>,
    #[serde(default, rename = "SSID")]
    pub ssid: Option<String>,
    /// Wireless mode token, e.g. `11n`.
    #[serde(default)]
    pub mode: Option<String>,
    /// Signal indicator, already a percentage on this firmware.
    #[serde(default)]
    pub rssi: Option<Value>,
    #[serde(default, rename = "lastTxRate")]
    pub last_tx_rate: Option<Value>,
    #[serde(default)]
    pub rx_bytes: Option<Value>,
    #[serde(default)]
    pub tx_bytes: Option<Value>,
    /// Seconds since association.
    #[serde(default)]
    pub online: Option<Value>,
    /// Power-save flag.
    #[serde(default)]
    pub sleep: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One row of the DHCP-leases table (id 34).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DhcpLeaseRecord {
    #[serde(default, rename = "MACAddress")]
    pub mac: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    /// Remaining lease seconds.
    #[serde(default)]
    pub lease: Option<Value>,
    #[serde(default, rename = "vendorid")]
    pub vendor_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Entry of the MAC-filter table (id 42).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacFilterEntry {
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub active: bool,
}

/// Per-port bandwidth limits for the WAN bandwidth table (id 230).
/// Values are kbit/s; `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBandwidth {
    pub max_bandwidth: i64,
    pub ingress_bandwidth: i64,
    pub egress_bandwidth: i64,
}

/// Result of a MAC-filter write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// The entry was written. `status` is the envelope status (0 or 20).
    Added { status: i64 },
    /// The MAC was already in the filter list; nothing was written.
    AlreadyBlocked,
}
