// ── Device inventory reconciliation ──
//
// Merges the wireless-clients table with the DHCP lease table. The
// wireless table decides which devices exist; DHCP only enriches them.

use std::collections::{HashMap, HashSet};

use edgenet_api::{DhcpLeaseRecord, RouterClient, WifiClientRecord};
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{DeviceRecord, MacAddress, Reconciliation, SkipReason, SkippedRecord};
use crate::normalize;

/// Read both tables from the router and reconcile them.
///
/// The two reads run sequentially on the same session. An empty wireless
/// table is not an error.
pub async fn fetch_devices(client: &mut RouterClient) -> Result<Reconciliation, CoreError> {
    let wifi = client.wifi_clients().await?;
    let leases = client.dhcp_leases().await?;

    let result = reconcile(&wifi, &leases);

    if wifi.is_empty() {
        info!(router = %client.base_url(), "no wireless clients reported");
    }
    if !result.skipped.is_empty() {
        warn!(
            router = %client.base_url(),
            skipped = result.skipped.len(),
            "dropped wireless records with missing, invalid or duplicate MACs"
        );
    }
    debug!(
        devices = result.devices.len(),
        leases = leases.len(),
        dhcp_only = result.dhcp_only,
        "inventory reconciled"
    );
    Ok(result)
}

/// Merge wireless clients with DHCP leases.
///
/// Emits one record per unique valid wireless MAC, in table order. DHCP
/// values replace wireless values for the same field when present.
/// Leases without a wireless counterpart are counted but not emitted.
pub fn reconcile(wifi: &[WifiClientRecord], leases: &[DhcpLeaseRecord]) -> Reconciliation {
    let mut by_mac: HashMap<MacAddress, &DhcpLeaseRecord> = HashMap::with_capacity(leases.len());
    for lease in leases {
        match lease.mac.as_deref().map(str::parse::<MacAddress>) {
            Some(Ok(mac)) => {
                by_mac.entry(mac).or_insert(lease);
            }
            Some(Err(e)) => debug!(error = %e, "ignoring DHCP lease"),
            None => debug!("ignoring DHCP lease without MAC"),
        }
    }

    let mut out = Reconciliation::default();
    let mut seen: HashSet<MacAddress> = HashSet::with_capacity(wifi.len());

    for (index, client) in wifi.iter().enumerate() {
        let mac = match client.mac.as_deref().map(str::parse::<MacAddress>) {
            Some(Ok(mac)) => mac,
            Some(Err(e)) => {
                debug!(index, error = %e, "skipping wireless record");
                out.skipped.push(SkippedRecord {
                    index,
                    reason: SkipReason::InvalidMac(e.input),
                });
                continue;
            }
            None => {
                out.skipped.push(SkippedRecord {
                    index,
                    reason: SkipReason::MissingMac,
                });
                continue;
            }
        };

        if !seen.insert(mac.clone()) {
            out.skipped.push(SkippedRecord {
                index,
                reason: SkipReason::DuplicateMac(mac),
            });
            continue;
        }

        let lease = by_mac.get(&mac).copied();
        out.devices.push(merge(mac, client, lease));
    }

    out.dhcp_only = by_mac.keys().filter(|mac| !seen.contains(*mac)).count();
    out
}

fn merge(mac: MacAddress, wifi: &WifiClientRecord, lease: Option<&DhcpLeaseRecord>) -> DeviceRecord {
    let online_seconds = normalize::unsigned(wifi.online.as_ref()).unwrap_or(0);

    let mut record = DeviceRecord {
        mac,
        hostname: non_empty(wifi.hostname.as_deref()),
        ip: non_empty(wifi.ip.as_deref()),
        ssid: non_empty(wifi.ssid.as_deref()),
        band: non_empty(wifi.band.as_deref()),
        wireless_mode: normalize::wireless_mode(wifi.mode.as_deref()),
        signal: normalize::signal(wifi.rssi.as_ref()),
        online_minutes: normalize::minutes(online_seconds),
        online_seconds,
        last_tx_rate: normalize::unsigned(wifi.last_tx_rate.as_ref()),
        rx_bytes: normalize::byte_counter(wifi.rx_bytes.as_ref()),
        tx_bytes: normalize::byte_counter(wifi.tx_bytes.as_ref()),
        power_saving: wifi.sleep.unwrap_or(false),
        vendor_id: None,
        lease_remaining_secs: None,
    };

    if let Some(lease) = lease {
        if let Some(hostname) = non_empty(lease.hostname.as_deref()) {
            record.hostname = Some(hostname);
        }
        if let Some(ip) = non_empty(lease.ip.as_deref()) {
            record.ip = Some(ip);
        }
        record.vendor_id = non_empty(lease.vendor_id.as_deref());
        record.lease_remaining_secs = normalize::unsigned(lease.lease.as_ref());
    }

    record
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn wifi(value: serde_json::Value) -> WifiClientRecord {
        serde_json::from_value(value).unwrap()
    }

    fn lease(value: serde_json::Value) -> DhcpLeaseRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn reference_record_merges_as_documented() {
        let wifi = vec![wifi(json!({
            "mac": "D8:80:83:CB:5F:13",
            "online": 67,
            "SSID": "NET1",
            "mode": "11n",
            "rssi": 74,
            "lastTxRate": 300,
            "tx_bytes": 87585,
            "rx_bytes": 114475,
            "sleep": false,
            "hostname": null,
            "ip": null
        }))];
        let leases = vec![lease(json!({
            "MACAddress": "d8:80:83:cb:5f:13",
            "hostname": "Host1",
            "ip": "192.168.0.180"
        }))];

        let out = reconcile(&wifi, &leases);
        assert_eq!(out.devices.len(), 1);

        let expected = json!({
            "mac": "d8:80:83:cb:5f:13",
            "hostname": "Host1",
            "ip": "192.168.0.180",
            "ssid": "NET1",
            "band": null,
            "wireless_mode": "802.11n",
            "signal": 74,
            "online_minutes": 1,
            "last_tx_rate": 300,
            "rx_bytes": 114475,
            "tx_bytes": 87585,
            "power_saving": false
        });
        assert_eq!(serde_json::to_value(&out.devices[0]).unwrap(), expected);
        assert_eq!(out.devices[0].online_seconds, 67);
    }

    #[test]
    fn dhcp_wins_on_conflicting_fields() {
        let wifi = vec![wifi(json!({
            "mac": "aa:bb:cc:dd:ee:ff",
            "hostname": "from-wifi",
            "ip": "10.0.0.1"
        }))];
        let leases = vec![lease(json!({
            "MACAddress": "AA-BB-CC-DD-EE-FF",
            "hostname": "from-dhcp",
            "ip": "10.0.0.2",
            "vendorid": "android-dhcp-13",
            "lease": "3600"
        }))];

        let device = &reconcile(&wifi, &leases).devices[0];
        assert_eq!(device.hostname.as_deref(), Some("from-dhcp"));
        assert_eq!(device.ip.as_deref(), Some("10.0.0.2"));
        assert_eq!(device.vendor_id.as_deref(), Some("android-dhcp-13"));
        assert_eq!(device.lease_remaining_secs, Some(3600));
    }

    #[test]
    fn wifi_values_survive_when_dhcp_lacks_them() {
        let wifi = vec![wifi(json!({ "mac": "aa:bb:cc:dd:ee:ff", "hostname": "tv", "ip": "10.0.0.9" }))];
        let leases = vec![lease(json!({ "MACAddress": "aa:bb:cc:dd:ee:ff", "hostname": "" }))];

        let device = &reconcile(&wifi, &leases).devices[0];
        assert_eq!(device.hostname.as_deref(), Some("tv"));
        assert_eq!(device.ip.as_deref(), Some("10.0.0.9"));
    }

    #[test]
    fn dhcp_only_devices_are_dropped() {
        let wifi = vec![wifi(json!({ "mac": "aa:bb:cc:dd:ee:01" }))];
        let leases = vec![
            lease(json!({ "MACAddress": "aa:bb:cc:dd:ee:01" })),
            lease(json!({ "MACAddress": "aa:bb:cc:dd:ee:02", "hostname": "wired-pc" })),
        ];

        let out = reconcile(&wifi, &leases);
        assert_eq!(out.devices.len(), 1);
        assert_eq!(out.devices[0].mac.as_str(), "aa:bb:cc:dd:ee:01");
        assert_eq!(out.dhcp_only, 1);
    }

    #[test]
    fn invalid_and_duplicate_macs_are_skipped_in_order() {
        let wifi = vec![
            wifi(json!({ "mac": "aa:bb:cc:dd:ee:01", "SSID": "first" })),
            wifi(json!({ "mac": "not-a-mac" })),
            wifi(json!({ "SSID": "no mac" })),
            wifi(json!({ "mac": "AA:BB:CC:DD:EE:01", "SSID": "second" })),
            wifi(json!({ "mac": "aa:bb:cc:dd:ee:02" })),
        ];

        let out = reconcile(&wifi, &[]);
        let macs: Vec<&str> = out.devices.iter().map(|d| d.mac.as_str()).collect();
        assert_eq!(macs, vec!["aa:bb:cc:dd:ee:01", "aa:bb:cc:dd:ee:02"]);
        assert_eq!(out.devices[0].ssid.as_deref(), Some("first"));

        let reasons: Vec<(usize, &SkipReason)> =
            out.skipped.iter().map(|s| (s.index, &s.reason)).collect();
        assert_eq!(reasons.len(), 3);
        assert_eq!(reasons[0], (1, &SkipReason::InvalidMac("not-a-mac".into())));
        assert_eq!(reasons[1], (2, &SkipReason::MissingMac));
        assert!(matches!(reasons[2], (3, SkipReason::DuplicateMac(_))));
    }

    #[test]
    fn padded_macs_are_skipped() {
        let wifi = vec![
            wifi(json!({ "mac": " aa:bb:cc:dd:ee:01" })),
            wifi(json!({ "mac": "aa:bb:cc:dd:ee:02" })),
        ];

        let out = reconcile(&wifi, &[]);
        assert_eq!(out.devices.len(), 1);
        assert_eq!(out.devices[0].mac.as_str(), "aa:bb:cc:dd:ee:02");
        assert_eq!(
            out.skipped[0].reason,
            SkipReason::InvalidMac(" aa:bb:cc:dd:ee:01".into())
        );
    }

    #[test]
    fn empty_inputs_yield_empty_result() {
        let out = reconcile(&[], &[lease(json!({ "MACAddress": "aa:bb:cc:dd:ee:ff" }))]);
        assert!(out.is_empty());
        assert!(out.skipped.is_empty());
        assert_eq!(out.dhcp_only, 1);
    }

    #[test]
    fn order_follows_wireless_table() {
        let wifi = vec![
            wifi(json!({ "mac": "aa:bb:cc:dd:ee:03" })),
            wifi(json!({ "mac": "aa:bb:cc:dd:ee:01" })),
            wifi(json!({ "mac": "aa:bb:cc:dd:ee:02" })),
        ];
        let leases = vec![
            lease(json!({ "MACAddress": "aa:bb:cc:dd:ee:01" })),
            lease(json!({ "MACAddress": "aa:bb:cc:dd:ee:02" })),
            lease(json!({ "MACAddress": "aa:bb:cc:dd:ee:03" })),
        ];
        let macs: Vec<String> = reconcile(&wifi, &leases)
            .devices
            .iter()
            .map(|d| d.mac.to_string())
            .collect();
        assert_eq!(macs, ["aa:bb:cc:dd:ee:03", "aa:bb:cc:dd:ee:01", "aa:bb:cc:dd:ee:02"]);
    }
}
