// Router table operations
//
// Typed reads of the wireless, DHCP, MAC-filter and WAN bandwidth tables,
// plus the two writes the admin UI exposes (MAC block, bandwidth limits).

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::router::client::RouterClient;
use crate::router::models::{
    BlockOutcome, DhcpLeaseRecord, MacFilterEntry, PortBandwidth, WifiClientRecord,
};
use crate::rpc::{RpcCall, RpcResponse, RpcStatus, TableId};

impl RouterClient {
    // ── Reads ────────────────────────────────────────────────────────

    /// Read a table and deserialize `result.data` into rows.
    ///
    /// A missing or `null` data member yields an empty list; a single
    /// object is treated as a one-row table.
    pub async fn read_table<T: DeserializeOwned>(&mut self, table: TableId) -> Result<Vec<T>, Error> {
        let resp = self.checked_call(&RpcCall::read(table)).await?;
        match resp.data() {
            Some(data) => rows(data),
            None => {
                debug!(%table, "table read returned no data member");
                Ok(Vec::new())
            }
        }
    }

    /// Currently associated wireless clients.
    pub async fn wifi_clients(&mut self) -> Result<Vec<WifiClientRecord>, Error> {
        let clients: Vec<WifiClientRecord> = self.read_table(TableId::WifiClients).await?;
        debug!(count = clients.len(), "wireless clients read");
        Ok(clients)
    }

    /// Active DHCP leases.
    pub async fn dhcp_leases(&mut self) -> Result<Vec<DhcpLeaseRecord>, Error> {
        let leases: Vec<DhcpLeaseRecord> = self.read_table(TableId::DhcpLeases).await?;
        debug!(count = leases.len(), "dhcp leases read");
        Ok(leases)
    }

    /// MAC-filter entries. The firmware nests them under `MacFilterList`,
    /// either in `result` or in `result.data`.
    pub async fn mac_filters(&mut self) -> Result<Vec<MacFilterEntry>, Error> {
        let resp = self.checked_call(&RpcCall::read(TableId::MacFilter)).await?;
        let list = resp
            .result
            .as_ref()
            .and_then(|r| r.get("MacFilterList"))
            .or_else(|| resp.data().and_then(|d| d.get("MacFilterList")));
        match list {
            Some(list) => rows(list),
            None => Ok(Vec::new()),
        }
    }

    /// Whether `mac` is already in the filter list (case-insensitive).
    pub async fn is_mac_blocked(&mut self, mac: &str) -> Result<bool, Error> {
        let filters = self.mac_filters().await?;
        Ok(filters.iter().any(|f| f.mac.eq_ignore_ascii_case(mac)))
    }

    /// Raw WAN bandwidth table.
    pub async fn qos_settings(&mut self) -> Result<Value, Error> {
        let resp = self.checked_call(&RpcCall::read(TableId::WanBandwidth)).await?;
        Ok(resp.data().cloned().unwrap_or(Value::Null))
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Add `mac` to the MAC filter, unless it is already there.
    ///
    /// Status 20 is accepted but logged: some firmware builds only apply
    /// filter changes made from a wired session.
    pub async fn block_mac(&mut self, mac: &str, hostname: Option<&str>) -> Result<BlockOutcome, Error> {
        if self.is_mac_blocked(mac).await? {
            info!(mac, "MAC already blocked");
            return Ok(BlockOutcome::AlreadyBlocked);
        }

        let call = RpcCall::Write {
            table: TableId::MacFilter,
            data: json!({
                "MacFilterList": {
                    "mac": mac,
                    "hostname": hostname.unwrap_or_default(),
                    "active": true,
                }
            }),
            save: true,
            pos: Some(-1),
        };
        let resp = self.checked_call(&call).await?;
        let status = resp.status_code();
        if resp.status() == RpcStatus::Ambiguous {
            warn!(mac, status, "router returned status 20; the block may require a wired session");
        } else {
            info!(mac, "MAC added to filter");
        }
        Ok(BlockOutcome::Added { status })
    }

    /// Write per-port bandwidth limits (kbit/s, `-1` for unlimited).
    /// Returns the envelope status code.
    pub async fn set_bandwidth_limits(
        &mut self,
        ports: &BTreeMap<String, PortBandwidth>,
    ) -> Result<i64, Error> {
        let call = RpcCall::Write {
            table: TableId::WanBandwidth,
            data: json!(ports),
            save: true,
            pos: None,
        };
        let resp = self.checked_call(&call).await?;
        info!(ports = ports.len(), "bandwidth limits written");
        Ok(resp.status_code())
    }

    /// [`call`](Self::call), failing on envelope statuses other than 0 and 20.
    async fn checked_call(&mut self, call: &RpcCall) -> Result<RpcResponse, Error> {
        let resp = self.call(call).await?;
        if let RpcStatus::Failed(code) = resp.status() {
            warn!(table = %call.table(), method = call.method(), code, "router returned failure status");
            return Err(Error::RpcStatus { code });
        }
        Ok(resp)
    }
}

/// Deserialize a table payload: array of rows, single object, or null.
fn rows<T: DeserializeOwned>(value: &Value) -> Result<Vec<T>, Error> {
    let parsed = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(_) => Vec::<T>::deserialize(value),
        _ => T::deserialize(value).map(|row| vec![row]),
    };
    parsed.map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: value.to_string(),
    })
}
