// JSON-RPC envelope types
//
// Requests are tagged by operation and table so the wire shape
// `{jsonrpc, method, params: {id, ...}, id}` is produced from typed data.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Router table identifiers (DIR-615 firmware constants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableId {
    WifiClients,
    DhcpLeases,
    MacFilter,
    WanBandwidth,
    /// Any other table, for ad-hoc reads.
    Other(u32),
}

impl TableId {
    pub fn id(self) -> u32 {
        match self {
            Self::WifiClients => 64,
            Self::DhcpLeases => 34,
            Self::MacFilter => 42,
            Self::WanBandwidth => 230,
            Self::Other(id) => id,
        }
    }
}

impl From<u32> for TableId {
    fn from(id: u32) -> Self {
        match id {
            64 => Self::WifiClients,
            34 => Self::DhcpLeases,
            42 => Self::MacFilter,
            230 => Self::WanBandwidth,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// One RPC operation against a table.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcCall {
    Read {
        table: TableId,
    },
    Write {
        table: TableId,
        data: Value,
        save: bool,
        /// Insert position for list tables (`-1` appends).
        pos: Option<i64>,
    },
}

impl RpcCall {
    pub fn read(table: TableId) -> Self {
        Self::Read { table }
    }

    pub fn method(&self) -> &'static str {
        match self {
            Self::Read { .. } => "read",
            Self::Write { .. } => "write",
        }
    }

    pub fn table(&self) -> TableId {
        match self {
            Self::Read { table } | Self::Write { table, .. } => *table,
        }
    }

    fn params(&self) -> Value {
        match self {
            Self::Read { table } => json!({ "id": table.id() }),
            Self::Write {
                table,
                data,
                save,
                pos,
            } => {
                let mut params = json!({ "id": table.id(), "data": data, "save": save });
                if let (Some(pos), Some(obj)) = (pos, params.as_object_mut()) {
                    obj.insert("pos".into(), json!(pos));
                }
                params
            }
        }
    }
}

/// Wire form of a JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: Value,
    pub id: u64,
}

impl RpcRequest {
    pub fn new(call: &RpcCall, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: call.method(),
            params: call.params(),
            id,
        }
    }
}

/// Interpretation of the envelope status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcStatus {
    Ok,
    /// Code 20. Seen on successful reads and some writes; its meaning is
    /// undocumented, so it is not treated as a failure.
    Ambiguous,
    Failed(i64),
}

impl RpcStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Ok,
            20 => Self::Ambiguous,
            other => Self::Failed(other),
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// JSON-RPC `error` member, when present.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Parsed RPC envelope. Callers inspect `result` and [`status`](Self::status).
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    /// Status code from `result.status`, then `error.code`; absent means 0.
    pub fn status_code(&self) -> i64 {
        self.result
            .as_ref()
            .and_then(|r| r.get("status"))
            .and_then(Value::as_i64)
            .or_else(|| self.error.as_ref().and_then(|e| e.code))
            .unwrap_or(0)
    }

    pub fn status(&self) -> RpcStatus {
        RpcStatus::from_code(self.status_code())
    }

    /// The `result.data` member of a table read.
    pub fn data(&self) -> Option<&Value> {
        self.result.as_ref().and_then(|r| r.get("data"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn read_request_wire_shape() {
        let req = RpcRequest::new(&RpcCall::read(TableId::WifiClients), 7);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "jsonrpc": "2.0", "method": "read", "params": { "id": 64 }, "id": 7 })
        );
    }

    #[test]
    fn write_request_includes_pos_only_when_set() {
        let call = RpcCall::Write {
            table: TableId::MacFilter,
            data: json!({ "MacFilterList": { "mac": "aa:bb:cc:dd:ee:ff" } }),
            save: true,
            pos: Some(-1),
        };
        let v = serde_json::to_value(RpcRequest::new(&call, 1)).unwrap();
        assert_eq!(v["method"], "write");
        assert_eq!(v["params"]["id"], 42);
        assert_eq!(v["params"]["pos"], -1);
        assert_eq!(v["params"]["save"], true);

        let call = RpcCall::Write {
            table: TableId::WanBandwidth,
            data: json!({}),
            save: true,
            pos: None,
        };
        let v = serde_json::to_value(RpcRequest::new(&call, 1)).unwrap();
        assert!(v["params"].get("pos").is_none());
    }

    #[test]
    fn status_twenty_is_not_a_failure() {
        let resp: RpcResponse =
            serde_json::from_value(json!({ "result": { "status": 20, "data": [] } })).unwrap();
        assert_eq!(resp.status(), RpcStatus::Ambiguous);
        assert!(!resp.status().is_failure());
    }

    #[test]
    fn status_defaults_to_ok_and_reads_error_code() {
        let ok: RpcResponse = serde_json::from_value(json!({ "result": { "data": [] } })).unwrap();
        assert_eq!(ok.status(), RpcStatus::Ok);

        let err: RpcResponse =
            serde_json::from_value(json!({ "error": { "code": 3, "message": "denied" } }))
                .unwrap();
        assert_eq!(err.status(), RpcStatus::Failed(3));
    }

    #[test]
    fn table_ids_round_trip_known_constants() {
        for table in [
            TableId::WifiClients,
            TableId::DhcpLeases,
            TableId::MacFilter,
            TableId::WanBandwidth,
        ] {
            assert_eq!(TableId::from(table.id()), table);
        }
        assert_eq!(TableId::from(150), TableId::Other(150));
    }
}
