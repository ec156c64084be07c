// edgenet-api: Async Rust client for D-Link DIR-series routers (digest login + JSON-RPC)

pub mod auth;
pub mod digest;
pub mod error;
pub mod router;
pub mod rpc;
pub mod session;
pub mod telemetry;
pub mod transport;

pub use auth::{AuthChallenge, AuthState, Credentials};
pub use error::Error;
pub use router::RouterClient;
pub use router::models::{
    BlockOutcome, DhcpLeaseRecord, MacFilterEntry, PortBandwidth, WifiClientRecord,
};
pub use rpc::{RpcCall, RpcResponse, RpcStatus, TableId};
pub use session::Session;
pub use telemetry::TelemetryClient;
pub use transport::{RetryPolicy, TlsMode, TransportConfig};
