// edgenet-core: Device inventory reconciliation and multi-target polling on top of edgenet-api.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod poller;
pub mod reconcile;
pub mod sink;
pub mod source;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{PollerConfig, TargetConfig, router_url};
pub use error::CoreError;
pub use model::{DeviceRecord, InvalidMac, MacAddress, Reconciliation, SkipReason, SkippedRecord};
pub use poller::{CycleOutcome, CycleReport, Poller, TargetOutcome, TargetReport};
pub use reconcile::{fetch_devices, reconcile};
pub use sink::{DeviceBatch, HttpSink, LogSink, TelemetrySink};
pub use source::{StaticTargets, TargetSource};
