// ── Domain model ──

mod device;
mod mac;

pub use device::{DeviceRecord, Reconciliation, SkipReason, SkippedRecord};
pub use mac::{InvalidMac, MacAddress};
