// ── Target sources ──

use std::future::Future;

use crate::config::TargetConfig;
use crate::error::CoreError;

/// Supplies the target list. Called once at the start of every cycle;
/// an `Err` aborts that cycle.
pub trait TargetSource: Send + Sync + 'static {
    fn load(&self) -> impl Future<Output = Result<Vec<TargetConfig>, CoreError>> + Send;
}

/// A fixed list of targets.
#[derive(Debug, Clone, Default)]
pub struct StaticTargets(Vec<TargetConfig>);

impl StaticTargets {
    pub fn new(targets: Vec<TargetConfig>) -> Self {
        Self(targets)
    }
}

impl TargetSource for StaticTargets {
    async fn load(&self) -> Result<Vec<TargetConfig>, CoreError> {
        Ok(self.0.clone())
    }
}
