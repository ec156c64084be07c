// ── File-backed target source ──
//
// Re-reads the configuration at the start of every cycle, so edits to
// `[[targets]]` take effect without a restart.

use std::path::PathBuf;

use edgenet_core::{CoreError, TargetConfig, TargetSource};
use tracing::{debug, warn};

use crate::load_config;

/// Loads targets from the config file (plus environment) each cycle.
#[derive(Debug, Clone, Default)]
pub struct FileTargetSource {
    path: Option<PathBuf>,
}

impl FileTargetSource {
    /// `None` uses the default config path.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    fn load_blocking(path: Option<&std::path::Path>) -> Result<Vec<TargetConfig>, CoreError> {
        let config = load_config(path).map_err(|e| CoreError::TargetLoad {
            message: e.to_string(),
        })?;

        let resolved = config.resolve_targets();
        for (tenant, error) in &resolved.errors {
            warn!(tenant = %tenant, error = %error, "skipping misconfigured target");
        }
        debug!(targets = resolved.targets.len(), "targets loaded");
        Ok(resolved.targets)
    }
}

impl TargetSource for FileTargetSource {
    async fn load(&self) -> Result<Vec<TargetConfig>, CoreError> {
        // File and keyring access block.
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::load_blocking(path.as_deref()))
            .await
            .map_err(|e| CoreError::Internal(format!("target loader panicked: {e}")))?
    }
}
