//! Shared helpers for command handlers.

use edgenet_api::RouterClient;
use edgenet_config::Config;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load the config named by `--config` (or the default location).
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(edgenet_config::load_config(global.config.as_deref())?)
}

/// Build a client for one tenant's router. The session starts on the
/// first request.
pub fn connect(config: &Config, tenant: &str) -> Result<RouterClient, CliError> {
    let entry = config.target(tenant)?;
    let target = config.resolve_target(entry)?;
    tracing::debug!(tenant, router = %target.router, "connecting");
    Ok(RouterClient::new(
        target.router,
        target.credentials,
        &config.router_transport(),
    )?)
}
