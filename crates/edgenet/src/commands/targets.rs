//! Configured target listing. Never reads or prints passwords.

use serde::Serialize;
use tabled::Tabled;

use edgenet_config::TargetEntry;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

/// What a target entry looks like without its secret.
#[derive(Debug, Serialize)]
struct TargetSummary {
    tenant: String,
    router: String,
    username: String,
    enabled: bool,
    poll_interval_secs: u64,
    /// Where the password is expected to come from.
    credential: String,
}

impl TargetSummary {
    fn new(entry: &TargetEntry, default_interval: u64) -> Self {
        let credential = match (&entry.password_env, &entry.password) {
            (Some(var), _) => format!("env:{var}"),
            (None, Some(_)) => "config".into(),
            (None, None) => "keyring".into(),
        };
        Self {
            tenant: entry.tenant.clone(),
            router: entry.router.clone(),
            username: entry.username.clone(),
            enabled: entry.enabled,
            poll_interval_secs: entry.poll_interval_secs.unwrap_or(default_interval),
            credential,
        }
    }
}

#[derive(Tabled)]
struct TargetRow {
    #[tabled(rename = "Tenant")]
    tenant: String,
    #[tabled(rename = "Router")]
    router: String,
    #[tabled(rename = "User")]
    username: String,
    #[tabled(rename = "Interval")]
    interval: String,
    #[tabled(rename = "Password")]
    credential: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
}

impl From<&TargetSummary> for TargetRow {
    fn from(t: &TargetSummary) -> Self {
        Self {
            tenant: t.tenant.clone(),
            router: t.router.clone(),
            username: t.username.clone(),
            interval: format!("{}s", t.poll_interval_secs),
            credential: t.credential.clone(),
            enabled: output::status(if t.enabled { "yes" } else { "no" }, t.enabled),
        }
    }
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config = util::load(global)?;
    let summaries: Vec<TargetSummary> = config
        .targets
        .iter()
        .map(|t| TargetSummary::new(t, config.poller.interval_secs))
        .collect();

    let out = output::render_list(global.output, &summaries, |x| TargetRow::from(x), |t| {
        t.tenant.clone()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
