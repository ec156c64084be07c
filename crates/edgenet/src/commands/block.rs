//! MAC filter command.

use serde::Serialize;

use edgenet_api::BlockOutcome;
use edgenet_core::MacAddress;

use crate::cli::{BlockArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
struct BlockResult {
    tenant: String,
    mac: MacAddress,
    /// `added` or `already-blocked`.
    result: &'static str,
    /// Envelope status of the write, when one happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<i64>,
}

fn detail(r: &BlockResult) -> String {
    let mut lines = vec![
        format!("Tenant:  {}", r.tenant),
        format!("MAC:     {}", r.mac),
        format!("Result:  {}", output::status(r.result, true)),
    ];
    if r.status == Some(20) {
        lines.push("Note:    router answered status 20; some firmware only applies filter changes from a wired session".into());
    }
    lines.join("\n")
}

pub async fn handle(args: BlockArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mac: MacAddress = args.mac.parse().map_err(|e: edgenet_core::InvalidMac| {
        CliError::Validation {
            field: "mac".into(),
            reason: e.to_string(),
        }
    })?;

    let config = util::load(global)?;
    let mut client = util::connect(&config, &args.target.tenant)?;

    // The filter table stores MACs upper-case.
    let outcome = client
        .block_mac(&mac.to_uppercase(), args.hostname.as_deref())
        .await;
    client.logout();

    let (result, status) = match outcome? {
        BlockOutcome::Added { status } => ("added", Some(status)),
        BlockOutcome::AlreadyBlocked => ("already-blocked", None),
    };
    let report = BlockResult {
        tenant: args.target.tenant,
        mac,
        result,
        status,
    };

    let out = output::render_single(global.output, &report, detail, |r| r.result.to_owned());
    output::print_output(&out, global.quiet);
    Ok(())
}
