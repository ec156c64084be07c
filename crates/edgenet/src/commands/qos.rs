//! WAN bandwidth (QoS) commands.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use edgenet_api::PortBandwidth;

use crate::cli::{GlobalOpts, OutputFormat, QosArgs, QosCommand, QosSetArgs, TenantArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
struct PortLimits {
    port: String,
    #[serde(flatten)]
    limits: PortBandwidth,
}

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Ingress")]
    ingress: String,
    #[tabled(rename = "Egress")]
    egress: String,
}

fn kbps(value: i64) -> String {
    if value < 0 {
        "unlimited".into()
    } else {
        format!("{value} kbit/s")
    }
}

impl From<&PortLimits> for PortRow {
    fn from(p: &PortLimits) -> Self {
        Self {
            port: p.port.clone(),
            max: kbps(p.limits.max_bandwidth),
            ingress: kbps(p.limits.ingress_bandwidth),
            egress: kbps(p.limits.egress_bandwidth),
        }
    }
}

/// Per-port rows when the table has the usual `{port: limits}` shape.
fn port_limits(raw: &Value) -> Option<Vec<PortLimits>> {
    let ports: BTreeMap<String, PortBandwidth> = serde_json::from_value(raw.clone()).ok()?;
    Some(
        ports
            .into_iter()
            .map(|(port, limits)| PortLimits { port, limits })
            .collect(),
    )
}

pub async fn handle(args: QosArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        QosCommand::Show(target) => show(&target, global).await,
        QosCommand::Set(set) => set_limits(set, global).await,
    }
}

async fn show(target: &TenantArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = util::load(global)?;
    let mut client = util::connect(&config, &target.tenant)?;
    let result = client.qos_settings().await;
    client.logout();
    let raw = result?;

    let out = match port_limits(&raw) {
        Some(ports) if matches!(global.output, OutputFormat::Table | OutputFormat::Plain) => {
            output::render_list(global.output, &ports, |x| PortRow::from(x), |p| p.port.clone())
        }
        // Unrecognized shapes and structured formats pass through raw.
        _ => output::render_single(
            global.output,
            &raw,
            |v| serde_json::to_string_pretty(v).unwrap_or_default(),
            ToString::to_string,
        ),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn set_limits(args: QosSetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.port.trim().is_empty() {
        return Err(CliError::Validation {
            field: "port".into(),
            reason: "must not be empty".into(),
        });
    }
    for (field, value) in [
        ("max", args.max),
        ("ingress", args.ingress),
        ("egress", args.egress),
    ] {
        if value < -1 {
            return Err(CliError::Validation {
                field: field.into(),
                reason: format!("{value} is below -1 (unlimited)"),
            });
        }
    }

    let limits = PortBandwidth {
        max_bandwidth: args.max,
        ingress_bandwidth: args.ingress,
        egress_bandwidth: args.egress,
    };
    let ports = BTreeMap::from([(args.port.clone(), limits)]);

    let config = util::load(global)?;
    let mut client = util::connect(&config, &args.target.tenant)?;
    let result = client.set_bandwidth_limits(&ports).await;
    client.logout();
    result?;

    let written = [PortLimits {
        port: args.port,
        limits,
    }];
    let out = output::render_list(global.output, &written, |x| PortRow::from(x), |p| p.port.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
