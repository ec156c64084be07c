//! Device inventory command.

use tabled::Tabled;

use edgenet_core::{DeviceRecord, fetch_devices};

use crate::cli::{GlobalOpts, TenantArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Band")]
    band: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "Online")]
    online: String,
}

impl From<&DeviceRecord> for DeviceRow {
    fn from(d: &DeviceRecord) -> Self {
        Self {
            mac: d.mac.to_string(),
            hostname: output::or_dash(d.hostname.as_deref()),
            ip: output::or_dash(d.ip.as_deref()),
            ssid: output::or_dash(d.ssid.as_deref()),
            band: output::or_dash(d.band.as_deref()),
            mode: output::or_dash(d.wireless_mode.as_deref()),
            signal: d.signal.map_or_else(|| "-".into(), |s| format!("{s}%")),
            online: format!("{}m", d.online_minutes),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: TenantArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = util::load(global)?;
    let mut client = util::connect(&config, &args.tenant)?;

    let result = fetch_devices(&mut client).await;
    client.logout();
    let inventory = result?;

    let out = output::render_list(
        global.output,
        &inventory.devices,
        |x| DeviceRow::from(x),
        |d| d.mac.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
