//! Poller commands: `run` (until interrupted) and `poll-once`.

use serde::Serialize;
use tabled::Tabled;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use edgenet_api::TelemetryClient;
use edgenet_config::{Config, FileTargetSource};
use edgenet_core::{
    CycleOutcome, CycleReport, HttpSink, LogSink, Poller, PollerConfig, TargetOutcome,
    TargetReport, TelemetrySink,
};

use crate::cli::{GlobalOpts, RunArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Report rows ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TargetResult {
    tenant: String,
    router: String,
    delivered: bool,
    devices: usize,
    skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    elapsed_ms: u64,
}

impl From<&TargetReport> for TargetResult {
    fn from(r: &TargetReport) -> Self {
        let (delivered, devices, skipped, error) = match &r.outcome {
            TargetOutcome::Delivered { devices, skipped } => (true, *devices, *skipped, None),
            TargetOutcome::Failed { error } => (false, 0, 0, Some(error.clone())),
        };
        Self {
            tenant: r.tenant_id.clone(),
            router: r.router.clone(),
            delivered,
            devices,
            skipped,
            error,
            elapsed_ms: u64::try_from(r.elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[derive(Tabled)]
struct TargetResultRow {
    #[tabled(rename = "Tenant")]
    tenant: String,
    #[tabled(rename = "Router")]
    router: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Devices")]
    devices: usize,
    #[tabled(rename = "Skipped")]
    skipped: usize,
    #[tabled(rename = "Time")]
    elapsed: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl From<&TargetResult> for TargetResultRow {
    fn from(r: &TargetResult) -> Self {
        Self {
            tenant: r.tenant.clone(),
            router: r.router.clone(),
            result: output::status(if r.delivered { "delivered" } else { "failed" }, r.delivered),
            devices: r.devices,
            skipped: r.skipped,
            elapsed: format!("{}ms", r.elapsed_ms),
            error: output::or_dash(r.error.as_deref()),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn run(args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = util::load(global)?;
    let poller_config = config.poller_config()?;
    let source = FileTargetSource::new(global.config.clone());

    if args.dry_run {
        serve(poller_config, source, LogSink).await;
    } else {
        let sink = http_sink(&config, true).await?;
        serve(poller_config, source, sink).await;
    }
    Ok(())
}

pub async fn once(args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = util::load(global)?;
    let poller_config = config.poller_config()?;
    let source = FileTargetSource::new(global.config.clone());

    let report = if args.dry_run {
        single_cycle(poller_config, source, LogSink).await?
    } else {
        let sink = http_sink(&config, false).await?;
        single_cycle(poller_config, source, sink).await?
    };

    if report.targets.is_empty() {
        warn!("no enabled targets configured");
    }

    let results: Vec<TargetResult> = report.targets.iter().map(TargetResult::from).collect();
    let out = output::render_list(global.output, &results, |x| TargetResultRow::from(x), |r| {
        format!("{} {}", r.tenant, if r.delivered { "delivered" } else { "failed" })
    });
    output::print_output(&out, global.quiet);

    match report.failed() {
        0 => Ok(()),
        failed => Err(CliError::CycleFailed {
            failed,
            total: report.targets.len(),
        }),
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// HTTP sink for the configured endpoint. With `probe`, checks the
/// endpoint's health route first; an unhealthy endpoint only warns.
async fn http_sink(config: &Config, probe: bool) -> Result<HttpSink, CliError> {
    let (url, transport) = config.sink_endpoint()?;
    let client = TelemetryClient::new(url, &transport)?;
    if probe {
        match client.health().await {
            Ok(()) => info!(url = %client.url(), "telemetry endpoint healthy"),
            Err(e) => warn!(url = %client.url(), error = %e, "telemetry endpoint health check failed"),
        }
    }
    Ok(HttpSink::new(client))
}

async fn serve<S: TelemetrySink>(config: PollerConfig, source: FileTargetSource, sink: S) {
    let poller = Poller::new(config, source, sink);
    let cancel = CancellationToken::new();

    let signal = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for Ctrl-C");
                return;
            }
            info!("interrupt received, finishing current cycle");
            cancel.cancel();
        }
    });

    poller.run(cancel).await;
    signal.abort();
}

async fn single_cycle<S: TelemetrySink>(
    config: PollerConfig,
    source: FileTargetSource,
    sink: S,
) -> Result<CycleReport, CliError> {
    let poller = Poller::new(config, source, sink);
    match poller.run_cycle().await? {
        CycleOutcome::Completed(report) => Ok(report),
        CycleOutcome::Skipped => Err(CliError::Internal("poll cycle was skipped".into())),
    }
}
