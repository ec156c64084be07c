// ── Multi-target poller ──
//
// One cycle = load targets, run login → reads → merge → deliver for each
// target with bounded concurrency, collect a report. Each target gets its
// own `RouterClient`, so no session state crosses targets. A cycle lock
// coalesces triggers that arrive while a cycle is still running.

use std::collections::HashMap;
use std::sync::{Arc, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use edgenet_api::RouterClient;
use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::{PollerConfig, TargetConfig};
use crate::error::CoreError;
use crate::reconcile::fetch_devices;
use crate::sink::{DeviceBatch, TelemetrySink};
use crate::source::TargetSource;

// ── Reports ──────────────────────────────────────────────────────────

/// What happened to one target in one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    Delivered { devices: usize, skipped: usize },
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct TargetReport {
    pub tenant_id: String,
    pub router: String,
    pub outcome: TargetOutcome,
    pub elapsed: Duration,
}

impl TargetReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TargetOutcome::Delivered { .. })
    }
}

/// Summary of one completed cycle. Targets appear in source order.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub targets: Vec<TargetReport>,
}

impl CycleReport {
    pub fn delivered(&self) -> usize {
        self.targets.iter().filter(|t| t.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.targets.len() - self.delivered()
    }
}

#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Another cycle was still running; this trigger did nothing.
    Skipped,
}

// ── Poller ───────────────────────────────────────────────────────────

/// Polls every configured router and hands results to a sink.
///
/// Cheaply cloneable via `Arc`; clones share the cycle lock.
pub struct Poller<T, S> {
    inner: Arc<PollerInner<T, S>>,
}

impl<T, S> Clone for Poller<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct PollerInner<T, S> {
    config: PollerConfig,
    targets: T,
    sink: S,
    cycle_lock: Mutex<()>,
    /// Start of the last attempt per tenant, for per-target cadence.
    last_polled: std::sync::Mutex<HashMap<String, Instant>>,
}

impl<T: TargetSource, S: TelemetrySink> Poller<T, S> {
    pub fn new(config: PollerConfig, targets: T, sink: S) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                config,
                targets,
                sink,
                cycle_lock: Mutex::new(()),
                last_polled: std::sync::Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.inner.config
    }

    /// Run one cycle over every target, regardless of per-target cadence.
    ///
    /// Returns [`CycleOutcome::Skipped`] if a cycle is already running.
    /// Fails only when the target list cannot be loaded; per-target
    /// failures are recorded in the report.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, CoreError> {
        self.cycle(false).await
    }

    /// Drive cycles on the configured interval until `cancel` fires.
    ///
    /// The first cycle starts immediately. Each tick spawns its cycle, so
    /// a slow cycle never delays the timer; ticks that land while a cycle
    /// is running are coalesced. On cancellation, waits for every spawned
    /// cycle to finish.
    pub async fn run(&self, cancel: CancellationToken) {
        let period = self.inner.config.effective_interval();
        if period != self.inner.config.interval {
            warn!(
                fallback_secs = period.as_secs(),
                "poll interval is zero, using fallback"
            );
        }
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_secs = period.as_secs(),
            concurrency = self.inner.config.effective_concurrency(),
            "poller started"
        );

        let cycles = TaskTracker::new();
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let poller = self.clone();
                    let cancel = cancel.clone();
                    cycles.spawn(async move {
                        if cancel.is_cancelled() {
                            return;
                        }
                        match poller.cycle(true).await {
                            Ok(CycleOutcome::Completed(report)) => debug!(
                                delivered = report.delivered(),
                                failed = report.failed(),
                                "scheduled cycle finished"
                            ),
                            Ok(CycleOutcome::Skipped) => {}
                            Err(e) => error!(error = %e, "poll cycle aborted"),
                        }
                    });
                }
            }
        }

        debug!(pending = cycles.len(), "poller stopping, waiting for in-flight cycle");
        cycles.close();
        cycles.wait().await;
        info!("poller stopped");
    }

    async fn cycle(&self, due_only: bool) -> Result<CycleOutcome, CoreError> {
        let Ok(_guard) = self.inner.cycle_lock.try_lock() else {
            info!("previous cycle still running, skipping trigger");
            return Ok(CycleOutcome::Skipped);
        };

        let started_at = Utc::now();
        let mut targets = self.inner.targets.load().await?;
        self.forget_removed(&targets);
        if due_only {
            let now = Instant::now();
            targets.retain(|t| self.is_due(t, now));
        }
        if targets.is_empty() {
            info!("no targets due this cycle");
        }

        let reports: Vec<TargetReport> = stream::iter(targets)
            .map(|target| self.poll_target(target))
            .buffered(self.inner.config.effective_concurrency())
            .collect()
            .await;

        let report = CycleReport {
            started_at,
            finished_at: Utc::now(),
            targets: reports,
        };
        info!(
            targets = report.targets.len(),
            delivered = report.delivered(),
            failed = report.failed(),
            elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "poll cycle complete"
        );
        Ok(CycleOutcome::Completed(report))
    }

    fn last_polled(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.inner
            .last_polled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_polled(&self, tenant: &str, at: Instant) {
        self.last_polled().insert(tenant.to_owned(), at);
    }

    /// Drop cadence state for tenants no longer in the target list.
    fn forget_removed(&self, targets: &[TargetConfig]) {
        self.last_polled()
            .retain(|tenant, _| targets.iter().any(|t| t.tenant_id == *tenant));
    }

    /// A target is due when its own interval has passed since its last
    /// attempt. Half a tick of slack absorbs timer jitter.
    fn is_due(&self, target: &TargetConfig, now: Instant) -> bool {
        let Some(last) = self.last_polled().get(&target.tenant_id).copied() else {
            return true;
        };
        let slack = self.inner.config.effective_interval() / 2;
        now.saturating_duration_since(last) + slack >= target.poll_interval
    }

    async fn poll_target(&self, target: TargetConfig) -> TargetReport {
        let span = info_span!("target", tenant = %target.tenant_id, router = %target.router);
        let started = Instant::now();
        self.mark_polled(&target.tenant_id, started);

        let timeout = self.inner.config.target_timeout;
        let result = tokio::time::timeout(timeout, self.run_pipeline(&target))
            .instrument(span)
            .await
            .unwrap_or_else(|_| {
                Err(CoreError::TargetTimeout {
                    tenant: target.tenant_id.clone(),
                    timeout,
                })
            });

        let outcome = match result {
            Ok((devices, skipped)) => TargetOutcome::Delivered { devices, skipped },
            Err(e) => {
                warn!(
                    tenant = %target.tenant_id,
                    router = %target.router,
                    error = %e,
                    auth_failure = e.is_auth(),
                    "target failed, continuing with remaining targets"
                );
                TargetOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        TargetReport {
            tenant_id: target.tenant_id,
            router: target.router.to_string(),
            outcome,
            elapsed: started.elapsed(),
        }
    }

    /// Login, both reads, merge, deliver. Returns (devices, skipped).
    async fn run_pipeline(&self, target: &TargetConfig) -> Result<(usize, usize), CoreError> {
        let mut client = RouterClient::new(
            target.router.clone(),
            target.credentials.clone(),
            &self.inner.config.transport,
        )?;

        let inventory = fetch_devices(&mut client).await?;
        client.logout();

        let skipped = inventory.skipped.len();
        let batch = DeviceBatch::new(target.tenant_id.clone(), inventory.devices);
        if batch.devices.is_empty() {
            info!("no devices this cycle, delivering empty batch");
        }
        self.inner.sink.deliver(&batch).await?;

        debug!(devices = batch.devices.len(), skipped, "target complete");
        Ok((batch.devices.len(), skipped))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use edgenet_api::Credentials;
    use tokio::time;

    use super::*;
    use crate::config::router_url;
    use crate::sink::LogSink;
    use crate::source::StaticTargets;

    const TICK: Duration = Duration::from_secs(10);

    fn target(tenant: &str, poll_interval: Duration) -> TargetConfig {
        TargetConfig {
            tenant_id: tenant.into(),
            router: router_url("192.168.0.1").unwrap(),
            credentials: Credentials::new("admin", "secret".to_string()),
            poll_interval,
        }
    }

    fn poller() -> Poller<StaticTargets, LogSink> {
        let config = PollerConfig {
            interval: TICK,
            ..PollerConfig::default()
        };
        Poller::new(config, StaticTargets::new(Vec::new()), LogSink)
    }

    fn poll_if_due(poller: &Poller<StaticTargets, LogSink>, target: &TargetConfig) -> bool {
        let now = Instant::now();
        let due = poller.is_due(target, now);
        if due {
            poller.mark_polled(&target.tenant_id, now);
        }
        due
    }

    #[tokio::test(start_paused = true)]
    async fn targets_follow_their_own_cadence() {
        let poller = poller();
        let every_tick = target("acme", TICK);
        let every_third = target("globex", TICK * 3);

        let mut fast = Vec::new();
        let mut slow = Vec::new();
        for _ in 0..6 {
            fast.push(poll_if_due(&poller, &every_tick));
            slow.push(poll_if_due(&poller, &every_third));
            time::advance(TICK).await;
        }

        assert_eq!(fast, vec![true; 6]);
        assert_eq!(slow, vec![true, false, false, true, false, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn early_tick_within_slack_is_due() {
        let poller = poller();
        let acme = target("acme", TICK);
        assert!(poll_if_due(&poller, &acme));

        time::advance(TICK - Duration::from_secs(2)).await;
        assert!(poll_if_due(&poller, &acme));

        time::advance(Duration::from_secs(4)).await;
        assert!(!poll_if_due(&poller, &acme));
    }

    #[tokio::test]
    async fn removed_tenants_are_forgotten() {
        let poller = poller();
        let now = Instant::now();
        poller.mark_polled("acme", now);
        poller.mark_polled("globex", now);

        poller.forget_removed(&[target("acme", TICK)]);

        let tenants: Vec<String> = poller.last_polled().keys().cloned().collect();
        assert_eq!(tenants, vec!["acme".to_string()]);
    }
}
