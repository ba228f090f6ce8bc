//! Periodic reconciliation of the rule store against its definition source.
//!
//! [`ReloadController::tick`] performs one pass and is what the background
//! loop calls every interval. Errors are logged and reported to the event
//! sink; they never stop the loop and never touch the active snapshot.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use chatter_core::EventSink;

use crate::store::{DefinitionSource, RuleError, RuleStore};

/// Result of one reconciliation pass.
#[derive(Debug)]
pub struct ReloadOutcome {
    /// A new snapshot was published.
    pub changed: bool,
    pub elapsed: Duration,
    /// Set when the pass failed; the previous snapshot is still active.
    pub error: Option<RuleError>,
}

impl ReloadOutcome {
    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

/// Drives [`RuleStore::reconcile_from`] for one store and one source.
pub struct ReloadController {
    store: Arc<RuleStore>,
    source: Arc<dyn DefinitionSource>,
    sink: Arc<dyn EventSink>,
}

impl ReloadController {
    pub fn new(
        store: Arc<RuleStore>,
        source: Arc<dyn DefinitionSource>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            store,
            source,
            sink,
        }
    }

    pub fn store(&self) -> &Arc<RuleStore> {
        &self.store
    }

    /// Run one reconciliation pass.
    pub fn tick(&self) -> ReloadOutcome {
        let start = Instant::now();
        let result = self.store.reconcile_from(self.source.as_ref());
        let elapsed = start.elapsed();

        match result {
            Ok(changed) => {
                self.sink.reload_finished(changed, false, elapsed);
                if changed {
                    let snap = self.store.snapshot();
                    info!(
                        source = %self.source.describe(),
                        mode = %snap.mode(),
                        rules_count = snap.rules().len(),
                        generation = snap.generation(),
                        elapsed_ms = millis(elapsed),
                        "config reloaded"
                    );
                } else {
                    debug!(source = %self.source.describe(), "config unchanged");
                }
                ReloadOutcome {
                    changed,
                    elapsed,
                    error: None,
                }
            }
            Err(e) => {
                self.sink.reload_finished(false, true, elapsed);
                error!(
                    source = %self.source.describe(),
                    error = %e,
                    "config reload failed, keeping previous rules"
                );
                ReloadOutcome {
                    changed: false,
                    elapsed,
                    error: Some(e),
                }
            }
        }
    }

    /// Reconcile every `interval` until `shutdown` is notified.
    ///
    /// The first pass happens one interval after the call; load the store
    /// before starting the loop. Signal shutdown with
    /// [`Notify::notify_one`] so a signal sent mid-pass is not lost.
    pub async fn run(self: Arc<Self>, interval: Duration, shutdown: Arc<Notify>) {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            source = %self.source.describe(),
            interval_ms = millis(interval),
            "reload controller started"
        );

        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    info!("reload controller shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    // File reads and regex compilation are blocking work.
                    let controller = Arc::clone(&self);
                    if let Err(e) = tokio::task::spawn_blocking(move || controller.tick()).await {
                        error!(error = %e, "reload pass panicked");
                    }
                }
            }
        }
    }

    /// Spawn [`run`](Self::run) on the current tokio runtime.
    pub fn spawn(self: Arc<Self>, interval: Duration, shutdown: Arc<Notify>) -> JoinHandle<()> {
        tokio::spawn(self.run(interval, shutdown))
    }
}

/// Whole milliseconds for log fields, saturating at `u64::MAX`.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StaticSource;
    use chatter_core::metrics::prometheus_builder;
    use chatter_core::MetricsSink;

    const V1: &str = r#"
rules:
  - text: hi
    pattern: "^hi"
    response: "hello!"
"#;

    const V2: &str = r#"
bot_mode: all
rules:
  - text: hi
    pattern: "hi"
    response: "hey!"
  - text: bye
    pattern: "bye"
    response: "later!"
"#;

    const BROKEN: &str = r#"
rules:
  - text: bad
    pattern: "[z-a]"
    response: "never"
"#;

    fn controller(source: Arc<StaticSource>) -> Arc<ReloadController> {
        let store = Arc::new(RuleStore::load(V1.as_bytes(), None).unwrap());
        Arc::new(ReloadController::new(store, source, Arc::new(MetricsSink)))
    }

    /// One pass against a thread-local recorder; returns the outcome and the
    /// rendered metrics.
    fn tick_recorded(controller: &ReloadController) -> (ReloadOutcome, String) {
        let recorder = prometheus_builder().unwrap().build_recorder();
        let handle = recorder.handle();
        let outcome = metrics::with_local_recorder(&recorder, || controller.tick());
        (outcome, handle.render())
    }

    #[test]
    fn tick_reports_no_change() {
        let source = Arc::new(StaticSource::new(V1));
        let controller = controller(source);

        let (outcome, rendered) = tick_recorded(&controller);

        assert!(!outcome.changed);
        assert!(!outcome.is_err());
        assert!(!rendered.contains("chatter_config_reload_total"), "{rendered}");
        assert!(!rendered.contains("chatter_config_reload_errors_total"), "{rendered}");
        assert!(rendered.contains("chatter_config_reload_duration_seconds_count 1"), "{rendered}");
    }

    #[test]
    fn tick_publishes_change() {
        let source = Arc::new(StaticSource::new(V1));
        let controller = controller(source.clone());

        source.set(V2, None);
        let (outcome, rendered) = tick_recorded(&controller);

        assert!(outcome.changed);
        assert_eq!(controller.store().snapshot().rules().len(), 2);
        assert!(rendered.contains("chatter_config_reload_total 1"), "{rendered}");
    }

    #[test]
    fn tick_error_is_reported_not_applied() {
        let source = Arc::new(StaticSource::new(V1));
        let controller = controller(source.clone());

        source.set(BROKEN, None);
        let (outcome, rendered) = tick_recorded(&controller);

        assert!(!outcome.changed);
        assert!(matches!(outcome.error, Some(RuleError::Compile(_))));
        assert_eq!(controller.store().snapshot().generation(), 1);
        assert!(rendered.contains("chatter_config_reload_errors_total 1"), "{rendered}");
    }

    #[test]
    fn absent_source_is_quiet() {
        let source = Arc::new(StaticSource::new(V1));
        let controller = controller(source.clone());

        source.clear();
        let (outcome, rendered) = tick_recorded(&controller);

        assert!(!outcome.changed);
        assert!(!outcome.is_err());
        assert!(!rendered.contains("chatter_config_reload_errors_total"), "{rendered}");
    }

    #[test]
    fn millis_saturate_instead_of_wrapping() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_picks_up_changes_and_stops_on_shutdown() {
        let source = Arc::new(StaticSource::new(V1));
        let controller = controller(source.clone());
        let store = Arc::clone(controller.store());
        let shutdown = Arc::new(Notify::new());

        let handle = Arc::clone(&controller).spawn(Duration::from_secs(5), shutdown.clone());

        source.set(V2, None);
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_secs(1)).await;
            if store.snapshot().generation() == 2 {
                break;
            }
        }
        assert_eq!(store.snapshot().generation(), 2);

        shutdown.notify_one();
        tokio::time::timeout(Duration::from_secs(30), handle)
            .await
            .expect("reload loop did not stop")
            .expect("reload loop panicked");
    }
}
