//! Observability events emitted by the responder and the reload controller.
//!
//! The engine never records metrics directly. Callers inject an
//! [`EventSink`]; [`MetricsSink`] forwards every event to the installed
//! `metrics` recorder, and [`install_recorder`] sets up the Prometheus one.

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Receiver of discrete engine events.
///
/// Implementations must be cheap and non-blocking: they are called on the
/// message path.
pub trait EventSink: Send + Sync {
    /// A message arrived from `chat_id`.
    fn message_received(&self, chat_id: &str);

    /// The message produced no hit (including empty-after-normalization).
    fn no_match(&self);

    /// Rule `label` produced one hit.
    fn rule_hit(&self, label: &str);

    /// A non-empty reply was produced.
    fn reply_sent(&self);

    /// Time spent handling one message.
    fn processing_duration(&self, elapsed: Duration);

    /// One reconciliation pass finished.
    fn reload_finished(&self, changed: bool, failed: bool, elapsed: Duration);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn message_received(&self, _chat_id: &str) {}
    fn no_match(&self) {}
    fn rule_hit(&self, _label: &str) {}
    fn reply_sent(&self) {}
    fn processing_duration(&self, _elapsed: Duration) {}
    fn reload_finished(&self, _changed: bool, _failed: bool, _elapsed: Duration) {}
}

// Metric names.

/// Messages received (counter, labels: chat_id).
pub const MESSAGES_TOTAL: &str = "chatter_messages_total";
/// Messages that matched no rule (counter).
pub const MESSAGES_NO_MATCH_TOTAL: &str = "chatter_messages_no_match_total";
/// Hits per rule (counter, labels: rule).
pub const RULE_HITS_TOTAL: &str = "chatter_rule_hits_total";
/// Replies produced (counter).
pub const REPLIES_TOTAL: &str = "chatter_replies_total";
/// Per-message handling time (histogram).
pub const MESSAGE_PROCESSING_DURATION_SECONDS: &str =
    "chatter_message_processing_duration_seconds";
/// Reloads that published a new snapshot (counter).
pub const CONFIG_RELOAD_TOTAL: &str = "chatter_config_reload_total";
/// Failed reload passes (counter).
pub const CONFIG_RELOAD_ERRORS_TOTAL: &str = "chatter_config_reload_errors_total";
/// Reload pass duration, changed or not (histogram).
pub const CONFIG_RELOAD_DURATION_SECONDS: &str = "chatter_config_reload_duration_seconds";

/// Histogram buckets in seconds (the Prometheus client defaults).
pub const DURATION_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Sink that records through the `metrics` facade.
///
/// With no recorder installed every call is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsSink;

impl EventSink for MetricsSink {
    fn message_received(&self, chat_id: &str) {
        counter!(MESSAGES_TOTAL, "chat_id" => chat_id.to_string()).increment(1);
    }

    fn no_match(&self) {
        counter!(MESSAGES_NO_MATCH_TOTAL).increment(1);
    }

    fn rule_hit(&self, label: &str) {
        counter!(RULE_HITS_TOTAL, "rule" => label.to_string()).increment(1);
    }

    fn reply_sent(&self) {
        counter!(REPLIES_TOTAL).increment(1);
    }

    fn processing_duration(&self, elapsed: Duration) {
        histogram!(MESSAGE_PROCESSING_DURATION_SECONDS).record(elapsed.as_secs_f64());
    }

    fn reload_finished(&self, changed: bool, failed: bool, elapsed: Duration) {
        histogram!(CONFIG_RELOAD_DURATION_SECONDS).record(elapsed.as_secs_f64());
        if failed {
            counter!(CONFIG_RELOAD_ERRORS_TOTAL).increment(1);
        } else if changed {
            counter!(CONFIG_RELOAD_TOTAL).increment(1);
        }
    }
}

/// Prometheus builder with the duration buckets applied.
pub fn prometheus_builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new().set_buckets(&DURATION_BUCKETS)
}

/// Install the Prometheus recorder globally. Call once, before any event is
/// recorded; the handle renders the text exposition format.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = prometheus_builder()?.install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run `f` against a thread-local recorder and render what it recorded.
    fn recorded(f: impl FnOnce()) -> String {
        let recorder = prometheus_builder().unwrap().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, f);
        handle.render()
    }

    #[test]
    fn counts_messages_per_chat() {
        let out = recorded(|| {
            let sink = MetricsSink;
            sink.message_received("42");
            sink.message_received("42");
            sink.message_received("7");
        });

        assert!(out.contains(r#"chatter_messages_total{chat_id="42"} 2"#), "{out}");
        assert!(out.contains(r#"chatter_messages_total{chat_id="7"} 1"#), "{out}");
    }

    #[test]
    fn rule_hits_are_labelled() {
        let out = recorded(|| {
            let sink = MetricsSink;
            sink.rule_hit("greeting");
            sink.rule_hit("greeting");
            sink.rule_hit("farewell");
            sink.reply_sent();
        });

        assert!(out.contains(r#"chatter_rule_hits_total{rule="greeting"} 2"#), "{out}");
        assert!(out.contains(r#"chatter_rule_hits_total{rule="farewell"} 1"#), "{out}");
        assert!(out.contains("chatter_replies_total 1"), "{out}");
    }

    #[test]
    fn reload_outcomes_are_split() {
        let out = recorded(|| {
            let sink = MetricsSink;
            sink.reload_finished(false, false, Duration::from_millis(1));
            sink.reload_finished(true, false, Duration::from_millis(2));
            sink.reload_finished(false, true, Duration::from_millis(3));
        });

        assert!(out.contains("chatter_config_reload_total 1"), "{out}");
        assert!(out.contains("chatter_config_reload_errors_total 1"), "{out}");
        assert!(out.contains("chatter_config_reload_duration_seconds_count 3"), "{out}");
    }

    #[test]
    fn processing_time_is_a_histogram() {
        let out = recorded(|| {
            let sink = MetricsSink;
            sink.processing_duration(Duration::from_micros(250));
            sink.processing_duration(Duration::from_micros(750));
        });

        assert!(out.contains("chatter_message_processing_duration_seconds_count 2"), "{out}");
        assert!(out.contains(r#"chatter_message_processing_duration_seconds_bucket{le="0.005"} 2"#), "{out}");
    }

    #[test]
    fn noop_sink_records_nothing() {
        let out = recorded(|| {
            let sink = NoopSink;
            sink.message_received("42");
            sink.no_match();
        });
        assert!(!out.contains("chatter_"), "{out}");
    }

    #[test]
    fn metric_names_are_snake_case() {
        let names = [
            MESSAGES_TOTAL,
            MESSAGES_NO_MATCH_TOTAL,
            RULE_HITS_TOTAL,
            REPLIES_TOTAL,
            MESSAGE_PROCESSING_DURATION_SECONDS,
            CONFIG_RELOAD_TOTAL,
            CONFIG_RELOAD_ERRORS_TOTAL,
            CONFIG_RELOAD_DURATION_SECONDS,
        ];
        for name in names {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "metric name '{name}' must be snake_case"
            );
        }
    }
}
