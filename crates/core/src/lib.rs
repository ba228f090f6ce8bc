pub mod config;
pub mod metrics;

pub use self::config::Config;
pub use self::metrics::{install_recorder, EventSink, MetricsSink, NoopSink};
