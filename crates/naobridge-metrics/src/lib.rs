use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Once;

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Upstream (game) side
    pub static ref EVENTS_RECEIVED: IntCounter = IntCounter::with_opts(
        Opts::new("events_received_total", "Game events parsed from upstream frames")
    ).expect("valid metric opts");

    pub static ref MALFORMED_FRAMES: IntCounter = IntCounter::with_opts(
        Opts::new("malformed_frames_total", "Upstream frames dropped as malformed JSON")
    ).expect("valid metric opts");

    // Delivery queue
    pub static ref MESSAGES_ENQUEUED: IntCounter = IntCounter::with_opts(
        Opts::new("messages_enqueued_total", "Robot messages appended to the delivery queue")
    ).expect("valid metric opts");

    pub static ref MESSAGES_DELIVERED: IntCounter = IntCounter::with_opts(
        Opts::new("messages_delivered_total", "Robot messages sent and acknowledged")
    ).expect("valid metric opts");

    pub static ref MESSAGES_REQUEUED: IntCounter = IntCounter::with_opts(
        Opts::new("messages_requeued_total", "Robot messages put back at the queue front after a failed send")
    ).expect("valid metric opts");

    pub static ref QUEUE_DEPTH: IntGauge = IntGauge::with_opts(
        Opts::new("queue_depth", "Messages waiting for the robot")
    ).expect("valid metric opts");

    // Connection slots
    pub static ref ACTIVE_CONNECTIONS: IntGauge = IntGauge::with_opts(
        Opts::new("active_connections", "Number of active peer connections")
    ).expect("valid metric opts");
}

static REGISTER: Once = Once::new();

/// Register all metrics with the global registry. Safe to call more than once.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(EVENTS_RECEIVED.clone()),
            Box::new(MALFORMED_FRAMES.clone()),
            Box::new(MESSAGES_ENQUEUED.clone()),
            Box::new(MESSAGES_DELIVERED.clone()),
            Box::new(MESSAGES_REQUEUED.clone()),
            Box::new(QUEUE_DEPTH.clone()),
            Box::new(ACTIVE_CONNECTIONS.clone()),
        ];
        for collector in collectors {
            if let Err(e) = REGISTRY.register(collector) {
                tracing::warn!("Failed to register metric: {}", e);
            }
        }
    });
}

/// Gather metrics in Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        register_metrics();
        register_metrics();

        EVENTS_RECEIVED.inc();
        MESSAGES_ENQUEUED.inc_by(2);
        QUEUE_DEPTH.set(2);
        ACTIVE_CONNECTIONS.inc();

        let metrics = gather_metrics();
        assert!(metrics.contains("events_received_total"));
        assert!(metrics.contains("queue_depth"));
    }
}
