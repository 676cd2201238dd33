//! Prometheus registry for the command-line run.

use once_cell::sync::Lazy;
use prometheus::{Encoder, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    for metric in stickerfit_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
    registry
});

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stickerfit_core::metrics::{ENCODE_ATTEMPTS, TASKS_TOTAL};

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        TASKS_TOTAL
            .with_label_values(&["emoji", "success"])
            .inc();
        ENCODE_ATTEMPTS.with_label_values(&["accepted"]).inc();

        let output = encode_metrics();
        assert!(output.contains("stickerfit_tasks_total"));
        assert!(output.contains("stickerfit_encode_attempts_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }
}
