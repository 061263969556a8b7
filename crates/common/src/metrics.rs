//! Prometheus text exposition for the default registry.

use axum::http::StatusCode;
use prometheus::{Encoder, TextEncoder};

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

/// axum handler wrapper around [`encode_metrics`].
pub async fn metrics_handler() -> (StatusCode, String) {
    encode_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use prometheus::{register_int_counter, IntCounter};

    static TEST_COUNTER: Lazy<IntCounter> = Lazy::new(|| {
        register_int_counter!("common_metrics_test_total", "metrics encoder test counter")
            .expect("register test counter")
    });

    #[test]
    fn encodes_registered_counter() {
        TEST_COUNTER.inc();
        let (status, body) = encode_metrics();
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("common_metrics_test_total"));
    }
}
