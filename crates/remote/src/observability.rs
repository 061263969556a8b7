use once_cell::sync::Lazy;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

// Prometheus metrics (default registry), labelled by dependency name
pub static REMOTE_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "petclinic_remote_requests_total",
        "Total attempts sent to dependencies",
        &["service", "method"]
    )
    .expect("register remote_requests_total")
});

pub static REMOTE_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "petclinic_remote_failures_total",
        "Failed dependency attempts by error kind",
        &["service", "kind"]
    )
    .expect("register remote_failures_total")
});

pub static REMOTE_RETRIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "petclinic_remote_retries_total",
        "Retry attempts issued to dependencies",
        &["service"]
    )
    .expect("register remote_retries_total")
});

pub static CIRCUIT_OPEN_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "petclinic_remote_circuit_open_total",
        "Requests rejected because the dependency circuit was open",
        &["service"]
    )
    .expect("register remote_circuit_open_total")
});

pub static REMOTE_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "petclinic_remote_request_duration_seconds",
        "Dependency attempt duration in seconds",
        &["service"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register remote_request_duration")
});
