use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use configs::CircuitBreakerConfig;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,   // Normal operation
    Open,     // Failing fast
    HalfOpen, // Probing whether the dependency recovered
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
struct BreakerCore {
    state: CircuitState,
    failure_count: u64,
    success_count: u64,
    probes_in_flight: u64,
    opened_at: Option<Instant>,
    half_open_since: Option<Instant>,
    failure_threshold: u64,
    recovery_timeout: Duration,
    half_open_max_calls: u64,
}

impl BreakerCore {
    fn new(failure_threshold: u64, recovery_timeout: Duration, half_open_max_calls: u64) -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            success_count: 0,
            probes_in_flight: 0,
            opened_at: None,
            half_open_since: None,
            failure_threshold,
            recovery_timeout,
            half_open_max_calls,
        }
    }

    fn can_execute(&mut self, service: &str) -> bool {
        match self.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let recovered = self.opened_at.map_or(true, |t| t.elapsed() >= self.recovery_timeout);
                if recovered {
                    info!(service, "circuit breaker transitioning to half-open state");
                    self.state = CircuitState::HalfOpen;
                    self.admit_first_probe();
                    true
                } else {
                    debug!(service, "circuit breaker is open, rejecting request");
                    false
                }
            }
            CircuitState::HalfOpen => {
                if self.probes_in_flight < self.half_open_max_calls {
                    self.probes_in_flight += 1;
                    true
                } else if self.half_open_since.map_or(true, |t| t.elapsed() >= self.recovery_timeout) {
                    // Probes whose caller was dropped never report back.
                    debug!(service, "half-open probes unanswered, admitting a new probe");
                    self.admit_first_probe();
                    true
                } else {
                    false
                }
            }
        }
    }

    fn record_success(&mut self, service: &str) {
        match self.state {
            CircuitState::Closed => {
                self.failure_count = 0;
            }
            CircuitState::HalfOpen => {
                self.probes_in_flight = self.probes_in_flight.saturating_sub(1);
                self.success_count += 1;
                if self.success_count >= self.half_open_max_calls {
                    info!(service, "circuit breaker closing after successful recovery");
                    self.close();
                }
            }
            CircuitState::Open => {
                // A call admitted before the circuit opened finished fine.
                debug!(service, "late success while open, ignored");
            }
        }
    }

    fn record_failure(&mut self, service: &str) -> bool {
        let was_open = self.state == CircuitState::Open;
        match self.state {
            CircuitState::Closed => {
                self.failure_count += 1;
                if self.failure_count >= self.failure_threshold {
                    warn!(service, failures = self.failure_count, "circuit breaker opening");
                    self.open();
                }
            }
            CircuitState::HalfOpen => {
                warn!(service, "circuit breaker opening again after failure in half-open state");
                self.failure_count += 1;
                self.open();
            }
            CircuitState::Open => {
                self.failure_count += 1;
            }
        }
        debug!(service, state = %self.state, count = self.failure_count, "circuit breaker recorded failure");
        !was_open && self.state == CircuitState::Open
    }

    fn admit_first_probe(&mut self) {
        self.half_open_since = Some(Instant::now());
        self.success_count = 0;
        self.probes_in_flight = 1;
    }

    fn open(&mut self) {
        self.state = CircuitState::Open;
        self.opened_at = Some(Instant::now());
        self.half_open_since = None;
        self.success_count = 0;
        self.probes_in_flight = 0;
    }

    fn close(&mut self) {
        self.state = CircuitState::Closed;
        self.failure_count = 0;
        self.success_count = 0;
        self.probes_in_flight = 0;
        self.opened_at = None;
        self.half_open_since = None;
    }
}

/// Consecutive-failure circuit breaker guarding one dependency.
#[derive(Clone)]
pub struct CircuitBreaker {
    service: Arc<str>,
    inner: Arc<Mutex<BreakerCore>>,
    enabled: bool,
}

impl CircuitBreaker {
    pub fn new(
        service: &str,
        failure_threshold: u64,
        recovery_timeout: Duration,
        half_open_max_calls: u64,
        enabled: bool,
    ) -> Self {
        Self {
            service: Arc::from(service),
            inner: Arc::new(Mutex::new(BreakerCore::new(
                failure_threshold.max(1),
                recovery_timeout,
                half_open_max_calls.max(1),
            ))),
            enabled,
        }
    }

    pub fn from_config(service: &str, cfg: &CircuitBreakerConfig) -> Self {
        Self::new(
            service,
            cfg.failure_threshold,
            cfg.recovery_timeout(),
            cfg.half_open_max_calls,
            cfg.enabled,
        )
    }

    pub async fn can_execute(&self) -> bool {
        if !self.enabled {
            return true;
        }
        let mut inner = self.inner.lock().await;
        inner.can_execute(&self.service)
    }

    pub async fn record_success(&self) {
        if !self.enabled {
            return;
        }
        let mut inner = self.inner.lock().await;
        inner.record_success(&self.service);
    }

    /// Returns true when this failure tripped the circuit open.
    pub async fn record_failure(&self) -> bool {
        if !self.enabled {
            return false;
        }
        let mut inner = self.inner.lock().await;
        inner.record_failure(&self.service)
    }

    pub async fn get_state(&self) -> CircuitState {
        if !self.enabled {
            return CircuitState::Closed;
        }
        let inner = self.inner.lock().await;
        inner.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Duration};

    #[tokio::test]
    async fn test_circuit_breaker_closed_to_open() {
        let cb = CircuitBreaker::new("pets-service", 3, Duration::from_millis(100), 2, true);

        assert!(cb.can_execute().await);
        assert_eq!(cb.get_state().await, CircuitState::Closed);

        assert!(!cb.record_failure().await);
        assert!(!cb.record_failure().await);
        assert!(cb.can_execute().await); // Still closed

        assert!(cb.record_failure().await);
        assert_eq!(cb.get_state().await, CircuitState::Open);
        assert!(!cb.can_execute().await);
    }

    #[tokio::test]
    async fn test_success_resets_failure_streak() {
        let cb = CircuitBreaker::new("pets-service", 2, Duration::from_millis(100), 1, true);
        cb.record_failure().await;
        cb.record_success().await;
        cb.record_failure().await;
        assert_eq!(cb.get_state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_circuit_breaker_recovery() {
        let cb = CircuitBreaker::new("people-service", 2, Duration::from_millis(50), 1, true);

        cb.record_failure().await;
        cb.record_failure().await;
        assert_eq!(cb.get_state().await, CircuitState::Open);

        sleep(Duration::from_millis(60)).await;

        assert!(cb.can_execute().await);
        assert_eq!(cb.get_state().await, CircuitState::HalfOpen);
        // Only one probe admitted at a time
        assert!(!cb.can_execute().await);

        cb.record_success().await;
        assert_eq!(cb.get_state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_failure_reopens() {
        let cb = CircuitBreaker::new("people-service", 1, Duration::from_millis(20), 1, true);
        cb.record_failure().await;
        sleep(Duration::from_millis(30)).await;
        assert!(cb.can_execute().await);
        cb.record_failure().await;
        assert_eq!(cb.get_state().await, CircuitState::Open);
        assert!(!cb.can_execute().await);
    }

    #[tokio::test]
    async fn test_unanswered_probe_is_replaced_after_recovery_timeout() {
        let cb = CircuitBreaker::new("pets-service", 1, Duration::from_millis(30), 1, true);
        cb.record_failure().await;
        sleep(Duration::from_millis(40)).await;

        // Probe admitted, outcome never recorded
        assert!(cb.can_execute().await);
        assert!(!cb.can_execute().await);

        sleep(Duration::from_millis(40)).await;
        assert!(cb.can_execute().await);
        assert_eq!(cb.get_state().await, CircuitState::HalfOpen);
        cb.record_success().await;
        assert_eq!(cb.get_state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_circuit_breaker_disabled() {
        let cb = CircuitBreaker::new("pets-service", 1, Duration::from_millis(100), 1, false);

        for _ in 0..10 {
            cb.record_failure().await;
            assert!(cb.can_execute().await);
        }

        assert_eq!(cb.get_state().await, CircuitState::Closed);
    }
}
