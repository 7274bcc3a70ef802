use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Duration, Utc};
use utility_lookup_models::{CircuitBreakerState, UtilityType};

/// Consecutive failures before a `(state, utility_type)` key is disabled.
/// Matches the original implementation's `_CIRCUIT_BREAKER_THRESHOLD`.
const FAILURE_THRESHOLD: u32 = 3;

/// How long a tripped breaker stays disabled before the next request is
/// allowed through again. The original implementation only ever reset
/// this in-process on restart; this service is long-lived, so a wall
/// clock recovery window is added.
const COOLDOWN_MINUTES: i64 = 5;

/// Tracks per-`(state, utility_type)` consecutive failure counts and
/// trips a breaker that short-circuits further network calls for a
/// cooldown window.
pub struct CircuitBreaker {
    state: Mutex<HashMap<(String, UtilityType), CircuitBreakerState>>,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `true` if the key is currently disabled and the call
    /// should be skipped without any network I/O.
    #[must_use]
    pub fn is_open(&self, state: &str, utility_type: UtilityType) -> bool {
        let guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard
            .get(&(state.to_string(), utility_type))
            .and_then(|entry| entry.disabled_until)
            .is_some_and(|until| Utc::now() < until)
    }

    /// Records a successful query, resetting the failure count.
    pub fn record_success(&self, state: &str, utility_type: UtilityType) {
        let mut guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.remove(&(state.to_string(), utility_type));
    }

    /// Records a failed query (timeout, non-2xx, or parse error). Trips
    /// the breaker once `FAILURE_THRESHOLD` consecutive failures have
    /// accumulated.
    pub fn record_failure(&self, state: &str, utility_type: UtilityType) {
        let mut guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let entry = guard.entry((state.to_string(), utility_type)).or_default();
        entry.consecutive_failures += 1;

        if entry.consecutive_failures >= FAILURE_THRESHOLD {
            entry.disabled_until = Some(Utc::now() + Duration::minutes(COOLDOWN_MINUTES));
            log::warn!(
                "state GIS circuit breaker tripped for {state}/{utility_type}; disabled for {COOLDOWN_MINUTES} minutes"
            );
        }
    }

    /// Clears every tripped breaker. Used by tests and by an operator
    /// endpoint to force-reset after a known transient outage.
    pub fn reset_all(&self) {
        let mut guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.clear();
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trips_after_threshold_failures() {
        let breaker = CircuitBreaker::new();
        assert!(!breaker.is_open("TX", UtilityType::Electric));

        breaker.record_failure("TX", UtilityType::Electric);
        breaker.record_failure("TX", UtilityType::Electric);
        assert!(!breaker.is_open("TX", UtilityType::Electric));

        breaker.record_failure("TX", UtilityType::Electric);
        assert!(breaker.is_open("TX", UtilityType::Electric));
    }

    #[test]
    fn success_resets_failure_count() {
        let breaker = CircuitBreaker::new();
        breaker.record_failure("TX", UtilityType::Electric);
        breaker.record_failure("TX", UtilityType::Electric);
        breaker.record_success("TX", UtilityType::Electric);
        breaker.record_failure("TX", UtilityType::Electric);
        assert!(!breaker.is_open("TX", UtilityType::Electric));
    }

    #[test]
    fn keys_are_independent_per_utility_type() {
        let breaker = CircuitBreaker::new();
        for _ in 0..3 {
            breaker.record_failure("TX", UtilityType::Electric);
        }
        assert!(breaker.is_open("TX", UtilityType::Electric));
        assert!(!breaker.is_open("TX", UtilityType::Gas));
    }
}
