/*
[INPUT]:  Local wall clock and exchange server time samples
[OUTPUT]: Drift-corrected epoch-millisecond timestamps
[POS]:    Auth layer - timestamp source for signed requests
[UPDATE]: When changing drift estimation or the clock source
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of local epoch milliseconds
pub type ClockFn = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Local wall-clock in epoch milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Local clock plus the estimated offset to the exchange server clock.
///
/// Clones share the same drift value.
#[derive(Clone)]
pub struct DriftClock {
    clock: ClockFn,
    drift_ms: Arc<AtomicI64>,
}

impl DriftClock {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(now_ms))
    }

    pub fn with_clock(clock: ClockFn) -> Self {
        Self {
            clock,
            drift_ms: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Raw local time, without drift
    pub fn local_ms(&self) -> i64 {
        (self.clock)()
    }

    /// Local time corrected by the current drift estimate
    pub fn current_timestamp(&self) -> i64 {
        self.local_ms() + self.drift()
    }

    pub fn drift(&self) -> i64 {
        self.drift_ms.load(Ordering::Relaxed)
    }

    pub fn set_drift(&self, drift_ms: i64) {
        self.drift_ms.store(drift_ms, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.set_drift(0);
    }

    /// Apply a round-trip sample: local send time, server time, local receive time.
    ///
    /// drift = server - (sent + (received - sent) / 2), truncated toward zero.
    pub fn apply_sample(&self, sent_ms: i64, server_ms: i64, received_ms: i64) -> i64 {
        let transit = (received_ms - sent_ms) / 2;
        let drift = server_ms - (sent_ms + transit);
        self.set_drift(drift);
        drift
    }
}

impl Default for DriftClock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DriftClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriftClock")
            .field("drift_ms", &self.drift())
            .finish()
    }
}
