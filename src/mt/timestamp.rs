//! Content-dependent request timestamps
//!
//! The backend checks the `timestamp` parameter against the number of
//! lowercase `i` characters in the text. With `c` such characters and
//! `n = c + 1`, the client sends the clock reading rounded down to a
//! multiple of `n` and pushed forward by `n`. Texts without any `i` carry
//! the raw clock reading.

use std::fmt::Debug;

/// Milliseconds since the Unix epoch
pub type Millis = i64;

/// Wall clock, injected so the timestamp rule can be tested with fixed readings
pub trait Clock: Send + Sync + Debug {
    fn now_millis(&self) -> Millis;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Millis {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock frozen at a given reading
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Millis);

impl Clock for FixedClock {
    fn now_millis(&self) -> Millis {
        self.0
    }
}

/// Count of lowercase `i` in the text. Uppercase `I` is not counted.
pub fn character_signature(text: &str) -> usize {
    text.matches('i').count()
}

/// Apply the skew rule to a clock reading
///
/// `n` is always at least 2, so the remainder never divides by zero. The
/// final addition wraps like the web client's 64-bit arithmetic.
pub fn synchronize(ts: Millis, signature: usize) -> Millis {
    if signature == 0 {
        return ts;
    }
    let n = i64::try_from(signature)
        .ok()
        .and_then(|c| c.checked_add(1))
        .unwrap_or(i64::MAX);
    (ts - ts % n).wrapping_add(n)
}

/// Read the clock and apply the skew rule. Never cache the result.
pub fn synchronized_timestamp(clock: &dyn Clock, signature: usize) -> Millis {
    synchronize(clock.now_millis(), signature)
}
