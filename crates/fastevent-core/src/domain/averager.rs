//! Overflow-bounded running mean.
//!
//! Used by the serial driver to report the mean round-trip latency of its
//! flow-controlled transactions.  Samples are accumulated into a `u64` sum;
//! once adding the next sample would push the sum above the configured limit
//! (or overflow `u64`), the accumulator restarts from that sample alone.
//! Long-running sessions therefore report the mean of the most recent window
//! rather than of the whole session.

/// Default accumulator limit: 10^19 ns, about 317 years of summed latency.
pub const DEFAULT_LIMIT: u64 = 10_000_000_000_000_000_000;

/// Online mean of a `u64` sample stream that discards history instead of
/// overflowing.
///
/// # Examples
///
/// ```rust
/// use fastevent_core::RunningAverage;
///
/// let mut avg = RunningAverage::new(100);
/// avg.add(40);
/// avg.add(60);
/// assert_eq!(avg.mean(), Some(50.0));
///
/// // 100 + 30 exceeds the limit: the accumulator restarts at 30.
/// avg.add(30);
/// assert_eq!(avg.mean(), Some(30.0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningAverage {
    limit: u64,
    sum: u64,
    count: u64,
}

impl RunningAverage {
    /// Creates an empty average whose sum never exceeds `limit`.
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            sum: 0,
            count: 0,
        }
    }

    /// Folds one sample into the average.
    pub fn add(&mut self, sample: u64) {
        match self.sum.checked_add(sample) {
            Some(next) if next <= self.limit => {
                self.sum = next;
                self.count += 1;
            }
            _ => {
                self.sum = sample;
                self.count = 1;
            }
        }
    }

    /// Returns the mean of the current accumulation, or `None` before the
    /// first sample.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum as f64 / self.count as f64)
        }
    }

    /// Sum of the current accumulation.
    pub fn sum(&self) -> u64 {
        self.sum
    }

    /// Number of samples in the current accumulation.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl Default for RunningAverage {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
