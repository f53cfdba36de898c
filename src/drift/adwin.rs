//! ADWIN
//!
//! Adaptive Windowing keeps a variable length window over a stream of real
//! values. The window is cut whenever two of its sub-windows have averages that
//! differ by more than a Hoeffding style bound, so it grows while the data is
//! stationary and shrinks right after a change.
//!
//! The window is stored as rows of buckets: row `i` holds buckets summarising
//! `2^i` observations each, and at most `max_buckets` of them. Inserting is
//! amortised O(1) and the window uses O(log W) buckets.
use crate::constants::{
    ADWIN_CLOCK, ADWIN_DELTA, ADWIN_MAX_BUCKETS, ADWIN_MIN_WINDOW_LENGTH, ADWIN_MIN_WINDOW_LONGITUDE, ADWIN_RANGE,
};
use crate::errors::StreamwiseError;
use crate::utils::{validate_open_interval, validate_positive_usize_parameter};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

fn default_delta() -> f64 {
    ADWIN_DELTA
}
fn default_max_buckets() -> usize {
    ADWIN_MAX_BUCKETS
}
fn default_clock() -> usize {
    ADWIN_CLOCK
}
fn default_min_window_length() -> usize {
    ADWIN_MIN_WINDOW_LENGTH
}
fn default_min_window_longitude() -> usize {
    ADWIN_MIN_WINDOW_LONGITUDE
}
fn default_range() -> f64 {
    ADWIN_RANGE
}

/// Configuration for [`Adwin`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdwinConfig {
    /// Confidence of the cut test. Smaller values detect fewer, more certain changes.
    #[serde(default = "default_delta")]
    pub delta: f64,
    /// Maximum number of buckets in a row before the two oldest are merged.
    #[serde(default = "default_max_buckets")]
    pub max_buckets: usize,
    /// The cut test runs once every `clock` insertions.
    #[serde(default = "default_clock")]
    pub clock: usize,
    /// Minimum length of each sub-window compared by the cut test.
    #[serde(default = "default_min_window_length")]
    pub min_window_length: usize,
    /// The window must be wider than this before it is tested at all.
    #[serde(default = "default_min_window_longitude")]
    pub min_window_longitude: usize,
    /// Width of the interval the observed values lie in, it scales the
    /// additive term of the cut bound. Error rates use the default `1.0`.
    #[serde(default = "default_range")]
    pub range: f64,
}

impl Default for AdwinConfig {
    fn default() -> Self {
        AdwinConfig {
            delta: ADWIN_DELTA,
            max_buckets: ADWIN_MAX_BUCKETS,
            clock: ADWIN_CLOCK,
            min_window_length: ADWIN_MIN_WINDOW_LENGTH,
            min_window_longitude: ADWIN_MIN_WINDOW_LONGITUDE,
            range: ADWIN_RANGE,
        }
    }
}

impl AdwinConfig {
    pub fn validate(&self) -> Result<(), StreamwiseError> {
        validate_open_interval(self.delta, 0.0, 1.0, "delta")?;
        validate_positive_usize_parameter(self.max_buckets, "max_buckets")?;
        validate_positive_usize_parameter(self.clock, "clock")?;
        validate_open_interval(self.range, 0.0, f64::INFINITY, "range")?;
        Ok(())
    }

    pub fn set_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn set_clock(mut self, clock: usize) -> Self {
        self.clock = clock;
        self
    }

    pub fn set_max_buckets(mut self, max_buckets: usize) -> Self {
        self.max_buckets = max_buckets;
        self
    }

    pub fn set_range(mut self, range: f64) -> Self {
        self.range = range;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bucket {
    count: usize,
    total: f64,
    /// Sum of squared deviations from the bucket mean.
    variance: f64,
}

impl Bucket {
    fn single(value: f64) -> Self {
        Bucket {
            count: 1,
            total: value,
            variance: 0.0,
        }
    }

    fn mean(&self) -> f64 {
        self.total / self.count as f64
    }

    fn merge(&self, other: &Bucket) -> Bucket {
        let (n1, n2) = (self.count as f64, other.count as f64);
        let diff = self.mean() - other.mean();
        Bucket {
            count: self.count + other.count,
            total: self.total + other.total,
            variance: self.variance + other.variance + n1 * n2 * diff * diff / (n1 + n2),
        }
    }
}

/// Adaptive Windowing change detector.
#[derive(Debug, Clone)]
pub struct Adwin {
    cfg: AdwinConfig,
    /// `rows[i]` holds buckets of `2^i` observations, newest at the front.
    rows: Vec<VecDeque<Bucket>>,
    total: f64,
    variance: f64,
    width: usize,
    ticks: usize,
    n_detections: usize,
    detected_change: bool,
}

impl Default for Adwin {
    fn default() -> Self {
        Adwin::from_config(AdwinConfig::default())
    }
}

impl Adwin {
    /// Create a detector with the given confidence and default tuning.
    ///
    /// * `delta` - Confidence value in (0, 1).
    pub fn new(delta: f64) -> Result<Self, StreamwiseError> {
        Adwin::with_config(AdwinConfig::default().set_delta(delta))
    }

    /// Create a detector from a full configuration, validating it first.
    pub fn with_config(cfg: AdwinConfig) -> Result<Self, StreamwiseError> {
        cfg.validate()?;
        Ok(Adwin::from_config(cfg))
    }

    fn from_config(cfg: AdwinConfig) -> Self {
        Adwin {
            cfg,
            rows: Vec::new(),
            total: 0.0,
            variance: 0.0,
            width: 0,
            ticks: 0,
            n_detections: 0,
            detected_change: false,
        }
    }

    pub fn config(&self) -> &AdwinConfig {
        &self.cfg
    }

    /// Add a new observation, returning `true` if a change was detected
    /// and the window was cut. Values are expected to lie in an interval of
    /// width `range`, `[0, 1]` by default.
    pub fn add_element(&mut self, value: f64) -> bool {
        self.width += 1;
        if self.width > 1 {
            let w = self.width as f64;
            let prev_mean = self.total / (w - 1.0);
            self.variance += (w - 1.0) * (value - prev_mean) * (value - prev_mean) / w;
        }
        self.total += value;
        self.insert_bucket(value);
        self.detected_change = self.detect_change();
        if self.detected_change {
            self.n_detections += 1;
        }
        self.detected_change
    }

    /// Mean of the values in the current window, `0.0` when empty.
    pub fn estimate(&self) -> f64 {
        if self.width == 0 {
            0.0
        } else {
            self.total / self.width as f64
        }
    }

    /// Number of observations in the current window.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Population variance of the values in the window.
    pub fn variance(&self) -> f64 {
        if self.width == 0 {
            0.0
        } else {
            self.variance / self.width as f64
        }
    }

    /// Whether the last call to [`Adwin::add_element`] cut the window.
    pub fn detected_change(&self) -> bool {
        self.detected_change
    }

    pub fn n_detections(&self) -> usize {
        self.n_detections
    }

    pub fn n_buckets(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    /// Forget the whole window.
    pub fn reset(&mut self) {
        *self = Adwin::from_config(self.cfg);
    }

    fn insert_bucket(&mut self, value: f64) {
        if self.rows.is_empty() {
            self.rows.push(VecDeque::with_capacity(self.cfg.max_buckets + 1));
        }
        self.rows[0].push_front(Bucket::single(value));
        self.compress_buckets();
    }

    fn compress_buckets(&mut self) {
        let mut level = 0;
        while level < self.rows.len() && self.rows[level].len() > self.cfg.max_buckets {
            let row = &mut self.rows[level];
            let (oldest, next) = match (row.pop_back(), row.pop_back()) {
                (Some(a), Some(b)) => (a, b),
                _ => break,
            };
            let merged = oldest.merge(&next);
            if level + 1 == self.rows.len() {
                self.rows.push(VecDeque::with_capacity(self.cfg.max_buckets + 1));
            }
            self.rows[level + 1].push_front(merged);
            level += 1;
        }
    }

    fn pop_empty_rows(&mut self) {
        while self.rows.last().is_some_and(|r| r.is_empty()) {
            self.rows.pop();
        }
    }

    fn delete_oldest(&mut self) {
        self.pop_empty_rows();
        let bucket = match self.rows.last_mut().and_then(|r| r.pop_back()) {
            Some(b) => b,
            None => return,
        };
        self.pop_empty_rows();
        self.width -= bucket.count;
        self.total -= bucket.total;
        if self.width == 0 {
            self.total = 0.0;
            self.variance = 0.0;
            return;
        }
        let n1 = bucket.count as f64;
        let w = self.width as f64;
        let diff = bucket.mean() - self.total / w;
        self.variance -= bucket.variance + n1 * w * diff * diff / (n1 + w);
        self.variance = self.variance.max(0.0);
    }

    fn detect_change(&mut self) -> bool {
        self.ticks += 1;
        if self.ticks % self.cfg.clock != 0 || self.width <= self.cfg.min_window_longitude {
            return false;
        }
        let mut change = false;
        while let Some(n_old) = self.find_cut() {
            change = true;
            for _ in 0..n_old {
                self.delete_oldest();
            }
            if self.width <= self.cfg.min_window_longitude {
                break;
            }
        }
        change
    }

    /// Scan the split points from the oldest bucket on and return the number
    /// of buckets forming the older sub-window of the first significant cut.
    fn find_cut(&self) -> Option<usize> {
        let min_len = self.cfg.min_window_length + 1;
        let n = self.width as f64;
        let v = self.variance / n;
        let dd = (2.0 * n.ln() / self.cfg.delta).ln();

        let (mut n0, mut n1) = (0usize, self.width);
        let (mut u0, mut u1) = (0.0, self.total);
        let mut n_old = 0;
        for bucket in self.rows.iter().rev().flat_map(|r| r.iter().rev()) {
            n0 += bucket.count;
            n1 -= bucket.count;
            u0 += bucket.total;
            u1 -= bucket.total;
            n_old += 1;
            if n1 <= min_len {
                break;
            }
            if n0 > min_len && self.cut_expression(n0, n1, u0, u1, v, dd) {
                return Some(n_old);
            }
        }
        None
    }

    fn cut_expression(&self, n0: usize, n1: usize, u0: f64, u1: f64, v: f64, dd: f64) -> bool {
        let diff = (u0 / n0 as f64 - u1 / n1 as f64).abs();
        let min_len = self.cfg.min_window_length as f64;
        let m = 1.0 / (n0 as f64 - min_len + 1.0) + 1.0 / (n1 as f64 - min_len + 1.0);
        let epsilon = (2.0 * m * v * dd).sqrt() + 2.0 / 3.0 * dd * m * self.cfg.range;
        diff > epsilon
    }
}
