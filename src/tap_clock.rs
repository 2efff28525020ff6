use crate::tap_window::{TapEvent, TapWindow, DEFAULT_WINDOW_SIZE};
use log::{debug, trace};
use std::fmt;
use std::time::Duration;

/// Accepted deviation from the median interval, in per-mille (30 = ±3%).
pub const DEFAULT_TOLERANCE_PERMILLE: u64 = 30;

/// Minimum number of intervals inside the band before a period is reported.
pub const DEFAULT_MIN_GOOD_TAPS: usize = 10;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Beat period in whole milliseconds. Zero means no usable tempo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BeatPeriod(u64);

impl BeatPeriod {
    pub const UNSET: BeatPeriod = BeatPeriod(0);

    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn is_set(&self) -> bool {
        self.0 > 0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.0)
    }

    pub fn bpm(&self) -> Option<f64> {
        bpm_from_period(self.0)
    }
}

impl fmt::Display for BeatPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bpm() {
            Some(bpm) => write!(f, "{} ms ({:.2} BPM)", self.0, bpm),
            None => write!(f, "unset"),
        }
    }
}

pub fn bpm_from_period(period_ms: u64) -> Option<f64> {
    if period_ms == 0 {
        None
    } else {
        Some(MS_PER_MINUTE / period_ms as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoConfig {
    pub window_size: usize,
    pub tolerance_permille: u64,
    pub min_good_taps: usize,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            tolerance_permille: DEFAULT_TOLERANCE_PERMILLE,
            min_good_taps: DEFAULT_MIN_GOOD_TAPS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TapClock {
    config: TempoConfig,
    window: TapWindow,
    taps_recorded: u64,
}

impl Default for TapClock {
    fn default() -> Self {
        Self::new(TempoConfig::default())
    }
}

impl TapClock {
    pub fn new(config: TempoConfig) -> Self {
        Self {
            config,
            window: TapWindow::new(config.window_size),
            taps_recorded: 0,
        }
    }

    pub fn config(&self) -> &TempoConfig {
        &self.config
    }

    pub fn record_tap(&mut self, tap: TapEvent) {
        self.window.push(tap);
        self.taps_recorded += 1;
        trace!(
            "Tap {} recorded ({}/{} slots)",
            self.taps_recorded,
            self.window.len(),
            self.window.capacity()
        );
    }

    pub fn is_ready(&self) -> bool {
        self.window.is_full()
    }

    pub fn taps_recorded(&self) -> u64 {
        self.taps_recorded
    }

    /// Current period estimate. Pure with respect to the recorded taps.
    pub fn estimate_period(&self) -> BeatPeriod {
        if !self.is_ready() {
            return BeatPeriod::UNSET;
        }

        let mut deltas = tap_deltas(self.window.iter());
        let period = period_from_deltas(&mut deltas, &self.config);
        debug!("Estimated beat period: {}", period);
        period
    }
}

/// Whole-millisecond intervals between chronologically adjacent taps.
///
/// A pair whose second tap is stamped before the first (clock stepped
/// backwards) contributes no interval.
pub fn tap_deltas<'a, I>(taps: I) -> Vec<u64>
where
    I: IntoIterator<Item = &'a TapEvent>,
{
    let mut deltas = Vec::new();
    let mut previous: Option<&TapEvent> = None;

    for tap in taps {
        if let Some(prev) = previous {
            match tap.at().checked_duration_since(prev.at()) {
                Some(elapsed) => deltas.push(elapsed.as_millis() as u64),
                None => debug!("Ignoring non-monotonic tap pair"),
            }
        }
        previous = Some(tap);
    }

    deltas
}

pub fn sort_descending(deltas: &mut [u64]) {
    deltas.sort_unstable_by(|a, b| b.cmp(a));
}

/// True if `delta` lies within `tolerance_permille` of `reference`, inclusive.
pub fn within_band(delta: u64, reference: u64, tolerance_permille: u64) -> bool {
    let scaled = u128::from(delta) * 1000;
    let reference = u128::from(reference);
    let tolerance = u128::from(tolerance_permille);

    scaled >= reference * 1000u128.saturating_sub(tolerance)
        && scaled <= reference * (1000 + tolerance)
}

/// Median-banded mean of `deltas`. Sorts the slice in place.
pub fn period_from_deltas(deltas: &mut [u64], config: &TempoConfig) -> BeatPeriod {
    if deltas.len() < config.min_good_taps || deltas.is_empty() {
        return BeatPeriod::UNSET;
    }

    sort_descending(deltas);
    let reference = deltas[deltas.len() / 2];

    let (sum, good) = deltas
        .iter()
        .filter(|&&delta| within_band(delta, reference, config.tolerance_permille))
        .fold((0u64, 0usize), |(sum, count), &delta| (sum + delta, count + 1));

    trace!(
        "Reference delta {} ms, {} of {} deltas in band",
        reference,
        good,
        deltas.len()
    );

    if good < config.min_good_taps || good == 0 || sum == 0 {
        return BeatPeriod::UNSET;
    }

    BeatPeriod::from_millis(sum / good as u64)
}
