//! Reorder-cycle estimation
//!
//! Pure functions over recent consumption samples. `None` means "keep the
//! current cycle".

use larder_types::ConsumptionSample;

/// Estimate a reorder cycle in days from samples ordered newest first.
///
/// - no samples: no estimate
/// - one sample: its whole-day duration, if positive
/// - several: the mean duration rounded to the nearest day, halves up
///
/// A mean below one day or above `max_cycle_days` is discarded.
pub fn estimate_cycle(samples: &[ConsumptionSample], max_cycle_days: u32) -> Option<u32> {
    let durations: Vec<i64> = samples.iter().map(ConsumptionSample::duration_days).collect();
    estimate_from_durations(&durations, max_cycle_days)
}

/// Same as [`estimate_cycle`] over precomputed whole-day durations
pub fn estimate_from_durations(durations: &[i64], max_cycle_days: u32) -> Option<u32> {
    match durations {
        [] => None,
        [single] => u32::try_from(*single).ok().filter(|days| *days > 0),
        many => round_half_up(mean(many), max_cycle_days)
            .and_then(|days| u32::try_from(days).ok())
            .filter(|days| (1..=max_cycle_days).contains(days)),
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(durations: &[i64]) -> f64 {
    durations.iter().map(|d| *d as f64).sum::<f64>() / durations.len() as f64
}

// Bounded by max_cycle_days before the cast
#[allow(clippy::cast_possible_truncation)]
fn round_half_up(mean: f64, max_cycle_days: u32) -> Option<i64> {
    if !mean.is_finite() || mean <= 0.0 || mean > f64::from(max_cycle_days) {
        return None;
    }
    Some((mean + 0.5).floor() as i64)
}
