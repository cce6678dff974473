//! Crossover detection: golden cross and death cross.
//!
//! A crossover is a sign change between consecutive samples of a difference
//! series (MACD histogram, or fast MA minus slow MA). Zeros do not form a side
//! of their own: a zero belongs to whichever side the next strictly signed
//! value falls on, so `[-1, 0, 0, 2]` crosses exactly once and a run of zeros
//! at the end never fires.

use crate::domain::{IndicatorPoint, Marker, MarkerKind, SignalSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossDirection {
    /// Negative to positive.
    Up,
    /// Positive to negative.
    Down,
}

impl CrossDirection {
    pub fn marker_kind(&self) -> MarkerKind {
        match self {
            CrossDirection::Up => MarkerKind::GoldenCross,
            CrossDirection::Down => MarkerKind::DeathCross,
        }
    }
}

/// Indices where the effective sign of `diffs` flips, with the direction.
/// The index is the later sample of each pair.
pub fn detect_sign_changes(diffs: &[f64]) -> Vec<(usize, CrossDirection)> {
    // effective sign, resolved right to left; NaN is treated like zero
    let mut effective: Vec<Option<bool>> = vec![None; diffs.len()];
    let mut next = None;
    for (i, &d) in diffs.iter().enumerate().rev() {
        let own = if d > 0.0 {
            Some(true)
        } else if d < 0.0 {
            Some(false)
        } else {
            None
        };
        effective[i] = own.or(next);
        next = effective[i];
    }

    effective
        .windows(2)
        .enumerate()
        .filter_map(|(i, w)| match (w[0], w[1]) {
            (Some(false), Some(true)) => Some((i + 1, CrossDirection::Up)),
            (Some(true), Some(false)) => Some((i + 1, CrossDirection::Down)),
            _ => None,
        })
        .collect()
}

/// Crossovers of a histogram-style line around zero.
pub fn histogram_crossovers(points: &[IndicatorPoint], source: SignalSource) -> Vec<Marker> {
    let diffs: Vec<f64> = points.iter().map(|p| p.value).collect();
    detect_sign_changes(&diffs)
        .into_iter()
        .map(|(i, dir)| Marker::new(points[i].time, dir.marker_kind(), source))
        .collect()
}

/// Crossovers of `fast` through `slow`.
///
/// Both lines are suffixes of the same series, so they are paired on their
/// common tail: the shorter line decides how many samples are compared.
pub fn pair_crossovers(
    fast: &[IndicatorPoint],
    slow: &[IndicatorPoint],
    source: SignalSource,
) -> Vec<Marker> {
    let common = fast.len().min(slow.len());
    let fast = &fast[fast.len() - common..];
    let slow = &slow[slow.len() - common..];
    let diffs: Vec<f64> = fast.iter().zip(slow).map(|(f, s)| f.value - s.value).collect();
    detect_sign_changes(&diffs)
        .into_iter()
        .map(|(i, dir)| Marker::new(fast[i].time, dir.marker_kind(), source))
        .collect()
}
