use chrono::NaiveDate;

use crate::core::features::NEUTRAL_SCORE;

/// Availability window with optionally open ends
///
/// A missing `from` means available immediately (open start), a missing
/// `until` means open-ended. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl DateWindow {
    /// Create a window, reordering inverted bounds
    pub fn new(from: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        match (from, until) {
            (Some(f), Some(u)) if f > u => Self {
                from: Some(u),
                until: Some(f),
            },
            _ => Self { from, until },
        }
    }

    /// Nothing is known about this window
    pub fn is_unset(&self) -> bool {
        self.from.is_none() && self.until.is_none()
    }

    /// Check if two windows share at least one day
    #[inline]
    pub fn intersects(&self, other: &DateWindow) -> bool {
        // Latest start; None is the open start and loses to any date
        let start = self.from.max(other.from);

        let end = match (self.until, other.until) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None,
        };

        match (start, end) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        }
    }
}

/// Calculate availability compatibility between two windows
///
/// # Arguments
/// * `a` - First availability window
/// * `b` - Second availability window
///
/// # Returns
/// 1.0 if the windows share any day, 0.0 if they provably never do, and
/// [`NEUTRAL_SCORE`] when either window is entirely unset
#[inline]
pub fn date_overlap(a: &DateWindow, b: &DateWindow) -> f64 {
    if a.is_unset() || b.is_unset() {
        return NEUTRAL_SCORE;
    }

    if a.intersects(b) {
        1.0
    } else {
        0.0
    }
}
