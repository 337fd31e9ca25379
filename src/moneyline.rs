//! Money-line odds derived from a vote tally
//!
//! The line for a side is (total votes / votes for that side) * 100, so the
//! less popular side carries the higher line. A side with zero votes gets a
//! line of 0, as does an empty tally; neither is an error.

use serde::{Deserialize, Serialize};

use crate::models::Tally;

/// Money-line odds for both sides of a room
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoneyLine {
    pub yes_line: f64,
    pub no_line: f64,
}

/// Compute money-line odds from raw vote counts.
///
/// No rounding is applied here; rendering to two decimal places is a
/// presentation concern.
pub fn compute(yes_count: u32, no_count: u32) -> MoneyLine {
    let total = yes_count + no_count;
    if total == 0 {
        return MoneyLine {
            yes_line: 0.0,
            no_line: 0.0,
        };
    }

    let total = f64::from(total);
    let yes_line = if yes_count > 0 {
        (total / f64::from(yes_count)) * 100.0
    } else {
        0.0
    };
    let no_line = if no_count > 0 {
        (total / f64::from(no_count)) * 100.0
    } else {
        0.0
    };

    MoneyLine { yes_line, no_line }
}

impl MoneyLine {
    pub fn from_tally(tally: &Tally) -> Self {
        compute(tally.yes_count, tally.no_count)
    }
}
