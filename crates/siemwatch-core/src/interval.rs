//! Poll-interval backoff planning.
//!
//! When a cycle finds no events, the next cycle widens its lookback window by
//! one default step so events are not lost between runs; any cycle that finds
//! events snaps back to the default. Linear, bounded by a ceiling — once the
//! candidate would reach the ceiling the interval wraps back to the default
//! rather than growing without bound.

/// Default lookback window in minutes.
pub const DEFAULT_QUERY_INTERVAL_MIN: u64 = 15;

/// Ceiling for the widened lookback window (one day).
pub const MAX_QUERY_INTERVAL_MIN: u64 = 1440;

/// How the planned interval relates to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalOutcome {
    /// Events were found; interval reset to the default and the cycle
    /// proceeds to upsert.
    Reset,
    /// No events; interval widened by one default step. Cycle ends here.
    Widened,
    /// No events and the ceiling was reached; interval wrapped back to the
    /// default. Cycle ends here.
    Saturated,
}

/// The planned interval for the next run. Always persisted by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalPlan {
    pub interval_minutes: u64,
    pub outcome: IntervalOutcome,
}

impl IntervalPlan {
    /// Whether the current cycle should continue on to ticket upserts.
    pub fn proceed_to_upsert(&self) -> bool {
        self.outcome == IntervalOutcome::Reset
    }
}

/// Plan the next poll interval.
///
/// Pure function of the current interval, the bounds and whether this cycle
/// found any events; the caller persists the result unconditionally.
pub fn plan_next_interval(
    current_minutes: u64,
    default_minutes: u64,
    max_minutes: u64,
    found_any_events: bool,
) -> IntervalPlan {
    if found_any_events {
        return IntervalPlan {
            interval_minutes: default_minutes,
            outcome: IntervalOutcome::Reset,
        };
    }

    let candidate = current_minutes + default_minutes;
    if candidate < max_minutes {
        IntervalPlan {
            interval_minutes: candidate,
            outcome: IntervalOutcome::Widened,
        }
    } else {
        IntervalPlan {
            interval_minutes: default_minutes,
            outcome: IntervalOutcome::Saturated,
        }
    }
}
