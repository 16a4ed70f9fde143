//! Query window resolution and validation.
//!
//! A metrics query may name a start date, an end date, both or neither.
//! [`DateBounds`] captures which was given, [`DateBounds::resolve`] fills the
//! defaults once, and [`Window::validate_in`] enforces the range rules on the
//! result. A [`Window`] only exists once both steps succeeded.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};

use crate::MetricsError;

/// Longest allowed window, in whole calendar days.
pub const MAX_RANGE_DAYS: i64 = 30;

/// Window length used when the caller gives no dates at all.
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

// ---

/// Which ends of the window the caller supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBounds {
    Both {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    StartOnly {
        start: DateTime<Utc>,
    },
    /// Never valid: an end without a start is rejected.
    EndOnly {
        end: DateTime<Utc>,
    },
    Neither,
}

impl DateBounds {
    // ---
    pub fn from_options(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        // ---
        match (start, end) {
            (Some(start), Some(end)) => DateBounds::Both { start, end },
            (Some(start), None) => DateBounds::StartOnly { start },
            (None, Some(end)) => DateBounds::EndOnly { end },
            (None, None) => DateBounds::Neither,
        }
    }

    /// Fill in defaults relative to `now`, then validate in the local zone.
    pub fn resolve(self, now: DateTime<Utc>) -> Result<Window, MetricsError> {
        self.resolve_in(now, &Local)
    }

    /// As [`DateBounds::resolve`], with day arithmetic done in `tz`.
    pub fn resolve_in<Tz: TimeZone>(
        self,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<Window, MetricsError> {
        // ---
        let (start, end) = match self {
            DateBounds::Both { start, end } => (start, end),
            DateBounds::StartOnly { start } => (start, now),
            DateBounds::EndOnly { .. } => return Err(MetricsError::MissingStartDate),
            DateBounds::Neither => (now - Duration::hours(DEFAULT_WINDOW_HOURS), now),
        };

        tracing::debug!(bounds = ?self, %start, %end, "Resolved query window");
        Window::validate_in(start, end, now, tz)
    }
}

/// Resolved and validated inclusive `[start, end]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    // ---
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Check the range rules, first failure wins:
    /// 1. `start` after `now`
    /// 2. `start` after `end`
    /// 3. more than [`MAX_RANGE_DAYS`] whole days between the two, counted on
    ///    local date-times in `tz`
    pub fn validate_in<Tz: TimeZone>(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<Self, MetricsError> {
        // ---
        if start > now {
            return Err(MetricsError::FutureStartDate);
        }

        if start > end {
            return Err(MetricsError::InvertedRange);
        }

        let local_start = start.with_timezone(tz).naive_local();
        let local_end = end.with_timezone(tz).naive_local();
        if (local_end - local_start).num_days() > MAX_RANGE_DAYS {
            return Err(MetricsError::RangeTooLong);
        }

        Ok(Window { start, end })
    }
}
