// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar-day and timestamp handling.
//!
//! Streak and daily-selection logic works on calendar dates, never on
//! timestamps, so a session spanning midnight cannot drift mid-computation.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current UTC timestamp as RFC3339.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

/// Today's calendar date (UTC).
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Day of the year, 1-based (Jan 1 = 1, Dec 31 = 365/366).
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// How a new completion relates to the previous completion date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakDay {
    /// First-ever completion, or a gap of more than one day: streak restarts at 1.
    Reset,
    /// Exactly one calendar day after the last completion: streak extends.
    Consecutive,
    /// Another completion on the same calendar day: streak is held unchanged.
    SameDay,
}

/// Classify `today` against the last completion date.
pub fn classify_streak_day(last_completion: Option<NaiveDate>, today: NaiveDate) -> StreakDay {
    match last_completion {
        None => StreakDay::Reset,
        Some(last) if last == today => StreakDay::SameDay,
        Some(last) if last.succ_opt() == Some(today) => StreakDay::Consecutive,
        Some(_) => StreakDay::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_of_year_is_one_based() {
        assert_eq!(day_of_year(date(2025, 1, 1)), 1);
        assert_eq!(day_of_year(date(2025, 12, 31)), 365);
        assert_eq!(day_of_year(date(2024, 12, 31)), 366); // leap year
    }

    #[test]
    fn test_first_completion_resets() {
        assert_eq!(classify_streak_day(None, date(2025, 3, 10)), StreakDay::Reset);
    }

    #[test]
    fn test_next_day_is_consecutive() {
        assert_eq!(
            classify_streak_day(Some(date(2025, 3, 9)), date(2025, 3, 10)),
            StreakDay::Consecutive
        );
    }

    #[test]
    fn test_consecutive_across_month_boundary() {
        assert_eq!(
            classify_streak_day(Some(date(2025, 2, 28)), date(2025, 3, 1)),
            StreakDay::Consecutive
        );
    }

    #[test]
    fn test_same_day_is_held() {
        assert_eq!(
            classify_streak_day(Some(date(2025, 3, 10)), date(2025, 3, 10)),
            StreakDay::SameDay
        );
    }

    #[test]
    fn test_gap_resets() {
        assert_eq!(
            classify_streak_day(Some(date(2025, 3, 8)), date(2025, 3, 10)),
            StreakDay::Reset
        );
    }

    #[test]
    fn test_backwards_date_resets() {
        // Clock skew: last completion recorded "in the future" falls back to a reset.
        assert_eq!(
            classify_streak_day(Some(date(2025, 3, 11)), date(2025, 3, 10)),
            StreakDay::Reset
        );
    }
}
