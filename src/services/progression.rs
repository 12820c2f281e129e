// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Progression engine: XP, levels and streaks.
//!
//! Pure functions only. Callers persist the records these functions return;
//! nothing here touches storage or the clock.

use crate::models::UserRecord;
use crate::time_utils::{now_rfc3339, StreakDay};

/// XP required to advance one level.
pub const XP_PER_LEVEL: u32 = 100;

/// Level for a given XP total. Level 1 at 0 XP, level 2 at 100 XP, etc.
pub fn level_for_xp(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

/// Total XP required to reach a level (level 1 requires 0).
pub fn total_xp_for_level(level: u32) -> u32 {
    level.saturating_sub(1) * XP_PER_LEVEL
}

/// XP remaining until the next level boundary.
pub fn xp_remaining_to_next_level(xp: u32) -> u32 {
    level_for_xp(xp) * XP_PER_LEVEL - xp
}

/// Progress within the current level, for progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct XpProgress {
    /// XP earned since the current level started
    pub current: u32,
    /// XP span of a level (always 100)
    pub needed: u32,
    /// Percent of the current level completed, capped at 100
    pub percent: u32,
}

/// XP progress within the current level.
pub fn xp_progress_within_level(xp: u32) -> XpProgress {
    let current = xp - total_xp_for_level(level_for_xp(xp));
    let percent = (current * 100 + XP_PER_LEVEL / 2) / XP_PER_LEVEL;
    XpProgress {
        current,
        needed: XP_PER_LEVEL,
        percent: percent.min(100),
    }
}

/// Whether the XP delta crossed a level boundary.
pub fn leveled_up(old_xp: u32, new_xp: u32) -> bool {
    level_for_xp(new_xp) > level_for_xp(old_xp)
}

/// Apply one successful completion to a user record.
///
/// Returns a new record; the input is untouched. The streak transition
/// follows `day`: `Consecutive` extends, `Reset` restarts at 1, `SameDay`
/// holds the streak while still crediting XP and the completion counter.
pub fn apply_completion(user: &UserRecord, xp_earned: u32, day: StreakDay) -> UserRecord {
    let mut updated = user.clone();

    updated.xp = user.xp + xp_earned;
    updated.level = level_for_xp(updated.xp);

    updated.current_streak = match day {
        StreakDay::Consecutive => user.current_streak + 1,
        StreakDay::Reset => 1,
        StreakDay::SameDay => user.current_streak.max(1),
    };
    updated.longest_streak = user.longest_streak.max(updated.current_streak);

    updated.total_lessons_completed = user.total_lessons_completed + 1;
    updated.updated_at = now_rfc3339();

    updated
}

// ─── Display helpers ─────────────────────────────────────────

/// "50/100 XP to Level 3" style progress text.
pub fn level_progress_text(xp: u32) -> String {
    let level = level_for_xp(xp);
    let current = xp - total_xp_for_level(level);
    format!("{}/{} XP to Level {}", current, XP_PER_LEVEL, level + 1)
}

/// Streak badge: more fire for longer streaks.
pub fn streak_emoji(streak: u32) -> &'static str {
    match streak {
        0 => "",
        1..=13 => "\u{1f525}",
        14..=29 => "\u{1f525}\u{1f525}",
        _ => "\u{1f525}\u{1f525}\u{1f525}",
    }
}

/// Toast message shown after a completion.
pub fn completion_message(xp_earned: u32, current_streak: u32, new_level: Option<u32>) -> String {
    if let Some(level) = new_level {
        return format!("\u{1f389} Level up! You're now Level {}!", level);
    }

    if current_streak > 0 {
        format!(
            "+{} XP | Streak: {} {}",
            xp_earned,
            current_streak,
            streak_emoji(current_streak)
        )
    } else {
        format!("+{} XP", xp_earned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_xp_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(900), 10);
    }

    #[test]
    fn test_total_xp_for_level() {
        assert_eq!(total_xp_for_level(1), 0);
        assert_eq!(total_xp_for_level(2), 100);
        assert_eq!(total_xp_for_level(10), 900);
    }

    #[test]
    fn test_xp_remaining_to_next_level() {
        assert_eq!(xp_remaining_to_next_level(0), 100);
        assert_eq!(xp_remaining_to_next_level(50), 50);
        assert_eq!(xp_remaining_to_next_level(99), 1);
        assert_eq!(xp_remaining_to_next_level(100), 100);
    }

    #[test]
    fn test_xp_progress_within_level() {
        let progress = xp_progress_within_level(150);
        assert_eq!(progress.current, 50);
        assert_eq!(progress.needed, 100);
        assert_eq!(progress.percent, 50);

        let full = xp_progress_within_level(100);
        assert_eq!(full.current, 0);
        assert_eq!(full.percent, 0);
    }

    #[test]
    fn test_leveled_up() {
        assert!(leveled_up(90, 100));
        assert!(!leveled_up(50, 99));
        assert!(leveled_up(0, 250));
    }

    fn fresh_user() -> UserRecord {
        UserRecord::new("user-1", true)
    }

    #[test]
    fn test_apply_completion_credits_xp_and_counter() {
        let user = fresh_user();
        let updated = apply_completion(&user, 50, StreakDay::Reset);

        assert_eq!(updated.xp, 50);
        assert_eq!(updated.level, 1);
        assert_eq!(updated.total_lessons_completed, 1);
        // Input untouched
        assert_eq!(user.xp, 0);
        assert_eq!(user.total_lessons_completed, 0);
    }

    #[test]
    fn test_apply_completion_level_boundary() {
        let mut user = fresh_user();
        user.xp = 90;
        user.level = 1;

        let updated = apply_completion(&user, 10, StreakDay::Reset);

        assert_eq!(updated.xp, 100);
        assert_eq!(updated.level, 2);
    }

    #[test]
    fn test_streak_scenario() {
        // Day 1: first-ever completion
        let user = fresh_user();
        let day1 = apply_completion(&user, 50, StreakDay::Reset);
        assert_eq!(day1.xp, 50);
        assert_eq!(day1.current_streak, 1);
        assert_eq!(day1.longest_streak, 1);

        // Days 2 and 3: consecutive
        let day2 = apply_completion(&day1, 50, StreakDay::Consecutive);
        assert_eq!(day2.current_streak, 2);
        assert_eq!(day2.longest_streak, 2);

        let day3 = apply_completion(&day2, 50, StreakDay::Consecutive);
        assert_eq!(day3.current_streak, 3);
        assert_eq!(day3.longest_streak, 3);

        // Gap day: streak restarts, longest keeps its high-water mark
        let day5 = apply_completion(&day3, 50, StreakDay::Reset);
        assert_eq!(day5.current_streak, 1);
        assert_eq!(day5.longest_streak, 3);
    }

    #[test]
    fn test_same_day_holds_streak() {
        let user = fresh_user();
        let first = apply_completion(&user, 10, StreakDay::Reset);
        let second = apply_completion(&first, 15, StreakDay::SameDay);

        assert_eq!(second.current_streak, 1);
        assert_eq!(second.longest_streak, 1);
        assert_eq!(second.xp, 25);
        assert_eq!(second.total_lessons_completed, 2);
    }

    #[test]
    fn test_longest_streak_invariant() {
        let mut user = fresh_user();
        for day in [
            StreakDay::Reset,
            StreakDay::Consecutive,
            StreakDay::SameDay,
            StreakDay::Consecutive,
            StreakDay::Reset,
            StreakDay::Consecutive,
        ] {
            user = apply_completion(&user, 10, day);
            assert!(user.longest_streak >= user.current_streak);
        }
    }

    #[test]
    fn test_streak_emoji_tiers() {
        assert_eq!(streak_emoji(0), "");
        assert_eq!(streak_emoji(1), "\u{1f525}");
        assert_eq!(streak_emoji(14), "\u{1f525}\u{1f525}");
        assert_eq!(streak_emoji(30), "\u{1f525}\u{1f525}\u{1f525}");
    }

    #[test]
    fn test_completion_message() {
        assert_eq!(
            completion_message(10, 0, None),
            "+10 XP"
        );
        assert_eq!(
            completion_message(10, 2, None),
            "+10 XP | Streak: 2 \u{1f525}"
        );
        assert_eq!(
            completion_message(10, 2, Some(2)),
            "\u{1f389} Level up! You're now Level 2!"
        );
    }
}
