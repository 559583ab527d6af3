use chrono::{DateTime, Utc};

use super::domain::{Streak, UserId};

/// How an activity moved the user's streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTransition {
    Started,
    Unchanged,
    Extended,
    Reset,
}

/// Whole calendar days between two instants; time of day is discarded first.
pub fn calendar_days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (later.date_naive() - earlier.date_naive()).num_days()
}

/// Apply one activity to the previous streak state.
///
/// Activities dated before the last recorded activity leave the streak untouched so
/// replays of old events cannot rewind `last_activity_at`.
pub fn advance(
    previous: Option<&Streak>,
    user_id: &UserId,
    activity_at: DateTime<Utc>,
) -> (Streak, StreakTransition) {
    let Some(previous) = previous else {
        let started = Streak {
            user_id: user_id.clone(),
            current_streak: 1,
            longest_streak: 1,
            last_activity_at: activity_at,
        };
        return (started, StreakTransition::Started);
    };

    match calendar_days_between(previous.last_activity_at, activity_at) {
        days if days <= 0 => (previous.clone(), StreakTransition::Unchanged),
        1 => {
            let current_streak = previous.current_streak + 1;
            let next = Streak {
                user_id: previous.user_id.clone(),
                current_streak,
                longest_streak: previous.longest_streak.max(current_streak),
                last_activity_at: activity_at,
            };
            (next, StreakTransition::Extended)
        }
        _ => {
            let next = Streak {
                user_id: previous.user_id.clone(),
                current_streak: 1,
                longest_streak: previous.longest_streak.max(1),
                last_activity_at: activity_at,
            };
            (next, StreakTransition::Reset)
        }
    }
}
