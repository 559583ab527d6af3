use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};

use super::domain::{
    ApplicationRecord, Goal, GoalPeriod, GoalType, InterviewRecord, PointEntry, Streak,
};

/// Half-open `[start, end)` range of UTC instants covered by a goal period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PeriodWindow {
    /// Window containing `now`: today, the week starting Sunday, or the calendar month.
    pub fn for_period(period: GoalPeriod, now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let (start, end) = match period {
            GoalPeriod::Daily => (today, today + Days::new(1)),
            GoalPeriod::Weekly => {
                let offset = u64::from(today.weekday().num_days_from_sunday());
                let start = today - Days::new(offset);
                (start, start + Days::new(7))
            }
            GoalPeriod::Monthly => {
                let start = today.with_day(1).unwrap_or(today);
                (start, start + Months::new(1))
            }
        };

        Self {
            start: midnight(start),
            end: midnight(end),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Data a progress recomputation reads from; loaded once per refresh pass.
#[derive(Debug, Clone, Default)]
pub struct ProgressInputs {
    pub applications: Vec<ApplicationRecord>,
    pub interviews: Vec<InterviewRecord>,
    pub points: Vec<PointEntry>,
    pub streak: Option<Streak>,
}

/// Current value of a goal type inside the given window.
pub fn measure(goal_type: GoalType, window: &PeriodWindow, inputs: &ProgressInputs) -> i64 {
    match goal_type {
        GoalType::ApplicationsCount => inputs
            .applications
            .iter()
            .filter(|record| window.contains(record.created_at))
            .count() as i64,
        GoalType::InterviewsCount => inputs
            .interviews
            .iter()
            .filter(|record| window.contains(record.created_at))
            .count() as i64,
        GoalType::StreakDays => inputs
            .streak
            .as_ref()
            .map(|streak| i64::from(streak.current_streak))
            .unwrap_or(0),
        GoalType::PointsEarned => inputs
            .points
            .iter()
            .filter(|entry| window.contains(entry.created_at))
            .map(|entry| entry.amount)
            .sum(),
    }
}

/// Result of recomputing one goal; `newly_completed` is set only on the transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalUpdate {
    pub goal: Goal,
    pub newly_completed: bool,
}

pub fn recompute(goal: &Goal, inputs: &ProgressInputs, now: DateTime<Utc>) -> GoalUpdate {
    let window = PeriodWindow::for_period(goal.period, now);
    let mut next = goal.clone();
    next.current = measure(goal.goal_type, &window, inputs);

    let newly_completed = !goal.completed && next.current >= next.target;
    if newly_completed {
        next.completed = true;
        next.completed_at = Some(now);
    }

    GoalUpdate {
        goal: next,
        newly_completed,
    }
}
