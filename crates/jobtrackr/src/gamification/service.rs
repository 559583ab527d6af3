use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::badges::{BadgeRule, UserSnapshot, RULES};
use super::config::GamificationConfig;
use super::domain::{
    reasons, ActivityKind, BadgeKind, EarnedBadge, Goal, GoalId, NewGoal, PointEntry, Streak,
    UserId,
};
use super::goals::{recompute, ProgressInputs};
use super::repository::{ActivityRepository, GamificationRepository, RepositoryError};
use super::streak::{advance, StreakTransition};

/// Service composing the activity source, gamification store and point amounts.
pub struct GamificationService<A, G> {
    activity: Arc<A>,
    store: Arc<G>,
    config: GamificationConfig,
}

static GOAL_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_goal_id() -> GoalId {
    let id = GOAL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    GoalId(format!("goal-{id:06}"))
}

impl<A, G> GamificationService<A, G>
where
    A: ActivityRepository + 'static,
    G: GamificationRepository + 'static,
{
    pub fn new(activity: Arc<A>, store: Arc<G>, config: GamificationConfig) -> Self {
        Self {
            activity,
            store,
            config,
        }
    }

    pub fn config(&self) -> &GamificationConfig {
        &self.config
    }

    /// Collect the counts and flags the badge predicates read.
    pub fn snapshot(&self, user_id: &UserId) -> Result<UserSnapshot, GamificationError> {
        let applications = self.activity.applications(user_id)?;
        let interview_count = self.activity.interviews(user_id)?.len();
        let document_count = self.activity.documents(user_id)?.len();
        let current_streak = self
            .store
            .streak(user_id)?
            .map(|streak| streak.current_streak)
            .unwrap_or(0);
        let total_points = self.total_points(user_id)?;

        Ok(UserSnapshot::from_records(
            &applications,
            interview_count,
            document_count,
            current_streak,
            total_points,
        ))
    }

    /// Award every badge the user newly qualifies for, returning the kinds granted by this call.
    pub fn check_badges(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<BadgeKind>, GamificationError> {
        let mut snapshot = self.snapshot(user_id)?;
        let mut awarded = Vec::new();

        for rule in &RULES {
            match self.try_award_badge(user_id, rule, &mut snapshot, now) {
                Ok(true) => awarded.push(rule.badge),
                Ok(false) => {}
                Err(err) => warn!(
                    user_id = %user_id,
                    badge = rule.badge.key(),
                    error = %err,
                    "badge evaluation failed"
                ),
            }
        }

        if !awarded.is_empty() {
            info!(user_id = %user_id, count = awarded.len(), "badges awarded");
        }

        Ok(awarded)
    }

    fn try_award_badge(
        &self,
        user_id: &UserId,
        rule: &BadgeRule,
        snapshot: &mut UserSnapshot,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        if self.store.has_badge(user_id, rule.badge)? {
            return Ok(false);
        }
        if !(rule.qualifies)(&*snapshot) {
            return Ok(false);
        }

        let earned = EarnedBadge {
            user_id: user_id.clone(),
            badge: rule.badge,
            earned_at: now,
        };
        match self.store.insert_badge(earned) {
            Ok(_) => {}
            Err(RepositoryError::Conflict) => return Ok(false),
            Err(err) => return Err(err),
        }

        let bonus = PointEntry {
            user_id: user_id.clone(),
            amount: self.config.badge_bonus,
            reason: reasons::BADGE_EARNED.to_string(),
            metadata: Some(json!({ "badge": rule.badge.key() })),
            created_at: now,
        };
        // Later rules in the same pass must see this bonus.
        match self.store.append_points(bonus) {
            Ok(entry) => snapshot.total_points += entry.amount,
            Err(err) => warn!(
                user_id = %user_id,
                badge = rule.badge.key(),
                error = %err,
                "badge stored but bonus points were not recorded"
            ),
        }

        Ok(true)
    }

    /// Append a ledger row. Negative amounts are accepted as adjustments.
    pub fn award_points(
        &self,
        user_id: &UserId,
        amount: i64,
        reason: &str,
        metadata: Option<serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<PointEntry, GamificationError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(GamificationError::Invalid(
                "point reason must not be empty".to_string(),
            ));
        }

        let entry = self.store.append_points(PointEntry {
            user_id: user_id.clone(),
            amount,
            reason: reason.to_string(),
            metadata,
            created_at: now,
        })?;
        debug!(user_id = %user_id, amount, reason, "points awarded");
        Ok(entry)
    }

    pub fn total_points(&self, user_id: &UserId) -> Result<i64, GamificationError> {
        let entries = self.store.points(user_id)?;
        Ok(entries.iter().map(|entry| entry.amount).sum())
    }

    /// Ledger rows for a user, newest first.
    pub fn point_history(&self, user_id: &UserId) -> Result<Vec<PointEntry>, GamificationError> {
        let mut entries = self.store.points(user_id)?;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    pub fn update_streak(
        &self,
        user_id: &UserId,
        activity_at: DateTime<Utc>,
    ) -> Result<Streak, GamificationError> {
        let previous = self.store.streak(user_id)?;
        let (next, transition) = advance(previous.as_ref(), user_id, activity_at);

        if transition != StreakTransition::Unchanged {
            self.store.upsert_streak(next.clone())?;
        }
        debug!(
            user_id = %user_id,
            ?transition,
            current = next.current_streak,
            longest = next.longest_streak,
            "streak updated"
        );

        Ok(next)
    }

    pub fn create_goal(
        &self,
        user_id: &UserId,
        request: NewGoal,
        now: DateTime<Utc>,
    ) -> Result<Goal, GamificationError> {
        if request.target <= 0 {
            return Err(GamificationError::Invalid(
                "goal target must be greater than zero".to_string(),
            ));
        }
        if let Some(end_date) = request.end_date {
            if end_date < now.date_naive() {
                return Err(GamificationError::Invalid(format!(
                    "goal end date {end_date} is in the past"
                )));
            }
        }

        let goal = Goal {
            id: next_goal_id(),
            user_id: user_id.clone(),
            goal_type: request.goal_type,
            period: request.period,
            target: request.target,
            current: 0,
            completed: false,
            completed_at: None,
            end_date: request.end_date,
            created_at: now,
        };

        let stored = self.store.insert_goal(goal)?;
        Ok(stored)
    }

    pub fn goals(&self, user_id: &UserId) -> Result<Vec<Goal>, GamificationError> {
        Ok(self.store.goals(user_id)?)
    }

    /// Recompute progress for every open goal and settle completions.
    pub fn update_goals(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<GoalRefresh, GamificationError> {
        let active: Vec<Goal> = self
            .store
            .goals(user_id)?
            .into_iter()
            .filter(|goal| !goal.completed)
            .collect();

        let mut refresh = GoalRefresh::default();
        if active.is_empty() {
            return Ok(refresh);
        }

        let inputs = ProgressInputs {
            applications: self.activity.applications(user_id)?,
            interviews: self.activity.interviews(user_id)?,
            points: self.store.points(user_id)?,
            streak: self.store.streak(user_id)?,
        };

        for goal in &active {
            let update = recompute(goal, &inputs, now);
            if let Err(err) = self.store.update_goal(update.goal.clone()) {
                warn!(
                    user_id = %user_id,
                    goal_id = %update.goal.id.0,
                    error = %err,
                    "goal progress update failed"
                );
                continue;
            }

            if update.newly_completed {
                info!(user_id = %user_id, goal_id = %update.goal.id.0, "goal completed");
                let bonus = PointEntry {
                    user_id: user_id.clone(),
                    amount: self.config.goal_bonus,
                    reason: reasons::GOAL_COMPLETED.to_string(),
                    metadata: Some(json!({ "goal_id": update.goal.id.0 })),
                    created_at: now,
                };
                if let Err(err) = self.store.append_points(bonus) {
                    warn!(
                        user_id = %user_id,
                        goal_id = %update.goal.id.0,
                        error = %err,
                        "goal completed but bonus points were not recorded"
                    );
                }
                refresh.completed.push(update.goal.id.clone());
            }

            refresh.updated.push(update.goal);
        }

        Ok(refresh)
    }

    /// Full pass run after a tracked action: points, streak, badges, then goals.
    pub fn record_activity(
        &self,
        user_id: &UserId,
        kind: ActivityKind,
        occurred_at: DateTime<Utc>,
    ) -> Result<ActivityOutcome, GamificationError> {
        let amount = self.config.activity_points(kind);
        let entry = self.award_points(user_id, amount, kind.reason(), None, occurred_at)?;
        let streak = self.update_streak(user_id, occurred_at)?;
        let new_badges = self.check_badges(user_id, occurred_at)?;
        let goals = self.update_goals(user_id, occurred_at)?;

        Ok(ActivityOutcome {
            points_awarded: entry.amount,
            streak,
            new_badges,
            completed_goals: goals.completed,
        })
    }

    pub fn summary(&self, user_id: &UserId) -> Result<GamificationSummary, GamificationError> {
        Ok(GamificationSummary {
            user_id: user_id.clone(),
            total_points: self.total_points(user_id)?,
            streak: self.store.streak(user_id)?,
            badges: self.store.badges(user_id)?,
            goals: self.store.goals(user_id)?,
        })
    }
}

/// Goals touched by one refresh pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GoalRefresh {
    pub updated: Vec<Goal>,
    pub completed: Vec<GoalId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityOutcome {
    pub points_awarded: i64,
    pub streak: Streak,
    pub new_badges: Vec<BadgeKind>,
    pub completed_goals: Vec<GoalId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GamificationSummary {
    pub user_id: UserId,
    pub total_points: i64,
    pub streak: Option<Streak>,
    pub badges: Vec<EarnedBadge>,
    pub goals: Vec<Goal>,
}

/// Error raised by the gamification service.
#[derive(Debug, thiserror::Error)]
pub enum GamificationError {
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
