//! Badge awards, the point ledger, streak tracking and goal progress.
//!
//! Badge predicates and streak/goal arithmetic are pure functions; the service layers
//! persistence on top through the repository traits so both halves can be tested alone.

pub mod badges;
mod config;
pub mod domain;
pub mod goals;
pub mod repository;
pub mod router;
pub mod service;
pub mod streak;

#[cfg(test)]
mod tests;

pub use badges::{eligible_badges, UserSnapshot};
pub use config::GamificationConfig;
pub use domain::{
    reasons, ActivityKind, ApplicationRecord, ApplicationStatus, BadgeKind, DocumentKind,
    DocumentRecord, EarnedBadge, Goal, GoalId, GoalPeriod, GoalType, InterviewRecord, NewGoal,
    PointEntry, Streak, UserId,
};
pub use goals::PeriodWindow;
pub use repository::{ActivityRepository, GamificationRepository, RepositoryError};
pub use router::gamification_router;
pub use service::{
    ActivityOutcome, GamificationError, GamificationService, GamificationSummary, GoalRefresh,
};
pub use streak::StreakTransition;
