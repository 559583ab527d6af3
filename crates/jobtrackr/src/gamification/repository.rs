use super::domain::{
    ApplicationRecord, BadgeKind, DocumentRecord, EarnedBadge, Goal, InterviewRecord, PointEntry,
    Streak, UserId,
};

/// Read-only view over the tracking store that owns applications, interviews and documents.
pub trait ActivityRepository: Send + Sync {
    fn applications(&self, user_id: &UserId) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn interviews(&self, user_id: &UserId) -> Result<Vec<InterviewRecord>, RepositoryError>;
    fn documents(&self, user_id: &UserId) -> Result<Vec<DocumentRecord>, RepositoryError>;
}

/// Storage for badges, the point ledger, streaks and goals.
pub trait GamificationRepository: Send + Sync {
    fn has_badge(&self, user_id: &UserId, badge: BadgeKind) -> Result<bool, RepositoryError>;
    /// Must fail with [`RepositoryError::Conflict`] when the user already holds the badge.
    fn insert_badge(&self, badge: EarnedBadge) -> Result<EarnedBadge, RepositoryError>;
    fn badges(&self, user_id: &UserId) -> Result<Vec<EarnedBadge>, RepositoryError>;

    fn append_points(&self, entry: PointEntry) -> Result<PointEntry, RepositoryError>;
    fn points(&self, user_id: &UserId) -> Result<Vec<PointEntry>, RepositoryError>;

    fn streak(&self, user_id: &UserId) -> Result<Option<Streak>, RepositoryError>;
    fn upsert_streak(&self, streak: Streak) -> Result<(), RepositoryError>;

    fn insert_goal(&self, goal: Goal) -> Result<Goal, RepositoryError>;
    fn goals(&self, user_id: &UserId) -> Result<Vec<Goal>, RepositoryError>;
    fn update_goal(&self, goal: Goal) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
