use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::gamification::domain::{
    ApplicationRecord, ApplicationStatus, BadgeKind, DocumentKind, DocumentRecord, EarnedBadge,
    Goal, GoalId, InterviewRecord, PointEntry, Streak, UserId,
};
use crate::gamification::repository::{
    ActivityRepository, GamificationRepository, RepositoryError,
};
use crate::gamification::{GamificationConfig, GamificationService};

pub(super) fn user() -> UserId {
    UserId("user-42".to_string())
}

pub(super) fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn application(
    index: usize,
    status: ApplicationStatus,
    created_at: DateTime<Utc>,
) -> ApplicationRecord {
    ApplicationRecord {
        id: format!("app-{index}"),
        user_id: user(),
        company: format!("Company {index}"),
        position: "Backend Engineer".to_string(),
        status,
        created_at,
    }
}

pub(super) fn interview(index: usize, created_at: DateTime<Utc>) -> InterviewRecord {
    InterviewRecord {
        id: format!("itw-{index}"),
        user_id: user(),
        application_id: format!("app-{index}"),
        scheduled_at: created_at,
        created_at,
    }
}

pub(super) fn document(index: usize, created_at: DateTime<Utc>) -> DocumentRecord {
    DocumentRecord {
        id: format!("doc-{index}"),
        user_id: user(),
        kind: DocumentKind::Cv,
        name: format!("cv-{index}.pdf"),
        created_at,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryActivity {
    applications: Arc<Mutex<Vec<ApplicationRecord>>>,
    interviews: Arc<Mutex<Vec<InterviewRecord>>>,
    documents: Arc<Mutex<Vec<DocumentRecord>>>,
}

impl MemoryActivity {
    pub(super) fn add_application(&self, record: ApplicationRecord) {
        self.applications
            .lock()
            .expect("activity mutex poisoned")
            .push(record);
    }

    pub(super) fn add_interview(&self, record: InterviewRecord) {
        self.interviews
            .lock()
            .expect("activity mutex poisoned")
            .push(record);
    }

    pub(super) fn add_document(&self, record: DocumentRecord) {
        self.documents
            .lock()
            .expect("activity mutex poisoned")
            .push(record);
    }
}

impl ActivityRepository for MemoryActivity {
    fn applications(&self, user_id: &UserId) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.applications.lock().expect("activity mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect())
    }

    fn interviews(&self, user_id: &UserId) -> Result<Vec<InterviewRecord>, RepositoryError> {
        let guard = self.interviews.lock().expect("activity mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect())
    }

    fn documents(&self, user_id: &UserId) -> Result<Vec<DocumentRecord>, RepositoryError> {
        let guard = self.documents.lock().expect("activity mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct StoreState {
    badges: Vec<EarnedBadge>,
    points: Vec<PointEntry>,
    streaks: HashMap<UserId, Streak>,
    goals: Vec<Goal>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
    /// Badges whose insert fails with an unavailable error.
    broken_badges: Arc<Mutex<Vec<BadgeKind>>>,
    /// Goals whose update fails with an unavailable error.
    broken_goals: Arc<Mutex<Vec<GoalId>>>,
}

impl MemoryStore {
    pub(super) fn break_badge(&self, badge: BadgeKind) {
        self.broken_badges
            .lock()
            .expect("store mutex poisoned")
            .push(badge);
    }

    pub(super) fn break_goal(&self, goal_id: GoalId) {
        self.broken_goals
            .lock()
            .expect("store mutex poisoned")
            .push(goal_id);
    }

    pub(super) fn ledger(&self) -> Vec<PointEntry> {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .points
            .clone()
    }

    pub(super) fn set_streak(&self, streak: Streak) {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .streaks
            .insert(streak.user_id.clone(), streak);
    }
}

impl GamificationRepository for MemoryStore {
    fn has_badge(&self, user_id: &UserId, badge: BadgeKind) -> Result<bool, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard
            .badges
            .iter()
            .any(|earned| &earned.user_id == user_id && earned.badge == badge))
    }

    fn insert_badge(&self, badge: EarnedBadge) -> Result<EarnedBadge, RepositoryError> {
        if self
            .broken_badges
            .lock()
            .expect("store mutex poisoned")
            .contains(&badge.badge)
        {
            return Err(RepositoryError::Unavailable("badge table locked".to_string()));
        }
        let mut guard = self.state.lock().expect("store mutex poisoned");
        if guard
            .badges
            .iter()
            .any(|earned| earned.user_id == badge.user_id && earned.badge == badge.badge)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.badges.push(badge.clone());
        Ok(badge)
    }

    fn badges(&self, user_id: &UserId) -> Result<Vec<EarnedBadge>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard
            .badges
            .iter()
            .filter(|earned| &earned.user_id == user_id)
            .cloned()
            .collect())
    }

    fn append_points(&self, entry: PointEntry) -> Result<PointEntry, RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        guard.points.push(entry.clone());
        Ok(entry)
    }

    fn points(&self, user_id: &UserId) -> Result<Vec<PointEntry>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard
            .points
            .iter()
            .filter(|entry| &entry.user_id == user_id)
            .cloned()
            .collect())
    }

    fn streak(&self, user_id: &UserId) -> Result<Option<Streak>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard.streaks.get(user_id).cloned())
    }

    fn upsert_streak(&self, streak: Streak) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        guard.streaks.insert(streak.user_id.clone(), streak);
        Ok(())
    }

    fn insert_goal(&self, goal: Goal) -> Result<Goal, RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        guard.goals.push(goal.clone());
        Ok(goal)
    }

    fn goals(&self, user_id: &UserId) -> Result<Vec<Goal>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard
            .goals
            .iter()
            .filter(|goal| &goal.user_id == user_id)
            .cloned()
            .collect())
    }

    fn update_goal(&self, goal: Goal) -> Result<(), RepositoryError> {
        if self
            .broken_goals
            .lock()
            .expect("store mutex poisoned")
            .contains(&goal.id)
        {
            return Err(RepositoryError::Unavailable("goal table locked".to_string()));
        }
        let mut guard = self.state.lock().expect("store mutex poisoned");
        match guard.goals.iter_mut().find(|stored| stored.id == goal.id) {
            Some(stored) => {
                *stored = goal;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

/// Activity source that is always offline.
pub(super) struct OfflineActivity;

impl ActivityRepository for OfflineActivity {
    fn applications(&self, _user_id: &UserId) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn interviews(&self, _user_id: &UserId) -> Result<Vec<InterviewRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn documents(&self, _user_id: &UserId) -> Result<Vec<DocumentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) type MemoryService = GamificationService<MemoryActivity, MemoryStore>;

pub(super) fn build_service() -> (MemoryService, Arc<MemoryActivity>, Arc<MemoryStore>) {
    let activity = Arc::new(MemoryActivity::default());
    let store = Arc::new(MemoryStore::default());
    let service =
        GamificationService::new(activity.clone(), store.clone(), GamificationConfig::default());
    (service, activity, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
