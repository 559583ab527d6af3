use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use jobtrackr::gamification::{
    ActivityRepository, ApplicationRecord, BadgeKind, DocumentRecord, EarnedBadge,
    GamificationConfig, GamificationRepository, GamificationService, Goal, InterviewRecord,
    PointEntry, RepositoryError, Streak, UserId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type InMemoryService =
    GamificationService<InMemoryActivityRepository, InMemoryGamificationStore>;

/// Service over fresh in-memory stores, plus a handle for feeding tracked activity.
pub(crate) fn in_memory_service() -> (Arc<InMemoryService>, Arc<InMemoryActivityRepository>) {
    let activity = Arc::new(InMemoryActivityRepository::default());
    let store = Arc::new(InMemoryGamificationStore::default());
    let service = GamificationService::new(
        activity.clone(),
        store,
        GamificationConfig::default(),
    );
    (Arc::new(service), activity)
}

/// Process-local stand-in for the tracking database.
#[derive(Default, Clone)]
pub(crate) struct InMemoryActivityRepository {
    applications: Arc<Mutex<Vec<ApplicationRecord>>>,
    interviews: Arc<Mutex<Vec<InterviewRecord>>>,
    documents: Arc<Mutex<Vec<DocumentRecord>>>,
}

impl InMemoryActivityRepository {
    pub(crate) fn add_application(&self, record: ApplicationRecord) {
        let mut guard = self.applications.lock().expect("activity mutex poisoned");
        guard.push(record);
    }

    pub(crate) fn add_interview(&self, record: InterviewRecord) {
        let mut guard = self.interviews.lock().expect("activity mutex poisoned");
        guard.push(record);
    }

    pub(crate) fn add_document(&self, record: DocumentRecord) {
        let mut guard = self.documents.lock().expect("activity mutex poisoned");
        guard.push(record);
    }
}

fn owned_by<T: Clone>(
    records: &Mutex<Vec<T>>,
    user_id: &UserId,
    owner: impl Fn(&T) -> &UserId,
) -> Vec<T> {
    let guard = records.lock().expect("activity mutex poisoned");
    guard
        .iter()
        .filter(|record| owner(record) == user_id)
        .cloned()
        .collect()
}

impl ActivityRepository for InMemoryActivityRepository {
    fn applications(&self, user_id: &UserId) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(owned_by(&self.applications, user_id, |record| &record.user_id))
    }

    fn interviews(&self, user_id: &UserId) -> Result<Vec<InterviewRecord>, RepositoryError> {
        Ok(owned_by(&self.interviews, user_id, |record| &record.user_id))
    }

    fn documents(&self, user_id: &UserId) -> Result<Vec<DocumentRecord>, RepositoryError> {
        Ok(owned_by(&self.documents, user_id, |record| &record.user_id))
    }
}

#[derive(Default)]
struct GamificationTables {
    badges: Vec<EarnedBadge>,
    points: Vec<PointEntry>,
    streaks: HashMap<UserId, Streak>,
    goals: Vec<Goal>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryGamificationStore {
    tables: Arc<Mutex<GamificationTables>>,
}

impl GamificationRepository for InMemoryGamificationStore {
    fn has_badge(&self, user_id: &UserId, badge: BadgeKind) -> Result<bool, RepositoryError> {
        let guard = self.tables.lock().expect("store mutex poisoned");
        Ok(guard
            .badges
            .iter()
            .any(|earned| &earned.user_id == user_id && earned.badge == badge))
    }

    fn insert_badge(&self, badge: EarnedBadge) -> Result<EarnedBadge, RepositoryError> {
        let mut guard = self.tables.lock().expect("store mutex poisoned");
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
        let guard = self.tables.lock().expect("store mutex poisoned");
        Ok(guard
            .badges
            .iter()
            .filter(|earned| &earned.user_id == user_id)
            .cloned()
            .collect())
    }

    fn append_points(&self, entry: PointEntry) -> Result<PointEntry, RepositoryError> {
        let mut guard = self.tables.lock().expect("store mutex poisoned");
        guard.points.push(entry.clone());
        Ok(entry)
    }

    fn points(&self, user_id: &UserId) -> Result<Vec<PointEntry>, RepositoryError> {
        let guard = self.tables.lock().expect("store mutex poisoned");
        Ok(guard
            .points
            .iter()
            .filter(|entry| &entry.user_id == user_id)
            .cloned()
            .collect())
    }

    fn streak(&self, user_id: &UserId) -> Result<Option<Streak>, RepositoryError> {
        let guard = self.tables.lock().expect("store mutex poisoned");
        Ok(guard.streaks.get(user_id).cloned())
    }

    fn upsert_streak(&self, streak: Streak) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("store mutex poisoned");
        guard.streaks.insert(streak.user_id.clone(), streak);
        Ok(())
    }

    fn insert_goal(&self, goal: Goal) -> Result<Goal, RepositoryError> {
        let mut guard = self.tables.lock().expect("store mutex poisoned");
        if guard.goals.iter().any(|stored| stored.id == goal.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.goals.push(goal.clone());
        Ok(goal)
    }

    fn goals(&self, user_id: &UserId) -> Result<Vec<Goal>, RepositoryError> {
        let guard = self.tables.lock().expect("store mutex poisoned");
        Ok(guard
            .goals
            .iter()
            .filter(|goal| &goal.user_id == user_id)
            .cloned()
            .collect())
    }

    fn update_goal(&self, goal: Goal) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("store mutex poisoned");
        match guard.goals.iter_mut().find(|stored| stored.id == goal.id) {
            Some(stored) => {
                *stored = goal;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
