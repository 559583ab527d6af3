use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for the account owning tracked records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pipeline position of a tracked job application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Screening,
    Interviewing,
    Offer,
    Accepted,
    Rejected,
    Withdrawn,
}

/// Application row as exposed by the tracking store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: String,
    pub user_id: UserId,
    pub company: String,
    pub position: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewRecord {
    pub id: String,
    pub user_id: UserId,
    pub application_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Cv,
    CoverLetter,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub user_id: UserId,
    pub kind: DocumentKind,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Fixed set of milestones a user can unlock once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BadgeKind {
    #[serde(rename = "first_application")]
    FirstApplication,
    #[serde(rename = "applications_10")]
    Applications10,
    #[serde(rename = "applications_25")]
    Applications25,
    #[serde(rename = "applications_50")]
    Applications50,
    #[serde(rename = "applications_100")]
    Applications100,
    #[serde(rename = "first_interview")]
    FirstInterview,
    #[serde(rename = "interviews_10")]
    Interviews10,
    #[serde(rename = "first_offer")]
    FirstOffer,
    #[serde(rename = "job_accepted")]
    JobAccepted,
    #[serde(rename = "first_document")]
    FirstDocument,
    #[serde(rename = "streak_7")]
    Streak7,
    #[serde(rename = "streak_30")]
    Streak30,
    #[serde(rename = "points_1000")]
    Points1000,
}

impl BadgeKind {
    pub const fn ordered() -> [Self; 13] {
        [
            Self::FirstApplication,
            Self::Applications10,
            Self::Applications25,
            Self::Applications50,
            Self::Applications100,
            Self::FirstInterview,
            Self::Interviews10,
            Self::FirstOffer,
            Self::JobAccepted,
            Self::FirstDocument,
            Self::Streak7,
            Self::Streak30,
            Self::Points1000,
        ]
    }

    /// Stable key used in ledger metadata and on the wire.
    pub const fn key(self) -> &'static str {
        match self {
            Self::FirstApplication => "first_application",
            Self::Applications10 => "applications_10",
            Self::Applications25 => "applications_25",
            Self::Applications50 => "applications_50",
            Self::Applications100 => "applications_100",
            Self::FirstInterview => "first_interview",
            Self::Interviews10 => "interviews_10",
            Self::FirstOffer => "first_offer",
            Self::JobAccepted => "job_accepted",
            Self::FirstDocument => "first_document",
            Self::Streak7 => "streak_7",
            Self::Streak30 => "streak_30",
            Self::Points1000 => "points_1000",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstApplication => "First Application",
            Self::Applications10 => "10 Applications",
            Self::Applications25 => "25 Applications",
            Self::Applications50 => "50 Applications",
            Self::Applications100 => "100 Applications",
            Self::FirstInterview => "First Interview",
            Self::Interviews10 => "10 Interviews",
            Self::FirstOffer => "First Offer",
            Self::JobAccepted => "Job Accepted",
            Self::FirstDocument => "First Document",
            Self::Streak7 => "7-Day Streak",
            Self::Streak30 => "30-Day Streak",
            Self::Points1000 => "1000 Points",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedBadge {
    pub user_id: UserId,
    pub badge: BadgeKind,
    pub earned_at: DateTime<Utc>,
}

/// Append-only ledger row. Totals are always derived by summing rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointEntry {
    pub user_id: UserId,
    pub amount: i64,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Reason codes written by the engine itself.
pub mod reasons {
    pub const BADGE_EARNED: &str = "badge_earned";
    pub const GOAL_COMPLETED: &str = "goal_completed";
    pub const APPLICATION_CREATED: &str = "application_created";
    pub const INTERVIEW_SCHEDULED: &str = "interview_scheduled";
    pub const DOCUMENT_UPLOADED: &str = "document_uploaded";
}

/// Consecutive-day activity counter, one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub user_id: UserId,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GoalId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    ApplicationsCount,
    InterviewsCount,
    StreakDays,
    PointsEarned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPeriod {
    Daily,
    Weekly,
    Monthly,
}

/// User-defined target tracked against live data for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserId,
    pub goal_type: GoalType,
    pub period: GoalPeriod,
    pub target: i64,
    pub current: i64,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGoal {
    pub goal_type: GoalType,
    pub period: GoalPeriod,
    pub target: i64,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Tracked actions that feed points, streaks, badges and goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ApplicationCreated,
    InterviewScheduled,
    DocumentUploaded,
}

impl ActivityKind {
    pub const fn reason(self) -> &'static str {
        match self {
            Self::ApplicationCreated => reasons::APPLICATION_CREATED,
            Self::InterviewScheduled => reasons::INTERVIEW_SCHEDULED,
            Self::DocumentUploaded => reasons::DOCUMENT_UPLOADED,
        }
    }
}
