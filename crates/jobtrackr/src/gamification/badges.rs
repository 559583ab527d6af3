use super::domain::{ApplicationRecord, ApplicationStatus, BadgeKind};

/// Counts and flags every badge predicate is evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSnapshot {
    pub application_count: usize,
    pub interview_count: usize,
    pub document_count: usize,
    pub has_offer: bool,
    pub has_accepted: bool,
    pub current_streak: u32,
    pub total_points: i64,
}

impl UserSnapshot {
    pub fn from_records(
        applications: &[ApplicationRecord],
        interview_count: usize,
        document_count: usize,
        current_streak: u32,
        total_points: i64,
    ) -> Self {
        let has_accepted = applications
            .iter()
            .any(|record| record.status == ApplicationStatus::Accepted);
        let has_offer = has_accepted
            || applications
                .iter()
                .any(|record| record.status == ApplicationStatus::Offer);

        Self {
            application_count: applications.len(),
            interview_count,
            document_count,
            has_offer,
            has_accepted,
            current_streak,
            total_points,
        }
    }
}

/// A badge paired with the predicate that unlocks it.
pub(crate) struct BadgeRule {
    pub badge: BadgeKind,
    pub qualifies: fn(&UserSnapshot) -> bool,
}

pub(crate) const RULES: [BadgeRule; 13] = [
    BadgeRule {
        badge: BadgeKind::FirstApplication,
        qualifies: |s| s.application_count >= 1,
    },
    BadgeRule {
        badge: BadgeKind::Applications10,
        qualifies: |s| s.application_count >= 10,
    },
    BadgeRule {
        badge: BadgeKind::Applications25,
        qualifies: |s| s.application_count >= 25,
    },
    BadgeRule {
        badge: BadgeKind::Applications50,
        qualifies: |s| s.application_count >= 50,
    },
    BadgeRule {
        badge: BadgeKind::Applications100,
        qualifies: |s| s.application_count >= 100,
    },
    BadgeRule {
        badge: BadgeKind::FirstInterview,
        qualifies: |s| s.interview_count >= 1,
    },
    BadgeRule {
        badge: BadgeKind::Interviews10,
        qualifies: |s| s.interview_count >= 10,
    },
    BadgeRule {
        badge: BadgeKind::FirstOffer,
        qualifies: |s| s.has_offer,
    },
    BadgeRule {
        badge: BadgeKind::JobAccepted,
        qualifies: |s| s.has_accepted,
    },
    BadgeRule {
        badge: BadgeKind::FirstDocument,
        qualifies: |s| s.document_count >= 1,
    },
    BadgeRule {
        badge: BadgeKind::Streak7,
        qualifies: |s| s.current_streak >= 7,
    },
    BadgeRule {
        badge: BadgeKind::Streak30,
        qualifies: |s| s.current_streak >= 30,
    },
    BadgeRule {
        badge: BadgeKind::Points1000,
        qualifies: |s| s.total_points >= 1000,
    },
];

pub fn qualifies(badge: BadgeKind, snapshot: &UserSnapshot) -> bool {
    RULES
        .iter()
        .find(|rule| rule.badge == badge)
        .is_some_and(|rule| (rule.qualifies)(snapshot))
}

/// Every badge whose predicate holds, regardless of what the user already owns.
pub fn eligible_badges(snapshot: &UserSnapshot) -> Vec<BadgeKind> {
    RULES
        .iter()
        .filter(|rule| (rule.qualifies)(snapshot))
        .map(|rule| rule.badge)
        .collect()
}
