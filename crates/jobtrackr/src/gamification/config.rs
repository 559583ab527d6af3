use serde::{Deserialize, Serialize};

use super::domain::ActivityKind;

/// Point amounts granted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamificationConfig {
    pub badge_bonus: i64,
    pub goal_bonus: i64,
    pub application_points: i64,
    pub interview_points: i64,
    pub document_points: i64,
}

impl GamificationConfig {
    pub fn activity_points(&self, kind: ActivityKind) -> i64 {
        match kind {
            ActivityKind::ApplicationCreated => self.application_points,
            ActivityKind::InterviewScheduled => self.interview_points,
            ActivityKind::DocumentUploaded => self.document_points,
        }
    }
}

impl Default for GamificationConfig {
    fn default() -> Self {
        Self {
            badge_bonus: 50,
            goal_bonus: 100,
            application_points: 10,
            interview_points: 20,
            document_points: 5,
        }
    }
}
