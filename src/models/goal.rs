use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Audit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub initiative_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub progress: i32,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Goal {
    pub fn new(initiative_id: Uuid, input: CreateGoalInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            initiative_id,
            title: input.title,
            description: input.description,
            progress: 0,
            audit: Audit::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGoalInput {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGoalInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub progress: Option<i32>,
    pub active: Option<bool>,
}

impl UpdateGoalInput {
    pub fn apply(self, goal: &mut Goal) {
        if let Some(title) = self.title {
            goal.title = title;
        }
        if let Some(description) = self.description {
            goal.description = Some(description);
        }
        if let Some(progress) = self.progress {
            goal.progress = progress;
        }
    }
}
