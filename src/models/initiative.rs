use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Audit;

/// A strategic initiative within a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initiative {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub progress: i32,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Initiative {
    pub fn new(project_id: Uuid, input: CreateInitiativeInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            title: input.title,
            description: input.description,
            progress: 0,
            audit: Audit::default(),
        }
    }
}

/// Input for adding an initiative to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInitiativeInput {
    pub title: String,
    pub description: Option<String>,
}

/// Input for updating an initiative. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInitiativeInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub progress: Option<i32>,
    pub active: Option<bool>,
}

impl UpdateInitiativeInput {
    pub fn apply(self, initiative: &mut Initiative) {
        if let Some(title) = self.title {
            initiative.title = title;
        }
        if let Some(description) = self.description {
            initiative.description = Some(description);
        }
        if let Some(progress) = self.progress {
            initiative.progress = progress;
        }
    }
}
