use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Audit;

/// The root of a strategic plan.
///
/// A project owns its strategic initiatives. Its `progress` is the rounded
/// mean of its active initiatives and is maintained by the rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub progress: i32,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Project {
    pub fn new(input: CreateProjectInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            progress: 0,
            audit: Audit::default(),
        }
    }
}

/// Input for creating a new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub title: String,
    pub description: Option<String>,
}

/// Input for updating an existing project. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProjectInput {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Overwritten by the next rollup whenever the project has active initiatives.
    pub progress: Option<i32>,
    /// `false` soft-deletes the project and its subtree, `true` restores them.
    pub active: Option<bool>,
}

impl UpdateProjectInput {
    pub fn apply(self, project: &mut Project) {
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(description) = self.description {
            project.description = Some(description);
        }
        if let Some(progress) = self.progress {
            project.progress = progress;
        }
    }
}
