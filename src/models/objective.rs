use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Audit;

/// A time-boxed objective, usually scoped to a year and quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub year: Option<i32>,
    /// Free-form quarter label such as `Q3`.
    pub quarter: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub progress: i32,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Objective {
    pub fn new(goal_id: Uuid, input: CreateObjectiveInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            goal_id,
            title: input.title,
            description: input.description,
            assignee: input.assignee,
            year: input.year,
            quarter: input.quarter,
            due_date: input.due_date,
            progress: 0,
            audit: Audit::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateObjectiveInput {
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub year: Option<i32>,
    pub quarter: Option<String>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateObjectiveInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub year: Option<i32>,
    pub quarter: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub progress: Option<i32>,
    pub active: Option<bool>,
}

impl UpdateObjectiveInput {
    pub fn apply(self, objective: &mut Objective) {
        if let Some(title) = self.title {
            objective.title = title;
        }
        if self.description.is_some() {
            objective.description = self.description;
        }
        if self.assignee.is_some() {
            objective.assignee = self.assignee;
        }
        if self.year.is_some() {
            objective.year = self.year;
        }
        if self.quarter.is_some() {
            objective.quarter = self.quarter;
        }
        if self.due_date.is_some() {
            objective.due_date = self.due_date;
        }
        if let Some(progress) = self.progress {
            objective.progress = progress;
        }
    }
}
