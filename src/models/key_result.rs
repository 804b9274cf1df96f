use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Audit;

/// A measurable result under an objective.
///
/// Progress is derived from, in order of precedence:
/// 1. the metric, while `manual_progress_set` locks the key result;
/// 2. the mean of its active action items;
/// 3. the metric (`metric_start` → `metric_target`, currently `metric_current`);
/// 4. otherwise the stored value is kept.
///
/// Editing `progress` or `metric_current` directly sets the lock. Any edit to
/// one of its action items clears it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyResult {
    pub id: Uuid,
    pub objective_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    /// Unit of the metric, e.g. `%`, `users`, `ms`.
    pub unit: Option<String>,
    pub metric_start: Option<f64>,
    pub metric_target: Option<f64>,
    pub metric_current: Option<f64>,
    pub progress: i32,
    #[serde(default)]
    pub manual_progress_set: bool,
    #[serde(flatten)]
    pub audit: Audit,
}

impl KeyResult {
    pub fn new(objective_id: Uuid, input: CreateKeyResultInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            objective_id,
            title: input.title,
            description: input.description,
            assignee: input.assignee,
            unit: input.unit,
            metric_start: input.metric_start,
            metric_target: input.metric_target,
            metric_current: input.metric_current,
            progress: 0,
            manual_progress_set: false,
            audit: Audit::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateKeyResultInput {
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub unit: Option<String>,
    pub metric_start: Option<f64>,
    pub metric_target: Option<f64>,
    pub metric_current: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateKeyResultInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub unit: Option<String>,
    pub metric_start: Option<f64>,
    pub metric_target: Option<f64>,
    pub metric_current: Option<f64>,
    pub progress: Option<i32>,
    pub active: Option<bool>,
}

impl UpdateKeyResultInput {
    /// Apply the patch. Setting `progress` or `metric_current` locks the key result.
    pub fn apply(self, key_result: &mut KeyResult) {
        if self.progress.is_some() || self.metric_current.is_some() {
            key_result.manual_progress_set = true;
        }
        if let Some(title) = self.title {
            key_result.title = title;
        }
        if self.description.is_some() {
            key_result.description = self.description;
        }
        if self.assignee.is_some() {
            key_result.assignee = self.assignee;
        }
        if self.unit.is_some() {
            key_result.unit = self.unit;
        }
        if self.metric_start.is_some() {
            key_result.metric_start = self.metric_start;
        }
        if self.metric_target.is_some() {
            key_result.metric_target = self.metric_target;
        }
        if self.metric_current.is_some() {
            key_result.metric_current = self.metric_current;
        }
        if let Some(progress) = self.progress {
            key_result.progress = progress;
        }
    }
}
