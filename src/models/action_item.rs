use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Audit;

/// A concrete task under a key result. The only leaf of the hierarchy.
///
/// Progress is 100 when completed and 0 otherwise, unless a caller sets it
/// explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: Uuid,
    pub key_result_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_completed: bool,
    pub progress: i32,
    #[serde(flatten)]
    pub audit: Audit,
}

impl ActionItem {
    pub fn new(key_result_id: Uuid, input: CreateActionItemInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            key_result_id,
            title: input.title,
            description: input.description,
            assignee: input.assignee,
            due_date: input.due_date,
            is_completed: input.is_completed,
            progress: completion_progress(input.is_completed),
            audit: Audit::default(),
        }
    }
}

fn completion_progress(is_completed: bool) -> i32 {
    if is_completed {
        100
    } else {
        0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateActionItemInput {
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateActionItemInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub is_completed: Option<bool>,
    /// Explicit progress wins over the value implied by `is_completed`.
    pub progress: Option<i32>,
    pub active: Option<bool>,
}

impl UpdateActionItemInput {
    pub fn apply(self, item: &mut ActionItem) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if self.description.is_some() {
            item.description = self.description;
        }
        if self.assignee.is_some() {
            item.assignee = self.assignee;
        }
        if self.due_date.is_some() {
            item.due_date = self.due_date;
        }
        if let Some(progress) = self.progress {
            item.progress = progress;
        }
        if let Some(is_completed) = self.is_completed {
            item.is_completed = is_completed;
            if self.progress.is_none() {
                item.progress = completion_progress(is_completed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(is_completed: bool) -> ActionItem {
        ActionItem::new(
            Uuid::new_v4(),
            CreateActionItemInput {
                title: "Ship onboarding email".to_string(),
                is_completed,
                ..Default::default()
            },
        )
    }

    #[test]
    fn new_item_progress_follows_completion() {
        assert_eq!(item(true).progress, 100);
        assert_eq!(item(false).progress, 0);
    }

    #[test]
    fn completing_sets_full_progress() {
        let mut ai = item(false);
        UpdateActionItemInput {
            is_completed: Some(true),
            ..Default::default()
        }
        .apply(&mut ai);
        assert!(ai.is_completed);
        assert_eq!(ai.progress, 100);
    }

    #[test]
    fn explicit_progress_wins_over_completion() {
        let mut ai = item(false);
        UpdateActionItemInput {
            is_completed: Some(true),
            progress: Some(60),
            ..Default::default()
        }
        .apply(&mut ai);
        assert!(ai.is_completed);
        assert_eq!(ai.progress, 60);
    }
}
