use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::*;
use crate::error::{Error, Result};

/// The six levels of the planning hierarchy, root first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Project,
    Initiative,
    Goal,
    Objective,
    #[serde(alias = "key-result")]
    KeyResult,
    #[serde(alias = "action-item")]
    ActionItem,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        Self::Project,
        Self::Initiative,
        Self::Goal,
        Self::Objective,
        Self::KeyResult,
        Self::ActionItem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Initiative => "initiative",
            Self::Goal => "goal",
            Self::Objective => "objective",
            Self::KeyResult => "key_result",
            Self::ActionItem => "action_item",
        }
    }

    /// The only kind a node of this kind may be created under.
    pub fn parent(&self) -> Option<NodeKind> {
        match self {
            Self::Project => None,
            Self::Initiative => Some(Self::Project),
            Self::Goal => Some(Self::Initiative),
            Self::Objective => Some(Self::Goal),
            Self::KeyResult => Some(Self::Objective),
            Self::ActionItem => Some(Self::KeyResult),
        }
    }

    pub fn child(&self) -> Option<NodeKind> {
        match self {
            Self::Project => Some(Self::Initiative),
            Self::Initiative => Some(Self::Goal),
            Self::Goal => Some(Self::Objective),
            Self::Objective => Some(Self::KeyResult),
            Self::KeyResult => Some(Self::ActionItem),
            Self::ActionItem => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Initiative => "Strategic initiative",
            Self::Goal => "Goal",
            Self::Objective => "Objective",
            Self::KeyResult => "Key result",
            Self::ActionItem => "Action item",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Lifecycle and audit metadata shared by every node.
///
/// `created_*` and `updated_*` are stamped by the store when the node is saved;
/// `closed_*` are only populated while the node is soft-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_by: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl Default for Audit {
    fn default() -> Self {
        Self {
            active: true,
            created_by: None,
            created_at: None,
            updated_by: None,
            updated_at: None,
            closed_by: None,
            closed_at: None,
        }
    }
}

/// Operations common to all hierarchy nodes.
pub trait Auditable {
    fn id(&self) -> Uuid;
    fn kind(&self) -> NodeKind;
    /// Kind and id of the owning node. `None` only for projects.
    fn parent(&self) -> Option<(NodeKind, Uuid)>;
    fn audit(&self) -> &Audit;
    fn audit_mut(&mut self) -> &mut Audit;

    fn is_active(&self) -> bool {
        self.audit().active
    }

    fn soft_delete(&mut self, actor: &Actor, at: DateTime<Utc>) {
        let audit = self.audit_mut();
        audit.active = false;
        audit.closed_by = Some(actor.to_string());
        audit.closed_at = Some(at);
    }

    fn restore(&mut self) {
        let audit = self.audit_mut();
        audit.active = true;
        audit.closed_by = None;
        audit.closed_at = None;
    }
}

/// Percentage complete, `0..=100` for values written by the rollup.
pub trait Progress {
    fn progress(&self) -> i32;
    fn set_progress(&mut self, progress: i32);
}

macro_rules! impl_node {
    (@common $ty:ident) => {
        impl Progress for $ty {
            fn progress(&self) -> i32 {
                self.progress
            }

            fn set_progress(&mut self, progress: i32) {
                self.progress = progress;
            }
        }

        impl From<$ty> for Node {
            fn from(node: $ty) -> Self {
                Node::$ty(node)
            }
        }
    };
    (@auditable $ty:ident) => {
        fn id(&self) -> Uuid {
            self.id
        }

        fn kind(&self) -> NodeKind {
            NodeKind::$ty
        }

        fn audit(&self) -> &Audit {
            &self.audit
        }

        fn audit_mut(&mut self) -> &mut Audit {
            &mut self.audit
        }
    };
    ($ty:ident) => {
        impl Auditable for $ty {
            impl_node!(@auditable $ty);

            fn parent(&self) -> Option<(NodeKind, Uuid)> {
                None
            }
        }

        impl_node!(@common $ty);
    };
    ($ty:ident, $parent_kind:ident, $parent_field:ident) => {
        impl Auditable for $ty {
            impl_node!(@auditable $ty);

            fn parent(&self) -> Option<(NodeKind, Uuid)> {
                Some((NodeKind::$parent_kind, self.$parent_field))
            }
        }

        impl_node!(@common $ty);
    };
}

impl_node!(Project);
impl_node!(Initiative, Project, project_id);
impl_node!(Goal, Initiative, initiative_id);
impl_node!(Objective, Goal, goal_id);
impl_node!(KeyResult, Objective, objective_id);
impl_node!(ActionItem, KeyResult, key_result_id);

/// Any node of the hierarchy, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Project(Project),
    Initiative(Initiative),
    Goal(Goal),
    Objective(Objective),
    KeyResult(KeyResult),
    ActionItem(ActionItem),
}

macro_rules! with_node {
    ($node:expr, $n:ident => $body:expr) => {
        match $node {
            Node::Project($n) => $body,
            Node::Initiative($n) => $body,
            Node::Goal($n) => $body,
            Node::Objective($n) => $body,
            Node::KeyResult($n) => $body,
            Node::ActionItem($n) => $body,
        }
    };
}

impl Node {
    pub fn title(&self) -> &str {
        with_node!(self, n => &n.title)
    }
}

impl Auditable for Node {
    fn id(&self) -> Uuid {
        with_node!(self, n => n.id)
    }

    fn kind(&self) -> NodeKind {
        with_node!(self, n => n.kind())
    }

    fn parent(&self) -> Option<(NodeKind, Uuid)> {
        with_node!(self, n => n.parent())
    }

    fn audit(&self) -> &Audit {
        with_node!(self, n => &n.audit)
    }

    fn audit_mut(&mut self) -> &mut Audit {
        with_node!(self, n => &mut n.audit)
    }
}

impl Progress for Node {
    fn progress(&self) -> i32 {
        with_node!(self, n => n.progress)
    }

    fn set_progress(&mut self, progress: i32) {
        with_node!(self, n => n.progress = progress)
    }
}

/// A new node to create under an existing parent. The parent kind is implied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NewChild {
    Initiative(CreateInitiativeInput),
    Goal(CreateGoalInput),
    Objective(CreateObjectiveInput),
    KeyResult(CreateKeyResultInput),
    ActionItem(CreateActionItemInput),
}

impl NewChild {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Initiative(_) => NodeKind::Initiative,
            Self::Goal(_) => NodeKind::Goal,
            Self::Objective(_) => NodeKind::Objective,
            Self::KeyResult(_) => NodeKind::KeyResult,
            Self::ActionItem(_) => NodeKind::ActionItem,
        }
    }
}

/// A partial update for a node of the tagged kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeUpdate {
    Project(UpdateProjectInput),
    Initiative(UpdateInitiativeInput),
    Goal(UpdateGoalInput),
    Objective(UpdateObjectiveInput),
    KeyResult(UpdateKeyResultInput),
    ActionItem(UpdateActionItemInput),
}

impl NodeUpdate {
    /// An update that only flips the active flag.
    pub fn lifecycle(kind: NodeKind, active: bool) -> Self {
        let active = Some(active);
        match kind {
            NodeKind::Project => Self::Project(UpdateProjectInput {
                active,
                ..Default::default()
            }),
            NodeKind::Initiative => Self::Initiative(UpdateInitiativeInput {
                active,
                ..Default::default()
            }),
            NodeKind::Goal => Self::Goal(UpdateGoalInput {
                active,
                ..Default::default()
            }),
            NodeKind::Objective => Self::Objective(UpdateObjectiveInput {
                active,
                ..Default::default()
            }),
            NodeKind::KeyResult => Self::KeyResult(UpdateKeyResultInput {
                active,
                ..Default::default()
            }),
            NodeKind::ActionItem => Self::ActionItem(UpdateActionItemInput {
                active,
                ..Default::default()
            }),
        }
    }
}

/// Reject caller-supplied progress outside `0..=100`.
pub fn validate_progress(progress: Option<i32>) -> Result<()> {
    match progress {
        Some(p) if !(0..=100).contains(&p) => Err(Error::Validation(format!(
            "progress must be between 0 and 100, got {}",
            p
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_chain_parent_to_child() {
        for kind in NodeKind::ALL {
            if let Some(child) = kind.child() {
                assert_eq!(child.parent(), Some(kind));
            }
        }
        assert_eq!(NodeKind::Project.parent(), None);
        assert_eq!(NodeKind::ActionItem.child(), None);
    }

    #[test]
    fn kind_deserializes_snake_and_kebab_case() {
        let kind: NodeKind = serde_json::from_str("\"key_result\"").unwrap();
        assert_eq!(kind, NodeKind::KeyResult);
        let kind: NodeKind = serde_json::from_str("\"action-item\"").unwrap();
        assert_eq!(kind, NodeKind::ActionItem);
        assert!(serde_json::from_str::<NodeKind>("\"milestone\"").is_err());
        for kind in NodeKind::ALL {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.as_str());
        }
    }

    #[test]
    fn soft_delete_then_restore_clears_closed_stamp() {
        let mut goal = Goal::new(
            Uuid::new_v4(),
            CreateGoalInput {
                title: "Grow revenue".to_string(),
                description: None,
            },
        );
        goal.soft_delete(&Actor::new("ana@example.com"), Utc::now());
        assert!(!goal.is_active());
        assert_eq!(goal.audit.closed_by.as_deref(), Some("ana@example.com"));
        assert!(goal.audit.closed_at.is_some());

        goal.restore();
        assert!(goal.is_active());
        assert!(goal.audit.closed_by.is_none());
        assert!(goal.audit.closed_at.is_none());
    }

    #[test]
    fn node_serializes_with_kind_tag_and_flat_audit() {
        let node = Node::from(Project::new(CreateProjectInput {
            title: "Roadmap".to_string(),
            description: None,
        }));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "project");
        assert_eq!(json["title"], "Roadmap");
        assert_eq!(json["active"], true);
        assert_eq!(json["progress"], 0);
    }

    #[test]
    fn progress_validation_bounds() {
        assert!(validate_progress(None).is_ok());
        assert!(validate_progress(Some(0)).is_ok());
        assert!(validate_progress(Some(100)).is_ok());
        assert!(matches!(
            validate_progress(Some(101)),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            validate_progress(Some(-1)),
            Err(Error::Validation(_))
        ));
    }
}
