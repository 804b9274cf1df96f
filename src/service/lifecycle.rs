//! Soft-delete and restore propagation through a subtree.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::Store;
use crate::error::Result;
use crate::models::*;

/// A change of a node's active flag.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Soft-delete, stamping every newly closed node with the same actor and time.
    Deactivate { actor: Actor, at: DateTime<Utc> },
    Restore,
}

impl Transition {
    /// The transition that moves a node to `active`.
    pub fn to(active: bool, actor: &Actor) -> Self {
        if active {
            Self::Restore
        } else {
            Self::Deactivate {
                actor: actor.clone(),
                at: Utc::now(),
            }
        }
    }

    /// Apply to a single node. Returns `true` if the node changed.
    ///
    /// Deactivation leaves already inactive nodes (and their closed stamp)
    /// alone. Restore always clears the closed stamp.
    fn apply(&self, node: &mut impl Auditable) -> bool {
        match self {
            Self::Deactivate { actor, at } => {
                if !node.is_active() {
                    return false;
                }
                node.soft_delete(actor, *at);
                true
            }
            Self::Restore => {
                let audit = node.audit();
                let changed =
                    !audit.active || audit.closed_by.is_some() || audit.closed_at.is_some();
                node.restore();
                changed
            }
        }
    }
}

/// Apply `transition` to `node` and every descendant.
///
/// `node` itself is left for the caller to save; descendants that change are
/// saved here. The walk visits all children regardless of their flag, so a
/// restore also reactivates descendants that were deleted on their own
/// before the ancestor was.
///
/// Returns the number of descendants saved.
pub fn cascade<N: Auditable>(
    store: &Store<'_>,
    node: &mut N,
    transition: &Transition,
) -> Result<usize> {
    transition.apply(node);
    cascade_children(store, node.kind(), node.id(), transition)
}

fn cascade_children(
    store: &Store<'_>,
    kind: NodeKind,
    id: Uuid,
    transition: &Transition,
) -> Result<usize> {
    let mut saved = 0;
    for mut child in store.children_of(kind, id)? {
        if transition.apply(&mut child) {
            store.save_node(&mut child)?;
            saved += 1;
            tracing::debug!(
                "Cascaded {:?} to {} {}",
                transition_name(transition),
                child.kind(),
                child.id()
            );
        }
        saved += cascade_children(store, child.kind(), child.id(), transition)?;
    }
    Ok(saved)
}

fn transition_name(transition: &Transition) -> &'static str {
    match transition {
        Transition::Deactivate { .. } => "soft-delete",
        Transition::Restore => "restore",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objective() -> Objective {
        Objective::new(
            Uuid::new_v4(),
            CreateObjectiveInput {
                title: "Q3 launch".to_string(),
                description: None,
                assignee: None,
                year: Some(2025),
                quarter: Some("Q3".to_string()),
                due_date: None,
            },
        )
    }

    #[test]
    fn deactivate_stamps_active_nodes() {
        let at = Utc::now();
        let transition = Transition::Deactivate {
            actor: Actor::new("lee@example.com"),
            at,
        };
        let mut node = objective();

        assert!(transition.apply(&mut node));
        assert!(!node.is_active());
        assert_eq!(node.audit.closed_by.as_deref(), Some("lee@example.com"));
        assert_eq!(node.audit.closed_at, Some(at));
    }

    #[test]
    fn deactivate_keeps_existing_closed_stamp() {
        let earlier = Utc::now() - chrono::Duration::days(3);
        let mut node = objective();
        node.soft_delete(&Actor::new("first@example.com"), earlier);

        let transition = Transition::to(false, &Actor::new("second@example.com"));
        assert!(!transition.apply(&mut node));
        assert_eq!(node.audit.closed_by.as_deref(), Some("first@example.com"));
        assert_eq!(node.audit.closed_at, Some(earlier));
    }

    #[test]
    fn restore_is_a_no_op_on_clean_active_nodes() {
        let mut node = objective();
        assert!(!Transition::Restore.apply(&mut node));
        assert!(node.is_active());
    }

    #[test]
    fn restore_reactivates_and_clears_stamp() {
        let mut node = objective();
        node.soft_delete(&Actor::system(), Utc::now());

        assert!(Transition::Restore.apply(&mut node));
        assert!(node.is_active());
        assert!(node.audit.closed_by.is_none());
    }
}
