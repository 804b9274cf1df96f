//! The hierarchy orchestrator.
//!
//! Every public write runs as one unit of work: the change itself, any
//! lifecycle cascade and the rollup of the owning project commit together or
//! not at all.

pub mod lifecycle;
pub mod rollup;

use uuid::Uuid;

pub use lifecycle::{cascade, Transition};
pub use rollup::{derive_key_result, round_half_up};

use crate::db::{Database, Record, Store};
use crate::error::{Error, Result};
use crate::models::*;

#[derive(Clone)]
pub struct HierarchyService {
    db: Database,
}

impl HierarchyService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // ============================================================
    // Reads
    // ============================================================

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        self.db.read(|store| store.active::<Project>())
    }

    pub fn get_node(&self, kind: NodeKind, id: Uuid) -> Result<Node> {
        self.db.read(|store| store.get_node(kind, id))
    }

    /// The project with every descendant, inactive ones included.
    pub fn project_tree(&self, project_id: Uuid) -> Result<TreeNode> {
        self.db.read(|store| {
            let project: Project = store.get(project_id)?;
            build_tree(store, project.into())
        })
    }

    /// Every soft-deleted node of any kind.
    pub fn list_archived(&self) -> Result<Vec<Node>> {
        self.db.read(|store| store.inactive_nodes())
    }

    // ============================================================
    // Rollup
    // ============================================================

    pub fn recalculate_project(&self, project_id: Uuid) -> Result<Project> {
        self.db.unit_of_work(&Actor::system(), |store| {
            rollup::recalculate_project(store, project_id)
        })
    }

    // ============================================================
    // Create
    // ============================================================

    pub fn create_project(&self, actor: &Actor, input: CreateProjectInput) -> Result<Project> {
        self.db.unit_of_work(actor, |store| {
            let mut project = Project::new(input);
            store.save(&mut project)?;
            tracing::info!("Created project {} ({})", project.id, project.title);
            Ok(project)
        })
    }

    pub fn add_initiative(
        &self,
        actor: &Actor,
        project_id: Uuid,
        input: CreateInitiativeInput,
    ) -> Result<Initiative> {
        self.add_child::<Project, _>(actor, project_id, |id| Initiative::new(id, input))
    }

    pub fn add_goal(
        &self,
        actor: &Actor,
        initiative_id: Uuid,
        input: CreateGoalInput,
    ) -> Result<Goal> {
        self.add_child::<Initiative, _>(actor, initiative_id, |id| Goal::new(id, input))
    }

    pub fn add_objective(
        &self,
        actor: &Actor,
        goal_id: Uuid,
        input: CreateObjectiveInput,
    ) -> Result<Objective> {
        self.add_child::<Goal, _>(actor, goal_id, |id| Objective::new(id, input))
    }

    pub fn add_key_result(
        &self,
        actor: &Actor,
        objective_id: Uuid,
        input: CreateKeyResultInput,
    ) -> Result<KeyResult> {
        self.add_child::<Objective, _>(actor, objective_id, |id| KeyResult::new(id, input))
    }

    pub fn add_action_item(
        &self,
        actor: &Actor,
        key_result_id: Uuid,
        input: CreateActionItemInput,
    ) -> Result<ActionItem> {
        self.add_child::<KeyResult, _>(actor, key_result_id, |id| ActionItem::new(id, input))
    }

    /// Create any child kind under a parent named by kind and id.
    pub fn create_child(
        &self,
        actor: &Actor,
        parent_kind: NodeKind,
        parent_id: Uuid,
        child: NewChild,
    ) -> Result<Node> {
        let kind = child.kind();
        if kind.parent() != Some(parent_kind) {
            return Err(Error::Validation(format!(
                "a {} cannot be created under a {}",
                kind.as_str(),
                parent_kind.as_str()
            )));
        }

        Ok(match child {
            NewChild::Initiative(input) => self.add_initiative(actor, parent_id, input)?.into(),
            NewChild::Goal(input) => self.add_goal(actor, parent_id, input)?.into(),
            NewChild::Objective(input) => self.add_objective(actor, parent_id, input)?.into(),
            NewChild::KeyResult(input) => self.add_key_result(actor, parent_id, input)?.into(),
            NewChild::ActionItem(input) => self.add_action_item(actor, parent_id, input)?.into(),
        })
    }

    fn add_child<P: Record, C: Record>(
        &self,
        actor: &Actor,
        parent_id: Uuid,
        build: impl FnOnce(Uuid) -> C,
    ) -> Result<C> {
        self.db.unit_of_work(actor, |store| {
            let parent: P = store.get(parent_id)?;
            let mut child = build(parent.id());
            store.save(&mut child)?;
            tracing::info!("Created {} {} under {} {}", C::KIND, child.id(), P::KIND, parent_id);
            refresh(store, &child)
        })
    }

    // ============================================================
    // Update
    // ============================================================

    pub fn update_project(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateProjectInput,
    ) -> Result<Project> {
        validate_progress(input.progress)?;
        let active = input.active;
        self.update(actor, id, active, |n: &mut Project| input.apply(n))
    }

    pub fn update_initiative(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateInitiativeInput,
    ) -> Result<Initiative> {
        validate_progress(input.progress)?;
        let active = input.active;
        self.update(actor, id, active, |n: &mut Initiative| input.apply(n))
    }

    pub fn update_goal(&self, actor: &Actor, id: Uuid, input: UpdateGoalInput) -> Result<Goal> {
        validate_progress(input.progress)?;
        let active = input.active;
        self.update(actor, id, active, |n: &mut Goal| input.apply(n))
    }

    pub fn update_objective(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateObjectiveInput,
    ) -> Result<Objective> {
        validate_progress(input.progress)?;
        let active = input.active;
        self.update(actor, id, active, |n: &mut Objective| input.apply(n))
    }

    /// Setting `progress` or `metric_current` locks the key result before
    /// the rollup runs.
    pub fn update_key_result(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateKeyResultInput,
    ) -> Result<KeyResult> {
        validate_progress(input.progress)?;
        let active = input.active;
        self.update(actor, id, active, |n: &mut KeyResult| input.apply(n))
    }

    /// Any action item update unlocks its parent key result, so the rollup
    /// derives the key result from its action items again.
    pub fn update_action_item(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateActionItemInput,
    ) -> Result<ActionItem> {
        validate_progress(input.progress)?;
        let active = input.active;
        self.db.unit_of_work(actor, |store| {
            let item: ActionItem = patch(store, id, active, |n: &mut ActionItem| input.apply(n))?;

            let mut key_result: KeyResult = store.get(item.key_result_id)?;
            if key_result.manual_progress_set {
                key_result.manual_progress_set = false;
                store.save(&mut key_result)?;
                tracing::debug!("Unlocked key result {}", key_result.id);
            }

            refresh(store, &item)
        })
    }

    /// Apply a tagged partial update to the node `id`.
    pub fn update_node(&self, actor: &Actor, id: Uuid, update: NodeUpdate) -> Result<Node> {
        Ok(match update {
            NodeUpdate::Project(input) => self.update_project(actor, id, input)?.into(),
            NodeUpdate::Initiative(input) => self.update_initiative(actor, id, input)?.into(),
            NodeUpdate::Goal(input) => self.update_goal(actor, id, input)?.into(),
            NodeUpdate::Objective(input) => self.update_objective(actor, id, input)?.into(),
            NodeUpdate::KeyResult(input) => self.update_key_result(actor, id, input)?.into(),
            NodeUpdate::ActionItem(input) => self.update_action_item(actor, id, input)?.into(),
        })
    }

    /// Soft-delete a node and its subtree.
    pub fn soft_delete(&self, actor: &Actor, kind: NodeKind, id: Uuid) -> Result<Node> {
        self.update_node(actor, id, NodeUpdate::lifecycle(kind, false))
    }

    /// Reactivate a node and every node below it.
    pub fn restore(&self, actor: &Actor, kind: NodeKind, id: Uuid) -> Result<Node> {
        self.update_node(actor, id, NodeUpdate::lifecycle(kind, true))
    }

    fn update<N: Record>(
        &self,
        actor: &Actor,
        id: Uuid,
        active: Option<bool>,
        apply: impl FnOnce(&mut N),
    ) -> Result<N> {
        self.db.unit_of_work(actor, |store| {
            let node = patch(store, id, active, apply)?;
            refresh(store, &node)
        })
    }
}

/// Load `id`, apply the patch, cascade a changed active flag and save.
fn patch<N: Record>(
    store: &Store<'_>,
    id: Uuid,
    active: Option<bool>,
    apply: impl FnOnce(&mut N),
) -> Result<N> {
    let mut node: N = store.get(id)?;
    apply(&mut node);

    if let Some(active) = active.filter(|a| *a != node.is_active()) {
        let transition = Transition::to(active, store.actor());
        let descendants = cascade(store, &mut node, &transition)?;
        tracing::info!(
            "Set {} {} active={} ({} descendants updated)",
            N::KIND,
            id,
            active,
            descendants
        );
    }

    store.save(&mut node)?;
    Ok(node)
}

/// Roll up the project owning `node` and reload `node` with its new values.
fn refresh<N: Record>(store: &Store<'_>, node: &N) -> Result<N> {
    let project_id = owning_project(store, N::KIND, node.id())?;
    rollup::recalculate_project(store, project_id)?;
    store.get(node.id())
}

/// Walk up from `(kind, id)` to its project, reloading each ancestor.
pub fn owning_project(store: &Store<'_>, kind: NodeKind, id: Uuid) -> Result<Uuid> {
    let mut current = store.get_node(kind, id)?;
    while let Some((parent_kind, parent_id)) = current.parent() {
        current = store.get_node(parent_kind, parent_id)?;
    }
    Ok(current.id())
}

fn build_tree(store: &Store<'_>, node: Node) -> Result<TreeNode> {
    let children = store
        .children_of(node.kind(), node.id())?
        .into_iter()
        .map(|child| build_tree(store, child))
        .collect::<Result<Vec<_>>>()?;
    Ok(TreeNode { node, children })
}
