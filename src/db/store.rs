//! Row mapping and the transaction-scoped node store.

use chrono::{NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::*;

const AUDIT_COLUMNS: &[&str] = &[
    "is_active",
    "created_by",
    "created_at",
    "updated_by",
    "updated_at",
    "closed_by",
    "closed_at",
];

/// A node type stored in its own table.
///
/// Columns are laid out as `id`, the parent key (if any), [`Record::FIELDS`]
/// and then the audit columns.
pub trait Record: Auditable + Progress + Into<Node> + Sized {
    const KIND: NodeKind;
    /// Kind-specific columns, in the order [`Record::values`] yields them.
    const FIELDS: &'static [&'static str];

    fn values(&self) -> Vec<Value>;
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

fn table(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Project => "projects",
        NodeKind::Initiative => "initiatives",
        NodeKind::Goal => "goals",
        NodeKind::Objective => "objectives",
        NodeKind::KeyResult => "key_results",
        NodeKind::ActionItem => "action_items",
    }
}

fn parent_column(kind: NodeKind) -> Option<&'static str> {
    match kind {
        NodeKind::Project => None,
        NodeKind::Initiative => Some("project_id"),
        NodeKind::Goal => Some("initiative_id"),
        NodeKind::Objective => Some("goal_id"),
        NodeKind::KeyResult => Some("objective_id"),
        NodeKind::ActionItem => Some("key_result_id"),
    }
}

fn upsert_sql(kind: NodeKind, fields: &[&str]) -> String {
    let mut columns = vec!["id"];
    columns.extend(parent_column(kind));
    columns.extend_from_slice(fields);
    columns.extend_from_slice(AUDIT_COLUMNS);

    let placeholders = vec!["?"; columns.len()].join(", ");
    let assignments = columns
        .iter()
        .filter(|c| !matches!(**c, "id" | "created_by" | "created_at"))
        .map(|c| format!("{c} = excluded.{c}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(id) DO UPDATE SET {}",
        table(kind),
        columns.join(", "),
        placeholders,
        assignments
    )
}

/// Reads and writes nodes inside one unit of work.
///
/// Every save is stamped with the store's actor. Obtain one through
/// [`super::Database::unit_of_work`] so all writes share a transaction.
pub struct Store<'conn> {
    conn: &'conn Connection,
    actor: Actor,
}

impl<'conn> Store<'conn> {
    pub fn new(conn: &'conn Connection, actor: Actor) -> Self {
        Self { conn, actor }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn load<N: Record>(&self, id: Uuid) -> Result<Option<N>> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", table(N::KIND));
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(N::from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Like [`Store::load`], but a missing row is [`Error::NotFound`].
    pub fn get<N: Record>(&self, id: Uuid) -> Result<N> {
        self.load(id)?.ok_or_else(|| Error::not_found(N::KIND, id))
    }

    /// Direct children of `parent_id`, active or not, in insertion order.
    pub fn children<N: Record>(&self, parent_id: Uuid) -> Result<Vec<N>> {
        match parent_column(N::KIND) {
            Some(column) => self.select(&format!("{} = ?", column), [parent_id.to_string()]),
            None => Ok(Vec::new()),
        }
    }

    pub fn active<N: Record>(&self) -> Result<Vec<N>> {
        self.select("is_active = 1", [])
    }

    pub fn inactive<N: Record>(&self) -> Result<Vec<N>> {
        self.select("is_active = 0", [])
    }

    fn select<N: Record, P: rusqlite::Params>(&self, filter: &str, params: P) -> Result<Vec<N>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} ORDER BY rowid",
            table(N::KIND),
            filter
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let nodes = stmt
            .query_map(params, |row| N::from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(nodes)
    }

    /// Insert or update `node`, stamping the audit fields.
    pub fn save<N: Record>(&self, node: &mut N) -> Result<()> {
        let now = Utc::now();
        let actor = self.actor.to_string();
        let audit = node.audit_mut();
        if audit.created_at.is_none() {
            audit.created_by = Some(actor.clone());
            audit.created_at = Some(now);
        }
        audit.updated_by = Some(actor);
        audit.updated_at = Some(now);

        let mut values = vec![Value::from(node.id().to_string())];
        if let Some((_, parent_id)) = node.parent() {
            values.push(Value::from(parent_id.to_string()));
        }
        values.extend(node.values());
        values.extend(audit_values(node.audit()));

        self.conn
            .execute(&upsert_sql(N::KIND, N::FIELDS), params_from_iter(values))?;
        Ok(())
    }

    // ============================================================
    // Kind-erased access
    // ============================================================

    pub fn load_node(&self, kind: NodeKind, id: Uuid) -> Result<Option<Node>> {
        Ok(match kind {
            NodeKind::Project => self.load::<Project>(id)?.map(Node::from),
            NodeKind::Initiative => self.load::<Initiative>(id)?.map(Node::from),
            NodeKind::Goal => self.load::<Goal>(id)?.map(Node::from),
            NodeKind::Objective => self.load::<Objective>(id)?.map(Node::from),
            NodeKind::KeyResult => self.load::<KeyResult>(id)?.map(Node::from),
            NodeKind::ActionItem => self.load::<ActionItem>(id)?.map(Node::from),
        })
    }

    pub fn get_node(&self, kind: NodeKind, id: Uuid) -> Result<Node> {
        self.load_node(kind, id)?.ok_or_else(|| Error::not_found(kind, id))
    }

    /// Children of a node of `parent_kind`. Action items have none.
    pub fn children_of(&self, parent_kind: NodeKind, parent_id: Uuid) -> Result<Vec<Node>> {
        Ok(match parent_kind.child() {
            Some(NodeKind::Initiative) => nodes(self.children::<Initiative>(parent_id)?),
            Some(NodeKind::Goal) => nodes(self.children::<Goal>(parent_id)?),
            Some(NodeKind::Objective) => nodes(self.children::<Objective>(parent_id)?),
            Some(NodeKind::KeyResult) => nodes(self.children::<KeyResult>(parent_id)?),
            Some(NodeKind::ActionItem) => nodes(self.children::<ActionItem>(parent_id)?),
            Some(NodeKind::Project) | None => Vec::new(),
        })
    }

    pub fn save_node(&self, node: &mut Node) -> Result<()> {
        match node {
            Node::Project(n) => self.save(n),
            Node::Initiative(n) => self.save(n),
            Node::Goal(n) => self.save(n),
            Node::Objective(n) => self.save(n),
            Node::KeyResult(n) => self.save(n),
            Node::ActionItem(n) => self.save(n),
        }
    }

    /// Every soft-deleted node, root kinds first.
    pub fn inactive_nodes(&self) -> Result<Vec<Node>> {
        let mut all = nodes(self.inactive::<Project>()?);
        all.extend(nodes(self.inactive::<Initiative>()?));
        all.extend(nodes(self.inactive::<Goal>()?));
        all.extend(nodes(self.inactive::<Objective>()?));
        all.extend(nodes(self.inactive::<KeyResult>()?));
        all.extend(nodes(self.inactive::<ActionItem>()?));
        Ok(all)
    }
}

fn nodes<N: Record>(records: Vec<N>) -> Vec<Node> {
    records.into_iter().map(Into::into).collect()
}

// ============================================================
// Record implementations
// ============================================================

impl Record for Project {
    const KIND: NodeKind = NodeKind::Project;
    const FIELDS: &'static [&'static str] = &["title", "description", "progress"];

    fn values(&self) -> Vec<Value> {
        vec![
            self.title.clone().into(),
            self.description.clone().into(),
            self.progress.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Project {
            id: parse_uuid(row.get("id")?),
            title: row.get("title")?,
            description: row.get("description")?,
            progress: row.get("progress")?,
            audit: audit_from_row(row)?,
        })
    }
}

impl Record for Initiative {
    const KIND: NodeKind = NodeKind::Initiative;
    const FIELDS: &'static [&'static str] = &["title", "description", "progress"];

    fn values(&self) -> Vec<Value> {
        vec![
            self.title.clone().into(),
            self.description.clone().into(),
            self.progress.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Initiative {
            id: parse_uuid(row.get("id")?),
            project_id: parse_uuid(row.get("project_id")?),
            title: row.get("title")?,
            description: row.get("description")?,
            progress: row.get("progress")?,
            audit: audit_from_row(row)?,
        })
    }
}

impl Record for Goal {
    const KIND: NodeKind = NodeKind::Goal;
    const FIELDS: &'static [&'static str] = &["title", "description", "progress"];

    fn values(&self) -> Vec<Value> {
        vec![
            self.title.clone().into(),
            self.description.clone().into(),
            self.progress.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Goal {
            id: parse_uuid(row.get("id")?),
            initiative_id: parse_uuid(row.get("initiative_id")?),
            title: row.get("title")?,
            description: row.get("description")?,
            progress: row.get("progress")?,
            audit: audit_from_row(row)?,
        })
    }
}

impl Record for Objective {
    const KIND: NodeKind = NodeKind::Objective;
    const FIELDS: &'static [&'static str] = &[
        "title",
        "description",
        "assignee",
        "year",
        "quarter",
        "due_date",
        "progress",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            self.title.clone().into(),
            self.description.clone().into(),
            self.assignee.clone().into(),
            self.year.into(),
            self.quarter.clone().into(),
            self.due_date.map(|d| d.to_string()).into(),
            self.progress.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Objective {
            id: parse_uuid(row.get("id")?),
            goal_id: parse_uuid(row.get("goal_id")?),
            title: row.get("title")?,
            description: row.get("description")?,
            assignee: row.get("assignee")?,
            year: row.get("year")?,
            quarter: row.get("quarter")?,
            due_date: row.get::<_, Option<String>>("due_date")?.and_then(parse_date),
            progress: row.get("progress")?,
            audit: audit_from_row(row)?,
        })
    }
}

impl Record for KeyResult {
    const KIND: NodeKind = NodeKind::KeyResult;
    const FIELDS: &'static [&'static str] = &[
        "title",
        "description",
        "assignee",
        "unit",
        "metric_start",
        "metric_target",
        "metric_current",
        "progress",
        "manual_progress_set",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            self.title.clone().into(),
            self.description.clone().into(),
            self.assignee.clone().into(),
            self.unit.clone().into(),
            self.metric_start.into(),
            self.metric_target.into(),
            self.metric_current.into(),
            self.progress.into(),
            self.manual_progress_set.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(KeyResult {
            id: parse_uuid(row.get("id")?),
            objective_id: parse_uuid(row.get("objective_id")?),
            title: row.get("title")?,
            description: row.get("description")?,
            assignee: row.get("assignee")?,
            unit: row.get("unit")?,
            metric_start: row.get("metric_start")?,
            metric_target: row.get("metric_target")?,
            metric_current: row.get("metric_current")?,
            progress: row.get("progress")?,
            manual_progress_set: row.get("manual_progress_set")?,
            audit: audit_from_row(row)?,
        })
    }
}

impl Record for ActionItem {
    const KIND: NodeKind = NodeKind::ActionItem;
    const FIELDS: &'static [&'static str] = &[
        "title",
        "description",
        "assignee",
        "due_date",
        "is_completed",
        "progress",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            self.title.clone().into(),
            self.description.clone().into(),
            self.assignee.clone().into(),
            self.due_date.map(|d| d.to_string()).into(),
            self.is_completed.into(),
            self.progress.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ActionItem {
            id: parse_uuid(row.get("id")?),
            key_result_id: parse_uuid(row.get("key_result_id")?),
            title: row.get("title")?,
            description: row.get("description")?,
            assignee: row.get("assignee")?,
            due_date: row.get::<_, Option<String>>("due_date")?.and_then(parse_date),
            is_completed: row.get("is_completed")?,
            progress: row.get("progress")?,
            audit: audit_from_row(row)?,
        })
    }
}

fn audit_values(audit: &Audit) -> Vec<Value> {
    vec![
        audit.active.into(),
        audit.created_by.clone().into(),
        audit.created_at.map(|t| t.to_rfc3339()).into(),
        audit.updated_by.clone().into(),
        audit.updated_at.map(|t| t.to_rfc3339()).into(),
        audit.closed_by.clone().into(),
        audit.closed_at.map(|t| t.to_rfc3339()).into(),
    ]
}

fn audit_from_row(row: &Row<'_>) -> rusqlite::Result<Audit> {
    Ok(Audit {
        active: row.get("is_active")?,
        created_by: row.get("created_by")?,
        created_at: row.get::<_, Option<String>>("created_at")?.map(parse_datetime),
        updated_by: row.get("updated_by")?,
        updated_at: row.get::<_, Option<String>>("updated_at")?.map(parse_datetime),
        closed_by: row.get("closed_by")?,
        closed_at: row.get::<_, Option<String>>("closed_at")?.map(parse_datetime),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_date(s: String) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}
