mod schema;
mod store;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

pub use store::{Record, Store};

use crate::error::{Error, Result};
use crate::models::Actor;

/// Shared handle to the SQLite database holding the planning hierarchy.
///
/// Cloning is cheap; all clones share one connection.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        tracing::debug!("Opened database at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> anyhow::Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "okr-tracker")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("okr.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn).map_err(Error::Migration)
    }

    /// Run `work` inside a single transaction, stamping writes with `actor`.
    ///
    /// The transaction commits only if `work` returns `Ok`; any error rolls
    /// back every write made through the store.
    pub fn unit_of_work<T>(
        &self,
        actor: &Actor,
        work: impl FnOnce(&Store<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;
        let output = work(&Store::new(&tx, actor.clone()))?;
        tx.commit()?;
        Ok(output)
    }

    /// Run read-only `work` against the current committed state.
    pub fn read<T>(&self, work: impl FnOnce(&Store<'_>) -> Result<T>) -> Result<T> {
        let conn = self.conn.lock().expect("database lock poisoned");
        work(&Store::new(&conn, Actor::system()))
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}
