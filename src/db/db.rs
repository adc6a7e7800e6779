//! Store handle shared by all repositories.
//!
//! A [`Db`] owns one SQLite connection behind a mutex plus a broadcast
//! channel announcing which table a committed write touched. It is cheap to
//! clone; every repository receives a clone at construction, so nothing in
//! the crate reaches for a global connection.
//!
//! ```rust
//! use workshop::db::{db::Db, students::Students};
//! use workshop::libs::student::Student;
//!
//! let db = Db::in_memory()?;
//! let students = Students::new(&db);
//! students.insert(&Student::new("2024-017", "Siti Rahma", "XI TKR 2"))?;
//! # Ok::<(), workshop::libs::error::WorkshopError>(())
//! ```

use crate::db::migrations::init_with_migrations;
use crate::libs::config::Config;
use crate::libs::error::WorkshopResult;
use parking_lot::{Mutex, MutexGuard};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Pending change notifications kept per subscriber before it lags.
const CHANGE_CAPACITY: usize = 64;

/// Tables whose changes are announced to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Students,
    Tools,
    Sessions,
    SessionTools,
    ToolUsage,
}

#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
    changes: broadcast::Sender<Table>,
}

impl Db {
    /// Opens the database named by the configuration and applies pending migrations.
    pub fn new() -> anyhow::Result<Db> {
        let path = Config::read()?.database_path()?;
        Ok(Self::open(path)?)
    }

    pub fn open(path: impl AsRef<Path>) -> WorkshopResult<Db> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Private in-memory database, mainly for tests.
    pub fn in_memory() -> WorkshopResult<Db> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Raw connection to the configured database with no migrations applied.
    pub fn new_without_migrations() -> anyhow::Result<Connection> {
        let path = Config::read()?.database_path()?;
        Ok(Connection::open(path)?)
    }

    fn from_connection(mut conn: Connection) -> WorkshopResult<Db> {
        conn.pragma_update(None, "foreign_keys", true)?;
        init_with_migrations(&mut conn)?;

        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Ok(Db {
            conn: Arc::new(Mutex::new(conn)),
            changes,
        })
    }

    /// Locks the connection. The guard must be dropped before calling
    /// another repository method, the mutex is not reentrant.
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    /// Announces committed writes to `tables`.
    pub fn notify(&self, tables: &[Table]) {
        for table in tables {
            // No receivers is fine: nobody is subscribed.
            let _ = self.changes.send(*table);
        }
    }

    pub fn subscribe_changes(&self) -> broadcast::Receiver<Table> {
        self.changes.subscribe()
    }
}
