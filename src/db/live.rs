//! Continuously updating query results.
//!
//! A [`LiveQuery`] remembers a query and the tables it reads. After a write
//! to one of those tables commits, [`LiveQuery::changed`] wakes up and
//! returns the query re-run against the new state.
//!
//! ```rust,no_run
//! use workshop::db::{db::Db, tools::Tools};
//!
//! # async fn watch() -> Result<(), workshop::libs::error::WorkshopError> {
//! let db = Db::in_memory()?;
//! let mut available = Tools::new(&db).subscribe_available();
//! println!("{} tools on the shelf", available.current()?.len());
//! let fresh = available.changed().await?;
//! println!("now {}", fresh.len());
//! # Ok(())
//! # }
//! ```

use super::db::{Db, Table};
use crate::libs::error::WorkshopResult;
use rusqlite::Connection;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;

type QueryFn<T> = Box<dyn Fn(&Connection) -> WorkshopResult<T> + Send + Sync>;

pub struct LiveQuery<T> {
    db: Db,
    tables: Vec<Table>,
    changes: Receiver<Table>,
    query: QueryFn<T>,
}

impl<T> LiveQuery<T> {
    pub(crate) fn new<F>(db: &Db, tables: &[Table], query: F) -> Self
    where
        F: Fn(&Connection) -> WorkshopResult<T> + Send + Sync + 'static,
    {
        LiveQuery {
            db: db.clone(),
            tables: tables.to_vec(),
            changes: db.subscribe_changes(),
            query: Box::new(query),
        }
    }

    /// Runs the query against the current state.
    pub fn current(&self) -> WorkshopResult<T> {
        let conn = self.db.conn();
        (self.query)(&conn)
    }

    /// Waits for a commit touching one of the watched tables, then re-runs the query.
    ///
    /// A burst of notifications already queued yields a single refresh.
    pub async fn changed(&mut self) -> WorkshopResult<T> {
        loop {
            match self.changes.recv().await {
                Ok(table) if self.tables.contains(&table) => break,
                Ok(_) => continue,
                // Missed notifications may have been relevant
                Err(RecvError::Lagged(_)) => break,
                Err(RecvError::Closed) => break,
            }
        }

        loop {
            match self.changes.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }

        self.current()
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }
}
