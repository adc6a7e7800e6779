//! Database schema migration management and versioning.
//!
//! Migrations are registered in version order and applied by
//! [`MigrationManager::run_migrations`] inside one transaction; the
//! `migrations` table records what has been applied.
//!
//! ```rust
//! use workshop::db::migrations::{get_db_version, init_with_migrations};
//! use rusqlite::Connection;
//!
//! let mut conn = Connection::open_in_memory()?;
//! init_with_migrations(&mut conn)?;
//! assert!(get_db_version(&conn)? > 0);
//! # Ok::<(), workshop::libs::error::WorkshopError>(())
//! ```

use crate::libs::error::WorkshopResult;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_error};
use rusqlite::{params, Connection, Transaction};

const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug, Clone)]
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> rusqlite::Result<()>,
}

/// Registry of every schema migration, in version order.
pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl MigrationManager {
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    fn register_migrations(&mut self) {
        // Version 1: people and inventory
        self.add_migration(1, "create_students_and_tools", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS students (
                    id INTEGER PRIMARY KEY,
                    student_id TEXT NOT NULL UNIQUE,
                    full_name TEXT NOT NULL,
                    class_name TEXT NOT NULL,
                    email TEXT,
                    phone TEXT,
                    address TEXT,
                    is_active BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
                )",
                [],
            )?;

            // The CHECK keeps stock within 0..=quantity whatever path writes it
            tx.execute(
                "CREATE TABLE IF NOT EXISTS tools (
                    id INTEGER PRIMARY KEY,
                    code TEXT NOT NULL UNIQUE,
                    name TEXT NOT NULL,
                    category TEXT NOT NULL,
                    description TEXT,
                    location TEXT,
                    quantity INTEGER NOT NULL DEFAULT 1,
                    available_quantity INTEGER NOT NULL DEFAULT 1,
                    status TEXT NOT NULL DEFAULT 'Available',
                    is_active BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    CHECK (available_quantity >= 0 AND available_quantity <= quantity)
                )",
                [],
            )?;
            Ok(())
        });

        // Version 2: sessions, their booked tools and wear records
        self.add_migration(2, "create_sessions_and_usage", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS workshop_sessions (
                    id INTEGER PRIMARY KEY,
                    student_id INTEGER NOT NULL,
                    session_date DATE NOT NULL,
                    start_time TEXT NOT NULL,
                    end_time TEXT,
                    project_name TEXT NOT NULL,
                    project_description TEXT,
                    instructor_name TEXT NOT NULL,
                    safety_briefing_completed BOOLEAN NOT NULL DEFAULT TRUE,
                    status TEXT NOT NULL DEFAULT 'SCHEDULED',
                    notes TEXT,
                    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    FOREIGN KEY (student_id) REFERENCES students(id) ON DELETE CASCADE
                )",
                [],
            )?;

            tx.execute(
                "CREATE TABLE IF NOT EXISTS session_tools (
                    session_id INTEGER NOT NULL,
                    tool_id INTEGER NOT NULL,
                    quantity INTEGER NOT NULL DEFAULT 1 CHECK (quantity >= 1),
                    position INTEGER NOT NULL,
                    PRIMARY KEY (session_id, tool_id),
                    FOREIGN KEY (session_id) REFERENCES workshop_sessions(id) ON DELETE CASCADE,
                    FOREIGN KEY (tool_id) REFERENCES tools(id) ON DELETE CASCADE
                )",
                [],
            )?;

            tx.execute(
                "CREATE TABLE IF NOT EXISTS tool_usage (
                    id INTEGER PRIMARY KEY,
                    session_id INTEGER NOT NULL,
                    tool_id INTEGER NOT NULL,
                    quantity_used INTEGER NOT NULL DEFAULT 1,
                    condition_before TEXT NOT NULL,
                    condition_after TEXT,
                    start_time TEXT NOT NULL,
                    end_time TEXT,
                    notes TEXT,
                    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    FOREIGN KEY (session_id) REFERENCES workshop_sessions(id) ON DELETE CASCADE,
                    FOREIGN KEY (tool_id) REFERENCES tools(id) ON DELETE CASCADE
                )",
                [],
            )?;
            Ok(())
        });

        // Version 3: lookup indices for the list and statistics queries
        self.add_migration(3, "add_lookup_indices", |tx| {
            tx.execute("CREATE INDEX IF NOT EXISTS idx_students_class ON students(class_name)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_tools_category ON tools(category)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_sessions_student ON workshop_sessions(student_id)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_sessions_date ON workshop_sessions(session_date)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_sessions_status ON workshop_sessions(status)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_session_tools_tool ON session_tools(tool_id)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_tool_usage_session ON tool_usage(session_id)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_tool_usage_tool ON tool_usage(tool_id)", [])?;
            Ok(())
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> rusqlite::Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    /// Applies every migration newer than the current version, all in one transaction.
    pub fn run_migrations(&self, conn: &mut Connection) -> WorkshopResult<()> {
        conn.execute(MIGRATIONS_TABLE, [])?;

        let current_version = self.get_current_version(conn)?;
        let pending: Vec<&Migration> = self.migrations.iter().filter(|m| m.version > current_version).collect();

        if pending.is_empty() {
            msg_debug!(Message::DatabaseUpToDate);
            return Ok(());
        }

        msg_debug!(Message::MigrationsFound(pending.len()));

        let tx = conn.transaction()?;

        for migration in pending {
            msg_debug!(Message::RunningMigration(migration.version, migration.name.to_string()));

            match (migration.up)(&tx) {
                Ok(()) => {
                    tx.execute(
                        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
                        params![migration.version, migration.name],
                    )?;
                    msg_debug!(Message::MigrationCompleted(migration.version));
                }
                Err(e) => {
                    msg_error!(Message::MigrationFailed(migration.version, e.to_string()));
                    return Err(e.into());
                }
            }
        }

        tx.commit()?;
        msg_debug!(Message::AllMigrationsCompleted);

        Ok(())
    }

    /// Highest applied version, `0` for a fresh database.
    fn get_current_version(&self, conn: &Connection) -> WorkshopResult<u32> {
        let version: Option<u32> = conn
            .query_row("SELECT MAX(version) FROM migrations", [], |row| row.get(0))
            .unwrap_or(Some(0));

        Ok(version.unwrap_or(0))
    }

    pub fn is_migration_applied(&self, conn: &Connection, version: u32) -> WorkshopResult<bool> {
        let count: i32 = conn.query_row("SELECT COUNT(*) FROM migrations WHERE version = ?1", params![version], |row| row.get(0))?;

        Ok(count > 0)
    }

    /// `(version, name, applied_at)` of every applied migration, oldest first.
    pub fn get_migration_history(&self, conn: &Connection) -> WorkshopResult<Vec<(u32, String, String)>> {
        conn.execute(MIGRATIONS_TABLE, [])?;
        let mut stmt = conn.prepare("SELECT version, name, applied_at FROM migrations ORDER BY version")?;

        let history = stmt
            .query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(history)
    }

    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map(|m| m.version).unwrap_or(0)
    }
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_with_migrations(conn: &mut Connection) -> WorkshopResult<()> {
    MigrationManager::new().run_migrations(conn)
}

pub fn get_db_version(conn: &Connection) -> WorkshopResult<u32> {
    MigrationManager::new().get_current_version(conn)
}

pub fn needs_migration(conn: &Connection) -> WorkshopResult<bool> {
    let manager = MigrationManager::new();
    let current = manager.get_current_version(conn)?;
    Ok(current < manager.latest_version())
}
