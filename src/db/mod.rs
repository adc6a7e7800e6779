//! SQLite persistence.
//!
//! [`db::Db`] is the handle every repository is built from. The schema is
//! created and upgraded by [`migrations`]; list and statistics queries can
//! also be watched through [`live::LiveQuery`].
//!
//! ```rust
//! use workshop::db::{db::Db, students::Students, tools::Tools};
//!
//! let db = Db::in_memory()?;
//! assert_eq!(Students::new(&db).count()?, 0);
//! assert!(Tools::new(&db).fetch_available()?.is_empty());
//! # Ok::<(), workshop::libs::error::WorkshopError>(())
//! ```

/// Store handle: one connection plus change notifications.
pub mod db;

/// Subscriptions that re-run a query after relevant commits.
pub mod live;

/// Versioned schema changes and their bookkeeping table.
pub mod migrations;

/// Session records, tool lists and the start/end/cancel lifecycle.
pub mod sessions;

pub mod statistics;

pub mod students;

/// Wear records of tools used during sessions.
pub mod tool_usage;

/// Tool inventory and unit reservations.
pub mod tools;
