//! Workshop manager library.
//!
//! Keeps the records of a school workshop: students, the tool inventory and
//! the sessions that borrow tools. Starting a session takes its tools off
//! the shelf and ending or cancelling it puts them back, always inside one
//! SQLite transaction.
//!
//! - [`db`]: the store handle, repositories, migrations and live queries
//! - [`libs`]: models, errors, validation, configuration and output helpers
//! - [`commands`]: the `workshop` command line front end

pub mod commands;
pub mod db;
pub mod libs;
