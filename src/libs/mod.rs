pub mod config;
pub mod data_storage;
pub mod error;
pub mod messages;
pub mod session;
pub mod statistics;
pub mod student;
pub mod tool;
pub mod usage;
pub mod validation;
pub mod view;
