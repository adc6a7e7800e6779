//! Tool inventory model.
//!
//! A tool row describes a kind of tool with a total `quantity` and the number
//! of units currently on the shelf (`available_quantity`). Sessions in
//! progress hold the difference.

use crate::libs::error::WorkshopError;
use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status label shown on the inventory list.
///
/// Only `Available` tools can be borrowed; the other labels are set by hand
/// when a tool is lent out informally, broken, serviced or missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolStatus {
    Available,
    Borrowed,
    Broken,
    Maintenance,
    Lost,
}

impl ToolStatus {
    pub const ALL: [ToolStatus; 5] = [
        ToolStatus::Available,
        ToolStatus::Borrowed,
        ToolStatus::Broken,
        ToolStatus::Maintenance,
        ToolStatus::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolStatus::Available => "Available",
            ToolStatus::Borrowed => "Borrowed",
            ToolStatus::Broken => "Broken",
            ToolStatus::Maintenance => "Maintenance",
            ToolStatus::Lost => "Lost",
        }
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ToolStatus {
    type Err = WorkshopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| WorkshopError::UnknownVariant {
                kind: "tool status",
                value: s.to_string(),
            })
    }
}

impl ToSql for ToolStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ToolStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Wear rating recorded before and after a tool is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ToolCondition {
    Broken,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ToolCondition {
    pub const ALL: [ToolCondition; 5] = [
        ToolCondition::Excellent,
        ToolCondition::Good,
        ToolCondition::Fair,
        ToolCondition::Poor,
        ToolCondition::Broken,
    ];

    /// Ordinal score, 5 for excellent down to 1 for broken.
    pub fn score(&self) -> i32 {
        match self {
            ToolCondition::Excellent => 5,
            ToolCondition::Good => 4,
            ToolCondition::Fair => 3,
            ToolCondition::Poor => 2,
            ToolCondition::Broken => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolCondition::Excellent => "EXCELLENT",
            ToolCondition::Good => "GOOD",
            ToolCondition::Fair => "FAIR",
            ToolCondition::Poor => "POOR",
            ToolCondition::Broken => "BROKEN",
        }
    }
}

impl fmt::Display for ToolCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().to_lowercase())
    }
}

impl FromStr for ToolCondition {
    type Err = WorkshopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolCondition::ALL
            .into_iter()
            .find(|condition| condition.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| WorkshopError::UnknownVariant {
                kind: "tool condition",
                value: s.to_string(),
            })
    }
}

impl ToSql for ToolCondition {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ToolCondition {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: Option<i64>,
    /// Inventory code, unique across tools.
    pub code: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub quantity: i32,
    /// Units on the shelf. Always within `0..=quantity`.
    pub available_quantity: i32,
    pub status: ToolStatus,
    pub is_active: bool,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Tool {
    /// A new, fully available tool.
    pub fn new(code: &str, name: &str, category: &str, quantity: i32) -> Self {
        Tool {
            id: None,
            code: code.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            description: None,
            location: None,
            quantity,
            available_quantity: quantity,
            status: ToolStatus::Available,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    /// Units currently held by sessions in progress.
    pub fn reserved(&self) -> i32 {
        self.quantity - self.available_quantity
    }

    pub fn can_lend(&self, requested: i32) -> bool {
        self.status == ToolStatus::Available && requested >= 1 && self.available_quantity >= requested
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_scale() {
        let scores: Vec<i32> = ToolCondition::ALL.iter().map(ToolCondition::score).collect();
        assert_eq!(scores, vec![5, 4, 3, 2, 1]);
        assert!(ToolCondition::Excellent > ToolCondition::Broken);
        assert_eq!("good".parse::<ToolCondition>().unwrap(), ToolCondition::Good);
        assert!("shiny".parse::<ToolCondition>().is_err());
    }

    #[test]
    fn status_parsing_ignores_case() {
        assert_eq!("maintenance".parse::<ToolStatus>().unwrap(), ToolStatus::Maintenance);
        assert_eq!(" Available ".parse::<ToolStatus>().unwrap(), ToolStatus::Available);
        assert!("gone".parse::<ToolStatus>().is_err());
    }

    #[test]
    fn lending_needs_status_and_stock() {
        let mut tool = Tool::new("DRL-01", "Drill", "Power tools", 2);
        assert!(tool.can_lend(2));
        assert!(!tool.can_lend(3));
        assert!(!tool.can_lend(0));

        tool.status = ToolStatus::Maintenance;
        assert!(!tool.can_lend(1));
    }
}
