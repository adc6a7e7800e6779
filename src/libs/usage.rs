use crate::libs::tool::ToolCondition;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Wear record of one tool used during one session.
///
/// Independent of the session's reservation: it tracks condition before and
/// after use, not stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUsage {
    pub id: Option<i64>,
    pub session_id: i64,
    pub tool_id: i64,
    pub quantity_used: i32,
    pub condition_before: ToolCondition,
    /// `None` until the usage is closed.
    pub condition_after: Option<ToolCondition>,
    pub start_time: String,
    pub end_time: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl ToolUsage {
    pub fn new(session_id: i64, tool_id: i64, quantity_used: i32, condition_before: ToolCondition, start_time: &str) -> Self {
        ToolUsage {
            id: None,
            session_id,
            tool_id,
            quantity_used,
            condition_before,
            condition_after: None,
            start_time: start_time.to_string(),
            end_time: None,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}
