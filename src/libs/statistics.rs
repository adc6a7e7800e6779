//! Aggregated figures for the overview screens.
//!
//! These are plain rows produced by `db::statistics::Statistics`; nothing
//! here touches the database.

use crate::libs::session::WorkshopSession;
use crate::libs::tool::ToolCondition;
use crate::libs::usage::ToolUsage;
use serde::Serialize;

/// How often a tool was used and how many units in total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolUsageStat {
    pub tool_id: i64,
    pub usage_count: i64,
    pub total_quantity: i64,
}

/// Mean post-use condition of a tool on the 1..=5 scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolConditionStat {
    pub tool_id: i64,
    pub avg_condition: f64,
}

/// Completed sessions in one `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySessionStat {
    pub month: String,
    pub count: i64,
}

/// Completed sessions of one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSessionStat {
    pub student_id: i64,
    pub session_count: i64,
}

/// Session counts by lifecycle state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStatistics {
    pub total_sessions: i64,
    pub active_sessions: i64,
    pub completed_sessions: i64,
    pub cancelled_sessions: i64,
    pub upcoming_sessions: i64,
}

/// Snapshot shown on the overview screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub active_students: i64,
    pub available_tools: i64,
    pub today_sessions: Vec<WorkshopSession>,
}

/// Usage totals of a single tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolUsageSummary {
    pub tool_id: i64,
    pub total_usage: usize,
    pub total_quantity: i64,
    /// `0.0` when no usage has a post-use rating yet.
    pub average_condition: f64,
}

impl ToolUsageSummary {
    pub fn from_usages(tool_id: i64, usages: &[ToolUsage]) -> Self {
        let scores: Vec<i32> = usages
            .iter()
            .filter_map(|u| u.condition_after)
            .map(|c: ToolCondition| c.score())
            .collect();
        let average_condition = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<i32>() as f64 / scores.len() as f64
        };

        ToolUsageSummary {
            tool_id,
            total_usage: usages.len(),
            total_quantity: usages.iter().map(|u| u.quantity_used as i64).sum(),
            average_condition,
        }
    }
}
