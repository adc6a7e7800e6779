//! Read-only aggregations over sessions and tool usage.

use super::db::{Db, Table};
use super::live::LiveQuery;
use super::sessions::sessions_on;
use super::tool_usage::query_usages;
use crate::libs::error::WorkshopResult;
use crate::libs::statistics::{
    Dashboard, MonthlySessionStat, SessionStatistics, StudentSessionStat, ToolConditionStat, ToolUsageStat, ToolUsageSummary,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const TOOL_USAGE_STATS: &str = "
    SELECT tool_id, COUNT(*) AS usage_count, COALESCE(SUM(quantity_used), 0) AS total_quantity
    FROM tool_usage
    GROUP BY tool_id
    ORDER BY usage_count DESC, tool_id";
const TOOL_USAGE_STATS_BETWEEN: &str = "
    SELECT tool_id, COUNT(*) AS usage_count, COALESCE(SUM(quantity_used), 0) AS total_quantity
    FROM tool_usage
    WHERE session_id IN (
        SELECT id FROM workshop_sessions WHERE session_date >= ?1 AND session_date <= ?2
    )
    GROUP BY tool_id
    ORDER BY usage_count DESC, tool_id";
const TOOL_CONDITION_STATS: &str = "
    SELECT tool_id, AVG(
        CASE condition_after
            WHEN 'EXCELLENT' THEN 5
            WHEN 'GOOD' THEN 4
            WHEN 'FAIR' THEN 3
            WHEN 'POOR' THEN 2
            WHEN 'BROKEN' THEN 1
        END
    ) AS avg_condition
    FROM tool_usage
    WHERE condition_after IS NOT NULL
    GROUP BY tool_id
    ORDER BY tool_id";
const MONTHLY_SESSION_STATS: &str = "
    SELECT strftime('%Y-%m', session_date) AS month, COUNT(*) AS count
    FROM workshop_sessions
    WHERE status = 'COMPLETED'
    GROUP BY month
    ORDER BY month DESC";
const STUDENT_SESSION_STATS: &str = "
    SELECT student_id, COUNT(*) AS session_count
    FROM workshop_sessions
    WHERE status = 'COMPLETED'
    GROUP BY student_id
    ORDER BY session_count DESC, student_id";
const SESSION_BREAKDOWN: &str = "
    SELECT COUNT(*),
        COALESCE(SUM(status = 'IN_PROGRESS'), 0),
        COALESCE(SUM(status = 'COMPLETED'), 0),
        COALESCE(SUM(status = 'CANCELLED'), 0),
        COALESCE(SUM(status = 'SCHEDULED' AND session_date >= ?1), 0)
    FROM workshop_sessions";
const COUNT_ACTIVE_STUDENTS: &str = "SELECT COUNT(*) FROM students WHERE is_active = 1";
const COUNT_AVAILABLE_TOOLS: &str = "SELECT COUNT(*) FROM tools WHERE available_quantity > 0 AND is_active = 1";
const SELECT_USAGES_BY_TOOL: &str = "SELECT id, session_id, tool_id, quantity_used, condition_before, condition_after,
    start_time, end_time, notes, created_at, updated_at
    FROM tool_usage WHERE tool_id = ?1";

fn map_usage_stat(row: &Row) -> rusqlite::Result<ToolUsageStat> {
    Ok(ToolUsageStat {
        tool_id: row.get(0)?,
        usage_count: row.get(1)?,
        total_quantity: row.get(2)?,
    })
}

fn usage_stats(conn: &Connection, range: Option<(NaiveDate, NaiveDate)>) -> WorkshopResult<Vec<ToolUsageStat>> {
    match range {
        Some((from, to)) => {
            let mut stmt = conn.prepare(TOOL_USAGE_STATS_BETWEEN)?;
            let rows = stmt.query_map(params![from, to], map_usage_stat)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        }
        None => {
            let mut stmt = conn.prepare(TOOL_USAGE_STATS)?;
            let rows = stmt.query_map([], map_usage_stat)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        }
    }
}

fn condition_stats(conn: &Connection) -> WorkshopResult<Vec<ToolConditionStat>> {
    let mut stmt = conn.prepare(TOOL_CONDITION_STATS)?;
    let stats = stmt
        .query_map([], |row| {
            Ok(ToolConditionStat {
                tool_id: row.get(0)?,
                avg_condition: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(stats)
}

fn monthly_stats(conn: &Connection) -> WorkshopResult<Vec<MonthlySessionStat>> {
    let mut stmt = conn.prepare(MONTHLY_SESSION_STATS)?;
    let stats = stmt
        .query_map([], |row| {
            Ok(MonthlySessionStat {
                month: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(stats)
}

fn student_stats(conn: &Connection) -> WorkshopResult<Vec<StudentSessionStat>> {
    let mut stmt = conn.prepare(STUDENT_SESSION_STATS)?;
    let stats = stmt
        .query_map([], |row| {
            Ok(StudentSessionStat {
                student_id: row.get(0)?,
                session_count: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(stats)
}

fn session_breakdown(conn: &Connection, today: NaiveDate) -> WorkshopResult<SessionStatistics> {
    let stats = conn.query_row(SESSION_BREAKDOWN, params![today], |row| {
        Ok(SessionStatistics {
            total_sessions: row.get(0)?,
            active_sessions: row.get(1)?,
            completed_sessions: row.get(2)?,
            cancelled_sessions: row.get(3)?,
            upcoming_sessions: row.get(4)?,
        })
    })?;
    Ok(stats)
}

fn dashboard(conn: &Connection, today: NaiveDate) -> WorkshopResult<Dashboard> {
    Ok(Dashboard {
        active_students: conn.query_row(COUNT_ACTIVE_STUDENTS, [], |row| row.get(0))?,
        available_tools: conn.query_row(COUNT_AVAILABLE_TOOLS, [], |row| row.get(0))?,
        today_sessions: sessions_on(conn, today)?,
    })
}

pub struct Statistics {
    db: Db,
}

impl Statistics {
    pub fn new(db: &Db) -> Self {
        Statistics { db: db.clone() }
    }

    /// Usage count and units used per tool, most used first.
    pub fn tool_usage(&self) -> WorkshopResult<Vec<ToolUsageStat>> {
        usage_stats(&self.db.conn(), None)
    }

    /// Same as [`Statistics::tool_usage`], limited to sessions dated within `from..=to`.
    pub fn tool_usage_between(&self, from: NaiveDate, to: NaiveDate) -> WorkshopResult<Vec<ToolUsageStat>> {
        usage_stats(&self.db.conn(), Some((from, to)))
    }

    /// Mean post-use condition per tool, counting rated usages only.
    pub fn tool_conditions(&self) -> WorkshopResult<Vec<ToolConditionStat>> {
        condition_stats(&self.db.conn())
    }

    /// Completed sessions per month, latest month first.
    pub fn monthly_sessions(&self) -> WorkshopResult<Vec<MonthlySessionStat>> {
        monthly_stats(&self.db.conn())
    }

    /// Completed sessions per student, busiest first.
    pub fn student_sessions(&self) -> WorkshopResult<Vec<StudentSessionStat>> {
        student_stats(&self.db.conn())
    }

    pub fn tool_summary(&self, tool_id: i64) -> WorkshopResult<ToolUsageSummary> {
        let usages = query_usages(&self.db.conn(), SELECT_USAGES_BY_TOOL, params![tool_id])?;
        Ok(ToolUsageSummary::from_usages(tool_id, &usages))
    }

    pub fn session_breakdown(&self, today: NaiveDate) -> WorkshopResult<SessionStatistics> {
        session_breakdown(&self.db.conn(), today)
    }

    pub fn dashboard(&self, today: NaiveDate) -> WorkshopResult<Dashboard> {
        dashboard(&self.db.conn(), today)
    }

    pub fn subscribe_tool_usage(&self) -> LiveQuery<Vec<ToolUsageStat>> {
        LiveQuery::new(&self.db, &[Table::ToolUsage], |conn| usage_stats(conn, None))
    }

    pub fn subscribe_tool_conditions(&self) -> LiveQuery<Vec<ToolConditionStat>> {
        LiveQuery::new(&self.db, &[Table::ToolUsage], condition_stats)
    }

    pub fn subscribe_monthly_sessions(&self) -> LiveQuery<Vec<MonthlySessionStat>> {
        LiveQuery::new(&self.db, &[Table::Sessions], monthly_stats)
    }

    pub fn subscribe_student_sessions(&self) -> LiveQuery<Vec<StudentSessionStat>> {
        LiveQuery::new(&self.db, &[Table::Sessions], student_stats)
    }

    pub fn subscribe_dashboard(&self, today: NaiveDate) -> LiveQuery<Dashboard> {
        LiveQuery::new(
            &self.db,
            &[Table::Students, Table::Tools, Table::Sessions, Table::SessionTools],
            move |conn| dashboard(conn, today),
        )
    }
}
