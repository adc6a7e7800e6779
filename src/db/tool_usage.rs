use super::db::{Db, Table};
use super::live::LiveQuery;
use crate::libs::error::{Entity, WorkshopError, WorkshopResult};
use crate::libs::messages::Message;
use crate::libs::tool::ToolCondition;
use crate::libs::usage::ToolUsage;
use crate::libs::validation::{is_blank, is_valid_time, ValidationResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use tracing::debug;

const USAGE_COLUMNS: &str =
    "id, session_id, tool_id, quantity_used, condition_before, condition_after, start_time, end_time, notes, created_at, updated_at";
const INSERT_USAGE: &str = "INSERT INTO tool_usage (session_id, tool_id, quantity_used, condition_before, condition_after,
    start_time, end_time, notes, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, datetime(CURRENT_TIMESTAMP, 'localtime'), datetime(CURRENT_TIMESTAMP, 'localtime'))";
const UPDATE_USAGE: &str = "UPDATE tool_usage
    SET session_id = ?2, tool_id = ?3, quantity_used = ?4, condition_before = ?5, condition_after = ?6,
        start_time = ?7, end_time = ?8, notes = ?9, updated_at = datetime(CURRENT_TIMESTAMP, 'localtime')
    WHERE id = ?1";
const END_USAGE: &str = "UPDATE tool_usage
    SET end_time = ?2, condition_after = ?3, updated_at = datetime(CURRENT_TIMESTAMP, 'localtime')
    WHERE id = ?1";
// Open usages keep the condition they started with
const END_SESSION_USAGES: &str = "UPDATE tool_usage
    SET end_time = ?2, condition_after = condition_before, updated_at = datetime(CURRENT_TIMESTAMP, 'localtime')
    WHERE session_id = ?1 AND end_time IS NULL";
const DELETE_USAGE: &str = "DELETE FROM tool_usage WHERE id = ?1";

const WHERE_ID: &str = "WHERE id = ?1";
const WHERE_SESSION: &str = "WHERE session_id = ?1";
const WHERE_TOOL: &str = "WHERE tool_id = ?1";
const WHERE_SESSION_TOOL: &str = "WHERE session_id = ?1 AND tool_id = ?2";
const WHERE_TOOL_OPEN: &str = "WHERE tool_id = ?1 AND end_time IS NULL";
const WHERE_DATE_RANGE: &str = "WHERE session_id IN (
    SELECT id FROM workshop_sessions WHERE session_date >= ?1 AND session_date <= ?2
)";
const ORDER_NEWEST: &str = "ORDER BY created_at DESC, id DESC";
const LIMIT_ONE: &str = "LIMIT 1";

const COUNT_BY_SESSION: &str = "SELECT COUNT(*) FROM tool_usage WHERE session_id = ?1";
const COUNT_BY_TOOL: &str = "SELECT COUNT(*) FROM tool_usage WHERE tool_id = ?1";
const COUNT_OPEN_BY_TOOL: &str = "SELECT COUNT(*) FROM tool_usage WHERE tool_id = ?1 AND end_time IS NULL";

fn select(filter: &str) -> String {
    format!("SELECT {} FROM tool_usage {} {}", USAGE_COLUMNS, filter, ORDER_NEWEST)
}

fn map_usage(row: &Row) -> rusqlite::Result<ToolUsage> {
    Ok(ToolUsage {
        id: row.get(0)?,
        session_id: row.get(1)?,
        tool_id: row.get(2)?,
        quantity_used: row.get(3)?,
        condition_before: row.get(4)?,
        condition_after: row.get(5)?,
        start_time: row.get(6)?,
        end_time: row.get(7)?,
        notes: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

pub(crate) fn query_usages<P: Params>(conn: &Connection, sql: &str, params: P) -> WorkshopResult<Vec<ToolUsage>> {
    let mut stmt = conn.prepare(sql)?;
    let usages = stmt.query_map(params, map_usage)?.collect::<Result<Vec<_>, _>>()?;
    Ok(usages)
}

fn one_usage<P: Params>(conn: &Connection, filter: &str, params: P) -> WorkshopResult<Option<ToolUsage>> {
    let sql = format!("{} {}", select(filter), LIMIT_ONE);
    let usage = conn.query_row(&sql, params, map_usage).optional()?;
    Ok(usage)
}

/// Wear records of tools used during sessions.
#[derive(Clone)]
pub struct ToolUsages {
    db: Db,
}

impl ToolUsages {
    pub fn new(db: &Db) -> Self {
        ToolUsages { db: db.clone() }
    }

    pub fn insert(&self, usage: &ToolUsage) -> WorkshopResult<i64> {
        let id = {
            let conn = self.db.conn();
            conn.execute(
                INSERT_USAGE,
                params![
                    usage.session_id,
                    usage.tool_id,
                    usage.quantity_used,
                    usage.condition_before,
                    usage.condition_after,
                    usage.start_time,
                    usage.end_time,
                    usage.notes
                ],
            )?;
            conn.last_insert_rowid()
        };
        self.db.notify(&[Table::ToolUsage]);
        Ok(id)
    }

    pub fn update(&self, usage: &ToolUsage) -> WorkshopResult<()> {
        let id = usage.id.ok_or(WorkshopError::Unsaved(Entity::ToolUsage))?;
        let affected = self.db.conn().execute(
            UPDATE_USAGE,
            params![
                id,
                usage.session_id,
                usage.tool_id,
                usage.quantity_used,
                usage.condition_before,
                usage.condition_after,
                usage.start_time,
                usage.end_time,
                usage.notes
            ],
        )?;
        if affected == 0 {
            return Err(WorkshopError::not_found(Entity::ToolUsage, id));
        }
        self.db.notify(&[Table::ToolUsage]);
        Ok(())
    }

    pub fn delete(&self, id: i64) -> WorkshopResult<()> {
        if self.db.conn().execute(DELETE_USAGE, params![id])? == 0 {
            return Err(WorkshopError::not_found(Entity::ToolUsage, id));
        }
        self.db.notify(&[Table::ToolUsage]);
        Ok(())
    }

    /// Opens a usage record after checking it.
    ///
    /// Returns [`WorkshopError::Validation`] listing every problem when the
    /// record is rejected.
    pub fn start_usage(
        &self,
        session_id: i64,
        tool_id: i64,
        quantity: i32,
        condition_before: ToolCondition,
        start_time: &str,
    ) -> WorkshopResult<i64> {
        let usage = ToolUsage::new(session_id, tool_id, quantity, condition_before, start_time);
        Self::validate(&usage).into_result()?;

        let id = self.insert(&usage)?;
        debug!(usage_id = id, session_id, tool_id, quantity, "tool usage started");
        Ok(id)
    }

    /// Closes a usage record with the condition the tool came back in.
    pub fn end_usage(&self, id: i64, end_time: &str, condition_after: ToolCondition) -> WorkshopResult<()> {
        let mut result = ValidationResult::new();
        result.check(is_valid_time(end_time), Message::EndTimeInvalid(end_time.to_string()));
        result.into_result()?;

        if self.db.conn().execute(END_USAGE, params![id, end_time, condition_after])? == 0 {
            return Err(WorkshopError::not_found(Entity::ToolUsage, id));
        }
        debug!(usage_id = id, condition = %condition_after, "tool usage ended");
        self.db.notify(&[Table::ToolUsage]);
        Ok(())
    }

    /// Closes every open usage of a session, assuming each tool came back
    /// in the condition it left in. Returns how many were closed.
    pub fn end_for_session(&self, session_id: i64, end_time: &str) -> WorkshopResult<usize> {
        let mut result = ValidationResult::new();
        result.check(is_valid_time(end_time), Message::EndTimeInvalid(end_time.to_string()));
        result.into_result()?;

        let closed = self.db.conn().execute(END_SESSION_USAGES, params![session_id, end_time])?;
        debug!(session_id, closed, "open tool usages ended");
        if closed > 0 {
            self.db.notify(&[Table::ToolUsage]);
        }
        Ok(closed)
    }

    pub fn get(&self, id: i64) -> WorkshopResult<Option<ToolUsage>> {
        one_usage(&self.db.conn(), WHERE_ID, params![id])
    }

    pub fn fetch_all(&self) -> WorkshopResult<Vec<ToolUsage>> {
        query_usages(&self.db.conn(), &select(""), [])
    }

    pub fn by_session(&self, session_id: i64) -> WorkshopResult<Vec<ToolUsage>> {
        query_usages(&self.db.conn(), &select(WHERE_SESSION), params![session_id])
    }

    pub fn by_tool(&self, tool_id: i64) -> WorkshopResult<Vec<ToolUsage>> {
        query_usages(&self.db.conn(), &select(WHERE_TOOL), params![tool_id])
    }

    /// Most recent usage of a tool within one session.
    pub fn latest(&self, session_id: i64, tool_id: i64) -> WorkshopResult<Option<ToolUsage>> {
        one_usage(&self.db.conn(), WHERE_SESSION_TOOL, params![session_id, tool_id])
    }

    /// Most recent usage of a tool that has not been closed yet.
    pub fn current_for_tool(&self, tool_id: i64) -> WorkshopResult<Option<ToolUsage>> {
        one_usage(&self.db.conn(), WHERE_TOOL_OPEN, params![tool_id])
    }

    /// Usages recorded during sessions dated between `from` and `to`, both inclusive.
    pub fn by_date_range(&self, from: NaiveDate, to: NaiveDate) -> WorkshopResult<Vec<ToolUsage>> {
        query_usages(&self.db.conn(), &select(WHERE_DATE_RANGE), params![from, to])
    }

    pub fn count_by_session(&self, session_id: i64) -> WorkshopResult<i64> {
        Ok(self.db.conn().query_row(COUNT_BY_SESSION, params![session_id], |row| row.get(0))?)
    }

    pub fn count_by_tool(&self, tool_id: i64) -> WorkshopResult<i64> {
        Ok(self.db.conn().query_row(COUNT_BY_TOOL, params![tool_id], |row| row.get(0))?)
    }

    /// Whether some usage of the tool is still open.
    pub fn is_tool_in_use(&self, tool_id: i64) -> WorkshopResult<bool> {
        let open: i64 = self.db.conn().query_row(COUNT_OPEN_BY_TOOL, params![tool_id], |row| row.get(0))?;
        Ok(open > 0)
    }

    pub fn validate(usage: &ToolUsage) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.check(usage.session_id != 0, Message::UsageSessionMissing);
        result.check(usage.tool_id != 0, Message::UsageToolMissing);
        result.check(usage.quantity_used >= 1, Message::UsageQuantityTooLow);

        if is_blank(&usage.start_time) {
            result.push(Message::UsageStartTimeEmpty);
        } else {
            result.check(is_valid_time(&usage.start_time), Message::StartTimeInvalid(usage.start_time.clone()));
        }
        if let Some(end_time) = usage.end_time.as_deref().filter(|t| !is_blank(t)) {
            result.check(is_valid_time(end_time), Message::EndTimeInvalid(end_time.to_string()));
        }

        result
    }

    pub fn subscribe_all(&self) -> LiveQuery<Vec<ToolUsage>> {
        let sql = select("");
        LiveQuery::new(&self.db, &[Table::ToolUsage], move |conn| query_usages(conn, &sql, []))
    }

    pub fn subscribe_by_session(&self, session_id: i64) -> LiveQuery<Vec<ToolUsage>> {
        let sql = select(WHERE_SESSION);
        LiveQuery::new(&self.db, &[Table::ToolUsage], move |conn| query_usages(conn, &sql, params![session_id]))
    }

    pub fn subscribe_by_tool(&self, tool_id: i64) -> LiveQuery<Vec<ToolUsage>> {
        let sql = select(WHERE_TOOL);
        LiveQuery::new(&self.db, &[Table::ToolUsage], move |conn| query_usages(conn, &sql, params![tool_id]))
    }

    pub fn subscribe_by_date_range(&self, from: NaiveDate, to: NaiveDate) -> LiveQuery<Vec<ToolUsage>> {
        let sql = select(WHERE_DATE_RANGE);
        LiveQuery::new(&self.db, &[Table::ToolUsage, Table::Sessions], move |conn| {
            query_usages(conn, &sql, params![from, to])
        })
    }
}
