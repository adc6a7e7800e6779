//! Workshop sessions and their lifecycle.
//!
//! Besides plain CRUD this repository owns the only rules that span tables:
//! starting a session takes its tools' units off the shelf, ending or
//! cancelling a running one puts them back. Each transition runs in a single
//! transaction, so a failure on any tool leaves every row untouched.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use workshop::db::{db::Db, sessions::Sessions, students::Students, tools::Tools};
//! use workshop::libs::session::{SessionStatus, SessionTool, WorkshopSession};
//! use workshop::libs::student::Student;
//! use workshop::libs::tool::Tool;
//!
//! let db = Db::in_memory()?;
//! let student = Students::new(&db).insert(&Student::new("2024-001", "Andi", "X TKR 1"))?;
//! let saw = Tools::new(&db).insert(&Tool::new("SAW-01", "Hand saw", "Cutting", 3))?;
//!
//! let sessions = Sessions::new(&db);
//! let date = NaiveDate::from_ymd_opt(2030, 1, 7).unwrap();
//! let session = WorkshopSession::new(student, date, "08:00", "Bird house", "Pak Budi")
//!     .with_tools(vec![SessionTool::single(saw)]);
//! let id = sessions.insert(&session)?;
//!
//! sessions.start(id)?;
//! assert_eq!(Tools::new(&db).get(saw)?.unwrap().available_quantity, 2);
//! let done = sessions.end(id, "14:30")?;
//! assert_eq!(done.status, SessionStatus::Completed);
//! # Ok::<(), workshop::libs::error::WorkshopError>(())
//! ```

use super::db::{Db, Table};
use super::live::LiveQuery;
use super::tools::{self, tool_by_id};
use crate::libs::error::{Entity, WorkshopError, WorkshopResult};
use crate::libs::messages::Message;
use crate::libs::session::{Reservation, SessionStatus, SessionTool, Transition, WorkshopSession};
use crate::libs::validation::{is_blank, is_valid_time, ValidationResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use std::collections::HashSet;
use tracing::debug;

const SESSION_COLUMNS: &str = "id, student_id, session_date, start_time, end_time, project_name, project_description,
    instructor_name, safety_briefing_completed, status, notes, created_at, updated_at";
const INSERT_SESSION: &str = "INSERT INTO workshop_sessions (student_id, session_date, start_time, end_time, project_name,
    project_description, instructor_name, safety_briefing_completed, status, notes, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, datetime(CURRENT_TIMESTAMP, 'localtime'), datetime(CURRENT_TIMESTAMP, 'localtime'))";
const UPDATE_SESSION: &str = "UPDATE workshop_sessions
    SET student_id = ?2, session_date = ?3, start_time = ?4, end_time = ?5, project_name = ?6, project_description = ?7,
        instructor_name = ?8, safety_briefing_completed = ?9, notes = ?10, updated_at = datetime(CURRENT_TIMESTAMP, 'localtime')
    WHERE id = ?1";
const UPDATE_STATUS: &str = "UPDATE workshop_sessions
    SET status = ?2, end_time = COALESCE(?3, end_time), updated_at = datetime(CURRENT_TIMESTAMP, 'localtime')
    WHERE id = ?1";
const DELETE_SESSION: &str = "DELETE FROM workshop_sessions WHERE id = ?1";
const INSERT_SESSION_TOOL: &str = "INSERT INTO session_tools (session_id, tool_id, quantity, position) VALUES (?1, ?2, ?3, ?4)";
const DELETE_SESSION_TOOLS: &str = "DELETE FROM session_tools WHERE session_id = ?1";
const SELECT_SESSION_TOOLS: &str = "SELECT tool_id, quantity FROM session_tools WHERE session_id = ?1 ORDER BY position";

const WHERE_ID: &str = "WHERE id = ?1";
const WHERE_STUDENT: &str = "WHERE student_id = ?1";
const WHERE_STATUS: &str = "WHERE status = ?1";
const WHERE_DATE: &str = "WHERE session_date = ?1";
const WHERE_DATE_RANGE: &str = "WHERE session_date BETWEEN ?1 AND ?2";
const WHERE_SEARCH: &str = "WHERE project_name LIKE '%' || ?1 || '%'
    OR project_description LIKE '%' || ?1 || '%'
    OR instructor_name LIKE '%' || ?1 || '%'";
const WHERE_UPCOMING: &str = "WHERE status = 'SCHEDULED' AND session_date >= ?1";
const WHERE_ACTIVE: &str = "WHERE status = 'IN_PROGRESS'";
const WHERE_COMPLETED: &str = "WHERE status = 'COMPLETED'";
const ORDER_NEWEST: &str = "ORDER BY session_date DESC, start_time DESC";
const ORDER_SOONEST: &str = "ORDER BY session_date ASC, start_time ASC";
const LIMIT: &str = "LIMIT ?1";

const COUNT_SESSIONS: &str = "SELECT COUNT(*) FROM workshop_sessions";
const COUNT_BY_STATUS: &str = "SELECT COUNT(*) FROM workshop_sessions WHERE status = ?1";
const COUNT_BY_STUDENT: &str = "SELECT COUNT(*) FROM workshop_sessions WHERE student_id = ?1";
const COUNT_BY_DATE: &str = "SELECT COUNT(*) FROM workshop_sessions WHERE session_date = ?1";

/// Tables a session list depends on.
const SESSION_TABLES: [Table; 2] = [Table::Sessions, Table::SessionTools];

fn select(filter: &str, order: &str) -> String {
    format!("SELECT {} FROM workshop_sessions {} {}", SESSION_COLUMNS, filter, order)
}

fn map_session(row: &Row) -> rusqlite::Result<WorkshopSession> {
    Ok(WorkshopSession {
        id: row.get(0)?,
        student_id: row.get(1)?,
        session_date: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        project_name: row.get(5)?,
        project_description: row.get(6)?,
        tools: Vec::new(),
        instructor_name: row.get(7)?,
        safety_briefing_completed: row.get(8)?,
        status: row.get(9)?,
        notes: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn load_tools(conn: &Connection, session_id: i64) -> WorkshopResult<Vec<SessionTool>> {
    let mut stmt = conn.prepare_cached(SELECT_SESSION_TOOLS)?;
    let tools = stmt
        .query_map(params![session_id], |row| Ok(SessionTool::new(row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tools)
}

fn store_tools(conn: &Connection, session_id: i64, tools: &[SessionTool]) -> WorkshopResult<()> {
    conn.execute(DELETE_SESSION_TOOLS, params![session_id])?;
    for (position, tool) in tools.iter().enumerate() {
        conn.execute(INSERT_SESSION_TOOL, params![session_id, tool.tool_id, tool.quantity, position as i64])?;
    }
    Ok(())
}

pub(crate) fn query_sessions<P: Params>(conn: &Connection, sql: &str, params: P) -> WorkshopResult<Vec<WorkshopSession>> {
    let mut stmt = conn.prepare(sql)?;
    let mut sessions = stmt.query_map(params, map_session)?.collect::<Result<Vec<_>, _>>()?;
    for session in sessions.iter_mut() {
        if let Some(id) = session.id {
            session.tools = load_tools(conn, id)?;
        }
    }
    Ok(sessions)
}

fn session_by_id(conn: &Connection, id: i64) -> WorkshopResult<Option<WorkshopSession>> {
    let session = conn.query_row(&select(WHERE_ID, ""), params![id], map_session).optional()?;
    match session {
        Some(mut session) => {
            session.tools = load_tools(conn, id)?;
            Ok(Some(session))
        }
        None => Ok(None),
    }
}

/// Sessions held on `date`, earliest first.
pub(crate) fn sessions_on(conn: &Connection, date: NaiveDate) -> WorkshopResult<Vec<WorkshopSession>> {
    query_sessions(conn, &select(WHERE_DATE, ORDER_SOONEST), params![date])
}

/// Repository for workshop sessions and their lifecycle transitions.
#[derive(Clone)]
pub struct Sessions {
    db: Db,
}

impl Sessions {
    pub fn new(db: &Db) -> Self {
        Sessions { db: db.clone() }
    }

    /// Stores a new session with its tool list.
    ///
    /// A session cannot be created already in progress: no units would have
    /// been reserved for it to return later.
    pub fn insert(&self, session: &WorkshopSession) -> WorkshopResult<i64> {
        if session.status == SessionStatus::InProgress {
            return Err(WorkshopError::UnreservedInProgress);
        }

        let id = {
            let mut conn = self.db.conn();
            let tx = conn.transaction()?;
            tx.execute(
                INSERT_SESSION,
                params![
                    session.student_id,
                    session.session_date,
                    session.start_time,
                    session.end_time,
                    session.project_name,
                    session.project_description,
                    session.instructor_name,
                    session.safety_briefing_completed,
                    session.status,
                    session.notes
                ],
            )?;
            let id = tx.last_insert_rowid();
            store_tools(&tx, id, &session.tools)?;
            tx.commit()?;
            id
        };

        debug!(session_id = id, tools = session.tools.len(), "session scheduled");
        self.db.notify(&SESSION_TABLES);
        Ok(id)
    }

    /// Saves the descriptive fields of a session.
    ///
    /// The stored status is kept; use the lifecycle methods to move it. The
    /// tool list is rewritten only while the session is scheduled.
    pub fn update(&self, session: &WorkshopSession) -> WorkshopResult<()> {
        let id = session.id.ok_or(WorkshopError::Unsaved(Entity::Session))?;
        {
            let mut conn = self.db.conn();
            let tx = conn.transaction()?;
            let current = session_by_id(&tx, id)?.ok_or_else(|| WorkshopError::not_found(Entity::Session, id))?;

            if current.tools != session.tools {
                if current.status != SessionStatus::Scheduled {
                    return Err(WorkshopError::ToolsLocked(id));
                }
                store_tools(&tx, id, &session.tools)?;
            }

            tx.execute(
                UPDATE_SESSION,
                params![
                    id,
                    session.student_id,
                    session.session_date,
                    session.start_time,
                    session.end_time,
                    session.project_name,
                    session.project_description,
                    session.instructor_name,
                    session.safety_briefing_completed,
                    session.notes
                ],
            )?;
            tx.commit()?;
        }
        self.db.notify(&SESSION_TABLES);
        Ok(())
    }

    /// Replaces the tool list of a scheduled session.
    pub fn set_tools(&self, id: i64, tools: &[SessionTool]) -> WorkshopResult<()> {
        {
            let mut conn = self.db.conn();
            let tx = conn.transaction()?;
            let current = session_by_id(&tx, id)?.ok_or_else(|| WorkshopError::not_found(Entity::Session, id))?;
            if current.status != SessionStatus::Scheduled {
                return Err(WorkshopError::ToolsLocked(id));
            }
            store_tools(&tx, id, tools)?;
            tx.commit()?;
        }
        self.db.notify(&[Table::SessionTools]);
        Ok(())
    }

    /// Deletes a session with its tool list and usage records.
    ///
    /// A session in progress returns its units in the same transaction.
    pub fn delete(&self, id: i64) -> WorkshopResult<()> {
        let released = {
            let mut conn = self.db.conn();
            let tx = conn.transaction()?;
            let session = session_by_id(&tx, id)?.ok_or_else(|| WorkshopError::not_found(Entity::Session, id))?;

            let released = session.status.holds_reservation();
            if released {
                for tool in &session.tools {
                    tools::release(&tx, tool.tool_id, tool.quantity)?;
                }
            }
            tx.execute(DELETE_SESSION, params![id])?;
            tx.commit()?;
            released
        };

        debug!(session_id = id, released, "session deleted");
        self.db.notify(&[Table::Sessions, Table::SessionTools, Table::ToolUsage]);
        if released {
            self.db.notify(&[Table::Tools]);
        }
        Ok(())
    }

    /// `SCHEDULED` to `IN_PROGRESS`, reserving each tool's requested units.
    pub fn start(&self, id: i64) -> WorkshopResult<WorkshopSession> {
        self.transition(id, Transition::Start, None)
    }

    /// `IN_PROGRESS` to `COMPLETED`, returning reserved units and storing `end_time`.
    pub fn end(&self, id: i64, end_time: &str) -> WorkshopResult<WorkshopSession> {
        let mut result = ValidationResult::new();
        result.check(is_valid_time(end_time), Message::EndTimeInvalid(end_time.to_string()));
        result.into_result()?;

        self.transition(id, Transition::End, Some(end_time))
    }

    /// Cancels a scheduled or running session; a running one returns its units.
    pub fn cancel(&self, id: i64) -> WorkshopResult<WorkshopSession> {
        self.transition(id, Transition::Cancel, None)
    }

    /// `SCHEDULED` to `NO_SHOW`.
    pub fn mark_no_show(&self, id: i64) -> WorkshopResult<WorkshopSession> {
        self.transition(id, Transition::NoShow, None)
    }

    fn transition(&self, id: i64, transition: Transition, end_time: Option<&str>) -> WorkshopResult<WorkshopSession> {
        let (session, reservation) = {
            let mut conn = self.db.conn();
            let tx = conn.transaction()?;

            let mut session = session_by_id(&tx, id)?.ok_or_else(|| WorkshopError::not_found(Entity::Session, id))?;
            let from = session.status;
            let to = transition.apply(from).ok_or(WorkshopError::InvalidTransition {
                id,
                action: transition,
                status: from,
            })?;

            let reservation = Transition::reservation(from, to);
            match reservation {
                Reservation::Reserve => {
                    for tool in &session.tools {
                        tools::reserve(&tx, tool.tool_id, tool.quantity)?;
                    }
                }
                Reservation::Release => {
                    for tool in &session.tools {
                        tools::release(&tx, tool.tool_id, tool.quantity)?;
                    }
                }
                Reservation::None => {}
            }

            tx.execute(UPDATE_STATUS, params![id, to, end_time])?;
            tx.commit()?;

            debug!(session_id = id, from = %from, to = %to, ?reservation, "session transition");
            session.status = to;
            if let Some(end_time) = end_time {
                session.end_time = Some(end_time.to_string());
            }
            (session, reservation)
        };

        self.db.notify(&[Table::Sessions]);
        if reservation != Reservation::None {
            self.db.notify(&[Table::Tools]);
        }
        Ok(session)
    }

    pub fn get(&self, id: i64) -> WorkshopResult<Option<WorkshopSession>> {
        session_by_id(&self.db.conn(), id)
    }

    /// All sessions, newest first.
    pub fn fetch_all(&self) -> WorkshopResult<Vec<WorkshopSession>> {
        query_sessions(&self.db.conn(), &select("", ORDER_NEWEST), [])
    }

    pub fn by_student(&self, student_id: i64) -> WorkshopResult<Vec<WorkshopSession>> {
        query_sessions(&self.db.conn(), &select(WHERE_STUDENT, ORDER_NEWEST), params![student_id])
    }

    pub fn by_status(&self, status: SessionStatus) -> WorkshopResult<Vec<WorkshopSession>> {
        query_sessions(&self.db.conn(), &select(WHERE_STATUS, ORDER_NEWEST), params![status])
    }

    pub fn by_date(&self, date: NaiveDate) -> WorkshopResult<Vec<WorkshopSession>> {
        sessions_on(&self.db.conn(), date)
    }

    /// Sessions between `from` and `to`, both inclusive.
    pub fn by_date_range(&self, from: NaiveDate, to: NaiveDate) -> WorkshopResult<Vec<WorkshopSession>> {
        query_sessions(&self.db.conn(), &select(WHERE_DATE_RANGE, ORDER_NEWEST), params![from, to])
    }

    /// Sessions whose project name, description or instructor contains `query`.
    pub fn search(&self, query: &str) -> WorkshopResult<Vec<WorkshopSession>> {
        query_sessions(&self.db.conn(), &select(WHERE_SEARCH, ORDER_NEWEST), params![query])
    }

    /// Scheduled sessions on or after `today`, soonest first.
    pub fn upcoming(&self, today: NaiveDate) -> WorkshopResult<Vec<WorkshopSession>> {
        query_sessions(&self.db.conn(), &select(WHERE_UPCOMING, ORDER_SOONEST), params![today])
    }

    /// Sessions currently in progress.
    pub fn active(&self) -> WorkshopResult<Vec<WorkshopSession>> {
        query_sessions(&self.db.conn(), &select(WHERE_ACTIVE, ORDER_NEWEST), [])
    }

    /// The `limit` most recently completed sessions.
    pub fn recent_completed(&self, limit: u32) -> WorkshopResult<Vec<WorkshopSession>> {
        let sql = format!("{} {}", select(WHERE_COMPLETED, ORDER_NEWEST), LIMIT);
        query_sessions(&self.db.conn(), &sql, params![limit])
    }

    /// Tool list of a session in booking order.
    pub fn tools_of(&self, id: i64) -> WorkshopResult<Vec<SessionTool>> {
        load_tools(&self.db.conn(), id)
    }

    pub fn count(&self) -> WorkshopResult<i64> {
        Ok(self.db.conn().query_row(COUNT_SESSIONS, [], |row| row.get(0))?)
    }

    pub fn count_by_status(&self, status: SessionStatus) -> WorkshopResult<i64> {
        Ok(self.db.conn().query_row(COUNT_BY_STATUS, params![status], |row| row.get(0))?)
    }

    pub fn count_by_student(&self, student_id: i64) -> WorkshopResult<i64> {
        Ok(self.db.conn().query_row(COUNT_BY_STUDENT, params![student_id], |row| row.get(0))?)
    }

    pub fn count_by_date(&self, date: NaiveDate) -> WorkshopResult<i64> {
        Ok(self.db.conn().query_row(COUNT_BY_DATE, params![date], |row| row.get(0))?)
    }

    /// Checks a session form against `today`.
    ///
    /// Every violated rule yields one message, so an empty start time
    /// reports both the missing value and the bad format.
    pub fn validate(&self, session: &WorkshopSession, today: NaiveDate) -> WorkshopResult<ValidationResult> {
        let mut result = ValidationResult::new();

        result.check(session.student_id != 0, Message::SessionStudentMissing);
        result.check(!is_blank(&session.project_name), Message::SessionProjectEmpty);
        result.check(!is_blank(&session.start_time), Message::SessionStartTimeEmpty);
        result.check(!is_blank(&session.instructor_name), Message::SessionInstructorEmpty);

        if session.status == SessionStatus::Scheduled && session.session_date < today {
            result.push(Message::SessionDateInPast(session.session_date.to_string()));
        }

        result.check(
            is_valid_time(&session.start_time),
            Message::StartTimeInvalid(session.start_time.clone()),
        );
        if let Some(end_time) = session.end_time.as_deref().filter(|t| !is_blank(t)) {
            result.check(is_valid_time(end_time), Message::EndTimeInvalid(end_time.to_string()));
        }

        let conn = self.db.conn();
        let mut seen = HashSet::new();
        for requested in &session.tools {
            if !seen.insert(requested.tool_id) {
                result.push(Message::SessionToolDuplicate(requested.tool_id));
                continue;
            }
            if requested.quantity < 1 {
                result.push(Message::SessionToolQuantityTooLow(requested.tool_id));
                continue;
            }
            match tool_by_id(&conn, requested.tool_id)? {
                None => result.push(Message::SessionToolNotFound(requested.tool_id)),
                Some(tool) => result.check(tool.can_lend(requested.quantity), Message::SessionToolUnavailable(tool.name)),
            }
        }

        Ok(result)
    }

    pub fn subscribe_all(&self) -> LiveQuery<Vec<WorkshopSession>> {
        let sql = select("", ORDER_NEWEST);
        LiveQuery::new(&self.db, &SESSION_TABLES, move |conn| query_sessions(conn, &sql, []))
    }

    pub fn subscribe_by_student(&self, student_id: i64) -> LiveQuery<Vec<WorkshopSession>> {
        let sql = select(WHERE_STUDENT, ORDER_NEWEST);
        LiveQuery::new(&self.db, &SESSION_TABLES, move |conn| query_sessions(conn, &sql, params![student_id]))
    }

    pub fn subscribe_by_status(&self, status: SessionStatus) -> LiveQuery<Vec<WorkshopSession>> {
        let sql = select(WHERE_STATUS, ORDER_NEWEST);
        LiveQuery::new(&self.db, &SESSION_TABLES, move |conn| query_sessions(conn, &sql, params![status]))
    }

    pub fn subscribe_upcoming(&self, today: NaiveDate) -> LiveQuery<Vec<WorkshopSession>> {
        let sql = select(WHERE_UPCOMING, ORDER_SOONEST);
        LiveQuery::new(&self.db, &SESSION_TABLES, move |conn| query_sessions(conn, &sql, params![today]))
    }

    pub fn subscribe_active(&self) -> LiveQuery<Vec<WorkshopSession>> {
        let sql = select(WHERE_ACTIVE, ORDER_NEWEST);
        LiveQuery::new(&self.db, &SESSION_TABLES, move |conn| query_sessions(conn, &sql, []))
    }
}
