//! Workshop session model and its lifecycle state machine.
//!
//! ```text
//!  SCHEDULED ──start──▶ IN_PROGRESS ──end──▶ COMPLETED
//!      │  │                  │
//!      │  └────cancel────────┴──cancel──▶ CANCELLED
//!      └──no-show──▶ NO_SHOW
//! ```
//!
//! Only `IN_PROGRESS` holds a tool reservation. A transition into it reserves
//! the session's tools and a transition out of it returns them; see
//! [`Transition::reservation`].

use crate::libs::error::WorkshopError;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 5] = [
        SessionStatus::Scheduled,
        SessionStatus::InProgress,
        SessionStatus::Completed,
        SessionStatus::Cancelled,
        SessionStatus::NoShow,
    ];

    /// Column value stored in `workshop_sessions.status`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "SCHEDULED",
            SessionStatus::InProgress => "IN_PROGRESS",
            SessionStatus::Completed => "COMPLETED",
            SessionStatus::Cancelled => "CANCELLED",
            SessionStatus::NoShow => "NO_SHOW",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled | SessionStatus::NoShow)
    }

    /// Whether tool units are out on this session.
    pub fn holds_reservation(&self) -> bool {
        *self == SessionStatus::InProgress
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::InProgress => "in progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::NoShow => "no-show",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for SessionStatus {
    type Err = WorkshopError;

    /// Accepts the column form (`IN_PROGRESS`) and the CLI forms (`in-progress`, `in progress`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        SessionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| WorkshopError::UnknownVariant {
                kind: "session status",
                value: s.to_string(),
            })
    }
}

impl ToSql for SessionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SessionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Tool side effect of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    Reserve,
    Release,
    None,
}

/// A lifecycle action requested on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    End,
    Cancel,
    NoShow,
}

impl Transition {
    /// Target status when the transition is allowed from `from`, `None` otherwise.
    pub fn apply(&self, from: SessionStatus) -> Option<SessionStatus> {
        use SessionStatus::*;
        match (self, from) {
            (Transition::Start, Scheduled) => Some(InProgress),
            (Transition::End, InProgress) => Some(Completed),
            (Transition::Cancel, Scheduled | InProgress) => Some(Cancelled),
            (Transition::NoShow, Scheduled) => Some(NoShow),
            _ => None,
        }
    }

    pub fn reservation(from: SessionStatus, to: SessionStatus) -> Reservation {
        match (from.holds_reservation(), to.holds_reservation()) {
            (false, true) => Reservation::Reserve,
            (true, false) => Reservation::Release,
            _ => Reservation::None,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Transition::Start => "start",
            Transition::End => "end",
            Transition::Cancel => "cancel",
            Transition::NoShow => "mark as no-show",
        };
        write!(f, "{}", verb)
    }
}

/// One tool booked for a session, with the number of units it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTool {
    pub tool_id: i64,
    pub quantity: i32,
}

impl SessionTool {
    pub fn new(tool_id: i64, quantity: i32) -> Self {
        SessionTool { tool_id, quantity }
    }

    pub fn single(tool_id: i64) -> Self {
        SessionTool { tool_id, quantity: 1 }
    }

    /// Parses a CLI tool list such as `3,7:2` (tool 3 once, tool 7 twice).
    ///
    /// Returns `None` for anything that is not a comma separated list of
    /// `id` or `id:quantity` items.
    pub fn parse_list(value: &str) -> Option<Vec<SessionTool>> {
        if value.trim().is_empty() {
            return Some(Vec::new());
        }
        value
            .split(',')
            .map(|item| {
                let mut parts = item.trim().splitn(2, ':');
                let tool_id = parts.next()?.trim().parse().ok()?;
                let quantity = match parts.next() {
                    Some(q) => q.trim().parse().ok()?,
                    None => 1,
                };
                Some(SessionTool { tool_id, quantity })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkshopSession {
    pub id: Option<i64>,
    /// Row id of the student; `0` means none selected yet.
    pub student_id: i64,
    pub session_date: NaiveDate,
    /// `HH:MM`
    pub start_time: String,
    pub end_time: Option<String>,
    pub project_name: String,
    pub project_description: Option<String>,
    /// Booked tools in the order they were listed.
    pub tools: Vec<SessionTool>,
    pub instructor_name: String,
    pub safety_briefing_completed: bool,
    pub status: SessionStatus,
    pub notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl WorkshopSession {
    pub fn new(student_id: i64, session_date: NaiveDate, start_time: &str, project_name: &str, instructor_name: &str) -> Self {
        WorkshopSession {
            id: None,
            student_id,
            session_date,
            start_time: start_time.to_string(),
            end_time: None,
            project_name: project_name.to_string(),
            project_description: None,
            tools: Vec::new(),
            instructor_name: instructor_name.to_string(),
            safety_briefing_completed: true,
            status: SessionStatus::Scheduled,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<SessionTool>) -> Self {
        self.tools = tools;
        self
    }

    /// Comma separated `id` / `id:quantity` list, the inverse of [`SessionTool::parse_list`].
    pub fn tool_list(&self) -> String {
        self.tools
            .iter()
            .map(|t| {
                if t.quantity == 1 {
                    t.tool_id.to_string()
                } else {
                    format!("{}:{}", t.tool_id, t.quantity)
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for WorkshopSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.project_name, self.session_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table() {
        use SessionStatus::*;
        assert_eq!(Transition::Start.apply(Scheduled), Some(InProgress));
        assert_eq!(Transition::End.apply(InProgress), Some(Completed));
        assert_eq!(Transition::Cancel.apply(Scheduled), Some(Cancelled));
        assert_eq!(Transition::Cancel.apply(InProgress), Some(Cancelled));
        assert_eq!(Transition::NoShow.apply(Scheduled), Some(NoShow));

        assert_eq!(Transition::Start.apply(InProgress), None);
        assert_eq!(Transition::End.apply(Scheduled), None);
        assert_eq!(Transition::NoShow.apply(InProgress), None);
        for terminal in [Completed, Cancelled, NoShow] {
            assert!(terminal.is_terminal());
            for transition in [Transition::Start, Transition::End, Transition::Cancel, Transition::NoShow] {
                assert_eq!(transition.apply(terminal), None);
            }
        }
    }

    #[test]
    fn reservation_follows_in_progress() {
        use SessionStatus::*;
        assert_eq!(Transition::reservation(Scheduled, InProgress), Reservation::Reserve);
        assert_eq!(Transition::reservation(InProgress, Completed), Reservation::Release);
        assert_eq!(Transition::reservation(InProgress, Cancelled), Reservation::Release);
        assert_eq!(Transition::reservation(Scheduled, Cancelled), Reservation::None);
        assert_eq!(Transition::reservation(Scheduled, NoShow), Reservation::None);
    }

    #[test]
    fn status_parsing() {
        assert_eq!("in-progress".parse::<SessionStatus>().unwrap(), SessionStatus::InProgress);
        assert_eq!("NO_SHOW".parse::<SessionStatus>().unwrap(), SessionStatus::NoShow);
        assert_eq!("completed".parse::<SessionStatus>().unwrap(), SessionStatus::Completed);
        assert!("finished".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn tool_list_parsing() {
        assert_eq!(
            SessionTool::parse_list("3, 7:2").unwrap(),
            vec![SessionTool::single(3), SessionTool::new(7, 2)]
        );
        assert_eq!(SessionTool::parse_list("").unwrap(), vec![]);
        assert!(SessionTool::parse_list("3,x").is_none());
        assert!(SessionTool::parse_list("3:").is_none());

        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let session = WorkshopSession::new(1, date, "08:00", "Bird house", "Pak Budi")
            .with_tools(vec![SessionTool::single(3), SessionTool::new(7, 2)]);
        assert_eq!(session.tool_list(), "3,7:2");
    }
}
