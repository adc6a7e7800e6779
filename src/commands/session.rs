use super::{now_hhmm, parse_date, report, today};
use crate::{
    db::{db::Db, sessions::Sessions, students::Students, tool_usage::ToolUsages, tools::Tools},
    libs::{
        config::Config,
        messages::Message,
        session::{SessionStatus, SessionTool, WorkshopSession},
        view::View,
    },
    msg_error, msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::collections::HashMap;

#[derive(Debug, Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Debug, Subcommand)]
enum SessionCommand {
    /// Book a workshop session
    Schedule {
        /// Row id of the student
        student: i64,
        /// Date as YYYY-MM-DD
        date: String,
        /// Start time as HH:MM
        start: String,
        /// Project name
        project: String,
        /// Defaults to the configured instructor
        #[arg(short, long)]
        instructor: Option<String>,
        /// Tools as "id" or "id:quantity", comma separated, e.g. "3,7:2"
        #[arg(short, long)]
        tools: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
        /// The safety briefing has not been given yet
        #[arg(long)]
        no_briefing: bool,
    },
    /// Change a session's details; tools can only change while it is scheduled
    Edit {
        id: i64,
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// Start time as HH:MM
        #[arg(long)]
        start: Option<String>,
        #[arg(short, long)]
        project: Option<String>,
        #[arg(short, long)]
        instructor: Option<String>,
        /// Replaces the tool list, same format as for schedule
        #[arg(short, long)]
        tools: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List sessions
    List {
        /// scheduled, in-progress, completed, cancelled or no-show
        #[arg(short, long)]
        status: Option<String>,
        /// Row id of a student
        #[arg(long)]
        student: Option<i64>,
        /// A single date, YYYY-MM-DD
        #[arg(short, long)]
        date: Option<String>,
        /// Search project, description and instructor
        #[arg(short = 'q', long)]
        search: Option<String>,
        /// Recently completed sessions only
        #[arg(short, long)]
        recent: bool,
    },
    /// Show one session with its tools
    Show { id: i64 },
    /// Scheduled sessions from today on
    Upcoming,
    /// Sessions in progress
    Active,
    /// Start a session and take its tools off the shelf
    Start { id: i64 },
    /// Complete a session and return its tools
    End {
        id: i64,
        /// End time as HH:MM, defaults to now
        #[arg(short, long)]
        time: Option<String>,
    },
    /// Cancel a scheduled or running session
    Cancel { id: i64 },
    /// Mark a scheduled session as a no-show
    NoShow { id: i64 },
    /// Delete a session with its usage records
    Delete { id: i64 },
}

pub async fn cmd(args: SessionArgs) -> Result<()> {
    let db = Db::new()?;
    let sessions = Sessions::new(&db);

    match args.command {
        SessionCommand::Schedule {
            student,
            date,
            start,
            project,
            instructor,
            tools,
            description,
            notes,
            no_briefing,
        } => {
            let Some(tools) = SessionTool::parse_list(tools.as_deref().unwrap_or("")) else {
                msg_error!(Message::ToolListInvalid(tools.unwrap_or_default()));
                return Ok(());
            };
            let instructor = match instructor {
                Some(instructor) => instructor,
                None => Config::read()?.session_defaults().default_instructor,
            };
            let session = WorkshopSession {
                project_description: description,
                notes,
                safety_briefing_completed: !no_briefing,
                ..WorkshopSession::new(student, parse_date(&date)?, &start, &project, &instructor).with_tools(tools)
            };
            handle_schedule(&sessions, session)
        }
        SessionCommand::Edit {
            id,
            date,
            start,
            project,
            instructor,
            tools,
            description,
            notes,
        } => {
            let Some(mut session) = sessions.get(id)? else {
                msg_error!(Message::SessionNotFound(id));
                return Ok(());
            };
            if let Some(list) = tools {
                let Some(parsed) = SessionTool::parse_list(&list) else {
                    msg_error!(Message::ToolListInvalid(list));
                    return Ok(());
                };
                session.tools = parsed;
            }
            if let Some(date) = date {
                session.session_date = parse_date(&date)?;
            }
            session.start_time = start.unwrap_or(session.start_time);
            session.project_name = project.unwrap_or(session.project_name);
            session.instructor_name = instructor.unwrap_or(session.instructor_name);
            session.project_description = description.or(session.project_description);
            session.notes = notes.or(session.notes);
            handle_edit(&sessions, session)
        }
        SessionCommand::List {
            status,
            student,
            date,
            search,
            recent,
        } => {
            let list = if recent {
                let limit = Config::read()?.session_defaults().recent_limit;
                sessions.recent_completed(limit)?
            } else if let Some(status) = status {
                match status.parse::<SessionStatus>() {
                    Ok(status) => sessions.by_status(status)?,
                    Err(e) => return report(e),
                }
            } else if let Some(student) = student {
                sessions.by_student(student)?
            } else if let Some(date) = date {
                sessions.by_date(parse_date(&date)?)?
            } else if let Some(query) = search {
                sessions.search(&query)?
            } else {
                sessions.fetch_all()?
            };
            print_list(&db, Message::SessionListHeader, &list)
        }
        SessionCommand::Show { id } => handle_show(&db, id),
        SessionCommand::Upcoming => print_list(&db, Message::UpcomingSessionsHeader, &sessions.upcoming(today())?),
        SessionCommand::Active => print_list(&db, Message::ActiveSessionsHeader, &sessions.active()?),
        SessionCommand::Start { id } => match sessions.start(id) {
            Ok(_) => {
                msg_success!(Message::SessionStarted(id));
                Ok(())
            }
            Err(e) => report(e),
        },
        SessionCommand::End { id, time } => handle_end(&db, id, time.unwrap_or_else(now_hhmm)),
        SessionCommand::Cancel { id } => match sessions.cancel(id) {
            Ok(_) => {
                msg_success!(Message::SessionCancelled(id));
                Ok(())
            }
            Err(e) => report(e),
        },
        SessionCommand::NoShow { id } => match sessions.mark_no_show(id) {
            Ok(_) => {
                msg_success!(Message::SessionMarkedNoShow(id));
                Ok(())
            }
            Err(e) => report(e),
        },
        SessionCommand::Delete { id } => handle_delete(&sessions, id),
    }
}

fn handle_schedule(sessions: &Sessions, session: WorkshopSession) -> Result<()> {
    if let Err(e) = sessions.validate(&session, today())?.into_result() {
        return report(e);
    }

    match sessions.insert(&session) {
        Ok(id) => {
            msg_success!(Message::SessionScheduled(id));
            Ok(())
        }
        Err(e) => report(e),
    }
}

fn handle_edit(sessions: &Sessions, session: WorkshopSession) -> Result<()> {
    // Units held by a running session would read as unavailable
    let mut form = session.clone();
    if form.status != SessionStatus::Scheduled {
        form.tools.clear();
    }
    if let Err(e) = sessions.validate(&form, today())?.into_result() {
        return report(e);
    }

    let id = session.id.unwrap_or(0);
    match sessions.update(&session) {
        Ok(()) => {
            msg_success!(Message::SessionUpdated(id));
            Ok(())
        }
        Err(e) => report(e),
    }
}

fn student_names(db: &Db) -> Result<HashMap<i64, String>> {
    Ok(Students::new(db)
        .fetch_all()?
        .into_iter()
        .filter_map(|s| s.id.map(|id| (id, s.full_name)))
        .collect())
}

fn print_list(db: &Db, header: Message, sessions: &[WorkshopSession]) -> Result<()> {
    if sessions.is_empty() {
        msg_info!(Message::NoSessionsFound);
        return Ok(());
    }

    msg_print!(header, true);
    View::sessions(sessions, &student_names(db)?)
}

fn handle_show(db: &Db, id: i64) -> Result<()> {
    let Some(session) = Sessions::new(db).get(id)? else {
        msg_error!(Message::SessionNotFound(id));
        return Ok(());
    };

    let student = match Students::new(db).get(session.student_id)? {
        Some(student) => student.to_string(),
        None => format!("#{}", session.student_id),
    };

    let tools = Tools::new(db);
    let mut booked = Vec::with_capacity(session.tools.len());
    for requested in &session.tools {
        if let Some(tool) = tools.get(requested.tool_id)? {
            booked.push((tool, requested.quantity));
        }
    }

    View::session(&session, &student)?;
    if !booked.is_empty() {
        msg_print!(Message::SessionToolsHeader(id), true);
        View::session_tools(&booked)?;
    }
    Ok(())
}

fn handle_end(db: &Db, id: i64, end_time: String) -> Result<()> {
    if let Err(e) = Sessions::new(db).end(id, &end_time) {
        return report(e);
    }
    msg_success!(Message::SessionEnded(id, end_time.clone()));

    let closed = ToolUsages::new(db).end_for_session(id, &end_time)?;
    if closed > 0 {
        msg_info!(Message::UsagesEndedForSession(closed, id));
    }
    Ok(())
}

fn handle_delete(sessions: &Sessions, id: i64) -> Result<()> {
    if sessions.get(id)?.is_none() {
        msg_error!(Message::SessionNotFound(id));
        return Ok(());
    }

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::ConfirmDeleteSession(id).to_string())
        .default(false)
        .interact()?;

    if !confirmed {
        msg_info!(Message::OperationCancelled);
        return Ok(());
    }

    match sessions.delete(id) {
        Ok(()) => {
            msg_success!(Message::SessionDeleted(id));
            Ok(())
        }
        Err(e) => report(e),
    }
}
