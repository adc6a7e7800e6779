use super::session::WorkshopSession;
use super::statistics::{
    Dashboard, MonthlySessionStat, SessionStatistics, StudentSessionStat, ToolConditionStat, ToolUsageStat, ToolUsageSummary,
};
use super::student::Student;
use super::tool::Tool;
use super::usage::ToolUsage;
use anyhow::Result;
use prettytable::{row, Table};
use std::collections::HashMap;

pub struct View {}

impl View {
    pub fn students(students: &[Student]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "STUDENT NO", "NAME", "CLASS", "EMAIL", "ACTIVE"]);
        for student in students {
            table.add_row(row![
                student.id.unwrap_or(0),
                student.student_id,
                student.full_name,
                student.class_name,
                student.email.as_deref().unwrap_or("-"),
                yes_no(student.is_active)
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn student(student: &Student, session_count: i64) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", student.id.unwrap_or(0)]);
        table.add_row(row!["STUDENT NO", student.student_id]);
        table.add_row(row!["NAME", student.full_name]);
        table.add_row(row!["CLASS", student.class_name]);
        table.add_row(row!["EMAIL", student.email.as_deref().unwrap_or("-")]);
        table.add_row(row!["PHONE", student.phone.as_deref().unwrap_or("-")]);
        table.add_row(row!["ADDRESS", student.address.as_deref().unwrap_or("-")]);
        table.add_row(row!["ACTIVE", yes_no(student.is_active)]);
        table.add_row(row!["SESSIONS", session_count]);
        table.printstd();

        Ok(())
    }

    pub fn tools(tools: &[Tool]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "CODE", "NAME", "CATEGORY", "AVAILABLE", "STATUS", "ACTIVE"]);
        for tool in tools {
            table.add_row(row![
                tool.id.unwrap_or(0),
                tool.code,
                tool.name,
                tool.category,
                format!("{}/{}", tool.available_quantity, tool.quantity),
                tool.status,
                yes_no(tool.is_active)
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn tool(tool: &Tool, summary: &ToolUsageSummary) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", tool.id.unwrap_or(0)]);
        table.add_row(row!["CODE", tool.code]);
        table.add_row(row!["NAME", tool.name]);
        table.add_row(row!["CATEGORY", tool.category]);
        table.add_row(row!["DESCRIPTION", tool.description.as_deref().unwrap_or("-")]);
        table.add_row(row!["LOCATION", tool.location.as_deref().unwrap_or("-")]);
        table.add_row(row!["QUANTITY", tool.quantity]);
        table.add_row(row!["AVAILABLE", tool.available_quantity]);
        table.add_row(row!["RESERVED", tool.reserved()]);
        table.add_row(row!["STATUS", tool.status]);
        table.add_row(row!["ACTIVE", yes_no(tool.is_active)]);
        table.add_row(row!["TIMES USED", summary.total_usage]);
        table.add_row(row!["UNITS USED", summary.total_quantity]);
        table.add_row(row!["AVG CONDITION", format!("{:.1}", summary.average_condition)]);
        table.printstd();

        Ok(())
    }

    /// Session list; `students` maps row ids to names for display.
    pub fn sessions(sessions: &[WorkshopSession], students: &HashMap<i64, String>) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "DATE", "TIME", "STUDENT", "PROJECT", "INSTRUCTOR", "TOOLS", "STATUS"]);
        for session in sessions {
            let time = match &session.end_time {
                Some(end) => format!("{}-{}", session.start_time, end),
                None => session.start_time.clone(),
            };
            table.add_row(row![
                session.id.unwrap_or(0),
                session.session_date,
                time,
                student_name(students, session.student_id),
                session.project_name,
                session.instructor_name,
                session.tool_list(),
                session.status
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn session(session: &WorkshopSession, student: &str) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", session.id.unwrap_or(0)]);
        table.add_row(row!["STUDENT", student]);
        table.add_row(row!["DATE", session.session_date]);
        table.add_row(row!["START", session.start_time]);
        table.add_row(row!["END", session.end_time.as_deref().unwrap_or("-")]);
        table.add_row(row!["PROJECT", session.project_name]);
        table.add_row(row!["DESCRIPTION", session.project_description.as_deref().unwrap_or("-")]);
        table.add_row(row!["INSTRUCTOR", session.instructor_name]);
        table.add_row(row!["SAFETY BRIEFING", yes_no(session.safety_briefing_completed)]);
        table.add_row(row!["STATUS", session.status]);
        table.add_row(row!["NOTES", session.notes.as_deref().unwrap_or("-")]);
        table.printstd();

        Ok(())
    }

    /// Tools booked by a session with the units requested.
    pub fn session_tools(tools: &[(Tool, i32)]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["TOOL ID", "CODE", "NAME", "QTY", "ON SHELF"]);
        for (tool, quantity) in tools {
            table.add_row(row![tool.id.unwrap_or(0), tool.code, tool.name, quantity, tool.available_quantity]);
        }
        table.printstd();

        Ok(())
    }

    pub fn usages(usages: &[ToolUsage]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "SESSION", "TOOL", "QTY", "BEFORE", "AFTER", "START", "END"]);
        for usage in usages {
            table.add_row(row![
                usage.id.unwrap_or(0),
                usage.session_id,
                usage.tool_id,
                usage.quantity_used,
                usage.condition_before,
                usage.condition_after.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
                usage.start_time,
                usage.end_time.as_deref().unwrap_or("-")
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn dashboard(dashboard: &Dashboard) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ACTIVE STUDENTS", dashboard.active_students]);
        table.add_row(row!["TOOLS ON SHELF", dashboard.available_tools]);
        table.add_row(row!["SESSIONS TODAY", dashboard.today_sessions.len()]);
        table.printstd();

        Ok(())
    }

    pub fn session_breakdown(breakdown: &SessionStatistics) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["TOTAL", "IN PROGRESS", "COMPLETED", "CANCELLED", "UPCOMING"]);
        table.add_row(row![
            breakdown.total_sessions,
            breakdown.active_sessions,
            breakdown.completed_sessions,
            breakdown.cancelled_sessions,
            breakdown.upcoming_sessions
        ]);
        table.printstd();

        Ok(())
    }

    pub fn tool_usage_stats(stats: &[ToolUsageStat], tools: &HashMap<i64, String>) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["TOOL ID", "NAME", "TIMES USED", "UNITS USED"]);
        for stat in stats {
            table.add_row(row![stat.tool_id, tool_name(tools, stat.tool_id), stat.usage_count, stat.total_quantity]);
        }
        table.printstd();

        Ok(())
    }

    pub fn tool_condition_stats(stats: &[ToolConditionStat], tools: &HashMap<i64, String>) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["TOOL ID", "NAME", "AVG CONDITION"]);
        for stat in stats {
            table.add_row(row![stat.tool_id, tool_name(tools, stat.tool_id), format!("{:.2}", stat.avg_condition)]);
        }
        table.printstd();

        Ok(())
    }

    pub fn monthly_stats(stats: &[MonthlySessionStat]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["MONTH", "COMPLETED"]);
        for stat in stats {
            table.add_row(row![stat.month, stat.count]);
        }
        table.printstd();

        Ok(())
    }

    pub fn student_stats(stats: &[StudentSessionStat], students: &HashMap<i64, String>) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["STUDENT", "COMPLETED"]);
        for stat in stats {
            table.add_row(row![student_name(students, stat.student_id), stat.session_count]);
        }
        table.printstd();

        Ok(())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn student_name(students: &HashMap<i64, String>, id: i64) -> String {
    students.get(&id).cloned().unwrap_or_else(|| format!("#{}", id))
}

fn tool_name(tools: &HashMap<i64, String>, id: i64) -> String {
    tools.get(&id).cloned().unwrap_or_else(|| format!("#{}", id))
}
