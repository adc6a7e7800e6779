use super::{parse_date, today};
use crate::{
    db::{db::Db, statistics::Statistics, students::Students, tools::Tools},
    libs::{messages::Message, view::View},
    msg_info, msg_print,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use std::collections::HashMap;

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(subcommand)]
    command: Option<StatsCommand>,
}

#[derive(Debug, Subcommand)]
enum StatsCommand {
    /// Counts for today (default)
    Dashboard,
    /// Most used tools
    Tools {
        /// First session date, YYYY-MM-DD
        #[arg(short, long, requires = "to")]
        from: Option<String>,
        /// Last session date, YYYY-MM-DD
        #[arg(short, long, requires = "from")]
        to: Option<String>,
    },
    /// Average condition tools come back in
    Conditions,
    /// Completed sessions per month
    Monthly,
    /// Completed sessions per student
    Students,
}

pub async fn cmd(args: StatsArgs) -> Result<()> {
    let db = Db::new()?;
    let statistics = Statistics::new(&db);

    match args.command.unwrap_or(StatsCommand::Dashboard) {
        StatsCommand::Dashboard => {
            let today = today();
            let dashboard = statistics.dashboard(today)?;
            let breakdown = statistics.session_breakdown(today)?;

            msg_print!(Message::DashboardHeader(today.to_string()), true);
            View::dashboard(&dashboard)?;

            msg_print!(Message::SessionBreakdownHeader, true);
            View::session_breakdown(&breakdown)?;

            if !dashboard.today_sessions.is_empty() {
                msg_print!(Message::SessionListHeader, true);
                View::sessions(&dashboard.today_sessions, &student_names(&db)?)?;
            }
            Ok(())
        }
        StatsCommand::Tools { from, to } => {
            let stats = match (from, to) {
                (Some(from), Some(to)) => statistics.tool_usage_between(parse_date(&from)?, parse_date(&to)?)?,
                _ => statistics.tool_usage()?,
            };
            if stats.is_empty() {
                msg_info!(Message::NoStatisticsYet);
                return Ok(());
            }
            msg_print!(Message::ToolUsageStatsHeader, true);
            View::tool_usage_stats(&stats, &tool_names(&db)?)
        }
        StatsCommand::Conditions => {
            let stats = statistics.tool_conditions()?;
            if stats.is_empty() {
                msg_info!(Message::NoStatisticsYet);
                return Ok(());
            }
            msg_print!(Message::ToolConditionStatsHeader, true);
            View::tool_condition_stats(&stats, &tool_names(&db)?)
        }
        StatsCommand::Monthly => {
            let stats = statistics.monthly_sessions()?;
            if stats.is_empty() {
                msg_info!(Message::NoStatisticsYet);
                return Ok(());
            }
            msg_print!(Message::MonthlyStatsHeader, true);
            View::monthly_stats(&stats)
        }
        StatsCommand::Students => {
            let stats = statistics.student_sessions()?;
            if stats.is_empty() {
                msg_info!(Message::NoStatisticsYet);
                return Ok(());
            }
            msg_print!(Message::StudentStatsHeader, true);
            View::student_stats(&stats, &student_names(&db)?)
        }
    }
}

fn student_names(db: &Db) -> Result<HashMap<i64, String>> {
    Ok(Students::new(db)
        .fetch_all()?
        .into_iter()
        .filter_map(|s| s.id.map(|id| (id, s.full_name)))
        .collect())
}

fn tool_names(db: &Db) -> Result<HashMap<i64, String>> {
    Ok(Tools::new(db)
        .fetch_all()?
        .into_iter()
        .filter_map(|t| t.id.map(|id| (id, t.name)))
        .collect())
}
