use super::{now_hhmm, report};
use crate::{
    db::{db::Db, statistics::Statistics, tool_usage::ToolUsages, tools::Tools},
    libs::{messages::Message, tool::ToolCondition, view::View},
    msg_error, msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use prettytable::{row, Table};

#[derive(Debug, Args)]
pub struct UsageArgs {
    #[command(subcommand)]
    command: UsageCommand,
}

#[derive(Debug, Subcommand)]
enum UsageCommand {
    /// Record that a tool was picked up during a session
    Start {
        session: i64,
        tool: i64,
        #[arg(short, long, default_value_t = 1)]
        quantity: i32,
        /// excellent, good, fair, poor or broken
        #[arg(short, long, default_value = "good")]
        condition: String,
        /// Start time as HH:MM, defaults to now
        #[arg(short, long)]
        time: Option<String>,
    },
    /// Record that a tool came back
    End {
        id: i64,
        /// excellent, good, fair, poor or broken
        condition: String,
        /// End time as HH:MM, defaults to now
        #[arg(short, long)]
        time: Option<String>,
    },
    /// List usage records
    List {
        #[arg(short, long)]
        session: Option<i64>,
        #[arg(short, long)]
        tool: Option<i64>,
    },
    /// Usage totals of one tool
    Summary { tool: i64 },
}

pub async fn cmd(args: UsageArgs) -> Result<()> {
    let db = Db::new()?;
    let usages = ToolUsages::new(&db);

    match args.command {
        UsageCommand::Start {
            session,
            tool,
            quantity,
            condition,
            time,
        } => {
            let condition = match condition.parse::<ToolCondition>() {
                Ok(condition) => condition,
                Err(e) => return report(e),
            };
            let start_time = time.unwrap_or_else(now_hhmm);
            match usages.start_usage(session, tool, quantity, condition, &start_time) {
                Ok(id) => {
                    msg_success!(Message::UsageStarted(id));
                    Ok(())
                }
                Err(e) => report(e),
            }
        }
        UsageCommand::End { id, condition, time } => {
            let condition = match condition.parse::<ToolCondition>() {
                Ok(condition) => condition,
                Err(e) => return report(e),
            };
            match usages.end_usage(id, &time.unwrap_or_else(now_hhmm), condition) {
                Ok(()) => {
                    msg_success!(Message::UsageEnded(id));
                    Ok(())
                }
                Err(e) => report(e),
            }
        }
        UsageCommand::List { session, tool } => {
            let list = match (session, tool) {
                (Some(session), _) => usages.by_session(session)?,
                (None, Some(tool)) => usages.by_tool(tool)?,
                (None, None) => usages.fetch_all()?,
            };
            if list.is_empty() {
                msg_info!(Message::NoUsagesFound);
                return Ok(());
            }
            msg_print!(Message::UsageListHeader, true);
            View::usages(&list)
        }
        UsageCommand::Summary { tool } => handle_summary(&db, tool),
    }
}

fn handle_summary(db: &Db, tool_id: i64) -> Result<()> {
    let Some(tool) = Tools::new(db).get(tool_id)? else {
        msg_error!(Message::ToolNotFound(tool_id.to_string()));
        return Ok(());
    };
    let summary = Statistics::new(db).tool_summary(tool_id)?;

    msg_print!(Message::UsageSummaryHeader(tool.name), true);
    let mut table = Table::new();
    table.add_row(row!["TIMES USED", "UNITS USED", "AVG CONDITION"]);
    table.add_row(row![summary.total_usage, summary.total_quantity, format!("{:.1}", summary.average_condition)]);
    table.printstd();
    Ok(())
}
