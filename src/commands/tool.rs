use super::report;
use crate::{
    db::{db::Db, statistics::Statistics, tools::Tools},
    libs::{
        messages::Message,
        tool::{Tool, ToolStatus},
        view::View,
    },
    msg_error, msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};

#[derive(Debug, Args)]
pub struct ToolArgs {
    #[command(subcommand)]
    command: ToolCommand,
}

#[derive(Debug, Subcommand)]
enum ToolCommand {
    /// Add a tool to the inventory
    Add {
        /// Inventory code, e.g. "DRL-01"
        code: String,
        name: String,
        #[arg(short, long)]
        category: String,
        /// Number of units owned
        #[arg(short, long, default_value_t = 1)]
        quantity: i32,
        #[arg(short, long)]
        description: Option<String>,
        /// Shelf or cabinet
        #[arg(short, long)]
        location: Option<String>,
    },
    /// Change a tool's details; omitted fields are kept
    Edit {
        id: i64,
        #[arg(long)]
        code: Option<String>,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        location: Option<String>,
    },
    /// List tools
    List {
        /// Only active tools
        #[arg(short, long)]
        active: bool,
        #[arg(short, long)]
        category: Option<String>,
        /// Only tools with this status label
        #[arg(short, long)]
        status: Option<String>,
    },
    /// List tools with units on the shelf
    Available,
    /// Show one tool with its usage summary
    Show { id: i64 },
    /// Search by name, code or category
    Search { query: String },
    /// Set the status label (available, borrowed, broken, maintenance, lost)
    Status { id: i64, status: String },
    /// Change the number of units owned
    Restock { id: i64, quantity: i32 },
    Activate { id: i64 },
    Deactivate { id: i64 },
    /// Delete a tool and its usage history
    Delete { id: i64 },
}

pub async fn cmd(args: ToolArgs) -> Result<()> {
    let db = Db::new()?;
    let tools = Tools::new(&db);

    match args.command {
        ToolCommand::Add {
            code,
            name,
            category,
            quantity,
            description,
            location,
        } => {
            let tool = Tool {
                description,
                location,
                ..Tool::new(&code, &name, &category, quantity)
            };
            handle_add(&tools, tool)
        }
        ToolCommand::Edit {
            id,
            code,
            name,
            category,
            description,
            location,
        } => {
            let Some(mut tool) = find(&tools, id)? else {
                return Ok(());
            };
            tool.code = code.unwrap_or(tool.code);
            tool.name = name.unwrap_or(tool.name);
            tool.category = category.unwrap_or(tool.category);
            tool.description = description.or(tool.description);
            tool.location = location.or(tool.location);
            handle_edit(&tools, tool)
        }
        ToolCommand::List { active, category, status } => handle_list(&tools, active, category, status),
        ToolCommand::Available => print_list(Message::AvailableToolsHeader, &tools.fetch_available()?),
        ToolCommand::Show { id } => handle_show(&db, id),
        ToolCommand::Search { query } => print_list(Message::ToolListHeader, &tools.search(&query)?),
        ToolCommand::Status { id, status } => handle_status(&tools, id, &status),
        ToolCommand::Restock { id, quantity } => handle_restock(&tools, id, quantity),
        ToolCommand::Activate { id } => handle_set_active(&tools, id, true),
        ToolCommand::Deactivate { id } => handle_set_active(&tools, id, false),
        ToolCommand::Delete { id } => handle_delete(&tools, id),
    }
}

fn handle_add(tools: &Tools, tool: Tool) -> Result<()> {
    if let Err(e) = tools.validate(&tool)?.into_result() {
        return report(e);
    }

    tools.insert(&tool)?;
    msg_success!(Message::ToolCreated(tool.name));
    Ok(())
}

fn handle_edit(tools: &Tools, tool: Tool) -> Result<()> {
    if let Err(e) = tools.validate(&tool)?.into_result() {
        return report(e);
    }

    match tools.update(&tool) {
        Ok(()) => {
            msg_success!(Message::ToolUpdated(tool.name));
            Ok(())
        }
        Err(e) => report(e),
    }
}

fn handle_list(tools: &Tools, active: bool, category: Option<String>, status: Option<String>) -> Result<()> {
    let list = match (category, status) {
        (Some(category), _) => tools.by_category(&category)?,
        (None, Some(status)) => match status.parse::<ToolStatus>() {
            Ok(status) => tools.by_status(status)?,
            Err(e) => return report(e),
        },
        (None, None) if active => tools.fetch_active()?,
        (None, None) => tools.fetch_all()?,
    };
    print_list(Message::ToolListHeader, &list)
}

fn print_list(header: Message, tools: &[Tool]) -> Result<()> {
    if tools.is_empty() {
        msg_info!(Message::NoToolsFound);
        return Ok(());
    }

    msg_print!(header, true);
    View::tools(tools)
}

fn find(tools: &Tools, id: i64) -> Result<Option<Tool>> {
    let tool = tools.get(id)?;
    if tool.is_none() {
        msg_error!(Message::ToolNotFound(id.to_string()));
    }
    Ok(tool)
}

fn handle_show(db: &Db, id: i64) -> Result<()> {
    let Some(tool) = find(&Tools::new(db), id)? else {
        return Ok(());
    };
    let summary = Statistics::new(db).tool_summary(id)?;
    View::tool(&tool, &summary)
}

fn handle_status(tools: &Tools, id: i64, status: &str) -> Result<()> {
    let status = match status.parse::<ToolStatus>() {
        Ok(status) => status,
        Err(e) => return report(e),
    };
    let Some(tool) = find(tools, id)? else {
        return Ok(());
    };

    tools.set_status(id, status)?;
    msg_success!(Message::ToolStatusChanged(tool.name, status.to_string()));
    Ok(())
}

fn handle_restock(tools: &Tools, id: i64, quantity: i32) -> Result<()> {
    if quantity < 1 {
        msg_error!(Message::ToolQuantityTooLow);
        return Ok(());
    }

    match tools.set_quantity(id, quantity) {
        Ok(tool) => {
            msg_success!(Message::ToolRestocked(tool.name, tool.quantity, tool.available_quantity));
            Ok(())
        }
        Err(e) => report(e),
    }
}

fn handle_set_active(tools: &Tools, id: i64, active: bool) -> Result<()> {
    let Some(tool) = find(tools, id)? else {
        return Ok(());
    };

    tools.set_active(id, active)?;
    if active {
        msg_success!(Message::ToolActivated(tool.name));
    } else {
        msg_success!(Message::ToolDeactivated(tool.name));
    }
    Ok(())
}

fn handle_delete(tools: &Tools, id: i64) -> Result<()> {
    let Some(tool) = find(tools, id)? else {
        return Ok(());
    };

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::ConfirmDeleteTool(tool.name.clone()).to_string())
        .default(false)
        .interact()?;

    if !confirmed {
        msg_info!(Message::OperationCancelled);
        return Ok(());
    }

    match tools.delete(id) {
        Ok(()) => {
            msg_success!(Message::ToolDeleted(tool.name));
            Ok(())
        }
        Err(e) => report(e),
    }
}
