use super::db::{Db, Table};
use super::live::LiveQuery;
use crate::libs::error::{Entity, WorkshopError, WorkshopResult};
use crate::libs::messages::Message;
use crate::libs::tool::{Tool, ToolStatus};
use crate::libs::validation::{is_blank, ValidationResult};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use tracing::debug;

const TOOL_COLUMNS: &str =
    "id, code, name, category, description, location, quantity, available_quantity, status, is_active, created_at, updated_at";
const INSERT_TOOL: &str = "INSERT INTO tools (code, name, category, description, location, quantity, available_quantity, status, is_active, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, datetime(CURRENT_TIMESTAMP, 'localtime'), datetime(CURRENT_TIMESTAMP, 'localtime'))";
const UPDATE_TOOL: &str = "UPDATE tools
    SET code = ?2, name = ?3, category = ?4, description = ?5, location = ?6, quantity = ?7, available_quantity = ?8,
        status = ?9, is_active = ?10, updated_at = datetime(CURRENT_TIMESTAMP, 'localtime')
    WHERE id = ?1";
const UPDATE_QUANTITY: &str = "UPDATE tools
    SET quantity = ?2, available_quantity = ?3, updated_at = datetime(CURRENT_TIMESTAMP, 'localtime')
    WHERE id = ?1";
const UPDATE_ACTIVE: &str = "UPDATE tools SET is_active = ?2, updated_at = datetime(CURRENT_TIMESTAMP, 'localtime') WHERE id = ?1";
const UPDATE_STATUS: &str = "UPDATE tools SET status = ?2, updated_at = datetime(CURRENT_TIMESTAMP, 'localtime') WHERE id = ?1";
const DECREMENT_AVAILABLE: &str = "UPDATE tools SET available_quantity = available_quantity - ?2 WHERE id = ?1";
const INCREMENT_AVAILABLE: &str = "UPDATE tools SET available_quantity = available_quantity + ?2 WHERE id = ?1";
const DELETE_TOOL: &str = "DELETE FROM tools WHERE id = ?1";
const WHERE_ID: &str = "WHERE id = ?1";
const WHERE_CODE: &str = "WHERE code = ?1";
const WHERE_ACTIVE: &str = "WHERE is_active = 1";
const WHERE_AVAILABLE: &str = "WHERE is_active = 1 AND available_quantity > 0";
const WHERE_CATEGORY: &str = "WHERE category = ?1";
const WHERE_STATUS: &str = "WHERE status = ?1";
const WHERE_SEARCH: &str =
    "WHERE name LIKE '%' || ?1 || '%' OR code LIKE '%' || ?1 || '%' OR category LIKE '%' || ?1 || '%'";
const ORDER_BY_NAME: &str = "ORDER BY name";
const SELECT_CATEGORIES: &str = "SELECT DISTINCT category FROM tools WHERE is_active = 1 ORDER BY category";
const COUNT_TOOLS: &str = "SELECT COUNT(*) FROM tools";
const COUNT_ACTIVE_TOOLS: &str = "SELECT COUNT(*) FROM tools WHERE is_active = 1";
const COUNT_AVAILABLE_TOOLS: &str = "SELECT COUNT(*) FROM tools WHERE available_quantity > 0 AND is_active = 1";
const SUM_QUANTITY: &str = "SELECT COALESCE(SUM(quantity), 0) FROM tools WHERE is_active = 1";
const SUM_AVAILABLE: &str = "SELECT COALESCE(SUM(available_quantity), 0) FROM tools WHERE is_active = 1";
const COUNT_CODE_TAKEN: &str = "SELECT COUNT(*) FROM tools WHERE code = ?1 AND id != ?2";
const COUNT_RUNNING_RESERVATIONS: &str = "SELECT COUNT(*) FROM session_tools st
    JOIN workshop_sessions s ON s.id = st.session_id
    WHERE st.tool_id = ?1 AND s.status = 'IN_PROGRESS'";

fn select(filter: &str) -> String {
    format!("SELECT {} FROM tools {} {}", TOOL_COLUMNS, filter, ORDER_BY_NAME)
}

fn map_tool(row: &Row) -> rusqlite::Result<Tool> {
    Ok(Tool {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        location: row.get(5)?,
        quantity: row.get(6)?,
        available_quantity: row.get(7)?,
        status: row.get(8)?,
        is_active: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn query_tools<P: Params>(conn: &Connection, sql: &str, params: P) -> WorkshopResult<Vec<Tool>> {
    let mut stmt = conn.prepare(sql)?;
    let tools = stmt.query_map(params, map_tool)?.collect::<Result<Vec<_>, _>>()?;
    Ok(tools)
}

pub(crate) fn tool_by_id(conn: &Connection, id: i64) -> WorkshopResult<Option<Tool>> {
    let tool = conn.query_row(&select(WHERE_ID), params![id], map_tool).optional()?;
    Ok(tool)
}

/// Takes `quantity` units of a tool off the shelf.
///
/// Fails without writing when the tool is missing, not `Available`, or has
/// fewer units on the shelf than requested. Callers run this inside the
/// transaction that changes the session status.
pub(crate) fn reserve(conn: &Connection, tool_id: i64, quantity: i32) -> WorkshopResult<()> {
    let tool = tool_by_id(conn, tool_id)?.ok_or_else(|| WorkshopError::not_found(Entity::Tool, tool_id))?;

    if tool.status != ToolStatus::Available {
        return Err(WorkshopError::ToolUnavailable {
            tool_id,
            name: tool.name,
            status: tool.status.to_string(),
        });
    }
    if tool.available_quantity < quantity {
        return Err(WorkshopError::InsufficientQuantity {
            tool_id,
            name: tool.name,
            available: tool.available_quantity,
            requested: quantity,
        });
    }

    conn.execute(DECREMENT_AVAILABLE, params![tool_id, quantity])?;
    debug!(tool_id, quantity, "tool units reserved");
    Ok(())
}

/// Puts `quantity` units of a tool back on the shelf.
///
/// A missing tool is skipped: its reservation vanished with it.
pub(crate) fn release(conn: &Connection, tool_id: i64, quantity: i32) -> WorkshopResult<()> {
    if conn.execute(INCREMENT_AVAILABLE, params![tool_id, quantity])? > 0 {
        debug!(tool_id, quantity, "tool units released");
    }
    Ok(())
}

/// Repository for the `tools` table.
#[derive(Clone)]
pub struct Tools {
    db: Db,
}

impl Tools {
    pub fn new(db: &Db) -> Self {
        Tools { db: db.clone() }
    }

    pub fn insert(&self, tool: &Tool) -> WorkshopResult<i64> {
        let id = {
            let conn = self.db.conn();
            conn.execute(
                INSERT_TOOL,
                params![
                    tool.code,
                    tool.name,
                    tool.category,
                    tool.description,
                    tool.location,
                    tool.quantity,
                    tool.available_quantity,
                    tool.status,
                    tool.is_active
                ],
            )?;
            conn.last_insert_rowid()
        };
        debug!(tool_id = id, quantity = tool.quantity, "tool created");
        self.db.notify(&[Table::Tools]);
        Ok(id)
    }

    /// Saves a tool's descriptive fields and total quantity.
    ///
    /// `available_quantity` is not taken from `tool`: it moves by the same
    /// delta as `quantity`, so reserved units stay reserved.
    pub fn update(&self, tool: &Tool) -> WorkshopResult<()> {
        let id = tool.id.ok_or(WorkshopError::Unsaved(Entity::Tool))?;
        {
            let mut conn = self.db.conn();
            let tx = conn.transaction()?;
            let current = tool_by_id(&tx, id)?.ok_or_else(|| WorkshopError::not_found(Entity::Tool, id))?;
            let available = shifted_availability(&current, tool.quantity)?;

            tx.execute(
                UPDATE_TOOL,
                params![
                    id,
                    tool.code,
                    tool.name,
                    tool.category,
                    tool.description,
                    tool.location,
                    tool.quantity,
                    available,
                    tool.status,
                    tool.is_active
                ],
            )?;
            tx.commit()?;
        }
        self.db.notify(&[Table::Tools]);
        Ok(())
    }

    /// Changes the total number of units, e.g. after buying or writing off some.
    pub fn set_quantity(&self, id: i64, quantity: i32) -> WorkshopResult<Tool> {
        let updated = {
            let mut conn = self.db.conn();
            let tx = conn.transaction()?;
            let mut tool = tool_by_id(&tx, id)?.ok_or_else(|| WorkshopError::not_found(Entity::Tool, id))?;
            let available = shifted_availability(&tool, quantity)?;

            tx.execute(UPDATE_QUANTITY, params![id, quantity, available])?;
            tx.commit()?;

            tool.quantity = quantity;
            tool.available_quantity = available;
            tool
        };
        debug!(tool_id = id, quantity, available = updated.available_quantity, "tool restocked");
        self.db.notify(&[Table::Tools]);
        Ok(updated)
    }

    /// Deletes a tool. Refused while a session in progress holds some of its units.
    pub fn delete(&self, id: i64) -> WorkshopResult<()> {
        {
            let conn = self.db.conn();
            let tool = tool_by_id(&conn, id)?.ok_or_else(|| WorkshopError::not_found(Entity::Tool, id))?;
            let running: i64 = conn.query_row(COUNT_RUNNING_RESERVATIONS, params![id], |row| row.get(0))?;
            if running > 0 {
                return Err(WorkshopError::ToolReserved { tool_id: id, name: tool.name });
            }
            conn.execute(DELETE_TOOL, params![id])?;
        }
        debug!(tool_id = id, "tool deleted");
        self.db.notify(&[Table::Tools, Table::SessionTools, Table::ToolUsage]);
        Ok(())
    }

    pub fn set_active(&self, id: i64, active: bool) -> WorkshopResult<()> {
        if self.db.conn().execute(UPDATE_ACTIVE, params![id, active])? == 0 {
            return Err(WorkshopError::not_found(Entity::Tool, id));
        }
        self.db.notify(&[Table::Tools]);
        Ok(())
    }

    /// Sets the inventory status label.
    pub fn set_status(&self, id: i64, status: ToolStatus) -> WorkshopResult<()> {
        if self.db.conn().execute(UPDATE_STATUS, params![id, status])? == 0 {
            return Err(WorkshopError::not_found(Entity::Tool, id));
        }
        debug!(tool_id = id, status = %status, "tool status changed");
        self.db.notify(&[Table::Tools]);
        Ok(())
    }

    pub fn get(&self, id: i64) -> WorkshopResult<Option<Tool>> {
        tool_by_id(&self.db.conn(), id)
    }

    pub fn get_by_code(&self, code: &str) -> WorkshopResult<Option<Tool>> {
        let tool = self
            .db
            .conn()
            .query_row(&select(WHERE_CODE), params![code], map_tool)
            .optional()?;
        Ok(tool)
    }

    pub fn fetch_all(&self) -> WorkshopResult<Vec<Tool>> {
        query_tools(&self.db.conn(), &select(""), [])
    }

    pub fn fetch_active(&self) -> WorkshopResult<Vec<Tool>> {
        query_tools(&self.db.conn(), &select(WHERE_ACTIVE), [])
    }

    /// Active tools with at least one unit on the shelf.
    pub fn fetch_available(&self) -> WorkshopResult<Vec<Tool>> {
        query_tools(&self.db.conn(), &select(WHERE_AVAILABLE), [])
    }

    /// Tools whose name, code or category contains `query`.
    pub fn search(&self, query: &str) -> WorkshopResult<Vec<Tool>> {
        query_tools(&self.db.conn(), &select(WHERE_SEARCH), params![query])
    }

    pub fn by_category(&self, category: &str) -> WorkshopResult<Vec<Tool>> {
        query_tools(&self.db.conn(), &select(WHERE_CATEGORY), params![category])
    }

    pub fn by_status(&self, status: ToolStatus) -> WorkshopResult<Vec<Tool>> {
        query_tools(&self.db.conn(), &select(WHERE_STATUS), params![status])
    }

    pub fn categories(&self) -> WorkshopResult<Vec<String>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(SELECT_CATEGORIES)?;
        let categories = stmt.query_map([], |row| row.get(0))?.collect::<Result<Vec<String>, _>>()?;
        Ok(categories)
    }

    pub fn count(&self) -> WorkshopResult<i64> {
        Ok(self.db.conn().query_row(COUNT_TOOLS, [], |row| row.get(0))?)
    }

    pub fn count_active(&self) -> WorkshopResult<i64> {
        Ok(self.db.conn().query_row(COUNT_ACTIVE_TOOLS, [], |row| row.get(0))?)
    }

    pub fn count_available(&self) -> WorkshopResult<i64> {
        Ok(self.db.conn().query_row(COUNT_AVAILABLE_TOOLS, [], |row| row.get(0))?)
    }

    /// Units owned across active tools.
    pub fn total_quantity(&self) -> WorkshopResult<i64> {
        Ok(self.db.conn().query_row(SUM_QUANTITY, [], |row| row.get(0))?)
    }

    /// Units on the shelf across active tools.
    pub fn total_available_quantity(&self) -> WorkshopResult<i64> {
        Ok(self.db.conn().query_row(SUM_AVAILABLE, [], |row| row.get(0))?)
    }

    pub fn is_code_unique(&self, code: &str, exclude_id: i64) -> WorkshopResult<bool> {
        let taken: i64 = self
            .db
            .conn()
            .query_row(COUNT_CODE_TAKEN, params![code, exclude_id], |row| row.get(0))?;
        Ok(taken == 0)
    }

    /// Whether `quantity` units of the tool could be lent right now.
    pub fn can_be_borrowed(&self, id: i64, quantity: i32) -> WorkshopResult<bool> {
        Ok(self.get(id)?.is_some_and(|tool| tool.can_lend(quantity)))
    }

    pub fn validate(&self, tool: &Tool) -> WorkshopResult<ValidationResult> {
        let mut result = ValidationResult::new();

        result.check(!is_blank(&tool.name), Message::ToolNameEmpty);

        if is_blank(&tool.code) {
            result.push(Message::ToolCodeEmpty);
        } else if !self.is_code_unique(&tool.code, tool.id.unwrap_or(0))? {
            result.push(Message::ToolCodeDuplicate(tool.code.clone()));
        }

        result.check(!is_blank(&tool.category), Message::ToolCategoryEmpty);
        result.check(tool.quantity >= 1, Message::ToolQuantityTooLow);

        Ok(result)
    }

    pub fn subscribe_all(&self) -> LiveQuery<Vec<Tool>> {
        let sql = select("");
        LiveQuery::new(&self.db, &[Table::Tools], move |conn| query_tools(conn, &sql, []))
    }

    pub fn subscribe_active(&self) -> LiveQuery<Vec<Tool>> {
        let sql = select(WHERE_ACTIVE);
        LiveQuery::new(&self.db, &[Table::Tools], move |conn| query_tools(conn, &sql, []))
    }

    pub fn subscribe_available(&self) -> LiveQuery<Vec<Tool>> {
        let sql = select(WHERE_AVAILABLE);
        LiveQuery::new(&self.db, &[Table::Tools], move |conn| query_tools(conn, &sql, []))
    }

    pub fn subscribe_search(&self, query: &str) -> LiveQuery<Vec<Tool>> {
        let sql = select(WHERE_SEARCH);
        let query = query.to_string();
        LiveQuery::new(&self.db, &[Table::Tools], move |conn| query_tools(conn, &sql, params![query]))
    }

    pub fn subscribe_by_category(&self, category: &str) -> LiveQuery<Vec<Tool>> {
        let sql = select(WHERE_CATEGORY);
        let category = category.to_string();
        LiveQuery::new(&self.db, &[Table::Tools], move |conn| query_tools(conn, &sql, params![category]))
    }

    pub fn subscribe_by_status(&self, status: ToolStatus) -> LiveQuery<Vec<Tool>> {
        let sql = select(WHERE_STATUS);
        LiveQuery::new(&self.db, &[Table::Tools], move |conn| query_tools(conn, &sql, params![status]))
    }
}

/// New shelf count when the total becomes `quantity`.
fn shifted_availability(current: &Tool, quantity: i32) -> WorkshopResult<i32> {
    let available = current.available_quantity + (quantity - current.quantity);
    if available < 0 {
        return Err(WorkshopError::NegativeAvailability {
            tool_id: current.id.unwrap_or(0),
            name: current.name.clone(),
            reserved: current.reserved(),
        });
    }
    Ok(available)
}
