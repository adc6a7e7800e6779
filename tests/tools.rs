#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use test_context::{test_context, TestContext};
    use workshop::db::db::Db;
    use workshop::db::sessions::Sessions;
    use workshop::db::students::Students;
    use workshop::db::tools::Tools;
    use workshop::libs::error::{Entity, WorkshopError};
    use workshop::libs::messages::Message;
    use workshop::libs::session::{SessionTool, WorkshopSession};
    use workshop::libs::student::Student;
    use workshop::libs::tool::{Tool, ToolStatus};

    struct ToolTestContext {
        db: Db,
    }

    impl TestContext for ToolTestContext {
        fn setup() -> Self {
            ToolTestContext {
                db: Db::in_memory().unwrap(),
            }
        }
    }

    fn running_session_with(db: &Db, tool_id: i64, quantity: i32) -> i64 {
        let student = Students::new(db).insert(&Student::new("2024-001", "Andi", "X TKR 1")).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let sessions = Sessions::new(db);
        let id = sessions
            .insert(&WorkshopSession::new(student, date, "08:00", "Shelf", "Pak Budi").with_tools(vec![SessionTool::new(tool_id, quantity)]))
            .unwrap();
        sessions.start(id).unwrap();
        id
    }

    #[test_context(ToolTestContext)]
    #[test]
    fn test_tool_crud(ctx: &mut ToolTestContext) {
        let tools = Tools::new(&ctx.db);

        let id = tools.insert(&Tool::new("HMR-01", "Claw hammer", "Hand tools", 4)).unwrap();
        let mut tool = tools.get(id).unwrap().unwrap();
        assert_eq!(tool.quantity, 4);
        assert_eq!(tool.available_quantity, 4);
        assert_eq!(tool.status, ToolStatus::Available);
        assert!(tool.is_active);

        tool.location = Some("Rack A".to_string());
        tools.update(&tool).unwrap();
        assert_eq!(tools.get_by_code("HMR-01").unwrap().unwrap().location.as_deref(), Some("Rack A"));

        tools.set_status(id, ToolStatus::Maintenance).unwrap();
        assert_eq!(tools.get(id).unwrap().unwrap().status, ToolStatus::Maintenance);
        assert!(!tools.can_be_borrowed(id, 1).unwrap());

        tools.delete(id).unwrap();
        assert!(tools.get(id).unwrap().is_none());
        assert!(matches!(tools.delete(id), Err(WorkshopError::NotFound { .. })));
    }

    #[test_context(ToolTestContext)]
    #[test]
    fn test_queries_and_totals(ctx: &mut ToolTestContext) {
        let tools = Tools::new(&ctx.db);
        tools.insert(&Tool::new("SAW-01", "Hand saw", "Hand tools", 2)).unwrap();
        tools.insert(&Tool::new("DRL-01", "Cordless drill", "Power tools", 3)).unwrap();
        let old = tools.insert(&Tool::new("DRL-02", "Old drill", "Power tools", 1)).unwrap();
        tools.set_active(old, false).unwrap();

        assert_eq!(tools.count().unwrap(), 3);
        assert_eq!(tools.count_active().unwrap(), 2);
        assert_eq!(tools.fetch_active().unwrap().len(), 2);
        assert_eq!(tools.fetch_available().unwrap().len(), 2);
        assert_eq!(tools.count_available().unwrap(), 2);
        assert_eq!(tools.total_quantity().unwrap(), 5);
        assert_eq!(tools.total_available_quantity().unwrap(), 5);

        assert_eq!(tools.search("drill").unwrap().len(), 2);
        assert_eq!(tools.search("SAW").unwrap().len(), 1);
        assert_eq!(tools.by_category("Power tools").unwrap().len(), 3);
        assert_eq!(tools.by_status(ToolStatus::Available).unwrap().len(), 3);
        assert_eq!(tools.categories().unwrap(), vec!["Hand tools", "Power tools"]);
    }

    #[test_context(ToolTestContext)]
    #[test]
    fn test_deactivated_tool_stays_in_category(ctx: &mut ToolTestContext) {
        let tools = Tools::new(&ctx.db);
        let drill = tools.insert(&Tool::new("DRL-01", "Cordless drill", "Power tools", 3)).unwrap();
        let category = tools.subscribe_by_category("Power tools");

        tools.set_active(drill, false).unwrap();

        let listed = tools.by_category("Power tools").unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].is_active);
        assert_eq!(category.current().unwrap().len(), 1);
        assert!(tools.fetch_available().unwrap().is_empty());
    }

    #[test_context(ToolTestContext)]
    #[test]
    fn test_update_unsaved_tool(ctx: &mut ToolTestContext) {
        let tools = Tools::new(&ctx.db);
        tools.insert(&Tool::new("SAW-01", "Hand saw", "Hand tools", 2)).unwrap();

        let result = tools.update(&Tool::new("SAW-01", "Hand saw", "Hand tools", 5));
        assert!(matches!(result, Err(WorkshopError::Unsaved(Entity::Tool))));
        assert_eq!(tools.total_quantity().unwrap(), 2);
    }

    #[test_context(ToolTestContext)]
    #[test]
    fn test_validation(ctx: &mut ToolTestContext) {
        let tools = Tools::new(&ctx.db);
        tools.insert(&Tool::new("SAW-01", "Hand saw", "Hand tools", 2)).unwrap();

        let result = tools.validate(&Tool::new("SAW-01", "", "", 0)).unwrap();
        assert_eq!(
            result.errors,
            vec![
                Message::ToolNameEmpty,
                Message::ToolCodeDuplicate("SAW-01".to_string()),
                Message::ToolCategoryEmpty,
                Message::ToolQuantityTooLow,
            ]
        );

        let result = tools.validate(&Tool::new(" ", "Saw", "Hand tools", 1)).unwrap();
        assert_eq!(result.errors, vec![Message::ToolCodeEmpty]);

        assert!(tools.validate(&Tool::new("SAW-02", "Saw", "Hand tools", 1)).unwrap().is_valid());
    }

    #[test_context(ToolTestContext)]
    #[test]
    fn test_quantity_change_keeps_reservations(ctx: &mut ToolTestContext) {
        let tools = Tools::new(&ctx.db);
        let id = tools.insert(&Tool::new("CLP-01", "Bar clamp", "Clamps", 5)).unwrap();
        running_session_with(&ctx.db, id, 3);

        let tool = tools.set_quantity(id, 6).unwrap();
        assert_eq!(tool.quantity, 6);
        assert_eq!(tool.available_quantity, 3);

        let tool = tools.set_quantity(id, 3).unwrap();
        assert_eq!(tool.available_quantity, 0);

        let err = tools.set_quantity(id, 2).unwrap_err();
        assert!(matches!(err, WorkshopError::NegativeAvailability { reserved: 3, .. }));
        assert_eq!(tools.get(id).unwrap().unwrap().quantity, 3);

        // A whole-record update moves availability by the same delta
        let mut tool = tools.get(id).unwrap().unwrap();
        tool.quantity = 4;
        tool.available_quantity = 99;
        tools.update(&tool).unwrap();
        assert_eq!(tools.get(id).unwrap().unwrap().available_quantity, 1);
    }

    #[test_context(ToolTestContext)]
    #[test]
    fn test_delete_refused_while_reserved(ctx: &mut ToolTestContext) {
        let tools = Tools::new(&ctx.db);
        let id = tools.insert(&Tool::new("CLP-01", "Bar clamp", "Clamps", 2)).unwrap();
        let session = running_session_with(&ctx.db, id, 1);

        assert!(matches!(tools.delete(id), Err(WorkshopError::ToolReserved { .. })));

        Sessions::new(&ctx.db).end(session, "11:30").unwrap();
        tools.delete(id).unwrap();
        assert!(Sessions::new(&ctx.db).tools_of(session).unwrap().is_empty());
    }

    #[test_context(ToolTestContext)]
    #[test]
    fn test_can_be_borrowed(ctx: &mut ToolTestContext) {
        let tools = Tools::new(&ctx.db);
        let id = tools.insert(&Tool::new("CLP-01", "Bar clamp", "Clamps", 2)).unwrap();

        assert!(tools.can_be_borrowed(id, 2).unwrap());
        assert!(!tools.can_be_borrowed(id, 3).unwrap());
        assert!(!tools.can_be_borrowed(999, 1).unwrap());
    }
}
