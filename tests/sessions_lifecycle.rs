#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use test_context::{test_context, TestContext};
    use workshop::db::db::Db;
    use workshop::db::sessions::Sessions;
    use workshop::db::students::Students;
    use workshop::db::tools::Tools;
    use workshop::libs::error::{Entity, WorkshopError};
    use workshop::libs::session::{SessionStatus, SessionTool, Transition, WorkshopSession};
    use workshop::libs::student::Student;
    use workshop::libs::tool::{Tool, ToolStatus};

    struct LifecycleTestContext {
        db: Db,
        student: i64,
        drill: i64,
        saw: i64,
    }

    impl TestContext for LifecycleTestContext {
        fn setup() -> Self {
            let db = Db::in_memory().unwrap();
            let student = Students::new(&db).insert(&Student::new("2024-001", "Andi Pratama", "X TKR 1")).unwrap();
            let tools = Tools::new(&db);
            let drill = tools.insert(&Tool::new("DRL-01", "Cordless drill", "Power tools", 3)).unwrap();
            let saw = tools.insert(&Tool::new("SAW-01", "Hand saw", "Hand tools", 1)).unwrap();
            LifecycleTestContext { db, student, drill, saw }
        }
    }

    impl LifecycleTestContext {
        fn schedule(&self, tools: Vec<SessionTool>) -> i64 {
            let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
            Sessions::new(&self.db)
                .insert(&WorkshopSession::new(self.student, date, "08:00", "Bird house", "Pak Budi").with_tools(tools))
                .unwrap()
        }

        fn available(&self, tool_id: i64) -> i32 {
            Tools::new(&self.db).get(tool_id).unwrap().unwrap().available_quantity
        }
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_start_and_end_move_stock(ctx: &mut LifecycleTestContext) {
        let sessions = Sessions::new(&ctx.db);
        let id = ctx.schedule(vec![SessionTool::new(ctx.drill, 2)]);
        assert_eq!(sessions.get(id).unwrap().unwrap().status, SessionStatus::Scheduled);
        assert_eq!(ctx.available(ctx.drill), 3);

        let started = sessions.start(id).unwrap();
        assert_eq!(started.status, SessionStatus::InProgress);
        assert_eq!(ctx.available(ctx.drill), 1);

        // Only one drill left on the shelf
        let second = ctx.schedule(vec![SessionTool::new(ctx.drill, 2)]);
        let err = sessions.start(second).unwrap_err();
        assert!(matches!(
            err,
            WorkshopError::InsufficientQuantity {
                available: 1,
                requested: 2,
                ..
            }
        ));
        assert_eq!(sessions.get(second).unwrap().unwrap().status, SessionStatus::Scheduled);

        let ended = sessions.end(id, "10:15").unwrap();
        assert_eq!(ended.status, SessionStatus::Completed);
        assert_eq!(ended.end_time.as_deref(), Some("10:15"));
        assert_eq!(sessions.get(id).unwrap().unwrap().end_time.as_deref(), Some("10:15"));
        assert_eq!(ctx.available(ctx.drill), 3);

        sessions.start(second).unwrap();
        assert_eq!(ctx.available(ctx.drill), 1);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_exhausted_tool_blocks_second_session(ctx: &mut LifecycleTestContext) {
        let sessions = Sessions::new(&ctx.db);
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let first = ctx.schedule(vec![SessionTool::new(ctx.drill, 3)]);
        sessions.start(first).unwrap();
        assert_eq!(ctx.available(ctx.drill), 0);

        let second = ctx.schedule(vec![SessionTool::single(ctx.drill)]);
        let form = sessions.get(second).unwrap().unwrap();
        let result = sessions.validate(&form, today).unwrap();
        assert_eq!(result.messages(), vec!["Tool 'Cordless drill' is not available"]);
        assert!(matches!(sessions.start(second), Err(WorkshopError::InsufficientQuantity { .. })));

        let ended = sessions.end(first, "14:30").unwrap();
        assert_eq!(ended.end_time.as_deref(), Some("14:30"));
        assert_eq!(ctx.available(ctx.drill), 3);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_failed_start_reserves_nothing(ctx: &mut LifecycleTestContext) {
        let sessions = Sessions::new(&ctx.db);
        let id = ctx.schedule(vec![SessionTool::new(ctx.drill, 2), SessionTool::new(ctx.saw, 2)]);

        let err = sessions.start(id).unwrap_err();
        assert!(matches!(err, WorkshopError::InsufficientQuantity { tool_id, .. } if tool_id == ctx.saw));
        assert_eq!(ctx.available(ctx.drill), 3);
        assert_eq!(ctx.available(ctx.saw), 1);
        assert_eq!(sessions.get(id).unwrap().unwrap().status, SessionStatus::Scheduled);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_start_needs_available_status(ctx: &mut LifecycleTestContext) {
        let sessions = Sessions::new(&ctx.db);
        Tools::new(&ctx.db).set_status(ctx.saw, ToolStatus::Maintenance).unwrap();
        let id = ctx.schedule(vec![SessionTool::single(ctx.drill), SessionTool::single(ctx.saw)]);

        assert!(matches!(sessions.start(id), Err(WorkshopError::ToolUnavailable { .. })));
        assert_eq!(ctx.available(ctx.drill), 3);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_cancel(ctx: &mut LifecycleTestContext) {
        let sessions = Sessions::new(&ctx.db);

        let scheduled = ctx.schedule(vec![SessionTool::new(ctx.drill, 1)]);
        assert_eq!(sessions.cancel(scheduled).unwrap().status, SessionStatus::Cancelled);
        assert_eq!(ctx.available(ctx.drill), 3);

        let running = ctx.schedule(vec![SessionTool::new(ctx.drill, 3)]);
        sessions.start(running).unwrap();
        assert_eq!(ctx.available(ctx.drill), 0);
        assert_eq!(sessions.cancel(running).unwrap().status, SessionStatus::Cancelled);
        assert_eq!(ctx.available(ctx.drill), 3);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_invalid_transitions(ctx: &mut LifecycleTestContext) {
        let sessions = Sessions::new(&ctx.db);
        let id = ctx.schedule(vec![SessionTool::new(ctx.drill, 1)]);

        assert!(matches!(
            sessions.end(id, "10:00"),
            Err(WorkshopError::InvalidTransition {
                action: Transition::End,
                status: SessionStatus::Scheduled,
                ..
            })
        ));

        sessions.start(id).unwrap();
        assert!(matches!(sessions.start(id), Err(WorkshopError::InvalidTransition { .. })));
        assert!(matches!(sessions.mark_no_show(id), Err(WorkshopError::InvalidTransition { .. })));
        assert_eq!(ctx.available(ctx.drill), 2);

        sessions.end(id, "10:00").unwrap();
        assert!(matches!(sessions.cancel(id), Err(WorkshopError::InvalidTransition { .. })));
        assert!(matches!(sessions.end(id, "11:00"), Err(WorkshopError::InvalidTransition { .. })));
        assert_eq!(ctx.available(ctx.drill), 3);

        let no_show = ctx.schedule(vec![]);
        assert_eq!(sessions.mark_no_show(no_show).unwrap().status, SessionStatus::NoShow);
        assert!(matches!(sessions.start(no_show), Err(WorkshopError::InvalidTransition { .. })));

        assert!(matches!(sessions.start(999), Err(WorkshopError::NotFound { .. })));
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_end_rejects_bad_time(ctx: &mut LifecycleTestContext) {
        let sessions = Sessions::new(&ctx.db);
        let id = ctx.schedule(vec![SessionTool::new(ctx.drill, 1)]);
        sessions.start(id).unwrap();

        assert!(matches!(sessions.end(id, "25:00"), Err(WorkshopError::Validation(_))));
        assert_eq!(sessions.get(id).unwrap().unwrap().status, SessionStatus::InProgress);
        assert_eq!(ctx.available(ctx.drill), 2);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_delete_running_session_releases_tools(ctx: &mut LifecycleTestContext) {
        let sessions = Sessions::new(&ctx.db);
        let id = ctx.schedule(vec![SessionTool::new(ctx.drill, 2), SessionTool::single(ctx.saw)]);
        sessions.start(id).unwrap();
        assert_eq!(ctx.available(ctx.saw), 0);

        sessions.delete(id).unwrap();
        assert!(sessions.get(id).unwrap().is_none());
        assert_eq!(ctx.available(ctx.drill), 3);
        assert_eq!(ctx.available(ctx.saw), 1);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_insert_in_progress_rejected(ctx: &mut LifecycleTestContext) {
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let mut session = WorkshopSession::new(ctx.student, date, "08:00", "Bird house", "Pak Budi");
        session.status = SessionStatus::InProgress;

        assert!(matches!(Sessions::new(&ctx.db).insert(&session), Err(WorkshopError::UnreservedInProgress)));
        assert_eq!(Sessions::new(&ctx.db).count().unwrap(), 0);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_update_unsaved_session(ctx: &mut LifecycleTestContext) {
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let session = WorkshopSession::new(ctx.student, date, "08:00", "Bird house", "Pak Budi");

        let result = Sessions::new(&ctx.db).update(&session);
        assert!(matches!(result, Err(WorkshopError::Unsaved(Entity::Session))));
        assert_eq!(Sessions::new(&ctx.db).count().unwrap(), 0);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_tools_locked_after_start(ctx: &mut LifecycleTestContext) {
        let sessions = Sessions::new(&ctx.db);
        let id = ctx.schedule(vec![SessionTool::new(ctx.drill, 1)]);

        sessions.set_tools(id, &[SessionTool::new(ctx.saw, 1), SessionTool::new(ctx.drill, 2)]).unwrap();
        assert_eq!(
            sessions.tools_of(id).unwrap(),
            vec![SessionTool::new(ctx.saw, 1), SessionTool::new(ctx.drill, 2)]
        );

        sessions.start(id).unwrap();
        assert!(matches!(sessions.set_tools(id, &[]), Err(WorkshopError::ToolsLocked(_))));

        let mut session = sessions.get(id).unwrap().unwrap();
        session.notes = Some("Sanded twice".to_string());
        sessions.update(&session).unwrap();

        session.tools.clear();
        assert!(matches!(sessions.update(&session), Err(WorkshopError::ToolsLocked(_))));

        // Status cannot be forced through update
        let mut stored = sessions.get(id).unwrap().unwrap();
        assert_eq!(stored.notes.as_deref(), Some("Sanded twice"));
        stored.status = SessionStatus::Completed;
        sessions.update(&stored).unwrap();
        assert_eq!(sessions.get(id).unwrap().unwrap().status, SessionStatus::InProgress);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_queries(ctx: &mut LifecycleTestContext) {
        let sessions = Sessions::new(&ctx.db);
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2026, 10, d).unwrap();

        let mut early = WorkshopSession::new(ctx.student, day(21), "13:00", "Tool box", "Pak Budi");
        early.notes = Some("bring gloves".to_string());
        let late_id = ctx.schedule(vec![]);
        let early_id = sessions.insert(&early).unwrap();
        let past_id = sessions
            .insert(&WorkshopSession::new(ctx.student, day(10), "09:00", "Stool", "Bu Sari"))
            .unwrap();
        sessions.start(past_id).unwrap();
        sessions.end(past_id, "11:00").unwrap();

        let ids = |list: Vec<WorkshopSession>| list.into_iter().filter_map(|s| s.id).collect::<Vec<_>>();

        assert_eq!(ids(sessions.fetch_all().unwrap()), vec![early_id, late_id, past_id]);
        assert_eq!(ids(sessions.upcoming(today).unwrap()), vec![late_id, early_id]);
        assert_eq!(ids(sessions.by_date(day(20)).unwrap()), vec![late_id]);
        assert_eq!(ids(sessions.by_date_range(day(10), day(20)).unwrap()), vec![late_id, past_id]);
        assert_eq!(ids(sessions.by_status(SessionStatus::Completed).unwrap()), vec![past_id]);
        assert_eq!(ids(sessions.recent_completed(5).unwrap()), vec![past_id]);
        assert_eq!(ids(sessions.search("tool box").unwrap()), vec![early_id]);
        assert!(sessions.active().unwrap().is_empty());

        assert_eq!(sessions.count().unwrap(), 3);
        assert_eq!(sessions.count_by_student(ctx.student).unwrap(), 3);
        assert_eq!(sessions.count_by_status(SessionStatus::Scheduled).unwrap(), 2);
        assert_eq!(sessions.count_by_date(day(21)).unwrap(), 1);
    }
}
