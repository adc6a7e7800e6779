#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use test_context::{test_context, TestContext};
    use workshop::db::db::Db;
    use workshop::db::sessions::Sessions;
    use workshop::db::students::Students;
    use workshop::db::tools::Tools;
    use workshop::libs::messages::Message;
    use workshop::libs::session::{SessionStatus, SessionTool, WorkshopSession};
    use workshop::libs::student::Student;
    use workshop::libs::tool::{Tool, ToolStatus};

    struct SessionValidationContext {
        db: Db,
        student: i64,
        drill: i64,
        today: NaiveDate,
    }

    impl TestContext for SessionValidationContext {
        fn setup() -> Self {
            let db = Db::in_memory().unwrap();
            let student = Students::new(&db).insert(&Student::new("2024-001", "Andi", "X TKR 1")).unwrap();
            let drill = Tools::new(&db).insert(&Tool::new("DRL-01", "Cordless drill", "Power tools", 2)).unwrap();
            SessionValidationContext {
                db,
                student,
                drill,
                today: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
            }
        }
    }

    impl SessionValidationContext {
        fn session(&self, date: NaiveDate, start: &str) -> WorkshopSession {
            WorkshopSession::new(self.student, date, start, "Bird house", "Pak Budi")
        }
    }

    #[test_context(SessionValidationContext)]
    #[test]
    fn test_valid_session(ctx: &mut SessionValidationContext) {
        let session = ctx.session(ctx.today, "07:30").with_tools(vec![SessionTool::new(ctx.drill, 2)]);
        assert!(Sessions::new(&ctx.db).validate(&session, ctx.today).unwrap().is_valid());
    }

    #[test_context(SessionValidationContext)]
    #[test]
    fn test_empty_fields(ctx: &mut SessionValidationContext) {
        let session = WorkshopSession::new(0, ctx.today, "", " ", "");
        let result = Sessions::new(&ctx.db).validate(&session, ctx.today).unwrap();

        assert_eq!(
            result.errors,
            vec![
                Message::SessionStudentMissing,
                Message::SessionProjectEmpty,
                Message::SessionStartTimeEmpty,
                Message::SessionInstructorEmpty,
                Message::StartTimeInvalid(String::new()),
            ]
        );
    }

    #[test_context(SessionValidationContext)]
    #[test]
    fn test_times(ctx: &mut SessionValidationContext) {
        let sessions = Sessions::new(&ctx.db);

        let result = sessions.validate(&ctx.session(ctx.today, "7.30"), ctx.today).unwrap();
        assert_eq!(result.errors, vec![Message::StartTimeInvalid("7.30".to_string())]);

        let mut session = ctx.session(ctx.today, "08:00");
        session.end_time = Some("24:00".to_string());
        let result = sessions.validate(&session, ctx.today).unwrap();
        assert_eq!(result.errors, vec![Message::EndTimeInvalid("24:00".to_string())]);

        session.end_time = Some(String::new());
        assert!(sessions.validate(&session, ctx.today).unwrap().is_valid());
    }

    #[test_context(SessionValidationContext)]
    #[test]
    fn test_date_in_past(ctx: &mut SessionValidationContext) {
        let sessions = Sessions::new(&ctx.db);
        let yesterday = ctx.today.pred_opt().unwrap();

        let result = sessions.validate(&ctx.session(yesterday, "08:00"), ctx.today).unwrap();
        assert_eq!(result.errors, vec![Message::SessionDateInPast("2026-10-16".to_string())]);
        assert_eq!(result.messages(), vec!["Session date 2026-10-16 is in the past"]);

        // Only scheduling is checked against the calendar
        let mut finished = ctx.session(yesterday, "08:00");
        finished.status = SessionStatus::Completed;
        assert!(sessions.validate(&finished, ctx.today).unwrap().is_valid());
    }

    #[test_context(SessionValidationContext)]
    #[test]
    fn test_tool_list(ctx: &mut SessionValidationContext) {
        let sessions = Sessions::new(&ctx.db);

        let session = ctx.session(ctx.today, "08:00").with_tools(vec![
            SessionTool::new(ctx.drill, 1),
            SessionTool::new(ctx.drill, 1),
            SessionTool::new(77, 1),
            SessionTool::new(78, 0),
        ]);
        let result = sessions.validate(&session, ctx.today).unwrap();
        assert_eq!(
            result.errors,
            vec![
                Message::SessionToolDuplicate(ctx.drill),
                Message::SessionToolNotFound(77),
                Message::SessionToolQuantityTooLow(78),
            ]
        );

        let greedy = ctx.session(ctx.today, "08:00").with_tools(vec![SessionTool::new(ctx.drill, 3)]);
        let result = sessions.validate(&greedy, ctx.today).unwrap();
        assert_eq!(result.errors, vec![Message::SessionToolUnavailable("Cordless drill".to_string())]);

        Tools::new(&ctx.db).set_status(ctx.drill, ToolStatus::Broken).unwrap();
        let result = sessions
            .validate(&ctx.session(ctx.today, "08:00").with_tools(vec![SessionTool::single(ctx.drill)]), ctx.today)
            .unwrap();
        assert!(result.contains(&Message::SessionToolUnavailable("Cordless drill".to_string())));
    }
}
