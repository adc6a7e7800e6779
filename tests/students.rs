#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use test_context::{test_context, TestContext};
    use workshop::db::db::Db;
    use workshop::db::sessions::Sessions;
    use workshop::db::students::Students;
    use workshop::libs::error::{Entity, WorkshopError};
    use workshop::libs::messages::Message;
    use workshop::libs::session::WorkshopSession;
    use workshop::libs::student::Student;

    struct StudentTestContext {
        db: Db,
    }

    impl TestContext for StudentTestContext {
        fn setup() -> Self {
            StudentTestContext {
                db: Db::in_memory().unwrap(),
            }
        }
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_student_crud(ctx: &mut StudentTestContext) {
        let students = Students::new(&ctx.db);

        let id = students
            .insert(&Student::new("2024-001", "Andi Pratama", "X TKR 1").with_email("andi@smk1.sch.id"))
            .unwrap();
        assert!(id > 0);

        let mut student = students.get(id).unwrap().unwrap();
        assert_eq!(student.full_name, "Andi Pratama");
        assert_eq!(student.email.as_deref(), Some("andi@smk1.sch.id"));
        assert!(student.is_active);
        assert!(student.created_at.is_some());

        student.class_name = "XI TKR 1".to_string();
        students.update(&student).unwrap();
        assert_eq!(students.get_by_student_id("2024-001").unwrap().unwrap().class_name, "XI TKR 1");

        students.delete(id).unwrap();
        assert!(students.get(id).unwrap().is_none());
        assert!(matches!(students.delete(id), Err(WorkshopError::NotFound { .. })));
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_queries(ctx: &mut StudentTestContext) {
        let students = Students::new(&ctx.db);
        students.insert(&Student::new("2024-001", "Citra Dewi", "X TKR 1")).unwrap();
        students.insert(&Student::new("2024-002", "Budi Santoso", "X TKR 1")).unwrap();
        let gone = students.insert(&Student::new("2023-050", "Agus Salim", "XI TKR 2")).unwrap();
        students.set_active(gone, false).unwrap();

        let all: Vec<String> = students.fetch_all().unwrap().into_iter().map(|s| s.full_name).collect();
        assert_eq!(all, vec!["Agus Salim", "Budi Santoso", "Citra Dewi"]);
        assert_eq!(students.fetch_active().unwrap().len(), 2);
        assert_eq!(students.count().unwrap(), 3);
        assert_eq!(students.count_active().unwrap(), 2);

        assert_eq!(students.search("budi").unwrap().len(), 1);
        assert_eq!(students.search("2024").unwrap().len(), 2);
        assert_eq!(students.by_class("X TKR 1").unwrap().len(), 2);
        assert_eq!(students.by_class("XI TKR 2").unwrap().len(), 1);
        assert_eq!(students.classes().unwrap(), vec!["X TKR 1"]);
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_deactivated_student_stays_in_class(ctx: &mut StudentTestContext) {
        let students = Students::new(&ctx.db);
        students.insert(&Student::new("2024-001", "Citra Dewi", "X TKR 1")).unwrap();
        let leaving = students.insert(&Student::new("2024-002", "Budi Santoso", "X TKR 1")).unwrap();
        let class = students.subscribe_by_class("X TKR 1");

        students.set_active(leaving, false).unwrap();

        let roster = students.by_class("X TKR 1").unwrap();
        assert_eq!(roster.len(), 2);
        let budi = roster.iter().find(|s| s.id == Some(leaving)).unwrap();
        assert!(!budi.is_active);
        assert_eq!(class.current().unwrap().len(), 2);
        assert_eq!(students.fetch_active().unwrap().len(), 1);
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_update_unsaved_student(ctx: &mut StudentTestContext) {
        let students = Students::new(&ctx.db);
        students.insert(&Student::new("2024-001", "Andi", "X TKR 1")).unwrap();

        let result = students.update(&Student::new("2024-001", "Andi P.", "X TKR 2"));
        assert!(matches!(result, Err(WorkshopError::Unsaved(Entity::Student))));
        assert_eq!(result.unwrap_err().user_message(), Message::RecordNotSaved("student".to_string()));
        assert_eq!(students.get_by_student_id("2024-001").unwrap().unwrap().class_name, "X TKR 1");
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_validation(ctx: &mut StudentTestContext) {
        let students = Students::new(&ctx.db);
        let existing = students.insert(&Student::new("2024-001", "Andi", "X TKR 1")).unwrap();

        let result = students.validate(&Student::new("2024-002", "", "X TKR 1")).unwrap();
        assert_eq!(result.errors, vec![Message::StudentNameEmpty]);
        assert_eq!(result.messages(), vec!["Student name must not be empty"]);

        let result = students.validate(&Student::new("2024-001", "Budi", "X TKR 1")).unwrap();
        assert_eq!(result.errors, vec![Message::StudentIdDuplicate("2024-001".to_string())]);

        // A student keeps its own number when edited
        let mut own = students.get(existing).unwrap().unwrap();
        own.full_name = "Andi P.".to_string();
        assert!(students.validate(&own).unwrap().is_valid());

        let result = students
            .validate(&Student::new("", "", "").with_email("not-an-email"))
            .unwrap();
        assert_eq!(
            result.errors,
            vec![
                Message::StudentNameEmpty,
                Message::StudentIdEmpty,
                Message::StudentClassEmpty,
                Message::StudentEmailInvalid("not-an-email".to_string()),
            ]
        );

        let ok = Student::new("2024-003", "Citra", "X TKR 1").with_email("a@b.com");
        assert!(students.validate(&ok).unwrap().is_valid());

        let blank_email = Student::new("2024-004", "Dewi", "X TKR 1").with_email("  ");
        assert!(students.validate(&blank_email).unwrap().is_valid());
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_delete_refused_while_session_runs(ctx: &mut StudentTestContext) {
        let students = Students::new(&ctx.db);
        let sessions = Sessions::new(&ctx.db);
        let student = students.insert(&Student::new("2024-001", "Andi", "X TKR 1")).unwrap();

        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let session = sessions
            .insert(&WorkshopSession::new(student, date, "08:00", "Bird house", "Pak Budi"))
            .unwrap();
        sessions.start(session).unwrap();

        assert!(matches!(students.delete(student), Err(WorkshopError::StudentHasActiveSession(id)) if id == student));

        sessions.end(session, "10:00").unwrap();
        students.delete(student).unwrap();
        assert!(sessions.get(session).unwrap().is_none());
    }
}
