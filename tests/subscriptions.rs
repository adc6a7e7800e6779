#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use std::time::Duration;
    use tokio::time::timeout;
    use workshop::db::db::{Db, Table};
    use workshop::db::sessions::Sessions;
    use workshop::db::statistics::Statistics;
    use workshop::db::students::Students;
    use workshop::db::tools::Tools;
    use workshop::libs::session::{SessionStatus, SessionTool, WorkshopSession};
    use workshop::libs::student::Student;
    use workshop::libs::tool::Tool;

    const WAIT: Duration = Duration::from_secs(2);

    fn seeded() -> (Db, i64, i64) {
        let db = Db::in_memory().unwrap();
        let student = Students::new(&db).insert(&Student::new("2024-001", "Andi", "X TKR 1")).unwrap();
        let saw = Tools::new(&db).insert(&Tool::new("SAW-01", "Hand saw", "Hand tools", 1)).unwrap();
        (db, student, saw)
    }

    #[tokio::test]
    async fn test_available_tools_follow_session_start() {
        let (db, student, saw) = seeded();
        let sessions = Sessions::new(&db);
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let id = sessions
            .insert(&WorkshopSession::new(student, date, "08:00", "Shelf", "Pak Budi").with_tools(vec![SessionTool::single(saw)]))
            .unwrap();

        let mut available = Tools::new(&db).subscribe_available();
        assert_eq!(available.current().unwrap().len(), 1);

        sessions.start(id).unwrap();
        let fresh = timeout(WAIT, available.changed()).await.unwrap().unwrap();
        assert!(fresh.is_empty());

        sessions.end(id, "10:00").unwrap();
        let fresh = timeout(WAIT, available.changed()).await.unwrap().unwrap();
        assert_eq!(fresh.len(), 1);
    }

    #[tokio::test]
    async fn test_unrelated_writes_are_ignored() {
        let (db, student, _) = seeded();
        let mut active = Sessions::new(&db).subscribe_active();
        assert!(active.current().unwrap().is_empty());

        Students::new(&db).insert(&Student::new("2024-002", "Budi", "X TKR 1")).unwrap();
        assert!(timeout(Duration::from_millis(100), active.changed()).await.is_err());

        let sessions = Sessions::new(&db);
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let id = sessions
            .insert(&WorkshopSession::new(student, date, "08:00", "Shelf", "Pak Budi"))
            .unwrap();
        sessions.start(id).unwrap();

        // Both writes were queued, one refresh sees the final state
        let fresh = timeout(WAIT, active.changed()).await.unwrap().unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].status, SessionStatus::InProgress);
    }

    #[tokio::test]
    async fn test_dashboard_subscription() {
        let (db, _, saw) = seeded();
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let mut dashboard = Statistics::new(&db).subscribe_dashboard(today);
        assert!(dashboard.tables().contains(&Table::Tools));
        assert_eq!(dashboard.current().unwrap().available_tools, 1);

        Tools::new(&db).set_active(saw, false).unwrap();
        let fresh = timeout(WAIT, dashboard.changed()).await.unwrap().unwrap();
        assert_eq!(fresh.available_tools, 0);
    }

    #[tokio::test]
    async fn test_watch_from_another_task() {
        let (db, _, _) = seeded();
        let mut students = Students::new(&db).subscribe_all();

        let writer = {
            let db = db.clone();
            tokio::spawn(async move {
                Students::new(&db).insert(&Student::new("2024-003", "Citra", "XI TKR 2")).unwrap();
            })
        };

        let fresh = timeout(WAIT, students.changed()).await.unwrap().unwrap();
        writer.await.unwrap();
        assert_eq!(fresh.len(), 2);
    }
}
