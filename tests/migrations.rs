#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use workshop::db::db::Db;
    use workshop::db::migrations::{get_db_version, init_with_migrations, needs_migration, MigrationManager};
    use workshop::db::students::Students;
    use workshop::libs::student::Student;

    struct MigrationTestContext {
        temp_dir: TempDir,
    }

    impl TestContext for MigrationTestContext {
        fn setup() -> Self {
            MigrationTestContext {
                temp_dir: tempfile::tempdir().unwrap(),
            }
        }
    }

    fn table_exists(conn: &Connection, name: &str) -> bool {
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1", [name], |row| row.get(0))
            .unwrap();
        count == 1
    }

    #[test]
    fn test_fresh_database() {
        let mut conn = Connection::open_in_memory().unwrap();
        let manager = MigrationManager::new();

        assert_eq!(get_db_version(&conn).unwrap(), 0);
        assert!(needs_migration(&conn).unwrap());

        init_with_migrations(&mut conn).unwrap();

        assert_eq!(get_db_version(&conn).unwrap(), manager.latest_version());
        assert!(!needs_migration(&conn).unwrap());
        for table in ["students", "tools", "workshop_sessions", "session_tools", "tool_usage"] {
            assert!(table_exists(&conn, table), "missing table {}", table);
        }
        assert!(manager.is_migration_applied(&conn, 1).unwrap());
    }

    #[test]
    fn test_rerun_is_noop() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_with_migrations(&mut conn).unwrap();
        init_with_migrations(&mut conn).unwrap();

        let history = MigrationManager::new().get_migration_history(&conn).unwrap();
        let versions: Vec<u32> = history.iter().map(|(version, _, _)| *version).collect();
        assert_eq!(versions, vec![1, 2, 3]);
        assert_eq!(history[0].1, "create_students_and_tools");
    }

    #[test]
    fn test_history_of_untouched_database() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(MigrationManager::new().get_migration_history(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_stock_constraint() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_with_migrations(&mut conn).unwrap();

        let over = conn.execute(
            "INSERT INTO tools (code, name, category, quantity, available_quantity) VALUES ('X-1', 'Vise', 'Clamps', 1, 2)",
            [],
        );
        assert!(over.is_err());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_file_database_persists(ctx: &mut MigrationTestContext) {
        let path = ctx.temp_dir.path().join("workshop.db");
        {
            let db = Db::open(&path).unwrap();
            Students::new(&db).insert(&Student::new("2024-001", "Andi", "X TKR 1")).unwrap();
        }

        let db = Db::open(&path).unwrap();
        assert_eq!(Students::new(&db).count().unwrap(), 1);
        assert_eq!(get_db_version(&db.conn()).unwrap(), MigrationManager::new().latest_version());
    }
}
