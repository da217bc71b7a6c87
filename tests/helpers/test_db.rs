use fieldbook::infrastructure::persistence::Database;

/// Migrated SQLite file that is deleted when dropped
pub struct TestDatabase {
    db: Database,
    path: String,
}

impl TestDatabase {
    pub fn db(&self) -> &Database {
        &self.db
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path, suffix));
        }
    }
}

pub async fn setup_test_db() -> TestDatabase {
    // Use file-based SQLite for tests (unique UUID per test for parallel execution)
    let path = format!("test_{}.db", uuid::Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", path);

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    TestDatabase { db, path }
}
