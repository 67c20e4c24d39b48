use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use tracing::info;

/// Every user ever registered, kept across restarts.
///
/// A user's first recorded name is never overwritten.
pub struct DurableRoster {
    conn: Connection,
}

impl DurableRoster {
    /// Open or create the SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open roster database: {}", path.display()))?;

        // journal_mode PRAGMA always returns the resulting mode, so use query_row
        let _: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

        Self::run_migrations(&conn)?;
        info!("Roster database opened at: {}", path.display());
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                first_seen TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )
        .context("Failed to create users table")?;
        Ok(())
    }

    pub fn get(&self, user_id: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT name FROM users WHERE user_id = ?1",
                rusqlite::params![user_id],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to look up user")
    }

    /// Record `name` for `user_id` unless the user is already known.
    /// Returns true when a new row was written.
    pub fn insert_if_absent(&self, user_id: &str, name: &str) -> Result<bool> {
        let inserted = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO users (user_id, name) VALUES (?1, ?2)",
                rusqlite::params![user_id, name],
            )
            .context("Failed to record user")?;
        Ok(inserted > 0)
    }

    /// All known users, oldest first.
    pub fn all(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id, name FROM users ORDER BY first_seen ASC, rowid ASC")
            .context("Failed to prepare query")?;
        let users = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .context("Failed to map rows")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to collect rows")?;
        Ok(users)
    }

    /// Flush and close the database.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("Failed to close roster database")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_write_wins() {
        let roster = DurableRoster::open_in_memory().unwrap();

        assert!(roster.insert_if_absent("1", "Ann").unwrap());
        assert!(!roster.insert_if_absent("1", "Annie").unwrap());
        assert_eq!(roster.get("1").unwrap().as_deref(), Some("Ann"));
    }

    #[test]
    fn test_unknown_user() {
        let roster = DurableRoster::open_in_memory().unwrap();
        assert_eq!(roster.get("404").unwrap(), None);
    }

    #[test]
    fn test_all_in_insertion_order() {
        let roster = DurableRoster::open_in_memory().unwrap();
        roster.insert_if_absent("2", "Bo").unwrap();
        roster.insert_if_absent("1", "Ann").unwrap();

        assert_eq!(
            roster.all().unwrap(),
            vec![
                ("2".to_string(), "Bo".to_string()),
                ("1".to_string(), "Ann".to_string()),
            ]
        );
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.sqlite");

        let roster = DurableRoster::open(&path).unwrap();
        roster.insert_if_absent("1", "Ann").unwrap();
        roster.close().unwrap();

        let roster = DurableRoster::open(&path).unwrap();
        assert_eq!(roster.get("1").unwrap().as_deref(), Some("Ann"));
    }
}
