use crate::error::StoreError;
use crate::schema::MIG_0001_INIT;
use rusqlite::Connection;
use tracing::debug;

pub struct Db {
    pub conn: Connection,
}

impl Db {
    pub fn open_or_create(path: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        apply_pragmas(&conn, true)?;
        migrate(&conn)?;
        Ok(Db { conn })
    }

    /// Private in-memory database, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        apply_pragmas(&conn, false)?;
        migrate(&conn)?;
        Ok(Db { conn })
    }
}

fn apply_pragmas(conn: &Connection, on_disk: bool) -> Result<(), StoreError> {
    if on_disk {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
    }
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "busy_timeout", 5000i64)?;
    Ok(())
}

fn migrate(conn: &Connection) -> Result<(), StoreError> {
    // naive: if scan_run table doesn't exist, apply 0001
    let exists: i64 = conn.query_row(
        "SELECT COUNT(1) FROM sqlite_master WHERE type='table' AND name='scan_run'",
        [],
        |r| r.get(0),
    )?;
    if exists == 0 {
        debug!("applying initial schema migration");
        conn.execute_batch(MIG_0001_INIT)?;
    }
    Ok(())
}
