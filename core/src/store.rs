//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine hands it an encoded save blob; the store never looks inside.

use crate::error::SimResult;
use rusqlite::{params, Connection, OptionalExtension};

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the save database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_save_slot.sql"))?;
        Ok(())
    }

    // ── Save slots ─────────────────────────────────────────────

    /// Write `payload` to the slot, replacing whatever was there.
    pub fn write_slot(&self, slot_key: &str, payload: &str, saved_at: i64) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO save_slot (slot_key, payload, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(slot_key) DO UPDATE SET
                payload  = excluded.payload,
                saved_at = excluded.saved_at",
            params![slot_key, payload, saved_at],
        )?;
        Ok(())
    }

    /// None when nothing has been saved to the slot.
    pub fn read_slot(&self, slot_key: &str) -> SimResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM save_slot WHERE slot_key = ?1",
                params![slot_key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    pub fn slot_saved_at(&self, slot_key: &str) -> SimResult<Option<i64>> {
        let saved_at = self
            .conn
            .query_row(
                "SELECT saved_at FROM save_slot WHERE slot_key = ?1",
                params![slot_key],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(saved_at)
    }

    pub fn clear_slot(&self, slot_key: &str) -> SimResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM save_slot WHERE slot_key = ?1", params![slot_key])?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SimStore {
        let store = SimStore::in_memory().expect("in-memory store");
        store.migrate().expect("migration");
        store
    }

    #[test]
    fn missing_slot_reads_none() {
        assert_eq!(store().read_slot("nothing").unwrap(), None);
    }

    #[test]
    fn save_overwrites_slot() {
        let store = store();
        store.write_slot("slot", "{\"a\":1}", 10).unwrap();
        store.write_slot("slot", "{\"a\":2}", 20).unwrap();
        assert_eq!(store.read_slot("slot").unwrap().as_deref(), Some("{\"a\":2}"));
        assert_eq!(store.slot_saved_at("slot").unwrap(), Some(20));
    }

    #[test]
    fn clear_removes_slot() {
        let store = store();
        store.write_slot("slot", "{}", 1).unwrap();
        assert!(store.clear_slot("slot").unwrap());
        assert!(!store.clear_slot("slot").unwrap());
        assert_eq!(store.read_slot("slot").unwrap(), None);
    }

    #[test]
    fn open_file_switches_to_wal() {
        let path = std::env::temp_dir().join(format!("isles-store-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let store = SimStore::open(&path.to_string_lossy()).unwrap();
        let mode: String = store
            .conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");

        drop(store);
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.to_string_lossy()));
        }
    }

    #[test]
    fn open_memory_path_succeeds() {
        let store = SimStore::open(":memory:").unwrap();
        store.migrate().unwrap();
    }

    #[test]
    fn migrate_is_repeatable() {
        let store = store();
        store.migrate().unwrap();
    }
}
