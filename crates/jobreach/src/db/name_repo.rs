//! Hebrew-name repository — user-approved transliteration mappings.
//!
//! Keys are stored lowercased; one mapping per English name.

use rusqlite::{params, Connection, OptionalExtension};

use super::error::DatabaseError;

/// A stored name mapping.
#[derive(Debug, Clone)]
pub struct NameRow {
    pub id: i64,
    pub english_name: String,
    pub hebrew_name: String,
    pub created_at: String,
}

/// Inserts or updates the mapping for an English name. The key is
/// lowercased before storage.
pub fn upsert(
    conn: &Connection,
    english_name: &str,
    hebrew_name: &str,
    created_at: &str,
) -> Result<(), DatabaseError> {
    let key = english_name.trim().to_lowercase();
    conn.execute(
        "INSERT INTO hebrew_names (english_name, hebrew_name, created_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(english_name) DO UPDATE SET hebrew_name = excluded.hebrew_name",
        params![key, hebrew_name, created_at],
    )?;
    Ok(())
}

/// Looks up the mapping for an English name (case-insensitive).
pub fn find(conn: &Connection, english_name: &str) -> Result<Option<NameRow>, DatabaseError> {
    let key = english_name.trim().to_lowercase();
    let row = conn
        .query_row(
            "SELECT id, english_name, hebrew_name, created_at FROM hebrew_names
             WHERE english_name = ?1",
            params![key],
            |row| {
                Ok(NameRow {
                    id: row.get(0)?,
                    english_name: row.get(1)?,
                    hebrew_name: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    const T0: &str = "2026-01-01T00:00:00+00:00";

    #[test]
    fn test_upsert_and_find_case_insensitive() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            upsert(conn, "Tomer", "תומר", T0)?;

            let found = find(conn, "tomer")?.unwrap();
            assert_eq!(found.english_name, "tomer");
            assert_eq!(found.hebrew_name, "תומר");

            let found = find(conn, "TOMER")?.unwrap();
            assert_eq!(found.hebrew_name, "תומר");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_upsert_overwrites_existing() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            upsert(conn, "shay", "שי", T0)?;
            upsert(conn, "Shay", "שַׁי", T0)?;

            let found = find(conn, "shay")?.unwrap();
            assert_eq!(found.hebrew_name, "שַׁי");

            let count: u32 =
                conn.query_row("SELECT COUNT(*) FROM hebrew_names", [], |r| r.get(0))?;
            assert_eq!(count, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_find_missing_returns_none() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            assert!(find(conn, "unknown")?.is_none());
            Ok(())
        })
        .unwrap();
    }
}
