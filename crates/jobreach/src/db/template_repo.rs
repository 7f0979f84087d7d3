//! Template repository — stored outreach message templates.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::error::DatabaseError;

/// A stored message template.
#[derive(Debug, Clone)]
pub struct TemplateRow {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub is_default: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TemplateRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            content: row.get("content")?,
            is_default: row.get("is_default")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Inserts a template and returns its row ID.
pub fn insert(
    conn: &Connection,
    name: &str,
    content: &str,
    is_default: bool,
    created_at: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO templates (name, content, is_default, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![name, content, is_default, created_at],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Finds a template by ID.
pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<TemplateRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM templates WHERE id = ?1",
            params![id],
            TemplateRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Returns the default template, falling back to any template when no
/// default is flagged.
pub fn find_default(conn: &Connection) -> Result<Option<TemplateRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM templates ORDER BY is_default DESC, id LIMIT 1",
            [],
            TemplateRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Counts stored templates.
pub fn count(conn: &Connection) -> Result<u32, DatabaseError> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM templates", [], |r| r.get(0))?;
    Ok(count)
}
