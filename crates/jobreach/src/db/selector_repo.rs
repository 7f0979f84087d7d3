//! Site-selector repository — CRUD operations for the `site_selectors` table.
//!
//! One row per domain. The `company_selector`/`title_selector` columns are
//! legacy CSS-selector fields kept for older databases; nothing reads them.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::error::DatabaseError;

/// A raw site-selector row from the database.
#[derive(Debug, Clone)]
pub struct SelectorRow {
    pub id: i64,
    pub domain: String,
    pub site_type: String,
    pub company_name: Option<String>,
    pub platform_name: Option<String>,
    pub url_pattern: Option<String>,
    pub company_selector: Option<String>,
    pub title_selector: Option<String>,
    pub example_url: Option<String>,
    pub example_company: Option<String>,
    pub created_at: String,
    pub last_used_at: Option<String>,
}

impl SelectorRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            domain: row.get("domain")?,
            site_type: row.get("site_type")?,
            company_name: row.get("company_name")?,
            platform_name: row.get("platform_name")?,
            url_pattern: row.get("url_pattern")?,
            company_selector: row.get("company_selector")?,
            title_selector: row.get("title_selector")?,
            example_url: row.get("example_url")?,
            example_company: row.get("example_company")?,
            created_at: row.get("created_at")?,
            last_used_at: row.get("last_used_at")?,
        })
    }
}

/// Fields for inserting or replacing a selector row.
#[derive(Debug, Clone)]
pub struct NewSelectorRow<'a> {
    pub domain: &'a str,
    pub site_type: &'a str,
    pub company_name: Option<&'a str>,
    pub platform_name: Option<&'a str>,
    pub url_pattern: Option<&'a str>,
    pub example_url: Option<&'a str>,
    pub example_company: Option<&'a str>,
    pub created_at: &'a str,
}

/// Inserts a new selector row. Fails on a duplicate domain.
pub fn insert(conn: &Connection, selector: &NewSelectorRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO site_selectors (domain, site_type, company_name, platform_name,
         url_pattern, example_url, example_company, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            selector.domain,
            selector.site_type,
            selector.company_name,
            selector.platform_name,
            selector.url_pattern,
            selector.example_url,
            selector.example_company,
            selector.created_at,
        ],
    )?;
    Ok(())
}

/// Overwrites the rule fields of an existing domain row.
pub fn update_rule(conn: &Connection, selector: &NewSelectorRow) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE site_selectors SET site_type=?2, company_name=?3, platform_name=?4,
         url_pattern=?5, example_url=?6, example_company=?7
         WHERE domain=?1",
        params![
            selector.domain,
            selector.site_type,
            selector.company_name,
            selector.platform_name,
            selector.url_pattern,
            selector.example_url,
            selector.example_company,
        ],
    )?;
    Ok(changed > 0)
}

/// Finds a selector by exact domain.
pub fn find_by_domain(conn: &Connection, domain: &str) -> Result<Option<SelectorRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM site_selectors WHERE domain = ?1",
            params![domain],
            SelectorRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Lists all platform selectors (used for suffix matching).
pub fn list_platforms(conn: &Connection) -> Result<Vec<SelectorRow>, DatabaseError> {
    let mut stmt = conn
        .prepare("SELECT * FROM site_selectors WHERE site_type = 'platform' ORDER BY domain")?;
    let rows: Vec<SelectorRow> = stmt
        .query_map([], SelectorRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Lists every selector, ordered by domain.
pub fn list_all(conn: &Connection) -> Result<Vec<SelectorRow>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM site_selectors ORDER BY domain")?;
    let rows: Vec<SelectorRow> = stmt
        .query_map([], SelectorRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Stamps `last_used_at` on a domain row.
pub fn touch_last_used(conn: &Connection, domain: &str, used_at: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE site_selectors SET last_used_at = ?2 WHERE domain = ?1",
        params![domain, used_at],
    )?;
    Ok(())
}
