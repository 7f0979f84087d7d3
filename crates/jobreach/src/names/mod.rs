//! Name translation store: English transliterations → Hebrew script.
//!
//! Consulted before composing a message when the active template is
//! written in Hebrew. A name resolves through the built-in table first,
//! then through user-approved mappings in the database. A name that
//! resolves nowhere pauses the workflow for operator input.

use rusqlite::Connection;

use crate::db::{name_repo, Database, DatabaseError};

mod builtin;

pub use builtin::BUILTIN_TRANSLATIONS;

/// Returns true if the text contains any Hebrew-script character.
pub fn is_hebrew_text(text: &str) -> bool {
    text.chars().any(|c| ('\u{0590}'..='\u{05FF}').contains(&c))
}

/// Extracts the first name from a full display name.
pub fn first_name(full_name: &str) -> Option<&str> {
    full_name.split_whitespace().next()
}

/// Translates a name to Hebrew script.
///
/// Names already in Hebrew pass through unchanged (first name only).
/// Returns `None` when no translation is known, signalling that the
/// workflow should pause for operator input.
pub fn translate(conn: &Connection, name: &str) -> Result<Option<String>, DatabaseError> {
    let first = match first_name(name) {
        Some(f) => f,
        None => return Ok(None),
    };

    if is_hebrew_text(first) {
        return Ok(Some(first.to_string()));
    }

    let key = first.to_lowercase();
    if let Some(hebrew) = builtin::lookup(&key) {
        return Ok(Some(hebrew.to_string()));
    }

    if let Some(row) = name_repo::find(conn, &key)? {
        return Ok(Some(row.hebrew_name));
    }

    log::debug!("No Hebrew translation found for '{}'", key);
    Ok(None)
}

/// Returns the lowercase first names from `names` that have no Hebrew
/// translation anywhere, deduplicated in input order.
pub fn missing(conn: &Connection, names: &[String]) -> Result<Vec<String>, DatabaseError> {
    let mut missing = Vec::new();
    for name in names {
        if translate(conn, name)?.is_none() {
            if let Some(first) = first_name(name) {
                let key = first.to_lowercase();
                if !missing.contains(&key) {
                    missing.push(key);
                }
            }
        }
    }
    Ok(missing)
}

/// Saves a user-approved mapping (case-insensitive key).
pub fn save(db: &Database, english_name: &str, hebrew_name: &str) -> Result<(), DatabaseError> {
    let now = crate::db::now_str();
    db.with_conn(|conn| name_repo::upsert(conn, english_name, hebrew_name, &now))?;
    log::info!("Saved Hebrew name: {} -> {}", english_name.to_lowercase(), hebrew_name);
    Ok(())
}
