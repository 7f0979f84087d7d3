//! Contact repository — the durable ledger of people discovered and
//! contacted per job.
//!
//! Uniqueness is on (profile_url, job_id): the same person may be
//! contacted again for a different job, but never duplicated within one.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::error::DatabaseError;

/// A raw contact row from the database.
#[derive(Debug, Clone)]
pub struct ContactRow {
    pub id: i64,
    pub profile_url: String,
    pub name: String,
    pub company: Option<String>,
    pub position: Option<String>,
    pub is_connection: bool,
    pub connection_requested_at: Option<String>,
    pub message_sent_at: Option<String>,
    pub message_content: Option<String>,
    pub reply_received_at: Option<String>,
    pub job_id: Option<String>,
    pub created_at: String,
}

impl ContactRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            profile_url: row.get("profile_url")?,
            name: row.get("name")?,
            company: row.get("company")?,
            position: row.get("position")?,
            is_connection: row.get("is_connection")?,
            connection_requested_at: row.get("connection_requested_at")?,
            message_sent_at: row.get("message_sent_at")?,
            message_content: row.get("message_content")?,
            reply_received_at: row.get("reply_received_at")?,
            job_id: row.get("job_id")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// A new contact to record for a job.
#[derive(Debug, Clone)]
pub struct NewContact<'a> {
    pub profile_url: &'a str,
    pub name: &'a str,
    pub company: Option<&'a str>,
    pub position: Option<&'a str>,
    pub is_connection: bool,
    pub job_id: &'a str,
    pub created_at: &'a str,
}

/// Inserts a contact, or returns the existing row when the same
/// (profile_url, job_id) pair is already recorded.
pub fn insert_or_get(conn: &Connection, contact: &NewContact) -> Result<ContactRow, DatabaseError> {
    if let Some(existing) = find_by_profile(conn, contact.profile_url, contact.job_id)? {
        return Ok(existing);
    }

    conn.execute(
        "INSERT INTO contacts (profile_url, name, company, position, is_connection, job_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            contact.profile_url,
            contact.name,
            contact.company,
            contact.position,
            contact.is_connection,
            contact.job_id,
            contact.created_at,
        ],
    )?;

    let id = conn.last_insert_rowid();
    find_by_id(conn, id)?.ok_or(DatabaseError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
}

/// Finds a contact by its row ID.
pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<ContactRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM contacts WHERE id = ?1",
            params![id],
            ContactRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Finds a contact by (profile_url, job_id).
pub fn find_by_profile(
    conn: &Connection,
    profile_url: &str,
    job_id: &str,
) -> Result<Option<ContactRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM contacts WHERE profile_url = ?1 AND job_id = ?2",
            params![profile_url, job_id],
            ContactRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Lists all contacts for a job, oldest first.
pub fn list_for_job(conn: &Connection, job_id: &str) -> Result<Vec<ContactRow>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT * FROM contacts WHERE job_id = ?1 ORDER BY created_at, id")?;
    let rows: Vec<ContactRow> = stmt
        .query_map(params![job_id], ContactRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Lists the existing connections for a job that have not been messaged yet.
pub fn list_unmessaged_connections(
    conn: &Connection,
    job_id: &str,
) -> Result<Vec<ContactRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM contacts WHERE job_id = ?1 AND is_connection = 1
         AND message_sent_at IS NULL ORDER BY created_at, id",
    )?;
    let rows: Vec<ContactRow> = stmt
        .query_map(params![job_id], ContactRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Lists the non-connections for a job that have not received a
/// connection request yet.
pub fn list_unrequested(conn: &Connection, job_id: &str) -> Result<Vec<ContactRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM contacts WHERE job_id = ?1 AND is_connection = 0
         AND connection_requested_at IS NULL ORDER BY created_at, id",
    )?;
    let rows: Vec<ContactRow> = stmt
        .query_map(params![job_id], ContactRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Lists messaged contacts for a job still waiting on a reply.
pub fn list_awaiting_reply(conn: &Connection, job_id: &str) -> Result<Vec<ContactRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM contacts WHERE job_id = ?1 AND message_sent_at IS NOT NULL
         AND reply_received_at IS NULL ORDER BY created_at, id",
    )?;
    let rows: Vec<ContactRow> = stmt
        .query_map(params![job_id], ContactRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Records a sent message on a contact.
pub fn mark_message_sent(
    conn: &Connection,
    id: i64,
    sent_at: &str,
    content: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE contacts SET message_sent_at = ?2, message_content = ?3 WHERE id = ?1",
        params![id, sent_at, content],
    )?;
    Ok(())
}

/// Records a sent connection request on a contact.
pub fn mark_connection_requested(
    conn: &Connection,
    id: i64,
    requested_at: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE contacts SET connection_requested_at = ?2 WHERE id = ?1",
        params![id, requested_at],
    )?;
    Ok(())
}

/// Marks a contact as an accepted connection.
pub fn mark_connected(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE contacts SET is_connection = 1 WHERE id = ?1",
        params![id],
    )?;
    Ok(())
}

/// Records a received reply on a contact.
pub fn mark_reply_received(
    conn: &Connection,
    id: i64,
    received_at: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE contacts SET reply_received_at = ?2 WHERE id = ?1",
        params![id, received_at],
    )?;
    Ok(())
}

/// Counts messages sent across all jobs since the given RFC3339 instant.
/// Used for the daily message quota.
pub fn count_messages_since(conn: &Connection, since: &str) -> Result<u32, DatabaseError> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM contacts WHERE message_sent_at >= ?1",
        params![since],
        |r| r.get(0),
    )?;
    Ok(count)
}

/// Counts connection requests sent across all jobs since the given
/// RFC3339 instant. Used for the daily connection quota.
pub fn count_requests_since(conn: &Connection, since: &str) -> Result<u32, DatabaseError> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM contacts WHERE connection_requested_at >= ?1",
        params![since],
        |r| r.get(0),
    )?;
    Ok(count)
}

/// Counts contacts for a job with any outreach recorded (message or
/// connection request).
pub fn count_outreach_for_job(conn: &Connection, job_id: &str) -> Result<u32, DatabaseError> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM contacts WHERE job_id = ?1
         AND (message_sent_at IS NOT NULL OR connection_requested_at IS NOT NULL)",
        params![job_id],
        |r| r.get(0),
    )?;
    Ok(count)
}
