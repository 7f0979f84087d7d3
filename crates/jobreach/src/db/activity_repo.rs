//! Activity-log repository — the append-only audit trail.
//!
//! Every workflow transition and every outreach attempt lands here.
//! Rows are never updated or deleted.

use rusqlite::{params, Connection, Row};

use super::error::DatabaseError;

/// The kind of action an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    JobSubmitted,
    CompanyExtracted,
    CompanyInputNeeded,
    SelectorLearned,
    ConnectionSearch,
    ConnectionFound,
    ConnectionRequestSent,
    MessageSent,
    LinkedinSearch,
    ReplyReceived,
    DispatchSummary,
    QuotaExhausted,
    StepAdvanced,
    WorkflowResumed,
    JobAborted,
    Error,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::JobSubmitted => "job_submitted",
            ActivityKind::CompanyExtracted => "company_extracted",
            ActivityKind::CompanyInputNeeded => "company_input_needed",
            ActivityKind::SelectorLearned => "selector_learned",
            ActivityKind::ConnectionSearch => "connection_search",
            ActivityKind::ConnectionFound => "connection_found",
            ActivityKind::ConnectionRequestSent => "connection_request_sent",
            ActivityKind::MessageSent => "message_sent",
            ActivityKind::LinkedinSearch => "linkedin_search",
            ActivityKind::ReplyReceived => "reply_received",
            ActivityKind::DispatchSummary => "dispatch_summary",
            ActivityKind::QuotaExhausted => "quota_exhausted",
            ActivityKind::StepAdvanced => "step_advanced",
            ActivityKind::WorkflowResumed => "workflow_resumed",
            ActivityKind::JobAborted => "job_aborted",
            ActivityKind::Error => "error",
        }
    }
}

/// A stored audit entry.
#[derive(Debug, Clone)]
pub struct ActivityRow {
    pub id: i64,
    pub kind: String,
    pub description: String,
    /// Structured detail payload as JSON.
    pub details: Option<String>,
    pub job_id: Option<String>,
    pub created_at: String,
}

impl ActivityRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            kind: row.get("kind")?,
            description: row.get("description")?,
            details: row.get("details")?,
            job_id: row.get("job_id")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Appends an audit entry.
pub fn append(
    conn: &Connection,
    kind: ActivityKind,
    description: &str,
    details: &serde_json::Value,
    job_id: Option<&str>,
    created_at: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO activity_log (kind, description, details, job_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            kind.as_str(),
            description,
            details.to_string(),
            job_id,
            created_at,
        ],
    )?;
    Ok(())
}

/// Lists the audit entries for a job in insertion order.
pub fn list_for_job(conn: &Connection, job_id: &str) -> Result<Vec<ActivityRow>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT * FROM activity_log WHERE job_id = ?1 ORDER BY id")?;
    let rows: Vec<ActivityRow> = stmt
        .query_map(params![job_id], ActivityRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Lists the most recent entries across all jobs, newest first.
pub fn list_recent(conn: &Connection, limit: u32) -> Result<Vec<ActivityRow>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM activity_log ORDER BY id DESC LIMIT ?1")?;
    let rows: Vec<ActivityRow> = stmt
        .query_map(params![limit], ActivityRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Counts entries of one kind since the given RFC3339 instant.
pub fn count_kind_since(
    conn: &Connection,
    kind: ActivityKind,
    since: &str,
) -> Result<u32, DatabaseError> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM activity_log WHERE kind = ?1 AND created_at >= ?2",
        params![kind.as_str(), since],
        |r| r.get(0),
    )?;
    Ok(count)
}
