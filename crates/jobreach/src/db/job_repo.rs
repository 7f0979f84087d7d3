//! Job repository — CRUD operations for the `jobs` table.
//!
//! Status and workflow step are stored as plain strings; the typed
//! enums and the transition rules live in `workflow::step`.

use rusqlite::{params, Connection, Row};

use super::error::DatabaseError;

/// A raw job row from the database.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: String,
    pub url: String,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub status: String,
    pub workflow_step: String,
    pub error_message: Option<String>,
    /// JSON array of names awaiting translation, present only while paused.
    pub pending_names: Option<String>,
    pub created_at: String,
    pub processed_at: Option<String>,
    pub last_reply_check_at: Option<String>,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            url: row.get("url")?,
            company_name: row.get("company_name")?,
            job_title: row.get("job_title")?,
            status: row.get("status")?,
            workflow_step: row.get("workflow_step")?,
            error_message: row.get("error_message")?,
            pending_names: row.get("pending_names")?,
            created_at: row.get("created_at")?,
            processed_at: row.get("processed_at")?,
            last_reply_check_at: row.get("last_reply_check_at")?,
        })
    }
}

/// Inserts a new job row.
pub fn insert(conn: &Connection, job: &JobRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO jobs (id, url, company_name, job_title, status, workflow_step,
         error_message, pending_names, created_at, processed_at, last_reply_check_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            job.id,
            job.url,
            job.company_name,
            job.job_title,
            job.status,
            job.workflow_step,
            job.error_message,
            job.pending_names,
            job.created_at,
            job.processed_at,
            job.last_reply_check_at,
        ],
    )?;
    Ok(())
}

/// Updates an existing job row. All fields except `id`, `url` and
/// `created_at` are overwritten.
pub fn update(conn: &Connection, job: &JobRow) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE jobs SET company_name=?2, job_title=?3, status=?4, workflow_step=?5,
         error_message=?6, pending_names=?7, processed_at=?8, last_reply_check_at=?9
         WHERE id=?1",
        params![
            job.id,
            job.company_name,
            job.job_title,
            job.status,
            job.workflow_step,
            job.error_message,
            job.pending_names,
            job.processed_at,
            job.last_reply_check_at,
        ],
    )?;
    Ok(())
}

/// Finds a job by its ID.
pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<JobRow>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM jobs WHERE id = ?1")?;
    let mut rows = stmt.query_map(params![id], JobRow::from_row)?;
    match rows.next() {
        Some(Ok(row)) => Ok(Some(row)),
        Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
        None => Ok(None),
    }
}

/// Lists jobs with the given status, newest first.
pub fn list_by_status(conn: &Connection, status: &str) -> Result<Vec<JobRow>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT * FROM jobs WHERE status = ?1 ORDER BY created_at DESC")?;
    let rows: Vec<JobRow> = stmt
        .query_map(params![status], JobRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Lists all jobs, newest first.
pub fn list_all(conn: &Connection) -> Result<Vec<JobRow>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM jobs ORDER BY created_at DESC")?;
    let rows: Vec<JobRow> = stmt
        .query_map([], JobRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test database")
    }

    fn sample_job(id: &str) -> JobRow {
        JobRow {
            id: id.to_string(),
            url: "https://jobs.lever.co/acme-corp/123".to_string(),
            company_name: None,
            job_title: None,
            status: "pending".to_string(),
            workflow_step: "company_extraction".to_string(),
            error_message: None,
            pending_names: None,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            processed_at: None,
            last_reply_check_at: None,
        }
    }

    #[test]
    fn test_insert_and_find() {
        let db = test_db();
        db.with_conn(|conn| {
            insert(conn, &sample_job("job-1"))?;

            let found = find_by_id(conn, "job-1")?.unwrap();
            assert_eq!(found.url, "https://jobs.lever.co/acme-corp/123");
            assert_eq!(found.status, "pending");
            assert_eq!(found.workflow_step, "company_extraction");
            assert!(found.company_name.is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_find_nonexistent() {
        let db = test_db();
        db.with_conn(|conn| {
            assert!(find_by_id(conn, "nonexistent")?.is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_update() {
        let db = test_db();
        db.with_conn(|conn| {
            let mut job = sample_job("job-2");
            insert(conn, &job)?;

            job.company_name = Some("Acme Corp".to_string());
            job.status = "processing".to_string();
            job.workflow_step = "search_connections".to_string();
            update(conn, &job)?;

            let found = find_by_id(conn, "job-2")?.unwrap();
            assert_eq!(found.company_name.as_deref(), Some("Acme Corp"));
            assert_eq!(found.status, "processing");
            assert_eq!(found.workflow_step, "search_connections");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_same_url_creates_independent_jobs() {
        let db = test_db();
        db.with_conn(|conn| {
            insert(conn, &sample_job("dup-1"))?;
            insert(conn, &sample_job("dup-2"))?;

            let all = list_all(conn)?;
            assert_eq!(all.len(), 2);
            assert_eq!(all[0].url, all[1].url);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_list_by_status() {
        let db = test_db();
        db.with_conn(|conn| {
            insert(conn, &sample_job("s1"))?;

            let mut paused = sample_job("s2");
            paused.status = "needs_input".to_string();
            insert(conn, &paused)?;

            let pending = list_by_status(conn, "pending")?;
            assert_eq!(pending.len(), 1);
            assert_eq!(pending[0].id, "s1");

            let waiting = list_by_status(conn, "needs_input")?;
            assert_eq!(waiting.len(), 1);
            assert_eq!(waiting[0].id, "s2");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_pending_names_round_trip() {
        let db = test_db();
        db.with_conn(|conn| {
            let mut job = sample_job("names-1");
            job.pending_names = Some(r#"["tomer","shira"]"#.to_string());
            insert(conn, &job)?;

            let found = find_by_id(conn, "names-1")?.unwrap();
            let names: Vec<String> =
                serde_json::from_str(found.pending_names.as_deref().unwrap()).unwrap();
            assert_eq!(names, vec!["tomer", "shira"]);
            Ok(())
        })
        .unwrap();
    }
}
