//! Database migration system.
//!
//! Tracks applied migrations in a `_migrations` table and applies
//! pending ones in order. Some migrations (ALTER TABLE ADD/DROP COLUMN)
//! are handled conditionally to support idempotent execution.

use rusqlite::Connection;

use super::error::DatabaseError;

/// A single migration definition.
struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
    /// Whether this migration needs conditional handling
    /// (e.g. ADD COLUMN that may already exist).
    kind: MigrationKind,
}

enum MigrationKind {
    /// Execute the SQL directly.
    Standard,
    /// ALTER TABLE ADD COLUMN — skip if column already exists.
    AddColumn {
        table: &'static str,
        column: &'static str,
    },
    /// ALTER TABLE DROP COLUMN — skip if column does not exist.
    DropColumn {
        table: &'static str,
        column: &'static str,
    },
}

/// All migrations in order. Each is applied at most once.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_jobs_table",
        sql: include_str!("sql/001_create_jobs.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 2,
        description: "create_contacts_table",
        sql: include_str!("sql/002_create_contacts.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 3,
        description: "create_site_selectors_table",
        sql: include_str!("sql/003_create_site_selectors.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 4,
        description: "create_hebrew_names_table",
        sql: include_str!("sql/004_create_hebrew_names.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 5,
        description: "create_activity_log_table",
        sql: include_str!("sql/005_create_activity_log.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 6,
        description: "create_templates_table",
        sql: include_str!("sql/006_create_templates.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 7,
        description: "add_last_reply_check_to_jobs",
        sql: include_str!("sql/007_add_last_reply_check.sql"),
        kind: MigrationKind::AddColumn {
            table: "jobs",
            column: "last_reply_check_at",
        },
    },
    Migration {
        version: 8,
        description: "drop_gender_from_contacts",
        sql: include_str!("sql/008_drop_contact_gender.sql"),
        kind: MigrationKind::DropColumn {
            table: "contacts",
            column: "gender",
        },
    },
];

/// Runs all pending migrations on the given connection.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    // Create the migrations tracking table.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |r| r.get(0),
    )?;

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        log::info!(
            "Running migration v{}: {}",
            migration.version,
            migration.description
        );

        let should_run = match &migration.kind {
            MigrationKind::Standard => true,
            MigrationKind::AddColumn { table, column } => !column_exists(conn, table, column)?,
            MigrationKind::DropColumn { table, column } => column_exists(conn, table, column)?,
        };

        if should_run {
            conn.execute_batch(migration.sql)
                .map_err(|e| DatabaseError::Migration {
                    version: migration.version,
                    reason: e.to_string(),
                })?;
        } else {
            log::info!(
                "Skipping migration v{} (condition not met)",
                migration.version
            );
        }

        conn.execute(
            "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
            rusqlite::params![migration.version, migration.description],
        )?;
    }

    Ok(())
}

/// Checks whether a column exists on a table using `PRAGMA table_info`.
fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DatabaseError> {
    // Validate identifier — only alphanumeric and underscores allowed.
    if !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DatabaseError::Migration {
            version: 0,
            reason: format!("Invalid table name: {}", table),
        });
    }
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .any(|r| r.map(|name| name == column).unwrap_or(false));
    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
        conn
    }

    #[test]
    fn test_migrations_run_on_fresh_db() {
        let conn = fresh_conn();
        run_all(&conn).unwrap();

        let count: u32 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, MIGRATIONS.len() as u32);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = fresh_conn();
        run_all(&conn).unwrap();
        // Running again should be a no-op.
        run_all(&conn).unwrap();

        let count: u32 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, MIGRATIONS.len() as u32);
    }

    #[test]
    fn test_column_exists_check() {
        let conn = fresh_conn();
        conn.execute_batch("CREATE TABLE test_tbl (id TEXT, name TEXT);")
            .unwrap();

        assert!(column_exists(&conn, "test_tbl", "id").unwrap());
        assert!(column_exists(&conn, "test_tbl", "name").unwrap());
        assert!(!column_exists(&conn, "test_tbl", "missing").unwrap());
    }

    #[test]
    fn test_contacts_table_has_no_gender() {
        let conn = fresh_conn();
        run_all(&conn).unwrap();

        assert!(!column_exists(&conn, "contacts", "gender").unwrap());
    }

    #[test]
    fn test_jobs_table_has_last_reply_check() {
        let conn = fresh_conn();
        run_all(&conn).unwrap();

        assert!(column_exists(&conn, "jobs", "last_reply_check_at").unwrap());
    }

    #[test]
    fn test_contact_uniqueness_is_per_job() {
        let conn = fresh_conn();
        run_all(&conn).unwrap();

        conn.execute(
            "INSERT INTO jobs (id, url, created_at) VALUES ('j1', 'https://a', '2026-01-01T00:00:00+00:00'),
             ('j2', 'https://b', '2026-01-01T00:00:00+00:00')",
            [],
        )
        .unwrap();

        let insert = "INSERT INTO contacts (profile_url, name, job_id, created_at)
                      VALUES (?1, ?2, ?3, '2026-01-01T00:00:00+00:00')";
        conn.execute(insert, rusqlite::params!["https://p/in/ada", "Ada", "j1"])
            .unwrap();
        // Same person for a different job is allowed.
        conn.execute(insert, rusqlite::params!["https://p/in/ada", "Ada", "j2"])
            .unwrap();
        // Duplicate within the same job is rejected.
        let dup = conn.execute(insert, rusqlite::params!["https://p/in/ada", "Ada", "j1"]);
        assert!(dup.is_err());
    }

    #[test]
    fn test_selector_domain_is_unique() {
        let conn = fresh_conn();
        run_all(&conn).unwrap();

        let insert = "INSERT INTO site_selectors (domain, site_type, created_at)
                      VALUES (?1, 'company', '2026-01-01T00:00:00+00:00')";
        conn.execute(insert, rusqlite::params!["lever.co"]).unwrap();
        let dup = conn.execute(insert, rusqlite::params!["lever.co"]);
        assert!(dup.is_err());
    }
}
