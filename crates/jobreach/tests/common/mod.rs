//! Test harness for isolated workflow execution.
//!
//! `Harness` wires an in-memory database, a scripted automation client
//! and an orchestrator together, and drives jobs step by step without
//! the background runner so tests stay deterministic.

#![allow(dead_code)]

use std::sync::Arc;

use jobreach::client::mock::ScriptedClient;
use jobreach::client::Profile;
use jobreach::db::job_repo::JobRow;
use jobreach::db::{activity_repo, contact_repo, Database};
use jobreach::shutdown;
use jobreach::workflow::{Orchestrator, StepOutcome};
use jobreach::Config;

pub struct Harness {
    pub db: Database,
    pub client: Arc<ScriptedClient>,
    pub orchestrator: Orchestrator,
    pub shutdown_tx: tokio::sync::watch::Sender<bool>,
}

impl Harness {
    /// Harness with zero pacing delay and default quotas.
    pub fn new() -> Self {
        Self::with_config(Config {
            min_action_delay_secs: 0.0,
            max_action_delay_secs: 0.0,
            ..Config::default()
        })
    }

    pub fn with_config(config: Config) -> Self {
        jobreach::logging::init();

        let db = Database::open_in_memory().expect("in-memory database");
        let client = Arc::new(ScriptedClient::new());
        let (shutdown_tx, shutdown_rx) = shutdown::channel();
        let orchestrator = Orchestrator::new(db.clone(), client.clone(), config, shutdown_rx)
            .expect("orchestrator construction");

        Self {
            db,
            client,
            orchestrator,
            shutdown_tx,
        }
    }

    /// Replaces the default template's content.
    pub fn set_template(&self, content: &str) {
        self.db
            .with_conn(|conn| {
                conn.execute(
                    "UPDATE templates SET content = ?1 WHERE is_default = 1",
                    rusqlite::params![content],
                )?;
                Ok(())
            })
            .expect("template update");
    }

    /// Advances the job until it stops advancing; returns the last outcome.
    pub async fn drive(&self, job_id: &str) -> StepOutcome {
        loop {
            match self.orchestrator.advance(job_id).await.expect("advance") {
                StepOutcome::Advanced(_) => continue,
                other => return other,
            }
        }
    }

    pub fn job(&self, job_id: &str) -> JobRow {
        self.orchestrator.job(job_id).expect("job row")
    }

    pub fn contacts(&self, job_id: &str) -> Vec<contact_repo::ContactRow> {
        self.db
            .with_conn(|conn| contact_repo::list_for_job(conn, job_id))
            .expect("contacts")
    }

    pub fn activity_kinds(&self, job_id: &str) -> Vec<String> {
        self.db
            .with_conn(|conn| activity_repo::list_for_job(conn, job_id))
            .expect("activity")
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }
}

/// Fixture profile with a deterministic identity.
pub fn person(slug: &str, name: &str) -> Profile {
    Profile {
        profile_url: format!("https://www.linkedin.com/in/{}", slug),
        name: name.to_string(),
        headline: Some("Engineer".to_string()),
    }
}
