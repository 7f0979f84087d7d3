//! Outreach dispatcher — bulk messages and connection requests.
//!
//! Turns a target list into a strict sent/failed/skipped partition.
//! Enforces the daily quota, skips targets already actioned for the
//! job, paces successive sends with a randomized human-like delay, and
//! records every send in the contact ledger and the audit trail.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::{info_span, warn, Instrument};

use crate::client::{AutomationClient, ClientError};
use crate::config::Config;
use crate::db::activity_repo::{self, ActivityKind};
use crate::db::contact_repo::{self, ContactRow};
use crate::db::job_repo::JobRow;
use crate::db::{Database, DatabaseError};
use crate::shutdown::Shutdown;
use crate::{names, template};

/// The two outreach actions the dispatcher performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutreachAction {
    Message,
    ConnectionRequest,
}

impl OutreachAction {
    fn describe(&self) -> &'static str {
        match self {
            OutreachAction::Message => "message",
            OutreachAction::ConnectionRequest => "connection request",
        }
    }
}

/// Why a target landed in the skipped bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The action was already performed for this contact and job.
    AlreadyActioned,
    /// The target has no usable platform identity.
    MissingIdentity,
    /// The same target appeared earlier in the batch.
    Duplicate,
    /// The daily quota ran out; the job resumes tomorrow.
    QuotaExhausted,
    /// Shutdown was requested mid-batch.
    ShuttingDown,
}

impl SkipReason {
    fn as_str(&self) -> &'static str {
        match self {
            SkipReason::AlreadyActioned => "already_actioned",
            SkipReason::MissingIdentity => "missing_identity",
            SkipReason::Duplicate => "duplicate",
            SkipReason::QuotaExhausted => "quota_exhausted",
            SkipReason::ShuttingDown => "shutting_down",
        }
    }
}

/// Strict partition of a dispatch batch: every input target lands in
/// exactly one bucket.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub sent: Vec<String>,
    pub failed: Vec<String>,
    pub skipped: Vec<(String, SkipReason)>,
}

impl DispatchOutcome {
    pub fn total(&self) -> usize {
        self.sent.len() + self.failed.len() + self.skipped.len()
    }

    /// The batch hit the daily quota; remaining targets were skipped.
    pub fn truncated(&self) -> bool {
        self.skipped
            .iter()
            .any(|(_, reason)| *reason == SkipReason::QuotaExhausted)
    }

    /// The batch was cut short by shutdown.
    pub fn interrupted(&self) -> bool {
        self.skipped
            .iter()
            .any(|(_, reason)| *reason == SkipReason::ShuttingDown)
    }

    fn skip_counts(&self) -> serde_json::Value {
        let mut counts = serde_json::Map::new();
        for (_, reason) in &self.skipped {
            let entry = counts.entry(reason.as_str()).or_insert(serde_json::json!(0));
            *entry = serde_json::json!(entry.as_u64().unwrap_or(0) + 1);
        }
        serde_json::Value::Object(counts)
    }
}

/// Failure of one send attempt, before it is folded into the partition.
enum SendError {
    Client(ClientError),
    Database(DatabaseError),
}

/// Errors that abort a whole batch. Per-target failures never surface
/// here; they stay inside the partition.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The automation session is gone; the step fails.
    #[error("Automation session failure: {0}")]
    Session(#[source] ClientError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Dispatches outreach batches against the shared automation session.
pub struct Dispatcher {
    db: Database,
    client: Arc<dyn AutomationClient>,
    config: Config,
    shutdown: Shutdown,
}

impl Dispatcher {
    pub fn new(
        db: Database,
        client: Arc<dyn AutomationClient>,
        config: Config,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            db,
            client,
            config,
            shutdown,
        }
    }

    /// Runs one outreach batch for a job. The returned partition is
    /// disjoint and exhaustive over `targets`, in input order per bucket.
    pub async fn dispatch(
        &self,
        job: &JobRow,
        targets: &[ContactRow],
        action: OutreachAction,
        template_content: &str,
    ) -> Result<DispatchOutcome, DispatchError> {
        let span = info_span!("dispatch",
            job_id = %job.id,
            action = action.describe(),
            targets = targets.len(),
        );

        async move {
        let mut outcome = DispatchOutcome::default();
        let mut remaining = self.remaining_quota(action)?;
        let mut seen: Vec<&str> = Vec::new();
        let mut attempted_any = false;
        let mut shutting_down = false;

        for target in targets {
            if shutting_down {
                outcome
                    .skipped
                    .push((target.profile_url.clone(), SkipReason::ShuttingDown));
                continue;
            }

            if target.profile_url.trim().is_empty() {
                outcome
                    .skipped
                    .push((target.profile_url.clone(), SkipReason::MissingIdentity));
                continue;
            }

            if seen.contains(&target.profile_url.as_str()) {
                outcome
                    .skipped
                    .push((target.profile_url.clone(), SkipReason::Duplicate));
                continue;
            }
            seen.push(target.profile_url.as_str());

            if self.already_actioned(target, action)? {
                outcome
                    .skipped
                    .push((target.profile_url.clone(), SkipReason::AlreadyActioned));
                continue;
            }

            if remaining == 0 {
                outcome
                    .skipped
                    .push((target.profile_url.clone(), SkipReason::QuotaExhausted));
                continue;
            }

            // Human-like pacing between successive sends.
            if attempted_any && !self.pace().await {
                outcome
                    .skipped
                    .push((target.profile_url.clone(), SkipReason::ShuttingDown));
                shutting_down = true;
                continue;
            }
            attempted_any = true;

            match self.send_one(job, target, action, template_content).await {
                Ok(true) => {
                    remaining -= 1;
                    outcome.sent.push(target.profile_url.clone());
                }
                Ok(false) => {
                    outcome.failed.push(target.profile_url.clone());
                }
                Err(SendError::Client(e)) if e.is_fatal() => {
                    return Err(DispatchError::Session(e));
                }
                Err(SendError::Client(e)) => {
                    log::error!("Error sending {} to {}: {}", action.describe(), target.name, e);
                    outcome.failed.push(target.profile_url.clone());
                }
                Err(SendError::Database(e)) => return Err(e.into()),
            }
        }

        self.log_summary(job, action, &outcome)?;
        Ok(outcome)
        }
        .instrument(span)
        .await
    }

    /// How many more actions of this kind today's quota allows.
    fn remaining_quota(&self, action: OutreachAction) -> Result<u32, DatabaseError> {
        let day_start = crate::db::day_start_str();
        self.db.with_conn(|conn| {
            let (used, limit) = match action {
                OutreachAction::Message => (
                    contact_repo::count_messages_since(conn, &day_start)?,
                    self.config.max_messages_per_day,
                ),
                OutreachAction::ConnectionRequest => (
                    contact_repo::count_requests_since(conn, &day_start)?,
                    self.config.max_connections_per_day,
                ),
            };
            Ok(limit.saturating_sub(used))
        })
    }

    fn already_actioned(
        &self,
        target: &ContactRow,
        action: OutreachAction,
    ) -> Result<bool, DatabaseError> {
        // Re-read the ledger rather than trusting the caller's snapshot.
        let current = self.db.with_conn(|conn| {
            contact_repo::find_by_id(conn, target.id)
        })?;
        let current = match current {
            Some(row) => row,
            None => return Ok(false),
        };
        Ok(match action {
            OutreachAction::Message => current.message_sent_at.is_some(),
            OutreachAction::ConnectionRequest => {
                current.is_connection || current.connection_requested_at.is_some()
            }
        })
    }

    /// Sends to one target and, on success, commits the ledger timestamp
    /// together with its audit entry.
    async fn send_one(
        &self,
        job: &JobRow,
        target: &ContactRow,
        action: OutreachAction,
        template_content: &str,
    ) -> Result<bool, SendError> {
        let text = self.render_for(target, job, template_content);

        let accepted = match action {
            OutreachAction::Message => {
                self.client
                    .send_message(&target.profile_url, &text)
                    .await
                    .map_err(SendError::Client)?
            }
            OutreachAction::ConnectionRequest => {
                // LinkedIn caps connection notes at 300 characters.
                let note: String = text.chars().take(300).collect();
                self.client
                    .send_connection_request(&target.profile_url, Some(&note))
                    .await
                    .map_err(SendError::Client)?
            }
        };

        if !accepted {
            return Ok(false);
        }

        let now = crate::db::now_str();
        let (kind, description) = match action {
            OutreachAction::Message => (
                ActivityKind::MessageSent,
                format!("Message sent to {}", target.name),
            ),
            OutreachAction::ConnectionRequest => (
                ActivityKind::ConnectionRequestSent,
                format!("Connection request sent to {}", target.name),
            ),
        };

        self.db
            .with_tx(|conn| {
                match action {
                    OutreachAction::Message => {
                        contact_repo::mark_message_sent(conn, target.id, &now, &text)?
                    }
                    OutreachAction::ConnectionRequest => {
                        contact_repo::mark_connection_requested(conn, target.id, &now)?
                    }
                }
                activity_repo::append(
                    conn,
                    kind,
                    &description,
                    &serde_json::json!({
                        "contact_id": target.id,
                        "name": target.name,
                        "profile_url": target.profile_url,
                    }),
                    Some(&job.id),
                    &now,
                )
            })
            .map_err(SendError::Database)?;

        Ok(true)
    }

    /// Renders the outgoing text for one target, translating the first
    /// name when the template is written in Hebrew.
    fn render_for(&self, target: &ContactRow, job: &JobRow, template_content: &str) -> String {
        let mut first = names::first_name(&target.name).unwrap_or("there").to_string();
        if template::requires_hebrew_names(template_content) {
            let translated = self
                .db
                .with_conn(|conn| names::translate(conn, &target.name))
                .ok()
                .flatten();
            if let Some(hebrew) = translated {
                first = hebrew;
            }
        }

        let company = job.company_name.as_deref().unwrap_or_default();
        let rendered = template::render(template_content, &first, company);
        if rendered.used_fallback {
            warn!(
                job_id = %job.id,
                "Template has unresolved placeholders, sending raw content"
            );
        }
        rendered.text
    }

    /// Sleeps a randomized interval between sends. Returns false when
    /// shutdown interrupted the wait.
    async fn pace(&self) -> bool {
        let delay_secs = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.config.min_action_delay_secs..=self.config.max_action_delay_secs)
        };

        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs_f64(delay_secs)) => true,
            _ = shutdown.wait() => false,
        }
    }

    /// One summary audit entry per batch, plus a quota entry when the
    /// batch was truncated.
    fn log_summary(
        &self,
        job: &JobRow,
        action: OutreachAction,
        outcome: &DispatchOutcome,
    ) -> Result<(), DatabaseError> {
        let now = crate::db::now_str();
        self.db.with_tx(|conn| {
            if outcome.truncated() {
                activity_repo::append(
                    conn,
                    ActivityKind::QuotaExhausted,
                    &format!("Daily {} quota exhausted", action.describe()),
                    &serde_json::json!({
                        "action": action.describe(),
                        "deferred": outcome
                            .skipped
                            .iter()
                            .filter(|(_, r)| *r == SkipReason::QuotaExhausted)
                            .count(),
                    }),
                    Some(&job.id),
                    &now,
                )?;
            }

            activity_repo::append(
                conn,
                ActivityKind::DispatchSummary,
                &format!(
                    "Dispatched {}s: {} sent, {} failed, {} skipped",
                    action.describe(),
                    outcome.sent.len(),
                    outcome.failed.len(),
                    outcome.skipped.len()
                ),
                &serde_json::json!({
                    "action": action.describe(),
                    "sent": outcome.sent.len(),
                    "failed": outcome.failed.len(),
                    "skipped": outcome.skipped.len(),
                    "skip_reasons": outcome.skip_counts(),
                }),
                Some(&job.id),
                &now,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{profile, ScriptedClient};
    use crate::db::job_repo::{self, JobRow};
    use crate::shutdown;

    const T0: &str = "2026-01-01T00:00:00+00:00";

    struct Fixture {
        db: Database,
        client: Arc<ScriptedClient>,
        dispatcher: Dispatcher,
        job: JobRow,
        _shutdown_tx: tokio::sync::watch::Sender<bool>,
    }

    fn fixture(config: Config) -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let job = JobRow {
            id: "j1".to_string(),
            url: "https://jobs.lever.co/acme-corp/123".to_string(),
            company_name: Some("Acme Corp".to_string()),
            job_title: None,
            status: "processing".to_string(),
            workflow_step: "message_connections".to_string(),
            error_message: None,
            pending_names: None,
            created_at: T0.to_string(),
            processed_at: None,
            last_reply_check_at: None,
        };
        db.with_conn(|conn| job_repo::insert(conn, &job)).unwrap();

        let client = Arc::new(ScriptedClient::new());
        let (shutdown_tx, shutdown) = shutdown::channel();
        let dispatcher = Dispatcher::new(db.clone(), client.clone(), config, shutdown);
        Fixture {
            db,
            client,
            dispatcher,
            job,
            _shutdown_tx: shutdown_tx,
        }
    }

    fn instant_config() -> Config {
        Config {
            min_action_delay_secs: 0.0,
            max_action_delay_secs: 0.0,
            ..Config::default()
        }
    }

    fn add_contact(fix: &Fixture, profile_url: &str, name: &str, is_connection: bool) -> ContactRow {
        fix.db
            .with_conn(|conn| {
                contact_repo::insert_or_get(
                    conn,
                    &contact_repo::NewContact {
                        profile_url,
                        name,
                        company: Some("Acme Corp"),
                        position: None,
                        is_connection,
                        job_id: "j1",
                        created_at: T0,
                    },
                )
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_partition_is_disjoint_and_exhaustive() {
        let fix = fixture(instant_config());
        let a = add_contact(&fix, "https://p/in/a", "Ada Lovelace", true);
        let b = add_contact(&fix, "https://p/in/b", "Grace Hopper", true);
        fix.client.fail_sends_to("https://p/in/b");

        // Duplicate of a plus one empty identity.
        let mut ghost = a.clone();
        ghost.id = 999;
        ghost.profile_url = String::new();
        let targets = vec![a.clone(), b, a, ghost];

        let outcome = fix
            .dispatcher
            .dispatch(&fix.job, &targets, OutreachAction::Message, "Hi {name}!")
            .await
            .unwrap();

        assert_eq!(outcome.total(), targets.len());
        assert_eq!(outcome.sent, vec!["https://p/in/a"]);
        assert_eq!(outcome.failed, vec!["https://p/in/b"]);
        assert_eq!(outcome.skipped.len(), 2);
        assert!(outcome
            .skipped
            .contains(&("https://p/in/a".to_string(), SkipReason::Duplicate)));
        assert!(outcome
            .skipped
            .contains(&(String::new(), SkipReason::MissingIdentity)));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let fix = fixture(instant_config());
        let outcome = fix
            .dispatcher
            .dispatch(&fix.job, &[], OutreachAction::Message, "Hi {name}!")
            .await
            .unwrap();
        assert_eq!(outcome.total(), 0);
        assert!(!outcome.truncated());
    }

    #[tokio::test]
    async fn test_already_actioned_is_skipped_not_resent() {
        let fix = fixture(instant_config());
        let a = add_contact(&fix, "https://p/in/a", "Ada Lovelace", true);

        let first = fix
            .dispatcher
            .dispatch(&fix.job, &[a.clone()], OutreachAction::Message, "Hi {name}!")
            .await
            .unwrap();
        assert_eq!(first.sent.len(), 1);

        // Re-dispatching the same (stale) snapshot is a no-op.
        let second = fix
            .dispatcher
            .dispatch(&fix.job, &[a], OutreachAction::Message, "Hi {name}!")
            .await
            .unwrap();
        assert!(second.sent.is_empty());
        assert_eq!(
            second.skipped,
            vec![("https://p/in/a".to_string(), SkipReason::AlreadyActioned)]
        );
        assert_eq!(fix.client.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_quota_truncates_batch() {
        let mut config = instant_config();
        config.max_messages_per_day = 2;
        let fix = fixture(config);

        let targets: Vec<ContactRow> = (0..3)
            .map(|i| {
                add_contact(
                    &fix,
                    &format!("https://p/in/{}", i),
                    &format!("Person {}", i),
                    true,
                )
            })
            .collect();

        let outcome = fix
            .dispatcher
            .dispatch(&fix.job, &targets, OutreachAction::Message, "Hi {name}!")
            .await
            .unwrap();

        assert_eq!(outcome.sent.len() + outcome.failed.len(), 2);
        assert_eq!(
            outcome.skipped,
            vec![("https://p/in/2".to_string(), SkipReason::QuotaExhausted)]
        );
        assert!(outcome.truncated());

        // The truncation is recorded with quota detail.
        fix.db
            .with_conn(|conn| {
                let entries = activity_repo::list_for_job(conn, "j1")?;
                assert!(entries.iter().any(|e| e.kind == "quota_exhausted"));
                Ok(())
            })
            .unwrap();
    }

    #[tokio::test]
    async fn test_quota_spans_batches_and_days() {
        let mut config = instant_config();
        config.max_messages_per_day = 1;
        let fix = fixture(config);
        let a = add_contact(&fix, "https://p/in/a", "Ada Lovelace", true);
        let b = add_contact(&fix, "https://p/in/b", "Grace Hopper", true);

        let first = fix
            .dispatcher
            .dispatch(&fix.job, &[a], OutreachAction::Message, "Hi {name}!")
            .await
            .unwrap();
        assert_eq!(first.sent.len(), 1);

        // Second batch the same day finds the quota spent.
        let second = fix
            .dispatcher
            .dispatch(&fix.job, &[b.clone()], OutreachAction::Message, "Hi {name}!")
            .await
            .unwrap();
        assert!(second.truncated());

        // Pretend the first send happened yesterday; the quota frees up.
        fix.db
            .with_conn(|conn| {
                conn.execute(
                    "UPDATE contacts SET message_sent_at = '2020-01-01T00:00:00+00:00'
                     WHERE profile_url = 'https://p/in/a'",
                    [],
                )?;
                Ok(())
            })
            .unwrap();

        let third = fix
            .dispatcher
            .dispatch(&fix.job, &[b], OutreachAction::Message, "Hi {name}!")
            .await
            .unwrap();
        assert_eq!(third.sent.len(), 1);
    }

    #[tokio::test]
    async fn test_connection_requests_skip_existing_connections() {
        let fix = fixture(instant_config());
        let friend = add_contact(&fix, "https://p/in/friend", "Old Friend", true);
        let stranger = add_contact(&fix, "https://p/in/new", "New Person", false);

        let outcome = fix
            .dispatcher
            .dispatch(
                &fix.job,
                &[friend, stranger],
                OutreachAction::ConnectionRequest,
                template::CONNECTION_NOTE_CONTENT,
            )
            .await
            .unwrap();

        assert_eq!(outcome.sent, vec!["https://p/in/new"]);
        assert_eq!(
            outcome.skipped,
            vec![(
                "https://p/in/friend".to_string(),
                SkipReason::AlreadyActioned
            )]
        );
    }

    #[tokio::test]
    async fn test_per_target_failure_continues_batch() {
        let fix = fixture(instant_config());
        let a = add_contact(&fix, "https://p/in/a", "Ada Lovelace", true);
        let b = add_contact(&fix, "https://p/in/b", "Grace Hopper", true);
        let c = add_contact(&fix, "https://p/in/c", "Katherine Johnson", true);
        fix.client.fail_sends_to("https://p/in/b");

        let outcome = fix
            .dispatcher
            .dispatch(&fix.job, &[a, b, c], OutreachAction::Message, "Hi {name}!")
            .await
            .unwrap();

        assert_eq!(outcome.sent, vec!["https://p/in/a", "https://p/in/c"]);
        assert_eq!(outcome.failed, vec!["https://p/in/b"]);
    }

    #[tokio::test]
    async fn test_session_failure_aborts_batch() {
        let fix = fixture(instant_config());
        let a = add_contact(&fix, "https://p/in/a", "Ada Lovelace", true);
        fix.client.break_session();

        let err = fix
            .dispatcher
            .dispatch(&fix.job, &[a], OutreachAction::Message, "Hi {name}!")
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Session(_)));
    }

    #[tokio::test]
    async fn test_message_records_content_and_summary() {
        let fix = fixture(instant_config());
        let a = add_contact(&fix, "https://p/in/a", "Ada Lovelace", true);

        fix.dispatcher
            .dispatch(
                &fix.job,
                &[a.clone()],
                OutreachAction::Message,
                "Hi {name}, {company} looks great!",
            )
            .await
            .unwrap();

        fix.db
            .with_conn(|conn| {
                let contact = contact_repo::find_by_id(conn, a.id)?.unwrap();
                assert_eq!(
                    contact.message_content.as_deref(),
                    Some("Hi Ada, Acme Corp looks great!")
                );
                assert!(contact.message_sent_at.is_some());

                let entries = activity_repo::list_for_job(conn, "j1")?;
                let kinds: Vec<&str> = entries.iter().map(|e| e.kind.as_str()).collect();
                assert!(kinds.contains(&"message_sent"));
                assert!(kinds.contains(&"dispatch_summary"));
                Ok(())
            })
            .unwrap();
    }

    #[tokio::test]
    async fn test_hebrew_template_uses_translated_name() {
        let fix = fixture(instant_config());
        let a = add_contact(&fix, "https://p/in/a", "Tomer Cohen", true);

        fix.dispatcher
            .dispatch(&fix.job, &[a], OutreachAction::Message, "היי {name}!")
            .await
            .unwrap();

        match &fix.client.sent()[0] {
            crate::client::mock::SentAction::Message { text, .. } => {
                assert_eq!(text, "היי תומר!");
            }
            other => panic!("expected message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shutdown_skips_remaining_targets() {
        let mut config = instant_config();
        // A long delay guarantees the second send is still pacing when
        // shutdown lands.
        config.min_action_delay_secs = 30.0;
        config.max_action_delay_secs = 30.0;

        let db = Database::open_in_memory().unwrap();
        let job = JobRow {
            id: "j1".to_string(),
            url: "https://example.com".to_string(),
            company_name: Some("Acme Corp".to_string()),
            job_title: None,
            status: "processing".to_string(),
            workflow_step: "message_connections".to_string(),
            error_message: None,
            pending_names: None,
            created_at: T0.to_string(),
            processed_at: None,
            last_reply_check_at: None,
        };
        db.with_conn(|conn| job_repo::insert(conn, &job)).unwrap();

        let client = Arc::new(ScriptedClient::new());
        let (shutdown_tx, shutdown_rx) = shutdown::channel();
        let dispatcher = Dispatcher::new(db.clone(), client.clone(), config, shutdown_rx);

        let targets: Vec<ContactRow> = (0..3)
            .map(|i| {
                db.with_conn(|conn| {
                    contact_repo::insert_or_get(
                        conn,
                        &contact_repo::NewContact {
                            profile_url: &format!("https://p/in/{}", i),
                            name: "Person",
                            company: None,
                            position: None,
                            is_connection: true,
                            job_id: "j1",
                            created_at: T0,
                        },
                    )
                })
                .unwrap()
            })
            .collect();

        let handle = tokio::spawn(async move {
            dispatcher
                .dispatch(&job, &targets, OutreachAction::Message, "Hi {name}!")
                .await
        });

        // Let the first send complete, then signal shutdown during pacing.
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown_tx.send(true).unwrap();

        let outcome = handle.await.unwrap().unwrap();
        assert!(outcome.interrupted());
        assert_eq!(outcome.sent.len(), 1);
        assert_eq!(
            outcome
                .skipped
                .iter()
                .filter(|(_, r)| *r == SkipReason::ShuttingDown)
                .count(),
            2
        );
        // The completed send is durably recorded.
        assert_eq!(client.sent().len(), 1);
    }
}
