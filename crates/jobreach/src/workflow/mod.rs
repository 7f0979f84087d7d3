//! Job workflow orchestrator.
//!
//! Drives a job through company resolution, contact discovery, the
//! user-input pauses and rate-limited outreach dispatch. Each call to
//! [`Orchestrator::advance`] performs one step and either advances,
//! pauses, waits or fails. Every transition commits the job update
//! together with one audit entry in a single transaction.

use std::sync::Arc;

use thiserror::Error;
use tracing::info_span;
use tracing::Instrument;
use uuid::Uuid;

use crate::client::AutomationClient;
use crate::config::Config;
use crate::db::activity_repo::{self, ActivityKind};
use crate::db::contact_repo::{self, NewContact};
use crate::db::job_repo::{self, JobRow};
use crate::db::template_repo::{self, TemplateRow};
use crate::db::{Database, DatabaseError};
use crate::dispatch::{DispatchError, DispatchOutcome, Dispatcher, OutreachAction};
use crate::resolver::{self, CompanyResolver, Resolution, ResolutionSource};
use crate::selectors::{NewSelector, SelectorError, SelectorStore, SiteType};
use crate::shutdown::Shutdown;
use crate::{names, template};

pub mod runner;
pub mod step;

pub use step::{JobStatus, WorkflowStep};

/// Errors from orchestrator operations.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Job {0} not found")]
    JobNotFound(String),

    #[error("Job {job_id} is not awaiting this input (status: {status})")]
    NotAwaitingInput { job_id: String, status: String },

    #[error("Job {job_id} is already terminal (status: {status})")]
    AlreadyTerminal { job_id: String, status: String },

    #[error("Job {job_id} has no company name at step {step}")]
    MissingCompany { job_id: String, step: String },

    #[error("Job {job_id} carries corrupt {field} value '{value}'")]
    CorruptState {
        job_id: String,
        field: &'static str,
        value: String,
    },

    #[error("Illegal workflow transition {from} -> {to}")]
    IllegalTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("No message template configured")]
    MissingTemplate,

    #[error("The supplied selector does not resolve the job URL")]
    SelectorMismatch { job_id: String },

    #[error("No contact with profile '{profile_url}' recorded for job {job_id}")]
    ContactNotFound {
        job_id: String,
        profile_url: String,
    },

    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// What one `advance` call did to the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step completed and the job moved to the given step.
    Advanced(WorkflowStep),
    /// The job paused for operator input.
    Paused(PauseReason),
    /// The job sits in an externally-driven waiting step; nothing to do.
    Waiting(WorkflowStep),
    /// The daily quota ran out mid-dispatch; the step is unchanged and
    /// resumes the next day.
    Truncated(WorkflowStep),
    /// Shutdown interrupted the step; the job is unchanged.
    Interrupted,
    /// The job is in a terminal status.
    Terminal(JobStatus),
}

/// Why a job paused for operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PauseReason {
    /// No selector rule resolves the URL's domain.
    UnknownCompany { domain: Option<String> },
    /// The template is in Hebrew and these first names have no
    /// translation yet.
    MissingHebrewNames(Vec<String>),
}

/// The state machine driving jobs from submission to done.
pub struct Orchestrator {
    db: Database,
    client: Arc<dyn AutomationClient>,
    config: Config,
    selectors: SelectorStore,
    resolver: CompanyResolver,
    shutdown: Shutdown,
}

impl Orchestrator {
    /// Builds the orchestrator and runs the idempotent startup seeding
    /// (built-in selectors, default template).
    pub fn new(
        db: Database,
        client: Arc<dyn AutomationClient>,
        config: Config,
        shutdown: Shutdown,
    ) -> Result<Self, WorkflowError> {
        let selectors = SelectorStore::new(db.clone());
        selectors.seed()?;
        template::seed_default(&db)?;

        let resolver = CompanyResolver::new(selectors.clone());
        Ok(Self {
            db,
            client,
            config,
            selectors,
            resolver,
            shutdown,
        })
    }

    // ─── Operations exposed to the API layer ────────────────────────────

    /// Creates a new job for a submitted URL.
    pub fn submit(&self, url: &str) -> Result<JobRow, WorkflowError> {
        let now = crate::db::now_str();
        let job = JobRow {
            id: Uuid::new_v4().to_string(),
            url: url.to_string(),
            company_name: None,
            job_title: None,
            status: JobStatus::Pending.as_str().to_string(),
            workflow_step: WorkflowStep::CompanyExtraction.as_str().to_string(),
            error_message: None,
            pending_names: None,
            created_at: now.clone(),
            processed_at: None,
            last_reply_check_at: None,
        };

        self.db.with_tx(|conn| {
            job_repo::insert(conn, &job)?;
            activity_repo::append(
                conn,
                ActivityKind::JobSubmitted,
                "New job submitted",
                &serde_json::json!({ "url": url }),
                Some(&job.id),
                &now,
            )
        })?;

        log::info!("Job {} submitted for {}", job.id, url);
        Ok(job)
    }

    /// Performs one workflow step. Idempotent: invoking it on a waiting
    /// or terminal job is a no-op.
    pub async fn advance(&self, job_id: &str) -> Result<StepOutcome, WorkflowError> {
        let job = self.load(job_id)?;
        let status = self.status_of(&job)?;
        let step = self.step_of(&job)?;

        let span = info_span!("advance", job_id = %job.id, step = step.as_str());

        async move {
            if status.is_terminal() {
                return Ok(StepOutcome::Terminal(status));
            }
            if self.shutdown.is_shutdown() {
                return Ok(StepOutcome::Interrupted);
            }

            match step {
                WorkflowStep::CompanyExtraction => self.step_company_extraction(job),
                WorkflowStep::SearchConnections => self.step_search_connections(job).await,
                WorkflowStep::NeedsHebrewNames => self.step_check_names(job),
                WorkflowStep::MessageConnections => self.step_message_connections(job).await,
                WorkflowStep::SearchLinkedin => self.step_search_linkedin(job).await,
                WorkflowStep::SendRequests => self.step_send_requests(job).await,
                WorkflowStep::WaitingForAccept | WorkflowStep::WaitingForReply => {
                    Ok(StepOutcome::Waiting(step))
                }
                WorkflowStep::Done => Ok(StepOutcome::Terminal(status)),
            }
        }
        .instrument(span)
        .await
    }

    /// Operator answer to an unknown-company pause: the company name,
    /// plus how the domain should be learned for future jobs.
    pub fn supply_company(
        &self,
        job_id: &str,
        company_name: &str,
        site_type: SiteType,
        platform_name: Option<&str>,
    ) -> Result<(), WorkflowError> {
        let mut job = self.require_paused_at(job_id, WorkflowStep::CompanyExtraction)?;

        let domain = resolver::extract_domain(&job.url);
        let mut learned_domain = None;
        if let Some(domain) = &domain {
            let url_pattern = match site_type {
                SiteType::Platform => {
                    crate::selectors::generate_url_pattern(&job.url, company_name)
                }
                SiteType::Company => None,
            };
            // A platform answer without a derivable pattern cannot
            // resolve future URLs; remember the domain as a direct
            // company site instead.
            let effective_type = match (site_type, &url_pattern) {
                (SiteType::Platform, None) => SiteType::Company,
                (t, _) => t,
            };
            let rule = NewSelector {
                site_type: effective_type,
                company_name: Some(company_name.to_string()),
                platform_name: platform_name.map(str::to_string),
                url_pattern,
                example_url: Some(job.url.clone()),
                example_company: Some(company_name.to_string()),
            };
            // Operator-supplied input is an explicit update.
            self.selectors.update(domain, &rule)?;
            learned_domain = Some(domain.clone());
        }

        let now = crate::db::now_str();
        job.company_name = Some(company_name.to_string());
        job.status = JobStatus::Pending.as_str().to_string();
        self.set_step(&mut job, WorkflowStep::SearchConnections)?;

        self.db.with_tx(|conn| {
            job_repo::update(conn, &job)?;
            if let Some(domain) = &learned_domain {
                activity_repo::append(
                    conn,
                    ActivityKind::SelectorLearned,
                    &format!("Learned rule for domain: {}", domain),
                    &serde_json::json!({ "domain": domain, "site_type": site_type.as_str() }),
                    Some(&job.id),
                    &now,
                )?;
            }
            activity_repo::append(
                conn,
                ActivityKind::CompanyExtracted,
                &format!("Company provided by user: {}", company_name),
                &serde_json::json!({
                    "company": company_name,
                    "domain": domain,
                    "user_provided": true,
                }),
                Some(&job.id),
                &now,
            )
        })?;

        log::info!("Job {} resumed with user-provided company: {}", job.id, company_name);
        Ok(())
    }

    /// Operator answer to an unknown-company pause: a full selector rule
    /// for the domain. The rule must actually resolve the job URL.
    pub fn supply_selector(&self, job_id: &str, rule: &NewSelector) -> Result<(), WorkflowError> {
        let mut job = self.require_paused_at(job_id, WorkflowStep::CompanyExtraction)?;

        let domain = resolver::extract_domain(&job.url).ok_or(WorkflowError::SelectorMismatch {
            job_id: job.id.clone(),
        })?;
        self.selectors.update(&domain, rule)?;

        let resolution = self.resolver.resolve(&job.url)?;
        let company = match resolution {
            Resolution::Resolved { company, .. } => company,
            Resolution::NeedsInput { .. } => {
                // The rule was stored but does not match this URL; the
                // job stays paused and the caller gets the mismatch.
                return Err(WorkflowError::SelectorMismatch {
                    job_id: job.id.clone(),
                });
            }
        };

        let now = crate::db::now_str();
        job.company_name = Some(company.clone());
        job.status = JobStatus::Pending.as_str().to_string();
        self.set_step(&mut job, WorkflowStep::SearchConnections)?;

        self.db.with_tx(|conn| {
            job_repo::update(conn, &job)?;
            activity_repo::append(
                conn,
                ActivityKind::SelectorLearned,
                &format!("Learned rule for domain: {}", domain),
                &serde_json::json!({ "domain": domain, "site_type": rule.site_type.as_str() }),
                Some(&job.id),
                &now,
            )?;
            activity_repo::append(
                conn,
                ActivityKind::CompanyExtracted,
                &format!("Company extracted with supplied rule: {}", company),
                &serde_json::json!({ "company": company, "domain": domain, "user_provided": true }),
                Some(&job.id),
                &now,
            )
        })?;
        Ok(())
    }

    /// Operator-supplied name translations for a Hebrew-names pause.
    /// Returns the names still missing; the job resumes when none remain.
    pub fn supply_hebrew_names(
        &self,
        job_id: &str,
        mappings: &[(String, String)],
    ) -> Result<Vec<String>, WorkflowError> {
        let mut job = self.require_paused_at(job_id, WorkflowStep::NeedsHebrewNames)?;

        for (english, hebrew) in mappings {
            names::save(&self.db, english, hebrew)?;
        }

        let targets = self
            .db
            .with_conn(|conn| contact_repo::list_unmessaged_connections(conn, &job.id))?;
        let target_names: Vec<String> = targets.iter().map(|c| c.name.clone()).collect();
        let missing = self
            .db
            .with_conn(|conn| names::missing(conn, &target_names))?;

        let now = crate::db::now_str();
        if missing.is_empty() {
            job.pending_names = None;
            job.status = JobStatus::Pending.as_str().to_string();
            self.set_step(&mut job, WorkflowStep::MessageConnections)?;
            self.db.with_tx(|conn| {
                job_repo::update(conn, &job)?;
                activity_repo::append(
                    conn,
                    ActivityKind::WorkflowResumed,
                    "All name translations supplied, resuming messaging",
                    &serde_json::json!({ "supplied": mappings.len() }),
                    Some(&job.id),
                    &now,
                )
            })?;
        } else {
            job.pending_names = Some(serde_json::to_string(&missing).unwrap_or_default());
            self.db.with_conn(|conn| job_repo::update(conn, &job))?;
        }

        Ok(missing)
    }

    /// Operator-requested abort. Terminal; the step stays where it was.
    pub fn abort(&self, job_id: &str) -> Result<(), WorkflowError> {
        let mut job = self.load(job_id)?;
        let status = self.status_of(&job)?;
        if status.is_terminal() {
            return Err(WorkflowError::AlreadyTerminal {
                job_id: job.id.clone(),
                status: job.status.clone(),
            });
        }

        let now = crate::db::now_str();
        job.status = JobStatus::Aborted.as_str().to_string();
        job.error_message = None;

        self.db.with_tx(|conn| {
            job_repo::update(conn, &job)?;
            activity_repo::append(
                conn,
                ActivityKind::JobAborted,
                "Workflow aborted by user",
                &serde_json::json!({ "step": job.workflow_step }),
                Some(&job.id),
                &now,
            )
        })?;

        log::info!("Job {} aborted at step {}", job.id, job.workflow_step);
        Ok(())
    }

    /// External event: a connection request for this job was accepted.
    pub fn record_acceptance(&self, job_id: &str, profile_url: &str) -> Result<(), WorkflowError> {
        let mut job = self.load(job_id)?;
        let step = self.step_of(&job)?;
        if step != WorkflowStep::WaitingForAccept {
            return Err(WorkflowError::NotAwaitingInput {
                job_id: job.id.clone(),
                status: job.status.clone(),
            });
        }

        let contact = self
            .db
            .with_conn(|conn| contact_repo::find_by_profile(conn, profile_url, &job.id))?
            .ok_or_else(|| WorkflowError::ContactNotFound {
                job_id: job.id.clone(),
                profile_url: profile_url.to_string(),
            })?;

        let now = crate::db::now_str();
        job.status = JobStatus::Completed.as_str().to_string();
        self.set_step(&mut job, WorkflowStep::WaitingForReply)?;

        self.db.with_tx(|conn| {
            contact_repo::mark_connected(conn, contact.id)?;
            job_repo::update(conn, &job)?;
            activity_repo::append(
                conn,
                ActivityKind::ConnectionFound,
                &format!("Connection accepted by {}", contact.name),
                &serde_json::json!({ "contact_id": contact.id, "name": contact.name }),
                Some(&job.id),
                &now,
            )
        })?;
        Ok(())
    }

    /// External event: a contacted person replied. Finishes the job with
    /// status `done` (positive) or `rejected` (negative).
    pub fn record_reply(
        &self,
        job_id: &str,
        profile_url: &str,
        positive: bool,
    ) -> Result<(), WorkflowError> {
        let mut job = self.load(job_id)?;
        let step = self.step_of(&job)?;
        if !matches!(
            step,
            WorkflowStep::WaitingForAccept | WorkflowStep::WaitingForReply
        ) {
            return Err(WorkflowError::NotAwaitingInput {
                job_id: job.id.clone(),
                status: job.status.clone(),
            });
        }

        let contact = self
            .db
            .with_conn(|conn| contact_repo::find_by_profile(conn, profile_url, &job.id))?
            .ok_or_else(|| WorkflowError::ContactNotFound {
                job_id: job.id.clone(),
                profile_url: profile_url.to_string(),
            })?;

        let now = crate::db::now_str();
        let final_status = if positive {
            JobStatus::Done
        } else {
            JobStatus::Rejected
        };
        job.status = final_status.as_str().to_string();
        job.processed_at = Some(now.clone());
        job.last_reply_check_at = Some(now.clone());
        self.set_step(&mut job, WorkflowStep::Done)?;

        self.db.with_tx(|conn| {
            contact_repo::mark_reply_received(conn, contact.id, &now)?;
            job_repo::update(conn, &job)?;
            activity_repo::append(
                conn,
                ActivityKind::ReplyReceived,
                &format!("Received reply from {}", contact.name),
                &serde_json::json!({
                    "contact_id": contact.id,
                    "name": contact.name,
                    "positive": positive,
                }),
                Some(&job.id),
                &now,
            )
        })?;

        log::info!(
            "Job {} finished with status {} after reply from {}",
            job.id,
            final_status.as_str(),
            contact.name
        );
        Ok(())
    }

    /// Fetches a job row.
    pub fn job(&self, job_id: &str) -> Result<JobRow, WorkflowError> {
        self.load(job_id)
    }

    // ─── Step handlers ──────────────────────────────────────────────────

    fn step_company_extraction(&self, mut job: JobRow) -> Result<StepOutcome, WorkflowError> {
        let was_paused = self.status_of(&job)? == JobStatus::NeedsInput;

        match self.resolver.resolve(&job.url)? {
            Resolution::Resolved { company, source } => {
                let now = crate::db::now_str();
                let source_label = match &source {
                    ResolutionSource::KnownCompany => "known_site",
                    ResolutionSource::PlatformPattern { .. } => "platform_pattern",
                };
                job.company_name = Some(company.clone());
                job.status = JobStatus::Processing.as_str().to_string();
                self.set_step(&mut job, WorkflowStep::SearchConnections)?;

                self.db.with_tx(|conn| {
                    job_repo::update(conn, &job)?;
                    activity_repo::append(
                        conn,
                        ActivityKind::CompanyExtracted,
                        &format!("Company extracted: {}", company),
                        &serde_json::json!({ "company": company, "source": source_label }),
                        Some(&job.id),
                        &now,
                    )
                })?;
                Ok(StepOutcome::Advanced(WorkflowStep::SearchConnections))
            }
            Resolution::NeedsInput { domain, url } => {
                if !was_paused {
                    let now = crate::db::now_str();
                    job.status = JobStatus::NeedsInput.as_str().to_string();
                    self.db.with_tx(|conn| {
                        job_repo::update(conn, &job)?;
                        activity_repo::append(
                            conn,
                            ActivityKind::CompanyInputNeeded,
                            &format!(
                                "Unknown job site: {}. User input needed.",
                                domain.as_deref().unwrap_or("<no domain>")
                            ),
                            &serde_json::json!({ "domain": domain, "url": url }),
                            Some(&job.id),
                            &now,
                        )
                    })?;
                }
                Ok(StepOutcome::Paused(PauseReason::UnknownCompany { domain }))
            }
        }
    }

    async fn step_search_connections(&self, mut job: JobRow) -> Result<StepOutcome, WorkflowError> {
        let company = self.company_of(&job)?;

        if let Err(reason) = self.ensure_session().await {
            return self.fail_job(job, &reason);
        }

        let profiles = match self.client.search_connections_by_company(&company).await {
            Ok(profiles) => profiles,
            Err(e) => return self.fail_job(job, &format!("Connection search failed: {}", e)),
        };

        let now = crate::db::now_str();
        let found = profiles.len();
        let next = if found > 0 {
            WorkflowStep::MessageConnections
        } else {
            WorkflowStep::SearchLinkedin
        };

        job.status = JobStatus::Processing.as_str().to_string();
        self.set_step(&mut job, next)?;

        self.db.with_tx(|conn| {
            for profile in &profiles {
                if profile.profile_url.trim().is_empty() {
                    continue;
                }
                let existing =
                    contact_repo::find_by_profile(conn, &profile.profile_url, &job.id)?;
                if existing.is_none() {
                    let contact = contact_repo::insert_or_get(
                        conn,
                        &NewContact {
                            profile_url: &profile.profile_url,
                            name: &profile.name,
                            company: Some(&company),
                            position: profile.headline.as_deref(),
                            is_connection: true,
                            job_id: &job.id,
                            created_at: &now,
                        },
                    )?;
                    activity_repo::append(
                        conn,
                        ActivityKind::ConnectionFound,
                        &format!("Found connection: {}", contact.name),
                        &serde_json::json!({ "contact_id": contact.id, "name": contact.name }),
                        Some(&job.id),
                        &now,
                    )?;
                }
            }

            job_repo::update(conn, &job)?;
            activity_repo::append(
                conn,
                ActivityKind::ConnectionSearch,
                &format!("Searched connections at {}", company),
                &serde_json::json!({ "company": company, "found": found }),
                Some(&job.id),
                &now,
            )
        })?;

        Ok(StepOutcome::Advanced(next))
    }

    /// Re-checks the name store while paused; resumes once every
    /// discovered name translates.
    fn step_check_names(&self, mut job: JobRow) -> Result<StepOutcome, WorkflowError> {
        let template = self.active_template()?;
        let missing = self.missing_names_for(&job, &template)?;

        if missing.is_empty() {
            let now = crate::db::now_str();
            job.pending_names = None;
            job.status = JobStatus::Pending.as_str().to_string();
            self.set_step(&mut job, WorkflowStep::MessageConnections)?;
            self.db.with_tx(|conn| {
                job_repo::update(conn, &job)?;
                activity_repo::append(
                    conn,
                    ActivityKind::WorkflowResumed,
                    "Name translations complete, resuming messaging",
                    &serde_json::json!({}),
                    Some(&job.id),
                    &now,
                )
            })?;
            return Ok(StepOutcome::Advanced(WorkflowStep::MessageConnections));
        }

        if self.status_of(&job)? != JobStatus::NeedsInput {
            job.status = JobStatus::NeedsInput.as_str().to_string();
            job.pending_names = Some(serde_json::to_string(&missing).unwrap_or_default());
            self.db.with_conn(|conn| job_repo::update(conn, &job))?;
        }
        Ok(StepOutcome::Paused(PauseReason::MissingHebrewNames(missing)))
    }

    async fn step_message_connections(&self, mut job: JobRow) -> Result<StepOutcome, WorkflowError> {
        let template = self.active_template()?;

        // Pause only when the template actually needs Hebrew names.
        let missing = self.missing_names_for(&job, &template)?;
        if !missing.is_empty() {
            let now = crate::db::now_str();
            job.status = JobStatus::NeedsInput.as_str().to_string();
            job.pending_names = Some(serde_json::to_string(&missing).unwrap_or_default());
            self.set_step(&mut job, WorkflowStep::NeedsHebrewNames)?;
            self.db.with_tx(|conn| {
                job_repo::update(conn, &job)?;
                activity_repo::append(
                    conn,
                    ActivityKind::CompanyInputNeeded,
                    &format!("Hebrew name translation needed for: {}", missing.join(", ")),
                    &serde_json::json!({ "missing_names": missing }),
                    Some(&job.id),
                    &now,
                )
            })?;
            return Ok(StepOutcome::Paused(PauseReason::MissingHebrewNames(missing)));
        }

        if let Err(reason) = self.ensure_session().await {
            return self.fail_job(job, &reason);
        }

        let targets = self
            .db
            .with_conn(|conn| contact_repo::list_unmessaged_connections(conn, &job.id))?;

        let outcome = match self
            .dispatcher()
            .dispatch(&job, &targets, OutreachAction::Message, &template.content)
            .await
        {
            Ok(outcome) => outcome,
            Err(DispatchError::Session(e)) => {
                return self.fail_job(job, &format!("Automation session failed: {}", e));
            }
            Err(DispatchError::Database(e)) => return Err(e.into()),
        };

        if outcome.interrupted() {
            return Ok(StepOutcome::Interrupted);
        }
        if outcome.truncated() {
            return Ok(StepOutcome::Truncated(WorkflowStep::MessageConnections));
        }

        self.advance_after_dispatch(
            &mut job,
            WorkflowStep::SearchLinkedin,
            JobStatus::Processing,
            "Messaging finished, continuing to platform search",
            &outcome,
        )?;
        Ok(StepOutcome::Advanced(WorkflowStep::SearchLinkedin))
    }

    async fn step_search_linkedin(&self, mut job: JobRow) -> Result<StepOutcome, WorkflowError> {
        let company = self.company_of(&job)?;

        if let Err(reason) = self.ensure_session().await {
            return self.fail_job(job, &reason);
        }

        let profiles = match self
            .client
            .search_people(&company, self.config.search_result_limit)
            .await
        {
            Ok(profiles) => profiles,
            Err(e) => return self.fail_job(job, &format!("People search failed: {}", e)),
        };

        let now = crate::db::now_str();
        let found = profiles.len();

        job.status = JobStatus::Processing.as_str().to_string();
        self.set_step(&mut job, WorkflowStep::SendRequests)?;

        self.db.with_tx(|conn| {
            for profile in &profiles {
                if profile.profile_url.trim().is_empty() {
                    continue;
                }
                contact_repo::insert_or_get(
                    conn,
                    &NewContact {
                        profile_url: &profile.profile_url,
                        name: &profile.name,
                        company: Some(&company),
                        position: profile.headline.as_deref(),
                        is_connection: false,
                        job_id: &job.id,
                        created_at: &now,
                    },
                )?;
            }

            job_repo::update(conn, &job)?;
            activity_repo::append(
                conn,
                ActivityKind::LinkedinSearch,
                &format!("Searched LinkedIn for people at {}", company),
                &serde_json::json!({ "company": company, "results": found }),
                Some(&job.id),
                &now,
            )
        })?;

        Ok(StepOutcome::Advanced(WorkflowStep::SendRequests))
    }

    async fn step_send_requests(&self, mut job: JobRow) -> Result<StepOutcome, WorkflowError> {
        if let Err(reason) = self.ensure_session().await {
            return self.fail_job(job, &reason);
        }

        let targets = self
            .db
            .with_conn(|conn| contact_repo::list_unrequested(conn, &job.id))?;

        let outcome = match self
            .dispatcher()
            .dispatch(
                &job,
                &targets,
                OutreachAction::ConnectionRequest,
                template::CONNECTION_NOTE_CONTENT,
            )
            .await
        {
            Ok(outcome) => outcome,
            Err(DispatchError::Session(e)) => {
                return self.fail_job(job, &format!("Automation session failed: {}", e));
            }
            Err(DispatchError::Database(e)) => return Err(e.into()),
        };

        if outcome.interrupted() {
            return Ok(StepOutcome::Interrupted);
        }
        if outcome.truncated() {
            return Ok(StepOutcome::Truncated(WorkflowStep::SendRequests));
        }

        // Nothing was ever sent for this job: nobody reachable.
        let total_outreach = self
            .db
            .with_conn(|conn| contact_repo::count_outreach_for_job(conn, &job.id))?;
        if total_outreach == 0 {
            let company = self.company_of(&job)?;
            return self.fail_job(
                job,
                &format!("Could not reach any people at '{}' on LinkedIn", company),
            );
        }

        job.processed_at = Some(crate::db::now_str());
        self.advance_after_dispatch(
            &mut job,
            WorkflowStep::WaitingForAccept,
            JobStatus::Completed,
            "Connection requests dispatched, waiting for accepts",
            &outcome,
        )?;
        Ok(StepOutcome::Advanced(WorkflowStep::WaitingForAccept))
    }

    // ─── Internals ──────────────────────────────────────────────────────

    /// The automation session must be authenticated before any step that
    /// drives it. A lost session fails the step; there is no blind retry.
    async fn ensure_session(&self) -> Result<(), String> {
        match self.client.check_session().await {
            Ok(true) => Ok(()),
            Ok(false) => Err("LinkedIn session is not authenticated".to_string()),
            Err(e) => Err(format!("Automation client unavailable: {}", e)),
        }
    }

    fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            self.db.clone(),
            self.client.clone(),
            self.config.clone(),
            self.shutdown.clone(),
        )
    }

    fn load(&self, job_id: &str) -> Result<JobRow, WorkflowError> {
        self.db
            .with_conn(|conn| job_repo::find_by_id(conn, job_id))?
            .ok_or_else(|| WorkflowError::JobNotFound(job_id.to_string()))
    }

    fn status_of(&self, job: &JobRow) -> Result<JobStatus, WorkflowError> {
        JobStatus::parse(&job.status).ok_or_else(|| WorkflowError::CorruptState {
            job_id: job.id.clone(),
            field: "status",
            value: job.status.clone(),
        })
    }

    fn step_of(&self, job: &JobRow) -> Result<WorkflowStep, WorkflowError> {
        WorkflowStep::parse(&job.workflow_step).ok_or_else(|| WorkflowError::CorruptState {
            job_id: job.id.clone(),
            field: "workflow_step",
            value: job.workflow_step.clone(),
        })
    }

    fn company_of(&self, job: &JobRow) -> Result<String, WorkflowError> {
        job.company_name
            .clone()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| WorkflowError::MissingCompany {
                job_id: job.id.clone(),
                step: job.workflow_step.clone(),
            })
    }

    /// Applies a step transition after validating it against the table.
    fn set_step(&self, job: &mut JobRow, to: WorkflowStep) -> Result<(), WorkflowError> {
        let from = self.step_of(job)?;
        if !from.allows(to) {
            return Err(WorkflowError::IllegalTransition {
                from: from.as_str(),
                to: to.as_str(),
            });
        }
        job.workflow_step = to.as_str().to_string();
        Ok(())
    }

    fn require_paused_at(
        &self,
        job_id: &str,
        expected_step: WorkflowStep,
    ) -> Result<JobRow, WorkflowError> {
        let job = self.load(job_id)?;
        let status = self.status_of(&job)?;
        let step = self.step_of(&job)?;
        if status != JobStatus::NeedsInput || step != expected_step {
            return Err(WorkflowError::NotAwaitingInput {
                job_id: job.id.clone(),
                status: job.status.clone(),
            });
        }
        Ok(job)
    }

    fn active_template(&self) -> Result<TemplateRow, WorkflowError> {
        self.db
            .with_conn(template_repo::find_default)?
            .ok_or(WorkflowError::MissingTemplate)
    }

    /// Names still missing a translation for this job's pending message
    /// targets; empty when the template does not need Hebrew names.
    fn missing_names_for(
        &self,
        job: &JobRow,
        template: &TemplateRow,
    ) -> Result<Vec<String>, WorkflowError> {
        if !template::requires_hebrew_names(&template.content) {
            return Ok(Vec::new());
        }
        let targets = self
            .db
            .with_conn(|conn| contact_repo::list_unmessaged_connections(conn, &job.id))?;
        let target_names: Vec<String> = targets.iter().map(|c| c.name.clone()).collect();
        Ok(self
            .db
            .with_conn(|conn| names::missing(conn, &target_names))?)
    }

    /// Commits a post-dispatch step transition together with its audit
    /// entry.
    fn advance_after_dispatch(
        &self,
        job: &mut JobRow,
        to: WorkflowStep,
        status: JobStatus,
        description: &str,
        outcome: &DispatchOutcome,
    ) -> Result<(), WorkflowError> {
        let now = crate::db::now_str();
        job.status = status.as_str().to_string();
        self.set_step(job, to)?;

        self.db.with_tx(|conn| {
            job_repo::update(conn, job)?;
            activity_repo::append(
                conn,
                ActivityKind::StepAdvanced,
                description,
                &serde_json::json!({
                    "to": to.as_str(),
                    "sent": outcome.sent.len(),
                    "failed": outcome.failed.len(),
                    "skipped": outcome.skipped.len(),
                }),
                Some(&job.id),
                &now,
            )
        })?;
        Ok(())
    }

    /// Marks a job failed with its cause. Failed jobs never auto-retry.
    fn fail_job(&self, mut job: JobRow, message: &str) -> Result<StepOutcome, WorkflowError> {
        let now = crate::db::now_str();
        job.status = JobStatus::Failed.as_str().to_string();
        job.error_message = Some(message.to_string());

        self.db.with_tx(|conn| {
            job_repo::update(conn, &job)?;
            activity_repo::append(
                conn,
                ActivityKind::Error,
                &format!("Workflow failed: {}", message),
                &serde_json::json!({ "error": message, "step": job.workflow_step }),
                Some(&job.id),
                &now,
            )
        })?;

        log::error!("Job {} failed: {}", job.id, message);
        Ok(StepOutcome::Terminal(JobStatus::Failed))
    }
}
