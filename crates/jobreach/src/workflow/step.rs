//! Job status and workflow step types with the explicit transition table.
//!
//! Both enums are stored as strings in SQLite; conversions happen at the
//! storage boundary. Step transitions only move forward along the fixed
//! sequence, with one sanctioned exception: `message_connections` may
//! drop back into the `needs_hebrew_names` pause and resume from it.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    /// Waiting for the operator to supply a company name, selector rule
    /// or name translations.
    NeedsInput,
    /// The current phase finished; the job waits on external events
    /// (connection accepts, replies).
    Completed,
    Failed,
    /// A reply arrived and the outcome was positive.
    Done,
    /// A reply arrived and the outcome was negative.
    Rejected,
    Aborted,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::NeedsInput => "needs_input",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Done => "done",
            JobStatus::Rejected => "rejected",
            JobStatus::Aborted => "aborted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "processing" => Some(JobStatus::Processing),
            "needs_input" => Some(JobStatus::NeedsInput),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            "done" => Some(JobStatus::Done),
            "rejected" => Some(JobStatus::Rejected),
            "aborted" => Some(JobStatus::Aborted),
            _ => None,
        }
    }

    /// Statuses after which the job row is immutable. `completed` is not
    /// listed: it marks a phase boundary where external events (accepts,
    /// replies) may still finish the job.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Failed | JobStatus::Done | JobStatus::Rejected | JobStatus::Aborted
        )
    }
}

/// The fixed stage of outreach processing a job currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    CompanyExtraction,
    SearchConnections,
    NeedsHebrewNames,
    MessageConnections,
    SearchLinkedin,
    SendRequests,
    WaitingForAccept,
    WaitingForReply,
    Done,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::CompanyExtraction => "company_extraction",
            WorkflowStep::SearchConnections => "search_connections",
            WorkflowStep::NeedsHebrewNames => "needs_hebrew_names",
            WorkflowStep::MessageConnections => "message_connections",
            WorkflowStep::SearchLinkedin => "search_linkedin",
            WorkflowStep::SendRequests => "send_requests",
            WorkflowStep::WaitingForAccept => "waiting_for_accept",
            WorkflowStep::WaitingForReply => "waiting_for_reply",
            WorkflowStep::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "company_extraction" => Some(WorkflowStep::CompanyExtraction),
            "search_connections" => Some(WorkflowStep::SearchConnections),
            "needs_hebrew_names" => Some(WorkflowStep::NeedsHebrewNames),
            "message_connections" => Some(WorkflowStep::MessageConnections),
            "search_linkedin" => Some(WorkflowStep::SearchLinkedin),
            "send_requests" => Some(WorkflowStep::SendRequests),
            "waiting_for_accept" => Some(WorkflowStep::WaitingForAccept),
            "waiting_for_reply" => Some(WorkflowStep::WaitingForReply),
            "done" => Some(WorkflowStep::Done),
            _ => None,
        }
    }

    /// Position in the fixed step sequence.
    fn sequence_index(&self) -> u8 {
        match self {
            WorkflowStep::CompanyExtraction => 0,
            WorkflowStep::SearchConnections => 1,
            WorkflowStep::NeedsHebrewNames => 2,
            WorkflowStep::MessageConnections => 3,
            WorkflowStep::SearchLinkedin => 4,
            WorkflowStep::SendRequests => 5,
            WorkflowStep::WaitingForAccept => 6,
            WorkflowStep::WaitingForReply => 7,
            WorkflowStep::Done => 8,
        }
    }

    /// Whether moving from `self` to `next` is a legal transition:
    /// strictly forward along the sequence, or the pause round-trip
    /// between `message_connections` and `needs_hebrew_names`.
    pub fn allows(&self, next: WorkflowStep) -> bool {
        if *self == WorkflowStep::MessageConnections && next == WorkflowStep::NeedsHebrewNames {
            return true;
        }
        next.sequence_index() > self.sequence_index()
    }
}
