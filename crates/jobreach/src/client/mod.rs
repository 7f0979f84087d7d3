//! Automation-client capability interface.
//!
//! The orchestrator and dispatcher reach LinkedIn only through this
//! trait. The real implementation (browser session, login, scraping,
//! transport) lives outside this crate; [`mock::ScriptedClient`]
//! provides a deterministic stand-in for tests and development.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

pub mod mock;

/// A person surfaced by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Platform identity. Contacts are deduplicated on this per job.
    pub profile_url: String,
    pub name: String,
    pub headline: Option<String>,
}

/// Login credentials for the single automation identity.
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Failures surfaced by the automation client, already sorted into the
/// levels the workflow cares about.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The authenticated session is gone. Fatal to the current step;
    /// retrying blind against the platform is unsafe.
    #[error("LinkedIn session expired or not authenticated")]
    SessionExpired,

    /// The client (or the browser behind it) cannot be reached at all.
    #[error("Automation client unreachable: {0}")]
    Unreachable(String),

    /// One action against one target failed. The batch continues.
    #[error("Action failed: {0}")]
    ActionFailed(String),
}

impl ClientError {
    /// Session-level failures abort the step; per-action failures only
    /// mark their target.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClientError::SessionExpired | ClientError::Unreachable(_))
    }
}

/// The capability surface of the LinkedIn automation session.
///
/// One authenticated identity drives one browser session, so callers
/// must serialize these calls; the workflow runner guarantees that.
#[async_trait]
pub trait AutomationClient: Send + Sync {
    /// Returns whether the stored session is still authenticated.
    async fn check_session(&self) -> Result<bool, ClientError>;

    /// Logs in with the given credentials.
    async fn login(&self, credentials: &Credentials) -> Result<bool, ClientError>;

    /// Searches the operator's existing connections for people at a company.
    async fn search_connections_by_company(
        &self,
        company: &str,
    ) -> Result<Vec<Profile>, ClientError>;

    /// Searches the platform for people matching the keywords.
    async fn search_people(&self, keywords: &str, limit: usize)
        -> Result<Vec<Profile>, ClientError>;

    /// Sends a connection request, optionally with a note. Returns
    /// whether the platform accepted the action.
    async fn send_connection_request(
        &self,
        profile_url: &str,
        note: Option<&str>,
    ) -> Result<bool, ClientError>;

    /// Sends a direct message to an existing connection.
    async fn send_message(&self, profile_url: &str, text: &str) -> Result<bool, ClientError>;
}
