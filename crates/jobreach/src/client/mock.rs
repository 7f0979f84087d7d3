//! Scripted automation client for tests and development.
//!
//! Search results are configured up front; every outreach action is
//! recorded so assertions can check exactly what would have been sent.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AutomationClient, ClientError, Credentials, Profile};

/// One recorded outreach action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentAction {
    Message { profile_url: String, text: String },
    ConnectionRequest {
        profile_url: String,
        note: Option<String>,
    },
}

#[derive(Default)]
struct ScriptedState {
    connections_by_company: HashMap<String, Vec<Profile>>,
    people_by_keywords: HashMap<String, Vec<Profile>>,
    failing_profiles: Vec<String>,
    session_ok: bool,
    fatal_error: Option<fn() -> ClientError>,
    sent: Vec<SentAction>,
}

/// Deterministic [`AutomationClient`] driven by pre-loaded fixtures.
pub struct ScriptedClient {
    state: Mutex<ScriptedState>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ScriptedState {
                session_ok: true,
                ..Default::default()
            }),
        }
    }

    /// Registers existing connections returned for a company search.
    pub fn add_connections(&self, company: &str, profiles: Vec<Profile>) {
        let mut state = self.state.lock().unwrap();
        state
            .connections_by_company
            .entry(company.to_string())
            .or_default()
            .extend(profiles);
    }

    /// Registers people returned for a keyword search.
    pub fn add_people(&self, keywords: &str, profiles: Vec<Profile>) {
        let mut state = self.state.lock().unwrap();
        state
            .people_by_keywords
            .entry(keywords.to_string())
            .or_default()
            .extend(profiles);
    }

    /// Makes sends to a specific profile fail (action-level failure).
    pub fn fail_sends_to(&self, profile_url: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_profiles
            .push(profile_url.to_string());
    }

    /// Makes every call fail with a session-level error.
    pub fn break_session(&self) {
        let mut state = self.state.lock().unwrap();
        state.session_ok = false;
        state.fatal_error = Some(|| ClientError::SessionExpired);
    }

    /// Returns everything sent so far, in order.
    pub fn sent(&self) -> Vec<SentAction> {
        self.state.lock().unwrap().sent.clone()
    }

    fn ensure_session(&self) -> Result<(), ClientError> {
        let state = self.state.lock().unwrap();
        match state.fatal_error {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience constructor for fixture profiles.
pub fn profile(profile_url: &str, name: &str) -> Profile {
    Profile {
        profile_url: profile_url.to_string(),
        name: name.to_string(),
        headline: Some("Engineer".to_string()),
    }
}

#[async_trait]
impl AutomationClient for ScriptedClient {
    async fn check_session(&self) -> Result<bool, ClientError> {
        Ok(self.state.lock().unwrap().session_ok)
    }

    async fn login(&self, _credentials: &Credentials) -> Result<bool, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.session_ok = true;
        state.fatal_error = None;
        Ok(true)
    }

    async fn search_connections_by_company(
        &self,
        company: &str,
    ) -> Result<Vec<Profile>, ClientError> {
        self.ensure_session()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .connections_by_company
            .get(company)
            .cloned()
            .unwrap_or_default())
    }

    async fn search_people(
        &self,
        keywords: &str,
        limit: usize,
    ) -> Result<Vec<Profile>, ClientError> {
        self.ensure_session()?;
        let state = self.state.lock().unwrap();
        let mut people = state
            .people_by_keywords
            .get(keywords)
            .cloned()
            .unwrap_or_default();
        people.truncate(limit);
        Ok(people)
    }

    async fn send_connection_request(
        &self,
        profile_url: &str,
        note: Option<&str>,
    ) -> Result<bool, ClientError> {
        self.ensure_session()?;
        let mut state = self.state.lock().unwrap();
        if state.failing_profiles.iter().any(|p| p == profile_url) {
            return Err(ClientError::ActionFailed(format!(
                "connect button not found for {}",
                profile_url
            )));
        }
        state.sent.push(SentAction::ConnectionRequest {
            profile_url: profile_url.to_string(),
            note: note.map(str::to_string),
        });
        Ok(true)
    }

    async fn send_message(&self, profile_url: &str, text: &str) -> Result<bool, ClientError> {
        self.ensure_session()?;
        let mut state = self.state.lock().unwrap();
        if state.failing_profiles.iter().any(|p| p == profile_url) {
            return Err(ClientError::ActionFailed(format!(
                "message box did not open for {}",
                profile_url
            )));
        }
        state.sent.push(SentAction::Message {
            profile_url: profile_url.to_string(),
            text: text.to_string(),
        });
        Ok(true)
    }
}
