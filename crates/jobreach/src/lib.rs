pub mod client;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod names;
pub mod resolver;
pub mod selectors;
pub mod shutdown;
pub mod template;
pub mod workflow;

pub use client::{AutomationClient, ClientError, Credentials, Profile};
pub use config::{load_config, Config};
pub use dispatch::{DispatchOutcome, Dispatcher, OutreachAction, SkipReason};
pub use error::{ConfigError, JobreachError, Result};
pub use resolver::{CompanyResolver, Resolution};
pub use selectors::{NewSelector, SelectorStore, SiteType};
pub use workflow::runner::WorkflowRunner;
pub use workflow::{JobStatus, Orchestrator, PauseReason, StepOutcome, WorkflowError, WorkflowStep};
