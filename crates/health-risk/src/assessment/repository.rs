use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{CompanyId, QuestionId, ReportId, UserId};
use super::questions::Question;
use super::report::HealthReport;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ReportRepository: Send + Sync {
    fn insert(&self, report: HealthReport) -> Result<HealthReport, RepositoryError>;
    fn fetch(&self, id: &ReportId) -> Result<Option<HealthReport>, RepositoryError>;
    fn for_company(&self, company_id: &CompanyId) -> Result<Vec<HealthReport>, RepositoryError>;
    fn for_user(&self, user_id: &UserId) -> Result<Vec<HealthReport>, RepositoryError>;
}

/// Questionnaire storage. Retired questions stay readable so old ids still resolve.
pub trait QuestionCatalog: Send + Sync {
    fn question(&self, id: QuestionId) -> Result<Option<Question>, RepositoryError>;
    fn active_questions(&self) -> Result<Vec<Question>, RepositoryError>;
    /// Insert or replace the question stored under `question.id`.
    fn upsert(&self, question: Question) -> Result<Question, RepositoryError>;
    /// Mark a question inactive; `NotFound` when the id is unknown.
    fn deactivate(&self, id: QuestionId) -> Result<Question, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for report delivery (e-mail adapters and the like).
pub trait ReportNotifier: Send + Sync {
    fn notify(&self, notification: ReportNotification) -> Result<(), NotifyError>;
}

/// Plain payload handed to notifiers; formatting is the adapter's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportNotification {
    pub template: String,
    pub recipient: String,
    pub report_id: ReportId,
    pub details: BTreeMap<String, String>,
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
