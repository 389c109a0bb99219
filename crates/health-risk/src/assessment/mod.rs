//! Questionnaire intake, scoring, and report storage for employee health assessments.
//!
//! The scoring engine is a pure function over resolved answers. Everything around it
//! (question lookup, validation, persistence, notification) sits behind the traits in
//! [`repository`] so the service can be exercised with in-memory adapters.

pub mod domain;
pub mod questions;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub(crate) mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    AnswerResponse, AssessmentSubmission, CompanyId, QuestionId, ReportId, SubmittedAnswer,
    UserId,
};
pub use questions::{
    standard_questionnaire, Question, QuestionDraft, QuestionKind, QuestionViolation,
    ResponseMismatch,
};
pub use report::{
    reports_to_csv, CompanySummary, ExportError, HealthReport, ReportSubject, RiskCategoryCount,
};
pub use repository::{
    NotifyError, QuestionCatalog, ReportNotification, ReportNotifier, ReportRepository,
    RepositoryError,
};
pub use router::{assessment_router, ScoreRequest};
pub use scoring::{
    calculate_scores, Answer, HealthSection, RiskBand, RiskCategory, RubricError, ScoreResult,
    ScoringEngine, ScoringRubric, SectionRange, SectionScores,
};
pub use service::{AssessmentService, AssessmentServiceError};
pub use validation::{SubmissionGuard, SubmissionViolation};
