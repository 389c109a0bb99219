use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{AssessmentSubmission, CompanyId, QuestionId, ReportId, UserId};
use super::questions::{Question, QuestionDraft, QuestionViolation};
use super::report::{reports_to_csv, CompanySummary, ExportError, HealthReport, ReportSubject};
use super::repository::{
    QuestionCatalog, ReportNotification, ReportNotifier, ReportRepository, RepositoryError,
};
use super::scoring::{Answer, ScoreResult, ScoringEngine, ScoringRubric};
use super::validation::{SubmissionGuard, SubmissionViolation};

/// Service composing validation, scoring, storage, and notification.
pub struct AssessmentService<R, C, N> {
    guard: SubmissionGuard,
    engine: Arc<ScoringEngine>,
    reports: Arc<R>,
    catalog: Arc<C>,
    notifier: Arc<N>,
}

static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("rpt-{id:06}"))
}

impl<R, C, N> AssessmentService<R, C, N>
where
    R: ReportRepository + 'static,
    C: QuestionCatalog + 'static,
    N: ReportNotifier + 'static,
{
    pub fn new(reports: Arc<R>, catalog: Arc<C>, notifier: Arc<N>) -> Self {
        Self::with_rubric(reports, catalog, notifier, ScoringRubric::standard())
    }

    pub fn with_rubric(
        reports: Arc<R>,
        catalog: Arc<C>,
        notifier: Arc<N>,
        rubric: ScoringRubric,
    ) -> Self {
        Self {
            guard: SubmissionGuard,
            engine: Arc::new(ScoringEngine::new(rubric)),
            reports,
            catalog,
            notifier,
        }
    }

    /// Validate, score, and persist a submission, then notify the recipient if one was given.
    pub fn submit(
        &self,
        submission: AssessmentSubmission,
    ) -> Result<HealthReport, AssessmentServiceError> {
        let answers = self
            .guard
            .resolve_answers(&submission, self.catalog.as_ref())?;
        let result = self.engine.score(&answers);

        if result.unmapped_answers > 0 {
            warn!(
                unmapped = result.unmapped_answers,
                company_id = %submission.company_id.0,
                "answers outside every scoring section were ignored"
            );
        }

        let AssessmentSubmission {
            user_id,
            company_id,
            recipient_email,
            bmi,
            ..
        } = submission;

        let report = HealthReport::from_score(
            next_report_id(),
            ReportSubject {
                user_id,
                company_id,
                bmi: bmi.unwrap_or_default(),
            },
            &result,
            self.engine.rubric(),
            Utc::now(),
        );

        let stored = self.reports.insert(report)?;
        info!(
            report_id = %stored.id.0,
            company_id = %stored.company_id.0,
            risk_category = stored.risk_category.label(),
            "assessment report stored"
        );

        if let Some(recipient) = recipient_email {
            self.dispatch_notification(&stored, recipient);
        }

        Ok(stored)
    }

    fn dispatch_notification(&self, report: &HealthReport, recipient: String) {
        let mut details = BTreeMap::new();
        details.insert(
            "health_risk_score".to_string(),
            report.health_risk_score.to_string(),
        );
        details.insert(
            "risk_category".to_string(),
            report.risk_category.label().to_string(),
        );

        let notification = ReportNotification {
            template: "assessment_report".to_string(),
            recipient,
            report_id: report.id.clone(),
            details,
        };

        // Delivery is best effort; the report is already stored.
        if let Err(err) = self.notifier.notify(notification) {
            warn!(report_id = %report.id.0, error = %err, "report notification failed");
        }
    }

    /// Score pre-resolved answers without storing anything.
    pub fn score_only(&self, answers: &[Answer]) -> ScoreResult {
        let result = self.engine.score(answers);
        debug!(
            answers = answers.len(),
            total = result.total_score,
            "scored preview"
        );
        result
    }

    pub fn get(&self, report_id: &ReportId) -> Result<HealthReport, AssessmentServiceError> {
        let report = self
            .reports
            .fetch(report_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(report)
    }

    pub fn company_reports(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<HealthReport>, AssessmentServiceError> {
        Ok(self.reports.for_company(company_id)?)
    }

    /// Every report filed for one employee, oldest first.
    pub fn user_reports(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<HealthReport>, AssessmentServiceError> {
        let mut reports = self.reports.for_user(user_id)?;
        reports.sort_by(|a, b| {
            a.submitted_at
                .cmp(&b.submitted_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(reports)
    }

    pub fn company_summary(
        &self,
        company_id: &CompanyId,
    ) -> Result<CompanySummary, AssessmentServiceError> {
        let reports = self.reports.for_company(company_id)?;
        Ok(CompanySummary::from_reports(company_id.clone(), &reports))
    }

    pub fn export_company_csv(
        &self,
        company_id: &CompanyId,
    ) -> Result<String, AssessmentServiceError> {
        let reports = self.reports.for_company(company_id)?;
        Ok(reports_to_csv(&reports)?)
    }

    pub fn active_questions(&self) -> Result<Vec<Question>, AssessmentServiceError> {
        Ok(self.catalog.active_questions()?)
    }

    /// Add a question; the id must be free and fall inside its section's range.
    pub fn create_question(&self, question: Question) -> Result<Question, AssessmentServiceError> {
        question.check_against(self.engine.rubric())?;
        if self.catalog.question(question.id)?.is_some() {
            return Err(RepositoryError::Conflict.into());
        }

        let stored = self.catalog.upsert(question)?;
        info!(question_id = %stored.id, section = stored.section.label(), "question added");
        Ok(stored)
    }

    /// Replace the text, kind, weight or section of an existing question.
    pub fn update_question(
        &self,
        id: QuestionId,
        draft: QuestionDraft,
    ) -> Result<Question, AssessmentServiceError> {
        let question = draft.with_id(id);
        question.check_against(self.engine.rubric())?;
        if self.catalog.question(id)?.is_none() {
            return Err(RepositoryError::NotFound.into());
        }

        let stored = self.catalog.upsert(question)?;
        info!(question_id = %stored.id, scoring = stored.scoring, "question updated");
        Ok(stored)
    }

    /// Retire a question; later submissions answering it are rejected.
    pub fn retire_question(&self, id: QuestionId) -> Result<Question, AssessmentServiceError> {
        let retired = self.catalog.deactivate(id)?;
        info!(question_id = %retired.id, "question retired");
        Ok(retired)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Submission(#[from] SubmissionViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Question(#[from] QuestionViolation),
    #[error(transparent)]
    Export(#[from] ExportError),
}
