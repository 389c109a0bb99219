use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::assessment::domain::{
    AnswerResponse, AssessmentSubmission, CompanyId, QuestionId, ReportId, SubmittedAnswer,
    UserId,
};
use crate::assessment::questions::{standard_questionnaire, Question, QuestionKind};
use crate::assessment::report::HealthReport;
use crate::assessment::repository::{
    NotifyError, QuestionCatalog, ReportNotification, ReportNotifier, ReportRepository,
    RepositoryError,
};
use crate::assessment::scoring::HealthSection;
use crate::assessment::{assessment_router, AssessmentService};

pub(super) const RETIRED_QUESTION: QuestionId = QuestionId(41);
pub(super) const LEGACY_QUESTION: QuestionId = QuestionId(50);

#[derive(Default, Clone)]
pub(super) struct MemoryReports {
    pub(super) records: Arc<Mutex<HashMap<ReportId, HealthReport>>>,
}

impl MemoryReports {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl ReportRepository for MemoryReports {
    fn insert(&self, report: HealthReport) -> Result<HealthReport, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&report.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(report.id.clone(), report.clone());
        Ok(report)
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<HealthReport>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_company(&self, company_id: &CompanyId) -> Result<Vec<HealthReport>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut reports: Vec<_> = guard
            .values()
            .filter(|report| &report.company_id == company_id)
            .cloned()
            .collect();
        reports.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(reports)
    }

    fn for_user(&self, user_id: &UserId) -> Result<Vec<HealthReport>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|report| &report.user_id == user_id)
            .cloned()
            .collect())
    }
}

pub(super) struct MemoryCatalog {
    questions: Mutex<BTreeMap<QuestionId, Question>>,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        let mut questions = standard_questionnaire();
        questions.push(Question {
            id: RETIRED_QUESTION,
            text: "Do you smoke more than ten cigarettes a day?".to_string(),
            kind: QuestionKind::YesNo,
            scoring: 5.0,
            section: HealthSection::PersonalHealthHabits,
            is_active: false,
        });
        questions.push(Question {
            id: LEGACY_QUESTION,
            text: "Do you own a fitness tracker?".to_string(),
            kind: QuestionKind::YesNo,
            scoring: 5.0,
            section: HealthSection::PhysicalActivity,
            is_active: true,
        });
        Self {
            questions: Mutex::new(
                questions
                    .into_iter()
                    .map(|question| (question.id, question))
                    .collect(),
            ),
        }
    }
}

impl QuestionCatalog for MemoryCatalog {
    fn question(&self, id: QuestionId) -> Result<Option<Question>, RepositoryError> {
        let guard = self.questions.lock().expect("catalog mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn active_questions(&self) -> Result<Vec<Question>, RepositoryError> {
        let guard = self.questions.lock().expect("catalog mutex poisoned");
        Ok(guard
            .values()
            .filter(|question| question.is_active)
            .cloned()
            .collect())
    }

    fn upsert(&self, question: Question) -> Result<Question, RepositoryError> {
        let mut guard = self.questions.lock().expect("catalog mutex poisoned");
        guard.insert(question.id, question.clone());
        Ok(question)
    }

    fn deactivate(&self, id: QuestionId) -> Result<Question, RepositoryError> {
        let mut guard = self.questions.lock().expect("catalog mutex poisoned");
        let question = guard.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        question.is_active = false;
        Ok(question.clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<ReportNotification>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<ReportNotification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl ReportNotifier for MemoryNotifier {
    fn notify(&self, notification: ReportNotification) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct OfflineNotifier;

impl ReportNotifier for OfflineNotifier {
    fn notify(&self, _notification: ReportNotification) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp relay offline".to_string()))
    }
}

pub(super) struct ConflictReports;

impl ReportRepository for ConflictReports {
    fn insert(&self, _report: HealthReport) -> Result<HealthReport, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &ReportId) -> Result<Option<HealthReport>, RepositoryError> {
        Ok(None)
    }

    fn for_company(&self, _company_id: &CompanyId) -> Result<Vec<HealthReport>, RepositoryError> {
        Ok(Vec::new())
    }

    fn for_user(&self, _user_id: &UserId) -> Result<Vec<HealthReport>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableReports;

impl ReportRepository for UnavailableReports {
    fn insert(&self, _report: HealthReport) -> Result<HealthReport, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ReportId) -> Result<Option<HealthReport>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_company(&self, _company_id: &CompanyId) -> Result<Vec<HealthReport>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_user(&self, _user_id: &UserId) -> Result<Vec<HealthReport>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) type MemoryService = AssessmentService<MemoryReports, MemoryCatalog, MemoryNotifier>;

pub(super) fn build_service() -> (MemoryService, Arc<MemoryReports>, Arc<MemoryNotifier>) {
    let reports = Arc::new(MemoryReports::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = AssessmentService::new(
        reports.clone(),
        Arc::new(MemoryCatalog::default()),
        notifier.clone(),
    );
    (service, reports, notifier)
}

/// Every standard question answered with the given strength (full or nothing).
pub(super) fn uniform_answers(full: bool) -> Vec<SubmittedAnswer> {
    standard_questionnaire()
        .into_iter()
        .map(|question| {
            let response = match question.kind {
                QuestionKind::YesNo => AnswerResponse::Bool(full),
                QuestionKind::Scale { levels } => {
                    AnswerResponse::Level(if full { levels } else { 0 })
                }
            };
            SubmittedAnswer {
                question_id: question.id,
                response,
            }
        })
        .collect()
}

pub(super) fn submission(company: &str, answers: Vec<SubmittedAnswer>) -> AssessmentSubmission {
    AssessmentSubmission {
        user_id: UserId("emp-042".to_string()),
        company_id: CompanyId(company.to_string()),
        recipient_email: Some("jane.doe@example.com".to_string()),
        bmi: Some(24.1),
        answers,
    }
}

pub(super) fn healthy_submission() -> AssessmentSubmission {
    submission("acme", uniform_answers(true))
}

pub(super) fn empty_submission() -> AssessmentSubmission {
    submission("acme", Vec::new())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    assessment_router(Arc::new(service))
}
