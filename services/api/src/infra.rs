use health_risk::assessment::{
    standard_questionnaire, CompanyId, HealthReport, NotifyError, Question, QuestionCatalog,
    QuestionId, ReportId, ReportNotification, ReportNotifier, ReportRepository, RepositoryError,
    UserId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReportRepository {
    records: Arc<Mutex<HashMap<ReportId, HealthReport>>>,
}

impl InMemoryReportRepository {
    fn matching(
        &self,
        keep: impl Fn(&HealthReport) -> bool,
    ) -> Result<Vec<HealthReport>, RepositoryError> {
        let guard = lock(&self.records)?;
        let mut reports: Vec<_> = guard.values().filter(|report| keep(report)).cloned().collect();
        reports.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then(a.id.cmp(&b.id)));
        Ok(reports)
    }
}

impl ReportRepository for InMemoryReportRepository {
    fn insert(&self, report: HealthReport) -> Result<HealthReport, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&report.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(report.id.clone(), report.clone());
        Ok(report)
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<HealthReport>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.get(id).cloned())
    }

    fn for_company(&self, company_id: &CompanyId) -> Result<Vec<HealthReport>, RepositoryError> {
        self.matching(|report| &report.company_id == company_id)
    }

    fn for_user(&self, user_id: &UserId) -> Result<Vec<HealthReport>, RepositoryError> {
        self.matching(|report| &report.user_id == user_id)
    }
}

/// Questionnaire held in memory, seeded with the standard forty questions.
#[derive(Clone)]
pub(crate) struct InMemoryQuestionCatalog {
    questions: Arc<Mutex<BTreeMap<QuestionId, Question>>>,
}

impl Default for InMemoryQuestionCatalog {
    fn default() -> Self {
        let seeded = standard_questionnaire()
            .into_iter()
            .map(|question| (question.id, question))
            .collect();
        Self {
            questions: Arc::new(Mutex::new(seeded)),
        }
    }
}

impl QuestionCatalog for InMemoryQuestionCatalog {
    fn question(&self, id: QuestionId) -> Result<Option<Question>, RepositoryError> {
        let guard = lock(&self.questions)?;
        Ok(guard.get(&id).cloned())
    }

    fn active_questions(&self) -> Result<Vec<Question>, RepositoryError> {
        let guard = lock(&self.questions)?;
        Ok(guard
            .values()
            .filter(|question| question.is_active)
            .cloned()
            .collect())
    }

    fn upsert(&self, question: Question) -> Result<Question, RepositoryError> {
        let mut guard = lock(&self.questions)?;
        guard.insert(question.id, question.clone());
        Ok(question)
    }

    fn deactivate(&self, id: QuestionId) -> Result<Question, RepositoryError> {
        let mut guard = lock(&self.questions)?;
        let question = guard.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        question.is_active = false;
        Ok(question.clone())
    }
}

/// Stands in for the mail relay: records each notification and logs it.
#[derive(Clone)]
pub(crate) struct LogNotifier {
    sender: String,
    outbox: Arc<Mutex<Vec<ReportNotification>>>,
}

impl LogNotifier {
    pub(crate) fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            outbox: Arc::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn sent(&self) -> Vec<ReportNotification> {
        self.outbox
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl ReportNotifier for LogNotifier {
    fn notify(&self, notification: ReportNotification) -> Result<(), NotifyError> {
        info!(
            sender = %self.sender,
            recipient = %notification.recipient,
            template = %notification.template,
            report_id = %notification.report_id.0,
            "report notification queued"
        );
        self.outbox
            .lock()
            .map_err(|_| NotifyError::Transport("outbox poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}
