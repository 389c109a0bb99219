//! End-to-end scenarios for questionnaire submission, scoring, and company reporting.
//!
//! Everything goes through the public service facade and HTTP router with in-memory
//! adapters standing in for storage and e-mail delivery.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use health_risk::assessment::{
        standard_questionnaire, AnswerResponse, AssessmentService, AssessmentSubmission,
        CompanyId, HealthReport, NotifyError, Question, QuestionCatalog, QuestionId, QuestionKind,
        ReportId, ReportNotification, ReportNotifier, ReportRepository, RepositoryError,
        SubmittedAnswer, UserId,
    };

    #[derive(Default, Clone)]
    pub(super) struct MemoryReports {
        records: Arc<Mutex<HashMap<ReportId, HealthReport>>>,
    }

    impl ReportRepository for MemoryReports {
        fn insert(&self, report: HealthReport) -> Result<HealthReport, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            if guard.contains_key(&report.id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(report.id.clone(), report.clone());
            Ok(report)
        }

        fn fetch(&self, id: &ReportId) -> Result<Option<HealthReport>, RepositoryError> {
            Ok(self.records.lock().expect("lock").get(id).cloned())
        }

        fn for_company(
            &self,
            company_id: &CompanyId,
        ) -> Result<Vec<HealthReport>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("lock")
                .values()
                .filter(|report| &report.company_id == company_id)
                .cloned()
                .collect())
        }

        fn for_user(&self, user_id: &UserId) -> Result<Vec<HealthReport>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("lock")
                .values()
                .filter(|report| &report.user_id == user_id)
                .cloned()
                .collect())
        }
    }

    pub(super) struct StandardCatalog(Mutex<Vec<Question>>);

    impl Default for StandardCatalog {
        fn default() -> Self {
            Self(Mutex::new(standard_questionnaire()))
        }
    }

    impl QuestionCatalog for StandardCatalog {
        fn question(&self, id: QuestionId) -> Result<Option<Question>, RepositoryError> {
            let guard = self.0.lock().expect("lock");
            Ok(guard.iter().find(|question| question.id == id).cloned())
        }

        fn active_questions(&self) -> Result<Vec<Question>, RepositoryError> {
            let guard = self.0.lock().expect("lock");
            Ok(guard
                .iter()
                .filter(|question| question.is_active)
                .cloned()
                .collect())
        }

        fn upsert(&self, question: Question) -> Result<Question, RepositoryError> {
            let mut guard = self.0.lock().expect("lock");
            guard.retain(|existing| existing.id != question.id);
            guard.push(question.clone());
            Ok(question)
        }

        fn deactivate(&self, id: QuestionId) -> Result<Question, RepositoryError> {
            let mut guard = self.0.lock().expect("lock");
            let question = guard
                .iter_mut()
                .find(|question| question.id == id)
                .ok_or(RepositoryError::NotFound)?;
            question.is_active = false;
            Ok(question.clone())
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct Outbox {
        sent: Arc<Mutex<Vec<ReportNotification>>>,
    }

    impl Outbox {
        pub(super) fn sent(&self) -> Vec<ReportNotification> {
            self.sent.lock().expect("lock").clone()
        }
    }

    impl ReportNotifier for Outbox {
        fn notify(&self, notification: ReportNotification) -> Result<(), NotifyError> {
            self.sent.lock().expect("lock").push(notification);
            Ok(())
        }
    }

    pub(super) type Service = AssessmentService<MemoryReports, StandardCatalog, Outbox>;

    pub(super) fn build_service() -> (Service, Arc<MemoryReports>, Arc<Outbox>) {
        let reports = Arc::new(MemoryReports::default());
        let outbox = Arc::new(Outbox::default());
        let service = AssessmentService::new(
            reports.clone(),
            Arc::new(StandardCatalog::default()),
            outbox.clone(),
        );
        (service, reports, outbox)
    }

    /// Answer every question at `fraction` of its range (yes/no answers flip at one half).
    pub(super) fn answers_at(fraction: f64) -> Vec<SubmittedAnswer> {
        standard_questionnaire()
            .into_iter()
            .map(|question| SubmittedAnswer {
                question_id: question.id,
                response: match question.kind {
                    QuestionKind::YesNo => AnswerResponse::Bool(fraction >= 0.5),
                    QuestionKind::Scale { levels } => {
                        AnswerResponse::Level((f64::from(levels) * fraction).round() as u8)
                    }
                },
            })
            .collect()
    }

    pub(super) fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    pub(super) fn submission(user: &str, company: &str, fraction: f64) -> AssessmentSubmission {
        AssessmentSubmission {
            user_id: UserId(user.to_string()),
            company_id: CompanyId(company.to_string()),
            recipient_email: Some(format!("{user}@example.com")),
            bmi: Some(22.0),
            answers: answers_at(fraction),
        }
    }
}

mod scoring {
    use super::common::*;
    use health_risk::assessment::{
        AssessmentServiceError, CompanyId, HealthSection, QuestionId, ReportRepository,
        RiskCategory, SubmissionViolation, UserId,
    };

    #[test]
    fn strong_questionnaire_is_low_risk() {
        let (service, _, outbox) = build_service();

        let report = service
            .submit(submission("ana", "acme", 1.0))
            .expect("submission succeeds");

        assert_eq!(report.health_risk_score, 400.0);
        assert_eq!(report.risk_category, RiskCategory::Low);
        assert!(report.prevalent_risk_factors.is_empty());
        assert_eq!(outbox.sent().len(), 1);
        assert_eq!(outbox.sent()[0].recipient, "ana@example.com");
    }

    #[test]
    fn middling_questionnaire_lands_in_a_middle_band() {
        let (service, _, _) = build_service();

        // Yes/no answers all yes (40 per section); scales at 3/5 (36 per section).
        let report = service
            .submit(submission("ben", "acme", 0.6))
            .expect("submission succeeds");

        assert_close(report.section_scores.get(HealthSection::Nutrition), 76.0);
        assert_close(report.health_risk_score, 304.0);
        assert_close(report.percentage_score, 76.0);
        assert_eq!(report.risk_category, RiskCategory::Moderate);
    }

    #[test]
    fn weak_questionnaire_is_severe_and_flags_every_section() {
        let (service, _, _) = build_service();

        let report = service
            .submit(submission("cy", "acme", 0.0))
            .expect("submission succeeds");

        assert_eq!(report.risk_category, RiskCategory::Severe);
        assert_eq!(report.prevalent_risk_factors.len(), 4);
        assert!(report.recommendations.contains("healthcare professional"));
    }

    #[test]
    fn unknown_questions_reject_the_whole_submission() {
        let (service, reports, outbox) = build_service();
        let mut bad = submission("dee", "acme", 1.0);
        bad.answers[0].question_id = QuestionId(4000);

        match service.submit(bad) {
            Err(AssessmentServiceError::Submission(SubmissionViolation::UnknownQuestion(QuestionId(4000)))) => {}
            other => panic!("expected unknown question, got {other:?}"),
        }
        assert!(reports
            .for_company(&CompanyId("acme".to_string()))
            .map(|reports| reports.is_empty())
            .unwrap_or(false));
        assert!(outbox.sent().is_empty());
    }

    #[test]
    fn employee_history_spans_companies_and_skips_retired_questions() {
        let (service, _, _) = build_service();
        let first = service
            .submit(submission("fay", "acme", 1.0))
            .expect("first submission");

        service
            .retire_question(QuestionId(40))
            .expect("question retires");
        match service.submit(submission("fay", "globex", 1.0)) {
            Err(AssessmentServiceError::Submission(SubmissionViolation::InactiveQuestion(id))) => {
                assert_eq!(id, QuestionId(40));
            }
            other => panic!("expected inactive question, got {other:?}"),
        }

        let mut trimmed = submission("fay", "globex", 1.0);
        trimmed
            .answers
            .retain(|answer| answer.question_id != QuestionId(40));
        let second = service.submit(trimmed).expect("second submission");
        assert!(second.section_scores.get(HealthSection::PhysicalActivity) < 100.0);

        let history = service
            .user_reports(&UserId("fay".to_string()))
            .expect("history loads");
        let ids: Vec<_> = history.into_iter().map(|report| report.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}

mod reporting {
    use super::common::*;
    use axum::http::StatusCode;
    use health_risk::assessment::{assessment_router, CompanyId, RiskCategory};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[test]
    fn company_summary_aggregates_submissions() {
        let (service, _, _) = build_service();
        for (user, fraction) in [("ana", 1.0), ("ben", 0.6), ("cy", 0.0)] {
            service
                .submit(submission(user, "umbrella", fraction))
                .expect("submission succeeds");
        }

        let summary = service
            .company_summary(&CompanyId("umbrella".to_string()))
            .expect("summary builds");

        assert_eq!(summary.total_assessments, 3);
        assert_close(summary.avg_health_risk_score, (400.0 + 304.0) / 3.0);
        let counts: Vec<_> = summary
            .risk_distribution
            .iter()
            .map(|entry| (entry.category, entry.count))
            .collect();
        assert_eq!(
            counts,
            vec![
                (RiskCategory::Low, 1),
                (RiskCategory::Moderate, 1),
                (RiskCategory::High, 0),
                (RiskCategory::VeryHigh, 0),
                (RiskCategory::Severe, 1),
            ]
        );
    }

    #[tokio::test]
    async fn submission_round_trips_through_http() {
        let (service, _, _) = build_service();
        let router = assessment_router(Arc::new(service));

        let response = router
            .clone()
            .oneshot(
                axum::http::Request::post("/api/assessment/submit")
                    .header(axum::http::header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(
                        serde_json::to_vec(&submission("eve", "hooli", 1.0)).unwrap(),
                    ))
                    .unwrap(),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        let payload: Value = serde_json::from_slice(&body).expect("json payload");
        let report_id = payload["report"]["id"]
            .as_str()
            .expect("report id")
            .to_string();

        let listing = router
            .oneshot(
                axum::http::Request::get("/api/companies/hooli/reports")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .expect("route executes");
        assert_eq!(listing.status(), StatusCode::OK);
        let body = axum::body::to_bytes(listing.into_body(), 64 * 1024)
            .await
            .expect("read body");
        let reports: Value = serde_json::from_slice(&body).expect("json payload");
        let reports = reports.as_array().expect("array");
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0]["id"].as_str(), Some(report_id.as_str()));
        assert_eq!(reports[0]["risk_category"].as_str(), Some("Low"));
    }

    #[tokio::test]
    async fn malformed_json_is_rejected_by_the_extractor() {
        let (service, _, _) = build_service();
        let router = assessment_router(Arc::new(service));

        let response = router
            .oneshot(
                axum::http::Request::post("/api/assessment/submit")
                    .header(axum::http::header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from("{\"answers\": 12}"))
                    .unwrap(),
            )
            .await
            .expect("route executes");

        assert!(response.status().is_client_error());
    }
}
