use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AssessmentSubmission, CompanyId, QuestionId, ReportId, UserId};
use super::questions::{Question, QuestionDraft};
use super::repository::{QuestionCatalog, ReportNotifier, ReportRepository, RepositoryError};
use super::scoring::Answer;
use super::service::{AssessmentService, AssessmentServiceError};

/// Pre-resolved answers for the scoring preview endpoint.
#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub answers: Vec<Answer>,
}

/// Router builder exposing submission, scoring, and report endpoints.
pub fn assessment_router<R, C, N>(service: Arc<AssessmentService<R, C, N>>) -> Router
where
    R: ReportRepository + 'static,
    C: QuestionCatalog + 'static,
    N: ReportNotifier + 'static,
{
    Router::new()
        .route("/api/assessment/submit", post(submit_handler::<R, C, N>))
        .route("/api/assessment/score", post(score_handler::<R, C, N>))
        .route(
            "/api/assessment/questions",
            get(questions_handler::<R, C, N>),
        )
        .route("/api/questions", post(create_question_handler::<R, C, N>))
        .route(
            "/api/questions/:question_id",
            put(update_question_handler::<R, C, N>).delete(retire_question_handler::<R, C, N>),
        )
        .route("/api/reports/:report_id", get(report_handler::<R, C, N>))
        .route(
            "/api/users/:user_id/reports",
            get(user_reports_handler::<R, C, N>),
        )
        .route(
            "/api/companies/:company_id/reports",
            get(company_reports_handler::<R, C, N>),
        )
        .route(
            "/api/companies/:company_id/summary",
            get(company_summary_handler::<R, C, N>),
        )
        .route(
            "/api/companies/:company_id/export",
            get(company_export_handler::<R, C, N>),
        )
        .with_state(service)
}

fn error_response(error: AssessmentServiceError) -> Response {
    let status = match &error {
        AssessmentServiceError::Submission(violation) if violation.is_client_error() => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AssessmentServiceError::Question(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AssessmentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn submit_handler<R, C, N>(
    State(service): State<Arc<AssessmentService<R, C, N>>>,
    axum::Json(submission): axum::Json<AssessmentSubmission>,
) -> Response
where
    R: ReportRepository + 'static,
    C: QuestionCatalog + 'static,
    N: ReportNotifier + 'static,
{
    match service.submit(submission) {
        Ok(report) => {
            let payload = json!({
                "message": "Assessment submitted successfully",
                "report": report,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn score_handler<R, C, N>(
    State(service): State<Arc<AssessmentService<R, C, N>>>,
    axum::Json(request): axum::Json<ScoreRequest>,
) -> Response
where
    R: ReportRepository + 'static,
    C: QuestionCatalog + 'static,
    N: ReportNotifier + 'static,
{
    let result = service.score_only(&request.answers);
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn questions_handler<R, C, N>(
    State(service): State<Arc<AssessmentService<R, C, N>>>,
) -> Response
where
    R: ReportRepository + 'static,
    C: QuestionCatalog + 'static,
    N: ReportNotifier + 'static,
{
    match service.active_questions() {
        Ok(questions) => (StatusCode::OK, axum::Json(questions)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<R, C, N>(
    State(service): State<Arc<AssessmentService<R, C, N>>>,
    Path(report_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    C: QuestionCatalog + 'static,
    N: ReportNotifier + 'static,
{
    match service.get(&ReportId(report_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn user_reports_handler<R, C, N>(
    State(service): State<Arc<AssessmentService<R, C, N>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    C: QuestionCatalog + 'static,
    N: ReportNotifier + 'static,
{
    match service.user_reports(&UserId(user_id)) {
        Ok(reports) => (StatusCode::OK, axum::Json(reports)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_question_handler<R, C, N>(
    State(service): State<Arc<AssessmentService<R, C, N>>>,
    axum::Json(question): axum::Json<Question>,
) -> Response
where
    R: ReportRepository + 'static,
    C: QuestionCatalog + 'static,
    N: ReportNotifier + 'static,
{
    match service.create_question(question) {
        Ok(stored) => (StatusCode::CREATED, axum::Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_question_handler<R, C, N>(
    State(service): State<Arc<AssessmentService<R, C, N>>>,
    Path(question_id): Path<u32>,
    axum::Json(draft): axum::Json<QuestionDraft>,
) -> Response
where
    R: ReportRepository + 'static,
    C: QuestionCatalog + 'static,
    N: ReportNotifier + 'static,
{
    match service.update_question(QuestionId(question_id), draft) {
        Ok(stored) => (StatusCode::OK, axum::Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn retire_question_handler<R, C, N>(
    State(service): State<Arc<AssessmentService<R, C, N>>>,
    Path(question_id): Path<u32>,
) -> Response
where
    R: ReportRepository + 'static,
    C: QuestionCatalog + 'static,
    N: ReportNotifier + 'static,
{
    match service.retire_question(QuestionId(question_id)) {
        Ok(retired) => (StatusCode::OK, axum::Json(retired)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn company_reports_handler<R, C, N>(
    State(service): State<Arc<AssessmentService<R, C, N>>>,
    Path(company_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    C: QuestionCatalog + 'static,
    N: ReportNotifier + 'static,
{
    match service.company_reports(&CompanyId(company_id)) {
        Ok(reports) => (StatusCode::OK, axum::Json(reports)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn company_summary_handler<R, C, N>(
    State(service): State<Arc<AssessmentService<R, C, N>>>,
    Path(company_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    C: QuestionCatalog + 'static,
    N: ReportNotifier + 'static,
{
    match service.company_summary(&CompanyId(company_id)) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn company_export_handler<R, C, N>(
    State(service): State<Arc<AssessmentService<R, C, N>>>,
    Path(company_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    C: QuestionCatalog + 'static,
    N: ReportNotifier + 'static,
{
    let company_id = CompanyId(company_id);
    match service.export_company_csv(&company_id) {
        Ok(body) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                export_filename(&company_id)
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response()
        }
        Err(error) => error_response(error),
    }
}

/// Attachment name for a company export, restricted to characters that are safe in a header.
fn export_filename(company_id: &CompanyId) -> String {
    let safe: String = company_id
        .0
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if safe.is_empty() {
        "reports.csv".to_string()
    } else {
        format!("reports-{safe}.csv")
    }
}
