use super::domain::{AssessmentSubmission, QuestionId};
use super::questions::ResponseMismatch;
use super::repository::{QuestionCatalog, RepositoryError};
use super::scoring::Answer;

/// Validation errors raised while accepting a submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionViolation {
    #[error("answers are required")]
    MissingAnswers,
    #[error("{field} is required")]
    MissingIdentity { field: &'static str },
    #[error("bmi must be a non-negative number (found {0})")]
    InvalidBmi(f64),
    #[error("recipient e-mail '{0}' is not a valid address")]
    InvalidRecipient(String),
    #[error("question {0} not found")]
    UnknownQuestion(QuestionId),
    #[error("question {0} is no longer active")]
    InactiveQuestion(QuestionId),
    #[error("invalid response for question {question_id}: {source}")]
    ResponseMismatch {
        question_id: QuestionId,
        source: ResponseMismatch,
    },
    #[error(transparent)]
    Catalog(#[from] RepositoryError),
}

impl SubmissionViolation {
    /// True when the caller sent bad input, as opposed to a catalog failure.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, SubmissionViolation::Catalog(_))
    }
}

/// Guard turning a raw submission into weighted answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionGuard;

impl SubmissionGuard {
    pub fn resolve_answers<C>(
        &self,
        submission: &AssessmentSubmission,
        catalog: &C,
    ) -> Result<Vec<Answer>, SubmissionViolation>
    where
        C: QuestionCatalog + ?Sized,
    {
        if submission.user_id.0.trim().is_empty() {
            return Err(SubmissionViolation::MissingIdentity { field: "user_id" });
        }
        if submission.company_id.0.trim().is_empty() {
            return Err(SubmissionViolation::MissingIdentity {
                field: "company_id",
            });
        }
        if submission.answers.is_empty() {
            return Err(SubmissionViolation::MissingAnswers);
        }

        if let Some(bmi) = submission.bmi {
            if !bmi.is_finite() || bmi < 0.0 {
                return Err(SubmissionViolation::InvalidBmi(bmi));
            }
        }

        if let Some(email) = &submission.recipient_email {
            if !looks_like_email(email) {
                return Err(SubmissionViolation::InvalidRecipient(email.clone()));
            }
        }

        submission
            .answers
            .iter()
            .map(|answer| {
                let question = catalog
                    .question(answer.question_id)?
                    .ok_or(SubmissionViolation::UnknownQuestion(answer.question_id))?;

                if !question.is_active {
                    return Err(SubmissionViolation::InactiveQuestion(question.id));
                }

                let score = question.resolve(answer.response).map_err(|source| {
                    SubmissionViolation::ResponseMismatch {
                        question_id: question.id,
                        source,
                    }
                })?;

                Ok(Answer::new(question.id.0, score))
            })
            .collect()
    }
}

fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}
