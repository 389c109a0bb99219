use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CompanyId, ReportId, UserId};
use super::scoring::{RiskCategory, ScoreResult, ScoringRubric, SectionScores};

/// Persisted outcome of one questionnaire submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub id: ReportId,
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub health_risk_score: f64,
    pub emotional_health_score: f64,
    pub nutritional_habits_score: f64,
    pub percentage_score: f64,
    pub risk_category: RiskCategory,
    pub bmi: f64,
    pub prevalent_risk_factors: Vec<String>,
    pub recommendations: String,
    pub section_scores: SectionScores,
    pub submitted_at: DateTime<Utc>,
}

/// Who the report belongs to, plus caller-supplied measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSubject {
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub bmi: f64,
}

impl HealthReport {
    pub fn from_score(
        id: ReportId,
        subject: ReportSubject,
        result: &ScoreResult,
        rubric: &ScoringRubric,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let scores = result.section_scores;

        let prevalent_risk_factors = rubric
            .sections()
            .iter()
            .filter(|range| scores.get(range.section) < range.max_score / 2.0)
            .map(|range| range.section.label().to_string())
            .collect();

        let weakest = rubric
            .sections()
            .iter()
            .map(|range| (range.section, scores.get(range.section) / range.max_score))
            .fold(None, |lowest: Option<(_, f64)>, candidate| match lowest {
                Some(current) if current.1 <= candidate.1 => Some(current),
                _ => Some(candidate),
            })
            .map(|(section, _)| section.label())
            .unwrap_or("your daily habits");

        Self {
            id,
            user_id: subject.user_id,
            company_id: subject.company_id,
            health_risk_score: result.total_score,
            emotional_health_score: scores.mental_emotional_well_being,
            nutritional_habits_score: scores.nutrition,
            percentage_score: result.percentage_score,
            risk_category: result.risk_category,
            bmi: subject.bmi,
            prevalent_risk_factors,
            recommendations: result.risk_category.recommendation(weakest),
            section_scores: scores,
            submitted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskCategoryCount {
    pub category: RiskCategory,
    pub count: usize,
}

/// Collective view over every report filed for a company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySummary {
    pub company_id: CompanyId,
    pub total_assessments: usize,
    pub avg_health_risk_score: f64,
    pub avg_emotional_health_score: f64,
    pub avg_nutritional_habits_score: f64,
    pub risk_distribution: Vec<RiskCategoryCount>,
}

impl CompanySummary {
    pub fn from_reports(company_id: CompanyId, reports: &[HealthReport]) -> Self {
        let total_assessments = reports.len();
        let average = |pick: fn(&HealthReport) -> f64| {
            if reports.is_empty() {
                0.0
            } else {
                reports.iter().map(pick).sum::<f64>() / total_assessments as f64
            }
        };

        let risk_distribution = RiskCategory::ordered()
            .into_iter()
            .map(|category| RiskCategoryCount {
                category,
                count: reports
                    .iter()
                    .filter(|report| report.risk_category == category)
                    .count(),
            })
            .collect();

        Self {
            company_id,
            total_assessments,
            avg_health_risk_score: average(|report| report.health_risk_score),
            avg_emotional_health_score: average(|report| report.emotional_health_score),
            avg_nutritional_habits_score: average(|report| report.nutritional_habits_score),
            risk_distribution,
        }
    }
}

/// Failure while rendering the CSV export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write csv row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv export: {0}")]
    Flush(String),
    #[error("csv export is not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

const EXPORT_COLUMNS: [&str; 12] = [
    "report_id",
    "user_id",
    "submitted_at",
    "health_risk_score",
    "percentage_score",
    "risk_category",
    "personal_health_habits",
    "mental_emotional_well_being",
    "nutrition",
    "physical_activity",
    "bmi",
    "prevalent_risk_factors",
];

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    report_id: &'a str,
    user_id: &'a str,
    submitted_at: String,
    health_risk_score: f64,
    percentage_score: f64,
    risk_category: &'static str,
    personal_health_habits: f64,
    mental_emotional_well_being: f64,
    nutrition: f64,
    physical_activity: f64,
    bmi: f64,
    prevalent_risk_factors: String,
}

/// Render reports as CSV with a header row, one line per report.
///
/// The header is written even when there are no reports.
pub fn reports_to_csv(reports: &[HealthReport]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(EXPORT_COLUMNS)?;

    for report in reports {
        let scores = &report.section_scores;
        writer.serialize(ReportRow {
            report_id: &report.id.0,
            user_id: &report.user_id.0,
            submitted_at: report.submitted_at.to_rfc3339(),
            health_risk_score: report.health_risk_score,
            percentage_score: report.percentage_score,
            risk_category: report.risk_category.label(),
            personal_health_habits: scores.personal_health_habits,
            mental_emotional_well_being: scores.mental_emotional_well_being,
            nutrition: scores.nutrition,
            physical_activity: scores.physical_activity,
            bmi: report.bmi,
            prevalent_risk_factors: report.prevalent_risk_factors.join("; "),
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
