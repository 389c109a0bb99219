use serde::{Deserialize, Serialize};

use super::domain::{AnswerResponse, QuestionId};
use super::scoring::{HealthSection, ScoringRubric};

/// Shape of the response a question accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    YesNo,
    Scale { levels: u8 },
}

/// Questionnaire entry with its configured weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub kind: QuestionKind,
    pub scoring: f64,
    pub section: HealthSection,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}

/// Editable question fields; the id comes from the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    pub kind: QuestionKind,
    pub scoring: f64,
    pub section: HealthSection,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

impl QuestionDraft {
    pub fn with_id(self, id: QuestionId) -> Question {
        Question {
            id,
            text: self.text,
            kind: self.kind,
            scoring: self.scoring,
            section: self.section,
            is_active: self.is_active,
        }
    }
}

/// Reasons a question cannot be stored in the catalog.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuestionViolation {
    #[error("question text is required")]
    BlankText,
    #[error("question weight must be a non-negative number (found {0})")]
    InvalidWeight(f64),
    #[error("scale questions need at least one level")]
    EmptyScale,
    #[error("question {id} is outside the id range of section '{}'", .section.label())]
    OutsideSection { id: QuestionId, section: HealthSection },
}

/// Response did not fit the question's kind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResponseMismatch {
    #[error("expected a yes/no response")]
    ExpectedYesNo,
    #[error("expected a level between 0 and {levels}")]
    ExpectedLevel { levels: u8 },
}

impl Question {
    /// Apply the question weight to a response.
    pub fn resolve(&self, response: AnswerResponse) -> Result<f64, ResponseMismatch> {
        match (self.kind, response) {
            (QuestionKind::YesNo, AnswerResponse::Bool(true)) => Ok(self.scoring),
            (QuestionKind::YesNo, AnswerResponse::Bool(false)) => Ok(0.0),
            (QuestionKind::YesNo, AnswerResponse::Level(_)) => Err(ResponseMismatch::ExpectedYesNo),
            (QuestionKind::Scale { levels }, AnswerResponse::Level(level))
                if levels > 0 && level <= levels =>
            {
                Ok(self.scoring * f64::from(level) / f64::from(levels))
            }
            (QuestionKind::Scale { levels }, _) => Err(ResponseMismatch::ExpectedLevel { levels }),
        }
    }

    /// Check the question is well formed and that its id scores into its own section.
    pub fn check_against(&self, rubric: &ScoringRubric) -> Result<(), QuestionViolation> {
        if self.text.trim().is_empty() {
            return Err(QuestionViolation::BlankText);
        }
        if !self.scoring.is_finite() || self.scoring < 0.0 {
            return Err(QuestionViolation::InvalidWeight(self.scoring));
        }
        if self.kind == (QuestionKind::Scale { levels: 0 }) {
            return Err(QuestionViolation::EmptyScale);
        }
        if rubric.section_for(self.id.0) != Some(self.section) {
            return Err(QuestionViolation::OutsideSection {
                id: self.id,
                section: self.section,
            });
        }
        Ok(())
    }
}

const STANDARD_PROMPTS: [(HealthSection, [&str; 10]); 4] = [
    (
        HealthSection::PersonalHealthHabits,
        [
            "Do you avoid tobacco products entirely?",
            "How many nights a week do you sleep at least seven hours?",
            "Do you keep alcohol to one drink a day or fewer?",
            "Have you had a routine check-up in the last twelve months?",
            "How consistently do you wash your hands before meals?",
            "Do you wear a seatbelt on every trip?",
            "How often do you take screen breaks during the workday?",
            "Do you know your current blood pressure?",
            "How regularly do you visit a dentist?",
            "Do you use sun protection when outdoors?",
        ],
    ),
    (
        HealthSection::MentalEmotionalWellBeing,
        [
            "How often do you feel rested when you wake up?",
            "Do you have someone you can talk to about problems?",
            "How well do you manage work-related stress?",
            "How often do you take time for hobbies?",
            "Do you feel in control of your workload?",
            "How often do you feel optimistic about the future?",
            "Do you take your full annual leave?",
            "How rarely do you feel anxious or on edge?",
            "Do you practise any relaxation technique?",
            "How satisfied are you with your work-life balance?",
        ],
    ),
    (
        HealthSection::Nutrition,
        [
            "How many portions of vegetables do you eat daily?",
            "How many portions of fruit do you eat daily?",
            "Do you eat breakfast most days?",
            "How often do you choose whole grains?",
            "Do you limit sugary drinks to fewer than three a week?",
            "How much water do you drink each day?",
            "Do you limit fast food to once a week or less?",
            "How often do you cook meals at home?",
            "Do you check food labels for salt content?",
            "How often do you eat fish or legumes?",
        ],
    ),
    (
        HealthSection::PhysicalActivity,
        [
            "How many days a week do you exercise for 30 minutes?",
            "Do you take the stairs instead of the lift?",
            "How often do you do strength training?",
            "Do you walk or cycle for short trips?",
            "How often do you stretch during the day?",
            "Do you stand or move at least once an hour at work?",
            "How many steps do you average per day?",
            "Do you take part in a sport or group activity?",
            "How often is your heart rate raised during the week?",
            "Do you spend active time outdoors at weekends?",
        ],
    ),
];

/// Forty active questions, laid out on the standard rubric's id ranges.
///
/// Even positions are yes/no questions worth 8 points; odd positions are
/// five-level scales worth 12, giving 100 points per section.
pub fn standard_questionnaire() -> Vec<Question> {
    let rubric = ScoringRubric::standard();

    STANDARD_PROMPTS
        .iter()
        .flat_map(|(section, prompts)| {
            let first = rubric
                .sections()
                .iter()
                .find(|range| range.section == *section)
                .map(|range| range.first_question)
                .unwrap_or_default();

            prompts.iter().zip(0u32..).map(move |(text, offset)| {
                let (kind, scoring) = if offset % 2 == 0 {
                    (QuestionKind::YesNo, 8.0)
                } else {
                    (QuestionKind::Scale { levels: 5 }, 12.0)
                };

                Question {
                    id: QuestionId(first + offset),
                    text: (*text).to_string(),
                    kind,
                    scoring,
                    section: *section,
                    is_active: true,
                }
            })
        })
        .collect()
}
