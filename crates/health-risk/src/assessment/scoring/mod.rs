mod config;
mod risk;
mod sections;

pub use config::{RubricError, ScoringRubric, SectionRange, SECTION_MAX_SCORE};
pub use risk::{RiskBand, RiskCategory};
pub use sections::{HealthSection, SectionScores};

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A single answer with its score already resolved by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: u32,
    pub score: f64,
}

impl Answer {
    pub fn new(question_id: u32, score: f64) -> Self {
        Self { question_id, score }
    }
}

/// Section breakdown, totals, and risk classification for one set of answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub section_scores: SectionScores,
    pub total_score: f64,
    /// `total_score / max_total * 100`. Not clamped to 100.
    pub percentage_score: f64,
    pub risk_category: RiskCategory,
    /// Answers whose question id matched no section and were left out of every sum.
    #[serde(default)]
    pub unmapped_answers: usize,
}

/// Stateless scorer applying a rubric to answer lists.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    rubric: ScoringRubric,
}

impl ScoringEngine {
    pub fn new(rubric: ScoringRubric) -> Self {
        Self { rubric }
    }

    pub fn rubric(&self) -> &ScoringRubric {
        &self.rubric
    }

    pub fn score(&self, answers: &[Answer]) -> ScoreResult {
        let mut section_scores = SectionScores::default();
        let mut unmapped_answers = 0;

        for answer in answers {
            match self.rubric.section_for(answer.question_id) {
                Some(section) => section_scores.add(section, answer.score),
                None => unmapped_answers += 1,
            }
        }

        let total_score = section_scores.total();
        let percentage_score = total_score / self.rubric.max_total() * 100.0;
        let risk_category = self.rubric.classify(percentage_score);

        ScoreResult {
            section_scores,
            total_score,
            percentage_score,
            risk_category,
            unmapped_answers,
        }
    }
}

fn standard_engine() -> &'static ScoringEngine {
    static ENGINE: OnceLock<ScoringEngine> = OnceLock::new();
    ENGINE.get_or_init(ScoringEngine::default)
}

/// Score answers against the standard forty-question rubric.
pub fn calculate_scores(answers: &[Answer]) -> ScoreResult {
    standard_engine().score(answers)
}
