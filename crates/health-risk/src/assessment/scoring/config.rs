use serde::{Deserialize, Serialize};

use super::risk::{RiskBand, RiskCategory};
use super::sections::HealthSection;

pub const SECTION_MAX_SCORE: f64 = 100.0;

/// Closed range of question ids that feed one section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionRange {
    pub section: HealthSection,
    pub first_question: u32,
    pub last_question: u32,
    pub max_score: f64,
}

impl SectionRange {
    pub fn contains(&self, question_id: u32) -> bool {
        (self.first_question..=self.last_question).contains(&question_id)
    }
}

/// Section table and risk ladder used by the scoring engine.
///
/// Deserialization goes through [`ScoringRubric::new`], so a loaded rubric is
/// validated like a hand-built one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RubricFields")]
pub struct ScoringRubric {
    sections: Vec<SectionRange>,
    bands: Vec<RiskBand>,
    fallback: RiskCategory,
}

#[derive(Deserialize)]
struct RubricFields {
    sections: Vec<SectionRange>,
    bands: Vec<RiskBand>,
    fallback: RiskCategory,
}

impl TryFrom<RubricFields> for ScoringRubric {
    type Error = RubricError;

    fn try_from(fields: RubricFields) -> Result<Self, Self::Error> {
        Self::new(fields.sections, fields.bands, fields.fallback)
    }
}

/// Reasons a custom rubric is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RubricError {
    #[error("rubric must define at least one section")]
    NoSections,
    #[error("section {section:?} has an inverted range {first}..={last}")]
    InvertedRange {
        section: HealthSection,
        first: u32,
        last: u32,
    },
    #[error("sections {first:?} and {second:?} share question ids")]
    OverlappingRanges {
        first: HealthSection,
        second: HealthSection,
    },
    #[error("section {0:?} max score must be positive and finite")]
    InvalidMaxScore(HealthSection),
    #[error("risk band floors must be finite and strictly descending")]
    UnorderedBands,
}

impl ScoringRubric {
    pub fn new(
        sections: Vec<SectionRange>,
        bands: Vec<RiskBand>,
        fallback: RiskCategory,
    ) -> Result<Self, RubricError> {
        if sections.is_empty() {
            return Err(RubricError::NoSections);
        }

        for range in &sections {
            if range.first_question > range.last_question {
                return Err(RubricError::InvertedRange {
                    section: range.section,
                    first: range.first_question,
                    last: range.last_question,
                });
            }
            if !range.max_score.is_finite() || range.max_score <= 0.0 {
                return Err(RubricError::InvalidMaxScore(range.section));
            }
        }

        for (index, left) in sections.iter().enumerate() {
            for right in &sections[index + 1..] {
                if left.first_question <= right.last_question
                    && right.first_question <= left.last_question
                {
                    return Err(RubricError::OverlappingRanges {
                        first: left.section,
                        second: right.section,
                    });
                }
            }
        }

        if bands.iter().any(|band| !band.floor.is_finite())
            || bands.windows(2).any(|pair| pair[0].floor <= pair[1].floor)
        {
            return Err(RubricError::UnorderedBands);
        }

        Ok(Self {
            sections,
            bands,
            fallback,
        })
    }

    /// Ten questions per section, 100 points each, five risk bands.
    pub fn standard() -> Self {
        let sections = HealthSection::ordered()
            .into_iter()
            .zip(0u32..)
            .map(|(section, offset)| SectionRange {
                section,
                first_question: offset * 10 + 1,
                last_question: offset * 10 + 10,
                max_score: SECTION_MAX_SCORE,
            })
            .collect();

        let bands = vec![
            RiskBand {
                floor: 80.0,
                category: RiskCategory::Low,
            },
            RiskBand {
                floor: 60.0,
                category: RiskCategory::Moderate,
            },
            RiskBand {
                floor: 40.0,
                category: RiskCategory::High,
            },
            RiskBand {
                floor: 20.0,
                category: RiskCategory::VeryHigh,
            },
        ];

        Self {
            sections,
            bands,
            fallback: RiskCategory::Severe,
        }
    }

    pub fn sections(&self) -> &[SectionRange] {
        &self.sections
    }

    pub fn bands(&self) -> &[RiskBand] {
        &self.bands
    }

    pub fn section_for(&self, question_id: u32) -> Option<HealthSection> {
        self.sections
            .iter()
            .find(|range| range.contains(question_id))
            .map(|range| range.section)
    }

    pub fn section_max(&self, section: HealthSection) -> Option<f64> {
        self.sections
            .iter()
            .find(|range| range.section == section)
            .map(|range| range.max_score)
    }

    /// Sum of the per-section maxima; the percentage denominator.
    pub fn max_total(&self) -> f64 {
        self.sections.iter().map(|range| range.max_score).sum()
    }

    /// First band whose floor is met wins; NaN and anything below every floor fall through.
    pub fn classify(&self, percentage: f64) -> RiskCategory {
        self.bands
            .iter()
            .find(|band| percentage >= band.floor)
            .map(|band| band.category)
            .unwrap_or(self.fallback)
    }
}

impl Default for ScoringRubric {
    fn default() -> Self {
        Self::standard()
    }
}
