use serde::{Deserialize, Serialize};

/// Risk classification derived from the percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
    Severe,
}

impl RiskCategory {
    pub fn ordered() -> [RiskCategory; 5] {
        [
            RiskCategory::Low,
            RiskCategory::Moderate,
            RiskCategory::High,
            RiskCategory::VeryHigh,
            RiskCategory::Severe,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low",
            RiskCategory::Moderate => "Moderate",
            RiskCategory::High => "High",
            RiskCategory::VeryHigh => "Very High",
            RiskCategory::Severe => "Severe",
        }
    }

    pub(crate) fn recommendation(&self, weakest: &str) -> String {
        match self {
            RiskCategory::Low => "Keep up the good work!".to_string(),
            RiskCategory::Moderate => {
                format!("Good baseline; small changes to {weakest} will lower your risk further.")
            }
            RiskCategory::High => {
                format!("Several habits need attention, starting with {weakest}.")
            }
            RiskCategory::VeryHigh => format!(
                "Book a wellness consultation and build a plan focused on {weakest}."
            ),
            RiskCategory::Severe => format!(
                "Please consult a healthcare professional soon; {weakest} needs immediate attention."
            ),
        }
    }
}

/// Lower bound of a risk band; scores at or above `floor` fall into `category`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskBand {
    pub floor: f64,
    pub category: RiskCategory,
}
