use serde::{Deserialize, Serialize};

/// Questionnaire sections contributing to the overall health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthSection {
    PersonalHealthHabits,
    MentalEmotionalWellBeing,
    Nutrition,
    PhysicalActivity,
}

impl HealthSection {
    pub fn ordered() -> [HealthSection; 4] {
        [
            HealthSection::PersonalHealthHabits,
            HealthSection::MentalEmotionalWellBeing,
            HealthSection::Nutrition,
            HealthSection::PhysicalActivity,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthSection::PersonalHealthHabits => "Personal health habits",
            HealthSection::MentalEmotionalWellBeing => "Mental and emotional well-being",
            HealthSection::Nutrition => "Nutrition",
            HealthSection::PhysicalActivity => "Physical activity",
        }
    }
}

/// Accumulated score per section. Sums only ever grow from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionScores {
    pub personal_health_habits: f64,
    pub mental_emotional_well_being: f64,
    pub nutrition: f64,
    pub physical_activity: f64,
}

impl SectionScores {
    pub fn get(&self, section: HealthSection) -> f64 {
        match section {
            HealthSection::PersonalHealthHabits => self.personal_health_habits,
            HealthSection::MentalEmotionalWellBeing => self.mental_emotional_well_being,
            HealthSection::Nutrition => self.nutrition,
            HealthSection::PhysicalActivity => self.physical_activity,
        }
    }

    pub(crate) fn add(&mut self, section: HealthSection, score: f64) {
        let slot = match section {
            HealthSection::PersonalHealthHabits => &mut self.personal_health_habits,
            HealthSection::MentalEmotionalWellBeing => &mut self.mental_emotional_well_being,
            HealthSection::Nutrition => &mut self.nutrition,
            HealthSection::PhysicalActivity => &mut self.physical_activity,
        };
        *slot += score;
    }

    /// Sections paired with their sums, in questionnaire order.
    pub fn iter(&self) -> impl Iterator<Item = (HealthSection, f64)> + '_ {
        HealthSection::ordered()
            .into_iter()
            .map(move |section| (section, self.get(section)))
    }

    /// Sum of all four sections, added in questionnaire order.
    pub fn total(&self) -> f64 {
        self.personal_health_habits
            + self.mental_emotional_well_being
            + self.nutrition
            + self.physical_activity
    }
}
