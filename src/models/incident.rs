use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A structured report of an animal-welfare situation awaiting triage.
///
/// Field order follows the model column order. Integer fields are already
/// range-checked when the record comes out of [`crate::validation::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Neighborhood of the sighting (open text)
    pub neighborhood: String,
    pub animal_type: String,
    pub age_group: String,
    pub behavior: String,
    pub mobility: String,
    pub traffic_risk: String,
    pub weather: String,
    pub report_channel: String,
    pub visible_injury: String,

    /// Number of animals involved (1-10)
    pub animal_count: u8,

    pub near_traffic: u8,
    pub near_school: u8,
    pub very_thin: u8,
    pub bleeding: u8,
    pub open_wound: u8,
    pub pregnant_or_nursing: u8,
    pub has_collar: u8,

    /// How sure the reporter is about what they saw (1-5)
    pub reporter_confidence: u8,

    /// Hour of day the report came in (0-23)
    pub report_hour: u8,
    /// Day of week, Monday = 0 (0-6)
    pub report_dayofweek: u8,
    /// Calendar month (1-12)
    pub report_month: u8,
}

/// Quick-fill scenarios used by the operator form and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Preset {
    Low,
    Medium,
    High,
}

impl IncidentRecord {
    /// Build one of the canned demo reports
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Low => Self {
                neighborhood: "Kombinat".to_string(),
                animal_type: "Cat".to_string(),
                age_group: "Adult".to_string(),
                behavior: "Calm".to_string(),
                mobility: "Normal".to_string(),
                traffic_risk: "Low".to_string(),
                weather: "Clear".to_string(),
                report_channel: "App".to_string(),
                visible_injury: "No".to_string(),
                animal_count: 1,
                near_traffic: 0,
                near_school: 0,
                very_thin: 0,
                bleeding: 0,
                open_wound: 0,
                pregnant_or_nursing: 0,
                has_collar: 1,
                reporter_confidence: 3,
                report_hour: 14,
                report_dayofweek: 3,
                report_month: 5,
            },
            Preset::Medium => Self {
                neighborhood: "Kombinat".to_string(),
                animal_type: "Dog".to_string(),
                age_group: "Adult".to_string(),
                behavior: "Fearful".to_string(),
                mobility: "Limping".to_string(),
                traffic_risk: "Medium".to_string(),
                weather: "Rain".to_string(),
                report_channel: "Call".to_string(),
                visible_injury: "No".to_string(),
                animal_count: 1,
                near_traffic: 1,
                near_school: 0,
                very_thin: 1,
                bleeding: 0,
                open_wound: 0,
                pregnant_or_nursing: 0,
                has_collar: 0,
                reporter_confidence: 4,
                report_hour: 18,
                report_dayofweek: 2,
                report_month: 11,
            },
            Preset::High => Self {
                neighborhood: "Kombinat".to_string(),
                animal_type: "Dog".to_string(),
                age_group: "Senior".to_string(),
                behavior: "Weak".to_string(),
                mobility: "Immobile".to_string(),
                traffic_risk: "High".to_string(),
                weather: "Heatwave".to_string(),
                report_channel: "Call".to_string(),
                visible_injury: "Yes".to_string(),
                animal_count: 1,
                near_traffic: 1,
                near_school: 1,
                very_thin: 1,
                bleeding: 1,
                open_wound: 1,
                pregnant_or_nursing: 0,
                has_collar: 0,
                reporter_confidence: 5,
                report_hour: 21,
                report_dayofweek: 5,
                report_month: 8,
            },
        }
    }
}
