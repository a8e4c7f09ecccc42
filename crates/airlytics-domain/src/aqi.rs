//! AQI bands and the health advice attached to them.

use serde::{Deserialize, Serialize};

use crate::pollutant::Pollutant;

/// One of the six ordered AQI bands.
///
/// Wire format: snake_case id (`good`, `moderate`, `unhealthy_sensitive`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

/// Inclusive upper bounds, lowest first. Anything above the last bound is hazardous.
const BANDS: [(f64, AqiCategory); 5] = [
    (50.0, AqiCategory::Good),
    (100.0, AqiCategory::Moderate),
    (150.0, AqiCategory::UnhealthySensitive),
    (200.0, AqiCategory::Unhealthy),
    (300.0, AqiCategory::VeryUnhealthy),
];

impl AqiCategory {
    pub const ALL: [AqiCategory; 6] = [
        Self::Good,
        Self::Moderate,
        Self::UnhealthySensitive,
        Self::Unhealthy,
        Self::VeryUnhealthy,
        Self::Hazardous,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Moderate => "moderate",
            Self::UnhealthySensitive => "unhealthy_sensitive",
            Self::Unhealthy => "unhealthy",
            Self::VeryUnhealthy => "very_unhealthy",
            Self::Hazardous => "hazardous",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Good => "Air quality is satisfactory. Enjoy your day outdoors!",
            Self::Moderate => {
                "Air quality is acceptable. Sensitive groups should limit vigorous outdoor activity."
            }
            Self::UnhealthySensitive => {
                "Members of sensitive groups may experience health effects. Consider reducing prolonged exertion."
            }
            Self::Unhealthy => {
                "Everyone may begin to feel health effects; sensitive groups should avoid strenuous outdoor activity."
            }
            Self::VeryUnhealthy => {
                "Health alert: everyone may experience more serious health effects. Stay indoors if possible."
            }
            Self::Hazardous => {
                "Emergency conditions. Remain indoors with filtered air and avoid outdoor exposure."
            }
        }
    }

    /// CSS class used by the dashboard badge (`health-very-unhealthy`, ...).
    pub fn badge_class(self) -> String {
        format!("health-{}", self.as_str().replace('_', "-"))
    }
}

/// Map an integer AQI to its band. Upper bounds are inclusive; negative values are `good`.
pub fn classify(aqi: i32) -> AqiCategory {
    classify_value(f64::from(aqi))
}

/// Same as [`classify`] for averaged (fractional) AQI values.
pub fn classify_value(aqi: f64) -> AqiCategory {
    BANDS
        .iter()
        .find(|(max, _)| aqi <= *max)
        .map(|(_, category)| *category)
        .unwrap_or(AqiCategory::Hazardous)
}

/// Health advice for a city card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthAdvice {
    pub category: AqiCategory,
    pub title: &'static str,
    pub description: &'static str,
    pub pollutant_advice: &'static str,
    pub badge_class: String,
}

pub fn health_advice(aqi: f64, dominant: Pollutant) -> HealthAdvice {
    let category = classify_value(aqi);
    HealthAdvice {
        category,
        title: category.title(),
        description: category.description(),
        pollutant_advice: dominant.guidance(),
        badge_class: category.badge_class(),
    }
}
