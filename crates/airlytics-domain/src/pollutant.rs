//! Pollutant identifiers and concentration sets.

use serde::{Deserialize, Serialize};

/// One of the six tracked pollutants.
///
/// Declaration order is significant: it breaks ties in [`dominant_pollutant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pollutant {
    Pm25,
    Pm10,
    Co,
    No2,
    So2,
    O3,
}

impl Pollutant {
    pub const ALL: [Pollutant; 6] = [
        Self::Pm25,
        Self::Pm10,
        Self::Co,
        Self::No2,
        Self::So2,
        Self::O3,
    ];

    /// Wire / column value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pm25 => "pm25",
            Self::Pm10 => "pm10",
            Self::Co => "co",
            Self::No2 => "no2",
            Self::So2 => "so2",
            Self::O3 => "o3",
        }
    }

    /// Parse a wire / column value. Returns `None` for unknown codes.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    /// Health guidance shown next to the AQI band when this pollutant dominates.
    pub fn guidance(self) -> &'static str {
        match self {
            Self::Pm25 => {
                "Fine particles penetrate deep into lungs and bloodstream. Limit outdoor air exposure."
            }
            Self::Pm10 => {
                "Coarse particles irritate lungs and eyes. Masks can help reduce irritation."
            }
            Self::Co => {
                "Carbon Monoxide lowers oxygen delivery. Avoid high traffic areas and ensure good ventilation."
            }
            Self::No2 => "Nitrogen dioxide irritates airways. Consider indoor air purifiers.",
            Self::So2 => {
                "Sulfur dioxide can trigger asthma symptoms. Keep rescue medication nearby."
            }
            Self::O3 => "Ground-level ozone inflames airways. Exercise indoors when possible.",
        }
    }
}

/// Return the pollutant with the highest concentration.
///
/// Missing (`None`) and non-finite values are skipped. Ties resolve to the pollutant
/// declared first in [`Pollutant`]. Defaults to `pm25` when nothing is usable.
pub fn dominant_pollutant<I>(entries: I) -> Pollutant
where
    I: IntoIterator<Item = (Pollutant, Option<f64>)>,
{
    let mut best: Option<(Pollutant, f64)> = None;
    for (pollutant, value) in entries {
        let Some(value) = value.filter(|v| v.is_finite()) else {
            continue;
        };
        best = match best {
            Some((current, current_value))
                if current_value > value || (current_value == value && current < pollutant) =>
            {
                Some((current, current_value))
            }
            _ => Some((pollutant, value)),
        };
    }
    best.map(|(p, _)| p).unwrap_or(Pollutant::Pm25)
}

/// Concentrations for all six pollutants.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PollutantLevels {
    pub pm25: f64,
    pub pm10: f64,
    pub co: f64,
    pub no2: f64,
    pub so2: f64,
    pub o3: f64,
}

impl PollutantLevels {
    pub fn get(&self, pollutant: Pollutant) -> f64 {
        match pollutant {
            Pollutant::Pm25 => self.pm25,
            Pollutant::Pm10 => self.pm10,
            Pollutant::Co => self.co,
            Pollutant::No2 => self.no2,
            Pollutant::So2 => self.so2,
            Pollutant::O3 => self.o3,
        }
    }

    pub fn entries(&self) -> [(Pollutant, f64); 6] {
        Pollutant::ALL.map(|p| (p, self.get(p)))
    }

    pub fn dominant(&self) -> Pollutant {
        dominant_pollutant(self.entries().map(|(p, v)| (p, Some(v))))
    }

    /// Component-wise mean. Returns all zeros for an empty slice.
    pub fn mean(levels: &[PollutantLevels]) -> PollutantLevels {
        if levels.is_empty() {
            return PollutantLevels::default();
        }
        let n = levels.len() as f64;
        let sum = levels.iter().fold(PollutantLevels::default(), |acc, l| PollutantLevels {
            pm25: acc.pm25 + l.pm25,
            pm10: acc.pm10 + l.pm10,
            co: acc.co + l.co,
            no2: acc.no2 + l.no2,
            so2: acc.so2 + l.so2,
            o3: acc.o3 + l.o3,
        });
        PollutantLevels {
            pm25: sum.pm25 / n,
            pm10: sum.pm10 / n,
            co: sum.co / n,
            no2: sum.no2 / n,
            so2: sum.so2 / n,
            o3: sum.o3 / n,
        }
    }

    /// Every value rounded to two decimal places.
    pub fn rounded(&self) -> PollutantLevels {
        PollutantLevels {
            pm25: round2(self.pm25),
            pm10: round2(self.pm10),
            co: round2(self.co),
            no2: round2(self.no2),
            so2: round2(self.so2),
            o3: round2(self.o3),
        }
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
