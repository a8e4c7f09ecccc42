//! Pure analytics over already-fetched rows.
//!
//! Nothing here touches storage; use cases fetch the rows and call in.

use std::collections::{BTreeMap, HashMap, HashSet};

use airlytics_core::serde::to_rfc3339_ms;
use airlytics_domain::aqi::{AqiCategory, HealthAdvice, classify_value, health_advice};
use airlytics_domain::pollutant::{Pollutant, PollutantLevels, round2};
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use serde::Serialize;

use crate::domain::types::{
    AGGREGATE_TREND_DAYS, City, DailySummary, IMPROVEMENT_TRACKER_LEN, MOST_IMPROVED_LIMIT,
    Reading,
};

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

// ── City analytics ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub timestamp: DateTime<Utc>,
    pub aqi: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyBucket {
    pub hour: u32,
    pub average_aqi: f64,
}

/// `weekday` counts from Sunday (0) to Saturday (6).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayBucket {
    pub weekday: u32,
    pub average_aqi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerEntry {
    pub date: NaiveDate,
    pub avg_aqi: f64,
    pub trend_score: f64,
    pub dominant_pollutant: Pollutant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestReading {
    pub aqi: i32,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityAnalytics {
    pub city: City,
    pub aqi_trend: Vec<TrendPoint>,
    pub pollutant_snapshot: Option<PollutantLevels>,
    pub dominant_pollutant: Pollutant,
    pub health_impact: Option<HealthAdvice>,
    pub hourly_pattern: Vec<HourlyBucket>,
    pub weekday_pattern: Vec<WeekdayBucket>,
    pub improvement_tracker: Vec<TrackerEntry>,
    pub latest_reading: Option<LatestReading>,
}

/// Build the per-city analytics payload.
///
/// - `recent`: readings from the short trend window, oldest first.
/// - `extended`: readings from the pattern window, oldest first.
/// - `summaries`: most recent daily summaries, newest first.
///
/// Hour and weekday buckets use UTC.
pub fn build_city_analytics(
    city: City,
    recent: &[Reading],
    extended: &[Reading],
    summaries: &[DailySummary],
) -> CityAnalytics {
    let latest = recent.last().or(extended.last());

    let aqi_trend = recent
        .iter()
        .map(|r| TrendPoint {
            timestamp: r.recorded_at,
            aqi: r.aqi,
        })
        .collect();

    let mut hourly: Vec<Vec<f64>> = vec![Vec::new(); 24];
    let mut weekday: Vec<Vec<f64>> = vec![Vec::new(); 7];
    for reading in extended {
        let hour = reading.recorded_at.hour() as usize;
        let day = reading.recorded_at.weekday().num_days_from_sunday() as usize;
        hourly[hour].push(f64::from(reading.aqi));
        weekday[day].push(f64::from(reading.aqi));
    }
    let hourly_pattern = hourly
        .iter()
        .enumerate()
        .map(|(hour, bucket)| HourlyBucket {
            hour: hour as u32,
            average_aqi: round2(mean(bucket)),
        })
        .collect();
    let weekday_pattern = weekday
        .iter()
        .enumerate()
        .map(|(day, bucket)| WeekdayBucket {
            weekday: day as u32,
            average_aqi: round2(mean(bucket)),
        })
        .collect();

    let improvement_tracker: Vec<TrackerEntry> = summaries
        .iter()
        .take(IMPROVEMENT_TRACKER_LEN)
        .rev()
        .map(|s| TrackerEntry {
            date: s.date,
            avg_aqi: round2(s.avg_aqi),
            trend_score: round2(s.trend_score),
            dominant_pollutant: s.dominant_pollutant,
        })
        .collect();
    let latest_summary = improvement_tracker.last();

    let dominant_pollutant = latest
        .map(|r| r.dominant_pollutant)
        .or(latest_summary.map(|s| s.dominant_pollutant))
        .unwrap_or(Pollutant::Pm25);

    let health_impact = match (latest, latest_summary) {
        (Some(reading), _) => Some(health_advice(f64::from(reading.aqi), dominant_pollutant)),
        (None, Some(summary)) => Some(health_advice(summary.avg_aqi, dominant_pollutant)),
        (None, None) => None,
    };

    CityAnalytics {
        city,
        aqi_trend,
        pollutant_snapshot: latest.map(|r| r.levels.rounded()),
        dominant_pollutant,
        health_impact,
        hourly_pattern,
        weekday_pattern,
        improvement_tracker,
        latest_reading: latest.map(|r| LatestReading {
            aqi: r.aqi,
            recorded_at: r.recorded_at,
        }),
    }
}

// ── Overview ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCity {
    pub city_id: i32,
    pub city_name: String,
    pub country: String,
    pub region: Option<String>,
    pub aqi: f64,
    pub category: AqiCategory,
}

/// A selected city with no daily summary; kept out of every ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnrankedCity {
    pub city_id: i32,
    pub city_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionAverage {
    pub region: String,
    pub average_aqi: f64,
    pub city_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub avg_aqi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImprovedCity {
    pub city_id: i32,
    pub city_name: String,
    pub trend_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rankings {
    pub worst: Option<RankedCity>,
    pub best: Option<RankedCity>,
    pub most_improved: Vec<ImprovedCity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    /// Ranked by latest daily AQI, worst first.
    pub cities: Vec<RankedCity>,
    pub unranked_cities: Vec<UnrankedCity>,
    pub average_pollutants: PollutantLevels,
    pub category_distribution: BTreeMap<AqiCategory, u32>,
    pub regional_correlation: Vec<RegionAverage>,
    pub rankings: Rankings,
    pub three_day_aggregate_change: Vec<DailyAggregate>,
}

impl Overview {
    /// Fixed shape with every collection empty and every scalar zeroed.
    pub fn empty() -> Self {
        Self {
            cities: Vec::new(),
            unranked_cities: Vec::new(),
            average_pollutants: PollutantLevels::default(),
            category_distribution: BTreeMap::new(),
            regional_correlation: Vec::new(),
            rankings: Rankings {
                worst: None,
                best: None,
                most_improved: Vec::new(),
            },
            three_day_aggregate_change: Vec::new(),
        }
    }
}

/// Aggregate the latest daily summaries of `cities` into rankings and distributions.
///
/// Summaries for cities outside `cities` are ignored. Cities without any summary are
/// listed in `unranked_cities` and take no part in rankings, distribution or regions.
pub fn build_overview(cities: &[City], summaries: &[DailySummary]) -> Overview {
    if cities.is_empty() {
        return Overview::empty();
    }

    let selected: HashSet<i32> = cities.iter().map(|c| c.id).collect();
    let mut summaries: Vec<&DailySummary> = summaries
        .iter()
        .filter(|s| selected.contains(&s.city_id))
        .collect();
    // Newest first; stable so equal dates keep fetch order.
    summaries.sort_by(|a, b| b.date.cmp(&a.date));

    let mut latest: HashMap<i32, &DailySummary> = HashMap::new();
    for summary in &summaries {
        latest.entry(summary.city_id).or_insert(summary);
    }

    let mut ranked = Vec::new();
    let mut unranked_cities = Vec::new();
    for city in cities {
        match latest.get(&city.id) {
            Some(summary) => ranked.push((city, summary.avg_aqi)),
            None => unranked_cities.push(UnrankedCity {
                city_id: city.id,
                city_name: city.name.clone(),
            }),
        }
    }
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut category_distribution = BTreeMap::new();
    let mut regions: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (city, aqi) in &ranked {
        *category_distribution.entry(classify_value(*aqi)).or_insert(0) += 1;
        regions.entry(city.region_key()).or_default().push(*aqi);
    }

    let mut regional_correlation: Vec<RegionAverage> = regions
        .into_iter()
        .map(|(region, values)| RegionAverage {
            region: region.to_owned(),
            average_aqi: round2(mean(&values)),
            city_count: values.len(),
        })
        .collect();
    regional_correlation.sort_by(|a, b| b.average_aqi.total_cmp(&a.average_aqi));

    let levels: Vec<PollutantLevels> = summaries.iter().map(|s| s.avg_levels).collect();
    let average_pollutants = PollutantLevels::mean(&levels).rounded();

    let cities_out: Vec<RankedCity> = ranked
        .iter()
        .map(|(city, aqi)| RankedCity {
            city_id: city.id,
            city_name: city.name.clone(),
            country: city.country.clone(),
            region: city.region.clone(),
            aqi: round2(*aqi),
            category: classify_value(*aqi),
        })
        .collect();

    Overview {
        rankings: Rankings {
            worst: cities_out.first().cloned(),
            best: cities_out.last().cloned(),
            most_improved: most_improved(cities, &summaries),
        },
        cities: cities_out,
        unranked_cities,
        average_pollutants,
        category_distribution,
        regional_correlation,
        three_day_aggregate_change: aggregate_trend(&summaries),
    }
}

/// Mean AQI across cities for each of the most recent distinct summary dates, oldest first.
fn aggregate_trend(summaries: &[&DailySummary]) -> Vec<DailyAggregate> {
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for summary in summaries {
        by_date.entry(summary.date).or_default().push(summary.avg_aqi);
    }
    let mut recent: Vec<DailyAggregate> = by_date
        .into_iter()
        .rev()
        .take(AGGREGATE_TREND_DAYS)
        .map(|(date, values)| DailyAggregate {
            date,
            avg_aqi: round2(mean(&values)),
        })
        .collect();
    recent.reverse();
    recent
}

/// Cities with the most negative trend score, one entry per city.
fn most_improved(cities: &[City], summaries: &[&DailySummary]) -> Vec<ImprovedCity> {
    let mut best_score: HashMap<i32, f64> = HashMap::new();
    for summary in summaries.iter().filter(|s| s.trend_score < 0.0) {
        best_score
            .entry(summary.city_id)
            .and_modify(|score| *score = score.min(summary.trend_score))
            .or_insert(summary.trend_score);
    }

    let mut improved: Vec<ImprovedCity> = cities
        .iter()
        .filter_map(|city| {
            best_score.get(&city.id).map(|score| ImprovedCity {
                city_id: city.id,
                city_name: city.name.clone(),
                trend_score: round2(*score),
            })
        })
        .collect();
    improved.sort_by(|a, b| a.trend_score.total_cmp(&b.trend_score));
    improved.truncate(MOST_IMPROVED_LIMIT);
    improved
}

// ── Daily summaries ───────────────────────────────────────────────────────────

/// Roll one city's readings up into one summary per UTC calendar date, with trend scores.
///
/// `previous` is the stored summary for the last day before the readings start. The
/// earliest built day is scored against it, or 0 when there is none.
pub fn build_daily_summaries(
    city_id: i32,
    readings: &[Reading],
    previous: Option<&DailySummary>,
) -> Vec<DailySummary> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&Reading>> = BTreeMap::new();
    for reading in readings.iter().filter(|r| r.city_id == city_id) {
        by_date
            .entry(reading.recorded_at.date_naive())
            .or_default()
            .push(reading);
    }

    let mut summaries: Vec<DailySummary> = by_date
        .into_iter()
        .map(|(date, day)| {
            let aqis: Vec<f64> = day.iter().map(|r| f64::from(r.aqi)).collect();
            let levels: Vec<PollutantLevels> = day.iter().map(|r| r.levels).collect();
            let avg_levels = PollutantLevels::mean(&levels);
            DailySummary {
                city_id,
                date,
                avg_aqi: round2(mean(&aqis)),
                min_aqi: day.iter().map(|r| r.aqi).min().unwrap_or_default(),
                max_aqi: day.iter().map(|r| r.aqi).max().unwrap_or_default(),
                dominant_pollutant: avg_levels.dominant(),
                avg_levels: avg_levels.rounded(),
                trend_score: 0.0,
                reading_count: day.len() as u32,
            }
        })
        .collect();
    apply_trend_scores(&mut summaries);
    if let (Some(first), Some(previous)) = (summaries.first_mut(), previous) {
        first.trend_score = round2(first.avg_aqi - previous.avg_aqi);
    }
    summaries
}

/// Set each summary's `trend_score` to its `avg_aqi` minus the previous available day's
/// for the same city. The earliest day of each city scores 0.
///
/// The slice is reordered by `(city_id, date)`.
pub fn apply_trend_scores(summaries: &mut [DailySummary]) {
    summaries.sort_by(|a, b| (a.city_id, a.date).cmp(&(b.city_id, b.date)));
    let mut previous: Option<(i32, f64)> = None;
    for summary in summaries.iter_mut() {
        summary.trend_score = match previous {
            Some((city_id, avg)) if city_id == summary.city_id => round2(summary.avg_aqi - avg),
            _ => 0.0,
        };
        previous = Some((summary.city_id, summary.avg_aqi));
    }
}
