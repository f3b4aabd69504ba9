//! Reshaping of the provider's 3-hour forecast series.
//!
//! The series is turned into two views: the next 24 hours verbatim, and one
//! summary per calendar day in the location's local time.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Timelike, Utc};

use crate::model::{DailyPoint, HourlyPoint};

/// 8 samples x 3 hours.
pub const HOURLY_SAMPLES: usize = 8;

const LOCAL_NOON_SECS: i64 = 12 * 60 * 60;

/// One entry of the 3-hour series, already detached from the wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    pub time: DateTime<Utc>,
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    /// Probability of precipitation as reported, a fraction in `[0, 1]`.
    pub pop: f64,
    pub icon: String,
    pub description: String,
}

impl ForecastSample {
    pub fn precipitation_pct(&self) -> f64 {
        self.pop * 100.0
    }
}

/// UTC offset in seconds as a `FixedOffset`; out-of-range values fall back to UTC.
pub fn offset_from_secs(secs: i32) -> FixedOffset {
    FixedOffset::east_opt(secs).unwrap_or_else(|| Utc.fix())
}

pub fn local_date(time: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    time.with_timezone(&offset).date_naive()
}

fn noon_distance_secs(time: DateTime<Utc>, offset: FixedOffset) -> i64 {
    let since_midnight = i64::from(time.with_timezone(&offset).num_seconds_from_midnight());
    (since_midnight - LOCAL_NOON_SECS).abs()
}

pub fn hourly_points(samples: &[ForecastSample]) -> Vec<HourlyPoint> {
    samples
        .iter()
        .take(HOURLY_SAMPLES)
        .map(|s| HourlyPoint {
            time: s.time,
            temp: s.temp,
            icon: s.icon.clone(),
            description: s.description.clone(),
            precipitation: s.precipitation_pct(),
        })
        .collect()
}

/// Groups samples by local calendar date. Dates iterate ascending and each
/// group keeps the input order.
pub fn group_by_local_date(
    samples: &[ForecastSample],
    offset: FixedOffset,
) -> BTreeMap<NaiveDate, Vec<&ForecastSample>> {
    let mut days: BTreeMap<NaiveDate, Vec<&ForecastSample>> = BTreeMap::new();
    for sample in samples {
        days.entry(local_date(sample.time, offset)).or_default().push(sample);
    }
    days
}

/// The sample closest to local noon; the earliest one wins a tie.
pub fn representative<'a>(
    group: &[&'a ForecastSample],
    offset: FixedOffset,
) -> Option<&'a ForecastSample> {
    // min_by_key keeps the first of equal minima.
    group.iter().copied().min_by_key(|s| noon_distance_secs(s.time, offset))
}

/// One summary per local calendar date, in ascending date order. Every day
/// the series touches is emitted.
pub fn daily_points(samples: &[ForecastSample], offset: FixedOffset) -> Vec<DailyPoint> {
    group_by_local_date(samples, offset)
        .into_iter()
        .filter_map(|(date, group)| summarize_day(date, &group, offset))
        .collect()
}

fn summarize_day(
    date: NaiveDate,
    group: &[&ForecastSample],
    offset: FixedOffset,
) -> Option<DailyPoint> {
    let rep = representative(group, offset)?;

    // Each sample contributes min(temp, temp_min) and max(temp, temp_max), so
    // the day's min never exceeds its max.
    let temp_max = group.iter().map(|s| s.temp.max(s.temp_max)).fold(f64::MIN, f64::max);
    let temp_min = group.iter().map(|s| s.temp.min(s.temp_min)).fold(f64::MAX, f64::min);

    let humidity_sum: u32 = group.iter().map(|s| u32::from(s.humidity)).sum();
    let humidity = (f64::from(humidity_sum) / group.len() as f64).round() as u8;

    let wind_speed = group.iter().map(|s| s.wind_speed).fold(0.0, f64::max);
    let precipitation = group.iter().map(|s| s.precipitation_pct()).fold(0.0, f64::max);

    Some(DailyPoint {
        date,
        time: rep.time,
        temp_max,
        temp_min,
        icon: rep.icon.clone(),
        description: rep.description.clone(),
        humidity,
        wind_speed,
        precipitation,
    })
}
