use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One 7-day bin of daily readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAggregate {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub record_count: usize,
    pub rainfall_total_mm: f64,
    pub growth_mean_cm: f64,
    pub temperature_mean_c: Option<f64>,
}
