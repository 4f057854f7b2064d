//! Chart-ready data series for the four-panel dashboard.
//!
//! Panels: daily rainfall bars, daily growth line, rainfall-vs-growth scatter
//! with a trend overlay, and weekly rainfall totals against mean growth.
//! Only the data is produced here; drawing is left to the consumer.

use crate::models::{AnalysisSummary, Dataset, WeeklyAggregate};
use crate::utils::constants::TREND_LINE_POINTS;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatePoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XyPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub name: String,
    pub unit: String,
    pub points: Vec<DatePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterSeries {
    pub name: String,
    pub points: Vec<XyPoint>,
    pub trend_name: String,
    /// Empty when the trend line is undefined.
    pub trend: Vec<XyPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySeries {
    pub name: String,
    pub week_starts: Vec<NaiveDate>,
    pub rainfall_total_mm: Vec<f64>,
    pub growth_mean_cm: Vec<f64>,
}

/// The four named series, in panel order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub daily_rainfall: TimeSeries,
    pub daily_growth: TimeSeries,
    pub rainfall_vs_growth: ScatterSeries,
    pub weekly_trends: WeeklySeries,
}

impl ChartSeries {
    /// Rebuild `(date, rainfall, growth)` rows from the two daily series.
    ///
    /// Returns `None` if the series disagree on length or dates.
    pub fn reconstruct_daily(&self) -> Option<Vec<(NaiveDate, f64, f64)>> {
        let rainfall = &self.daily_rainfall.points;
        let growth = &self.daily_growth.points;
        if rainfall.len() != growth.len() {
            return None;
        }

        rainfall
            .iter()
            .zip(growth)
            .map(|(r, g)| (r.date == g.date).then_some((r.date, r.value, g.value)))
            .collect()
    }
}

pub struct ChartDataAdapter {
    trend_points: usize,
}

impl ChartDataAdapter {
    pub fn new() -> Self {
        Self {
            trend_points: TREND_LINE_POINTS,
        }
    }

    pub fn with_trend_points(trend_points: usize) -> Self {
        Self { trend_points }
    }

    pub fn build(
        &self,
        dataset: &Dataset,
        summary: &AnalysisSummary,
        weekly: &[WeeklyAggregate],
    ) -> ChartSeries {
        let daily_rainfall = TimeSeries {
            name: "Daily Rainfall".to_string(),
            unit: "mm".to_string(),
            points: dataset
                .iter()
                .map(|r| DatePoint {
                    date: r.date,
                    value: r.rainfall_mm,
                })
                .collect(),
        };

        let daily_growth = TimeSeries {
            name: "Daily Crop Growth".to_string(),
            unit: "cm".to_string(),
            points: dataset
                .iter()
                .map(|r| DatePoint {
                    date: r.date,
                    value: r.growth_cm,
                })
                .collect(),
        };

        let points: Vec<XyPoint> = dataset
            .iter()
            .map(|r| XyPoint {
                x: r.rainfall_mm,
                y: r.growth_cm,
            })
            .collect();

        let trend = match summary.trend {
            Some(line) => {
                let min = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
                let max = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
                linspace(min, max, self.trend_points)
                    .into_iter()
                    .map(|x| XyPoint {
                        x,
                        y: line.predict(x),
                    })
                    .collect()
            }
            None => Vec::new(),
        };

        let trend_name = match summary.correlation {
            Some(r) => format!("Trend (R={:.2})", r),
            None => "Trend (R=undefined)".to_string(),
        };

        let weekly_trends = WeeklySeries {
            name: "Weekly Trends".to_string(),
            week_starts: weekly.iter().map(|w| w.week_start).collect(),
            rainfall_total_mm: weekly.iter().map(|w| w.rainfall_total_mm).collect(),
            growth_mean_cm: weekly.iter().map(|w| w.growth_mean_cm).collect(),
        };

        ChartSeries {
            daily_rainfall,
            daily_growth,
            rainfall_vs_growth: ScatterSeries {
                name: "Rainfall vs Growth Correlation".to_string(),
                points,
                trend_name,
                trend,
            },
            weekly_trends,
        }
    }
}

impl Default for ChartDataAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// `count` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
