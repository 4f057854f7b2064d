use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Least-squares line `growth = slope * rainfall + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn predict(&self, rainfall_mm: f64) -> f64 {
        self.slope * rainfall_mm + self.intercept
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
    NegativeOrNone,
    Undefined,
}

impl CorrelationStrength {
    pub fn from_coefficient(correlation: Option<f64>) -> Self {
        match correlation {
            None => CorrelationStrength::Undefined,
            Some(r) if r > 0.7 => CorrelationStrength::Strong,
            Some(r) if r > 0.4 => CorrelationStrength::Moderate,
            Some(r) if r > 0.0 => CorrelationStrength::Weak,
            Some(_) => CorrelationStrength::NegativeOrNone,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            CorrelationStrength::Strong => {
                "Strong positive correlation: more rain leads to more growth"
            }
            CorrelationStrength::Moderate => "Moderate positive correlation",
            CorrelationStrength::Weak => "Weak positive correlation",
            CorrelationStrength::NegativeOrNone => "Negative or no correlation",
            CorrelationStrength::Undefined => {
                "Correlation undefined (fewer than 2 records or a constant column)"
            }
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_records: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub avg_rainfall: f64,
    pub total_rainfall: f64,
    pub max_rainfall: f64,
    pub avg_growth: f64,
    pub max_growth: f64,
    /// `None` when the coefficient is undefined.
    pub correlation: Option<f64>,
    pub correlation_strength: CorrelationStrength,
    pub trend: Option<TrendLine>,
}

impl AnalysisSummary {
    pub fn date_range_label(&self) -> String {
        match self.date_range {
            Some((start, end)) => format!("{} to {}", start, end),
            None => "no records".to_string(),
        }
    }

    pub fn correlation_label(&self) -> String {
        match self.correlation {
            Some(r) => format!("{:.4}", r),
            None => "undefined".to_string(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Records: {}\n\
            Date Range: {}\n\
            Rainfall: avg {:.2} mm, max {:.2} mm, total {:.2} mm\n\
            Crop Growth: avg {:.2} cm, max {:.2} cm\n\
            Correlation (rainfall vs growth): {}",
            self.total_records,
            self.date_range_label(),
            self.avg_rainfall,
            self.max_rainfall,
            self.total_rainfall,
            self.avg_growth,
            self.max_growth,
            self.correlation_label(),
        )
    }

    pub fn detailed_summary(&self) -> String {
        let trend = match self.trend {
            Some(t) => format!("growth = {:.4} x rainfall + {:.4}", t.slope, t.intercept),
            None => "undefined".to_string(),
        };

        format!(
            "{}\n\
            -> {}\n\
            Trend Line: {}",
            self.summary(),
            self.correlation_strength,
            trend
        )
    }
}
