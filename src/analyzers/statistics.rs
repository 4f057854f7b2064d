use crate::models::{AnalysisSummary, CorrelationStrength, Dataset, TrendLine};
use tracing::{debug, info};

/// Computes the scalar summary of a cleaned dataset.
pub struct StatisticsSummarizer;

impl StatisticsSummarizer {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, dataset: &Dataset) -> AnalysisSummary {
        let rainfall = dataset.rainfall();
        let growth = dataset.growth();

        let date_range = dataset.first_date().zip(dataset.last_date());
        let correlation = pearson_correlation(&rainfall, &growth);
        let trend = linear_fit(&rainfall, &growth);

        let summary = AnalysisSummary {
            total_records: dataset.len(),
            date_range,
            avg_rainfall: mean(&rainfall),
            total_rainfall: rainfall.iter().sum(),
            max_rainfall: max(&rainfall),
            avg_growth: mean(&growth),
            max_growth: max(&growth),
            correlation,
            correlation_strength: CorrelationStrength::from_coefficient(correlation),
            trend,
        };

        info!(
            "Correlation between rainfall and crop growth: {}",
            summary.correlation_label()
        );
        debug!("Summary: {:?}", summary);
        summary
    }
}

impl Default for StatisticsSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Largest value; 0 for an empty slice.
pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Sums of centred cross products: (sxx, syy, sxy, mean_x, mean_y).
fn centred_moments(x: &[f64], y: &[f64]) -> (f64, f64, f64, f64, f64) {
    let mean_x = mean(x);
    let mean_y = mean(y);
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    (sxx, syy, sxy, mean_x, mean_y)
}

/// Pearson correlation coefficient.
///
/// Returns `None` when there are fewer than two pairs, the slices differ in
/// length, or either series is constant.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 || is_constant(x) || is_constant(y) {
        return None;
    }

    let dx = scaled_deviations(x)?;
    let dy = scaled_deviations(y)?;
    let (mut sxx, mut syy, mut sxy) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (a, b) in dx.iter().zip(&dy) {
        sxx += a * a;
        syy += b * b;
        sxy += a * b;
    }

    let denominator = sxx.sqrt() * syy.sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    Some((sxy / denominator).clamp(-1.0, 1.0))
}

/// Deviations from the mean divided by the largest one, so every term lies
/// in [-1, 1] and squaring cannot overflow.
fn scaled_deviations(values: &[f64]) -> Option<Vec<f64>> {
    let centre = values
        .iter()
        .enumerate()
        .fold(0.0_f64, |m, (i, v)| m + (v - m) / (i + 1) as f64);
    let deviations: Vec<f64> = values.iter().map(|v| v - centre).collect();
    let scale = deviations.iter().fold(0.0_f64, |m, d| m.max(d.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }
    Some(deviations.iter().map(|d| d / scale).collect())
}

/// First-degree least-squares fit of `y` against `x`.
///
/// Returns `None` when there are fewer than two pairs or `x` is constant.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<TrendLine> {
    if x.len() != y.len() || x.len() < 2 || is_constant(x) {
        return None;
    }

    let (sxx, _, sxy, mean_x, mean_y) = centred_moments(x, y);
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(TrendLine {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}
