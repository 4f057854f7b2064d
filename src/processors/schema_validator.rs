use crate::error::{AnalysisError, Result};
use crate::models::ColumnLayout;
use crate::utils::constants::{
    COLUMN_DATE, COLUMN_GROWTH, COLUMN_RAINFALL, COLUMN_TEMPERATURE, REQUIRED_COLUMNS,
};
use tracing::debug;

/// Checks that the mandatory columns exist before any row is touched.
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the column layout, or fail naming every missing mandatory column.
    pub fn validate(&self, headers: &[String]) -> Result<ColumnLayout> {
        let position = |name: &str| headers.iter().position(|h| normalize_header(h) == name);

        let date = position(COLUMN_DATE);
        let rainfall = position(COLUMN_RAINFALL);
        let growth = position(COLUMN_GROWTH);

        match (date, rainfall, growth) {
            (Some(date), Some(rainfall), Some(growth)) => {
                let layout = ColumnLayout {
                    date,
                    rainfall,
                    growth,
                    temperature: position(COLUMN_TEMPERATURE),
                };
                debug!("Resolved column layout: {:?}", layout);
                Ok(layout)
            }
            _ => {
                let missing = REQUIRED_COLUMNS
                    .into_iter()
                    .zip([date, rainfall, growth])
                    .filter(|(_, index)| index.is_none())
                    .map(|(name, _)| name.to_string())
                    .collect();
                Err(AnalysisError::Schema { missing })
            }
        }
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_header(header: &str) -> &str {
    header.trim_start_matches('\u{feff}').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_layout_with_temperature() {
        let layout = SchemaValidator::new()
            .validate(&headers(&["Temperature_C", "Date", "Crop_Growth_cm", "Rainfall_mm"]))
            .unwrap();

        assert_eq!(
            layout,
            ColumnLayout {
                date: 1,
                rainfall: 3,
                growth: 2,
                temperature: Some(0),
            }
        );
    }

    #[test]
    fn test_temperature_is_optional() {
        let layout = SchemaValidator::new()
            .validate(&headers(&[" Date ", "Rainfall_mm", "Crop_Growth_cm"]))
            .unwrap();
        assert_eq!(layout.temperature, None);
        assert_eq!(layout.date, 0);
    }

    #[test]
    fn test_missing_rainfall() {
        let err = SchemaValidator::new()
            .validate(&headers(&["Date", "Crop_Growth_cm"]))
            .unwrap_err();

        match err {
            AnalysisError::Schema { missing } => assert_eq!(missing, vec!["Rainfall_mm"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_every_missing_column_is_reported() {
        let err = SchemaValidator::new()
            .validate(&headers(&["Temperature_C"]))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Missing required columns: Date, Rainfall_mm, Crop_Growth_cm"
        );
    }
}
