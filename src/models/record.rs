use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

/// One validated, gap-filled daily reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CleanRecord {
    pub date: NaiveDate,

    #[validate(range(min = 0.0))]
    pub rainfall_mm: f64,

    #[validate(range(min = 0.0))]
    pub growth_cm: f64,

    pub temperature_c: Option<f64>,
}

impl CleanRecord {
    pub fn new(date: NaiveDate, rainfall_mm: f64, growth_cm: f64) -> Self {
        Self {
            date,
            rainfall_mm,
            growth_cm,
            temperature_c: None,
        }
    }

    pub fn with_temperature(mut self, temperature_c: Option<f64>) -> Self {
        self.temperature_c = temperature_c;
        self
    }

    /// Rejects non-finite values (which pass a range check) and negative
    /// rainfall or growth.
    pub fn validate_record(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if !self.rainfall_mm.is_finite() {
            errors.add("rainfall_mm", ValidationError::new("finite"));
        }
        if !self.growth_cm.is_finite() {
            errors.add("growth_cm", ValidationError::new("finite"));
        }
        if self.temperature_c.is_some_and(|t| !t.is_finite()) {
            errors.add("temperature_c", ValidationError::new("finite"));
        }
        if !errors.errors().is_empty() {
            return Err(errors.into());
        }

        self.validate()?;

        Ok(())
    }
}

/// Date-ordered, duplicate-free sequence of clean records.
///
/// Every record is validated on the way in; after that the records are
/// read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<CleanRecord>,
}

impl Dataset {
    /// Validates every record, then sorts by date and keeps the first
    /// record of each date.
    pub fn from_records(mut records: Vec<CleanRecord>) -> Result<Self> {
        for record in &records {
            record.validate_record()?;
        }
        records.sort_by_key(|r| r.date);
        records.dedup_by_key(|r| r.date);
        Ok(Self { records })
    }

    pub fn records(&self) -> &[CleanRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CleanRecord> {
        self.records.iter()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    pub fn rainfall(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.rainfall_mm).collect()
    }

    pub fn growth(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.growth_cm).collect()
    }

    pub fn has_temperature(&self) -> bool {
        self.records.iter().any(|r| r.temperature_c.is_some())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a CleanRecord;
    type IntoIter = std::slice::Iter<'a, CleanRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn test_dataset_sorted_and_unique() {
        let dataset = Dataset::from_records(vec![
            CleanRecord::new(date(3), 1.0, 1.0),
            CleanRecord::new(date(1), 2.0, 2.0),
            CleanRecord::new(date(3), 9.0, 9.0),
        ])
        .unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.first_date(), Some(date(1)));
        assert_eq!(dataset.last_date(), Some(date(3)));
        // First occurrence of the duplicate date survives
        assert_eq!(dataset.records()[1].rainfall_mm, 1.0);
    }

    #[test]
    fn test_clean_record_validation() {
        let valid = CleanRecord::new(date(1), 0.0, 1.5);
        assert!(valid.validate().is_ok());

        let invalid = CleanRecord::new(date(1), -1.0, 1.5);
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_dataset_rejects_invalid_records() {
        let negative = Dataset::from_records(vec![
            CleanRecord::new(date(1), 1.0, 1.0),
            CleanRecord::new(date(2), -1.0, 1.0),
        ]);
        assert!(matches!(negative, Err(AnalysisError::Validation(_))));

        let not_finite = Dataset::from_records(vec![CleanRecord::new(date(1), 0.0, f64::NAN)]);
        match not_finite {
            Err(AnalysisError::Validation(errors)) => {
                assert!(errors.field_errors().contains_key("growth_cm"))
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        let bad_temperature = Dataset::from_records(vec![
            CleanRecord::new(date(1), 0.0, 1.0).with_temperature(Some(f64::INFINITY)),
        ]);
        assert!(bad_temperature.is_err());
    }
}
