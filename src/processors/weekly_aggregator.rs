use crate::models::{CleanRecord, Dataset, WeeklyAggregate};
use crate::utils::constants::WEEK_LENGTH_DAYS;
use chrono::Duration;
use std::collections::BTreeMap;
use tracing::debug;

/// Groups daily records into fixed 7-day bins anchored at the first date.
///
/// Bin `k` covers `start + 7k ..= start + 7k + 6`. Only bins holding at
/// least one record are emitted. Rainfall is summed, growth and temperature
/// are averaged.
pub struct WeeklyAggregator {
    bin_days: i64,
}

impl WeeklyAggregator {
    pub fn new() -> Self {
        Self {
            bin_days: WEEK_LENGTH_DAYS,
        }
    }

    pub fn aggregate(&self, dataset: &Dataset) -> Vec<WeeklyAggregate> {
        let Some(anchor) = dataset.first_date() else {
            return Vec::new();
        };

        let mut bins: BTreeMap<i64, Vec<&CleanRecord>> = BTreeMap::new();
        for record in dataset {
            let offset = record.date.signed_duration_since(anchor).num_days();
            bins.entry(offset.div_euclid(self.bin_days))
                .or_default()
                .push(record);
        }

        let weekly: Vec<WeeklyAggregate> = bins
            .into_iter()
            .map(|(index, records)| {
                let week_start = anchor + Duration::days(index * self.bin_days);
                self.summarize_bin(week_start, &records)
            })
            .collect();

        debug!(
            "Aggregated {} records into {} weekly bins",
            dataset.len(),
            weekly.len()
        );
        weekly
    }

    fn summarize_bin(
        &self,
        week_start: chrono::NaiveDate,
        records: &[&CleanRecord],
    ) -> WeeklyAggregate {
        let count = records.len();
        let rainfall_total_mm: f64 = records.iter().map(|r| r.rainfall_mm).sum();
        let growth_total: f64 = records.iter().map(|r| r.growth_cm).sum();

        let temperatures: Vec<f64> = records.iter().filter_map(|r| r.temperature_c).collect();
        let temperature_mean_c = if temperatures.is_empty() {
            None
        } else {
            Some(temperatures.iter().sum::<f64>() / temperatures.len() as f64)
        };

        WeeklyAggregate {
            week_start,
            week_end: week_start + Duration::days(self.bin_days - 1),
            record_count: count,
            rainfall_total_mm,
            growth_mean_cm: growth_total / count as f64,
            temperature_mean_c,
        }
    }
}

impl Default for WeeklyAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, n).unwrap()
    }

    fn dataset(days: &[(u32, f64, f64)]) -> Dataset {
        Dataset::from_records(
            days.iter()
                .map(|&(d, rain, growth)| CleanRecord::new(day(d), rain, growth))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_dataset() {
        assert!(WeeklyAggregator::new().aggregate(&Dataset::default()).is_empty());
    }

    #[test]
    fn test_bins_anchor_at_first_date() {
        // 2025-01-02 is a Thursday; bins run Thursday to Wednesday
        let data = dataset(&[(2, 1.0, 2.0), (8, 3.0, 4.0), (9, 5.0, 6.0), (15, 7.0, 8.0)]);
        let weekly = WeeklyAggregator::new().aggregate(&data);

        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].week_start, day(2));
        assert_eq!(weekly[0].week_end, day(8));
        assert_eq!(weekly[0].record_count, 2);
        assert_eq!(weekly[0].rainfall_total_mm, 4.0);
        assert_eq!(weekly[0].growth_mean_cm, 3.0);

        assert_eq!(weekly[1].week_start, day(9));
        assert_eq!(weekly[1].record_count, 2);
        assert_eq!(weekly[1].rainfall_total_mm, 12.0);
        assert_eq!(weekly[1].week_end, day(15));
        assert_eq!(weekly[1].growth_mean_cm, 7.0);
    }

    #[test]
    fn test_empty_bins_are_skipped() {
        let data = dataset(&[(1, 1.0, 1.0), (29, 2.0, 2.0)]);
        let weekly = WeeklyAggregator::new().aggregate(&data);

        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[1].week_start, day(29));
    }

    #[test]
    fn test_temperature_mean() {
        let data = Dataset::from_records(vec![
            CleanRecord::new(day(1), 0.0, 1.0).with_temperature(Some(20.0)),
            CleanRecord::new(day(2), 0.0, 1.0).with_temperature(None),
            CleanRecord::new(day(3), 0.0, 1.0).with_temperature(Some(24.0)),
        ])
        .unwrap();
        let weekly = WeeklyAggregator::new().aggregate(&data);
        assert_eq!(weekly[0].temperature_mean_c, Some(22.0));
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let data = dataset(&[(1, 1.5, 2.0), (3, 0.0, 2.2), (10, 4.2, 2.9), (20, 8.0, 3.3)]);
        let aggregator = WeeklyAggregator::new();
        assert_eq!(aggregator.aggregate(&data), aggregator.aggregate(&data));
    }
}
