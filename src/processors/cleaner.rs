use crate::error::Result;
use crate::models::warning::describe_rows;
use crate::models::{CleanRecord, CleaningWarning, Dataset, RawRecord, WarningCategory};
use crate::utils::constants::{
    COLUMN_GROWTH, COLUMN_RAINFALL, COLUMN_TEMPERATURE, DATE_FORMAT, MISSING_TOKENS,
};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

/// Result of cleaning: the dataset plus an account of every correction made.
#[derive(Debug, Clone, Default)]
pub struct CleaningOutcome {
    pub dataset: Dataset,
    pub warnings: Vec<CleaningWarning>,
}

/// A raw record whose date parsed.
#[derive(Debug, Clone, Copy)]
pub struct DatedRecord<'a> {
    pub date: NaiveDate,
    pub raw: &'a RawRecord,
}

/// A dated row with numeric cells; `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub row: usize,
    pub date: NaiveDate,
    pub rainfall: Option<f64>,
    pub growth: Option<f64>,
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    Missing,
    Invalid,
    Number(f64),
}

/// How a column's gaps were filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GapFill {
    pub filled: usize,
    pub empty_column: bool,
}

/// Turns raw rows into a [`Dataset`]. Data-quality problems never fail the
/// run; they are repaired and reported as warnings.
pub struct DataCleaner;

impl DataCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Only fails if a repaired record still breaks the record invariants.
    pub fn clean(&self, records: &[RawRecord]) -> Result<CleaningOutcome> {
        let mut warnings = Vec::new();

        let dated = parse_dates(records, &mut warnings);
        let mut rows = coerce_values(&dated, &mut warnings);
        correct_negatives(&mut rows, &mut warnings);
        let filled = fill_gaps(&rows, &mut warnings);
        let dataset = sort_and_deduplicate(filled, &mut warnings)?;

        for warning in &warnings {
            warn!("{}", warning);
        }
        info!(
            "Data validation complete. {} valid records ({} warnings)",
            dataset.len(),
            warnings.len()
        );

        Ok(CleaningOutcome { dataset, warnings })
    }
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a `YYYY-MM-DD` date. A trailing time of day is accepted and dropped.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Coerce a cell to a number. Blank cells and placeholders such as `NA` are
/// missing; anything else that is not a finite number is invalid.
pub fn coerce_number(value: &str) -> CellValue {
    let value = value.trim();
    if MISSING_TOKENS.contains(&value.to_ascii_lowercase().as_str()) {
        return CellValue::Missing;
    }
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => CellValue::Number(number),
        _ => CellValue::Invalid,
    }
}

/// Step 1: drop rows whose date does not parse.
pub fn parse_dates<'a>(
    records: &'a [RawRecord],
    warnings: &mut Vec<CleaningWarning>,
) -> Vec<DatedRecord<'a>> {
    let mut dated = Vec::with_capacity(records.len());
    let mut dropped = Vec::new();

    for raw in records {
        match parse_date(&raw.date) {
            Some(date) => dated.push(DatedRecord { date, raw }),
            None => dropped.push(raw.row),
        }
    }

    if !dropped.is_empty() {
        warnings.push(
            CleaningWarning::new(
                WarningCategory::InvalidDate,
                format!(
                    "Dropped {} rows with unparsable dates (expected YYYY-MM-DD): rows {}",
                    dropped.len(),
                    describe_rows(&dropped)
                ),
                dropped.len(),
            )
            .with_rows(dropped),
        );
    }

    dated
}

/// Step 2: coerce numeric columns; malformed values become missing.
pub fn coerce_values(
    dated: &[DatedRecord<'_>],
    warnings: &mut Vec<CleaningWarning>,
) -> Vec<ParsedRow> {
    let mut invalid_rainfall = Vec::new();
    let mut invalid_growth = Vec::new();
    let mut invalid_temperature = Vec::new();

    let coerce = |value: &str, row: usize, invalid: &mut Vec<usize>| match coerce_number(value)
    {
        CellValue::Number(number) => Some(number),
        CellValue::Missing => None,
        CellValue::Invalid => {
            invalid.push(row);
            None
        }
    };

    let rows = dated
        .iter()
        .map(|record| {
            let raw = record.raw;
            ParsedRow {
                row: raw.row,
                date: record.date,
                rainfall: coerce(&raw.rainfall, raw.row, &mut invalid_rainfall),
                growth: coerce(&raw.growth, raw.row, &mut invalid_growth),
                temperature: raw
                    .temperature
                    .as_deref()
                    .and_then(|t| coerce(t, raw.row, &mut invalid_temperature)),
            }
        })
        .collect();

    for (column, invalid) in [
        (COLUMN_RAINFALL, invalid_rainfall),
        (COLUMN_GROWTH, invalid_growth),
        (COLUMN_TEMPERATURE, invalid_temperature),
    ] {
        if !invalid.is_empty() {
            warnings.push(
                CleaningWarning::new(
                    WarningCategory::NonNumeric,
                    format!(
                        "Treated {} non-numeric {} values as missing: rows {}",
                        invalid.len(),
                        column,
                        describe_rows(&invalid)
                    ),
                    invalid.len(),
                )
                .with_rows(invalid),
            );
        }
    }

    rows
}

/// Step 3: negative rainfall or growth is physically invalid and becomes missing.
pub fn correct_negatives(rows: &mut [ParsedRow], warnings: &mut Vec<CleaningWarning>) {
    let mut negative_rainfall = Vec::new();
    let mut negative_growth = Vec::new();

    for row in rows.iter_mut() {
        if row.rainfall.is_some_and(|v| v < 0.0) {
            row.rainfall = None;
            negative_rainfall.push(row.row);
        }
        if row.growth.is_some_and(|v| v < 0.0) {
            row.growth = None;
            negative_growth.push(row.row);
        }
    }

    for (column, negative) in [
        (COLUMN_RAINFALL, negative_rainfall),
        (COLUMN_GROWTH, negative_growth),
    ] {
        if !negative.is_empty() {
            warnings.push(
                CleaningWarning::new(
                    WarningCategory::NegativeValue,
                    format!(
                        "Found {} negative {} values, treated as missing: rows {}",
                        negative.len(),
                        column,
                        describe_rows(&negative)
                    ),
                    negative.len(),
                )
                .with_rows(negative),
            );
        }
    }
}

/// Forward-fill, then backward-fill any leading gap. A column with no value
/// at all is filled with zeros.
pub fn gap_fill(values: &[Option<f64>]) -> (Vec<f64>, GapFill) {
    let Some(first_valid) = values.iter().flatten().next().copied() else {
        return (
            vec![0.0; values.len()],
            GapFill {
                filled: values.len(),
                empty_column: !values.is_empty(),
            },
        );
    };

    let mut last = first_valid;
    let mut filled = 0;
    let output = values
        .iter()
        .map(|value| match value {
            Some(v) => {
                last = *v;
                *v
            }
            None => {
                filled += 1;
                last
            }
        })
        .collect();

    (
        output,
        GapFill {
            filled,
            empty_column: false,
        },
    )
}

/// Step 4: fill rainfall and growth gaps. Temperature stays as-is.
/// Returns the input row number alongside each record.
pub fn fill_gaps(
    rows: &[ParsedRow],
    warnings: &mut Vec<CleaningWarning>,
) -> Vec<(usize, CleanRecord)> {
    let rainfall: Vec<Option<f64>> = rows.iter().map(|r| r.rainfall).collect();
    let growth: Vec<Option<f64>> = rows.iter().map(|r| r.growth).collect();

    let (rainfall_filled, rainfall_fill) = gap_fill(&rainfall);
    let (growth_filled, growth_fill) = gap_fill(&growth);

    for (column, values, fill) in [
        (COLUMN_RAINFALL, &rainfall, rainfall_fill),
        (COLUMN_GROWTH, &growth, growth_fill),
    ] {
        if fill.empty_column {
            warnings.push(CleaningWarning::new(
                WarningCategory::EmptyColumn,
                format!(
                    "Column {} has no valid values; filled all {} rows with 0",
                    column, fill.filled
                ),
                fill.filled,
            ));
        } else if fill.filled > 0 {
            let missing: Vec<usize> = rows
                .iter()
                .zip(values.iter())
                .filter(|(_, value)| value.is_none())
                .map(|(row, _)| row.row)
                .collect();
            warnings.push(
                CleaningWarning::new(
                    WarningCategory::MissingValue,
                    format!(
                        "Filled {} missing {} values with forward fill, then backward fill: rows {}",
                        fill.filled,
                        column,
                        describe_rows(&missing)
                    ),
                    fill.filled,
                )
                .with_rows(missing),
            );
        }
    }

    rows.iter()
        .zip(rainfall_filled.into_iter().zip(growth_filled))
        .map(|(row, (rainfall_mm, growth_cm))| {
            (
                row.row,
                CleanRecord::new(row.date, rainfall_mm, growth_cm).with_temperature(row.temperature),
            )
        })
        .collect()
}

/// Step 5: stable sort by date; the first occurrence of a date wins.
pub fn sort_and_deduplicate(
    mut records: Vec<(usize, CleanRecord)>,
    warnings: &mut Vec<CleaningWarning>,
) -> Result<Dataset> {
    records.sort_by_key(|(_, record)| record.date);

    let mut kept: Vec<CleanRecord> = Vec::with_capacity(records.len());
    let mut duplicates = Vec::new();
    for (row, record) in records {
        if kept.last().is_some_and(|last| last.date == record.date) {
            duplicates.push(row);
        } else {
            kept.push(record);
        }
    }

    if !duplicates.is_empty() {
        duplicates.sort_unstable();
        warnings.push(
            CleaningWarning::new(
                WarningCategory::DuplicateDate,
                format!(
                    "Dropped {} rows with duplicate dates, keeping the first occurrence: rows {}",
                    duplicates.len(),
                    describe_rows(&duplicates)
                ),
                duplicates.len(),
            )
            .with_rows(duplicates),
        );
    }

    debug!("Sorted {} records by date", kept.len());
    Dataset::from_records(kept)
}
