use crate::analyzers::StatisticsSummarizer;
use crate::chart::{ChartDataAdapter, ChartSeries};
use crate::error::Result;
use crate::models::{AnalysisSummary, CleaningWarning, Dataset, RawTable, WeeklyAggregate};
use crate::processors::{DataCleaner, SchemaValidator, WeeklyAggregator};
use crate::readers::{SourceFormat, TabularReader};
use crate::utils::constants::DEFAULT_MAX_INPUT_BYTES;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Everything one analysis run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub warnings: Vec<CleaningWarning>,
    pub summary: AnalysisSummary,
    pub weekly: Vec<WeeklyAggregate>,
    pub series: ChartSeries,
    #[serde(skip)]
    pub dataset: Dataset,
}

/// Runs load, validate, clean, aggregate and summarize in order.
///
/// Holds no state between runs; every call builds its own dataset.
pub struct AnalysisPipeline {
    reader: TabularReader,
    validator: SchemaValidator,
    cleaner: DataCleaner,
    aggregator: WeeklyAggregator,
    summarizer: StatisticsSummarizer,
    charts: ChartDataAdapter,
}

impl AnalysisPipeline {
    pub fn new() -> Self {
        Self::with_max_input_bytes(DEFAULT_MAX_INPUT_BYTES)
    }

    pub fn with_max_input_bytes(max_input_bytes: u64) -> Self {
        Self {
            reader: TabularReader::with_max_bytes(max_input_bytes),
            validator: SchemaValidator::new(),
            cleaner: DataCleaner::new(),
            aggregator: WeeklyAggregator::new(),
            summarizer: StatisticsSummarizer::new(),
            charts: ChartDataAdapter::new(),
        }
    }

    pub fn analyze_path(&self, path: &Path) -> Result<AnalysisReport> {
        let table = self.reader.read_path(path)?;
        self.analyze_table(&table)
    }

    pub fn analyze_bytes(&self, bytes: &[u8], file_name: &str) -> Result<AnalysisReport> {
        let table = self.reader.read_named_bytes(bytes, file_name)?;
        self.analyze_table(&table)
    }

    pub fn analyze_csv_str(&self, text: &str) -> Result<AnalysisReport> {
        let table = self.reader.read_bytes(text.as_bytes(), SourceFormat::Csv)?;
        self.analyze_table(&table)
    }

    /// Run every stage after loading. Fails on a schema error, never on bad rows.
    pub fn analyze_table(&self, table: &RawTable) -> Result<AnalysisReport> {
        let layout = self.validator.validate(&table.headers)?;
        let records = table.records(&layout);

        let outcome = self.cleaner.clean(&records)?;
        let weekly = self.aggregator.aggregate(&outcome.dataset);
        let summary = self.summarizer.summarize(&outcome.dataset);
        let series = self.charts.build(&outcome.dataset, &summary, &weekly);

        info!(
            "Analysis complete: {} records, {} weeks, {} warnings",
            summary.total_records,
            weekly.len(),
            outcome.warnings.len()
        );

        Ok(AnalysisReport {
            warnings: outcome.warnings,
            summary,
            weekly,
            series,
            dataset: outcome.dataset,
        })
    }
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new()
    }
}
