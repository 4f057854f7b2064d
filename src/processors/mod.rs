pub mod cleaner;
pub mod schema_validator;
pub mod weekly_aggregator;

pub use cleaner::{CleaningOutcome, DataCleaner};
pub use schema_validator::SchemaValidator;
pub use weekly_aggregator::WeeklyAggregator;
