pub mod aggregate;
pub mod raw;
pub mod record;
pub mod summary;
pub mod warning;

pub use aggregate::WeeklyAggregate;
pub use raw::{ColumnLayout, RawRecord, RawTable};
pub use record::{CleanRecord, Dataset};
pub use summary::{AnalysisSummary, CorrelationStrength, TrendLine};
pub use warning::{CleaningWarning, WarningCategory};
