pub mod statistics;

pub use statistics::{linear_fit, pearson_correlation, StatisticsSummarizer};
