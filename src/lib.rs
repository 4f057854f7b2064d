pub mod analyzers;
pub mod chart;
pub mod cli;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod processors;
pub mod readers;
pub mod upload;
pub mod utils;

pub use error::{AnalysisError, Result};
pub use pipeline::{AnalysisPipeline, AnalysisReport};
