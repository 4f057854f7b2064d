use crate::chart::ChartSeries;
use crate::error::{AnalysisError, ErrorKind, Result};
use crate::models::{AnalysisSummary, CleaningWarning, WeeklyAggregate};
use crate::pipeline::{AnalysisPipeline, AnalysisReport};
use crate::upload::settings::UploadConfig;
use crate::utils::constants::TEMPLATE_CSV;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{error, info, warn};
use validator::Validate;

/// JSON body returned by the analyze endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    /// HTTP status the transport should answer with.
    #[serde(skip)]
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<AnalysisSummary>,
    #[serde(default)]
    pub warnings: Vec<CleaningWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly: Option<Vec<WeeklyAggregate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<ChartSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn success(report: AnalysisReport) -> Self {
        Self {
            success: true,
            status: 200,
            stats: Some(report.summary),
            warnings: report.warnings,
            weekly: Some(report.weekly),
            series: Some(report.series),
            error: None,
        }
    }

    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            stats: None,
            warnings: Vec::new(),
            weekly: None,
            series: None,
            error: Some(message.into()),
        }
    }

    pub fn from_error(err: &AnalysisError) -> Self {
        match err {
            AnalysisError::Upload { status, message } => Self::failure(*status, message.clone()),
            _ => match err.kind() {
                ErrorKind::Schema => Self::failure(400, err.to_string()),
                ErrorKind::NotFound | ErrorKind::Format => {
                    Self::failure(400, format!("Failed to load file: {}", err))
                }
                ErrorKind::Upload | ErrorKind::Internal => {
                    Self::failure(500, format!("An error occurred: {}", err))
                }
            },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Transport-independent implementation of the upload-and-analyze endpoint.
///
/// Uploads are staged in a temporary file inside the configured directory
/// and removed as soon as the request finishes.
pub struct UploadHandler {
    config: UploadConfig,
    pipeline: AnalysisPipeline,
}

impl UploadHandler {
    pub fn new(config: UploadConfig) -> Result<Self> {
        config.validate()?;
        let pipeline = AnalysisPipeline::with_max_input_bytes(config.max_upload_bytes);
        Ok(Self { config, pipeline })
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Entry point for a request that may not carry a file part at all.
    pub fn handle_request(&self, file: Option<(&str, &[u8])>) -> UploadResponse {
        match file {
            Some((file_name, bytes)) => self.handle(file_name, bytes),
            None => UploadResponse::failure(400, "No file provided"),
        }
    }

    pub fn handle(&self, file_name: &str, bytes: &[u8]) -> UploadResponse {
        match self.process(file_name, bytes) {
            Ok(report) => {
                info!(
                    "Analyzed upload '{}': {} records",
                    file_name, report.summary.total_records
                );
                UploadResponse::success(report)
            }
            Err(e) => {
                let response = UploadResponse::from_error(&e);
                if response.status >= 500 {
                    error!("Upload '{}' failed: {}", file_name, e);
                } else {
                    warn!("Upload '{}' rejected: {}", file_name, e);
                }
                response
            }
        }
    }

    fn process(&self, file_name: &str, bytes: &[u8]) -> Result<AnalysisReport> {
        if file_name.trim().is_empty() {
            return Err(reject(400, "No file selected"));
        }
        if !self.config.is_allowed(file_name) {
            return Err(reject(400, "File must be CSV or Excel (xlsx/xls)"));
        }
        if bytes.len() as u64 > self.config.max_upload_bytes {
            return Err(reject(
                413,
                format!(
                    "File exceeds the maximum upload size of {} bytes",
                    self.config.max_upload_bytes
                ),
            ));
        }

        let safe_name = sanitize_file_name(file_name);
        let path = Path::new(&safe_name);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("upload");
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        fs::create_dir_all(&self.config.upload_dir)?;
        let mut staged = tempfile::Builder::new()
            .prefix(&format!("{}-", stem))
            .suffix(&format!(".{}", extension))
            .tempfile_in(&self.config.upload_dir)?;
        staged.write_all(bytes)?;
        staged.flush()?;

        self.pipeline.analyze_path(staged.path())
    }
}

fn reject(status: u16, message: impl Into<String>) -> AnalysisError {
    AnalysisError::Upload {
        status,
        message: message.into(),
    }
}

/// Reduce a client-supplied file name to a safe ASCII name: path separators
/// and whitespace become `_`, other unsafe characters are dropped, and
/// leading/trailing dots and underscores are stripped.
pub fn sanitize_file_name(file_name: &str) -> String {
    let spaced: String = file_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Sample CSV served to users who need a starting point.
pub fn template_csv() -> &'static str {
    TEMPLATE_CSV
}
