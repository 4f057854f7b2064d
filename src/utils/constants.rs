/// Column names
pub const COLUMN_DATE: &str = "Date";
pub const COLUMN_RAINFALL: &str = "Rainfall_mm";
pub const COLUMN_GROWTH: &str = "Crop_Growth_cm";
pub const COLUMN_TEMPERATURE: &str = "Temperature_C";

pub const REQUIRED_COLUMNS: [&str; 3] = [COLUMN_DATE, COLUMN_RAINFALL, COLUMN_GROWTH];

/// Date formats
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Cell values treated as missing rather than malformed
pub const MISSING_TOKENS: [&str; 7] = ["", "na", "n/a", "nan", "null", "none", "-"];

/// Input limits
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 16 * 1024 * 1024; // 16MB

/// Upload defaults
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];
pub const SPREADSHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "xlsm", "ods"];
pub const CONFIG_ENV_PREFIX: &str = "AGRI";

/// Aggregation and charting
pub const WEEK_LENGTH_DAYS: i64 = 7;
pub const TREND_LINE_POINTS: usize = 100;

/// Excel stores dates as days since this epoch (1900 leap-year bug included)
pub const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Sample file served as the upload template
pub const TEMPLATE_CSV: &str = "Date,Rainfall_mm,Crop_Growth_cm,Temperature_C
2025-01-01,0.0,2.0,24.5
2025-01-02,5.2,2.4,23.8
2025-01-03,12.8,3.1,22.1
2025-01-04,0.0,2.2,25.0
2025-01-05,3.4,2.6,24.2
2025-01-06,8.1,2.9,23.4
2025-01-07,0.0,2.1,26.0
";
