use crate::error::{AnalysisError, Result};
use crate::models::RawTable;
use crate::utils::constants::{
    DATE_FORMAT, DEFAULT_MAX_INPUT_BYTES, EXCEL_EPOCH, SPREADSHEET_EXTENSIONS,
};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDate;
use encoding_rs::{Encoding, WINDOWS_1252};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    /// Pick the format from a file name's extension. A name without an
    /// extension is read as CSV.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = match Path::new(file_name).extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_ascii_lowercase(),
            None => return Ok(SourceFormat::Csv),
        };

        if extension == "csv" || extension == "txt" {
            Ok(SourceFormat::Csv)
        } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
            Ok(SourceFormat::Spreadsheet)
        } else {
            Err(AnalysisError::Format(format!(
                "Unsupported file extension '.{}' (expected CSV or Excel)",
                extension
            )))
        }
    }
}

/// Loads CSV and spreadsheet sources into a [`RawTable`].
pub struct TabularReader {
    max_bytes: u64,
}

impl TabularReader {
    pub fn new() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }

    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Read a table from disk, choosing the parser from the extension.
    pub fn read_path(&self, path: &Path) -> Result<RawTable> {
        let not_found = |reason: String| AnalysisError::NotFound {
            path: path.to_path_buf(),
            reason,
        };

        let metadata = fs::metadata(path).map_err(|e| not_found(e.to_string()))?;
        if !metadata.is_file() {
            return Err(not_found("not a regular file".to_string()));
        }
        self.check_size(metadata.len())?;

        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or_default();
        let format = SourceFormat::from_file_name(file_name)?;

        info!("Loading data from {}", path.display());
        let bytes = fs::read(path).map_err(|e| not_found(e.to_string()))?;
        self.read_bytes(&bytes, format)
    }

    /// Read an in-memory buffer, using `file_name` only to pick the parser.
    pub fn read_named_bytes(&self, bytes: &[u8], file_name: &str) -> Result<RawTable> {
        let format = SourceFormat::from_file_name(file_name)?;
        self.read_bytes(bytes, format)
    }

    pub fn read_bytes(&self, bytes: &[u8], format: SourceFormat) -> Result<RawTable> {
        self.check_size(bytes.len() as u64)?;

        let table = match format {
            SourceFormat::Csv => self.read_csv(bytes)?,
            SourceFormat::Spreadsheet => self.read_spreadsheet(bytes)?,
        };

        info!(
            "Loaded {} records with {} columns",
            table.row_count(),
            table.headers.len()
        );
        Ok(table)
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_bytes {
            return Err(AnalysisError::InputTooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    fn read_csv(&self, bytes: &[u8]) -> Result<RawTable> {
        let text = decode_text(bytes);
        if text.contains('\0') {
            return Err(AnalysisError::Format(
                "File contains binary content and is not valid CSV".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(AnalysisError::Format("CSV file is empty".to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(AnalysisError::Format("CSV file has no header row".to_string()));
        }

        let width = headers.len();
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            // Separator-only lines such as ",,," carry no reading
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            let mut row: Vec<String> = record.iter().map(String::from).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        debug!("Parsed CSV: {} header columns, {} rows", width, rows.len());
        Ok(RawTable::new(headers, rows))
    }

    fn read_spreadsheet(&self, bytes: &[u8]) -> Result<RawTable> {
        let cursor = Cursor::new(bytes.to_vec());
        let mut workbook = open_workbook_auto_from_rs(cursor).map_err(|e| {
            AnalysisError::Format(format!("File is not a readable spreadsheet: {}", e))
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AnalysisError::Format("Workbook contains no worksheets".to_string()))??;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .ok_or_else(|| AnalysisError::Format("Worksheet is empty".to_string()))?
            .iter()
            .map(cell_to_string)
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(AnalysisError::Format("Worksheet has no header row".to_string()));
        }

        let width = headers.len();
        let rows: Vec<Vec<String>> = rows
            .map(|cells| {
                let mut row: Vec<String> = cells.iter().map(cell_to_string).collect();
                row.resize(width, String::new());
                row
            })
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();

        debug!("Parsed worksheet: {} header columns, {} rows", width, rows.len());
        Ok(RawTable::new(headers, rows))
    }
}

impl Default for TabularReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode CSV bytes, honouring a BOM and falling back to Windows-1252 for
/// input that is not valid UTF-8.
fn decode_text(bytes: &[u8]) -> String {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        return text.into_owned();
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            debug!("Input is not valid UTF-8, decoding as Windows-1252");
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_serial_to_date(serial)
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_else(|| serial.to_string())
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

/// Convert an Excel date serial to a calendar date, ignoring the time part.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // 2958465 is 9999-12-31
    if !serial.is_finite() || !(0.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let (year, month, day) = EXCEL_EPOCH;
    NaiveDate::from_ymd_opt(year, month, day)?
        .checked_add_signed(chrono::Duration::days(serial.floor() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::AnalysisPipeline;
    use std::io::Write;
    use zip::{CompressionMethod, ZipWriter};

    const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
    const DOC_REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    // A1..C5: three date-formatted serial dates, then one date stored as text
    fn sheet_xml() -> String {
        let text = |r: &str, v: &str| format!(r#"<c r="{r}" t="inlineStr"><is><t>{v}</t></is></c>"#);
        let num = |r: &str, v: &str| format!(r#"<c r="{r}"><v>{v}</v></c>"#);
        let date = |r: &str, serial: u32| format!(r#"<c r="{r}" s="1"><v>{serial}</v></c>"#);

        let rows = [
            format!(
                "{}{}{}",
                text("A1", "Date"),
                text("B1", "Rainfall_mm"),
                text("C1", "Crop_Growth_cm")
            ),
            format!("{}{}{}", date("A2", 45658), num("B2", "0"), num("C2", "2")),
            format!("{}{}{}", date("A3", 45659), num("B3", "5"), num("C3", "2.5")),
            format!("{}{}{}", date("A4", 45660), num("B4", "10"), num("C4", "3")),
            format!(
                "{}{}{}",
                text("A5", "2025-01-04"),
                num("B5", "15"),
                num("C5", "3.5")
            ),
        ];
        let body: String = rows
            .iter()
            .enumerate()
            .map(|(i, cells)| format!(r#"<row r="{}">{}</row>"#, i + 1, cells))
            .collect();
        format!(r#"<worksheet xmlns="{MAIN_NS}"><sheetData>{body}</sheetData></worksheet>"#)
    }

    fn create_test_workbook() -> Vec<u8> {
        let parts = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#.to_string(),
            ),
            (
                "_rels/.rels",
                format!(r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="{REL_NS}"><Relationship Id="rId1" Type="{DOC_REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#),
            ),
            (
                "xl/workbook.xml",
                format!(r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="{MAIN_NS}" xmlns:r="{DOC_REL_NS}"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                format!(r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="{REL_NS}"><Relationship Id="rId1" Type="{DOC_REL_NS}/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="{DOC_REL_NS}/styles" Target="styles.xml"/></Relationships>"#),
            ),
            (
                // Style 1 uses built-in number format 14 (m/d/yyyy)
                "xl/styles.xml",
                format!(r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="{MAIN_NS}"><cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="14" applyNumberFormat="1"/></cellXfs></styleSheet>"#),
            ),
            ("xl/worksheets/sheet1.xml", sheet_xml()),
        ];

        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, content) in parts {
            zip.start_file(
                name,
                zip::write::FileOptions::default().compression_method(CompressionMethod::Stored),
            )
            .unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_read_csv_bytes() {
        let data = b"Date,Rainfall_mm,Crop_Growth_cm\n2025-01-01,0.0,2.0\n2025-01-02, 5.0 ,2.5\n";
        let table = TabularReader::new()
            .read_bytes(data, SourceFormat::Csv)
            .unwrap();

        assert_eq!(table.headers, vec!["Date", "Rainfall_mm", "Crop_Growth_cm"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1], vec!["2025-01-02", "5.0", "2.5"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let data = b"Date,Rainfall_mm,Crop_Growth_cm\n2025-01-01,1.0\n2025-01-02,2.0,3.0,extra\n";
        let table = TabularReader::new()
            .read_bytes(data, SourceFormat::Csv)
            .unwrap();

        assert_eq!(table.rows[0], vec!["2025-01-01", "1.0", ""]);
        assert_eq!(table.rows[1], vec!["2025-01-02", "2.0", "3.0"]);
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut data = vec![0xEF, 0xBB, 0xBF];
        data.extend_from_slice(b"Date,Rainfall_mm,Crop_Growth_cm\n2025-01-01,1,2\n");
        let table = TabularReader::new()
            .read_bytes(&data, SourceFormat::Csv)
            .unwrap();
        assert_eq!(table.headers[0], "Date");
    }

    #[test]
    fn test_windows_1252_fallback() {
        // 0xB0 is the degree sign in Windows-1252 and invalid on its own in UTF-8
        let data = b"Date,Rainfall_mm,Crop_Growth_cm,Note\n2025-01-01,1,2,25\xB0C\n";
        let table = TabularReader::new()
            .read_bytes(data, SourceFormat::Csv)
            .unwrap();
        assert_eq!(table.rows[0][3], "25\u{b0}C");
    }

    #[test]
    fn test_empty_csv_is_format_error() {
        let err = TabularReader::new()
            .read_bytes(b"  \n", SourceFormat::Csv)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Format(_)));
    }

    #[test]
    fn test_binary_content_is_format_error() {
        let err = TabularReader::new()
            .read_bytes(b"PK\x03\x04\x00\x00garbage", SourceFormat::Csv)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Format(_)));
    }

    #[test]
    fn test_invalid_spreadsheet_is_format_error() {
        let err = TabularReader::new()
            .read_bytes(b"Date,Rainfall_mm\n", SourceFormat::Spreadsheet)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Format(_)));
    }

    #[test]
    fn test_read_xlsx_workbook() {
        let table = TabularReader::new()
            .read_bytes(&create_test_workbook(), SourceFormat::Spreadsheet)
            .unwrap();

        assert_eq!(table.headers, vec!["Date", "Rainfall_mm", "Crop_Growth_cm"]);
        assert_eq!(table.row_count(), 4);
        // Date-formatted serial cell
        assert_eq!(table.rows[0], vec!["2025-01-01", "0", "2"]);
        assert_eq!(table.rows[2][0], "2025-01-03");
        // Text cell holding a date
        assert_eq!(table.rows[3], vec!["2025-01-04", "15", "3.5"]);
    }

    #[test]
    fn test_analyze_xlsx_upload() {
        let report = AnalysisPipeline::new()
            .analyze_bytes(&create_test_workbook(), "field.xlsx")
            .unwrap();

        assert!(report.warnings.is_empty());
        assert_eq!(report.summary.total_records, 4);
        assert_eq!(
            report.summary.date_range,
            Some((
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()
            ))
        );
        assert!((report.summary.correlation.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_separator_only_rows_are_skipped() {
        let data = b"Date,Rainfall_mm,Crop_Growth_cm
2025-01-01,1.0,2.0
,,
 , ,
2025-01-02,2.0,3.0
";
        let table = TabularReader::new()
            .read_bytes(data, SourceFormat::Csv)
            .unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1], vec!["2025-01-02", "2.0", "3.0"]);
    }

    #[test]
    fn test_size_limit() {
        let reader = TabularReader::with_max_bytes(10);
        let err = reader
            .read_bytes(b"Date,Rainfall_mm,Crop_Growth_cm\n", SourceFormat::Csv)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InputTooLarge { limit: 10, .. }));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = TabularReader::new()
            .read_path(Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound { .. }));
    }

    #[test]
    fn test_read_path() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        writeln!(file, "Date,Rainfall_mm,Crop_Growth_cm,Temperature_C")?;
        writeln!(file, "2025-01-01,0.0,2.0,21.0")?;
        file.flush()?;

        let table = TabularReader::new().read_path(file.path())?;
        assert_eq!(table.headers.len(), 4);
        assert_eq!(table.row_count(), 1);
        Ok(())
    }

    #[test]
    fn test_unsupported_extension() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{}")?;

        let err = TabularReader::new().read_path(&path).unwrap_err();
        assert!(matches!(err, AnalysisError::Format(_)));
        Ok(())
    }

    #[test]
    fn test_source_format_detection() {
        assert_eq!(SourceFormat::from_file_name("a.CSV").unwrap(), SourceFormat::Csv);
        assert_eq!(
            SourceFormat::from_file_name("a.xlsx").unwrap(),
            SourceFormat::Spreadsheet
        );
        assert_eq!(SourceFormat::from_file_name("data").unwrap(), SourceFormat::Csv);
        assert!(SourceFormat::from_file_name("a.pdf").is_err());
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(
            excel_serial_to_date(45658.0),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert_eq!(
            excel_serial_to_date(45658.75),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert_eq!(excel_serial_to_date(f64::NAN), None);
        assert_eq!(excel_serial_to_date(-1.0), None);
    }
}
