use serde::{Deserialize, Serialize};

/// Header row plus string cells, exactly as the loader produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Column indexes resolved by the schema validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub date: usize,
    pub rainfall: usize,
    pub growth: usize,
    pub temperature: Option<usize>,
}

/// One unvalidated input row. `row` is the 1-based data row number
/// (the header is not counted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub row: usize,
    pub date: String,
    pub rainfall: String,
    pub growth: String,
    pub temperature: Option<String>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Project every row onto the resolved layout. Cells past the end of a
    /// short row read as empty.
    pub fn records(&self, layout: &ColumnLayout) -> Vec<RawRecord> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, cells)| {
                let cell = |idx: usize| cells.get(idx).cloned().unwrap_or_default();
                RawRecord {
                    row: i + 1,
                    date: cell(layout.date),
                    rainfall: cell(layout.rainfall),
                    growth: cell(layout.growth),
                    temperature: layout.temperature.map(cell),
                }
            })
            .collect()
    }
}

impl RawRecord {
    pub fn new(row: usize, date: &str, rainfall: &str, growth: &str) -> Self {
        Self {
            row,
            date: date.to_string(),
            rainfall: rainfall.to_string(),
            growth: growth.to_string(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: &str) -> Self {
        self.temperature = Some(temperature.to_string());
        self
    }
}
