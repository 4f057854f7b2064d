use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCategory {
    InvalidDate,
    NonNumeric,
    NegativeValue,
    MissingValue,
    EmptyColumn,
    DuplicateDate,
}

impl fmt::Display for WarningCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningCategory::InvalidDate => write!(f, "invalid_date"),
            WarningCategory::NonNumeric => write!(f, "non_numeric"),
            WarningCategory::NegativeValue => write!(f, "negative_value"),
            WarningCategory::MissingValue => write!(f, "missing_value"),
            WarningCategory::EmptyColumn => write!(f, "empty_column"),
            WarningCategory::DuplicateDate => write!(f, "duplicate_date"),
        }
    }
}

/// A data-quality issue the cleaner recovered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningWarning {
    pub category: WarningCategory,
    pub message: String,
    pub affected_count: usize,
    /// 1-based data row numbers, when the issue is tied to specific rows.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<usize>,
}

impl CleaningWarning {
    pub fn new(category: WarningCategory, message: impl Into<String>, affected_count: usize) -> Self {
        Self {
            category,
            message: message.into(),
            affected_count,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<usize>) -> Self {
        self.rows = rows;
        self
    }
}

impl fmt::Display for CleaningWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

/// Render row numbers compactly, e.g. `2, 5, 9 and 3 more`.
pub fn describe_rows(rows: &[usize]) -> String {
    const SHOWN: usize = 10;
    let listed: Vec<String> = rows.iter().take(SHOWN).map(|r| r.to_string()).collect();
    if rows.len() > SHOWN {
        format!("{} and {} more", listed.join(", "), rows.len() - SHOWN)
    } else {
        listed.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_rows_truncates() {
        assert_eq!(describe_rows(&[1, 4]), "1, 4");
        let many: Vec<usize> = (1..=12).collect();
        assert_eq!(describe_rows(&many), "1, 2, 3, 4, 5, 6, 7, 8, 9, 10 and 2 more");
    }

    #[test]
    fn test_warning_serialization() {
        let warning = CleaningWarning::new(WarningCategory::NegativeValue, "1 negative value", 1);
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["category"], "negative_value");
        assert_eq!(json["affected_count"], 1);
        assert!(json.get("rows").is_none());
    }
}
