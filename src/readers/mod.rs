pub mod tabular_reader;

pub use tabular_reader::{excel_serial_to_date, SourceFormat, TabularReader};
