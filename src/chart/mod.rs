pub mod series;

pub use series::{ChartDataAdapter, ChartSeries, DatePoint, ScatterSeries, TimeSeries, WeeklySeries, XyPoint};
