pub mod assembler;
pub mod chart;
pub mod export;
pub mod format;

pub use assembler::{MetricKind, MetricNote, Report, ReportAssembler, ReportEntry, ReportInput};
pub use chart::{ChartLayout, LegendEntry, LimitLine};
pub use export::{ExportRow, ExportTable, NumericValue, RowKind};
