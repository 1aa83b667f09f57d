use crate::math::PowerHelper;
use crate::report::assembler::{MetricKind, Report};
use crate::report::format::{decimal_comma, UNDEFINED_MARKER};
use serde::{Serialize, Serializer};

const BYTE_ORDER_MARK: char = '\u{feff}';
const SEPARATOR: &str = ";";
const HEADER: [&str; 6] = [
    "Order",
    "DisplayedFrequencyMHz",
    "PowerDBm",
    "Description",
    "Type",
    "NumericValue",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowKind {
    Harmonic,
    Metric,
}

impl RowKind {
    fn as_str(&self) -> &'static str {
        match self {
            RowKind::Harmonic => "Harmonic",
            RowKind::Metric => "Metric",
        }
    }
}

/// Value column of the export; harmonic rows leave it empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    Empty,
    Value(f64),
    Undefined,
}

impl NumericValue {
    fn from_level(value: f64) -> Self {
        if value.is_finite() {
            NumericValue::Value(PowerHelper::round_to(value, 2))
        } else {
            NumericValue::Undefined
        }
    }

    fn to_cell(self) -> String {
        match self {
            NumericValue::Empty => String::new(),
            NumericValue::Value(value) => decimal_comma(value, 2),
            NumericValue::Undefined => UNDEFINED_MARKER.to_string(),
        }
    }
}

impl Serialize for NumericValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NumericValue::Empty => serializer.serialize_none(),
            NumericValue::Value(value) => serializer.serialize_f64(*value),
            NumericValue::Undefined => serializer.serialize_str(UNDEFINED_MARKER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub order: Option<u32>,
    pub displayed_frequency_mhz: Option<f64>,
    pub power_dbm: Option<f64>,
    pub description: String,
    pub kind: RowKind,
    pub numeric_value: NumericValue,
}

impl ExportRow {
    fn cells(&self) -> [String; 6] {
        [
            self.order.map(|order| order.to_string()).unwrap_or_default(),
            self.displayed_frequency_mhz
                .map(|value| decimal_comma(value, 2))
                .unwrap_or_default(),
            self.power_dbm
                .map(|value| decimal_comma(value, 2))
                .unwrap_or_default(),
            self.description.clone(),
            self.kind.as_str().to_string(),
            self.numeric_value.to_cell(),
        ]
    }
}

/// Tabular export: one row per detected tone, then the THD and dominant-harmonic rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportTable {
    pub rows: Vec<ExportRow>,
}

impl ExportTable {
    pub fn from_report(report: &Report) -> Self {
        let mut rows: Vec<ExportRow> = report
            .harmonics
            .iter()
            .map(|hit| ExportRow {
                order: Some(hit.order),
                displayed_frequency_mhz: Some(PowerHelper::round_to(hit.displayed_frequency_mhz, 2)),
                power_dbm: Some(PowerHelper::round_to(hit.power_dbm, 2)),
                description: hit.label.clone(),
                kind: RowKind::Harmonic,
                numeric_value: NumericValue::Empty,
            })
            .collect();

        let summary = &report.summary;
        for (kind, value) in [
            (MetricKind::TotalHarmonicDistortion, summary.thd_percent),
            (MetricKind::DominantHarmonic, summary.dominant_dbc),
        ] {
            rows.push(ExportRow {
                order: None,
                displayed_frequency_mhz: None,
                power_dbm: None,
                description: kind.description().to_string(),
                kind: RowKind::Metric,
                numeric_value: NumericValue::from_level(value),
            });
        }

        Self { rows }
    }

    /// Semicolon-separated text with a UTF-8 byte order mark and decimal commas.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push(BYTE_ORDER_MARK);
        push_record(&mut out, HEADER.iter().map(|h| h.to_string()));
        for row in &self.rows {
            push_record(&mut out, row.cells().into_iter());
        }
        out
    }
}

fn push_record(out: &mut String, cells: impl Iterator<Item = String>) {
    let line = cells
        .map(|cell| quote_cell(&cell))
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    out.push_str(&line);
    out.push('\n');
}

fn quote_cell(cell: &str) -> String {
    if cell.contains(SEPARATOR) || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
