use serde::{Deserialize, Serialize};

const HZ_PER_MHZ: f64 = 1_000_000.0;

/// One frequency/power reading from a spectrum-analyzer trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub frequency_hz: f64,
    pub power_dbm: f64,
}

impl Sample {
    pub fn new(frequency_hz: f64, power_dbm: f64) -> Self {
        Self {
            frequency_hz,
            power_dbm,
        }
    }

    pub fn frequency_mhz(&self) -> f64 {
        self.frequency_hz / HZ_PER_MHZ
    }
}

/// Instrument header fields; any of them may be missing from a trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceMetadata {
    pub timestamp: Option<String>,
    pub name: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub firmware: Option<String>,
}

impl TraceMetadata {
    /// Key/value view over the fields that are present.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("Timestamp", &self.timestamp),
            ("Name", &self.name),
            ("Model", &self.model),
            ("Serial", &self.serial),
            ("Firmware", &self.firmware),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}

/// Parsed trace: ordered samples plus the instrument header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub metadata: TraceMetadata,
    pub samples: Vec<Sample>,
    /// Data rows excluded because a field was missing or not numeric.
    pub dropped_rows: usize,
}

pub(crate) fn max_frequency_mhz(samples: &[Sample]) -> Option<f64> {
    samples
        .iter()
        .map(Sample::frequency_mhz)
        .fold(None, |acc, f| match acc {
            Some(current) if current >= f => Some(current),
            _ => Some(f),
        })
}
