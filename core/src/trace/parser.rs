use crate::prelude::{AnalysisError, AnalysisResult, ProcessingStage};
use crate::trace::sample::{Sample, Trace, TraceMetadata};

const BEGIN_MARKER: &str = "BEGIN";
const METADATA_PREFIX: char = '!';

/// Parses trace text: `!`-prefixed header lines, a `BEGIN` line, then
/// `frequency_hz,power_dbm[,...]` rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceParser;

impl TraceParser {
    pub fn new() -> Self {
        Self
    }

    /// Decodes raw upload bytes as UTF-8 before parsing.
    pub fn parse_bytes(&self, raw: &[u8]) -> AnalysisResult<Trace> {
        let text = std::str::from_utf8(raw)
            .map_err(|err| AnalysisError::Parse(format!("input is not UTF-8 text: {}", err)))?;
        self.parse(text)
    }

    pub fn parse(&self, text: &str) -> AnalysisResult<Trace> {
        let mut lines = text.lines();
        let mut metadata = TraceMetadata::default();
        let mut found_begin = false;

        for line in lines.by_ref() {
            if line.trim() == BEGIN_MARKER {
                found_begin = true;
                break;
            }
            if line.starts_with(METADATA_PREFIX) {
                read_metadata_line(line, &mut metadata);
            }
        }

        if !found_begin {
            return Err(AnalysisError::Parse("missing BEGIN marker".into()));
        }

        let mut samples = Vec::new();
        let mut dropped_rows = 0;
        for line in lines {
            let mut fields = line.split(',').map(str::trim).filter(|f| !f.is_empty());
            let (Some(frequency), Some(power)) = (fields.next(), fields.next()) else {
                continue;
            };
            match parse_row(frequency, power) {
                Some(sample) => samples.push(sample),
                None => dropped_rows += 1,
            }
        }

        Ok(Trace {
            metadata,
            samples,
            dropped_rows,
        })
    }
}

impl ProcessingStage for TraceParser {
    type Input<'a> = &'a str;
    type Output = Trace;

    fn name(&self) -> &'static str {
        "TraceParser"
    }

    fn execute<'a>(&self, input: &'a str) -> AnalysisResult<Trace> {
        self.parse(input)
    }
}

fn read_metadata_line(line: &str, metadata: &mut TraceMetadata) {
    // Instruments also write a "Trace ... TIMESTAMP" line; only the sweep timestamp counts.
    if line.contains("TIMESTAMP") && !line.contains("Trace") {
        metadata.timestamp = value_after(line, "TIMESTAMP");
    } else if line.contains("NAME") {
        metadata.name = value_after(line, "NAME");
    } else if line.contains("MODEL") {
        metadata.model = value_after(line, "MODEL");
    } else if line.contains("SERIAL") {
        metadata.serial = value_after(line, "SERIAL");
    } else if line.contains("FIRMWARE_VERSION") {
        metadata.firmware = value_after(line, "FIRMWARE_VERSION");
    }
}

fn value_after(line: &str, keyword: &str) -> Option<String> {
    line.split(keyword)
        .nth(1)
        .map(|value| value.trim().to_string())
}

fn parse_row(frequency: &str, power: &str) -> Option<Sample> {
    let frequency_hz = frequency.parse::<f64>().ok()?;
    let power_dbm = power.parse::<f64>().ok()?;
    if !frequency_hz.is_finite() || frequency_hz < 0.0 || !power_dbm.is_finite() {
        return None;
    }
    Some(Sample::new(frequency_hz, power_dbm))
}
