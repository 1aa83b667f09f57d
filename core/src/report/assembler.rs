use crate::prelude::{AnalysisConfig, AnalysisResult, ProcessingStage};
use crate::processing::{Detection, DistortionSummary, HarmonicHit};
use crate::report::format::{decimal_comma, serialize_level};
use crate::trace::{Sample, Trace};
use serde::Serialize;

/// Summary metrics that can be listed next to the real detections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricKind {
    TotalHarmonicDistortion,
    DominantHarmonic,
}

impl MetricKind {
    pub fn description(&self) -> &'static str {
        match self {
            MetricKind::TotalHarmonicDistortion => "Total harmonic distortion (THD)",
            MetricKind::DominantHarmonic => "Dominant harmonic (dBc)",
        }
    }
}

/// Synthetic entry carrying metric text instead of a detected tone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricNote {
    pub kind: MetricKind,
    pub text: String,
    #[serde(serialize_with = "serialize_level")]
    pub value: f64,
}

impl MetricNote {
    pub fn thd(summary: &DistortionSummary) -> Self {
        Self {
            kind: MetricKind::TotalHarmonicDistortion,
            text: format!(
                "Total harmonic distortion (THD): {}%",
                decimal_comma(summary.thd_percent, 2)
            ),
            value: summary.thd_percent_rounded(),
        }
    }

    pub fn dominant(summary: &DistortionSummary) -> Self {
        let text = if summary.has_dominant() {
            format!(
                "Dominant harmonic: {} dBc",
                decimal_comma(summary.dominant_dbc, 2)
            )
        } else {
            "Dominant harmonic: undefined".to_string()
        };
        Self {
            kind: MetricKind::DominantHarmonic,
            text,
            value: summary.dominant_dbc_rounded(),
        }
    }
}

/// Ordered entry list handed to renderers: real detections, then optional notes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ReportEntry {
    Harmonic(HarmonicHit),
    Metric(MetricNote),
}

/// Everything the rendering and export collaborators need for one trace.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub config: AnalysisConfig,
    /// Trace as parsed, before calibration.
    pub trace: Trace,
    /// Calibrated samples, the full line plot.
    pub calibrated: Vec<Sample>,
    /// Calibrated samples strictly above the detection threshold.
    pub filtered: Vec<Sample>,
    pub harmonics: Vec<HarmonicHit>,
    pub summary: DistortionSummary,
    pub entries: Vec<ReportEntry>,
}

impl Report {
    pub fn fundamental(&self) -> &HarmonicHit {
        &self.harmonics[0]
    }

    pub fn displayed_fundamental_mhz(&self) -> f64 {
        self.fundamental().displayed_frequency_mhz
    }

    pub fn harmonic_entries(&self) -> impl Iterator<Item = &HarmonicHit> {
        self.entries.iter().filter_map(|entry| match entry {
            ReportEntry::Harmonic(hit) => Some(hit),
            ReportEntry::Metric(_) => None,
        })
    }

    pub fn metric_notes(&self) -> impl Iterator<Item = &MetricNote> {
        self.entries.iter().filter_map(|entry| match entry {
            ReportEntry::Metric(note) => Some(note),
            ReportEntry::Harmonic(_) => None,
        })
    }

    pub fn to_json(&self) -> AnalysisResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Stage input: the products of every earlier stage.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub trace: Trace,
    pub calibrated: Vec<Sample>,
    pub detection: Detection,
    pub summary: DistortionSummary,
}

/// Shapes stage outputs into a [`Report`].
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    config: AnalysisConfig,
}

impl ReportAssembler {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn assemble(&self, input: ReportInput) -> Report {
        let ReportInput {
            trace,
            calibrated,
            detection,
            summary,
        } = input;
        let (filtered, harmonics) = detection.into_parts();

        let mut entries: Vec<ReportEntry> = harmonics
            .iter()
            .cloned()
            .map(ReportEntry::Harmonic)
            .collect();
        if self.config.show_metrics {
            entries.push(ReportEntry::Metric(MetricNote::thd(&summary)));
            entries.push(ReportEntry::Metric(MetricNote::dominant(&summary)));
        }

        Report {
            config: self.config.clone(),
            trace,
            calibrated,
            filtered,
            harmonics,
            summary,
            entries,
        }
    }
}

impl ProcessingStage for ReportAssembler {
    type Input<'a> = ReportInput;
    type Output = Report;

    fn name(&self) -> &'static str {
        "ReportAssembler"
    }

    fn execute<'a>(&self, input: ReportInput) -> AnalysisResult<Report> {
        Ok(self.assemble(input))
    }
}
