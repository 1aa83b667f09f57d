use crate::prelude::{AnalysisConfig, AnalysisResult, ProcessingStage};
use crate::processing::{CalibrationAdjuster, DistortionMetrics, HarmonicDetector};
use crate::report::{Report, ReportAssembler, ReportInput};
use crate::telemetry::LogManager;
use crate::trace::{Trace, TraceParser};

/// Runs parse → calibrate → detect → metrics → assemble for one trace.
///
/// Holds no per-trace state; one instance can serve any number of traces.
#[derive(Default)]
pub struct Pipeline {
    logger: LogManager,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new(),
        }
    }

    /// Same as [`Pipeline::run`] for raw upload bytes.
    pub fn run_bytes(&self, raw: &[u8], config: &AnalysisConfig) -> AnalysisResult<Report> {
        config.validate()?;
        let parser = TraceParser::new();
        let trace = parser.parse_bytes(raw)?;
        self.run_parsed(trace, config)
    }

    pub fn run(&self, text: &str, config: &AnalysisConfig) -> AnalysisResult<Report> {
        config.validate()?;
        let parser = TraceParser::new();
        let trace = parser.execute(text)?;
        self.run_parsed(trace, config)
    }

    fn run_parsed(&self, trace: Trace, config: &AnalysisConfig) -> AnalysisResult<Report> {
        self.logger.record(
            "TraceParser",
            &format!("{} samples parsed", trace.samples.len()),
        );
        self.logger.detail(
            "TraceParser",
            &format!("metadata {:?}", trace.metadata.fields()),
        );
        if trace.dropped_rows > 0 {
            self.logger.detail(
                "TraceParser",
                &format!("{} non-numeric rows excluded", trace.dropped_rows),
            );
        }

        let calibration = CalibrationAdjuster::new(config.attenuation_db);
        let calibrated = calibration.execute(&trace.samples)?;

        let detector = HarmonicDetector::new(config.threshold_dbm);
        let detection = detector.execute(&calibrated)?;
        self.logger.record(
            detector.name(),
            &format!(
                "{} samples above threshold, fundamental {:.3} MHz @ {:.2} dBm, {} harmonics up to order {}",
                detection.filtered().len(),
                detection.fundamental().frequency_mhz,
                detection.fundamental().power_dbm,
                detection.overtones().len(),
                detection.max_order()
            ),
        );

        self.logger.detail(
            detector.name(),
            &format!(
                "detected orders {:?}",
                detection
                    .harmonics()
                    .iter()
                    .map(|hit| hit.order)
                    .collect::<Vec<_>>()
            ),
        );

        let metrics = DistortionMetrics::new();
        let summary = metrics.execute(&detection)?;
        self.logger.record(
            metrics.name(),
            &format!(
                "THD {:.2}% dominant {:.2} dBc",
                summary.thd_percent, summary.dominant_dbc
            ),
        );
        if !summary.has_dominant() {
            self.logger
                .caution(metrics.name(), "no harmonic detected above threshold");
        }

        let assembler = ReportAssembler::new(config.clone());
        assembler.execute(ReportInput {
            trace,
            calibrated,
            detection,
            summary,
        })
    }
}
