use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use harmonicore::prelude::AnalysisConfig;
use harmonicore::report::{ChartLayout, ExportTable, Report};
use harmonicore::telemetry::MetricsRecorder;
use harmonicore::Pipeline;
use log::{error, info};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct WorkflowResult {
    pub report: Report,
    pub table: ExportTable,
    pub layout: ChartLayout,
}

impl WorkflowResult {
    pub fn summary_line(&self) -> String {
        let summary = &self.report.summary;
        format!(
            "fundamental {} MHz @ {:.2} dBm, harmonics {}, THD {:.2}%, dominant {}",
            self.report.displayed_fundamental_mhz(),
            self.report.fundamental().power_dbm,
            self.report.harmonics.len() - 1,
            summary.thd_percent_rounded(),
            if summary.has_dominant() {
                format!("{:.2} dBc", summary.dominant_dbc)
            } else {
                "undefined".to_string()
            }
        )
    }
}

/// Hands out artifact directory names, suffixing repeats so traces sharing a
/// file stem (`a/x.csv`, `b/x.csv`) never overwrite each other.
#[derive(Debug, Default)]
pub struct StemAllocator {
    used: HashSet<String>,
}

impl StemAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_for_path(&mut self, path: &Path) -> String {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "trace".to_string());
        self.allocate(&stem)
    }

    pub fn allocate(&mut self, stem: &str) -> String {
        let mut candidate = stem.to_string();
        let mut suffix = 2;
        while self.used.contains(&candidate) {
            candidate = format!("{}-{}", stem, suffix);
            suffix += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

#[derive(Serialize)]
struct ReportArtifact<'a> {
    report: &'a Report,
    chart: &'a ChartLayout,
    export: &'a ExportTable,
}

pub struct Runner {
    config: WorkflowConfig,
    analysis: AnalysisConfig,
    pipeline: Pipeline,
    metrics: MetricsRecorder,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        let analysis = config.to_analysis_config();
        Self {
            config,
            analysis,
            pipeline: Pipeline::new(),
            metrics: MetricsRecorder::new(),
        }
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    pub fn execute_file(&self, path: &Path) -> anyhow::Result<WorkflowResult> {
        let raw = fs::read(path).with_context(|| format!("reading trace {}", path.display()));
        let raw = match raw {
            Ok(raw) => raw,
            Err(err) => {
                self.metrics.record_rejected();
                return Err(err);
            }
        };
        self.execute_with(&path.display().to_string(), |pipeline, config| {
            pipeline.run_bytes(&raw, config)
        })
    }

    pub fn execute_text(&self, label: &str, text: &str) -> anyhow::Result<WorkflowResult> {
        self.execute_with(label, |pipeline, config| pipeline.run(text, config))
    }

    fn execute_with<F>(&self, label: &str, run: F) -> anyhow::Result<WorkflowResult>
    where
        F: FnOnce(&Pipeline, &AnalysisConfig) -> harmonicore::AnalysisResult<Report>,
    {
        match run(&self.pipeline, &self.analysis) {
            Ok(report) => {
                self.metrics.record_analyzed(report.trace.dropped_rows);
                info!("analyzed {}", label);
                let table = ExportTable::from_report(&report);
                let layout = ChartLayout::from_report(&report);
                Ok(WorkflowResult {
                    report,
                    table,
                    layout,
                })
            }
            Err(err) => {
                self.metrics.record_rejected();
                error!("{}: {}", label, err);
                Err(err).with_context(|| format!("analyzing {}", label))
            }
        }
    }

    /// Writes the CSV table and the JSON report into `<output_dir>/<stem>/`.
    pub fn write_artifacts(
        &self,
        stem: &str,
        result: &WorkflowResult,
    ) -> anyhow::Result<Vec<PathBuf>> {
        let dir = self.config.output_dir.join(stem);
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;

        let csv_path = dir.join(&result.layout.csv_file_name);
        fs::write(&csv_path, result.table.to_csv())
            .with_context(|| format!("writing {}", csv_path.display()))?;

        let artifact = ReportArtifact {
            report: &result.report,
            chart: &result.layout,
            export: &result.table,
        };
        let json = serde_json::to_string_pretty(&artifact).context("serializing report")?;
        let json_path = dir.join(format!("{}.report.json", stem));
        fs::write(&json_path, json).with_context(|| format!("writing {}", json_path.display()))?;

        Ok(vec![csv_path, json_path])
    }
}
