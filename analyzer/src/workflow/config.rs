use anyhow::Context;
use harmonicore::prelude::{AnalysisConfig, DEFAULT_ATTENUATION_DB, DEFAULT_THRESHOLD_DBM};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub equipment: String,
    pub threshold_dbm: f64,
    pub attenuation_db: f64,
    pub show_limits: bool,
    pub show_metrics: bool,
    pub operator: Option<String>,
    pub output_dir: PathBuf,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            equipment: "Equipment".to_string(),
            threshold_dbm: DEFAULT_THRESHOLD_DBM,
            attenuation_db: DEFAULT_ATTENUATION_DB,
            show_limits: true,
            show_metrics: true,
            operator: None,
            output_dir: PathBuf::from("reports"),
        }
    }
}

/// Command-line values that take precedence over the YAML file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub equipment: Option<String>,
    pub threshold_dbm: Option<f64>,
    pub attenuation_db: Option<f64>,
    pub hide_limits: bool,
    pub hide_metrics: bool,
    pub output_dir: Option<PathBuf>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn apply_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(equipment) = overrides.equipment {
            self.equipment = equipment;
        }
        if let Some(threshold) = overrides.threshold_dbm {
            self.threshold_dbm = threshold;
        }
        if let Some(attenuation) = overrides.attenuation_db {
            self.attenuation_db = attenuation;
        }
        if overrides.hide_limits {
            self.show_limits = false;
        }
        if overrides.hide_metrics {
            self.show_metrics = false;
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        self
    }

    pub fn to_analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            equipment: self.equipment.clone(),
            threshold_dbm: self.threshold_dbm,
            attenuation_db: self.attenuation_db,
            show_limits: self.show_limits,
            show_metrics: self.show_metrics,
            operator: self.operator.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn overrides_replace_loaded_values() {
        let cfg = WorkflowConfig::default().apply_overrides(Overrides {
            threshold_dbm: Some(-55.0),
            hide_metrics: true,
            ..Default::default()
        });
        let analysis = cfg.to_analysis_config();
        assert_eq!(analysis.threshold_dbm, -55.0);
        assert_eq!(analysis.attenuation_db, 20.0);
        assert!(!analysis.show_metrics);
        assert!(analysis.show_limits);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"equipment: VHF Handheld\nthreshold_dbm: -45.5\noperator: bench\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.equipment, "VHF Handheld");
        assert_eq!(cfg.threshold_dbm, -45.5);
        assert_eq!(cfg.attenuation_db, 20.0);
        assert_eq!(cfg.operator.as_deref(), Some("bench"));
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = WorkflowConfig::load("/nonexistent/workflow.yaml").unwrap_err();
        assert!(format!("{:#}", err).contains("reading workflow config"));
    }
}
