use serde::{Deserialize, Serialize};

/// Default detection threshold in dBm.
pub const DEFAULT_THRESHOLD_DBM: f64 = -30.0;
/// Default attenuation offset in dB applied to every reading.
pub const DEFAULT_ATTENUATION_DB: f64 = 20.0;

/// Explicit configuration shared by every analysis stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Display name of the equipment under test.
    pub equipment: String,
    /// Samples must be strictly above this power (dBm) to take part in detection.
    pub threshold_dbm: f64,
    /// Offset (dB) added to every measured power reading.
    pub attenuation_db: f64,
    /// Emit the absolute and fundamental-relative limit lines on the chart.
    pub show_limits: bool,
    /// Append THD and dominant-harmonic notes to the harmonic entries.
    pub show_metrics: bool,
    /// Optional credit line printed in the chart footer.
    pub operator: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            equipment: "Equipment".to_string(),
            threshold_dbm: DEFAULT_THRESHOLD_DBM,
            attenuation_db: DEFAULT_ATTENUATION_DB,
            show_limits: true,
            show_metrics: true,
            operator: None,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> AnalysisResult<()> {
        if !self.threshold_dbm.is_finite() {
            return Err(AnalysisError::InvalidConfig(format!(
                "threshold must be finite, got {}",
                self.threshold_dbm
            )));
        }
        if !self.attenuation_db.is_finite() {
            return Err(AnalysisError::InvalidConfig(format!(
                "attenuation must be finite, got {}",
                self.attenuation_db
            )));
        }
        Ok(())
    }
}

/// Common error type for the analysis pipeline.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("invalid trace file: {0}")]
    Parse(String),
    #[error("no signal above threshold ({threshold_dbm} dBm); lower the threshold")]
    NoFundamental { threshold_dbm: f64 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Stateless processing stage; every call depends only on its input and the
/// stage's own parameters.
pub trait ProcessingStage {
    type Input<'a>;
    type Output;

    fn name(&self) -> &'static str;
    fn execute<'a>(&self, input: Self::Input<'a>) -> AnalysisResult<Self::Output>;
}
