//! Harmonic analysis core for spectrum-analyzer traces.
//!
//! The modules follow the analysis pipeline: a trace is parsed, its power
//! readings are calibrated, the fundamental and its harmonics are detected,
//! distortion metrics are derived and everything is assembled into a
//! [`report::Report`] for the rendering and export collaborators.

pub mod math;
pub mod pipeline;
pub mod prelude;
pub mod processing;
pub mod report;
pub mod telemetry;
pub mod trace;

pub use pipeline::Pipeline;
pub use prelude::{AnalysisConfig, AnalysisError, AnalysisResult, ProcessingStage};
