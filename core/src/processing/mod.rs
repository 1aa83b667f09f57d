pub mod calibration;
pub mod distortion;
pub mod harmonics;

pub use calibration::CalibrationAdjuster;
pub use distortion::{DistortionMetrics, DistortionSummary};
pub use harmonics::{Detection, HarmonicDetector, HarmonicHit};
