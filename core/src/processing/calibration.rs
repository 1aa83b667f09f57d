use crate::prelude::{AnalysisResult, ProcessingStage};
use crate::trace::Sample;

/// Adds the measurement-chain attenuation back onto every power reading.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationAdjuster {
    attenuation_db: f64,
}

impl CalibrationAdjuster {
    pub fn new(attenuation_db: f64) -> Self {
        Self { attenuation_db }
    }

    pub fn apply(&self, samples: &[Sample]) -> Vec<Sample> {
        samples
            .iter()
            .map(|sample| Sample::new(sample.frequency_hz, sample.power_dbm + self.attenuation_db))
            .collect()
    }
}

impl ProcessingStage for CalibrationAdjuster {
    type Input<'a> = &'a [Sample];
    type Output = Vec<Sample>;

    fn name(&self) -> &'static str {
        "CalibrationAdjuster"
    }

    fn execute<'a>(&self, input: &'a [Sample]) -> AnalysisResult<Vec<Sample>> {
        Ok(self.apply(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attenuation_is_added_in_order() {
        let samples = vec![Sample::new(1.0, -50.0), Sample::new(2.0, -20.5)];
        let calibrated = CalibrationAdjuster::new(20.0).apply(&samples);
        assert_eq!(
            calibrated,
            vec![Sample::new(1.0, -30.0), Sample::new(2.0, -0.5)]
        );
    }

    #[test]
    fn negative_offset_lowers_readings() {
        let calibrated = CalibrationAdjuster::new(-3.0)
            .execute(&[Sample::new(5.0, -10.0)])
            .unwrap();
        assert_eq!(calibrated[0].power_dbm, -13.0);
    }
}
