use crate::math::PowerHelper;
use crate::prelude::{AnalysisResult, ProcessingStage};
use crate::processing::harmonics::{Detection, HarmonicHit};
use crate::report::format::serialize_level;
use serde::Serialize;

/// Distortion figures derived from one detection run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistortionSummary {
    /// `100 · sqrt(Σ P_harmonic) / P_fundamental`, powers in linear units.
    pub thd_percent: f64,
    /// Strongest harmonic relative to the fundamental; negative infinity when
    /// no harmonic was detected.
    #[serde(serialize_with = "serialize_level")]
    pub dominant_dbc: f64,
    /// THD ratio expressed in dB; negative infinity when THD is zero.
    #[serde(serialize_with = "serialize_level")]
    pub thd_db: f64,
}

impl DistortionSummary {
    pub fn has_dominant(&self) -> bool {
        self.dominant_dbc.is_finite()
    }

    /// THD rounded to two decimals, the precision every collaborator renders.
    pub fn thd_percent_rounded(&self) -> f64 {
        PowerHelper::round_to(self.thd_percent, 2)
    }

    pub fn dominant_dbc_rounded(&self) -> f64 {
        PowerHelper::round_to(self.dominant_dbc, 2)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DistortionMetrics;

impl DistortionMetrics {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, fundamental: &HarmonicHit, overtones: &[HarmonicHit]) -> DistortionSummary {
        let fundamental_linear = PowerHelper::dbm_to_linear(fundamental.power_dbm);
        let harmonic_linear: f64 = overtones
            .iter()
            .map(|hit| PowerHelper::dbm_to_linear(hit.power_dbm))
            .sum();

        let thd_percent = 100.0 * harmonic_linear.sqrt() / fundamental_linear;
        let thd_db = PowerHelper::amplitude_ratio_db(thd_percent / 100.0);

        let dominant_dbc = overtones
            .iter()
            .map(|hit| hit.power_dbm)
            .fold(None, |acc: Option<f64>, power| Some(acc.map_or(power, |a| a.max(power))))
            .map(|strongest| strongest - fundamental.power_dbm)
            .unwrap_or(f64::NEG_INFINITY);

        DistortionSummary {
            thd_percent,
            dominant_dbc,
            thd_db,
        }
    }
}

impl ProcessingStage for DistortionMetrics {
    type Input<'a> = &'a Detection;
    type Output = DistortionSummary;

    fn name(&self) -> &'static str {
        "DistortionMetrics"
    }

    fn execute<'a>(&self, input: &'a Detection) -> AnalysisResult<DistortionSummary> {
        Ok(self.compute(input.fundamental(), input.overtones()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(order: u32, power_dbm: f64) -> HarmonicHit {
        HarmonicHit {
            order,
            frequency_mhz: 100.0 * order as f64,
            displayed_frequency_mhz: 100.0 * order as f64,
            power_dbm,
            label: format!("order {}", order),
        }
    }

    #[test]
    fn single_harmonic_metrics() {
        let summary = DistortionMetrics::new().compute(&hit(1, -20.0), &[hit(2, -45.0)]);
        let expected = 100.0 * 10f64.powf(-4.5).sqrt() / 10f64.powf(-2.0);
        assert!((summary.thd_percent - expected).abs() < 1e-9);
        assert_eq!(summary.thd_percent_rounded(), 56.23);
        assert_eq!(summary.dominant_dbc, -25.0);
        assert!(summary.has_dominant());
    }

    #[test]
    fn no_harmonics_means_zero_thd_and_undefined_dominant() {
        let summary = DistortionMetrics::new().compute(&hit(1, -10.0), &[]);
        assert_eq!(summary.thd_percent, 0.0);
        assert_eq!(summary.dominant_dbc, f64::NEG_INFINITY);
        assert_eq!(summary.thd_db, f64::NEG_INFINITY);
        assert!(!summary.has_dominant());
    }

    #[test]
    fn harmonic_powers_are_summed_linearly() {
        let summary =
            DistortionMetrics::new().compute(&hit(1, 0.0), &[hit(2, -20.0), hit(3, -20.0)]);
        let expected = 100.0 * (0.02f64).sqrt();
        assert!((summary.thd_percent - expected).abs() < 1e-9);
        assert_eq!(summary.dominant_dbc, -20.0);
    }

    #[test]
    fn dominant_uses_strongest_harmonic() {
        let summary = DistortionMetrics::new()
            .compute(&hit(1, -10.0), &[hit(2, -60.0), hit(3, -35.5), hit(5, -50.0)]);
        assert_eq!(summary.dominant_dbc, -25.5);
    }

    #[test]
    fn thd_in_db_matches_ratio() {
        let summary = DistortionMetrics::new().compute(&hit(1, 0.0), &[hit(2, -40.0)]);
        // sqrt(1e-4) = 0.01 -> 1 % -> -40 dB
        assert!((summary.thd_percent - 1.0).abs() < 1e-9);
        assert!((summary.thd_db + 40.0).abs() < 1e-9);
    }
}
