use crate::prelude::{AnalysisError, AnalysisResult, ProcessingStage};
use crate::trace::sample::{max_frequency_mhz, Sample};
use serde::{Deserialize, Serialize};

/// Highest harmonic order searched for, fundamental included.
pub const MAX_HARMONIC_ORDER: u32 = 10;
/// Half-width of each harmonic search window, relative to its theoretical frequency.
pub const HARMONIC_TOLERANCE: f64 = 0.05;

/// Band-plan snapping for the displayed fundamental: `(low, high, displayed)` in MHz.
const DISPLAY_BANDS: [(f64, f64, f64); 2] = [(145.0, 147.0, 146.0), (434.0, 437.0, 435.0)];

/// A detected tone. Order 1 is the fundamental.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonicHit {
    pub order: u32,
    /// Measured frequency of the selected sample.
    pub frequency_mhz: f64,
    /// Idealized frequency used for presentation only.
    pub displayed_frequency_mhz: f64,
    pub power_dbm: f64,
    pub label: String,
}

/// Outcome of a successful detection run.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    filtered: Vec<Sample>,
    harmonics: Vec<HarmonicHit>,
    max_order: u32,
}

impl Detection {
    /// Samples strictly above the detection threshold.
    pub fn filtered(&self) -> &[Sample] {
        &self.filtered
    }

    /// Fundamental first, then detected harmonics by ascending order.
    pub fn harmonics(&self) -> &[HarmonicHit] {
        &self.harmonics
    }

    pub fn fundamental(&self) -> &HarmonicHit {
        &self.harmonics[0]
    }

    /// Detected harmonics of order 2 and above.
    pub fn overtones(&self) -> &[HarmonicHit] {
        &self.harmonics[1..]
    }

    /// Highest order that was searched for.
    pub fn max_order(&self) -> u32 {
        self.max_order
    }

    pub fn into_parts(self) -> (Vec<Sample>, Vec<HarmonicHit>) {
        (self.filtered, self.harmonics)
    }
}

/// Finds the fundamental and its harmonics inside tolerance windows.
#[derive(Debug, Clone, Copy)]
pub struct HarmonicDetector {
    threshold_dbm: f64,
}

impl HarmonicDetector {
    pub fn new(threshold_dbm: f64) -> Self {
        Self { threshold_dbm }
    }

    pub fn detect(&self, samples: &[Sample]) -> AnalysisResult<Detection> {
        let filtered: Vec<Sample> = samples
            .iter()
            .copied()
            .filter(|sample| sample.power_dbm > self.threshold_dbm)
            .collect();

        let fundamental = strongest(filtered.iter()).ok_or(AnalysisError::NoFundamental {
            threshold_dbm: self.threshold_dbm,
        })?;
        let freq_fundamental = fundamental.frequency_mhz();
        let displayed_fundamental = displayed_fundamental_mhz(freq_fundamental);

        let max_order = max_harmonic_order(
            freq_fundamental,
            max_frequency_mhz(samples).unwrap_or(freq_fundamental),
        );

        let mut harmonics = vec![HarmonicHit {
            order: 1,
            frequency_mhz: freq_fundamental,
            displayed_frequency_mhz: displayed_fundamental,
            power_dbm: fundamental.power_dbm,
            label: harmonic_label(1),
        }];

        for order in 2..=max_order {
            let theoretical = order as f64 * freq_fundamental;
            let tolerance = HARMONIC_TOLERANCE * theoretical;
            let (low, high) = (theoretical - tolerance, theoretical + tolerance);
            let candidates = filtered.iter().filter(|sample| {
                let frequency = sample.frequency_mhz();
                frequency >= low && frequency <= high
            });

            if let Some(hit) = strongest(candidates) {
                harmonics.push(HarmonicHit {
                    order,
                    frequency_mhz: hit.frequency_mhz(),
                    displayed_frequency_mhz: order as f64 * displayed_fundamental,
                    power_dbm: hit.power_dbm,
                    label: harmonic_label(order),
                });
            }
        }

        Ok(Detection {
            filtered,
            harmonics,
            max_order,
        })
    }
}

impl ProcessingStage for HarmonicDetector {
    type Input<'a> = &'a [Sample];
    type Output = Detection;

    fn name(&self) -> &'static str {
        "HarmonicDetector"
    }

    fn execute<'a>(&self, input: &'a [Sample]) -> AnalysisResult<Detection> {
        self.detect(input)
    }
}

/// Strongest sample; the first one wins on ties.
fn strongest<'a>(samples: impl Iterator<Item = &'a Sample>) -> Option<&'a Sample> {
    samples.fold(None::<&'a Sample>, |best, sample| match best {
        Some(current) if current.power_dbm >= sample.power_dbm => Some(current),
        _ => Some(sample),
    })
}

/// Presentation frequency for a measured fundamental, absorbing reference drift
/// inside the 2 m and 70 cm bands.
pub fn displayed_fundamental_mhz(frequency_mhz: f64) -> f64 {
    DISPLAY_BANDS
        .iter()
        .find(|(low, high, _)| (*low..=*high).contains(&frequency_mhz))
        .map(|(_, _, displayed)| *displayed)
        .unwrap_or_else(|| frequency_mhz.round_ties_even())
}

/// `min(10, floor(max_frequency / fundamental))`, never below 1.
pub fn max_harmonic_order(fundamental_mhz: f64, max_frequency_mhz: f64) -> u32 {
    if fundamental_mhz <= 0.0 {
        return 1;
    }
    let ratio = (max_frequency_mhz / fundamental_mhz).floor();
    ratio.clamp(1.0, MAX_HARMONIC_ORDER as f64) as u32
}

pub fn harmonic_label(order: u32) -> String {
    if order == 1 {
        return "Fundamental".to_string();
    }
    let suffix = match (order % 10, order % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{} Harmonic", order, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mhz(frequency_mhz: f64, power_dbm: f64) -> Sample {
        Sample::new(frequency_mhz * 1_000_000.0, power_dbm)
    }

    #[test]
    fn detector_finds_fundamental_and_second_harmonic() {
        let samples = vec![
            mhz(144.0, -50.0),
            mhz(145.8, -20.0),
            mhz(291.6, -45.0),
            mhz(440.0, -70.0),
        ];
        let detection = HarmonicDetector::new(-60.0).detect(&samples).unwrap();

        assert_eq!(detection.filtered().len(), 3);
        assert_eq!(detection.max_order(), 3);
        let fundamental = detection.fundamental();
        assert_eq!(fundamental.order, 1);
        assert!((fundamental.frequency_mhz - 145.8).abs() < 1e-9);
        assert_eq!(fundamental.displayed_frequency_mhz, 146.0);
        assert_eq!(fundamental.power_dbm, -20.0);

        let overtones = detection.overtones();
        assert_eq!(overtones.len(), 1);
        assert_eq!(overtones[0].order, 2);
        assert_eq!(overtones[0].displayed_frequency_mhz, 292.0);
        assert!((overtones[0].frequency_mhz - 291.6).abs() < 1e-9);
        assert_eq!(overtones[0].label, "2nd Harmonic");
    }

    #[test]
    fn nothing_above_threshold_is_no_fundamental() {
        let samples = vec![mhz(100.0, -40.0)];
        let err = HarmonicDetector::new(-30.0).detect(&samples).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::NoFundamental { threshold_dbm } if threshold_dbm == -30.0
        ));
        assert!(HarmonicDetector::new(-30.0).detect(&[]).is_err());
    }

    #[test]
    fn threshold_comparison_is_strict() {
        let samples = vec![mhz(100.0, -30.0), mhz(200.0, -29.99)];
        let detection = HarmonicDetector::new(-30.0).detect(&samples).unwrap();
        assert_eq!(detection.filtered().len(), 1);
        assert_eq!(detection.fundamental().power_dbm, -29.99);
    }

    #[test]
    fn harmonic_orders_may_have_gaps() {
        let samples = vec![
            mhz(100.0, -10.0),
            mhz(300.0, -40.0),
            mhz(500.0, -55.0),
            mhz(520.0, -90.0),
        ];
        let detection = HarmonicDetector::new(-60.0).detect(&samples).unwrap();
        let orders: Vec<u32> = detection.harmonics().iter().map(|h| h.order).collect();
        assert_eq!(orders, vec![1, 3, 5]);
    }

    #[test]
    fn window_picks_strongest_and_first_on_ties() {
        let samples = vec![
            mhz(100.0, -10.0),
            mhz(196.0, -50.0),
            mhz(199.0, -40.0),
            mhz(203.0, -40.0),
            mhz(211.0, -105.0),
        ];
        let detection = HarmonicDetector::new(-80.0).detect(&samples).unwrap();
        let second = &detection.overtones()[0];
        assert!((second.frequency_mhz - 199.0).abs() < 1e-9);
    }

    #[test]
    fn equal_power_fundamentals_keep_the_earlier_sample() {
        let samples = vec![mhz(100.0, -10.0), mhz(150.0, -10.0)];
        let detection = HarmonicDetector::new(-60.0).detect(&samples).unwrap();
        assert!((detection.fundamental().frequency_mhz - 100.0).abs() < 1e-9);
    }

    #[test]
    fn order_search_is_capped_at_ten() {
        let mut samples = vec![mhz(10.0, 0.0)];
        samples.extend((2..=15).map(|k| mhz(10.0 * k as f64, -30.0)));
        let detection = HarmonicDetector::new(-60.0).detect(&samples).unwrap();
        assert_eq!(detection.max_order(), MAX_HARMONIC_ORDER);
        assert_eq!(detection.harmonics().len(), 10);
        assert_eq!(detection.harmonics().last().unwrap().order, 10);
    }

    #[test]
    fn max_order_uses_unfiltered_span() {
        let samples = vec![mhz(100.0, -10.0), mhz(410.0, -120.0)];
        let detection = HarmonicDetector::new(-60.0).detect(&samples).unwrap();
        assert_eq!(detection.max_order(), 4);
        assert_eq!(detection.harmonics().len(), 1);
    }

    #[test]
    fn zero_frequency_fundamental_searches_no_harmonics() {
        let samples = vec![Sample::new(0.0, -5.0), mhz(100.0, -20.0)];
        let detection = HarmonicDetector::new(-60.0).detect(&samples).unwrap();
        assert_eq!(detection.max_order(), 1);
        assert_eq!(detection.harmonics().len(), 1);
    }

    #[test]
    fn displayed_frequency_snaps_to_band_plan() {
        assert_eq!(displayed_fundamental_mhz(146.3), 146.0);
        assert_eq!(displayed_fundamental_mhz(145.0), 146.0);
        assert_eq!(displayed_fundamental_mhz(147.0), 146.0);
        assert_eq!(displayed_fundamental_mhz(436.9), 435.0);
        assert_eq!(displayed_fundamental_mhz(434.0), 435.0);
        assert_eq!(displayed_fundamental_mhz(437.0), 435.0);
        assert_eq!(displayed_fundamental_mhz(437.5), 438.0);
        assert_eq!(displayed_fundamental_mhz(100.6), 101.0);
        assert_eq!(displayed_fundamental_mhz(50.5), 50.0);
    }

    #[test]
    fn displayed_harmonic_is_exact_multiple() {
        let samples = vec![mhz(146.3, -10.0), mhz(292.6, -40.0), mhz(300.0, -120.0)];
        let detection = HarmonicDetector::new(-60.0).detect(&samples).unwrap();
        assert_eq!(detection.fundamental().displayed_frequency_mhz, 146.0);
        assert_eq!(detection.overtones()[0].displayed_frequency_mhz, 292.0);
        assert!((detection.overtones()[0].frequency_mhz - 292.6).abs() < 1e-9);
    }

    #[test]
    fn labels_use_ordinals() {
        assert_eq!(harmonic_label(1), "Fundamental");
        assert_eq!(harmonic_label(3), "3rd Harmonic");
        assert_eq!(harmonic_label(4), "4th Harmonic");
        assert_eq!(harmonic_label(11), "11th Harmonic");
        assert_eq!(harmonic_label(21), "21st Harmonic");
    }
}
