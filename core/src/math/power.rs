/// Logarithmic power conversions shared by the metric and report stages.
pub struct PowerHelper;

impl PowerHelper {
    /// Converts a dBm reading into linear power units (`10^(dBm/10)`).
    pub fn dbm_to_linear(power_dbm: f64) -> f64 {
        10f64.powf(power_dbm / 10.0)
    }

    /// Expresses an amplitude ratio in dB (`20·log10(ratio)`).
    ///
    /// A zero (or negative) ratio maps to negative infinity.
    pub fn amplitude_ratio_db(ratio: f64) -> f64 {
        if ratio > 0.0 {
            20.0 * ratio.log10()
        } else {
            f64::NEG_INFINITY
        }
    }

    /// Rounds to a fixed number of decimal places, passing non-finite values through.
    ///
    /// Goes through the fixed-point text form so the number always equals what
    /// `{:.N}` formatting prints for the same reading.
    pub fn round_to(value: f64, places: usize) -> f64 {
        if !value.is_finite() {
            return value;
        }
        format!("{:.*}", places, value).parse().unwrap_or(value)
    }
}
