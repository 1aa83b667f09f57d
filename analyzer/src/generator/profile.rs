use anyhow::ensure;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Configuration for generating a synthetic spectrum-analyzer trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticTraceConfig {
    pub start_mhz: f64,
    pub stop_mhz: f64,
    pub points: usize,
    pub fundamental_mhz: f64,
    pub fundamental_dbm: f64,
    /// Levels of harmonics 2, 3, ... relative to the fundamental.
    pub harmonic_dbc: Vec<f64>,
    pub noise_floor_dbm: f64,
    /// Peak deviation of the uniform noise around the floor.
    pub noise_db: f64,
    pub seed: u64,
    pub name: String,
    pub model: String,
}

impl Default for SyntheticTraceConfig {
    fn default() -> Self {
        Self {
            start_mhz: 100.0,
            stop_mhz: 1000.0,
            points: 9001,
            fundamental_mhz: 145.8,
            fundamental_dbm: -20.0,
            harmonic_dbc: vec![-25.0, -35.0, -55.0],
            noise_floor_dbm: -90.0,
            noise_db: 2.0,
            seed: 0,
            name: "Synthetic Analyzer".to_string(),
            model: "SIM-1".to_string(),
        }
    }
}

impl SyntheticTraceConfig {
    fn step_mhz(&self) -> f64 {
        (self.stop_mhz - self.start_mhz) / (self.points - 1) as f64
    }

    fn tones(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        std::iter::once((self.fundamental_mhz, self.fundamental_dbm)).chain(
            self.harmonic_dbc.iter().enumerate().map(|(idx, dbc)| {
                let order = (idx + 2) as f64;
                (order * self.fundamental_mhz, self.fundamental_dbm + dbc)
            }),
        )
    }
}

/// Renders a trace file (metadata header, `BEGIN`, `hz,dbm` rows).
pub fn build_trace_text(config: &SyntheticTraceConfig) -> anyhow::Result<String> {
    ensure!(config.points >= 2, "synthetic trace needs at least two points");
    ensure!(
        config.stop_mhz > config.start_mhz,
        "synthetic trace stop frequency must exceed start frequency"
    );

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut powers: Vec<f64> = (0..config.points)
        .map(|_| {
            let jitter = if config.noise_db > 0.0 {
                rng.gen_range(-config.noise_db..config.noise_db)
            } else {
                0.0
            };
            config.noise_floor_dbm + jitter
        })
        .collect();

    let step = config.step_mhz();
    for (frequency, level) in config.tones() {
        let bin = ((frequency - config.start_mhz) / step).round();
        if bin >= 0.0 && (bin as usize) < config.points {
            let slot = &mut powers[bin as usize];
            *slot = slot.max(level);
        }
    }

    let mut text = String::new();
    writeln!(text, "!TIMESTAMP Monday, 02 June 2025 14:03:07")?;
    writeln!(text, "!NAME {}", config.name)?;
    writeln!(text, "!MODEL {}", config.model)?;
    writeln!(text, "!SERIAL SIM-{:04}", config.seed)?;
    writeln!(text, "BEGIN")?;
    for (idx, power) in powers.iter().enumerate() {
        let frequency_hz = (config.start_mhz + idx as f64 * step) * 1_000_000.0;
        writeln!(text, "{:.0},{:.2}", frequency_hz, power)?;
    }
    writeln!(text, "END")?;
    Ok(text)
}
