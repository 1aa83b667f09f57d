use crate::report::assembler::Report;
use crate::report::format::{decimal_comma, file_slug, format_timestamp, whole_mhz, NOT_AVAILABLE};
use serde::Serialize;

/// Absolute spurious-emission limit drawn on the chart.
pub const ABSOLUTE_LIMIT_DBM: f64 = -16.0;
/// Limit relative to the fundamental.
pub const RELATIVE_LIMIT_DBC: f64 = -40.0;
/// Headroom added above and below the plotted data.
const AXIS_MARGIN_DB: f64 = 5.0;
/// Marker colours cycle through this many palette slots.
const PALETTE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitLine {
    pub label: String,
    pub level_dbm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum LegendEntry {
    /// Scatter marker for a detected tone.
    Marker { text: String, color_index: usize },
    Limit { text: String },
    /// Metric note, rendered highlighted and without a marker.
    Note { text: String },
}

/// Renderer-agnostic description of the annotated spectrum chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y_range: (f64, f64),
    pub limit_lines: Vec<LimitLine>,
    pub legend: Vec<LegendEntry>,
    pub footer: String,
    pub png_file_name: String,
    pub csv_file_name: String,
}

impl ChartLayout {
    pub fn from_report(report: &Report) -> Self {
        let config = &report.config;
        let fundamental = report.fundamental();
        let displayed = whole_mhz(fundamental.displayed_frequency_mhz);
        let relative_level = fundamental.power_dbm + RELATIVE_LIMIT_DBC;

        let limit_lines = if config.show_limits {
            vec![
                LimitLine {
                    label: format!("Absolute limit ({} dBm)", ABSOLUTE_LIMIT_DBM),
                    level_dbm: ABSOLUTE_LIMIT_DBM,
                },
                LimitLine {
                    label: format!("Limit relative to fundamental ({} dBc)", RELATIVE_LIMIT_DBC),
                    level_dbm: relative_level,
                },
            ]
        } else {
            Vec::new()
        };

        let mut legend: Vec<LegendEntry> = report
            .harmonic_entries()
            .enumerate()
            .map(|(idx, hit)| LegendEntry::Marker {
                text: format!(
                    "{} ({} MHz, {} dBm)",
                    hit.label,
                    whole_mhz(hit.displayed_frequency_mhz),
                    decimal_comma(hit.power_dbm, 2)
                ),
                color_index: idx % PALETTE_SIZE,
            })
            .collect();
        legend.extend(limit_lines.iter().map(|line| LegendEntry::Limit {
            text: line.label.clone(),
        }));
        legend.extend(report.metric_notes().map(|note| LegendEntry::Note {
            text: note.text.clone(),
        }));

        Self {
            title: format!(
                "{} - Spectral Transmission Analysis - {} MHz",
                config.equipment, displayed
            ),
            x_label: "Frequency (MHz)".to_string(),
            y_label: "Power (dBm)".to_string(),
            y_range: y_range(report, relative_level),
            limit_lines,
            legend,
            footer: footer(report),
            png_file_name: format!("{}_{}_mhz.png", file_slug(&config.equipment), displayed),
            csv_file_name: format!("harmonics_{}MHz.csv", displayed),
        }
    }
}

// The range always makes room for both limits so toggling them does not rescale the plot.
fn y_range(report: &Report, relative_level: f64) -> (f64, f64) {
    let powers = report.calibrated.iter().map(|sample| sample.power_dbm);
    let lowest = powers
        .clone()
        .fold(ABSOLUTE_LIMIT_DBM.min(relative_level), f64::min);
    let highest = powers.fold(f64::NEG_INFINITY, f64::max);
    (lowest - AXIS_MARGIN_DB, highest + AXIS_MARGIN_DB)
}

fn footer(report: &Report) -> String {
    let metadata = &report.trace.metadata;
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let mut parts = vec![
        format!("Date: {}", format_timestamp(metadata.timestamp.as_deref())),
        format!(
            "Equipment: {} {}",
            field(&metadata.name),
            field(&metadata.model)
        ),
        format!("Serial: {}", field(&metadata.serial)),
        format!("Firmware: {}", field(&metadata.firmware)),
        format!(
            "Attenuation: {} dB",
            report.config.attenuation_db.to_string().replace('.', ",")
        ),
    ];
    if let Some(operator) = report.config.operator.as_deref() {
        parts.push(format!("Measurements by {}", operator));
    }
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use crate::prelude::AnalysisConfig;
    use crate::report::export::ExportTable;

    const TRACE: &str = "!TIMESTAMP Monday, 02 June 2025 14:03:07\n\
        !NAME Site Master\n\
        !MODEL S332E\n\
        BEGIN\n\
        144000000,-70\n\
        145800000,-40\n\
        291600000,-65\n\
        300000000,-110\n";

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            equipment: "Handheld Radio".into(),
            threshold_dbm: -60.0,
            attenuation_db: 20.0,
            operator: Some("the bench team".into()),
            ..Default::default()
        }
    }

    #[test]
    fn layout_carries_title_files_and_limits() {
        let report = Pipeline::new().run(TRACE, &config()).unwrap();
        let layout = ChartLayout::from_report(&report);

        assert_eq!(
            layout.title,
            "Handheld Radio - Spectral Transmission Analysis - 146 MHz"
        );
        assert_eq!(layout.png_file_name, "handheld_radio_146_mhz.png");
        assert_eq!(layout.csv_file_name, "harmonics_146MHz.csv");
        assert_eq!(layout.limit_lines.len(), 2);
        assert_eq!(layout.limit_lines[0].level_dbm, -16.0);
        assert_eq!(layout.limit_lines[1].level_dbm, -60.0);
        // calibrated range spans -90..-20 dBm
        assert_eq!(layout.y_range, (-95.0, -15.0));
    }

    #[test]
    fn legend_lists_markers_limits_then_notes() {
        let report = Pipeline::new().run(TRACE, &config()).unwrap();
        let layout = ChartLayout::from_report(&report);

        assert_eq!(
            layout.legend[0],
            LegendEntry::Marker {
                text: "Fundamental (146 MHz, -20,00 dBm)".into(),
                color_index: 0,
            }
        );
        assert_eq!(
            layout.legend[1],
            LegendEntry::Marker {
                text: "2nd Harmonic (292 MHz, -45,00 dBm)".into(),
                color_index: 1,
            }
        );
        assert!(matches!(layout.legend[2], LegendEntry::Limit { .. }));
        assert!(matches!(layout.legend[4], LegendEntry::Note { .. }));
        assert_eq!(layout.legend.len(), 6);
    }

    #[test]
    fn hidden_limits_keep_the_axis_range() {
        let shown = ChartLayout::from_report(&Pipeline::new().run(TRACE, &config()).unwrap());
        let hidden_config = AnalysisConfig {
            show_limits: false,
            ..config()
        };
        let hidden =
            ChartLayout::from_report(&Pipeline::new().run(TRACE, &hidden_config).unwrap());
        assert!(hidden.limit_lines.is_empty());
        assert_eq!(hidden.y_range, shown.y_range);
    }

    #[test]
    fn legend_and_export_round_half_cent_readings_alike() {
        let analysis = AnalysisConfig {
            threshold_dbm: -60.0,
            attenuation_db: 0.0,
            ..Default::default()
        };
        let report = Pipeline::new()
            .run("BEGIN\n100000000,-10.125\n200000000,-30.125\n", &analysis)
            .unwrap();
        let layout = ChartLayout::from_report(&report);
        let csv = ExportTable::from_report(&report).to_csv();

        assert_eq!(
            layout.legend[0],
            LegendEntry::Marker {
                text: "Fundamental (100 MHz, -10,12 dBm)".into(),
                color_index: 0,
            }
        );
        assert!(matches!(
            &layout.legend[1],
            LegendEntry::Marker { text, .. } if text.contains("-30,12 dBm")
        ));
        assert!(csv.contains("1;100,00;-10,12;Fundamental;Harmonic;"));
        assert!(csv.contains("2;200,00;-30,12;2nd Harmonic;Harmonic;"));
    }

    #[test]
    fn footer_formats_metadata() {
        let report = Pipeline::new().run(TRACE, &config()).unwrap();
        let layout = ChartLayout::from_report(&report);
        assert_eq!(
            layout.footer,
            "Date: 02/06/2025 14:03:07 | Equipment: Site Master S332E | Serial: N/A | \
             Firmware: N/A | Attenuation: 20 dB | Measurements by the bench team"
        );
    }
}
