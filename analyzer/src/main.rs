use clap::Parser;
use generator::profile::{build_trace_text, SyntheticTraceConfig};
use std::path::PathBuf;
use workflow::config::{Overrides, WorkflowConfig};
use workflow::runner::{Runner, StemAllocator};

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Harmonic analysis of spectrum-analyzer traces")]
struct Args {
    /// Trace files to analyze
    traces: Vec<PathBuf>,
    /// Load analysis settings from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Equipment name used in the chart title and file names
    #[arg(long)]
    equipment: Option<String>,
    /// Detection threshold in dBm
    #[arg(long, allow_negative_numbers = true)]
    threshold: Option<f64>,
    /// Attenuation offset in dB added to every reading
    #[arg(long, allow_negative_numbers = true)]
    attenuation: Option<f64>,
    #[arg(long, default_value_t = false)]
    hide_limits: bool,
    #[arg(long, default_value_t = false)]
    hide_metrics: bool,
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Analyze a generated trace in addition to the given files
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.traces.is_empty() && !args.synthetic {
        anyhow::bail!("no trace files given (pass paths or --synthetic)");
    }

    let base = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };
    let workflow_config = base.apply_overrides(Overrides {
        equipment: args.equipment,
        threshold_dbm: args.threshold,
        attenuation_db: args.attenuation,
        hide_limits: args.hide_limits,
        hide_metrics: args.hide_metrics,
        output_dir: args.output_dir,
    });
    let runner = Runner::new(workflow_config);
    let mut failures = 0usize;
    let mut stems = StemAllocator::new();

    if args.synthetic {
        let text = build_trace_text(&SyntheticTraceConfig {
            seed: args.seed,
            ..Default::default()
        })?;
        let outcome = runner.execute_text("synthetic", &text);
        if !report_outcome(&runner, &stems.allocate("synthetic"), outcome) {
            failures += 1;
        }
    }

    for path in &args.traces {
        let outcome = runner.execute_file(path);
        if !report_outcome(&runner, &stems.allocate_for_path(path), outcome) {
            failures += 1;
        }
    }

    let snapshot = runner.metrics().snapshot();
    println!(
        "Analyzed {} trace(s), rejected {}, dropped {} malformed row(s)",
        snapshot.analyzed, snapshot.rejected, snapshot.dropped_rows
    );
    if failures > 0 {
        anyhow::bail!("{} trace(s) could not be processed", failures);
    }
    Ok(())
}

fn report_outcome(
    runner: &Runner,
    stem: &str,
    outcome: anyhow::Result<workflow::runner::WorkflowResult>,
) -> bool {
    match outcome.and_then(|result| {
        let written = runner.write_artifacts(stem, &result)?;
        Ok((result, written))
    }) {
        Ok((result, written)) => {
            println!("{} -> {}", stem, result.summary_line());
            for path in written {
                println!("  wrote {}", path.display());
            }
            true
        }
        Err(err) => {
            eprintln!("{}: {:#}", stem, err);
            false
        }
    }
}
