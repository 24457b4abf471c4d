use nbsim::{AnyScenario, ModeConfig, Preset, Scenario, ScenarioConfig, Snapshot};
use nbsim::{run_bulk, run_continuous, FnSink};

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{unbounded, RecvTimeoutError};
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(about = "Direct N-body gravity simulator")]
struct Args {
    /// Scenario YAML; bare names are looked up in the crate's scenarios/ directory
    #[arg(short, long, default_value = "circular.yaml", conflicts_with = "preset")]
    file: String,

    /// Use a built-in preset instead of a file
    #[arg(short, long, value_enum)]
    preset: Option<Preset>,

    /// Override the scenario's run mode
    #[arg(short, long, value_parser = parse_mode)]
    mode: Option<ModeConfig>,

    /// Continuous mode: wall-clock seconds to run before cancelling
    #[arg(long, default_value_t = 5.0)]
    run_for: f64,

    /// Print every n-th snapshot
    #[arg(long, default_value_t = 1)]
    every: u64,
}

fn parse_mode(s: &str) -> Result<ModeConfig, String> {
    match s {
        "bulk" => Ok(ModeConfig::Bulk),
        "continuous" => Ok(ModeConfig::Continuous),
        other => Err(format!("unknown mode '{other}' (expected bulk or continuous)")),
    }
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let given = PathBuf::from(file_name);
    let config_path = if given.exists() {
        given
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn write_snapshot<const D: usize>(out: &mut impl Write, snapshot: &Snapshot<D>) -> io::Result<()> {
    for (i, body) in snapshot.bodies.iter().enumerate() {
        write!(out, "{}\t{:.9e}\t{}\t{}", snapshot.tick, snapshot.t, i, body.tag)?;
        for c in body.x.iter() {
            write!(out, "\t{:.9e}", c)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn drive<const D: usize>(mut scenario: Scenario<D>, args: &Args) -> Result<()> {
    let every = args.every.max(1);
    let stdout = io::stdout();

    match scenario.engine.mode {
        ModeConfig::Bulk => {
            let mut out = BufWriter::new(stdout.lock());
            let mut failed: Option<io::Error> = None;
            let mut sink = FnSink(|snapshot: &Snapshot<D>| {
                if failed.is_none() && snapshot.tick % every == 0 {
                    if let Err(err) = write_snapshot(&mut out, snapshot) {
                        failed = Some(err);
                    }
                }
            });
            let report = run_bulk(&mut scenario, &mut sink)?;
            if let Some(err) = failed {
                return Err(err).context("failed to write snapshots");
            }
            out.flush()?;
            info!(?report, "done");
        }
        ModeConfig::Continuous => {
            let (tx, rx) = unbounded::<Snapshot<D>>();
            let handle = run_continuous(scenario, tx);
            let deadline = Instant::now() + Duration::from_secs_f64(args.run_for.max(0.0));
            let mut out = stdout.lock();

            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() || handle.is_finished() {
                    break;
                }
                match rx.recv_timeout(remaining) {
                    Ok(snapshot) if snapshot.tick % every == 0 => write_snapshot(&mut out, &snapshot)?,
                    Ok(_) => {}
                    Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            handle.cancel();
            // Anything still queued was emitted before the cancel
            for snapshot in rx.try_iter() {
                if snapshot.tick % every == 0 {
                    write_snapshot(&mut out, &snapshot)?;
                }
            }
            let system = handle.join()?;
            info!(t = system.t, "continuous run stopped");
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut scenario_cfg = match args.preset {
        Some(preset) => preset.config(),
        None => load_scenario_from_yaml(&args.file)?,
    };
    if let Some(mode) = args.mode {
        scenario_cfg.engine.mode = mode;
    }

    match AnyScenario::build(&scenario_cfg)? {
        AnyScenario::Planar(scenario) => drive(scenario, &args),
        AnyScenario::Spatial(scenario) => drive(scenario, &args),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_file_flag() {
        let args = Args::try_parse_from(["nbsim", "--file", "twin.yaml"]).unwrap();
        assert_eq!(args.file, "twin.yaml");
        assert!(args.preset.is_none());

        let args = Args::try_parse_from(["nbsim", "-f", "three_body_3d.yaml", "--mode", "bulk"]).unwrap();
        assert_eq!(args.file, "three_body_3d.yaml");
        assert_eq!(args.mode, Some(ModeConfig::Bulk));
    }

    #[test]
    fn preset_conflicts_with_file() {
        let args = Args::try_parse_from(["nbsim", "--preset", "flying-twins"]).unwrap();
        assert_eq!(args.preset, Some(Preset::FlyingTwins));
        assert_eq!(args.file, "circular.yaml");

        assert!(Args::try_parse_from(["nbsim", "--file", "twin.yaml", "--preset", "twin"]).is_err());
    }
}
