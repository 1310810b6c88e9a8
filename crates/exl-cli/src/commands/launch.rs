use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use exl_launch::{load_config, Launcher, ProcessExperiment, RunMode};
use tracing::info;

#[derive(Args, Debug)]
pub struct LaunchArgs {
    /// YAML launch file describing resources and experiments.
    #[arg(long)]
    pub config: PathBuf,
    /// Run in this process instead of submitting to Slurm.
    #[arg(long)]
    pub local: bool,
    /// Print what would run without executing or submitting.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: &LaunchArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.config)?;
    let mut launcher = Launcher::from_config(&config)?
        .with_experiment(ProcessExperiment::new(config.program.clone()));
    let mode = if args.local {
        RunMode::Local
    } else {
        RunMode::Cluster
    };
    let report = launcher.run(mode, args.dry_run)?;

    let failed = report.failures().count();
    info!(
        launcher = %report.launcher,
        invocations = report.invocations.len(),
        scripts = report.scripts.len(),
        failed,
        "run finished"
    );
    if !args.dry_run && mode == RunMode::Cluster {
        println!("manifest: {}", launcher.layout().manifest_path().display());
    }
    if failed > 0 {
        return Err(format!("{failed} local invocation(s) failed").into());
    }
    Ok(())
}
