use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use exl_launch::{load_config, Launcher};

use super::find_experiment;

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[arg(long)]
    pub config: PathBuf,
    /// Experiment name from the launch file.
    #[arg(long)]
    pub experiment: String,
    /// Script index used for the stagger delay.
    #[arg(long)]
    pub index: Option<u32>,
}

pub fn run(args: &RenderArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.config)?;
    let params = find_experiment(&config, &args.experiment)?;
    let mut launcher = Launcher::new(
        config.name.clone(),
        config.log_dir.clone(),
        config.program.clone(),
        config.resources.clone(),
    )?;
    launcher.register(args.experiment.clone(), params);
    let text = launcher.render(&args.experiment, args.index)?;
    print!("{text}");
    Ok(())
}
