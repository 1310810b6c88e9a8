use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use exl_core::to_command_line;
use exl_launch::load_config;

use super::find_experiment;

#[derive(Args, Debug)]
pub struct PrintArgsArgs {
    #[arg(long)]
    pub config: PathBuf,
    #[arg(long)]
    pub experiment: String,
}

pub fn run(args: &PrintArgsArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.config)?;
    let params = find_experiment(&config, &args.experiment)?;
    println!("{}", to_command_line(&params));
    Ok(())
}
