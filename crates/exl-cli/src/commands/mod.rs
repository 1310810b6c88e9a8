pub mod launch;
pub mod print_args;
pub mod render;

use std::error::Error;

use exl_core::{ErrorInfo, LaunchError, ParameterSet};
use exl_launch::LaunchConfig;

/// Looks up one experiment's parameters in a loaded launch file.
pub(crate) fn find_experiment(
    config: &LaunchConfig,
    experiment: &str,
) -> Result<ParameterSet, Box<dyn Error>> {
    config
        .parameter_sets()?
        .into_iter()
        .find(|(name, _)| name == experiment)
        .map(|(_, params)| params)
        .ok_or_else(|| {
            let err = LaunchError::Configuration(
                ErrorInfo::new("cli.unknown_experiment", "experiment not found in launch file")
                    .with_context("experiment", experiment),
            );
            Box::new(err) as Box<dyn Error>
        })
}
