//! Entry points invoked by local runs.

use std::error::Error;
use std::process::Command;

use exl_core::{command_line_tokens, ParameterSet};
use exl_script::Program;
use tracing::debug;

/// Outcome of one local invocation.
pub type ExperimentResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Callable receiving a parameter set plus the seed of the repetition.
pub trait Experiment {
    fn run(&self, params: &ParameterSet, seed: u64) -> ExperimentResult;
}

impl<F> Experiment for F
where
    F: Fn(&ParameterSet, u64) -> ExperimentResult,
{
    fn run(&self, params: &ParameterSet, seed: u64) -> ExperimentResult {
        self(params, seed)
    }
}

/// Runs the configured program as a child process, the way an array task would.
#[derive(Debug, Clone)]
pub struct ProcessExperiment {
    program: Program,
}

impl ProcessExperiment {
    pub fn new(program: Program) -> Self {
        Self { program }
    }

    /// Argument vector passed after the interpreter.
    pub fn arguments(&self, params: &ParameterSet, seed: u64) -> Vec<String> {
        let mut args = vec![
            self.program.entry_point.display().to_string(),
            "--seed".to_string(),
            seed.to_string(),
        ];
        args.extend(command_line_tokens(params));
        args
    }
}

impl Experiment for ProcessExperiment {
    fn run(&self, params: &ParameterSet, seed: u64) -> ExperimentResult {
        let args = self.arguments(params, seed);
        debug!(interpreter = %self.program.interpreter, ?args, "spawning experiment");
        let status = Command::new(&self.program.interpreter)
            .args(&args)
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(format!("{} exited with {status}", self.program.interpreter).into())
        }
    }
}
