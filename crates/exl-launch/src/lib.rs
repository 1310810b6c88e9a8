//! Registers experiment parameter sets and launches them locally or through Slurm.

pub mod config;
pub mod experiment;
pub mod layout;
mod launcher;
pub mod report;
pub mod submit;

pub use config::{load_config, LaunchConfig};
pub use experiment::{Experiment, ExperimentResult, ProcessExperiment};
pub use launcher::Launcher;
pub use layout::LaunchLayout;
pub use report::{InvocationRecord, InvocationStatus, RunMode, RunReport, ScriptRecord};
pub use submit::{parse_job_id, CommandSubmitter, Submission, Submitter};
