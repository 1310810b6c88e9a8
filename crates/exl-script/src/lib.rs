//! Slurm submission script generation.

mod resources;
pub mod sections;
mod script;
pub mod shell;

pub use resources::{Program, ResourceSpec};
pub use script::{script_file_name, ScriptBuilder, SubmissionScript};
pub use sections::{RenderContext, Section, SECTIONS};
pub use shell::{PathLookup, ShellResolver};
