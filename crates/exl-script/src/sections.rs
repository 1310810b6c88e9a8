//! Ordered section renderers making up a submission script.
//!
//! Each renderer sees the whole [`RenderContext`] and contributes at most one
//! block of text. Blocks carry their own trailing blank line so concatenating
//! the non-empty ones yields the final script.

use std::path::Path;

use crate::resources::{configured, Program, ResourceSpec};

const RULE: &str = "###############################################################################";

/// Everything a section may draw from.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub resources: &'a ResourceSpec,
    pub program: &'a Program,
    /// Absolute interpreter path for the `#!` line.
    pub shell_path: &'a Path,
    /// Directory receiving the scheduler's stdout/stderr files.
    pub logs_dir: &'a Path,
    /// Pre-serialized experiment arguments.
    pub command_line: &'a str,
    pub index: Option<u32>,
}

/// Renders zero or one block of script text.
pub type Section = fn(&RenderContext<'_>) -> Option<String>;

/// Sections in emission order.
pub const SECTIONS: &[(&str, Section)] = &[
    ("interpreter", interpreter),
    ("banner", banner),
    ("account", account),
    ("partition", partition),
    ("gres", gres),
    ("reservation", reservation),
    ("fixed", fixed_directives),
    ("output", output_files),
    ("shell", shell),
    ("startup", startup),
    ("environment", environment),
    ("stagger", stagger),
    ("program", program),
];

fn interpreter(ctx: &RenderContext<'_>) -> Option<String> {
    Some(format!("#!{}\n\n", ctx.shell_path.display()))
}

fn banner(_: &RenderContext<'_>) -> Option<String> {
    Some(format!("{RULE}\n# SLURM Configurations\n\n"))
}

fn directive(flag: &str, value: &Option<String>) -> Option<String> {
    configured(value).map(|value| format!("#SBATCH --{flag}={value}\n"))
}

fn account(ctx: &RenderContext<'_>) -> Option<String> {
    directive("account", &ctx.resources.account)
}

fn partition(ctx: &RenderContext<'_>) -> Option<String> {
    directive("partition", &ctx.resources.partition)
}

fn gres(ctx: &RenderContext<'_>) -> Option<String> {
    directive("gres", &ctx.resources.gres)
}

fn reservation(ctx: &RenderContext<'_>) -> Option<String> {
    directive("reservation", &ctx.resources.reservation)
}

fn fixed_directives(ctx: &RenderContext<'_>) -> Option<String> {
    let res = ctx.resources;
    // n_seeds >= 1 is checked before rendering.
    let last_task = res.n_seeds.saturating_sub(1);
    Some(format!(
        "#SBATCH --nodes=1\n\
         #SBATCH --time={}\n\
         #SBATCH --mem={}G\n\
         #SBATCH --array=0-{}\n\
         #SBATCH --cpus-per-task={}\n\n",
        res.walltime.render(),
        res.memory_gb,
        last_task,
        res.cpus_per_task,
    ))
}

fn output_files(ctx: &RenderContext<'_>) -> Option<String> {
    let logs = ctx.logs_dir.display();
    Some(format!(
        "## output files\n\
         #SBATCH --output={logs}/%x_%A_%a.out\n\
         #SBATCH --error={logs}/%x_%A_%a.err\n\n"
    ))
}

fn shell(ctx: &RenderContext<'_>) -> Option<String> {
    let name = ctx.resources.shell_name();
    Some(format!("# shell command\n{name}\nsource ~/.{name}rc\n\n"))
}

fn startup(_: &RenderContext<'_>) -> Option<String> {
    Some(format!(
        "{RULE}\n\
         # Your PROGRAM call starts here\n\
         echo \"Starting Job $SLURM_JOB_ID, Index $SLURM_ARRAY_TASK_ID\"\n\n"
    ))
}

fn environment(ctx: &RenderContext<'_>) -> Option<String> {
    configured(&ctx.resources.conda_env).map(|env| format!("# conda\nconda activate {env}\n\n"))
}

fn stagger(ctx: &RenderContext<'_>) -> Option<String> {
    let delay = ctx.resources.stagger_delay(ctx.index);
    Some(format!("# stagger\nsleep {delay}\n\n"))
}

fn program(ctx: &RenderContext<'_>) -> Option<String> {
    let mut text = format!(
        "{} {} \\\n\t\t--seed $SLURM_ARRAY_TASK_ID",
        ctx.program.interpreter,
        ctx.program.entry_point.display()
    );
    if !ctx.command_line.is_empty() {
        text.push_str(" \\\n\t\t");
        text.push_str(ctx.command_line);
    }
    text.push('\n');
    Some(text)
}
