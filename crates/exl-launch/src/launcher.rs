use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use exl_core::errors::{ErrorInfo, LaunchError};
use exl_core::{call_signature, sha256_hex, to_command_line, ParameterSet};
use exl_script::{PathLookup, Program, ResourceSpec, ScriptBuilder, ShellResolver, SubmissionScript};
use indexmap::IndexMap;
use tracing::{error, info, warn};

use crate::config::{validate_name, LaunchConfig};
use crate::experiment::Experiment;
use crate::layout::LaunchLayout;
use crate::report::{InvocationRecord, InvocationStatus, RunMode, RunReport, ScriptRecord};
use crate::submit::{CommandSubmitter, Submitter};

/// Conventional name of the experiment function, used in dry-run listings.
const ENTRY_FUNCTION: &str = "experiment";

/// Script rendered in memory, waiting to be written.
struct PendingScript {
    experiment: String,
    index: u32,
    command_line: String,
    script: SubmissionScript,
}

/// Registers parameter sets and runs them locally or on the cluster.
pub struct Launcher {
    name: String,
    layout: LaunchLayout,
    program: Program,
    resources: ResourceSpec,
    experiments: IndexMap<String, ParameterSet>,
    experiment: Option<Box<dyn Experiment>>,
    submitter: Box<dyn Submitter>,
    resolver: Box<dyn ShellResolver>,
}

impl Launcher {
    pub fn new(
        name: impl Into<String>,
        log_dir: impl Into<PathBuf>,
        program: Program,
        resources: ResourceSpec,
    ) -> Result<Self, LaunchError> {
        let name = name.into();
        validate_name("launcher", &name)?;
        let layout = LaunchLayout::resolve(&log_dir.into(), &name)?;
        Ok(Self {
            name,
            layout,
            program,
            resources,
            experiments: IndexMap::new(),
            experiment: None,
            submitter: Box::new(CommandSubmitter::default()),
            resolver: Box::new(PathLookup::from_env()),
        })
    }

    /// Builds a launcher and registers every experiment listed in `config`.
    pub fn from_config(config: &LaunchConfig) -> Result<Self, LaunchError> {
        let mut launcher = Self::new(
            config.name.clone(),
            config.log_dir.clone(),
            config.program.clone(),
            config.resources.clone(),
        )?
        .with_submitter(CommandSubmitter::new(config.submit_command.clone()));
        for (name, params) in config.parameter_sets()? {
            launcher.register(name, params);
        }
        Ok(launcher)
    }

    /// Entry point used by local runs.
    pub fn with_experiment(mut self, experiment: impl Experiment + 'static) -> Self {
        self.experiment = Some(Box::new(experiment));
        self
    }

    pub fn with_submitter(mut self, submitter: impl Submitter + 'static) -> Self {
        self.submitter = Box::new(submitter);
        self
    }

    pub fn with_shell_resolver(mut self, resolver: impl ShellResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &LaunchLayout {
        &self.layout
    }

    pub fn resources(&self) -> &ResourceSpec {
        &self.resources
    }

    /// Stores `params` under `name`, returning the set it replaced.
    ///
    /// The launcher owns its copy, so callers may keep mutating their own.
    pub fn register(&mut self, name: impl Into<String>, params: ParameterSet) -> Option<ParameterSet> {
        self.experiments.insert(name.into(), params)
    }

    /// Registered experiment names in run order.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.experiments.keys().map(String::as_str)
    }

    /// Renders the script of one registered experiment without touching disk.
    pub fn render(&self, experiment: &str, index: Option<u32>) -> Result<String, LaunchError> {
        let params = self.experiments.get(experiment).ok_or_else(|| {
            LaunchError::Configuration(
                ErrorInfo::new("launcher.unknown_experiment", "experiment is not registered")
                    .with_context("experiment", experiment),
            )
        })?;
        validate_name("experiment", experiment)?;
        ScriptBuilder::new(&self.resources, &self.program)
            .params(params)
            .index(index)
            .logs_dir(self.layout.logs_dir(experiment))
            .render(&*self.resolver)
    }

    /// Runs every registered experiment, then clears the registry.
    ///
    /// Local failures of individual invocations are recorded in the report;
    /// every other error aborts the run.
    pub fn run(&mut self, mode: RunMode, dry_run: bool) -> Result<RunReport, LaunchError> {
        let experiments = std::mem::take(&mut self.experiments);
        match mode {
            RunMode::Local => self.run_local(&experiments, dry_run),
            RunMode::Cluster => self.run_cluster(&experiments, dry_run),
        }
    }

    fn run_local(
        &self,
        experiments: &IndexMap<String, ParameterSet>,
        dry_run: bool,
    ) -> Result<RunReport, LaunchError> {
        self.resources.validate()?;
        let mut report = RunReport::new(&self.name, RunMode::Local, dry_run);
        let entry = match (&self.experiment, dry_run) {
            (Some(entry), _) => Some(&**entry),
            (None, true) => None,
            (None, false) => {
                return Err(LaunchError::Configuration(
                    ErrorInfo::new("local.no_experiment", "no experiment entry point configured")
                        .with_context("launcher", self.name.clone())
                        .with_hint("attach one with Launcher::with_experiment"),
                ))
            }
        };
        for (name, params) in experiments {
            for seed in 0..u64::from(self.resources.n_seeds) {
                let record = match entry {
                    Some(entry) if !dry_run => invoke(entry, name, params, seed),
                    _ => {
                        println!("{name}: {}", call_signature(ENTRY_FUNCTION, params, seed));
                        InvocationRecord {
                            experiment: name.clone(),
                            seed,
                            status: InvocationStatus::Planned,
                            error: None,
                        }
                    }
                };
                report.invocations.push(record);
            }
        }
        let failed = report.failures().count();
        if failed > 0 {
            warn!(launcher = %self.name, failed, "local sweep finished with failures");
        } else {
            info!(launcher = %self.name, invocations = report.invocations.len(), "local sweep finished");
        }
        Ok(report)
    }

    fn run_cluster(
        &self,
        experiments: &IndexMap<String, ParameterSet>,
        dry_run: bool,
    ) -> Result<RunReport, LaunchError> {
        // Render everything first so a bad configuration writes nothing.
        let mut pending = Vec::with_capacity(experiments.len());
        for (idx, (name, params)) in experiments.iter().enumerate() {
            validate_name("experiment", name)?;
            let index = u32::try_from(idx).map_err(|_| {
                LaunchError::Configuration(ErrorInfo::new(
                    "launcher.too_many_experiments",
                    "experiment index exceeds u32",
                ))
            })?;
            let command_line = to_command_line(params);
            let text = ScriptBuilder::new(&self.resources, &self.program)
                .command_line(command_line.clone())
                .index(Some(index))
                .logs_dir(self.layout.logs_dir(name))
                .render(&*self.resolver)?;
            pending.push(PendingScript {
                experiment: name.clone(),
                index,
                command_line,
                script: SubmissionScript::new(self.layout.script_path(name, Some(index)), text),
            });
        }

        let mut report = RunReport::new(&self.name, RunMode::Cluster, dry_run);
        for item in &pending {
            self.layout.ensure(&item.experiment)?;
            let path = item.script.write()?;
            info!(experiment = %item.experiment, path = %path.display(), "wrote submission script");
        }

        for item in pending {
            let path = &item.script.path;
            let submit_command = self.submitter.command_line(path);
            let job_id = if dry_run {
                println!("{}", item.script.text);
                println!("{submit_command}");
                None
            } else {
                let submission = match self.submitter.submit(path) {
                    Ok(submission) => submission,
                    Err(err) => {
                        // Keep the job ids already handed out by the scheduler.
                        if let Err(persist_err) = self.persist(&report) {
                            warn!(launcher = %self.name, error = %persist_err, "could not write partial manifest");
                        }
                        return Err(err);
                    }
                };
                info!(
                    experiment = %item.experiment,
                    job_id = submission.job_id.as_deref().unwrap_or("unknown"),
                    "submitted"
                );
                submission.job_id
            };
            report.scripts.push(ScriptRecord {
                experiment: item.experiment,
                index: item.index,
                sha256: sha256_hex(&item.script.text),
                path: item.script.path,
                command_line: item.command_line,
                submit_command,
                job_id,
            });
        }

        if !dry_run {
            self.persist(&report)?;
        }
        Ok(report)
    }

    fn persist(&self, report: &RunReport) -> Result<(), LaunchError> {
        self.layout.ensure_root()?;
        let path = self.layout.manifest_path();
        report.write_manifest(&path)?;
        info!(launcher = %self.name, path = %path.display(), "wrote manifest");
        Ok(())
    }
}

fn invoke(entry: &dyn Experiment, name: &str, params: &ParameterSet, seed: u64) -> InvocationRecord {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| entry.run(params, seed)));
    let failure = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(ErrorInfo::new("local.invoke", err.to_string())),
        Err(payload) => Some(ErrorInfo::new("local.panic", panic_message(payload.as_ref()))),
    };
    match failure {
        None => InvocationRecord {
            experiment: name.to_string(),
            seed,
            status: InvocationStatus::Completed,
            error: None,
        },
        Some(info) => {
            let err = LaunchError::ExperimentInvocation(
                info.with_context("experiment", name)
                    .with_context("seed", seed.to_string())
                    .with_context("params", to_command_line(params)),
            );
            error!(experiment = %name, seed, error = %err, "experiment failed");
            InvocationRecord {
                experiment: name.to_string(),
                seed,
                status: InvocationStatus::Failed,
                error: Some(err),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "experiment panicked".to_string()
    }
}
