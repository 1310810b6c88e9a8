use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use exl_core::{sha256_hex, ErrorInfo, LaunchError, ParameterSet};
use exl_launch::{Launcher, RunMode, RunReport, Submission, Submitter};
use exl_script::{Program, ResourceSpec};

#[derive(Clone, Default)]
struct RecordingSubmitter {
    calls: Rc<RefCell<Vec<PathBuf>>>,
    /// Rejects every submission once this many have been accepted.
    fail_after: Option<usize>,
}

impl Submitter for RecordingSubmitter {
    fn command_line(&self, script: &Path) -> String {
        format!("sbatch {}", script.display())
    }

    fn submit(&self, script: &Path) -> Result<Submission, LaunchError> {
        let mut calls = self.calls.borrow_mut();
        if self.fail_after.is_some_and(|limit| calls.len() >= limit) {
            return Err(LaunchError::Submission(ErrorInfo::new("submit.exit", "rejected")));
        }
        calls.push(script.to_path_buf());
        Ok(Submission {
            job_id: Some(format!("{}", 1000 + calls.len())),
            stdout: String::new(),
        })
    }
}

fn fixed_shell(_: &str) -> Option<PathBuf> {
    Some(PathBuf::from("/bin/zsh"))
}

fn launcher(log_dir: &Path, resources: ResourceSpec, submitter: RecordingSubmitter) -> Launcher {
    Launcher::new("demo", log_dir, Program::new("python", "run.py"), resources)
        .expect("launcher")
        .with_shell_resolver(fixed_shell)
        .with_submitter(submitter)
}

fn register_two(launcher: &mut Launcher) {
    launcher.register("baseline", ParameterSet::new().with("lr", 0.1));
    launcher.register("wide", ParameterSet::new().with("layers", vec![512, 512]));
}

#[test]
fn cluster_run_writes_and_submits_in_registration_order() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let submitter = RecordingSubmitter::default();
    let mut launcher = launcher(dir.path(), ResourceSpec::default(), submitter.clone());
    register_two(&mut launcher);

    let report = launcher.run(RunMode::Cluster, false).expect("cluster run");

    let root = dir.path().join("demo");
    let expected = vec![
        root.join("baseline/slurm_files/slurm_baseline_0.sh"),
        root.join("wide/slurm_files/slurm_wide_1.sh"),
    ];
    assert_eq!(*submitter.calls.borrow(), expected);
    assert!(root.join("baseline/slurm_logs").is_dir());
    assert!(root.join("wide/slurm_logs").is_dir());

    assert_eq!(report.scripts.len(), 2);
    assert_eq!(report.scripts[0].command_line, "--lr 0.1");
    assert_eq!(report.scripts[1].job_id.as_deref(), Some("1002"));
    let text = fs::read_to_string(&expected[1]).expect("script written");
    assert_eq!(report.scripts[1].sha256, sha256_hex(&text));
    assert!(text.contains(&format!(
        "#SBATCH --output={}/%x_%A_%a.out",
        root.join("wide/slurm_logs").display()
    )));

    let manifest = fs::read(root.join("manifest.json")).expect("manifest written");
    let parsed: RunReport = serde_json::from_slice(&manifest).expect("manifest parses");
    assert_eq!(parsed, report);
}

#[test]
fn registry_is_cleared_after_run() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let submitter = RecordingSubmitter::default();
    let mut launcher = launcher(dir.path(), ResourceSpec::default(), submitter.clone());
    register_two(&mut launcher);
    launcher.run(RunMode::Cluster, false).expect("first run");
    assert_eq!(launcher.pending().count(), 0);

    let second = launcher.run(RunMode::Cluster, false).expect("empty run");
    assert!(second.scripts.is_empty());
    assert_eq!(submitter.calls.borrow().len(), 2);
}

#[test]
fn re_registration_overwrites_in_place() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let mut launcher = launcher(dir.path(), ResourceSpec::default(), RecordingSubmitter::default());
    register_two(&mut launcher);
    let previous = launcher.register("baseline", ParameterSet::new().with("lr", 0.5));
    assert_eq!(previous, Some(ParameterSet::new().with("lr", 0.1)));
    assert_eq!(launcher.pending().collect::<Vec<_>>(), ["baseline", "wide"]);

    let report = launcher.run(RunMode::Cluster, true).expect("dry run");
    assert_eq!(report.scripts[0].command_line, "--lr 0.5");
}

#[test]
fn caller_mutation_after_registration_is_not_observed() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let mut launcher = launcher(dir.path(), ResourceSpec::default(), RecordingSubmitter::default());
    let mut params = ParameterSet::new().with("lr", 0.1);
    launcher.register("baseline", params.clone());
    params.insert("lr", 9.0);

    let report = launcher.run(RunMode::Cluster, true).expect("dry run");
    assert_eq!(report.scripts[0].command_line, "--lr 0.1");
}

#[test]
fn dry_run_writes_scripts_but_submits_nothing() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let submitter = RecordingSubmitter::default();
    let mut launcher = launcher(dir.path(), ResourceSpec::default(), submitter.clone());
    register_two(&mut launcher);

    let report = launcher.run(RunMode::Cluster, true).expect("dry run");
    assert!(submitter.calls.borrow().is_empty());
    assert!(report.dry_run);
    assert!(report.scripts.iter().all(|record| record.job_id.is_none()));
    assert!(report.scripts[0].path.is_file());
    assert_eq!(
        report.scripts[0].submit_command,
        format!("sbatch {}", report.scripts[0].path.display())
    );
    assert!(!dir.path().join("demo/manifest.json").exists());
}

#[test]
fn stagger_uses_experiment_index() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let resources = ResourceSpec {
        stagger_seconds: Some(10),
        ..ResourceSpec::default()
    };
    let mut launcher = launcher(dir.path(), resources, RecordingSubmitter::default());
    register_two(&mut launcher);
    launcher.register("third", ParameterSet::new());
    let report = launcher.run(RunMode::Cluster, true).expect("dry run");
    let third = fs::read_to_string(&report.scripts[2].path).expect("third script");
    assert!(third.contains("\nsleep 20\n"));
}

#[test]
fn zero_seeds_fails_before_any_file_is_written() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let resources = ResourceSpec {
        n_seeds: 0,
        ..ResourceSpec::default()
    };
    let submitter = RecordingSubmitter::default();
    let mut launcher = launcher(dir.path(), resources, submitter.clone());
    register_two(&mut launcher);

    let err = launcher.run(RunMode::Cluster, false).expect_err("configuration error");
    assert!(matches!(err, LaunchError::Configuration(_)));
    assert!(!dir.path().join("demo").exists());
    assert!(submitter.calls.borrow().is_empty());
    assert_eq!(launcher.pending().count(), 0);
}

#[test]
fn unresolvable_shell_fails_before_any_file_is_written() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let mut launcher = Launcher::new(
        "demo",
        dir.path(),
        Program::new("python", "run.py"),
        ResourceSpec::default(),
    )
    .expect("launcher")
    .with_shell_resolver(|_: &str| -> Option<PathBuf> { None });
    register_two(&mut launcher);

    let err = launcher.run(RunMode::Cluster, true).expect_err("shell error");
    assert!(matches!(err, LaunchError::ShellResolution(_)));
    assert!(!dir.path().join("demo").exists());
}

#[test]
fn invalid_experiment_name_is_rejected() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let mut launcher = launcher(dir.path(), ResourceSpec::default(), RecordingSubmitter::default());
    launcher.register("../escape", ParameterSet::new());
    let err = launcher.run(RunMode::Cluster, true).expect_err("bad name");
    assert_eq!(err.info().code, "experiment.invalid_name");
}

#[test]
fn submission_failure_is_fatal() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let submitter = RecordingSubmitter {
        fail_after: Some(0),
        ..RecordingSubmitter::default()
    };
    let mut launcher = launcher(dir.path(), ResourceSpec::default(), submitter);
    register_two(&mut launcher);
    let err = launcher.run(RunMode::Cluster, false).expect_err("submission error");
    assert!(matches!(err, LaunchError::Submission(_)));
}

#[test]
fn partial_submission_keeps_accepted_jobs_in_manifest() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let submitter = RecordingSubmitter {
        fail_after: Some(1),
        ..RecordingSubmitter::default()
    };
    let mut launcher = launcher(dir.path(), ResourceSpec::default(), submitter.clone());
    register_two(&mut launcher);
    let err = launcher.run(RunMode::Cluster, false).expect_err("second submission fails");
    assert!(matches!(err, LaunchError::Submission(_)));
    assert_eq!(submitter.calls.borrow().len(), 1);

    let manifest = fs::read(dir.path().join("demo/manifest.json")).expect("partial manifest");
    let parsed: RunReport = serde_json::from_slice(&manifest).expect("manifest parses");
    assert_eq!(parsed.scripts.len(), 1);
    assert_eq!(parsed.scripts[0].experiment, "baseline");
    assert_eq!(parsed.scripts[0].job_id.as_deref(), Some("1001"));
}

#[test]
fn empty_run_on_fresh_launcher_writes_manifest() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let submitter = RecordingSubmitter::default();
    let mut launcher = launcher(dir.path(), ResourceSpec::default(), submitter.clone());

    let report = launcher.run(RunMode::Cluster, false).expect("empty run");
    assert!(report.scripts.is_empty());
    assert!(submitter.calls.borrow().is_empty());
    assert!(dir.path().join("demo/manifest.json").is_file());
}

#[test]
fn render_is_deterministic() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let mut launcher = launcher(dir.path(), ResourceSpec::default(), RecordingSubmitter::default());
    register_two(&mut launcher);
    let first = launcher.render("wide", Some(1)).expect("render");
    let second = launcher.render("wide", Some(1)).expect("render again");
    assert_eq!(first, second);
    assert!(first.ends_with("--layers 512 512\n"));
    let err = launcher.render("missing", None).expect_err("unknown experiment");
    assert_eq!(err.info().code, "launcher.unknown_experiment");
}
