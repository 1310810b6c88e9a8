use std::path::PathBuf;

use criterion::{criterion_group, criterion_main, Criterion};
use exl_core::ParameterSet;
use exl_script::{Program, ResourceSpec, ScriptBuilder};

fn fixed_shell(_: &str) -> Option<PathBuf> {
    Some(PathBuf::from("/usr/bin/zsh"))
}

fn bench_render(c: &mut Criterion) {
    let resources = ResourceSpec {
        n_seeds: 16,
        account: Some("bench".into()),
        reservation: Some("bench-resv".into()),
        conda_env: Some("torch".into()),
        stagger_seconds: Some(5),
        ..ResourceSpec::default()
    };
    let program = Program::new("python", "run.py");
    let params: ParameterSet = (0..32)
        .map(|idx| (format!("param_{idx}"), vec![idx, idx + 1, idx + 2]))
        .collect();

    c.bench_function("script_render", |b| {
        b.iter(|| {
            ScriptBuilder::new(&resources, &program)
                .params(&params)
                .index(Some(3))
                .logs_dir("/tmp/logs")
                .render(&fixed_shell)
                .expect("render")
        });
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
