use std::collections::BTreeMap;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use refq_core::{FileId, ParameterSpec, SourcePosition, TypeRef};
use refq_refactor::{
    apply_edits, compute_edits, ExactMatch, Identifier, Parameter, ParameterList,
    RefactorDirective, RefactorTarget,
};

const CALLS: u32 = 200;
const CALL_LINE: &str = "    target(count, name);";

fn fixture() -> String {
    let mut out = String::from("package bench;\n\npublic class Fixture {\n");
    out.push_str("  void target(int count, String name) {}\n\n");
    out.push_str("  void run() {\n");
    for _ in 0..CALLS {
        out.push_str(CALL_LINE);
        out.push('\n');
    }
    out.push_str("  }\n}\n");
    out
}

fn targets(file: &FileId) -> Vec<RefactorTarget> {
    let decl = RefactorTarget::MethodDeclaration {
        identifier: Identifier::new(SourcePosition::new(file.clone(), 4, 7), "target"),
        parameters: ParameterList::new(
            13,
            36,
            vec![23],
            vec![
                Parameter::new("count", TypeRef::scalar("int")),
                Parameter::new("name", TypeRef::scalar("String")),
            ],
        ),
    };
    let mut out = vec![decl];
    for i in 0..CALLS {
        out.push(RefactorTarget::CallSite {
            identifier: Identifier::new(SourcePosition::new(file.clone(), 7 + i, 4), "target"),
            parameters: ParameterList::new(
                10,
                22,
                vec![16],
                vec![
                    Parameter::new("count", TypeRef::scalar("int")),
                    Parameter::new("name", TypeRef::scalar("String")),
                ],
            ),
        });
    }
    out
}

fn bench_refactorings(c: &mut Criterion) {
    let mut group = c.benchmark_group("refactor");
    group.measurement_time(Duration::from_secs(2));
    group.warm_up_time(Duration::from_secs(1));
    group.sample_size(20);

    let file = FileId::new("Fixture.java");
    let source = fixture();
    let targets = targets(&file);

    group.bench_function("rename_and_apply", |b| {
        let directive = RefactorDirective::Rename {
            new_name: "targetRenamed".into(),
        };
        let computed = compute_edits(&directive, &targets, &ExactMatch);
        assert!(
            computed.failures.is_empty(),
            "rename fixture should produce edits for every target"
        );

        b.iter_batched(
            || BTreeMap::from([(file.clone(), source.clone())]),
            |mut store| {
                let computed = compute_edits(black_box(&directive), &targets, &ExactMatch);
                black_box(apply_edits(&mut store, &computed.targets))
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("change_parameters_and_apply", |b| {
        let directive = RefactorDirective::ChangeParameters {
            parameters: vec![
                ParameterSpec::new("count", TypeRef::scalar("long")),
                ParameterSpec::new("name", TypeRef::scalar("String")),
                ParameterSpec::new("flags", TypeRef::new("boolean", 1)),
            ],
        };

        b.iter_batched(
            || BTreeMap::from([(file.clone(), source.clone())]),
            |mut store| {
                let computed = compute_edits(black_box(&directive), &targets, &ExactMatch);
                black_box(apply_edits(&mut store, &computed.targets))
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_refactorings);
criterion_main!(benches);
