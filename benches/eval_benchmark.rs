use criterion::{Criterion, black_box, criterion_group, criterion_main};
use formula_rs::{FormulaParser, interp};

fn bench_evaluation(c: &mut Criterion) {
    c.bench_function("flat_arithmetic", |b| {
        b.iter(|| interp(black_box("10*(3-5)^4/2")).unwrap())
    });

    c.bench_function("functions_and_constants", |b| {
        b.iter(|| interp(black_box("sqrt(exp(pi)) + sin(10^5)")).unwrap())
    });

    c.bench_function("variables", |b| {
        let mut parser = FormulaParser::new("3*x^2 - 4*y + 3/y", 4);
        parser.set_variables(&[('x', -4.0), ('y', 8.0)]);
        b.iter(|| parser.evaluate().unwrap())
    });

    c.bench_function("nested_parentheses", |b| {
        b.iter(|| interp(black_box("8+(10*(3+(5-(2^(1+1)))))/2")).unwrap())
    });
}

criterion_group!(benches, bench_evaluation);
criterion_main!(benches);
