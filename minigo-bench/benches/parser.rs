use criterion::{criterion_group, criterion_main, Criterion};
use minigo::parser::parse_program;
use std::hint::black_box;

fn big_input() -> String {
    let mut src = String::from("package main\n\nfunc main() {\n");
    for i in 0..2_000 {
        src.push_str(&format!("    print(1 + {i} * (2 - {i}) / 3)\n"));
    }
    src.push_str("}\n");
    src
}

fn parser(input: &str) {
    let program = parse_program(input).unwrap();
    _ = black_box(program);
}

fn criterion_benchmark(c: &mut Criterion) {
    let input = big_input();

    c.bench_function("parser", |b| {
        b.iter(|| {
            black_box(parser(black_box(&input)));
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
