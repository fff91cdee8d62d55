use criterion::{criterion_group, criterion_main, Criterion};
use minigo::lexer::Lexer;
use std::hint::black_box;

fn big_input() -> String {
    let mut src = String::from("package main\n\nfunc main() {\n");
    for i in 0..2_000 {
        src.push_str(&format!("    print({i} + {i} * 2 - ({i} / 3))\n"));
        src.push_str(&format!("    print(\"line {i}\") // trailing comment\n"));
    }
    src.push_str("}\n");
    src
}

fn lexer(input: &str) -> usize {
    Lexer::new(input).scan().unwrap().len()
}

fn criterion_benchmark(c: &mut Criterion) {
    let input = big_input();

    c.bench_function("lexer", |b| {
        b.iter(|| {
            black_box(lexer(black_box(&input)));
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
