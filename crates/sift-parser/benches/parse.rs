//! Parser and code generator benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sift_parser::{generate, lower, parse, CodegenOptions, LoweringContext, ParserOptions};

const SAMPLE_SOURCE: &str = r#"
// Sample JavaScript code for benchmarking
function fibonacci(n) {
    if (n <= 1) return n;
    return fibonacci(n - 1) + fibonacci(n - 2);
}

class Calculator {
    constructor() {
        this.result = 0;
    }

    add(x, y = 0) {
        return x + y;
    }

    async fetchData(url) {
        const response = await fetch(url);
        return response?.body ?? null;
    }
}

const calc = new Calculator();
const numbers = [1, 2, 3, 4, 5].map(n => n * 2);
const { a, b, ...rest } = { a: 1, b: 2, c: 3, d: 4 };
const template = `Hello ${name}, you have ${count} messages`;
const view = <ul className="list">{numbers.map(n => <li>{n}</li>)}</ul>;

export { Calculator, fibonacci };
export default calc;
"#;

fn options() -> ParserOptions {
    ParserOptions::default().with_jsx(true)
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(SAMPLE_SOURCE.len() as u64));

    group.bench_function("sample", |b| {
        b.iter(|| parse(black_box(SAMPLE_SOURCE), options()).unwrap())
    });

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Bytes(SAMPLE_SOURCE.len() as u64));

    group.bench_function("lower_and_minify", |b| {
        b.iter(|| {
            let mut program = parse(black_box(SAMPLE_SOURCE), options()).unwrap();
            lower(&mut program, &mut LoweringContext::default());
            generate(&program, &CodegenOptions::minify())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_pipeline);
criterion_main!(benches);
