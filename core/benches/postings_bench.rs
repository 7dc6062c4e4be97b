use bsearch_core::postings::{difference_ids, intersect_ids, union_ids};
use bsearch_core::tokenizer::{tokenize, TokenizerConfig};
use bsearch_core::DocId;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn stride(step: DocId, n: DocId) -> Vec<DocId> {
    (1..=n).map(|i| i * step).collect()
}

fn bench_merges(c: &mut Criterion) {
    let a = stride(2, 50_000);
    let b = stride(3, 50_000);
    c.bench_function("intersect_100k", |bench| bench.iter(|| intersect_ids(black_box(&a), black_box(&b))));
    c.bench_function("union_100k", |bench| bench.iter(|| union_ids(black_box(&a), black_box(&b))));
    c.bench_function("difference_100k", |bench| bench.iter(|| difference_ids(black_box(&a), black_box(&b))));
}

fn bench_tokenize(c: &mut Criterion) {
    let text = "Friends, Romans, countrymen, lend me your ears; I come to bury Caesar, not to praise him. ".repeat(200);
    let config = TokenizerConfig::default();
    c.bench_function("tokenize_speech", |b| b.iter(|| tokenize(black_box(&text), &config)));
}

criterion_group!(benches, bench_merges, bench_tokenize);
criterion_main!(benches);
