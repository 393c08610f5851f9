use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sift_core::KGramIndex;
use sift_types::KGramConfig;

/// Deterministic vocabulary with shared prefixes, so grams collect many words.
fn vocabulary(size: usize) -> Vec<String> {
    let mut rng = fastrand::Rng::with_seed(42);
    (0..size)
        .map(|_| {
            let len = rng.usize(3..12);
            (0..len).map(|_| rng.char('a'..='p')).collect()
        })
        .collect()
}

fn bench_kgram_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("kgram_build");
    for size in [1_000usize, 10_000] {
        let words = vocabulary(size);
        for (name, config) in [
            ("ordered", KGramConfig::ordered()),
            ("buffered", KGramConfig::buffered()),
        ] {
            group.bench_with_input(BenchmarkId::new(name, size), &words, |b, words| {
                b.iter(|| {
                    let mut index = KGramIndex::new(config);
                    index.build(words.iter().map(String::as_str));
                    black_box(index.total_words())
                })
            });
        }
    }
    group.finish();
}

fn bench_wildcard(c: &mut Criterion) {
    let words = vocabulary(10_000);
    let mut index = KGramIndex::new(KGramConfig::default());
    index.build(words.iter().map(String::as_str));

    c.bench_function("expand_prefix_wildcard", |b| {
        b.iter(|| index.expand_wildcard(black_box("ab*")).map(|w| w.len()))
    });
}

criterion_group!(benches, bench_kgram_build, bench_wildcard);
criterion_main!(benches);
