//! ダブル配列の構築ベンチマーク
//!
//! テスト用の単語リストと、共通接頭辞の多い合成キー集合を使って構築速度を計測します。
//! 初期長を最小にした場合と十分に大きくした場合を比較し、拡張のコストも確認します。

use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use darray::builder::MIN_INITIAL_CAPACITY;
use darray::DoubleArrayBuilder;

const WORDS: &str = include_str!("../src/tests/resources/words.txt");

fn synthetic_keys(n: usize) -> Vec<String> {
    let mut keys: Vec<String> = (0..n)
        .map(|i| format!("key/{:x}/{}", i * 2_654_435_761 % 1_000_003, i % 7))
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

fn bench_build(c: &mut Criterion) {
    let words: Vec<&str> = WORDS.lines().collect();
    let synthetic = synthetic_keys(20_000);

    let mut group = c.benchmark_group("Build");
    group.warm_up_time(Duration::from_secs(1));
    group.sample_size(20);

    let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    for (name, keys) in [("words", words), ("synthetic", synthetic)] {
        group.throughput(Throughput::Elements(keys.len() as u64));
        group.bench_with_input(BenchmarkId::new("default", name), &keys, |b, keys| {
            b.iter(|| std::hint::black_box(DoubleArrayBuilder::new().build(keys).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("growing", name), &keys, |b, keys| {
            b.iter(|| {
                std::hint::black_box(
                    DoubleArrayBuilder::new()
                        .initial_capacity(MIN_INITIAL_CAPACITY)
                        .build(keys)
                        .unwrap(),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
