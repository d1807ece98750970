use std::io::Write;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use rand::Rng;
use row_tagger::tagger::row_tagger::{DataFile, Tagger};
use row_tagger::tagger::rules::RuleSet;
use row_tagger::tagger::splitter::SplitStrategy;
use tempfile::NamedTempFile;

const ROWS: usize = 200_000;

const RULES: &str = "LowIncome\n\tincome\tIS\t100,200,300\n\
NotCA\n\tstate\tIS NOT\tCA\n\
CheapCalifornia\n\tstate\tIS\tCA\n\tcategory\tALL EXCEPT\tD\n";

fn synthetic_csv() -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    writeln!(tmp, "id,income,state,category").unwrap();

    let mut rng = rand::rng();
    for i in 0..ROWS {
        let income = rng.random_range(1..100) * 100;
        let state = ["CA", "NY", "TX", "WA", "FL", "OH"][rng.random_range(0..6)];
        let category = ['A', 'B', 'C', 'D'][rng.random_range(0..4)];
        writeln!(tmp, "{},{},{},{}", i, income, state, category).unwrap();
    }
    tmp.flush().unwrap();
    tmp
}

fn bench_tagging(c: &mut Criterion) {
    let data_file = synthetic_csv();
    let data = DataFile::open(data_file.path()).unwrap();

    let mut group = c.benchmark_group("RowTagger");
    group.sample_size(10);
    group.throughput(Throughput::Elements(ROWS as u64));

    group.bench_function("tag_naive", |b| {
        b.iter(|| {
            let mut rule_set = RuleSet::parse(RULES);
            Tagger::new(SplitStrategy::Naive)
                .run(&mut rule_set, &data)
                .unwrap()
        })
    });

    group.bench_function("tag_quoted", |b| {
        b.iter(|| {
            let mut rule_set = RuleSet::parse(RULES);
            Tagger::new(SplitStrategy::Quoted)
                .run(&mut rule_set, &data)
                .unwrap()
        })
    });

    // Single-threaded baseline for scaling comparisons
    group.bench_function("tag_naive_1thread", |b| {
        b.iter(|| {
            let mut rule_set = RuleSet::parse(RULES);
            Tagger::new(SplitStrategy::Naive)
                .with_threads(1)
                .run(&mut rule_set, &data)
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_tagging);
criterion_main!(benches);
