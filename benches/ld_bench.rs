//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use savant::*;

fn cohort(loci: usize, participants: usize, separator: char) -> Vec<VcfVariantRecord> {
    (0..loci)
        .map(|locus| {
            let calls: Vec<String> = (0..participants)
                .map(|p| {
                    let a = (locus + p) % 3 == 0;
                    let b = (locus * p) % 5 == 0;
                    format!("{}{separator}{}", a as u8, b as u8)
                })
                .collect();
            let line = format!(
                "chr1\t{}\t.\tA\tG\t.\t.\t.\tGT\t{}",
                locus + 1,
                calls.join("\t")
            );
            VcfVariantRecord::parse(&line).expect("VCF line parses")
        })
        .collect()
}

fn benchmark_ld(c: &mut Criterion) {
    let mut group = c.benchmark_group("ld");
    for (name, separator) in [("phased", '|'), ("unphased", '/')] {
        let records = cohort(200, 100, separator);
        let calculator = LdCalculator::new(LdConfig::detect(&records));
        group.bench_with_input(BenchmarkId::new(name, records.len()), &records, |b, records| {
            b.iter(|| {
                let ld = calculator
                    .calculate(records, &NoProgress, &CancellationToken::new())
                    .expect("calculation succeeds");
                black_box(ld);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_ld);
criterion_main!(benches);
