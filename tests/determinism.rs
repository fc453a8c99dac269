use std::collections::HashSet;

use blake3::hash;
use savant::{CancellationToken, LdCalculator, LdConfig, LdTask, NoProgress, VcfVariantRecord};

fn cohort() -> Vec<VcfVariantRecord> {
    let genotypes = ["0|0", "0|1", "1|0", "1|1"];
    (0..24)
        .map(|locus| {
            let calls: Vec<&str> = (0..16)
                .map(|participant| genotypes[(locus * 7 + participant * 3 + locus * participant) % 4])
                .collect();
            let line = format!(
                "chr1\t{}\t.\tA\tG\t.\tPASS\t.\tGT\t{}",
                1000 + locus * 10,
                calls.join("\t")
            );
            VcfVariantRecord::parse(&line).expect("VCF line parses")
        })
        .collect()
}

fn render(records: &[VcfVariantRecord], ld: &savant::LdMatrices) -> Vec<u8> {
    let labels: Vec<String> = (0..records.len()).map(|i| format!("l{i}")).collect();
    let mut out = Vec::new();
    ld.write_tsv(&mut out, &labels).expect("in-memory write succeeds");
    out
}

#[test]
fn ld_output_is_deterministic() {
    let records = cohort();
    let mut fingerprints = HashSet::new();
    for _ in 0..5 {
        let ld = LdCalculator::new(LdConfig::detect(&records))
            .calculate(&records, &NoProgress, &CancellationToken::new())
            .expect("calculation succeeds");
        fingerprints.insert(hash(&render(&records, &ld)));
    }

    let task = LdTask::spawn(records.clone(), LdConfig::detect(&records));
    let ld = task.join().expect("background calculation succeeds");
    fingerprints.insert(hash(&render(&records, &ld)));

    assert_eq!(fingerprints.len(), 1, "outputs diverged across runs");
}
