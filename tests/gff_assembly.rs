#[path = "common/mod.rs"]
mod common;
use common::assert_bed_matches;
use savant::{ColumnMapping, GffRecord, HierarchyAssembler, Interval, RichIntervalRecord};

fn assemble(lines: &[&str], mapping: &ColumnMapping) -> Vec<RichIntervalRecord> {
    let mut assembler = HierarchyAssembler::new();
    for line in lines {
        assembler.push(GffRecord::parse(line, mapping).expect("line parses"));
    }
    assembler.finish()
}

const GTF: &[&str] = &[
    "chr2\tsrc\ttranscript\t1001\t2000\t.\t-\t.\tgene_id \"g1\"; transcript_id \"t1\"; gene_name \"ABC\";",
    "chr2\tsrc\texon\t1001\t1200\t.\t-\t.\tgene_id \"g1\"; transcript_id \"t1\";",
    "chr2\tsrc\tCDS\t1101\t1200\t.\t-\t0\tgene_id \"g1\"; transcript_id \"t1\";",
    "chr2\tsrc\texon\t1801\t2000\t.\t-\t.\tgene_id \"g1\"; transcript_id \"t1\";",
    "chr2\tsrc\tCDS\t1801\t1900\t.\t-\t0\tgene_id \"g1\"; transcript_id \"t1\";",
];

const GFF3: &[&str] = &[
    "chr3\tsrc\tmRNA\t101\t400\t.\t+\t.\tID=m1;Name=M1",
    "chr3\tsrc\tmRNA\t101\t400\t.\t+\t.\tID=m2;Name=M2",
    "chr3\tsrc\texon\t101\t150\t.\t+\t.\tID=e1;Parent=m1,m2",
    "chr3\tsrc\texon\t301\t400\t.\t+\t.\tID=e2;Parent=m1",
    "chr3\tsrc\tgene\t90\t410\t.\t+\t.\tID=g1",
];

#[test]
fn gtf_transcript_renders_as_golden_bed() {
    let records = assemble(GTF, &ColumnMapping::gtf());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].alternate_name(), Some("ABC"));
    assert_bed_matches("gtf_transcript", &records);
}

#[test]
fn gff3_exon_with_two_parents_lands_in_both() {
    let records = assemble(GFF3, &ColumnMapping::gff());
    assert_eq!(records.len(), 3);
    assert_bed_matches("gff3_shared_exon", &records);
}

#[test]
fn children_listed_before_their_parent_are_still_absorbed() {
    let mut lines = GTF.to_vec();
    lines.rotate_left(1);
    let records = assemble(&lines, &ColumnMapping::gtf());
    assert_eq!(records.len(), 1);
    let blocks = records[0].blocks().expect("transcript has exons");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].position(), 0);
    assert_eq!(blocks[1].position(), 800);
    assert_eq!(records[0].thick_start(), 1101);
    assert_eq!(records[0].thick_end(), 1900);
}

#[test]
fn plain_gff_groups_attach_to_transcripts() {
    let mapping = ColumnMapping::gff();
    let records = assemble(
        &[
            "IV\tcurated\ttranscript\t10\t90\t.\t+\t.\tSequence B0273.1",
            "IV\tcurated\texon\t10\t30\t.\t+\t.\tSequence B0273.1",
            "IV\tcurated\texon\t60\t90\t.\t+\t.\tSequence B0273.1",
            "IV\tcurated\texon\t60\t90\t.\t+\t.\tSequence B0999.2",
        ],
        &mapping,
    );
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name(), Some("Sequence B0273.1"));
    assert_eq!(records[0].blocks().map(<[_]>::len), Some(2));
    assert_eq!(records[1].feature_type(), Some("exon"));
}

#[test]
fn expansion_covers_transcripts_spilling_out_of_the_query() {
    let mapping = ColumnMapping::gtf();
    let mut assembler = HierarchyAssembler::new();
    for line in GTF {
        assembler.push(GffRecord::parse(line, &mapping).expect("line parses"));
    }
    assert_eq!(
        assembler.expanded_range(Interval::new(1500, 1850)),
        Some(Interval::new(1001, 2000))
    );
    assert_eq!(assembler.expanded_range(Interval::new(900, 2100)), None);
}

#[test]
fn gtf_transcript_with_equals_in_a_value_still_assembles() {
    let records = assemble(
        &[
            "chr4\tsrc\ttranscript\t101\t300\t.\t+\t.\tgene_id \"g4\"; transcript_id \"t4\"; note \"a=b\";",
            "chr4\tsrc\texon\t101\t150\t.\t+\t.\tgene_id \"g4\"; transcript_id \"t4\";",
        ],
        &ColumnMapping::gtf(),
    );
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name(), Some("t4"));
    assert_eq!(records[0].blocks().map(<[_]>::len), Some(1));
}

#[test]
fn shared_transcript_ids_do_not_cross_chromosomes() {
    let records = assemble(
        &[
            "chrX\tsrc\ttranscript\t1000\t2000\t.\t+\t.\tgene_id \"par\"; transcript_id \"t1\";",
            "chrX\tsrc\texon\t1000\t1100\t.\t+\t.\tgene_id \"par\"; transcript_id \"t1\";",
            "chrY\tsrc\texon\t50\t100\t.\t+\t.\tgene_id \"par\"; transcript_id \"t1\";",
        ],
        &ColumnMapping::gtf(),
    );
    assert_eq!(records.len(), 2);
    let blocks = records[0].blocks().expect("chrX transcript has its exon");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].position(), 0);
    assert_eq!(records[1].reference(), "chrY");
}
