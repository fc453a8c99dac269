use savant::interval::BlockError;
use savant::{parse_line, Block, ColumnMapping, RichIntervalRecord};
use test_case::test_case;

#[test_case("3,8,15,", &[3, 8, 15] ; "trailing comma")]
#[test_case("3,8,15", &[3, 8, 15] ; "no trailing comma")]
#[test_case("42", &[42] ; "single value")]
#[test_case("", &[] ; "empty list")]
fn packed_lists_decode(packed: &str, expected: &[i64]) {
    assert_eq!(Block::extract_blocks(packed).expect("list decodes"), expected);
}

#[test_case("3,,15", 1 ; "empty middle token")]
#[test_case("3,x,15", 1 ; "non numeric token")]
#[test_case("3,8,15,,", 3 ; "double trailing comma")]
fn malformed_lists_are_rejected(packed: &str, index: usize) {
    match Block::extract_blocks(packed) {
        Err(BlockError::BadToken { index: found, .. }) => assert_eq!(found, index),
        other => panic!("expected a bad token error, got {other:?}"),
    }
}

fn bed(line: &str) -> RichIntervalRecord {
    parse_line(line, &ColumnMapping::bed()).expect("BED line parses")
}

#[test]
fn bed12_blocks_are_relative_to_the_feature() {
    let record = bed("chr1\t999\t2000\tgene\t500\t+\t1099\t1900\t255,0,0\t2\t200,300,\t0,701,");
    assert_eq!(
        record.blocks(),
        Some(&[Block::new(0, 200), Block::new(701, 300)][..])
    );
    assert_eq!(record.interval().start(), 1000);
    assert_eq!(record.thick_start(), 1100);
}

#[test]
fn gene_pred_exons_are_reanchored_on_tx_start() {
    let line = "585\tNM_1\tchr1\t-\t999\t2000\t1099\t1900\t2\t999,1700,\t1200,2000,\t0\tGENE\tcmpl\tcmpl\t0,0,";
    let record = parse_line(line, &ColumnMapping::gene_pred()).expect("genePred line parses");
    assert_eq!(
        record.blocks(),
        Some(&[Block::new(0, 201), Block::new(701, 300)][..])
    );
    assert_eq!(record.alternate_name(), Some("GENE"));
}

#[test]
fn mismatched_block_columns_fail_the_line() {
    let result = parse_line(
        "chr1\t0\t100\tx\t0\t+\t0\t100\t0\t2\t10,20,\t0,",
        &ColumnMapping::bed(),
    );
    assert!(result.is_err());
}
