use proptest::prelude::*;
use savant::{Interval, Region};
use test_case::test_case;

fn interval() -> impl Strategy<Value = Interval> {
    (1i64..10_000, 0i64..500).prop_map(|(start, len)| Interval::new(start, start + len))
}

proptest! {
    #[test]
    fn intersection_is_symmetric(a in interval(), b in interval()) {
        prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        prop_assert_eq!(a.intersects_or_abuts(&b), b.intersects_or_abuts(&a));
    }

    #[test]
    fn strict_intersection_implies_abutting(a in interval(), b in interval()) {
        if a.intersects(&b) {
            prop_assert!(a.intersects_or_abuts(&b));
            prop_assert!(a.shares_base(&b));
        }
    }

    #[test]
    fn merge_spans_both_or_keeps_self(a in interval(), b in interval()) {
        let merged = a.merge(&b);
        if a.intersects_or_abuts(&b) {
            prop_assert!(merged.contains(&a));
            prop_assert!(merged.contains(&b));
            prop_assert_eq!(merged.length(), merged.end() - merged.start() + 1);
        } else {
            prop_assert_eq!(merged, a);
        }
    }

    #[test]
    fn adjacent_intervals_abut_but_do_not_intersect(start in 1i64..10_000, len in 0i64..100, gap in 0i64..3) {
        let a = Interval::new(start, start + len);
        let b = Interval::new(a.end() + 1 + gap, a.end() + 50 + gap);
        prop_assert!(!a.intersects(&b));
        prop_assert_eq!(a.intersects_or_abuts(&b), gap == 0);
    }

    #[test]
    fn region_display_parses_back(reference in "[A-Za-z0-9_]{1,8}", iv in interval()) {
        let region = Region::new(reference, iv);
        let parsed: Region = region.to_string().parse().expect("displayed region parses");
        prop_assert_eq!(parsed, region);
    }
}

#[test_case((1, 10), (10, 20), false ; "shared boundary base")]
#[test_case((1, 10), (9, 20), true ; "two shared bases")]
#[test_case((5, 6), (1, 100), true ; "nested")]
fn strict_intersection_table(a: (i64, i64), b: (i64, i64), expected: bool) {
    assert_eq!(Interval::new(a.0, a.1).intersects(&Interval::new(b.0, b.1)), expected);
}

#[test_case((1, 10), (11, 20), true ; "adjacent")]
#[test_case((1, 10), (12, 20), false ; "one base gap")]
fn abutting_table(a: (i64, i64), b: (i64, i64), expected: bool) {
    assert_eq!(
        Interval::new(a.0, a.1).intersects_or_abuts(&Interval::new(b.0, b.1)),
        expected
    );
}

#[test_case("chr1:1,000-2,000", "chr1", 1000, 2000 ; "thousands separators")]
#[test_case("chrX:500", "chrX", 500, Interval::MAX_END ; "open ended")]
#[test_case("HLA-A*01:01:1-5", "HLA-A*01:01", 1, 5 ; "colon in reference")]
fn region_parsing_table(text: &str, reference: &str, start: i64, end: i64) {
    let region: Region = text.parse().expect("region parses");
    assert_eq!(region.reference, reference);
    assert_eq!(region.interval, Interval::new(start, end));
}

#[test]
fn reversed_region_is_rejected() {
    assert!("chr1:20-10".parse::<Region>().is_err());
}
