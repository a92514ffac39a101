//! Tests for range module

use super::*;
use std::cmp::Ordering;
use test_case::test_case;

fn r(min: &str, max: &str, min_inclusive: bool, max_inclusive: bool) -> Range<String> {
    Range::new(min.to_string(), max.to_string(), min_inclusive, max_inclusive)
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_half_open_defaults() {
    let range = Range::half_open("000A".to_string(), "000D".to_string());
    assert!(range.is_min_inclusive);
    assert!(!range.is_max_inclusive);
    assert!(!range.is_empty());
    assert!(!range.is_point());
}

#[test]
fn test_point_and_empty() {
    assert!(Range::point("0015".to_string()).is_point());
    assert!(!Range::point("0015".to_string()).is_empty());
    assert!(r("", "", true, false).is_empty());
    assert!(r("0A", "0A", false, true).is_empty());
}

#[test]
fn test_full_range() {
    let full = Range::full();
    assert_eq!(full.min, MIN_EFFECTIVE_KEY);
    assert_eq!(full.max, MAX_EFFECTIVE_KEY);
    assert_eq!(full.to_string(), "[,FF)");
}

#[test]
fn test_generic_over_integers() {
    let range = Range::half_open(10u64, 20u64);
    assert!(range.contains(&10));
    assert!(range.contains(&19));
    assert!(!range.contains(&20));
    assert!(range.overlaps(&Range::half_open(19, 30)));
    assert!(!range.overlaps(&Range::half_open(20, 30)));
}

// ============================================================================
// Contains / Overlap Tests
// ============================================================================

#[test_case("000A", true ; "inclusive min")]
#[test_case("000C", true ; "interior")]
#[test_case("000D", false ; "exclusive max")]
#[test_case("0009", false ; "below")]
fn test_contains(key: &str, expected: bool) {
    assert_eq!(r("000A", "000D", true, false).contains(&key.to_string()), expected);
}

#[test_case(r("0A", "0D", true, true), r("0B", "0E", true, true), true ; "interior overlap")]
#[test_case(r("0A", "0D", true, true), r("0D", "0E", true, true), true ; "shared inclusive point")]
#[test_case(r("0A", "0D", true, false), r("0D", "0E", true, false), false ; "adjacent half open")]
#[test_case(r("0012", "0015", false, true), r("0015", "0020", true, false), true ; "inclusive max touches min")]
#[test_case(r("0012", "0015", false, true), r("000D", "0012", true, false), false ; "exclusive min touches max")]
#[test_case(r("", "", true, false), r("", "000A", true, false), false ; "empty never overlaps")]
#[test_case(r("", "", true, true), r("", "000A", true, false), true ; "minimal point")]
fn test_overlaps(a: Range<String>, b: Range<String>, expected: bool) {
    assert_eq!(a.overlaps(&b), expected);
    assert_eq!(b.overlaps(&a), expected);
}

// ============================================================================
// Comparator Tests
// ============================================================================

#[test]
fn test_cmp_by_min() {
    assert_eq!(
        r("0A", "0B", true, false).cmp_by_min(&r("0A", "0C", false, false)),
        Ordering::Less
    );
    assert_eq!(
        r("0B", "0C", true, false).cmp_by_min(&r("0A", "0C", true, false)),
        Ordering::Greater
    );
    assert_eq!(
        r("0A", "0B", true, false).cmp_by_min(&r("0A", "0F", true, true)),
        Ordering::Equal
    );
}

#[test]
fn test_cmp_by_max() {
    assert_eq!(
        r("0A", "0C", true, true).cmp_by_max(&r("0B", "0C", true, false)),
        Ordering::Greater
    );
    assert_eq!(
        r("0A", "0B", true, true).cmp_by_max(&r("0A", "0C", true, false)),
        Ordering::Less
    );
}

// ============================================================================
// Serialization Tests
// ============================================================================

#[test]
fn test_range_serialization_omits_default_flags() {
    let json = serde_json::to_string(&r("0A", "0D", true, false)).unwrap();
    assert_eq!(json, r#"{"min":"0A","max":"0D"}"#);

    let json = serde_json::to_string(&r("0A", "0D", false, true)).unwrap();
    assert!(json.contains("\"is_min_inclusive\":false"));
    assert!(json.contains("\"is_max_inclusive\":true"));
}

#[test]
fn test_range_deserialization_defaults_to_half_open() {
    let range: Range<String> = serde_json::from_str(r#"{"min":"","max":"FF","extra":1}"#).unwrap();
    assert_eq!(range, Range::full());
}

#[test]
fn test_partition_key_range_to_range() {
    let pkr = PartitionKeyRange::new("3", "0012", "0015").with_parents(vec!["1".to_string()]);
    assert_eq!(pkr.to_range(), r("0012", "0015", true, false));
    assert_eq!(pkr.parents, vec!["1".to_string()]);
}
