use serde_json::json;

use super::*;

// -----------------------------------------------------------------------
// parse_count
// -----------------------------------------------------------------------

#[test]
fn parse_count_scales_suffixes_exactly() {
    assert_eq!(parse_count(Some("12.3K")), Some(12_300));
    assert_eq!(parse_count(Some("2M")), Some(2_000_000));
    assert_eq!(parse_count(Some("1.15M")), Some(1_150_000));
    assert_eq!(parse_count(Some("3B")), Some(3_000_000_000));
}

#[test]
fn parse_count_suffix_is_case_insensitive() {
    assert_eq!(parse_count(Some("4.5k")), Some(4_500));
    assert_eq!(parse_count(Some("7m")), Some(7_000_000));
    assert_eq!(parse_count(Some("1b")), Some(1_000_000_000));
}

#[test]
fn parse_count_strips_thousands_separators() {
    assert_eq!(parse_count(Some("1,234,567")), Some(1_234_567));
    assert_eq!(parse_count(Some("12\u{a0}345")), Some(12_345));
}

#[test]
fn parse_count_uses_first_token_of_display_text() {
    assert_eq!(parse_count(Some("1.2M subscribers")), Some(1_200_000));
    assert_eq!(parse_count(Some("12,345 videos")), Some(12_345));
    assert_eq!(parse_count(Some("  987 views")), Some(987));
}

#[test]
fn parse_count_falls_back_to_raw_digits() {
    assert_eq!(parse_count(Some("1.234.567")), Some(1_234_567));
    assert_eq!(parse_count(Some("~42")), Some(42));
}

#[test]
fn parse_count_absent_or_unparsable_is_none_not_zero() {
    assert_eq!(parse_count(None), None);
    assert_eq!(parse_count(Some("")), None);
    assert_eq!(parse_count(Some("   ")), None);
    assert_eq!(parse_count(Some("No subscribers")), None);
}

#[test]
fn parse_count_truncates_fraction_without_suffix() {
    assert_eq!(parse_count(Some("1.9")), Some(1));
}

#[test]
fn parse_count_rejects_overflow() {
    assert_eq!(parse_count(Some("99999999999999999999B")), None);
}

// -----------------------------------------------------------------------
// normalize_stat
// -----------------------------------------------------------------------

#[test]
fn normalize_stat_accepts_numbers_and_digit_strings() {
    assert_eq!(normalize_stat(Some(&json!(1500))), Some(1500));
    assert_eq!(normalize_stat(Some(&json!(12.9))), Some(12));
    assert_eq!(normalize_stat(Some(&json!("2,048"))), Some(2048));
}

#[test]
fn normalize_stat_rejects_missing_and_non_numeric() {
    assert_eq!(normalize_stat(None), None);
    assert_eq!(normalize_stat(Some(&json!(null))), None);
    assert_eq!(normalize_stat(Some(&json!("n/a"))), None);
    assert_eq!(normalize_stat(Some(&json!(true))), None);
    assert_eq!(normalize_stat(Some(&json!(-5))), None);
}
