//! Tests for input validation and normalization

use proptest::prelude::*;
use salon_ops::validation::{normalize_email, normalize_phone, phones_match, InputValidator};

#[test]
fn test_validate_name() {
    assert!(InputValidator::validate_name("Ana Ruiz").is_ok());
    assert!(InputValidator::validate_name("").is_err());
    assert!(InputValidator::validate_name("   ").is_err());
    assert!(InputValidator::validate_name("mal\nformado").is_err());
    assert!(InputValidator::validate_name(&"x".repeat(101)).is_err());
}

#[test]
fn test_validate_phone() {
    assert!(InputValidator::validate_phone("612345678").is_ok());
    assert!(InputValidator::validate_phone("+34 612-345-678").is_ok());
    assert!(InputValidator::validate_phone("(+34) 612 345 678").is_ok());
    assert!(InputValidator::validate_phone("").is_err());
    assert!(InputValidator::validate_phone("12345").is_err());
    assert!(InputValidator::validate_phone("1234567890123456").is_err());
    assert!(InputValidator::validate_phone("612abc678").is_err());
}

#[test]
fn test_validate_email() {
    assert!(InputValidator::validate_email("ana@example.com").is_ok());
    assert!(InputValidator::validate_email("").is_err());
    assert!(InputValidator::validate_email("sin-arroba").is_err());
    assert!(InputValidator::validate_email("dos@@arrobas.com").is_err());
    assert!(InputValidator::validate_email("@vacio.com").is_err());
    assert!(InputValidator::validate_email("ana@sindominio").is_err());
}

#[test]
fn test_validate_date_range() {
    let march = "2025-03-01".parse().expect("date");
    let april = "2025-04-01".parse().expect("date");
    assert!(InputValidator::validate_date_range(march, april).is_ok());
    assert!(InputValidator::validate_date_range(march, march).is_ok());
    assert!(InputValidator::validate_date_range(april, march).is_err());
}

#[test]
fn test_validate_amount() {
    assert!(InputValidator::validate_amount(0.0).is_ok());
    assert!(InputValidator::validate_amount(45.5).is_ok());
    assert!(InputValidator::validate_amount(-1.0).is_err());
    assert!(InputValidator::validate_amount(f64::NAN).is_err());
    assert!(InputValidator::validate_amount(200_000.0).is_err());
}

#[test]
fn test_validate_duration() {
    assert!(InputValidator::validate_duration(45).is_ok());
    assert!(InputValidator::validate_duration(0).is_err());
    assert!(InputValidator::validate_duration(-15).is_err());
    assert!(InputValidator::validate_duration(25 * 60).is_err());
}

#[test]
fn test_sanitize_text_strips_control_characters() {
    assert_eq!(InputValidator::sanitize_text("  hola\u{0} mundo  "), "hola mundo");
    assert_eq!(InputValidator::sanitize_text("linea\nnueva"), "linea\nnueva");
}

#[test]
fn test_normalize_phone_strips_formatting() {
    assert_eq!(normalize_phone("+34 612-345-678"), "34612345678");
    assert_eq!(normalize_phone("612345678"), "612345678");
    assert_eq!(normalize_phone("sin digitos"), "");
}

#[test]
fn test_phones_match_ignores_formatting_and_country_code() {
    assert!(phones_match("612345678", "612345678"));
    assert!(phones_match("+34 612-345-678", "612345678"));
    // prefix may sit on either side
    assert!(phones_match("612345678", "0034612345678"));
    assert!(!phones_match("612345678", "699999999"));
}

#[test]
fn test_phones_match_guards_short_digit_runs() {
    // a bare 4-digit tail is too ambiguous to count as the same line
    assert!(!phones_match("5678", "612345678"));
    assert!(!phones_match("", "612345678"));
    assert!(!phones_match("", ""));
}

#[test]
fn test_normalize_email_lowercases_and_trims() {
    assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
}

proptest! {
    /// Formatting punctuation never changes the digit string a phone
    /// normalizes to.
    #[test]
    fn prop_normalize_phone_ignores_punctuation(digits in "[0-9]{7,12}") {
        let spaced = digits.chars().map(|c| format!("{c} ")).collect::<String>();
        let dashed = digits.chars().map(|c| format!("-{c}")).collect::<String>();
        let wrapped = format!("({digits})");
        prop_assert_eq!(normalize_phone(&spaced), digits.clone());
        prop_assert_eq!(normalize_phone(&dashed), digits.clone());
        prop_assert_eq!(normalize_phone(&wrapped), digits);
    }

    /// Normalization is idempotent.
    #[test]
    fn prop_normalize_phone_idempotent(raw in "\\PC*") {
        let once = normalize_phone(&raw);
        prop_assert_eq!(normalize_phone(&once), once.clone());
    }

    /// A typed country code never defeats the match for a full-length
    /// national number.
    #[test]
    fn prop_phones_match_tolerates_country_code(digits in "[1-9][0-9]{6,11}", prefix in "[1-9][0-9]{0,2}") {
        let with_plus = format!("+{} {}", prefix, digits);
        let with_zeros = format!("00{}{}", prefix, digits);
        prop_assert!(phones_match(&with_plus, &digits));
        prop_assert!(phones_match(&digits, &with_zeros));
    }
}
