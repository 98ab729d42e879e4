/*!
 * Tests for language utility functions
 */

use vocadeck::language_utils::{get_language_name, language_codes_match, normalize_to_part1, normalize_to_part3};

#[test]
fn test_normalize_to_part3_withValidCodes_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part3("en").unwrap(), "eng");
    assert_eq!(normalize_to_part3("ru").unwrap(), "rus");
    assert_eq!(normalize_to_part3("DE").unwrap(), "deu");
    assert!(normalize_to_part3("zz").is_err());
}

#[test]
fn test_normalize_to_part1_withThreeLetterCodes_shouldShorten() {
    assert_eq!(normalize_to_part1("fra").unwrap(), "fr");
    assert_eq!(normalize_to_part1("ger").unwrap(), "de");
}

#[test]
fn test_get_language_name_shouldReturnEnglishName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("rus").unwrap(), "Russian");
}

#[test]
fn test_language_codes_match_withDifferentLanguages_shouldNotMatch() {
    assert!(language_codes_match("en", "eng"));
    assert!(!language_codes_match("en", "ru"));
}
