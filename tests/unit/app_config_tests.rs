/*!
 * Tests for application configuration functionality
 */

use vocadeck::app_config::{Config, ExampleSourceKind, LogLevel};

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "ru");
    assert_eq!(config.storage.words_db.to_str(), Some("words_db.json"));
    assert_eq!(config.storage.cards_db.to_str(), Some("cards_db.json"));
    assert_eq!(config.storage.output.to_str(), Some("english_words.txt"));
    assert_eq!(config.storage.deck_name, "English Vocabulary");

    assert_eq!(config.sources.timeout_secs, 10);
    assert_eq!(config.sources.retry_count, 3);
    assert_eq!(
        config.sources.example_sources,
        vec![ExampleSourceKind::DictionaryApi, ExampleSourceKind::Tatoeba, ExampleSourceKind::Reverso]
    );

    assert_eq!(config.concurrency.translation, 8);
    assert_eq!(config.concurrency.example, 8);
    assert_eq!(config.concurrency.audio, 6);
    assert!(config.audio.enabled);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.source_language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();

    config.target_language = "".to_string();
    assert!(config.validate().is_err());
    config.target_language = "de".to_string();
    assert!(config.validate().is_ok());

    config.concurrency.example = 0;
    assert!(config.validate().is_err());
    config.concurrency.example = 2;

    config.audio.language = Some("en-gb".to_string());
    assert!(config.validate().is_ok());

    config.sources.timeout_secs = 0;
    assert!(config.validate().is_err());
}

/// A missing config file is created with defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config.target_language, "ru");
    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.storage.deck_name, config.storage.deck_name);
}

#[test]
fn test_load_or_create_withCustomSources_shouldKeepOrder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(
        &path,
        r#"{"target_language": "fr", "sources": {"example_sources": ["reverso", "tatoeba"]}, "log_level": "debug"}"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.target_language, "fr");
    assert_eq!(config.sources.example_sources, vec![ExampleSourceKind::Reverso, ExampleSourceKind::Tatoeba]);
    assert_eq!(config.sources.retry_count, 3);
    assert_eq!(config.log_level, LogLevel::Debug);
}

#[test]
fn test_load_or_create_withBrokenJson_shouldFail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}
