/*!
 * Tests for the word and card stores
 */

use tokio_test::{assert_err, assert_ok};
use vocadeck::store::{CardEntry, CardStore, Stores, WordStore};

use crate::common::{words, TestWorkspace};

fn card(translation: &str) -> CardEntry {
    CardEntry {
        translation: translation.to_string(),
        example: format!("{} example", translation),
        audio_file: String::new(),
    }
}

/// Missing files give empty stores
#[test]
fn test_stores_load_withMissingFiles_shouldStartEmpty() {
    let workspace = TestWorkspace::new();
    let stores = workspace.load_stores();

    assert!(stores.words.is_empty());
    assert!(stores.cards.is_empty());
}

#[test]
fn test_stores_save_all_thenLoad_shouldRoundTripBothFiles() {
    let workspace = TestWorkspace::new();
    let mut stores = workspace.load_stores();
    for word in words(&["owl", "cat"]) {
        stores.cards.upsert(word.clone(), card(&format!("tr-{}", word)));
        stores.words.insert(word);
    }

    assert_ok!(stores.save_all());
    let reloaded = Stores::load(workspace.words_path(), workspace.cards_path());

    assert_eq!(reloaded.words.sorted(), words(&["cat", "owl"]));
    assert_eq!(reloaded.cards, stores.cards);
}

#[test]
fn test_word_store_save_shouldLeaveNoTempFiles() {
    let workspace = TestWorkspace::new();
    let store: WordStore = words(&["emu", "ant"]).into_iter().collect();

    assert_ok!(store.save(workspace.words_path()));

    let names: Vec<String> = std::fs::read_dir(workspace.dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["words_db.json".to_string()]);
    let saved: Vec<String> = serde_json::from_str(&std::fs::read_to_string(workspace.words_path()).unwrap()).unwrap();
    assert_eq!(saved, vec!["ant", "emu"]);
}

/// Keys written by older tools with odd casing are folded on load
#[test]
fn test_card_store_load_withUnnormalizedKeys_shouldFoldThem() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "cards_db.json",
        r#"{"  Ice   Cream ": {"translation": "мороженое", "example": "I like ice cream."}, "bad": 42}"#,
    );

    let cards = CardStore::load(&path);

    assert_eq!(cards.len(), 1);
    let entry = cards.get(&words(&["ice cream"])[0]).unwrap();
    assert_eq!(entry.translation, "мороженое");
    assert_eq!(entry.audio_file, "");
}

#[test]
fn test_card_store_save_withUnwritableLocation_shouldReturnError() {
    let workspace = TestWorkspace::new();
    let blocker = workspace.write("blocker", "file, not a directory");
    let mut cards = CardStore::new();
    cards.upsert(words(&["cat"])[0].clone(), card("кошка"));

    assert_err!(cards.save(blocker.join("cards_db.json")));
}
