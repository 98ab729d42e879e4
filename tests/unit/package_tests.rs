/*!
 * Tests for package input building and the Anki text assembler
 */

use vocadeck::audio::AudioCache;
use vocadeck::package::{AnkiTextAssembler, PackageAssembler, PackageInput};
use vocadeck::store::{CardEntry, CardStore};

use crate::common::{words, TestWorkspace};

#[test]
fn test_from_stores_shouldFollowBuildSetOrder() {
    let workspace = TestWorkspace::new();
    let mut cards = CardStore::new();
    for word in words(&["owl", "ant", "emu"]) {
        cards.upsert(
            word.clone(),
            CardEntry {
                translation: format!("tr-{}", word),
                example: String::new(),
                audio_file: String::new(),
            },
        );
    }
    let build_set = words(&["ant", "emu", "owl"]);

    let input = PackageInput::from_stores("Deck", &build_set, &cards, &AudioCache::new(workspace.audio_dir()));

    let order: Vec<&str> = input.items.iter().map(|i| i.word.as_str()).collect();
    assert_eq!(order, vec!["ant", "emu", "owl"]);
    assert!(input.media_files.is_empty());
}

#[test]
fn test_anki_assembler_withMultilineExample_shouldKeepOneNotePerLine() {
    let workspace = TestWorkspace::new();
    let cache = AudioCache::new(workspace.audio_dir());
    let cat = words(&["cat"])[0].clone();
    cache.store(&cat, b"ID3").unwrap();

    let mut cards = CardStore::new();
    cards.upsert(
        cat.clone(),
        CardEntry {
            translation: "кошка".to_string(),
            example: "The cat\tsat.\nIt purred.".to_string(),
            audio_file: "cat.mp3".to_string(),
        },
    );
    let input = PackageInput::from_stores("My \"Deck\"", &[cat], &cards, &cache);
    let assembler = AnkiTextAssembler::new(workspace.output_path());

    let path = assembler.assemble(&input).unwrap();
    let text = std::fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[2], "#deck:\"My \"\"Deck\"\"\"");
    assert!(lines[4].contains("\tThe cat sat.<br>It purred.\t[sound:cat.mp3]"));
    assert!(assembler.media_dir().join("cat.mp3").exists());
}
