/*!
 * End-to-end pipeline runs over mock sources and temporary stores.
 */

use std::sync::Arc;

use vocadeck::audio::mock::MockSynthesizer;
use vocadeck::audio::AudioCache;
use vocadeck::enrichment::{parse_input, CancelToken, PipelineState, RunOutcome, RunPlan, TRANSLATION_NOT_FOUND};
use vocadeck::errors::PipelineError;
use vocadeck::package::AnkiTextAssembler;
use vocadeck::sources::mock::MockSource;
use vocadeck::sources::{AttributeKind, SourceAdapter};
use vocadeck::store::CardStore;

use crate::common::mock_adapters::{CancellingSource, FailingAssembler, RecordingAssembler};
use crate::common::{pipeline_with, words, TestWorkspace};

fn translator() -> MockSource {
    MockSource::answering("translate", AttributeKind::Translation, "tr: ")
}

fn example_source() -> MockSource {
    MockSource::answering("examples", AttributeKind::Example, "An example with ")
}

fn adapters(source: &MockSource) -> Vec<Arc<dyn SourceAdapter>> {
    vec![Arc::new(source.clone())]
}

#[tokio::test]
async fn test_run_withDuplicateInput_shouldEnrichEachWordOnce() {
    let workspace = TestWorkspace::new();
    let translate = translator();
    let examples = example_source();
    let pipeline = pipeline_with(&workspace, adapters(&translate), adapters(&examples), MockSynthesizer::working());
    let assembler = RecordingAssembler::new(workspace.output_path());
    let mut stores = workspace.load_stores();

    let report = pipeline
        .run(parse_input("cat, dog, cat"), &mut stores, &assembler, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.new_words(), words(&["cat", "dog"]).as_slice());
    assert_eq!(translate.call_count(), 2);
    assert_eq!(report.build_set, words(&["cat", "dog"]));

    let cards = CardStore::load(workspace.cards_path());
    let cat = cards.get(&words(&["cat"])[0]).unwrap();
    assert_eq!(cat.translation, "tr: cat");
    assert_eq!(cat.example, "An example with cat");
    assert_eq!(cat.audio_file, "cat.mp3");
    assert!(report.states.contains(PipelineState::Persisted));
    assert_eq!(report.states.current(), PipelineState::Done);
}

#[tokio::test]
async fn test_run_twiceWithSameInput_shouldNotFetchAgain() {
    let workspace = TestWorkspace::new();
    let translate = translator();
    let examples = example_source();
    let synth = MockSynthesizer::working();
    let pipeline = pipeline_with(&workspace, adapters(&translate), adapters(&examples), synth.clone());
    let assembler = RecordingAssembler::new(workspace.output_path());

    let mut stores = workspace.load_stores();
    let first = pipeline
        .run(parse_input("cat\ndog"), &mut stores, &assembler, &CancelToken::new())
        .await
        .unwrap();
    let cards_after_first = CardStore::load(workspace.cards_path());
    let calls_after_first = (translate.call_count(), examples.call_count(), synth.call_count());

    let mut stores = workspace.load_stores();
    let second = pipeline
        .run(parse_input("cat\ndog"), &mut stores, &assembler, &CancelToken::new())
        .await
        .unwrap();

    assert!(second.new_words().is_empty());
    assert_eq!(second.build_set, first.build_set);
    assert_eq!(CardStore::load(workspace.cards_path()), cards_after_first);
    assert_eq!((translate.call_count(), examples.call_count(), synth.call_count()), calls_after_first);

    let inputs = assembler.inputs();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0], inputs[1]);
}

#[tokio::test]
async fn test_run_withStoredWordWithoutCard_shouldResolveLazily() {
    let workspace = TestWorkspace::new();
    workspace.write("words_db.json", r#"["cat"]"#);
    let translate = translator();
    let pipeline = pipeline_with(&workspace, adapters(&translate), adapters(&example_source()), MockSynthesizer::working());
    let assembler = RecordingAssembler::new(workspace.output_path());
    let mut stores = workspace.load_stores();

    let report = pipeline
        .run(parse_input(""), &mut stores, &assembler, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.plan, RunPlan::Rebuild);
    assert_eq!(report.lazily_resolved, words(&["cat"]));
    assert_eq!(report.build_set, words(&["cat"]));
    assert_eq!(translate.seen_words(), vec!["cat".to_string()]);
    assert!(CardStore::load(workspace.cards_path()).contains(&words(&["cat"])[0]));
    assert_eq!(assembler.inputs()[0].items.len(), 1);
}

#[tokio::test]
async fn test_run_withAllExampleSourcesFailing_shouldUseTemplate() {
    let workspace = TestWorkspace::new();
    let examples: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(MockSource::failing("dictionaryapi", AttributeKind::Example)),
        Arc::new(MockSource::empty("tatoeba", AttributeKind::Example)),
        Arc::new(MockSource::panicking("reverso", AttributeKind::Example)),
    ];
    let pipeline = pipeline_with(&workspace, adapters(&translator()), examples, MockSynthesizer::working());
    let assembler = RecordingAssembler::new(workspace.output_path());
    let mut stores = workspace.load_stores();

    let report = pipeline
        .run(parse_input("xylophone"), &mut stores, &assembler, &CancelToken::new())
        .await
        .unwrap();

    let card = stores.cards.get(&words(&["xylophone"])[0]).unwrap().clone();
    assert!(card.example.contains("xylophone"));
    assert_eq!(card.translation, "tr: xylophone");
    assert_eq!(report.fallbacks.len(), 1);
    assert_eq!(report.fallbacks[0].kind, AttributeKind::Example);
}

#[tokio::test]
async fn test_run_withNoTranslationSource_shouldStoreNotFoundMarker() {
    let workspace = TestWorkspace::new();
    let translators: Vec<Arc<dyn SourceAdapter>> =
        vec![Arc::new(MockSource::failing("translate", AttributeKind::Translation))];
    let pipeline = pipeline_with(&workspace, translators, adapters(&example_source()), MockSynthesizer::working());
    let assembler = RecordingAssembler::new(workspace.output_path());
    let mut stores = workspace.load_stores();

    pipeline
        .run(parse_input("quokka"), &mut stores, &assembler, &CancelToken::new())
        .await
        .unwrap();

    let cards = CardStore::load(workspace.cards_path());
    assert_eq!(cards.get(&words(&["quokka"])[0]).unwrap().translation, TRANSLATION_NOT_FOUND);
}

#[tokio::test]
async fn test_run_cancelledDuringTranslation_shouldLeaveStoresUntouched() {
    let workspace = TestWorkspace::new();
    let words_file = workspace.write("words_db.json", "[\n  \"owl\"\n]");
    let before = workspace.read(&words_file);

    let cancel = CancelToken::new();
    let translators: Vec<Arc<dyn SourceAdapter>> =
        vec![Arc::new(CancellingSource::new(AttributeKind::Translation, cancel.clone()))];
    let examples = example_source();
    let pipeline = pipeline_with(&workspace, translators, adapters(&examples), MockSynthesizer::working());
    let assembler = RecordingAssembler::new(workspace.output_path());
    let mut stores = workspace.load_stores();

    let result = pipeline.run(parse_input("cat, dog"), &mut stores, &assembler, &cancel).await;

    match result {
        Err(PipelineError::Cancelled { stage }) => assert_eq!(stage, "Translations"),
        other => panic!("expected cancellation, got {:?}", other),
    }
    assert_eq!(workspace.read(&words_file), before);
    assert!(!workspace.cards_path().exists());
    assert_eq!(examples.call_count(), 0);
    assert!(assembler.inputs().is_empty());
}

#[tokio::test]
async fn test_run_withExistingPackageAndNoNewWords_shouldRefresh() {
    let workspace = TestWorkspace::new();
    let translate = translator();
    let pipeline = pipeline_with(&workspace, adapters(&translate), adapters(&example_source()), MockSynthesizer::working());

    let mut stores = workspace.load_stores();
    pipeline
        .run(parse_input("cat"), &mut stores, &RecordingAssembler::new(workspace.output_path()), &CancelToken::new())
        .await
        .unwrap();

    let assembler = RecordingAssembler::new(workspace.output_path()).with_existing_output();
    let mut stores = workspace.load_stores();
    let report = pipeline
        .run(parse_input("CAT"), &mut stores, &assembler, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.plan, RunPlan::Refresh);
    assert_eq!(translate.call_count(), 1);
    assert_eq!(assembler.inputs().len(), 1);
    assert!(!report.states.contains(PipelineState::FetchTranslations));
}

#[tokio::test]
async fn test_run_withCachedAudio_shouldSkipSynthesis() {
    let workspace = TestWorkspace::new();
    let cache = AudioCache::new(workspace.audio_dir());
    cache.store(&words(&["cat"])[0], b"ID3 cached").unwrap();
    let synth = MockSynthesizer::working();
    let pipeline = pipeline_with(&workspace, adapters(&translator()), adapters(&example_source()), synth.clone());
    let assembler = RecordingAssembler::new(workspace.output_path());
    let mut stores = workspace.load_stores();

    pipeline
        .run(parse_input("cat"), &mut stores, &assembler, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(synth.call_count(), 0);
    let input = &assembler.inputs()[0];
    assert_eq!(input.items[0].audio_file.as_deref(), Some("cat.mp3"));
    assert_eq!(input.media_files, vec![workspace.audio_dir().join("cat.mp3")]);
}

#[tokio::test]
async fn test_run_withFailingSynthesizer_shouldShipNoMedia() {
    let workspace = TestWorkspace::new();
    let pipeline = pipeline_with(&workspace, adapters(&translator()), adapters(&example_source()), MockSynthesizer::failing());
    let assembler = RecordingAssembler::new(workspace.output_path());
    let mut stores = workspace.load_stores();

    let report = pipeline
        .run(parse_input("owl"), &mut stores, &assembler, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.audio_failures, 1);
    assert_eq!(stores.cards.get(&words(&["owl"])[0]).unwrap().audio_file, "owl.mp3");
    let input = &assembler.inputs()[0];
    assert!(input.media_files.is_empty());
    assert_eq!(input.items[0].audio_file, None);
}

#[tokio::test]
async fn test_run_afterFailedSynthesis_shouldRetryAudioOnNextRun() {
    let workspace = TestWorkspace::new();
    let owl = words(&["owl"])[0].clone();

    let failing = pipeline_with(&workspace, adapters(&translator()), adapters(&example_source()), MockSynthesizer::failing());
    let mut stores = workspace.load_stores();
    failing
        .run(parse_input("owl"), &mut stores, &RecordingAssembler::new(workspace.output_path()), &CancelToken::new())
        .await
        .unwrap();
    assert!(!AudioCache::new(workspace.audio_dir()).contains(&owl));

    let synth = MockSynthesizer::working();
    let translate = translator();
    let working = pipeline_with(&workspace, adapters(&translate), adapters(&example_source()), synth.clone());
    let assembler = RecordingAssembler::new(workspace.output_path());
    let mut stores = workspace.load_stores();
    let report = working
        .run(parse_input("owl"), &mut stores, &assembler, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(synth.call_count(), 1);
    assert_eq!(translate.call_count(), 0);
    assert_eq!(report.audio_backfilled, vec![owl.clone()]);
    assert_eq!(report.audio_failures, 0);
    assert!(AudioCache::new(workspace.audio_dir()).contains(&owl));
    assert_eq!(CardStore::load(workspace.cards_path()).get(&owl).unwrap().audio_file, "owl.mp3");
    let input = &assembler.inputs()[0];
    assert_eq!(input.items[0].audio_file.as_deref(), Some("owl.mp3"));
    assert_eq!(input.media_files, vec![workspace.audio_dir().join("owl.mp3")]);
}

#[tokio::test]
async fn test_run_withFailingAssembler_shouldKeepSavedStores() {
    let workspace = TestWorkspace::new();
    let pipeline = pipeline_with(&workspace, adapters(&translator()), adapters(&example_source()), MockSynthesizer::working());
    let assembler = FailingAssembler::new(workspace.output_path());
    let mut stores = workspace.load_stores();

    let result = pipeline
        .run(parse_input("cat, dog"), &mut stores, &assembler, &CancelToken::new())
        .await;

    assert!(matches!(result, Err(PipelineError::Package(_))));
    let reloaded = workspace.load_stores();
    assert_eq!(reloaded.words.sorted(), words(&["cat", "dog"]));
    assert_eq!(reloaded.cards.get(&words(&["dog"])[0]).unwrap().translation, "tr: dog");
    assert!(!workspace.output_path().exists());
}

#[tokio::test]
async fn test_run_cancelledDuringLazyResolution_shouldSaveResolvedCards() {
    let workspace = TestWorkspace::new();
    let words_file = workspace.write("words_db.json", r#"["cat", "dog"]"#);
    let before = workspace.read(&words_file);

    let cancel = CancelToken::new();
    let translators: Vec<Arc<dyn SourceAdapter>> =
        vec![Arc::new(CancellingSource::after(AttributeKind::Translation, cancel.clone(), 1))];
    let pipeline = pipeline_with(&workspace, translators, adapters(&example_source()), MockSynthesizer::working());
    let assembler = RecordingAssembler::new(workspace.output_path());
    let mut stores = workspace.load_stores();

    let report = pipeline
        .run(parse_input(""), &mut stores, &assembler, &cancel)
        .await
        .unwrap();

    assert_eq!(report.plan, RunPlan::Rebuild);
    assert_eq!(report.outcome, RunOutcome::InterruptedAfterPersist);
    assert_eq!(report.lazily_resolved, words(&["cat"]));
    assert!(!report.states.contains(PipelineState::Assembling));
    assert!(assembler.inputs().is_empty());

    let cards = CardStore::load(workspace.cards_path());
    assert_eq!(cards.get(&words(&["cat"])[0]).unwrap().translation, "tr: cat");
    assert!(!cards.contains(&words(&["dog"])[0]));
    assert_eq!(workspace.read(&words_file), before);
}

#[tokio::test]
async fn test_run_withEmptyStoresAndNoInput_shouldPackageNothing() {
    let workspace = TestWorkspace::new();
    let pipeline = pipeline_with(&workspace, adapters(&translator()), adapters(&example_source()), MockSynthesizer::working());
    let assembler = RecordingAssembler::new(workspace.output_path());
    let mut stores = workspace.load_stores();

    let report = pipeline
        .run(parse_input(" ,\n; "), &mut stores, &assembler, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.plan, RunPlan::Rebuild);
    assert_eq!(report.outcome, RunOutcome::NothingToPackage);
    assert!(assembler.inputs().is_empty());
}

#[tokio::test]
async fn test_run_withAnkiAssembler_shouldWriteSortedNotes() {
    let workspace = TestWorkspace::new();
    let pipeline = pipeline_with(&workspace, adapters(&translator()), adapters(&example_source()), MockSynthesizer::working());
    let assembler = AnkiTextAssembler::new(workspace.output_path());
    let mut stores = workspace.load_stores();

    let report = pipeline
        .run(parse_input("zebra; apple"), &mut stores, &assembler, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.package_path(), Some(&workspace.output_path()));
    let text = std::fs::read_to_string(workspace.output_path()).unwrap();
    let notes: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(notes.len(), 2);
    assert!(notes[0].contains("\tapple\ttr: apple\t"));
    assert!(notes[1].contains("[sound:zebra.mp3]"));
    assert!(workspace.dir.path().join("deck.media").join("zebra.mp3").exists());
}
