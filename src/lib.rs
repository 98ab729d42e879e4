/*!
 * # vocadeck - vocabulary flashcards from a list of words
 *
 * A Rust library that turns a batch of raw vocabulary into study cards.
 *
 * ## Features
 *
 * - Parse and normalize raw word lists (comma, semicolon, tab or newline separated)
 * - Resolve each word's attributes from external sources:
 *   - Translation via Google Translate
 *   - Example sentences via dictionaryapi.dev, Tatoeba and Reverso Context, in priority order
 *   - Pronunciation audio via text-to-speech, cached on disk
 * - Deterministic fallbacks when every source fails, so no card is ever blank
 * - Bounded concurrent fetch stages with cooperative cancellation
 * - Persistent word and card stores; only new words are ever fetched
 * - Anki-importable package output
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `enrichment`: Word identity, attribute resolution and the run pipeline:
 *   - `enrichment::resolver`: Cascading multi-source resolution
 *   - `enrichment::stage`: Bounded concurrent fetch stages
 *   - `enrichment::pipeline`: Run orchestration
 * - `sources`: Adapters for the external data sources
 * - `audio`: Audio cache and speech synthesis
 * - `store`: Word and card stores
 * - `package`: Flashcard package assembly
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod audio;
pub mod enrichment;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod package;
pub mod sources;
pub mod store;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use enrichment::{CancelToken, EnrichmentPipeline, RunOutcome, RunPlan, RunReport, Word};
pub use errors::{AppError, PackageError, PipelineError, SourceError, StoreError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part1};
