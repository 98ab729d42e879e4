/*!
 * Vocabulary enrichment.
 *
 * - `word`: normalization and input parsing
 * - `resolver`: cascading multi-source attribute resolution
 * - `stage`: bounded concurrent fetch stages
 * - `pipeline`: run orchestration from raw batch to package
 * - `cancel`: cooperative interruption
 * - `progress`: stage progress reporting seam
 */

pub mod cancel;
pub mod pipeline;
pub mod progress;
pub mod resolver;
pub mod stage;
pub mod word;

pub use cancel::CancelToken;
pub use pipeline::{
    compute_new_words, EnrichmentPipeline, FallbackUse, PipelineState, RunOutcome, RunPlan, RunReport,
};
pub use progress::{ProgressReporter, SilentProgress};
pub use resolver::{AttributeResolver, Resolution, TRANSLATION_NOT_FOUND};
pub use stage::Stage;
pub use word::{parse_input, Word};
