/*!
 * Bounded concurrent execution of one fetch stage.
 *
 * Every word is one unit of work. Up to `workers` units run at once; results
 * arrive in completion order but are collected into a map keyed by word, so
 * the merged outcome does not depend on scheduling.
 */

use futures::stream::{self, StreamExt};
use log::info;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Instant;

use super::cancel::CancelToken;
use super::progress::ProgressReporter;
use super::word::Word;
use crate::errors::PipelineError;

/// One attribute-resolving phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Translations,
    Examples,
    Audio,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Translations => "Translations",
            Self::Examples => "Examples",
            Self::Audio => "Audio",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Run `work` for every word with at most `workers` in flight
///
/// Returns only when every word has a result. On cancellation no further work
/// is started, in-flight work is dropped and `PipelineError::Cancelled` is
/// returned.
pub async fn run_stage<T, F, Fut>(
    stage: Stage,
    words: &[Word],
    workers: usize,
    cancel: &CancelToken,
    progress: &dyn ProgressReporter,
    work: F,
) -> Result<BTreeMap<Word, T>, PipelineError>
where
    F: Fn(Word) -> Fut,
    Fut: Future<Output = T>,
{
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled { stage: stage.to_string() });
    }

    let total = words.len();
    let start_time = Instant::now();
    progress.stage_started(stage, total);

    let mut pending = stream::iter(words.iter().cloned())
        .map(|word| {
            let unit = work(word.clone());
            async move { (word, unit.await) }
        })
        .buffer_unordered(workers.max(1));

    let mut results = BTreeMap::new();
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                progress.stage_finished(stage);
                return Err(PipelineError::Cancelled { stage: stage.to_string() });
            }
            next = pending.next() => match next {
                Some((word, value)) => {
                    results.insert(word, value);
                    progress.word_completed(stage, results.len(), total);
                }
                None => break,
            },
        }
    }

    progress.stage_finished(stage);
    info!("{} stage resolved {} word(s) in {:?}", stage, results.len(), start_time.elapsed());
    Ok(results)
}
