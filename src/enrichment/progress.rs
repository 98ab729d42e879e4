use super::stage::Stage;

/// Receives stage progress; the terminal display lives behind this seam
pub trait ProgressReporter: Send + Sync {
    fn stage_started(&self, stage: Stage, total: usize);

    fn word_completed(&self, stage: Stage, done: usize, total: usize);

    fn stage_finished(&self, stage: Stage);
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage_started(&self, _stage: Stage, _total: usize) {}

    fn word_completed(&self, _stage: Stage, _done: usize, _total: usize) {}

    fn stage_finished(&self, _stage: Stage) {}
}
