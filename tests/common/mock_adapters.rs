/*!
 * Test doubles that need more control than the library mocks
 *
 * - `CancellingSource`: triggers cancellation from inside a fetch, then hangs
 * - `RecordingAssembler`: keeps every package input instead of writing a file
 * - `FailingAssembler`: always fails to write the package
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vocadeck::enrichment::{CancelToken, Word};
use vocadeck::errors::{PackageError, SourceError};
use vocadeck::package::{PackageAssembler, PackageInput};
use vocadeck::sources::{AttributeKind, SourceAdapter};

/// Simulates the user pressing Ctrl-C while a request is in flight
#[derive(Debug)]
pub struct CancellingSource {
    attribute: AttributeKind,
    token: CancelToken,
    answer_first: usize,
    calls: AtomicUsize,
}

impl CancellingSource {
    pub fn new(attribute: AttributeKind, token: CancelToken) -> Self {
        Self::after(attribute, token, 0)
    }

    /// Answer the first `answers` fetches normally, then cancel
    pub fn after(attribute: AttributeKind, token: CancelToken, answers: usize) -> Self {
        Self {
            attribute,
            token,
            answer_first: answers,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SourceAdapter for CancellingSource {
    fn name(&self) -> &str {
        "cancelling"
    }

    fn attribute(&self) -> AttributeKind {
        self.attribute
    }

    async fn fetch(&self, word: &Word) -> Result<Option<String>, SourceError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.answer_first {
            return Ok(Some(format!("tr: {}", word)));
        }
        self.token.cancel();
        std::future::pending().await
    }
}

/// Assembler that records its inputs
#[derive(Debug, Clone)]
pub struct RecordingAssembler {
    output: PathBuf,
    exists: bool,
    inputs: Arc<Mutex<Vec<PackageInput>>>,
}

impl RecordingAssembler {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            exists: false,
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pretend a package from an earlier run is on disk
    pub fn with_existing_output(mut self) -> Self {
        self.exists = true;
        self
    }

    pub fn inputs(&self) -> Vec<PackageInput> {
        self.inputs.lock().clone()
    }
}

impl PackageAssembler for RecordingAssembler {
    fn output_path(&self) -> &Path {
        &self.output
    }

    fn output_exists(&self) -> bool {
        self.exists
    }

    fn assemble(&self, input: &PackageInput) -> Result<PathBuf, PackageError> {
        self.inputs.lock().push(input.clone());
        Ok(self.output.clone())
    }
}

/// Assembler whose write always fails
#[derive(Debug, Clone)]
pub struct FailingAssembler {
    output: PathBuf,
}

impl FailingAssembler {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self { output: output.into() }
    }
}

impl PackageAssembler for FailingAssembler {
    fn output_path(&self) -> &Path {
        &self.output
    }

    fn assemble(&self, _input: &PackageInput) -> Result<PathBuf, PackageError> {
        Err(PackageError::Write("disk full".to_string()))
    }
}
