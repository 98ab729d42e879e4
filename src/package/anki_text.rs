/*!
 * Anki-importable notes file.
 *
 * Output is a tab-separated file with Anki's header directives followed by
 * one note per line: `guid, word, translation, example, [sound:file]`. Audio
 * files are copied into a `<stem>.media` directory next to it, ready to be
 * dropped into the profile's `collection.media`.
 */

use log::{debug, info};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use super::{PackageAssembler, PackageInput};
use crate::enrichment::word::Word;
use crate::errors::PackageError;
use crate::file_utils::FileManager;

/// Bytes of the word digest used for the note GUID
const GUID_BYTES: usize = 10;

#[derive(Debug, Clone)]
pub struct AnkiTextAssembler {
    output: PathBuf,
}

impl AnkiTextAssembler {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self { output: output.into() }
    }

    /// Directory receiving the media copies
    pub fn media_dir(&self) -> PathBuf {
        let stem = self
            .output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "deck".to_string());
        self.output.with_file_name(format!("{}.media", stem))
    }

    /// Stable note id so re-imports update notes instead of duplicating them
    pub fn note_guid(word: &Word) -> String {
        let digest = Sha256::digest(word.as_str().as_bytes());
        digest[..GUID_BYTES].iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn render(input: &PackageInput) -> String {
        let mut out = String::new();
        out.push_str("#separator:tab\n");
        out.push_str("#html:true\n");
        out.push_str(&format!("#deck:{}\n", escape_field(&input.deck_name)));
        out.push_str("#guid column:1\n");

        for item in &input.items {
            let sound = item
                .audio_file
                .as_deref()
                .map(|file| format!("[sound:{}]", file))
                .unwrap_or_default();
            let fields = [
                Self::note_guid(&item.word),
                escape_field(&escape_html(item.word.as_str())),
                escape_field(&escape_html(&item.translation)),
                escape_field(&escape_html(&item.example)),
                escape_field(&sound),
            ];
            out.push_str(&fields.join("\t"));
            out.push('\n');
        }
        out
    }
}

/// Escape text for a note field; the file is imported as HTML
pub fn escape_html(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Make a value safe for a single tab-separated field
pub fn escape_field(value: &str) -> String {
    let flat = value
        .replace("\r\n", "<br>")
        .replace(['\n', '\r'], "<br>")
        .replace('\t', " ");
    if flat.contains('"') {
        format!("\"{}\"", flat.replace('"', "\"\""))
    } else {
        flat
    }
}

impl PackageAssembler for AnkiTextAssembler {
    fn output_path(&self) -> &Path {
        &self.output
    }

    fn assemble(&self, input: &PackageInput) -> Result<PathBuf, PackageError> {
        if input.is_empty() {
            return Err(PackageError::Empty);
        }

        if !input.media_files.is_empty() {
            let media_dir = self.media_dir();
            FileManager::ensure_dir(&media_dir).map_err(|e| PackageError::Write(format!("{:#}", e)))?;
            for source in &input.media_files {
                let Some(name) = source.file_name() else {
                    continue;
                };
                FileManager::copy_file(source, media_dir.join(name))
                    .map_err(|e| PackageError::Write(format!("{:#}", e)))?;
            }
            debug!("Copied {} media file(s) to {:?}", input.media_files.len(), media_dir);
        }

        FileManager::write_atomic(&self.output, Self::render(input).as_bytes())
            .map_err(|e| PackageError::Write(format!("{:#}", e)))?;

        info!("Wrote {} note(s) to {:?}", input.items.len(), self.output);
        Ok(self.output.clone())
    }
}
