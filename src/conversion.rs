//! Conversion context shared by codecs, catalog operations and the CLI.
//!
//! The context owns an append-only error list. Recoverable problems (a
//! contradicting `extend`, a plural truncation) are recorded here and the
//! operation carries on with the remaining messages.

use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct ConversionContext {
    /// Name of the file being loaded, for diagnostics
    pub source_file_name: String,
    /// Name of the file being written, for diagnostics
    pub target_file_name: String,
    /// Directory of the loaded file
    pub source_dir: PathBuf,
    /// Directory of the written file
    pub target_dir: PathBuf,
    verbose: bool,
    errors: Vec<String>,
}

impl ConversionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn append_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// All errors joined as one newline-terminated block, or an empty string.
    pub fn error(&self) -> String {
        if self.errors.is_empty() {
            String::new()
        } else {
            let mut text = self.errors.join("\n");
            text.push('\n');
            text
        }
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }
}
