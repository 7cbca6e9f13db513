//! Bulk rewrites of a catalog: filters, translation resets and plural
//! normalisation. Each filter is one `retain` pass followed by a single index
//! invalidation.

use std::collections::HashSet;
use std::path::Path;

use super::Catalog;
use crate::conversion::ConversionContext;
use crate::message::{Message, MessageType, Reference};
use crate::plurals;

/// Source text codecs use for placeholder records of otherwise empty contexts
pub const CONTEXT_COMMENT_MARKER: &str = "CATALOG_INTERNAL_CONTEXT_COMMENT";

const TRUNCATION_WARNING: &str = "Removed plural forms as the target language has less forms.\n\
     If this sounds wrong, possibly the target language is not set or recognized.";

impl Catalog {
    fn retain_messages(&mut self, keep: impl FnMut(&Message) -> bool) {
        self.messages.retain(keep);
        self.invalidate_index();
    }

    /// Drops vanished and obsolete messages.
    pub fn strip_obsolete_messages(&mut self) {
        self.retain_messages(|m| !m.message_type().is_obsolete());
    }

    pub fn strip_finished_messages(&mut self) {
        self.retain_messages(|m| m.message_type() != MessageType::Finished);
    }

    pub fn strip_untranslated_messages(&mut self) {
        self.retain_messages(Message::is_translated);
    }

    pub fn strip_empty_contexts(&mut self) {
        self.retain_messages(|m| m.source_text() != CONTEXT_COMMENT_MARKER);
    }

    pub fn strip_non_plural_forms(&mut self) {
        self.retain_messages(Message::is_plural);
    }

    /// Drops messages whose single translation repeats the source text.
    pub fn strip_identical_source_translations(&mut self) {
        self.retain_messages(|m| {
            !(m.translations().len() == 1 && m.translation() == m.source_text())
        });
    }

    pub fn translations_exist(&self) -> bool {
        self.messages.iter().any(Message::is_translated)
    }

    /// Clears every translation; finished messages become unfinished.
    pub fn drop_translations(&mut self) {
        for msg in &mut self.messages {
            if msg.message_type() == MessageType::Finished {
                msg.set_type(MessageType::Unfinished);
            }
            msg.set_translation("");
        }
    }

    /// Collapses references into `.ui`/`.jui` forms to one line-less
    /// reference per file.
    pub fn drop_ui_lines(&mut self) {
        for msg in &mut self.messages {
            let mut seen = HashSet::new();
            let mut refs = Vec::with_capacity(msg.references().len());
            for r in msg.references() {
                let name = &r.file_name;
                if name.ends_with(".ui") || name.ends_with(".jui") {
                    if seen.insert(name.clone()) {
                        refs.push(Reference::new(name.clone(), None));
                    }
                } else {
                    refs.push(r.clone());
                }
            }
            msg.set_references(refs);
        }
    }

    /// Resolves relative reference paths against `base`.
    pub fn make_file_names_absolute(&mut self, base: &Path) {
        for msg in &mut self.messages {
            let refs = msg
                .references()
                .iter()
                .map(|r| {
                    let path = Path::new(&r.file_name);
                    let file_name = if path.is_relative() {
                        base.join(path).to_string_lossy().into_owned()
                    } else {
                        r.file_name.clone()
                    };
                    Reference::new(file_name, r.line_number)
                })
                .collect();
            msg.set_references(refs);
        }
    }

    /// The translations of `msg` padded or truncated to one entry, or to
    /// `plural_forms` entries for a plural message.
    pub fn normalized_translations(msg: &Message, plural_forms: usize) -> Vec<String> {
        let count = if msg.is_plural() { plural_forms } else { 1 };
        let mut translations = msg.translations().to_vec();
        translations.resize(count, String::new());
        translations
    }

    /// Gives every message the translation count its plurality requires.
    ///
    /// Padding is silent. If truncation threw away non-empty text, one
    /// warning is appended to `cd`.
    pub fn normalize_translations(&mut self, plural_forms: usize, cd: &mut ConversionContext) {
        let mut truncated = false;
        for msg in &mut self.messages {
            let count = if msg.is_plural() { plural_forms } else { 1 };
            if msg.translations().len() == count {
                continue;
            }
            if msg.translations()[count.min(msg.translations().len())..]
                .iter()
                .any(|t| !t.is_empty())
            {
                truncated = true;
            }
            let normalized = Self::normalized_translations(msg, plural_forms);
            msg.set_translations(normalized);
        }
        if truncated {
            tracing::warn!(plural_forms, "truncated plural translations");
            cd.append_error(TRUNCATION_WARNING);
        }
    }

    /// [`Catalog::normalize_translations`] with the plural-form count of the
    /// catalog's own language.
    ///
    /// A language without usable plural rules is treated as having a single
    /// form; the problem is appended to `cd`.
    pub fn normalize_translations_for_language(&mut self, cd: &mut ConversionContext) {
        let forms = match plurals::plural_form_count(&self.language_code) {
            Ok(forms) => forms,
            Err(e) => {
                tracing::warn!(language = %self.language_code, "{}", e);
                cd.append_error(format!(
                    "Unrecognized language '{}' ({}), assuming a single plural form.",
                    self.language_code, e
                ));
                1
            }
        };
        self.normalize_translations(forms, cd);
    }
}
