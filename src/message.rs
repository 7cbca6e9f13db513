//! The translatable unit stored in a [`crate::Catalog`].
//!
//! A [`Message`] is a passive record. Lifecycle transitions between the
//! [`MessageType`] states are decided by the merge engine, never here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Format-specific metadata carried through merges untouched.
///
/// Keys are prefixed with the owning format, e.g. `po-flags`, `po-msgid_plural`.
pub type ExtraData = BTreeMap<String, String>;

/// Lifecycle state of a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Needs translation or review
    #[default]
    Unfinished,
    /// Translated and approved
    Finished,
    /// Source text gone; the message had been finished
    Vanished,
    /// Source text gone; the message had never been finished
    Obsolete,
}

impl MessageType {
    /// True for the two states describing messages no longer present in source.
    pub fn is_obsolete(self) -> bool {
        matches!(self, MessageType::Vanished | MessageType::Obsolete)
    }
}

/// One occurrence of a message in program source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "file")]
    pub file_name: String,
    #[serde(rename = "line", default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
}

impl Reference {
    pub fn new(file_name: impl Into<String>, line_number: Option<u32>) -> Self {
        Self {
            file_name: file_name.into(),
            line_number,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Message {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    context: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    source_text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    old_source_text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    comment: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    old_comment: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    extra_comment: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    translator_comment: String,
    #[serde(default)]
    translations: Vec<String>,
    #[serde(rename = "type", default)]
    message_type: MessageType,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    plural: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    extras: ExtraData,
    /// Line of this record in the persisted catalog, for duplicate reports only
    #[serde(skip)]
    ts_line_number: Option<usize>,
}

impl Message {
    pub fn new(
        context: impl Into<String>,
        source_text: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            source_text: source_text.into(),
            comment: comment.into(),
            ..Default::default()
        }
    }

    /// A record carrying only a context-level comment.
    pub fn context_comment(context: impl Into<String>, comment: impl Into<String>) -> Self {
        Self::new(context, "", comment)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_translations(mut self, translations: Vec<String>) -> Self {
        self.translations = translations;
        self
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.set_translation(translation);
        self
    }

    pub fn with_type(mut self, message_type: MessageType) -> Self {
        self.message_type = message_type;
        self
    }

    pub fn with_plural(mut self, plural: bool) -> Self {
        self.plural = plural;
        self
    }

    pub fn with_reference(
        mut self,
        file_name: impl Into<String>,
        line_number: Option<u32>,
    ) -> Self {
        self.add_reference(file_name, line_number);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_extra(key, value);
        self
    }

    pub fn with_extra_comment(mut self, extra_comment: impl Into<String>) -> Self {
        self.extra_comment = extra_comment.into();
        self
    }

    pub fn with_ts_line_number(mut self, line: usize) -> Self {
        self.ts_line_number = Some(line);
        self
    }

    /// Empty source text and empty id: the record only annotates its context.
    pub fn is_context_comment(&self) -> bool {
        self.source_text.is_empty() && self.id.is_empty()
    }

    /// True if at least one translation variant is non-empty.
    pub fn is_translated(&self) -> bool {
        self.translations.iter().any(|t| !t.is_empty())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn set_context(&mut self, context: impl Into<String>) {
        self.context = context.into();
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn set_source_text(&mut self, source_text: impl Into<String>) {
        self.source_text = source_text.into();
    }

    pub fn old_source_text(&self) -> &str {
        &self.old_source_text
    }

    pub fn set_old_source_text(&mut self, old_source_text: impl Into<String>) {
        self.old_source_text = old_source_text.into();
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    pub fn old_comment(&self) -> &str {
        &self.old_comment
    }

    pub fn set_old_comment(&mut self, old_comment: impl Into<String>) {
        self.old_comment = old_comment.into();
    }

    pub fn extra_comment(&self) -> &str {
        &self.extra_comment
    }

    pub fn set_extra_comment(&mut self, extra_comment: impl Into<String>) {
        self.extra_comment = extra_comment.into();
    }

    pub fn translator_comment(&self) -> &str {
        &self.translator_comment
    }

    pub fn set_translator_comment(&mut self, translator_comment: impl Into<String>) {
        self.translator_comment = translator_comment.into();
    }

    pub fn translations(&self) -> &[String] {
        &self.translations
    }

    pub fn set_translations(&mut self, translations: Vec<String>) {
        self.translations = translations;
    }

    /// The first translation variant, or an empty string.
    pub fn translation(&self) -> &str {
        self.translations.first().map(String::as_str).unwrap_or("")
    }

    /// Replaces all variants with a single translation.
    pub fn set_translation(&mut self, translation: impl Into<String>) {
        self.translations = vec![translation.into()];
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn set_type(&mut self, message_type: MessageType) {
        self.message_type = message_type;
    }

    pub fn is_plural(&self) -> bool {
        self.plural
    }

    pub fn set_plural(&mut self, plural: bool) {
        self.plural = plural;
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn set_references(&mut self, references: Vec<Reference>) {
        self.references = references;
    }

    pub fn clear_references(&mut self) {
        self.references.clear();
    }

    pub fn add_reference(&mut self, file_name: impl Into<String>, line_number: Option<u32>) {
        self.references.push(Reference::new(file_name, line_number));
    }

    /// Adds the reference unless the exact same location is already listed.
    pub fn add_reference_uniq(&mut self, file_name: &str, line_number: Option<u32>) {
        let exists = self
            .references
            .iter()
            .any(|r| r.file_name == file_name && r.line_number == line_number);
        if !exists {
            self.add_reference(file_name, line_number);
        }
    }

    /// File of the first reference, or an empty string.
    pub fn file_name(&self) -> &str {
        self.references
            .first()
            .map(|r| r.file_name.as_str())
            .unwrap_or("")
    }

    /// Line of the first reference, if known.
    pub fn line_number(&self) -> Option<u32> {
        self.references.first().and_then(|r| r.line_number)
    }

    pub fn extras(&self) -> &ExtraData {
        &self.extras
    }

    pub fn set_extras(&mut self, extras: ExtraData) {
        self.extras = extras;
    }

    /// Value of a format-specific key, or an empty string.
    pub fn extra(&self, key: &str) -> &str {
        self.extras.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn has_extra(&self, key: &str) -> bool {
        self.extras.contains_key(key)
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extras.insert(key.into(), value.into());
    }

    pub fn unset_extra(&mut self, key: &str) {
        self.extras.remove(key);
    }

    pub fn ts_line_number(&self) -> Option<usize> {
        self.ts_line_number
    }

    pub fn set_ts_line_number(&mut self, line: Option<usize>) {
        self.ts_line_number = line;
    }
}
