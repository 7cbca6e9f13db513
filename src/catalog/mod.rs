//! Ordered collection of messages with lazily rebuilt lookup indices.
//!
//! Message order is document order and is meaningful to the codecs. The three
//! lookup indices (by id, by content key, by context for context comments)
//! are a cache derived from the sequence; every lookup goes through the
//! `find*` methods.

mod duplicates;
mod filters;
mod index;

use std::cell::OnceCell;

use serde::{Deserialize, Serialize};

use crate::conversion::ConversionContext;
use crate::message::{ExtraData, Message, Reference};

pub use duplicates::{DuplicateEntries, Duplicates};
use index::MessageIndex;

/// Separator between extractor comments merged by [`Catalog::extend`]
const EXTRA_COMMENT_SEPARATOR: &str = "\n----------\n";

/// How source locations are written by codecs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationsType {
    None,
    Relative,
    #[default]
    Absolute,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    messages: Vec<Message>,
    language_code: String,
    source_language_code: String,
    locations_type: LocationsType,
    dependencies: Vec<String>,
    extras: ExtraData,
    index: OnceCell<MessageIndex>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_language_code(mut self, code: impl Into<String>) -> Self {
        self.language_code = code.into();
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn message(&self, pos: usize) -> &Message {
        &self.messages[pos]
    }

    /// Mutable access to one message. The lookup cache is dropped because the
    /// caller may change identity fields.
    pub fn message_mut(&mut self, pos: usize) -> &mut Message {
        self.invalidate_index();
        &mut self.messages[pos]
    }

    /// Replaces the translations of one message; translations are not indexed.
    pub fn set_translations(&mut self, pos: usize, translations: Vec<String>) {
        self.messages[pos].set_translations(translations);
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    pub fn set_language_code(&mut self, code: impl Into<String>) {
        self.language_code = code.into();
    }

    pub fn source_language_code(&self) -> &str {
        &self.source_language_code
    }

    pub fn set_source_language_code(&mut self, code: impl Into<String>) {
        self.source_language_code = code.into();
    }

    pub fn locations_type(&self) -> LocationsType {
        self.locations_type
    }

    pub fn set_locations_type(&mut self, locations_type: LocationsType) {
        self.locations_type = locations_type;
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn set_dependencies(&mut self, dependencies: Vec<String>) {
        self.dependencies = dependencies;
    }

    pub fn extras(&self) -> &ExtraData {
        &self.extras
    }

    pub fn extra(&self, key: &str) -> &str {
        self.extras.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extras.insert(key.into(), value.into());
    }

    pub fn set_extras(&mut self, extras: ExtraData) {
        self.extras = extras;
    }

    fn index(&self) -> &MessageIndex {
        self.index.get_or_init(|| MessageIndex::build(&self.messages))
    }

    pub(crate) fn invalidate_index(&mut self) {
        self.index = OnceCell::new();
    }

    fn insert(&mut self, pos: usize, msg: Message) {
        if pos == self.messages.len() {
            if let Some(index) = self.index.get_mut() {
                index.add(pos, &msg);
            }
        } else {
            self.invalidate_index();
        }
        self.messages.insert(pos, msg);
    }

    /// Adds a message at the end of the sequence.
    pub fn append(&mut self, msg: Message) {
        self.insert(self.messages.len(), msg);
    }

    /// Inserts a message into document order.
    ///
    /// Scans for runs of messages sharing the new message's file and context
    /// whose line numbers ascend. A run whose line range brackets the new
    /// line scores 2, a run the message would extend at either end scores 1;
    /// longer runs win ties. Without a line number, or without any run, the
    /// message is appended.
    pub fn append_sorted(&mut self, msg: Message) {
        let Some(msg_line) = msg.line_number() else {
            self.append(msg);
            return;
        };

        // Best insertion point so far, its score and the length of its run
        let mut best_idx = 0;
        let mut best_score = 0;
        let mut best_size = 0;

        // Candidate insertion point for the run being scanned
        let mut this_idx = 0;
        let mut this_score = 0;
        let mut this_size = 0;

        let mut prev_line = 0;
        for (cur_idx, mit) in self.messages.iter().enumerate() {
            let same_file = mit.file_name() == msg.file_name() && mit.context() == msg.context();
            let cur_line = mit.line_number();
            match cur_line {
                Some(cur_line) if same_file && cur_line >= prev_line => {
                    if msg_line >= prev_line && msg_line < cur_line {
                        this_idx = cur_idx;
                        this_score = if this_size > 0 { 2 } else { 1 };
                    }
                    this_size += 1;
                    prev_line = cur_line;
                }
                _ => {
                    if this_size > 0 {
                        if this_score == 0 {
                            this_idx = cur_idx;
                            this_score = 1;
                        }
                        if this_score > best_score
                            || (this_score == best_score && this_size > best_size)
                        {
                            best_idx = this_idx;
                            best_score = this_score;
                            best_size = this_size;
                        }
                        this_score = 0;
                        this_size = if same_file { 1 } else { 0 };
                        prev_line = 0;
                    }
                }
            }
        }
        if this_size > 0 && this_score == 0 {
            this_idx = self.messages.len();
            this_score = 1;
        }

        if this_score > best_score || (this_score == best_score && this_size > best_size) {
            self.insert(this_idx, msg);
        } else if best_score > 0 {
            self.insert(best_idx, msg);
        } else {
            self.append(msg);
        }
    }

    /// Replaces the message with the same identity, or inserts it sorted.
    pub fn replace_sorted(&mut self, msg: Message) {
        match self.find(&msg) {
            None => self.append_sorted(msg),
            Some(pos) => {
                if let Some(index) = self.index.get_mut() {
                    index.remove(&self.messages[pos]);
                    index.add(pos, &msg);
                }
                self.messages[pos] = msg;
            }
        }
    }

    /// Merges a single-location message into the catalog.
    ///
    /// A new identity is appended. For an existing one the reference and the
    /// extractor comment are added; a conflicting non-empty source text or
    /// conflicting extras keep the existing record and report an error.
    pub fn extend(&mut self, msg: &Message, cd: &mut ConversionContext) {
        let Some(pos) = self.find(msg) else {
            self.append(msg.clone());
            return;
        };

        if self.messages[pos].source_text().is_empty() {
            if let Some(index) = self.index.get_mut() {
                index.remove(&self.messages[pos]);
            }
            self.messages[pos].set_source_text(msg.source_text());
            if let Some(index) = self.index.get_mut() {
                index.add(pos, &self.messages[pos]);
            }
        } else if !msg.source_text().is_empty()
            && self.messages[pos].source_text() != msg.source_text()
        {
            let error = format!(
                "Contradicting source strings for message with id '{}'.",
                self.messages[pos].id()
            );
            tracing::warn!("{}", error);
            cd.append_error(error);
            return;
        }

        let emsg = &mut self.messages[pos];
        if emsg.extras().is_empty() {
            emsg.set_extras(msg.extras().clone());
        } else if !msg.extras().is_empty() && emsg.extras() != msg.extras() {
            let what = if emsg.id().is_empty() {
                format!("message '{}'", make_msg_id(msg))
            } else {
                format!("message with id '{}'", emsg.id())
            };
            let error = format!("Contradicting meta data for {}.", what);
            tracing::warn!("{}", error);
            cd.append_error(error);
            return;
        }

        if !msg.file_name().is_empty() {
            emsg.add_reference_uniq(msg.file_name(), msg.line_number());
        }
        if !msg.extra_comment().is_empty() {
            let existing = emsg.extra_comment();
            let merged = if existing.is_empty() {
                msg.extra_comment().to_string()
            } else {
                let mut parts: Vec<&str> = existing.split(EXTRA_COMMENT_SEPARATOR).collect();
                if parts.contains(&msg.extra_comment()) {
                    existing.to_string()
                } else {
                    parts.push(msg.extra_comment());
                    parts.join(EXTRA_COMMENT_SEPARATOR)
                }
            };
            emsg.set_extra_comment(merged);
        }
    }

    /// Exact identity lookup.
    ///
    /// An id hit wins. Otherwise the content key decides, except that a
    /// message carrying an id never matches a stored message with a
    /// different non-empty id.
    pub fn find(&self, msg: &Message) -> Option<usize> {
        let index = self.index();
        if msg.id().is_empty() {
            return index.by_content(msg);
        }
        if let Some(pos) = index.by_id(msg.id()) {
            return Some(pos);
        }
        index
            .by_content(msg)
            .filter(|&pos| self.messages[pos].id().is_empty())
    }

    /// First message with the given context and comment sharing at least
    /// one location with `refs`.
    pub fn find_by_references(
        &self,
        context: &str,
        comment: &str,
        refs: &[Reference],
    ) -> Option<usize> {
        if refs.is_empty() {
            return None;
        }
        self.messages.iter().position(|m| {
            m.context() == context
                && m.comment() == comment
                && m.references().iter().any(|r| refs.contains(r))
        })
    }

    /// Context-comment record for a context.
    pub fn find_context_comment(&self, context: &str) -> Option<usize> {
        self.index().by_context(context)
    }
}

fn elided_id(id: &str, len: usize) -> String {
    if id.chars().count() <= len {
        id.to_string()
    } else {
        let head: String = id.chars().take(len - 5).collect();
        format!("{}[...]", head)
    }
}

fn make_msg_id(msg: &Message) -> String {
    let mut id = format!("{}//{}", msg.context(), elided_id(msg.source_text(), 100));
    if !msg.comment().is_empty() {
        id.push_str("//");
        id.push_str(&elided_id(msg.comment(), 30));
    }
    id
}
