//! Lookup cache derived from a catalog's message sequence.
//!
//! The cache is disposable: the owning catalog drops it on any structural
//! change and rebuilds it on the next lookup.

use std::collections::HashMap;

use crate::message::Message;

/// `(context, source text, comment)` identity of a message
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ContentKey {
    context: String,
    source: String,
    comment: String,
}

impl ContentKey {
    pub(crate) fn of(msg: &Message) -> Self {
        Self {
            context: msg.context().to_string(),
            source: msg.source_text().to_string(),
            comment: msg.comment().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MessageIndex {
    by_id: HashMap<String, usize>,
    by_content: HashMap<ContentKey, usize>,
    by_context: HashMap<String, usize>,
}

impl MessageIndex {
    pub(crate) fn build(messages: &[Message]) -> Self {
        let mut index = Self::default();
        for (pos, msg) in messages.iter().enumerate() {
            index.add(pos, msg);
        }
        index
    }

    pub(crate) fn add(&mut self, pos: usize, msg: &Message) {
        if msg.is_context_comment() {
            self.by_context.insert(msg.context().to_string(), pos);
        } else {
            self.by_content.insert(ContentKey::of(msg), pos);
            if !msg.id().is_empty() {
                self.by_id.insert(msg.id().to_string(), pos);
            }
        }
    }

    pub(crate) fn remove(&mut self, msg: &Message) {
        if msg.is_context_comment() {
            self.by_context.remove(msg.context());
        } else {
            self.by_content.remove(&ContentKey::of(msg));
            if !msg.id().is_empty() {
                self.by_id.remove(msg.id());
            }
        }
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub(crate) fn by_content(&self, msg: &Message) -> Option<usize> {
        self.by_content.get(&ContentKey::of(msg)).copied()
    }

    pub(crate) fn by_context(&self, context: &str) -> Option<usize> {
        self.by_context.get(context).copied()
    }
}
