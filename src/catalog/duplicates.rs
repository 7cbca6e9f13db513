use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use super::Catalog;
use crate::message::Message;

/// Persisted-file line numbers of dropped duplicates, keyed by the position of
/// the surviving message.
pub type DuplicateEntries = BTreeMap<usize, Vec<Option<usize>>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Duplicates {
    /// Duplicates sharing the survivor's id
    pub by_id: DuplicateEntries,
    /// Duplicates sharing the survivor's context, source text and comment
    pub by_contents: DuplicateEntries,
}

impl Duplicates {
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.by_contents.is_empty()
    }

    /// Number of dropped messages.
    pub fn count(&self) -> usize {
        self.by_id.values().map(Vec::len).sum::<usize>()
            + self.by_contents.values().map(Vec::len).sum::<usize>()
    }
}

/// Content identity used while resolving duplicates. Context comments compare
/// by context only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DuplicateKey {
    context: String,
    source: String,
    comment: String,
}

impl DuplicateKey {
    fn of(msg: &Message) -> Self {
        let comment = if msg.source_text().is_empty() {
            String::new()
        } else {
            msg.comment().to_string()
        };
        Self {
            context: msg.context().to_string(),
            source: msg.source_text().to_string(),
            comment,
        }
    }
}

enum Rule {
    Id,
    Contents,
}

impl Catalog {
    /// Collapses messages with colliding identity into their first occurrence.
    ///
    /// A later message duplicates an earlier one if it has the same non-empty
    /// id, or the same content key while at most one of the two carries an
    /// id. The survivor adopts the missing id and, if it is untranslated, the
    /// duplicate's translations. Two messages with the same content but
    /// distinct ids are both kept.
    pub fn resolve_duplicates(&mut self) -> Duplicates {
        let mut dups = Duplicates::default();
        let mut id_refs: HashMap<String, usize> = HashMap::new();
        let mut content_refs: HashMap<DuplicateKey, usize> = HashMap::new();
        let mut removed_any = false;

        let mut i = 0;
        while i < self.messages.len() {
            let msg = &self.messages[i];
            let mut hit = None;

            if !msg.id().is_empty() {
                if let Some(&oi) = id_refs.get(msg.id()) {
                    hit = Some((oi, Rule::Id));
                }
            }

            let key = DuplicateKey::of(msg);
            if hit.is_none() {
                if let Some(&oi) = content_refs.get(&key) {
                    let other_id = self.messages[oi].id();
                    if msg.id().is_empty() || other_id.is_empty() {
                        if !msg.id().is_empty() {
                            let id = msg.id().to_string();
                            self.messages[oi].set_id(id.clone());
                            id_refs.insert(id, oi);
                        }
                        hit = Some((oi, Rule::Contents));
                    }
                }
            }

            let Some((oi, rule)) = hit else {
                let msg = &self.messages[i];
                if !msg.id().is_empty() {
                    id_refs.insert(msg.id().to_string(), i);
                }
                content_refs.entry(key).or_insert(i);
                i += 1;
                continue;
            };

            let dup = self.messages.remove(i);
            removed_any = true;
            let bucket = match rule {
                Rule::Id => &mut dups.by_id,
                Rule::Contents => &mut dups.by_contents,
            };
            bucket.entry(oi).or_default().push(dup.ts_line_number());

            let survivor = &mut self.messages[oi];
            if !survivor.is_translated() && dup.is_translated() {
                survivor.set_translations(dup.translations().to_vec());
            }
        }

        if removed_any {
            self.invalidate_index();
        }
        if !dups.is_empty() {
            tracing::debug!(
                by_id = dups.by_id.len(),
                by_contents = dups.by_contents.len(),
                "resolved duplicate messages"
            );
        }
        dups
    }

    /// Renders the warning text for dropped duplicates, or an empty string.
    pub fn duplicates_report(&self, dupes: &Duplicates, file_name: &str, verbose: bool) -> String {
        let mut out = String::new();
        if dupes.is_empty() {
            return out;
        }
        let _ = write!(out, "Warning: dropping duplicate messages in '{}", file_name);
        if !verbose {
            out.push_str("'\n(try -verbose for more info).\n");
            return out;
        }
        out.push_str("':\n");
        for (&pos, lines) in &dupes.by_id {
            let msg = self.message(pos);
            let _ = writeln!(out, "\n* ID: {}", msg.id());
            report_lines(&mut out, msg, lines);
        }
        for (&pos, lines) in &dupes.by_contents {
            let msg = self.message(pos);
            let _ = writeln!(
                out,
                "\n* Context: {}\n* Source: {}",
                msg.context(),
                msg.source_text()
            );
            if !msg.comment().is_empty() {
                let _ = writeln!(out, "* Comment: {}", msg.comment());
            }
            report_lines(&mut out, msg, lines);
        }
        out.push('\n');
        out
    }
}

fn report_lines(out: &mut String, msg: &Message, lines: &[Option<usize>]) {
    if let Some(line) = msg.ts_line_number() {
        let _ = writeln!(out, "* Line in .ts file: {}", line);
        for line in lines.iter().flatten() {
            let _ = writeln!(out, "* Duplicate at line: {}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageType;

    #[test]
    fn test_no_duplicates() {
        let mut catalog = Catalog::new();
        catalog.append(Message::new("Dialog", "Save", ""));
        catalog.append(Message::new("Dialog", "Open", ""));
        let dups = catalog.resolve_duplicates();
        assert!(dups.is_empty());
        assert_eq!(catalog.message_count(), 2);
        assert_eq!(catalog.duplicates_report(&dups, "app_de.ts", true), "");
    }

    #[test]
    fn test_id_duplicates_keep_first() {
        let mut catalog = Catalog::new();
        catalog.append(Message::new("", "Save", "").with_id("save").with_ts_line_number(3));
        catalog.append(Message::new("", "Open", "").with_id("open").with_ts_line_number(8));
        catalog.append(
            Message::new("", "Save file", "")
                .with_id("save")
                .with_translation("Speichern")
                .with_ts_line_number(13),
        );

        let dups = catalog.resolve_duplicates();
        assert_eq!(catalog.message_count(), 2);
        assert_eq!(catalog.message(0).source_text(), "Save");
        // Untranslated survivor adopts the duplicate's translation
        assert_eq!(catalog.message(0).translation(), "Speichern");
        assert_eq!(dups.by_id.get(&0), Some(&vec![Some(13)]));
        assert!(dups.by_contents.is_empty());
        assert_eq!(dups.count(), 1);
    }

    #[test]
    fn test_translated_survivor_keeps_its_translation() {
        let mut catalog = Catalog::new();
        catalog.append(Message::new("Dialog", "Save", "").with_translation("Sichern"));
        catalog.append(Message::new("Dialog", "Save", "").with_translation("Speichern"));
        catalog.resolve_duplicates();
        assert_eq!(catalog.message_count(), 1);
        assert_eq!(catalog.message(0).translation(), "Sichern");
    }

    #[test]
    fn test_content_duplicate_adopts_id() {
        let mut catalog = Catalog::new();
        catalog.append(Message::new("Dialog", "Save", ""));
        catalog.append(Message::new("Dialog", "Save", "").with_id("save"));
        catalog.append(Message::new("Other", "Save", "").with_id("save"));

        let dups = catalog.resolve_duplicates();
        assert_eq!(catalog.message_count(), 1);
        assert_eq!(catalog.message(0).id(), "save");
        assert_eq!(dups.by_contents.get(&0).map(Vec::len), Some(1));
        assert_eq!(dups.by_id.get(&0).map(Vec::len), Some(1));
        assert_eq!(catalog.find(&Message::new("", "x", "").with_id("save")), Some(0));
    }

    #[test]
    fn test_distinct_ids_with_same_content_are_kept() {
        let mut catalog = Catalog::new();
        catalog.append(Message::new("Dialog", "Save", "").with_id("save"));
        catalog.append(Message::new("Dialog", "Save", "").with_id("store"));
        catalog.append(Message::new("Dialog", "Save", ""));

        let dups = catalog.resolve_duplicates();
        assert_eq!(catalog.message_count(), 2);
        assert_eq!(catalog.message(0).id(), "save");
        assert_eq!(catalog.message(1).id(), "store");
        assert_eq!(dups.by_contents.len(), 1);
    }

    #[test]
    fn test_untagged_duplicate_folds_into_earliest_record() {
        let mut catalog = Catalog::new();
        catalog.append(Message::new("Dialog", "Save", "").with_id("1"));
        catalog.append(Message::new("Dialog", "Save", "").with_id("2"));
        catalog.append(Message::new("Dialog", "Save", "").with_translation("Speichern"));

        let dups = catalog.resolve_duplicates();
        assert_eq!(catalog.message_count(), 2);
        assert_eq!(dups.by_contents.keys().copied().collect::<Vec<_>>(), vec![0]);
        assert_eq!(catalog.message(0).id(), "1");
        assert_eq!(catalog.message(0).translation(), "Speichern");
        assert!(!catalog.message(1).is_translated());
    }

    #[test]
    fn test_context_comments_ignore_comment() {
        let mut catalog = Catalog::new();
        catalog.append(Message::context_comment("Dialog", "first"));
        catalog.append(Message::context_comment("Dialog", "second"));
        catalog.resolve_duplicates();
        assert_eq!(catalog.message_count(), 1);
        assert_eq!(catalog.message(0).comment(), "first");
    }

    #[test]
    fn test_identity_uniqueness_after_resolution() {
        let mut catalog = Catalog::new();
        for (ctx, src, id) in [
            ("A", "x", ""),
            ("A", "x", "1"),
            ("A", "y", "1"),
            ("B", "x", "2"),
            ("B", "x", "3"),
            ("B", "x", ""),
            ("A", "x", ""),
        ] {
            catalog.append(
                Message::new(ctx, src, "")
                    .with_id(id)
                    .with_type(MessageType::Unfinished),
            );
        }
        catalog.resolve_duplicates();

        let msgs = catalog.messages();
        for (i, a) in msgs.iter().enumerate() {
            for b in &msgs[i + 1..] {
                if !a.id().is_empty() {
                    assert_ne!(a.id(), b.id());
                }
                let same_content = a.context() == b.context()
                    && a.source_text() == b.source_text()
                    && a.comment() == b.comment();
                if same_content {
                    assert!(!a.id().is_empty() && !b.id().is_empty() && a.id() != b.id());
                }
            }
        }
    }

    #[test]
    fn test_duplicates_report() {
        let mut catalog = Catalog::new();
        catalog.append(Message::new("", "Save", "").with_id("save").with_ts_line_number(3));
        catalog.append(Message::new("", "Save", "").with_id("save").with_ts_line_number(9));
        catalog.append(Message::new("Dialog", "Open", "menu").with_ts_line_number(12));
        catalog.append(Message::new("Dialog", "Open", "menu").with_ts_line_number(15));
        let dups = catalog.resolve_duplicates();

        assert_eq!(
            catalog.duplicates_report(&dups, "app_de.ts", false),
            "Warning: dropping duplicate messages in 'app_de.ts'\n(try -verbose for more info).\n"
        );

        let report = catalog.duplicates_report(&dups, "app_de.ts", true);
        assert!(report.contains("* ID: save\n* Line in .ts file: 3\n* Duplicate at line: 9\n"));
        assert!(report.contains("* Context: Dialog\n* Source: Open\n* Comment: menu\n"));
        assert!(report.contains("* Duplicate at line: 15\n"));
    }
}
