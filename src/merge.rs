//! Reconciles an existing translation catalog with freshly extracted source
//! strings.
//!
//! # Overview
//!
//! Three kinds of catalogs take part in a merge:
//!
//! 1. **Vernacular** - the existing, translated catalog. Authoritative for
//!    translations.
//! 2. **Virgin** - the catalog produced by source extraction. Authoritative
//!    for source text, locations, plurality, ids and extractor comments.
//! 3. **Aliens** - other catalogs of the same target language mined for
//!    translations of messages the vernacular lacks.
//!
//! Each vernacular message is matched against the virgin catalog by exact
//! identity first and, if enabled, by location plus text similarity. The
//! result classifies every message as finished, unfinished, vanished or
//! obsolete. Virgin messages nobody matched are added as new, alien
//! translations fill untranslated gaps, and the optional same-text pass
//! copies unambiguous translations onto identical untranslated source texts.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::CatalogResult;
use crate::message::{ExtraData, Message, MessageType};
use crate::similarity::{TEXT_SIMILARITY_THRESHOLD, similarity_score};

/// Extra holding the plural source text of a gettext message
const PO_MSGID_PLURAL: &str = "po-msgid_plural";
/// Extra receiving the previous plural source text when the source changes
const PO_OLD_MSGID_PLURAL: &str = "po-old_msgid_plural";

/// Switches controlling a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MergeOptions {
    /// Match changed source texts by location and similarity score
    pub similar_text: bool,
    /// Copy unambiguous translations onto identical untranslated texts
    pub same_text: bool,
    /// Remove vanished and obsolete messages from the result
    pub no_obsolete: bool,
    /// Append new messages instead of inserting them by location
    pub no_locations: bool,
    /// Produce the summary text
    pub verbose: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            similar_text: true,
            same_text: true,
            no_obsolete: false,
            no_locations: false,
            verbose: false,
        }
    }
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_similar_text(mut self, enabled: bool) -> Self {
        self.similar_text = enabled;
        self
    }

    pub fn with_same_text(mut self, enabled: bool) -> Self {
        self.same_text = enabled;
        self
    }

    pub fn with_no_obsolete(mut self, enabled: bool) -> Self {
        self.no_obsolete = enabled;
        self
    }

    pub fn with_no_locations(mut self, enabled: bool) -> Self {
        self.no_locations = enabled;
        self
    }

    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Reads options from a JSON object; missing keys keep their defaults.
    ///
    /// ```json
    /// { "similar-text": false, "no-obsolete": true }
    /// ```
    pub fn from_json(text: &str) -> CatalogResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> CatalogResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Counts gathered during a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Messages without a usable previous translation
    pub new: usize,
    /// Messages carried over from the vernacular or an alien catalog
    pub known: usize,
    /// Messages that no longer occur in source
    pub obsoleted: usize,
    pub similar_text_hits: usize,
    pub same_text_hits: usize,
    /// Whether obsolete messages were removed from the result
    pub obsolete_dropped: bool,
}

impl MergeSummary {
    pub fn found(&self) -> usize {
        self.new + self.known
    }
}

impl fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "    Found {} source text(s) ({} new and {} already existing)",
            self.found(),
            self.new,
            self.known
        )?;
        if self.obsoleted > 0 {
            let verb = if self.obsolete_dropped { "Removed" } else { "Kept" };
            writeln!(f, "    {} {} obsolete entries", verb, self.obsoleted)?;
        }
        if self.same_text_hits > 0 {
            writeln!(
                f,
                "    Same-text heuristic provided {} translation(s)",
                self.same_text_hits
            )?;
        }
        if self.similar_text_hits > 0 {
            writeln!(
                f,
                "    Similar-text heuristic provided {} translation(s)",
                self.similar_text_hits
            )?;
        }
        Ok(())
    }
}

/// Merges `vernacular` with `virgin` and folds in `aliens`.
///
/// The inputs are left untouched. The result inherits the vernacular's
/// language codes and locations type.
pub fn merge(
    vernacular: &Catalog,
    virgin: &Catalog,
    aliens: &[Catalog],
    options: &MergeOptions,
) -> (Catalog, MergeSummary) {
    let mut summary = MergeSummary::default();

    let mut out = Catalog::new();
    out.set_language_code(vernacular.language_code());
    out.set_source_language_code(vernacular.source_language_code());
    out.set_locations_type(vernacular.locations_type());

    for m in vernacular.messages() {
        let merged = merge_vernacular_message(m, virgin, options, &mut summary);
        out.append(merged);
    }

    add_new_messages(vernacular, virgin, options, &mut out, &mut summary);

    for alien in aliens {
        fold_alien(alien, options, &mut out, &mut summary);
    }

    if options.same_text {
        summary.same_text_hits = apply_same_text_heuristic(&mut out);
    }

    if options.no_obsolete {
        out.strip_obsolete_messages();
        summary.obsolete_dropped = true;
    }

    info!(
        new = summary.new,
        known = summary.known,
        obsoleted = summary.obsoleted,
        similar_text = summary.similar_text_hits,
        same_text = summary.same_text_hits,
        "merged catalog"
    );
    (out, summary)
}

/// Reconciles one vernacular message against the virgin catalog.
fn merge_vernacular_message(
    m: &Message,
    virgin: &Catalog,
    options: &MergeOptions,
    summary: &mut MergeSummary,
) -> Message {
    let mut m = m.clone();

    if m.is_context_comment() {
        // Context comments always take the freshly extracted text
        if let Some(mvi) = virgin.find_context_comment(m.context()) {
            m.set_comment(virgin.message(mvi).comment());
        }
        return m;
    }

    let new_type = if let Some(mvi) = virgin.find(&m) {
        let mv = virgin.message(mvi);
        let mut extras = mv.extras().clone();
        let new_type = if !mv.id().is_empty()
            && (mv.context() != m.context()
                || mv.source_text() != m.source_text()
                || mv.comment() != m.comment())
        {
            debug!(id = mv.id(), "message matched by id with changed content");
            summary.known += 1;
            m.set_context(mv.context());
            if mv.comment() != m.comment() {
                let previous = m.comment().to_string();
                m.set_old_comment(previous);
                m.set_comment(mv.comment());
            }
            if mv.source_text() != m.source_text() {
                apply_source_text_change(&mut m, mv.source_text(), &mut extras);
            }
            MessageType::Unfinished
        } else {
            match m.message_type() {
                MessageType::Finished => {
                    summary.known += 1;
                    if m.is_plural() == mv.is_plural() {
                        MessageType::Finished
                    } else {
                        MessageType::Unfinished
                    }
                }
                MessageType::Unfinished => {
                    summary.known += 1;
                    MessageType::Unfinished
                }
                MessageType::Vanished => {
                    summary.new += 1;
                    MessageType::Finished
                }
                MessageType::Obsolete => {
                    summary.new += 1;
                    MessageType::Unfinished
                }
            }
        };
        adopt_virgin_fields(&mut m, mv, extras);
        new_type
    } else if let Some(mvi) = similar_counterpart(&m, virgin, options) {
        let mv = virgin.message(mvi);
        debug!(
            old = m.source_text(),
            new = mv.source_text(),
            "similar-text heuristic matched changed source"
        );
        let mut extras = mv.extras().clone();
        summary.similar_text_hits += 1;
        summary.new += 1;
        apply_source_text_change(&mut m, mv.source_text(), &mut extras);
        adopt_virgin_fields(&mut m, mv, extras);
        MessageType::Unfinished
    } else {
        let obsoleted = obsoleted_type(m.message_type());
        if obsoleted != m.message_type() {
            summary.obsoleted += 1;
        }
        debug!(source = m.source_text(), "message no longer in source");
        m.clear_references();
        obsoleted
    };

    m.set_type(new_type);
    m
}

/// Virgin message at one of `m`'s locations with the same context and comment
/// and a source text close enough to `m`'s.
fn similar_counterpart(m: &Message, virgin: &Catalog, options: &MergeOptions) -> Option<usize> {
    if !options.similar_text {
        return None;
    }
    let mvi = virgin.find_by_references(m.context(), m.comment(), m.references())?;
    let score = similarity_score(m.source_text(), virgin.message(mvi).source_text());
    if score < TEXT_SIMILARITY_THRESHOLD {
        debug!(score, "similar-text candidate rejected");
        return None;
    }
    Some(mvi)
}

/// Records the previous source text and takes over `source`.
fn apply_source_text_change(m: &mut Message, source: &str, extras: &mut ExtraData) {
    let previous = m.source_text().to_string();
    m.set_old_source_text(previous);
    m.set_source_text(source);
    let old_plural_source = m.extra(PO_MSGID_PLURAL);
    if !old_plural_source.is_empty() {
        extras.insert(PO_OLD_MSGID_PLURAL.to_string(), old_plural_source.to_string());
    }
}

/// Fields the extractor knows better than the stored catalog.
fn adopt_virgin_fields(m: &mut Message, mv: &Message, extras: ExtraData) {
    m.set_references(mv.references().to_vec());
    m.set_plural(mv.is_plural());
    m.set_extras(extras);
    m.set_extra_comment(mv.extra_comment());
    m.set_id(mv.id());
}

fn obsoleted_type(message_type: MessageType) -> MessageType {
    match message_type {
        MessageType::Finished => MessageType::Vanished,
        MessageType::Unfinished => MessageType::Obsolete,
        other => other,
    }
}

/// Appends virgin messages that no vernacular message claimed.
fn add_new_messages(
    vernacular: &Catalog,
    virgin: &Catalog,
    options: &MergeOptions,
    out: &mut Catalog,
    summary: &mut MergeSummary,
) {
    for mv in virgin.messages() {
        if mv.is_context_comment() {
            if vernacular.find_context_comment(mv.context()).is_some() {
                continue;
            }
        } else {
            if vernacular.find(mv).is_some() {
                continue;
            }
            if options.similar_text && claimed_by_similar_text(mv, vernacular, virgin) {
                continue;
            }
        }

        if options.no_locations {
            out.append(mv.clone());
        } else {
            out.append_sorted(mv.clone());
        }
        if !mv.is_context_comment() {
            summary.new += 1;
        }
    }
}

/// True if the first pass already took `mv` over through the similar-text
/// heuristic. The vernacular message must not have an exact virgin match of
/// its own.
fn claimed_by_similar_text(mv: &Message, vernacular: &Catalog, virgin: &Catalog) -> bool {
    let Some(mi) = vernacular.find_by_references(mv.context(), mv.comment(), mv.references())
    else {
        return false;
    };
    let m = vernacular.message(mi);
    virgin.find(m).is_none()
        && similarity_score(m.source_text(), mv.source_text()) >= TEXT_SIMILARITY_THRESHOLD
}

/// Takes translations from an alien catalog.
///
/// Matching untranslated, unfinished results receive the alien translation.
/// Unmatched alien messages are added one state down the lifecycle so a
/// reviewer can pick them up; their locations are meaningless here and are
/// dropped.
fn fold_alien(
    alien: &Catalog,
    options: &MergeOptions,
    out: &mut Catalog,
    summary: &mut MergeSummary,
) {
    for mv in alien.messages() {
        if mv.source_text().is_empty() || !mv.is_translated() {
            continue;
        }
        if let Some(pos) = out.find(mv) {
            let tm = out.message(pos);
            if tm.message_type() != MessageType::Finished && !tm.is_translated() {
                out.set_translations(pos, mv.translations().to_vec());
                summary.new = summary.new.saturating_sub(1);
                summary.known += 1;
            }
        } else {
            let mut mv = mv.clone();
            mv.clear_references();
            mv.set_type(if mv.message_type() == MessageType::Finished {
                MessageType::Vanished
            } else {
                MessageType::Obsolete
            });
            if options.no_locations {
                out.append(mv);
            } else {
                out.append_sorted(mv);
            }
            summary.known += 1;
            summary.obsoleted += 1;
        }
    }
}

/// Fills untranslated, unfinished messages from translated messages with the
/// same source text.
///
/// A source text translated in two different ways anywhere in the catalog is
/// excluded for the rest of the pass, even if later messages agree again.
/// Returns the number of messages filled in.
pub fn apply_same_text_heuristic(catalog: &mut Catalog) -> usize {
    let mut translated: HashMap<String, Vec<String>> = HashMap::new();
    let mut avoid: HashSet<String> = HashSet::new();
    let mut untranslated = Vec::new();

    for (pos, msg) in catalog.messages().iter().enumerate() {
        if !msg.is_translated() {
            if msg.message_type() == MessageType::Unfinished {
                untranslated.push(pos);
            }
            continue;
        }
        let key = msg.source_text();
        let conflicting = translated
            .get(key)
            .map(|known| known.as_slice() != msg.translations());
        match conflicting {
            Some(true) => {
                translated.remove(key);
                avoid.insert(key.to_string());
            }
            Some(false) => {}
            None => {
                if !avoid.contains(key) {
                    translated.insert(key.to_string(), msg.translations().to_vec());
                }
            }
        }
    }

    let mut inserted = 0;
    for pos in untranslated {
        if let Some(translations) = translated.get(catalog.message(pos).source_text()) {
            catalog.set_translations(pos, translations.clone());
            inserted += 1;
        }
    }
    inserted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact_only() -> MergeOptions {
        MergeOptions::new()
            .with_similar_text(false)
            .with_same_text(false)
    }

    #[test]
    fn test_finished_exact_match_keeps_translation() {
        let vernacular = Catalog::from_messages(vec![
            Message::new("Dialog", "Save", "")
                .with_translation("Guardar")
                .with_type(MessageType::Finished)
                .with_reference("old.cpp", Some(3)),
        ]);
        let virgin = Catalog::from_messages(vec![
            Message::new("Dialog", "Save", "").with_reference("dialog.cpp", Some(42)),
        ]);

        let (out, summary) = merge(&vernacular, &virgin, &[], &exact_only());
        assert_eq!(out.message_count(), 1);
        let msg = out.message(0);
        assert_eq!(msg.message_type(), MessageType::Finished);
        assert_eq!(msg.translation(), "Guardar");
        assert_eq!(msg.references(), virgin.message(0).references());
        assert_eq!(summary.known, 1);
        assert_eq!(summary.new, 0);
    }

    #[test]
    fn test_unmatched_messages_become_obsolete() {
        let vernacular = Catalog::from_messages(vec![
            Message::new("Dialog", "Save", "")
                .with_translation("Guardar")
                .with_type(MessageType::Finished)
                .with_reference("dialog.cpp", Some(3)),
            Message::new("Dialog", "Print", "").with_reference("dialog.cpp", Some(9)),
            Message::new("Dialog", "Gone", "").with_type(MessageType::Vanished),
        ]);
        let virgin = Catalog::new();

        let (out, summary) = merge(&vernacular, &virgin, &[], &exact_only());
        let types: Vec<_> = out.messages().iter().map(Message::message_type).collect();
        assert_eq!(
            types,
            vec![MessageType::Vanished, MessageType::Obsolete, MessageType::Vanished]
        );
        assert!(out.messages().iter().all(|m| m.references().is_empty()));
        assert_eq!(out.message(0).translation(), "Guardar");
        assert_eq!(summary.obsoleted, 2);
    }

    #[test]
    fn test_id_match_with_changed_source() {
        let vernacular = Catalog::from_messages(vec![
            Message::new("", "Save", "")
                .with_id("x")
                .with_translation("Guardar")
                .with_type(MessageType::Finished),
        ]);
        let virgin = Catalog::from_messages(vec![Message::new("", "Save File", "").with_id("x")]);

        let (out, summary) = merge(&vernacular, &virgin, &[], &exact_only());
        assert_eq!(out.message_count(), 1);
        let msg = out.message(0);
        assert_eq!(msg.message_type(), MessageType::Unfinished);
        assert_eq!(msg.old_source_text(), "Save");
        assert_eq!(msg.source_text(), "Save File");
        assert_eq!(msg.translation(), "Guardar");
        assert_eq!(summary.known, 1);
    }

    #[test]
    fn test_id_match_adopts_context_and_comment() {
        let vernacular = Catalog::from_messages(vec![
            Message::new("Old", "Save", "old note")
                .with_id("x")
                .with_type(MessageType::Finished),
        ]);
        let virgin =
            Catalog::from_messages(vec![Message::new("New", "Save", "new note").with_id("x")]);

        let (out, _) = merge(&vernacular, &virgin, &[], &exact_only());
        let msg = out.message(0);
        assert_eq!(msg.context(), "New");
        assert_eq!(msg.comment(), "new note");
        assert_eq!(msg.old_comment(), "old note");
        assert_eq!(msg.old_source_text(), "");
        assert_eq!(msg.message_type(), MessageType::Unfinished);
    }

    #[test]
    fn test_resurrection_of_obsolete_messages() {
        let vernacular = Catalog::from_messages(vec![
            Message::new("", "Save", "")
                .with_translation("Guardar")
                .with_type(MessageType::Vanished),
            Message::new("", "Open", "").with_type(MessageType::Obsolete),
        ]);
        let virgin = Catalog::from_messages(vec![
            Message::new("", "Save", ""),
            Message::new("", "Open", ""),
        ]);

        let (out, summary) = merge(&vernacular, &virgin, &[], &exact_only());
        assert_eq!(out.message(0).message_type(), MessageType::Finished);
        assert_eq!(out.message(1).message_type(), MessageType::Unfinished);
        assert_eq!(summary.new, 2);
        assert_eq!(out.message_count(), 2);
    }

    #[test]
    fn test_plurality_change_demotes_finished() {
        let vernacular = Catalog::from_messages(vec![
            Message::new("", "%n file(s)", "")
                .with_translation("%n Datei(en)")
                .with_type(MessageType::Finished),
        ]);
        let virgin =
            Catalog::from_messages(vec![Message::new("", "%n file(s)", "").with_plural(true)]);

        let (out, _) = merge(&vernacular, &virgin, &[], &exact_only());
        assert_eq!(out.message(0).message_type(), MessageType::Unfinished);
        assert!(out.message(0).is_plural());
    }

    #[test]
    fn test_virgin_fields_are_adopted() {
        let vernacular = Catalog::from_messages(vec![
            Message::new("", "Save", "")
                .with_extra("po-flags", "old")
                .with_extra_comment("old hint")
                .with_type(MessageType::Finished),
        ]);
        let virgin = Catalog::from_messages(vec![
            Message::new("", "Save", "")
                .with_id("save")
                .with_extra("po-flags", "c-format")
                .with_extra_comment("toolbar button")
                .with_reference("main.cpp", Some(7)),
        ]);

        let (out, _) = merge(&vernacular, &virgin, &[], &exact_only());
        let msg = out.message(0);
        assert_eq!(msg.id(), "save");
        assert_eq!(msg.extra("po-flags"), "c-format");
        assert_eq!(msg.extra_comment(), "toolbar button");
        assert_eq!(msg.line_number(), Some(7));
    }

    #[test]
    fn test_context_comment_takes_virgin_text() {
        let vernacular = Catalog::from_messages(vec![
            Message::context_comment("Dialog", "old").with_type(MessageType::Unfinished),
        ]);
        let virgin = Catalog::from_messages(vec![Message::context_comment("Dialog", "new")]);

        let (out, summary) = merge(&vernacular, &virgin, &[], &exact_only());
        assert_eq!(out.message_count(), 1);
        assert_eq!(out.message(0).comment(), "new");
        assert_eq!(out.message(0).message_type(), MessageType::Unfinished);
        assert_eq!(summary.found(), 0);
    }

    #[test]
    fn test_similar_text_heuristic_accepts_small_change() {
        let vernacular = Catalog::from_messages(vec![
            Message::new("Dialog", "Open the file", "")
                .with_translation("Datei öffnen")
                .with_type(MessageType::Finished)
                .with_reference("dialog.cpp", Some(10))
                .with_extra("po-msgid_plural", "Open the files"),
        ]);
        let virgin = Catalog::from_messages(vec![
            Message::new("Dialog", "Open a file", "").with_reference("dialog.cpp", Some(10)),
        ]);

        let options = MergeOptions::new().with_same_text(false);
        let (out, summary) = merge(&vernacular, &virgin, &[], &options);
        assert_eq!(out.message_count(), 1);
        let msg = out.message(0);
        assert_eq!(msg.message_type(), MessageType::Unfinished);
        assert_eq!(msg.source_text(), "Open a file");
        assert_eq!(msg.old_source_text(), "Open the file");
        assert_eq!(msg.translation(), "Datei öffnen");
        assert_eq!(msg.extra("po-old_msgid_plural"), "Open the files");
        assert_eq!(summary.similar_text_hits, 1);
        assert_eq!(summary.new, 1);
    }

    #[test]
    fn test_similar_text_heuristic_rejects_unrelated_text() {
        let vernacular = Catalog::from_messages(vec![
            Message::new("Dialog", "Save", "")
                .with_translation("Guardar")
                .with_type(MessageType::Finished)
                .with_reference("dialog.cpp", Some(10)),
        ]);
        let virgin = Catalog::from_messages(vec![
            Message::new("Dialog", "Export the whole project as PDF document", "")
                .with_reference("dialog.cpp", Some(10)),
        ]);

        let options = MergeOptions::new().with_same_text(false);
        let (out, summary) = merge(&vernacular, &virgin, &[], &options);
        assert_eq!(out.message_count(), 2);
        assert_eq!(out.message(0).message_type(), MessageType::Vanished);
        assert!(out.message(0).references().is_empty());
        assert_eq!(out.message(1).source_text(), "Export the whole project as PDF document");
        assert_eq!(summary.similar_text_hits, 0);
        assert_eq!(summary.new, 1);
    }

    #[test]
    fn test_new_virgin_messages_are_added() {
        let vernacular = Catalog::from_messages(vec![
            Message::new("Dialog", "Save", "")
                .with_type(MessageType::Finished)
                .with_translation("Guardar"),
        ]);
        let virgin = Catalog::from_messages(vec![
            Message::new("Dialog", "Save", ""),
            Message::new("Dialog", "Close", ""),
            Message::context_comment("Dialog", "Dialog strings"),
        ]);

        let (out, summary) = merge(&vernacular, &virgin, &[], &exact_only());
        assert_eq!(out.message_count(), 3);
        assert_eq!(out.message(1).source_text(), "Close");
        assert_eq!(out.message(1).message_type(), MessageType::Unfinished);
        assert!(!out.message(1).is_translated());
        assert!(out.message(2).is_context_comment());
        assert_eq!(summary.new, 1);
        assert_eq!(summary.known, 1);
    }

    #[test]
    fn test_alien_translations_fill_gaps() {
        let vernacular = Catalog::new();
        let virgin = Catalog::from_messages(vec![Message::new("Dialog", "Save", "")]);
        let alien = Catalog::from_messages(vec![
            Message::new("Dialog", "Save", "")
                .with_translation("Guardar")
                .with_type(MessageType::Finished),
            Message::new("Other", "Quit", "")
                .with_translation("Salir")
                .with_type(MessageType::Finished)
                .with_reference("other.cpp", Some(1)),
            Message::new("Other", "Help", "").with_type(MessageType::Finished),
        ]);

        let (out, summary) = merge(&vernacular, &virgin, &[alien], &exact_only());
        assert_eq!(out.message_count(), 2);
        assert_eq!(out.message(0).translation(), "Guardar");
        assert_eq!(out.message(0).message_type(), MessageType::Unfinished);

        let quit = out.message(1);
        assert_eq!(quit.source_text(), "Quit");
        assert_eq!(quit.message_type(), MessageType::Vanished);
        assert!(quit.references().is_empty());

        assert_eq!(summary.new, 0);
        assert_eq!(summary.known, 2);
        assert_eq!(summary.obsoleted, 1);
    }

    #[test]
    fn test_unmatched_unfinished_alien_becomes_obsolete() {
        let vernacular = Catalog::from_messages(vec![
            Message::new("Dialog", "Save", "")
                .with_translation("Guardar")
                .with_type(MessageType::Finished),
        ]);
        let virgin = Catalog::from_messages(vec![Message::new("Dialog", "Save", "")]);
        let alien = Catalog::from_messages(vec![
            Message::new("Other", "Quit", "")
                .with_translation("Salir")
                .with_type(MessageType::Unfinished)
                .with_reference("other.cpp", Some(4)),
        ]);

        let (out, summary) = merge(&vernacular, &virgin, &[alien], &exact_only());
        assert_eq!(out.message_count(), 2);
        let quit = out.message(1);
        assert_eq!(quit.source_text(), "Quit");
        assert_eq!(quit.translation(), "Salir");
        assert_eq!(quit.message_type(), MessageType::Obsolete);
        assert!(quit.references().is_empty());
        assert_eq!(summary.known, 2);
        assert_eq!(summary.obsoleted, 1);
    }

    #[test]
    fn test_alien_does_not_override_existing_translation() {
        let vernacular = Catalog::from_messages(vec![
            Message::new("Dialog", "Save", "").with_translation("Sichern"),
        ]);
        let virgin = Catalog::from_messages(vec![Message::new("Dialog", "Save", "")]);
        let alien = Catalog::from_messages(vec![
            Message::new("Dialog", "Save", "").with_translation("Speichern"),
        ]);

        let (out, _) = merge(&vernacular, &virgin, &[alien], &exact_only());
        assert_eq!(out.message_count(), 1);
        assert_eq!(out.message(0).translation(), "Sichern");
    }

    #[test]
    fn test_same_text_heuristic() {
        let mut catalog = Catalog::from_messages(vec![
            Message::new("A", "Enabled:", "").with_translation("Eingeschaltet:"),
            Message::new("B", "Enabled:", ""),
            Message::new("C", "Name", "").with_translation("Name"),
            Message::new("D", "Name", "").with_translation("Benennung"),
            Message::new("E", "Name", ""),
            // Finished but empty messages are left alone
            Message::new("F", "Enabled:", "").with_type(MessageType::Finished),
        ]);

        assert_eq!(apply_same_text_heuristic(&mut catalog), 1);
        assert_eq!(catalog.message(1).translation(), "Eingeschaltet:");
        assert!(!catalog.message(4).is_translated());
        assert!(!catalog.message(5).is_translated());
    }

    #[test]
    fn test_same_text_exclusion_is_permanent() {
        let mut catalog = Catalog::from_messages(vec![
            Message::new("A", "Name", "").with_translation("Name"),
            Message::new("B", "Name", "").with_translation("Benennung"),
            Message::new("C", "Name", "").with_translation("Name"),
            Message::new("D", "Name", ""),
        ]);
        assert_eq!(apply_same_text_heuristic(&mut catalog), 0);
        assert!(!catalog.message(3).is_translated());
    }

    #[test]
    fn test_no_obsolete_strips_result() {
        let vernacular = Catalog::from_messages(vec![
            Message::new("", "Gone", "").with_type(MessageType::Finished),
            Message::new("", "Kept", "").with_type(MessageType::Finished),
        ]);
        let virgin = Catalog::from_messages(vec![Message::new("", "Kept", "")]);

        let options = exact_only().with_no_obsolete(true);
        let (out, summary) = merge(&vernacular, &virgin, &[], &options);
        assert_eq!(out.message_count(), 1);
        assert_eq!(out.message(0).source_text(), "Kept");
        assert!(summary.to_string().contains("Removed 1 obsolete entries"));
    }

    #[test]
    fn test_summary_text() {
        let summary = MergeSummary {
            new: 2,
            known: 5,
            obsoleted: 1,
            similar_text_hits: 1,
            same_text_hits: 3,
            obsolete_dropped: false,
        };
        assert_eq!(
            summary.to_string(),
            "    Found 7 source text(s) (2 new and 5 already existing)\n\
             \x20   Kept 1 obsolete entries\n\
             \x20   Same-text heuristic provided 3 translation(s)\n\
             \x20   Similar-text heuristic provided 1 translation(s)\n"
        );
    }

    #[test]
    fn test_options_from_json() {
        let options = MergeOptions::from_json(r#"{ "similar-text": false, "no-obsolete": true }"#)
            .expect("valid options");
        assert!(!options.similar_text);
        assert!(options.same_text);
        assert!(options.no_obsolete);
        assert!(MergeOptions::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_inputs_are_not_modified() {
        let vernacular = Catalog::from_messages(vec![
            Message::new("", "Save", "").with_type(MessageType::Finished),
        ]);
        let virgin = Catalog::from_messages(vec![Message::new("", "Open", "")]);
        let before_vernacular = vernacular.messages().to_vec();
        let before_virgin = virgin.messages().to_vec();

        let _ = merge(&vernacular, &virgin, &[], &MergeOptions::default());
        assert_eq!(vernacular.messages(), before_vernacular.as_slice());
        assert_eq!(virgin.messages(), before_virgin.as_slice());
    }
}
