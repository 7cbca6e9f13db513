//! Translation catalog reconciliation
//!
//! This crate keeps translation catalogs in step with the source code they
//! translate. A catalog holds the translatable messages of one program in one
//! target language; when developers add, change or remove strings, the
//! existing catalog is merged with the freshly extracted one so translators
//! keep their work and see exactly what changed.
//!
//! # Workflow Example
//!
//! ```ignore
//! use catalog_merge::{ConversionContext, FormatRegistry, MergeOptions, merge};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = FormatRegistry::with_builtin_formats();
//!     let mut cd = ConversionContext::new();
//!
//!     // 1. Load the translated catalog and the extracted one
//!     let mut vernacular = registry.load(Path::new("app_de.json"), "auto", &mut cd)?;
//!     let virgin = registry.load(Path::new("extracted.json"), "auto", &mut cd)?;
//!
//!     // 2. Collapse duplicates before matching
//!     let dups = vernacular.resolve_duplicates();
//!     eprint!("{}", vernacular.duplicates_report(&dups, "app_de.json", false));
//!
//!     // 3. Merge and fit plural translations to the target language
//!     let (mut merged, summary) = merge(&vernacular, &virgin, &[], &MergeOptions::default());
//!     merged.normalize_translations_for_language(&mut cd);
//!
//!     // 4. Save
//!     registry.save(&merged, Path::new("app_de.json"), "auto", &mut cd)?;
//!     print!("{}", summary);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod conversion;
pub mod error;
pub mod format;
pub mod merge;
pub mod message;
pub mod plurals;
pub mod similarity;


// Re-export main types for convenient access
pub use catalog::{Catalog, DuplicateEntries, Duplicates, LocationsType};
pub use conversion::ConversionContext;
pub use error::{CatalogError, CatalogResult};
pub use format::{FileFormat, FileType, FormatRegistry};
pub use merge::{MergeOptions, MergeSummary, apply_same_text_heuristic, merge};
pub use message::{ExtraData, Message, MessageType, Reference};
pub use plurals::{get_plural_forms_for_language, plural_form_count};
pub use similarity::{
    Candidate, MAX_SIMILARITY_SCORE, StringSimilarityMatcher, TEXT_SIMILARITY_THRESHOLD,
    similar_text_candidates, similarity_score,
};
