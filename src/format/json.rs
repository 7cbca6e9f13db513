//! JSON catalog codec.
//!
//! The whole catalog is one JSON object:
//!
//! ```json
//! {
//!     "language": "de_DE",
//!     "source-language": "en",
//!     "locations": "absolute",
//!     "messages": [
//!         {
//!             "context": "Dialog",
//!             "source-text": "Save",
//!             "translations": ["Speichern"],
//!             "type": "finished",
//!             "references": [{ "file": "dialog.cpp", "line": 42 }]
//!         }
//!     ]
//! }
//! ```

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, LocationsType};
use crate::conversion::ConversionContext;
use crate::error::{CatalogError, CatalogResult};
use crate::message::{ExtraData, Message};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CatalogDocument {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    language: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    source_language: String,
    #[serde(default)]
    locations: LocationsType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "ExtraData::is_empty")]
    extras: ExtraData,
    #[serde(default)]
    messages: Vec<Message>,
}

pub fn load_json(reader: &mut dyn Read, cd: &mut ConversionContext) -> CatalogResult<Catalog> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    let document: CatalogDocument = serde_json::from_str(&content).map_err(|e| {
        CatalogError::Malformed(format!("{}: {}", cd.source_file_name, e))
    })?;

    tracing::debug!(
        messages = document.messages.len(),
        language = %document.language,
        "loaded JSON catalog"
    );

    let mut catalog = Catalog::from_messages(document.messages);
    catalog.set_language_code(document.language);
    catalog.set_source_language_code(document.source_language);
    catalog.set_locations_type(document.locations);
    catalog.set_dependencies(document.dependencies);
    catalog.set_extras(document.extras);
    Ok(catalog)
}

pub fn save_json(
    catalog: &Catalog,
    writer: &mut dyn Write,
    _cd: &mut ConversionContext,
) -> CatalogResult<()> {
    let document = CatalogDocument {
        language: catalog.language_code().to_string(),
        source_language: catalog.source_language_code().to_string(),
        locations: catalog.locations_type(),
        dependencies: catalog.dependencies().to_vec(),
        extras: catalog.extras().clone(),
        messages: catalog.messages().to_vec(),
    };
    serde_json::to_writer_pretty(&mut *writer, &document)?;
    writer.write_all(b"\n")?;
    Ok(())
}
