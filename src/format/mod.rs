//! Registry of catalog file formats.
//!
//! A [`FormatRegistry`] is an ordinary value owned by the caller. Formats
//! are looked up by their extension; `"auto"` picks the format from the file
//! name.

mod json;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::catalog::Catalog;
use crate::conversion::ConversionContext;
use crate::error::{CatalogError, CatalogResult};

pub use json::{load_json, save_json};

/// Format used when the file name has no registered extension
pub const DEFAULT_FORMAT: &str = "json";

pub type LoadFn = fn(&mut dyn Read, &mut ConversionContext) -> CatalogResult<Catalog>;
pub type SaveFn = fn(&Catalog, &mut dyn Write, &mut ConversionContext) -> CatalogResult<()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Editable catalogs carrying source text
    TranslationSource,
    /// Compiled catalogs for runtime lookup
    TranslationBinary,
}

#[derive(Debug, Clone)]
pub struct FileFormat {
    pub extension: String,
    pub description: String,
    pub file_type: FileType,
    /// Higher priorities are listed first within a file type
    pub priority: i32,
    pub loader: Option<LoadFn>,
    pub saver: Option<SaveFn>,
}

#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    formats: Vec<FileFormat>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in JSON codec.
    pub fn with_builtin_formats() -> Self {
        let mut registry = Self::new();
        registry.register(FileFormat {
            extension: "json".to_string(),
            description: "JSON translation catalogs".to_string(),
            file_type: FileType::TranslationSource,
            priority: 0,
            loader: Some(load_json),
            saver: Some(save_json),
        });
        registry
    }

    /// Adds a format ahead of formats of the same type with lower priority.
    pub fn register(&mut self, format: FileFormat) {
        let pos = self
            .formats
            .iter()
            .position(|f| f.file_type == format.file_type && f.priority < format.priority)
            .unwrap_or(self.formats.len());
        self.formats.insert(pos, format);
    }

    pub fn formats(&self) -> &[FileFormat] {
        &self.formats
    }

    pub fn format(&self, extension: &str) -> Option<&FileFormat> {
        self.formats.iter().find(|f| f.extension == extension)
    }

    /// Resolves `"auto"` to the format whose extension ends `file_name`.
    /// Any other value is returned as is.
    pub fn guess_format(&self, file_name: &str, format: &str) -> String {
        if format != "auto" {
            return format.to_string();
        }
        self.formats
            .iter()
            .find(|f| file_name.ends_with(&format!(".{}", f.extension)))
            .map(|f| f.extension.clone())
            .unwrap_or_else(|| DEFAULT_FORMAT.to_string())
    }

    fn loader_for(&self, file_name: &str, format: &str) -> CatalogResult<LoadFn> {
        let format = self.guess_format(file_name, format);
        let entry = self.format(&format).ok_or_else(|| CatalogError::UnknownFormat {
            format: format.clone(),
            file: file_name.to_string(),
        })?;
        entry.loader.ok_or(CatalogError::NoLoader(format))
    }

    fn saver_for(&self, file_name: &str, format: &str) -> CatalogResult<SaveFn> {
        let format = self.guess_format(file_name, format);
        let entry = self.format(&format).ok_or_else(|| CatalogError::UnknownFormat {
            format: format.clone(),
            file: file_name.to_string(),
        })?;
        entry.saver.ok_or(CatalogError::NoSaver(format))
    }

    /// Loads a catalog from `path`; `-` reads standard input.
    pub fn load(
        &self,
        path: &Path,
        format: &str,
        cd: &mut ConversionContext,
    ) -> CatalogResult<Catalog> {
        let file_name = path.to_string_lossy();
        let loader = self.loader_for(&file_name, format)?;
        cd.source_file_name = file_name.to_string();
        cd.source_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        tracing::debug!(file = %file_name, "loading catalog");

        if file_name == "-" {
            let stdin = io::stdin();
            let mut reader = stdin.lock();
            return loader(&mut reader, cd);
        }
        let mut reader = BufReader::new(File::open(path)?);
        loader(&mut reader, cd)
    }

    /// Saves a catalog to `path`; `-` writes standard output.
    pub fn save(
        &self,
        catalog: &Catalog,
        path: &Path,
        format: &str,
        cd: &mut ConversionContext,
    ) -> CatalogResult<()> {
        let file_name = path.to_string_lossy();
        let saver = self.saver_for(&file_name, format)?;
        cd.target_file_name = file_name.to_string();
        cd.target_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        tracing::debug!(file = %file_name, messages = catalog.message_count(), "saving catalog");

        if file_name == "-" {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            saver(catalog, &mut writer, cd)?;
            writer.flush()?;
            return Ok(());
        }
        let mut writer = BufWriter::new(File::create(path)?);
        saver(catalog, &mut writer, cd)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load_from_reader(
        &self,
        reader: &mut dyn Read,
        format: &str,
        cd: &mut ConversionContext,
    ) -> CatalogResult<Catalog> {
        let loader = self.loader_for("", format)?;
        loader(reader, cd)
    }

    pub fn save_to_writer(
        &self,
        catalog: &Catalog,
        writer: &mut dyn Write,
        format: &str,
        cd: &mut ConversionContext,
    ) -> CatalogResult<()> {
        let saver = self.saver_for("", format)?;
        saver(catalog, writer, cd)
    }
}
