/// Error types for catalog loading, saving and locale handling.
///
/// Merge and duplicate resolution never fail as a whole; per-message problems
/// are accumulated in a [`crate::ConversionContext`] instead.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Error reading or writing a catalog stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error in the JSON codec
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No registered format matches the requested one
    #[error("Unknown format {format} for file {file}")]
    UnknownFormat { format: String, file: String },

    /// The format is registered but cannot be read
    #[error("No loader for format {0} found")]
    NoLoader(String),

    /// The format is registered but cannot be written
    #[error("Cannot save {0} files")]
    NoSaver(String),

    /// A language code could not be parsed
    #[error("Invalid language code: {0}")]
    InvalidLocale(String),

    /// Plural rules could not be loaded for a language
    #[error("Plural rules error: {0}")]
    PluralRules(String),

    /// The persisted catalog is structurally broken
    #[error("Malformed catalog: {0}")]
    Malformed(String),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatalogError::UnknownFormat {
            format: "xlf".to_string(),
            file: "app_de.xlf".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown format xlf for file app_de.xlf");
        assert_eq!(
            CatalogError::NoSaver("qm".to_string()).to_string(),
            "Cannot save qm files"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        fn open() -> CatalogResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        match open() {
            Err(CatalogError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }
}
