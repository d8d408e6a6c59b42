use std::path::PathBuf;

/// Errors raised while discovering locales, loading catalogs or translating files
#[derive(Debug, thiserror::Error)]
pub enum I18nError {
    /// `localeDirs` was configured as an empty list
    #[error("No locale directories configured")]
    NoLocaleDirs,
    /// The first locale directory could not be listed
    #[error("Failed to read locale directory '{}': {source}", .path.display())]
    LocaleDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A catalog file exists but is not a valid PO file
    #[error("Failed to parse catalog '{}': {message}", .path.display())]
    CatalogParse { path: PathBuf, message: String },
    /// No merged catalog is known for the requested locale
    #[error("Unable to find a translation catalog for {0}")]
    MissingCatalog(String),
    /// The input file carries no contents
    #[error("No file found: {}", .0.display())]
    MissingFile(PathBuf),
    /// A callback-style handler dropped its completion without delivering a result
    #[error("Handler for '{}' never completed for locale {locale}", .path.display())]
    HandlerDropped { path: PathBuf, locale: String },
    /// Invalid configuration file
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for translation operations
pub type I18nResult<T> = Result<T, I18nError>;
