use crate::config::Options;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A template file fed into the translator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Location of the file
    pub path: PathBuf,
    /// Directory that output paths are computed relative to
    pub base: PathBuf,
    /// Raw contents; `None` when the file could not be provided
    pub contents: Option<Vec<u8>>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        SourceFile {
            path: path.into(),
            base: PathBuf::new(),
            contents: Some(contents.into()),
        }
    }

    /// A file without contents
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        SourceFile {
            path: path.into(),
            base: PathBuf::new(),
            contents: None,
        }
    }

    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = base.into();
        self
    }

    /// Read `path` from disk
    pub async fn read(path: &Path, base: &Path) -> std::io::Result<Self> {
        let contents = tokio::fs::read(path).await?;
        Ok(SourceFile::new(path, contents).with_base(base))
    }

    /// The extension including its leading dot, e.g. `.html`
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
    }

    /// Path relative to `base`, or just the file name when the path lies outside of it
    pub fn relative(&self) -> PathBuf {
        match self.path.strip_prefix(&self.base) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
            _ => self
                .path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| self.path.clone()),
        }
    }
}

/// The translation of one source file into one locale
#[derive(Debug, Clone, Serialize)]
pub struct TranslatedFile {
    /// Path of the source file this was produced from
    pub source: PathBuf,
    #[serde(skip)]
    base: PathBuf,
    #[serde(skip)]
    relative: PathBuf,
    /// Normalized locale (`pt-br`, not `pt_BR`)
    pub lang: String,
    /// Translated text; `None` when no handler was registered for the file kind
    pub translation: Option<String>,
    /// Options of the translator that produced this file
    #[serde(skip)]
    pub options: Arc<Options>,
}

impl TranslatedFile {
    pub fn new(
        file: &SourceFile,
        lang: &str,
        translation: Option<String>,
        options: Arc<Options>,
    ) -> Self {
        TranslatedFile {
            source: file.path.clone(),
            base: file.base.clone(),
            relative: file.relative(),
            lang: lang.to_string(),
            translation,
            options,
        }
    }

    /// `<lang>/<path relative to base>`
    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.lang).join(&self.relative)
    }

    /// `<base>/<lang>/<path relative to base>`
    pub fn path(&self) -> PathBuf {
        self.base.join(self.relative_path())
    }

    pub fn contents(&self) -> Option<&[u8]> {
        self.translation.as_deref().map(str::as_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_has_dot() {
        assert_eq!(
            SourceFile::new("site/index.html", "").extension().as_deref(),
            Some(".html")
        );
        assert_eq!(SourceFile::new("Makefile", "").extension(), None);
    }

    #[test]
    fn test_translated_path_inserts_locale() {
        let file = SourceFile::new("site/pages/about.html", "").with_base("site");
        let translated = TranslatedFile::new(
            &file,
            "pt-br",
            Some("x".to_string()),
            Arc::new(Options::default()),
        );
        assert_eq!(
            translated.relative_path(),
            PathBuf::from("pt-br/pages/about.html")
        );
        assert_eq!(translated.path(), PathBuf::from("site/pt-br/pages/about.html"));
        assert_eq!(translated.contents(), Some("x".as_bytes()));
    }

    #[test]
    fn test_path_outside_base_uses_file_name() {
        let file = SourceFile::new("/tmp/other/index.html", "").with_base("site");
        assert_eq!(file.relative(), PathBuf::from("index.html"));
    }

    #[test]
    fn test_serializes_without_options() {
        let file = SourceFile::new("index.html", "");
        let translated =
            TranslatedFile::new(&file, "fr", Some("Bonjour".to_string()), Arc::default());
        let json = serde_json::to_value(&translated).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "source": "index.html",
                "lang": "fr",
                "translation": "Bonjour"
            })
        );
    }

    #[tokio::test]
    async fn test_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, "<p>Hello</p>").unwrap();

        let file = SourceFile::read(&path, dir.path()).await.unwrap();
        assert_eq!(file.contents.as_deref(), Some("<p>Hello</p>".as_bytes()));
        assert_eq!(file.relative(), PathBuf::from("index.html"));
    }
}
