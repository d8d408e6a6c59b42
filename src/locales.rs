use crate::error::{I18nError, I18nResult};
use once_cell::sync::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Normalize a locale identifier for output naming
///
/// Lower-cases the identifier and replaces underscores with hyphens:
/// - `pt_BR` → `pt-br`
/// - `zh_Hans_CN` → `zh-hans-cn`
/// - `fa` → `fa` (unchanged)
///
/// Catalogs stay keyed by the identifier as discovered on disk; only output
/// paths and handler arguments use the normalized form.
pub fn normalize_locale(locale: &str) -> String {
    locale.to_lowercase().replace('_', "-")
}

/// The list of supported locales, discovered once from the first locale root
pub struct LocaleRegistry {
    root: Option<PathBuf>,
    default_lang: String,
    locales: OnceCell<Vec<String>>,
}

impl LocaleRegistry {
    pub fn new(root: Option<PathBuf>, default_lang: &str) -> Self {
        LocaleRegistry {
            root,
            default_lang: default_lang.to_string(),
            locales: OnceCell::new(),
        }
    }

    /// Locale identifiers in directory order, the default locale last
    ///
    /// The result is cached after the first successful scan.
    ///
    /// # Errors
    /// - No locale root configured
    /// - The locale root is missing or not readable
    pub fn locales(&self) -> I18nResult<&[String]> {
        self.locales
            .get_or_try_init(|| self.scan())
            .map(Vec::as_slice)
    }

    fn scan(&self) -> I18nResult<Vec<String>> {
        let root = self.root.as_deref().ok_or(I18nError::NoLocaleDirs)?;
        let mut locales = discover_locales(root)?;
        // Appended even when the directory listing already contains it
        locales.push(self.default_lang.clone());
        debug!(root = %root.display(), ?locales, "discovered locales");
        Ok(locales)
    }
}

/// List the locale subdirectories of `root`
///
/// Entries whose name contains `template` are skipped, as are plain files.
/// Names are returned sorted so the order does not depend on the file system.
fn discover_locales(root: &Path) -> I18nResult<Vec<String>> {
    let dir_error = |source| I18nError::LocaleDir {
        path: root.to_path_buf(),
        source,
    };

    let mut locales = Vec::new();
    for entry in fs::read_dir(root).map_err(dir_error)? {
        let entry = entry.map_err(dir_error)?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.contains("template") {
            continue;
        }
        // Follows symlinks, like a stat of the joined path
        if fs::metadata(root.join(&name)).map_err(dir_error)?.is_dir() {
            locales.push(name);
        }
    }
    locales.sort();
    Ok(locales)
}
