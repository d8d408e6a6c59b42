use crate::error::{I18nError, I18nResult};
use crate::locales::LocaleRegistry;
use once_cell::sync::OnceCell;
use polib::po_file;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::panic;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Translated variants for one source string
///
/// Singular messages hold a single variant, plural messages hold one per
/// `msgstr[n]`. The first variant is the authoritative translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationRecord {
    pub msgstr: Vec<String>,
}

impl TranslationRecord {
    pub fn new(msgstr: Vec<String>) -> Self {
        TranslationRecord { msgstr }
    }

    pub fn singular(msgstr: &str) -> Self {
        TranslationRecord {
            msgstr: vec![msgstr.to_string()],
        }
    }

    /// The first variant, if present and non-empty
    pub fn translation(&self) -> Option<&str> {
        self.msgstr
            .first()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Message catalog for one locale: source string → translation record
///
/// Entries keep their insertion order, which is the order of the PO file
/// they were read from.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<(String, TranslationRecord)>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Insert or replace the record for `msgid`
    pub fn with_message(&mut self, msgid: &str, record: TranslationRecord) -> &mut Self {
        match self.index.get(msgid) {
            Some(&i) => self.entries[i].1 = record,
            None => {
                self.index.insert(msgid.to_string(), self.entries.len());
                self.entries.push((msgid.to_string(), record));
            }
        }
        self
    }

    pub fn get(&self, msgid: &str) -> Option<&TranslationRecord> {
        self.index.get(msgid).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, msgid: &str) -> bool {
        self.index.contains_key(msgid)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TranslationRecord)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add every entry of `other` whose key is not present yet
    ///
    /// Existing keys are never overwritten, so merging catalogs left to right
    /// gives precedence to the earliest one.
    pub fn merge_defaults(&mut self, other: Catalog) {
        for (msgid, record) in other.entries {
            if !self.contains(&msgid) {
                self.with_message(&msgid, record);
            }
        }
    }

    /// Read the top-level (context-free) messages of a PO file
    ///
    /// The header may be partial or missing; absent keys get neutral values
    /// before the file is handed to the PO parser.
    ///
    /// # Errors
    /// - File read errors
    /// - Invalid PO syntax
    pub fn load(path: &Path) -> I18nResult<Catalog> {
        let parse_error = |message: String| I18nError::CatalogParse {
            path: path.to_path_buf(),
            message,
        };

        let text = fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;
        let mut staged = tempfile::NamedTempFile::new().map_err(|e| parse_error(e.to_string()))?;
        staged
            .write_all(with_complete_header(&text).as_bytes())
            .and_then(|_| staged.flush())
            .map_err(|e| parse_error(e.to_string()))?;

        let staged_path = staged.path().to_path_buf();
        let po = match panic::catch_unwind(move || po_file::parse(&staged_path)) {
            Ok(parsed) => parsed.map_err(|e| parse_error(e.to_string()))?,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "PO parser panicked".to_string());
                return Err(parse_error(message));
            }
        };

        let mut catalog = Catalog::new();
        for message in po.messages() {
            if message.msgid().is_empty() || !message.msgctxt().is_empty() {
                continue;
            }
            let msgstr = if message.is_plural() {
                message.msgstr_plural().cloned().unwrap_or_default()
            } else {
                message
                    .msgstr()
                    .map(|s| vec![s.to_string()])
                    .unwrap_or_default()
            };
            catalog.with_message(message.msgid(), TranslationRecord::new(msgstr));
        }
        Ok(catalog)
    }
}

/// Header keys the PO parser insists on, with the values used when absent
const HEADER_DEFAULTS: [(&str, &str); 10] = [
    ("Project-Id-Version", "PACKAGE VERSION"),
    ("POT-Creation-Date", ""),
    ("PO-Revision-Date", ""),
    ("Last-Translator", ""),
    ("Language-Team", ""),
    ("MIME-Version", "1.0"),
    ("Content-Type", "text/plain; charset=UTF-8"),
    ("Content-Transfer-Encoding", "8bit"),
    ("Language", ""),
    ("Plural-Forms", "nplurals=1; plural=0;"),
];

/// Rewrite PO text so that it starts with a header carrying every required key
///
/// Keys present in the file's own header keep their values, except an
/// unparsable `Plural-Forms`. Everything after the header is left untouched.
fn with_complete_header(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let blocks: Vec<&[&str]> = lines
        .split(|line| line.is_empty())
        .filter(|block| !block.is_empty())
        .collect();

    let first = blocks
        .iter()
        .position(|block| block.iter().any(|line| line.starts_with("msgid ")));
    let header = first.filter(|&i| {
        field(blocks[i], "msgid ").is_some_and(|id| id.is_empty())
            && field(blocks[i], "msgctxt ").is_none()
    });

    let mut values: Vec<(String, String)> = HEADER_DEFAULTS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    if let Some(raw) = header.and_then(|i| field(blocks[i], "msgstr ")) {
        for entry in raw.split("\\n") {
            let Some((key, value)) = entry.split_once(':') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key == "Plural-Forms" && !valid_plural_forms(value) {
                warn!(rules = value, "ignoring unparsable Plural-Forms");
                continue;
            }
            match values.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1 = value.to_string(),
                None => values.push((key.to_string(), value.to_string())),
            }
        }
    }

    let mut out = String::from("msgid \"\"\nmsgstr \"\"\n");
    for (key, value) in &values {
        out.push_str(&format!("\"{}: {}\\n\"\n", key, value));
    }
    let body = match header {
        Some(i) => &blocks[i + 1..],
        None => &blocks[..],
    };
    for block in body {
        out.push('\n');
        for line in *block {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// The still-escaped value of `keyword` in one PO entry, continuation lines included
fn field(block: &[&str], keyword: &str) -> Option<String> {
    let start = block.iter().position(|line| line.starts_with(keyword))?;
    let mut value = unquote(&block[start][keyword.len()..]).to_string();
    for line in block[start + 1..].iter().take_while(|line| line.starts_with('"')) {
        value.push_str(unquote(line));
    }
    Some(value)
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

/// `nplurals=<n>; plural=<expr>;` with a non-zero count and nothing else
fn valid_plural_forms(rules: &str) -> bool {
    let mut nplurals = None;
    let mut expr = None;
    for rule in rules.split(';').map(str::trim).filter(|r| !r.is_empty()) {
        match rule.split_once('=') {
            Some(("nplurals", n)) => match n.parse::<usize>() {
                Ok(n) if n > 0 => nplurals = Some(n),
                _ => return false,
            },
            Some(("plural", e)) if !e.is_empty() => expr = Some(e),
            _ => return false,
        }
    }
    nplurals.is_some() && expr.is_some()
}

/// Path of the catalog for `locale` under one locale root
pub fn catalog_path(root: &Path, locale: &str) -> PathBuf {
    root.join(locale).join("LC_MESSAGES").join("messages.po")
}

/// Load the catalog of `locale` from one root; a missing file is an empty catalog
fn load_from_root(root: &Path, locale: &str) -> I18nResult<Catalog> {
    let path = catalog_path(root, locale);
    if !path.is_file() {
        return Ok(Catalog::new());
    }
    Catalog::load(&path)
}

/// Merged catalogs for every registered locale, computed on first access
pub struct CatalogStore {
    locale_dirs: Vec<PathBuf>,
    registry: LocaleRegistry,
    catalogs: OnceCell<HashMap<String, Catalog>>,
}

impl CatalogStore {
    pub fn new(locale_dirs: Vec<PathBuf>, default_lang: &str) -> Self {
        let registry = LocaleRegistry::new(locale_dirs.first().cloned(), default_lang);
        CatalogStore {
            locale_dirs,
            registry,
            catalogs: OnceCell::new(),
        }
    }

    pub fn locales(&self) -> I18nResult<&[String]> {
        self.registry.locales()
    }

    /// Locale identifier → merged catalog, for every registered locale
    ///
    /// # Errors
    /// - Locale discovery failures
    /// - Unreadable or invalid catalog files
    pub fn catalogs(&self) -> I18nResult<&HashMap<String, Catalog>> {
        self.catalogs.get_or_try_init(|| {
            let mut catalogs = HashMap::new();
            for locale in self.registry.locales()? {
                let catalog = self.merge_locale(locale)?;
                debug!(locale = %locale, messages = catalog.len(), "loaded catalog");
                catalogs.insert(locale.clone(), catalog);
            }
            Ok(catalogs)
        })
    }

    /// The merged catalog of a registered (not normalized) locale identifier
    ///
    /// # Errors
    /// - `MissingCatalog` when `lang` is not a registered locale
    pub fn catalog(&self, lang: &str) -> I18nResult<&Catalog> {
        match self.catalogs()?.get(lang) {
            Some(catalog) => Ok(catalog),
            None => {
                warn!(lang, "no translation catalog");
                Err(I18nError::MissingCatalog(lang.to_string()))
            }
        }
    }

    fn merge_locale(&self, locale: &str) -> I18nResult<Catalog> {
        let mut merged = Catalog::new();
        for root in &self.locale_dirs {
            merged.merge_defaults(load_from_root(root, locale)?);
        }
        Ok(merged)
    }
}
