//! Fixtures shared by the unit tests

use crate::catalog::catalog_path;
use std::fs;
use std::path::Path;

/// Write a singular-only `messages.po` for `locale` under `root`
///
/// The header only declares `Content-Type`, like many hand-written catalogs.
pub fn write_po(root: &Path, locale: &str, entries: &[(&str, &str)]) {
    let mut po =
        String::from("msgid \"\"\nmsgstr \"\"\n\"Content-Type: text/plain; charset=UTF-8\\n\"\n\n");
    for (msgid, msgstr) in entries {
        po.push_str(&format!(
            "msgid \"{}\"\nmsgstr \"{}\"\n\n",
            escape(msgid),
            escape(msgstr)
        ));
    }
    write_catalog(root, locale, &po);
}

/// Write `messages.po` for `locale` under `root` verbatim
pub fn write_catalog(root: &Path, locale: &str, text: &str) {
    let path = catalog_path(root, locale);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
}

/// A temporary locale root
pub struct LocaleTree {
    pub dir: tempfile::TempDir,
}

impl LocaleTree {
    pub fn new() -> Self {
        LocaleTree {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A locale directory with a catalog
    pub fn locale(self, locale: &str, entries: &[(&str, &str)]) -> Self {
        write_po(self.path(), locale, entries);
        self
    }

    /// A locale directory without a catalog
    pub fn dir(self, name: &str) -> Self {
        fs::create_dir_all(self.path().join(name)).unwrap();
        self
    }
}
