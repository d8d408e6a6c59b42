//! Static site translation with gettext catalogs
//!
//! Given a template file and the PO catalogs under one or more locale
//! directories, produce one translated copy of the file per locale.
//!
//! ```text
//! locale/
//! ├── fr/LC_MESSAGES/messages.po
//! └── pt_BR/LC_MESSAGES/messages.po
//! ```
//!
//! Locales are the subdirectories of the first locale directory plus the
//! configured default locale. Catalogs of the same locale found in several
//! locale directories are merged, the first directory winning on conflicts.
//!
//! Templates are not parsed: catalog source strings are replaced wherever
//! they appear between quote, slash or angle-bracket delimiters. See
//! [`substitution`] for the exact rules.

pub mod catalog;
pub mod config;
pub mod error;
pub mod file;
pub mod handlers;
pub mod locales;
pub mod lookup;
pub mod substitution;
pub mod translator;

#[cfg(test)]
mod test_support;

// Re-export main types for convenient access
pub use catalog::{Catalog, CatalogStore, TranslationRecord};
pub use config::Options;
pub use error::{I18nError, I18nResult};
pub use file::{SourceFile, TranslatedFile};
pub use handlers::{Done, Handler};
pub use locales::{LocaleRegistry, normalize_locale};
pub use lookup::Lookup;
pub use substitution::{Matching, substitute, substitute_then};
pub use translator::{ChannelSink, Event, PLUGIN_ID, Sink, TranslationStream, Translator};
