//! Translation of whole files into every configured locale
//!
//! # Example
//!
//! ```ignore
//! use static_i18n::{Options, SourceFile, Translator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let translator = Translator::with_builtin_handlers(Options::default());
//!     let file = SourceFile::new("site/index.html", "<h1>Hello</h1>").with_base("site");
//!
//!     for translated in translator.translate(&file).await? {
//!         println!("{} -> {}", translated.lang, translated.path().display());
//!     }
//!     Ok(())
//! }
//! ```

use crate::catalog::{Catalog, CatalogStore};
use crate::config::Options;
use crate::error::{I18nError, I18nResult};
use crate::file::{SourceFile, TranslatedFile};
use crate::handlers::{Done, Handler, builtin_handlers};
use crate::locales::normalize_locale;
use crate::lookup::Lookup;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Identifies the translator in error events
pub const PLUGIN_ID: &str = "static-i18n/translator";

/// Receiver of everything a translation produces
pub trait Sink {
    /// One translated file, in locale order
    fn push(&mut self, file: TranslatedFile);

    /// A recoverable error. Returning `Err` aborts the current translation.
    fn error(&mut self, error: I18nError) -> I18nResult<()>;

    /// Every locale of `file` has been handled
    fn translated(&mut self, file: &SourceFile);
}

/// Collects translated files; any error aborts
#[derive(Debug, Default)]
struct Collect(Vec<TranslatedFile>);

impl Sink for Collect {
    fn push(&mut self, file: TranslatedFile) {
        self.0.push(file);
    }

    fn error(&mut self, error: I18nError) -> I18nResult<()> {
        Err(error)
    }

    fn translated(&mut self, _file: &SourceFile) {}
}

/// Items produced by [`Translator::stream`]
#[derive(Debug)]
pub enum Event {
    File(TranslatedFile),
    Error {
        plugin: &'static str,
        error: I18nError,
    },
    /// Every locale of the source file has been handled
    Translated(SourceFile),
}

/// Forwards everything into an unbounded event channel
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Event>,
    completion_delay: Option<Duration>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<Event>, completion_delay: Option<Duration>) -> Self {
        ChannelSink {
            tx,
            completion_delay,
        }
    }

    fn send(&self, event: Event) {
        if self.tx.send(event).is_err() {
            debug!("event receiver dropped");
        }
    }
}

impl Sink for ChannelSink {
    fn push(&mut self, file: TranslatedFile) {
        self.send(Event::File(file));
    }

    fn error(&mut self, error: I18nError) -> I18nResult<()> {
        self.send(Event::Error {
            plugin: PLUGIN_ID,
            error,
        });
        Ok(())
    }

    fn translated(&mut self, file: &SourceFile) {
        match self.completion_delay {
            None => self.send(Event::Translated(file.clone())),
            Some(delay) => {
                let tx = self.tx.clone();
                let file = file.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(Event::Translated(file));
                });
            }
        }
    }
}

/// Both ends of a running translation stream
pub struct TranslationStream {
    /// Files to translate; drop it to end the stream
    pub files: mpsc::UnboundedSender<SourceFile>,
    pub events: mpsc::UnboundedReceiver<Event>,
    pub task: JoinHandle<()>,
}

pub struct Translator {
    options: Arc<Options>,
    handlers: HashMap<String, Handler>,
    store: CatalogStore,
}

impl Translator {
    /// A translator without any handlers; every file kind gets the null handler
    pub fn new(options: Options) -> Self {
        let store = CatalogStore::new(options.locale_dirs.clone(), &options.default_lang);
        Translator {
            options: Arc::new(options),
            handlers: HashMap::new(),
            store,
        }
    }

    /// A translator with the markup, template and JSON handlers registered
    pub fn with_builtin_handlers(options: Options) -> Self {
        let mut translator = Translator::new(options);
        for (extensions, handler) in builtin_handlers() {
            translator.register(extensions, handler);
        }
        translator
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Use `handler` for every extension in `extensions` (with leading dot)
    pub fn register(&mut self, extensions: &[&str], handler: Handler) -> &mut Self {
        for ext in extensions {
            self.handlers.insert(ext.to_string(), handler.clone());
        }
        self
    }

    pub fn handler_for(&self, file: &SourceFile) -> Handler {
        file.extension()
            .and_then(|ext| self.handlers.get(&ext))
            .cloned()
            .unwrap_or_else(Handler::null)
    }

    pub fn locales(&self) -> I18nResult<&[String]> {
        self.store.locales()
    }

    pub fn catalogs(&self) -> I18nResult<&HashMap<String, Catalog>> {
        self.store.catalogs()
    }

    pub fn catalog(&self, lang: &str) -> I18nResult<&Catalog> {
        self.store.catalog(lang)
    }

    /// Translate `msgid` into `lang`, falling back to `msgid`
    ///
    /// The empty string is returned without consulting any catalog.
    pub fn lang_gettext(&self, lang: &str, msgid: &str) -> I18nResult<String> {
        if msgid.is_empty() {
            return Ok(String::new());
        }
        Ok(Lookup::new(lang, self.catalog(lang)?).gettext(msgid))
    }

    /// [`Translator::lang_gettext`] for arbitrary JSON values; anything but
    /// a non-empty string passes through unchanged
    pub fn lang_gettext_value(&self, lang: &str, value: &Value) -> I18nResult<Value> {
        match value {
            Value::String(s) if !s.is_empty() => {
                Ok(Lookup::new(lang, self.catalog(lang)?).gettext_value(value))
            }
            other => Ok(other.clone()),
        }
    }

    /// File contents as text, invalid UTF-8 replaced
    pub fn read_file(&self, file: &SourceFile) -> I18nResult<String> {
        let contents = file
            .contents
            .as_deref()
            .ok_or_else(|| I18nError::MissingFile(file.path.clone()))?;
        let text = String::from_utf8_lossy(contents);
        if matches!(text, Cow::Owned(_)) {
            warn!(path = %file.path.display(), "contents are not valid UTF-8");
        }
        Ok(text.into_owned())
    }

    /// Translate `file` into every locale and return the results in locale order
    ///
    /// Without an event channel every error is fatal.
    pub async fn translate(&self, file: &SourceFile) -> I18nResult<Vec<TranslatedFile>> {
        let mut collect = Collect::default();
        self.translate_into(file, &mut collect).await?;
        Ok(collect.0)
    }

    /// Translate `file` into every locale, reporting to `sink`
    ///
    /// Missing contents, missing catalogs and handlers that never complete are
    /// passed to [`Sink::error`]; the sink decides whether to go on. Locale
    /// discovery and catalog loading failures are returned directly.
    /// [`Sink::translated`] runs once every locale has produced its file or
    /// failed.
    pub async fn translate_into<S>(&self, file: &SourceFile, sink: &mut S) -> I18nResult<()>
    where
        S: Sink + ?Sized,
    {
        let handler = self.handler_for(file);
        let copy = match self.read_file(file) {
            Ok(copy) => copy,
            Err(e) => return sink.error(e),
        };
        let locales = self.store.locales()?;
        self.store.catalogs()?;

        for locale in locales {
            let catalog = match self.store.catalog(locale) {
                Ok(catalog) => catalog,
                Err(e) => {
                    sink.error(e)?;
                    continue;
                }
            };
            let lookup = Lookup::new(locale, catalog);
            let lang = normalize_locale(locale);

            let translation = match &handler {
                Handler::Sync(f) => f(&copy, &lookup, &lang),
                Handler::Async(f) => {
                    let (done, rx) = Done::channel();
                    f(&copy, &lookup, &lang, catalog, done);
                    match rx.await {
                        Ok(translation) => Some(translation),
                        Err(_) => {
                            sink.error(I18nError::HandlerDropped {
                                path: file.path.clone(),
                                locale: locale.clone(),
                            })?;
                            continue;
                        }
                    }
                }
            };
            sink.push(TranslatedFile::new(
                file,
                &lang,
                translation,
                Arc::clone(&self.options),
            ));
        }

        debug!(path = %file.path.display(), locales = locales.len(), "file translated");
        sink.translated(file);
        Ok(())
    }

    /// Run the translator as a task fed through a channel
    ///
    /// Recoverable errors become [`Event::Error`] and translation continues.
    /// A fatal error is sent as [`Event::Error`] too, then the task stops.
    pub fn stream(self: Arc<Self>) -> TranslationStream {
        let (files_tx, mut files_rx) = mpsc::unbounded_channel::<SourceFile>();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let delay = self.options.completion_delay_ms.map(Duration::from_millis);

        let task = tokio::spawn(async move {
            let mut sink = ChannelSink::new(events_tx, delay);
            while let Some(file) = files_rx.recv().await {
                if let Err(e) = self.translate_into(&file, &mut sink).await {
                    error!(path = %file.path.display(), error = %e, "translation aborted");
                    let _ = sink.error(e);
                    break;
                }
            }
        });

        TranslationStream {
            files: files_tx,
            events: events_rx,
            task,
        }
    }
}
