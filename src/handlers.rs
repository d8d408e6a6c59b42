//! Per file-kind translation strategies
//!
//! A [`Handler`] is registered for one or more file extensions. It comes in
//! two forms that the translator invokes the same way:
//!
//! - [`Handler::Sync`] returns the translated text directly.
//! - [`Handler::Async`] receives the locale's catalog and a [`Done`] handle,
//!   and reports the translated text through it, possibly later.

use crate::catalog::Catalog;
use crate::lookup::Lookup;
use crate::substitution::{Matching, substitute, substitute_then};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::warn;

/// `(content, lookup, normalized locale) -> translated text`
pub type SyncFn = dyn Fn(&str, &Lookup<'_>, &str) -> Option<String> + Send + Sync;

/// `(content, lookup, normalized locale, catalog, done)`
pub type AsyncFn = dyn Fn(&str, &Lookup<'_>, &str, &Catalog, Done) + Send + Sync;

/// Completion handle of an asynchronous handler
///
/// Finishing it delivers the translated text to the translator. Dropping it
/// unfinished is reported as a failed translation for that locale.
#[derive(Debug)]
pub struct Done(oneshot::Sender<String>);

impl Done {
    pub(crate) fn channel() -> (Done, oneshot::Receiver<String>) {
        let (tx, rx) = oneshot::channel();
        (Done(tx), rx)
    }

    pub fn finish(self, translation: String) {
        // The translator stopped waiting; nothing left to deliver to
        let _ = self.0.send(translation);
    }
}

#[derive(Clone)]
pub enum Handler {
    Sync(Arc<SyncFn>),
    Async(Arc<AsyncFn>),
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Sync(_) => write!(f, "Handler::Sync"),
            Handler::Async(_) => write!(f, "Handler::Async"),
        }
    }
}

impl Handler {
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&str, &Lookup<'_>, &str) -> Option<String> + Send + Sync + 'static,
    {
        Handler::Sync(Arc::new(f))
    }

    pub fn deferred<F>(f: F) -> Self
    where
        F: Fn(&str, &Lookup<'_>, &str, &Catalog, Done) + Send + Sync + 'static,
    {
        Handler::Async(Arc::new(f))
    }

    /// Handler for file kinds nobody registered: never produces a translation
    pub fn null() -> Self {
        Handler::sync(|_, _, _| None)
    }

    /// Catalog substitution reported through the completion handle
    pub fn markup(matching: Matching) -> Self {
        Handler::deferred(move |content, lookup, _lang, catalog, done| {
            substitute_then(content, lookup, catalog, matching, |text| done.finish(text));
        })
    }

    /// Catalog substitution returning its result directly
    pub fn markup_sync(matching: Matching) -> Self {
        Handler::sync(move |content, lookup, _lang| {
            Some(substitute(content, lookup, lookup.catalog(), matching))
        })
    }

    /// Translate every string value of a JSON document
    ///
    /// Object keys and non-string values are kept. Content that is not valid
    /// JSON yields no translation.
    pub fn json() -> Self {
        Handler::sync(|content, lookup, lang| {
            let document: Value = match serde_json::from_str(content) {
                Ok(document) => document,
                Err(e) => {
                    warn!(lang, error = %e, "content is not valid JSON");
                    return None;
                }
            };
            let translated = translate_json(&document, lookup);
            serde_json::to_string_pretty(&translated).ok()
        })
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Handler::Async(_))
    }
}

fn translate_json(value: &Value, lookup: &Lookup) -> Value {
    match value {
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| translate_json(v, lookup)).collect())
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), translate_json(v, lookup)))
                .collect(),
        ),
        other => lookup.gettext_value(other),
    }
}

const MARKUP_EXTENSIONS: &[&str] = &[".html", ".js", ".css"];
const TEMPLATE_EXTENSIONS: &[&str] = &[".hbs", ".handlebars", ".mustache"];
const JSON_EXTENSIONS: &[&str] = &[".json"];

/// The extension table used by [`crate::Translator::with_builtin_handlers`]
pub fn builtin_handlers() -> Vec<(&'static [&'static str], Handler)> {
    vec![
        (MARKUP_EXTENSIONS, Handler::markup(Matching::WhitespaceTolerant)),
        (TEMPLATE_EXTENSIONS, Handler::markup_sync(Matching::Exact)),
        (JSON_EXTENSIONS, Handler::json()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TranslationRecord;
    use serde_json::json;

    fn french() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .with_message("Hello", TranslationRecord::singular("Bonjour"))
            .with_message("Good bye", TranslationRecord::singular("Au revoir"));
        catalog
    }

    async fn run(handler: &Handler, content: &str, catalog: &Catalog) -> Option<String> {
        let lookup = Lookup::new("fr", catalog);
        match handler {
            Handler::Sync(f) => f(content, &lookup, "fr"),
            Handler::Async(f) => {
                let (done, rx) = Done::channel();
                f(content, &lookup, "fr", catalog, done);
                rx.await.ok()
            }
        }
    }

    #[test]
    fn test_null_handler() {
        let catalog = french();
        let lookup = Lookup::new("fr", &catalog);
        match Handler::null() {
            Handler::Sync(f) => assert_eq!(f("<p>Hello</p>", &lookup, "fr"), None),
            Handler::Async(_) => panic!("null handler must be synchronous"),
        }
    }

    #[tokio::test]
    async fn test_markup_handler_is_async() {
        let catalog = french();
        let handler = Handler::markup(Matching::WhitespaceTolerant);
        assert!(handler.is_async());
        assert_eq!(
            run(&handler, "<p>Good\n bye</p>", &catalog).await.as_deref(),
            Some("<p>Au revoir</p>")
        );
    }

    #[tokio::test]
    async fn test_markup_sync_handler() {
        let catalog = french();
        let handler = Handler::markup_sync(Matching::Exact);
        assert!(!handler.is_async());
        assert_eq!(
            run(&handler, "<a title=\"Hello\">Good bye</a>", &catalog)
                .await
                .as_deref(),
            Some("<a title=\"Bonjour\">Au revoir</a>")
        );
    }

    #[tokio::test]
    async fn test_json_handler() {
        let catalog = french();
        let content = json!({
            "title": "Hello",
            "items": ["Good bye", "Other", 3],
            "visible": true
        })
        .to_string();
        let output = run(&Handler::json(), &content, &catalog).await.unwrap();
        let translated: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            translated,
            json!({
                "title": "Bonjour",
                "items": ["Au revoir", "Other", 3],
                "visible": true
            })
        );
    }

    #[tokio::test]
    async fn test_json_handler_rejects_invalid_content() {
        let catalog = french();
        assert_eq!(run(&Handler::json(), "{ nope", &catalog).await, None);
    }

    #[tokio::test]
    async fn test_dropped_done_is_observable() {
        let catalog = french();
        let handler = Handler::deferred(|_, _, _, _, _done| {});
        assert_eq!(run(&handler, "<p>Hello</p>", &catalog).await, None);
    }

    #[test]
    fn test_builtin_table() {
        let table = builtin_handlers();
        let async_exts: Vec<&str> = table
            .iter()
            .filter(|(_, h)| h.is_async())
            .flat_map(|(exts, _)| exts.iter().copied())
            .collect();
        assert_eq!(async_exts, [".html", ".js", ".css"]);
    }
}
