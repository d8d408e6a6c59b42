use crate::catalog::Catalog;
use serde_json::Value;

/// A gettext function bound to one locale's merged catalog
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    locale: &'a str,
    catalog: &'a Catalog,
}

impl<'a> Lookup<'a> {
    pub fn new(locale: &'a str, catalog: &'a Catalog) -> Self {
        Lookup { locale, catalog }
    }

    /// The registered locale identifier this lookup translates into
    pub fn locale(&self) -> &'a str {
        self.locale
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Translate `msgid`, falling back to `msgid` itself
    ///
    /// The empty string and strings without a non-empty translation are
    /// returned unchanged; the result is never empty unless the input was.
    pub fn gettext(&self, msgid: &str) -> String {
        if msgid.is_empty() {
            return String::new();
        }
        self.catalog
            .get(msgid)
            .and_then(|record| record.translation())
            .unwrap_or(msgid)
            .to_string()
    }

    /// Translate a JSON value: strings go through [`Lookup::gettext`],
    /// anything else is returned as is
    pub fn gettext_value(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.gettext(s)),
            other => other.clone(),
        }
    }
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
            .with_message("Empty", TranslationRecord::singular(""))
            .with_message("None", TranslationRecord::default());
        catalog
    }

    #[test]
    fn test_gettext_translates() {
        let catalog = french();
        let lookup = Lookup::new("fr", &catalog);
        assert_eq!(lookup.gettext("Hello"), "Bonjour");
        assert_eq!(lookup.locale(), "fr");
    }

    #[test]
    fn test_gettext_fallback() {
        let catalog = french();
        let lookup = Lookup::new("fr", &catalog);
        assert_eq!(
            lookup.gettext("Untranslated string"),
            "Untranslated string"
        );
        assert_eq!(lookup.gettext("Empty"), "Empty");
        assert_eq!(lookup.gettext("None"), "None");
        assert_eq!(lookup.gettext(""), "");
    }

    #[test]
    fn test_gettext_is_exact_match() {
        let catalog = french();
        let lookup = Lookup::new("fr", &catalog);
        assert_eq!(lookup.gettext("hello"), "hello");
        assert_eq!(lookup.gettext(" Hello"), " Hello");
    }

    #[test]
    fn test_gettext_value_passes_non_strings() {
        let catalog = french();
        let lookup = Lookup::new("fr", &catalog);
        assert_eq!(lookup.gettext_value(&json!("Hello")), json!("Bonjour"));
        assert_eq!(lookup.gettext_value(&json!(42)), json!(42));
        assert_eq!(lookup.gettext_value(&Value::Null), Value::Null);
        assert_eq!(lookup.gettext_value(&json!(["Hello"])), json!(["Hello"]));
    }
}
