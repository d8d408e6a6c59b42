//! Catalog-driven text substitution for markup templates
//!
//! Templates are not parsed. A source string is only replaced where it sits
//! between delimiters that mark it as an attribute value or as element text:
//!
//! - preceded by one of `"` `'` `\` `/` `>` (whitespace may follow it)
//! - followed by one of `"` `'` `/` `<` (whitespace may precede it)
//!
//! The delimiters are kept and the surrounding whitespace is dropped, so
//! `<p> Hello </p>` becomes `<p>Bonjour</p>`.
//!
//! # Example
//!
//! ```
//! use static_i18n::{Catalog, Lookup, Matching, TranslationRecord, substitute};
//!
//! let mut catalog = Catalog::new();
//! catalog.with_message("Hello World", TranslationRecord::singular("Bonjour Monde"));
//! let lookup = Lookup::new("fr", &catalog);
//!
//! let html = "<p>Hello\n  World</p>";
//! assert_eq!(
//!     substitute(html, &lookup, &catalog, Matching::WhitespaceTolerant),
//!     "<p>Bonjour Monde</p>"
//! );
//! ```

use crate::catalog::Catalog;
use crate::lookup::Lookup;
use regex::Regex;
use tracing::{trace, warn};

const LEADING_GUARD: &str = r#"["'\\/>]"#;
const TRAILING_GUARD: &str = r#"["'/<]"#;

/// How a catalog source string is matched against the template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matching {
    /// The source string must appear verbatim
    Exact,
    /// Every whitespace run in the source string matches any amount of
    /// whitespace (including none), so reflowed template text still matches
    WhitespaceTolerant,
}

impl Matching {
    fn body(self, source: &str) -> String {
        match self {
            Matching::Exact => regex::escape(source),
            Matching::WhitespaceTolerant => source
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s*"),
        }
    }
}

/// Build the delimiter-guarded pattern for one source string
///
/// Capture group 1 is the leading delimiter, group 2 the trailing one.
pub fn guarded_pattern(source: &str, matching: Matching) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"({LEADING_GUARD})\s*(?:{})\s*({TRAILING_GUARD})",
        matching.body(source)
    ))
}

/// Replace every guarded occurrence matched by `pattern` with `translation`
///
/// Scanning resumes at the trailing delimiter of each replacement, so a
/// delimiter shared by two neighbouring occurrences serves both, and a
/// translation that contains its own source text is not matched again.
fn replace_guarded(template: &mut String, pattern: &Regex, translation: &str) -> usize {
    let mut from = 0;
    let mut replaced = 0;
    loop {
        let (range, replacement) = {
            let Some(caps) = pattern.captures_at(template, from) else {
                break;
            };
            let (Some(whole), Some(lead), Some(trail)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                break;
            };
            from = whole.start() + lead.len() + translation.len();
            (
                whole.range(),
                format!("{}{}{}", lead.as_str(), translation, trail.as_str()),
            )
        };
        template.replace_range(range, &replacement);
        replaced += 1;
    }
    replaced
}

/// Translate `template` with every entry of `catalog`
///
/// Entries are applied in catalog order. An entry is skipped when its source
/// string is blank or it has no non-empty translation; with
/// [`Matching::WhitespaceTolerant`] it is also skipped when the lookup gives
/// back the source string unchanged.
pub fn substitute(
    template: &str,
    lookup: &Lookup,
    catalog: &Catalog,
    matching: Matching,
) -> String {
    let mut text = template.to_string();
    for (source, record) in catalog.iter() {
        if source.trim().is_empty() || record.translation().is_none() {
            continue;
        }
        let translation = lookup.gettext(source);
        if matching == Matching::WhitespaceTolerant && translation == source {
            continue;
        }
        let pattern = match guarded_pattern(source, matching) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!(msgid = source, error = %e, "skipping message with unusable pattern");
                continue;
            }
        };
        let replaced = replace_guarded(&mut text, &pattern, &translation);
        if replaced > 0 {
            trace!(locale = lookup.locale(), msgid = source, replaced, "substituted");
        }
    }
    text
}

/// Callback form of [`substitute`]
///
/// `done` runs exactly once, after every catalog entry has been applied. An
/// empty catalog hands back the template unchanged.
pub fn substitute_then<F>(
    template: &str,
    lookup: &Lookup,
    catalog: &Catalog,
    matching: Matching,
    done: F,
) where
    F: FnOnce(String),
{
    if catalog.is_empty() {
        done(template.to_string());
        return;
    }
    done(substitute(template, lookup, catalog, matching));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TranslationRecord;

    fn catalog(entries: &[(&str, &str)]) -> Catalog {
        let mut catalog = Catalog::new();
        for (msgid, msgstr) in entries {
            catalog.with_message(msgid, TranslationRecord::singular(msgstr));
        }
        catalog
    }

    fn run(template: &str, entries: &[(&str, &str)], matching: Matching) -> String {
        let catalog = catalog(entries);
        let lookup = Lookup::new("fr", &catalog);
        substitute(template, &lookup, &catalog, matching)
    }

    #[test]
    fn test_exact_element_text() {
        assert_eq!(
            run("<p>Hello</p>", &[("Hello", "Bonjour")], Matching::Exact),
            "<p>Bonjour</p>"
        );
    }

    #[test]
    fn test_attribute_values() {
        assert_eq!(
            run(
                r#"<img alt="Hello" title='Hello'>"#,
                &[("Hello", "Bonjour")],
                Matching::Exact
            ),
            r#"<img alt="Bonjour" title='Bonjour'>"#
        );
    }

    #[test]
    fn test_whitespace_inside_guards_is_dropped() {
        assert_eq!(
            run("<p>\n  Hello\n</p>", &[("Hello", "Bonjour")], Matching::Exact),
            "<p>Bonjour</p>"
        );
    }

    #[test]
    fn test_unguarded_text_is_left_alone() {
        let template = "<p>Say Hello now</p>";
        assert_eq!(
            run(template, &[("Hello", "Bonjour")], Matching::Exact),
            template
        );
        assert_eq!(
            run(template, &[("Hello", "Bonjour")], Matching::WhitespaceTolerant),
            template
        );
    }

    #[test]
    fn test_exact_requires_same_whitespace() {
        let template = "<p>Hello\n  World</p>";
        assert_eq!(
            run(template, &[("Hello World", "Bonjour Monde")], Matching::Exact),
            template
        );
    }

    #[test]
    fn test_tolerant_matches_reflowed_text() {
        assert_eq!(
            run(
                "<p>Hello\n  World</p>",
                &[("Hello World", "Bonjour Monde")],
                Matching::WhitespaceTolerant
            ),
            "<p>Bonjour Monde</p>"
        );
        assert_eq!(
            run(
                "<p>Hello\tWorld</p>",
                &[("Hello  World", "Bonjour Monde")],
                Matching::WhitespaceTolerant
            ),
            "<p>Bonjour Monde</p>"
        );
    }

    #[test]
    fn test_repeated_occurrences() {
        assert_eq!(
            run(
                "<h1>Hello</h1><p>Hello</p>",
                &[("Hello", "Bonjour")],
                Matching::Exact
            ),
            "<h1>Bonjour</h1><p>Bonjour</p>"
        );
    }

    #[test]
    fn test_neighbours_share_a_delimiter() {
        assert_eq!(
            run(r#"'Yes'Yes'"#, &[("Yes", "Oui")], Matching::Exact),
            r#"'Oui'Oui'"#
        );
    }

    #[test]
    fn test_translation_containing_source_terminates() {
        assert_eq!(
            run(
                "<b>Save</b>",
                &[("Save", "'Save' now")],
                Matching::Exact
            ),
            "<b>'Save' now</b>"
        );
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert_eq!(
            run(
                "<p>Total (USD)?</p><p>Total xUSDy?</p>",
                &[("Total (USD)?", "Montant (USD) ?")],
                Matching::Exact
            ),
            "<p>Montant (USD) ?</p><p>Total xUSDy?</p>"
        );
    }

    #[test]
    fn test_skips_untranslated_and_blank_entries() {
        let template = "<p>Hello</p><p> </p>";
        assert_eq!(
            run(template, &[("Hello", ""), (" ", "x")], Matching::Exact),
            template
        );
        assert_eq!(
            run(template, &[("Hello", "Hello")], Matching::WhitespaceTolerant),
            template
        );
    }

    #[test]
    fn test_entries_apply_in_catalog_order() {
        assert_eq!(
            run(
                "<p>Hello World</p><p>Hello</p>",
                &[("Hello World", "Bonjour le monde"), ("Hello", "Salut")],
                Matching::Exact
            ),
            "<p>Bonjour le monde</p><p>Salut</p>"
        );
    }

    #[test]
    fn test_guarded_pattern_groups() {
        let pattern = guarded_pattern("a b", Matching::WhitespaceTolerant).unwrap();
        let caps = pattern.captures(r#"x="a  b" "#).unwrap();
        assert_eq!(&caps[1], "\"");
        assert_eq!(&caps[2], "\"");
    }

    #[test]
    fn test_callback_fires_once_after_all_entries() {
        let catalog = catalog(&[("Hello", "Bonjour"), ("World", "Monde")]);
        let lookup = Lookup::new("fr", &catalog);
        let mut calls = Vec::new();
        substitute_then(
            "<b>Hello</b><i>World</i>",
            &lookup,
            &catalog,
            Matching::WhitespaceTolerant,
            |text| calls.push(text),
        );
        assert_eq!(calls, ["<b>Bonjour</b><i>Monde</i>"]);
    }

    #[test]
    fn test_callback_with_empty_catalog() {
        let catalog = Catalog::new();
        let lookup = Lookup::new("fr", &catalog);
        let mut calls = Vec::new();
        substitute_then(
            "<p>Hello</p>",
            &lookup,
            &catalog,
            Matching::Exact,
            |text| calls.push(text),
        );
        assert_eq!(calls, ["<p>Hello</p>"]);
    }
}
