//! Event template compiler
//!
//! Turns an authored template such as
//! `received ad request (context_words=[<*>])` into an anchored regex:
//! - literal text is escaped and must match exactly
//! - `<*>` matches any text, lazily (including the empty string)
//! - `<:name:>` is replaced by the fragment registered under `name`
//!   in the named regex table

use crate::error::{Result, TemplateError};
use crate::matcher_config::{MatcherConfig, UnresolvedNamed};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

/// Symbolic name -> raw regex fragment, consumed at compile time only.
pub type NamedRegexTable = HashMap<String, String>;

pub const WILDCARD: &str = "<*>";

const WILDCARD_GROUP_PREFIX: &str = "__w";

// `<*>` or `<:name:>`; names cannot contain whitespace, ':', '<' or '>'
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<\*>|<:([^\s:<>]+):>").expect("placeholder regex is valid")
});

#[derive(Debug, Clone)]
pub struct EventTemplate {
    id: Option<String>,
    template: String,
    regex: Regex,
    // capture group index of each `<*>`, in template order
    wildcard_slots: Vec<usize>,
}

impl EventTemplate {
    /// Compile a template with the default policy and no named patterns.
    pub fn new(template: &str) -> Result<Self> {
        Self::compile(None, template, None, &MatcherConfig::default())
    }

    pub fn with_id(id: impl Into<String>, template: &str) -> Result<Self> {
        Self::compile(Some(id.into()), template, None, &MatcherConfig::default())
    }

    pub fn compile(
        id: Option<String>,
        template: &str,
        known_regex: Option<&NamedRegexTable>,
        config: &MatcherConfig,
    ) -> Result<Self> {
        if template.is_empty() {
            return Err(TemplateError::construction(template, "template cannot be empty"));
        }

        let source = build_regex_source(template, known_regex, config)?;
        let regex = Regex::new(&source)
            .map_err(|e| TemplateError::construction(template, e.to_string()))?;

        let wildcard_slots = regex
            .capture_names()
            .enumerate()
            .filter_map(|(slot, name)| match name {
                Some(name) if name.starts_with(WILDCARD_GROUP_PREFIX) => Some(slot),
                _ => None,
            })
            .collect();

        tracing::debug!(
            id = id.as_deref().unwrap_or("-"),
            regex = regex.as_str(),
            "Compiled template"
        );

        Ok(Self {
            id,
            template: template.to_string(),
            regex,
            wildcard_slots,
        })
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The template as authored.
    pub fn pattern(&self) -> &str {
        &self.template
    }

    pub fn regex_source(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    /// Text covered by each `<*>`, in template order, or `None` when the
    /// line is not an instance of this template.
    pub fn extract(&self, line: &str) -> Option<Vec<String>> {
        let captures = self.regex.captures(line)?;
        Some(
            self.wildcard_slots
                .iter()
                .map(|&slot| {
                    captures
                        .get(slot)
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default()
                })
                .collect(),
        )
    }
}

impl fmt::Display for EventTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

fn build_regex_source(
    template: &str,
    known_regex: Option<&NamedRegexTable>,
    config: &MatcherConfig,
) -> Result<String> {
    let mut source = String::with_capacity(template.len() * 2);
    source.push('^');

    let mut last = 0;
    let mut wildcards = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let Some(token) = caps.get(0) else { continue };
        source.push_str(&regex::escape(&template[last..token.start()]));

        match caps.get(1) {
            None => {
                source.push_str(&format!("(?P<{}{}>.*?)", WILDCARD_GROUP_PREFIX, wildcards));
                wildcards += 1;
            }
            Some(name) => match known_regex.and_then(|table| table.get(name.as_str())) {
                Some(fragment) => {
                    source.push_str("(?:");
                    source.push_str(fragment);
                    source.push(')');
                }
                None if config.unresolved_named == UnresolvedNamed::Reject => {
                    return Err(TemplateError::construction(
                        template,
                        format!("unknown named pattern `{}`", name.as_str()),
                    ));
                }
                None => source.push_str(&regex::escape(token.as_str())),
            },
        }

        last = token.end();
    }

    source.push_str(&regex::escape(&template[last..]));
    source.push_str(config.anchor_suffix());
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher_config::Anchoring;

    fn digits_table() -> NamedRegexTable {
        let mut table = NamedRegexTable::new();
        table.insert("digits".to_string(), "[0-9]+".to_string());
        table
    }

    #[test]
    fn test_context_words_template() {
        let template = EventTemplate::new("received ad request (context_words=[<*>])").unwrap();

        for line in ["abc", "received ad", "ad request (context_words=[])"] {
            assert!(!template.is_match(line), "should not match: {}", line);
        }
        for line in [
            "received ad request (context_words=[clothing])",
            "received ad request (context_words=[clothing, shoes])",
            "received ad request (context_words=[123])",
            "received ad request (context_words=[])",
        ] {
            assert!(template.is_match(line), "should match: {}", line);
        }
    }

    #[test]
    fn test_trailing_wildcard_requires_literal_prefix() {
        let template = EventTemplate::new("SEVERE: Exception while executing runnable <*>").unwrap();

        assert!(!template.is_match("SEVERE: Exception while executing runnable"));
        assert!(!template.is_match("abc"));
        assert!(!template.is_match(""));
        assert!(template.is_match(
            "SEVERE: Exception while executing runnable io.grpc.internal.ServerImpl$JumpToApplicationThreadServerStreamListener$1HalfClosed@7d71091e"
        ));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let template = EventTemplate::new("cost: $5.00 (approx) [x|y] a+b?").unwrap();
        assert!(template.is_match("cost: $5.00 (approx) [x|y] a+b?"));
        assert!(!template.is_match("cost: $5a00 (approx) [x|y] a+b?"));
        assert!(!template.is_match("cost: 5.00 approx x a+b"));
    }

    #[test]
    fn test_full_anchoring_rejects_trailing_text() {
        let template = EventTemplate::new("connection closed").unwrap();
        assert!(template.is_match("connection closed"));
        assert!(!template.is_match("connection closed by peer"));
        assert!(!template.is_match("the connection closed"));
    }

    #[test]
    fn test_start_anchoring_accepts_trailing_text() {
        let config = MatcherConfig::new().with_anchoring(Anchoring::Start);
        let template = EventTemplate::compile(None, "connection closed", None, &config).unwrap();
        assert!(template.is_match("connection closed by peer"));
        assert!(!template.is_match("the connection closed"));
    }

    #[test]
    fn test_wildcard_matches_empty() {
        let template = EventTemplate::new("user <*> logged in").unwrap();
        assert!(template.is_match("user  logged in"));
        assert!(template.is_match("user alice logged in"));
        assert!(!template.is_match("user alice logged out"));
    }

    #[test]
    fn test_wildcards_are_lazy() {
        let template = EventTemplate::new("<*>-<*>").unwrap();
        assert_eq!(
            template.extract("a-b-c"),
            Some(vec!["a".to_string(), "b-c".to_string()])
        );

        let template = EventTemplate::new("key=<*> <*>").unwrap();
        assert_eq!(
            template.extract("key=one two three"),
            Some(vec!["one".to_string(), "two three".to_string()])
        );
    }

    #[test]
    fn test_extract_none_on_mismatch() {
        let template = EventTemplate::new("took <*>ms").unwrap();
        assert_eq!(template.extract("took 12s"), None);
        assert_eq!(template.extract("took 12ms"), Some(vec!["12".to_string()]));
    }

    #[test]
    fn test_named_pattern_substitution() {
        let table = digits_table();
        let template =
            EventTemplate::compile(None, "port <:digits:>", Some(&table), &MatcherConfig::default())
                .unwrap();

        assert_eq!(template.regex_source(), "^port (?:[0-9]+)$");
        assert!(template.is_match("port 8080"));
        assert!(!template.is_match("port abc"));
        assert!(!template.is_match("port 80a"));
    }

    #[test]
    fn test_repeated_named_token() {
        let table = digits_table();
        let template = EventTemplate::compile(
            None,
            "<:digits:>/<:digits:> done",
            Some(&table),
            &MatcherConfig::default(),
        )
        .unwrap();

        assert!(template.is_match("3/10 done"));
        assert!(!template.is_match("3/x done"));
    }

    #[test]
    fn test_named_fragment_is_grouped() {
        let mut table = NamedRegexTable::new();
        table.insert("level".to_string(), "INFO|WARN".to_string());
        let template =
            EventTemplate::compile(None, "[<:level:>] ok", Some(&table), &MatcherConfig::default())
                .unwrap();

        assert!(template.is_match("[WARN] ok"));
        assert!(!template.is_match("[WARN"));
    }

    #[test]
    fn test_named_fragment_does_not_shift_wildcards() {
        let mut table = NamedRegexTable::new();
        table.insert("kv".to_string(), r"(\w+)=(\w+)".to_string());
        let template =
            EventTemplate::compile(None, "<:kv:> then <*>", Some(&table), &MatcherConfig::default())
                .unwrap();

        assert_eq!(template.extract("a=b then rest"), Some(vec!["rest".to_string()]));
    }

    #[test]
    fn test_unresolved_named_token_is_literal_by_default() {
        let template = EventTemplate::new("port <:digits:>").unwrap();
        assert!(template.is_match("port <:digits:>"));
        assert!(!template.is_match("port 8080"));
    }

    #[test]
    fn test_unresolved_named_token_rejected_when_strict() {
        let err = EventTemplate::compile(None, "port <:digits:>", None, &MatcherConfig::strict())
            .unwrap_err();
        match err {
            TemplateError::Construction { pattern, reason } => {
                assert_eq!(pattern, "port <:digits:>");
                assert!(reason.contains("digits"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_template_fails() {
        assert!(matches!(
            EventTemplate::new(""),
            Err(TemplateError::Construction { .. })
        ));
    }

    #[test]
    fn test_invalid_fragment_fails() {
        let mut table = NamedRegexTable::new();
        table.insert("broken".to_string(), "(abc".to_string());
        let err = EventTemplate::compile(None, "x <:broken:>", Some(&table), &MatcherConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("x <:broken:>"));
    }

    #[test]
    fn test_is_match_is_pure() {
        let template = EventTemplate::with_id("E1", "GET <*> 200").unwrap();
        for _ in 0..3 {
            assert!(template.is_match("GET /index.html 200"));
            assert!(!template.is_match("GET /index.html 404"));
        }
        assert_eq!(template.id(), Some("E1"));
        assert_eq!(template.to_string(), "GET <*> 200");
    }
}
