use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub anchoring: Anchoring,
    pub unresolved_named: UnresolvedNamed,
    pub comment_marker: String,
}

/// Which ends of a log line a compiled template must cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchoring {
    /// The whole line must be an instance of the template.
    Full,
    /// Only the start is anchored; trailing text after the template is accepted.
    Start,
}

/// What to do with a `<:name:>` token that has no entry in the regex table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedNamed {
    /// Keep the token as literal text.
    Literal,
    /// Fail template construction.
    Reject,
}

impl Anchoring {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" => Some(Anchoring::Full),
            "start" => Some(Anchoring::Start),
            _ => None,
        }
    }
}

impl UnresolvedNamed {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "literal" => Some(UnresolvedNamed::Literal),
            "reject" => Some(UnresolvedNamed::Reject),
            _ => None,
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            anchoring: Anchoring::Full,
            unresolved_named: UnresolvedNamed::Literal,
            comment_marker: "#".to_string(),
        }
    }
}

impl MatcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject templates that reference unknown named patterns.
    pub fn strict() -> Self {
        Self {
            unresolved_named: UnresolvedNamed::Reject,
            ..Default::default()
        }
    }

    pub fn with_anchoring(mut self, anchoring: Anchoring) -> Self {
        self.anchoring = anchoring;
        self
    }

    pub fn with_unresolved_named(mut self, policy: UnresolvedNamed) -> Self {
        self.unresolved_named = policy;
        self
    }

    pub fn with_comment_marker(mut self, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        if !marker.is_empty() {
            self.comment_marker = marker;
        }
        self
    }

    pub(crate) fn anchor_suffix(&self) -> &'static str {
        match self.anchoring {
            Anchoring::Full => "$",
            Anchoring::Start => "",
        }
    }
}
