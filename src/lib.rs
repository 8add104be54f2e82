// Template compilation and matching
pub mod event_template;
pub mod log_matcher;
pub mod matcher_config;
pub mod template_loader;

// Embedded dict/JSON payload masking
pub mod dict_masker;

// Inputs, outputs and ambient plumbing
pub mod config;
pub mod error;
pub mod log_source;
pub mod report;

pub use error::{Result, TemplateError};
pub use event_template::{EventTemplate, NamedRegexTable};
pub use log_matcher::{LogMatcher, MatchResult};
