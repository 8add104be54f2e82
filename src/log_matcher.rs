use crate::dict_masker::mask_structured_values_in_text;
use crate::error::Result;
use crate::event_template::EventTemplate;
use crate::log_source::{FileLogSource, LogSource};
use crate::matcher_config::MatcherConfig;
use crate::report::{
    CompletenessReport, DuplicateEntry, DuplicateReport, ParsedLogRow, ParsedLogTable,
};
use crate::template_loader;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct MatchResult<'a> {
    pub matched: bool,
    pub template: Option<&'a EventTemplate>,
}

impl<'a> MatchResult<'a> {
    fn hit(template: &'a EventTemplate) -> Self {
        Self {
            matched: true,
            template: Some(template),
        }
    }

    fn miss() -> Self {
        Self {
            matched: false,
            template: None,
        }
    }

    pub fn template_text(&self) -> Option<&'a str> {
        self.template.map(EventTemplate::pattern)
    }
}

/// Ordered template set with first-match-wins classification.
///
/// Template order is configuration: put specific templates before general
/// ones. The set is never mutated while classifying, so a matcher can be
/// shared across threads once built.
#[derive(Debug)]
pub struct LogMatcher {
    templates: Vec<EventTemplate>,
    config: MatcherConfig,
}

impl LogMatcher {
    pub fn new() -> Self {
        Self::with_config(MatcherConfig::default())
    }

    pub fn with_config(config: MatcherConfig) -> Self {
        Self {
            templates: Vec::new(),
            config,
        }
    }

    pub fn from_templates(templates: Vec<EventTemplate>) -> Self {
        Self {
            templates,
            config: MatcherConfig::default(),
        }
    }

    /// Load a `.txt` or `.toml` template file with the default config.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_config(path, MatcherConfig::default())
    }

    pub fn load_with_config(path: impl AsRef<Path>, config: MatcherConfig) -> Result<Self> {
        let templates = template_loader::load_templates(path.as_ref(), &config)?;
        Ok(Self { templates, config })
    }

    /// Compile `template` under this matcher's config and append it.
    pub fn add_template(&mut self, template: &str) -> Result<()> {
        let template = EventTemplate::compile(None, template, None, &self.config)?;
        tracing::debug!("Added template: {}", template.pattern());
        self.templates.push(template);
        Ok(())
    }

    pub fn templates(&self) -> &[EventTemplate] {
        &self.templates
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn classify(&self, line: &str) -> MatchResult<'_> {
        match self.templates.iter().find(|t| t.is_match(line)) {
            Some(template) => MatchResult::hit(template),
            None => {
                tracing::debug!("No template match found for log: {}", line);
                MatchResult::miss()
            }
        }
    }

    /// Every template accepting `line`, in set order.
    pub fn matching_templates(&self, line: &str) -> Vec<&EventTemplate> {
        self.templates.iter().filter(|t| t.is_match(line)).collect()
    }

    /// Classify each non-blank line (trimmed), one row per line in input order.
    pub fn classify_batch<S: AsRef<str>>(&self, lines: &[S]) -> ParsedLogTable {
        let rows = non_blank(lines)
            .map(|line| self.parsed_row(line))
            .collect();
        ParsedLogTable { rows }
    }

    /// Same rows as [`classify_batch`](Self::classify_batch), spread over the rayon pool.
    pub fn classify_batch_parallel<S: AsRef<str> + Sync>(&self, lines: &[S]) -> ParsedLogTable {
        use rayon::prelude::*;
        let lines: Vec<&str> = non_blank(lines).collect();
        let rows = lines
            .par_iter()
            .map(|line| self.parsed_row(line))
            .collect();
        ParsedLogTable { rows }
    }

    /// Report every non-blank line accepted by more than one template.
    pub fn find_duplicates<S: AsRef<str>>(&self, lines: &[S]) -> DuplicateReport {
        let mut report = DuplicateReport::default();

        for line in non_blank(lines) {
            report.lines_checked += 1;
            let matches = self.matching_templates(line);
            if matches.len() > 1 {
                tracing::warn!("Duplicate found! log: `{}` matches {} templates", line, matches.len());
                for template in &matches {
                    tracing::warn!("  template: `{}`", template.pattern());
                }
                report.entries.push(DuplicateEntry {
                    log: line.to_string(),
                    templates: matches.iter().map(|t| t.pattern().to_string()).collect(),
                });
            }
        }

        if !report.has_duplicates() {
            tracing::info!("No duplicate found in {} logs", report.lines_checked);
        }
        report
    }

    pub fn check_completeness<S: AsRef<str>>(&self, lines: &[S]) -> CompletenessReport {
        let mut matched_count = 0;
        let mut unmatched_lines = Vec::new();

        for line in non_blank(lines) {
            if self.classify(line).matched {
                matched_count += 1;
            } else {
                unmatched_lines.push(line.to_string());
            }
        }

        let report = CompletenessReport::new(matched_count, unmatched_lines);
        if report.is_complete {
            tracing::info!("All logs are matched. {} logs matched.", report.matched_count);
        } else {
            tracing::info!("{:.2}% logs matched.", report.matched_percentage());
            tracing::warn!("{} logs not matched.", report.unmatched_count);
            for line in &report.unmatched_lines {
                tracing::warn!("  not matched: {}", line);
            }
        }
        report
    }

    fn parsed_row(&self, line: &str) -> ParsedLogRow {
        ParsedLogRow {
            log: line.to_string(),
            event_type: self.classify(line).template_text().map(str::to_string),
        }
    }
}

impl Default for LogMatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn non_blank<S: AsRef<str>>(lines: &[S]) -> impl Iterator<Item = &str> {
    lines
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| !line.is_empty())
}

/// Mask embedded dict/JSON payloads in every line before matching.
pub fn mask_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .map(|line| mask_structured_values_in_text(line.as_ref()))
        .collect()
}

/// Load templates and classify every line of a log source.
pub fn parse_logs(
    template_file: &Path,
    logs: &dyn LogSource,
    config: &MatcherConfig,
) -> Result<ParsedLogTable> {
    let matcher = LogMatcher::load_with_config(template_file, config.clone())?;
    let lines = logs.load_lines()?;
    tracing::info!("Parsing {} lines from {}", lines.len(), logs.name());
    Ok(matcher.classify_batch(&lines))
}

pub fn find_duplicates_in_file(
    template_file: &Path,
    log_file: &Path,
    config: &MatcherConfig,
) -> Result<DuplicateReport> {
    let matcher = LogMatcher::load_with_config(template_file, config.clone())?;
    let lines = FileLogSource::new(log_file).load_lines()?;
    Ok(matcher.find_duplicates(&lines))
}

pub fn check_completeness_of_file(
    template_file: &Path,
    log_file: &Path,
    config: &MatcherConfig,
) -> Result<CompletenessReport> {
    let matcher = LogMatcher::load_with_config(template_file, config.clone())?;
    let lines = FileLogSource::new(log_file).load_lines()?;
    Ok(matcher.check_completeness(&lines))
}
