/// Template source loader
///
/// Reads event templates from either a flat `.txt` list (one template per
/// line) or a structured `.toml` file with a `[Regex]` table of named
/// fragments and an `[EventTemplate]` table of id -> template.
use crate::error::{Result, TemplateError};
use crate::event_template::{EventTemplate, NamedRegexTable};
use crate::matcher_config::MatcherConfig;
use std::fs;
use std::path::Path;

const REGEX_SECTION: &str = "Regex";
const TEMPLATE_SECTION: &str = "EventTemplate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    FlatList,
    Structured,
}

impl TemplateFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("txt") => Ok(TemplateFormat::FlatList),
            Some("toml") => Ok(TemplateFormat::Structured),
            _ => Err(TemplateError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Load every template from `path`. Any bad template fails the whole load.
pub fn load_templates(path: &Path, config: &MatcherConfig) -> Result<Vec<EventTemplate>> {
    let format = TemplateFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;

    let templates = match format {
        TemplateFormat::FlatList => parse_flat_list(&content, config)?,
        TemplateFormat::Structured => {
            parse_structured(&content, &path.display().to_string(), config)?
        }
    };

    tracing::info!(
        "Loaded {} templates from {} ({:?})",
        templates.len(),
        path.display(),
        format
    );
    Ok(templates)
}

pub fn parse_flat_list(content: &str, config: &MatcherConfig) -> Result<Vec<EventTemplate>> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(config.comment_marker.as_str()))
        .map(|line| EventTemplate::compile(None, line, None, config))
        .collect()
}

/// Parse a structured definition. `source_name` only labels errors.
pub fn parse_structured(
    content: &str,
    source_name: &str,
    config: &MatcherConfig,
) -> Result<Vec<EventTemplate>> {
    let invalid = |reason: String| TemplateError::InvalidSource {
        path: source_name.to_string(),
        reason,
    };

    let document: toml::Table = toml::from_str(content).map_err(|e| invalid(e.to_string()))?;

    let mut known_regex = NamedRegexTable::new();
    if let Some(section) = document.get(REGEX_SECTION) {
        let table = section
            .as_table()
            .ok_or_else(|| invalid(format!("[{}] must be a table", REGEX_SECTION)))?;
        for (name, fragment) in table {
            let fragment = fragment.as_str().ok_or_else(|| {
                invalid(format!("regex `{}` must be a string", name))
            })?;
            known_regex.insert(name.clone(), fragment.to_string());
        }
    }

    let Some(section) = document.get(TEMPLATE_SECTION) else {
        tracing::warn!("{} has no [{}] table", source_name, TEMPLATE_SECTION);
        return Ok(Vec::new());
    };
    let table = section
        .as_table()
        .ok_or_else(|| invalid(format!("[{}] must be a table", TEMPLATE_SECTION)))?;

    let mut templates = Vec::with_capacity(table.len());
    for (event_id, template) in table {
        let template = template.as_str().ok_or_else(|| {
            invalid(format!("template `{}` must be a string", event_id))
        })?;
        templates.push(EventTemplate::compile(
            Some(event_id.clone()),
            template,
            Some(&known_regex),
            config,
        )?);
    }

    Ok(templates)
}
