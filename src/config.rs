use crate::matcher_config::{Anchoring, MatcherConfig, UnresolvedNamed};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Template definitions (.txt or .toml); not needed by `mask`
    pub template_file: Option<PathBuf>,

    // Logs to classify / mask
    pub log_file: Option<PathBuf>,

    // CSV destination for `parse`; stdout when unset
    pub output_file: Option<PathBuf>,

    // Mask embedded dict/JSON payloads before matching
    pub mask_payloads: bool,

    pub matcher: MatcherConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let anchoring = match env::var("TEMPLATE_ANCHORING") {
            Ok(value) => Anchoring::parse(&value).ok_or_else(|| {
                format!("TEMPLATE_ANCHORING must be 'full' or 'start', got '{}'", value)
            })?,
            Err(_) => Anchoring::Full,
        };

        let unresolved_named = match env::var("UNRESOLVED_NAMED_PATTERN") {
            Ok(value) => UnresolvedNamed::parse(&value).ok_or_else(|| {
                format!(
                    "UNRESOLVED_NAMED_PATTERN must be 'literal' or 'reject', got '{}'",
                    value
                )
            })?,
            Err(_) => UnresolvedNamed::Literal,
        };

        Ok(Config {
            template_file: env::var("TEMPLATE_FILE").ok().map(PathBuf::from),
            log_file: env::var("LOG_FILE").ok().map(PathBuf::from),
            output_file: env::var("OUTPUT_FILE").ok().map(PathBuf::from),
            mask_payloads: env::var("MASK_PAYLOADS")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            matcher: MatcherConfig::new()
                .with_anchoring(anchoring)
                .with_unresolved_named(unresolved_named),
        })
    }

    pub fn template_file(&self) -> Result<&PathBuf, String> {
        self.template_file.as_ref().ok_or_else(|| {
            "TEMPLATE_FILE environment variable is required (a .txt or .toml file)".to_string()
        })
    }

    pub fn log_file(&self) -> Result<&PathBuf, String> {
        self.log_file
            .as_ref()
            .ok_or_else(|| "LOG_FILE environment variable is required for this command".to_string())
    }

    pub fn log_config(&self) {
        tracing::info!("Configuration:");
        if let Some(ref template_file) = self.template_file {
            tracing::info!("   Template file: {}", template_file.display());
        }
        if let Some(ref log_file) = self.log_file {
            tracing::info!("   Log file: {}", log_file.display());
        }
        match self.output_file {
            Some(ref output) => tracing::info!("   Output file: {}", output.display()),
            None => tracing::info!("   Output file: <stdout>"),
        }
        tracing::info!("   Mask payloads: {}", self.mask_payloads);
        tracing::info!("   Anchoring: {:?}", self.matcher.anchoring);
        tracing::info!("   Unresolved named patterns: {:?}", self.matcher.unresolved_named);
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
