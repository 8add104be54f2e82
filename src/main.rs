/// rca-logparser: classify log lines against event templates
///
/// Usage: rca-logparser <parse|duplicates|complete|mask>
///
/// All inputs come from the environment (see `Config::from_env`):
///   TEMPLATE_FILE, LOG_FILE, OUTPUT_FILE, MASK_PAYLOADS,
///   TEMPLATE_ANCHORING, UNRESOLVED_NAMED_PATTERN
use anyhow::{Context, Result};
use rca_logparser::config::Config;
use rca_logparser::dict_masker::mask_structured_values_in_text;
use rca_logparser::log_matcher::{mask_lines, LogMatcher};
use rca_logparser::log_source::{FileLogSource, LogSource};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy)]
enum Command {
    Parse,
    Duplicates,
    Complete,
    Mask,
}

impl Command {
    fn parse(arg: &str) -> Option<Self> {
        match arg {
            "parse" => Some(Command::Parse),
            "duplicates" => Some(Command::Duplicates),
            "complete" => Some(Command::Complete),
            "mask" => Some(Command::Mask),
            _ => None,
        }
    }
}

fn main() -> Result<ExitCode> {
    // Load .env file if present (fails silently if not found)
    dotenvy::dotenv().ok();

    // Logs go to stderr so CSV output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let Some(command) = std::env::args().nth(1).as_deref().and_then(Command::parse) else {
        eprintln!("Usage: rca-logparser <parse|duplicates|complete|mask>");
        return Ok(ExitCode::from(2));
    };

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            tracing::error!("Please set the required environment variables:");
            tracing::error!("   - TEMPLATE_FILE: template definitions (.txt or .toml, not needed by `mask`)");
            tracing::error!("   - LOG_FILE: log lines to process");
            tracing::error!("   - OUTPUT_FILE: CSV output for `parse` (optional, default: stdout)");
            tracing::error!("   - MASK_PAYLOADS: mask embedded dict/JSON values first (optional)");
            tracing::error!("   - TEMPLATE_ANCHORING: full | start (optional, default: full)");
            tracing::error!("   - UNRESOLVED_NAMED_PATTERN: literal | reject (optional, default: literal)");
            return Ok(ExitCode::from(2));
        }
    };
    config.log_config();

    let log_file = config.log_file().map_err(anyhow::Error::msg)?;
    let source = FileLogSource::new(log_file);
    let mut lines = source
        .load_lines()
        .with_context(|| format!("Failed to read log file: {}", source.name()))?;

    if config.mask_payloads && !matches!(command, Command::Mask) {
        lines = mask_lines(&lines);
    }

    match command {
        Command::Mask => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for line in &lines {
                writeln!(out, "{}", mask_structured_values_in_text(line))?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Parse => {
            let table = load_matcher(&config)?.classify_batch(&lines);
            match config.output_file {
                Some(ref path) => {
                    let file = File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    table.write_csv(BufWriter::new(file))?;
                    info!("Wrote {} rows to {}", table.len(), path.display());
                }
                None => table.write_csv(io::stdout().lock())?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Duplicates => {
            let report = load_matcher(&config)?.find_duplicates(&lines);
            print!("{}", report);
            Ok(exit_code(!report.has_duplicates()))
        }
        Command::Complete => {
            let report = load_matcher(&config)?.check_completeness(&lines);
            print!("{}", report);
            Ok(exit_code(report.is_complete))
        }
    }
}

// `mask` never needs templates, so they are only loaded here.
fn load_matcher(config: &Config) -> Result<LogMatcher> {
    let template_file = config.template_file().map_err(anyhow::Error::msg)?;
    let matcher = LogMatcher::load_with_config(template_file, config.matcher.clone())
        .with_context(|| format!("Failed to load templates: {}", template_file.display()))?;
    info!("Templates loaded: {}", matcher.template_count());
    Ok(matcher)
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
