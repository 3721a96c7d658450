//! Pattern Trainer - Automation Pattern Learning & Matching Engine
//!
//! Inspects and maintains libraries of learned automation patterns, and
//! dry-runs the matcher against captured requests.

use pattern_trainer::app::cli::{Cli, Commands, ConfigAction};
use pattern_trainer::app::config::Config;
use pattern_trainer::pattern::library::PatternLibrary;
use pattern_trainer::pattern::matcher::PatternMatcher;
use pattern_trainer::pattern::types::MatchRequest;
use pattern_trainer::pattern::validator::PatternValidator;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    // The library flag wins over the configured path
    let library_path = cli.library.clone().unwrap_or_else(|| config.library.path.clone());

    match cli.command {
        Commands::List { detailed } => run_list(&library_path, detailed, &config)?,
        Commands::Show { id } => run_show(&library_path, id)?,
        Commands::Validate { path } => run_validate(&path, &config)?,
        Commands::Match { request } => run_match(&library_path, &request, &config)?,
        Commands::Delete { id, force } => run_delete(&library_path, id, force)?,
        Commands::Init { force } => run_init(force, &config)?,
        Commands::Config { action } => run_config(action, &config)?,
    }

    Ok(())
}

fn load_library(path: &Path) -> anyhow::Result<PatternLibrary> {
    if !path.exists() {
        anyhow::bail!(
            "Pattern library not found: {}. Run 'pattern-trainer init' first.",
            path.display()
        );
    }
    Ok(PatternLibrary::load(path)?)
}

fn run_list(library_path: &Path, detailed: bool, config: &Config) -> anyhow::Result<()> {
    let library = load_library(library_path)?;
    println!("Patterns in {}:", library_path.display());

    if library.is_empty() {
        println!("  (none)");
        return Ok(());
    }

    let validator = PatternValidator::with_config(config.validation.clone());
    for pattern in &library.patterns {
        if detailed {
            println!(
                "  {}  {}  {}  ({} uses, {} ok, confidence {:.2}, {:?})",
                pattern.id,
                pattern.request_type,
                pattern.selector,
                pattern.usage_count,
                pattern.successful_executions,
                pattern.confidence,
                validator.reliability_level(pattern),
            );
        } else {
            println!("  {}  {}  {}", pattern.id, pattern.request_type, pattern.selector);
        }
    }
    println!("{} pattern(s)", library.len());
    Ok(())
}

fn run_show(library_path: &Path, id: uuid::Uuid) -> anyhow::Result<()> {
    let library = load_library(library_path)?;
    let pattern = library
        .find(id)
        .ok_or_else(|| anyhow::anyhow!("Pattern {} not found in {}", id, library_path.display()))?;
    println!("{}", serde_json::to_string_pretty(pattern)?);
    Ok(())
}

fn run_validate(path: &Path, config: &Config) -> anyhow::Result<()> {
    info!("Validating {}", path.display());

    // Parse without the usual skip-invalid filtering: this command's job
    // is to surface exactly what would be skipped.
    let content = std::fs::read_to_string(path)?;
    let library: PatternLibrary = serde_json::from_str(&content)?;

    let validator = PatternValidator::with_config(config.validation.clone());
    let mut invalid = 0usize;

    for pattern in &library.patterns {
        match pattern.validate() {
            Ok(()) => {
                println!(
                    "  {}  OK  ({:?})",
                    pattern.id,
                    validator.reliability_level(pattern)
                );
            }
            Err(error) => {
                invalid += 1;
                println!("  {}  INVALID: {}", pattern.id, error);
            }
        }
    }

    if invalid == 0 {
        println!("Validation PASSED ({} pattern(s))", library.len());
        Ok(())
    } else {
        anyhow::bail!("Validation failed: {} invalid pattern(s)", invalid)
    }
}

fn run_match(library_path: &Path, request_path: &Path, config: &Config) -> anyhow::Result<()> {
    let library = load_library(library_path)?;

    let request_json = std::fs::read_to_string(request_path)?;
    let request: MatchRequest = serde_json::from_str(&request_json)?;

    info!(
        request_type = %request.request_type,
        hostname = %request.current_context.hostname,
        "dry-run matching {} candidate(s)",
        library.len()
    );

    let matcher = PatternMatcher::with_config(config.matching.clone());
    let mut scored = matcher.score_candidates(&request, &library.patterns);
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    if scored.is_empty() {
        println!("No eligible candidates; a live session would request a demonstration.");
        return Ok(());
    }

    println!("Eligible candidates:");
    for candidate in &scored {
        println!(
            "  {:.4}  {}  {}",
            candidate.score, candidate.pattern.id, candidate.pattern.selector
        );
    }

    if let Some(best) = matcher.find_best_match(&request, &library.patterns) {
        println!("\nBest match: {} ({})", best.id, best.selector);
    }
    Ok(())
}

fn run_delete(library_path: &Path, id: uuid::Uuid, force: bool) -> anyhow::Result<()> {
    let mut library = load_library(library_path)?;
    let pattern = library
        .find(id)
        .ok_or_else(|| anyhow::anyhow!("Pattern {} not found in {}", id, library_path.display()))?;

    if !force {
        println!(
            "Will delete: {} ({} on {})",
            pattern.id, pattern.request_type, pattern.context.hostname
        );
        println!("Use --force to skip this prompt, or re-run with -f");
        return Ok(());
    }

    library.remove(id);
    library.save(library_path)?;
    info!(pattern_id = %id, "deleted pattern");
    println!("Deleted: {}", id);
    Ok(())
}

fn run_init(force: bool, config: &Config) -> anyhow::Result<()> {
    let config_path = Config::default_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    config.save_default()?;
    println!("Created config at {}", config_path.display());
    println!("\nConfig content:\n{}", config.to_toml()?);

    std::fs::create_dir_all(Cli::data_dir())?;

    if !config.library.path.exists() {
        if let Some(parent) = config.library.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut library = PatternLibrary::new(None);
        library.save(&config.library.path)?;
        println!("Created empty library at {}", config.library.path.display());
    }
    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("Configuration ({}):\n", Config::default_path().display());
            println!("{}", config.to_toml()?);
        }
        ConfigAction::Get { key } => {
            let value = toml::Value::try_from(config)
                .map_err(|e| anyhow::anyhow!("config serialization failed: {}", e))?;
            match lookup_toml(&value, &key) {
                Some(found) => println!("{} = {}", key, found),
                None => anyhow::bail!("Configuration key '{}' not found", key),
            }
        }
        ConfigAction::Set { key, value } => {
            let config_path = Config::default_path();
            if !config_path.exists() {
                anyhow::bail!("No config file found. Run 'pattern-trainer init' first.");
            }

            let content = std::fs::read_to_string(&config_path)?;
            let mut document: toml::Value = toml::from_str(&content)?;
            if !set_toml(&mut document, &key, &value) {
                anyhow::bail!("Failed to set '{}'. Key may not exist in config.", key);
            }

            // Round-trip through Config so invalid values are rejected
            // before they land on disk.
            let updated: Config = document
                .try_into()
                .map_err(|e| anyhow::anyhow!("invalid config: {}", e))?;
            updated.validate()?;
            updated.save(&config_path)?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::Reset { force } => {
            let config_path = Config::default_path();
            if config_path.exists() && !force {
                println!("Config exists at {}", config_path.display());
                println!("Use --force to reset to defaults");
                return Ok(());
            }
            Config::default().save_default()?;
            println!("Configuration reset to defaults at {}", config_path.display());
        }
    }
    Ok(())
}

/// Walk a dotted key through nested TOML tables
fn lookup_toml<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.get(part))
}

/// Set a dotted key in nested TOML tables, parsing the value as TOML
/// first and falling back to a plain string
fn set_toml(document: &mut toml::Value, key: &str, raw: &str) -> bool {
    let mut parts = key.split('.').peekable();
    let mut current = document;

    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            let table = match current.as_table_mut() {
                Some(table) => table,
                None => return false,
            };
            if !table.contains_key(part) {
                return false;
            }
            let parsed = raw
                .parse::<toml::Value>()
                .unwrap_or_else(|_| toml::Value::String(raw.to_string()));
            table.insert(part.to_string(), parsed);
            return true;
        }
        current = match current.get_mut(part) {
            Some(next) => next,
            None => return false,
        };
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> toml::Value {
        toml::from_str(
            r#"
[validation]
max_age_days = 30

[matching]
type_weight = 0.4
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_toml_nested() {
        let document = sample_document();
        let found = lookup_toml(&document, "validation.max_age_days").unwrap();
        assert_eq!(found.as_integer(), Some(30));
        assert!(lookup_toml(&document, "validation.missing").is_none());
        assert!(lookup_toml(&document, "nope.max_age_days").is_none());
    }

    #[test]
    fn test_set_toml_updates_existing_key() {
        let mut document = sample_document();
        assert!(set_toml(&mut document, "validation.max_age_days", "14"));
        assert_eq!(
            lookup_toml(&document, "validation.max_age_days")
                .unwrap()
                .as_integer(),
            Some(14)
        );
    }

    #[test]
    fn test_set_toml_parses_floats() {
        let mut document = sample_document();
        assert!(set_toml(&mut document, "matching.type_weight", "0.5"));
        assert_eq!(
            lookup_toml(&document, "matching.type_weight")
                .unwrap()
                .as_float(),
            Some(0.5)
        );
    }

    #[test]
    fn test_set_toml_rejects_unknown_key() {
        let mut document = sample_document();
        assert!(!set_toml(&mut document, "validation.unknown", "1"));
        assert!(!set_toml(&mut document, "missing.section", "1"));
    }
}
