//! Config command - manage the JSON configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;
use tracing::debug;

use rcard_core::models::config::CardConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a configuration value by dotted key
    Get {
        /// Configuration key (e.g., "extraction.date_order")
        key: String,
    },

    /// Set a configuration value by dotted key
    Set {
        /// Configuration key
        key: String,
        /// New value (JSON, or a bare string)
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path.map(PathBuf::from).unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, &path),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rcard")
        .join("config.json")
}

/// Load the configuration used by the processing commands.
///
/// An explicit `--config` path must exist; otherwise the default file is
/// used when present, falling back to built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<CardConfig> {
    match config_path {
        Some(path) => CardConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e)),
        None => load_or_default(&default_config_path()),
    }
}

fn load_or_default(path: &Path) -> anyhow::Result<CardConfig> {
    if path.exists() {
        debug!("Using config file {}", path.display());
        Ok(CardConfig::from_file(path)?)
    } else {
        Ok(CardConfig::default())
    }
}

fn show_config(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        eprintln!(
            "{} No config file at {}, showing defaults.",
            style("ℹ").blue(),
            path.display()
        );
    }

    let mut config = load_or_default(path)?;
    if config.ocr.api_key.is_some() {
        config.ocr.api_key = Some("********".to_string());
    }

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_config(args: InitArgs, path: &Path) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(|| path.to_path_buf());

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    CardConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );
    Ok(())
}

fn get_config(path: &Path, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(load_or_default(path)?)?;
    let value = lookup(&json, key)
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn set_config(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    // Accept JSON literals (numbers, booleans, arrays) and bare strings.
    let value: Value =
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let mut json = serde_json::to_value(load_or_default(path)?)?;
    assign(&mut json, key, value.clone())?;

    let config: CardConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;
    config.validate()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&value)?
    );
    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'rcard config init' to create a configuration file.");
    }

    Ok(())
}

fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

/// Replace the value at a dotted key. Only keys that already exist can be
/// set, so a typo does not silently vanish on the next load.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let (parent_key, leaf) = match key.rsplit_once('.') {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, key),
    };

    let mut parent = json;
    if let Some(parent_key) = parent_key {
        for part in parent_key.split('.') {
            parent = parent
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
        }
    }

    let object = parent
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Cannot set value at non-object path: {}", key))?;

    // api_key is skipped while unset, so it is the one key allowed to appear.
    if !object.contains_key(leaf) && leaf != "api_key" {
        anyhow::bail!("Configuration key not found: {}", key);
    }
    object.insert(leaf.to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_dotted_key() {
        let json = serde_json::to_value(CardConfig::default()).unwrap();

        assert_eq!(lookup(&json, "extraction.lookahead"), Some(&Value::from(8)));
        assert_eq!(lookup(&json, "extraction.date_order"), Some(&Value::from("document")));
        assert!(lookup(&json, "extraction.missing").is_none());
    }

    #[test]
    fn test_assign_then_deserialize() {
        let mut json = serde_json::to_value(CardConfig::default()).unwrap();
        assign(&mut json, "extraction.date_order", Value::from("calendar")).unwrap();
        assign(&mut json, "ocr.api_key", Value::from("secret")).unwrap();

        let config: CardConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.extraction.date_order, rcard_core::DateOrder::Calendar);
        assert_eq!(config.ocr.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_assign_rejects_unknown_keys() {
        let mut json = serde_json::to_value(CardConfig::default()).unwrap();
        assert!(assign(&mut json, "extraction.lookahed", Value::from(4)).is_err());
        assert!(assign(&mut json, "nothing.here", Value::from(4)).is_err());
    }
}
