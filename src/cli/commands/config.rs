//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{ModCacheError, ModCacheResult};
use console::style;
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> ModCacheResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let mut updated = config.clone();
            set_value(&mut updated, &key, &value)?;
            manager.save(&updated).await?;
            println!("{} Set {} = {}", style("[OK]").green(), key, value);
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> ModCacheResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> ModCacheResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        println!(
            "{} Config already exists at {} (use --force to overwrite)",
            style("[WARN]").yellow(),
            path.display()
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    println!(
        "{} Configuration initialized: {}",
        style("[OK]").green(),
        path.display()
    );
    Ok(())
}

fn set_value(config: &mut Config, key: &str, value: &str) -> ModCacheResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "verbose"] => config.general.verbose = parse_bool(value)?,
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(ModCacheError::User(format!(
                    "Invalid log format: {} (expected text or json)",
                    value
                )))
            }
        },
        ["cache", "root"] => config.cache.root = PathBuf::from(value),
        ["cache", "platform"] => config.cache.platform = value.to_string(),
        ["cache", "hostname"] => config.cache.hostname = value.to_string(),
        ["cache", "symbols"] => config.cache.symbols = parse_bool(value)?,
        ["cache", "mirrors"] => {
            config.cache.mirrors = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
        }
        _ => return Err(ModCacheError::User(format!("Unknown config key: {}", key))),
    }

    Ok(())
}

fn parse_bool(value: &str) -> ModCacheResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ModCacheError::User(format!("Invalid boolean: {}", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_cache_keys() {
        let mut config = Config::default();
        set_value(&mut config, "cache.hostname", "ubuntu").unwrap();
        set_value(&mut config, "cache.symbols", "off").unwrap();
        set_value(&mut config, "cache.mirrors", "/srv/a, /srv/b").unwrap();

        assert_eq!(config.cache.hostname, "ubuntu");
        assert!(!config.cache.symbols);
        assert_eq!(
            config.cache.mirrors,
            vec![PathBuf::from("/srv/a"), PathBuf::from("/srv/b")]
        );
    }

    #[test]
    fn unknown_key_rejected() {
        let mut config = Config::default();
        let err = set_value(&mut config, "cache.size", "10").unwrap_err();
        assert!(err.to_string().contains("Unknown config key"));
    }

    #[test]
    fn parse_bool_values() {
        assert!(parse_bool("YES").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn log_format_validated() {
        let mut config = Config::default();
        assert!(set_value(&mut config, "general.log_format", "xml").is_err());
        set_value(&mut config, "general.log_format", "json").unwrap();
        assert_eq!(config.general.log_format, "json");
    }
}
