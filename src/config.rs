use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "mieldb", about = "Miel - embedded data layer for household finance")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, default_value = "miel.toml")]
    pub config: String,

    /// Force demo mode (volatile fixture-backed store)
    #[arg(long)]
    pub demo: bool,

    /// Force live mode (durable store), overriding the saved preference
    #[arg(long, conflicts_with = "demo")]
    pub live: bool,

    /// Database file (overrides config file)
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Explicit mode override; `None` defers to the persisted preference.
    pub fn demo_override(&self) -> Option<bool> {
        if self.demo {
            Some(true)
        } else if self.live {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// Database file; defaults to the per-user data directory.
    pub path: Option<PathBuf>,

    /// Demo-mode preference file; defaults to the per-user config directory.
    pub preference_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        json: false,
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: DatabaseConfig::default(),
            logging: default_logging(),
        }
    }
}

impl Config {
    pub fn load(cli: &CliArgs) -> Self {
        let mut config = match std::fs::read_to_string(&cli.config) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse config file: {}", e);
                Config::default()
            }),
            Err(_) => Config::default(),
        };

        // CLI overrides
        if let Some(ref path) = cli.db_path {
            config.database.path = Some(path.clone());
        }
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }

        config
    }

    pub fn database_path(&self) -> PathBuf {
        self.database.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("miel")
                .join("miel.db")
        })
    }
}
