//! Configuration management with TOML file support.
//!
//! Merges settings from three sources (highest precedence first):
//! 1. CLI flags
//! 2. Config file (`~/.config/lognorm/config.toml` or `$XDG_CONFIG_HOME/lognorm/config.toml`)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::{Cli, ColorMode, OutputFormat};
use crate::engine::EngineRegistry;
use crate::error::LognormError;
use crate::level::Level;
use crate::pipeline::Pipeline;

/// Runtime configuration merged from defaults, config file, and CLI arguments.
///
/// Use [`Config::from_cli`] to build from parsed CLI arguments, or
/// [`Config::default`] for built-in defaults (useful in tests and benchmarks).
#[derive(Debug, Clone)]
pub struct Config {
    /// Color output mode (auto/always/never).
    pub color_mode: ColorMode,
    /// Minimum log level to output; records below this are dropped.
    pub min_level: Option<Level>,
    pub output: OutputFormat,
    /// Maximum character length for metadata values in pretty output. 0 = no limit.
    pub max_field_length: usize,
    /// Route JSON and access-log lines through their fast paths.
    pub fast_paths: bool,
    /// External template-mining program, if any.
    pub engine_command: Option<PathBuf>,
    pub engine_args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Auto,
            min_level: None,
            output: OutputFormat::Ndjson,
            max_field_length: 120,
            fast_paths: true,
            engine_command: None,
            engine_args: Vec::new(),
        }
    }
}

impl Config {
    /// Build a [`Config`] from CLI arguments, loading the config file if present.
    ///
    /// Merge precedence: CLI flags > config file > defaults. An explicit
    /// `--config` path must exist; the default path is optional.
    pub fn from_cli(cli: &Cli) -> Result<Self, LognormError> {
        let mut config = Self::default();

        match &cli.config {
            Some(path) => config.apply_file_config(FileConfig::load(path)?)?,
            None => {
                let path = Self::default_config_path();
                if path.exists() {
                    config.apply_file_config(FileConfig::load(&path)?)?;
                }
            }
        }

        // CLI overrides
        if let Some(color) = cli.color {
            config.color_mode = color;
        }
        if let Some(ref level_str) = cli.level {
            config.min_level = Level::from_str_loose(level_str);
        }
        if let Some(output) = cli.output {
            config.output = output;
        }
        if let Some(max_len) = cli.max_field_length {
            config.max_field_length = max_len;
        }
        if cli.no_fast_paths {
            config.fast_paths = false;
        }
        if cli.engine_command.is_some() {
            config.engine_command.clone_from(&cli.engine_command);
        }
        if !cli.engine_args.is_empty() {
            config.engine_args.clone_from(&cli.engine_args);
        }

        Ok(config)
    }

    /// Build the pipeline this configuration describes.
    pub fn pipeline(&self) -> Pipeline {
        let registry = match &self.engine_command {
            Some(program) => EngineRegistry::with_command(program.clone(), self.engine_args.clone()),
            None => EngineRegistry::empty(),
        };
        Pipeline::new(registry).with_fast_paths(self.fast_paths)
    }

    /// Default config file path: `$XDG_CONFIG_HOME/lognorm/config.toml` or `~/.config/lognorm/config.toml`.
    fn default_config_path() -> PathBuf {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(xdg).join("lognorm").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("lognorm")
                .join("config.toml")
        } else {
            PathBuf::from(".config/lognorm/config.toml")
        }
    }

    /// Apply settings from a parsed config file.
    fn apply_file_config(&mut self, file: FileConfig) -> Result<(), LognormError> {
        if let Some(color) = file.color {
            self.color_mode = match color.as_str() {
                "always" => ColorMode::Always,
                "never" => ColorMode::Never,
                _ => ColorMode::Auto,
            };
        }

        if let Some(output) = file.output {
            self.output = match output.as_str() {
                "ndjson" => OutputFormat::Ndjson,
                "json" => OutputFormat::Json,
                "pretty" => OutputFormat::Pretty,
                other => {
                    return Err(LognormError::Config(format!(
                        "unknown output format '{other}': expected ndjson, json or pretty"
                    )));
                }
            };
        }

        if let Some(level) = file.level {
            self.min_level = Level::from_str_loose(&level);
        }

        if let Some(max_len) = file.max_field_length {
            self.max_field_length = max_len;
        }

        if let Some(fast_paths) = file.fast_paths {
            self.fast_paths = fast_paths;
        }

        if let Some(engine) = file.engine {
            if let Some(command) = engine.command {
                self.engine_command = Some(command);
            }
            if let Some(args) = engine.args {
                self.engine_args = args;
            }
        }

        Ok(())
    }
}

/// Config file structure (TOML deserialization).
#[derive(Debug, Deserialize)]
struct FileConfig {
    color: Option<String>,
    output: Option<String>,
    level: Option<String>,
    max_field_length: Option<usize>,
    fast_paths: Option<bool>,
    engine: Option<EngineConfig>,
}

#[derive(Debug, Deserialize)]
struct EngineConfig {
    command: Option<PathBuf>,
    args: Option<Vec<String>>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, LognormError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LognormError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}
