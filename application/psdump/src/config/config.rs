use super::errors::{ConfigError, ConfigErrorValue};
use serde_derive::Deserialize;
use std::fs;

pub const DEFAULT_CHUNK_SIZE: usize = 4096;
pub const DEFAULT_OUTPUT_PATH: &str = "./psdump";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub input: Option<String>,
    pub output: Option<OutputConfig>,
    pub demux: Option<DemuxConfig>,
    pub log: Option<LogConfig>,
}

impl Config {
    pub fn new(
        input: String,
        output_path: Option<String>,
        chunk_size: usize,
        max_units: usize,
        save_tables: bool,
        log_level: String,
    ) -> Self {
        let output_config = Some(OutputConfig {
            path: output_path.unwrap_or_else(|| String::from(DEFAULT_OUTPUT_PATH)),
            save_payload: true,
            save_diagnostics: true,
            save_tables,
        });

        let demux_config = Some(DemuxConfig {
            chunk_size,
            max_units,
        });

        let log_config = Some(LogConfig { level: log_level });

        Self {
            input: Some(input),
            output: output_config,
            demux: demux_config,
            log: log_config,
        }
    }

    pub fn output_config(&self) -> OutputConfig {
        self.output.clone().unwrap_or_default()
    }

    pub fn demux_config(&self) -> DemuxConfig {
        self.demux.clone().unwrap_or_default()
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if self.input.is_none() {
            return Err(ConfigError {
                value: ConfigErrorValue::MissingInput,
            });
        }
        if self.demux_config().chunk_size == 0 {
            return Err(ConfigError {
                value: ConfigErrorValue::ZeroChunkSize,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub path: String,
    #[serde(default)]
    pub save_payload: bool,
    #[serde(default)]
    pub save_diagnostics: bool,
    #[serde(default)]
    pub save_tables: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: String::from(DEFAULT_OUTPUT_PATH),
            save_payload: true,
            save_diagnostics: true,
            save_tables: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DemuxConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// 0 means no limit
    #[serde(default)]
    pub max_units: usize,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for DemuxConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_units: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub level: String,
}

pub fn load(cfg_path: &String) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(cfg_path)?;
    let decoded_config: Config = toml::from_str(&content[..])?;
    decoded_config.check()?;
    Ok(decoded_config)
}
