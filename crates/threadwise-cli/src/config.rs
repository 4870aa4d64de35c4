use config::builder::{ConfigBuilder, DefaultState};
use config::{Config as ConfigLoader, ConfigError, Environment, File, Map, Source};
use serde::Deserialize;
use std::path::Path;
use threadwise::{ChunkingConfig, SummarizationConfig};

/// Environment prefix to config section.
const ENV_SECTIONS: [(&str, &str); 3] = [
    ("CHUNKING", "chunking"),
    ("SUMMARY", "summary"),
    ("LOG", "logging"),
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub summary: SummarizationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (CHUNKING_, SUMMARY_ and LOG_ prefixes)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));

        Self::finish(builder, None)
    }

    /// Load config from a specific file, still honouring environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));
        Self::finish(builder, None)
    }

    /// `vars` replaces the process environment when set.
    fn finish(
        builder: ConfigBuilder<DefaultState>,
        vars: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let builder = ENV_SECTIONS
            .iter()
            .try_fold(builder, |builder, (prefix, section)| {
                env_overrides(builder, prefix, section, vars.clone())
            })?;

        builder.build()?.try_deserialize()
    }
}

/// `CHUNKING_CHUNK_SIZE=256` becomes `chunking.chunk_size = 256`.
fn env_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    prefix: &str,
    section: &str,
    vars: Option<Map<String, String>>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let values = Environment::with_prefix(prefix)
        .try_parsing(true)
        .source(vars)
        .collect()?;

    for (key, value) in values {
        builder = builder.set_override(format!("{}.{}", section, key), value)?;
    }
    Ok(builder)
}
