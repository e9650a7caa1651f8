use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::domain::PluginName;
use crate::error::KiraError;

pub const CONFIG_FILE: &str = "kira-gm.json";
pub const GENOMES_DIR_ENV: &str = "KIRA_GM_GENOMES_DIR";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub genomes_dir: Option<Utf8PathBuf>,
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub plugins: Option<Vec<PluginEntry>>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PluginEntry {
    Shorthand(String),
    Detailed(PluginEntryObject),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PluginEntryObject {
    pub name: String,
    #[serde(default)]
    pub force: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRequest {
    pub name: PluginName,
    pub force: bool,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub genomes_dir: Option<Utf8PathBuf>,
    pub threads: usize,
    pub plugins: Vec<PluginRequest>,
}

impl ResolvedConfig {
    pub fn forced_plugins(&self) -> BTreeSet<PluginName> {
        self.plugins
            .iter()
            .filter(|request| request.force)
            .map(|request| request.name)
            .collect()
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or `kira-gm.json` in the working directory. A missing
    /// default file resolves to the built-in defaults.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, KiraError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| KiraError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| KiraError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, KiraError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let threads = config.threads.unwrap_or(1);
        if threads == 0 {
            return Err(KiraError::InvalidConfig(
                "threads must be at least 1".to_string(),
            ));
        }

        let plugins = match config.plugins {
            Some(entries) => entries
                .into_iter()
                .map(|entry| match entry {
                    PluginEntry::Shorthand(value) => Ok(PluginRequest {
                        name: value.parse()?,
                        force: false,
                    }),
                    PluginEntry::Detailed(obj) => Ok(PluginRequest {
                        name: obj.name.parse()?,
                        force: obj.force.unwrap_or(false),
                    }),
                })
                .collect::<Result<Vec<_>, KiraError>>()?,
            None => default_plugins(),
        };

        Ok(ResolvedConfig {
            schema_version,
            genomes_dir: config.genomes_dir,
            threads,
            plugins,
        })
    }
}

pub fn default_plugins() -> Vec<PluginRequest> {
    [PluginName::Sizes, PluginName::Gaps]
        .into_iter()
        .map(|name| PluginRequest { name, force: false })
        .collect()
}

/// Flag value, then config, then `KIRA_GM_GENOMES_DIR`, then `<data dir>/genomes`.
pub fn resolve_genomes_dir(
    flag: Option<Utf8PathBuf>,
    config: &ResolvedConfig,
) -> Result<Utf8PathBuf, KiraError> {
    if let Some(dir) = flag.or_else(|| config.genomes_dir.clone()) {
        return Ok(dir);
    }
    if let Ok(value) = std::env::var(GENOMES_DIR_ENV)
        && !value.trim().is_empty()
    {
        return Ok(Utf8PathBuf::from(value.trim()));
    }
    BaseDirs::new()
        .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.data_dir().join("genomes")).ok())
        .ok_or_else(|| KiraError::Filesystem("unable to resolve genomes directory".to_string()))
}
