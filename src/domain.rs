use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::KiraError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PluginName {
    Bwa,
    Minimap2,
    Bowtie2,
    Hisat2,
    Gmap,
    Blacklist,
    Sizes,
    Gaps,
}

impl PluginName {
    pub const ALL: [PluginName; 8] = [
        PluginName::Bwa,
        PluginName::Minimap2,
        PluginName::Bowtie2,
        PluginName::Hisat2,
        PluginName::Gmap,
        PluginName::Blacklist,
        PluginName::Sizes,
        PluginName::Gaps,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginName::Bwa => "bwa",
            PluginName::Minimap2 => "minimap2",
            PluginName::Bowtie2 => "bowtie2",
            PluginName::Hisat2 => "hisat2",
            PluginName::Gmap => "gmap",
            PluginName::Blacklist => "blacklist",
            PluginName::Sizes => "sizes",
            PluginName::Gaps => "gaps",
        }
    }
}

impl fmt::Display for PluginName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PluginName {
    type Err = KiraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        PluginName::ALL
            .into_iter()
            .find(|name| name.as_str() == normalized)
            .ok_or_else(|| KiraError::UnknownPlugin(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomeName(String);

impl GenomeName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Assembly key used for lookups: everything before the first `.`.
    pub fn assembly(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for GenomeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GenomeName {
    type Err = KiraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_string();
        let is_valid = !normalized.is_empty()
            && normalized != "."
            && normalized != ".."
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'));
        if !is_valid {
            return Err(KiraError::InvalidGenomeName(value.to_string()));
        }
        Ok(Self(normalized))
    }
}
