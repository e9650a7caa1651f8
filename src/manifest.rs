use std::fs;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::PluginName;
use crate::error::KiraError;
use crate::fs_util;
use crate::genome::Genome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRecord {
    pub plugin: PluginName,
    pub genome: String,
    pub outputs: Vec<String>,
    pub tool: Option<String>,
    pub tool_version: Option<String>,
    pub completed_at: String,
}

pub fn record_path(genome: &Genome, plugin: PluginName) -> Utf8PathBuf {
    genome.metadata_dir().join(format!("{plugin}.json"))
}

pub fn write_record(genome: &Genome, record: &PluginRecord) -> Result<(), KiraError> {
    let content = serde_json::to_vec_pretty(record)
        .map_err(|err| KiraError::Filesystem(err.to_string()))?;
    fs_util::write_bytes_atomic(&record_path(genome, record.plugin), &content)
}

pub fn list_records(genome: &Genome) -> Result<Vec<PluginRecord>, KiraError> {
    let dir = genome.metadata_dir();
    if !dir.as_std_path().exists() {
        return Ok(Vec::new());
    }
    let entries =
        fs::read_dir(dir.as_std_path()).map_err(|err| KiraError::Filesystem(err.to_string()))?;
    let mut records = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|err| KiraError::Filesystem(err.to_string()))?
            .path();
        if !path.is_file() || path.extension().map(|ext| ext != "json").unwrap_or(true) {
            continue;
        }
        let content =
            fs::read_to_string(&path).map_err(|err| KiraError::Filesystem(err.to_string()))?;
        let record: PluginRecord = serde_json::from_str(&content)
            .map_err(|err| KiraError::Filesystem(format!("{}: {err}", path.display())))?;
        records.push(record);
    }
    records.sort_by_key(|record| record.plugin);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_round_trip_sorted_by_plugin() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("mm10")).unwrap();
        fs::write(root.join("mm10/mm10.fa"), b">chr1\nA\n").unwrap();
        let genome = Genome::open("mm10".parse().unwrap(), root).unwrap();

        for plugin in [PluginName::Gaps, PluginName::Bwa] {
            let record = PluginRecord {
                plugin,
                genome: "mm10".to_string(),
                outputs: vec![],
                tool: None,
                tool_version: None,
                completed_at: "2026-01-01T00:00:00Z".to_string(),
            };
            write_record(&genome, &record).unwrap();
        }

        let records = list_records(&genome).unwrap();
        let plugins = records.iter().map(|r| r.plugin).collect::<Vec<_>>();
        assert_eq!(plugins, vec![PluginName::Bwa, PluginName::Gaps]);
    }
}
