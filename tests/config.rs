use std::fs;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use kira_genome_manager::config::{
    Config, ConfigLoader, PluginEntry, PluginEntryObject, PluginRequest, resolve_genomes_dir,
};
use kira_genome_manager::domain::PluginName;
use kira_genome_manager::error::KiraError;

#[test]
fn parse_config_mixed_entries() {
    let config = Config {
        schema_version: Some(1),
        genomes_dir: Some(Utf8PathBuf::from("/data/genomes")),
        threads: Some(8),
        plugins: Some(vec![
            PluginEntry::Shorthand("bwa".to_string()),
            PluginEntry::Detailed(PluginEntryObject {
                name: "blacklist".to_string(),
                force: Some(true),
            }),
        ]),
    };

    let resolved = ConfigLoader::resolve_config(config).unwrap();
    assert_eq!(resolved.threads, 8);
    assert_eq!(
        resolved.plugins,
        vec![
            PluginRequest {
                name: PluginName::Bwa,
                force: false
            },
            PluginRequest {
                name: PluginName::Blacklist,
                force: true
            },
        ]
    );
    assert_eq!(
        resolved.forced_plugins().into_iter().collect::<Vec<_>>(),
        vec![PluginName::Blacklist]
    );
}

#[test]
fn config_file_round_trip() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("kira-gm.json");
    fs::write(
        &path,
        r#"{ "genomes_dir": "/srv/genomes", "plugins": ["minimap2", { "name": "gaps" }] }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.schema_version, 1);
    assert_eq!(resolved.threads, 1);
    assert_eq!(resolved.plugins.len(), 2);

    let genomes_dir = resolve_genomes_dir(None, &resolved).unwrap();
    assert_eq!(genomes_dir, Utf8PathBuf::from("/srv/genomes"));
    let flagged = resolve_genomes_dir(Some(Utf8PathBuf::from("/tmp/g")), &resolved).unwrap();
    assert_eq!(flagged, Utf8PathBuf::from("/tmp/g"));
}

#[test]
fn rejects_bad_config() {
    let err = ConfigLoader::resolve_config(Config {
        threads: Some(0),
        ..Config::default()
    })
    .unwrap_err();
    assert_matches!(err, KiraError::InvalidConfig(_));

    let err = ConfigLoader::resolve_config(Config {
        plugins: Some(vec![PluginEntry::Shorthand("star".to_string())]),
        ..Config::default()
    })
    .unwrap_err();
    assert_matches!(err, KiraError::UnknownPlugin(_));

    let temp = tempfile::tempdir().unwrap();
    let missing = temp.path().join("absent.json");
    let err = ConfigLoader::resolve(missing.to_str()).unwrap_err();
    assert_matches!(err, KiraError::ConfigRead(_));
}
