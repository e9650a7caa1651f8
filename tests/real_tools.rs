//! Runs the index plugins against the real executables when they are on
//! `PATH`. Each check is skipped when its tool is not installed.

mod common;

use kira_genome_manager::plugins::{
    Bowtie2Plugin, BwaPlugin, GmapPlugin, Hisat2Plugin, Minimap2Plugin, Plugin, PluginContext,
    PluginOutcome,
};
use kira_genome_manager::tools::Toolbox;

use common::{GENOME_NAME, LAYOUTS, stub_lock, synthetic_genome, write_genome_with};

fn check_installed(plugin: &dyn Plugin, relative_output: &str) {
    let toolbox = Toolbox::from_env();
    let tool = plugin.required_tools()[0];
    if !toolbox.is_available(tool) {
        eprintln!("skipping {}: {tool} not installed", plugin.name());
        return;
    }

    let _guard = stub_lock();
    let content = synthetic_genome(20_000);
    for layout in LAYOUTS {
        let temp = tempfile::tempdir().unwrap();
        let genome = write_genome_with(temp.path(), layout, &content);
        let ctx = PluginContext::new(&toolbox);

        let outcome = plugin.after_genome_download(&genome, &ctx).unwrap();
        assert!(matches!(outcome, PluginOutcome::Created { .. }));
        let expected = genome.dir().join(relative_output);
        assert!(
            expected.as_std_path().exists(),
            "{expected} missing for {layout:?}"
        );
    }
}

#[test]
fn bwa() {
    check_installed(&BwaPlugin, &format!("index/bwa/{GENOME_NAME}.fa.sa"));
}

#[test]
fn minimap2() {
    check_installed(&Minimap2Plugin, &format!("index/minimap2/{GENOME_NAME}.mmi"));
}

#[test]
fn bowtie2() {
    check_installed(&Bowtie2Plugin, &format!("index/bowtie2/{GENOME_NAME}.1.bt2"));
}

#[test]
fn hisat2() {
    check_installed(&Hisat2Plugin, &format!("index/hisat2/{GENOME_NAME}.1.ht2"));
}

#[test]
fn gmap() {
    check_installed(
        &GmapPlugin,
        &format!("index/gmap/{GENOME_NAME}/{GENOME_NAME}.version"),
    );
}
