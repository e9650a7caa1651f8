use std::ffi::OsString;

use camino::Utf8PathBuf;
use tracing::info;

use super::{Plugin, PluginContext, PluginOutcome, Preflight, preflight_index};
use crate::domain::PluginName;
use crate::error::KiraError;
use crate::fs_util;
use crate::genome::Genome;

#[derive(Debug, Clone, Copy, Default)]
pub struct GmapPlugin;

impl Plugin for GmapPlugin {
    fn name(&self) -> PluginName {
        PluginName::Gmap
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &["gmap_build"]
    }

    fn outputs(&self, genome: &Genome) -> Vec<Utf8PathBuf> {
        let db_dir = genome.index_dir("gmap").join(genome.name().as_str());
        vec![db_dir.join(format!("{}.version", genome.name())), db_dir]
    }

    fn after_genome_download(
        &self,
        genome: &Genome,
        ctx: &PluginContext<'_>,
    ) -> Result<PluginOutcome, KiraError> {
        let outputs = self.outputs(genome);
        let index_dir = genome.index_dir("gmap");
        let program =
            match preflight_index(self.name(), ctx, "gmap_build", &outputs[0], &index_dir)? {
                Preflight::Ready(program) => program,
                Preflight::Skip(reason) => return Ok(PluginOutcome::Skipped(reason)),
            };

        let fasta = fs_util::plain_file(genome.filename(), &index_dir)?;
        info!(genome = %genome.name(), "building gmap database");
        let args: Vec<OsString> = vec![
            "-D".into(),
            index_dir.as_os_str().to_owned(),
            "-d".into(),
            genome.name().as_str().into(),
            fasta.path().as_os_str().to_owned(),
        ];
        ctx.toolbox.run(&program, &args)?;
        Ok(PluginOutcome::Created { outputs })
    }
}
