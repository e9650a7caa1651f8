use std::ffi::OsString;

use camino::Utf8PathBuf;
use tracing::info;

use super::{Plugin, PluginContext, PluginOutcome, Preflight, preflight_index};
use crate::domain::PluginName;
use crate::error::KiraError;
use crate::genome::Genome;

#[derive(Debug, Clone, Copy, Default)]
pub struct Minimap2Plugin;

impl Plugin for Minimap2Plugin {
    fn name(&self) -> PluginName {
        PluginName::Minimap2
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &["minimap2"]
    }

    fn outputs(&self, genome: &Genome) -> Vec<Utf8PathBuf> {
        vec![genome
            .index_dir("minimap2")
            .join(format!("{}.mmi", genome.name()))]
    }

    fn after_genome_download(
        &self,
        genome: &Genome,
        ctx: &PluginContext<'_>,
    ) -> Result<PluginOutcome, KiraError> {
        let outputs = self.outputs(genome);
        let index_dir = genome.index_dir("minimap2");
        let program =
            match preflight_index(self.name(), ctx, "minimap2", &outputs[0], &index_dir)? {
                Preflight::Ready(program) => program,
                Preflight::Skip(reason) => return Ok(PluginOutcome::Skipped(reason)),
            };

        info!(genome = %genome.name(), threads = ctx.threads, "building minimap2 index");
        let args: Vec<OsString> = vec![
            "-t".into(),
            ctx.threads.to_string().into(),
            "-d".into(),
            outputs[0].as_os_str().to_owned(),
            genome.filename().as_os_str().to_owned(),
        ];
        ctx.toolbox.run(&program, &args)?;
        Ok(PluginOutcome::Created { outputs })
    }
}
