use std::ffi::OsString;

use camino::Utf8PathBuf;
use tracing::info;

use super::{Plugin, PluginContext, PluginOutcome, Preflight, preflight_index};
use crate::domain::PluginName;
use crate::error::KiraError;
use crate::genome::Genome;

/// `bwa index`, prefix `index/bwa/<name>.fa`. bwa reads gzip input itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct BwaPlugin;

impl BwaPlugin {
    fn prefix(genome: &Genome) -> Utf8PathBuf {
        genome
            .index_dir("bwa")
            .join(format!("{}.fa", genome.name()))
    }
}

impl Plugin for BwaPlugin {
    fn name(&self) -> PluginName {
        PluginName::Bwa
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &["bwa"]
    }

    fn outputs(&self, genome: &Genome) -> Vec<Utf8PathBuf> {
        let prefix = Self::prefix(genome);
        ["sa", "bwt", "pac", "ann", "amb"]
            .iter()
            .map(|ext| Utf8PathBuf::from(format!("{prefix}.{ext}")))
            .collect()
    }

    fn after_genome_download(
        &self,
        genome: &Genome,
        ctx: &PluginContext<'_>,
    ) -> Result<PluginOutcome, KiraError> {
        let outputs = self.outputs(genome);
        let index_dir = genome.index_dir("bwa");
        let program = match preflight_index(self.name(), ctx, "bwa", &outputs[0], &index_dir)? {
            Preflight::Ready(program) => program,
            Preflight::Skip(reason) => return Ok(PluginOutcome::Skipped(reason)),
        };

        info!(genome = %genome.name(), "building bwa index");
        let args: Vec<OsString> = vec![
            "index".into(),
            "-p".into(),
            Self::prefix(genome).into_std_path_buf().into_os_string(),
            genome.filename().as_os_str().to_owned(),
        ];
        ctx.toolbox.run(&program, &args)?;
        Ok(PluginOutcome::Created { outputs })
    }
}
