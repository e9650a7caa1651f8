use std::ffi::OsString;

use camino::Utf8PathBuf;
use tracing::info;

use super::{Plugin, PluginContext, PluginOutcome, Preflight, preflight_index};
use crate::domain::PluginName;
use crate::error::KiraError;
use crate::fs_util;
use crate::genome::Genome;

#[derive(Debug, Clone, Copy, Default)]
pub struct Bowtie2Plugin;

impl Plugin for Bowtie2Plugin {
    fn name(&self) -> PluginName {
        PluginName::Bowtie2
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &["bowtie2-build"]
    }

    fn outputs(&self, genome: &Genome) -> Vec<Utf8PathBuf> {
        let index_dir = genome.index_dir("bowtie2");
        ["1.bt2", "2.bt2", "3.bt2", "4.bt2", "rev.1.bt2", "rev.2.bt2"]
            .iter()
            .map(|ext| index_dir.join(format!("{}.{ext}", genome.name())))
            .collect()
    }

    fn after_genome_download(
        &self,
        genome: &Genome,
        ctx: &PluginContext<'_>,
    ) -> Result<PluginOutcome, KiraError> {
        let outputs = self.outputs(genome);
        let index_dir = genome.index_dir("bowtie2");
        let program =
            match preflight_index(self.name(), ctx, "bowtie2-build", &outputs[0], &index_dir)? {
                Preflight::Ready(program) => program,
                Preflight::Skip(reason) => return Ok(PluginOutcome::Skipped(reason)),
            };

        let fasta = fs_util::plain_file(genome.filename(), &index_dir)?;
        info!(genome = %genome.name(), threads = ctx.threads, "building bowtie2 index");
        let args: Vec<OsString> = vec![
            "--threads".into(),
            ctx.threads.to_string().into(),
            fasta.path().as_os_str().to_owned(),
            index_dir.join(genome.name().as_str()).into_std_path_buf().into_os_string(),
        ];
        ctx.toolbox.run(&program, &args)?;
        Ok(PluginOutcome::Created { outputs })
    }
}
