use std::ffi::OsString;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use super::{Plugin, PluginContext, PluginOutcome, Preflight, preflight_index};
use crate::domain::PluginName;
use crate::error::KiraError;
use crate::fs_util;
use crate::genome::Genome;

const SPLICE_SITES_SCRIPT: &str = "hisat2_extract_splice_sites.py";
const EXONS_SCRIPT: &str = "hisat2_extract_exons.py";

/// `hisat2-build`. With an annotation GTF and the hisat2 extraction scripts
/// available, splice sites and exons are added to the index.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hisat2Plugin;

impl Hisat2Plugin {
    fn annotation_args(
        genome: &Genome,
        ctx: &PluginContext<'_>,
        index_dir: &Utf8Path,
    ) -> Result<Vec<OsString>, KiraError> {
        let Some(gtf) = genome.annotation_gtf() else {
            return Ok(Vec::new());
        };
        let (Some(splice_script), Some(exon_script)) = (
            ctx.toolbox.locate(SPLICE_SITES_SCRIPT),
            ctx.toolbox.locate(EXONS_SCRIPT),
        ) else {
            debug!(genome = %genome.name(), "hisat2 extraction scripts not found; indexing without annotation");
            return Ok(Vec::new());
        };

        let plain_gtf = fs_util::plain_file(&gtf, index_dir)?;
        let gtf_arg = vec![plain_gtf.path().as_os_str().to_owned()];
        let splice_sites = index_dir.join(format!("{}.ss", genome.name()));
        let exons = index_dir.join(format!("{}.exon", genome.name()));
        ctx.toolbox
            .run_to_file(&splice_script, &gtf_arg, splice_sites.as_std_path())?;
        ctx.toolbox
            .run_to_file(&exon_script, &gtf_arg, exons.as_std_path())?;

        Ok(vec![
            "--ss".into(),
            splice_sites.into_std_path_buf().into_os_string(),
            "--exon".into(),
            exons.into_std_path_buf().into_os_string(),
        ])
    }
}

impl Plugin for Hisat2Plugin {
    fn name(&self) -> PluginName {
        PluginName::Hisat2
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &["hisat2-build"]
    }

    fn outputs(&self, genome: &Genome) -> Vec<Utf8PathBuf> {
        let index_dir = genome.index_dir("hisat2");
        (1..=8)
            .map(|part| index_dir.join(format!("{}.{part}.ht2", genome.name())))
            .collect()
    }

    fn after_genome_download(
        &self,
        genome: &Genome,
        ctx: &PluginContext<'_>,
    ) -> Result<PluginOutcome, KiraError> {
        let outputs = self.outputs(genome);
        let index_dir = genome.index_dir("hisat2");
        let program =
            match preflight_index(self.name(), ctx, "hisat2-build", &outputs[0], &index_dir)? {
                Preflight::Ready(program) => program,
                Preflight::Skip(reason) => return Ok(PluginOutcome::Skipped(reason)),
            };

        let mut args: Vec<OsString> = vec!["-p".into(), ctx.threads.to_string().into()];
        args.extend(Self::annotation_args(genome, ctx, &index_dir)?);

        let fasta = fs_util::plain_file(genome.filename(), &index_dir)?;
        args.push(fasta.path().as_os_str().to_owned());
        args.push(
            index_dir
                .join(genome.name().as_str())
                .into_std_path_buf()
                .into_os_string(),
        );

        info!(genome = %genome.name(), threads = ctx.threads, "building hisat2 index");
        ctx.toolbox.run(&program, &args)?;
        Ok(PluginOutcome::Created { outputs })
    }
}
