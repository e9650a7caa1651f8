use std::io::Write;

use bio::io::fasta;
use camino::Utf8PathBuf;
use tracing::info;

use super::{Plugin, PluginContext, PluginOutcome, SkipReason};
use crate::domain::PluginName;
use crate::error::KiraError;
use crate::fs_util;
use crate::genome::Genome;

#[derive(Debug, Clone, Copy, Default)]
pub struct SizesPlugin;

pub fn sequence_sizes(genome: &Genome) -> Result<Vec<(String, usize)>, KiraError> {
    let reader = fasta::Reader::new(fs_util::open_maybe_gzipped(genome.filename())?);
    reader
        .records()
        .map(|record| {
            let record = record.map_err(|err| KiraError::Fasta {
                path: genome.filename().to_string(),
                message: err.to_string(),
            })?;
            Ok((record.id().to_string(), record.seq().len()))
        })
        .collect()
}

impl Plugin for SizesPlugin {
    fn name(&self) -> PluginName {
        PluginName::Sizes
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &[]
    }

    fn outputs(&self, genome: &Genome) -> Vec<Utf8PathBuf> {
        vec![genome.sizes_file()]
    }

    fn after_genome_download(
        &self,
        genome: &Genome,
        ctx: &PluginContext<'_>,
    ) -> Result<PluginOutcome, KiraError> {
        let destination = genome.sizes_file();
        if destination.as_std_path().exists() && !ctx.force {
            return Ok(PluginOutcome::Skipped(SkipReason::AlreadyPresent));
        }

        info!(genome = %genome.name(), "computing sequence sizes");
        let mut content = Vec::new();
        for (id, length) in sequence_sizes(genome)? {
            writeln!(content, "{id}\t{length}")
                .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        }
        fs_util::write_bytes_atomic(&destination, &content)?;
        Ok(PluginOutcome::Created {
            outputs: vec![destination],
        })
    }
}
