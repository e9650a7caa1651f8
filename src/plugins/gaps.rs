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
pub struct GapsPlugin;

/// Half-open, 0-based `[start, end)` runs of `N` in `seq`.
pub fn gap_runs(seq: &[u8]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (pos, base) in seq.iter().enumerate() {
        match (base.eq_ignore_ascii_case(&b'N'), start) {
            (true, None) => start = Some(pos),
            (false, Some(begin)) => {
                runs.push((begin, pos));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = start {
        runs.push((begin, seq.len()));
    }
    runs
}

impl Plugin for GapsPlugin {
    fn name(&self) -> PluginName {
        PluginName::Gaps
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &[]
    }

    fn outputs(&self, genome: &Genome) -> Vec<Utf8PathBuf> {
        vec![genome.gaps_file()]
    }

    fn after_genome_download(
        &self,
        genome: &Genome,
        ctx: &PluginContext<'_>,
    ) -> Result<PluginOutcome, KiraError> {
        let destination = genome.gaps_file();
        if destination.as_std_path().exists() && !ctx.force {
            return Ok(PluginOutcome::Skipped(SkipReason::AlreadyPresent));
        }

        info!(genome = %genome.name(), "scanning for gaps");
        let reader = fasta::Reader::new(fs_util::open_maybe_gzipped(genome.filename())?);
        let mut content = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| KiraError::Fasta {
                path: genome.filename().to_string(),
                message: err.to_string(),
            })?;
            for (start, end) in gap_runs(record.seq()) {
                writeln!(content, "{}\t{start}\t{end}", record.id())
                    .map_err(|err| KiraError::Filesystem(err.to_string()))?;
            }
        }
        fs_util::write_bytes_atomic(&destination, &content)?;
        Ok(PluginOutcome::Created {
            outputs: vec![destination],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_leading_inner_and_trailing_runs() {
        assert_eq!(gap_runs(b"NNACGnnnTN"), vec![(0, 2), (5, 8), (9, 10)]);
        assert!(gap_runs(b"ACGT").is_empty());
        assert!(gap_runs(b"").is_empty());
    }
}
