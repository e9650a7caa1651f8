use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use tracing::{info, warn};

use super::{Plugin, PluginContext, PluginOutcome, SkipReason};
use crate::blacklist::{BlacklistSource, blacklist_url};
use crate::domain::PluginName;
use crate::error::KiraError;
use crate::fs_util;
use crate::genome::Genome;

static FASTA_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.fa(\.gz)?$").expect("valid FASTA suffix pattern"));

/// `X.fa` and `X.fa.gz` both map to `X.blacklist.bed.gz`.
pub fn blacklist_path(genome_file: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(
        FASTA_SUFFIX
            .replace(genome_file.as_str(), ".blacklist.bed.gz")
            .into_owned(),
    )
}

pub struct BlacklistPlugin<S: BlacklistSource> {
    source: S,
}

impl<S: BlacklistSource> BlacklistPlugin<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: BlacklistSource> Plugin for BlacklistPlugin<S> {
    fn name(&self) -> PluginName {
        PluginName::Blacklist
    }

    fn required_tools(&self) -> &'static [&'static str] {
        &[]
    }

    fn outputs(&self, genome: &Genome) -> Vec<Utf8PathBuf> {
        vec![blacklist_path(genome.filename())]
    }

    fn after_genome_download(
        &self,
        genome: &Genome,
        ctx: &PluginContext<'_>,
    ) -> Result<PluginOutcome, KiraError> {
        let destination = blacklist_path(genome.filename());
        if destination.as_std_path().exists() && !ctx.force {
            return Ok(PluginOutcome::Skipped(SkipReason::AlreadyPresent));
        }

        let assembly = genome.name().assembly();
        let Some(url) = blacklist_url(assembly) else {
            warn!(genome = %genome.name(), "no blacklist known for {assembly}");
            return Ok(PluginOutcome::Skipped(SkipReason::NotAvailable(format!(
                "no blacklist known for {assembly}"
            ))));
        };

        info!(genome = %genome.name(), url = %url, "downloading blacklist");
        let temp = fs_util::sibling_tempfile(&destination)?;
        self.source.download(&url, temp.path())?;
        fs_util::persist(temp, &destination)?;
        Ok(PluginOutcome::Created {
            outputs: vec![destination],
        })
    }
}
