use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::GenomeName;
use crate::error::KiraError;
use crate::fs_util;

const SEQUENCE_SUFFIXES: [&str; 2] = ["fa", "fa.gz"];
const ANNOTATION_SUFFIXES: [&str; 2] = ["annotation.gtf", "annotation.gtf.gz"];

#[derive(Debug, Clone)]
pub struct Genome {
    name: GenomeName,
    genomes_dir: Utf8PathBuf,
    filename: Utf8PathBuf,
}

impl Genome {
    /// Locates `<name>.fa`, falling back to `<name>.fa.gz`.
    pub fn open(name: GenomeName, genomes_dir: impl Into<Utf8PathBuf>) -> Result<Self, KiraError> {
        let genomes_dir = genomes_dir.into();
        let dir = genomes_dir.join(name.as_str());
        let filename = SEQUENCE_SUFFIXES
            .iter()
            .map(|suffix| dir.join(format!("{name}.{suffix}")))
            .find(|path| path.as_std_path().is_file())
            .ok_or_else(|| KiraError::GenomeNotFound(format!("{name} in {genomes_dir}")))?;

        Ok(Self {
            name,
            genomes_dir,
            filename,
        })
    }

    pub fn name(&self) -> &GenomeName {
        &self.name
    }

    pub fn genomes_dir(&self) -> &Utf8Path {
        &self.genomes_dir
    }

    pub fn dir(&self) -> Utf8PathBuf {
        self.genomes_dir.join(self.name.as_str())
    }

    pub fn filename(&self) -> &Utf8Path {
        &self.filename
    }

    pub fn is_compressed(&self) -> Result<bool, KiraError> {
        fs_util::is_gzipped(&self.filename)
    }

    pub fn index_dir(&self, tool: &str) -> Utf8PathBuf {
        self.dir().join("index").join(tool)
    }

    pub fn annotation_gtf(&self) -> Option<Utf8PathBuf> {
        let dir = self.dir();
        ANNOTATION_SUFFIXES
            .iter()
            .map(|suffix| dir.join(format!("{}.{suffix}", self.name)))
            .find(|path| path.as_std_path().is_file())
    }

    pub fn sizes_file(&self) -> Utf8PathBuf {
        self.dir().join(format!("{}.fa.sizes", self.name))
    }

    pub fn gaps_file(&self) -> Utf8PathBuf {
        self.dir().join(format!("{}.gaps.bed", self.name))
    }

    pub fn metadata_dir(&self) -> Utf8PathBuf {
        self.dir().join("metadata").join("plugins")
    }
}
