use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use flate2::read::MultiGzDecoder;
use tempfile::NamedTempFile;

use crate::error::KiraError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A text file that external tools can read without gzip support.
#[derive(Debug)]
pub enum PlainFile {
    Original(Utf8PathBuf),
    Extracted(NamedTempFile),
}

impl PlainFile {
    pub fn path(&self) -> &Path {
        match self {
            PlainFile::Original(path) => path.as_std_path(),
            PlainFile::Extracted(file) => file.path(),
        }
    }
}

pub fn is_gzipped(path: &Utf8Path) -> Result<bool, KiraError> {
    let mut file = File::open(path.as_std_path())
        .map_err(|err| KiraError::Filesystem(format!("open {path}: {err}")))?;
    let mut magic = [0u8; 2];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == GZIP_MAGIC),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(KiraError::Filesystem(format!("read {path}: {err}"))),
    }
}

pub fn open_maybe_gzipped(path: &Utf8Path) -> Result<Box<dyn Read>, KiraError> {
    let gzipped = is_gzipped(path)?;
    let file = File::open(path.as_std_path())
        .map_err(|err| KiraError::Filesystem(format!("open {path}: {err}")))?;
    let reader = BufReader::new(file);
    if gzipped {
        Ok(Box::new(MultiGzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Returns `source` unchanged when it is plain text, otherwise decompresses it
/// into a temporary file inside `scratch_dir` that is removed on drop.
pub fn plain_file(source: &Utf8Path, scratch_dir: &Utf8Path) -> Result<PlainFile, KiraError> {
    if !is_gzipped(source)? {
        return Ok(PlainFile::Original(source.to_path_buf()));
    }
    ensure_dir(scratch_dir)?;
    let suffix = source
        .file_name()
        .map(|name| name.trim_end_matches(".gz"))
        .unwrap_or_default();
    let mut temp = tempfile::Builder::new()
        .prefix(".kira-gm-")
        .suffix(suffix)
        .tempfile_in(scratch_dir.as_std_path())
        .map_err(|err| KiraError::Filesystem(err.to_string()))?;
    let mut reader = open_maybe_gzipped(source)?;
    io::copy(&mut reader, temp.as_file_mut())
        .map_err(|err| KiraError::Filesystem(format!("decompress {source}: {err}")))?;
    Ok(PlainFile::Extracted(temp))
}

pub fn ensure_dir(path: &Utf8Path) -> Result<(), KiraError> {
    fs::create_dir_all(path.as_std_path())
        .map_err(|err| KiraError::Filesystem(format!("create {path}: {err}")))
}

pub fn remove_dir_if_exists(path: &Utf8Path) -> Result<(), KiraError> {
    if path.as_std_path().exists() {
        fs::remove_dir_all(path.as_std_path())
            .map_err(|err| KiraError::Filesystem(format!("remove {path}: {err}")))?;
    }
    Ok(())
}

pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), KiraError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(tmp_path.as_std_path(), content)
        .map_err(|err| KiraError::Filesystem(err.to_string()))?;
    fs::rename(tmp_path.as_std_path(), path.as_std_path())
        .map_err(|err| KiraError::Filesystem(err.to_string()))?;
    Ok(())
}

pub fn sibling_tempfile(dest: &Utf8Path) -> Result<NamedTempFile, KiraError> {
    let parent = dest
        .parent()
        .ok_or_else(|| KiraError::Filesystem("invalid destination path".to_string()))?;
    ensure_dir(parent)?;
    tempfile::Builder::new()
        .prefix(".kira-gm-file")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| KiraError::Filesystem(err.to_string()))
}

pub fn persist(temp: NamedTempFile, dest: &Utf8Path) -> Result<(), KiraError> {
    temp.persist(dest.as_std_path())
        .map_err(|err| KiraError::Filesystem(err.to_string()))?;
    Ok(())
}
