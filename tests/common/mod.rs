#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use camino::Utf8PathBuf;
use flate2::Compression;
use flate2::write::GzEncoder;

use kira_genome_manager::blacklist::BlacklistSource;
use kira_genome_manager::error::KiraError;
use kira_genome_manager::genome::Genome;

pub const GENOME_NAME: &str = "dm3";

pub const SMALL_GENOME: &str = ">chr1 test sequence\nACGTNNNNACGTACGT\nACGTACGTNN\n>chr2\nnnACGT\n";

/// Serializes tests that write and then execute stub scripts, so no other
/// thread forks while a script is still open for writing.
static STUB_LOCK: Mutex<()> = Mutex::new(());

pub fn stub_lock() -> MutexGuard<'static, ()> {
    STUB_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Unzipped,
    Bgzipped,
}

pub const LAYOUTS: [Layout; 2] = [Layout::Unzipped, Layout::Bgzipped];

pub fn utf8(path: &Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).unwrap()
}

/// Writes `<root>/dm3/dm3.fa` or a multi-member `dm3.fa.gz` and opens it.
pub fn write_genome(root: &Path, layout: Layout) -> Genome {
    write_genome_with(root, layout, SMALL_GENOME)
}

pub fn write_genome_with(root: &Path, layout: Layout, content: &str) -> Genome {
    let dir = root.join(GENOME_NAME);
    fs::create_dir_all(&dir).unwrap();
    match layout {
        Layout::Unzipped => {
            fs::write(dir.join(format!("{GENOME_NAME}.fa")), content).unwrap();
        }
        Layout::Bgzipped => {
            let split = content[1..].find('>').map(|pos| pos + 1).unwrap_or(content.len());
            let (first, second) = content.split_at(split);
            let mut bytes = Vec::new();
            for block in [first, second] {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(block.as_bytes()).unwrap();
                bytes.extend(encoder.finish().unwrap());
            }
            fs::write(dir.join(format!("{GENOME_NAME}.fa.gz")), bytes).unwrap();
        }
    }
    Genome::open(GENOME_NAME.parse().unwrap(), utf8(root)).unwrap()
}

/// Two pseudo-random chromosomes, large enough for real index builders.
pub fn synthetic_genome(length: usize) -> String {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut out = String::new();
    for chrom in ["chr2L", "chr3R"] {
        out.push_str(&format!(">{chrom}\n"));
        for pos in 0..length {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            out.push(b"ACGT"[(state % 4) as usize] as char);
            if (pos + 1) % 60 == 0 {
                out.push('\n');
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(unix)]
pub fn install_stub(dir: &Path, name: &str, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    let mut script = String::from("#!/bin/sh\n");
    script.push_str(&format!(
        "case \"$1\" in --version) echo \"{name} stub 1.0\"; exit 0;; esac\n"
    ));
    script.push_str(body);
    script.push('\n');
    fs::write(&path, script).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
}

pub const BWA_STUB: &str = r#"[ "$1" = index ] && [ "$2" = -p ] || exit 1
for ext in sa bwt pac ann amb; do touch "$3.$ext"; done"#;

pub const MINIMAP2_STUB: &str = r#"[ "$1" = -t ] && [ "$3" = -d ] || exit 1
touch "$4""#;

pub const BOWTIE2_STUB: &str = r#"[ "$(head -c 1 "$3")" = ">" ] || { echo "not a plain FASTA: $3" >&2; exit 2; }
for ext in 1.bt2 2.bt2 3.bt2 4.bt2 rev.1.bt2 rev.2.bt2; do touch "$4.$ext"; done"#;

pub const HISAT2_STUB: &str = r#"eval fasta=\"\${$(($# - 1))}\"
eval prefix=\"\${$#}\"
[ "$(head -c 1 "$fasta")" = ">" ] || { echo "not a plain FASTA: $fasta" >&2; exit 2; }
echo "$@" > "$prefix.args"
for part in 1 2 3 4 5 6 7 8; do touch "$prefix.$part.ht2"; done"#;

pub const GMAP_STUB: &str = r#"[ "$1" = -D ] && [ "$3" = -d ] || exit 1
[ "$(head -c 1 "$5")" = ">" ] || { echo "not a plain FASTA: $5" >&2; exit 2; }
mkdir -p "$2/$4" && touch "$2/$4/$4.version""#;

pub const SPLICE_SITES_STUB: &str = r#"printf 'chr1\t10\t20\t+\n'"#;

pub const EXONS_STUB: &str = r#"printf 'chr1\t5\t30\t+\n'"#;

pub const FAILING_STUB: &str = r#"echo "index construction failed" >&2
exit 1"#;

/// Installs stubs for every index tool into `dir`.
#[cfg(unix)]
pub fn install_index_stubs(dir: &Path) {
    install_stub(dir, "bwa", BWA_STUB);
    install_stub(dir, "minimap2", MINIMAP2_STUB);
    install_stub(dir, "bowtie2-build", BOWTIE2_STUB);
    install_stub(dir, "hisat2-build", HISAT2_STUB);
    install_stub(dir, "gmap_build", GMAP_STUB);
}

/// Blacklist source that writes a fixed payload and remembers requested URLs.
#[derive(Clone, Default)]
pub struct MockBlacklist {
    pub urls: Arc<Mutex<Vec<String>>>,
}

pub const BLACKLIST_PAYLOAD: &[u8] = b"\x1f\x8bmock blacklist";

impl BlacklistSource for MockBlacklist {
    fn download(&self, url: &str, destination: &Path) -> Result<(), KiraError> {
        self.urls.lock().unwrap().push(url.to_string());
        fs::write(destination, BLACKLIST_PAYLOAD)
            .map_err(|err| KiraError::Filesystem(err.to_string()))
    }
}

/// Blacklist source whose every download fails.
pub struct OfflineBlacklist;

impl BlacklistSource for OfflineBlacklist {
    fn download(&self, _url: &str, _destination: &Path) -> Result<(), KiraError> {
        Err(KiraError::BlacklistHttp("offline".to_string()))
    }
}
