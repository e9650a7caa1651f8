use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;
use tracing::debug;

use crate::error::KiraError;

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub path: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Toolbox {
    search_path: Vec<PathBuf>,
}

impl Toolbox {
    pub fn from_env() -> Self {
        let search_path = std::env::var_os("PATH")
            .map(|value| std::env::split_paths(&value).collect())
            .unwrap_or_default();
        Self { search_path }
    }

    pub fn with_search_path<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_path: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        for dir in &self.search_path {
            let exe = dir.join(format!("{name}.exe"));
            if is_executable(&exe) {
                return Some(exe);
            }
            let plain = dir.join(name);
            if is_executable(&plain) {
                return Some(plain);
            }
        }
        None
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.locate(name).is_some()
    }

    pub fn run(&self, program: &Path, args: &[OsString]) -> Result<(), KiraError> {
        debug!(program = %program.display(), args = ?args, "running tool");
        let output = self
            .command(program, args)
            .output()
            .map_err(|err| tool_failed(program, err.to_string()))?;
        if output.status.success() {
            return Ok(());
        }
        Err(tool_failed(program, failure_message(program, &output.stderr)))
    }

    /// Runs `program`, writing its stdout to `destination`.
    pub fn run_to_file(
        &self,
        program: &Path,
        args: &[OsString],
        destination: &Path,
    ) -> Result<(), KiraError> {
        debug!(
            program = %program.display(),
            args = ?args,
            destination = %destination.display(),
            "running tool"
        );
        let stdout =
            File::create(destination).map_err(|err| KiraError::Filesystem(err.to_string()))?;
        let output = self
            .command(program, args)
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| tool_failed(program, err.to_string()))?;
        if output.status.success() {
            return Ok(());
        }
        Err(tool_failed(program, failure_message(program, &output.stderr)))
    }

    pub fn tool_info(&self, name: &str) -> ToolInfo {
        let path = self.locate(name);
        ToolInfo {
            name: name.to_string(),
            version: path.as_deref().and_then(|path| self.tool_version(path)),
            path: path.map(|path| path.display().to_string()),
        }
    }

    fn tool_version(&self, path: &Path) -> Option<String> {
        let output = self
            .command(path, &[OsString::from("--version")])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let first = stdout.lines().next()?.trim().to_string();
        if first.is_empty() { None } else { Some(first) }
    }

    fn command(&self, program: &Path, args: &[OsString]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args);
        // Wrapper scripts (hisat2-build, gmap_build) resolve siblings through PATH.
        let inherited = std::env::var_os("PATH")
            .map(|value| std::env::split_paths(&value).collect::<Vec<_>>())
            .unwrap_or_default();
        let mut dirs = self.search_path.clone();
        dirs.extend(inherited.into_iter().filter(|dir| !self.search_path.contains(dir)));
        if let Ok(path) = std::env::join_paths(dirs) {
            cmd.env("PATH", path);
        }
        cmd
    }
}

fn tool_failed(program: &Path, message: String) -> KiraError {
    let tool = program
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string());
    KiraError::ToolFailed { tool, message }
}

fn failure_message(program: &Path, stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr).trim().to_string();
    if stderr.is_empty() {
        format!("command failed: {}", program.display())
    } else {
        stderr
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
