//! Post-download plugins. Each plugin turns a [`Genome`] on disk into one
//! derived artifact, usually by invoking a single external tool.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{info, warn};

use crate::blacklist::BlacklistSource;
use crate::domain::PluginName;
use crate::error::KiraError;
use crate::fs_util;
use crate::genome::Genome;
use crate::tools::Toolbox;

pub mod blacklist;
pub mod bowtie2;
pub mod bwa;
pub mod gaps;
pub mod gmap;
pub mod hisat2;
pub mod minimap2;
pub mod sizes;

pub use blacklist::BlacklistPlugin;
pub use bowtie2::Bowtie2Plugin;
pub use bwa::BwaPlugin;
pub use gaps::GapsPlugin;
pub use gmap::GmapPlugin;
pub use hisat2::Hisat2Plugin;
pub use minimap2::Minimap2Plugin;
pub use sizes::SizesPlugin;

#[derive(Debug, Clone)]
pub struct PluginContext<'a> {
    pub toolbox: &'a Toolbox,
    pub threads: usize,
    pub force: bool,
}

impl<'a> PluginContext<'a> {
    pub fn new(toolbox: &'a Toolbox) -> Self {
        Self {
            toolbox,
            threads: 1,
            force: false,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    MissingTool(String),
    AlreadyPresent,
    NotAvailable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingTool(tool) => write!(f, "{tool} not installed"),
            SkipReason::AlreadyPresent => write!(f, "output already present"),
            SkipReason::NotAvailable(message) => write!(f, "{message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginOutcome {
    Created { outputs: Vec<Utf8PathBuf> },
    Skipped(SkipReason),
}

pub trait Plugin: Send + Sync {
    fn name(&self) -> PluginName;

    /// Executables that must be on the search path for the plugin to run.
    fn required_tools(&self) -> &'static [&'static str];

    /// Paths the plugin produces for `genome`; the first one marks completion.
    fn outputs(&self, genome: &Genome) -> Vec<Utf8PathBuf>;

    fn after_genome_download(
        &self,
        genome: &Genome,
        ctx: &PluginContext<'_>,
    ) -> Result<PluginOutcome, KiraError>;
}

pub(crate) enum Preflight {
    Ready(PathBuf),
    Skip(SkipReason),
}

/// Shared checks for index plugins: the tool must exist, and an existing index
/// is kept unless `force` is set, in which case `index_dir` is wiped.
pub(crate) fn preflight_index(
    plugin: PluginName,
    ctx: &PluginContext<'_>,
    tool: &str,
    primary: &Utf8Path,
    index_dir: &Utf8Path,
) -> Result<Preflight, KiraError> {
    let Some(program) = ctx.toolbox.locate(tool) else {
        warn!(plugin = %plugin, tool, "tool not installed; skipping");
        return Ok(Preflight::Skip(SkipReason::MissingTool(tool.to_string())));
    };
    if primary.as_std_path().exists() {
        if !ctx.force {
            info!(plugin = %plugin, path = %primary, "index already present");
            return Ok(Preflight::Skip(SkipReason::AlreadyPresent));
        }
        fs_util::remove_dir_if_exists(index_dir)?;
    }
    fs_util::ensure_dir(index_dir)?;
    Ok(Preflight::Ready(program))
}

#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
    active: BTreeSet<PluginName>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin<S: BlacklistSource + 'static>(source: S) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(BwaPlugin));
        registry.register(Box::new(Minimap2Plugin));
        registry.register(Box::new(Bowtie2Plugin));
        registry.register(Box::new(Hisat2Plugin));
        registry.register(Box::new(GmapPlugin));
        registry.register(Box::new(BlacklistPlugin::new(source)));
        registry.register(Box::new(SizesPlugin));
        registry.register(Box::new(GapsPlugin));
        registry
    }

    /// Adds `plugin`, replacing any plugin registered under the same name.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        let name = plugin.name();
        match self.plugins.iter_mut().find(|existing| existing.name() == name) {
            Some(slot) => *slot = plugin,
            None => self.plugins.push(plugin),
        }
    }

    pub fn activate(&mut self, name: PluginName) -> Result<(), KiraError> {
        if self.get(name).is_none() {
            return Err(KiraError::UnknownPlugin(name.to_string()));
        }
        self.active.insert(name);
        Ok(())
    }

    pub fn deactivate(&mut self, name: PluginName) {
        self.active.remove(&name);
    }

    pub fn is_active(&self, name: PluginName) -> bool {
        self.active.contains(&name)
    }

    pub fn get(&self, name: PluginName) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|plugin| plugin.name() == name)
            .map(|plugin| plugin.as_ref())
    }

    pub fn plugins(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.plugins.iter().map(|plugin| plugin.as_ref())
    }

    pub fn active(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.plugins()
            .filter(|plugin| self.active.contains(&plugin.name()))
    }
}
