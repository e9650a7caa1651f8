use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use crate::domain::PluginName;
use crate::error::KiraError;
use crate::genome::Genome;
use crate::manifest::{self, PluginRecord};
use crate::plugins::{PluginContext, PluginOutcome, PluginRegistry, SkipReason};
use crate::tools::{ToolInfo, Toolbox};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub threads: usize,
    pub force: bool,
    pub force_plugins: BTreeSet<PluginName>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            force: false,
            force_plugins: BTreeSet::new(),
        }
    }
}

impl RunOptions {
    fn force_for(&self, plugin: PluginName) -> bool {
        self.force || self.force_plugins.contains(&plugin)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub genome: String,
    pub genome_file: String,
    pub items: Vec<RunItemResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunItemResult {
    pub plugin: PluginName,
    pub action: String,
    pub reason: Option<SkipReason>,
    pub outputs: Vec<String>,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    pub plugins: Vec<ListEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    pub plugin: PluginName,
    pub active: bool,
    pub tools: Vec<ToolInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InfoResult {
    pub genome: String,
    pub genome_file: String,
    pub compressed: bool,
    pub records: Vec<PluginRecord>,
}

#[derive(Debug, Clone, Copy)]
pub enum ProgressSinkKind {
    Run,
    List,
    Info,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct LogSink {
    pub kind: ProgressSinkKind,
}

impl ProgressSink for LogSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => info!(
                kind = ?self.kind,
                elapsed_ms = elapsed.as_millis() as u64,
                "{}",
                event.message
            ),
            None => info!(kind = ?self.kind, "{}", event.message),
        }
    }
}

pub struct App {
    registry: PluginRegistry,
    toolbox: Toolbox,
}

impl App {
    pub fn new(registry: PluginRegistry, toolbox: Toolbox) -> Self {
        Self { registry, toolbox }
    }

    /// Runs every active plugin against `genome` in registration order. The
    /// first plugin error aborts the run.
    pub fn run(
        &self,
        genome: &Genome,
        options: RunOptions,
        sink: &dyn ProgressSink,
    ) -> Result<RunResult, KiraError> {
        let mut items = Vec::new();

        for plugin in self.registry.active() {
            let name = plugin.name();
            sink.event(ProgressEvent {
                message: format!("phase=Plugin; {name} on {}", genome.name()),
                elapsed: None,
            });

            let ctx = PluginContext::new(&self.toolbox)
                .with_threads(options.threads)
                .with_force(options.force_for(name));
            let start = Instant::now();
            let outcome = plugin.after_genome_download(genome, &ctx)?;
            let elapsed = start.elapsed();

            let item = match outcome {
                PluginOutcome::Created { outputs } => {
                    let outputs = outputs.iter().map(|path| path.to_string()).collect::<Vec<_>>();
                    let tool = plugin
                        .required_tools()
                        .first()
                        .map(|tool| self.toolbox.tool_info(tool));
                    let record = PluginRecord {
                        plugin: name,
                        genome: genome.name().to_string(),
                        outputs: outputs.clone(),
                        tool: tool.as_ref().and_then(|info| info.path.clone()),
                        tool_version: tool.and_then(|info| info.version),
                        completed_at: chrono::Utc::now().to_rfc3339(),
                    };
                    manifest::write_record(genome, &record)?;
                    sink.event(ProgressEvent {
                        message: format!("phase=Store; {name} created {} file(s)", outputs.len()),
                        elapsed: Some(elapsed),
                    });
                    RunItemResult {
                        plugin: name,
                        action: "created".to_string(),
                        reason: None,
                        outputs,
                        elapsed_ms: elapsed.as_millis(),
                    }
                }
                PluginOutcome::Skipped(reason) => {
                    sink.event(ProgressEvent {
                        message: format!("phase=Skip; {name}: {reason}"),
                        elapsed: Some(elapsed),
                    });
                    RunItemResult {
                        plugin: name,
                        action: "skipped".to_string(),
                        reason: Some(reason),
                        outputs: Vec::new(),
                        elapsed_ms: elapsed.as_millis(),
                    }
                }
            };
            items.push(item);
        }

        Ok(RunResult {
            genome: genome.name().to_string(),
            genome_file: genome.filename().to_string(),
            items,
        })
    }

    pub fn list(&self, sink: &dyn ProgressSink) -> ListResult {
        sink.event(ProgressEvent {
            message: "phase=Resolve; locating tools".to_string(),
            elapsed: None,
        });

        let plugins = self
            .registry
            .plugins()
            .map(|plugin| ListEntry {
                plugin: plugin.name(),
                active: self.registry.is_active(plugin.name()),
                tools: plugin
                    .required_tools()
                    .iter()
                    .map(|tool| self.toolbox.tool_info(tool))
                    .collect(),
            })
            .collect();

        ListResult { plugins }
    }

    pub fn info(&self, genome: &Genome, sink: &dyn ProgressSink) -> Result<InfoResult, KiraError> {
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; reading records for {}", genome.name()),
            elapsed: None,
        });

        Ok(InfoResult {
            genome: genome.name().to_string(),
            genome_file: genome.filename().to_string(),
            compressed: genome.is_compressed()?,
            records: manifest::list_records(genome)?,
        })
    }
}
