use std::io::{self, Write};

use serde::Serialize;

use crate::app::{InfoResult, ListResult, RunResult};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_run(result: &RunResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_list(result: &ListResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_info(result: &InfoResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl crate::app::ProgressSink for JsonOutput {
    fn event(&self, _event: crate::app::ProgressEvent) {}
}

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

pub struct TextOutput;

impl TextOutput {
    pub fn print_run(result: &RunResult) {
        println!("{CYAN}kira-gm: {} ({}){RESET}", result.genome, result.genome_file);
        for item in &result.items {
            match &item.reason {
                None => {
                    println!("{GREEN}+ {} created{RESET}", item.plugin);
                    for path in &item.outputs {
                        println!("{GREEN}    {path}{RESET}");
                    }
                }
                Some(reason) => println!("{YELLOW}- {} skipped: {reason}{RESET}", item.plugin),
            }
        }
    }

    pub fn print_list(result: &ListResult) {
        for entry in &result.plugins {
            let marker = if entry.active { "*" } else { " " };
            let tools = entry
                .tools
                .iter()
                .map(|tool| match &tool.path {
                    Some(path) => format!("{} ({path})", tool.name),
                    None => format!("{} (not found)", tool.name),
                })
                .collect::<Vec<_>>()
                .join(", ");
            if tools.is_empty() {
                println!("{marker} {:<10} built-in", entry.plugin.as_str());
            } else {
                println!("{marker} {:<10} {tools}", entry.plugin.as_str());
            }
        }
    }

    pub fn print_info(result: &InfoResult) {
        let compression = if result.compressed { ", gzip" } else { "" };
        println!(
            "{CYAN}{} ({}{compression}){RESET}",
            result.genome, result.genome_file
        );
        if result.records.is_empty() {
            println!("{YELLOW}no plugin has run for this genome{RESET}");
        }
        for record in &result.records {
            println!("{GREEN}{} at {}{RESET}", record.plugin, record.completed_at);
            if let Some(version) = &record.tool_version {
                println!("    tool: {version}");
            }
            for path in &record.outputs {
                println!("    {path}");
            }
        }
    }
}
