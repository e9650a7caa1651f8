use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_genome_manager::app::{App, LogSink, ProgressSinkKind, RunOptions};
use kira_genome_manager::blacklist::{BlacklistHttpClient, BlacklistSource};
use kira_genome_manager::config::{ConfigLoader, ResolvedConfig, resolve_genomes_dir};
use kira_genome_manager::domain::{GenomeName, PluginName};
use kira_genome_manager::error::KiraError;
use kira_genome_manager::genome::Genome;
use kira_genome_manager::output::{JsonOutput, OutputMode, TextOutput};
use kira_genome_manager::plugins::PluginRegistry;
use kira_genome_manager::tools::Toolbox;

#[derive(Parser)]
#[command(name = "kira-gm")]
#[command(about = "Build aligner indexes and companion files for genomes on disk")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Manage and run post-download plugins")]
    Plugins(PluginsArgs),
}

#[derive(Args)]
struct PluginsArgs {
    #[command(subcommand)]
    command: PluginsCommand,
}

#[derive(Subcommand)]
enum PluginsCommand {
    #[command(about = "List plugins, whether they are active and where their tools are")]
    List,
    #[command(about = "Run active plugins against a genome")]
    Run(RunArgs),
    #[command(about = "Show what plugins have produced for a genome")]
    Info(GenomeArgs),
}

#[derive(Args)]
struct GenomeArgs {
    genome: String,

    #[arg(long)]
    genomes_dir: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    target: GenomeArgs,

    /// Plugins to run instead of the configured set; repeatable.
    #[arg(long = "plugin", value_enum)]
    plugins: Vec<PluginName>,

    #[arg(long)]
    threads: Option<usize>,

    #[arg(long)]
    force: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(kira) = report.downcast_ref::<KiraError>() {
            return ExitCode::from(map_exit_code(kira));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &KiraError) -> u8 {
    match error {
        KiraError::GenomeNotFound(_) | KiraError::ConfigRead(_) => 2,
        KiraError::ToolFailed { .. }
        | KiraError::BlacklistHttp(_)
        | KiraError::BlacklistStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let Commands::Plugins(args) = cli.command;

    match args.command {
        PluginsCommand::List => {
            let mut registry = PluginRegistry::builtin(NopBlacklist);
            for request in &config.plugins {
                registry.activate(request.name)?;
            }
            let app = App::new(registry, Toolbox::from_env());
            run_list(&app, output_mode)
        }
        PluginsCommand::Run(args) => {
            let genome = open_genome(&args.target, &config)?;
            let mut registry = PluginRegistry::builtin(BlacklistHttpClient::new()?);
            if args.plugins.is_empty() {
                for request in &config.plugins {
                    registry.activate(request.name)?;
                }
            } else {
                for name in &args.plugins {
                    registry.activate(*name)?;
                }
            }
            let options = RunOptions {
                threads: args.threads.unwrap_or(config.threads).max(1),
                force: args.force,
                force_plugins: config.forced_plugins(),
            };
            let app = App::new(registry, Toolbox::from_env());
            run_plugins(&app, &genome, options, output_mode)
        }
        PluginsCommand::Info(args) => {
            let genome = open_genome(&args, &config)?;
            let app = App::new(PluginRegistry::new(), Toolbox::from_env());
            run_info(&app, &genome, output_mode)
        }
    }
}

fn open_genome(
    args: &GenomeArgs,
    config: &ResolvedConfig,
) -> miette::Result<Genome> {
    let name = args.genome.parse::<GenomeName>()?;
    let genomes_dir = resolve_genomes_dir(args.genomes_dir.clone(), config)?;
    Ok(Genome::open(name, genomes_dir)?)
}

fn run_plugins(
    app: &App,
    genome: &Genome,
    options: RunOptions,
    output_mode: OutputMode,
) -> miette::Result<()> {
    match output_mode {
        OutputMode::NonInteractive => {
            let result = app.run(genome, options, &JsonOutput)?;
            JsonOutput::print_run(&result).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let sink = LogSink {
                kind: ProgressSinkKind::Run,
            };
            let result = app.run(genome, options, &sink)?;
            TextOutput::print_run(&result);
        }
    }
    Ok(())
}

fn run_list(app: &App, output_mode: OutputMode) -> miette::Result<()> {
    match output_mode {
        OutputMode::NonInteractive => {
            let result = app.list(&JsonOutput);
            JsonOutput::print_list(&result).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let sink = LogSink {
                kind: ProgressSinkKind::List,
            };
            TextOutput::print_list(&app.list(&sink));
        }
    }
    Ok(())
}

fn run_info(app: &App, genome: &Genome, output_mode: OutputMode) -> miette::Result<()> {
    match output_mode {
        OutputMode::NonInteractive => {
            let result = app.info(genome, &JsonOutput)?;
            JsonOutput::print_info(&result).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let sink = LogSink {
                kind: ProgressSinkKind::Info,
            };
            TextOutput::print_info(&app.info(genome, &sink)?);
        }
    }
    Ok(())
}

struct NopBlacklist;

impl BlacklistSource for NopBlacklist {
    fn download(&self, _url: &str, _destination: &std::path::Path) -> Result<(), KiraError> {
        Err(KiraError::BlacklistHttp(
            "blacklist client not configured".to_string(),
        ))
    }
}
