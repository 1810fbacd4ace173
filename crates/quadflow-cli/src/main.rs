use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use quadflow_core::{AnalysisKind, ControlFlowGraph, OptimizeConfig};
use quadflow_emit::{EmitterConfig, OutputFormat};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    FmtSubscriber,
};

#[derive(Parser)]
#[command(name = "quadflow")]
#[command(about = "quadflow - iterative dataflow analysis over quad control-flow graphs")]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the per-quad fixpoint of one analysis for every method.
    Analyze {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[arg(short, long, value_enum, default_value = "liveness")]
        analysis: AnalysisArg,

        /// Only analyze the method with this name.
        #[arg(short, long)]
        method: Option<String>,

        #[arg(long, value_enum, default_value = "text")]
        format: FormatArg,
    },

    /// List redundant null checks, one `method id id ...` line per method.
    NullChecks {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[arg(long, value_enum, default_value = "text")]
        format: FormatArg,
    },

    /// Remove redundant null checks, and with --full also dead code.
    Optimize {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[arg(short, long)]
        rounds: Option<usize>,

        #[arg(long)]
        full: bool,

        /// JSON optimizer config. Flags override its values.
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "text")]
        format: FormatArg,
    },

    /// Check quad files for syntax errors.
    Validate {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AnalysisArg {
    Liveness,
    Faintness,
    ReachingDefs,
    ConstantProp,
    NullCheck,
}

impl From<AnalysisArg> for AnalysisKind {
    fn from(arg: AnalysisArg) -> Self {
        match arg {
            AnalysisArg::Liveness => AnalysisKind::Liveness,
            AnalysisArg::Faintness => AnalysisKind::Faintness,
            AnalysisArg::ReachingDefs => AnalysisKind::ReachingDefs,
            AnalysisArg::ConstantProp => AnalysisKind::ConstantProp,
            AnalysisArg::NullCheck => AnalysisKind::NullCheck,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    if cli.no_color {
        colored::control::set_override(false);
    }
    let use_colors = !cli.no_color && std::io::stdout().is_terminal();
    let emitter_config = |format: FormatArg| EmitterConfig {
        use_colors,
        format: format.into(),
        ..EmitterConfig::default()
    };

    match cli.command {
        Commands::Analyze {
            inputs,
            analysis,
            method,
            format,
        } => cmd_analyze(inputs, analysis.into(), method, emitter_config(format)),
        Commands::NullChecks { inputs, format } => {
            cmd_null_checks(inputs, emitter_config(format))
        }
        Commands::Optimize {
            inputs,
            rounds,
            full,
            config,
            format,
        } => cmd_optimize(inputs, rounds, full, config, emitter_config(format)),
        Commands::Validate { inputs } => cmd_validate(inputs),
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

/// Files are taken as given; directories contribute every `*.quad` file below them.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            let before = files.len();
            for entry in walkdir::WalkDir::new(input).sort_by_file_name() {
                let entry = entry.with_context(|| format!("walking {}", input.display()))?;
                let is_quad = entry.path().extension().is_some_and(|ext| ext == "quad");
                if entry.file_type().is_file() && is_quad {
                    files.push(entry.into_path());
                }
            }
            if files.len() == before {
                bail!("no .quad files under {}", input.display());
            }
        } else {
            bail!("input not found: {}", input.display());
        }
    }
    tracing::debug!(files = files.len(), "collected inputs");
    Ok(files)
}

fn load_graphs(path: &Path) -> Result<Vec<ControlFlowGraph>> {
    quadflow_parser::parse_file(path).with_context(|| format!("failed to load {}", path.display()))
}

fn cmd_analyze(
    inputs: Vec<PathBuf>,
    kind: AnalysisKind,
    method: Option<String>,
    config: EmitterConfig,
) -> Result<()> {
    use quadflow_emit::{Emitter, ReportEmitter};

    let mut reports = Vec::new();
    for path in collect_inputs(&inputs)? {
        for mut cfg in load_graphs(&path)? {
            let name = cfg.method().name.clone();
            if method.as_ref().is_some_and(|wanted| *wanted != name) {
                continue;
            }
            let report = quadflow_core::run_analysis(kind, &mut cfg)
                .with_context(|| format!("{} failed on method {}", kind, name))?;
            reports.push(report);
        }
    }

    if let (Some(wanted), true) = (&method, reports.is_empty()) {
        bail!("no method named {}", wanted);
    }

    let emitter = ReportEmitter::new(config);
    emitter.emit_all(&reports, &mut std::io::stdout().lock())?;
    Ok(())
}

fn cmd_null_checks(inputs: Vec<PathBuf>, config: EmitterConfig) -> Result<()> {
    use quadflow_emit::{Emitter, NullCheckEmitter};

    let mut reports = Vec::new();
    for path in collect_inputs(&inputs)? {
        for mut cfg in load_graphs(&path)? {
            let name = cfg.method().name.clone();
            let report = quadflow_core::find_redundant_null_checks(&mut cfg)
                .with_context(|| format!("null-check analysis failed on method {}", name))?;
            reports.push(report);
        }
    }

    let emitter = NullCheckEmitter::new(config);
    emitter.emit_all(&reports, &mut std::io::stdout().lock())?;
    Ok(())
}

fn cmd_optimize(
    inputs: Vec<PathBuf>,
    rounds: Option<usize>,
    full: bool,
    config_path: Option<PathBuf>,
    config: EmitterConfig,
) -> Result<()> {
    use quadflow_emit::{Emitter, OptimizeEmitter};

    let mut optimize_config = match config_path {
        Some(path) => OptimizeConfig::load(&path)?,
        None => OptimizeConfig::default(),
    };
    if full {
        optimize_config.null_check_only = false;
    }
    if let Some(rounds) = rounds {
        optimize_config.rounds = rounds;
    }
    tracing::info!(
        rounds = optimize_config.rounds,
        null_check_only = optimize_config.null_check_only,
        "optimizer configured"
    );

    let mut summaries = Vec::new();
    for path in collect_inputs(&inputs)? {
        for mut cfg in load_graphs(&path)? {
            let name = cfg.method().name.clone();
            let summary = quadflow_core::optimize(&mut cfg, &optimize_config)
                .with_context(|| format!("optimization failed on method {}", name))?;
            summaries.push(summary);
        }
    }

    let emitter = OptimizeEmitter::new(config);
    emitter.emit_all(&summaries, &mut std::io::stdout().lock())?;
    Ok(())
}

fn cmd_validate(inputs: Vec<PathBuf>) -> Result<()> {
    use colored::*;
    use std::fs;

    let mut invalid = 0;
    for path in collect_inputs(&inputs)? {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        match quadflow_parser::parse(&content) {
            Ok(pairs) => {
                println!("{} {}", "VALID".bright_green().bold(), path.display());
                tracing::debug!(path = %path.display(), elements = pairs.count(), "parsed");
            }
            Err(e) => {
                invalid += 1;
                println!("{} {}", "INVALID".bright_red().bold(), path.display());
                println!("{}", e);
            }
        }
    }

    if invalid > 0 {
        bail!("{} file(s) failed validation", invalid);
    }
    Ok(())
}
