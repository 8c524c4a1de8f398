use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use mkharness::{ArgList, BuildRequest, BuildRunner, Config, Harness, Scenario};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mkharness", about = "Sandboxed test runs for make-based build libraries")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/mkharness/config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, global = true)]
    debug: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the build tool once and print exit code, stdout and stderr.
    Run(RunArgs),
    /// Run a scenario in a disposable workspace.
    Scenario(ScenarioArgs),
}

#[derive(Args)]
struct Output {
    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    /// Exit 1 unless the build succeeded (and expected outputs exist).
    #[arg(long)]
    strict: bool,
}

#[derive(Args)]
struct RunArgs {
    /// Working directory for the build tool.
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Alternate build-file, passed as `-f`.
    #[arg(short = 'f', long = "file")]
    build_file: Option<PathBuf>,

    /// Whitespace-separated targets.
    #[arg(long, allow_hyphen_values = true)]
    targets: Option<String>,

    /// Whitespace-separated flags, appended after the targets.
    #[arg(long, allow_hyphen_values = true)]
    flags: Option<String>,

    #[command(flatten)]
    output: Output,
}

#[derive(Args)]
struct ScenarioArgs {
    /// Load the scenario from a TOML file instead of the flags below.
    #[arg(long, conflicts_with_all = ["build_file", "shared_lib", "sources"])]
    file: Option<PathBuf>,

    /// Build-file copied into the workspace as the canonical build-file.
    #[arg(long)]
    build_file: Option<PathBuf>,

    /// Shared group library copied next to it.
    #[arg(long)]
    shared_lib: Option<PathBuf>,

    /// Fixture file to generate (repeatable).
    #[arg(long = "source")]
    sources: Vec<String>,

    #[arg(long, allow_hyphen_values = true)]
    targets: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    flags: Option<String>,

    /// File that must exist after the build (repeatable).
    #[arg(long = "expect")]
    expect: Vec<String>,

    /// Directory to create the workspace in.
    #[arg(long)]
    root: Option<PathBuf>,

    #[command(flatten)]
    output: Output,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let cfg = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?cfg, "configuration loaded");

    match cli.command {
        Command::Run(args) => run(&cfg, args),
        Command::Scenario(args) => scenario(cfg, args),
    }
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(if cli.debug { "debug" } else { "warn" })
    });

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
        }
    }
    Ok(())
}

fn run(cfg: &Config, args: RunArgs) -> anyhow::Result<ExitCode> {
    let runner = BuildRunner::from_config(&cfg.build);
    let request = BuildRequest {
        build_file: args.build_file,
        targets: args.targets.map(ArgList::Delimited),
        flags: args.flags.map(ArgList::Delimited),
        working_dir: args.dir,
    };

    let outcome = runner
        .run(&request)
        .with_context(|| format!("failed to run `{}`", runner.tool()))?;

    if args.output.json {
        println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
    } else {
        print!("{outcome}");
    }

    Ok(exit_code(args.output.strict, outcome.success()))
}

fn scenario(mut cfg: Config, args: ScenarioArgs) -> anyhow::Result<ExitCode> {
    if let Some(root) = args.root {
        cfg.sandbox.root = root;
    }

    let mut scenario = match &args.file {
        Some(path) => Scenario::from_file(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => {
            let mut s = Scenario::basic_operation();
            if let Some(build_file) = args.build_file {
                s.name = "cli".to_string();
                s.build_file = build_file;
            }
            if let Some(shared_lib) = args.shared_lib {
                s.shared_lib = shared_lib;
            }
            if !args.sources.is_empty() {
                s.sources = args.sources;
            }
            s
        }
    };
    if let Some(targets) = args.targets {
        scenario.targets = Some(ArgList::Delimited(targets));
    }
    if let Some(flags) = args.flags {
        scenario.flags = Some(ArgList::Delimited(flags));
    }
    scenario.expect_outputs.extend(args.expect);

    let harness = Harness::from_config(&cfg);
    let report = harness
        .run(&scenario)
        .with_context(|| format!("scenario {} failed", scenario.name))?;

    if args.output.json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        print!("{report}");
    }

    Ok(exit_code(args.output.strict, report.passed()))
}

fn exit_code(strict: bool, passed: bool) -> ExitCode {
    if strict && !passed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
