mod request;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use hl_core::RunOutcome;
use hl_runner::proxy::{locate_runner, ProxyRunner};

use settings::Settings;

#[derive(Parser)]
#[command(name = "headlamp", about = "headlamp — IDE-grade batch code inspections")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Logging level of the inspection output
    #[arg(long, global = true, value_enum, default_value = "warn")]
    level: Level,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Level {
    Error,
    Warn,
    Info,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze sources and fail on severity thresholds
    Check {
        /// Project directory to analyze (defaults to the current directory)
        #[arg(long)]
        project: Option<PathBuf>,

        /// Module under analysis (defaults to the project name)
        #[arg(long)]
        module: Option<String>,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// XML report target
        #[arg(long)]
        xml: Option<PathBuf>,

        /// HTML report target
        #[arg(long)]
        html: Option<PathBuf>,

        /// Suppress per-problem log lines (the outcome still prints)
        #[arg(long)]
        quiet: bool,

        /// Take the inspection set from an IDE profile instead of the
        /// configured buckets
        #[arg(long)]
        inherit_from_idea: bool,

        /// Profile file name under .idea/inspectionProfiles
        #[arg(long)]
        profile_name: Option<String>,

        /// Stop after this many errors
        #[arg(long)]
        max_errors: Option<u32>,

        /// Stop after this many warnings
        #[arg(long)]
        max_warnings: Option<u32>,

        /// Stop after this many info findings
        #[arg(long)]
        max_infos: Option<u32>,

        /// Runner binary (defaults to a sibling of this executable)
        #[arg(long, env = "HEADLAMP_RUNNER")]
        runner: Option<PathBuf>,

        /// Host home directory carrying build.txt
        #[arg(long, env = "HEADLAMP_HOME")]
        idea_home: Option<PathBuf>,

        /// System directory for per-run state and locks
        #[arg(long, env = "HEADLAMP_SYSTEM")]
        system_dir: Option<PathBuf>,

        /// Plugin directories to load
        #[arg(long = "plugin")]
        plugins: Vec<PathBuf>,

        /// Source files to analyze (defaults to all sources in the project)
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = match cli.level {
        Level::Error => "error",
        Level::Warn => "warn",
        Level::Info => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(outcome) => match outcome {
            RunOutcome::Success => ExitCode::SUCCESS,
            RunOutcome::Fail => {
                eprintln!("Inspection run failed: thresholds exceeded or fixes not applied");
                ExitCode::from(1)
            }
            RunOutcome::Crash => {
                eprintln!("Inspection runner crashed");
                ExitCode::from(2)
            }
        },
        Err(e) => {
            eprintln!("headlamp: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<RunOutcome> {
    match cli.command {
        Commands::Check {
            project,
            module,
            config,
            xml,
            html,
            quiet,
            inherit_from_idea,
            profile_name,
            max_errors,
            max_warnings,
            max_infos,
            runner,
            idea_home,
            system_dir,
            plugins,
            files,
        } => {
            let settings = match &config {
                Some(path) => Settings::load(path)?,
                None => Settings::default(),
            };

            let options = request::CheckOptions {
                project,
                module,
                xml,
                html,
                quiet,
                inherit_from_idea,
                profile_name,
                max_errors,
                max_warnings,
                max_infos,
                idea_home,
                system_dir,
                plugins,
                files,
            };
            let check = request::build_check_request(&options, &settings)?;

            let runner_bin = runner.or_else(|| settings.runner.clone());
            let runner_path = locate_runner(runner_bin.as_deref());
            let mut proxy = ProxyRunner::spawn(&runner_path)
                .with_context(|| format!("cannot start runner {}", runner_path.display()))?;

            let outcome = proxy.run(&check).await.context("inspection run failed")?;
            if let Err(e) = proxy.finalize().await {
                tracing::error!("runner finalization failed: {e}");
            }
            Ok(outcome)
        }
    }
}
