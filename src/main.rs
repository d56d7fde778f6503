use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use repodoc::DocError;
use repodoc::cli::Output;
use repodoc::cli::commands::generate::GenerateOptions;
use repodoc::config::{OutputFormat, ProviderMode};

#[derive(Parser)]
#[command(name = "repodoc")]
#[command(
    version,
    about = "LLM-driven documentation generator for GitHub repositories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Debug logging")]
    verbose: bool,

    #[arg(long, short, global = true, help = "Only log errors")]
    quiet: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Config file to use instead of the global and project files"
    )]
    config_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate documentation for a repository
    Generate {
        #[arg(env = "REPO_OWNER", help = "Repository owner")]
        owner: Option<String>,
        #[arg(env = "REPO_NAME", help = "Repository name")]
        repo: Option<String>,
        #[arg(
            env = "REPO_BRANCH",
            help = "Branch to document (default: the repository's default branch)"
        )]
        branch: Option<String>,

        #[arg(long, short, help = "Output directory")]
        output: Option<PathBuf>,
        #[arg(long, short, help = "Output format: markdown, html")]
        format: Option<OutputFormat>,
        #[arg(long, help = "Provider mode: api, local, hybrid")]
        provider: Option<ProviderMode>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
        #[arg(
            long,
            value_name = "PATH",
            help = "Document an existing directory instead of cloning (takes precedence over owner/repo)"
        )]
        local: Option<PathBuf>,
        #[arg(long, help = "Keep the temporary clone after the run")]
        keep_temp: bool,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mrepodoc encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

/// `RUST_LOG`, then `LOG_LEVEL`, then the verbosity flags
fn log_filter(verbose: bool, quiet: bool) -> EnvFilter {
    let fallback = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };

    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env("LOG_LEVEL"))
        .unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Provider failures and timeouts, as opposed to bad input or a broken environment
fn is_recoverable(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DocError>()
        .is_some_and(|e| !e.is_fatal())
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let output = Output::new();
            output.error(&format!("Error: {:#}", e));
            if is_recoverable(&e) {
                output.info("The provider may recover; running the command again can succeed");
            }
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // LOG_LEVEL may come from .env
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(log_filter(cli.verbose, cli.quiet))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate {
            owner,
            repo,
            branch,
            output,
            format,
            provider,
            model,
            local,
            keep_temp,
        } => {
            repodoc::cli::commands::generate::run(GenerateOptions {
                owner,
                repo,
                branch,
                output,
                format,
                provider,
                model,
                local,
                keep_temp,
                config_file: cli.config_file,
            })?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                repodoc::cli::commands::config::show(&format, cli.config_file.as_deref())?;
            }
            ConfigAction::Path => {
                repodoc::cli::commands::config::path()?;
            }
        },
    }

    Ok(())
}
