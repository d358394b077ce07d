use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codelens::analyzer::Language;
use codelens::cli::commands::analyze::{AnalyzeOptions, OutputFormat};
use codelens::cli::commands::translate::TranslateOptions;
use codelens::cli::parse_language;

/// Parse output format from string
fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "codelens")]
#[command(
    version,
    about = "Static structure analyzer for single source files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a source file: language, libraries, functions, structure
    Analyze {
        #[arg(help = "Source file to analyze")]
        file: PathBuf,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            value_parser = parse_output_format,
            help = "Output format: text, json, dot"
        )]
        format: OutputFormat,
        #[arg(long, short, value_parser = parse_language, help = "Skip detection and use this language")]
        language: Option<Language>,
        #[arg(long, help = "Replace synthesized summaries with AI-generated ones")]
        ai: bool,
        #[arg(long, help = "Lines per function slice in heuristic mode")]
        window: Option<usize>,
        #[arg(long, help = "Print each function's source under its summary (text format)")]
        source: bool,
    },

    /// Translate one function to another language with the AI assistant
    Translate {
        #[arg(help = "Source file containing the function")]
        file: PathBuf,
        #[arg(long = "function", short = 'n', help = "Function name")]
        function: String,
        #[arg(long, short, help = "Target language, e.g. Rust")]
        to: String,
        #[arg(long, short, value_parser = parse_language, help = "Skip detection and use this language")]
        language: Option<Language>,
    },

    /// Test the connection to the configured LLM provider
    Check,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
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
        eprintln!("\x1b[31mCodeLens encountered an unexpected error:\x1b[0m");
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

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Analyze {
            file,
            format,
            language,
            ai,
            window,
            source,
        } => {
            codelens::cli::commands::analyze::run(AnalyzeOptions {
                file,
                format,
                language,
                ai,
                window,
                show_source: source,
            })?;
        }
        Commands::Translate {
            file,
            function,
            to,
            language,
        } => {
            codelens::cli::commands::translate::run(TranslateOptions {
                file,
                function,
                to,
                language,
            })?;
        }
        Commands::Check => {
            codelens::cli::commands::check::run()?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                codelens::cli::commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                codelens::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                codelens::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
