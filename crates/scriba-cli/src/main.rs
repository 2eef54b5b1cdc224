//! Scriba CLI
//!
//! Command-line interface for the scriba hybrid style-guide engine

mod commands;
mod input;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use colored::Colorize;
use scriba_core::init_tracing;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scriba")]
#[command(about = "Scriba: merge official and empirical writing rules into one style guide")]
#[command(version = scriba_core::VERSION)]
#[command(
    long_about = "Scriba merges rules extracted from a journal's official style guide with rules\n\
mined from its published papers into one conflict-free, prioritized style guide.\n\
\n\
Examples:\n  \
scriba integrate --official official.json --empirical empirical.json -o guide.json\n  \
scriba update --guide guide.json --empirical new_batch.json\n  \
scriba conflicts --official official.json --empirical empirical.json\n  \
scriba inspect guide.json --category vocabulary\n  \
scriba config init             # Write a default configuration file"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.scribarc.json/.scribarc.toml/scriba.yaml)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Number of threads used for parallel conflict detection
    #[arg(
        short = 'j',
        long,
        global = true,
        help = "Number of threads (default: number of CPU cores)"
    )]
    threads: Option<usize>,

    /// Generate shell completion script
    #[arg(
        long,
        value_enum,
        help = "Generate completion script for specified shell"
    )]
    generate_completion: Option<Shell>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a hybrid guide from official and empirical rule files
    Integrate {
        /// Official rules (JSON array or {"rules": [...]})
        #[arg(long, help = "Official rules file")]
        official: PathBuf,

        /// Empirical rules (JSON array, {"rules": [...]} or {"rule_categories": {...}})
        #[arg(long, help = "Empirical rules file")]
        empirical: PathBuf,

        /// Where to write the guide
        #[arg(
            short,
            long,
            help = "Output file (default: print guide JSON to stdout)"
        )]
        output: Option<PathBuf>,

        /// Output format
        #[arg(
            short,
            long,
            help = "Output format (default: json without --output, human with it)"
        )]
        format: Option<OutputFormat>,
    },

    /// Apply a delta of new rules to an existing guide
    Update {
        /// Previously assembled guide
        #[arg(short, long, help = "Existing guide file")]
        guide: PathBuf,

        /// New official rules
        #[arg(long, help = "Delta official rules file")]
        official: Option<PathBuf>,

        /// New empirical rules
        #[arg(long, help = "Delta empirical rules file")]
        empirical: Option<PathBuf>,

        /// Where to write the new guide
        #[arg(short, long, help = "Output file (default: overwrite --guide)")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "human", help = "Summary format")]
        format: OutputFormat,
    },

    /// List conflicting rule pairs and which side is kept
    Conflicts {
        #[arg(long, help = "Official rules file")]
        official: PathBuf,

        #[arg(long, help = "Empirical rules file")]
        empirical: PathBuf,

        #[arg(short, long, default_value = "human", help = "Output format")]
        format: OutputFormat,
    },

    /// Show a summary of a guide, optionally filtered
    Inspect {
        /// Guide file
        guide: PathBuf,

        #[arg(
            long,
            help = "Only rules in this category (e.g. vocabulary, ACADEMIC_VOICE)"
        )]
        category: Option<String>,

        #[arg(
            long,
            help = "Only rules in this tier (official, core, optional, suggested)"
        )]
        tier: Option<String>,

        #[arg(short, long, default_value = "human", help = "Output format")]
        format: OutputFormat,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    Version {
        /// Show detailed version information
        #[arg(long, help = "Show detailed build information")]
        detailed: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default configuration file to the current directory
    Init {
        #[arg(
            short,
            long,
            default_value = "json",
            help = "Configuration file format"
        )]
        format: ConfigFormat,

        #[arg(long, help = "Overwrite an existing file")]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Validate a configuration file
    Validate {
        #[arg(help = "Configuration file (default: discovered file)")]
        path: Option<PathBuf>,
    },

    /// Print the configuration JSON Schema
    Schema,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON output
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ConfigFormat {
    /// JSON configuration format
    Json,
    /// TOML configuration format
    Toml,
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.generate_completion {
        generate_completion_script(shell);
        return;
    }

    if !cli.no_color && std::env::var("NO_COLOR").is_err() {
        colored::control::set_override(true);
    } else {
        colored::control::set_override(false);
    }

    let log_level = match cli.verbose {
        0 => "scriba=error",
        1 => "scriba=warn",
        2 => "scriba=info",
        3 => "scriba=debug",
        _ => "scriba=trace",
    };
    unsafe {
        std::env::set_var("RUST_LOG", log_level);
    }
    init_tracing();

    if let Some(threads) = cli.threads
        && let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
    {
        eprintln!(
            "{} failed to set thread pool size: {e}",
            "error:".red().bold()
        );
        std::process::exit(1);
    }

    if let Err(e) = run_command(cli) {
        tracing::error!("scriba failed: {:#}", e);
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn generate_completion_script(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Integrate {
            official,
            empirical,
            output,
            format,
        }) => commands::integrate_command(official, empirical, output, format, cli.config),

        Some(Commands::Update {
            guide,
            official,
            empirical,
            output,
            format,
        }) => commands::update_command(guide, official, empirical, output, format, cli.config),

        Some(Commands::Conflicts {
            official,
            empirical,
            format,
        }) => commands::conflicts_command(official, empirical, format, cli.config),

        Some(Commands::Inspect {
            guide,
            category,
            tier,
            format,
        }) => commands::inspect_command(guide, category, tier, format),

        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { format, force } => commands::config::init_command(format, force),
            ConfigAction::Show => commands::config::show_command(cli.config),
            ConfigAction::Validate { path } => {
                commands::config::validate_command(path.or(cli.config))
            }
            ConfigAction::Schema => commands::config::schema_command(),
        },

        Some(Commands::Version { detailed }) => {
            if detailed {
                println!("scriba {}", scriba_core::VERSION);
                println!("Build information:");
                println!("  Target: {}", std::env::consts::ARCH);
                println!("  OS: {}", std::env::consts::OS);
                println!(
                    "  Contrast pairs: {}",
                    scriba_core::SEED_CONTRAST_PAIRS.len()
                );
            } else {
                println!("{}", scriba_core::VERSION);
            }
            Ok(())
        }

        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
