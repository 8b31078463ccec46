//! abap-assist - ABAP developer assistant
//!
//! Static analysis, prompt assembly and SAP modification markers for ABAP
//! sources, driven from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use abap_assist::config;

mod cli;
mod ui;

use cli::prompt::PromptTask;

/// abap-assist - AI-ready ABAP analysis
#[derive(Parser)]
#[command(name = "abap-assist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "ABAP code analysis, AI prompt assembly and modification markers", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an ABAP file or directory
    Analyze {
        /// File or directory to analyze
        path: String,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report SAP patterns, performance and modernization findings
    Insights {
        /// ABAP file to inspect
        file: String,
    },

    /// Print the AI prompt for a task
    Prompt {
        /// Task to build the prompt for
        #[arg(value_enum)]
        task: PromptTask,

        /// ABAP file the prompt is about
        file: String,

        /// Context documents to include
        #[arg(short, long = "doc")]
        docs: Vec<String>,

        /// Instruction for the custom task
        #[arg(short, long)]
        instruction: Option<String>,
    },

    /// Preview the document context
    Context {
        /// Documents to load
        #[arg(required = true)]
        docs: Vec<String>,

        /// Loaded documents to leave out of the context
        #[arg(long)]
        disable: Vec<String>,
    },

    /// Wrap code in modification markers
    Mark {
        /// Original code (or the inserted code when --new is absent)
        file: String,

        /// Replacement code; produces a modification block
        #[arg(short, long = "new")]
        new_file: Option<String>,

        /// Ticket number, e.g. CHG-4567
        #[arg(short, long)]
        ticket: Option<String>,

        /// User written into the markers
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Apply an AI fix or optimization reply between modification markers
    Apply {
        /// Original ABAP code
        file: String,

        /// File holding the AI reply ("-" reads stdin)
        #[arg(short, long)]
        response: String,

        /// Treat the reply as an optimization instead of a fix
        #[arg(long)]
        optimize: bool,

        /// Ticket number, e.g. CHG-4567
        #[arg(short, long)]
        ticket: Option<String>,

        /// User written into the markers
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize configuration file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = config::load_config(cli.config.as_deref())?;

    debug!("abap-assist v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Analyze { path, json } => {
            cli::analyze::run(&config, &path, json)?;
        }
        Commands::Insights { file } => {
            cli::insights::run(&file)?;
        }
        Commands::Prompt { task, file, docs, instruction } => {
            cli::prompt::run(&config, task, &file, &docs, instruction.as_deref())?;
        }
        Commands::Context { docs, disable } => {
            cli::context::run(&config, &docs, &disable)?;
        }
        Commands::Mark { file, new_file, ticket, user } => {
            cli::mark::run(&config, &file, new_file.as_deref(), ticket.as_deref(), user.as_deref())?;
        }
        Commands::Apply { file, response, optimize, ticket, user } => {
            cli::apply::run(&config, &file, &response, optimize, ticket.as_deref(), user.as_deref())?;
        }
        Commands::Config { show, init } => {
            if init {
                config::init_config(cli.config.as_deref())?;
            } else if show {
                config::show_config(&config)?;
            } else if config.has_valid_api_key() {
                println!("API key: found in ${}", config.ai.api_key_env);
            } else {
                println!("API key: not set (export {}=sk-...)", config.ai.api_key_env);
            }
        }
    }

    Ok(())
}
