//! crdform CLI - Kubernetes custom resources as typed configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod display;
mod error;
mod exit_codes;

use context::{Context, GlobalArgs};

#[derive(Parser)]
#[command(name = "crdform")]
#[command(author = "crdform Contributors")]
#[command(version)]
#[command(about = "Manage Kubernetes custom resources with server-side apply", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,

    /// Log level (RUST_LOG directives are applied on top)
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the available resource types
    Resources,

    /// Print the descriptor of a resource type
    Schema {
        /// Resource type (e.g. crdform_loki_grafana_com_ruler_config_v1)
        resource_type: String,
    },

    /// Render a configuration file as a Kubernetes manifest (no cluster needed)
    Manifest {
        /// Resource type
        resource_type: String,

        /// Configuration file
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },

    /// Server-side apply a configuration file
    Apply {
        /// Resource type
        resource_type: String,

        /// Configuration file
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// Print the resulting state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read an object
    Read {
        /// Resource type
        resource_type: String,

        /// Object id (namespace/name)
        id: String,

        /// Print the state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete an object
    Delete {
        /// Resource type
        resource_type: String,

        /// Object id (namespace/name)
        id: String,

        /// Wait until the object is gone
        #[arg(long)]
        wait: bool,
    },

    /// Import an existing object into state
    Import {
        /// Resource type
        resource_type: String,

        /// Object id (namespace/name)
        id: String,

        /// Print the state as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(LevelFilter::from(cli.log_level).into()),
        )
        .init();

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> error::Result<()> {
    let context = Context::load(&cli.global)?;

    match cli.command {
        Commands::Resources => commands::resources::run(&context),

        Commands::Schema { resource_type } => commands::schema::run(&context, &resource_type),

        Commands::Manifest {
            resource_type,
            file,
        } => commands::manifest::run(&context, &resource_type, &file),

        Commands::Apply {
            resource_type,
            file,
            json,
        } => commands::apply::run(&context, &resource_type, &file, json).await,

        Commands::Read {
            resource_type,
            id,
            json,
        } => commands::read::run(&context, &resource_type, &id, json).await,

        Commands::Delete {
            resource_type,
            id,
            wait,
        } => commands::delete::run(&context, &resource_type, &id, wait).await,

        Commands::Import {
            resource_type,
            id,
            json,
        } => commands::import::run(&context, &resource_type, &id, json).await,
    }
}
