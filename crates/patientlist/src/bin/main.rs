//! Patient list command-line interface

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use patientlist::cli::{RegistryConfig, compile, fields, output, run};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Patient list command-line tool
#[derive(Parser)]
#[command(name = "patientlist")]
#[command(author, version, about = "Patient list query tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, table, pretty)
    #[arg(short = 'f', long, global = true)]
    format: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(flatten)]
    registry: RegistryArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RegistryArgs {
    /// Person attribute type to register, e.g. "Bed Number"
    #[arg(long = "person-attribute", global = true)]
    person_attributes: Vec<String>,

    /// Visit attribute type to register
    #[arg(long = "visit-attribute", global = true)]
    visit_attributes: Vec<String>,
}

impl From<RegistryArgs> for RegistryConfig {
    fn from(args: RegistryArgs) -> Self {
        Self {
            person_attributes: args.person_attributes,
            visit_attributes: args.visit_attributes,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the available fields
    Fields {
        /// Print the default header and body templates
        #[arg(short, long)]
        templates: bool,

        /// Render templates for the sample patient
        #[arg(short, long)]
        preview: bool,

        /// Header template to preview instead of the default
        #[arg(long, requires = "preview")]
        header: Option<String>,

        /// Body template to preview instead of the default
        #[arg(long, requires = "preview")]
        body: Option<String>,
    },

    /// Compile a list definition to query text
    Compile {
        /// List definition file (JSON)
        file: PathBuf,

        /// Reference date (YYYY-MM-DD) for ages and relative ranges
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Evaluate a list definition against rows from a file
    Run {
        /// List definition file (JSON)
        file: PathBuf,

        /// Patient and visit rows (JSON)
        #[arg(short, long)]
        data: PathBuf,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Records per page
        #[arg(long, default_value_t = 50)]
        page_size: usize,

        /// Also count the matching records
        #[arg(short, long)]
        count: bool,

        /// Reference date (YYYY-MM-DD) for ages and relative ranges
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::try_new(default_level)?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("{}", output::format_warning(&format!("Logging disabled: {e}")));
    }

    let registry = RegistryConfig::from(cli.registry);

    let result = match cli.command {
        Commands::Fields {
            templates,
            preview,
            header,
            body,
        } => {
            let config = fields::FieldsConfig {
                registry,
                templates,
                preview,
                header,
                body,
                output_format: cli.format,
                output_file: cli.output,
            };
            fields::fields(config)
        }

        Commands::Compile { file, today } => {
            let config = compile::CompileConfig {
                file,
                registry,
                today,
                output_format: cli.format,
                output_file: cli.output,
            };
            compile::compile(config)
        }

        Commands::Run {
            file,
            data,
            page,
            page_size,
            count,
            today,
        } => {
            let config = run::RunConfig {
                file,
                data,
                page,
                page_size,
                count,
                registry,
                today,
                output_format: cli.format,
                output_file: cli.output,
            };
            run::run(config)
        }
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
