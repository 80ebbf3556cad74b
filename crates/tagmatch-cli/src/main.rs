mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "tagmatch",
    version,
    about = "Cross-check drawing tags between two CAD-exported PDF drawings"
)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Side {
    /// Drawing 1 tags (source pattern)
    Source,
    /// Drawing 2 tags (target pattern)
    Target,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate Drawing 2 against Drawing 1 through a tag mapping
    Validate {
        /// Path to Drawing 1 (PDF)
        drawing1: PathBuf,

        /// Path to Drawing 2 (PDF)
        drawing2: PathBuf,

        /// Mapping file (CSV or XLSX) with Drawing1_No / Drawing2_No columns
        #[arg(short, long, value_name = "FILE")]
        mapping: PathBuf,

        /// JSON settings file (overrides the built-in defaults)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Coordinate tolerance in points (overrides the config)
        #[arg(short, long, value_name = "PT")]
        tolerance: Option<f32>,

        /// Write the annotated Drawing 2 to this file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// List every tag, not just the summary and problems
        #[arg(long)]
        show_all: bool,
    },
    /// List the tags found in one drawing
    Extract {
        /// Path to PDF file
        input_file: PathBuf,

        /// Which tag pattern to apply
        #[arg(short, long, value_enum, default_value = "source")]
        side: Side,

        /// JSON settings file (overrides the built-in defaults)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Inspect mapping files
    Mapping {
        #[command(subcommand)]
        action: MappingAction,
    },
    /// Inspect settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum MappingAction {
    /// Load a mapping file and report skipped rows and duplicates
    Validate {
        /// Path to CSV or XLSX mapping
        file: PathBuf,

        /// Print every mapping entry
        #[arg(long)]
        list: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings as JSON
    Show {
        /// JSON settings file (overrides the built-in defaults)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "tagmatch_core=warn",
        1 => "tagmatch_core=info",
        _ => "tagmatch_core=debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Validate {
            drawing1,
            drawing2,
            mapping,
            config,
            tolerance,
            out,
            output,
            show_all,
        } => commands::validate::run(commands::validate::ValidateArgs {
            drawing1,
            drawing2,
            mapping,
            config,
            tolerance,
            out,
            output_format: output,
            show_all,
        }),
        Commands::Extract {
            input_file,
            side,
            config,
            output,
        } => commands::extract::run(input_file, side, config, &output),
        Commands::Mapping { action } => match action {
            MappingAction::Validate { file, list } => commands::mapping::validate(&file, list),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show { config } => commands::config::show(config.as_deref()),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
