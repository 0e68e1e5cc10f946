use clap::{Parser, ValueEnum};
use heredity::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "heredity")]
#[command(version)]
#[command(about = "Infer gene copy counts and trait expression across a family pedigree")]
struct Cli {
    /// Path to pedigree CSV (columns: name, mother, father, trait)
    data: PathBuf,

    /// JSON file replacing the default probability tables
    #[arg(long)]
    model: Option<PathBuf>,

    /// Field delimiter of the pedigree file
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<String> {
    let model = match &cli.model {
        Some(path) => ProbabilityModel::from_path(path)?,
        None => ProbabilityModel::default(),
    };

    let delimiter = u8::try_from(cli.delimiter).map_err(|_| HeredityError::MalformedRecord {
        line: 0,
        reason: format!("delimiter '{}' is not a single byte", cli.delimiter),
    })?;
    let mut pedigree = Pedigree::new();
    pedigree.observe(CsvBuilder::new().delimiter(delimiter).from_path(&cli.data)?)?;
    debug!(people = pedigree.len(), path = %cli.data.display(), "loaded pedigree");

    let posterior = pedigree.heredity(&model)?;
    Ok(match cli.format {
        Format::Text => posterior.to_string(),
        Format::Json => serde_json::to_string_pretty(&posterior)? + "\n",
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(report) => {
            print!("{}", report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
