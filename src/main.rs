//! panda-csv - inspect hit and truth CSV files

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use panda_csv_reader::config::{OutputFormat, ReaderConfig};
use panda_csv_reader::event::{EventReader, EventSchemas, Part};
use panda_csv_reader::model::Schema;
use panda_csv_reader::output::{render_to_stdout, LoadReport};
use panda_csv_reader::reader::TabularReader;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Load PANDA STT hit and truth CSV files and summarize them
#[derive(Parser, Debug)]
#[command(name = "panda-csv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load one or more CSV files
    Load {
        /// Files to load
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Explicit schema, e.g. hit_id:int,x:float,y:float,z:float
        #[arg(long)]
        schema: Option<Schema>,

        /// Column to key rows by (defaults to the first column)
        #[arg(short, long)]
        key: Option<String>,

        /// Fail if the key column has duplicate values
        #[arg(long)]
        unique_key: bool,

        /// Load files on the rayon thread pool
        #[arg(long)]
        parallel: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Load the parts of one event, e.g. data/event000001000
    Event {
        /// Event prefix; part files are <PREFIX>-hits.csv etc.
        prefix: PathBuf,

        #[command(flatten)]
        parts: PartArgs,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Load every event in a directory
    Dataset {
        /// Directory holding event files
        dir: PathBuf,

        /// Number of events to skip
        #[arg(long, default_value_t = 0)]
        skip: usize,

        /// Maximum number of events to load
        #[arg(long)]
        nevents: Option<usize>,

        #[command(flatten)]
        parts: PartArgs,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Files have no header line
    #[arg(long)]
    no_header: bool,

    /// Field delimiter
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Number of rows to preview per table
    #[arg(long, default_value_t = 5)]
    head: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,
}

impl CommonArgs {
    fn reader_config(&self) -> Result<ReaderConfig> {
        if !self.delimiter.is_ascii() {
            bail!("Delimiter must be a single ASCII character: {:?}", self.delimiter);
        }
        Ok(ReaderConfig::new()
            .with_delimiter(self.delimiter as u8)
            .with_headers(!self.no_header))
    }
}

#[derive(Args, Debug)]
struct PartArgs {
    /// Parts to load (comma-separated)
    #[arg(long, value_delimiter = ',', default_values_t = [Part::Hits, Part::Truth])]
    parts: Vec<Part>,

    /// Explicit schema for hits files
    #[arg(long)]
    hits_schema: Option<Schema>,

    /// Explicit schema for cells files
    #[arg(long)]
    cells_schema: Option<Schema>,

    /// Explicit schema for particles files
    #[arg(long)]
    particles_schema: Option<Schema>,

    /// Explicit schema for truth files
    #[arg(long)]
    truth_schema: Option<Schema>,
}

impl PartArgs {
    fn schemas(&self) -> EventSchemas {
        [
            (Part::Hits, &self.hits_schema),
            (Part::Cells, &self.cells_schema),
            (Part::Particles, &self.particles_schema),
            (Part::Truth, &self.truth_schema),
        ]
        .into_iter()
        .fold(EventSchemas::new(), |schemas, (part, schema)| match schema {
            Some(schema) => schemas.with_schema(part, schema.clone()),
            None => schemas,
        })
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(all_loaded) => {
            if all_loaded {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1) // Some files failed to load
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();

    match cli.command {
        Command::Load {
            paths,
            schema,
            key,
            unique_key,
            parallel,
            common,
        } => {
            let mut config = common.reader_config()?.with_unique_key(unique_key);
            if let Some(key) = key {
                config = config.with_key_column(key);
            }
            let reader = TabularReader::new(config);

            let results = if parallel {
                reader.load_many_par(&paths, schema.as_ref())
            } else {
                reader.load_many(&paths, schema.as_ref())
            };

            let mut report = LoadReport::new();
            for (path, result) in &results {
                report.push_result(path.display().to_string(), result);
            }
            render_to_stdout(&report, common.format.into(), common.head)?;
            Ok(!report.has_failures())
        }

        Command::Event {
            prefix,
            parts,
            common,
        } => {
            let reader = EventReader::new(common.reader_config()?, parts.schemas());
            let event = reader
                .load_event(&prefix, &parts.parts)
                .with_context(|| format!("Failed to load event: {}", prefix.display()))?;

            let mut report = LoadReport::new();
            for &part in &parts.parts {
                if let Some(table) = event.part(part) {
                    report.push_table(part.path_for(&prefix).display().to_string(), table);
                }
            }
            render_to_stdout(&report, common.format.into(), common.head)?;
            Ok(true)
        }

        Command::Dataset {
            dir,
            skip,
            nevents,
            parts,
            common,
        } => {
            let reader = EventReader::new(common.reader_config()?, parts.schemas());
            let results: Vec<_> = reader
                .load_dataset(&dir, &parts.parts, skip, nevents)
                .with_context(|| format!("Failed to list events in: {}", dir.display()))?
                .collect();
            info!("Loaded {} events from {}", results.len(), dir.display());

            let mut report = LoadReport::new();
            for result in &results {
                match result {
                    Ok(event) => {
                        for &part in &parts.parts {
                            if let Some(table) = event.part(part) {
                                report.push_table(
                                    part.path_for(&event.prefix).display().to_string(),
                                    table,
                                );
                            }
                        }
                    }
                    Err(error) => report.push_error(error.path().display().to_string(), error),
                }
            }
            render_to_stdout(&report, common.format.into(), common.head)?;
            Ok(!report.has_failures())
        }
    }
}
