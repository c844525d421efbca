mod generate;
mod verify;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use seed_data_gen::{PipelineKind, DEFAULT_BATCH_SIZE};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sql-seeder")]
#[command(version)]
#[command(
    about = "Generate referentially consistent SQL seed data for the restaurant, cinema and ecommerce schemas",
    long_about = None
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate seed files (the default when no command is given)
    Generate {
        /// YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory to write seed files into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Only generate these pipelines (comma-separated: restaurant, cinema, ecommerce)
        #[arg(long, value_delimiter = ',')]
        only: Vec<PipelineKind>,

        /// Rows per detail-table INSERT statement
        #[arg(long)]
        batch_size: Option<usize>,

        /// Emit CREATE TABLE statements before the data
        #[arg(long)]
        with_schema: bool,

        /// Generate and report without writing files
        #[arg(long)]
        dry_run: bool,

        /// Output the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a generated seed file for FK and aggregate consistency
    Verify {
        /// Seed file to check
        file: PathBuf,

        /// Schema to check against (detected from table names if not specified)
        #[arg(short, long)]
        pipeline: Option<PipelineKind>,

        /// Largest allowed row count per detail-table INSERT
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        None => generate::run(generate::GenerateArgs::default()),
        Some(Commands::Generate {
            config,
            output_dir,
            seed,
            only,
            batch_size,
            with_schema,
            dry_run,
            json,
        }) => generate::run(generate::GenerateArgs {
            config,
            output_dir,
            seed,
            only,
            batch_size,
            with_schema,
            dry_run,
            json,
        }),
        Some(Commands::Verify {
            file,
            pipeline,
            batch_size,
            json,
        }) => verify::run(file, pipeline, batch_size, json),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "sql-seeder",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}
