use seed_data_gen::PipelineKind;
use sql_seeder::config::{Overrides, SeederConfig};
use sql_seeder::seeder::{self, RunOptions, RunReport};
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct GenerateArgs {
    pub config: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub only: Vec<PipelineKind>,
    pub batch_size: Option<usize>,
    pub with_schema: bool,
    pub dry_run: bool,
    pub json: bool,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("config file does not exist: {}", path.display());
            }
            SeederConfig::load(path)?
        }
        None => SeederConfig::default(),
    };

    config.apply(&Overrides {
        output_dir: args.output_dir,
        seed: args.seed,
        only: args.only,
        batch_size: args.batch_size,
        include_schema: args.with_schema,
    });
    config.validate()?;

    if !args.json {
        let names: Vec<String> = config.enabled().iter().map(|k| k.to_string()).collect();
        if args.dry_run {
            eprintln!("Dry run: generating {} (no files written)", names.join(", "));
        } else {
            eprintln!(
                "Generating {} into {}",
                names.join(", "),
                config.output_dir.display()
            );
        }
        eprintln!();
    }

    let now = chrono::Local::now().naive_local();
    let report = seeder::run(&config, RunOptions { dry_run: args.dry_run }, now)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    for p in &report.pipelines {
        eprintln!("{} ({}):", p.label, p.pipeline);
        eprintln!("  Output: {}", p.output.display());
        for table in &p.tables {
            eprintln!("    {:<16} {:>6} rows", table.name, table.rows);
        }
        eprintln!("  Child records: {}", p.child_records);
        eprintln!("  Measure total: {}", p.measure_total);
        eprintln!("  Seed: {}", p.seed);
        if p.written {
            eprintln!("  Wrote {} bytes", p.bytes);
        }
        eprintln!();
    }

    let mode = if report.pipelines.iter().any(|p| p.written) {
        "written"
    } else {
        "generated (dry run)"
    };
    eprintln!(
        "{} file(s) {} in {:.3}s [seed: {}]",
        report.pipelines.len(),
        mode,
        report.elapsed_secs,
        report.seed
    );
}
