use seed_data_gen::PipelineKind;
use sql_seeder::verify::{Verifier, VerifyOptions};
use std::path::PathBuf;
use std::time::Instant;

pub fn run(
    file: PathBuf,
    pipeline: Option<PipelineKind>,
    batch_size: usize,
    json: bool,
) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("input file does not exist: {}", file.display());
    }
    if batch_size == 0 {
        anyhow::bail!("--batch-size must be greater than 0");
    }

    if !json {
        eprintln!("Verifying seed file: {}", file.display());
        eprintln!();
    }

    let start_time = Instant::now();
    let summary = Verifier::new(VerifyOptions {
        path: file,
        pipeline,
        batch_size,
    })
    .verify()?;
    let elapsed = start_time.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for issue in &summary.issues {
            eprintln!("{}", issue);
        }
        if !summary.issues.is_empty() {
            eprintln!();
        }

        eprintln!("Verification summary:");
        eprintln!("  Pipeline: {}", summary.pipeline);
        eprintln!(
            "  Statements scanned: {}",
            summary.summary.statements_scanned
        );
        eprintln!("  Rows scanned: {}", summary.summary.rows_scanned);
        eprintln!("  Time: {:.3?}", elapsed);
        eprintln!();
        eprintln!("  Checks:");
        eprintln!("    - SQL syntax:      {}", summary.checks.syntax);
        eprintln!("    - Tables/columns:  {}", summary.checks.tables);
        eprintln!("    - FK integrity:    {}", summary.checks.fk_integrity);
        eprintln!("    - Batch size:      {}", summary.checks.batch_size);
        eprintln!("    - Aggregates:      {}", summary.checks.aggregates);
        eprintln!();
        eprintln!(
            "  Total: {} errors, {} warnings",
            summary.summary.errors, summary.summary.warnings
        );
        eprintln!();
        eprintln!(
            "Result: {}",
            if summary.has_errors() { "FAILED" } else { "PASSED" }
        );
    }

    if summary.has_errors() {
        anyhow::bail!(
            "verification failed with {} error(s)",
            summary.summary.errors
        );
    }

    Ok(())
}
