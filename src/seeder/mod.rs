//! Runs the enabled pipelines and writes one seed document per pipeline.

use crate::config::SeederConfig;
use crate::writer::SeedFileWriter;
use anyhow::Context;
use chrono::NaiveDateTime;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use seed_data_gen::pipeline::{cinema, ecommerce, restaurant};
use seed_data_gen::{FakeData, PipelineKind, RenderConfig, Renderer, SeedData};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Generate and report without writing files
    pub dry_run: bool,
}

/// Row count of one emitted table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRows {
    pub name: String,
    pub rows: usize,
}

/// What one pipeline produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub pipeline: PipelineKind,
    pub label: String,
    pub output: PathBuf,
    pub seed: u64,
    pub tables: Vec<TableRows>,
    /// Number of detail rows generated
    pub child_records: usize,
    /// Sum of the measure over all detail rows
    pub measure_total: i64,
    pub bytes: u64,
    pub written: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub pipelines: Vec<PipelineReport>,
    pub elapsed_secs: f64,
}

/// A generated document ready to render
struct Generated {
    data: SeedData,
    render: RenderConfig,
    child_records: usize,
    measure_total: i64,
}

/// Pipelines draw from independent streams derived from the run seed, so
/// `--only` does not change what a pipeline generates.
pub fn pipeline_seed(seed: u64, kind: PipelineKind) -> u64 {
    let offset = PipelineKind::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or_default();
    seed.wrapping_add(offset as u64)
}

fn generate(kind: PipelineKind, config: &SeederConfig, seed: u64, now: NaiveDateTime) -> Generated {
    let mut fake = FakeData::new(ChaCha8Rng::seed_from_u64(seed));
    match kind {
        PipelineKind::Restaurant => {
            let c = &config.restaurant;
            let data = restaurant::generate(c, &mut fake, now);
            Generated {
                child_records: data.orders.len(),
                measure_total: data.sales.grand_total(),
                render: c.render_config(),
                data: data.into_seed_data(c),
            }
        }
        PipelineKind::Cinema => {
            let c = &config.cinema;
            let data = cinema::generate(c, &mut fake, now);
            Generated {
                child_records: data.shows.len(),
                measure_total: data.ticket_sales.grand_total(),
                render: c.render_config(),
                data: data.into_seed_data(c),
            }
        }
        PipelineKind::Ecommerce => {
            let c = &config.ecommerce;
            let data = ecommerce::generate(c, &mut fake, now);
            Generated {
                child_records: data.orders.len(),
                measure_total: data.ordered.grand_total(),
                render: c.render_config(),
                data: data.into_seed_data(c),
            }
        }
    }
}

/// Generate every enabled pipeline relative to `now`.
///
/// The configuration must already be validated.
pub fn run(config: &SeederConfig, options: RunOptions, now: NaiveDateTime) -> anyhow::Result<RunReport> {
    let start = Instant::now();
    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "starting seed run");

    let mut pipelines = Vec::new();
    for kind in config.enabled() {
        let pipeline_seed = pipeline_seed(seed, kind);
        let generated = generate(kind, config, pipeline_seed, now);
        let output = config.output_path(kind);
        let renderer = Renderer::new(generated.render);

        let written = !options.dry_run;
        let bytes = if written {
            write_document(&renderer, &generated.data, &output)?
        } else {
            renderer
                .render_to_string(&generated.data)
                .with_context(|| format!("Failed to render {}", kind))?
                .len() as u64
        };
        tracing::info!(
            pipeline = %kind,
            path = %output.display(),
            rows = generated.data.total_rows(),
            written,
            "pipeline complete"
        );

        pipelines.push(PipelineReport {
            pipeline: kind,
            label: generated.data.label.clone(),
            output,
            seed: pipeline_seed,
            tables: generated
                .data
                .tables
                .iter()
                .map(|t| TableRows {
                    name: t.name().to_string(),
                    rows: t.rows.len(),
                })
                .collect(),
            child_records: generated.child_records,
            measure_total: generated.measure_total,
            bytes,
            written,
        });
    }

    Ok(RunReport {
        seed,
        pipelines,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

fn write_document(renderer: &Renderer, data: &SeedData, path: &Path) -> anyhow::Result<u64> {
    let mut writer = SeedFileWriter::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    renderer
        .render(data, &mut writer)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    let bytes = writer
        .finish()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes, "seed file written");
    Ok(bytes)
}
