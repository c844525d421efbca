//! Seed data generator for the restaurant, cinema and ecommerce schemas.
//!
//! Generates FK-consistent rows together with per-parent summary tables whose
//! totals always equal the sums over the generated detail rows.
//!
//! # Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use seed_data_gen::pipeline::restaurant::{self, RestaurantConfig};
//! use seed_data_gen::{FakeData, Renderer};
//!
//! let config = RestaurantConfig::default();
//! let mut fake = FakeData::new(ChaCha8Rng::seed_from_u64(42));
//! let now = chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
//!     .unwrap()
//!     .and_hms_opt(12, 0, 0)
//!     .unwrap();
//!
//! let data = restaurant::generate(&config, &mut fake, now);
//! let sql = Renderer::new(config.render_config()).render_to_string(&data.into_seed_data(&config))?;
//!
//! assert!(sql.starts_with("USE novotel_db;"));
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod accumulator;
pub mod fake;
pub mod generator;
pub mod pipeline;
pub mod renderer;
pub mod schema;
pub mod value;

pub use accumulator::Accumulator;
pub use fake::FakeData;
pub use generator::{
    generate_children, load_catalog, parent_ids, ChildRecord, CountRange, Delta, LookbackWindow,
    Parent, ParentId, SeedData, TableData, MAX_LOOKBACK_DAYS,
};
pub use pipeline::PipelineKind;
pub use renderer::{RenderConfig, Renderer, DEFAULT_BATCH_SIZE};
pub use schema::{Column, ForeignKey, Schema, SqlType, SummaryLink, Table, TableRole};
pub use value::{escape_str, unescape_str, Row, SqlValue};
