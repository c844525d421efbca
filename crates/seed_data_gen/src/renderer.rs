//! SQL document emitter.
//!
//! Renders a [`SeedData`] as a MySQL script: preamble, optional DDL, then one
//! section per table with a `TRUNCATE` followed by its INSERTs. Detail tables
//! are chunked into statements of at most `batch_size` rows.

use crate::generator::{SeedData, TableData};
use crate::schema::{Schema, TableRole};
use std::io::{self, Write};

/// Rows per detail-table INSERT when nothing else is configured
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Rendering options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    pub batch_size: usize,
    pub include_schema: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            include_schema: false,
        }
    }
}

pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn render_to_string(&self, data: &SeedData) -> io::Result<String> {
        let mut buf = Vec::new();
        self.render(data, &mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn render<W: Write>(&self, data: &SeedData, w: &mut W) -> io::Result<()> {
        if let Some(db) = &data.database {
            writeln!(w, "USE {};", db)?;
        }
        writeln!(w, "SET FOREIGN_KEY_CHECKS = 0;")?;
        writeln!(w, "-- {} Seed Data", data.label)?;

        if self.config.include_schema {
            self.render_schema(data, w)?;
        }

        for table in &data.tables {
            self.render_table(table, w)?;
        }

        Ok(())
    }

    fn render_schema<W: Write>(&self, data: &SeedData, w: &mut W) -> io::Result<()> {
        let schema = data
            .tables
            .iter()
            .fold(Schema::new(), |schema, t| schema.table(t.table.clone()));

        writeln!(w)?;
        writeln!(w, "-- Schema")?;
        for table in schema.tables_in_order() {
            writeln!(w, "{}", table.to_create_sql())?;
        }
        Ok(())
    }

    fn render_table<W: Write>(&self, data: &TableData, w: &mut W) -> io::Result<()> {
        writeln!(w)?;
        match data.table.role {
            TableRole::Detail => {
                writeln!(w, "-- {} ({} records)", data.name(), data.rows.len())?
            }
            _ => writeln!(w, "-- {}", data.name())?,
        }
        writeln!(w, "TRUNCATE TABLE {};", data.name())?;

        if data.rows.is_empty() {
            return Ok(());
        }

        let header = format!(
            "INSERT INTO {} ({}) VALUES ",
            data.name(),
            data.table.insert_columns().join(", ")
        );

        let chunk_size = match data.table.role {
            TableRole::Detail => self.config.batch_size.max(1),
            TableRole::Catalog | TableRole::Summary => data.rows.len(),
        };

        for chunk in data.rows.chunks(chunk_size) {
            let values: Vec<String> = chunk
                .iter()
                .map(|row| {
                    let cells: Vec<String> = row.iter().map(|v| v.to_sql()).collect();
                    format!("({})", cells.join(", "))
                })
                .collect();
            writeln!(w, "{}{};", header, values.join(", "))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, SqlType, Table};
    use crate::value::SqlValue;

    fn sample_data(detail_rows: usize) -> SeedData {
        let items = Table::new("FoodItems", TableRole::Catalog)
            .column(Column::new("FoodId", SqlType::Serial).primary_key())
            .column(Column::new("Name", SqlType::VarChar(100)).not_null())
            .column(Column::new("Availability", SqlType::Boolean).not_null());
        let orders = Table::new("Orders", TableRole::Detail)
            .column(Column::new("OrderId", SqlType::Serial).primary_key())
            .column(Column::new("FoodId", SqlType::Integer).references("FoodItems", "FoodId"))
            .column(Column::new("Quantity", SqlType::Integer).not_null());

        SeedData {
            label: "Test".to_string(),
            database: Some("test_db".to_string()),
            tables: vec![
                TableData {
                    table: items,
                    rows: vec![
                        vec![SqlValue::text("O'Brien's Stew"), SqlValue::Bool(true)],
                        vec![SqlValue::text("Tea"), SqlValue::Bool(false)],
                    ],
                },
                TableData {
                    table: orders,
                    rows: (0..detail_rows)
                        .map(|i| vec![SqlValue::Int(1 + (i as i64 % 2)), SqlValue::Int(3)])
                        .collect(),
                },
            ],
        }
    }

    #[test]
    fn test_preamble_order() {
        let sql = Renderer::new(RenderConfig::default()).render_to_string(&sample_data(3)).unwrap();
        let lines: Vec<&str> = sql.lines().collect();
        assert_eq!(lines[0], "USE test_db;");
        assert_eq!(lines[1], "SET FOREIGN_KEY_CHECKS = 0;");
        assert_eq!(lines[2], "-- Test Seed Data");
        let truncate = sql.find("TRUNCATE TABLE FoodItems;").unwrap();
        let insert = sql.find("INSERT INTO FoodItems").unwrap();
        assert!(truncate < insert);
    }

    #[test]
    fn test_catalog_single_statement_escaped() {
        let sql = Renderer::new(RenderConfig::default()).render_to_string(&sample_data(0)).unwrap();
        assert!(sql.contains(
            "INSERT INTO FoodItems (Name, Availability) VALUES ('O''Brien''s Stew', TRUE), ('Tea', FALSE);"
        ));
        // empty detail table still gets reset, but no INSERT
        assert!(sql.contains("TRUNCATE TABLE Orders;"));
        assert!(!sql.contains("INSERT INTO Orders"));
    }

    #[test]
    fn test_detail_rows_batched() {
        let config = RenderConfig {
            batch_size: 50,
            include_schema: false,
        };
        let sql = Renderer::new(config).render_to_string(&sample_data(120)).unwrap();
        let inserts: Vec<&str> = sql
            .lines()
            .filter(|l| l.starts_with("INSERT INTO Orders"))
            .collect();
        assert_eq!(inserts.len(), 3);
        let rows: Vec<usize> = inserts.iter().map(|l| l.matches("), (").count() + 1).collect();
        assert_eq!(rows, vec![50, 50, 20]);
        assert!(sql.contains("-- Orders (120 records)"));
    }

    #[test]
    fn test_schema_section() {
        let config = RenderConfig {
            batch_size: 50,
            include_schema: true,
        };
        let sql = Renderer::new(config).render_to_string(&sample_data(1)).unwrap();
        let create_items = sql.find("CREATE TABLE IF NOT EXISTS FoodItems").unwrap();
        let create_orders = sql.find("CREATE TABLE IF NOT EXISTS Orders").unwrap();
        let first_truncate = sql.find("TRUNCATE TABLE").unwrap();
        assert!(create_items < create_orders);
        assert!(create_orders < first_truncate);
    }

    #[test]
    fn test_no_database_skips_use() {
        let mut data = sample_data(1);
        data.database = None;
        let sql = Renderer::new(RenderConfig::default()).render_to_string(&data).unwrap();
        assert!(sql.starts_with("SET FOREIGN_KEY_CHECKS = 0;"));
    }

    /// Accepts `limit` bytes, then fails every write
    struct FullDisk {
        written: usize,
        limit: usize,
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written >= self.limit {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            let n = buf.len().min(self.limit - self.written);
            self.written += n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_propagates() {
        let renderer = Renderer::new(RenderConfig::default());
        let mut sink = FullDisk {
            written: 0,
            limit: 64,
        };
        let err = renderer.render(&sample_data(10), &mut sink).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert_eq!(sink.written, 64);
    }
}
