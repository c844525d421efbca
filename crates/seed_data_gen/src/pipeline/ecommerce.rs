//! Generic inventory schema: suppliers, products and product orders.
//!
//! Unlike the other pipelines the catalog here is synthesised, but product
//! ids are still assigned from 1 in generation order so orders can reference
//! them the same way.

use crate::accumulator::Accumulator;
use crate::fake::FakeData;
use crate::generator::{
    generate_children, load_catalog, parent_ids, ChildRecord, CountRange, Delta, LookbackWindow,
    Parent, ParentId, SeedData, TableData,
};
use crate::renderer::{RenderConfig, DEFAULT_BATCH_SIZE};
use crate::schema::{Column, Schema, SqlType, Table, TableRole};
use crate::value::{Row, SqlValue};
use chrono::{NaiveDate, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Supplier {
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub name: String,
    pub category: &'static str,
    pub stock_qty: i64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductOrder {
    pub product_id: ParentId,
    pub quantity: i64,
    pub order_date: NaiveDate,
}

impl ChildRecord for ProductOrder {
    fn parent_id(&self) -> ParentId {
        self.product_id
    }

    fn measure(&self) -> i64 {
        self.quantity
    }

    fn to_row(&self) -> Row {
        vec![
            SqlValue::Int(self.product_id),
            SqlValue::Int(self.quantity),
            SqlValue::Date(self.order_date),
        ]
    }
}

/// Ecommerce pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcommerceConfig {
    pub enabled: bool,
    pub label: String,
    pub database: Option<String>,
    pub output: String,
    pub suppliers: usize,
    pub products: usize,
    /// Number of orders, drawn per run
    pub child_count: CountRange,
    pub quantity: CountRange,
    pub lookback_days: u32,
    pub batch_size: usize,
    /// Name of an optional per-product order total table
    pub summary_table: Option<String>,
    pub include_schema: bool,
}

impl Default for EcommerceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            label: "Inventory".to_string(),
            database: None,
            output: "seed_data_large.sql".to_string(),
            suppliers: 60,
            products: 150,
            child_count: CountRange::fixed(350),
            quantity: CountRange::new(1, 30),
            lookback_days: 365,
            batch_size: DEFAULT_BATCH_SIZE,
            summary_table: None,
            include_schema: false,
        }
    }
}

impl EcommerceConfig {
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            batch_size: self.batch_size,
            include_schema: self.include_schema,
        }
    }
}

fn suppliers_table() -> Table {
    Table::new("Suppliers", TableRole::Catalog)
        .column(Column::new("SupplierId", SqlType::Serial).primary_key())
        .column(Column::new("Name", SqlType::VarChar(100)).not_null())
        .column(Column::new("Contact", SqlType::VarChar(100)).not_null())
}

fn products_table() -> Table {
    Table::new("Products", TableRole::Catalog)
        .column(Column::new("ProductId", SqlType::Serial).primary_key())
        .column(Column::new("Name", SqlType::VarChar(100)).not_null())
        .column(Column::new("Category", SqlType::VarChar(50)).not_null())
        .column(Column::new("StockQty", SqlType::Integer).not_null())
        .column(Column::new("Price", SqlType::Decimal(10, 2)).not_null())
}

fn orders_table() -> Table {
    Table::new("Orders", TableRole::Detail)
        .column(Column::new("OrderId", SqlType::Serial).primary_key())
        .column(
            Column::new("ProductId", SqlType::Integer)
                .not_null()
                .references("Products", "ProductId"),
        )
        .column(Column::new("Quantity", SqlType::Integer).not_null())
        .column(Column::new("OrderDate", SqlType::Date).not_null())
}

fn summary_table(name: &str) -> Table {
    Table::new(name, TableRole::Summary)
        .column(
            Column::new("ProductId", SqlType::Integer)
                .primary_key()
                .references("Products", "ProductId"),
        )
        .column(Column::new("TotalOrdered", SqlType::Integer).not_null())
}

pub fn schema(summary: Option<&str>) -> Schema {
    let schema = Schema::new()
        .table(suppliers_table())
        .table(products_table())
        .table(orders_table());
    match summary {
        Some(name) => schema.table(summary_table(name)),
        None => schema,
    }
}

/// Draw `count` suppliers with distinct names.
///
/// `count` must not exceed [`crate::fake::supplier_name_space`].
pub fn generate_suppliers<R: Rng>(fake: &mut FakeData<R>, count: usize) -> Vec<Parent<Supplier>> {
    let count = count.min(crate::fake::supplier_name_space());
    let mut seen = HashSet::with_capacity(count);
    let mut suppliers = Vec::with_capacity(count);
    while suppliers.len() < count {
        let name = fake.supplier_name();
        if !seen.insert(name.clone()) {
            continue;
        }
        let contact = fake.contact(&name);
        suppliers.push(Supplier { name, contact });
    }
    load_catalog(suppliers)
}

pub fn generate_products<R: Rng>(fake: &mut FakeData<R>, count: usize) -> Vec<Parent<Product>> {
    load_catalog((0..count).map(|_| {
        let category = fake.product_category();
        let name = fake.product_name();
        let stock_qty = fake.stock_level();
        let price = fake.category_price(category);
        Product {
            name,
            category,
            stock_qty,
            price,
        }
    }))
}

/// One generation step: an order and the quantity it adds to its product.
pub fn draw_order<R: Rng>(
    fake: &mut FakeData<R>,
    product_ids: &[ParentId],
    quantity: CountRange,
    window: &LookbackWindow,
) -> (ProductOrder, Delta) {
    let product_id = fake.pick_id(product_ids);
    let quantity = i64::from(fake.count(quantity));
    let order_date = window.at(fake.unit()).date();
    (
        ProductOrder {
            product_id,
            quantity,
            order_date,
        },
        Delta {
            parent_id: product_id,
            amount: quantity,
        },
    )
}

/// Result of one ecommerce run
#[derive(Debug, Clone)]
pub struct EcommerceData {
    pub suppliers: Vec<Parent<Supplier>>,
    pub products: Vec<Parent<Product>>,
    pub orders: Vec<ProductOrder>,
    pub ordered: Accumulator,
}

pub fn generate<R: Rng>(
    config: &EcommerceConfig,
    fake: &mut FakeData<R>,
    now: NaiveDateTime,
) -> EcommerceData {
    let suppliers = generate_suppliers(fake, config.suppliers);
    let products = generate_products(fake, config.products);
    let product_ids = parent_ids(&products);

    let count = if product_ids.is_empty() {
        0
    } else {
        fake.count(config.child_count) as usize
    };
    let window = LookbackWindow::ending_at(now, config.lookback_days);
    tracing::debug!(
        suppliers = suppliers.len(),
        products = products.len(),
        count,
        "generating ecommerce orders"
    );

    let mut ordered = Accumulator::new(&product_ids);
    let orders = generate_children(count, &mut ordered, || {
        draw_order(fake, &product_ids, config.quantity, &window)
    });

    EcommerceData {
        suppliers,
        products,
        orders,
        ordered,
    }
}

impl EcommerceData {
    pub fn into_seed_data(self, config: &EcommerceConfig) -> SeedData {
        let supplier_rows = self
            .suppliers
            .iter()
            .map(|p| {
                vec![
                    SqlValue::text(p.attrs.name.clone()),
                    SqlValue::text(p.attrs.contact.clone()),
                ]
            })
            .collect();
        let product_rows = self
            .products
            .iter()
            .map(|p| {
                vec![
                    SqlValue::text(p.attrs.name.clone()),
                    SqlValue::text(p.attrs.category),
                    SqlValue::Int(p.attrs.stock_qty),
                    SqlValue::decimal(p.attrs.price, 2),
                ]
            })
            .collect();
        let order_rows = self.orders.iter().map(ChildRecord::to_row).collect();

        let mut tables = vec![
            TableData {
                table: suppliers_table(),
                rows: supplier_rows,
            },
            TableData {
                table: products_table(),
                rows: product_rows,
            },
            TableData {
                table: orders_table(),
                rows: order_rows,
            },
        ];

        if let Some(name) = &config.summary_table {
            let rows = self
                .ordered
                .into_totals()
                .into_iter()
                .map(|(id, total)| vec![SqlValue::Int(id), SqlValue::Int(total)])
                .collect();
            tables.push(TableData {
                table: summary_table(name),
                rows,
            });
        }

        SeedData {
            label: config.label.clone(),
            database: config.database.clone(),
            tables,
        }
    }
}
