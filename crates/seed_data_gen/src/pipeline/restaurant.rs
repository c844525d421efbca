//! Restaurant ordering schema: food items, staff, orders and per-item sales.

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

/// (Name, Category, Price, Availability)
const FOOD_ITEMS: &[(&str, &str, i64, bool)] = &[
    ("Paneer Tikka", "Starter", 350, true),
    ("Chicken Malai Tikka", "Starter", 450, true),
    ("Veg Crispy", "Starter", 280, true),
    ("Prawns Koliwada", "Starter", 550, true),
    ("Mushroom Bruschetta", "Starter", 320, true),
    ("Chicken Wings", "Starter", 380, true),
    ("Fish Fingers", "Starter", 420, false),
    ("Hara Bhara Kabab", "Starter", 300, true),
    ("Corn Cheese Balls", "Starter", 290, true),
    ("Mutton Seekh Kabab", "Starter", 580, true),
    ("Butter Chicken", "Main Course", 480, true),
    ("Paneer Butter Masala", "Main Course", 390, true),
    ("Dal Makhani", "Main Course", 350, true),
    ("Mutton Rogan Josh", "Main Course", 620, true),
    ("Veg Biryani", "Main Course", 350, true),
    ("Chicken Biryani", "Main Course", 450, true),
    ("Prawns Curry", "Main Course", 590, true),
    ("Aloo Gobi", "Main Course", 250, true),
    ("Palak Paneer", "Main Course", 380, true),
    ("Chicken Chettinad", "Main Course", 490, true),
    ("Veg Pulao", "Main Course", 280, true),
    ("Jeera Rice", "Main Course", 200, true),
    ("Garlic Naan", "Main Course", 80, true),
    ("Butter Naan", "Main Course", 60, true),
    ("Tandoori Roti", "Main Course", 40, true),
    ("Gulab Jamun", "Dessert", 150, true),
    ("Rasmalai", "Dessert", 180, true),
    ("Chocolate Brownie", "Dessert", 220, true),
    ("Ice Cream", "Dessert", 120, true),
    ("Sizzling Brownie", "Dessert", 280, true),
    ("Gajar Halwa", "Dessert", 200, false),
    ("Fresh Lime Soda", "Beverage", 110, true),
    ("Iced Tea", "Beverage", 140, true),
    ("Cola", "Beverage", 80, true),
    ("Mineral Water", "Beverage", 40, true),
    ("Cold Coffee", "Beverage", 180, true),
    ("Virgin Mojito", "Beverage", 190, true),
    ("Lassi", "Beverage", 130, true),
    ("Mango Shake", "Beverage", 210, false),
];

/// (Name, Role, Shift); roles are Chef, Waiter or Manager
const STAFF: &[(&str, &str, &str)] = &[
    ("Rahul Sharma", "Chef", "Morning"),
    ("Amit Verma", "Chef", "Evening"),
    ("Suresh Raina", "Chef", "Night"),
    ("Priya Singh", "Waiter", "Morning"),
    ("Neha Gupta", "Waiter", "Morning"),
    ("Rohan Das", "Waiter", "Evening"),
    ("Vikas Khanna", "Waiter", "Evening"),
    ("Sneha Patil", "Waiter", "Night"),
    ("Arjun Kapoor", "Waiter", "Night"),
    ("Manoj Bajpayee", "Manager", "Morning"),
    ("Deepika Padukone", "Manager", "Evening"),
    ("Ranveer Singh", "Manager", "Night"),
    ("Kajol Devgan", "Waiter", "Morning"),
    ("Ajay Devgan", "Chef", "Evening"),
    ("Shahrukh Khan", "Waiter", "Night"),
    ("Salman Khan", "Waiter", "Morning"),
    ("Aamir Khan", "Waiter", "Evening"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct FoodItem {
    pub name: &'static str,
    pub category: &'static str,
    pub price: i64,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaffMember {
    pub name: &'static str,
    pub role: &'static str,
    pub shift: &'static str,
}

pub fn load_food_items() -> Vec<Parent<FoodItem>> {
    load_catalog(
        FOOD_ITEMS
            .iter()
            .map(|&(name, category, price, available)| FoodItem {
                name,
                category,
                price,
                available,
            }),
    )
}

pub fn load_staff() -> Vec<Parent<StaffMember>> {
    load_catalog(
        STAFF
            .iter()
            .map(|&(name, role, shift)| StaffMember { name, role, shift }),
    )
}

/// One order line referencing a food item
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub food_id: ParentId,
    pub quantity: i64,
    pub order_date: NaiveDate,
}

impl ChildRecord for Order {
    fn parent_id(&self) -> ParentId {
        self.food_id
    }

    fn measure(&self) -> i64 {
        self.quantity
    }

    fn to_row(&self) -> Row {
        vec![
            SqlValue::Int(self.food_id),
            SqlValue::Int(self.quantity),
            SqlValue::Date(self.order_date),
        ]
    }
}

/// Restaurant pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestaurantConfig {
    pub enabled: bool,
    pub label: String,
    pub database: Option<String>,
    /// Output file name, relative to the output directory
    pub output: String,
    /// Number of orders, drawn per run
    pub child_count: CountRange,
    pub quantity: CountRange,
    pub lookback_days: u32,
    pub batch_size: usize,
    pub include_schema: bool,
}

impl Default for RestaurantConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            label: "Novotel".to_string(),
            database: Some("novotel_db".to_string()),
            output: "novotel_seed.sql".to_string(),
            child_count: CountRange::new(150, 250),
            quantity: CountRange::new(1, 8),
            lookback_days: 180,
            batch_size: DEFAULT_BATCH_SIZE,
            include_schema: false,
        }
    }
}

impl RestaurantConfig {
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            batch_size: self.batch_size,
            include_schema: self.include_schema,
        }
    }
}

fn food_items_table() -> Table {
    Table::new("FoodItems", TableRole::Catalog)
        .column(Column::new("FoodId", SqlType::Serial).primary_key())
        .column(Column::new("Name", SqlType::VarChar(100)).not_null())
        .column(Column::new("Category", SqlType::VarChar(50)).not_null())
        .column(Column::new("Price", SqlType::Decimal(10, 2)).not_null())
        .column(Column::new("Availability", SqlType::Boolean).not_null())
}

fn staff_table() -> Table {
    Table::new("Staff", TableRole::Catalog)
        .column(Column::new("StaffId", SqlType::Serial).primary_key())
        .column(Column::new("Name", SqlType::VarChar(100)).not_null())
        .column(Column::new("Role", SqlType::VarChar(50)).not_null())
        .column(Column::new("Shift", SqlType::VarChar(20)).not_null())
}

fn orders_table() -> Table {
    Table::new("Orders", TableRole::Detail)
        .column(Column::new("OrderId", SqlType::Serial).primary_key())
        .column(
            Column::new("FoodId", SqlType::Integer)
                .not_null()
                .references("FoodItems", "FoodId"),
        )
        .column(Column::new("Quantity", SqlType::Integer).not_null())
        .column(Column::new("OrderDate", SqlType::Date).not_null())
}

fn sales_summary_table() -> Table {
    Table::new("SalesSummary", TableRole::Summary)
        .column(
            Column::new("FoodId", SqlType::Integer)
                .primary_key()
                .references("FoodItems", "FoodId"),
        )
        .column(Column::new("TotalSold", SqlType::Integer).not_null())
}

pub fn schema() -> Schema {
    Schema::new()
        .table(food_items_table())
        .table(staff_table())
        .table(orders_table())
        .table(sales_summary_table())
}

/// One generation step: an order and the quantity it adds to its item.
pub fn draw_order<R: Rng>(
    fake: &mut FakeData<R>,
    food_ids: &[ParentId],
    quantity: CountRange,
    window: &LookbackWindow,
) -> (Order, Delta) {
    let food_id = fake.pick_id(food_ids);
    let quantity = i64::from(fake.count(quantity));
    let order_date = window.at(fake.unit()).date();
    (
        Order {
            food_id,
            quantity,
            order_date,
        },
        Delta {
            parent_id: food_id,
            amount: quantity,
        },
    )
}

/// Result of one restaurant run
#[derive(Debug, Clone)]
pub struct RestaurantData {
    pub food_items: Vec<Parent<FoodItem>>,
    pub staff: Vec<Parent<StaffMember>>,
    pub orders: Vec<Order>,
    pub sales: Accumulator,
}

pub fn generate<R: Rng>(
    config: &RestaurantConfig,
    fake: &mut FakeData<R>,
    now: NaiveDateTime,
) -> RestaurantData {
    let food_items = load_food_items();
    let staff = load_staff();
    let food_ids = parent_ids(&food_items);

    let count = fake.count(config.child_count) as usize;
    let window = LookbackWindow::ending_at(now, config.lookback_days);
    tracing::debug!(count, lookback_days = config.lookback_days, "generating restaurant orders");

    let mut sales = Accumulator::new(&food_ids);
    let orders = generate_children(count, &mut sales, || {
        draw_order(fake, &food_ids, config.quantity, &window)
    });

    RestaurantData {
        food_items,
        staff,
        orders,
        sales,
    }
}

impl RestaurantData {
    pub fn into_seed_data(self, config: &RestaurantConfig) -> SeedData {
        let food_rows = self
            .food_items
            .iter()
            .map(|p| {
                vec![
                    SqlValue::text(p.attrs.name),
                    SqlValue::text(p.attrs.category),
                    SqlValue::Int(p.attrs.price),
                    SqlValue::Bool(p.attrs.available),
                ]
            })
            .collect();
        let staff_rows = self
            .staff
            .iter()
            .map(|p| {
                vec![
                    SqlValue::text(p.attrs.name),
                    SqlValue::text(p.attrs.role),
                    SqlValue::text(p.attrs.shift),
                ]
            })
            .collect();
        let order_rows = self.orders.iter().map(ChildRecord::to_row).collect();
        let summary_rows = self
            .sales
            .into_totals()
            .into_iter()
            .map(|(id, total)| vec![SqlValue::Int(id), SqlValue::Int(total)])
            .collect();

        SeedData {
            label: config.label.clone(),
            database: config.database.clone(),
            tables: vec![
                TableData {
                    table: food_items_table(),
                    rows: food_rows,
                },
                TableData {
                    table: staff_table(),
                    rows: staff_rows,
                },
                TableData {
                    table: orders_table(),
                    rows: order_rows,
                },
                TableData {
                    table: sales_summary_table(),
                    rows: summary_rows,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeMap;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn run(seed: u64) -> RestaurantData {
        let mut fake = FakeData::new(ChaCha8Rng::seed_from_u64(seed));
        generate(&RestaurantConfig::default(), &mut fake, now())
    }

    #[test]
    fn test_catalog_ids() {
        let items = load_food_items();
        assert_eq!(items.len(), 39);
        assert_eq!(items[0].id, 1);
        assert_eq!(items[0].attrs.name, "Paneer Tikka");
        assert_eq!(items.last().unwrap().id, 39);
    }

    #[test]
    fn test_staff_roles() {
        let staff = load_staff();
        assert_eq!(staff.len(), 17);
        assert!(staff
            .iter()
            .all(|s| ["Chef", "Waiter", "Manager"].contains(&s.attrs.role)));
    }

    #[test]
    fn test_orders_reference_known_items() {
        let data = run(7);
        let ids = parent_ids(&data.food_items);
        assert!(data.orders.iter().all(|o| ids.contains(&o.food_id)));
    }

    #[test]
    fn test_order_bounds() {
        let data = run(11);
        assert!((150..=250).contains(&data.orders.len()));
        let window = LookbackWindow::ending_at(now(), 180);
        for order in &data.orders {
            assert!((1..=8).contains(&order.quantity));
            assert!(order.order_date >= window.start.date());
            assert!(order.order_date <= now().date());
        }
    }

    #[test]
    fn test_sales_match_orders() {
        let data = run(3);
        let mut expected: BTreeMap<ParentId, i64> =
            parent_ids(&data.food_items).into_iter().map(|id| (id, 0)).collect();
        for order in &data.orders {
            *expected.get_mut(&order.food_id).unwrap() += order.quantity;
        }
        assert_eq!(data.sales.snapshot(), &expected);
    }

    #[test]
    fn test_seed_data_tables() {
        let config = RestaurantConfig::default();
        let data = run(5);
        let order_count = data.orders.len();
        let seed = data.into_seed_data(&config);

        let names: Vec<&str> = seed.tables.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["FoodItems", "Staff", "Orders", "SalesSummary"]);
        assert_eq!(seed.table("Orders").unwrap().rows.len(), order_count);
        assert_eq!(seed.table("SalesSummary").unwrap().rows.len(), 39);
        assert_eq!(seed.database.as_deref(), Some("novotel_db"));
    }

    #[test]
    fn test_deterministic_with_seed() {
        assert_eq!(run(42).orders, run(42).orders);
    }
}
