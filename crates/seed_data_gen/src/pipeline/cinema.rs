//! Cinema ticketing schema: movies, snacks, staff, shows and per-movie ticket sales.

use crate::accumulator::Accumulator;
use crate::fake::FakeData;
use crate::generator::{
    generate_children, load_catalog, parent_ids, ChildRecord, CountRange, Delta, LookbackWindow,
    Parent, ParentId, SeedData, TableData,
};
use crate::renderer::{RenderConfig, DEFAULT_BATCH_SIZE};
use crate::schema::{Column, Schema, SqlType, Table, TableRole};
use crate::value::{Row, SqlValue};
use chrono::{NaiveDateTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// (Name, Genre, Rating, Duration in minutes)
const MOVIES: &[(&str, &str, f64, u32)] = &[
    ("Pathaan", "Action", 7.8, 146),
    ("Jawan", "Action", 8.2, 169),
    ("Mission Impossible 7", "Action", 8.0, 163),
    ("Tiger 3", "Action", 7.0, 156),
    ("Oppenheimer", "Drama", 8.5, 180),
    ("12th Fail", "Drama", 9.2, 147),
    ("Rocky Aur Rani", "Drama", 7.5, 168),
    ("Dunki", "Comedy", 7.2, 161),
    ("Dream Girl 2", "Comedy", 6.9, 133),
    ("Fukrey 3", "Comedy", 6.5, 150),
    ("Drishyam 2", "Thriller", 8.6, 140),
    ("Merry Christmas", "Thriller", 8.0, 144),
    ("Animal", "Thriller", 7.8, 201),
    ("Spider-Man: Across the Spider-Verse", "Animation", 9.0, 140),
    ("Elemental", "Animation", 7.4, 101),
    ("Kung Fu Panda 4", "Animation", 7.6, 94),
    ("Sam Bahadur", "Drama", 8.1, 150),
    ("Salaar", "Action", 7.1, 175),
];

/// (Name, Price, StockQty)
const SNACKS: &[(&str, i64, i64)] = &[
    ("Salted Popcorn (R)", 250, 100),
    ("Salted Popcorn (L)", 350, 80),
    ("Cheese Popcorn (R)", 280, 90),
    ("Caramel Popcorn (L)", 400, 60),
    ("Nachos with Salsa", 220, 50),
    ("Nachos with Cheese", 250, 40),
    ("Coke (R)", 150, 200),
    ("Coke (L)", 200, 150),
    ("Sprite (L)", 200, 100),
    ("Chicken Nuggets", 220, 15),
    ("Veg Burger", 180, 10),
    ("Hot Dog", 200, 5),
    ("Combo: Popcorn + Coke", 450, 120),
    ("Combo: Nachos + Coke", 380, 110),
    ("Mineral Water", 50, 300),
    ("Chocolate Bar", 80, 50),
];

/// (Name, Role)
const STAFF: &[(&str, &str)] = &[
    ("Ramesh Pawar", "Projectionist"),
    ("Suresh Patil", "Projectionist"),
    ("Ganesh Gaikwad", "Counter"),
    ("Pooja Hegde", "Counter"),
    ("Alia Bhatt", "Counter"),
    ("Ranbir Kapoor", "Cleaning"),
    ("Varun Dhawan", "Cleaning"),
    ("Sid Malhotra", "Cleaning"),
    ("Katrina Kaif", "Counter"),
    ("Vicky Kaushal", "Projectionist"),
    ("Kiara Advani", "Counter"),
    ("Kartik Aaryan", "Cleaning"),
    ("Kriti Sanon", "Counter"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub name: &'static str,
    pub genre: &'static str,
    pub rating: f64,
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snack {
    pub name: &'static str,
    pub price: i64,
    pub stock_qty: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaffMember {
    pub name: &'static str,
    pub role: &'static str,
}

/// Load the movie catalog, capping runtimes at `max_duration` minutes.
pub fn load_movies(max_duration: u32) -> Vec<Parent<Movie>> {
    load_catalog(
        MOVIES
            .iter()
            .map(|&(name, genre, rating, duration)| Movie {
                name,
                genre,
                rating,
                duration: duration.min(max_duration),
            }),
    )
}

pub fn load_snacks() -> Vec<Parent<Snack>> {
    load_catalog(SNACKS.iter().map(|&(name, price, stock_qty)| Snack {
        name,
        price,
        stock_qty,
    }))
}

pub fn load_staff() -> Vec<Parent<StaffMember>> {
    load_catalog(STAFF.iter().map(|&(name, role)| StaffMember { name, role }))
}

/// One screening of a movie
#[derive(Debug, Clone, PartialEq)]
pub struct Show {
    pub movie_id: ParentId,
    pub show_time: NaiveDateTime,
    pub screen_no: i64,
    pub tickets_sold: i64,
}

impl ChildRecord for Show {
    fn parent_id(&self) -> ParentId {
        self.movie_id
    }

    fn measure(&self) -> i64 {
        self.tickets_sold
    }

    fn to_row(&self) -> Row {
        vec![
            SqlValue::Int(self.movie_id),
            SqlValue::DateTime(self.show_time),
            SqlValue::Int(self.screen_no),
            SqlValue::Int(self.tickets_sold),
        ]
    }
}

/// Cinema pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CinemaConfig {
    pub enabled: bool,
    pub label: String,
    pub database: Option<String>,
    pub output: String,
    /// Number of shows, drawn per run
    pub child_count: CountRange,
    pub screens: CountRange,
    pub tickets: CountRange,
    /// Movie runtimes above this are capped at load time
    pub max_duration: u32,
    pub lookback_days: u32,
    pub batch_size: usize,
    pub include_schema: bool,
}

impl Default for CinemaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            label: "PVRINOX".to_string(),
            database: Some("pvrinox_db".to_string()),
            output: "pvrinox_seed.sql".to_string(),
            child_count: CountRange::new(120, 200),
            screens: CountRange::new(1, 6),
            tickets: CountRange::new(20, 250),
            max_duration: 180,
            lookback_days: 30,
            batch_size: DEFAULT_BATCH_SIZE,
            include_schema: false,
        }
    }
}

impl CinemaConfig {
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            batch_size: self.batch_size,
            include_schema: self.include_schema,
        }
    }
}

fn movies_table() -> Table {
    Table::new("Movies", TableRole::Catalog)
        .column(Column::new("MovieId", SqlType::Serial).primary_key())
        .column(Column::new("Name", SqlType::VarChar(150)).not_null())
        .column(Column::new("Genre", SqlType::VarChar(50)).not_null())
        .column(Column::new("Rating", SqlType::Decimal(3, 1)).not_null())
        .column(Column::new("Duration", SqlType::Integer).not_null())
}

fn snacks_table() -> Table {
    Table::new("Snacks", TableRole::Catalog)
        .column(Column::new("SnackId", SqlType::Serial).primary_key())
        .column(Column::new("Name", SqlType::VarChar(100)).not_null())
        .column(Column::new("Price", SqlType::Decimal(10, 2)).not_null())
        .column(Column::new("StockQty", SqlType::Integer).not_null())
}

fn staff_table() -> Table {
    Table::new("Staff", TableRole::Catalog)
        .column(Column::new("StaffId", SqlType::Serial).primary_key())
        .column(Column::new("Name", SqlType::VarChar(100)).not_null())
        .column(Column::new("Role", SqlType::VarChar(50)).not_null())
}

fn shows_table() -> Table {
    Table::new("Shows", TableRole::Detail)
        .column(Column::new("ShowId", SqlType::Serial).primary_key())
        .column(
            Column::new("MovieId", SqlType::Integer)
                .not_null()
                .references("Movies", "MovieId"),
        )
        .column(Column::new("ShowTime", SqlType::DateTime).not_null())
        .column(Column::new("ScreenNo", SqlType::Integer).not_null())
        .column(Column::new("TicketsSold", SqlType::Integer).not_null())
}

fn sales_summary_table() -> Table {
    Table::new("SalesSummary", TableRole::Summary)
        .column(
            Column::new("MovieId", SqlType::Integer)
                .primary_key()
                .references("Movies", "MovieId"),
        )
        .column(Column::new("TotalTicketsSold", SqlType::Integer).not_null())
}

pub fn schema() -> Schema {
    Schema::new()
        .table(movies_table())
        .table(snacks_table())
        .table(staff_table())
        .table(shows_table())
        .table(sales_summary_table())
}

/// One generation step: a show and the tickets it adds to its movie.
pub fn draw_show<R: Rng>(
    fake: &mut FakeData<R>,
    movie_ids: &[ParentId],
    config: &CinemaConfig,
    window: &LookbackWindow,
) -> (Show, Delta) {
    let movie_id = fake.pick_id(movie_ids);
    let screen_no = i64::from(fake.count(config.screens));
    let tickets_sold = i64::from(fake.count(config.tickets));
    // DATETIME columns hold whole seconds
    let show_time = window.at(fake.unit());
    let show_time = show_time.with_nanosecond(0).unwrap_or(show_time);
    (
        Show {
            movie_id,
            show_time,
            screen_no,
            tickets_sold,
        },
        Delta {
            parent_id: movie_id,
            amount: tickets_sold,
        },
    )
}

/// Result of one cinema run
#[derive(Debug, Clone)]
pub struct CinemaData {
    pub movies: Vec<Parent<Movie>>,
    pub snacks: Vec<Parent<Snack>>,
    pub staff: Vec<Parent<StaffMember>>,
    pub shows: Vec<Show>,
    pub ticket_sales: Accumulator,
}

pub fn generate<R: Rng>(
    config: &CinemaConfig,
    fake: &mut FakeData<R>,
    now: NaiveDateTime,
) -> CinemaData {
    let movies = load_movies(config.max_duration);
    let snacks = load_snacks();
    let staff = load_staff();
    let movie_ids = parent_ids(&movies);

    let count = fake.count(config.child_count) as usize;
    let window = LookbackWindow::ending_at(now, config.lookback_days);
    tracing::debug!(count, lookback_days = config.lookback_days, "generating cinema shows");

    let mut ticket_sales = Accumulator::new(&movie_ids);
    let shows = generate_children(count, &mut ticket_sales, || {
        draw_show(fake, &movie_ids, config, &window)
    });

    CinemaData {
        movies,
        snacks,
        staff,
        shows,
        ticket_sales,
    }
}

impl CinemaData {
    pub fn into_seed_data(self, config: &CinemaConfig) -> SeedData {
        let movie_rows = self
            .movies
            .iter()
            .map(|p| {
                vec![
                    SqlValue::text(p.attrs.name),
                    SqlValue::text(p.attrs.genre),
                    SqlValue::decimal(p.attrs.rating, 1),
                    SqlValue::Int(i64::from(p.attrs.duration)),
                ]
            })
            .collect();
        let snack_rows = self
            .snacks
            .iter()
            .map(|p| {
                vec![
                    SqlValue::text(p.attrs.name),
                    SqlValue::Int(p.attrs.price),
                    SqlValue::Int(p.attrs.stock_qty),
                ]
            })
            .collect();
        let staff_rows = self
            .staff
            .iter()
            .map(|p| vec![SqlValue::text(p.attrs.name), SqlValue::text(p.attrs.role)])
            .collect();
        let show_rows = self.shows.iter().map(ChildRecord::to_row).collect();
        let summary_rows = self
            .ticket_sales
            .into_totals()
            .into_iter()
            .map(|(id, total)| vec![SqlValue::Int(id), SqlValue::Int(total)])
            .collect();

        SeedData {
            label: config.label.clone(),
            database: config.database.clone(),
            tables: vec![
                TableData {
                    table: movies_table(),
                    rows: movie_rows,
                },
                TableData {
                    table: snacks_table(),
                    rows: snack_rows,
                },
                TableData {
                    table: staff_table(),
                    rows: staff_rows,
                },
                TableData {
                    table: shows_table(),
                    rows: show_rows,
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
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(21, 15, 0)
            .unwrap()
    }

    fn run(seed: u64) -> CinemaData {
        let mut fake = FakeData::new(ChaCha8Rng::seed_from_u64(seed));
        generate(&CinemaConfig::default(), &mut fake, now())
    }

    #[test]
    fn test_duration_cap() {
        let movies = load_movies(180);
        assert_eq!(movies.len(), 18);
        assert!(movies.iter().all(|m| m.attrs.duration <= 180));
        let animal = movies.iter().find(|m| m.attrs.name == "Animal").unwrap();
        assert_eq!(animal.attrs.duration, 180);
        assert_eq!(animal.id, 13);
    }

    #[test]
    fn test_show_bounds() {
        let data = run(9);
        assert!((120..=200).contains(&data.shows.len()));
        let window = LookbackWindow::ending_at(now(), 30);
        for show in &data.shows {
            assert!((1..=6).contains(&show.screen_no));
            assert!((20..=250).contains(&show.tickets_sold));
            assert!(window.contains(show.show_time));
            assert_eq!(show.show_time.nanosecond(), 0);
        }
    }

    #[test]
    fn test_ticket_sales_match_shows() {
        let data = run(21);
        let ids = parent_ids(&data.movies);
        assert!(data.shows.iter().all(|s| ids.contains(&s.movie_id)));
        assert_eq!(Accumulator::tally(&ids, &data.shows), data.ticket_sales);
        assert_eq!(data.ticket_sales.snapshot().len(), data.movies.len());
    }

    #[test]
    fn test_seed_data_renders_rating_with_one_decimal() {
        let config = CinemaConfig::default();
        let seed = run(2).into_seed_data(&config);
        let movies = seed.table("Movies").unwrap();
        let spider = &movies.rows[13];
        assert_eq!(spider[2].to_sql(), "9.0");
        assert_eq!(seed.table("SalesSummary").unwrap().rows.len(), 18);
        assert_eq!(seed.tables.len(), 5);
    }
}
