//! Fake data generation helpers.
//!
//! Wraps an RNG and provides the bounded draws every pipeline needs, plus the
//! word lists used to synthesise the ecommerce catalog.

use crate::generator::{CountRange, ParentId};
use rand::Rng;

/// Product adjectives, also used as supplier name prefixes
const PRODUCT_ADJECTIVES: &[&str] = &[
    "Pro",
    "Ultra",
    "Super",
    "Slim",
    "Wireless",
    "Gaming",
    "Ergonomic",
    "Smart",
    "HD",
    "4K",
    "Portable",
    "Mechanical",
    "Noise-Cancelling",
    "High-Performance",
];

/// Product nouns, also used as supplier name prefixes
const PRODUCT_NOUNS: &[&str] = &[
    "Laptop",
    "Mouse",
    "Keyboard",
    "Monitor",
    "Headphones",
    "Speaker",
    "Webcam",
    "Router",
    "Switch",
    "Hub",
    "Cable",
    "Charger",
    "Stand",
    "Desk",
    "Chair",
    "Hard Drive",
    "SSD",
    "Tablet",
    "Stylus",
    "Printer",
];

const COMPANY_SUFFIXES: &[&str] = &[
    "Inc.",
    "Corp.",
    "Solutions",
    "Systems",
    "GMBH",
    "Ltd.",
    "Enterprises",
    "Tech",
    "Logistics",
    "Supplies",
];

const EMAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "outlook.com",
    "company.com",
    "tech.org",
    "biz.net",
];

/// Product categories of the ecommerce schema
pub const PRODUCT_CATEGORIES: &[&str] = &[
    "Electronics",
    "Accessories",
    "Office",
    "Networking",
    "Peripherals",
];

/// Number of distinct names [`FakeData::supplier_name`] can produce
pub fn supplier_name_space() -> usize {
    (PRODUCT_ADJECTIVES.len() + PRODUCT_NOUNS.len()) * COMPANY_SUFFIXES.len()
}

/// Fake data generator over any RNG
pub struct FakeData<R: Rng> {
    rng: R,
}

impl<R: Rng> FakeData<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Pick a random element from a non-empty slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.random_range(0..items.len())]
    }

    /// Uniform choice of a parent id, with repetition across calls
    pub fn pick_id(&mut self, ids: &[ParentId]) -> ParentId {
        *self.pick(ids)
    }

    /// Generate a random integer in the inclusive range
    pub fn int_range(&mut self, min: i64, max: i64) -> i64 {
        self.rng.random_range(min..=max)
    }

    /// Draw from an inclusive [`CountRange`]
    pub fn count(&mut self, range: CountRange) -> u32 {
        let (low, high) = range.bounds();
        self.rng.random_range(low..=high)
    }

    /// Uniform sample in `[0, 1)`
    pub fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Generate a boolean with given probability of true
    pub fn bool_with_probability(&mut self, probability: f64) -> bool {
        self.unit() < probability
    }

    /// Generate a price rounded to cents
    pub fn price(&mut self, min: f64, max: f64) -> f64 {
        let value = self.rng.random_range(min..max);
        (value * 100.0).round() / 100.0
    }

    /// Product name such as `Wireless Mouse 4821`
    pub fn product_name(&mut self) -> String {
        let adj = self.pick(PRODUCT_ADJECTIVES);
        let noun = self.pick(PRODUCT_NOUNS);
        let model = self.int_range(100, 9990);
        format!("{} {} {}", adj, noun, model)
    }

    pub fn product_category(&mut self) -> &'static str {
        *self.pick(PRODUCT_CATEGORIES)
    }

    /// Supplier name such as `Router Logistics`
    pub fn supplier_name(&mut self) -> String {
        let idx = self
            .rng
            .random_range(0..PRODUCT_ADJECTIVES.len() + PRODUCT_NOUNS.len());
        let prefix = PRODUCT_ADJECTIVES
            .get(idx)
            .copied()
            .unwrap_or_else(|| PRODUCT_NOUNS[idx - PRODUCT_ADJECTIVES.len()]);
        let suffix = self.pick(COMPANY_SUFFIXES);
        format!("{} {}", prefix, suffix)
    }

    /// Email derived from `name` (70%) or a phone number
    pub fn contact(&mut self, name: &str) -> String {
        if self.bool_with_probability(0.7) {
            let local: String = name
                .to_lowercase()
                .chars()
                .filter(|c| *c != ' ' && *c != '.')
                .collect();
            let domain = self.pick(EMAIL_DOMAINS);
            format!("{}@{}", local, domain)
        } else {
            self.phone()
        }
    }

    /// Phone number in `NNN-NNN-NNNN` form
    pub fn phone(&mut self) -> String {
        let area = self.int_range(100, 999);
        let prefix = self.int_range(100, 999);
        let line = self.int_range(1000, 9999);
        format!("{}-{}-{}", area, prefix, line)
    }

    /// Stock level in one of three bands: low (25%), high (25%), normal (50%)
    pub fn stock_level(&mut self) -> i64 {
        let band = self.unit();
        if band < 0.25 {
            self.int_range(0, 9)
        } else if band < 0.50 {
            self.int_range(101, 500)
        } else {
            self.int_range(10, 100)
        }
    }

    /// Price band of a product category
    pub fn category_price(&mut self, category: &str) -> f64 {
        match category {
            "Electronics" => self.price(50.0, 2000.0),
            "Accessories" => self.price(10.0, 150.0),
            "Office" => self.price(5.0, 500.0),
            _ => self.price(20.0, 300.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fake() -> FakeData<ChaCha8Rng> {
        FakeData::new(ChaCha8Rng::seed_from_u64(42))
    }

    #[test]
    fn test_deterministic_generation() {
        let mut fake1 = fake();
        let mut fake2 = fake();

        assert_eq!(fake1.product_name(), fake2.product_name());
        assert_eq!(fake1.supplier_name(), fake2.supplier_name());
        assert_eq!(fake1.price(10.0, 100.0), fake2.price(10.0, 100.0));
    }

    #[test]
    fn test_count_is_inclusive() {
        let mut fake = fake();
        let range = CountRange::new(1, 3);
        let mut seen = [false; 4];
        for _ in 0..500 {
            let n = fake.count(range);
            assert!((1..=3).contains(&n));
            seen[n as usize] = true;
        }
        assert!(seen[1] && seen[2] && seen[3]);
    }

    #[test]
    fn test_unit_interval() {
        let mut fake = fake();
        for _ in 0..1000 {
            let u = fake.unit();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn test_contact_shapes() {
        let mut fake = fake();
        for _ in 0..200 {
            let contact = fake.contact("Router Corp.");
            if contact.contains('@') {
                assert!(contact.starts_with("routercorp@"));
            } else {
                let parts: Vec<&str> = contact.split('-').collect();
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[2].len(), 4);
            }
        }
    }

    #[test]
    fn test_stock_bands() {
        let mut fake = fake();
        for _ in 0..500 {
            let stock = fake.stock_level();
            assert!((0..=500).contains(&stock));
        }
    }

    #[test]
    fn test_category_price_bounds() {
        let mut fake = fake();
        for _ in 0..200 {
            let p = fake.category_price("Accessories");
            assert!((10.0..=150.0).contains(&p));
            assert_eq!(p, (p * 100.0).round() / 100.0);
        }
    }

    #[test]
    fn test_product_name_shape() {
        let mut fake = fake();
        let name = fake.product_name();
        let model: i64 = name.rsplit(' ').next().unwrap().parse().unwrap();
        assert!((100..=9990).contains(&model));
    }
}
