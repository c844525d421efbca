//! The seeded schema families.
//!
//! Each submodule owns its catalog, its child generation step and the
//! conversion of its results into a renderable [`crate::SeedData`].

pub mod cinema;
pub mod ecommerce;
pub mod restaurant;

use crate::schema::Schema;
use serde::{Deserialize, Serialize};

/// Which schema a pipeline run targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    Restaurant,
    Cinema,
    Ecommerce,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 3] = [
        PipelineKind::Restaurant,
        PipelineKind::Cinema,
        PipelineKind::Ecommerce,
    ];

    /// Table declarations; `summary` names the optional ecommerce summary table
    pub fn schema(&self, summary: Option<&str>) -> Schema {
        match self {
            PipelineKind::Restaurant => restaurant::schema(),
            PipelineKind::Cinema => cinema::schema(),
            PipelineKind::Ecommerce => ecommerce::schema(summary),
        }
    }

    /// Guess the pipeline from the tables present in a document
    pub fn detect<'a, I>(table_names: I) -> Option<PipelineKind>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut has_products = false;
        for name in table_names {
            match name {
                "FoodItems" => return Some(PipelineKind::Restaurant),
                "Movies" | "Shows" => return Some(PipelineKind::Cinema),
                "Products" | "Suppliers" => has_products = true,
                _ => {}
            }
        }
        has_products.then_some(PipelineKind::Ecommerce)
    }
}

impl std::str::FromStr for PipelineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "restaurant" | "novotel" => Ok(PipelineKind::Restaurant),
            "cinema" | "pvrinox" => Ok(PipelineKind::Cinema),
            "ecommerce" | "inventory" => Ok(PipelineKind::Ecommerce),
            _ => Err(format!(
                "Unknown pipeline: {}. Valid options: restaurant, cinema, ecommerce",
                s
            )),
        }
    }
}

impl std::fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineKind::Restaurant => write!(f, "restaurant"),
            PipelineKind::Cinema => write!(f, "cinema"),
            PipelineKind::Ecommerce => write!(f, "ecommerce"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for kind in PipelineKind::ALL {
            assert_eq!(kind.to_string().parse::<PipelineKind>(), Ok(kind));
        }
        assert!("bakery".parse::<PipelineKind>().is_err());
    }

    #[test]
    fn test_detect() {
        assert_eq!(
            PipelineKind::detect(["FoodItems", "Staff"]),
            Some(PipelineKind::Restaurant)
        );
        assert_eq!(
            PipelineKind::detect(["Staff", "Shows"]),
            Some(PipelineKind::Cinema)
        );
        assert_eq!(
            PipelineKind::detect(["Suppliers", "Orders"]),
            Some(PipelineKind::Ecommerce)
        );
        assert_eq!(PipelineKind::detect(["Staff"]), None);
    }

    #[test]
    fn test_summary_links() {
        let link = PipelineKind::Cinema.schema(None).summary_link().unwrap();
        assert_eq!(link.detail_table, "Shows");
        assert_eq!(link.measure_column, "TicketsSold");
        assert_eq!(link.total_column, "TotalTicketsSold");

        let link = PipelineKind::Restaurant.schema(None).summary_link().unwrap();
        assert_eq!(link.parent_table, "FoodItems");
        assert_eq!(link.measure_column, "Quantity");
    }
}
