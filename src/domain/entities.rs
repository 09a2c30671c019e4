use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for items in the game item catalog (the JSON object keys).
pub type ItemId = String;

/// A top-level request to craft `quantity` units of `item`.
#[derive(Clone, Debug, PartialEq)]
pub struct Demand {
    pub item: String,
    pub quantity: f64,
}

impl Demand {
    pub fn new(item: impl Into<String>, quantity: f64) -> Self {
        Self {
            item: item.into(),
            quantity,
        }
    }
}

/// One row of a recipe: `quantity` units of `name` per crafted unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
}

/// A base ingredient with its accumulated requirement and where to gather it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GatheringListRow {
    #[serde(rename = "Ingredient")]
    pub ingredient: String,
    #[serde(rename = "Total Quantity")]
    pub total_quantity: f64,
    #[serde(rename = "Location Info")]
    pub location_info: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CraftingListRow {
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Required Quantity")]
    pub required_quantity: f64,
}

/// Which output list contributed an item to the market table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Gathering,
    Crafting,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Gathering => f.write_str("Gathering"),
            Category::Crafting => f.write_str("Crafting"),
        }
    }
}

/// Prices for a single item as reported by the market board.
///
/// Every field is independently optional: the board simply has no data for
/// price points nobody has listed or bought at.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarketFields {
    pub min_listing_world: Option<f64>,
    pub min_listing_dc: Option<f64>,
    pub recent_purchase_world: Option<f64>,
    pub recent_purchase_dc: Option<f64>,
    pub average_sale_price_dc: Option<f64>,
    pub daily_sale_velocity_dc: Option<f64>,
}

/// A row of the combined, market-enriched item list.
#[derive(Clone, Debug, PartialEq)]
pub struct MarketRecord {
    pub item_name: String,
    pub category: Category,
    pub item_id: Option<ItemId>,
    pub market: MarketFields,
}

impl MarketRecord {
    pub fn new(item_name: impl Into<String>, category: Category) -> Self {
        Self {
            item_name: item_name.into(),
            category,
            item_id: None,
            market: MarketFields::default(),
        }
    }
}
