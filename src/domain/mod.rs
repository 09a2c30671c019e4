//! Domain logic for workshop planning lives here.

pub mod budget;
pub mod catalog;
pub mod demand;
pub mod enrichment;
pub mod entities;
pub mod expansion;
pub mod gathering;
pub mod recipe_book;

#[allow(unused_imports)]
pub use budget::{
    crafting_rows, gathering_rows, plan_budget, BudgetPlan, DEFAULT_TOTAL_BUDGET,
};
#[allow(unused_imports)]
pub use catalog::{CatalogError, ItemCatalog};
#[allow(unused_imports)]
pub use demand::{consolidate, crafting_list, parse_demands};
#[allow(unused_imports)]
pub use enrichment::{
    union_items, EnrichmentReport, FetchOutcome, MarketDataSource, MarketEnrichment, Throttle,
};
#[allow(unused_imports)]
pub use entities::{
    Category, CraftingListRow, Demand, GatheringListRow, Ingredient, ItemId, MarketFields,
    MarketRecord,
};
#[allow(unused_imports)]
pub use expansion::{CycleCheck, ExpansionError, RecipeExpander, RequirementTotals};
#[allow(unused_imports)]
pub use gathering::{build_gathering_list, GatheringLocationIndex};
#[allow(unused_imports)]
pub use recipe_book::{DuplicatePolicy, RecipeBook, RecipeError, RecipeNode};
