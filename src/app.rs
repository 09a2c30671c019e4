use std::{
    fs::File,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    domain::{
        build_gathering_list, consolidate, crafting_list, crafting_rows, gathering_rows,
        parse_demands, plan_budget, union_items, BudgetPlan, CatalogError, CraftingListRow, CycleCheck, EnrichmentReport,
        ExpansionError, GatheringListRow, GatheringLocationIndex, ItemCatalog, MarketEnrichment,
        RecipeBook, RecipeError, RecipeExpander,
    },
    infra::{
        output::{self, OutputError},
        table::{TableError, TableLoader},
        throttle::FixedInterval,
        universalis::{MarketClientError, UniversalisClient},
    },
    util::settings::{Settings, SettingsError},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("recipe data: {0}")]
    Recipe(#[from] RecipeError),
    #[error(transparent)]
    Expansion(#[from] ExpansionError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("market client: {0}")]
    Market(#[from] MarketClientError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Input tables for the gathering step.
#[derive(Clone, Debug)]
pub struct GatherInputs {
    pub demand: PathBuf,
    pub recipes: PathBuf,
    pub locations: PathBuf,
}

#[derive(Clone, Debug)]
pub struct GatherOutput {
    pub gathering: Vec<GatheringListRow>,
    pub crafting: Vec<CraftingListRow>,
}

fn table_loader(settings: &Settings) -> TableLoader {
    match settings.max_columns {
        Some(width) => TableLoader::new().with_max_columns(width),
        None => TableLoader::new(),
    }
}

/// Expand the demand table into the gathering list and the sorted crafting
/// list.
pub fn gather(settings: &Settings, inputs: &GatherInputs) -> Result<GatherOutput, AppError> {
    let loader = table_loader(settings);
    let demand_table = loader.load(&inputs.demand)?;
    if demand_table.is_empty() {
        warn!(path = %inputs.demand.display(), "demand table is empty");
    }
    let demands = parse_demands(&demand_table)?;
    let book = RecipeBook::from_table(&loader.load(&inputs.recipes)?, settings.duplicate_policy)?;
    let locations = GatheringLocationIndex::from_table(&loader.load(&inputs.locations)?);

    let cycle_check = if settings.detect_cycles {
        CycleCheck::Detect
    } else {
        CycleCheck::Unchecked
    };
    if book.is_empty() {
        warn!(path = %inputs.recipes.display(), "recipe table is empty");
    }
    for demand in demands.iter().filter(|demand| !book.contains(&demand.item)) {
        warn!(item = %demand.item, "demanded item has no recipe, listing it as a base ingredient");
    }

    let totals = RecipeExpander::new(&book)
        .with_cycle_check(cycle_check)
        .expand(&demands)?;
    if totals.is_empty() {
        warn!("no base ingredients to gather");
    }

    info!(
        demands = demands.len(),
        recipes = book.len(),
        base_ingredients = totals.len(),
        units = totals.iter().map(|(_, quantity)| quantity).sum::<f64>(),
        "expanded recipes"
    );

    Ok(GatherOutput {
        gathering: build_gathering_list(totals, &locations),
        crafting: crafting_list(&demands),
    })
}

pub fn load_catalog(path: &Path) -> Result<ItemCatalog, AppError> {
    let file = File::open(path).map_err(CatalogError::from)?;
    let catalog = ItemCatalog::from_reader(file)?;
    if catalog.is_empty() {
        warn!(path = %path.display(), "item catalog has no English names");
    }
    info!(path = %path.display(), names = catalog.len(), "loaded item catalog");
    Ok(catalog)
}

/// Product names from column 0 of a raw, header-less crafting table.
pub fn crafted_names(settings: &Settings, path: &Path) -> Result<Vec<String>, AppError> {
    let table = table_loader(settings).load(path)?;
    Ok(table
        .rows()
        .filter_map(|row| row.cell(0).map(str::to_string))
        .collect())
}

/// Price every gathered and crafted item against the market board.
pub async fn price<'a>(
    settings: &Settings,
    catalog: &ItemCatalog,
    gathering: impl IntoIterator<Item = &'a str>,
    crafting: impl IntoIterator<Item = &'a str>,
) -> Result<EnrichmentReport, AppError> {
    let records = union_items(gathering, crafting);
    let client = UniversalisClient::from_settings(settings)?;
    let throttle = FixedInterval::new(Duration::from_millis(settings.request_delay_ms));

    info!(
        items = records.len(),
        world = %settings.world,
        quality = ?settings.quality,
        "querying market data"
    );
    Ok(MarketEnrichment::new(catalog, client, throttle)
        .enrich(records)
        .await)
}

pub fn write_gathering(path: &Path, rows: &[GatheringListRow]) -> Result<(), AppError> {
    output::write_gathering_list(output::create(path)?, rows)?;
    Ok(())
}

pub fn write_crafting(path: &Path, rows: &[CraftingListRow]) -> Result<(), AppError> {
    output::write_crafting_list(output::create(path)?, rows)?;
    Ok(())
}

pub fn write_market(path: &Path, report: &EnrichmentReport) -> Result<(), AppError> {
    output::write_market_records(output::create(path)?, &report.records)?;
    Ok(())
}

/// Merge demand tables, summing quantities per item.
pub fn consolidate_files(
    settings: &Settings,
    inputs: &[PathBuf],
    out: &Path,
) -> Result<(), AppError> {
    let loader = table_loader(settings);
    let tables = inputs
        .iter()
        .map(|path| loader.load(path))
        .collect::<Result<Vec<_>, _>>()?;
    let merged = consolidate(&tables);
    output::write_consolidated(output::create(out)?, &merged)?;
    info!(files = inputs.len(), items = merged.len(), path = %out.display(), "consolidated demands");
    Ok(())
}

/// Budget split over a crafting list (or consolidated table) and a gathering
/// list whose location column holds the gathering method.
pub fn budget(
    settings: &Settings,
    total: f64,
    crafting: &Path,
    gathering: &Path,
) -> Result<BudgetPlan, AppError> {
    let loader = table_loader(settings);
    let crafting = crafting_rows(&loader.load(crafting)?);
    let gathering = gathering_rows(&loader.load(gathering)?);
    Ok(plan_budget(total, &crafting, &gathering))
}

pub fn print_budget(plan: &BudgetPlan) {
    println!("-- Full crafting contracts --");
    for contract in &plan.crafting_contracts {
        println!("{:<40} {:>14.2}", contract.item, contract.full_contract);
    }

    println!("-- Gathering payouts (excl. gc seals) --");
    for payout in &plan.gathering_payouts {
        println!("{:<40} {:>14.2}", payout.item, payout.payout);
    }

    for (method, amount) in &plan.method_budgets {
        println!("Gathering budget for {:<12} {:>14.2}", method.label(), amount);
    }
    println!("Crafting budget                  {:>14.2}", plan.crafting_budget);
    println!("Total allocated                  {:>14.2}", plan.allocated());
}
