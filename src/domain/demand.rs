use std::collections::BTreeMap;

use super::entities::{CraftingListRow, Demand};
use super::recipe_book::{parse_quantity, RecipeError};
use crate::infra::table::Table;

/// Read `product, quantity` rows. Extra columns are ignored; a row with an
/// empty product cell is skipped.
pub fn parse_demands(table: &Table) -> Result<Vec<Demand>, RecipeError> {
    let mut demands = Vec::with_capacity(table.len());
    for row in table.rows() {
        let Some(item) = row.cell(0) else {
            continue;
        };
        let raw = row.cell(1).ok_or_else(|| RecipeError::MissingQuantity {
            row: row.index() + 1,
            item: item.to_string(),
        })?;
        let quantity = parse_quantity(raw, row.index(), 1)?;
        demands.push(Demand::new(item, quantity));
    }
    Ok(demands)
}

/// The top-level products as an alphabetical list. Repeated products keep
/// their own rows, in input order.
pub fn crafting_list(demands: &[Demand]) -> Vec<CraftingListRow> {
    let mut rows: Vec<CraftingListRow> = demands
        .iter()
        .map(|demand| CraftingListRow {
            product: demand.item.clone(),
            required_quantity: demand.quantity,
        })
        .collect();
    rows.sort_by(|a, b| a.product.cmp(&b.product));
    rows
}

/// Merge several demand tables into one, summing per item.
///
/// Unlike [`parse_demands`] this is lenient: names are trimmed and rows whose
/// quantity does not parse are skipped.
pub fn consolidate(tables: &[Table]) -> Vec<Demand> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for table in tables {
        for row in table.rows() {
            let Some(item) = row.cell(0).map(str::trim).filter(|item| !item.is_empty()) else {
                continue;
            };
            let Some(quantity) = row
                .cell(1)
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .filter(|quantity| quantity.is_finite())
            else {
                continue;
            };
            *totals.entry(item.to_string()).or_default() += quantity;
        }
    }
    totals
        .into_iter()
        .map(|(item, quantity)| Demand::new(item, quantity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::table::TableLoader;

    fn table(input: &str) -> Table {
        TableLoader::new().read(input.as_bytes()).unwrap()
    }

    #[test]
    fn parses_demands_in_input_order() {
        let demands = parse_demands(&table("Hull,2\nStern,1.5\nHull,1\n")).unwrap();
        assert_eq!(
            demands,
            vec![
                Demand::new("Hull", 2.0),
                Demand::new("Stern", 1.5),
                Demand::new("Hull", 1.0),
            ]
        );
    }

    #[test]
    fn demand_without_quantity_is_rejected() {
        let error = parse_demands(&table("Hull,2\nStern\n")).unwrap_err();
        assert_eq!(
            error,
            RecipeError::MissingQuantity {
                row: 2,
                item: "Stern".to_string(),
            }
        );
    }

    #[test]
    fn demand_with_text_quantity_is_rejected() {
        let error = parse_demands(&table("Hull,two\n")).unwrap_err();
        assert!(matches!(error, RecipeError::InvalidQuantity { row: 1, column: 2, .. }));
    }

    #[test]
    fn demand_with_nan_quantity_is_rejected() {
        let error = parse_demands(&table("Hull,NaN\n")).unwrap_err();
        assert!(matches!(error, RecipeError::InvalidQuantity { row: 1, column: 2, .. }));
    }

    #[test]
    fn crafting_list_sorts_by_product_and_keeps_repeats() {
        let rows = crafting_list(&[
            Demand::new("Stern", 1.0),
            Demand::new("Hull", 2.0),
            Demand::new("Hull", 3.0),
        ]);
        let products: Vec<_> = rows
            .iter()
            .map(|row| (row.product.as_str(), row.required_quantity))
            .collect();
        assert_eq!(products, vec![("Hull", 2.0), ("Hull", 3.0), ("Stern", 1.0)]);
    }

    #[test]
    fn consolidate_sums_across_files_and_skips_junk() {
        let merged = consolidate(&[
            table("Item,Quantity\nHull, 2\nStern,1\n"),
            table(" Hull ,3\nBow,many\nBow,4\n"),
        ]);
        assert_eq!(
            merged,
            vec![
                Demand::new("Bow", 4.0),
                Demand::new("Hull", 5.0),
                Demand::new("Stern", 1.0),
            ]
        );
    }
}
