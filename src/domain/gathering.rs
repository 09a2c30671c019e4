use std::collections::HashMap;

use super::entities::GatheringListRow;
use super::expansion::RequirementTotals;
use crate::infra::table::Table;

const LOCATION_SEPARATOR: &str = ", ";

/// Ingredient name to a readable description of where it can be gathered.
#[derive(Clone, Debug, Default)]
pub struct GatheringLocationIndex {
    locations: HashMap<String, String>,
}

impl GatheringLocationIndex {
    /// Column 0 is the ingredient, every later non-empty cell is a location
    /// fragment. A later row for the same ingredient replaces the earlier one.
    pub fn from_table(table: &Table) -> Self {
        let mut locations = HashMap::with_capacity(table.len());
        for row in table.rows() {
            let Some(ingredient) = row.cell(0) else {
                continue;
            };
            let fragments: Vec<&str> = (1..table.width())
                .filter_map(|column| row.cell(column))
                .collect();
            locations.insert(ingredient.to_string(), fragments.join(LOCATION_SEPARATOR));
        }
        Self { locations }
    }

    pub fn get(&self, ingredient: &str) -> Option<&str> {
        self.locations.get(ingredient).map(String::as_str)
    }
}

/// One row per base ingredient, location attached by exact name, sorted by
/// ingredient. Ingredients without location data are kept.
pub fn build_gathering_list(
    totals: RequirementTotals,
    locations: &GatheringLocationIndex,
) -> Vec<GatheringListRow> {
    let mut rows: Vec<GatheringListRow> = totals
        .into_iter()
        .map(|(ingredient, total_quantity)| {
            let location_info = locations.get(&ingredient).map(str::to_string);
            GatheringListRow {
                ingredient,
                total_quantity,
                location_info,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.ingredient.cmp(&b.ingredient));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Demand;
    use crate::domain::expansion::RecipeExpander;
    use crate::domain::recipe_book::{DuplicatePolicy, RecipeBook};
    use crate::infra::table::TableLoader;

    fn table(input: &str) -> Table {
        TableLoader::new().read(input.as_bytes()).unwrap()
    }

    #[test]
    fn joins_non_empty_fragments_in_column_order() {
        let index = GatheringLocationIndex::from_table(&table(
            "Flax,West Ronka,,East Ronka\nOre,Mining\nSand\n",
        ));
        assert_eq!(index.get("Flax"), Some("West Ronka, East Ronka"));
        assert_eq!(index.get("Ore"), Some("Mining"));
        assert_eq!(index.get("Sand"), Some(""));
        assert_eq!(index.get("Log"), None);
    }

    #[test]
    fn gathering_list_left_joins_and_sorts() {
        let book = RecipeBook::from_table(
            &table("Sword,Ingot,2,Handle,1\nIngot,Ore,3\n"),
            DuplicatePolicy::LastWins,
        )
        .unwrap();
        let totals = RecipeExpander::new(&book)
            .expand(&[Demand::new("Sword", 2.0)])
            .unwrap();
        let distinct = totals.len();
        let index = GatheringLocationIndex::from_table(&table("Ore,Mine,Deep Mine\n"));

        let rows = build_gathering_list(totals, &index);

        assert_eq!(rows.len(), distinct);
        assert_eq!(
            rows,
            vec![
                GatheringListRow {
                    ingredient: "Handle".to_string(),
                    total_quantity: 2.0,
                    location_info: None,
                },
                GatheringListRow {
                    ingredient: "Ore".to_string(),
                    total_quantity: 12.0,
                    location_info: Some("Mine, Deep Mine".to_string()),
                },
            ]
        );
    }

    #[test]
    fn location_lookup_is_case_sensitive() {
        let index = GatheringLocationIndex::from_table(&table("ore,Mine\n"));
        assert_eq!(index.get("Ore"), None);
    }

    #[test]
    fn sort_uses_plain_string_order() {
        let book = RecipeBook::new();
        let totals = RecipeExpander::new(&book)
            .expand(&[
                Demand::new("beeswax", 1.0),
                Demand::new("Zinc", 1.0),
                Demand::new("Ash", 1.0),
            ])
            .unwrap();
        let rows = build_gathering_list(totals, &GatheringLocationIndex::default());
        let names: Vec<_> = rows.iter().map(|row| row.ingredient.as_str()).collect();
        assert_eq!(names, vec!["Ash", "Zinc", "beeswax"]);
    }
}
