//! Contract budget split for a workshop project.
//!
//! Five sevenths of the budget pays gatherers, two sevenths pays crafters.
//! The gathering share is split again by how an ingredient is gathered.

use std::collections::HashMap;

use super::entities::{CraftingListRow, GatheringListRow};
use crate::infra::table::Table;

pub const DEFAULT_TOTAL_BUDGET: f64 = 10_000_000.0;
const GATHERING_RATIO: f64 = 5.0 / 7.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GatheringMethod {
    GcSeals,
    TimedNode,
    Normal,
}

impl GatheringMethod {
    pub const ALL: [GatheringMethod; 3] = [
        GatheringMethod::GcSeals,
        GatheringMethod::TimedNode,
        GatheringMethod::Normal,
    ];

    /// Match the method label stored in the location column.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "gc seals" => Some(Self::GcSeals),
            "timed node" => Some(Self::TimedNode),
            "normal" => Some(Self::Normal),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::GcSeals => "gc seals",
            Self::TimedNode => "timed node",
            Self::Normal => "normal",
        }
    }

    /// Fraction of the gathering budget reserved for this method.
    pub fn share(self) -> f64 {
        match self {
            Self::GcSeals => 0.10,
            Self::TimedNode => 0.35,
            Self::Normal => 0.55,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CraftingContract {
    pub item: String,
    pub full_contract: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GatheringPayout {
    pub item: String,
    pub payout: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BudgetPlan {
    pub crafting_contracts: Vec<CraftingContract>,
    pub gathering_payouts: Vec<GatheringPayout>,
    pub method_budgets: Vec<(GatheringMethod, f64)>,
    pub crafting_budget: f64,
}

impl BudgetPlan {
    /// Crafting budget plus every method pool. Equals the total budget.
    pub fn allocated(&self) -> f64 {
        self.crafting_budget + self.method_budgets.iter().map(|(_, b)| b).sum::<f64>()
    }
}

/// Products and quantities from columns 0 and 1. Works on the crafting list
/// and on a consolidated `Item,Quantity` table alike: header lines and
/// quantities that do not parse count as 0, so they never get a contract.
pub fn crafting_rows(table: &Table) -> Vec<CraftingListRow> {
    table
        .rows()
        .filter_map(|row| {
            Some(CraftingListRow {
                product: row.cell(0)?.to_string(),
                required_quantity: lenient_quantity(row.cell(1)),
            })
        })
        .collect()
}

/// Ingredient, quantity and gathering method from columns 0, 1 and 2.
pub fn gathering_rows(table: &Table) -> Vec<GatheringListRow> {
    table
        .rows()
        .filter_map(|row| {
            Some(GatheringListRow {
                ingredient: row.cell(0)?.to_string(),
                total_quantity: lenient_quantity(row.cell(1)),
                location_info: row.cell(2).map(str::to_string),
            })
        })
        .collect()
}

fn lenient_quantity(raw: Option<&str>) -> f64 {
    raw.and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|quantity| quantity.is_finite())
        .unwrap_or(0.0)
}

/// Split `total` across crafting contracts and gathering payouts.
///
/// Crafted products are paid in proportion to their quantity. Gathered items
/// are paid from their method's pool in proportion to their share of that
/// pool's quantity. Grand Company seal items are bought with seals, not paid
/// out, and ingredients with an unknown method get nothing.
pub fn plan_budget(
    total: f64,
    crafting: &[CraftingListRow],
    gathering: &[GatheringListRow],
) -> BudgetPlan {
    let products: Vec<&CraftingListRow> = crafting
        .iter()
        .filter(|row| row.required_quantity > 0.0)
        .collect();
    let total_quantity: f64 = products.iter().map(|row| row.required_quantity).sum();
    let crafting_contracts = products
        .iter()
        .map(|row| CraftingContract {
            item: row.product.clone(),
            full_contract: round_cents(total * (row.required_quantity / total_quantity)),
        })
        .collect();

    let gathering_budget = total * GATHERING_RATIO;
    let classified: Vec<(&GatheringListRow, Option<GatheringMethod>)> = gathering
        .iter()
        .map(|row| {
            let method = row.location_info.as_deref().and_then(GatheringMethod::from_label);
            (row, method)
        })
        .collect();

    let mut pools: HashMap<GatheringMethod, f64> = HashMap::new();
    for (row, method) in &classified {
        if let Some(method) = method {
            *pools.entry(*method).or_default() += row.total_quantity;
        }
    }

    let gathering_payouts = classified
        .iter()
        .filter(|(_, method)| *method != Some(GatheringMethod::GcSeals))
        .map(|(row, method)| {
            let payout = match method {
                Some(method) => {
                    let pool = pools
                        .get(method)
                        .copied()
                        .filter(|pool| *pool != 0.0)
                        .unwrap_or(1.0);
                    gathering_budget * method.share() * (row.total_quantity / pool)
                }
                None => 0.0,
            };
            GatheringPayout {
                item: row.ingredient.clone(),
                payout: round_cents(payout),
            }
        })
        .filter(|payout| payout.payout > 0.0)
        .collect();

    BudgetPlan {
        crafting_contracts,
        gathering_payouts,
        method_budgets: GatheringMethod::ALL
            .iter()
            .map(|method| (*method, gathering_budget * method.share()))
            .collect(),
        crafting_budget: total - gathering_budget,
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, quantity: f64) -> CraftingListRow {
        CraftingListRow {
            product: name.to_string(),
            required_quantity: quantity,
        }
    }

    fn gathered(name: &str, quantity: f64, method: Option<&str>) -> GatheringListRow {
        GatheringListRow {
            ingredient: name.to_string(),
            total_quantity: quantity,
            location_info: method.map(str::to_string),
        }
    }

    #[test]
    fn crafting_contracts_split_by_quantity() {
        let plan = plan_budget(
            700.0,
            &[product("Hull", 3.0), product("Stern", 1.0), product("Bow", 0.0)],
            &[],
        );
        assert_eq!(
            plan.crafting_contracts,
            vec![
                CraftingContract {
                    item: "Hull".to_string(),
                    full_contract: 525.0,
                },
                CraftingContract {
                    item: "Stern".to_string(),
                    full_contract: 175.0,
                },
            ]
        );
        assert!((plan.crafting_budget - 200.0).abs() < 1e-9);
    }

    #[test]
    fn gathering_payouts_come_from_method_pools() {
        let plan = plan_budget(
            700.0,
            &[],
            &[
                gathered("Log", 30.0, Some("normal")),
                gathered("Ore", 10.0, Some(" normal ")),
                gathered("Crystal", 5.0, Some("timed node")),
                gathered("Cloth", 8.0, Some("gc seals")),
                gathered("Sand", 4.0, Some("Central Thanalan")),
                gathered("Mud", 4.0, None),
            ],
        );

        // Gathering budget 500: normal pool 275, timed pool 175.
        assert_eq!(
            plan.gathering_payouts,
            vec![
                GatheringPayout {
                    item: "Log".to_string(),
                    payout: 206.25,
                },
                GatheringPayout {
                    item: "Ore".to_string(),
                    payout: 68.75,
                },
                GatheringPayout {
                    item: "Crystal".to_string(),
                    payout: 175.0,
                },
            ]
        );
    }

    fn table(input: &str) -> Table {
        crate::infra::table::TableLoader::new()
            .read(input.as_bytes())
            .unwrap()
    }

    #[test]
    fn consolidated_table_feeds_crafting_contracts() {
        let crafting = crafting_rows(&table("Item,Quantity\nHull,3\nStern,oops\nBow,1\n"));
        assert_eq!(
            crafting,
            vec![
                product("Item", 0.0),
                product("Hull", 3.0),
                product("Stern", 0.0),
                product("Bow", 1.0),
            ]
        );

        let plan = plan_budget(700.0, &crafting, &[]);
        let items: Vec<_> = plan
            .crafting_contracts
            .iter()
            .map(|contract| (contract.item.as_str(), contract.full_contract))
            .collect();
        assert_eq!(items, vec![("Hull", 525.0), ("Bow", 175.0)]);
    }

    #[test]
    fn gathering_list_header_gets_no_payout() {
        let gathering = gathering_rows(&table(
            "Ingredient,Total Quantity,Location Info\nLog,30,normal\nOre,10\n",
        ));
        assert_eq!(
            gathering,
            vec![
                gathered("Ingredient", 0.0, Some("Location Info")),
                gathered("Log", 30.0, Some("normal")),
                gathered("Ore", 10.0, None),
            ]
        );

        let plan = plan_budget(700.0, &[], &gathering);
        assert_eq!(
            plan.gathering_payouts,
            vec![GatheringPayout {
                item: "Log".to_string(),
                payout: 275.0,
            }]
        );
    }

    #[test]
    fn pools_and_crafting_add_up_to_total() {
        let plan = plan_budget(DEFAULT_TOTAL_BUDGET, &[], &[]);
        assert!((plan.allocated() - DEFAULT_TOTAL_BUDGET).abs() < 1e-6);
        assert_eq!(plan.method_budgets.len(), 3);
    }

    #[test]
    fn method_labels_round_trip() {
        for method in GatheringMethod::ALL {
            assert_eq!(GatheringMethod::from_label(method.label()), Some(method));
        }
        assert_eq!(GatheringMethod::from_label("Timed Node"), None);
    }
}
