//! Recipe expansion: turns top-level demands into base-ingredient totals.
//!
//! The walk is a plain depth-first recursion. Multipliers compose down the
//! tree, so an intermediate needed 3x whose own input needs 2 per unit adds 6
//! at the leaf. Subtrees are recomputed on every visit; recipe graphs are
//! shallow and demand lists short.
//!
//! Anything without a recipe is a base ingredient, including misspelled
//! crafted items. Those show up in the gathering list instead of failing.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::entities::Demand;
use super::recipe_book::{RecipeBook, RecipeNode};

#[derive(Debug, Error, PartialEq)]
pub enum ExpansionError {
    #[error("recipe cycle detected: {}", .path.join(" -> "))]
    CycleDetected { path: Vec<String> },
}

/// What to do when a recipe (indirectly) requires itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CycleCheck {
    /// Track the current path and fail with [`ExpansionError::CycleDetected`].
    #[default]
    Detect,
    /// No tracking. A cyclic recipe graph recurses until the stack overflows.
    Unchecked,
}

/// Accumulated quantity per base ingredient for one expansion run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequirementTotals {
    totals: HashMap<String, f64>,
}

impl RequirementTotals {
    fn add(&mut self, item: &str, quantity: f64) {
        match self.totals.get_mut(item) {
            Some(total) => *total += quantity,
            None => {
                self.totals.insert(item.to_string(), quantity);
            }
        }
    }

    #[allow(dead_code)]
    pub fn get(&self, item: &str) -> Option<f64> {
        self.totals.get(item).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(item, total)| (item.as_str(), *total))
    }
}

impl IntoIterator for RequirementTotals {
    type Item = (String, f64);
    type IntoIter = std::collections::hash_map::IntoIter<String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.totals.into_iter()
    }
}

pub struct RecipeExpander<'a> {
    book: &'a RecipeBook,
    cycle_check: CycleCheck,
}

impl<'a> RecipeExpander<'a> {
    pub fn new(book: &'a RecipeBook) -> Self {
        Self {
            book,
            cycle_check: CycleCheck::default(),
        }
    }

    pub fn with_cycle_check(mut self, cycle_check: CycleCheck) -> Self {
        self.cycle_check = cycle_check;
        self
    }

    /// Expand every demand in order, ingredients in recipe-row order.
    /// Repeated demands for the same item add up.
    pub fn expand(&self, demands: &[Demand]) -> Result<RequirementTotals, ExpansionError> {
        let mut totals = RequirementTotals::default();
        let mut path = Vec::new();
        for demand in demands {
            self.visit(&demand.item, demand.quantity, &mut totals, &mut path)?;
        }
        Ok(totals)
    }

    fn visit<'n>(
        &self,
        item: &'n str,
        multiplier: f64,
        totals: &mut RequirementTotals,
        path: &mut Vec<&'n str>,
    ) -> Result<(), ExpansionError>
    where
        'a: 'n,
    {
        match self.book.node(item) {
            RecipeNode::Intermediate(ingredients) => {
                if self.cycle_check == CycleCheck::Detect {
                    if path.contains(&item) {
                        let mut cycle: Vec<String> =
                            path.iter().map(|step| step.to_string()).collect();
                        cycle.push(item.to_string());
                        return Err(ExpansionError::CycleDetected { path: cycle });
                    }
                    path.push(item);
                }

                debug!(item, multiplier, depth = path.len(), "expanding recipe");
                for ingredient in ingredients {
                    self.visit(
                        &ingredient.name,
                        ingredient.quantity * multiplier,
                        totals,
                        path,
                    )?;
                }

                if self.cycle_check == CycleCheck::Detect {
                    path.pop();
                }
            }
            RecipeNode::BaseIngredient => {
                debug!(item, multiplier, "base ingredient");
                totals.add(item, multiplier);
            }
        }
        Ok(())
    }
}
