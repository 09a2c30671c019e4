//! Recipe table parsing.
//!
//! Each recipe row reads `product, ingredient, qty, ingredient, qty, ...` and
//! ends at the first empty ingredient slot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::entities::Ingredient;
use crate::infra::table::{Row, Table};

#[derive(Debug, Error, PartialEq)]
pub enum RecipeError {
    #[error("row {row}, column {column}: quantity '{value}' is not a number")]
    InvalidQuantity {
        row: usize,
        column: usize,
        value: String,
    },
    #[error("row {row}: '{item}' has no quantity")]
    MissingQuantity { row: usize, item: String },
}

/// Which definition survives when a product is listed more than once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    #[default]
    LastWins,
    FirstWins,
}

/// How the expander should treat an item name.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecipeNode<'a> {
    /// Crafted from the listed ingredients.
    Intermediate(&'a [Ingredient]),
    /// No recipe known; the item has to be gathered.
    BaseIngredient,
}

/// Product name to ordered ingredient list. Keys are case-sensitive.
#[derive(Clone, Debug, Default)]
pub struct RecipeBook {
    recipes: HashMap<String, Vec<Ingredient>>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(table: &Table, policy: DuplicatePolicy) -> Result<Self, RecipeError> {
        let mut book = Self::new();
        for row in table.rows() {
            let Some(product) = row.cell(0) else {
                continue;
            };
            let ingredients = parse_ingredients(&row)?;
            book.insert_with_policy(product, ingredients, policy);
        }
        Ok(book)
    }

    /// Add or replace a recipe.
    pub fn insert(&mut self, product: impl Into<String>, ingredients: Vec<Ingredient>) {
        self.recipes.insert(product.into(), ingredients);
    }

    fn insert_with_policy(
        &mut self,
        product: &str,
        ingredients: Vec<Ingredient>,
        policy: DuplicatePolicy,
    ) {
        if self.recipes.contains_key(product) {
            warn!(product, ?policy, "recipe defined more than once");
            if policy == DuplicatePolicy::FirstWins {
                return;
            }
        }
        self.insert(product, ingredients);
    }

    pub fn node(&self, item: &str) -> RecipeNode<'_> {
        match self.recipes.get(item) {
            Some(ingredients) => RecipeNode::Intermediate(ingredients),
            None => RecipeNode::BaseIngredient,
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        self.recipes.contains_key(item)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

fn parse_ingredients(row: &Row<'_>) -> Result<Vec<Ingredient>, RecipeError> {
    let mut ingredients = Vec::new();
    let mut column = 1;
    while let Some(name) = row.cell(column) {
        let quantity = match row.cell(column + 1) {
            Some(raw) => parse_quantity(raw, row.index(), column + 1)?,
            None => 0.0,
        };
        ingredients.push(Ingredient {
            name: name.to_string(),
            quantity,
        });
        column += 2;
    }
    Ok(ingredients)
}

/// Strict numeric parse. A bad quantity would silently skew every total
/// downstream, so it fails the whole load. `NaN` and infinities count as bad.
pub fn parse_quantity(raw: &str, row: usize, column: usize) -> Result<f64, RecipeError> {
    match raw.trim().parse::<f64>() {
        Ok(quantity) if quantity.is_finite() => Ok(quantity),
        _ => Err(RecipeError::InvalidQuantity {
            row: row + 1,
            column: column + 1,
            value: raw.to_string(),
        }),
    }
}
