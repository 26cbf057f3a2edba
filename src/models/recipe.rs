use serde::{Deserialize, Serialize};

use crate::error::{CantineError, Result};
use crate::models::Ingredient;

/// One (ingredient, quantity) pair of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub item: Ingredient,
    pub qty: f64,
}

impl RecipeLine {
    #[inline]
    pub fn cost(&self) -> f64 {
        self.item.unit_price * self.qty
    }
}

/// A named, reusable list of ingredients with a precomputed cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub ingredients: Vec<RecipeLine>,
    #[serde(rename = "totalCost")]
    pub total_cost: f64,
}

/// Recipe under construction.
#[derive(Debug, Clone, Default)]
pub struct RecipeDraft {
    pub name: String,
    pub lines: Vec<RecipeLine>,
}

impl RecipeDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    pub fn add(&mut self, item: &Ingredient, qty: f64) {
        self.lines.push(RecipeLine {
            item: item.clone(),
            qty,
        });
    }

    /// Sum of `unit_price * qty` over the lines.
    pub fn total_cost(&self) -> f64 {
        self.lines.iter().map(RecipeLine::cost).sum()
    }

    /// Freeze the draft into a recipe with a fresh id.
    pub fn build(self) -> Result<Recipe> {
        if self.name.trim().is_empty() {
            return Err(CantineError::InvalidInput("Recipe name is empty".to_string()));
        }
        if self.lines.is_empty() {
            return Err(CantineError::InvalidInput(
                "Recipe has no ingredients".to_string(),
            ));
        }
        let total_cost = self.total_cost();
        Ok(Recipe {
            id: super::generate_id(),
            name: self.name,
            ingredients: self.lines,
            total_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Unit;

    #[test]
    fn test_draft_total_cost() {
        let beef = Ingredient::manual("Boeuf", 5.0, Unit::Kg, 12.0, None, false, true);
        let carrots = Ingredient::manual("Carottes", 10.0, Unit::Kg, 1.5, None, true, true);

        let mut draft = RecipeDraft::new("Boeuf carottes");
        draft.add(&beef, 2.0);
        draft.add(&carrots, 1.0);

        let recipe = draft.build().unwrap();
        assert!((recipe.total_cost - 25.5).abs() < 1e-9);
        assert_eq!(recipe.ingredients.len(), 2);
    }

    #[test]
    fn test_draft_rejects_empty() {
        assert!(RecipeDraft::new("Vide").build().is_err());

        let salt = Ingredient::manual("Sel", 1.0, Unit::Kg, 0.5, None, false, false);
        let mut unnamed = RecipeDraft::new("  ");
        unnamed.add(&salt, 1.0);
        assert!(unnamed.build().is_err());
    }
}
