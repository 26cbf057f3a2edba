use crate::error::{CantineError, Result};
use crate::models::{DishComponent, Ingredient, MenuItem, MAX_DISH_COMPONENTS};

/// Editing surface for one cell's dish.
///
/// Validation lives here rather than in the store: the store accepts
/// whatever it is given.
#[derive(Debug, Clone, Default)]
pub struct DishDraft {
    pub dish_name: String,
    components: Vec<DishComponent>,
}

impl DishDraft {
    /// Start from the cell's current content.
    pub fn from_item(item: &MenuItem) -> Self {
        Self {
            dish_name: item.dish_name.clone(),
            components: item.components.clone(),
        }
    }

    pub fn components(&self) -> &[DishComponent] {
        &self.components
    }

    pub fn is_full(&self) -> bool {
        self.components.len() >= MAX_DISH_COMPONENTS
    }

    /// Add `quantity` of `ingredient`, snapshotting its current unit price.
    pub fn add_component(&mut self, ingredient: &Ingredient, quantity: f64) -> Result<()> {
        if self.is_full() {
            return Err(CantineError::ComponentLimit {
                max: MAX_DISH_COMPONENTS,
            });
        }
        if quantity <= 0.0 || !quantity.is_finite() {
            return Err(CantineError::InvalidInput(format!(
                "Quantity must be positive, got {quantity}"
            )));
        }
        self.components.push(DishComponent {
            ingredient_id: ingredient.id.clone(),
            name: ingredient.name.clone(),
            quantity,
            unit_cost: ingredient.unit_price,
        });
        Ok(())
    }

    pub fn remove_component(&mut self, index: usize) -> Option<DishComponent> {
        (index < self.components.len()).then(|| self.components.remove(index))
    }

    pub fn total_cost(&self) -> f64 {
        self.components.iter().map(DishComponent::cost).sum()
    }

    /// A dish can be saved once it has a name and at least one component.
    pub fn is_valid(&self) -> bool {
        !self.dish_name.trim().is_empty() && !self.components.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<DishComponent>) {
        (self.dish_name, self.components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Unit;

    fn potato() -> Ingredient {
        Ingredient::manual("Pommes de terre", 25.0, Unit::Kg, 0.8, None, false, false)
    }

    #[test]
    fn test_sixth_component_rejected() {
        let mut draft = DishDraft::default();
        let ing = potato();
        for _ in 0..MAX_DISH_COMPONENTS {
            draft.add_component(&ing, 1.0).unwrap();
        }
        let err = draft.add_component(&ing, 1.0).unwrap_err();
        assert!(matches!(err, CantineError::ComponentLimit { max: 5 }));
        assert_eq!(draft.components().len(), 5);
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let mut draft = DishDraft::default();
        assert!(draft.add_component(&potato(), 0.0).is_err());
        assert!(draft.add_component(&potato(), -2.0).is_err());
        assert!(draft.components().is_empty());
    }

    #[test]
    fn test_cost_snapshot_ignores_later_price_change() {
        let mut ing = potato();
        let mut draft = DishDraft::default();
        draft.add_component(&ing, 10.0).unwrap();
        ing.unit_price = 5.0;
        assert!((draft.total_cost() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_validity() {
        let mut draft = DishDraft::default();
        draft.dish_name = "Purée".into();
        assert!(!draft.is_valid());
        draft.add_component(&potato(), 2.0).unwrap();
        assert!(draft.is_valid());
        draft.dish_name = "   ".into();
        assert!(!draft.is_valid());
    }

    #[test]
    fn test_remove_component() {
        let mut draft = DishDraft::default();
        draft.add_component(&potato(), 2.0).unwrap();
        assert!(draft.remove_component(3).is_none());
        assert!(draft.remove_component(0).is_some());
        assert!(draft.components().is_empty());
    }
}
