mod ingredient;
mod menu;
mod recipe;

pub use ingredient::{Category, Ingredient, Unit, FOOD_VAT_RATE};
pub use menu::{
    ComponentCategory, Day, DishComponent, MenuItem, MenuStructure, WeekMenu, WeekStart,
    MAX_DISH_COMPONENTS,
};
pub use recipe::{Recipe, RecipeDraft, RecipeLine};

use rand::Rng;

/// Length of generated record identifiers.
const ID_LEN: usize = 9;

/// Generate a short random base-36 identifier (e.g. `k3f9x0a2m`).
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| {
            let digit = rng.gen_range(0..36u32);
            std::char::from_digit(digit, 36).unwrap_or('0')
        })
        .collect()
}
