pub mod export;
pub mod prompts;
pub mod render;

pub use export::{export_filename, export_week_csv, write_week_csv};
pub use prompts::{
    match_ingredients, parse_decimal, prompt_action, prompt_analysis_mode, prompt_category, prompt_cell,
    prompt_dish, prompt_f64, prompt_headcount, prompt_i64, prompt_ingredient,
    prompt_manual_ingredient, prompt_recipe, prompt_recipe_choice, prompt_structure_edit,
    prompt_text, prompt_week, prompt_yes_no, SessionAction, StructureEdit,
};
pub use render::{
    display_analysis, display_draft, display_grid, display_ingredients, display_recipes,
};
