use dialoguer::{Confirm, Input, Select};
use strsim::jaro_winkler;

use crate::analysis::AnalysisMode;
use crate::error::{CantineError, Result};
use crate::grid::DishDraft;
use crate::interface::render::display_draft;
use crate::models::{
    Category, ComponentCategory, Day, Ingredient, MenuStructure, Recipe, RecipeDraft, Unit,
    WeekStart, MAX_DISH_COMPONENTS,
};

/// Minimum similarity for a fuzzy ingredient match.
const FUZZY_THRESHOLD: f64 = 0.7;

/// Actions offered by the interactive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    ScanInvoice,
    ManualEntry,
    ListIngredients,
    Categorize,
    ShowGrid,
    ComposeDish,
    SetHeadcount,
    PreviousWeek,
    NextWeek,
    GoToWeek,
    EditStructure,
    NewRecipe,
    RemoveRecipe,
    ListRecipes,
    Analysis,
    SetStudentCount,
    Export,
    Quit,
}

impl SessionAction {
    const ALL: [SessionAction; 18] = [
        SessionAction::ShowGrid,
        SessionAction::ComposeDish,
        SessionAction::SetHeadcount,
        SessionAction::PreviousWeek,
        SessionAction::NextWeek,
        SessionAction::GoToWeek,
        SessionAction::ScanInvoice,
        SessionAction::ManualEntry,
        SessionAction::ListIngredients,
        SessionAction::Categorize,
        SessionAction::Analysis,
        SessionAction::SetStudentCount,
        SessionAction::NewRecipe,
        SessionAction::ListRecipes,
        SessionAction::RemoveRecipe,
        SessionAction::EditStructure,
        SessionAction::Export,
        SessionAction::Quit,
    ];

    fn label(&self) -> &'static str {
        match self {
            SessionAction::ScanInvoice => "Scanner une facture",
            SessionAction::ManualEntry => "Saisie manuelle",
            SessionAction::ListIngredients => "Lister les ingrédients",
            SessionAction::Categorize => "Catégoriser un ingrédient",
            SessionAction::ShowGrid => "Afficher le menu",
            SessionAction::ComposeDish => "Composer un plat",
            SessionAction::SetHeadcount => "Nombre de couverts d'une case",
            SessionAction::PreviousWeek => "Semaine précédente",
            SessionAction::NextWeek => "Semaine suivante",
            SessionAction::GoToWeek => "Aller à une semaine",
            SessionAction::EditStructure => "Structure du menu",
            SessionAction::NewRecipe => "Nouvelle recette",
            SessionAction::RemoveRecipe => "Supprimer une recette",
            SessionAction::ListRecipes => "Bibliothèque de recettes",
            SessionAction::Analysis => "Analyse",
            SessionAction::SetStudentCount => "Élèves par jour",
            SessionAction::Export => "Exporter en CSV",
            SessionAction::Quit => "Quitter",
        }
    }
}

/// Prompt for the next session action.
pub fn prompt_action(week: WeekStart) -> Result<SessionAction> {
    let labels: Vec<&str> = SessionAction::ALL.iter().map(|a| a.label()).collect();
    let selection = Select::new()
        .with_prompt(format!("Semaine du {} - que faire ?", week))
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(SessionAction::ALL[selection])
}

/// Parse a decimal typed with either `,` or `.` as separator.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Prompt for a number with a default; asks again until it parses.
pub fn prompt_f64(prompt: &str, default: f64) -> Result<f64> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .validate_with(|raw: &String| -> std::result::Result<(), &str> {
            parse_decimal(raw).map(|_| ()).ok_or("Nombre invalide")
        })
        .interact_text()?;

    parse_decimal(&input)
        .ok_or_else(|| CantineError::InvalidInput(format!("Invalid number: {input}")))
}

/// Prompt for a whole number; any sign is accepted. Unparsable input is
/// asked again by the prompt itself.
pub fn prompt_i64(prompt: &str, default: i64) -> Result<i64> {
    Ok(Input::<i64>::new()
        .with_prompt(prompt)
        .default(default)
        .interact_text()?)
}

/// Prompt for free text; may be empty.
pub fn prompt_text(prompt: &str, initial: &str) -> Result<String> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()?;
    Ok(input.trim().to_string())
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Prompt for a manually entered invoice line.
pub fn prompt_manual_ingredient() -> Result<Ingredient> {
    let name = prompt_text("Désignation / produit", "")?;
    if name.is_empty() {
        return Err(CantineError::InvalidInput("Product name is required".to_string()));
    }

    let quantity = prompt_f64("Quantité", 0.0)?;
    let units: Vec<&str> = Unit::ALL.iter().map(|u| u.as_str()).collect();
    let unit = Select::new()
        .with_prompt("Unité")
        .items(&units)
        .default(0)
        .interact()?;
    let unit_price = prompt_f64("Prix unitaire HT (€)", 0.0)?;
    let origin = prompt_text("Origine", "")?;
    let is_bio = prompt_yes_no("BIO ?", false)?;
    let is_egalim = prompt_yes_no("EGALIM ?", false)?;

    let ingredient = Ingredient::manual(
        name,
        quantity,
        Unit::ALL[unit],
        unit_price,
        Some(origin),
        is_bio,
        is_egalim,
    );
    println!(
        "Prix HT {:.2}€, TTC {:.2}€",
        ingredient.price_ht.unwrap_or_default(),
        ingredient.price
    );
    Ok(ingredient)
}

/// Prompt for an ingredient category.
pub fn prompt_category(current: Option<Category>) -> Result<Category> {
    let labels: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    let default = current
        .and_then(|c| Category::ALL.iter().position(|x| *x == c))
        .unwrap_or(0);
    let selection = Select::new()
        .with_prompt("Catégorie")
        .items(&labels)
        .default(default)
        .interact()?;
    Ok(Category::ALL[selection])
}

/// Rank catalog entries by name similarity to `query`.
///
/// An exact (case-insensitive) match is returned alone.
pub fn match_ingredients<'a>(ingredients: &'a [Ingredient], query: &str) -> Vec<&'a Ingredient> {
    let query = query.trim().to_lowercase();

    if let Some(exact) = ingredients.iter().find(|i| i.name.to_lowercase() == query) {
        return vec![exact];
    }

    let mut candidates: Vec<(&Ingredient, f64)> = ingredients
        .iter()
        .map(|i| (i, jaro_winkler(&i.name.to_lowercase(), &query)))
        .filter(|(_, score)| *score > FUZZY_THRESHOLD)
        .collect();

    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    candidates.into_iter().take(5).map(|(i, _)| i).collect()
}

/// Prompt for an ingredient by name, with fuzzy matching.
pub fn prompt_ingredient<'a>(ingredients: &'a [Ingredient]) -> Result<Option<&'a Ingredient>> {
    if ingredients.is_empty() {
        println!("No ingredients in this session yet.");
        return Ok(None);
    }

    let query = prompt_text("Ingrédient (nom, vide pour annuler)", "")?;
    if query.is_empty() {
        return Ok(None);
    }

    let candidates = match_ingredients(ingredients, &query);
    match candidates.as_slice() {
        [] => {
            println!("No matching ingredient found for '{}'", query);
            Ok(None)
        }
        [only] => {
            if only.name.eq_ignore_ascii_case(&query) {
                return Ok(Some(*only));
            }
            let confirm = prompt_yes_no(&format!("Did you mean '{}'?", only.name), true)?;
            Ok(confirm.then_some(*only))
        }
        many => {
            let mut options: Vec<String> = many.iter().map(|i| i.summary()).collect();
            options.push("None of these".to_string());
            let selection = Select::new()
                .with_prompt("Which did you mean?")
                .items(&options)
                .default(0)
                .interact()?;
            Ok(many.get(selection).copied())
        }
    }
}

/// Prompt for a grid cell of the active structure.
pub fn prompt_cell(structure: &MenuStructure) -> Result<Option<(Day, ComponentCategory)>> {
    if structure.days.is_empty() || structure.components.is_empty() {
        println!("The menu structure has no days or no components.");
        return Ok(None);
    }

    let days: Vec<&str> = structure.days.iter().map(|d| d.label()).collect();
    let day = Select::new()
        .with_prompt("Jour")
        .items(&days)
        .default(0)
        .interact()?;

    let components: Vec<&str> = structure.components.iter().map(|c| c.label()).collect();
    let component = Select::new()
        .with_prompt("Composante")
        .items(&components)
        .default(0)
        .interact()?;

    Ok(Some((structure.days[day], structure.components[component])))
}

/// Prompt for a cell headcount; empty input clears it.
pub fn prompt_headcount(current: Option<u32>) -> Result<Option<u32>> {
    let initial = current.map(|n| n.to_string()).unwrap_or_default();
    let input = prompt_text("Couverts (vide pour effacer)", &initial)?;
    if input.is_empty() {
        return Ok(None);
    }
    input
        .parse()
        .map(Some)
        .map_err(|_| CantineError::InvalidInput(format!("Invalid headcount: {input}")))
}

/// Prompt for any date; it is snapped to its Monday.
pub fn prompt_week(current: WeekStart) -> Result<WeekStart> {
    let input = prompt_text("Semaine du (AAAA-MM-JJ)", &current.to_string())?;
    WeekStart::parse(&input)
}

/// A day or component to show/hide in the structure.
pub enum StructureEdit {
    Day(Day),
    Component(ComponentCategory),
    Done,
}

/// Prompt for a structure toggle; checked entries are currently shown.
pub fn prompt_structure_edit(structure: &MenuStructure) -> Result<StructureEdit> {
    let mut options: Vec<String> = Day::ALL
        .iter()
        .map(|d| {
            let mark = if structure.days.contains(d) { "x" } else { " " };
            format!("[{mark}] Jour: {d}")
        })
        .collect();
    options.extend(ComponentCategory::ALL.iter().map(|c| {
        let mark = if structure.components.contains(c) { "x" } else { " " };
        format!("[{mark}] Composante: {c}")
    }));
    options.push("Terminé".to_string());

    let selection = Select::new()
        .with_prompt("Afficher / masquer")
        .items(&options)
        .default(options.len() - 1)
        .interact()?;

    Ok(if selection < Day::ALL.len() {
        StructureEdit::Day(Day::ALL[selection])
    } else if selection < Day::ALL.len() + ComponentCategory::ALL.len() {
        StructureEdit::Component(ComponentCategory::ALL[selection - Day::ALL.len()])
    } else {
        StructureEdit::Done
    })
}

/// Edit a dish until it is saved or abandoned.
///
/// Returns `None` when the user cancels; the draft is then discarded.
pub fn prompt_dish(mut draft: DishDraft, ingredients: &[Ingredient]) -> Result<Option<DishDraft>> {
    loop {
        display_draft(&draft);

        let options = vec![
            "Renommer le plat",
            "Ajouter un ingrédient",
            "Retirer un ingrédient",
            "Enregistrer",
            "Annuler",
        ];
        let selection = Select::new()
            .with_prompt("Composer")
            .items(&options)
            .default(if draft.is_full() { 3 } else { 1 })
            .interact()?;

        match selection {
            0 => draft.dish_name = prompt_text("Nom du plat", &draft.dish_name)?,
            1 => {
                if draft.is_full() {
                    println!("Maximum {MAX_DISH_COMPONENTS} ingrédients.");
                    continue;
                }
                let Some(ingredient) = prompt_ingredient(ingredients)? else {
                    continue;
                };
                let quantity = prompt_f64("Quantité", 1.0)?;
                if let Err(e) = draft.add_component(ingredient, quantity) {
                    println!("{e}");
                }
            }
            2 => {
                if draft.components().is_empty() {
                    continue;
                }
                let mut names: Vec<String> =
                    draft.components().iter().map(|c| c.name.clone()).collect();
                names.push("Annuler".to_string());
                let index = Select::new()
                    .with_prompt("Retirer")
                    .items(&names)
                    .default(0)
                    .interact()?;
                draft.remove_component(index);
            }
            3 if draft.is_valid() => return Ok(Some(draft)),
            3 => println!("Un nom et au moins un ingrédient sont requis."),
            _ => return Ok(None),
        }
    }
}

/// Build a recipe from catalog ingredients.
pub fn prompt_recipe(ingredients: &[Ingredient]) -> Result<Option<Recipe>> {
    if ingredients.is_empty() {
        println!("Add ingredients before creating a recipe.");
        return Ok(None);
    }

    let name = prompt_text("Nom de la recette", "")?;
    let mut draft = RecipeDraft::new(name);

    loop {
        let Some(ingredient) = prompt_ingredient(ingredients)? else {
            break;
        };
        let qty = prompt_f64(&format!("Quantité de {} ({})", ingredient.name, ingredient.unit), 1.0)?;
        draft.add(ingredient, qty);
        println!("Coût de la recette: {:.2}€", draft.total_cost());

        if !prompt_yes_no("Ajouter un autre ingrédient ?", true)? {
            break;
        }
    }

    match draft.build() {
        Ok(recipe) => Ok(Some(recipe)),
        Err(e) => {
            println!("{e}");
            Ok(None)
        }
    }
}

/// Prompt for a saved recipe.
pub fn prompt_recipe_choice(recipes: &[Recipe]) -> Result<Option<&Recipe>> {
    if recipes.is_empty() {
        println!("No recipes saved.");
        return Ok(None);
    }
    let mut options: Vec<String> = recipes
        .iter()
        .map(|r| format!("{} ({:.2}€)", r.name, r.total_cost))
        .collect();
    options.push("Annuler".to_string());
    let selection = Select::new()
        .with_prompt("Recette")
        .items(&options)
        .default(0)
        .interact()?;
    Ok(recipes.get(selection))
}

/// Prompt for the analysis mode.
pub fn prompt_analysis_mode() -> Result<AnalysisMode> {
    let options = vec!["Analyse menu", "Analyse achats"];
    let selection = Select::new()
        .with_prompt("Analyse")
        .items(&options)
        .default(0)
        .interact()?;
    Ok(if selection == 0 {
        AnalysisMode::Menu
    } else {
        AnalysisMode::Purchases
    })
}
