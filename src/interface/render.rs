use crate::analysis::{
    AnalysisMode, WeeklyAnalysis, BIO_TARGET_PCT, COST_PER_STUDENT_ALERT, EGALIM_TARGET_PCT,
};
use crate::grid::{CellState, DishDraft, MenuGrid};
use crate::models::{Ingredient, Recipe, MAX_DISH_COMPONENTS};

/// Width of one grid column in characters.
const CELL_WIDTH: usize = 22;

/// Width of the text gauges.
const GAUGE_WIDTH: usize = 20;

/// Display the ingredient catalog.
pub fn display_ingredients(ingredients: &[Ingredient]) {
    if ingredients.is_empty() {
        println!("No ingredients yet. Scan an invoice or add one manually.");
        return;
    }

    println!();
    println!("=== Ingredients ({} items) ===", ingredients.len());
    println!();

    for (i, ing) in ingredients.iter().enumerate() {
        let category = ing
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("{:>3}. [{:<14}] {}", i + 1, category, ing.summary());
    }

    println!();
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{text:<width$}")
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

/// Display the weekly grid: one column per day, one row per component.
pub fn display_grid(grid: &MenuGrid) {
    println!();
    println!("=== Menu, semaine du {} ===", grid.week.date().format("%d/%m/%Y"));
    println!();

    let mut header = fit("", CELL_WIDTH);
    for column in &grid.columns {
        let label = format!("{} {}", column.day, column.date.format("%d/%m"));
        header.push_str(" | ");
        header.push_str(&fit(&label, CELL_WIDTH));
    }
    println!("{header}");
    println!("{}", "-".repeat(header.chars().count()));

    for row in &grid.rows {
        // Line 1: dish names; line 2: cost and headcount.
        let mut names = fit(row.component.label(), CELL_WIDTH);
        let mut details = fit("", CELL_WIDTH);
        for cell in &row.cells {
            let (name, detail) = match cell.state {
                CellState::HasDish => {
                    let name = if cell.dish_name.is_empty() {
                        cell.component_names.join(", ")
                    } else {
                        cell.dish_name.clone()
                    };
                    let cost = cell
                        .cost
                        .map(|c| format!("{c:.2}€"))
                        .unwrap_or_default();
                    (name, cost)
                }
                CellState::Empty => ("+".to_string(), String::new()),
            };
            let detail = match cell.headcount {
                Some(n) => format!("{detail} ({n} couverts)"),
                None => detail,
            };
            names.push_str(" | ");
            names.push_str(&fit(&name, CELL_WIDTH));
            details.push_str(" | ");
            details.push_str(&fit(detail.trim(), CELL_WIDTH));
        }
        println!("{names}");
        println!("{details}");
    }

    println!();
}

fn gauge(fill: f64) -> String {
    let filled = ((fill.clamp(0.0, 1.0)) * GAUGE_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(GAUGE_WIDTH - filled))
}

/// Display the cost and BIO/EGALIM dashboard.
pub fn display_analysis(analysis: &WeeklyAnalysis) {
    let stats = &analysis.stats;
    let label = match analysis.mode {
        AnalysisMode::Menu => "Menu",
        AnalysisMode::Purchases => "Achats",
    };

    println!();
    println!("=== Analyse {} ===", label);
    println!();
    println!("Coût total ({}): {:.2}€", label, stats.total_cost);
    println!();
    println!(
        "BIO       {:>5.1}% {}  objectif {:.0}%{}",
        stats.bio_pct,
        gauge(stats.bio_pct / 100.0),
        BIO_TARGET_PCT,
        if stats.meets_bio_target() { " ✓" } else { "" }
    );
    println!(
        "EGALIM    {:>5.1}% {}  objectif {:.0}%{}",
        stats.egalim_pct,
        gauge(stats.egalim_pct / 100.0),
        EGALIM_TARGET_PCT,
        if stats.meets_egalim_target() { " ✓" } else { "" }
    );
    println!(
        "Non BIO   {:>5.1}% {}",
        stats.non_bio_pct,
        gauge(stats.non_bio_pct / 100.0)
    );

    if analysis.mode == AnalysisMode::Purchases {
        println!();
        println!("L'analyse des achats porte sur l'ensemble des ingrédients scannés ou saisis.");
        println!();
        return;
    }

    println!();
    println!("--- Analyse hebdomadaire ({} élèves / jour) ---", analysis.student_count);
    for day in &analysis.days {
        let flag = if day.is_over_alert() {
            format!("  > {:.2}€", COST_PER_STUDENT_ALERT)
        } else {
            String::new()
        };
        println!(
            "{:<9} {:>6.2}€ / élève {}  total {:>8.2}€{}",
            day.day.label(),
            day.cost_per_student,
            gauge(day.gauge_fill()),
            day.total_cost,
            flag
        );
    }
    println!();
}

/// Display saved recipes.
pub fn display_recipes(recipes: &[Recipe]) {
    if recipes.is_empty() {
        println!("No recipes saved.");
        return;
    }

    println!();
    println!("=== Recettes ({}) ===", recipes.len());
    for recipe in recipes {
        println!();
        println!("{} - {:.2}€  (id {})", recipe.name, recipe.total_cost, recipe.id);
        for line in &recipe.ingredients {
            println!(
                "    {} x {} {} = {:.2}€",
                line.qty,
                line.item.name,
                line.item.unit,
                line.cost()
            );
        }
    }
    println!();
}

/// Display a dish being composed.
pub fn display_draft(draft: &DishDraft) {
    println!();
    println!(
        "Plat: {}",
        if draft.dish_name.is_empty() {
            "(sans nom)"
        } else {
            &draft.dish_name
        }
    );
    println!(
        "Composants: {}/{}",
        draft.components().len(),
        MAX_DISH_COMPONENTS
    );
    for (i, comp) in draft.components().iter().enumerate() {
        println!(
            "  {}. {} - {} x {:.2}€ = {:.2}€",
            i + 1,
            comp.name,
            comp.quantity,
            comp.unit_cost,
            comp.cost()
        );
    }
    if !draft.components().is_empty() {
        println!("Coût total: {:.2}€", draft.total_cost());
    }
    println!();
}
