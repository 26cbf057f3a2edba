use std::path::PathBuf;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cantine_planner::analysis::{weekly_analysis, AnalysisMode};
use cantine_planner::cli::{Cli, Command};
use cantine_planner::config::{load_app_config, AppConfig};
use cantine_planner::error::{CantineError, Result};
use cantine_planner::grid::{project_grid, DishDraft};
use cantine_planner::interface::{
    display_analysis, display_grid, display_ingredients, display_recipes, export_week_csv,
    prompt_action, prompt_analysis_mode, prompt_category, prompt_cell, prompt_dish,
    prompt_headcount, prompt_i64, prompt_ingredient, prompt_manual_ingredient, prompt_recipe,
    prompt_recipe_choice, prompt_structure_edit, prompt_text, prompt_week, SessionAction,
    StructureEdit,
};
use cantine_planner::models::WeekStart;
use cantine_planner::scanner::{scan_invoice, GeminiExtractor, InvoiceFile, ScanOutcome};
use cantine_planner::state::{CuisineStore, JsonFileStorage};

type Store = CuisineStore<JsonFileStorage>;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    dotenvy::dotenv().ok();

    let mut config = load_app_config(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    debug!(?config, "configuration loaded");

    let mut store = open_store(&config)?;

    match cli.command.unwrap_or_default() {
        Command::Session => cmd_session(&mut store, &config)?,
        Command::Grid { week } => cmd_grid(&mut store, week.as_deref())?,
        Command::Analysis { week, students } => {
            cmd_analysis(&mut store, week.as_deref(), students)?
        }
        Command::Export { week, out } => cmd_export(&mut store, week.as_deref(), out)?,
        Command::Recipes => display_recipes(store.recipes()),
    }

    store.close()?;
    Ok(())
}

fn open_store(config: &AppConfig) -> Result<Store> {
    let storage = JsonFileStorage::new(&config.data_dir);
    let mut store = CuisineStore::open(storage, chrono::Local::now().date_naive())?;
    store.set_student_count(config.student_count);
    Ok(store)
}

fn select_week(store: &mut Store, week: Option<&str>) -> Result<()> {
    if let Some(raw) = week {
        store.change_week(WeekStart::parse(raw)?);
    }
    Ok(())
}

/// Print the grid of a week.
fn cmd_grid(store: &mut Store, week: Option<&str>) -> Result<()> {
    select_week(store, week)?;
    show_grid(store);
    Ok(())
}

/// Print the menu analysis of a week.
fn cmd_analysis(store: &mut Store, week: Option<&str>, students: Option<i64>) -> Result<()> {
    select_week(store, week)?;
    if let Some(count) = students {
        store.set_student_count(count);
    }
    show_analysis(store, AnalysisMode::Menu);
    Ok(())
}

/// Export a week to CSV.
fn cmd_export(store: &mut Store, week: Option<&str>, out: Option<PathBuf>) -> Result<()> {
    select_week(store, week)?;
    let path = export_week_csv(out.as_deref(), store.current_week(), store.menu_items())?;
    println!("Exported to {}", path.display());
    Ok(())
}

fn show_grid(store: &Store) {
    let grid = project_grid(store.structure(), store.menu_items(), store.current_week());
    display_grid(&grid);
}

fn show_analysis(store: &Store, mode: AnalysisMode) {
    let analysis = weekly_analysis(
        mode,
        store.menu_items(),
        store.ingredients(),
        store.student_count(),
        &store.structure().days,
    );
    display_analysis(&analysis);
}

/// Interactive loop over one open store.
fn cmd_session(store: &mut Store, config: &AppConfig) -> Result<()> {
    store.subscribe(|event| debug!(?event, "store event"));

    println!(
        "Cantine planner - {} élèves / jour, semaine du {}",
        store.student_count(),
        store.current_week()
    );

    loop {
        let action = prompt_action(store.current_week())?;
        match session_step(store, config, action) {
            Ok(true) => {
                store.flush()?;
                println!("Saved. Au revoir.");
                return Ok(());
            }
            Ok(false) => {}
            Err(e) if e.is_recoverable() => println!("{e}"),
            Err(e) => {
                // Menus and recipes are written through; flush what we can.
                if let Err(flush) = store.flush() {
                    tracing::error!(error = %flush, "flush after session failure failed");
                }
                return Err(e);
            }
        }
    }
}

/// Run one session action. Returns `true` when the user quits.
fn session_step(store: &mut Store, config: &AppConfig, action: SessionAction) -> Result<bool> {
    match action {
        SessionAction::ScanInvoice => session_scan(store, config)?,
        SessionAction::ManualEntry => store.add_ingredients([prompt_manual_ingredient()?]),
        SessionAction::ListIngredients => display_ingredients(store.ingredients()),
        SessionAction::Categorize => session_categorize(store)?,
        SessionAction::ShowGrid => show_grid(store),
        SessionAction::ComposeDish => session_compose(store)?,
        SessionAction::SetHeadcount => session_headcount(store)?,
        SessionAction::PreviousWeek => {
            store.previous_week();
            show_grid(store);
        }
        SessionAction::NextWeek => {
            store.next_week();
            show_grid(store);
        }
        SessionAction::GoToWeek => {
            let week = prompt_week(store.current_week())?;
            store.change_week(week);
            show_grid(store);
        }
        SessionAction::EditStructure => loop {
            match prompt_structure_edit(store.structure())? {
                StructureEdit::Day(day) => store.toggle_day(day)?,
                StructureEdit::Component(component) => store.toggle_component(component)?,
                StructureEdit::Done => break,
            }
        },
        SessionAction::NewRecipe => {
            if let Some(recipe) = prompt_recipe(store.ingredients())? {
                println!("Recette '{}' enregistrée ({:.2}€)", recipe.name, recipe.total_cost);
                store.add_recipe(recipe)?;
            }
        }
        SessionAction::RemoveRecipe => {
            let id = prompt_recipe_choice(store.recipes())?.map(|r| r.id.clone());
            if let Some(id) = id {
                store.remove_recipe(&id)?;
            }
        }
        SessionAction::ListRecipes => display_recipes(store.recipes()),
        SessionAction::Analysis => {
            let mode = prompt_analysis_mode()?;
            show_analysis(store, mode);
        }
        SessionAction::SetStudentCount => {
            let count = prompt_i64("Élèves par jour", store.student_count())?;
            if count > 0 {
                store.set_student_count(count);
            } else {
                println!("Le nombre d'élèves doit être positif.");
            }
        }
        SessionAction::Export => {
            let path = export_week_csv(None, store.current_week(), store.menu_items())?;
            println!("Exported to {}", path.display());
        }
        SessionAction::Quit => return Ok(true),
    }
    Ok(false)
}

fn session_scan(store: &mut Store, config: &AppConfig) -> Result<()> {
    let path = prompt_text("Fichier de la facture (image ou PDF)", "")?;
    if path.is_empty() {
        return Ok(());
    }

    let outcome = InvoiceFile::from_path(&path).and_then(|file| {
        let extractor = GeminiExtractor::from_config(&config.extraction)?;
        println!("Analyse de {} en cours...", file.name);
        scan_invoice(&extractor, &file, store)
    });

    match outcome {
        Ok(ScanOutcome::Added(count)) => {
            println!("{count} ingrédient(s) ajouté(s).");
            display_ingredients(store.ingredients());
        }
        Ok(ScanOutcome::NothingDetected) => println!("Aucun ingrédient détecté."),
        Err(CantineError::Config(msg)) => println!("{msg}"),
        Err(CantineError::Io(e)) => println!("Cannot read invoice file: {e}"),
        Err(CantineError::InvalidInput(msg)) => println!("{msg}"),
        Err(e) => println!("Erreur lors de l'analyse de la facture: {e}"),
    }
    Ok(())
}

fn session_categorize(store: &mut Store) -> Result<()> {
    let Some(ingredient) = prompt_ingredient(store.ingredients())? else {
        return Ok(());
    };
    let id = ingredient.id.clone();
    let category = prompt_category(ingredient.category)?;
    store.update_ingredient_category(&id, category)
}

fn session_compose(store: &mut Store) -> Result<()> {
    let Some((day, component)) = prompt_cell(store.structure())? else {
        return Ok(());
    };
    let draft = DishDraft::from_item(&store.menu_item_or_default(day, component));

    if let Some(draft) = prompt_dish(draft, store.ingredients())? {
        let (dish_name, components) = draft.into_parts();
        store.save_dish(day, component, dish_name, components)?;
        show_grid(store);
    }
    Ok(())
}

fn session_headcount(store: &mut Store) -> Result<()> {
    let Some((day, component)) = prompt_cell(store.structure())? else {
        return Ok(());
    };
    let current = store.menu_item_or_default(day, component).headcount;
    let headcount = prompt_headcount(current)?;
    store.set_headcount(day, component, headcount)
}
