use std::fs;

use chrono::NaiveDate;
use tempfile::TempDir;

use cantine_planner::error::CantineError;
use cantine_planner::grid::DishDraft;
use cantine_planner::models::{
    Category, ComponentCategory, Day, Ingredient, RecipeDraft, Unit, WeekStart,
};
use cantine_planner::state::{
    CuisineStore, JsonFileStorage, KeyValueStorage, LEGACY_MENU_KEY, WEEKLY_MENUS_KEY,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()
}

fn open(dir: &TempDir) -> CuisineStore<JsonFileStorage> {
    CuisineStore::open(JsonFileStorage::new(dir.path()), today()).unwrap()
}

fn potatoes() -> Ingredient {
    Ingredient::manual("Pommes de terre", 10.0, Unit::Kg, 1.2, None, true, false)
}

const LEGACY_MENU: &str = r#"{
  "Lundi-Entrée": {
    "id": "Lundi-Entrée",
    "day": "Lundi",
    "component": "Entrée",
    "dishName": "Carottes râpées",
    "components": [
      { "ingredientId": "abc123xyz", "name": "Carottes", "quantity": 4, "unitCost": 1.5 }
    ],
    "headcount": ""
  }
}"#;

#[test]
fn test_reload_keeps_recipes_and_menus_but_not_ingredients() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);

    store.add_ingredients([potatoes()]);
    let ingredient = store.ingredients()[0].clone();
    store
        .update_ingredient_category(&ingredient.id, Category::Accompagnement)
        .unwrap();

    let mut recipe = RecipeDraft::new("Purée");
    recipe.add(&ingredient, 5.0);
    store.add_recipe(recipe.build().unwrap()).unwrap();

    let mut draft = DishDraft::default();
    draft.dish_name = "Purée maison".into();
    draft.add_component(&ingredient, 5.0).unwrap();
    let (name, components) = draft.into_parts();
    store
        .save_dish(Day::Jeudi, ComponentCategory::Accompagnement, name, components)
        .unwrap();
    store.set_student_count(250);
    store.close().unwrap();

    let mut reopened = open(&dir);
    assert!(reopened.ingredients().is_empty());
    assert_eq!(reopened.student_count(), 100);
    assert_eq!(reopened.recipes().len(), 1);
    assert_eq!(reopened.recipes()[0].name, "Purée");

    let item = reopened.menu_item_or_default(Day::Jeudi, ComponentCategory::Accompagnement);
    assert_eq!(item.dish_name, "Purée maison");
    assert!((item.total_cost() - 6.0).abs() < 1e-9);

    // Category memory survives and re-applies to the same product.
    reopened.add_ingredients([potatoes()]);
    assert_eq!(
        reopened.ingredients()[0].category,
        Some(Category::Accompagnement)
    );
}

#[test]
fn test_legacy_menu_migrates_once() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(format!("{LEGACY_MENU_KEY}.json")),
        LEGACY_MENU,
    )
    .unwrap();

    let store = open(&dir);
    assert_eq!(store.current_week().to_string(), "2026-10-19");
    let item = store.menu_item_or_default(Day::Lundi, ComponentCategory::Entree);
    assert_eq!(item.dish_name, "Carottes râpées");
    assert_eq!(item.headcount, None);
    assert!((item.total_cost() - 6.0).abs() < 1e-9);
    drop(store);

    // Written back immediately, without waiting for a flush.
    let storage = JsonFileStorage::new(dir.path());
    assert!(storage.get(WEEKLY_MENUS_KEY).unwrap().is_some());

    // A later open in another week keeps the data where it was migrated.
    let later = CuisineStore::open(
        JsonFileStorage::new(dir.path()),
        NaiveDate::from_ymd_opt(2026, 11, 4).unwrap(),
    )
    .unwrap();
    assert!(later.menu_items().is_empty());
    assert_eq!(
        later.weeks().copied().collect::<Vec<_>>(),
        vec![WeekStart::parse("2026-10-19").unwrap()]
    );
}

#[test]
fn test_legacy_menu_ignored_when_weekly_exists() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    store
        .save_dish(Day::Mardi, ComponentCategory::Dessert, "Yaourt".into(), vec![])
        .unwrap();
    store.close().unwrap();

    fs::write(
        dir.path().join(format!("{LEGACY_MENU_KEY}.json")),
        LEGACY_MENU,
    )
    .unwrap();

    let reopened = open(&dir);
    assert!(
        !reopened
            .menu_item_or_default(Day::Lundi, ComponentCategory::Entree)
            .has_dish()
    );
    assert!(
        reopened
            .menu_item_or_default(Day::Mardi, ComponentCategory::Dessert)
            .has_dish()
    );
}

#[test]
fn test_empty_store_writes_no_weekly_menus() {
    let dir = TempDir::new().unwrap();
    open(&dir).close().unwrap();

    let storage = JsonFileStorage::new(dir.path());
    assert_eq!(storage.get(WEEKLY_MENUS_KEY).unwrap(), None);
}

#[test]
fn test_sixth_component_rejected() {
    let ingredient = potatoes();
    let mut draft = DishDraft::default();
    for _ in 0..5 {
        draft.add_component(&ingredient, 1.0).unwrap();
    }

    let err = draft.add_component(&ingredient, 1.0).unwrap_err();
    assert!(matches!(err, CantineError::ComponentLimit { max: 5 }));
    assert_eq!(draft.components().len(), 5);
}

#[test]
fn test_week_navigation_isolates_menus() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    store
        .save_dish(Day::Lundi, ComponentCategory::PlatProtidique, "Poulet".into(), vec![])
        .unwrap();

    store.change_week(WeekStart::parse("2026-10-28").unwrap());
    assert_eq!(store.current_week().to_string(), "2026-10-26");
    assert!(store.menu_items().is_empty());

    store.previous_week();
    assert_eq!(
        store
            .menu_item_or_default(Day::Lundi, ComponentCategory::PlatProtidique)
            .dish_name,
        "Poulet"
    );
}
