use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::analysis::DEFAULT_STUDENT_COUNT;
use crate::error::Result;
use crate::grid::cell_key;
use crate::models::{
    Category, ComponentCategory, Day, DishComponent, Ingredient, MenuItem, MenuStructure, Recipe,
    WeekMenu, WeekStart,
};
use crate::state::persistence::{
    load_json, save_json, KeyValueStorage, LEGACY_MENU_KEY, MEMORY_KEY, RECIPES_KEY,
    STRUCTURE_KEY, WEEKLY_MENUS_KEY,
};

static EMPTY_WEEK: WeekMenu = BTreeMap::new();

/// What changed in the store. Sent to subscribers after each mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    IngredientsAdded { count: usize },
    IngredientCategorized { id: String, category: Category },
    RecipesChanged,
    StudentCountChanged(i64),
    WeekChanged(WeekStart),
    MenuItemUpdated { week: WeekStart, key: String },
    StructureChanged,
}

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// Owns every collection of the planner.
///
/// Recipes, the category memory, the weekly menus and the grid structure
/// are written through to `storage` on each change. Ingredients, the
/// student count and the active week live only as long as the store.
pub struct CuisineStore<S: KeyValueStorage> {
    storage: S,
    ingredients: Vec<Ingredient>,
    recipes: Vec<Recipe>,
    student_count: i64,
    current_week: WeekStart,
    weekly_menus: BTreeMap<WeekStart, WeekMenu>,
    item_memory: BTreeMap<String, Category>,
    structure: MenuStructure,
    listeners: Vec<Listener>,
}

impl<S: KeyValueStorage> CuisineStore<S> {
    /// Load persisted state; the active week is the one containing `today`.
    ///
    /// A legacy flat menu is adopted as the current week only when no
    /// weekly data exists, and the result is written back so it happens
    /// once.
    pub fn open(mut storage: S, today: NaiveDate) -> Result<Self> {
        let current_week = WeekStart::containing(today);

        let item_memory: BTreeMap<String, Category> =
            load_json(&storage, MEMORY_KEY)?.unwrap_or_default();
        let recipes: Vec<Recipe> = load_json(&storage, RECIPES_KEY)?.unwrap_or_default();
        let structure: MenuStructure = load_json(&storage, STRUCTURE_KEY)?.unwrap_or_default();

        let weekly_menus: BTreeMap<WeekStart, WeekMenu> =
            match load_json(&storage, WEEKLY_MENUS_KEY)? {
                Some(weekly) => weekly,
                None => match load_json::<WeekMenu, _>(&storage, LEGACY_MENU_KEY)? {
                    Some(flat) => {
                        info!(
                            week = %current_week,
                            items = flat.len(),
                            "migrating legacy flat menu into current week"
                        );
                        let mut weekly = BTreeMap::new();
                        weekly.insert(current_week, flat);
                        save_json(&mut storage, WEEKLY_MENUS_KEY, &weekly)?;
                        weekly
                    }
                    None => BTreeMap::new(),
                },
            };

        info!(
            recipes = recipes.len(),
            weeks = weekly_menus.len(),
            week = %current_week,
            "store opened"
        );

        Ok(Self {
            storage,
            ingredients: Vec::new(),
            recipes,
            student_count: DEFAULT_STUDENT_COUNT,
            current_week,
            weekly_menus,
            item_memory,
            structure,
            listeners: Vec::new(),
        })
    }

    /// Register a callback run after every mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, event: StoreEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    // ── Ingredients ─────────────────────────────────────────────────────

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn ingredient(&self, id: &str) -> Option<&Ingredient> {
        self.ingredients.iter().find(|i| i.id == id)
    }

    /// Append ingredients, filling unset categories from the memory.
    pub fn add_ingredients(&mut self, items: impl IntoIterator<Item = Ingredient>) {
        let before = self.ingredients.len();
        for mut item in items {
            if item.category.is_none() {
                item.category = self
                    .item_memory
                    .get(&Ingredient::memory_key(&item.name))
                    .copied();
                if let Some(category) = item.category {
                    debug!(name = %item.name, %category, "auto-categorized from memory");
                }
            }
            self.ingredients.push(item);
        }
        let count = self.ingredients.len() - before;
        info!(count, "ingredients added");
        self.notify(StoreEvent::IngredientsAdded { count });
    }

    /// Set an ingredient's category and remember it for its name.
    ///
    /// Unknown ids are ignored.
    pub fn update_ingredient_category(&mut self, id: &str, category: Category) -> Result<()> {
        let Some(item) = self.ingredients.iter_mut().find(|i| i.id == id) else {
            debug!(id, "category update for unknown ingredient ignored");
            return Ok(());
        };
        item.category = Some(category);
        let name = item.name.clone();

        self.save_to_memory(&name, category)?;
        self.notify(StoreEvent::IngredientCategorized {
            id: id.to_string(),
            category,
        });
        Ok(())
    }

    pub fn item_memory(&self) -> &BTreeMap<String, Category> {
        &self.item_memory
    }

    pub fn save_to_memory(&mut self, name: &str, category: Category) -> Result<()> {
        self.item_memory.insert(Ingredient::memory_key(name), category);
        save_json(&mut self.storage, MEMORY_KEY, &self.item_memory)
    }

    // ── Recipes ─────────────────────────────────────────────────────────

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn add_recipe(&mut self, recipe: Recipe) -> Result<()> {
        info!(name = %recipe.name, cost = recipe.total_cost, "recipe added");
        self.recipes.push(recipe);
        save_json(&mut self.storage, RECIPES_KEY, &self.recipes)?;
        self.notify(StoreEvent::RecipesChanged);
        Ok(())
    }

    /// Remove a recipe by id. Unknown ids are ignored.
    pub fn remove_recipe(&mut self, id: &str) -> Result<()> {
        let before = self.recipes.len();
        self.recipes.retain(|r| r.id != id);
        if self.recipes.len() == before {
            debug!(id, "removal of unknown recipe ignored");
            return Ok(());
        }
        save_json(&mut self.storage, RECIPES_KEY, &self.recipes)?;
        self.notify(StoreEvent::RecipesChanged);
        Ok(())
    }

    // ── Headcount ───────────────────────────────────────────────────────

    pub fn student_count(&self) -> i64 {
        self.student_count
    }

    /// Replace the per-day headcount divisor. Not validated here.
    pub fn set_student_count(&mut self, count: i64) {
        self.student_count = count;
        self.notify(StoreEvent::StudentCountChanged(count));
    }

    // ── Weeks ───────────────────────────────────────────────────────────

    pub fn current_week(&self) -> WeekStart {
        self.current_week
    }

    /// Point the store at another week. No data is created or removed.
    pub fn change_week(&mut self, week: WeekStart) {
        debug!(from = %self.current_week, to = %week, "week changed");
        self.current_week = week;
        self.notify(StoreEvent::WeekChanged(week));
    }

    pub fn next_week(&mut self) {
        self.change_week(self.current_week.next());
    }

    pub fn previous_week(&mut self) {
        self.change_week(self.current_week.previous());
    }

    /// Weeks that have stored menu data, oldest first.
    pub fn weeks(&self) -> impl Iterator<Item = &WeekStart> {
        self.weekly_menus.keys()
    }

    // ── Menu items ──────────────────────────────────────────────────────

    /// Items of the active week; empty when the week has none yet.
    pub fn menu_items(&self) -> &WeekMenu {
        self.weekly_menus
            .get(&self.current_week)
            .unwrap_or(&EMPTY_WEEK)
    }

    /// The stored item for a cell, or the canonical empty one.
    pub fn menu_item_or_default(&self, day: Day, component: ComponentCategory) -> MenuItem {
        let key = cell_key(day, component);
        match self.menu_items().get(&key) {
            Some(item) => item.clone(),
            None => MenuItem::empty(key, day, component),
        }
    }

    /// Replace the item stored under `key` in the active week.
    pub fn update_menu_item(&mut self, key: &str, item: MenuItem) -> Result<()> {
        let week = self.current_week;
        self.weekly_menus
            .entry(week)
            .or_default()
            .insert(key.to_string(), item);
        debug!(%week, key, "menu item updated");

        self.persist_weekly_menus()?;
        self.notify(StoreEvent::MenuItemUpdated {
            week,
            key: key.to_string(),
        });
        Ok(())
    }

    /// Set a cell's dish name and components, keeping its headcount.
    pub fn save_dish(
        &mut self,
        day: Day,
        component: ComponentCategory,
        dish_name: String,
        components: Vec<DishComponent>,
    ) -> Result<()> {
        let mut item = self.menu_item_or_default(day, component);
        item.dish_name = dish_name;
        item.components = components;
        let key = item.id.clone();
        self.update_menu_item(&key, item)
    }

    /// Set a cell's headcount override, keeping its dish.
    pub fn set_headcount(
        &mut self,
        day: Day,
        component: ComponentCategory,
        headcount: Option<u32>,
    ) -> Result<()> {
        let mut item = self.menu_item_or_default(day, component);
        item.headcount = headcount;
        let key = item.id.clone();
        self.update_menu_item(&key, item)
    }

    fn persist_weekly_menus(&mut self) -> Result<()> {
        // An empty map is never written, so a legacy menu can still migrate.
        if self.weekly_menus.is_empty() {
            return Ok(());
        }
        save_json(&mut self.storage, WEEKLY_MENUS_KEY, &self.weekly_menus)
    }

    // ── Structure ───────────────────────────────────────────────────────

    pub fn structure(&self) -> &MenuStructure {
        &self.structure
    }

    pub fn set_structure(&mut self, structure: MenuStructure) -> Result<()> {
        self.structure = structure;
        save_json(&mut self.storage, STRUCTURE_KEY, &self.structure)?;
        self.notify(StoreEvent::StructureChanged);
        Ok(())
    }

    pub fn toggle_day(&mut self, day: Day) -> Result<()> {
        let mut structure = self.structure.clone();
        structure.toggle_day(day);
        self.set_structure(structure)
    }

    pub fn toggle_component(&mut self, component: ComponentCategory) -> Result<()> {
        let mut structure = self.structure.clone();
        structure.toggle_component(component);
        self.set_structure(structure)
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Write every persisted collection.
    pub fn flush(&mut self) -> Result<()> {
        save_json(&mut self.storage, MEMORY_KEY, &self.item_memory)?;
        save_json(&mut self.storage, RECIPES_KEY, &self.recipes)?;
        save_json(&mut self.storage, STRUCTURE_KEY, &self.structure)?;
        self.persist_weekly_menus()?;
        info!("store flushed");
        Ok(())
    }

    /// Flush and hand back the storage backend.
    pub fn close(mut self) -> Result<S> {
        self.flush()?;
        Ok(self.storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Unit;
    use crate::state::persistence::MemoryStorage;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tracing_subscriber::EnvFilter;

    fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()
    }

    fn open_empty() -> CuisineStore<MemoryStorage> {
        init_test_tracing();
        CuisineStore::open(MemoryStorage::new(), today()).unwrap()
    }

    fn ingredient(id: &str, name: &str) -> Ingredient {
        let mut ing = Ingredient::manual(name, 1.0, Unit::Kg, 2.0, None, false, false);
        ing.id = id.to_string();
        ing
    }

    #[test]
    fn test_open_defaults() {
        let store = open_empty();
        assert_eq!(store.current_week().to_string(), "2026-10-19");
        assert_eq!(store.student_count(), DEFAULT_STUDENT_COUNT);
        assert!(store.menu_items().is_empty());
        assert_eq!(store.structure(), &MenuStructure::default());
    }

    #[test]
    fn test_auto_categorize_from_memory() {
        let mut store = open_empty();
        store.add_ingredients(vec![ingredient("a", "Carottes")]);
        store.update_ingredient_category("a", Category::Entree).unwrap();

        store.add_ingredients(vec![ingredient("b", "CAROTTES"), ingredient("c", "Navets")]);
        assert_eq!(store.ingredient("b").unwrap().category, Some(Category::Entree));
        assert_eq!(store.ingredient("c").unwrap().category, None);
    }

    #[test]
    fn test_explicit_category_not_overridden() {
        let mut store = open_empty();
        store.save_to_memory("Riz", Category::Accompagnement).unwrap();
        let mut rice = ingredient("r", "Riz");
        rice.category = Some(Category::Plat);
        store.add_ingredients(vec![rice]);
        assert_eq!(store.ingredient("r").unwrap().category, Some(Category::Plat));
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let mut store = open_empty();
        store.update_ingredient_category("missing", Category::Sauce).unwrap();
        store.remove_recipe("missing").unwrap();
        assert!(store.item_memory().is_empty());
    }

    #[test]
    fn test_menu_item_replaced_not_merged() {
        let mut store = open_empty();
        let key = cell_key(Day::Lundi, ComponentCategory::Entree);
        let mut first = store.menu_item_or_default(Day::Lundi, ComponentCategory::Entree);
        first.dish_name = "Salade".into();
        first.headcount = Some(90);
        store.update_menu_item(&key, first).unwrap();

        let replacement = MenuItem::empty(&key, Day::Lundi, ComponentCategory::Entree);
        store.update_menu_item(&key, replacement.clone()).unwrap();
        assert_eq!(store.menu_items().get(&key), Some(&replacement));
    }

    #[test]
    fn test_save_dish_keeps_headcount() {
        let mut store = open_empty();
        store
            .set_headcount(Day::Mardi, ComponentCategory::Dessert, Some(75))
            .unwrap();
        store
            .save_dish(Day::Mardi, ComponentCategory::Dessert, "Compote".into(), vec![])
            .unwrap();

        let item = store.menu_item_or_default(Day::Mardi, ComponentCategory::Dessert);
        assert_eq!(item.dish_name, "Compote");
        assert_eq!(item.headcount, Some(75));
        assert_eq!(item.id, "Mardi-Dessert");
    }

    #[test]
    fn test_weeks_are_isolated() {
        let mut store = open_empty();
        store
            .save_dish(Day::Lundi, ComponentCategory::Entree, "Soupe".into(), vec![])
            .unwrap();
        let original = store.menu_items().clone();

        store.next_week();
        assert!(store.menu_items().is_empty());
        store
            .save_dish(Day::Lundi, ComponentCategory::Entree, "Taboulé".into(), vec![])
            .unwrap();

        store.previous_week();
        assert_eq!(store.menu_items(), &original);
        assert_eq!(store.weeks().count(), 2);
    }

    #[test]
    fn test_change_week_creates_nothing() {
        let mut store = open_empty();
        store.change_week(WeekStart::parse("2027-01-04").unwrap());
        assert_eq!(store.weeks().count(), 0);
    }

    #[test]
    fn test_subscribers_see_mutations() {
        let mut store = open_empty();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        store.set_student_count(120);
        store.add_ingredients(vec![ingredient("a", "Pain")]);
        store.next_week();

        let events = seen.borrow();
        assert_eq!(events[0], StoreEvent::StudentCountChanged(120));
        assert_eq!(events[1], StoreEvent::IngredientsAdded { count: 1 });
        assert!(matches!(events[2], StoreEvent::WeekChanged(_)));
    }

    #[test]
    fn test_toggle_structure_persists() {
        let mut store = open_empty();
        store.toggle_day(Day::Mercredi).unwrap();
        store.toggle_component(ComponentCategory::Pain).unwrap();

        let storage = store.close().unwrap();
        let reopened = CuisineStore::open(storage, today()).unwrap();
        assert!(reopened.structure().days.contains(&Day::Mercredi));
        assert!(reopened.structure().components.contains(&ComponentCategory::Pain));
    }
}
