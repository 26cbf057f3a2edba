mod persistence;
mod store;

pub use persistence::{
    load_json, save_json, JsonFileStorage, KeyValueStorage, MemoryStorage, LEGACY_MENU_KEY,
    MEMORY_KEY, RECIPES_KEY, STRUCTURE_KEY, WEEKLY_MENUS_KEY,
};
pub use store::{CuisineStore, StoreEvent};
