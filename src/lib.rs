pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod grid;
pub mod interface;
pub mod models;
pub mod scanner;
pub mod state;

pub use error::{CantineError, Result};
pub use models::{Ingredient, MenuItem, MenuStructure, Recipe, WeekStart};
pub use state::{CuisineStore, StoreEvent};
