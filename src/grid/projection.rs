use chrono::NaiveDate;

use crate::models::{ComponentCategory, Day, MenuItem, MenuStructure, WeekMenu, WeekStart};

/// Joins day and component in a cell key. No vocabulary label contains it.
pub const KEY_SEPARATOR: char = '-';

/// Composite key of a grid cell, e.g. `Lundi-Entrée`.
pub fn cell_key(day: Day, component: ComponentCategory) -> String {
    format!("{}{}{}", day.label(), KEY_SEPARATOR, component.label())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Empty,
    HasDish,
}

/// Display projection of one cell.
#[derive(Debug, Clone)]
pub struct GridCell {
    pub key: String,
    pub day: Day,
    pub component: ComponentCategory,
    pub state: CellState,
    pub dish_name: String,
    pub component_names: Vec<String>,
    /// Component cost subtotal; `None` when the cell has no components.
    pub cost: Option<f64>,
    pub headcount: Option<u32>,
}

impl GridCell {
    fn project(day: Day, component: ComponentCategory, item: Option<&MenuItem>) -> Self {
        let key = cell_key(day, component);
        match item {
            Some(item) => Self {
                key,
                day,
                component,
                state: if item.has_dish() {
                    CellState::HasDish
                } else {
                    CellState::Empty
                },
                dish_name: item.dish_name.clone(),
                component_names: item.components.iter().map(|c| c.name.clone()).collect(),
                cost: (!item.components.is_empty()).then(|| item.total_cost()),
                headcount: item.headcount,
            },
            None => Self {
                key,
                day,
                component,
                state: CellState::Empty,
                dish_name: String::new(),
                component_names: Vec::new(),
                cost: None,
                headcount: None,
            },
        }
    }
}

/// Column header: a day and its calendar date within the week.
#[derive(Debug, Clone)]
pub struct GridColumn {
    pub day: Day,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct GridRow {
    pub component: ComponentCategory,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone)]
pub struct MenuGrid {
    pub week: WeekStart,
    pub columns: Vec<GridColumn>,
    pub rows: Vec<GridRow>,
}

impl MenuGrid {
    pub fn cell(&self, day: Day, component: ComponentCategory) -> Option<&GridCell> {
        self.rows
            .iter()
            .find(|r| r.component == component)
            .and_then(|r| r.cells.iter().find(|c| c.day == day))
    }
}

/// Project the week's items onto the structure's days (columns) and
/// components (rows).
///
/// Column dates come from each day's position in the fixed Monday-first
/// order, so hiding or reordering days never shifts a date.
pub fn project_grid(structure: &MenuStructure, items: &WeekMenu, week: WeekStart) -> MenuGrid {
    let columns = structure
        .days
        .iter()
        .map(|&day| GridColumn {
            day,
            date: week.date_of(day),
        })
        .collect();

    let rows = structure
        .components
        .iter()
        .map(|&component| GridRow {
            component,
            cells: structure
                .days
                .iter()
                .map(|&day| GridCell::project(day, component, items.get(&cell_key(day, component))))
                .collect(),
        })
        .collect();

    MenuGrid {
        week,
        columns,
        rows,
    }
}
