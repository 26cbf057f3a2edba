mod composer;
mod projection;

pub use composer::DishDraft;
pub use projection::{
    cell_key, project_grid, CellState, GridCell, GridColumn, GridRow, MenuGrid, KEY_SEPARATOR,
};
