use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{MenuItem, WeekMenu, WeekStart};

const HEADER: [&str; 6] = [
    "Date",
    "Jour",
    "Composante",
    "Plat",
    "Coût Portion",
    "Ingrédients",
];

/// `menu_semaine_<week>.csv`
pub fn export_filename(week: WeekStart) -> String {
    format!("menu_semaine_{week}.csv")
}

/// Wrap a free-text field in quotes, doubling inner quotes.
fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Write one row per menu item of the week, ordered by day then component.
///
/// Dish name and ingredient list are always quoted; the remaining columns
/// hold dates, vocabulary labels and amounts, which never contain a comma.
pub fn write_week_csv<W: io::Write>(writer: W, week: WeekStart, items: &WeekMenu) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);
    wtr.write_record(HEADER)?;

    let mut rows: Vec<&MenuItem> = items.values().collect();
    rows.sort_by_key(|item| (item.day, item.component));

    for item in rows {
        let ingredients: Vec<&str> = item.components.iter().map(|c| c.name.as_str()).collect();
        wtr.write_record([
            week.to_string(),
            item.day.to_string(),
            item.component.to_string(),
            quoted(&item.dish_name),
            format!("{:.2}", item.total_cost()),
            quoted(&ingredients.join("; ")),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the week's CSV into `dir` (or to `path` if it names a file).
pub fn export_week_csv(target: Option<&Path>, week: WeekStart, items: &WeekMenu) -> Result<PathBuf> {
    let path = match target {
        Some(p) if p.is_dir() => p.join(export_filename(week)),
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(export_filename(week)),
    };
    let file = std::fs::File::create(&path)?;
    write_week_csv(file, week, items)?;
    tracing::info!(path = %path.display(), rows = items.len(), "menu exported");
    Ok(path)
}
