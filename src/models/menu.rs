use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CantineError, Result};

/// Hard limit on components per dish, enforced at entry time.
pub const MAX_DISH_COMPONENTS: usize = 5;

/// One week of grid cells, keyed by composite cell key.
pub type WeekMenu = BTreeMap<String, MenuItem>;

/// Day of the school week, in the fixed Monday-first reference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Lundi,
    Mardi,
    Mercredi,
    Jeudi,
    Vendredi,
    Samedi,
    Dimanche,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Lundi,
        Day::Mardi,
        Day::Mercredi,
        Day::Jeudi,
        Day::Vendredi,
        Day::Samedi,
        Day::Dimanche,
    ];

    /// Position in the fixed reference order (Lundi = 0).
    pub fn ordinal(&self) -> usize {
        *self as usize
    }

    pub fn label(&self) -> &'static str {
        match self {
            Day::Lundi => "Lundi",
            Day::Mardi => "Mardi",
            Day::Mercredi => "Mercredi",
            Day::Jeudi => "Jeudi",
            Day::Vendredi => "Vendredi",
            Day::Samedi => "Samedi",
            Day::Dimanche => "Dimanche",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Row of the menu grid, in vocabulary order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentCategory {
    #[serde(rename = "Entrée")]
    Entree,
    #[serde(rename = "Plat protidique")]
    PlatProtidique,
    #[serde(rename = "Accompagnement")]
    Accompagnement,
    #[serde(rename = "Produit laitier")]
    ProduitLaitier,
    #[serde(rename = "Dessert")]
    Dessert,
    #[serde(rename = "Goûter")]
    Gouter,
    #[serde(rename = "Pain")]
    Pain,
}

impl ComponentCategory {
    pub const ALL: [ComponentCategory; 7] = [
        ComponentCategory::Entree,
        ComponentCategory::PlatProtidique,
        ComponentCategory::Accompagnement,
        ComponentCategory::ProduitLaitier,
        ComponentCategory::Dessert,
        ComponentCategory::Gouter,
        ComponentCategory::Pain,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ComponentCategory::Entree => "Entrée",
            ComponentCategory::PlatProtidique => "Plat protidique",
            ComponentCategory::Accompagnement => "Accompagnement",
            ComponentCategory::ProduitLaitier => "Produit laitier",
            ComponentCategory::Dessert => "Dessert",
            ComponentCategory::Gouter => "Goûter",
            ComponentCategory::Pain => "Pain",
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An ingredient used inside one dish, with a cost snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishComponent {
    #[serde(rename = "ingredientId")]
    pub ingredient_id: String,

    pub name: String,

    pub quantity: f64,

    /// Unit price of the ingredient when the component was added.
    #[serde(rename = "unitCost")]
    pub unit_cost: f64,
}

impl DishComponent {
    #[inline]
    pub fn cost(&self) -> f64 {
        self.quantity * self.unit_cost
    }
}

/// One grid cell: a dish for a (day, component) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,

    pub day: Day,

    pub component: ComponentCategory,

    #[serde(rename = "dishName", default)]
    pub dish_name: String,

    #[serde(default)]
    pub components: Vec<DishComponent>,

    #[serde(default, with = "headcount")]
    pub headcount: Option<u32>,
}

impl MenuItem {
    /// The canonical empty cell for `(day, component)` stored under `key`.
    pub fn empty(key: impl Into<String>, day: Day, component: ComponentCategory) -> Self {
        Self {
            id: key.into(),
            day,
            component,
            dish_name: String::new(),
            components: Vec::new(),
            headcount: None,
        }
    }

    /// Sum of `quantity * unit_cost` over the components.
    pub fn total_cost(&self) -> f64 {
        self.components.iter().map(DishComponent::cost).sum()
    }

    pub fn has_dish(&self) -> bool {
        !self.dish_name.is_empty() || !self.components.is_empty()
    }
}

/// Headcount persists as a number, or `""` when unset.
mod headcount {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(n) => serializer.serialize_u32(*n),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<Raw> = Option::deserialize(deserializer)?;
        Ok(match raw {
            Some(Raw::Number(n)) if n >= 0.0 => Some(n.round() as u32),
            Some(Raw::Text(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

/// Active days and component rows of the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuStructure {
    pub id: String,
    pub name: String,
    pub days: Vec<Day>,
    pub components: Vec<ComponentCategory>,
}

impl Default for MenuStructure {
    fn default() -> Self {
        Self {
            id: "struct-1".to_string(),
            name: "Scolaire Classique".to_string(),
            days: vec![Day::Lundi, Day::Mardi, Day::Jeudi, Day::Vendredi],
            components: vec![
                ComponentCategory::Entree,
                ComponentCategory::PlatProtidique,
                ComponentCategory::Accompagnement,
                ComponentCategory::ProduitLaitier,
                ComponentCategory::Dessert,
            ],
        }
    }
}

impl MenuStructure {
    /// Remove the day if shown, otherwise add it back in reference order.
    pub fn toggle_day(&mut self, day: Day) {
        if self.days.contains(&day) {
            self.days.retain(|d| *d != day);
        } else {
            self.days.push(day);
            self.days.sort_by_key(Day::ordinal);
        }
    }

    /// Remove the component if shown, otherwise append it.
    pub fn toggle_component(&mut self, component: ComponentCategory) {
        if self.components.contains(&component) {
            self.components.retain(|c| *c != component);
        } else {
            self.components.push(component);
        }
    }
}

/// Monday of an ISO week, used to key weekly menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekStart(NaiveDate);

impl WeekStart {
    /// The week containing `date`, if all seven of its days are
    /// representable.
    pub fn checked_containing(date: NaiveDate) -> Option<Self> {
        let offset = date.weekday().num_days_from_monday() as i64;
        let monday = date.checked_sub_signed(Duration::days(offset))?;
        monday.checked_add_signed(Duration::days(6))?;
        Some(Self(monday))
    }

    /// The week containing `date`. Dates in the first or last partial week
    /// of the calendar range key on the date itself.
    pub fn containing(date: NaiveDate) -> Self {
        Self::checked_containing(date).unwrap_or(Self(date))
    }

    /// Parse an ISO `YYYY-MM-DD` date and snap it to its Monday.
    pub fn parse(raw: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|e| CantineError::InvalidDate(format!("{raw}: {e}")))?;
        Self::checked_containing(date)
            .ok_or_else(|| CantineError::InvalidDate(format!("{raw}: out of range")))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The following week, or this one at the end of the calendar.
    pub fn next(&self) -> Self {
        self.shifted(7)
    }

    /// The preceding week, or this one at the start of the calendar.
    pub fn previous(&self) -> Self {
        self.shifted(-7)
    }

    fn shifted(&self, days: i64) -> Self {
        self.0
            .checked_add_signed(Duration::days(days))
            .and_then(Self::checked_containing)
            .unwrap_or(*self)
    }

    /// Calendar date of `day` within this week.
    pub fn date_of(&self, day: Day) -> NaiveDate {
        self.0
            .checked_add_signed(Duration::days(day.ordinal() as i64))
            .unwrap_or(self.0)
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(qty: f64, unit_cost: f64) -> DishComponent {
        DishComponent {
            ingredient_id: "x".into(),
            name: "x".into(),
            quantity: qty,
            unit_cost,
        }
    }

    #[test]
    fn test_total_cost() {
        let mut item = MenuItem::empty("Lundi-Entrée", Day::Lundi, ComponentCategory::Entree);
        item.components = vec![component(2.0, 1.5), component(1.0, 3.0)];
        assert!((item.total_cost() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_has_dish() {
        let mut item = MenuItem::empty("k", Day::Mardi, ComponentCategory::Dessert);
        assert!(!item.has_dish());
        item.dish_name = "Compote".into();
        assert!(item.has_dish());
        item.dish_name.clear();
        item.components.push(component(1.0, 1.0));
        assert!(item.has_dish());
    }

    #[test]
    fn test_headcount_accepts_blank_and_number() {
        let blank = r#"{"id":"k","day":"Lundi","component":"Entrée","dishName":"","components":[],"headcount":""}"#;
        let item: MenuItem = serde_json::from_str(blank).unwrap();
        assert_eq!(item.headcount, None);

        let number = r#"{"id":"k","day":"Lundi","component":"Plat protidique","dishName":"Poulet","components":[],"headcount":120}"#;
        let item: MenuItem = serde_json::from_str(number).unwrap();
        assert_eq!(item.headcount, Some(120));
        assert_eq!(item.component, ComponentCategory::PlatProtidique);
    }

    #[test]
    fn test_headcount_serializes_unset_as_blank() {
        let item = MenuItem::empty("k", Day::Lundi, ComponentCategory::Pain);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["headcount"], "");
        assert_eq!(json["component"], "Pain");
    }

    #[test]
    fn test_toggle_day_keeps_reference_order() {
        let mut structure = MenuStructure::default();
        structure.toggle_day(Day::Mercredi);
        assert_eq!(
            structure.days,
            vec![Day::Lundi, Day::Mardi, Day::Mercredi, Day::Jeudi, Day::Vendredi]
        );
        structure.toggle_day(Day::Lundi);
        assert_eq!(structure.days[0], Day::Mardi);
    }

    #[test]
    fn test_toggle_component_appends() {
        let mut structure = MenuStructure::default();
        structure.toggle_component(ComponentCategory::Entree);
        structure.toggle_component(ComponentCategory::Entree);
        assert_eq!(structure.components.last(), Some(&ComponentCategory::Entree));
        assert_eq!(structure.components.len(), 5);
    }

    #[test]
    fn test_week_start_snaps_to_monday() {
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap();
        let week = WeekStart::containing(sunday);
        assert_eq!(week.to_string(), "2026-10-19");
        assert_eq!(WeekStart::parse("2026-10-21").unwrap(), week);
        assert_eq!(week.next().to_string(), "2026-10-26");
        assert_eq!(week.previous().to_string(), "2026-10-12");
    }

    #[test]
    fn test_week_start_rejects_garbage() {
        assert!(matches!(
            WeekStart::parse("not-a-date"),
            Err(CantineError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_date_of_uses_reference_order() {
        let week = WeekStart::parse("2026-10-19").unwrap();
        assert_eq!(week.date_of(Day::Jeudi).to_string(), "2026-10-22");
    }

    #[test]
    fn test_week_navigation_stops_at_calendar_ends() {
        let last = WeekStart::containing(NaiveDate::MAX);
        let end = last.next();
        assert_eq!(end.next(), end);
        for day in Day::ALL {
            assert!(end.date_of(day) >= end.date());
        }

        let first = WeekStart::containing(NaiveDate::MIN);
        let start = first.previous();
        assert_eq!(start.previous(), start);
        assert!(start.date_of(Day::Dimanche) >= start.date());
    }

    #[test]
    fn test_week_start_rejects_unrepresentable_week() {
        // A final week that would run past the calendar has no key.
        let tail = NaiveDate::MAX;
        if tail.weekday() != chrono::Weekday::Sun {
            assert_eq!(WeekStart::checked_containing(tail), None);
        }
        assert!(WeekStart::checked_containing(NaiveDate::MAX - Duration::days(14)).is_some());
    }
}
