use std::fmt;

use serde::{Deserialize, Serialize};

/// VAT applied to food purchases when deriving a post-tax price (5.5%).
pub const FOOD_VAT_RATE: f64 = 0.055;

/// Menu category an ingredient is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Entree,
    Plat,
    Accompagnement,
    Sauce,
    Dessert,
    Autre,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Entree,
        Category::Plat,
        Category::Accompagnement,
        Category::Sauce,
        Category::Dessert,
        Category::Autre,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Entree => "ENTREE",
            Category::Plat => "PLAT",
            Category::Accompagnement => "ACCOMPAGNEMENT",
            Category::Sauce => "SAUCE",
            Category::Dessert => "DESSERT",
            Category::Autre => "AUTRE",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Purchase unit. Anything the invoice reader cannot map becomes `U` (piece).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    G,
    L,
    #[default]
    U,
}

impl Unit {
    pub const ALL: [Unit; 4] = [Unit::Kg, Unit::G, Unit::L, Unit::U];

    /// Map a free-form unit string onto the four supported units.
    pub fn normalize(raw: &str) -> Unit {
        match raw.trim().to_lowercase().as_str() {
            "kg" => Unit::Kg,
            "g" => Unit::G,
            "l" => Unit::L,
            _ => Unit::U,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::L => "l",
            Unit::U => "u",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A purchased or scanned item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub category: Option<Category>,

    pub quantity: f64,

    #[serde(default)]
    pub unit: Unit,

    /// Total price of the invoice line.
    pub price: f64,

    #[serde(rename = "unitPrice")]
    pub unit_price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(rename = "priceHT", default, skip_serializing_if = "Option::is_none")]
    pub price_ht: Option<f64>,

    #[serde(rename = "priceTTC", default, skip_serializing_if = "Option::is_none")]
    pub price_ttc: Option<f64>,

    #[serde(rename = "isBio", default)]
    pub is_bio: bool,

    #[serde(rename = "isEgalim", default)]
    pub is_egalim: bool,
}

impl Ingredient {
    /// Build an ingredient from a manual entry.
    ///
    /// Pre-tax price is `quantity * unit_price`; the total price is the
    /// post-tax amount with food VAT applied.
    pub fn manual(
        name: impl Into<String>,
        quantity: f64,
        unit: Unit,
        unit_price: f64,
        origin: Option<String>,
        is_bio: bool,
        is_egalim: bool,
    ) -> Self {
        let price_ht = quantity * unit_price;
        let price_ttc = price_ht * (1.0 + FOOD_VAT_RATE);
        Self {
            id: super::generate_id(),
            name: name.into(),
            category: None,
            quantity,
            unit,
            price: price_ttc,
            unit_price,
            origin: origin.filter(|o| !o.trim().is_empty()),
            price_ht: Some(price_ht),
            price_ttc: Some(price_ttc),
            is_bio,
            is_egalim,
        }
    }

    /// Key used by the category memory: trimmed, lowercased name.
    pub fn memory_key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Short one-line description for listings.
    pub fn summary(&self) -> String {
        let mut tags = Vec::new();
        if self.is_bio {
            tags.push("BIO");
        }
        if self.is_egalim {
            tags.push("EGALIM");
        }
        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join(", "))
        };
        format!(
            "{} - {} {} @ {:.2}€ = {:.2}€{}",
            self.name, self.quantity, self.unit, self.unit_price, self.price, tags
        )
    }
}
