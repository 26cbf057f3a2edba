use serde_json::Value;

use crate::error::{CantineError, Result};
use crate::models::{generate_id, Ingredient, Unit};

const UNKNOWN_PRODUCT: &str = "Produit inconnu";

/// Pull the invoice lines out of a `generateContent` response body.
pub fn parse_generate_response(payload: &Value) -> Result<Vec<Ingredient>> {
    let text = payload["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| CantineError::Extraction("Empty response from the model".to_string()))?;

    let lines: Vec<Value> = serde_json::from_str(strip_code_fence(text)).map_err(|e| {
        CantineError::Extraction(format!("Response is not a JSON array of lines: {e}"))
    })?;

    Ok(lines.iter().map(line_to_ingredient).collect())
}

/// Remove a surrounding Markdown code fence (```json ... ```), if any.
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest.strip_prefix("json").unwrap_or(rest);
        body = body.strip_suffix("```").unwrap_or(body);
    }
    body.trim()
}

/// Normalise one extracted line. Missing or unusable fields fall back to
/// defaults rather than failing the whole invoice.
pub fn line_to_ingredient(line: &Value) -> Ingredient {
    let name = line["name"]
        .as_str()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(UNKNOWN_PRODUCT)
        .to_string();
    let quantity = number(&line["quantity"]).unwrap_or(1.0);
    let unit = line["unit"].as_str().map(Unit::normalize).unwrap_or_default();
    let price = number(&line["price"]).unwrap_or(0.0);
    let unit_price = number(&line["unitPrice"]).unwrap_or(0.0);
    let origin = line["origin"]
        .as_str()
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string);

    Ingredient {
        id: generate_id(),
        name,
        category: None,
        quantity,
        unit,
        price,
        unit_price,
        origin,
        price_ht: Some(unit_price * quantity),
        price_ttc: Some(price),
        is_bio: truthy(&line["isBio"]),
        is_egalim: truthy(&line["isEgalim"]),
    }
}

/// A non-zero finite number, accepting numeric strings with `,` or `.`.
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }?;
    (n.is_finite() && n != 0.0).then_some(n)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    }
}
