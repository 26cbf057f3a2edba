//! Invoice scanning: hand a file to an extraction service and feed the
//! returned lines into the store.

mod gemini;
mod parse;

pub use gemini::GeminiExtractor;
pub use parse::{line_to_ingredient, parse_generate_response, strip_code_fence};

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{CantineError, Result};
use crate::models::Ingredient;
use crate::state::{CuisineStore, KeyValueStorage};

/// An image or document to extract invoice lines from.
#[derive(Debug, Clone)]
pub struct InvoiceFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl InvoiceFile {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let mime_type = mime_type_for(path).ok_or_else(|| {
            CantineError::InvalidInput(format!("Unsupported invoice file type: {:?}", path))
        })?;
        Ok(Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            mime_type: mime_type.to_string(),
            bytes,
        })
    }
}

fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    Some(match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        _ => return None,
    })
}

/// Turns an invoice into ingredient records.
///
/// Implementations return the complete list or an error; callers never see
/// a partial result.
pub trait InvoiceExtractor {
    fn extract(&self, file: &InvoiceFile) -> Result<Vec<Ingredient>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Added(usize),
    NothingDetected,
}

/// Extract `file` and append the lines to the store.
///
/// An empty extraction leaves the store untouched. Errors leave previously
/// scanned ingredients as they were.
pub fn scan_invoice<E, S>(
    extractor: &E,
    file: &InvoiceFile,
    store: &mut CuisineStore<S>,
) -> Result<ScanOutcome>
where
    E: InvoiceExtractor + ?Sized,
    S: KeyValueStorage,
{
    let items = extractor.extract(file).inspect_err(|e| {
        warn!(file = %file.name, error = %e, "invoice extraction failed");
    })?;

    if items.is_empty() {
        info!(file = %file.name, "no ingredients detected");
        return Ok(ScanOutcome::NothingDetected);
    }

    let count = items.len();
    store.add_ingredients(items);
    Ok(ScanOutcome::Added(count))
}
