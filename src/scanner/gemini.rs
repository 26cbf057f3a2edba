use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::config::ExtractionConfig;
use crate::error::{CantineError, Result};
use crate::models::Ingredient;
use crate::scanner::parse::parse_generate_response;
use crate::scanner::{InvoiceExtractor, InvoiceFile};

const EXTRACTION_PROMPT: &str = r#"
Analyse cette facture ou liste d'inventaire alimentaire.
Extrais chaque produit alimentaire sous forme d'un tableau JSON strict.

Pour chaque produit, retourne un objet avec :
- name : nom du produit (string)
- quantity : quantité numérique (number), 1 si absente
- unit : une unité parmi 'kg', 'g', 'l', 'u' (string) ; convertis si besoin ('ml' -> 'l', 'pièce' -> 'u')
- price : prix TOTAL TTC de la ligne (number)
- unitPrice : prix unitaire HT, calculé si absent (number)
- origin : pays d'origine si indiqué, sinon vide (string)
- isBio : true si le produit est BIO / Agriculture Biologique (boolean)
- isEgalim : true si le produit est conforme EGALIM (Label Rouge, AOP/AOC, HVE, Pêche Durable ou Bio) (boolean)

Retourne UNIQUEMENT le JSON brut, sans balises markdown, sous la forme [{...}, {...}].
"#;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Transport errors lose their URL before they reach logs or the user.
fn http_error(e: reqwest::Error) -> CantineError {
    CantineError::Http(e.without_url())
}

/// Extraction through the Gemini `generateContent` endpoint.
pub struct GeminiExtractor {
    client: Client,
    url: String,
    api_key: String,
}

impl GeminiExtractor {
    /// Build a client from config. Fails before any network I/O when the
    /// API key is missing.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::with_key(config, api_key)
    }

    fn with_key(config: &ExtractionConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let url = format!(
            "{}/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        );
        Ok(Self {
            client,
            url,
            api_key,
        })
    }

    /// The key travels in a header so it never shows up in a URL.
    fn request(&self, file: &InvoiceFile) -> RequestBuilder {
        self.client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&Self::request_body(file))
    }

    fn request_body(file: &InvoiceFile) -> Value {
        json!({
            "contents": [{
                "parts": [
                    { "text": EXTRACTION_PROMPT },
                    { "inline_data": {
                        "mime_type": file.mime_type,
                        "data": STANDARD.encode(&file.bytes),
                    }},
                ]
            }]
        })
    }
}

impl InvoiceExtractor for GeminiExtractor {
    #[instrument(skip(self, file), fields(file = %file.name, bytes = file.bytes.len()))]
    fn extract(&self, file: &InvoiceFile) -> Result<Vec<Ingredient>> {
        let response = self.request(file).send().map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CantineError::Extraction(format!("API error: {status}")));
        }

        let payload: Value = response.json().map_err(http_error)?;
        let items = parse_generate_response(&payload)?;
        debug!(lines = items.len(), "invoice extracted");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "SECRET-KEY-123";

    fn png() -> InvoiceFile {
        InvoiceFile {
            name: "f.png".into(),
            mime_type: "image/png".into(),
            bytes: b"abc".to_vec(),
        }
    }

    fn extractor(endpoint: &str) -> GeminiExtractor {
        let config = ExtractionConfig {
            endpoint: endpoint.to_string(),
            timeout_secs: 5,
            ..ExtractionConfig::default()
        };
        GeminiExtractor::with_key(&config, KEY.to_string()).unwrap()
    }

    #[test]
    fn test_api_key_sent_as_header() {
        let request = extractor("https://example.invalid/v1beta/models")
            .request(&png())
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://example.invalid/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(request.url().query(), None);
        assert_eq!(request.headers()[API_KEY_HEADER], KEY);
    }

    #[test]
    fn test_transport_error_does_not_leak_api_key() {
        // Nothing listens on the discard port.
        let err = extractor("http://127.0.0.1:9/v1beta/models")
            .extract(&png())
            .unwrap_err();

        assert!(matches!(err, CantineError::Http(_)));
        let shown = format!("Erreur lors de l'analyse de la facture: {err}");
        assert!(!shown.contains(KEY));
        assert!(!format!("{err:?}").contains(KEY));
    }

    #[test]
    fn test_request_body_inlines_file() {
        let file = png();
        let body = GeminiExtractor::request_body(&file);
        let inline = &body["contents"][0]["parts"][1]["inline_data"];
        assert_eq!(inline["mime_type"], "image/png");
        assert_eq!(inline["data"], "YWJj");
    }
}
