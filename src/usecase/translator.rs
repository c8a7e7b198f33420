use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

/// Per-request display locale, read from the `lang` cookie. Georgian is the
/// default; only English triggers translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Ka,
    En,
}

impl Locale {
    pub fn from_lang_cookie(value: Option<&str>) -> Self {
        match value {
            Some("en") => Locale::En,
            _ => Locale::Ka,
        }
    }
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Clone)]
pub struct TranslatorClient {
    client: Client,
    base_url: String,
}

impl TranslatorClient {
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("TravelSpots/1.0")
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build translator http client");
        Self { client, base_url }
    }

    /// Translates `text` for the given locale. Every failure mode — timeout,
    /// transport error, non-2xx, unparseable body — degrades to the original
    /// text; translation never fails the enclosing request.
    pub async fn translate(&self, text: &str, locale: Locale) -> String {
        if locale != Locale::En || text.is_empty() {
            return text.to_string();
        }

        let url = format!("{}/translate", self.base_url);
        let body = serde_json::json!({
            "q": text,
            "source": "auto",
            "target": "en",
            "format": "text",
        });

        let resp = match self.client.post(&url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "translation request failed, keeping original text");
                return text.to_string();
            }
        };

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "translation service error, keeping original text");
            return text.to_string();
        }

        match resp.json::<TranslateResponse>().await {
            Ok(data) => data.translated_text,
            Err(e) => {
                tracing::warn!(error = %e, "translation response parse failed, keeping original text");
                text.to_string()
            }
        }
    }

    /// Convenience for optional fields like rating comments.
    pub async fn translate_opt(&self, text: Option<&str>, locale: Locale) -> Option<String> {
        match text {
            Some(t) => Some(self.translate(t, locale).await),
            None => None,
        }
    }
}
