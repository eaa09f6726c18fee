//! Google translate provider
//!
//! Fragments are joined with `'\n'` into one request; the response's
//! translated segments are split back on the same delimiter, so the i-th
//! token still belongs to the i-th fragment.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::{Result, TranslateError};
use crate::translate::KeyTranslator;

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Batch delimiter for the single-request protocol
const DELIMITER: char = '\n';

pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(TranslateError::Http)?;
        Ok(Self {
            client,
            endpoint: ENDPOINT.to_string(),
        })
    }

    /// Point the provider at a different endpoint (tests, proxies)
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn request(&self, query: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "zh-CN"),
                ("tl", "en"),
                ("dt", "t"),
                ("q", query),
            ])
            .send()
            .await
            .map_err(TranslateError::Http)?
            .error_for_status()
            .map_err(TranslateError::Http)?;

        let payload: Value = response.json().await.map_err(TranslateError::Http)?;

        // payload[0] is a list of [translated, original, ...] segments
        let segments = payload
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| TranslateError::Malformed(String::from("missing segment list")))?;

        let mut text = String::new();
        for segment in segments {
            if let Some(piece) = segment.get(0).and_then(Value::as_str) {
                text.push_str(piece);
            }
        }
        Ok(text)
    }
}

#[async_trait]
impl KeyTranslator for GoogleTranslator {
    async fn translate_batch(&self, fragments: &[String]) -> Result<Vec<String>> {
        if fragments.is_empty() {
            return Ok(Vec::new());
        }

        let joined = fragments.join(&DELIMITER.to_string());
        let translated = self.request(&joined).await?;

        let tokens: Vec<String> = translated
            .split(DELIMITER)
            .map(|s| s.trim().to_string())
            .collect();

        if tokens.len() != fragments.len() {
            return Err(TranslateError::LengthMismatch {
                want: fragments.len(),
                got: tokens.len(),
            }
            .into());
        }
        Ok(tokens)
    }
}
