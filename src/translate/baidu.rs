//! Baidu translate provider
//!
//! Credentials come from the `BAIDU_APPID`/`BAIDU_APPKEY` environment
//! variables. The API accepts one query per request, so a batch is issued as
//! concurrent single calls whose results are collected back in order.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{Result, TranslateError};
use crate::translate::KeyTranslator;

const ENDPOINT: &str = "https://fanyi-api.baidu.com/api/trans/vip/translate";

#[derive(Debug, Deserialize)]
struct BaiduResponse {
    #[serde(default)]
    trans_result: Vec<BaiduResult>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BaiduResult {
    dst: String,
}

pub struct BaiduTranslator {
    client: Client,
    endpoint: String,
    appid: String,
    appkey: String,
}

impl BaiduTranslator {
    pub fn new(appid: impl Into<String>, appkey: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(TranslateError::Http)?;
        Ok(Self {
            client,
            endpoint: ENDPOINT.to_string(),
            appid: appid.into(),
            appkey: appkey.into(),
        })
    }

    /// Read credentials from `BAIDU_APPID`/`BAIDU_APPKEY`
    pub fn from_env() -> Result<Self> {
        let appid = std::env::var("BAIDU_APPID").map_err(|_| {
            TranslateError::Malformed(String::from("BAIDU_APPID not set in environment"))
        })?;
        let appkey = std::env::var("BAIDU_APPKEY").map_err(|_| {
            TranslateError::Malformed(String::from("BAIDU_APPKEY not set in environment"))
        })?;
        Self::new(appid, appkey)
    }

    /// Point the provider at a different endpoint (tests, proxies)
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn request(&self, query: &str, salt: u64) -> Result<String> {
        let sign = format!(
            "{:x}",
            md5::compute(format!("{}{}{}{}", self.appid, query, salt, self.appkey))
        );
        let salt = salt.to_string();

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[
                ("q", query),
                ("from", "zh"),
                ("to", "en"),
                ("appid", &self.appid),
                ("salt", &salt),
                ("sign", &sign),
            ])
            .send()
            .await
            .map_err(TranslateError::Http)?
            .error_for_status()
            .map_err(TranslateError::Http)?;

        let payload: BaiduResponse = response.json().await.map_err(TranslateError::Http)?;

        if let Some(code) = payload.error_code {
            return Err(TranslateError::Malformed(format!(
                "baidu error {code}: {}",
                payload.error_msg.unwrap_or_default()
            ))
            .into());
        }

        payload
            .trans_result
            .into_iter()
            .next()
            .map(|r| r.dst)
            .ok_or_else(|| TranslateError::Malformed(String::from("empty trans_result")).into())
    }
}

#[async_trait]
impl KeyTranslator for BaiduTranslator {
    async fn translate_batch(&self, fragments: &[String]) -> Result<Vec<String>> {
        if fragments.is_empty() {
            return Ok(Vec::new());
        }

        // concurrent single calls, collected in submission order
        let calls = fragments
            .iter()
            .enumerate()
            .map(|(i, fragment)| self.request(fragment, 10_000 + i as u64));
        let tokens = try_join_all(calls).await?;

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
