//! Key-translation providers
//!
//! The pipeline consumes a [`KeyTranslator`] capability: given the literals
//! of one file in source order, return one English candidate token per
//! literal. Providers differ only in batching (Google joins fragments with
//! `'\n'`, Pinyin with `'$'`) or concurrency (Baidu issues one call per
//! fragment); the pipeline itself is provider-agnostic.

pub mod baidu;
pub mod google;
pub mod pinyin;

use async_trait::async_trait;

use crate::config::KiwiConfig;
use crate::error::{Result, TranslateError};

pub use baidu::BaiduTranslator;
pub use google::GoogleTranslator;
pub use pinyin::PinyinTranslator;

/// Sentinel fragment used when a literal has no translatable characters
pub const EMPTY_FRAGMENT: &str = "中文符号";

/// Capability consumed by the key synthesizer
#[async_trait]
pub trait KeyTranslator: Send + Sync {
    /// Translate a batch of prepared fragments, one token per fragment
    ///
    /// The i-th output belongs to the i-th input; implementations must
    /// preserve order and length.
    async fn translate_batch(&self, fragments: &[String]) -> Result<Vec<String>>;
}

/// Build the provider selected by `defaultTranslateKeyApi`
pub fn provider_from_config(config: &KiwiConfig) -> Result<Box<dyn KeyTranslator>> {
    match config.default_translate_key_api.as_str() {
        "Pinyin" => Ok(Box::new(PinyinTranslator::new())),
        "Google" => Ok(Box::new(GoogleTranslator::new()?)),
        "Baidu" => Ok(Box::new(BaiduTranslator::from_env()?)),
        other => Err(TranslateError::UnknownProvider(other.to_string()).into()),
    }
}

/// Reduce a literal to the fragment submitted to the provider
///
/// Keeps only Chinese characters and ASCII letters, truncates to the first
/// five characters, and falls back to [`EMPTY_FRAGMENT`] when nothing
/// survives.
#[must_use]
pub fn prepare_fragment(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| crate::extract::is_chinese_char(*c) || c.is_ascii_alphabetic())
        .take(5)
        .collect();
    if kept.is_empty() {
        EMPTY_FRAGMENT.to_string()
    } else {
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_fragment_filters_and_truncates() {
        assert_eq!(prepare_fragment("确认删除吗？真的"), "确认删除吗");
        assert_eq!(prepare_fragment("共${n}条"), "共n条");
        assert_eq!(prepare_fragment("你好ok"), "你好ok");
    }

    #[test]
    fn test_prepare_fragment_empty_sentinel() {
        assert_eq!(prepare_fragment("123！？"), EMPTY_FRAGMENT);
        assert_eq!(prepare_fragment(""), EMPTY_FRAGMENT);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = KiwiConfig {
            default_translate_key_api: String::from("Bing"),
            ..Default::default()
        };
        assert!(provider_from_config(&config).is_err());
    }

    #[test]
    fn test_default_provider_is_pinyin() {
        let config = KiwiConfig::default();
        assert!(provider_from_config(&config).is_ok());
    }
}
