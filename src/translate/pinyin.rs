//! Local pinyin romanization provider (the default)
//!
//! No network: Chinese characters become space-separated pinyin syllables,
//! ASCII letters pass through. Fragments are batched with a `'$'` delimiter,
//! which romanization leaves untouched.

use async_trait::async_trait;
use pinyin::ToPinyin;

use crate::error::Result;
use crate::translate::KeyTranslator;

/// Batch delimiter; survives romanization unchanged
const DELIMITER: char = '$';

#[derive(Debug, Default)]
pub struct PinyinTranslator;

impl PinyinTranslator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn romanize(text: &str) -> String {
        let mut out = String::new();
        for (c, syllable) in text.chars().zip(text.to_pinyin()) {
            match syllable {
                Some(p) => {
                    if !out.is_empty() && !out.ends_with(' ') && !out.ends_with(DELIMITER) {
                        out.push(' ');
                    }
                    out.push_str(p.plain());
                    out.push(' ');
                }
                None => out.push(c),
            }
        }
        out.trim().to_string()
    }
}

#[async_trait]
impl KeyTranslator for PinyinTranslator {
    async fn translate_batch(&self, fragments: &[String]) -> Result<Vec<String>> {
        if fragments.is_empty() {
            return Ok(Vec::new());
        }
        let joined = fragments.join(&DELIMITER.to_string());
        let romanized = Self::romanize(&joined);
        Ok(romanized
            .split(DELIMITER)
            .map(|s| s.trim().to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_single_fragment() {
        let translator = PinyinTranslator::new();
        let tokens = translator
            .translate_batch(&[String::from("提交")])
            .await
            .unwrap();
        assert_eq!(tokens, vec!["ti jiao"]);
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_length() {
        let translator = PinyinTranslator::new();
        let fragments = vec![
            String::from("确定"),
            String::from("取消"),
            String::from("删除"),
        ];
        let tokens = translator.translate_batch(&fragments).await.unwrap();
        assert_eq!(tokens, vec!["que ding", "qu xiao", "shan chu"]);
    }

    #[tokio::test]
    async fn test_ascii_passthrough() {
        let translator = PinyinTranslator::new();
        let tokens = translator
            .translate_batch(&[String::from("确认ok")])
            .await
            .unwrap();
        assert_eq!(tokens, vec!["que ren ok"]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let translator = PinyinTranslator::new();
        let tokens = translator.translate_batch(&[]).await.unwrap();
        assert!(tokens.is_empty());
    }
}
