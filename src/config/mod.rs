//! Project configuration for the extraction pipeline
//!
//! Configuration lives in a `kiwi-config.json` file at the project root. All
//! fields are optional; missing fields fall back to the defaults below, and a
//! missing file yields the full default configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up from the working directory
pub const CONFIG_FILE: &str = "kiwi-config.json";

/// Recognized translate-key providers
pub const KNOWN_PROVIDERS: &[&str] = &["Pinyin", "Google", "Baidu"];

/// Project configuration, deserialized from `kiwi-config.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KiwiConfig {
    /// Language-pack directory, absolute or cwd-relative
    pub kiwi_dir: PathBuf,

    /// Source locale; subdirectory of `kiwi_dir` holding the catalog files
    pub src_lang: String,

    /// Catalog file extension (`ts` or `js`)
    pub file_type: String,

    /// Directory-name globs skipped during the walk
    pub ignore_dir: Vec<String>,

    /// File-name globs skipped during the walk
    pub ignore_file: Vec<String>,

    /// Translate-key provider: `Pinyin`, `Google` or `Baidu`
    pub default_translate_key_api: String,

    /// Import statement injected into rewritten files
    #[serde(rename = "importI18N")]
    pub import_i18n: String,

    /// Component-framework version: `vue2` or `vue3`
    pub vue_version: String,
}

impl Default for KiwiConfig {
    fn default() -> Self {
        Self {
            kiwi_dir: PathBuf::from("./.kiwi"),
            src_lang: String::from("zh-CN"),
            file_type: String::from("ts"),
            ignore_dir: vec![String::from("node_modules")],
            ignore_file: Vec::new(),
            default_translate_key_api: String::from("Pinyin"),
            import_i18n: String::from("import I18N from 'src/utils/I18N';"),
            vue_version: String::from("vue2"),
        }
    }
}

impl KiwiConfig {
    /// Load configuration from `<root>/kiwi-config.json`
    ///
    /// A missing file is not an error; it yields [`KiwiConfig::default`].
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !KNOWN_PROVIDERS.contains(&self.default_translate_key_api.as_str()) {
            anyhow::bail!(
                "unknown defaultTranslateKeyApi `{}`, expected one of {}",
                self.default_translate_key_api,
                KNOWN_PROVIDERS.join(", ")
            );
        }

        if self.vue_version != "vue2" && self.vue_version != "vue3" {
            anyhow::bail!(
                "unknown vueVersion `{}`, expected `vue2` or `vue3`",
                self.vue_version
            );
        }

        if self.file_type != "ts" && self.file_type != "js" {
            anyhow::bail!("unknown fileType `{}`, expected `ts` or `js`", self.file_type);
        }

        Ok(())
    }

    /// Directory holding the source-locale catalog files
    #[must_use]
    pub fn lang_dir(&self) -> PathBuf {
        self.kiwi_dir.join(&self.src_lang)
    }

    /// Absolute form of the language-pack directory, for walk exclusion
    pub fn abs_kiwi_dir(&self) -> PathBuf {
        if self.kiwi_dir.is_absolute() {
            self.kiwi_dir.clone()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&self.kiwi_dir))
                .unwrap_or_else(|_| self.kiwi_dir.clone())
        }
    }

    /// Path of the aggregator file (`index.<fileType>`)
    #[must_use]
    pub fn aggregator_path(&self) -> PathBuf {
        self.lang_dir().join(format!("index.{}", self.file_type))
    }

    /// Path of a namespace file (`<namespace>.<fileType>`)
    #[must_use]
    pub fn namespace_path(&self, namespace: &str) -> PathBuf {
        self.lang_dir()
            .join(format!("{namespace}.{}", self.file_type))
    }

    /// Whether the component-file extractor should use the version-3 parser
    #[must_use]
    pub fn is_vue3(&self) -> bool {
        self.vue_version == "vue3"
    }
}
