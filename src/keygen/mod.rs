//! Key synthesis with collision avoidance
//!
//! Every literal of a file gets a dotted key: an existing catalog entry with
//! the same text is reused; otherwise the key is composed from an explicit
//! prefix or a path-derived suggestion plus the camel-cased translator
//! token, then suffixed with an occurrence counter until it neither shadows
//! a different value nor collides with an occupied key.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::catalog::CatalogStore;
use crate::error::Result;

/// Key decision for one literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub key: String,
    /// Whether the catalog gains a new entry for this literal
    pub need_write: bool,
}

fn pages_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"/pages/[^/]+/([^/]+)/([^/]+)\.[^./]+$").expect("Invalid regex pattern")
    })
}

/// Synthesize keys for the forward-ordered literals of one file
///
/// `texts` and `tokens` are index-aligned: the i-th token is the
/// translator's output for the i-th literal. The store is read-only here;
/// the returned assignments with `need_write` are the caller's staging list.
/// Keys assigned earlier in the file are visible to the collision loop of
/// later literals, so two distinct texts can never claim the same key (K2).
pub fn synthesize_keys(
    store: &CatalogStore,
    path: &Path,
    prefix: Option<&str>,
    texts: &[String],
    tokens: &[String],
) -> Result<Vec<Assignment>> {
    debug_assert_eq!(texts.len(), tokens.len());

    let mut memo: HashMap<&str, Assignment> = HashMap::new();
    let mut staged: HashMap<String, String> = HashMap::new();
    let mut out = Vec::with_capacity(texts.len());

    for (text, token) in texts.iter().zip(tokens) {
        if let Some(assignment) = memo.get(text.as_str()) {
            // repeated literal in the same file reuses the key
            out.push(Assignment {
                key: assignment.key.clone(),
                need_write: false,
            });
            continue;
        }

        let assignment = if let Some(existing) = store.lookup_by_value(text) {
            Assignment {
                key: existing.replace('-', "_"),
                need_write: false,
            }
        } else {
            let base = match prefix {
                Some(p) => format!("{p}.{}", camel_case(token)),
                None => format!(
                    "{}.{}",
                    path_suggestion(path).join("."),
                    camel_case(token)
                ),
            }
            .replace('-', "_");

            let mut occur = 1usize;
            loop {
                let candidate = candidate_for(&base, occur);
                match lookup(&staged, store, &candidate) {
                    Some(bound) if bound == text => break,
                    None => break,
                    Some(_) => occur += 1,
                }
            }
            let key = candidate_for(&base, occur);
            let need_write = lookup(&staged, store, &key).is_none();
            if need_write {
                staged.insert(key.clone(), text.clone());
            }
            Assignment { key, need_write }
        };

        memo.insert(text.as_str(), assignment.clone());
        out.push(assignment);
    }

    Ok(out)
}

/// Key lookup across this file's staged assignments and the shared store
fn lookup<'a>(
    staged: &'a HashMap<String, String>,
    store: &'a CatalogStore,
    key: &str,
) -> Option<&'a str> {
    staged
        .get(key)
        .map(String::as_str)
        .or_else(|| store.lookup_by_key(key))
}

fn candidate_for(base: &str, occur: usize) -> String {
    if occur == 1 {
        base.to_string()
    } else {
        format!("{base}{occur}")
    }
}

/// Path-derived key suggestion
///
/// A `/pages/<any>/<segA>/<segB>.<ext>` path suggests `[segA, segB]`;
/// otherwise the enclosing directory and the file stem (collapsed to one
/// segment when equal), all with hyphens turned into underscores.
#[must_use]
pub fn path_suggestion(path: &Path) -> Vec<String> {
    let normalized = path.to_string_lossy().replace('\\', "/");

    if let Some(captures) = pages_re().captures(&normalized) {
        return vec![
            captures[1].replace('-', "_"),
            captures[2].replace('-', "_"),
        ];
    }

    let file_base = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("index")
        .replace('-', "_");
    let dir_name = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .replace('-', "_");

    if dir_name.is_empty() || dir_name == file_base {
        vec![if dir_name.is_empty() { file_base } else { dir_name }]
    } else {
        vec![dir_name, file_base]
    }
}

/// Camel-case a translator token (`"confirm delete"` → `"confirmDelete"`)
#[must_use]
pub fn camel_case(token: &str) -> String {
    let mut out = String::new();
    for (i, word) in token
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        if i == 0 {
            out.push_str(&word.to_lowercase());
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(&chars.as_str().to_lowercase());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("ti jiao"), "tiJiao");
        assert_eq!(camel_case("Confirm Delete"), "confirmDelete");
        assert_eq!(camel_case("submit"), "submit");
        assert_eq!(camel_case("que-ding"), "queDing");
    }

    #[test]
    fn test_path_suggestion_pages_rule() {
        let suggestion = path_suggestion(Path::new("/src/pages/admin/user/detail.vue"));
        assert_eq!(suggestion, vec!["user", "detail"]);
    }

    #[test]
    fn test_path_suggestion_dir_and_stem() {
        let suggestion = path_suggestion(Path::new("/src/components/nav-bar.tsx"));
        assert_eq!(suggestion, vec!["components", "nav_bar"]);
    }

    #[test]
    fn test_path_suggestion_collapses_equal_segments() {
        let suggestion = path_suggestion(Path::new("/src/login/login.ts"));
        assert_eq!(suggestion, vec!["login"]);
    }

    #[test]
    fn test_new_key_from_translator_token() {
        let store = CatalogStore::new();
        let assignments = synthesize_keys(
            &store,
            Path::new("/src/common/form.ts"),
            None,
            &texts(&["提交"]),
            &texts(&["ti jiao"]),
        )
        .unwrap();
        assert_eq!(assignments[0].key, "common.form.tiJiao");
        assert!(assignments[0].need_write);
    }

    #[test]
    fn test_existing_value_reused_without_write() {
        let mut store = CatalogStore::new();
        store.insert("common.quXiao", "取消");
        let assignments = synthesize_keys(
            &store,
            Path::new("/src/other/place.ts"),
            None,
            &texts(&["取消"]),
            &texts(&["qu xiao"]),
        )
        .unwrap();
        assert_eq!(assignments[0].key, "common.quXiao");
        assert!(!assignments[0].need_write);
    }

    #[test]
    fn test_collision_appends_occurrence_suffix() {
        let mut store = CatalogStore::new();
        store.insert("pages.user.queRen", "确认删除");
        let assignments = synthesize_keys(
            &store,
            Path::new("/src/pages/a/user/list.ts"),
            Some("pages.user"),
            &texts(&["确认"]),
            &texts(&["que ren"]),
        )
        .unwrap();
        assert_eq!(assignments[0].key, "pages.user.queRen2");
        assert!(assignments[0].need_write);
        // the occupied key is untouched
        assert_eq!(store.lookup_by_key("pages.user.queRen"), Some("确认删除"));
    }

    #[test]
    fn test_collision_walks_past_taken_suffixes() {
        let mut store = CatalogStore::new();
        store.insert("common.a.key", "一");
        store.insert("common.a.key2", "二");
        let assignments = synthesize_keys(
            &store,
            Path::new("/src/common/a.ts"),
            Some("common.a"),
            &texts(&["三"]),
            &texts(&["key"]),
        )
        .unwrap();
        assert_eq!(assignments[0].key, "common.a.key3");
    }

    #[test]
    fn test_suffixed_key_with_matching_value_reused() {
        let mut store = CatalogStore::new();
        store.insert("common.a.key", "一");
        store.insert("common.a.key2", "二");
        let assignments = synthesize_keys(
            &store,
            Path::new("/src/common/a.ts"),
            Some("common.a"),
            &texts(&["二"]),
            &texts(&["key"]),
        )
        .unwrap();
        // lookup-by-value wins before any suffix walking happens
        assert_eq!(assignments[0].key, "common.a.key2");
        assert!(!assignments[0].need_write);
    }

    #[test]
    fn test_repeated_literal_shares_key_one_write() {
        let store = CatalogStore::new();
        let assignments = synthesize_keys(
            &store,
            Path::new("/src/common/form.ts"),
            None,
            &texts(&["保存", "保存"]),
            &texts(&["bao cun", "bao cun"]),
        )
        .unwrap();
        assert_eq!(assignments[0].key, assignments[1].key);
        assert!(assignments[0].need_write);
        assert!(!assignments[1].need_write);
    }

    #[test]
    fn test_distinct_texts_same_base_in_one_file() {
        let store = CatalogStore::new();
        let assignments = synthesize_keys(
            &store,
            Path::new("/src/common/form.ts"),
            None,
            &texts(&["确认", "确定"]),
            &texts(&["que ren", "que ren"]),
        )
        .unwrap();
        assert_eq!(assignments[0].key, "common.form.queRen");
        assert_eq!(assignments[1].key, "common.form.queRen2");
        assert!(assignments[1].need_write);
    }

    #[test]
    fn test_existing_key_hyphens_normalized() {
        let mut store = CatalogStore::new();
        store.insert("nav-bar.title", "标题");
        let assignments = synthesize_keys(
            &store,
            Path::new("/src/x/y.ts"),
            None,
            &texts(&["标题"]),
            &texts(&["biao ti"]),
        )
        .unwrap();
        assert_eq!(assignments[0].key, "nav_bar.title");
        assert!(!assignments[0].need_write);
    }
}
