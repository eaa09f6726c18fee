//! Ordered object trees backing the catalog files
//!
//! A namespace file holds `export default { … }` whose leaves are the
//! preserved Chinese strings. The tree keeps insertion order so re-emitting
//! a file never reshuffles existing entries; rendering matches the catalog
//! format contract (single quotes, trailing commas, two-space indent).

use std::path::Path;

use crate::error::{CatalogError, Result};
use crate::extract::ecma::{self, ScriptKind};

/// A value in the tree: a string leaf or a nested branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(String),
    Branch(Tree),
}

/// Insertion-ordered string tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<(String, Node)>,
}

impl Tree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Leaf value at a dotted path, if one is bound there
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&str> {
        let mut tree = self;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let node = tree.entries.iter().find(|(k, _)| k == segment)?;
            match (&node.1, segments.peek()) {
                (Node::Leaf(value), None) => return Some(value),
                (Node::Branch(inner), Some(_)) => tree = inner,
                _ => return None,
            }
        }
        None
    }

    /// Bind a leaf at a dotted path, creating branches as needed
    ///
    /// An existing node of the wrong shape along the way is replaced, the
    /// way a JavaScript deep-set would overwrite it.
    pub fn set_path(&mut self, path: &str, value: &str) {
        let segments: Vec<&str> = path.split('.').collect();
        let mut tree = self;
        for (i, segment) in segments.iter().enumerate() {
            let last = i + 1 == segments.len();
            let pos = tree.entries.iter().position(|(k, _)| k == segment);
            match pos {
                Some(p) => {
                    if last {
                        tree.entries[p].1 = Node::Leaf(value.to_string());
                        return;
                    }
                    if !matches!(tree.entries[p].1, Node::Branch(_)) {
                        tree.entries[p].1 = Node::Branch(Tree::new());
                    }
                    let Node::Branch(ref mut inner) = tree.entries[p].1 else {
                        unreachable!()
                    };
                    tree = inner;
                }
                None => {
                    if last {
                        tree.entries
                            .push((segment.to_string(), Node::Leaf(value.to_string())));
                        return;
                    }
                    tree.entries
                        .push((segment.to_string(), Node::Branch(Tree::new())));
                    let Node::Branch(ref mut inner) = tree.entries.last_mut().unwrap().1 else {
                        unreachable!()
                    };
                    tree = inner;
                }
            }
        }
    }

    /// Flatten into dotted `key -> value` pairs, in insertion order
    #[must_use]
    pub fn flatten(&self, prefix: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (key, node) in &self.entries {
            let full = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match node {
                Node::Leaf(value) => out.push((full, value.clone())),
                Node::Branch(inner) => out.extend(inner.flatten(&full)),
            }
        }
        out
    }

    /// Parse the default export of a namespace file
    pub fn parse(path: &Path, source: &str) -> Result<Self> {
        use swc_ecma_ast::{Expr, Lit, ModuleDecl, ModuleItem, ObjectLit, Prop, PropName, PropOrSpread};

        let parsed = ecma::parse(path, source, ScriptKind::TypedScript)?;

        let object = parsed
            .module
            .body
            .iter()
            .find_map(|item| match item {
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                    match &*export.expr {
                        Expr::Object(obj) => Some(obj.clone()),
                        _ => None,
                    }
                }
                _ => None,
            })
            .ok_or_else(|| CatalogError::Malformed {
                path: path.to_path_buf(),
                message: String::from("no default-exported object"),
            })?;

        fn build(path: &Path, object: &ObjectLit) -> Result<Tree> {
            let mut tree = Tree::new();
            for prop in &object.props {
                let PropOrSpread::Prop(prop) = prop else {
                    return Err(CatalogError::Malformed {
                        path: path.to_path_buf(),
                        message: String::from("spread in catalog object"),
                    }
                    .into());
                };
                let Prop::KeyValue(kv) = &**prop else {
                    return Err(CatalogError::Malformed {
                        path: path.to_path_buf(),
                        message: String::from("non key-value property"),
                    }
                    .into());
                };
                let key = match &kv.key {
                    PropName::Ident(ident) => ident.sym.to_string(),
                    PropName::Str(s) => s.value.to_string(),
                    PropName::Num(n) => n.value.to_string(),
                    _ => {
                        return Err(CatalogError::Malformed {
                            path: path.to_path_buf(),
                            message: String::from("computed property key"),
                        }
                        .into())
                    }
                };
                let node = match &*kv.value {
                    Expr::Lit(Lit::Str(s)) => Node::Leaf(s.value.to_string()),
                    Expr::Tpl(tpl) if tpl.exprs.is_empty() && tpl.quasis.len() == 1 => {
                        Node::Leaf(tpl.quasis[0].cooked.as_ref().map_or_else(
                            || tpl.quasis[0].raw.to_string(),
                            |c| c.to_string(),
                        ))
                    }
                    Expr::Object(inner) => Node::Branch(build(path, inner)?),
                    _ => {
                        return Err(CatalogError::Malformed {
                            path: path.to_path_buf(),
                            message: format!("unsupported value for key `{key}`"),
                        }
                        .into())
                    }
                };
                tree.entries.push((key, node));
            }
            Ok(tree)
        }

        build(path, &object)
    }

    /// Render as an exported default object
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("export default {\n");
        self.render_into(&mut out, 1);
        out.push_str("};\n");
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        for (key, node) in &self.entries {
            match node {
                Node::Leaf(value) => {
                    out.push_str(&format!(
                        "{indent}{}: '{}',\n",
                        render_key(key),
                        escape_single_quoted(value)
                    ));
                }
                Node::Branch(inner) => {
                    out.push_str(&format!("{indent}{}: {{\n", render_key(key)));
                    inner.render_into(out, depth + 1);
                    out.push_str(&format!("{indent}}},\n"));
                }
            }
        }
    }
}

fn render_key(key: &str) -> String {
    let mut chars = key.chars();
    let ident = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };
    if ident {
        key.to_string()
    } else {
        format!("'{}'", escape_single_quoted(key))
    }
}

fn escape_single_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}
