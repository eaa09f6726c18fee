//! Surgical source rewriting
//!
//! Substitutes every assigned span with a reference expression whose wrapping
//! form depends on the syntactic context, applying edits back-to-front so
//! earlier offsets stay valid, then injects the lookup-symbol import when a
//! parse-based check finds none.

use std::ops::Range;
use std::path::Path;

use swc_ecma_ast::{ImportSpecifier, ModuleDecl, ModuleItem};

use crate::error::{Result, RewriteError};
use crate::extract::ecma::{self, ScriptKind};
use crate::extract::{vue, Dialect, SpanRecord};
use crate::LOOKUP_SYMBOL;

/// A span made ready for rewriting
///
/// For template literals with interpolations, `record.text` has already been
/// converted to the `{val_i}` placeholder form (the catalog value), and
/// `template_args` carries the interpolated expressions in order.
#[derive(Debug, Clone)]
pub struct PreparedSpan {
    pub record: SpanRecord,
    pub template_args: Option<Vec<String>>,
}

/// Convert raw spans into rewrite-ready spans
///
/// Template literals with `${…}` interpolations get their catalog text
/// rewritten to `{val_i}` placeholders here, before key synthesis, so
/// de-duplication and the persisted value both see the placeholder form.
#[must_use]
pub fn prepare(source: &str, spans: Vec<SpanRecord>) -> Vec<PreparedSpan> {
    spans
        .into_iter()
        .map(|mut record| {
            if record.is_string && is_template_span(source, &record.range) {
                let (placeholder, args) = split_template(&record.text);
                if !args.is_empty() {
                    record.text = placeholder;
                    return PreparedSpan {
                        record,
                        template_args: Some(args),
                    };
                }
            }
            PreparedSpan {
                record,
                template_args: None,
            }
        })
        .collect()
}

/// Whether a string span is a template literal, under either range
/// encoding: backtick at the start (delimiters included) or immediately
/// before it (interior only)
fn is_template_span(source: &str, range: &Range<usize>) -> bool {
    let bytes = source.as_bytes();
    bytes.get(range.start) == Some(&b'`')
        || (range.start > 0 && bytes[range.start - 1] == b'`')
}

/// Replace each `${expr}` with `{valN}`, collecting the expressions
fn split_template(text: &str) -> (String, Vec<String>) {
    let bytes = text.as_bytes();
    let mut out = String::new();
    let mut args = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'$' && i + 1 < bytes.len() && bytes[i + 1] == b'{' {
            let mut depth = 1usize;
            let mut j = i + 2;
            while j < bytes.len() && depth > 0 {
                match bytes[j] {
                    b'{' => depth += 1,
                    b'}' => depth -= 1,
                    _ => {}
                }
                j += 1;
            }
            if depth == 0 {
                let expr = text[i + 2..j - 1].trim().to_string();
                args.push(expr);
                out.push_str(&format!("{{val{}}}", args.len()));
                i = j;
                continue;
            }
        }
        // advance one char, not one byte
        let c = text[i..].chars().next().unwrap_or('\0');
        out.push(c);
        i += c.len_utf8().max(1);
    }

    (out, args)
}

/// Rewrite a file's bytes, substituting `spans` (descending-start order,
/// paired with their keys) and injecting the import when needed
pub fn rewrite_source(
    path: &Path,
    source: &str,
    spans: &[(PreparedSpan, String)],
    import_statement: &str,
) -> Result<String> {
    let dialect = crate::extract::dialect_for(path);
    let markup_file = matches!(dialect, Dialect::Html | Dialect::Component);

    // back-to-front edits require strictly descending, non-overlapping spans
    for pair in spans.windows(2) {
        if pair[1].0.record.range.end > pair[0].0.record.range.start {
            return Err(RewriteError::OverlappingSpans {
                path: path.to_path_buf(),
                at: pair[1].0.record.range.end,
            }
            .into());
        }
    }

    let mut output = source.to_string();
    for (span, key) in spans {
        let range = &span.record.range;
        if range.end > source.len()
            || !source.is_char_boundary(range.start)
            || !source.is_char_boundary(range.end)
        {
            return Err(RewriteError::BadBoundary {
                path: path.to_path_buf(),
                start: range.start,
                end: range.end,
            }
            .into());
        }

        let reference = format!("{LOOKUP_SYMBOL}.{key}");
        let (replace_range, replacement) =
            substitution(source, span, &reference, markup_file, dialect);
        output.replace_range(replace_range, &replacement);
    }

    inject_import(path, output, dialect, import_statement)
}

/// Pick the replacement text and the exact byte range it covers
fn substitution(
    source: &str,
    span: &PreparedSpan,
    reference: &str,
    markup_file: bool,
    dialect: Dialect,
) -> (Range<usize>, String) {
    let range = span.record.range.clone();
    let bytes = source.as_bytes();

    if !span.record.is_string {
        // markup text or interpolation prose
        let wrapped = if markup_file {
            format!("{{{{{reference}}}}}")
        } else {
            format!("{{{reference}}}")
        };
        return (range, wrapped);
    }

    // attribute-value assignment: the byte before the opening quote is `=`
    if range.start > 0 && bytes[range.start - 1] == b'=' {
        let wrapped = if markup_file {
            format!("{{{{{reference}}}}}")
        } else {
            format!("{{{reference}}}")
        };
        return (range, wrapped);
    }

    if is_template_span(source, &range) {
        // normalize to a range that covers both backticks
        let full = if bytes.get(range.start) == Some(&b'`') {
            range.clone()
        } else {
            range.start - 1..(range.end + 1).min(source.len())
        };
        let replacement = match &span.template_args {
            Some(args) => {
                let pairs = args
                    .iter()
                    .enumerate()
                    .map(|(i, expr)| format!("val{}: {expr}", i + 1))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{LOOKUP_SYMBOL}.template({reference}, {{ {pairs} }})")
            }
            None => reference.to_string(),
        };
        return (full, replacement);
    }

    if dialect == Dialect::Component {
        if let Some(interior) = enclosing_interpolation(source, &range) {
            // replace the whole interior only when the literal is the entire
            // expression; a literal inside a larger expression swaps in place
            if source[interior.clone()].trim() == &source[range.clone()] {
                return (interior, reference.to_string());
            }
        }
    }

    (range, reference.to_string())
}

/// Interior range of the `{{ … }}` block enclosing `range`, if any
fn enclosing_interpolation(source: &str, range: &Range<usize>) -> Option<Range<usize>> {
    let before = &source[..range.start];
    let open = before.rfind("{{")?;
    if let Some(close_before) = before.rfind("}}") {
        if close_before > open {
            return None;
        }
    }
    let close = source[range.end..].find("}}")? + range.end;
    Some(open + 2..close)
}

/// Inject the configured import unless the lookup symbol is already imported
fn inject_import(
    path: &Path,
    source: String,
    dialect: Dialect,
    import_statement: &str,
) -> Result<String> {
    match dialect {
        Dialect::Html => Ok(source),
        Dialect::Component => {
            let sections = vue::split_sections(&source);
            let Some(script) = sections.scripts.first() else {
                return Ok(source);
            };
            let code = &source[script.range.clone()];
            if has_lookup_import(path, code)? {
                return Ok(source);
            }
            let mut out = source.clone();
            out.insert_str(script.range.start, &format!("\n{import_statement}"));
            Ok(out)
        }
        Dialect::Script | Dialect::TypedScript => {
            let kind = match dialect {
                Dialect::Script => ScriptKind::Script,
                _ => ScriptKind::TypedScript,
            };
            let parsed = ecma::parse(path, &source, kind).map_err(|e| RewriteError::Reparse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            if module_imports_lookup(&parsed.module) {
                return Ok(source);
            }
            let at = parsed
                .module
                .body
                .first()
                .map(|item| {
                    use swc_common::Spanned;
                    parsed.offset_of(item.span().lo)
                })
                .unwrap_or(0);
            let mut out = source.clone();
            out.insert_str(at, &format!("{import_statement}\n"));
            Ok(out)
        }
    }
}

/// Parse-based check for an import binding the lookup symbol
///
/// A textual `I18N` occurrence in a comment or string never counts.
pub fn has_lookup_import(path: &Path, script: &str) -> Result<bool> {
    let parsed =
        ecma::parse(path, script, ScriptKind::TypedScript).map_err(|e| RewriteError::Reparse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(module_imports_lookup(&parsed.module))
}

fn module_imports_lookup(module: &swc_ecma_ast::Module) -> bool {
    module.body.iter().any(|item| {
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
            return false;
        };
        import.specifiers.iter().any(|spec| match spec {
            ImportSpecifier::Default(s) => s.local.sym == LOOKUP_SYMBOL,
            ImportSpecifier::Named(s) => s.local.sym == LOOKUP_SYMBOL,
            ImportSpecifier::Namespace(s) => s.local.sym == LOOKUP_SYMBOL,
        })
    })
}
