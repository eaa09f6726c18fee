//! Script and typed-script extractors built on swc
//!
//! Both dialects share one visitor: plain string literals, template literals
//! and markup (JSX) text children are reported with spans into the original
//! source. Markup comments are expression containers in the AST and never
//! reach the text-child case, so Chinese appearing only inside a comment is
//! never reported.

use std::path::Path;

use swc_common::{sync::Lrc, FileName, SourceFile, SourceMap, Spanned};
use swc_ecma_ast::{JSXText, Module, Str, Tpl};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};

use crate::error::{ExtractError, Result};
use crate::extract::{contains_chinese, SpanRecord};

/// Which grammar the parser is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// ECMAScript with markup expressions and decorators (.js/.jsx)
    Script,
    /// Typed script with markup expressions (.ts/.tsx)
    TypedScript,
}

/// A parsed module together with the pieces needed for offset math
pub struct ParsedModule {
    pub module: Module,
    pub source_map: Lrc<SourceMap>,
    pub file: Lrc<SourceFile>,
}

impl ParsedModule {
    /// Byte offset of a `BytePos` relative to the file start
    #[must_use]
    pub fn offset_of(&self, pos: swc_common::BytePos) -> usize {
        (pos.0 - self.file.start_pos.0) as usize
    }
}

/// Parse a source string as a module of the given kind
pub fn parse(path: &Path, source: &str, kind: ScriptKind) -> Result<ParsedModule> {
    let source_map: Lrc<SourceMap> = Default::default();
    let file = source_map.new_source_file(Lrc::new(FileName::Anon), source.to_string());

    let syntax = match kind {
        ScriptKind::Script => Syntax::Es(EsSyntax {
            jsx: true,
            decorators: true,
            ..Default::default()
        }),
        ScriptKind::TypedScript => Syntax::Typescript(TsSyntax {
            tsx: true,
            decorators: true,
            ..Default::default()
        }),
    };

    let lexer = Lexer::new(
        syntax,
        Default::default(),
        StringInput::from(&*file),
        None,
    );

    let mut parser = Parser::new_from(lexer);
    let module = parser.parse_module().map_err(|e| ExtractError::Parse {
        path: path.to_path_buf(),
        message: e.into_kind().msg().to_string(),
    })?;

    // recovered parse errors also disqualify the file
    if let Some(error) = parser.take_errors().into_iter().next() {
        return Err(ExtractError::Parse {
            path: path.to_path_buf(),
            message: error.into_kind().msg().to_string(),
        }
        .into());
    }

    Ok(ParsedModule {
        module,
        source_map,
        file,
    })
}

/// Extract Chinese literal spans from a script or typed-script source
///
/// `section_offset` shifts every reported range; single-file components pass
/// the byte offset of the embedded script section so spans land in the
/// enclosing file.
pub fn extract(
    path: &Path,
    source: &str,
    kind: ScriptKind,
    section_offset: usize,
) -> Result<Vec<SpanRecord>> {
    let parsed = parse(path, source, kind)?;

    let mut collector = LiteralCollector {
        source,
        base: parsed.file.start_pos.0 as usize,
        spans: Vec::new(),
    };
    parsed.module.visit_with(&mut collector);

    Ok(collector
        .spans
        .into_iter()
        .map(|s| s.offset(section_offset))
        .collect())
}

struct LiteralCollector<'a> {
    source: &'a str,
    base: usize,
    spans: Vec<SpanRecord>,
}

impl LiteralCollector<'_> {
    fn range_of(&self, span: swc_common::Span) -> std::ops::Range<usize> {
        (span.lo.0 as usize - self.base)..(span.hi.0 as usize - self.base)
    }
}

impl Visit for LiteralCollector<'_> {
    fn visit_str(&mut self, node: &Str) {
        let value = node.value.to_string();
        if contains_chinese(&value) {
            // range includes the quotes, text is the cooked value
            self.spans
                .push(SpanRecord::new(value, self.range_of(node.span), true));
        }
    }

    fn visit_tpl(&mut self, node: &Tpl) {
        let range = self.range_of(node.span());
        let slice = &self.source[range.clone()];
        if contains_chinese(slice) {
            // whole literal including backticks; text is the interior
            let inner = &slice[1..slice.len() - 1];
            self.spans
                .push(SpanRecord::new(inner.to_string(), range, true));
        }
        // interpolation expressions may hold their own literals; nested
        // reports are removed by the normalizer
        node.visit_children_with(self);
    }

    fn visit_jsx_text(&mut self, node: &JSXText) {
        let raw = node.value.to_string();
        let trimmed = raw.trim();
        if contains_chinese(trimmed) {
            self.spans
                .push(SpanRecord::new(trimmed.to_string(), self.range_of(node.span), false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_ts(source: &str) -> Vec<SpanRecord> {
        extract(Path::new("test.tsx"), source, ScriptKind::TypedScript, 0).unwrap()
    }

    fn extract_js(source: &str) -> Vec<SpanRecord> {
        extract(Path::new("test.jsx"), source, ScriptKind::Script, 0).unwrap()
    }

    #[test]
    fn test_plain_string_literal() {
        let source = r#"const msg = "提交";"#;
        let spans = extract_ts(source);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "提交");
        assert!(spans[0].is_string);
        assert_eq!(&source[spans[0].range.clone()], "\"提交\"");
    }

    #[test]
    fn test_non_chinese_ignored() {
        let spans = extract_ts(r#"const msg = "submit"; const n = 3;"#);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_template_literal_without_interpolation() {
        let source = "const msg = `确定`;";
        let spans = extract_ts(source);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "确定");
        assert!(spans[0].is_string);
        assert_eq!(&source[spans[0].range.clone()], "`确定`");
    }

    #[test]
    fn test_template_literal_with_interpolation() {
        let source = "const msg = `你有${n}条消息`;";
        let spans = extract_ts(source);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "你有${n}条消息");
        assert_eq!(&source[spans[0].range.clone()], "`你有${n}条消息`");
    }

    #[test]
    fn test_jsx_text_child_trimmed() {
        let source = "const b = <button>  确定  </button>;";
        let spans = extract_ts(source);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "确定");
        assert!(!spans[0].is_string);
        // the span still covers the surrounding whitespace
        assert_eq!(&source[spans[0].range.clone()], "  确定  ");
    }

    #[test]
    fn test_jsx_attribute_is_string() {
        let source = r#"const i = <input placeholder="请输入用户名" />;"#;
        let spans = extract_ts(source);
        assert_eq!(spans.len(), 1);
        assert!(spans[0].is_string);
        assert_eq!(&source[spans[0].range.clone()], "\"请输入用户名\"");
        // byte before the range is the `=` of the attribute assignment
        assert_eq!(source.as_bytes()[spans[0].range.start - 1], b'=');
    }

    #[test]
    fn test_jsx_comment_not_reported() {
        let spans = extract_ts("const b = <div>{/* 注释中文 */}</div>;");
        assert!(spans.is_empty());
    }

    #[test]
    fn test_line_comment_not_reported() {
        let spans = extract_ts("// 这是注释\nconst x = 1;");
        assert!(spans.is_empty());
    }

    #[test]
    fn test_decorator_syntax_parses() {
        let source = "@Component({ name: '组件' })\nexport default class A {}";
        let spans = extract_ts(source);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "组件");
    }

    #[test]
    fn test_script_dialect_jsx() {
        let source = "export default () => <span>取消</span>;";
        let spans = extract_js(source);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "取消");
    }

    #[test]
    fn test_parse_error_surfaces() {
        let result = extract(Path::new("bad.ts"), "const = ;;;", ScriptKind::TypedScript, 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_section_offset_applied() {
        let spans = extract(
            Path::new("test.ts"),
            r#"const a = "中文";"#,
            ScriptKind::TypedScript,
            100,
        )
        .unwrap();
        assert_eq!(spans[0].range.start, 110);
    }
}
