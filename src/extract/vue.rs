//! Single-file component (.vue) extractor
//!
//! A component file combines a template, a script and possibly a setup
//! script. Two strategies coexist, selected by the configured framework
//! version: variant A (vue2) pre-encodes space entities and walks the
//! template reporting text nodes and bound-expression tokens; variant B
//! (vue3) walks the descriptor node-kind-by-node-kind and treats single
//! literal interpolation payloads as strings. A variant-B parse failure
//! falls back to variant A.

use std::ops::Range;
use std::path::Path;

use crate::error::{ExtractError, Result};
use crate::extract::ecma::{self, ScriptKind};
use crate::extract::markup::{self, Event};
use crate::extract::{contains_chinese, normalize, SpanRecord};

/// Space entities whose `&` is swapped for a one-byte sentinel while the
/// template is walked; byte length is preserved so spans stay accurate
const SPACE_ENTITIES: &[&str] = &["&ensp;", "&emsp;", "&nbsp;"];

const SENTINEL: char = '\u{1}';

/// Extract Chinese spans from a component file
pub fn extract(path: &Path, source: &str, vue3: bool) -> Result<Vec<SpanRecord>> {
    if vue3 {
        match variant_b(path, source) {
            Ok(spans) => Ok(spans),
            Err(_) => variant_a(path, source),
        }
    } else {
        variant_a(path, source)
    }
}

/// Template, script and setup-script content ranges of one component file
#[derive(Debug, Default)]
pub(crate) struct Sections {
    pub(crate) template: Option<Range<usize>>,
    pub(crate) scripts: Vec<ScriptSection>,
}

#[derive(Debug)]
pub(crate) struct ScriptSection {
    pub(crate) range: Range<usize>,
    #[allow(dead_code)]
    pub(crate) setup: bool,
}

pub(crate) fn split_sections(source: &str) -> Sections {
    let mut sections = Sections::default();
    let mut template_depth = 0usize;
    let mut template_start = 0usize;
    let mut pending_script: Option<bool> = None;

    for event in markup::scan(source) {
        match event {
            Event::OpenTag {
                ref name,
                ref attrs,
                self_closing,
                ref range,
            } => {
                if name == "template" && !self_closing {
                    if template_depth == 0 && sections.template.is_none() {
                        template_start = range.end;
                    }
                    template_depth += 1;
                } else if name == "script" && template_depth == 0 {
                    pending_script =
                        Some(attrs.iter().any(|a| a.name == "setup" && a.value.is_none()));
                }
            }
            Event::CloseTag { ref name, ref range } => {
                if name == "template" && template_depth > 0 {
                    template_depth -= 1;
                    if template_depth == 0 && sections.template.is_none() {
                        sections.template = Some(template_start..range.start);
                    }
                }
            }
            Event::RawText { ref element, range } => {
                if element == "script" && template_depth == 0 {
                    if let Some(setup) = pending_script.take() {
                        sections.scripts.push(ScriptSection { range, setup });
                    }
                }
            }
            _ => {}
        }
    }

    sections
}

fn encode_entities(template: &str) -> String {
    let mut out = template.to_string();
    for entity in SPACE_ENTITIES {
        let sentinel = format!("{SENTINEL}{}", &entity[1..]);
        out = out.replace(entity, &sentinel);
    }
    out
}

fn decode_entities(text: &str) -> String {
    let mut out = text.to_string();
    for entity in SPACE_ENTITIES {
        let sentinel = format!("{SENTINEL}{}", &entity[1..]);
        out = out.replace(&sentinel, entity);
    }
    out
}

fn is_bound_attr(name: &str) -> bool {
    name.starts_with(':') || name.starts_with('@') || name.starts_with("v-")
}

/// Variant A: framework version 2
fn variant_a(path: &Path, source: &str) -> Result<Vec<SpanRecord>> {
    let sections = split_sections(source);
    if sections.template.is_none() && sections.scripts.is_empty() {
        return Err(ExtractError::EmptyComponent {
            path: path.to_path_buf(),
        }
        .into());
    }

    let mut spans = Vec::new();

    if let Some(tpl_range) = &sections.template {
        let template = encode_entities(&source[tpl_range.clone()]);
        let base = tpl_range.start;

        for event in markup::scan(&template) {
            match event {
                Event::Text { range } => {
                    let text = &template[range.clone()];
                    let regions = markup::interpolations(text);
                    if regions.is_empty() {
                        let trimmed = text.trim();
                        if contains_chinese(trimmed) {
                            spans.push(SpanRecord::new(
                                decode_entities(trimmed),
                                base + range.start..base + range.end,
                                false,
                            ));
                        }
                        continue;
                    }

                    let mut cursor = 0usize;
                    for (outer, inner) in &regions {
                        prose_segment(&template, base, &range, cursor..outer.start, &mut spans);
                        bound_expression(
                            &template[range.start + inner.start..range.start + inner.end],
                            base + range.start + inner.start,
                            &mut spans,
                        );
                        cursor = outer.end;
                    }
                    prose_segment(&template, base, &range, cursor..text.len(), &mut spans);
                }
                Event::OpenTag { attrs, .. } => {
                    for attr in attrs {
                        let Some(value) = attr.value else { continue };
                        if is_bound_attr(&attr.name) {
                            bound_expression(
                                value.inner(&template),
                                base + value.inner_range().start,
                                &mut spans,
                            );
                        } else {
                            let inner = value.inner(&template);
                            if contains_chinese(inner) {
                                spans.push(SpanRecord::new(
                                    decode_entities(inner),
                                    base + value.range.start..base + value.range.end,
                                    value.quoted,
                                ));
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    for script in &sections.scripts {
        let code = &source[script.range.clone()];
        spans.extend(ecma::extract(
            path,
            code,
            ScriptKind::TypedScript,
            script.range.start,
        )?);
    }

    Ok(normalize(spans))
}

fn prose_segment(
    template: &str,
    base: usize,
    node: &Range<usize>,
    segment: Range<usize>,
    spans: &mut Vec<SpanRecord>,
) {
    if segment.start >= segment.end {
        return;
    }
    let abs = node.start + segment.start..node.start + segment.end;
    let trimmed = template[abs.clone()].trim();
    if contains_chinese(trimmed) {
        spans.push(SpanRecord::new(
            decode_entities(trimmed),
            base + abs.start..base + abs.end,
            false,
        ));
    }
}

/// Report Chinese literals inside a bound expression
///
/// Template-literal substrings win; when none matches, the expression's
/// string tokens and bare Chinese runs are reported individually.
fn bound_expression(expr: &str, abs_base: usize, spans: &mut Vec<SpanRecord>) {
    if template_literals(expr, abs_base, spans) {
        return;
    }
    expression_tokens(expr, abs_base, spans, true);
}

/// Backtick literals containing Chinese; returns whether any was reported
fn template_literals(expr: &str, abs_base: usize, spans: &mut Vec<SpanRecord>) -> bool {
    let bytes = expr.as_bytes();
    let mut found = false;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            if let Some(rel) = expr[i + 1..].find('`') {
                let end = i + 1 + rel;
                let inner = &expr[i + 1..end];
                if contains_chinese(inner) {
                    found = true;
                    let is_string = inner.contains("${");
                    spans.push(SpanRecord::new(
                        decode_entities(inner),
                        abs_base + i..abs_base + end + 1,
                        is_string,
                    ));
                }
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }
    found
}

/// Quote-delimited tokens and (optionally) bare Chinese runs of an expression
fn expression_tokens(expr: &str, abs_base: usize, spans: &mut Vec<SpanRecord>, bare_runs: bool) {
    let bytes = expr.as_bytes();
    let mut quoted: Vec<Range<usize>> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c == b'\'' || c == b'"' {
            let quote = c;
            let mut k = i + 1;
            while k < bytes.len() && bytes[k] != quote {
                if bytes[k] == b'\\' {
                    k += 1;
                }
                k += 1;
            }
            if k < bytes.len() {
                let inner = &expr[i + 1..k];
                if contains_chinese(inner) {
                    spans.push(SpanRecord::new(
                        decode_entities(inner),
                        abs_base + i..abs_base + k + 1,
                        true,
                    ));
                }
                quoted.push(i..k + 1);
                i = k + 1;
                continue;
            }
        }
        i += 1;
    }

    if !bare_runs {
        return;
    }
    for m in crate::extract::chinese_run_re().find_iter(expr) {
        if quoted.iter().any(|q| q.start < m.start() && m.end() < q.end) {
            continue;
        }
        spans.push(SpanRecord::new(
            decode_entities(m.as_str()),
            abs_base + m.start()..abs_base + m.end(),
            false,
        ));
    }
}

/// Variant B: framework version 3
fn variant_b(path: &Path, source: &str) -> Result<Vec<SpanRecord>> {
    let sections = split_sections(source);
    if sections.template.is_none() && sections.scripts.is_empty() {
        return Err(ExtractError::EmptyComponent {
            path: path.to_path_buf(),
        }
        .into());
    }

    let mut spans = Vec::new();

    if let Some(tpl_range) = &sections.template {
        let template = &source[tpl_range.clone()];
        let base = tpl_range.start;

        for event in markup::scan(template) {
            match event {
                Event::Text { range } => {
                    walk_text_node(template, base, range, &mut spans);
                }
                Event::OpenTag { attrs, .. } => {
                    for attr in attrs {
                        let Some(value) = attr.value else { continue };
                        if is_bound_attr(&attr.name) {
                            expression_tokens(
                                value.inner(template),
                                base + value.inner_range().start,
                                &mut spans,
                                false,
                            );
                        } else {
                            let inner = value.inner(template);
                            if contains_chinese(inner) {
                                spans.push(SpanRecord::new(
                                    inner.to_string(),
                                    base + value.range.start..base + value.range.end,
                                    true,
                                ));
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    for script in &sections.scripts {
        let code = &source[script.range.clone()];
        spans.extend(ecma::extract(
            path,
            code,
            ScriptKind::TypedScript,
            script.range.start,
        )?);
    }

    Ok(normalize(spans))
}

/// Variant-B handling of one template text node
///
/// Plain text reports once; an interpolation whose payload is a single
/// string or template literal reports the payload as a string span; prose
/// mixed with interpolations is a compound region reported once as a whole.
fn walk_text_node(
    template: &str,
    base: usize,
    range: Range<usize>,
    spans: &mut Vec<SpanRecord>,
) {
    let text = &template[range.clone()];
    let regions = markup::interpolations(text);

    if regions.is_empty() {
        let trimmed = text.trim();
        if contains_chinese(trimmed) {
            spans.push(SpanRecord::new(
                trimmed.to_string(),
                base + range.start..base + range.end,
                false,
            ));
        }
        return;
    }

    // compound: prose carrying Chinese mixed with interpolations
    let mut prose_has_chinese = false;
    let mut cursor = 0usize;
    for (outer, _) in &regions {
        if contains_chinese(&text[cursor..outer.start]) {
            prose_has_chinese = true;
        }
        cursor = outer.end;
    }
    if contains_chinese(&text[cursor..]) {
        prose_has_chinese = true;
    }

    if prose_has_chinese {
        let trimmed = text.trim();
        spans.push(SpanRecord::new(
            trimmed.to_string(),
            base + range.start..base + range.end,
            false,
        ));
        return;
    }

    for (_, inner) in &regions {
        let payload = &text[inner.clone()];
        let abs_inner = base + range.start + inner.start;
        match single_literal(payload) {
            Some(lit) if contains_chinese(&payload[lit.start + 1..lit.end - 1]) => {
                spans.push(SpanRecord::new(
                    payload[lit.start + 1..lit.end - 1].to_string(),
                    abs_inner + lit.start..abs_inner + lit.end,
                    true,
                ));
            }
            _ => expression_tokens(payload, abs_inner, spans, false),
        }
    }
}

/// The payload's range when it is exactly one quoted or backtick literal
fn single_literal(payload: &str) -> Option<Range<usize>> {
    let trimmed = payload.trim();
    let lead = payload.len() - payload.trim_start().len();
    let bytes = trimmed.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let quote = bytes[0];
    if quote != b'\'' && quote != b'"' && quote != b'`' {
        return None;
    }
    if bytes[bytes.len() - 1] != quote {
        return None;
    }
    // the closing delimiter must be the final one, not an inner boundary
    if trimmed[1..trimmed.len() - 1].contains(quote as char) {
        return None;
    }
    Some(lead..lead + trimmed.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VUE2_SOURCE: &str = "<template>\n  <div>\n    <button>确定</button>\n    <input :placeholder=\"tip ? '请输入' : '必填'\" />\n    <span>{{ `共${total}条` }}</span>\n  </div>\n</template>\n<script>\nexport default {\n  data() {\n    return { msg: '加载中' };\n  },\n};\n</script>\n";

    #[test]
    fn test_split_sections() {
        let sections = split_sections(VUE2_SOURCE);
        let tpl = sections.template.unwrap();
        assert!(VUE2_SOURCE[tpl].contains("<button>"));
        assert_eq!(sections.scripts.len(), 1);
        assert!(VUE2_SOURCE[sections.scripts[0].range.clone()].contains("加载中"));
    }

    #[test]
    fn test_split_sections_nested_template() {
        let source = "<template><template #body>内</template></template><script>export default {};</script>";
        let sections = split_sections(source);
        let tpl = sections.template.unwrap();
        assert_eq!(&source[tpl], "<template #body>内</template>");
    }

    #[test]
    fn test_variant_a_full_component() {
        let spans = variant_a(Path::new("demo.vue"), VUE2_SOURCE).unwrap();
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert!(texts.contains(&"确定"));
        assert!(texts.contains(&"请输入"));
        assert!(texts.contains(&"必填"));
        assert!(texts.contains(&"共${total}条"));
        assert!(texts.contains(&"加载中"));
        // reverse-sorted after normalization
        for pair in spans.windows(2) {
            assert!(pair[0].range.start > pair[1].range.start);
        }
    }

    #[test]
    fn test_variant_a_interpolated_template_literal_is_string() {
        let source = "<template><span>{{ `共${n}条` }}</span></template>";
        let spans = variant_a(Path::new("demo.vue"), source).unwrap();
        assert_eq!(spans.len(), 1);
        assert!(spans[0].is_string);
        assert_eq!(spans[0].text, "共${n}条");
        assert_eq!(&source[spans[0].range.clone()], "`共${n}条`");
    }

    #[test]
    fn test_variant_a_bound_attr_tokens() {
        let source = "<template><a :title=\"'删除'\">x</a></template>";
        let spans = variant_a(Path::new("demo.vue"), source).unwrap();
        assert_eq!(spans.len(), 1);
        assert!(spans[0].is_string);
        assert_eq!(&source[spans[0].range.clone()], "'删除'");
    }

    #[test]
    fn test_variant_a_entity_restored_in_text() {
        let source = "<template><p>你好&nbsp;世界</p></template>";
        let spans = variant_a(Path::new("demo.vue"), source).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "你好&nbsp;世界");
    }

    #[test]
    fn test_variant_a_static_attribute() {
        let source = "<template><input placeholder=\"请输入用户名\" /></template>";
        let spans = variant_a(Path::new("demo.vue"), source).unwrap();
        assert_eq!(spans.len(), 1);
        assert!(spans[0].is_string);
        assert_eq!(&source[spans[0].range.clone()], "\"请输入用户名\"");
    }

    #[test]
    fn test_variant_b_single_literal_payload() {
        let source = "<template><span>{{ '中文' }}</span></template><script>export default {};</script>";
        let spans = variant_b(Path::new("demo.vue"), source).unwrap();
        assert_eq!(spans.len(), 1);
        assert!(spans[0].is_string);
        assert_eq!(spans[0].text, "中文");
        assert_eq!(&source[spans[0].range.clone()], "'中文'");
    }

    #[test]
    fn test_variant_b_compound_region_emitted_once() {
        let source = "<template><span>共{{ total }}条</span></template>";
        let spans = variant_b(Path::new("demo.vue"), source).unwrap();
        assert_eq!(spans.len(), 1);
        assert!(!spans[0].is_string);
        assert_eq!(spans[0].text, "共{{ total }}条");
    }

    #[test]
    fn test_variant_b_setup_script() {
        let source = "<template><p>文本</p></template>\n<script setup>\nconst msg = '消息';\n</script>\n";
        let spans = variant_b(Path::new("demo.vue"), source).unwrap();
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert!(texts.contains(&"文本"));
        assert!(texts.contains(&"消息"));
    }

    #[test]
    fn test_vue3_falls_back_to_variant_a() {
        // variant B propagates the script parse failure; A fails too, so the
        // file-level error survives the fallback chain
        let source = "<template><p>文</p></template><script>const = ;</script>";
        assert!(extract(Path::new("demo.vue"), source, true).is_err());
    }

    #[test]
    fn test_empty_component_rejected() {
        assert!(extract(Path::new("demo.vue"), "<style>.a{}</style>", false).is_err());
    }

    #[test]
    fn test_single_literal_detection() {
        assert!(single_literal(" '中文' ").is_some());
        assert!(single_literal("`中文`").is_some());
        assert!(single_literal("a ? '中' : '文'").is_none());
        assert!(single_literal("name").is_none());
    }
}
