//! Standalone markup (.html) extractor
//!
//! Reports attribute values and text nodes containing Chinese. Text nodes
//! carrying `{{ … }}` interpolations are treated as structured values: each
//! Chinese run inside an interpolation source is reported on its own, and so
//! is each prose segment between interpolations. Raw-text elements
//! (`<script>`, `<style>`) and comments are never reported.

use std::ops::Range;

use crate::extract::markup::{self, Event};
use crate::extract::{chinese_run_re, contains_chinese, SpanRecord};

/// Extract Chinese spans from a standalone markup document
#[must_use]
pub fn extract(source: &str) -> Vec<SpanRecord> {
    let mut spans = Vec::new();

    for event in markup::scan(source) {
        match event {
            Event::OpenTag { attrs, .. } => {
                for attr in attrs {
                    let Some(value) = attr.value else { continue };
                    let inner = value.inner(source);
                    if contains_chinese(inner) {
                        spans.push(SpanRecord::new(
                            inner.to_string(),
                            value.range.clone(),
                            value.quoted,
                        ));
                    }
                }
            }
            Event::Text { range } => {
                collect_text_node(source, range, &mut spans);
            }
            Event::Comment { .. } | Event::RawText { .. } | Event::CloseTag { .. } => {}
        }
    }

    spans
}

/// Report one text node, splitting structured (interpolated) values
pub(crate) fn collect_text_node(source: &str, range: Range<usize>, spans: &mut Vec<SpanRecord>) {
    let text = &source[range.clone()];
    let regions = markup::interpolations(text);

    if regions.is_empty() {
        let trimmed = text.trim();
        if contains_chinese(trimmed) {
            // the span keeps covering the surrounding whitespace
            spans.push(SpanRecord::new(trimmed.to_string(), range, false));
        }
        return;
    }

    let mut cursor = 0usize;
    for (outer, inner) in &regions {
        // prose segment before this interpolation
        push_prose(source, &range, cursor..outer.start, spans);

        // Chinese runs inside the interpolation source
        let expr = &text[inner.clone()];
        for m in chinese_run_re().find_iter(expr) {
            let start = range.start + inner.start + m.start();
            let end = range.start + inner.start + m.end();
            spans.push(SpanRecord::new(m.as_str().to_string(), start..end, false));
        }
        cursor = outer.end;
    }
    push_prose(source, &range, cursor..text.len(), spans);
}

fn push_prose(
    source: &str,
    node: &Range<usize>,
    segment: Range<usize>,
    spans: &mut Vec<SpanRecord>,
) {
    if segment.start >= segment.end {
        return;
    }
    let abs = node.start + segment.start..node.start + segment.end;
    let text = &source[abs.clone()];
    let trimmed = text.trim();
    if contains_chinese(trimmed) {
        spans.push(SpanRecord::new(trimmed.to_string(), abs, false));
    }
}
