//! Tolerant markup scanner with byte-accurate spans
//!
//! The HTML and component-file extractors need source offsets for every
//! attribute value and text node, which DOM-level parsers discard. This
//! scanner tokenizes markup into a flat event stream; malformed input never
//! fails, it just degrades to text.

use std::ops::Range;

/// One attribute inside an open tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as written, including any `:`/`@`/`v-` prefix
    pub name: String,
    /// Value span and quoting, absent for boolean attributes
    pub value: Option<AttrValue>,
}

/// An attribute value's location in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrValue {
    /// Byte span of the value; includes the surrounding quotes when quoted
    pub range: Range<usize>,
    pub quoted: bool,
}

impl AttrValue {
    /// The value text with quotes stripped
    #[must_use]
    pub fn inner<'a>(&self, source: &'a str) -> &'a str {
        let raw = &source[self.range.clone()];
        if self.quoted {
            &raw[1..raw.len() - 1]
        } else {
            raw
        }
    }

    /// Span of the value text with quotes stripped
    #[must_use]
    pub fn inner_range(&self) -> Range<usize> {
        if self.quoted {
            self.range.start + 1..self.range.end - 1
        } else {
            self.range.clone()
        }
    }
}

/// Scanner events, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    OpenTag {
        name: String,
        attrs: Vec<Attribute>,
        self_closing: bool,
        range: Range<usize>,
    },
    CloseTag {
        name: String,
        range: Range<usize>,
    },
    /// Inter-tag text; never includes comments
    Text {
        range: Range<usize>,
    },
    Comment {
        range: Range<usize>,
    },
    /// Contents of a raw-text element (`<script>`, `<style>`)
    RawText {
        element: String,
        range: Range<usize>,
    },
}

/// Tokenize markup into events
#[must_use]
pub fn scan(source: &str) -> Vec<Event> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut events = Vec::new();
    let mut i = 0;
    let mut text_start = 0;

    let flush_text = |events: &mut Vec<Event>, start: usize, end: usize| {
        if start < end {
            events.push(Event::Text { range: start..end });
        }
    };

    while i < len {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        if source[i..].starts_with("<!--") {
            flush_text(&mut events, text_start, i);
            let end = match source[i + 4..].find("-->") {
                Some(rel) => i + 4 + rel + 3,
                None => len,
            };
            events.push(Event::Comment { range: i..end });
            i = end;
            text_start = i;
            continue;
        }

        if i + 1 < len && bytes[i + 1] == b'/' {
            flush_text(&mut events, text_start, i);
            let name_start = i + 2;
            let name_end = scan_name(source, name_start);
            let end = source[name_end..]
                .find('>')
                .map(|rel| name_end + rel + 1)
                .unwrap_or(len);
            events.push(Event::CloseTag {
                name: source[name_start..name_end].to_ascii_lowercase(),
                range: i..end,
            });
            i = end;
            text_start = i;
            continue;
        }

        if i + 1 < len && bytes[i + 1].is_ascii_alphabetic() {
            flush_text(&mut events, text_start, i);
            let (tag, end) = scan_open_tag(source, i);
            let raw_element = matches!(tag.name.as_str(), "script" | "style");
            let self_closing = tag.self_closing;
            let name = tag.name.clone();
            events.push(Event::OpenTag {
                name: tag.name,
                attrs: tag.attrs,
                self_closing,
                range: i..end,
            });
            i = end;
            text_start = i;

            if raw_element && !self_closing {
                let close_pat = format!("</{name}");
                let content_end = find_ascii_case_insensitive(&source[i..], &close_pat)
                    .map(|rel| i + rel)
                    .unwrap_or(len);
                events.push(Event::RawText {
                    element: name,
                    range: i..content_end,
                });
                i = content_end;
                text_start = i;
            }
            continue;
        }

        if i + 1 < len && bytes[i + 1] == b'!' {
            // doctype and friends
            flush_text(&mut events, text_start, i);
            let end = source[i..].find('>').map(|rel| i + rel + 1).unwrap_or(len);
            i = end;
            text_start = i;
            continue;
        }

        // stray '<' stays text
        i += 1;
    }

    flush_text(&mut events, text_start, len);
    events
}

struct OpenTag {
    name: String,
    attrs: Vec<Attribute>,
    self_closing: bool,
}

fn scan_name(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    let mut i = start;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    i
}

fn scan_open_tag(source: &str, start: usize) -> (OpenTag, usize) {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let name_end = scan_name(source, start + 1);
    let name = source[start + 1..name_end].to_ascii_lowercase();
    let mut attrs = Vec::new();
    let mut self_closing = false;
    let mut i = name_end;

    loop {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len {
            break;
        }
        if bytes[i] == b'>' {
            i += 1;
            break;
        }
        if bytes[i] == b'/' {
            if i + 1 < len && bytes[i + 1] == b'>' {
                self_closing = true;
                i += 2;
                break;
            }
            i += 1;
            continue;
        }

        // attribute name: anything up to whitespace, '=', '/' or '>'
        let attr_start = i;
        while i < len
            && !bytes[i].is_ascii_whitespace()
            && bytes[i] != b'='
            && bytes[i] != b'/'
            && bytes[i] != b'>'
        {
            i += 1;
        }
        if i == attr_start {
            i += 1;
            continue;
        }
        let attr_name = source[attr_start..i].to_string();

        let mut j = i;
        while j < len && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j < len && bytes[j] == b'=' {
            j += 1;
            while j < len && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j < len && (bytes[j] == b'"' || bytes[j] == b'\'') {
                let quote = bytes[j];
                let value_start = j;
                let mut k = j + 1;
                while k < len && bytes[k] != quote {
                    k += 1;
                }
                let value_end = (k + 1).min(len);
                attrs.push(Attribute {
                    name: attr_name,
                    value: Some(AttrValue {
                        range: value_start..value_end,
                        quoted: true,
                    }),
                });
                i = value_end;
            } else {
                let value_start = j;
                let mut k = j;
                while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    k += 1;
                }
                attrs.push(Attribute {
                    name: attr_name,
                    value: Some(AttrValue {
                        range: value_start..k,
                        quoted: false,
                    }),
                });
                i = k;
            }
        } else {
            attrs.push(Attribute {
                name: attr_name,
                value: None,
            });
        }
    }

    (
        OpenTag {
            name,
            attrs,
            self_closing,
        },
        i,
    )
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| {
        h[i..i + n.len()]
            .iter()
            .zip(n)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    })
}

/// `{{ … }}` interpolation regions inside a text slice
///
/// Returns `(outer, inner)` range pairs relative to the slice start; `outer`
/// includes the braces.
#[must_use]
pub fn interpolations(text: &str) -> Vec<(Range<usize>, Range<usize>)> {
    let mut out = Vec::new();
    let mut i = 0;
    while let Some(rel) = text[i..].find("{{") {
        let open = i + rel;
        match text[open + 2..].find("}}") {
            Some(rel_close) => {
                let inner_end = open + 2 + rel_close;
                out.push((open..inner_end + 2, open + 2..inner_end));
                i = inner_end + 2;
            }
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_text_and_tags() {
        let source = "<div>你好</div>";
        let events = scan(source);
        assert_eq!(events.len(), 3);
        match &events[1] {
            Event::Text { range } => assert_eq!(&source[range.clone()], "你好"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_scan_quoted_attribute_includes_quotes() {
        let source = r#"<input placeholder="请输入" />"#;
        let events = scan(source);
        match &events[0] {
            Event::OpenTag {
                attrs,
                self_closing,
                ..
            } => {
                assert!(*self_closing);
                let value = attrs[0].value.as_ref().unwrap();
                assert!(value.quoted);
                assert_eq!(&source[value.range.clone()], "\"请输入\"");
                assert_eq!(value.inner(source), "请输入");
                assert_eq!(source.as_bytes()[value.range.start - 1], b'=');
            }
            other => panic!("expected open tag, got {other:?}"),
        }
    }

    #[test]
    fn test_scan_unquoted_attribute() {
        let source = "<td width=中文></td>";
        let events = scan(source);
        match &events[0] {
            Event::OpenTag { attrs, .. } => {
                let value = attrs[0].value.as_ref().unwrap();
                assert!(!value.quoted);
                assert_eq!(&source[value.range.clone()], "中文");
            }
            other => panic!("expected open tag, got {other:?}"),
        }
    }

    #[test]
    fn test_scan_comment_separated_from_text() {
        let source = "<p>前<!-- 注释 -->后</p>";
        let events = scan(source);
        let texts: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                Event::Text { range } => Some(&source[range.clone()]),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["前", "后"]);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::Comment { range } if source[range.clone()].contains("注释"))));
    }

    #[test]
    fn test_scan_script_is_raw_text() {
        let source = "<script>const a = '1 < 2';</script>";
        let events = scan(source);
        match &events[1] {
            Event::RawText { element, range } => {
                assert_eq!(element, "script");
                assert_eq!(&source[range.clone()], "const a = '1 < 2';");
            }
            other => panic!("expected raw text, got {other:?}"),
        }
    }

    #[test]
    fn test_scan_vue_directive_attributes() {
        let source = r#"<a :title="msg" @click="go" v-if="ok">x</a>"#;
        let events = scan(source);
        match &events[0] {
            Event::OpenTag { attrs, .. } => {
                let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
                assert_eq!(names, vec![":title", "@click", "v-if"]);
            }
            other => panic!("expected open tag, got {other:?}"),
        }
    }

    #[test]
    fn test_scan_boolean_attribute() {
        let source = "<input disabled>";
        let events = scan(source);
        match &events[0] {
            Event::OpenTag { attrs, .. } => {
                assert_eq!(attrs[0].name, "disabled");
                assert!(attrs[0].value.is_none());
            }
            other => panic!("expected open tag, got {other:?}"),
        }
    }

    #[test]
    fn test_interpolations() {
        let text = "你好 {{ name }} 再见 {{n}}";
        let regions = interpolations(text);
        assert_eq!(regions.len(), 2);
        assert_eq!(&text[regions[0].1.clone()], " name ");
        assert_eq!(&text[regions[1].1.clone()], "n");
        assert!(text[regions[0].0.clone()].starts_with("{{"));
    }

    #[test]
    fn test_unterminated_tag_degrades() {
        let events = scan("<div class='x");
        assert!(!events.is_empty());
    }
}
