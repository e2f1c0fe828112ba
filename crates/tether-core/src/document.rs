#![forbid(unsafe_code)]

//! HTML template reader and serializer.
//!
//! The reader accepts the subset of HTML that templates use: elements with
//! quoted, unquoted, or bare attributes, void elements, self-closing tags,
//! text, comments, and a doctype. It is lenient about structure (a close tag
//! without a matching open tag is ignored, open elements are closed at end of
//! input) but strict about lexical errors: an unterminated tag, attribute
//! value, or comment fails with the byte offset where it started.
//!
//! Whitespace-only text is kept, as a browser would.

use crate::error::{DomError, Result};
use crate::node::{Node, is_void_element};

/// A parsed template: a fragment root plus lookup helpers.
#[derive(Debug, Clone)]
pub struct Document {
    root: Node,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::fragment(),
        }
    }

    /// Parse an HTML template.
    pub fn parse(html: &str) -> Result<Self> {
        let root = Reader::new(html).read()?;
        Ok(Self { root })
    }

    /// The fragment holding the top-level nodes.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// First element (document order) matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Result<Option<Node>> {
        self.root.query_selector(selector)
    }

    /// Serialize the whole document.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.root.inner_html()
    }
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
    stack: Vec<Node>,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            stack: vec![Node::fragment()],
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn current(&self) -> &Node {
        // The root fragment is never popped.
        &self.stack[self.stack.len() - 1]
    }

    fn read(mut self) -> Result<Node> {
        while self.pos < self.src.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.skip_comment()?;
            } else if rest.starts_with("<!") {
                self.skip_declaration()?;
            } else if rest.starts_with("</") {
                self.read_close_tag()?;
            } else if starts_tag(rest) {
                self.read_open_tag()?;
            } else {
                self.read_text()?;
            }
        }
        Ok(self.stack.swap_remove(0))
    }

    fn skip_comment(&mut self) -> Result<()> {
        match self.rest()[4..].find("-->") {
            Some(end) => {
                self.pos += 4 + end + 3;
                Ok(())
            }
            None => Err(DomError::parse(self.pos, "unterminated comment")),
        }
    }

    fn skip_declaration(&mut self) -> Result<()> {
        match self.rest().find('>') {
            Some(end) => {
                self.pos += end + 1;
                Ok(())
            }
            None => Err(DomError::parse(self.pos, "unterminated declaration")),
        }
    }

    fn read_text(&mut self) -> Result<()> {
        let rest = self.rest();
        // A lone `<` that does not start markup is literal text.
        let skip = usize::from(rest.starts_with('<'));
        let end = rest[skip..]
            .find('<')
            .map_or(rest.len(), |i| i + skip);
        let text = decode_entities(&rest[..end]);
        self.pos += end;
        self.current().append_child(&Node::text(text))
    }

    fn read_close_tag(&mut self) -> Result<()> {
        let start = self.pos;
        let Some(end) = self.rest().find('>') else {
            return Err(DomError::parse(start, "unterminated close tag"));
        };
        let name = self.rest()[2..end].trim().to_ascii_lowercase();
        self.pos += end + 1;
        let open = self
            .stack
            .iter()
            .rposition(|n| n.tag_name().as_deref() == Some(name.as_str()));
        if let Some(index) = open.filter(|&i| i > 0) {
            self.stack.truncate(index);
        }
        Ok(())
    }

    fn read_open_tag(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 1;
        let name_len = self
            .rest()
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
            .unwrap_or(self.rest().len());
        let element = Node::element(&self.rest()[..name_len]);
        self.pos += name_len;

        let self_closing = loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return Err(DomError::parse(start, "unterminated tag"));
            }
            if let Some(after) = rest.strip_prefix("/>") {
                self.pos = self.src.len() - after.len();
                break true;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break false;
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }
            let (name, value) = self.read_attribute(start)?;
            if !element.has_attribute(&name) {
                element.set_attribute(&name, &value);
            }
        };

        self.current().append_child(&element)?;
        let void = element.tag_name().is_some_and(|t| is_void_element(&t));
        if !self_closing && !void {
            self.stack.push(element);
        }
        Ok(())
    }

    fn read_attribute(&mut self, tag_start: usize) -> Result<(String, String)> {
        let rest = self.rest();
        let name_len = rest
            .char_indices()
            .find(|&(i, c)| {
                c.is_whitespace() || c == '=' || c == '>' || rest[i..].starts_with("/>")
            })
            .map_or(rest.len(), |(i, _)| i);
        let name = rest[..name_len].to_ascii_lowercase();
        self.pos += name_len;

        self.skip_whitespace();
        if !self.rest().starts_with('=') {
            return Ok((name, String::new()));
        }
        self.pos += 1;
        self.skip_whitespace();

        let rest = self.rest();
        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let Some(end) = rest[1..].find(quote) else {
                    return Err(DomError::parse(self.pos, "unterminated attribute value"));
                };
                self.pos += end + 2;
                &rest[1..=end]
            }
            Some(_) => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                self.pos += end;
                &rest[..end]
            }
            None => return Err(DomError::parse(tag_start, "unterminated tag")),
        };
        Ok((name, decode_entities(value)))
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }
}

fn starts_tag(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('<') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Decode HTML character references (named and numeric). Text that does
/// not form a known reference is kept verbatim.
#[must_use]
pub fn decode_entities(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

/// Escape text and attribute values for serialization.
pub(crate) fn escape_html(s: &str) -> String {
    v_htmlescape::escape(s).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_text() {
        let doc = Document::parse(r#"<div id="app"><p>{{msg}}</p><span>x</span></div>"#).unwrap();
        let app = doc.query_selector("#app").unwrap().unwrap();
        assert_eq!(app.child_count(), 2);
        let p = app.first_child().unwrap();
        assert_eq!(p.tag_name().as_deref(), Some("p"));
        assert_eq!(p.text_content(), "{{msg}}");
    }

    #[test]
    fn parses_directive_attributes() {
        let doc = Document::parse(
            r#"<input v-model="name" type=text disabled><button @click='submit' v-on:dblclick="x">Go</button>"#,
        )
        .unwrap();
        let input = doc.query_selector("input").unwrap().unwrap();
        assert_eq!(input.attribute("v-model").as_deref(), Some("name"));
        assert_eq!(input.attribute("type").as_deref(), Some("text"));
        assert_eq!(input.attribute("disabled").as_deref(), Some(""));
        assert_eq!(input.child_count(), 0);
        let button = doc.query_selector("button").unwrap().unwrap();
        assert_eq!(button.attribute("@click").as_deref(), Some("submit"));
        assert_eq!(button.attribute("v-on:dblclick").as_deref(), Some("x"));
        assert_eq!(button.text_content(), "Go");
    }

    #[test]
    fn void_and_self_closing_elements_take_no_children() {
        let doc = Document::parse("<div><br><img src=a.png/><custom/>after</div>").unwrap();
        let div = doc.query_selector("div").unwrap().unwrap();
        let tags: Vec<_> = div
            .children()
            .iter()
            .map(|n| n.tag_name().unwrap_or_else(|| "#text".into()))
            .collect();
        assert_eq!(tags, ["br", "img", "custom", "#text"]);
        let img = doc.query_selector("img").unwrap().unwrap();
        assert_eq!(img.attribute("src").as_deref(), Some("a.png/"));
    }

    #[test]
    fn skips_comments_and_doctype() {
        let doc = Document::parse("<!DOCTYPE html><!-- note --><p>a</p>").unwrap();
        assert_eq!(doc.root().child_count(), 1);
        assert_eq!(doc.to_html(), "<p>a</p>");
    }

    #[test]
    fn recovers_from_unbalanced_close_tags() {
        let doc = Document::parse("<div><p>a</span></div><b>c").unwrap();
        assert_eq!(doc.to_html(), "<div><p>a</p></div><b>c</b>");
    }

    #[test]
    fn lone_angle_bracket_is_text() {
        let doc = Document::parse("<p>1 < 2</p>").unwrap();
        assert_eq!(doc.root().text_content(), "1 < 2");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("&#65;&#x42;&quot;"), "AB\"");
        assert_eq!(decode_entities("&bogus; & ;"), "&bogus; & ;");
    }

    #[test]
    fn decodes_named_entities_beyond_the_basic_five() {
        let doc = Document::parse("<p>&copy; 2024 &hellip; &mdash;</p>").unwrap();
        let p = doc.query_selector("p").unwrap().unwrap();
        assert_eq!(p.text_content(), "\u{a9} 2024 \u{2026} \u{2014}");
        assert_eq!(doc.to_html(), "<p>\u{a9} 2024 \u{2026} \u{2014}</p>");
    }

    #[test]
    fn named_entity_in_attribute_is_decoded_once() {
        let doc = Document::parse(r#"<a title="&laquo;x&raquo; &amp;amp;">y</a>"#).unwrap();
        let a = doc.query_selector("a").unwrap().unwrap();
        assert_eq!(a.attribute("title").as_deref(), Some("\u{ab}x\u{bb} &amp;"));
        assert_eq!(doc.to_html(), "<a title=\"\u{ab}x\u{bb} &amp;amp;\">y</a>");
    }

    #[test]
    fn escaping_covers_markup_and_quotes() {
        assert_eq!(escape_html(r#"<b a="1">&"#), "&lt;b a=&quot;1&quot;&gt;&amp;");
        assert_eq!(decode_entities(&escape_html("it's a/b")), "it's a/b");
    }

    #[test]
    fn reports_unterminated_markup() {
        for (src, offset) in [
            ("<p>ok</p><div", 9),
            ("<a href=\"x>", 8),
            ("<!-- open", 0),
            ("<p>x</p", 4),
        ] {
            match Document::parse(src) {
                Err(DomError::Parse { offset: got, .. }) => assert_eq!(got, offset, "{src:?}"),
                other => panic!("expected parse error for {src:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn serializes_back_to_equivalent_markup() {
        let src = r#"<div id="app"><input v-model="t" value="a"><p>x &amp; y</p></div>"#;
        let doc = Document::parse(src).unwrap();
        assert_eq!(doc.to_html(), src);
    }
}
