//! Markup parser
//!
//! Turns an HTML-like fragment into a [`ComponentTree`]. The parser is a pure
//! function of its input: it validates structure (every non-void element is
//! closed, closing tags match) and either returns the whole tree or an
//! error, never a partial result.
//!
//! Normalization rules:
//! - whitespace-only text between elements is dropped
//! - other text has ASCII whitespace runs collapsed to one space
//! - `style` attributes become the node's base declarations
//! - `id` attributes become the node's explicit id
//! - comments and `<!DOCTYPE>` declarations are skipped
//! - `<style>`/`<script>` content is kept verbatim

use crate::error::{ParseError, ParseResult};
use crate::lexer::{MarkupToken, TagToken};
use crate::style::parse_declarations_at;
use crate::text::{collapse_whitespace, decode_entities};
use crate::tree::{is_raw_text_element, is_void_element, ComponentTree, NodeSpec};
use indexmap::IndexMap;
use logos::{Lexer, Logos};

/// Parse a markup fragment into a component tree
pub fn parse_fragment(source: &str) -> ParseResult<ComponentTree> {
    Parser::new(source).parse()
}

struct Attribute {
    name: String,
    value: String,
    /// Byte offset of the value inside the source
    value_pos: usize,
}

struct OpenElement {
    node: NodeSpec,
    pos: usize,
}

/// Stack-based markup parser
pub struct Parser<'src> {
    source: &'src str,
    lexer: Lexer<'src, MarkupToken<'src>>,
    stack: Vec<OpenElement>,
    roots: Vec<NodeSpec>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            lexer: MarkupToken::lexer(source),
            stack: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Parse the whole input
    pub fn parse(mut self) -> ParseResult<ComponentTree> {
        while let Some(result) = self.lexer.next() {
            let start = self.lexer.span().start;
            let token = result.map_err(|_| ParseError::lexer_error(start))?;

            match token {
                MarkupToken::Comment(_) | MarkupToken::Declaration(_) => {}
                MarkupToken::Text(raw) => {
                    if !raw.trim_matches(|c: char| c.is_ascii_whitespace()).is_empty() {
                        let content = decode_entities(&collapse_whitespace(raw));
                        self.push_node(NodeSpec::Text { content });
                    }
                }
                MarkupToken::OpenTag(name) => self.open_element(name, start)?,
                MarkupToken::CloseTag(name) => self.close_element(name, start)?,
            }
        }

        if let Some(open) = self.stack.pop() {
            let tag = open.node.tag().unwrap_or_default().to_string();
            return Err(ParseError::UnclosedTag { pos: open.pos, tag });
        }

        Ok(ComponentTree::new(self.roots))
    }

    fn push_node(&mut self, node: NodeSpec) {
        match self.stack.last_mut() {
            Some(OpenElement {
                node: NodeSpec::Element { children, .. },
                ..
            }) => children.push(node),
            _ => self.roots.push(node),
        }
    }

    fn open_element(&mut self, name: &str, start: usize) -> ParseResult<()> {
        let tag = name.to_ascii_lowercase();
        let (attributes, self_closing) = self.parse_tag_interior()?;
        let mut node = self.build_element(&tag, attributes)?;

        if is_void_element(&tag) || self_closing {
            self.push_node(node);
            return Ok(());
        }

        if is_raw_text_element(&tag) {
            let content = self.read_raw_text(&tag, start)?;
            if !content.trim().is_empty() {
                if let NodeSpec::Element { children, .. } = &mut node {
                    children.push(NodeSpec::Text { content });
                }
            }
            self.push_node(node);
            return Ok(());
        }

        self.stack.push(OpenElement { node, pos: start });
        Ok(())
    }

    fn close_element(&mut self, name: &str, start: usize) -> ParseResult<()> {
        let tag = name.to_ascii_lowercase();

        let open = match self.stack.pop() {
            Some(open) => open,
            None => return Err(ParseError::UnexpectedCloseTag { pos: start, tag }),
        };

        let open_tag = open.node.tag().unwrap_or_default();
        if open_tag != tag {
            return Err(ParseError::MismatchedTag {
                pos: start,
                expected: open_tag.to_string(),
                found: tag,
            });
        }

        self.push_node(open.node);
        Ok(())
    }

    /// Lex attributes up to `>` or `/>`; returns the attributes and whether
    /// the tag was self-closing
    fn parse_tag_interior(&mut self) -> ParseResult<(Vec<Attribute>, bool)> {
        let base = self.lexer.span().end;
        let mut tag_lexer = TagToken::lexer(self.lexer.remainder());
        let mut attributes = Vec::new();
        let mut pending: Option<String> = None;

        loop {
            let result = match tag_lexer.next() {
                Some(result) => result,
                None => return Err(ParseError::unexpected_eof(self.source.len())),
            };
            let span = tag_lexer.span();
            let pos = base + span.start;
            let token = result.map_err(|_| ParseError::lexer_error(pos))?;

            match token {
                TagToken::End | TagToken::SelfClose => {
                    if let Some(name) = pending.take() {
                        attributes.push(Attribute {
                            name,
                            value: String::new(),
                            value_pos: pos,
                        });
                    }
                    self.lexer.bump(span.end);
                    return Ok((attributes, token == TagToken::SelfClose));
                }
                TagToken::Word(word) => {
                    if let Some(name) = pending.replace(word.to_ascii_lowercase()) {
                        attributes.push(Attribute {
                            name,
                            value: String::new(),
                            value_pos: pos,
                        });
                    }
                }
                TagToken::Equals => {
                    let name = pending
                        .take()
                        .ok_or_else(|| ParseError::unexpected_token(pos, "attribute name", "'='"))?;

                    let value_result = match tag_lexer.next() {
                        Some(result) => result,
                        None => return Err(ParseError::unexpected_eof(self.source.len())),
                    };
                    let value_span = tag_lexer.span();
                    let value_pos = base + value_span.start;
                    let (value, value_pos) = match value_result {
                        Ok(TagToken::Quoted(value)) => (value, value_pos + 1),
                        Ok(TagToken::Word(value)) => (value, value_pos),
                        Ok(other) => {
                            return Err(ParseError::unexpected_token(
                                value_pos,
                                "attribute value",
                                format!("{:?}", other),
                            ));
                        }
                        Err(_) => return Err(ParseError::lexer_error(value_pos)),
                    };

                    attributes.push(Attribute {
                        name,
                        value: decode_entities(value),
                        value_pos,
                    });
                }
                TagToken::Quoted(_) => {
                    return Err(ParseError::unexpected_token(pos, "attribute name", "quoted value"));
                }
            }
        }
    }

    fn build_element(&self, tag: &str, attributes: Vec<Attribute>) -> ParseResult<NodeSpec> {
        let mut id = None;
        let mut styles = IndexMap::new();
        let mut attrs = IndexMap::new();

        for attribute in attributes {
            match attribute.name.as_str() {
                "id" => {
                    let value = attribute.value.trim();
                    if id.is_none() && !value.is_empty() {
                        id = Some(value.to_string());
                    }
                }
                "style" => {
                    for (property, value) in
                        parse_declarations_at(&attribute.value, attribute.value_pos)?
                    {
                        styles.entry(property).or_insert(value);
                    }
                }
                _ => {
                    attrs.entry(attribute.name).or_insert(attribute.value);
                }
            }
        }

        Ok(NodeSpec::Element {
            tag: tag.to_string(),
            id,
            attributes: attrs,
            styles,
            children: Vec::new(),
        })
    }

    /// Consume verbatim content up to the matching `</tag>`
    fn read_raw_text(&mut self, tag: &str, start: usize) -> ParseResult<String> {
        let remainder = self.lexer.remainder();
        let lower = remainder.to_ascii_lowercase();
        let closing = format!("</{}", tag);

        let end = lower.find(&closing).ok_or_else(|| ParseError::UnclosedTag {
            pos: start,
            tag: tag.to_string(),
        })?;
        let close_end = lower[end..].find('>').map(|i| end + i + 1).ok_or_else(|| {
            ParseError::UnclosedTag {
                pos: start,
                tag: tag.to_string(),
            }
        })?;

        let content = remainder[..end].to_string();
        self.lexer.bump(close_end);
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tree: &ComponentTree, index: usize) -> &NodeSpec {
        &tree.roots[index]
    }

    #[test]
    fn test_parse_nested_elements() {
        let tree = parse_fragment(
            r##"<nav style="display:flex;padding:20px"><strong>MySite</strong><a href="#home">Home</a></nav>"##,
        )
        .unwrap();

        assert_eq!(tree.roots.len(), 1);
        match element(&tree, 0) {
            NodeSpec::Element {
                tag,
                styles,
                children,
                ..
            } => {
                assert_eq!(tag, "nav");
                assert_eq!(styles["display"], "flex");
                assert_eq!(children.len(), 2);
                assert_eq!(children[1].tag(), Some("a"));
            }
            other => panic!("Expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_id_attribute_becomes_explicit_id() {
        let tree = parse_fragment(r#"<section id="home" class="hero"></section>"#).unwrap();
        match element(&tree, 0) {
            NodeSpec::Element { id, attributes, .. } => {
                assert_eq!(id.as_deref(), Some("home"));
                assert!(attributes.get("id").is_none());
                assert_eq!(attributes["class"], "hero");
            }
            other => panic!("Expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_only_text_is_dropped() {
        let tree = parse_fragment("\n  <div>\n    <p> Hi\n  there </p>\n  </div>\n").unwrap();
        assert_eq!(tree.roots.len(), 1);
        let p = tree.find_tag("p").unwrap();
        assert_eq!(
            p.children(),
            &[NodeSpec::Text {
                content: " Hi there ".to_string()
            }]
        );
    }

    #[test]
    fn test_void_and_self_closing_elements() {
        let tree = parse_fragment(
            r#"<p><strong>Q</strong><br/>A</p><img src="x.png"><input placeholder="Name"/>"#,
        )
        .unwrap();
        assert_eq!(tree.roots.len(), 3);
        assert_eq!(tree.roots[0].children().len(), 3);
        assert_eq!(tree.roots[1].tag(), Some("img"));
    }

    #[test]
    fn test_boolean_attribute() {
        let tree = parse_fragment("<input required>").unwrap();
        match element(&tree, 0) {
            NodeSpec::Element { attributes, .. } => assert_eq!(attributes["required"], ""),
            other => panic!("Expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_comments_are_skipped() {
        let tree = parse_fragment("<!-- NAVBAR --><nav></nav><!-- HERO -->").unwrap();
        assert_eq!(tree.roots.len(), 1);
    }

    #[test]
    fn test_entities_are_decoded() {
        let tree = parse_fragment(r#"<p title="a &quot;b&quot;">&copy; 2026 &amp; on</p>"#).unwrap();
        match element(&tree, 0) {
            NodeSpec::Element {
                attributes,
                children,
                ..
            } => {
                assert_eq!(attributes["title"], "a \"b\"");
                assert_eq!(
                    children[0],
                    NodeSpec::Text {
                        content: "© 2026 & on".to_string()
                    }
                );
            }
            other => panic!("Expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_style_content_is_raw() {
        let tree = parse_fragment("<style>#a{color:red;} p > a{x:y}</style>").unwrap();
        assert_eq!(
            tree.roots[0].children(),
            &[NodeSpec::Text {
                content: "#a{color:red;} p > a{x:y}".to_string()
            }]
        );
    }

    #[test]
    fn test_mismatched_close_tag() {
        let err = parse_fragment("<div><span></div>").unwrap_err();
        assert_eq!(
            err,
            ParseError::MismatchedTag {
                pos: 11,
                expected: "span".to_string(),
                found: "div".to_string(),
            }
        );
    }

    #[test]
    fn test_unclosed_tag() {
        let err = parse_fragment("<section><h2>Pricing</h2>").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnclosedTag {
                pos: 0,
                tag: "section".to_string()
            }
        );
    }

    #[test]
    fn test_stray_close_tag() {
        let err = parse_fragment("</div>").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedCloseTag { .. }));
    }

    #[test]
    fn test_unterminated_open_tag() {
        let err = parse_fragment(r#"<div class="x""#).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_bad_inline_style_reports_position() {
        let source = r#"<div style="color red"></div>"#;
        let err = parse_fragment(source).unwrap_err();
        // Position points inside the attribute value
        assert_eq!(err.pos(), source.find("red").unwrap());
    }
}
