//! Standalone page documents
//!
//! A page is the persisted form of a document: an HTML envelope whose
//! `<head>` carries the stylesheet in `<style>` elements and whose `<body>`
//! carries the component markup.

use crate::error::{ParseError, ParseResult};
use crate::parser::parse_fragment;
use crate::tree::{ComponentTree, NodeSpec};

/// Stylesheet and body extracted from a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Concatenated content of every `<style>` element in the head
    pub stylesheet: String,
    /// Children of `<body>`
    pub body: ComponentTree,
}

/// Parse a complete page document
pub fn parse_page(source: &str) -> ParseResult<Page> {
    let tree = parse_fragment(source)?;

    let body = tree
        .find_tag("body")
        .ok_or_else(|| ParseError::invalid_syntax(source.len(), "Document has no <body>"))?;

    let stylesheet = match tree.find_tag("head") {
        Some(head) => collect_styles(head),
        None => String::new(),
    };

    Ok(Page {
        stylesheet,
        body: ComponentTree::new(body.children().to_vec()),
    })
}

fn collect_styles(head: &NodeSpec) -> String {
    head.children()
        .iter()
        .filter(|child| child.tag() == Some("style"))
        .flat_map(|style| style.children())
        .filter_map(|text| match text {
            NodeSpec::Text { content } => Some(content.as_str()),
            NodeSpec::Element { .. } => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_envelope() {
        let source = "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n\
                      <style>#c1{color:red;}</style>\n</head>\n\
                      <body><nav id=\"c1\">Hi</nav></body>\n</html>";
        let page = parse_page(source).unwrap();

        assert_eq!(page.stylesheet, "#c1{color:red;}");
        assert_eq!(page.body.roots.len(), 1);
        assert_eq!(page.body.roots[0].tag(), Some("nav"));
    }

    #[test]
    fn test_missing_body() {
        let err = parse_page("<html><head></head></html>").unwrap_err();
        assert!(matches!(err, ParseError::InvalidSyntax { .. }));
    }

    #[test]
    fn test_truncated_page() {
        let err = parse_page("<!DOCTYPE html><html><head><style>#a{}</style></head><body><div>").unwrap_err();
        assert!(matches!(err, ParseError::UnclosedTag { .. }));
    }
}
