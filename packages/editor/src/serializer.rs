//! Markup and stylesheet serialization
//!
//! Output is deterministic: depth-first, child order preserved, no
//! whitespace inserted. Parsing the output and serializing again yields the
//! same bytes, which is what makes stored pages round-trip.
//!
//! Stylesheet layout:
//!
//! ```text
//! .class{...}            unscoped class rules, registration order
//! body{...} #id{...}     base rules, one per style-bearing node, DFS order
//! @media (max-width: Npx){ .class{...} #id{...} }
//!                        one block per constrained device, registration order
//! ```

use crate::document::{Document, Node, NodeKind, ROOT_ID, ROOT_TAG};
use pagecraft_parser::text::{escape_attribute, escape_text};
use pagecraft_parser::{is_raw_text_element, is_void_element, Declarations};
use tracing::{debug, instrument};

/// Serialized form of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedDocument {
    /// Markup of the root's children
    pub markup: String,
    pub stylesheet: String,
}

#[instrument(skip(doc), fields(nodes = doc.len()))]
pub fn serialize(doc: &Document) -> SerializedDocument {
    let order = doc.subtree(ROOT_ID);

    let mut markup = String::new();
    if let Some(root) = doc.get(ROOT_ID) {
        for child in &root.children {
            write_node(doc, child, false, &mut markup);
        }
    }

    let stylesheet = write_stylesheet(doc, &order);
    debug!(
        markup_bytes = markup.len(),
        stylesheet_bytes = stylesheet.len(),
        "Serialized document"
    );

    SerializedDocument { markup, stylesheet }
}

/// Whether a node's id appears in markup: explicit ids always, generated
/// ids only when a rule targets the node
pub fn emits_id(doc: &Document, node: &Node) -> bool {
    node.explicit_id || !node.styles.is_empty() || doc.rules.has_node_rules(&node.id)
}

fn write_node(doc: &Document, id: &str, raw: bool, out: &mut String) {
    let Some(node) = doc.get(id) else {
        return;
    };

    let tag = match &node.kind {
        NodeKind::Text { content } => {
            if raw {
                out.push_str(content);
            } else {
                out.push_str(&escape_text(content));
            }
            return;
        }
        NodeKind::Element { tag } => tag,
    };

    out.push('<');
    out.push_str(tag);
    if emits_id(doc, node) {
        out.push_str(" id=\"");
        out.push_str(&escape_attribute(&node.id));
        out.push('"');
    }
    for (name, value) in &node.attributes {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
    }

    if is_void_element(tag) {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let raw = is_raw_text_element(tag);
    for child in &node.children {
        write_node(doc, child, raw, out);
    }

    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_stylesheet(doc: &Document, order: &[String]) -> String {
    let mut css = String::new();

    for (class, decls) in &doc.rules.classes {
        write_rule(&mut css, &format!(".{}", class), decls);
    }
    for id in order {
        if let Some(node) = doc.get(id) {
            write_rule(&mut css, &selector(id), &node.styles);
        }
    }

    for device in doc.devices.constrained() {
        let (Some(scoped), Some(query)) = (doc.rules.scoped.get(&device.id), device.media_query())
        else {
            continue;
        };

        let mut block = String::new();
        for (class, decls) in &scoped.classes {
            write_rule(&mut block, &format!(".{}", class), decls);
        }
        for id in order {
            if let Some(decls) = scoped.nodes.get(id) {
                write_rule(&mut block, &selector(id), decls);
            }
        }

        if !block.is_empty() {
            css.push_str("@media ");
            css.push_str(&query);
            css.push('{');
            css.push_str(&block);
            css.push('}');
        }
    }

    css
}

fn selector(id: &str) -> String {
    if id == ROOT_ID {
        ROOT_TAG.to_string()
    } else {
        format!("#{}", id)
    }
}

fn write_rule(out: &mut String, selector: &str, decls: &Declarations) {
    if decls.is_empty() {
        return;
    }
    out.push_str(selector);
    out.push('{');
    for (property, value) in decls {
        out.push_str(property);
        out.push(':');
        out.push_str(value);
        out.push(';');
    }
    out.push('}');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::DeviceManager;

    fn doc_with(markup: &str) -> Document {
        let mut doc = Document::new(DeviceManager::default());
        doc.insert(ROOT_ID, 0, markup).unwrap();
        doc
    }

    #[test]
    fn test_markup_is_compact() {
        let doc = doc_with("\n<nav>\n  <a href=\"#home\">Home</a>\n  <a>About</a>\n</nav>\n");
        assert_eq!(
            doc.serialize_markup().markup,
            r##"<nav><a href="#home">Home</a><a>About</a></nav>"##
        );
    }

    #[test]
    fn test_styles_move_to_stylesheet() {
        let doc = doc_with(r#"<section id="home" style="padding:20px;color:white"><h1 style="font-size:40px">Hi</h1></section>"#);
        let out = doc.serialize_markup();

        assert_eq!(
            out.markup,
            r#"<section id="home"><h1 id="c1">Hi</h1></section>"#
        );
        assert_eq!(
            out.stylesheet,
            "#home{padding:20px;color:white;}#c1{font-size:40px;}"
        );
    }

    #[test]
    fn test_media_blocks_follow_device_order() {
        let mut doc = doc_with(r#"<p id="p">x</p>"#);
        doc.set_style("p", Some("mobile"), "color", "red").unwrap();
        doc.set_style("p", Some("tablet"), "color", "green").unwrap();
        doc.set_style(ROOT_ID, None, "margin", "0").unwrap();

        assert_eq!(
            doc.serialize_markup().stylesheet,
            "body{margin:0;}\
             @media (max-width: 555px){#p{color:green;}}\
             @media (max-width: 375px){#p{color:red;}}"
        );
    }

    #[test]
    fn test_class_rules_come_first() {
        let mut doc = doc_with(r#"<p id="p" class="lead" style="margin:0">x</p>"#);
        doc.set_class_style("lead", None, "font-size", "20px").unwrap();
        doc.set_class_style("lead", Some("mobile"), "font-size", "16px").unwrap();

        let out = doc.serialize_markup();
        assert_eq!(out.markup, r#"<p id="p" class="lead">x</p>"#);
        assert_eq!(
            out.stylesheet,
            ".lead{font-size:20px;}#p{margin:0;}@media (max-width: 375px){.lead{font-size:16px;}}"
        );
    }

    #[test]
    fn test_void_boolean_and_escaping() {
        let doc = doc_with(
            r#"<form><input placeholder="Say &quot;hi&quot;" required><p>a &lt; b &amp; c</p></form>"#,
        );
        assert_eq!(
            doc.serialize_markup().markup,
            r#"<form><input placeholder="Say &quot;hi&quot;" required/><p>a &lt; b &amp; c</p></form>"#
        );
    }

    #[test]
    fn test_raw_text_elements_are_not_escaped() {
        let doc = doc_with("<script>if (a < b) { go(); }</script>");
        assert_eq!(
            doc.serialize_markup().markup,
            "<script>if (a < b) { go(); }</script>"
        );
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::new(DeviceManager::default());
        let out = doc.serialize_markup();
        assert!(out.markup.is_empty());
        assert!(out.stylesheet.is_empty());
    }
}
