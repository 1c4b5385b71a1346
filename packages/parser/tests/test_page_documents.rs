use pagecraft_parser::{parse_fragment, parse_page, parse_stylesheet, NodeSpec, ParseError};

const PAGE: &str = "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n\
<style>body{margin:0;}#home{padding:100px 20px;text-align:center;}\
@media (max-width: 375px){#home{padding:40px 10px;}}</style>\n</head>\n\
<body><nav><strong>MySite</strong></nav><section id=\"home\"><h1>Build Your Website Faster</h1></section></body>\n</html>";

#[test]
fn test_page_splits_head_and_body() {
    let page = parse_page(PAGE).unwrap();

    let tags: Vec<_> = page.body.roots.iter().filter_map(NodeSpec::tag).collect();
    assert_eq!(tags, vec!["nav", "section"]);

    let sheet = parse_stylesheet(&page.stylesheet).unwrap();
    assert_eq!(sheet.rules.len(), 2);
    assert_eq!(sheet.rules[0].selector, "body");
    assert_eq!(sheet.media[0].max_width(), Some(375));
    assert_eq!(sheet.media[0].rules[0].declarations["padding"], "40px 10px");
}

#[test]
fn test_page_body_ids_survive() {
    let page = parse_page(PAGE).unwrap();
    match &page.body.roots[1] {
        NodeSpec::Element { id, .. } => assert_eq!(id.as_deref(), Some("home")),
        other => panic!("Expected section, got {:?}", other),
    }
}

#[test]
fn test_page_without_styles() {
    let page = parse_page("<html><body><p>x</p></body></html>").unwrap();
    assert!(page.stylesheet.is_empty());
    assert_eq!(page.body.node_count(), 2);
}

#[test]
fn test_garbage_is_not_a_page() {
    assert!(parse_page("this is not html").is_err());
    assert!(parse_page("").is_err());
}

#[test]
fn test_inline_style_errors_do_not_yield_trees() {
    let result = parse_fragment(r#"<div style="color:red"><p style="margin:{0}">x</p></div>"#);
    assert!(matches!(result, Err(ParseError::UnexpectedToken { .. })));
}

#[test]
fn test_tree_serializes_to_json() {
    let tree = parse_fragment(r#"<a href="/x" style="color:red">Go</a>"#).unwrap();
    let json = serde_json::to_value(&tree).unwrap();

    assert_eq!(json[0]["type"], "element");
    assert_eq!(json[0]["tag"], "a");
    assert_eq!(json[0]["attributes"]["href"], "/x");
    assert_eq!(json[0]["styles"]["color"], "red");
    assert_eq!(json[0]["children"][0]["content"], "Go");
}
