//! Lexers for markup and stylesheets using logos
//!
//! Markup is lexed in two layers: [`MarkupToken`] covers document content
//! (text, comments, tag boundaries) and [`TagToken`] covers the interior of
//! an opening tag. [`StyleToken`] covers inline `style` attributes and
//! `<style>` sheets.

use logos::{Lexer, Logos};

/// Content-level markup tokens
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
pub enum MarkupToken<'src> {
    #[regex(r"<!--([^-]|-[^-])*-->", |lex| lex.slice())]
    Comment(&'src str),

    /// `<!DOCTYPE html>` and friends
    #[regex(r"<![a-zA-Z][^>]*>", |lex| lex.slice())]
    Declaration(&'src str),

    /// `<tag` (attributes follow, lexed with [`TagToken`])
    #[regex(r"<[a-zA-Z][a-zA-Z0-9-]*", |lex| &lex.slice()[1..])]
    OpenTag(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*[ \t\r\n]*>", close_tag_name)]
    CloseTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

fn close_tag_name<'src>(lex: &mut Lexer<'src, MarkupToken<'src>>) -> &'src str {
    let slice = lex.slice();
    slice[2..slice.len() - 1].trim_end()
}

/// Tokens inside an opening tag, up to `>` or `/>`
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TagToken<'src> {
    #[token(">")]
    End,

    #[token("/>")]
    SelfClose,

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#, strip_quotes)]
    #[regex(r"'[^']*'", strip_quotes)]
    Quoted(&'src str),

    /// Attribute name or unquoted attribute value
    #[regex(r#"[^ \t\r\n\f"'<>/=`]+"#, |lex| lex.slice())]
    Word(&'src str),
}

fn strip_quotes<'src>(lex: &mut Lexer<'src, TagToken<'src>>) -> &'src str {
    let slice = lex.slice();
    &slice[1..slice.len() - 1]
}

/// Stylesheet and declaration tokens
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
pub enum StyleToken<'src> {
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token("/")]
    Slash,

    #[regex(r"@[a-zA-Z-]+", |lex| &lex.slice()[1..])]
    AtKeyword(&'src str),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice())]
    #[regex(r"'([^'\\]|\\.)*'", |lex| lex.slice())]
    String(&'src str),

    #[regex(r#"[^ \t\r\n\f{};:(),"'/@]+"#, |lex| lex.slice())]
    Word(&'src str),
}

/// Span information for a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

/// Lex a stylesheet or declaration list into tokens with absolute spans.
///
/// `base` is the byte offset of `source` inside the enclosing document, so
/// error positions point at the original input.
pub fn lex_style(
    source: &str,
    base: usize,
) -> Result<Vec<(StyleToken<'_>, TokenSpan)>, TokenSpan> {
    StyleToken::lexer(source)
        .spanned()
        .map(|(result, span)| {
            let span = TokenSpan {
                start: base + span.start,
                end: base + span.end,
            };
            result.map(|token| (token, span)).map_err(|_| span)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_markup_content() {
        let source = "<!-- nav --><nav class=\"x\">Hi</nav>";
        let tokens: Vec<_> = MarkupToken::lexer(source).filter_map(|r| r.ok()).collect();

        assert_eq!(tokens[0], MarkupToken::Comment("<!-- nav -->"));
        assert_eq!(tokens[1], MarkupToken::OpenTag("nav"));
        assert_eq!(tokens.last(), Some(&MarkupToken::CloseTag("nav")));
    }

    #[test]
    fn test_lex_doctype() {
        let tokens: Vec<_> = MarkupToken::lexer("<!DOCTYPE html>")
            .filter_map(|r| r.ok())
            .collect();
        assert_eq!(tokens, vec![MarkupToken::Declaration("<!DOCTYPE html>")]);
    }

    #[test]
    fn test_lex_tag_interior() {
        let source = r##" href="#home" data-x='1' required/>"##;
        let tokens: Vec<_> = TagToken::lexer(source).filter_map(|r| r.ok()).collect();

        assert_eq!(
            tokens,
            vec![
                TagToken::Word("href"),
                TagToken::Equals,
                TagToken::Quoted("#home"),
                TagToken::Word("data-x"),
                TagToken::Equals,
                TagToken::Quoted("1"),
                TagToken::Word("required"),
                TagToken::SelfClose,
            ]
        );
    }

    #[test]
    fn test_lex_style_skips_comments() {
        let tokens = lex_style("/* a */ color: #fff;", 0).unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].0, StyleToken::Word("color"));
        assert_eq!(tokens[2].0, StyleToken::Word("#fff"));
    }

    #[test]
    fn test_lex_style_spans_are_offset() {
        let tokens = lex_style("a:b", 10).unwrap();
        assert_eq!(tokens[0].1, TokenSpan { start: 10, end: 11 });
    }
}
