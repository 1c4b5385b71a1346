//! Style declaration and stylesheet parsing
//!
//! Handles two inputs: inline declaration lists (`color: red; padding: 4px`)
//! and stylesheets made of plain rules and `@media` blocks. Values are kept
//! as normalized source text; this is not a CSS value parser.

use crate::error::{ParseError, ParseResult};
use crate::lexer::{lex_style, StyleToken, TokenSpan};
use crate::text::normalize_value;
use indexmap::IndexMap;

/// Ordered property → value map
pub type Declarations = IndexMap<String, String>;

/// `selector { declarations }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBlock {
    pub selector: String,
    pub declarations: Declarations,
}

/// `@media <query> { rules }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlock {
    pub query: String,
    pub rules: Vec<RuleBlock>,
}

impl MediaBlock {
    /// Pixel value of a `max-width` feature in the query, if any
    pub fn max_width(&self) -> Option<u32> {
        media_max_width(&self.query)
    }
}

/// Parsed stylesheet: top-level rules, then media blocks, each in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    pub rules: Vec<RuleBlock>,
    pub media: Vec<MediaBlock>,
}

/// Parse an inline declaration list such as a `style` attribute value
pub fn parse_declarations(source: &str) -> ParseResult<Declarations> {
    parse_declarations_at(source, 0)
}

/// Like [`parse_declarations`], with error positions offset by `base`
pub fn parse_declarations_at(source: &str, base: usize) -> ParseResult<Declarations> {
    let mut parser = StyleParser::new(source, base)?;
    parser.parse_declaration_list(false)
}

/// Parse a stylesheet into rules and media blocks
pub fn parse_stylesheet(source: &str) -> ParseResult<StyleSheet> {
    let mut parser = StyleParser::new(source, 0)?;
    parser.parse_sheet()
}

/// Extract `N` from `(max-width: Npx)`
pub fn media_max_width(query: &str) -> Option<u32> {
    let lower = query.to_ascii_lowercase();
    let rest = &lower[lower.find("max-width")? + "max-width".len()..];
    let rest = rest.trim_start().strip_prefix(':')?.trim_start();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || !rest[digits.len()..].starts_with("px") {
        return None;
    }
    digits.parse().ok()
}

struct StyleParser<'src> {
    source: &'src str,
    base: usize,
    tokens: Vec<(StyleToken<'src>, TokenSpan)>,
    pos: usize,
}

impl<'src> StyleParser<'src> {
    fn new(source: &'src str, base: usize) -> ParseResult<Self> {
        let tokens =
            lex_style(source, base).map_err(|span| ParseError::lexer_error(span.start))?;
        Ok(Self {
            source,
            base,
            tokens,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<&(StyleToken<'src>, TokenSpan)> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<(StyleToken<'src>, TokenSpan)> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn end_pos(&self) -> usize {
        self.base + self.source.len()
    }

    fn slice(&self, start: usize, end: usize) -> &'src str {
        &self.source[start - self.base..end - self.base]
    }

    fn expect(&mut self, expected: StyleToken<'src>, what: &str) -> ParseResult<TokenSpan> {
        match self.advance() {
            Some((token, span)) if token == expected => Ok(span),
            Some((token, span)) => Err(ParseError::unexpected_token(
                span.start,
                what,
                describe(&token),
            )),
            None => Err(ParseError::unexpected_eof(self.end_pos())),
        }
    }

    fn parse_sheet(&mut self) -> ParseResult<StyleSheet> {
        let mut sheet = StyleSheet::default();

        while let Some((token, span)) = self.peek().cloned() {
            match token {
                StyleToken::AtKeyword(name) if name.eq_ignore_ascii_case("media") => {
                    self.advance();
                    sheet.media.push(self.parse_media(span)?);
                }
                StyleToken::AtKeyword(name) => {
                    return Err(ParseError::invalid_syntax(
                        span.start,
                        format!("Unsupported at-rule @{}", name),
                    ));
                }
                _ => sheet.rules.push(self.parse_rule()?),
            }
        }

        Ok(sheet)
    }

    fn parse_media(&mut self, at: TokenSpan) -> ParseResult<MediaBlock> {
        let query = self.prelude_until_brace(at.end)?;
        self.expect(StyleToken::LBrace, "'{'")?;

        let mut rules = Vec::new();
        loop {
            match self.peek() {
                Some((StyleToken::RBrace, _)) => {
                    self.advance();
                    break;
                }
                Some(_) => rules.push(self.parse_rule()?),
                None => return Err(ParseError::unexpected_eof(self.end_pos())),
            }
        }

        Ok(MediaBlock { query, rules })
    }

    fn parse_rule(&mut self) -> ParseResult<RuleBlock> {
        let start = match self.peek() {
            Some((_, span)) => span.start,
            None => return Err(ParseError::unexpected_eof(self.end_pos())),
        };
        let selector = self.prelude_until_brace(start)?;
        if selector.is_empty() {
            return Err(ParseError::invalid_syntax(start, "Rule is missing a selector"));
        }
        self.expect(StyleToken::LBrace, "'{'")?;
        let declarations = self.parse_declaration_list(true)?;
        self.expect(StyleToken::RBrace, "'}'")?;

        Ok(RuleBlock {
            selector,
            declarations,
        })
    }

    /// Source text from `start` up to (not including) the next `{`
    fn prelude_until_brace(&mut self, start: usize) -> ParseResult<String> {
        let mut end = start;
        loop {
            match self.peek() {
                Some((StyleToken::LBrace, _)) => break,
                Some((StyleToken::RBrace, span)) | Some((StyleToken::Semi, span)) => {
                    return Err(ParseError::unexpected_token(span.start, "'{'", "end of rule"));
                }
                Some((_, span)) => {
                    end = span.end;
                    self.advance();
                }
                None => return Err(ParseError::unexpected_eof(self.end_pos())),
            }
        }
        Ok(normalize_value(self.slice(start, end.max(start))))
    }

    /// `prop: value; prop: value` until `}` (when `in_block`) or end of input
    fn parse_declaration_list(&mut self, in_block: bool) -> ParseResult<Declarations> {
        let mut declarations = Declarations::new();

        loop {
            let (token, span) = match self.peek().cloned() {
                Some(next) => next,
                None if in_block => return Err(ParseError::unexpected_eof(self.end_pos())),
                None => break,
            };

            match token {
                StyleToken::Semi => {
                    self.advance();
                }
                StyleToken::RBrace if in_block => break,
                StyleToken::Word(name) => {
                    self.advance();
                    self.expect(StyleToken::Colon, "':'")?;
                    let value = self.parse_value(in_block)?;
                    if !value.is_empty() {
                        declarations.insert(name.to_ascii_lowercase(), value);
                    }
                }
                other => {
                    return Err(ParseError::unexpected_token(
                        span.start,
                        "property name",
                        describe(&other),
                    ));
                }
            }
        }

        Ok(declarations)
    }

    /// Value source text up to `;`, `}` or end, respecting parentheses
    fn parse_value(&mut self, in_block: bool) -> ParseResult<String> {
        let mut depth = 0usize;
        let mut range: Option<(usize, usize)> = None;

        while let Some((token, span)) = self.peek().cloned() {
            match token {
                StyleToken::Semi if depth == 0 => break,
                StyleToken::RBrace if depth == 0 && in_block => break,
                StyleToken::LBrace | StyleToken::RBrace => {
                    return Err(ParseError::unexpected_token(span.start, "value", describe(&token)));
                }
                StyleToken::LParen => depth += 1,
                StyleToken::RParen => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        ParseError::invalid_syntax(span.start, "Unbalanced ')' in value")
                    })?;
                }
                _ => {}
            }
            range = Some((range.map_or(span.start, |(start, _)| start), span.end));
            self.advance();
        }

        if depth > 0 {
            return Err(ParseError::invalid_syntax(self.end_pos(), "Unclosed '(' in value"));
        }

        Ok(range
            .map(|(start, end)| normalize_value(self.slice(start, end)))
            .unwrap_or_default())
    }
}

fn describe(token: &StyleToken<'_>) -> String {
    match token {
        StyleToken::LBrace => "'{'".to_string(),
        StyleToken::RBrace => "'}'".to_string(),
        StyleToken::Semi => "';'".to_string(),
        StyleToken::Colon => "':'".to_string(),
        StyleToken::LParen => "'('".to_string(),
        StyleToken::RParen => "')'".to_string(),
        StyleToken::Comma => "','".to_string(),
        StyleToken::Slash => "'/'".to_string(),
        StyleToken::AtKeyword(name) => format!("@{}", name),
        StyleToken::String(s) | StyleToken::Word(s) => format!("'{}'", s),
    }
}
