//! # Pagecraft Parser
//!
//! Pure parsing for the composition engine:
//!
//! - markup fragments → [`ComponentTree`] ([`parse_fragment`])
//! - inline declarations and stylesheets ([`parse_declarations`], [`parse_stylesheet`])
//! - persisted page documents → stylesheet + body ([`parse_page`])
//!
//! Nothing here touches a live document; trees are detached values that the
//! editor inserts atomically.

pub mod error;
pub mod id_generator;
pub mod lexer;
pub mod page;
pub mod parser;
pub mod style;
pub mod text;
pub mod tree;


pub use error::{ParseError, ParseResult};
#[cfg(feature = "pretty-errors")]
pub use error::format_error;
pub use id_generator::IdGenerator;
pub use page::{parse_page, Page};
pub use parser::{parse_fragment, Parser};
pub use style::{
    media_max_width, parse_declarations, parse_stylesheet, Declarations, MediaBlock, RuleBlock,
    StyleSheet,
};
pub use tree::{is_raw_text_element, is_void_element, ComponentTree, NodeSpec};
