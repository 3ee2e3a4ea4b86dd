//! # Drafter Parser
//!
//! Two-way compiler between the document store and the editor source text.
//!
//! ```text
//! DocumentStore ──serializer──▶ source text
//!       ▲                          │
//!       └──reconstruct◀──parser◀───┘
//! ```
//!
//! Given the same [`BindingContext`], parsing is the inverse of serializing:
//! `serialize(parse(serialize(T))) == serialize(T)`.

pub mod ast;
pub mod diagnostic;
pub mod error;
pub mod expression;
pub mod id_generator;
pub mod markup;
pub mod parser;
pub mod reconstruct;
pub mod serializer;
pub mod tokenizer;

pub use diagnostic::{Diagnostic, DiagnosticLevel};
pub use error::{format_error, ParseError, ParseResult};
pub use expression::Expression;
pub use id_generator::IDGenerator;
pub use parser::Parser;
pub use reconstruct::{ParsedTree, Reconstructor};
pub use serializer::{module_name, Serializer};
pub use tokenizer::{tokenize, Token};

use drafter_document::{BindingContext, ElementLookup};

const INLINE_SOURCE_PATH: &str = "inline.jsx";

/// Parse editor source into elements
pub fn parse(source: &str, ctx: &BindingContext) -> ParseResult<ParsedTree> {
    parse_with_path(source, INLINE_SOURCE_PATH, ctx)
}

/// Parse editor source; `path` seeds ids generated for elements without one
pub fn parse_with_path(source: &str, path: &str, ctx: &BindingContext) -> ParseResult<ParsedTree> {
    let root = Parser::new(source).parse_document()?;
    Reconstructor::new(ctx, IDGenerator::new(path)).reconstruct(&root)
}

/// Serialize the tree under `root` as bare JSX
pub fn serialize<L: ElementLookup + ?Sized>(lookup: &L, root: &str, ctx: &BindingContext) -> String {
    Serializer::new(ctx).serialize(lookup, root)
}

/// Serialize the tree under `root` as a complete editor module
pub fn serialize_module<L: ElementLookup + ?Sized>(
    lookup: &L,
    root: &str,
    name: &str,
    ctx: &BindingContext,
) -> String {
    Serializer::new(ctx).serialize_module(lookup, root, name)
}
