//! JSX syntax tree produced by the parser before element reconstruction

use crate::expression::Expression;
use std::ops::Range;

pub type Span = Range<usize>;

#[derive(Debug, Clone, PartialEq)]
pub struct JsxElement {
    pub tag: String,
    pub attributes: Vec<JsxAttribute>,
    pub children: Vec<JsxChild>,
    pub self_closing: bool,
    pub span: Span,
}

impl JsxElement {
    pub fn attribute(&self, name: &str) -> Option<&JsxAttribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsxAttribute {
    pub name: String,
    pub value: AttrValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Bare attribute (`disabled`), equivalent to `{true}`
    Implicit,
    Str(String),
    Expr(JsxExpression),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            AttrValue::Expr(expr) => match &expr.expr {
                Expression::Str(s) => Some(s),
                _ => None,
            },
            AttrValue::Implicit => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxChild {
    Element(JsxElement),
    Text { value: String, span: Span },
    Expression(JsxExpression),
}

/// Braced expression with its raw text and classified form
#[derive(Debug, Clone, PartialEq)]
pub struct JsxExpression {
    pub raw: String,
    pub expr: Expression,
    pub span: Span,
}
