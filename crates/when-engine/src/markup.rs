//! Chat timestamp markup (`<t:EPOCH:STYLE>`).
//!
//! Chat clients that understand this markup show each token in the reader's
//! own timezone and locale. The engine itself only produces
//! [`DisplayToken`]s; this module is the text adapter for such platforms.

use crate::format::{DisplayStyle, DisplayToken, ExpressionToken, ResolvedExpression};

impl DisplayStyle {
    /// Single-letter style code used in the markup.
    pub fn code(self) -> char {
        match self {
            DisplayStyle::LongDate => 'D',
            DisplayStyle::FullDateTime => 'f',
            DisplayStyle::ShortTime => 't',
        }
    }
}

pub fn render_token(token: &DisplayToken) -> String {
    format!("<t:{}:{}>", token.epoch, token.style.code())
}

pub fn render_expression_token(token: &ExpressionToken) -> String {
    match token {
        ExpressionToken::At { at } => render_token(at),
        ExpressionToken::Range { from, to } => {
            format!("{} to {}", render_token(from), render_token(to))
        }
    }
}

impl ResolvedExpression {
    /// Every token of this expression as markup, in order.
    pub fn markup(&self) -> Vec<String> {
        self.tokens.iter().map(render_expression_token).collect()
    }
}
