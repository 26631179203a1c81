//! Lexer module
//!
//! Single linear scan from source text to position-tagged tokens. Bad input
//! never aborts the scan: it yields `Error` tokens plus lexical diagnostics.

pub mod literals;
pub mod state;
pub mod tokenizer;
pub mod tokens;

// Re-export types
pub use tokenizer::Lexer;
pub use tokens::{Token, TokenIdx, TokenKind};

use crate::frontend::version::Version;
use crate::util::diagnostic::Diagnostic;

/// Lexer output: all tokens (comments and pragmas included) and diagnostics
#[derive(Debug, Clone, Default)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Tokenize source code for the given language version
pub fn tokenize(
    filename: &str,
    source: &str,
    version: Version,
) -> LexOutput {
    tracing::debug!("lexing {} ({} bytes, {})", filename, source.len(), version);

    let (tokens, diagnostics) = Lexer::new(filename, source, version).tokenize_all();

    tracing::debug!(
        "lexed {} tokens, {} lexical diagnostics",
        tokens.len(),
        diagnostics.len()
    );
    LexOutput {
        tokens,
        diagnostics: diagnostics.into_vec(),
    }
}

#[cfg(test)]
mod tests;
