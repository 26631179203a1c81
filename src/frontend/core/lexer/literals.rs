//! Literal scanning implementations
//! Handles character literals, backtick literals, string templates and pragmas

use super::tokenizer::Lexer;
use crate::frontend::core::lexer::tokens::*;
use crate::util::diagnostic::DiagnosticCode;

/// Any character of a word (names, keywords and numbers share one token kind)
#[inline]
pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '%' | '$')
}

/// First character of a word
#[inline]
pub fn is_identifier_start(c: char) -> bool {
    is_identifier_char(c)
}

/// Literal delimited by `quote`, where a doubled quote is an escaped quote.
/// Stops at the end of the line when unterminated.
fn scan_quoted(
    lexer: &mut Lexer<'_>,
    quote: char,
) -> Token {
    lexer.advance();
    loop {
        match lexer.peek() {
            Some(c) if c == quote => {
                lexer.advance();
                if lexer.peek() == Some(quote) {
                    lexer.advance();
                } else {
                    return lexer.make_token(TokenKind::StringLiteral);
                }
            }
            None | Some('\n') | Some('\r') => return unterminated(lexer, "literal"),
            Some(_) => {
                lexer.advance();
            }
        }
    }
}

/// Scan `'text'`
pub fn scan_character_literal(lexer: &mut Lexer<'_>) -> Token {
    scan_quoted(lexer, '\'')
}

/// Scan `` `text` ``
pub fn scan_backtick_literal(lexer: &mut Lexer<'_>) -> Token {
    scan_quoted(lexer, '`')
}

/// Scan string template text after an opening `|` (`begin`) or a closing `}`.
///
/// `\` escapes the next character. `{` opens an embedded expression and
/// hands control back to the tokenizer until the matching `}`.
pub fn scan_template(
    lexer: &mut Lexer<'_>,
    begin: bool,
) -> Token {
    if begin && !lexer.state.allows_templates() {
        let span = lexer.span();
        let version = lexer.state.version();
        lexer.diagnostics.error(
            DiagnosticCode::VersionFeature,
            format!("String templates are not supported in ABAP {}", version),
            span,
        );
    }

    loop {
        match lexer.peek() {
            Some('\\') => {
                lexer.advance();
                if matches!(lexer.peek(), Some(c) if c != '\n') {
                    lexer.advance();
                }
            }
            Some('|') => {
                lexer.advance();
                let kind = if begin {
                    TokenKind::StringTemplate
                } else {
                    TokenKind::StringTemplateEnd
                };
                return lexer.make_token(kind);
            }
            Some('{') => {
                lexer.advance();
                lexer.state.enter_template();
                let kind = if begin {
                    TokenKind::StringTemplateBegin
                } else {
                    TokenKind::StringTemplateMiddle
                };
                return lexer.make_token(kind);
            }
            None | Some('\n') | Some('\r') => return unterminated(lexer, "string template"),
            Some(_) => {
                lexer.advance();
            }
        }
    }
}

/// Scan `##NAME` or `##NAME[PARAM]`
pub fn scan_pragma(lexer: &mut Lexer<'_>) -> Token {
    lexer.advance();
    lexer.advance();
    while let Some(c) = lexer.peek() {
        if is_identifier_char(c) {
            lexer.advance();
        } else {
            break;
        }
    }
    if lexer.peek() == Some('[') {
        while let Some(c) = lexer.advance() {
            if c == ']' || matches!(lexer.peek(), None | Some('\n')) {
                break;
            }
        }
    }

    if !lexer.state.allows_pragmas() {
        let span = lexer.span();
        let version = lexer.state.version();
        lexer.diagnostics.error(
            DiagnosticCode::VersionFeature,
            format!("Pragmas are not supported in ABAP {}", version),
            span,
        );
    }
    lexer.make_token(TokenKind::Pragma)
}

/// Error token covering the rest of the line
fn unterminated(
    lexer: &mut Lexer<'_>,
    what: &str,
) -> Token {
    lexer.skip_to_line_end();
    let span = lexer.span();
    lexer.diagnostics.error(
        DiagnosticCode::UnterminatedLiteral,
        format!("Unterminated {}", what),
        span,
    );
    lexer.make_token(TokenKind::Error)
}
