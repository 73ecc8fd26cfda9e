use std::iter::Peekable;
use std::str::Chars;

use crate::error::CallError;

/// Lexical token of the call-expression language.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    String(String),
    /// Raw numeric text; converted to a value at decode time.
    Number(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Equals,
    Minus,
}

impl Token {
    /// Human-readable description for parse error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier `{}`", name),
            Token::String(_) => "string literal".to_string(),
            Token::Number(text) => format!("number `{}`", text),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::LBrace => "`{`".to_string(),
            Token::RBrace => "`}`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Colon => "`:`".to_string(),
            Token::Equals => "`=`".to_string(),
            Token::Minus => "`-`".to_string(),
        }
    }
}

/// Split a call expression string into tokens.
///
/// Identifiers are `[A-Za-z_][A-Za-z0-9_]*`, numbers are decimal with an
/// optional fraction and exponent, and strings take single or double quotes
/// with `\\ \' \" \n \t \r` escapes. Anything else fails the parse.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, CallError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '[' => {
                chars.next();
                tokens.push(Token::LBracket);
            }
            ']' => {
                chars.next();
                tokens.push(Token::RBracket);
            }
            '{' => {
                chars.next();
                tokens.push(Token::LBrace);
            }
            '}' => {
                chars.next();
                tokens.push(Token::RBrace);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            ':' => {
                chars.next();
                tokens.push(Token::Colon);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Equals);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '\'' | '"' => {
                chars.next();
                tokens.push(lex_string(&mut chars, c)?);
            }
            c if c.is_ascii_digit() || c == '.' => {
                tokens.push(lex_number(&mut chars));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                tokens.push(lex_ident(&mut chars));
            }
            other => {
                return Err(CallError::Malformed(format!(
                    "Unexpected character `{}`",
                    other
                )))
            }
        }
    }

    Ok(tokens)
}

fn lex_string(chars: &mut Peekable<Chars>, quote: char) -> Result<Token, CallError> {
    let mut text = String::new();
    loop {
        match chars.next() {
            Some('\\') => match chars.next() {
                Some('\\') => text.push('\\'),
                Some('\'') => text.push('\''),
                Some('"') => text.push('"'),
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some('r') => text.push('\r'),
                Some(other) => {
                    return Err(CallError::Malformed(format!(
                        "Unknown escape sequence `\\{}`",
                        other
                    )))
                }
                None => {
                    return Err(CallError::Malformed("Unterminated string literal".to_string()))
                }
            },
            Some(c) if c == quote => return Ok(Token::String(text)),
            Some(c) => text.push(c),
            None => return Err(CallError::Malformed("Unterminated string literal".to_string())),
        }
    }
}

// Collects the shape digits [. digits] [eE [+-] digits]. The token keeps its
// raw text; decoding rejects it if the text is not a valid number.
fn lex_number(chars: &mut Peekable<Chars>) -> Token {
    let mut text = String::new();
    push_digits(&mut text, chars);

    if let Some(&'.') = chars.peek() {
        text.push('.');
        chars.next();
        push_digits(&mut text, chars);
    }

    if let Some(&c) = chars.peek() {
        if c == 'e' || c == 'E' {
            text.push(c);
            chars.next();
            if let Some(&sign) = chars.peek() {
                if sign == '+' || sign == '-' {
                    text.push(sign);
                    chars.next();
                }
            }
            push_digits(&mut text, chars);
        }
    }

    Token::Number(text)
}

fn push_digits(text: &mut String, chars: &mut Peekable<Chars>) {
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }
}

fn lex_ident(chars: &mut Peekable<Chars>) -> Token {
    let mut text = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '_' {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }
    Token::Ident(text)
}
