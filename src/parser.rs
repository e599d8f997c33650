// ABOUTME: Tokenizer and recursive-descent parser for Lisp source text

use crate::num::Rational;
use crate::value::Value;
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::value,
    IResult, Parser,
};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Quote,
    Str(String),
    Atom(String),
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '\'' | '"' | ';')
}

fn skip_ws_and_comments(input: &str) -> &str {
    let mut rest = input;
    loop {
        let trimmed = rest.trim_start();
        if trimmed.len() != rest.len() {
            rest = trimmed;
            continue;
        }
        if let Some(stripped) = rest.strip_prefix(';') {
            rest = match stripped.find('\n') {
                Some(idx) => &stripped[idx..],
                None => "",
            };
            continue;
        }
        break;
    }
    rest
}

/// Strings are delimited by `"`; `\"` is the only recognized in-string
/// escape, and strings may not span lines.
fn parse_string_token(input: &str) -> IResult<&str, Token> {
    let (input, _) = char('"')(input)?;
    let mut result = String::new();
    let mut chars = input.char_indices();
    loop {
        match chars.next() {
            None => {
                return Err(nom::Err::Error(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::Char,
                )))
            }
            Some((idx, '\n')) => {
                let _ = idx;
                return Err(nom::Err::Error(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::Char,
                )));
            }
            Some((idx, '"')) => {
                return Ok((&input[idx + 1..], Token::Str(result)));
            }
            Some((_, '\\')) => match chars.next() {
                Some((_, '"')) => result.push('"'),
                Some((_, other)) => {
                    result.push('\\');
                    result.push(other);
                }
                None => {
                    return Err(nom::Err::Error(nom::error::Error::new(
                        input,
                        nom::error::ErrorKind::Char,
                    )))
                }
            },
            Some((_, c)) => result.push(c),
        }
    }
}

fn parse_atom_token(input: &str) -> IResult<&str, Token> {
    let (input, s) = take_while1(|c: char| !is_delimiter(c)).parse(input)?;
    Ok((input, Token::Atom(s.to_string())))
}

fn next_token(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::LParen, char('(')),
        value(Token::RParen, char(')')),
        value(Token::LBracket, char('[')),
        value(Token::RBracket, char(']')),
        value(Token::Quote, char('\'')),
        parse_string_token,
        parse_atom_token,
    ))
    .parse(input)
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut rest = skip_ws_and_comments(input);
    while !rest.is_empty() {
        match next_token(rest) {
            Ok((r, tok)) => {
                tokens.push(tok);
                rest = skip_ws_and_comments(r);
            }
            Err(_) => {
                let snippet: String = rest.chars().take(20).collect();
                return Err(format!("unrecognized token near: {snippet:?}"));
            }
        }
    }
    Ok(tokens)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen | Token::LBracket => write!(f, "("),
            Token::RParen | Token::RBracket => write!(f, ")"),
            Token::Quote => write!(f, "'"),
            Token::Str(s) => write!(f, "\"{s}\""),
            Token::Atom(a) => write!(f, "{a}"),
        }
    }
}

/// Tokenizes `input` and renders each token as text, for the `tokenize-expr`
/// builtin (spec.md §6 String category).
pub fn tokenize_to_strings(input: &str) -> Result<Vec<String>, String> {
    Ok(tokenize(input)?.iter().map(|t| t.to_string()).collect())
}

/// Result of the bracket pre-pass (spec.md §4.E).
#[derive(Debug, Clone, PartialEq)]
pub enum BracketError {
    /// A closer matched the wrong opener kind, e.g. `(]`.
    Mismatched { offset: usize },
    /// A closer with no matching opener at all.
    EarlyClose { offset: usize, imbalance: i64 },
    /// Input ended with openers still unclosed.
    MissingClose { imbalance: i64 },
}

impl fmt::Display for BracketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketError::Mismatched { offset } => {
                write!(f, "mismatched bracket at byte offset {offset}")
            }
            BracketError::EarlyClose { offset, imbalance } => {
                write!(f, "unmatched closing bracket at byte offset {offset} (imbalance {imbalance})")
            }
            BracketError::MissingClose { imbalance } => {
                write!(f, "missing closing bracket(s) (imbalance {imbalance})")
            }
        }
    }
}

/// Walks the text outside strings and comments, verifying `(`/`)` and
/// `[`/`]` nest correctly. Run before tokenizing.
pub fn validate_brackets(input: &str) -> Result<(), BracketError> {
    let mut stack: Vec<char> = Vec::new();
    let mut net: i64 = 0;
    let mut chars = input.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => {
                while let Some(&(_, sc)) = chars.peek() {
                    chars.next();
                    if sc == '\\' {
                        chars.next();
                        continue;
                    }
                    if sc == '"' || sc == '\n' {
                        break;
                    }
                }
            }
            ';' => {
                while let Some(&(_, cc)) = chars.peek() {
                    chars.next();
                    if cc == '\n' {
                        break;
                    }
                }
            }
            '(' => {
                stack.push(')');
                net += 1;
            }
            '[' => {
                stack.push(']');
                net += 1;
            }
            ')' | ']' => {
                net -= 1;
                match stack.pop() {
                    Some(expected) if expected == c => {}
                    Some(_) => return Err(BracketError::Mismatched { offset: idx }),
                    None => return Err(BracketError::EarlyClose { offset: idx, imbalance: net }),
                }
            }
            _ => {}
        }
    }
    if net > 0 {
        return Err(BracketError::MissingClose { imbalance: net });
    }
    Ok(())
}

fn atom_to_value(s: &str) -> Value {
    match s {
        "#t" => Value::Bool(true),
        "#f" => Value::Bool(false),
        _ => match Rational::parse_literal(s) {
            Ok(r) => Value::Num(r),
            Err(_) => Value::Sym(s.to_string()),
        },
    }
}

fn parse_one_token(tokens: &[Token], pos: usize) -> Result<(Value, usize), String> {
    match tokens.get(pos) {
        None => Err("unexpected end of input".to_string()),
        Some(Token::Quote) => {
            let (expr, next) = parse_one_token(tokens, pos + 1)?;
            Ok((Value::from_vec(vec![Value::Sym("quote".to_string()), expr]), next))
        }
        Some(Token::LParen) => parse_list(tokens, pos + 1, &Token::RParen),
        Some(Token::LBracket) => parse_list(tokens, pos + 1, &Token::RBracket),
        Some(Token::RParen) | Some(Token::RBracket) => {
            Err("unexpected closing bracket".to_string())
        }
        Some(Token::Str(s)) => Ok((Value::Str(s.clone()), pos + 1)),
        Some(Token::Atom(a)) => Ok((atom_to_value(a), pos + 1)),
    }
}

fn parse_list(tokens: &[Token], mut pos: usize, closer: &Token) -> Result<(Value, usize), String> {
    let mut items = Vec::new();
    loop {
        match tokens.get(pos) {
            None => return Err("unterminated list".to_string()),
            Some(t) if t == closer => return Ok((Value::from_vec(items), pos + 1)),
            Some(Token::RParen) | Some(Token::RBracket) => {
                return Err("mismatched closing bracket".to_string())
            }
            Some(Token::Atom(a)) if a == "." && !items.is_empty() => {
                let (tail, next_pos) = parse_one_token(tokens, pos + 1)?;
                match tokens.get(next_pos) {
                    Some(t) if t == closer => {
                        let dotted = items
                            .into_iter()
                            .rev()
                            .fold(tail, |acc, item| Value::cons(item, acc));
                        return Ok((dotted, next_pos + 1));
                    }
                    _ => {
                        return Err(
                            "dotted pair must be followed by exactly one expression and the closer"
                                .to_string(),
                        )
                    }
                }
            }
            _ => {
                let (expr, next_pos) = parse_one_token(tokens, pos)?;
                items.push(expr);
                pos = next_pos;
            }
        }
    }
}

/// Parses every top-level expression in `input`.
pub fn parse_all(input: &str) -> Result<Vec<Value>, String> {
    validate_brackets(input).map_err(|e| e.to_string())?;
    let tokens = tokenize(input)?;
    let mut exprs = Vec::new();
    let mut pos = 0;
    while pos < tokens.len() {
        let (value, next) = parse_one_token(&tokens, pos)?;
        exprs.push(value);
        pos = next;
    }
    Ok(exprs)
}

/// Parses exactly one expression, erroring on trailing tokens.
pub fn parse(input: &str) -> Result<Value, String> {
    validate_brackets(input).map_err(|e| e.to_string())?;
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(Value::Nil);
    }
    let (value, next) = parse_one_token(&tokens, 0)?;
    if next != tokens.len() {
        return Err(format!("unexpected trailing input after token {next}"));
    }
    Ok(value)
}
