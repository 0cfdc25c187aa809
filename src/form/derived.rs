use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::FormData;

/// Computes a derived field's value from its formula and the live form
/// data. Placeholders of the form `{field_id}` are replaced by the numeric
/// coercion of that field's current value (missing or non-numeric coerces
/// to 0), and the substituted expression is evaluated as plain arithmetic.
/// Returns `None` on any malformed expression instead of failing.
pub fn evaluate_formula(formula: &str, values: &FormData) -> Option<f64> {
    let substituted = placeholder().replace_all(formula, |caps: &regex::Captures<'_>| {
        numeric_value(values.get(&caps[1])).to_string()
    });
    let tokens = tokenize(&substituted)?;
    let mut parser = Parser { tokens, pos: 0 };
    let result = parser.expression()?;
    if parser.pos != parser.tokens.len() {
        return None;
    }
    Some(result)
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern"))
}

fn numeric_value(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0.0),
        Some(Value::Bool(flag)) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&ch) = chars.peek() {
        match ch {
            ' ' | '\t' => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&digit) = chars.peek() {
                    if digit.is_ascii_digit() || digit == '.' {
                        literal.push(digit);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(literal.parse().ok()?));
            }
            // Anything else (an unsubstituted identifier, stray brace)
            // makes the whole formula invalid.
            _ => return None,
        }
    }
    Some(tokens)
}

/// Recursive-descent parser over `+ - * /`, unary minus, and parentheses.
/// No identifiers remain after substitution, so the grammar is closed over
/// numeric literals.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn expression(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Some(value),
            }
        }
    }

    fn term(&mut self) -> Option<f64> {
        let mut value = self.factor()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    value /= self.factor()?;
                }
                _ => return Some(value),
            }
        }
    }

    fn factor(&mut self) -> Option<f64> {
        match self.peek()? {
            Token::Minus => {
                self.pos += 1;
                Some(-self.factor()?)
            }
            Token::Number(value) => {
                self.pos += 1;
                Some(value)
            }
            Token::Open => {
                self.pos += 1;
                let value = self.expression()?;
                match self.peek() {
                    Some(Token::Close) => {
                        self.pos += 1;
                        Some(value)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }
}
