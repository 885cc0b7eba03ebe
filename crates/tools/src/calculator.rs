//! Calculator: evaluates arithmetic expressions.
//!
//! Input is first stripped of everything except digits, `.`, `+ - * /` and
//! parentheses, so no other text ever reaches the evaluator. Evaluation is a
//! small recursive-descent parser.

use async_trait::async_trait;
use cortex_core::error::ToolError;
use cortex_core::tool::{CapabilityKind, Tool};

/// How much of a failed expression is echoed back.
const SHOWN_CHARS: usize = 80;

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "Calculator"
    }

    fn description(&self) -> &str {
        "Useful for answering math questions or evaluating expressions."
    }

    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Calculator
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        let expr = sanitize(input);
        match evaluate(&expr) {
            Ok(value) => Ok(format!("Result: {}", format_number(value))),
            Err(reason) => {
                let mut shown: String = expr.chars().take(SHOWN_CHARS).collect();
                if expr.len() > SHOWN_CHARS {
                    shown.push_str("...");
                }
                Err(ToolError::ExecutionFailed {
                    tool_name: self.name().into(),
                    reason: format!("Could not evaluate expression: {shown} ({reason})"),
                })
            }
        }
    }
}

/// Keep only characters the evaluator understands.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | '*' | '/' | '(' | ')'))
        .collect()
}

/// Integers print without a trailing `.0`.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

// ── Recursive-descent evaluator ───────────────────────────────────────────

/// Evaluate an arithmetic expression.
pub fn evaluate(expr: &str) -> Result<f64, String> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err("empty expression".into());
    }
    let mut parser = Parser::new(&tokens);
    let result = parser.parse_expr()?;
    if let Some(tok) = parser.peek() {
        return Err(format!("unexpected token {tok:?} at position {}", parser.pos));
    }
    if !result.is_finite() {
        return Err("result is not a finite number".into());
    }
    Ok(result)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start + 1;
                while let Some(&(i, d)) = chars.peek() {
                    if !(d.is_ascii_digit() || d == '.') {
                        break;
                    }
                    end = i + 1;
                    chars.next();
                }
                let literal = &input[start..end];
                let n = literal
                    .parse()
                    .map_err(|_| format!("invalid number '{literal}'"))?;
                Token::Number(n)
            }
            c => return Err(format!("unexpected character '{c}'")),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

/// Nesting limit for parentheses and unary signs combined.
const MAX_DEPTH: usize = 64;

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn descend(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err("expression nested too deeply".into());
        }
        Ok(())
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // expr = term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<f64, String> {
        let mut acc = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.bump();
                    acc += self.parse_term()?;
                }
                Some(Token::Minus) => {
                    self.bump();
                    acc -= self.parse_term()?;
                }
                _ => return Ok(acc),
            }
        }
    }

    // term = unary (('*' | '/') unary)*
    fn parse_term(&mut self) -> Result<f64, String> {
        let mut acc = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.bump();
                    acc *= self.parse_unary()?;
                }
                Some(Token::Slash) => {
                    self.bump();
                    let divisor = self.parse_unary()?;
                    if divisor == 0.0 {
                        return Err("division by zero".into());
                    }
                    acc /= divisor;
                }
                _ => return Ok(acc),
            }
        }
    }

    // unary = ('-' | '+') unary | primary
    fn parse_unary(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some(Token::Minus) => {
                self.bump();
                self.descend()?;
                let value = -self.parse_unary()?;
                self.depth -= 1;
                Ok(value)
            }
            Some(Token::Plus) => {
                self.bump();
                self.descend()?;
                let value = self.parse_unary()?;
                self.depth -= 1;
                Ok(value)
            }
            _ => self.parse_primary(),
        }
    }

    // primary = NUMBER | '(' expr ')'
    fn parse_primary(&mut self) -> Result<f64, String> {
        match self.bump() {
            Some(Token::Number(n)) => Ok(*n),
            Some(Token::LParen) => {
                self.descend()?;
                let inner = self.parse_expr()?;
                self.depth -= 1;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("expected closing parenthesis".into()),
                }
            }
            Some(tok) => Err(format!("unexpected token {tok:?}")),
            None => Err("unexpected end of expression".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_and_parentheses() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("((1 + 2) * (3 + 4))").unwrap(), 21.0);
    }

    #[test]
    fn unary_signs() {
        assert_eq!(evaluate("-5 + 3").unwrap(), -2.0);
        assert_eq!(evaluate("+4 * -2").unwrap(), -8.0);
    }

    #[test]
    fn decimals_and_division() {
        assert_eq!(evaluate("10 / 4").unwrap(), 2.5);
        assert!((evaluate("(10 + 5) / 3 - 2 * (1 + 1)").unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn evaluation_errors() {
        assert!(evaluate("1 / 0").is_err());
        assert!(evaluate("2 +").is_err());
        assert!(evaluate("").is_err());
        assert!(evaluate("1.2.3").is_err());
        assert!(evaluate("(1 + 2").is_err());
    }

    #[test]
    fn sanitize_strips_words() {
        assert_eq!(sanitize("What is 2 + 2?"), "2+2");
        assert_eq!(sanitize("import os"), "");
        assert_eq!(sanitize("__import__('os').system('ls')"), "()()");
    }

    #[test]
    fn nesting_within_limit_evaluates() {
        let expr = format!("{}7{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(evaluate(&expr).unwrap(), 7.0);
        assert_eq!(evaluate("--3").unwrap(), 3.0);
    }

    #[tokio::test]
    async fn deep_nesting_is_an_execution_error() {
        let parens = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        let err = CalculatorTool.execute(&parens).await.unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { ref reason, .. } if reason.contains("nested too deeply")));
        assert!(err.to_string().len() < 200);

        let signs = format!("{}1", "-".repeat(10_000));
        let err = CalculatorTool.execute(&signs).await.unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { ref reason, .. } if reason.contains("nested too deeply")));
    }

    #[tokio::test]
    async fn two_plus_two() {
        assert_eq!(CalculatorTool.execute("2 + 2").await.unwrap(), "Result: 4");
    }

    #[tokio::test]
    async fn decimal_result() {
        let out = CalculatorTool.execute("10 / 3").await.unwrap();
        assert!(out.starts_with("Result: 3.333"));
    }

    #[tokio::test]
    async fn non_arithmetic_is_an_error_observation() {
        let err = CalculatorTool.execute("import os").await.unwrap_err();
        match err {
            ToolError::ExecutionFailed { tool_name, reason } => {
                assert_eq!(tool_name, "Calculator");
                assert!(reason.starts_with("Could not evaluate expression:"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
