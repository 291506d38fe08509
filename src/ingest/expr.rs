//! 数量算式求值 (仅四则运算和括号)。
//!
//! 没有变量、函数调用或任何其他语法，调用方还需先通过字符白名单。

use thiserror::Error;

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("unexpected character '{0}' at {1}")]
    UnexpectedChar(char, usize),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NonFinite,
    #[error("expression nested too deeply")]
    TooDeep,
}

/// 计算表达式，如 "100*9" -> 900
pub fn evaluate(input: &str) -> Result<f64, ExprError> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    parser.skip_ws();
    if let Some(c) = parser.peek() {
        return Err(ExprError::UnexpectedChar(c, parser.pos));
    }
    if !value.is_finite() {
        return Err(ExprError::NonFinite);
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some('-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.factor()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Some('/') => {
                    self.pos += 1;
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(ExprError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    // factor := ('+' | '-') factor | '(' expr ')' | number
    fn factor(&mut self) -> Result<f64, ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        self.skip_ws();
        let result = match self.peek() {
            None => Err(ExprError::UnexpectedEnd),
            Some('+') => {
                self.pos += 1;
                self.factor()
            }
            Some('-') => {
                self.pos += 1;
                self.factor().map(|v| -v)
            }
            Some('(') => {
                self.pos += 1;
                let value = self.expr()?;
                self.skip_ws();
                match self.peek() {
                    Some(')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(c) => Err(ExprError::UnexpectedChar(c, self.pos)),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(ExprError::UnexpectedChar(c, self.pos)),
        };
        self.depth -= 1;
        result
    }

    fn number(&mut self) -> Result<f64, ExprError> {
        let start = self.pos;
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| ExprError::InvalidNumber(literal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_and_parentheses() {
        assert_eq!(evaluate("100*9"), Ok(900.0));
        assert_eq!(evaluate("2+3*4"), Ok(14.0));
        assert_eq!(evaluate("(2+3)*4"), Ok(20.0));
        assert_eq!(evaluate("10-4-3"), Ok(3.0));
        assert_eq!(evaluate("12/4/3"), Ok(1.0));
        assert_eq!(evaluate(" 1.5 * 2 "), Ok(3.0));
    }

    #[test]
    fn unary_signs() {
        assert_eq!(evaluate("-5+2"), Ok(-3.0));
        assert_eq!(evaluate("3*-2"), Ok(-6.0));
        assert_eq!(evaluate("1--1"), Ok(2.0));
        assert_eq!(evaluate("+.5"), Ok(0.5));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(evaluate("8/0"), Err(ExprError::DivisionByZero));
        assert_eq!(evaluate("8/(2-2)"), Err(ExprError::DivisionByZero));
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(evaluate(""), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("3*"), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("(1+2"), Err(ExprError::UnexpectedEnd));
        assert!(matches!(evaluate("1 2"), Err(ExprError::UnexpectedChar('2', _))));
        assert!(matches!(evaluate("2**3"), Err(ExprError::UnexpectedChar('*', _))));
        assert!(matches!(evaluate("1.2.3"), Err(ExprError::UnexpectedChar('.', _))));
        assert!(matches!(evaluate("()"), Err(ExprError::UnexpectedChar(')', _))));
        assert_eq!(evaluate("."), Err(ExprError::InvalidNumber(".".into())));
    }

    #[test]
    fn letters_are_never_evaluated() {
        assert!(matches!(evaluate("1+x"), Err(ExprError::UnexpectedChar('x', _))));
        assert!(evaluate("__import__").is_err());
    }

    #[test]
    fn deep_nesting_rejected() {
        let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(evaluate(&deep), Err(ExprError::TooDeep));
    }
}
