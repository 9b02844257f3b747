//! Parser for the circuit text format.
//!
//! One instruction per line: `NAME(arg, ...) target target ...`, where a
//! target is a qubit index or `rec[-k]`. Blocks open with `REPEAT n {`
//! and close with a line holding only `}`. `#` starts a comment.

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::instruction::{Instruction, MAX_INDEX};
use crate::lexer::{SpannedToken, Token, tokenize};
use crate::target::Target;

/// Parse circuit text.
pub fn parse(source: &str) -> IrResult<Circuit> {
    let mut parser = Parser::new(source)?;
    let circuit = parser.parse_block(false)?;
    Ok(circuit)
}

/// Parser state.
struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    line: usize,
}

impl Parser {
    fn new(source: &str) -> IrResult<Self> {
        let mut tokens = Vec::new();
        for result in tokenize(source) {
            match result {
                Ok(t) => tokens.push(t),
                Err((span, message)) => {
                    return Err(IrError::Lexer {
                        position: span.start,
                        message,
                    });
                }
            }
        }
        Ok(Self {
            tokens,
            pos: 0,
            line: 1,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        if token == Token::Newline {
            self.line += 1;
        }
        Some(token)
    }

    fn error(&self, message: impl Into<String>) -> IrError {
        IrError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> IrResult<()> {
        match self.advance() {
            Some(ref t) if t == expected => Ok(()),
            Some(t) => Err(self.error(format!("expected {what}, found {t:?}"))),
            None => Err(self.error(format!("expected {what}, found end of input"))),
        }
    }

    /// Consume the end of a line (a newline or end of input).
    fn expect_line_end(&mut self) -> IrResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(Token::Newline) => {
                self.advance();
                Ok(())
            }
            Some(t) => Err(self.error(format!("unexpected {t:?} at end of line"))),
        }
    }

    /// Parse lines until end of input, or until a closing brace when `nested`.
    fn parse_block(&mut self, nested: bool) -> IrResult<Circuit> {
        let mut circuit = Circuit::new();
        loop {
            match self.peek() {
                None if nested => return Err(self.error("unterminated REPEAT block")),
                None => return Ok(circuit),
                Some(Token::Newline) => {
                    self.advance();
                }
                Some(Token::RBrace) if nested => {
                    self.advance();
                    self.expect_line_end()?;
                    return Ok(circuit);
                }
                Some(Token::RBrace) => return Err(self.error("unmatched '}'")),
                Some(Token::Ident(name)) if name.eq_ignore_ascii_case("REPEAT") => {
                    self.advance();
                    let count = self.parse_count()?;
                    self.expect(&Token::LBrace, "'{'")?;
                    self.expect_line_end()?;
                    let body = self.parse_block(true)?;
                    circuit
                        .append_repeat(count, body)
                        .map_err(|e| self.error(e.to_string()))?;
                }
                Some(Token::Ident(_)) => {
                    let instruction = self.parse_instruction()?;
                    circuit.push(instruction);
                    self.expect_line_end()?;
                }
                Some(t) => return Err(self.error(format!("expected instruction, found {t:?}"))),
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn parse_count(&mut self) -> IrResult<u64> {
        match self.advance() {
            Some(Token::Number(n)) if n >= 0.0 && n.fract() == 0.0 => Ok(n as u64),
            _ => Err(self.error("REPEAT expects a non-negative integer count")),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn parse_instruction(&mut self) -> IrResult<Instruction> {
        let Some(Token::Ident(name)) = self.advance() else {
            return Err(self.error("expected instruction name"));
        };
        let gate = Gate::from_name(&name);

        let mut args = Vec::new();
        if self.peek() == Some(&Token::LParen) {
            self.advance();
            loop {
                match self.advance() {
                    Some(Token::Number(n)) => args.push(n),
                    _ => return Err(self.error(format!("expected number in arguments of {name}"))),
                }
                match self.advance() {
                    Some(Token::Comma) => {}
                    Some(Token::RParen) => break,
                    _ => return Err(self.error(format!("expected ',' or ')' after {name} argument"))),
                }
            }
        }

        let mut targets = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Number(n)) => {
                    let n = *n;
                    if n < 0.0 || n.fract() != 0.0 || n > f64::from(MAX_INDEX) {
                        return Err(self.error(format!("invalid qubit target {n}")));
                    }
                    self.advance();
                    targets.push(Target::Qubit(n as u32));
                }
                Some(Token::Rec(k)) => {
                    let k = *k;
                    self.advance();
                    targets.push(Target::Rec(k));
                }
                _ => break,
            }
        }

        Instruction::new(gate, targets, args).map_err(|e| self.error(e.to_string()))
    }
}
