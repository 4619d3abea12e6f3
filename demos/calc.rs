//! Integer calculator REPL.
//!
//! Usage: cargo run --example calc
//!
//! Demonstrates all four embedder hooks: evaluation, completeness detection
//! (unbalanced parentheses and trailing operators continue on the next
//! line), meta commands (#help, #cls, #history), and per-character line
//! coloring.

use repledit_core::{
    ClearType, Color, ConsoleInput, ConsoleOutput, ConsoleResult, Repl, ReplHandler, TextStyle,
};
use repledit_io::create_console_io;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(i64),
    Plus,
    Minus,
    Star,
    Slash,
    OpenParen,
    CloseParen,
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            c if c.is_ascii_digit() => {
                let mut value: i64 = 0;
                while let Some(digit) = chars.peek().and_then(|d| d.to_digit(10)) {
                    value = value
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(i64::from(digit)))
                        .ok_or_else(|| "number too large".to_string())?;
                    chars.next();
                }
                tokens.push(Token::Number(value));
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
                tokens.push(Token::OpenParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::CloseParen);
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl<'a> Parser<'a> {
    fn parse(tokens: &'a [Token]) -> Result<i64, String> {
        let mut parser = Parser {
            tokens,
            position: 0,
        };
        let value = parser.expression()?;
        if parser.position != tokens.len() {
            return Err("trailing input after expression".to_string());
        }
        Ok(value)
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expression(&mut self) -> Result<i64, String> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.advance();
                    value = value
                        .checked_add(self.term()?)
                        .ok_or_else(|| "overflow".to_string())?;
                }
                Token::Minus => {
                    self.advance();
                    value = value
                        .checked_sub(self.term()?)
                        .ok_or_else(|| "overflow".to_string())?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<i64, String> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.advance();
                    value = value
                        .checked_mul(self.factor()?)
                        .ok_or_else(|| "overflow".to_string())?;
                }
                Token::Slash => {
                    self.advance();
                    value = value
                        .checked_div(self.factor()?)
                        .ok_or_else(|| "division by zero".to_string())?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<i64, String> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Minus) => self
                .factor()?
                .checked_neg()
                .ok_or_else(|| "overflow".to_string()),
            Some(Token::OpenParen) => {
                let value = self.expression()?;
                match self.advance() {
                    Some(Token::CloseParen) => Ok(value),
                    _ => Err("missing closing parenthesis".to_string()),
                }
            }
            Some(token) => Err(format!("unexpected token {token:?}")),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

fn evaluate(text: &str) -> Result<i64, String> {
    Parser::parse(&tokenize(text)?)
}

#[derive(Default)]
struct CalcRepl {
    evaluated: Vec<String>,
}

impl ReplHandler for CalcRepl {
    fn evaluate_submission(&mut self, output: &dyn ConsoleOutput, text: &str) -> ConsoleResult<()> {
        match evaluate(text) {
            Ok(value) => {
                output.write_text(&format!("= {value}\r\n"))?;
                let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
                self.evaluated.push(format!("{flat} = {value}"));
            }
            Err(message) => output.write_styled_text(
                &format!("error: {message}\r\n"),
                &TextStyle::foreground(Color::Red),
            )?,
        }
        output.flush()
    }

    fn evaluate_meta_command(
        &mut self,
        output: &dyn ConsoleOutput,
        command: &str,
    ) -> ConsoleResult<()> {
        match command.trim() {
            "help" => {
                output.write_text("Integer arithmetic: + - * / and parentheses.\r\n")?;
                output.write_text("An open parenthesis or trailing operator continues\r\n")?;
                output.write_text("the expression on the next line.\r\n")?;
                output.write_text("Commands: #help, #cls (clear screen), #history (results).\r\n")?;
                output.write_text("Submit an empty line to exit.\r\n")?;
            }
            "cls" => {
                output.clear(ClearType::All)?;
                output.move_cursor_to(0, 0)?;
            }
            "history" => {
                if self.evaluated.is_empty() {
                    output.write_text("No expressions evaluated yet.\r\n")?;
                }
                for (index, entry) in self.evaluated.iter().enumerate() {
                    output.write_text(&format!("{:>3}  {entry}\r\n", index + 1))?;
                }
            }
            other => {
                output.write_text(&format!("Unknown command: #{other}\r\n"))?;
            }
        }
        output.flush()
    }

    fn is_complete_submission(&self, text: &str) -> bool {
        let mut depth = 0i32;
        for ch in text.chars() {
            match ch {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
        }
        if depth > 0 {
            return false;
        }
        !matches!(text.trim_end().chars().last(), Some('+' | '-' | '*' | '/'))
    }

    fn paint_line(&self, output: &dyn ConsoleOutput, line: &str) -> ConsoleResult<()> {
        for ch in line.chars() {
            let text = ch.to_string();
            if ch.is_ascii_digit() {
                output.write_styled_text(&text, &TextStyle::foreground(Color::Yellow))?;
            } else if matches!(ch, '+' | '-' | '*' | '/' | '(' | ')') {
                output.write_styled_text(&text, &TextStyle::foreground(Color::Magenta))?;
            } else {
                output.write_text(&text)?;
            }
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("repledit calculator. Type an expression, #help for help.");

    let (input, output) = create_console_io()?;
    let raw_guard = input.enable_raw_mode()?;

    let mut repl = Repl::new(input, output, Box::new(CalcRepl::default()));
    let result = repl.run();

    drop(raw_guard);
    result?;
    println!("Session ended.");
    Ok(())
}
