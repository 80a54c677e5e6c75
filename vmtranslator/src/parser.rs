//! Parsing of single VM source lines into command records.
//!
//! A line is split on single spaces; the leading token selects the command.
//! Errors are values: the caller logs them with line context and keeps going.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    If,
    Function,
    Return,
    Call,
}

/// One parsed VM command. `arg1` holds a segment name, an operator mnemonic
/// or a symbolic label; `arg2` is an index or operand count, 0 when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub cmd: CommandType,
    pub arg1: String,
    pub arg2: i32,
}

impl Command {
    fn new(cmd: CommandType, arg1: &str, arg2: i32) -> Self {
        Self {
            cmd,
            arg1: arg1.to_string(),
            arg2,
        }
    }
}

/// Per-line translation failure. Never fatal: the line is skipped and
/// counted, translation continues.
#[derive(Debug, PartialEq, Eq)]
pub enum TranslateError {
    UnknownCommand,
    MissingOperand,
    InvalidOperand,
    UnknownSegment,
    InvalidPointerIndex,
}

impl std::error::Error for TranslateError {}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnknownCommand => write!(f, "unrecognized command"),
            Self::MissingOperand => write!(f, "missing operand"),
            Self::InvalidOperand => write!(f, "malformed operand"),
            Self::UnknownSegment => write!(f, "wrong memory region"),
            Self::InvalidPointerIndex => write!(f, "wrong pointer"),
        }
    }
}

fn operand<'a>(tokens: &[&'a str], i: usize) -> Result<&'a str, TranslateError> {
    tokens.get(i).copied().ok_or(TranslateError::MissingOperand)
}

fn index_operand(tokens: &[&str], i: usize) -> Result<i32, TranslateError> {
    operand(tokens, i)?
        .parse()
        .map_err(|_| TranslateError::InvalidOperand)
}

/// Parses one non-empty, non-comment line into a [`Command`].
pub fn parse(s: &str) -> Result<Command, TranslateError> {
    let tokens: Vec<&str> = s.split(' ').collect();

    match tokens[0] {
        "push" => Ok(Command::new(
            CommandType::Push,
            operand(&tokens, 1)?,
            index_operand(&tokens, 2)?,
        )),
        "pop" => Ok(Command::new(
            CommandType::Pop,
            operand(&tokens, 1)?,
            index_operand(&tokens, 2)?,
        )),
        "add" | "sub" | "neg" | "eq" | "gt" | "lt" | "and" | "or" | "not" => {
            Ok(Command::new(CommandType::Arithmetic, tokens[0], 0))
        }
        "label" => Ok(Command::new(CommandType::Label, operand(&tokens, 1)?, 0)),
        "goto" => Ok(Command::new(CommandType::Goto, operand(&tokens, 1)?, 0)),
        "if-goto" => Ok(Command::new(CommandType::If, operand(&tokens, 1)?, 0)),
        "function" => Ok(Command::new(
            CommandType::Function,
            operand(&tokens, 1)?,
            index_operand(&tokens, 2)?,
        )),
        "call" => Ok(Command::new(
            CommandType::Call,
            operand(&tokens, 1)?,
            index_operand(&tokens, 2)?,
        )),
        "return" => Ok(Command::new(CommandType::Return, "", 0)),
        _ => Err(TranslateError::UnknownCommand),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        assert_eq!(
            parse("push constant 17").unwrap(),
            Command::new(CommandType::Push, "constant", 17)
        );
        assert_eq!(
            parse("pop local 2").unwrap(),
            Command::new(CommandType::Pop, "local", 2)
        );
    }

    #[test]
    fn test_arithmetic() {
        for op in ["add", "sub", "neg", "eq", "gt", "lt", "and", "or", "not"] {
            let c = parse(op).unwrap();
            assert_eq!(c.cmd, CommandType::Arithmetic);
            assert_eq!(c.arg1, op);
            assert_eq!(c.arg2, 0);
        }
    }

    #[test]
    fn test_flow() {
        assert_eq!(
            parse("label LOOP").unwrap(),
            Command::new(CommandType::Label, "LOOP", 0)
        );
        assert_eq!(
            parse("goto END").unwrap(),
            Command::new(CommandType::Goto, "END", 0)
        );
        assert_eq!(
            parse("if-goto LOOP").unwrap(),
            Command::new(CommandType::If, "LOOP", 0)
        );
    }

    #[test]
    fn test_function_call_return() {
        assert_eq!(
            parse("function Main.main 2").unwrap(),
            Command::new(CommandType::Function, "Main.main", 2)
        );
        assert_eq!(
            parse("call Math.multiply 2").unwrap(),
            Command::new(CommandType::Call, "Math.multiply", 2)
        );
        assert_eq!(
            parse("return").unwrap(),
            Command::new(CommandType::Return, "", 0)
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(parse("frobnicate"), Err(TranslateError::UnknownCommand));
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(parse("push"), Err(TranslateError::MissingOperand));
        assert_eq!(parse("push local"), Err(TranslateError::MissingOperand));
        assert_eq!(parse("goto"), Err(TranslateError::MissingOperand));
    }

    #[test]
    fn test_malformed_index() {
        assert_eq!(parse("push local x"), Err(TranslateError::InvalidOperand));
        assert_eq!(parse("call Foo.bar n"), Err(TranslateError::InvalidOperand));
    }
}
