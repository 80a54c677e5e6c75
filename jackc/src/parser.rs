//! Recursive-descent parser producing the syntax tree of one class.
//!
//! Each production consumes tokens from the [`Lexer`] and returns an AST
//! node. Expression parsing flattens terms and operators into buffers,
//! then folds higher-precedence runs recursively, stitching the remainder
//! left to right.

use std::collections::VecDeque;

use phf::phf_map;

use crate::ast::{
    BinOp, Class, ClassVarDecl, ClassVarKind, KeywordConst, Param, Stmt, Subroutine,
    SubroutineKind, Term, UnaryOp, VarDecl,
};
use crate::lexer::{is_integer, is_literal, CompileError, Lexer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "class" => Keyword::Class,
    "constructor" => Keyword::Constructor,
    "function" => Keyword::Function,
    "method" => Keyword::Method,
    "field" => Keyword::Field,
    "static" => Keyword::Static,
    "var" => Keyword::Var,
    "int" => Keyword::Int,
    "char" => Keyword::Char,
    "boolean" => Keyword::Boolean,
    "void" => Keyword::Void,
    "true" => Keyword::True,
    "false" => Keyword::False,
    "null" => Keyword::Null,
    "this" => Keyword::This,
    "let" => Keyword::Let,
    "do" => Keyword::Do,
    "if" => Keyword::If,
    "else" => Keyword::Else,
    "while" => Keyword::While,
    "return" => Keyword::Return,
};

fn keyword_const(s: &str) -> Option<KeywordConst> {
    match KEYWORDS.get(s) {
        Some(Keyword::True) => Some(KeywordConst::True),
        Some(Keyword::False) => Some(KeywordConst::False),
        Some(Keyword::Null) => Some(KeywordConst::Null),
        Some(Keyword::This) => Some(KeywordConst::This),
        _ => None,
    }
}

pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    #[must_use]
    pub fn new(lexer: Lexer) -> Self {
        Self { lexer }
    }

    /// `'class' className '{' classVarDec* subroutineDec* '}'`
    pub fn parse_class(&mut self) -> Result<Class, CompileError> {
        if self.lexer.need_literal()? != "class" {
            return Err(self.lexer.fail("expecting classfile"));
        }
        let name = self.lexer.need_literal()?;
        self.lexer.need_char(b'{')?;

        let mut vars = Vec::new();
        let mut lit = self.lexer.peek_literal();
        while matches!(
            KEYWORDS.get(lit.as_str()),
            Some(Keyword::Static | Keyword::Field)
        ) {
            vars.push(self.parse_class_var()?);
            lit = self.lexer.peek_literal();
        }

        let mut subroutines = Vec::new();
        while matches!(
            KEYWORDS.get(lit.as_str()),
            Some(Keyword::Constructor | Keyword::Function | Keyword::Method)
        ) {
            subroutines.push(self.parse_subroutine()?);
            lit = self.lexer.peek_literal();
        }

        self.lexer.need_char(b'}')?;
        Ok(Class {
            name,
            vars,
            subroutines,
        })
    }

    /// `('static' | 'field') type varName (',' varName)* ';'`
    fn parse_class_var(&mut self) -> Result<ClassVarDecl, CompileError> {
        let kind = match self.lexer.need_literal()?.as_str() {
            "static" => ClassVarKind::Static,
            "field" => ClassVarKind::Field,
            _ => return Err(self.lexer.fail("unknown var")),
        };
        let typ = self.lexer.need_literal()?;
        let names = self.parse_name_list()?;
        Ok(ClassVarDecl { kind, typ, names })
    }

    // name (',' name)* ';'
    fn parse_name_list(&mut self) -> Result<Vec<String>, CompileError> {
        let mut names = vec![self.lexer.need_literal()?];
        while self.lexer.peek_char() == b',' {
            self.lexer.need_char(b',')?;
            names.push(self.lexer.need_literal()?);
        }
        self.lexer.need_char(b';')?;
        Ok(names)
    }

    /// `('constructor' | 'function' | 'method') ('void' | type) name
    /// '(' parameterList ')' subroutineBody`
    fn parse_subroutine(&mut self) -> Result<Subroutine, CompileError> {
        let kind = match self.lexer.need_literal()?.as_str() {
            "constructor" => SubroutineKind::Constructor,
            "function" => SubroutineKind::Function,
            "method" => SubroutineKind::Method,
            _ => return Err(self.lexer.fail("unknown subroutine modifier")),
        };
        let ret_type = self.lexer.need_literal()?;
        let name = self.lexer.need_literal()?;

        self.lexer.need_char(b'(')?;
        let mut params = Vec::new();
        if self.lexer.peek_char() != b')' {
            loop {
                let typ = self.lexer.need_literal()?;
                let name = self.lexer.need_literal()?;
                params.push(Param { typ, name });
                if self.lexer.peek_char() == b')' {
                    break;
                }
                self.lexer.need_char(b',')?;
            }
        }
        self.lexer.need_char(b')')?;

        let (locals, body) = self.parse_fn_body()?;
        Ok(Subroutine {
            kind,
            ret_type,
            name,
            params,
            locals,
            body,
        })
    }

    /// `'{' varDec* statements '}'`
    fn parse_fn_body(&mut self) -> Result<(Vec<VarDecl>, Vec<Stmt>), CompileError> {
        self.lexer.need_char(b'{')?;
        let mut locals = Vec::new();
        while self.lexer.peek_literal() == "var" {
            locals.push(self.parse_fn_var()?);
        }
        let body = self.parse_stmts()?;
        self.lexer.need_char(b'}')?;
        Ok((locals, body))
    }

    /// `'var' type varName (',' varName)* ';'`
    fn parse_fn_var(&mut self) -> Result<VarDecl, CompileError> {
        if self.lexer.need_literal()? != "var" {
            return Err(self.lexer.fail("expecting var declaration"));
        }
        let typ = self.lexer.need_literal()?;
        let names = self.parse_name_list()?;
        Ok(VarDecl { typ, names })
    }

    pub(crate) fn parse_stmts(&mut self) -> Result<Vec<Stmt>, CompileError> {
        let mut stmts = Vec::new();
        loop {
            let peek = self.lexer.peek_literal();
            let stmt = match KEYWORDS.get(peek.as_str()) {
                Some(Keyword::Let) => self.parse_let()?,
                Some(Keyword::If) => self.parse_if()?,
                Some(Keyword::While) => self.parse_while()?,
                Some(Keyword::Do) => self.parse_do()?,
                Some(Keyword::Return) => self.parse_return()?,
                _ => return Ok(stmts),
            };
            stmts.push(stmt);
        }
    }

    /// `'let' varName '=' expression ';'`
    fn parse_let(&mut self) -> Result<Stmt, CompileError> {
        if self.lexer.need_literal()? != "let" {
            return Err(self.lexer.fail("expecting let stmt"));
        }
        let name = self.lexer.need_literal()?;
        self.lexer.need_char(b'=')?;
        let value = self.require_expr()?;
        self.lexer.need_char(b';')?;
        Ok(Stmt::Let { name, value })
    }

    /// `'if' '(' expression ')' '{' statements '}'
    /// ('else' '{' statements '}')?`
    fn parse_if(&mut self) -> Result<Stmt, CompileError> {
        if self.lexer.need_literal()? != "if" {
            return Err(self.lexer.fail("expecting if stmt"));
        }
        self.lexer.need_char(b'(')?;
        let cond = self.require_expr()?;
        self.lexer.need_char(b')')?;
        self.lexer.need_char(b'{')?;
        let then_stmts = self.parse_stmts()?;
        self.lexer.need_char(b'}')?;

        let mut else_stmts = Vec::new();
        if self.lexer.peek_literal() == "else" {
            self.lexer.need_literal()?;
            self.lexer.need_char(b'{')?;
            else_stmts = self.parse_stmts()?;
            self.lexer.need_char(b'}')?;
        }
        Ok(Stmt::If {
            cond,
            then_stmts,
            else_stmts,
        })
    }

    /// `'while' '(' expression ')' '{' statements '}'`
    fn parse_while(&mut self) -> Result<Stmt, CompileError> {
        if self.lexer.need_literal()? != "while" {
            return Err(self.lexer.fail("expecting while stmt"));
        }
        self.lexer.need_char(b'(')?;
        let cond = self.require_expr()?;
        self.lexer.need_char(b')')?;
        self.lexer.need_char(b'{')?;
        let body = self.parse_stmts()?;
        self.lexer.need_char(b'}')?;
        Ok(Stmt::While { cond, body })
    }

    /// `'do' subroutineCall ';'`
    fn parse_do(&mut self) -> Result<Stmt, CompileError> {
        if self.lexer.need_literal()? != "do" {
            return Err(self.lexer.fail("expecting do stmt"));
        }
        let call = self.require_term()?;
        self.lexer.need_char(b';')?;
        Ok(Stmt::Do(call))
    }

    /// `'return' expression? ';'`
    fn parse_return(&mut self) -> Result<Stmt, CompileError> {
        if self.lexer.need_literal()? != "return" {
            return Err(self.lexer.fail("expecting return stmt"));
        }
        let expr = self.parse_expr()?;
        self.lexer.need_char(b';')?;
        Ok(Stmt::Return(expr))
    }

    /// Parses one term, or `None` when the next token cannot start one.
    pub fn parse_term(&mut self) -> Result<Option<Term>, CompileError> {
        self.lexer.skip_to_char();
        let Some(c) = self.lexer.read_byte() else {
            return Ok(None);
        };
        if is_literal(c) {
            self.lexer.unread_byte();
            return self.parse_literal_term().map(Some);
        }
        if is_integer(c) {
            self.lexer.unread_byte();
            return Ok(Some(Term::Int(self.lexer.read_int())));
        }
        match c {
            b'(' => {
                let term = self.require_expr()?;
                self.lexer.need_char(b')')?;
                Ok(Some(term))
            }
            b'"' => Ok(Some(Term::Str(self.lexer.read_string()))),
            b'-' => {
                let inner = self.require_term()?;
                Ok(Some(Term::Unary(UnaryOp::Neg, Box::new(inner))))
            }
            b'~' => {
                let inner = self.require_term()?;
                Ok(Some(Term::Unary(UnaryOp::Not, Box::new(inner))))
            }
            _ => {
                self.lexer.unread_byte();
                Ok(None)
            }
        }
    }

    // A term starting with a literal: keyword constant, variable, or a
    // subroutine call. The next non-space byte decides.
    fn parse_literal_term(&mut self) -> Result<Term, CompileError> {
        let s = self.lexer.read_literal();
        if let Some(kw) = keyword_const(&s) {
            return Ok(Term::Keyword(kw));
        }
        match self.lexer.peek_char() {
            b'.' => {
                self.lexer.need_char(b'.')?;
                let method = self.lexer.read_literal();
                self.lexer.need_char(b'(')?;
                let args = self.parse_expr_list()?;
                self.lexer.need_char(b')')?;
                Ok(Term::Call {
                    class_or_var: s,
                    method,
                    args,
                })
            }
            b'(' => {
                self.lexer.need_char(b'(')?;
                let args = self.parse_expr_list()?;
                self.lexer.need_char(b')')?;
                Ok(Term::CallLocal { method: s, args })
            }
            _ => Ok(Term::Var(s)),
        }
    }

    fn parse_op(&mut self) -> Option<BinOp> {
        self.lexer.skip_to_char();
        let c = self.lexer.read_byte()?;
        match BinOp::from_byte(c) {
            Some(op) => Some(op),
            None => {
                self.lexer.unread_byte();
                None
            }
        }
    }

    // ( expression (',' expression)* )?
    fn parse_expr_list(&mut self) -> Result<Vec<Term>, CompileError> {
        let mut exprs = Vec::new();
        let Some(first) = self.parse_expr()? else {
            return Ok(exprs);
        };
        exprs.push(first);
        while self.lexer.peek_char() == b',' {
            self.lexer.need_char(b',')?;
            exprs.push(self.require_expr()?);
        }
        Ok(exprs)
    }

    /// Parses a full expression, or `None` when no term is present.
    pub fn parse_expr(&mut self) -> Result<Option<Term>, CompileError> {
        let Some(first) = self.parse_term()? else {
            return Ok(None);
        };
        let mut terms = VecDeque::from([first]);
        let mut ops = VecDeque::new();
        while let Some(op) = self.parse_op() {
            ops.push_back(op);
            terms.push_back(self.require_term()?);
        }
        Ok(Some(next_expr(&mut terms, &mut ops, 0)))
    }

    fn require_expr(&mut self) -> Result<Term, CompileError> {
        self.parse_expr()?
            .ok_or_else(|| self.lexer.fail("incomplete expression"))
    }

    fn require_term(&mut self) -> Result<Term, CompileError> {
        self.parse_term()?
            .ok_or_else(|| self.lexer.fail("incomplete expression"))
    }
}

// Folds the flat term/op buffers into a tree. Consumes operators while
// they bind tighter than `priority`, recursing for each run so that equal
// precedence chains lean left.
fn next_expr(terms: &mut VecDeque<Term>, ops: &mut VecDeque<BinOp>, priority: u8) -> Term {
    let mut expr = terms.pop_front().expect("terms outnumber ops by one");
    while ops.front().is_some_and(|op| op.priority() > priority) {
        let op = ops.pop_front().expect("checked non-empty");
        let right = next_expr(terms, ops, op.priority());
        expr = Term::Binary {
            left: Box::new(expr),
            op,
            right: Box::new(right),
        };
    }
    expr
}
