//! VM code emission.
//!
//! [`CodeGen`] walks a parsed [`Class`] and writes one VM instruction per
//! line. It owns the symbol table and the per-class label counter, so all
//! state of a compilation lives in one value.

use std::io::{self, Write};

use crate::ast::{Class, ClassVarKind, KeywordConst, Stmt, Subroutine, SubroutineKind, Term, UnaryOp};
use crate::lexer::CompileError;
use crate::symbol_table::{SymbolTable, VarSegment};

pub struct CodeGen<W: Write> {
    w: W,
    class: String,
    current_fn: String,
    symbols: SymbolTable,
    label_index: usize,
}

impl<W: Write> CodeGen<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            class: String::new(),
            current_fn: String::new(),
            symbols: SymbolTable::new(),
            label_index: 0,
        }
    }

    /// Emits the whole class: class variables populate the symbol table,
    /// then each subroutine is lowered in order.
    pub fn gen_class(&mut self, class: &Class) -> Result<(), CompileError> {
        self.class = class.name.clone();
        for decl in &class.vars {
            let segment = match decl.kind {
                ClassVarKind::Static => VarSegment::Static,
                ClassVarKind::Field => VarSegment::Field,
            };
            for name in &decl.names {
                self.symbols.add(segment, &decl.typ, name);
            }
        }
        for sub in &class.subroutines {
            self.gen_subroutine(sub)?;
        }
        Ok(())
    }

    fn gen_subroutine(&mut self, sub: &Subroutine) -> Result<(), CompileError> {
        self.current_fn = sub.name.clone();
        self.symbols.clear_subroutine();

        let class = self.class.clone();
        match sub.kind {
            // a method receives the object as its hidden first argument
            SubroutineKind::Method => self.symbols.add(VarSegment::Argument, &class, "this"),
            // a constructor keeps the fresh object base in local 0
            SubroutineKind::Constructor => self.symbols.add(VarSegment::Local, &class, "this"),
            SubroutineKind::Function => {}
        }
        for p in &sub.params {
            self.symbols.add(VarSegment::Argument, &p.typ, &p.name);
        }
        for decl in &sub.locals {
            for name in &decl.names {
                self.symbols.add(VarSegment::Local, &decl.typ, name);
            }
        }

        let n_locals = self.symbols.count(VarSegment::Local);
        writeln!(self.w, "function {}.{} {}", self.class, sub.name, n_locals)?;

        if sub.kind == SubroutineKind::Method {
            self.line("push argument 0")?;
            self.line("pop pointer 0")?;
        }
        if sub.kind == SubroutineKind::Constructor {
            let n_fields = self.symbols.count(VarSegment::Field);
            self.push_const(n_fields as i32)?;
            self.line("call Memory.alloc 1")?;
            self.line("pop local 0")?;
            self.line("push local 0")?;
            self.line("pop pointer 0")?;
        }

        for stmt in &sub.body {
            self.gen_stmt(stmt)?;
        }
        Ok(())
    }

    fn gen_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Let { name, value } => {
                self.gen_term(value)?;
                self.pop_var(name)?;
            }
            Stmt::If {
                cond,
                then_stmts,
                else_stmts,
            } => {
                let if_else = self.next_label("if_else");
                let if_end = self.next_label("if_end");
                self.gen_term(cond)?;
                self.push_const(0)?;
                self.line("eq")?;
                writeln!(self.w, "if-goto {if_else}")?;
                for s in then_stmts {
                    self.gen_stmt(s)?;
                }
                writeln!(self.w, "goto {if_end}")?;
                writeln!(self.w, "label {if_else}")?;
                for s in else_stmts {
                    self.gen_stmt(s)?;
                }
                writeln!(self.w, "label {if_end}")?;
            }
            Stmt::While { cond, body } => {
                let start = self.next_label("while_start");
                let end = self.next_label("while_end");
                writeln!(self.w, "label {start}")?;
                self.gen_term(cond)?;
                self.push_const(0)?;
                self.line("eq")?;
                writeln!(self.w, "if-goto {end}")?;
                for s in body {
                    self.gen_stmt(s)?;
                }
                writeln!(self.w, "goto {start}")?;
                writeln!(self.w, "label {end}")?;
            }
            Stmt::Do(call) => {
                self.gen_term(call)?;
                // discard result
                self.line("pop temp 0")?;
            }
            Stmt::Return(expr) => {
                match expr {
                    Some(e) => self.gen_term(e)?,
                    None => self.push_const(0)?,
                }
                self.line("return")?;
            }
        }
        Ok(())
    }

    fn gen_term(&mut self, term: &Term) -> Result<(), CompileError> {
        match term {
            Term::Int(i) => self.push_const(*i)?,
            Term::Str(s) => {
                self.push_const(s.len() as i32)?;
                self.line("call String.new 1")?;
                for c in s.chars() {
                    self.push_const(c as i32)?;
                    self.line("call String.appendChar 2")?;
                }
            }
            Term::Keyword(kw) => match kw {
                KeywordConst::True => self.push_const(-1)?,
                KeywordConst::False | KeywordConst::Null => self.push_const(0)?,
                KeywordConst::This => self.line("push pointer 0")?,
            },
            Term::Var(name) => self.push_var(name)?,
            Term::Unary(op, inner) => {
                self.gen_term(inner)?;
                match op {
                    UnaryOp::Neg => self.line("neg")?,
                    UnaryOp::Not => self.line("not")?,
                }
            }
            Term::Binary { left, op, right } => {
                self.gen_term(left)?;
                self.gen_term(right)?;
                self.line(op.vm_code())?;
            }
            Term::Call {
                class_or_var,
                method,
                args,
            } => {
                let mut n = args.len();
                let receiver_type = self.symbols.get(class_or_var).map(|b| b.typ.clone());
                // a known variable makes this a method call on that object
                let callee = match receiver_type {
                    Some(typ) => {
                        self.push_var(class_or_var)?;
                        n += 1;
                        typ
                    }
                    None => class_or_var.clone(),
                };
                for arg in args {
                    self.gen_term(arg)?;
                }
                writeln!(self.w, "call {callee}.{method} {n}")?;
            }
            Term::CallLocal { method, args } => {
                self.line("push pointer 0")?;
                let n = args.len() + 1;
                for arg in args {
                    self.gen_term(arg)?;
                }
                writeln!(self.w, "call {}.{method} {n}", self.class)?;
            }
        }
        Ok(())
    }

    fn line(&mut self, s: &str) -> io::Result<()> {
        writeln!(self.w, "{s}")
    }

    // A negative constant has no literal form: push the magnitude, negate.
    fn push_const(&mut self, i: i32) -> io::Result<()> {
        if i < 0 {
            writeln!(self.w, "push constant {}", -i)?;
            writeln!(self.w, "neg")
        } else {
            writeln!(self.w, "push constant {i}")
        }
    }

    fn push_var(&mut self, name: &str) -> Result<(), CompileError> {
        match self.symbols.get(name) {
            Some(b) => {
                let (seg, idx) = (b.segment.vm_segment(), b.index);
                writeln!(self.w, "push {seg} {idx}")?;
                Ok(())
            }
            None => Err(self.undefined(name)),
        }
    }

    fn pop_var(&mut self, name: &str) -> Result<(), CompileError> {
        match self.symbols.get(name) {
            Some(b) => {
                let (seg, idx) = (b.segment.vm_segment(), b.index);
                writeln!(self.w, "pop {seg} {idx}")?;
                Ok(())
            }
            None => Err(self.undefined(name)),
        }
    }

    fn undefined(&self, name: &str) -> CompileError {
        CompileError::syntax(
            format!("var undefined {name}"),
            format!("{}.{}", self.class, self.current_fn),
        )
    }

    fn next_label(&mut self, tag: &str) -> String {
        let label = format!(
            "{}_{}{}",
            self.class.to_uppercase(),
            tag.to_uppercase(),
            self.label_index
        );
        self.label_index += 1;
        label
    }
}
