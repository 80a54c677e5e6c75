//! Stateful Hack assembly builder.
//!
//! [`AsmBuilder`] owns the output buffer, the monotonic jump-label counter
//! and the base name of the file being translated (used to namespace
//! `static` variables as `<file>.<index>`). All emission helpers live here
//! so the counter and name are never global state.

use phf::phf_map;
use std::path::Path;

use crate::parser::{Command, CommandType, TranslateError};

/// RAM addresses of the fixed VM symbols.
///
/// `temp` is a base address, not a pointer: `temp i` lives at RAM[5 + i].
/// RAM[13] is scratch for pop address resolution.
static FIXED_SYMBOLS: phf::Map<&'static str, i32> = phf_map! {
    "sp" => 0,
    "local" => 1,
    "argument" => 2,
    "this" => 3,
    "that" => 4,
    "temp" => 5,
};

const SCRATCH: i32 = 13;

pub struct AsmBuilder {
    out: String,
    jump_index: usize,
    name: String,
    comments: bool,
}

impl Default for AsmBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AsmBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: String::with_capacity(8192),
            jump_index: 0,
            name: String::new(),
            comments: true,
        }
    }

    /// Enables or disables the `// ...` source-echo lines. On by default.
    pub fn set_comments(&mut self, comments: bool) {
        self.comments = comments;
    }

    /// Sets the base name used to namespace `static` variables.
    pub fn set_name(&mut self, path: &Path) {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown");
        self.name.clear();
        self.name.push_str(name);
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }

    /// Emits a comment line when comments are enabled.
    pub fn comment(&mut self, s: &str) {
        if self.comments {
            self.out.push_str(s);
            self.out.push('\n');
        }
    }

    // A-instruction with a numeric address.
    fn at(&mut self, n: i32) {
        self.out.push_str(&format!("@{n}\n"));
    }

    // A-instruction with a name. Fixed VM symbols resolve to their RAM
    // address; anything else is emitted verbatim as a symbolic label.
    fn at_sym(&mut self, s: &str) {
        match FIXED_SYMBOLS.get(s) {
            Some(&addr) => self.at(addr),
            None => self.out.push_str(&format!("@{s}\n")),
        }
    }

    // C-instruction line.
    fn c(&mut self, s: &str) {
        self.out.push_str(s);
        self.out.push('\n');
    }

    // Next fresh jump label. The counter spans all files of one run.
    fn next_label(&mut self) -> String {
        self.jump_index += 1;
        format!("JUMP{}", self.jump_index)
    }

    // Label definition line.
    fn label(&mut self, s: &str) {
        self.out.push_str(&format!("({s})\n"));
    }

    // push D register on stack
    fn push_d(&mut self) {
        self.out.push_str("@0\nA=M\nM=D\n@0\nM=M+1\n");
    }

    // pop from stack to D register
    fn pop_d(&mut self) {
        self.out.push_str("@0\nM=M-1\nA=M\nD=M\n");
    }

    // pop from stack, leaving A at the popped slot
    fn pop_m(&mut self) {
        self.out.push_str("@0\nM=M-1\nA=M\n");
    }

    /// One-time prologue: SP=256, zeroed segment pointers, five stack
    /// slots reserved, jump to `Sys.init`.
    pub fn bootstrap(&mut self) {
        log::info!("Compiling bootstrap code");
        self.comment("// bootstrap section");
        self.at(256);
        self.c("D=A");
        self.at_sym("sp");
        self.c("M=D");
        for seg in ["local", "argument", "this", "that"] {
            self.at_sym(seg);
            self.c("M=0");
        }
        self.c("D=0");
        for _ in 0..5 {
            self.push_d();
        }
        self.at_sym("Sys.init");
        self.c("0;JMP");
    }

    /// Lowers one command to Hack assembly.
    pub fn generate(&mut self, cmd: &Command) -> Result<(), TranslateError> {
        match cmd.cmd {
            CommandType::Arithmetic => self.gen_arithmetic(&cmd.arg1)?,
            CommandType::Push => self.gen_push(&cmd.arg1, cmd.arg2)?,
            CommandType::Pop => self.gen_pop(&cmd.arg1, cmd.arg2)?,
            CommandType::Label => self.label(&cmd.arg1),
            CommandType::Goto => {
                self.at_sym(&cmd.arg1);
                self.c("0;JMP");
            }
            CommandType::If => {
                // jump if popped value is non-zero
                self.pop_d();
                self.at_sym(&cmd.arg1);
                self.c("D;JNE");
            }
            CommandType::Function => {
                self.label(&cmd.arg1);
                // reserve local slots, clearing is the compiler's job
                for _ in 0..cmd.arg2 {
                    self.push_d();
                }
            }
            CommandType::Call => self.gen_call(&cmd.arg1, cmd.arg2),
            CommandType::Return => self.gen_return(),
        }
        Ok(())
    }

    fn gen_arithmetic(&mut self, op: &str) -> Result<(), TranslateError> {
        // after the pops M is x and D is y, so "sub" computes M-D
        match op {
            "add" => {
                self.pop_d();
                self.pop_m();
                self.c("D=M+D");
            }
            "sub" => {
                self.pop_d();
                self.pop_m();
                self.c("D=M-D");
            }
            "and" => {
                self.pop_d();
                self.pop_m();
                self.c("D=D&M");
            }
            "or" => {
                self.pop_d();
                self.pop_m();
                self.c("D=D|M");
            }
            "neg" => {
                self.pop_m();
                self.c("D=-M");
            }
            "not" => {
                self.pop_m();
                self.c("D=!M");
            }
            "eq" | "gt" | "lt" => {
                self.pop_d();
                self.pop_m();
                self.c("D=M-D");
                let label_true = self.next_label();
                self.at_sym(&label_true);
                match op {
                    "eq" => self.c("D;JEQ"),
                    "gt" => self.c("D;JGT"),
                    _ => self.c("D;JLT"),
                }
                self.c("D=0");
                let label_end = self.next_label();
                self.at_sym(&label_end);
                self.c("0;JMP");
                self.label(&label_true);
                self.c("D=-1");
                self.label(&label_end);
            }
            _ => return Err(TranslateError::UnknownCommand),
        }
        self.push_d();
        Ok(())
    }

    fn gen_push(&mut self, segment: &str, index: i32) -> Result<(), TranslateError> {
        match segment {
            "constant" => {
                self.at(index);
                self.c("D=A");
            }
            "this" | "that" | "local" | "argument" => {
                self.at_sym(segment);
                self.c("D=M");
                self.at(index);
                self.c("A=A+D");
                self.c("D=M");
            }
            "temp" => {
                // base address, not a pointer
                self.at_sym(segment);
                self.c("D=A");
                self.at(index);
                self.c("A=A+D");
                self.c("D=M");
            }
            "pointer" => {
                let addr = Self::pointer_addr(index)?;
                self.at(addr);
                self.c("D=M");
            }
            "static" => {
                let name = format!("@{}.{}\n", self.name, index);
                self.out.push_str(&name);
                self.c("D=M");
            }
            _ => return Err(TranslateError::UnknownSegment),
        }
        self.push_d();
        Ok(())
    }

    fn gen_pop(&mut self, segment: &str, index: i32) -> Result<(), TranslateError> {
        match segment {
            "this" | "that" | "local" | "argument" => {
                self.at_sym(segment);
                self.c("D=M");
                self.at(index);
                self.c("D=D+A");
                self.at(SCRATCH);
                self.c("M=D");
                self.pop_d();
                self.at(SCRATCH);
                self.c("A=M");
                self.c("M=D");
            }
            "temp" => {
                self.at_sym(segment);
                self.c("D=A");
                self.at(index);
                self.c("D=D+A");
                self.at(SCRATCH);
                self.c("M=D");
                self.pop_d();
                self.at(SCRATCH);
                self.c("A=M");
                self.c("M=D");
            }
            "static" => {
                self.pop_d();
                let name = format!("@{}.{}\n", self.name, index);
                self.out.push_str(&name);
                self.c("M=D");
            }
            "pointer" => {
                let addr = Self::pointer_addr(index)?;
                self.pop_d();
                self.at(addr);
                self.c("M=D");
            }
            _ => return Err(TranslateError::UnknownSegment),
        }
        Ok(())
    }

    // pointer 0 -> this, pointer 1 -> that
    fn pointer_addr(index: i32) -> Result<i32, TranslateError> {
        match index {
            0 => Ok(3),
            1 => Ok(4),
            _ => Err(TranslateError::InvalidPointerIndex),
        }
    }

    fn gen_call(&mut self, function: &str, n_args: i32) {
        // push return address
        let ret = self.next_label();
        self.at_sym(&ret);
        self.c("D=A");
        self.push_d();
        // save caller frame: LCL, ARG, THIS, THAT
        for seg in ["local", "argument", "this", "that"] {
            self.at_sym(seg);
            self.c("D=M");
            self.push_d();
        }
        // ARG = sp - 5 - (n of args)
        self.at_sym("sp");
        self.c("D=M");
        self.at(5);
        self.c("D=D-A");
        self.at(n_args);
        self.c("D=D-A");
        self.at_sym("argument");
        self.c("M=D");
        // LCL = sp
        self.at_sym("sp");
        self.c("D=M");
        self.at_sym("local");
        self.c("M=D");
        // goto f
        self.at_sym(function);
        self.c("0;JMP");
        self.label(&ret);
    }

    fn gen_return(&mut self) {
        // FRAME = LCL, stashed in RAM[5]
        self.at_sym("local");
        self.c("D=M");
        self.at_sym("temp");
        self.c("M=D");
        // RET = *(FRAME-5), stashed in RAM[6] before the return value
        // overwrites that slot for zero-argument calls
        self.at(5);
        self.c("D=D-A");
        self.c("A=D");
        self.c("D=M");
        self.at_sym("temp");
        self.c("A=A+1");
        self.c("M=D");
        // *ARG = pop()
        self.pop_d();
        self.at_sym("argument");
        self.c("A=M");
        self.c("M=D");
        // sp = ARG + 1
        self.c("A=A+1");
        self.c("D=A");
        self.at_sym("sp");
        self.c("M=D");
        // restore THAT, THIS, ARG, LCL from the frame
        for (offset, seg) in [(1, "that"), (2, "this"), (3, "argument"), (4, "local")] {
            self.at_sym("temp");
            self.c("D=M");
            self.at(offset);
            self.c("A=D-A");
            self.c("D=M");
            self.at_sym(seg);
            self.c("M=D");
        }
        // goto RET
        self.at_sym("temp");
        self.c("A=A+1");
        self.c("A=M");
        self.c("0;JMP");
    }
}
