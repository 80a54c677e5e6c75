//! Jack compiler for the Hack platform.
//!
//! Translates Jack source into stack-oriented VM code in a single pass:
//! the [`lexer`] scans bytes, the [`parser`] builds a class syntax tree,
//! and [`code`] walks the tree against the [`symbol_table`] and writes one
//! VM instruction per line.
//!
//! Compilation errors are fatal. Each carries the offending source
//! fragment; no partial output is recovered.
//!
//! # Example
//!
//! ```rust
//! let src = "class Main { function void main() { return; } }";
//! let mut out = Vec::new();
//! jackc::compile(src, &mut out).unwrap();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "function Main.main 0\npush constant 0\nreturn\n"
//! );
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]

pub mod ast;
pub mod code;
pub mod lexer;
pub mod parser;
pub mod symbol_table;

pub use ast::Class;
pub use code::CodeGen;
pub use lexer::{CompileError, Lexer};
pub use parser::Parser;
pub use symbol_table::SymbolTable;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Compiles one Jack class from `source` into `w`.
pub fn compile<S, W>(source: S, w: W) -> Result<(), CompileError>
where
    S: Into<Vec<u8>>,
    W: Write,
{
    let class = Parser::new(Lexer::new(source)).parse_class()?;
    CodeGen::new(w).gen_class(&class)
}

/// Compiles `path/Name.jack` into `path/Name.vm`.
pub fn compile_path(path: &Path) -> Result<(), CompileError> {
    log::debug!("compiling {}", path.display());
    let source = fs::read(path)?;
    let out_path = path.with_extension("vm");
    let mut w = BufWriter::new(File::create(out_path)?);
    compile(source, &mut w)?;
    w.flush()?;
    Ok(())
}
