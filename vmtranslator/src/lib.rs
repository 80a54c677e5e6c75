//! VM-to-assembly translator for the Hack platform.
//!
//! Translates stack-machine VM code into symbolic Hack assembly in a single
//! pass. A run starts with a bootstrap prologue (SP=256, jump to
//! `Sys.init`), then appends the translation of each input file to one
//! shared [`AsmBuilder`]. The builder owns the jump-label counter, which is
//! monotonic across all files of a run, and the current file base name,
//! which namespaces `static` variables.
//!
//! Line errors are not fatal: each is logged with its line number and
//! source fragment, counted, and the line is skipped.
//!
//! # Example
//!
//! ```rust
//! use vmtranslator::{translate, AsmBuilder};
//!
//! let mut b = AsmBuilder::new();
//! b.set_comments(false);
//! let (lines, ok) = translate(&mut b, "push constant 7".as_bytes()).unwrap();
//! assert_eq!(lines, 1);
//! assert!(ok);
//! assert_eq!(b.as_str(), "@7\nD=A\n@0\nA=M\nM=D\n@0\nM=M+1\n");
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod code_writer;
pub mod parser;

pub use code_writer::AsmBuilder;
pub use parser::{parse, Command, CommandType, TranslateError};

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Translates one file into the builder, returning the number of lines
/// processed and whether all of them translated cleanly.
pub fn translate_file(b: &mut AsmBuilder, path: &Path) -> io::Result<(usize, bool)> {
    let file = File::open(path)?;
    b.set_name(path);
    translate(b, BufReader::new(file))
}

/// Translates VM source lines from a reader into the builder.
///
/// Blank lines are skipped. Comment lines are echoed verbatim and code
/// lines are echoed as `// <line>` when comments are enabled. A line that
/// fails to parse or generate is logged and counted; the run goes on.
pub fn translate<R: BufRead>(b: &mut AsmBuilder, reader: R) -> io::Result<(usize, bool)> {
    let mut err_found = false;
    let mut line_no = 0usize;

    for line in reader.lines() {
        let line = line?;
        line_no += 1;
        let s = line.trim();
        if s.is_empty() {
            continue;
        }
        if s.starts_with("//") {
            b.comment(s);
            continue;
        }
        b.comment(&format!("// {s}"));
        let result = parse(s).and_then(|c| b.generate(&c));
        if let Err(e) = result {
            log::warn!("Line {line_no} {e}: '{s}'");
            err_found = true;
        }
    }

    log::info!("{line_no} lines processed.");
    Ok((line_no, !err_found))
}
