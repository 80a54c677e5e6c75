//! VM Translator - Main Entry Point
//!
//! Translates a `.vm` file, or every top-level `.vm` file of a directory,
//! into one Hack assembly program on standard output. The stream begins
//! with the bootstrap prologue; a shared jump-label counter spans all
//! files.
//!
//! # Usage
//! ```bash
//! vmtranslator [--no-comments] <file.vm | directory>
//! ```
//!
//! Exits 1 if any line failed to parse or generate.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use vmtranslator::{translate_file, AsmBuilder};

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} [--no-comments] <file.vm | directory>");
    process::exit(1);
}

/// Top-level `.vm` files of a directory, in name order. No recursion.
fn vm_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "vm"))
        .collect();
    files.sort();
    Ok(files)
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut comments = true;
    let mut path = None;
    for arg in &args[1..] {
        match arg.as_str() {
            "--no-comments" => comments = false,
            _ if path.is_none() => path = Some(PathBuf::from(arg)),
            _ => usage(&args[0]),
        }
    }
    let Some(path) = path else {
        usage(&args[0]);
    };

    let stat = match fs::metadata(&path) {
        Ok(stat) => stat,
        Err(e) => {
            log::error!("{}: {e}", path.display());
            process::exit(1);
        }
    };

    let mut b = AsmBuilder::new();
    b.set_comments(comments);
    b.bootstrap();

    let mut files = 0usize;
    let mut lines = 0usize;
    let mut exit_code = 0;

    let inputs = if stat.is_dir() {
        match vm_files(&path) {
            Ok(inputs) => inputs,
            Err(e) => {
                log::error!("{}: {e}", path.display());
                process::exit(1);
            }
        }
    } else {
        vec![path]
    };

    for input in &inputs {
        files += 1;
        match translate_file(&mut b, input) {
            Ok((n, ok)) => {
                lines += n;
                if !ok {
                    exit_code = 1;
                }
            }
            Err(e) => {
                log::error!("{}: {e}", input.display());
                exit_code = 1;
            }
        }
    }

    print!("{}", b.as_str());
    log::info!("Total {lines} lines in {files} VM files processed.");
    process::exit(exit_code);
}
