//! Jack Compiler - Main Entry Point
//!
//! Compiles a `.jack` file, or every top-level `.jack` file of a
//! directory, each into a `.vm` file next to its source.
//!
//! # Usage
//! ```bash
//! jackc <file.jack | directory>
//! ```
//!
//! The first compilation error aborts the run with exit code 1.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use jackc::compile_path;

/// Top-level `.jack` files of a directory, in name order. No recursion.
fn jack_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "jack"))
        .collect();
    files.sort();
    Ok(files)
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <file.jack | directory>", args[0]);
        process::exit(1);
    }
    let path = PathBuf::from(&args[1]);

    let stat = match fs::metadata(&path) {
        Ok(stat) => stat,
        Err(e) => {
            log::error!("{}: {e}", path.display());
            process::exit(1);
        }
    };

    let inputs = if stat.is_dir() {
        match jack_files(&path) {
            Ok(inputs) => inputs,
            Err(e) => {
                log::error!("{}: {e}", path.display());
                process::exit(1);
            }
        }
    } else {
        vec![path]
    };

    let mut files = 0usize;
    for input in &inputs {
        if let Err(e) = compile_path(input) {
            log::error!("{}: {e}", input.display());
            process::exit(1);
        }
        files += 1;
    }

    log::info!("Total {files} files processed.");
}
