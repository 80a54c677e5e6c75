//! End-to-end translation tests against full expected assembly listings.

use std::path::Path;

use vmtranslator::{translate, AsmBuilder};

/// A complete function with a call, compared line for line.
#[test]
fn test_translate_function_with_call() {
    let input = "function Main.main 0
push constant 1
call Output.printInt 1
pop temp 0
push constant 0
return";

    let expected = "// function Main.main 0
(Main.main)
// push constant 1
@1
D=A
@0
A=M
M=D
@0
M=M+1
// call Output.printInt 1
@JUMP1
D=A
@0
A=M
M=D
@0
M=M+1
@1
D=M
@0
A=M
M=D
@0
M=M+1
@2
D=M
@0
A=M
M=D
@0
M=M+1
@3
D=M
@0
A=M
M=D
@0
M=M+1
@4
D=M
@0
A=M
M=D
@0
M=M+1
@0
D=M
@5
D=D-A
@1
D=D-A
@2
M=D
@0
D=M
@1
M=D
@Output.printInt
0;JMP
(JUMP1)
// pop temp 0
@5
D=A
@0
D=D+A
@13
M=D
@0
M=M-1
A=M
D=M
@13
A=M
M=D
// push constant 0
@0
D=A
@0
A=M
M=D
@0
M=M+1
// return
@1
D=M
@5
M=D
@5
D=D-A
A=D
D=M
@5
A=A+1
M=D
@0
M=M-1
A=M
D=M
@2
A=M
M=D
A=A+1
D=A
@0
M=D
@5
D=M
@1
A=D-A
D=M
@4
M=D
@5
D=M
@2
A=D-A
D=M
@3
M=D
@5
D=M
@3
A=D-A
D=M
@2
M=D
@5
D=M
@4
A=D-A
D=M
@1
M=D
@5
A=A+1
A=M
0;JMP
";

    let mut b = AsmBuilder::new();
    let (lines, ok) = translate(&mut b, input.as_bytes()).unwrap();
    assert_eq!(lines, 6);
    assert!(ok);
    assert_eq!(b.as_str(), expected);
}

#[test]
fn test_bootstrap_prologue() {
    let expected = "// bootstrap section
@256
D=A
@0
M=D
@1
M=0
@2
M=0
@3
M=0
@4
M=0
D=0
@0
A=M
M=D
@0
M=M+1
@0
A=M
M=D
@0
M=M+1
@0
A=M
M=D
@0
M=M+1
@0
A=M
M=D
@0
M=M+1
@0
A=M
M=D
@0
M=M+1
@Sys.init
0;JMP
";

    let mut b = AsmBuilder::new();
    b.bootstrap();
    assert_eq!(b.as_str(), expected);
}

/// The jump counter and static namespace behave across a file boundary:
/// the counter keeps climbing, the namespace is reassigned.
#[test]
fn test_multi_file_state() {
    let mut b = AsmBuilder::new();
    b.set_comments(false);

    b.set_name(Path::new("First.vm"));
    translate(&mut b, "eq\npush static 0\n".as_bytes()).unwrap();
    b.set_name(Path::new("Second.vm"));
    translate(&mut b, "eq\npush static 0\n".as_bytes()).unwrap();

    let out = b.as_str();
    assert!(out.contains("(JUMP1)"));
    assert!(out.contains("(JUMP2)"));
    assert!(out.contains("(JUMP3)"));
    assert!(out.contains("(JUMP4)"));
    assert!(out.contains("@First.0"));
    assert!(out.contains("@Second.0"));
}

/// Every syntactically valid line is echoed as a `// <line>` comment when
/// comments are enabled.
#[test]
fn test_round_trip_comment_echo() {
    let lines = [
        "push argument 1",
        "pop that 5",
        "add",
        "not",
        "label LOOP",
        "goto LOOP",
        "if-goto LOOP",
        "function Sys.init 0",
        "call Main.main 0",
        "return",
    ];
    let input = lines.join("\n");

    let mut b = AsmBuilder::new();
    let (_, ok) = translate(&mut b, input.as_bytes()).unwrap();
    assert!(ok);
    for line in lines {
        assert!(
            b.as_str().lines().any(|l| l == format!("// {line}")),
            "missing echo for '{line}'"
        );
    }
}

/// A program whose lines are all already commented out translates to
/// nothing but the bootstrap.
#[test]
fn test_commented_program_is_inert() {
    let input = "// push constant 1
// call Output.printInt 1
// pop temp 0";

    let mut b = AsmBuilder::new();
    b.bootstrap();
    let bootstrap_len = b.as_str().lines().count();
    let (lines, ok) = translate(&mut b, input.as_bytes()).unwrap();
    assert_eq!(lines, 3);
    assert!(ok);

    let non_comment = b
        .as_str()
        .lines()
        .skip(bootstrap_len)
        .filter(|l| !l.starts_with("//"))
        .count();
    assert_eq!(non_comment, 0);
}

/// Errors are counted per line but do not abort the file.
#[test]
fn test_error_recovery_reports_not_ok() {
    let input = "push constant 1
push nowhere 3
pop pointer 9
add";

    let mut b = AsmBuilder::new();
    let (lines, ok) = translate(&mut b, input.as_bytes()).unwrap();
    assert_eq!(lines, 4);
    assert!(!ok);
}
