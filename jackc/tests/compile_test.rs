//! End-to-end compilation tests against full expected VM listings.

use jackc::compile;

fn compile_to_string(src: &str) -> String {
    let mut out = Vec::new();
    compile(src, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_function_with_nested_expression() {
    let src = "\
class Main {
    function void main() {
        do Output.printInt(1 + (2 * 3));
        return;
    }
}
";
    let expected = "function Main.main 0
push constant 1
push constant 2
push constant 3
call Math.multiply 2
add
call Output.printInt 1
pop temp 0
push constant 0
return
";
    assert_eq!(compile_to_string(src), expected);
}

#[test]
fn test_class_with_constructor_methods_and_statics() {
    let src = "\
class Point {
    field int x, y;
    static int count;

    constructor Point new(int ax, int ay) {
        let x = ax;
        let y = ay;
        let count = count + 1;
        return this;
    }

    method int sum() {
        return x + y;
    }

    method int scale(int k) {
        var int acc, i;
        let acc = 0;
        let i = 0;
        while (i < k) {
            let acc = acc + x;
            let i = i + 1;
        }
        return acc;
    }

    function int origin() {
        return 0;
    }
}
";
    let expected = "function Point.new 1
push constant 2
call Memory.alloc 1
pop local 0
push local 0
pop pointer 0
push argument 0
pop this 0
push argument 1
pop this 1
push static 0
push constant 1
add
pop static 0
push pointer 0
return
function Point.sum 0
push argument 0
pop pointer 0
push this 0
push this 1
add
return
function Point.scale 2
push argument 0
pop pointer 0
push constant 0
pop local 0
push constant 0
pop local 1
label POINT_WHILE_START0
push local 1
push argument 1
lt
push constant 0
eq
if-goto POINT_WHILE_END1
push local 0
push this 0
add
pop local 0
push local 1
push constant 1
add
pop local 1
goto POINT_WHILE_START0
label POINT_WHILE_END1
push local 0
return
function Point.origin 0
push constant 0
return
";
    assert_eq!(compile_to_string(src), expected);
}

#[test]
fn test_if_else_lowering() {
    let src = "\
class Test {
    function void run() {
        if (false) {} else {}
        return;
    }
}
";
    let expected = "function Test.run 0
push constant 0
push constant 0
eq
if-goto TEST_IF_ELSE0
goto TEST_IF_END1
label TEST_IF_ELSE0
label TEST_IF_END1
push constant 0
return
";
    assert_eq!(compile_to_string(src), expected);
}

#[test]
fn test_string_literal_expansion() {
    let src = "\
class Greet {
    function void main() {
        do Output.printString(\"Hi\");
        return;
    }
}
";
    let expected = "function Greet.main 0
push constant 2
call String.new 1
push constant 72
call String.appendChar 2
push constant 105
call String.appendChar 2
call Output.printString 1
pop temp 0
push constant 0
return
";
    assert_eq!(compile_to_string(src), expected);
}

#[test]
fn test_method_call_through_variable() {
    let src = "\
class App {
    function void main() {
        var Baz foo;
        do foo.bar();
        return;
    }
}
";
    let expected = "function App.main 1
push local 0
call Baz.bar 1
pop temp 0
push constant 0
return
";
    assert_eq!(compile_to_string(src), expected);
}

#[test]
fn test_comments_do_not_change_output() {
    let bare = "class A { function void f() { return; } }";
    let commented = "\
// leading comment
/* block
   comment */
class A { // class A
    /* body */ function void f() { return; /* done */ }
}
";
    assert_eq!(compile_to_string(bare), compile_to_string(commented));
}

#[test]
fn test_arguments_cover_arity() {
    // every parameter is addressable: arguments 0..k-1 after the implicit
    // this shift for methods
    let src = "\
class M {
    method int add3(int a, int b, int c) {
        return a + b + c;
    }
}
";
    let expected = "function M.add3 0
push argument 0
pop pointer 0
push argument 1
push argument 2
add
push argument 3
add
return
";
    assert_eq!(compile_to_string(src), expected);
}

#[test]
fn test_undefined_variable_aborts() {
    let mut out = Vec::new();
    let err = compile(
        "class Bad { function void main() { let x = 1; return; } }",
        &mut out,
    )
    .unwrap_err();
    assert!(err.to_string().contains("var undefined x"));
}

#[test]
fn test_missing_semicolon_aborts() {
    let mut out = Vec::new();
    let err = compile(
        "class Bad { function void main() { return } }",
        &mut out,
    )
    .unwrap_err();
    assert!(err.to_string().contains("expecting symbol ';'"));
}
