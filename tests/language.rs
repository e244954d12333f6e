use std::{fs, rc::Rc};

use pretty_assertions::assert_eq;
use walkdir::WalkDir;
use winter::{
    ast::Node,
    error::{ErrorKind, ScriptError},
    get_result,
    interpreter::{
        alloc::CountingAllocator,
        state::{Config, State},
        value::core::{Object, ObjectType},
    },
};

#[test]
fn book_examples_work() {
    let mut count = 0;

    for entry in
        WalkDir::new("book/src").into_iter()
                                .filter_map(Result::ok)
                                .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
    {
        let path = entry.path();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        for (i, code) in extract_winter_blocks(&content).into_iter().enumerate() {
            count += 1;
            if let Err(e) = get_result(&code, false) {
                panic!("Winter example {} in {:?} failed:\n{}\nError: {:?}",
                       i + 1,
                       path,
                       code,
                       e);
            }
        }
    }

    assert!(count > 0, "No winter examples found in book/src");
}

fn extract_winter_blocks(content: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut inside = false;
    let mut buf = String::new();

    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```winter") {
            inside = true;
            buf.clear();
            continue;
        }
        if inside && trimmed.starts_with("```") {
            inside = false;
            blocks.push(buf.clone());
            continue;
        }
        if inside {
            buf.push_str(line);
            buf.push('\n');
        }
    }

    blocks
}

fn value_of(src: &str) -> Object {
    match get_result(src, false) {
        Ok(Some(value)) => value,
        Ok(None) => panic!("Script produced no value"),
        Err(e) => panic!("Script failed: {e}"),
    }
}

fn assert_int(src: &str, expected: i64) {
    assert_eq!(value_of(src).as_int(), Some(expected), "{src}");
}

fn assert_float(src: &str, expected: f64) {
    assert_eq!(value_of(src).as_float(), Some(expected), "{src}");
}

fn assert_failure(src: &str, kind: ErrorKind) {
    match get_result(src, false) {
        Ok(value) => panic!("Script succeeded with {value:?} but was expected to fail"),
        Err(e) => match e.downcast_ref::<ScriptError>() {
            Some(error) => assert_eq!(error.kind(), kind, "{src}: {error}"),
            None => panic!("Script failed with a non-script error: {e}"),
        },
    }
}

#[test]
fn precedence_and_associativity() {
    assert_int("1 + 2 * 3;", 7);
    assert_int("(1 + 2) * 3;", 9);
    assert_int("2 ** 3 ** 2;", 512);
    assert_int("10 - 3 - 2;", 5);
    assert_int("100 / 10 / 5;", 2);
    assert_int("1 + 2 < 4;", 1);
    assert_int("2 * 3 == 6;", 1);
}

#[test]
fn prefix_operators() {
    assert_int("--5;", 5);
    assert_int("-2 ** 2;", 4);
    assert_int("!0;", 1);
    assert_int("!7;", 0);
    assert_float("-1.5;", -1.5);
}

#[test]
fn oversized_literals_wrap_instead_of_failing() {
    assert_int("18446744073709551615;", -1);
    assert_int("1 + 0x10000000000000000;", 1);
    #[allow(clippy::cast_possible_truncation)]
    let wrapped = 99_999_999_999_999_999_999_u128 as i64;
    assert_int("99999999999999999999;", wrapped);
    assert_int("1 + 99999999999999999999;", wrapped.wrapping_add(1));
}

#[test]
fn literals() {
    assert_int("0x1F;", 31);
    assert_int("0b101;", 5);
    assert_int("017;", 15);
    assert_int("'a';", 97);
    assert_float("1e3;", 1000.0);
    assert_eq!(value_of(r#""tab\there";"#).to_string(), "tab\there");
}

#[test]
fn assignment_and_basic_arithmetic() {
    assert_int("let x = 5; x = x + 1; x;", 6);
    assert_int("let x = 7 * 9; x;", 63);
    assert_int("let x = 8 - 5; x;", 3);
    assert_int("let x = 10 / 4; x;", 2);
    assert_float("let x = 10.0 / 4; x;", 2.5);
    assert_int("let a, b; a = b = 3; a + b;", 6);
}

#[test]
fn compound_assignments() {
    assert_int("let x = 2; x += 3; x;", 5);
    assert_int("let x = 7; x -= 2; x;", 5);
    assert_int("let x = 4; x *= 2; x;", 8);
    assert_int("let x = 9; x /= 3; x;", 3);
    assert_int("let x = 9; x %= 4; x;", 1);
    assert_eq!(value_of(r#"let s = "ab"; s += "cd"; s;"#).to_string(), "abcd");
}

#[test]
fn identifiers_evaluate_to_references() {
    let state = State::new().unwrap();
    let result = state.execute("let x = 5; x = x + 1; x;").unwrap().unwrap();

    let Node::Value(value) = result.into_node() else {
        panic!("expected a value");
    };
    let slot = value.as_reference().and_then(|r| r.slot()).unwrap();
    assert_eq!(slot.borrow().as_int(), Some(6));

    let x = state.globals().slot(&state.string("x").unwrap()).unwrap();
    assert!(Rc::ptr_eq(&slot, &x));
}

#[test]
fn comparisons() {
    assert_int("2 < 3;", 1);
    assert_int("3 > 2;", 1);
    assert_int("2 <= 2;", 1);
    assert_int("3 >= 4;", 0);
    assert_int("2 != 3;", 1);
    assert_int("2 == 2.0;", 1);
    assert_int(r#""abc" < "abd";"#, 1);
    assert_int(r#""abc" == "abc";"#, 1);
}

#[test]
fn nan_equals_itself() {
    assert_int("0.0 / 0.0 == 0.0 / 0.0;", 1);
    assert_int("let n = 0.0 / 0.0; n != n;", 0);
    assert_int("0.0 / 0.0 < 0.0 / 0.0;", 0);
    assert_int("-0.0 == 0.0;", 1);
}

#[test]
fn float_and_integer_edges() {
    assert_float("7.5 % 2;", 0.0);
    assert_int("9223372036854775807 + 1;", i64::MIN);
    assert_int("2 ** 10;", 1024);
    assert_float("1 / 0.0;", f64::INFINITY);
    assert_failure("1 / 0;", ErrorKind::Arithmetic);
    assert_failure("1 % 0;", ErrorKind::Arithmetic);
}

#[test]
fn name_errors() {
    assert_failure("let x = 1; let x = 2;", ErrorKind::Name);
    assert_failure("y;", ErrorKind::Name);
    assert_failure("let y = x + 1;", ErrorKind::Name);
}

#[test]
fn duplicate_declaration_keeps_first_binding() {
    let state = State::new().unwrap();
    let result = state.execute("let x = 1; let x = 2;").unwrap().unwrap();
    assert_eq!(result.kind(), winter::ast::NodeKind::Error);
    assert_eq!(result.to_string(),
               "(error \"NameError on line 1: multiple declarations of 'x'\")");
    drop(result);

    assert_eq!(state.global("x").unwrap().and_then(|x| x.as_int()), Some(1));
}

#[test]
fn type_errors() {
    assert_failure(r#""a" + 1;"#, ErrorKind::Type);
    assert_failure("-\"a\";", ErrorKind::Type);
    assert_failure("5 = 6;", ErrorKind::Type);
    assert_failure("1 << 2;", ErrorKind::Type);
    assert_failure("~1;", ErrorKind::Type);
    assert_failure("let a = 1; a &= 1;", ErrorKind::Type);
}

#[test]
fn syntax_errors() {
    assert_failure("1 + 2", ErrorKind::Syntax);
    assert_failure("(1 + 2;", ErrorKind::Syntax);
    assert_failure("let 5;", ErrorKind::Syntax);
    assert_failure("1 +;", ErrorKind::Syntax);
    assert_failure("@;", ErrorKind::Syntax);
}

#[test]
fn errors_report_their_line() {
    let error = get_result("let a = 1;\nlet b = 2;\na + c;", false).unwrap_err();
    assert_eq!(error.to_string(), "NameError on line 3: undeclared identifier 'c'");
}

#[test]
fn string_plus_table_is_a_type_error() {
    let state = State::new().unwrap();
    let table = state.table(4).unwrap();
    state.define("t", table).unwrap();

    let result = state.execute(r#""a" + t;"#).unwrap().unwrap();
    assert_eq!(result.to_string(),
               "(error \"TypeError on line 1: unsupported operand types for '+': 'string' and 'table'\")");
}

#[test]
fn concatenation_balances_the_allocator() {
    let counting = Rc::new(CountingAllocator::new());
    let state = State::with_allocator(counting.clone(), Config::default()).unwrap();
    let baseline = counting.stats().live_bytes;

    let result = state.execute(r#""a" + "b";"#).unwrap().unwrap();
    let Node::Value(value) = result.into_node() else {
        panic!("expected a value");
    };
    assert_eq!(value.type_of(), ObjectType::String);
    assert_eq!(value.as_string().unwrap().as_bytes(), b"ab");
    drop(value);

    assert_eq!(counting.stats().live_bytes, baseline);
}

#[test]
fn repeated_concatenation_does_not_leak() {
    let counting = Rc::new(CountingAllocator::new());
    let state = State::with_allocator(counting.clone(), Config::default()).unwrap();
    drop(state.execute(r#"let s = "winter";"#).unwrap());
    let baseline = counting.stats().live_bytes;

    for _ in 0..100 {
        drop(state.execute("s + s + s + s;").unwrap());
    }
    assert_eq!(counting.stats().live_bytes, baseline);

    drop(state);
    assert_eq!(counting.stats().live_bytes, 0);
}

#[test]
fn many_bindings_in_a_small_table() {
    let state = State::with_allocator(Rc::new(CountingAllocator::new()),
                                      Config { globals_capacity: 2 }).unwrap();

    let declarations: String = (0..40).map(|i| format!("let v{i} = {i};")).collect();
    drop(state.execute(&declarations).unwrap());
    let updates: String = (0..40).map(|i| format!("v{i} = v{i} * 10;")).collect();
    drop(state.execute(&updates).unwrap());

    for i in 0..40 {
        let value = state.global(&format!("v{i}")).unwrap();
        assert_eq!(value.and_then(|v| v.as_int()), Some(i * 10));
    }
    assert!(state.global("v40").unwrap().is_none());
    assert_eq!(state.globals().len(), 40);
}

#[test]
fn refused_allocation_surfaces_as_alloc_error() {
    let counting = Rc::new(CountingAllocator::new());
    let state = State::with_allocator(counting.clone(), Config::default()).unwrap();
    counting.set_limit(Some(counting.stats().live_bytes + 64));

    let source: String = (0..64).map(|i| format!("let w{i} = \"{i}\";")).collect();
    let error = state.execute(&source).unwrap_err();
    assert!(error.requested > 0);
    assert!(counting.stats().refused > 0);

    drop(state);
    assert_eq!(counting.stats().live_bytes, 0);
}

#[test]
fn empty_programs_have_no_value() {
    assert!(get_result("", false).unwrap().is_none());
    assert!(get_result(";;; // nothing\n/* here */", false).unwrap().is_none());
}

#[test]
fn parsing_is_deterministic() {
    let state = State::new().unwrap();
    let source = "let a = 1, b = a ** 2 ** 3; a += -b * (a - 2);";
    let first = state.parse(source).unwrap().unwrap().to_string();
    let second = state.parse(source).unwrap().unwrap().to_string();
    assert_eq!(first, second);
}
