//! Close-marker forms accepted by the compiler
//!
//! Every builder close comes in four forms (bare, with a sentinel, with a
//! callback, with both) and tolerates a doubled marker.

use linedef::linedef::{Definition, MemorySource, Registry, Value};
use rstest::rstest;

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.put("len", |value| match value {
        Value::List(items) => Ok(Some(Value::Int(items.len() as i64))),
        Value::Map(entries) => Ok(Some(Value::Int(entries.len() as i64))),
        other => Ok(Some(other)),
    });
    registry
}

#[rstest]
#[case("]")]
#[case("]]")]
#[case("] 'END'")]
#[case("] /len")]
#[case("] 'END' /len")]
#[case("] 'END' /len ]")]
fn test_list_close_forms_compile(#[case] close: &str) {
    let grammar = format!("[[\n#int#\n{}", close);
    assert!(Definition::from_grammar(&grammar, registry()).is_ok());
}

#[rstest]
#[case(")")]
#[case("))")]
#[case(") 'END'")]
#[case(") /len")]
#[case(") 'END' /len )")]
fn test_composite_close_forms_compile(#[case] close: &str) {
    let grammar = format!("((\n#int#\n{}", close);
    assert!(Definition::from_grammar(&grammar, registry()).is_ok());
}

#[rstest]
#[case("}")]
#[case("}}")]
#[case("} 'END'")]
#[case("} /len")]
#[case("} 'END' /len }")]
fn test_hash_close_forms_compile(#[case] close: &str) {
    let grammar = format!("{{{{\n{{ str int ':' }}\n{}", close);
    assert!(Definition::from_grammar(&grammar, registry()).is_ok());
}

#[test]
fn test_close_sentinel_is_used() {
    let definition = Definition::from_grammar("[[\n#int#\n] 'STOP'", registry()).unwrap();
    let result = definition
        .parse(&mut MemorySource::new("1\n2\nSTOP\nafter\n"))
        .unwrap();
    assert_eq!(
        result,
        Some(Value::List(vec![Value::Int(1), Value::Int(2)]))
    );
}

#[test]
fn test_close_callback_is_applied() {
    let definition = Definition::from_grammar("[[\n#int#\n] /len", registry()).unwrap();
    let result = definition
        .parse(&mut MemorySource::new("4\n5\n6\n"))
        .unwrap();
    assert_eq!(result, Some(Value::Int(3)));
}
