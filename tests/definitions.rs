//! End-to-end definitions over realistic inputs
//!
//! Each test describes one irregular multi-record text format, the kind of
//! input the toolkit exists for, either as grammar text or by direct
//! construction, and verifies the full nested result.

use linedef::linedef::{
    Block, Builder, Definition, Input, MemorySource, ParseError, Registry, Value,
};
use std::rc::Rc;

fn int_func() -> linedef::linedef::Func {
    Registry::new().get("int").unwrap()
}

fn text_func() -> linedef::linedef::Func {
    Registry::new().get("str").unwrap()
}

#[test]
fn test_password_policy_lines() {
    // "1-3 a: abcde": a range, a letter with a trailing colon, a password.
    let mut registry = Registry::new();
    registry.put_text("chop", |s| {
        Ok(Some(Value::Str(s[..s.len().saturating_sub(1)].to_string())))
    });

    let definition = Definition::from_grammar(
        "[[\n( [int '-'] > #str# chop < #str# ' ' )\n]",
        registry,
    )
    .unwrap();

    let result = definition
        .parse(&mut MemorySource::new("1-3 a: abcde\n2-9 c: ccccccccc\n"))
        .unwrap();

    let expected = Value::List(vec![
        Value::List(vec![
            Value::List(vec![Value::Int(1), Value::Int(3)]),
            Value::from("a"),
            Value::from("abcde"),
        ]),
        Value::List(vec![
            Value::List(vec![Value::Int(2), Value::Int(9)]),
            Value::from("c"),
            Value::from("ccccccccc"),
        ]),
    ]);
    assert_eq!(result, Some(expected));
}

#[test]
fn test_record_spans_merge_key_value_pairs() {
    // Passport-style records: key:value pairs spread over several lines,
    // records separated by blank lines.
    let span = Builder::span(
        Block::HashLine {
            pair: Box::new(Block::HashPair {
                key: Box::new(Block::Literal { func: text_func() }),
                value: Box::new(Block::Literal { func: text_func() }),
                separator: ":".to_string(),
                distribute: false,
                reverse: false,
            }),
            delimiter: Some(" ".to_string()),
        },
        " ",
        "",
    );
    let mut definition = Definition::new(Registry::new());
    definition.add_builder(Builder::list(span, ""));

    let input = "\
ecl:gry pid:860033327
byr:1937 iyr:2017

iyr:2013 ecl:amb
";
    let mut run = Input::new(&definition, MemorySource::new(input));
    let result = run.parse().unwrap().unwrap();

    let first = Value::Map(
        [
            (Value::from("ecl"), Value::from("gry")),
            (Value::from("pid"), Value::from("860033327")),
            (Value::from("byr"), Value::from("1937")),
            (Value::from("iyr"), Value::from("2017")),
        ]
        .into_iter()
        .collect(),
    );
    let second = Value::Map(
        [
            (Value::from("iyr"), Value::from("2013")),
            (Value::from("ecl"), Value::from("amb")),
        ]
        .into_iter()
        .collect(),
    );
    let expected = Value::List(vec![first, second]);
    assert_eq!(result, expected);
    assert_eq!(run.retrieve(), Some(&expected));
}

#[test]
fn test_munch_direction_lines() {
    let definition = Definition::from_grammar(
        "[[\n[* str [ne, e, se, sw, w, nw] None ]\n]",
        Registry::new(),
    )
    .unwrap();

    let result = definition
        .parse(&mut MemorySource::new("nwwsenw\nesew\n"))
        .unwrap();

    let expected = Value::List(vec![
        Value::List(vec![
            Value::from("nw"),
            Value::from("w"),
            Value::from("se"),
            Value::from("nw"),
        ]),
        Value::List(vec![
            Value::from("e"),
            Value::from("se"),
            Value::from("w"),
        ]),
    ]);
    assert_eq!(result, Some(expected));
}

#[test]
fn test_rules_with_or_alternatives() {
    // "0: 4 1 5" / "1: \"a\"": numeric rule lists or a quoted terminal.
    let rule_body = Block::Or {
        alternatives: vec![
            Block::Literal {
                func: Rc::new(|value| match value {
                    Value::Str(s) if s.starts_with('"') => {
                        Ok(Some(Value::Str(s.trim_matches('"').to_string())))
                    }
                    Value::Str(s) => Err(ParseError::Fragment {
                        fragment: s,
                        message: "not a quoted terminal".to_string(),
                    }),
                    other => Err(ParseError::Fragment {
                        fragment: other.to_string(),
                        message: "expected text".to_string(),
                    }),
                }),
            },
            Block::List {
                element: int_func(),
                delimiter: Some(" ".to_string()),
            },
        ],
    };
    let mut definition = Definition::new(Registry::new());
    definition.add_builder(Builder::hash(
        Block::HashPair {
            key: Box::new(Block::Literal { func: int_func() }),
            value: Box::new(rule_body),
            separator: ": ".to_string(),
            distribute: false,
            reverse: false,
        },
        "",
    ));

    let result = definition
        .parse(&mut MemorySource::new("0: 4 1\n1: \"a\"\n"))
        .unwrap();

    // Raw key text keys the mapping; the quoted terminal matched the first
    // alternative, the rule list fell through to the second.
    let expected = Value::Map(
        [
            (
                Value::from("0"),
                Value::List(vec![Value::Int(4), Value::Int(1)]),
            ),
            (Value::from("1"), Value::from("a")),
        ]
        .into_iter()
        .collect(),
    );
    assert_eq!(result, Some(expected));
}

#[test]
fn test_distribute_fans_value_over_key_elements() {
    let definition = Definition::from_grammar("{< [str None] int ':' }", Registry::new()).unwrap();

    let result = definition.parse(&mut MemorySource::new("xy:7\n")).unwrap();

    let expected = Value::Map(
        [
            (Value::from("x"), Value::Int(7)),
            (Value::from("y"), Value::Int(7)),
        ]
        .into_iter()
        .collect(),
    );
    assert_eq!(result, Some(expected));
}

#[test]
fn test_hash_line_grammar_last_wins() {
    let definition = Definition::from_grammar("{* str int ':' ' ' }", Registry::new()).unwrap();

    let result = definition
        .parse(&mut MemorySource::new("a:1 b:2 a:3\n"))
        .unwrap();

    let expected = Value::Map(
        [
            (Value::from("a"), Value::Int(3)),
            (Value::from("b"), Value::Int(2)),
        ]
        .into_iter()
        .collect(),
    );
    assert_eq!(result, Some(expected));
}

#[test]
fn test_two_builders_over_one_source() {
    // A timestamp line, then a comma-separated schedule with gaps.
    let mut registry = Registry::new();
    registry.put_text("bus", |s| {
        if s == "x" {
            Ok(None)
        } else {
            s.parse::<i64>()
                .map(|n| Some(Value::Int(n)))
                .map_err(|e| ParseError::Fragment {
                    fragment: s.to_string(),
                    message: e.to_string(),
                })
        }
    });

    let definition =
        Definition::from_grammar("#int#\n[ bus ',' ]", registry).unwrap();

    let result = definition
        .parse(&mut MemorySource::new("939\n7,13,x,x,59\n"))
        .unwrap();

    let expected = Value::List(vec![
        Value::Int(939),
        Value::List(vec![Value::Int(7), Value::Int(13), Value::Int(59)]),
    ]);
    assert_eq!(result, Some(expected));
}

#[test]
fn test_capture_scalar_in_assignments() {
    // "mem[8] = 11" assignment lines keyed by the bracketed address.
    let mut registry = Registry::new();
    registry.put_capture("mem_addr", regex::Regex::new(r"mem\[(\d+)\]").unwrap());

    let definition = Definition::from_grammar(
        "[[\n( #mem_addr# #int# ' = ' )\n]",
        registry,
    )
    .unwrap();

    let result = definition
        .parse(&mut MemorySource::new("mem[8] = 11\nmem[7] = 101\n"))
        .unwrap();

    let expected = Value::List(vec![
        Value::List(vec![Value::from("8"), Value::Int(11)]),
        Value::List(vec![Value::from("7"), Value::Int(101)]),
    ]);
    assert_eq!(result, Some(expected));
}

#[test]
fn test_tiled_paragraph_records() {
    // "Tile 2311:" headers followed by a grid, one blank line between
    // paragraphs, two blank lines closing the whole section.
    let mut registry = Registry::new();
    registry.put_text("tile_id", |s| {
        let digits = s.strip_suffix(':').unwrap_or(s);
        digits
            .parse::<i64>()
            .map(|n| Some(Value::Int(n)))
            .map_err(|e| ParseError::Fragment {
                fragment: s.to_string(),
                message: e.to_string(),
            })
    });

    let grammar = "\
((
( #'Tile'# #tile_id# ' ' )
[[
[ str None ]
]
))";
    let definition = Definition::from_grammar(grammar, registry).unwrap();

    let input = "Tile 2311:\n..\n##\n\nTile 1951:\n#.\n.#\n\n\n";
    let result = definition.parse(&mut MemorySource::new(input)).unwrap();

    let grid = |rows: &[&str]| {
        Value::List(
            rows.iter()
                .map(|row| {
                    Value::List(row.chars().map(|c| Value::Str(c.to_string())).collect())
                })
                .collect(),
        )
    };
    let expected = Value::List(vec![
        Value::List(vec![Value::Int(2311), grid(&["..", "##"])]),
        Value::List(vec![Value::Int(1951), grid(&["#.", ".#"])]),
    ]);
    assert_eq!(result, Some(expected));
}
