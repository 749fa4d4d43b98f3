//! Property-based tests for the combinator library
//!
//! The munch vocabulary here is prefix-unambiguous (no symbol extends
//! another symbol that ends a tile), so greedy tokenization of any
//! concatenation must reproduce the original token sequence exactly.

use linedef::linedef::{Block, Registry, Value};
use proptest::prelude::*;

const DIRECTIONS: [&str; 6] = ["ne", "e", "se", "sw", "w", "nw"];

fn direction_strategy() -> impl Strategy<Value = &'static str> {
    proptest::sample::select(&DIRECTIONS[..])
}

fn munch_block() -> Block {
    Block::Munch {
        vocabulary: DIRECTIONS.iter().map(|s| s.to_string()).collect(),
        element: Registry::new().get("str").unwrap(),
        delimiter: None,
    }
}

fn int_list_block() -> Block {
    Block::List {
        element: Registry::new().get("int").unwrap(),
        delimiter: Some(",".to_string()),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_munch_retiles_any_concatenation(tokens in prop::collection::vec(direction_strategy(), 1..40)) {
        let input: String = tokens.concat();
        let parsed = munch_block().parse(&input).unwrap().unwrap();

        let expected = Value::List(
            tokens.iter().map(|t| Value::Str(t.to_string())).collect(),
        );
        prop_assert_eq!(parsed, expected);
    }

    #[test]
    fn test_int_list_roundtrips(numbers in prop::collection::vec(any::<i64>(), 1..30)) {
        let input = numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let parsed = int_list_block().parse(&input).unwrap().unwrap();

        let expected = Value::List(numbers.iter().map(|n| Value::Int(*n)).collect());
        prop_assert_eq!(parsed, expected);
    }
}
