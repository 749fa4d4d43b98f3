//! Definitions and the input driver
//!
//! A [`Definition`] is the ordered list of top-level stream builders plus
//! the scalar function registry they were resolved against. Build one
//! programmatically with [`Definition::add_builder`], or compile one from
//! grammar text with [`Definition::from_grammar`]; then run it over a line
//! source with an [`Input`].

use crate::linedef::builders::Builder;
use crate::linedef::compiler;
use crate::linedef::error::{CompileError, ParseError};
use crate::linedef::funcs::Registry;
use crate::linedef::source::LineSource;
use crate::linedef::value::Value;

/// An ordered sequence of top-level builders and their registry.
pub struct Definition {
    builders: Vec<Builder>,
    registry: Registry,
}

impl std::fmt::Debug for Definition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Definition")
            .field("builders", &self.builders.len())
            .finish_non_exhaustive()
    }
}

impl Definition {
    /// An empty definition over `registry`.
    pub fn new(registry: Registry) -> Self {
        Definition {
            builders: Vec::new(),
            registry,
        }
    }

    /// Compile grammar text into a definition, resolving function names
    /// against `registry`.
    pub fn from_grammar(grammar: &str, registry: Registry) -> Result<Self, CompileError> {
        compiler::compile(grammar, registry)
    }

    /// Append a pre-built top-level builder.
    pub fn add_builder(&mut self, builder: Builder) {
        self.builders.push(builder);
    }

    pub fn builders(&self) -> &[Builder] {
        &self.builders
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run the definition against a line source.
    ///
    /// A single top-level builder's value is returned directly; with
    /// several, each runs in order against the same cursor and the
    /// non-empty results collect into an ordered list. The first failure
    /// aborts the whole run.
    pub fn parse<S: LineSource>(&self, source: &mut S) -> Result<Option<Value>, ParseError> {
        if self.builders.len() == 1 {
            return self.builders[0].parse(source, None);
        }
        let mut outputs = Vec::new();
        for builder in &self.builders {
            if let Some(value) = builder.parse(source, None)? {
                outputs.push(value);
            }
        }
        Ok(Some(Value::List(outputs)))
    }
}

/// One parse run: a definition applied to a line source, retaining the
/// last result for later retrieval.
pub struct Input<'d, S: LineSource> {
    definition: &'d Definition,
    source: S,
    output: Option<Value>,
}

impl<'d, S: LineSource> Input<'d, S> {
    pub fn new(definition: &'d Definition, source: S) -> Self {
        Input {
            definition,
            source,
            output: None,
        }
    }

    /// Consume the source and produce the definition's value.
    pub fn parse(&mut self) -> Result<Option<Value>, ParseError> {
        let output = self.definition.parse(&mut self.source)?;
        self.output = output.clone();
        Ok(output)
    }

    /// The result of the most recent [`parse`](Input::parse) call.
    pub fn retrieve(&self) -> Option<&Value> {
        self.output.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linedef::blocks::Block;
    use crate::linedef::source::MemorySource;

    fn int_block() -> Block {
        Block::Literal {
            func: Registry::new().get("int").unwrap(),
        }
    }

    #[test]
    fn test_single_builder_returns_value_directly() {
        let mut definition = Definition::new(Registry::new());
        definition.add_builder(Builder::list(int_block(), ""));

        let mut input = Input::new(&definition, MemorySource::new("1\n2\n"));
        assert_eq!(
            input.parse(),
            Ok(Some(Value::List(vec![Value::Int(1), Value::Int(2)])))
        );
        assert_eq!(
            input.retrieve(),
            Some(&Value::List(vec![Value::Int(1), Value::Int(2)]))
        );
    }

    #[test]
    fn test_multiple_builders_collect_in_order() {
        let mut definition = Definition::new(Registry::new());
        definition.add_builder(Builder::single_line(int_block()));
        definition.add_builder(Builder::list(
            Block::List {
                element: Registry::new().get("int").unwrap(),
                delimiter: Some(",".to_string()),
            },
            "",
        ));

        let mut input = Input::new(&definition, MemorySource::new("939\n7,13\n5,9\n"));
        let expected = Value::List(vec![
            Value::Int(939),
            Value::List(vec![
                Value::List(vec![Value::Int(7), Value::Int(13)]),
                Value::List(vec![Value::Int(5), Value::Int(9)]),
            ]),
        ]);
        assert_eq!(input.parse(), Ok(Some(expected)));
    }

    #[test]
    fn test_empty_definition() {
        let definition = Definition::new(Registry::new());
        let mut input = Input::new(&definition, MemorySource::new("anything\n"));
        assert_eq!(input.parse(), Ok(Some(Value::List(vec![]))));
    }

    #[test]
    fn test_first_failure_aborts() {
        let mut definition = Definition::new(Registry::new());
        definition.add_builder(Builder::single_line(int_block()));
        definition.add_builder(Builder::single_line(int_block()));

        let mut input = Input::new(&definition, MemorySource::new("oops\n5\n"));
        assert!(input.parse().is_err());
        assert_eq!(input.retrieve(), None);
    }
}
