//! Type conversion matrix.
//!
//! Maps a `(source, target)` type pair to the dialect template that performs
//! the conversion. Identity and implicit widening need no entry.

use std::collections::HashMap;

use crate::types::DataType;

/// Conversion template. Every `{}` is replaced by the rendered source
/// expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRule {
    template: String,
}

impl ConversionRule {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn render(&self, source: &str) -> String {
        self.template.replace("{}", source)
    }

    /// How many times the source expression appears in the output.
    pub fn placeholder_count(&self) -> usize {
        self.template.matches("{}").count()
    }
}

/// Outcome of looking a pair up in the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion<'a> {
    /// Same type or a widening the database performs implicitly.
    PassThrough,
    Rule(&'a ConversionRule),
}

#[derive(Debug, Clone, Default)]
pub struct ConversionMatrix {
    rules: HashMap<(DataType, DataType), ConversionRule>,
}

impl ConversionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the rule for `from -> to`.
    pub fn add(&mut self, from: DataType, to: DataType, template: &str) {
        self.rules.insert((from, to), ConversionRule::new(template));
    }

    /// Adds the same template for several source types.
    pub fn add_from(&mut self, sources: &[DataType], to: DataType, template: &str) {
        for from in sources {
            self.add(*from, to, template);
        }
    }

    pub fn lookup(&self, from: DataType, to: DataType) -> Option<&ConversionRule> {
        self.rules.get(&(from, to))
    }

    pub fn resolve(&self, from: DataType, to: DataType) -> Option<Conversion<'_>> {
        if from == to || DataType::is_implicit_widening(from, to) {
            return Some(Conversion::PassThrough);
        }
        self.lookup(from, to).map(Conversion::Rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Numeric types ranked above `to`, i.e. those that need an explicit
/// narrowing conversion into it.
pub(crate) fn narrowing_sources(to: DataType) -> Vec<DataType> {
    let Some(target) = to.numeric_rank() else {
        return Vec::new();
    };
    DataType::NUMERIC
        .iter()
        .copied()
        .filter(|from| from.numeric_rank().is_some_and(|rank| rank > target))
        .collect()
}

pub(crate) const CHARACTER: [DataType; 2] = [DataType::String, DataType::Char];
