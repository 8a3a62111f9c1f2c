//! Data derived from a node's definition and memoized on first access:
//! value-sets, patterns, discriminator maps and optionality.

use indexmap::IndexMap;
use regex::Regex;

use super::kind::{Def, TemplatePart};
use super::node::Node;
use super::Schema;
use crate::error::SchemaFault;
use crate::value::{number_to_string, Value};

/// Equality where `NaN` equals itself.
pub(crate) fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => a == b,
    }
}

/// The finite set of literal values a node accepts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSet(Vec<Value>);

impl ValueSet {
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        let mut set = ValueSet::default();
        for value in values {
            set.insert(value);
        }
        set
    }

    pub fn insert(&mut self, value: Value) {
        if !self.contains(&value) {
            self.0.push(value);
        }
    }

    pub fn extend(&mut self, other: &ValueSet) {
        for value in &other.0 {
            self.insert(value.clone());
        }
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.0.iter().any(|v| same_value(v, value))
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Alternation of the escaped template forms of the values.
    fn alternation(&self) -> Option<String> {
        let parts = self
            .0
            .iter()
            .map(|v| template_form(v).map(|s| regex::escape(&s)))
            .collect::<Option<Vec<_>>>()?;
        Some(format!("^(?:{})$", parts.join("|")))
    }
}

/// How a primitive prints inside a template literal.
pub(crate) fn template_form(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_to_string(*n)),
        Value::BigInt(i) => Some(i.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Undefined => Some("undefined".to_string()),
        _ => None,
    }
}

fn clean(source: &str) -> &str {
    let source = source.strip_prefix('^').unwrap_or(source);
    source.strip_suffix('$').unwrap_or(source)
}

/// Per-field routing data for discriminated unions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscEntry {
    /// Literal values of the field that select this branch.
    pub values: ValueSet,
    /// Maps of nested objects that select this branch.
    pub maps: Vec<DiscriminatorMap>,
}

impl DiscEntry {
    fn matches(&self, value: &Value) -> bool {
        (!self.values.is_empty() && self.values.contains(value))
            || self.maps.iter().any(|map| map.matches(value))
    }
}

/// Mapping from field key to the values and nested maps that select a branch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscriminatorMap {
    entries: IndexMap<String, DiscEntry>,
}

impl DiscriminatorMap {
    pub fn get(&self, key: &str) -> Option<&DiscEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&mut self, key: &str) -> &mut DiscEntry {
        self.entries.entry(key.to_string()).or_default()
    }

    /// Folds `other` into this map key by key.
    pub fn merge(&mut self, other: &DiscriminatorMap) {
        for (key, entry) in &other.entries {
            let mine = self.entry(key);
            mine.values.extend(&entry.values);
            mine.maps.extend(entry.maps.iter().cloned());
        }
    }

    /// True when any discriminating field of `input` selects this branch,
    /// directly or through a nested map.
    pub fn matches(&self, input: &Value) -> bool {
        if !matches!(input, Value::Object(_)) {
            return false;
        }
        self.entries
            .iter()
            .any(|(key, entry)| entry.matches(&input.property(key)))
    }
}

/// Routing tables of a discriminated union, built at construction.
#[derive(Debug, Clone, Default)]
pub(crate) struct Routes {
    pub maps: Vec<DiscriminatorMap>,
    /// Keys exposed by every option. A single shared key locates the
    /// no-match issue.
    pub shared: Vec<String>,
}

impl Routes {
    pub(crate) fn build(options: &[Schema]) -> Result<Routes, SchemaFault> {
        let maps = options
            .iter()
            .enumerate()
            .map(|(index, option)| {
                option
                    .node()
                    .disc_map()
                    .cloned()
                    .ok_or(SchemaFault::InvalidDiscriminatedUnionOption { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let shared: Vec<String> = match maps.split_first() {
            Some((first, rest)) => first
                .keys()
                .filter(|k| rest.iter().all(|m| m.get(k).is_some()))
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        Ok(Routes { maps, shared })
    }

    /// Indexes of the options selected by `input`.
    pub(crate) fn select(&self, input: &Value) -> Vec<usize> {
        self.maps
            .iter()
            .enumerate()
            .filter(|(_, map)| map.matches(input))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Whether a node is implicitly optional when embedded in a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Optionality {
    /// Absent input is acceptable.
    pub input: bool,
    /// Output may be absent.
    pub output: bool,
}

impl Optionality {
    const BOTH: Optionality = Optionality {
        input: true,
        output: true,
    };
    const INPUT: Optionality = Optionality {
        input: true,
        output: false,
    };
}

pub(super) fn compute_values(node: &Node) -> Option<ValueSet> {
    match node.def() {
        Def::Literal { values } | Def::Enum { values } => Some(ValueSet::new(values.iter().cloned())),
        Def::Null => Some(ValueSet::new([Value::Null])),
        Def::Undefined | Def::Void => Some(ValueSet::new([Value::Undefined])),
        Def::NaN => Some(ValueSet::new([Value::Number(f64::NAN)])),
        Def::Optional { inner } => inner.node().value_set().map(|set| {
            let mut set = set.clone();
            set.insert(Value::Undefined);
            set
        }),
        Def::Nullable { inner } => inner.node().value_set().map(|set| {
            let mut set = set.clone();
            set.insert(Value::Null);
            set
        }),
        Def::NonOptional { inner } => inner
            .node()
            .value_set()
            .map(|set| ValueSet::new(set.values().iter().filter(|v| !v.is_undefined()).cloned())),
        Def::Default { inner, .. }
        | Def::Prefault { inner, .. }
        | Def::Catch { inner, .. }
        | Def::Readonly { inner } => inner.node().value_set().cloned(),
        Def::Pipe { input, .. } => input.node().value_set().cloned(),
        Def::Lazy { .. } => node.resolved().node().value_set().cloned(),
        Def::Union { options } | Def::DiscriminatedUnion { options, .. } => {
            let mut all = ValueSet::default();
            for option in options {
                all.extend(option.node().value_set()?);
            }
            Some(all)
        }
        _ => None,
    }
}

pub(super) fn compute_pattern(node: &Node) -> Option<Regex> {
    let source = match node.def() {
        Def::String { .. } => {
            let computed = node.computed();
            match computed.patterns.last() {
                Some(re) => return Some(re.clone()),
                None => match (computed.min_length, computed.max_length) {
                    (None, None) => r"^[\s\S]*$".to_string(),
                    (min, max) => format!(
                        r"^[\s\S]{{{},{}}}$",
                        min.unwrap_or(0),
                        max.map(|m| m.to_string()).unwrap_or_default()
                    ),
                },
            }
        }
        Def::Number { .. } => match node.computed().format {
            Some(_) => r"^-?\d+$".to_string(),
            None => r"^-?\d+(?:\.\d+)?$".to_string(),
        },
        Def::Boolean { .. } => "^(?:true|false)$".to_string(),
        Def::BigInt { .. } => r"^-?\d+n?$".to_string(),
        Def::Null => "^null$".to_string(),
        Def::Undefined => "^undefined$".to_string(),
        Def::Literal { .. } | Def::Enum { .. } => node.value_set()?.alternation()?,
        Def::TemplateLiteral { parts } => template_source(parts).ok()?,
        Def::Optional { inner } => {
            format!("^(?:{})?$", clean(inner.node().pattern()?.as_str()))
        }
        Def::Nullable { inner } => {
            format!("^(?:{}|null)$", clean(inner.node().pattern()?.as_str()))
        }
        Def::Readonly { inner } => return inner.node().pattern().cloned(),
        Def::Union { options } => {
            let sources = options
                .iter()
                .map(|o| o.node().pattern().map(|re| clean(re.as_str()).to_string()))
                .collect::<Option<Vec<_>>>()?;
            format!("^(?:{})$", sources.join("|"))
        }
        _ => return None,
    };
    Regex::new(&source).ok()
}

/// Assembles the anchored source of a template literal.
pub(crate) fn template_source(parts: &[TemplatePart]) -> Result<String, SchemaFault> {
    let mut source = String::from("^");
    for (index, part) in parts.iter().enumerate() {
        match part {
            TemplatePart::Literal(value) => {
                let form = template_form(value)
                    .ok_or(SchemaFault::InvalidTemplateLiteralPart { index })?;
                source.push_str(&regex::escape(&form));
            }
            TemplatePart::Schema(schema) => {
                let pattern = schema
                    .node()
                    .pattern()
                    .ok_or(SchemaFault::InvalidTemplateLiteralPart { index })?;
                source.push_str(&format!("(?:{})", clean(pattern.as_str())));
            }
        }
    }
    source.push('$');
    Ok(source)
}

pub(super) fn compute_disc(node: &Node) -> Option<DiscriminatorMap> {
    match node.def() {
        Def::Object(shape) | Def::Interface(shape) => {
            let mut map = DiscriminatorMap::default();
            for (key, field) in &shape.shape {
                let field = field.node();
                let values = field.value_set();
                let nested = field.disc_map();
                if values.is_none() && nested.is_none() {
                    continue;
                }
                let entry = map.entry(key);
                if let Some(values) = values {
                    entry.values.extend(values);
                }
                if let Some(nested) = nested {
                    entry.maps.push(nested.clone());
                }
            }
            (!map.is_empty()).then_some(map)
        }
        Def::Union { options } | Def::DiscriminatedUnion { options, .. } => {
            let mut map = DiscriminatorMap::default();
            for option in options {
                map.merge(option.node().disc_map()?);
            }
            Some(map)
        }
        Def::Optional { inner }
        | Def::Nullable { inner }
        | Def::Default { inner, .. }
        | Def::Prefault { inner, .. }
        | Def::NonOptional { inner }
        | Def::Catch { inner, .. }
        | Def::Readonly { inner } => inner.node().disc_map().cloned(),
        Def::Pipe { input, .. } => input.node().disc_map().cloned(),
        _ => None,
    }
}

pub(super) fn compute_optionality(node: &Node) -> Optionality {
    match node.def() {
        Def::Optional { .. } | Def::Undefined | Def::Void => Optionality::BOTH,
        Def::Default { .. } | Def::Prefault { .. } => Optionality::INPUT,
        Def::Nullable { inner } | Def::Catch { inner, .. } | Def::Readonly { inner } => {
            inner.node().optionality()
        }
        Def::Lazy { .. } => node.resolved().node().optionality(),
        Def::Pipe { input, output } => Optionality {
            input: input.node().optionality().input,
            output: output.node().optionality().output,
        },
        Def::Union { options } => Optionality {
            input: options.iter().any(|o| o.node().optionality().input),
            output: options.iter().any(|o| o.node().optionality().output),
        },
        _ => Optionality::default(),
    }
}
