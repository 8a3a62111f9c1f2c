//! The validator node: construction, check attachment and dispatch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use regex::Regex;

use super::derived::{self, DiscriminatorMap, Optionality, Routes, ValueSet};
use super::kind::{Def, Definition, Kind};
use super::{array, combinators, modifiers, object, primitive, record, Schema};
use crate::check::{self, Check, CheckParams, FormatCheck};
use crate::error::{IssueKind, RawIssue, SchemaFault};
use crate::validation::{ParseContext, ParsePayload, Step};
use crate::value::Value;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Side table filled in by checks while a node is being built.
#[derive(Debug, Clone, Default)]
pub struct Computed {
    /// Format label, e.g. `"email"` or `"int32"`.
    pub format: Option<String>,
    /// Patterns a valid string must match, in attachment order.
    pub patterns: Vec<Regex>,
    pub minimum: Option<Value>,
    pub maximum: Option<Value>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

/// Capability tags used for structural "is-a" tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trait {
    Type,
    Primitive,
    String,
    StringFormat,
    Number,
    Literal,
    ObjectLike,
    Interface,
    Sequence,
    Keyed,
    Union,
    Wrapper,
    Effect,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traits(Vec<Trait>);

impl Traits {
    fn of(def: &Def) -> Self {
        let mut traits = vec![Trait::Type];
        traits.extend_from_slice(match def {
            Def::String { format: Some(_), .. } => &[Trait::Primitive, Trait::String, Trait::StringFormat],
            Def::String { .. } => &[Trait::Primitive, Trait::String],
            Def::Number { .. } | Def::NaN => &[Trait::Primitive, Trait::Number],
            Def::Boolean { .. }
            | Def::BigInt { .. }
            | Def::Date { .. }
            | Def::Null
            | Def::Undefined
            | Def::Void => &[Trait::Primitive],
            Def::Literal { .. } | Def::Enum { .. } => &[Trait::Primitive, Trait::Literal],
            Def::TemplateLiteral { .. } => &[Trait::Primitive, Trait::String],
            Def::Object(_) => &[Trait::ObjectLike],
            Def::Interface(_) => &[Trait::ObjectLike, Trait::Interface],
            Def::Array { .. } | Def::Tuple { .. } | Def::Set { .. } => &[Trait::Sequence],
            Def::Record { .. } | Def::Map { .. } => &[Trait::Keyed],
            Def::Union { .. } | Def::DiscriminatedUnion { .. } => &[Trait::Union],
            Def::Transform { .. } | Def::Pipe { .. } | Def::Promise { .. } => &[Trait::Effect],
            Def::Optional { .. }
            | Def::Nullable { .. }
            | Def::Default { .. }
            | Def::Prefault { .. }
            | Def::NonOptional { .. }
            | Def::Catch { .. }
            | Def::Readonly { .. }
            | Def::Success { .. }
            | Def::Lazy { .. } => &[Trait::Wrapper],
            Def::Any | Def::Unknown | Def::Never | Def::Intersection { .. } | Def::Custom { .. } => {
                &[]
            }
        });
        Traits(traits)
    }

    pub fn contains(&self, t: Trait) -> bool {
        self.0.contains(&t)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trait> {
        self.0.iter()
    }
}

/// One schema unit.
///
/// A node never changes after construction. The derived data below is
/// computed on first access and then frozen.
pub struct Node {
    id: u64,
    definition: Definition,
    /// Attached checks, with a node-as-check format check at index 0.
    checks: Vec<Arc<dyn Check>>,
    computed: Computed,
    traits: Traits,
    routes: Routes,
    values: OnceLock<Option<ValueSet>>,
    pattern: OnceLock<Option<Regex>>,
    disc: OnceLock<Option<DiscriminatorMap>>,
    optionality: OnceLock<Optionality>,
    resolved: OnceLock<Schema>,
}

impl Node {
    /// Builds a node, validating the parts that can be malformed.
    pub(super) fn build(definition: Definition) -> Result<Node, SchemaFault> {
        let routes = match &definition.def {
            Def::DiscriminatedUnion { options, .. } => Routes::build(options)?,
            _ => Routes::default(),
        };

        let pattern = match &definition.def {
            Def::TemplateLiteral { parts } => {
                let source = derived::template_source(parts)?;
                Some(Regex::new(&source).map_err(SchemaFault::callback)?)
            }
            _ => None,
        };

        Ok(Node::new(definition, routes, pattern))
    }

    /// Assembles a node from parts that are already known to be valid.
    pub(super) fn new(definition: Definition, routes: Routes, pattern: Option<Regex>) -> Node {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);

        let mut checks: Vec<Arc<dyn Check>> = Vec::with_capacity(definition.checks.len() + 1);
        if let Def::String {
            format: Some(format),
            ..
        } = &definition.def
        {
            checks.push(Arc::new(FormatCheck::new(*format, CheckParams::default())));
        }
        checks.extend(definition.checks.iter().cloned());

        let mut computed = Computed::default();
        for check in &checks {
            check.on_attach(&mut computed);
        }

        let cell = OnceLock::new();
        if let Some(re) = pattern {
            let _ = cell.set(Some(re));
        }

        tracing::trace!(id, kind = %definition.kind(), checks = checks.len(), "node built");

        Node {
            id,
            traits: Traits::of(&definition.def),
            definition,
            checks,
            computed,
            routes,
            values: OnceLock::new(),
            pattern: cell,
            disc: OnceLock::new(),
            optionality: OnceLock::new(),
            resolved: OnceLock::new(),
        }
    }

    /// A copy of this node with a changed definition. Only checks and the
    /// error map may differ from the original.
    pub(super) fn rebuild(&self, definition: Definition) -> Node {
        let pattern = match self.def() {
            Def::TemplateLiteral { .. } => self.pattern().cloned(),
            _ => None,
        };
        Node::new(definition, self.routes.clone(), pattern)
    }

    /// Diagnostic identity. Never used for equality.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> Kind {
        self.definition.kind()
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub fn def(&self) -> &Def {
        &self.definition.def
    }

    pub fn checks(&self) -> &[Arc<dyn Check>] {
        &self.checks
    }

    pub fn computed(&self) -> &Computed {
        &self.computed
    }

    pub fn traits(&self) -> &Traits {
        &self.traits
    }

    pub fn has_trait(&self, t: Trait) -> bool {
        self.traits.contains(t)
    }

    pub(crate) fn routes(&self) -> &Routes {
        &self.routes
    }

    pub fn value_set(&self) -> Option<&ValueSet> {
        self.values
            .get_or_init(|| derived::compute_values(self))
            .as_ref()
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern
            .get_or_init(|| derived::compute_pattern(self))
            .as_ref()
    }

    pub fn disc_map(&self) -> Option<&DiscriminatorMap> {
        self.disc.get_or_init(|| derived::compute_disc(self)).as_ref()
    }

    pub fn optionality(&self) -> Optionality {
        *self
            .optionality
            .get_or_init(|| derived::compute_optionality(self))
    }

    /// The target of a lazy node, resolved once on first use.
    pub(super) fn resolved(&self) -> &Schema {
        self.resolved.get_or_init(|| match self.def() {
            Def::Lazy { getter } => {
                tracing::trace!(id = self.id, "resolving lazy node");
                getter()
            }
            _ => Schema::never(),
        })
    }

    /// An issue raised by this node, carrying its error map.
    pub(crate) fn issue(&self, kind: IssueKind, input: Value) -> RawIssue {
        RawIssue::new(kind, input).with_error_map(self.definition.error.as_ref())
    }

    pub(crate) fn invalid_type(&self, expected: &str, input: Value) -> RawIssue {
        self.issue(IssueKind::invalid_type(expected), input)
    }

    /// Full contract: own validation, then attached checks.
    pub fn run<'a>(&'a self, payload: ParsePayload, ctx: &'a ParseContext) -> Step<'a> {
        let step = self.parse(payload, ctx);
        if self.checks.is_empty() {
            return step;
        }
        step.then(move |payload| {
            check::run_checks(&self.checks, payload, ctx, self.definition.error.as_ref())
        })
    }

    /// Own type and shape validation only.
    pub fn parse<'a>(&'a self, payload: ParsePayload, ctx: &'a ParseContext) -> Step<'a> {
        match &self.definition.def {
            Def::String { coerce, .. } => primitive::string(self, payload, *coerce),
            Def::Number { coerce } => primitive::number(self, payload, *coerce),
            Def::Boolean { coerce } => primitive::boolean(self, payload, *coerce),
            Def::BigInt { coerce } => primitive::bigint(self, payload, *coerce),
            Def::Date { coerce } => primitive::date(self, payload, *coerce),
            Def::Null => primitive::exact(self, payload, "null", Value::is_null),
            Def::Undefined => primitive::exact(self, payload, "undefined", Value::is_undefined),
            Def::Void => primitive::exact(self, payload, "void", Value::is_undefined),
            Def::Any | Def::Unknown => Step::ok(payload),
            Def::Never => primitive::exact(self, payload, "never", |_| false),
            Def::NaN => primitive::exact(self, payload, "nan", |v| {
                matches!(v, Value::Number(n) if n.is_nan())
            }),
            Def::Literal { .. } | Def::Enum { .. } => primitive::literal(self, payload),
            Def::TemplateLiteral { .. } => primitive::template_literal(self, payload),
            Def::Custom { predicate } => primitive::custom(self, payload, predicate),
            Def::Object(shape) | Def::Interface(shape) => object::parse(self, shape, payload, ctx),
            Def::Array { element } => array::array(self, element, payload, ctx),
            Def::Tuple { items, rest } => array::tuple(self, items, rest.as_ref(), payload, ctx),
            Def::Set { value } => array::set(self, value, payload, ctx),
            Def::Record { key, value } => record::record(self, key, value, payload, ctx),
            Def::Map { key, value } => record::map(self, key, value, payload, ctx),
            Def::Union { options } => combinators::union(self, options, payload, ctx),
            Def::DiscriminatedUnion { options, fallback } => {
                combinators::discriminated_union(self, options, *fallback, payload, ctx)
            }
            Def::Intersection { left, right } => {
                combinators::intersection(left, right, payload, ctx)
            }
            Def::Pipe { input, output } => modifiers::pipe(input, output, payload, ctx),
            Def::Transform { func } => modifiers::transform(func, payload, ctx),
            Def::Optional { inner } => modifiers::optional(inner, payload, ctx),
            Def::Nullable { inner } => modifiers::nullable(inner, payload, ctx),
            Def::Default { inner, value } => modifiers::default(inner, value, payload, ctx),
            Def::Prefault { inner, value } => modifiers::prefault(inner, value, payload, ctx),
            Def::NonOptional { inner } => modifiers::nonoptional(self, inner, payload, ctx),
            Def::Catch { inner, value } => modifiers::catch(inner, value, payload, ctx),
            Def::Readonly { inner } => inner.node().run(payload, ctx),
            Def::Success { inner } => modifiers::success(inner, payload, ctx),
            Def::Promise { inner } => modifiers::promise(inner, payload, ctx),
            Def::Lazy { .. } => self.resolved().node().run(payload, ctx),
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("checks", &self.checks.len())
            .finish_non_exhaustive()
    }
}
