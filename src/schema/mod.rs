//! Schema nodes and their builders.
//!
//! A [`Schema`] is a cheap, cloneable handle to an immutable validator node.
//! Builders never mutate: every refinement or modifier returns a new node,
//! so one graph can be shared freely between threads and parse calls.
//!
//! Validation accumulates issues. A failing field does not stop its
//! siblings from being validated, and refinements keep running after a
//! failure unless the failure was fatal.
//!
//! # Example
//!
//! ```rust
//! use inquest::{Schema, Value};
//!
//! let schema = Schema::string().min_length(3).max_length(10);
//!
//! assert!(schema.parse(&Value::from("hello")).is_ok());
//!
//! let err = schema.parse(&Value::from("hi")).unwrap_err();
//! assert_eq!(err.issues().unwrap().first().code(), "too_small");
//! ```

mod array;
mod combinators;
mod derived;
mod kind;
mod modifiers;
mod node;
mod object;
mod parse;
mod primitive;
mod record;

use std::sync::Arc;

use futures_util::future::BoxFuture;

pub use derived::{DiscEntry, DiscriminatorMap, Optionality, ValueSet};
pub use kind::{
    AsyncTransformFn, CatchFn, CatchInput, CustomFn, Def, DefaultFn, Definition, Kind, LazyFn,
    ObjectDef, SyncTransformFn, TemplatePart, TransformFn,
};
pub use node::{Computed, Node, Trait, Traits};
pub use object::{Mask, ObjectSchema};

use crate::check::{
    Check, CheckParams, Compare, Comparison, LengthCheck, LengthKind, Messaged, MultipleOf,
    NumberFormat, NumberFormatKind, Overwrite, Refine, StringCheck, StringCheckKind,
    StringFormat, SuperRefine,
};
use crate::error::{BoxError, RawIssue, SchemaFault};
use crate::value::Value;
use derived::Routes;

/// A shareable handle to a validator node.
#[derive(Clone)]
pub struct Schema(Arc<Node>);

impl Schema {
    /// Builds a node from a raw definition.
    ///
    /// Fails for discriminated unions whose options cannot be routed and for
    /// template literals with parts that have no pattern.
    pub fn from_definition(definition: Definition) -> Result<Schema, SchemaFault> {
        Node::build(definition).map(|node| Schema(Arc::new(node)))
    }

    /// Builds a node whose definition cannot be malformed.
    pub(crate) fn leaf(definition: impl Into<Definition>) -> Schema {
        Schema(Arc::new(Node::new(definition.into(), Routes::default(), None)))
    }

    /// The underlying validator node.
    pub fn node(&self) -> &Node {
        &self.0
    }

    /// Process-unique identity of the node, stable across clones.
    pub fn id(&self) -> u64 {
        self.0.id()
    }

    /// The kind tag of the node.
    pub fn kind(&self) -> Kind {
        self.0.kind()
    }

    pub fn definition(&self) -> &Definition {
        self.0.definition()
    }

    pub fn optionality(&self) -> Optionality {
        self.0.optionality()
    }

    /// True when both handles point at the same node.
    pub fn same_node(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn edit(&self, f: impl FnOnce(&mut Definition)) -> Schema {
        let mut definition = self.definition().clone();
        f(&mut definition);
        Schema(Arc::new(self.0.rebuild(definition)))
    }

    /// Creates a string schema.
    ///
    /// Accepts string inputs only. Chain checks like [`min_length`](Self::min_length)
    /// or [`regex`](Self::regex) to constrain the content.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// let schema = Schema::string().min_length(1);
    ///
    /// assert!(schema.parse(&Value::from("hello")).is_ok());
    ///
    /// let err = schema.parse(&Value::from(42)).unwrap_err();
    /// assert_eq!(err.issues().unwrap().first().code(), "invalid_type");
    /// ```
    pub fn string() -> Schema {
        Schema::leaf(Def::String {
            coerce: false,
            format: None,
        })
    }

    /// Creates a number schema.
    ///
    /// `NaN` and the infinities are rejected; use [`nan`](Self::nan) to accept
    /// `NaN` on purpose.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// let schema = Schema::number().gte(0).lt(100);
    ///
    /// assert!(schema.parse(&Value::from(42.5)).is_ok());
    /// assert!(schema.parse(&Value::from(100)).is_err());
    /// assert!(schema.parse(&Value::from("42")).is_err());
    /// ```
    pub fn number() -> Schema {
        Schema::leaf(Def::Number { coerce: false })
    }

    /// Creates a boolean schema.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// assert!(Schema::boolean().parse(&Value::from(true)).is_ok());
    /// assert!(Schema::boolean().parse(&Value::from("true")).is_err());
    /// ```
    pub fn boolean() -> Schema {
        Schema::leaf(Def::Boolean { coerce: false })
    }

    /// Creates a schema for arbitrary-precision integers ([`Value::BigInt`]).
    pub fn bigint() -> Schema {
        Schema::leaf(Def::BigInt { coerce: false })
    }

    /// Creates a date schema. Accepts [`Value::Date`] inputs only.
    pub fn date() -> Schema {
        Schema::leaf(Def::Date { coerce: false })
    }

    /// A string node that first converts its input with `String(input)`.
    pub fn coerce_string() -> Schema {
        Schema::leaf(Def::String {
            coerce: true,
            format: None,
        })
    }

    /// A number node that first converts its input with `Number(input)`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// let schema = Schema::coerce_number();
    /// assert_eq!(schema.parse(&Value::from("12")).unwrap(), Value::from(12));
    /// assert!(schema.parse(&Value::from("twelve")).is_err());
    /// ```
    pub fn coerce_number() -> Schema {
        Schema::leaf(Def::Number { coerce: true })
    }

    /// Converts by truthiness, so any input is accepted.
    pub fn coerce_boolean() -> Schema {
        Schema::leaf(Def::Boolean { coerce: true })
    }

    /// A bigint node that converts numbers and numeric strings first.
    pub fn coerce_bigint() -> Schema {
        Schema::leaf(Def::BigInt { coerce: true })
    }

    /// A date node that parses strings and epoch milliseconds first.
    pub fn coerce_date() -> Schema {
        Schema::leaf(Def::Date { coerce: true })
    }

    /// Accepts exactly `null`.
    pub fn null() -> Schema {
        Schema::leaf(Def::Null)
    }

    /// Accepts exactly `undefined`.
    pub fn undefined() -> Schema {
        Schema::leaf(Def::Undefined)
    }

    /// Accepts `undefined`, like [`undefined`](Self::undefined).
    pub fn void() -> Schema {
        Schema::leaf(Def::Void)
    }

    /// Accepts every input unchanged.
    pub fn any() -> Schema {
        Schema::leaf(Def::Any)
    }

    /// Accepts every input unchanged.
    pub fn unknown() -> Schema {
        Schema::leaf(Def::Unknown)
    }

    /// Rejects every input.
    pub fn never() -> Schema {
        Schema::leaf(Def::Never)
    }

    /// Accepts only `NaN`.
    pub fn nan() -> Schema {
        Schema::leaf(Def::NaN)
    }

    /// A string node with a built-in format check.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, StringFormat, Value};
    ///
    /// let schema = Schema::string_format(StringFormat::Uuid);
    /// assert!(schema.parse(&Value::from("123e4567-e89b-42d3-a456-426614174000")).is_ok());
    /// assert!(schema.parse(&Value::from("nope")).is_err());
    /// ```
    pub fn string_format(format: StringFormat) -> Schema {
        Schema::leaf(Def::String {
            coerce: false,
            format: Some(format),
        })
    }

    /// Shorthand for [`string_format`](Self::string_format) with [`StringFormat::Email`].
    pub fn email() -> Schema {
        Schema::string_format(StringFormat::Email)
    }

    /// Shorthand for a URL string.
    pub fn url() -> Schema {
        Schema::string_format(StringFormat::Url)
    }

    pub fn uuid() -> Schema {
        Schema::string_format(StringFormat::Uuid)
    }

    pub fn ipv4() -> Schema {
        Schema::string_format(StringFormat::Ipv4)
    }

    pub fn ipv6() -> Schema {
        Schema::string_format(StringFormat::Ipv6)
    }

    /// A `YYYY-MM-DD` calendar date string.
    pub fn iso_date() -> Schema {
        Schema::string_format(StringFormat::IsoDate)
    }

    /// An ISO 8601 datetime string.
    pub fn iso_datetime() -> Schema {
        Schema::string_format(StringFormat::IsoDateTime)
    }

    /// Accepts exactly `value`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// let schema = Schema::literal("admin");
    /// assert!(schema.parse(&Value::from("admin")).is_ok());
    ///
    /// let err = schema.parse(&Value::from("guest")).unwrap_err();
    /// assert_eq!(err.issues().unwrap().first().code(), "invalid_value");
    /// ```
    pub fn literal(value: impl Into<Value>) -> Schema {
        Schema::leaf(Def::Literal {
            values: vec![value.into()],
        })
    }

    /// A literal accepting any of `values`.
    pub fn literals<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Schema {
        Schema::leaf(Def::Literal {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Accepts any one of `values`, like a string enum.
    pub fn enumeration<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Schema {
        Schema::leaf(Def::Enum {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// A string matching the concatenation of `parts`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, TemplatePart, Value};
    ///
    /// let size = Schema::template_literal([
    ///     TemplatePart::from(Schema::number()),
    ///     TemplatePart::from("px"),
    /// ])
    /// .unwrap();
    /// assert!(size.parse(&Value::from("12px")).is_ok());
    /// assert!(size.parse(&Value::from("12em")).is_err());
    /// ```
    pub fn template_literal(
        parts: impl IntoIterator<Item = TemplatePart>,
    ) -> Result<Schema, SchemaFault> {
        Schema::from_definition(Definition::new(Def::TemplateLiteral {
            parts: parts.into_iter().collect(),
        }))
    }

    /// Creates an object schema from `(key, schema)` pairs.
    ///
    /// Unknown keys are stripped from the output unless the schema is made
    /// [`strict`](ObjectSchema::strict) or [`passthrough`](ObjectSchema::passthrough).
    /// Every field is validated, and each field's issues are reported under its key.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// let user = Schema::object([
    ///     ("name", Schema::string()),
    ///     ("age", Schema::number().int()),
    /// ]);
    ///
    /// let input = Value::object([("name", Value::from(1)), ("age", Value::from(1.5))]);
    /// let err = user.parse(&input).unwrap_err();
    /// let paths: Vec<String> = err.issues().unwrap().iter().map(|i| i.path.to_string()).collect();
    /// assert_eq!(paths, vec!["name", "age"]);
    /// ```
    pub fn object<K, S, I>(shape: I) -> ObjectSchema
    where
        K: Into<String>,
        S: Into<Schema>,
        I: IntoIterator<Item = (K, S)>,
    {
        ObjectSchema::new(
            ObjectDef {
                shape: shape.into_iter().map(|(k, s)| (k.into(), s.into())).collect(),
                optional: Vec::new(),
                catchall: None,
            },
            false,
        )
    }

    /// Like [`object`](Self::object), but a trailing `?` on a key makes that
    /// key optional whatever its node is.
    pub fn interface<K, S, I>(shape: I) -> ObjectSchema
    where
        K: Into<String>,
        S: Into<Schema>,
        I: IntoIterator<Item = (K, S)>,
    {
        let mut def = ObjectDef::default();
        for (key, schema) in shape {
            let key: String = key.into();
            match key.strip_suffix('?') {
                Some(bare) => {
                    def.optional.push(bare.to_string());
                    def.shape.insert(bare.to_string(), schema.into());
                }
                None => {
                    def.shape.insert(key, schema.into());
                }
            }
        }
        ObjectSchema::new(def, true)
    }

    /// Creates an array schema whose items all match `element`.
    ///
    /// Item issues are reported under the item's index.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// let schema = Schema::array(Schema::number()).max_length(3);
    ///
    /// let ok = Value::Array(vec![Value::from(1), Value::from(2)]);
    /// assert!(schema.parse(&ok).is_ok());
    ///
    /// let bad = Value::Array(vec![Value::from(1), Value::from("two")]);
    /// let err = schema.parse(&bad).unwrap_err();
    /// assert_eq!(err.issues().unwrap().first().path.to_string(), "[1]");
    /// ```
    pub fn array(element: impl Into<Schema>) -> Schema {
        Schema::leaf(Def::Array {
            element: element.into(),
        })
    }

    /// Creates a fixed-length tuple schema, one node per position.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// let point = Schema::tuple([Schema::number(), Schema::number()]);
    ///
    /// assert!(point.parse(&Value::Array(vec![Value::from(1), Value::from(2)])).is_ok());
    /// assert!(point.parse(&Value::Array(vec![Value::from(1)])).is_err());
    /// ```
    pub fn tuple(items: impl IntoIterator<Item = Schema>) -> Schema {
        Schema::leaf(Def::Tuple {
            items: items.into_iter().collect(),
            rest: None,
        })
    }

    /// A tuple whose trailing items all match `rest`.
    pub fn tuple_with_rest(items: impl IntoIterator<Item = Schema>, rest: Schema) -> Schema {
        Schema::leaf(Def::Tuple {
            items: items.into_iter().collect(),
            rest: Some(rest),
        })
    }

    /// Creates a record schema mapping keys matching `key` to values matching `value`.
    ///
    /// When `key` has a finite value set (an enum or literals), every one of
    /// those keys is required and any other key is reported as unrecognized.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// let scores = Schema::record(Schema::string(), Schema::number());
    ///
    /// let input = Value::object([("ada", Value::from(3)), ("bob", Value::from("x"))]);
    /// let err = scores.parse(&input).unwrap_err();
    /// assert_eq!(err.issues().unwrap().first().path.to_string(), "bob");
    /// ```
    pub fn record(key: Schema, value: impl Into<Schema>) -> Schema {
        Schema::leaf(Def::Record {
            key,
            value: value.into(),
        })
    }

    /// Creates a map schema over [`Value::Map`] entries.
    ///
    /// Issues under string or number keys are reported at that key. Other keys
    /// are reported as `invalid_key` or `invalid_element` on the map itself.
    pub fn map(key: impl Into<Schema>, value: impl Into<Schema>) -> Schema {
        Schema::leaf(Def::Map {
            key: key.into(),
            value: value.into(),
        })
    }

    /// Creates a set schema whose members all match `value`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// let tags = Schema::set(Schema::string()).max_size(2);
    ///
    /// assert!(tags.parse(&Value::Set(vec![Value::from("a")])).is_ok());
    /// assert!(tags.parse(&Value::Set(vec![Value::from(1)])).is_err());
    /// ```
    pub fn set(value: impl Into<Schema>) -> Schema {
        Schema::leaf(Def::Set {
            value: value.into(),
        })
    }

    /// Creates a union: the first option that accepts the input wins.
    ///
    /// When every option fails, a single `invalid_union` issue carries each
    /// option's issues.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{IssueKind, Schema, Value};
    ///
    /// let id = Schema::union([Schema::string(), Schema::number()]);
    ///
    /// assert!(id.parse(&Value::from("abc")).is_ok());
    /// assert!(id.parse(&Value::from(7)).is_ok());
    ///
    /// let err = id.parse(&Value::from(true)).unwrap_err();
    /// match &err.issues().unwrap().first().kind {
    ///     IssueKind::InvalidUnion { errors, .. } => assert_eq!(errors.len(), 2),
    ///     other => panic!("unexpected {:?}", other),
    /// }
    /// ```
    pub fn union(options: impl IntoIterator<Item = Schema>) -> Schema {
        Schema::leaf(Def::Union {
            options: options.into_iter().collect(),
        })
    }

    /// A union routed by literal-valued keys.
    ///
    /// Every option must expose at least one such key. With `fallback`, an
    /// input that matches no option (or several) is tried against every
    /// option like a plain union.
    pub fn discriminated_union(
        options: impl IntoIterator<Item = Schema>,
        fallback: bool,
    ) -> Result<Schema, SchemaFault> {
        Schema::from_definition(Definition::new(Def::DiscriminatedUnion {
            options: options.into_iter().collect(),
            fallback,
        }))
    }

    /// Requires both `left` and `right` to accept the input, then merges their
    /// outputs. Conflicting outputs are a [`SchemaFault::UnmergeableIntersection`].
    pub fn intersection(left: Schema, right: Schema) -> Schema {
        Schema::leaf(Def::Intersection { left, right })
    }

    /// A node resolved on first use, for recursive schemas.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// fn tree() -> Schema {
    ///     Schema::object([
    ///         ("value", Schema::number()),
    ///         ("children", Schema::array(Schema::lazy(tree))),
    ///     ])
    ///     .into()
    /// }
    ///
    /// let leaf = Value::object([("value", Value::from(1)), ("children", Value::Array(vec![]))]);
    /// let root = Value::object([("value", Value::from(0)), ("children", Value::Array(vec![leaf]))]);
    /// assert!(tree().parse(&root).is_ok());
    /// ```
    pub fn lazy<F>(getter: F) -> Schema
    where
        F: Fn() -> Schema + Send + Sync + 'static,
    {
        Schema::leaf(Def::Lazy {
            getter: Arc::new(getter),
        })
    }

    /// A node accepting whatever `predicate` accepts.
    pub fn custom<F>(predicate: F) -> Schema
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Schema::leaf(Def::Custom {
            predicate: Arc::new(predicate),
        })
    }

    /// Validates `inner` asynchronously. Always faults in a synchronous parse.
    pub fn promise(inner: Schema) -> Schema {
        Schema::leaf(Def::Promise { inner })
    }

    /// A standalone transform node: rewrites any input with `f`.
    pub fn transformer<F>(f: F) -> Schema
    where
        F: Fn(Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Schema::leaf(Def::Transform {
            func: TransformFn::Sync(Arc::new(f)),
        })
    }

    /// Async variant of [`transformer`](Self::transformer).
    pub fn transformer_async<F>(f: F) -> Schema
    where
        F: Fn(Value) -> BoxFuture<'static, Result<Value, BoxError>> + Send + Sync + 'static,
    {
        Schema::leaf(Def::Transform {
            func: TransformFn::Async(Arc::new(f)),
        })
    }

    /// Attaches a check. Checks run in attachment order after the node's own
    /// validation.
    pub fn check<C: Check + 'static>(&self, check: C) -> Schema {
        self.edit(|def| def.checks.push(Arc::new(check)))
    }

    /// Sets the message of the most recently attached check, or of every
    /// issue the node raises itself when there are no checks.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// let schema = Schema::string().min_length(8).error("password too short");
    /// let err = schema.parse(&Value::from("abc")).unwrap_err();
    /// assert_eq!(err.issues().unwrap().first().message, "password too short");
    /// ```
    pub fn error(&self, message: impl Into<String>) -> Schema {
        let message = message.into();
        self.edit(|def| match def.checks.pop() {
            Some(last) => def.checks.push(Arc::new(Messaged::new(last, message))),
            None => def.error = Some(Arc::new(move |_: &RawIssue| Some(message.clone()))),
        })
    }

    /// Sets the error map consulted for issues raised by this node and its
    /// checks.
    pub fn error_map<F>(&self, map: F) -> Schema
    where
        F: Fn(&RawIssue) -> Option<String> + Send + Sync + 'static,
    {
        self.edit(|def| def.error = Some(Arc::new(map)))
    }

    /// Requires at least `min` characters, items or members.
    ///
    /// Strings are measured in characters, not bytes.
    pub fn min_length(&self, min: usize) -> Schema {
        self.check(LengthCheck::new(LengthKind::Min, min, CheckParams::default()))
    }

    /// Allows at most `max` characters, items or members.
    pub fn max_length(&self, max: usize) -> Schema {
        self.check(LengthCheck::new(LengthKind::Max, max, CheckParams::default()))
    }

    /// Requires exactly `len` characters, items or members.
    pub fn length(&self, len: usize) -> Schema {
        self.check(LengthCheck::new(LengthKind::Exact, len, CheckParams::default()))
    }

    /// Minimum member count of a set or map.
    pub fn min_size(&self, min: usize) -> Schema {
        self.min_length(min)
    }

    /// Maximum member count of a set or map.
    pub fn max_size(&self, max: usize) -> Schema {
        self.max_length(max)
    }

    /// Requires a value greater than `bound`.
    ///
    /// Works for numbers, bigints and dates.
    pub fn gt(&self, bound: impl Into<Value>) -> Schema {
        self.check(Compare::new(Comparison::Gt, bound, CheckParams::default()))
    }

    /// Requires a value greater than or equal to `bound`.
    pub fn gte(&self, bound: impl Into<Value>) -> Schema {
        self.check(Compare::new(Comparison::Gte, bound, CheckParams::default()))
    }

    /// Requires a value less than `bound`.
    pub fn lt(&self, bound: impl Into<Value>) -> Schema {
        self.check(Compare::new(Comparison::Lt, bound, CheckParams::default()))
    }

    /// Requires a value less than or equal to `bound`.
    pub fn lte(&self, bound: impl Into<Value>) -> Schema {
        self.check(Compare::new(Comparison::Lte, bound, CheckParams::default()))
    }

    /// Shorthand for `gt(0)`.
    pub fn positive(&self) -> Schema {
        self.gt(0.0)
    }

    /// Shorthand for `gte(0)`.
    pub fn nonnegative(&self) -> Schema {
        self.gte(0.0)
    }

    pub fn negative(&self) -> Schema {
        self.lt(0.0)
    }

    pub fn nonpositive(&self) -> Schema {
        self.lte(0.0)
    }

    /// Requires the value to be a multiple of `divisor`.
    pub fn multiple_of(&self, divisor: impl Into<Value>) -> Schema {
        self.check(MultipleOf::new(divisor, CheckParams::default()))
    }

    /// Requires a safe integer.
    pub fn int(&self) -> Schema {
        self.check(NumberFormat::new(NumberFormatKind::SafeInt, CheckParams::default()))
    }

    /// Requires an integer within the signed 32-bit range.
    pub fn int32(&self) -> Schema {
        self.check(NumberFormat::new(NumberFormatKind::Int32, CheckParams::default()))
    }

    /// Requires an integer within the unsigned 32-bit range.
    pub fn uint32(&self) -> Schema {
        self.check(NumberFormat::new(NumberFormatKind::Uint32, CheckParams::default()))
    }

    /// Requires the string to match `pattern`.
    ///
    /// Returns an error when `pattern` is not a valid regular expression.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// let slug = Schema::string().regex(r"^[a-z0-9-]+$").unwrap();
    /// assert!(slug.parse(&Value::from("hello-world")).is_ok());
    /// assert!(slug.parse(&Value::from("Hello World")).is_err());
    /// ```
    pub fn regex(&self, pattern: &str) -> Result<Schema, regex::Error> {
        let re = regex::Regex::new(pattern)?;
        Ok(self.check(StringCheck::new(StringCheckKind::Regex(re), CheckParams::default())))
    }

    /// Requires the string to contain `needle`.
    pub fn includes(&self, needle: impl Into<String>) -> Schema {
        self.check(StringCheck::new(
            StringCheckKind::Includes(needle.into()),
            CheckParams::default(),
        ))
    }

    /// Requires the string to start with `prefix`.
    pub fn starts_with(&self, prefix: impl Into<String>) -> Schema {
        self.check(StringCheck::new(
            StringCheckKind::StartsWith(prefix.into()),
            CheckParams::default(),
        ))
    }

    /// Requires the string to end with `suffix`.
    pub fn ends_with(&self, suffix: impl Into<String>) -> Schema {
        self.check(StringCheck::new(
            StringCheckKind::EndsWith(suffix.into()),
            CheckParams::default(),
        ))
    }

    pub fn lowercase(&self) -> Schema {
        self.check(StringCheck::new(StringCheckKind::Lowercase, CheckParams::default()))
    }

    pub fn uppercase(&self) -> Schema {
        self.check(StringCheck::new(StringCheckKind::Uppercase, CheckParams::default()))
    }

    /// Trims surrounding whitespace. Later checks see the trimmed value.
    pub fn trim(&self) -> Schema {
        self.check(Overwrite::trim())
    }

    pub fn to_lower_case(&self) -> Schema {
        self.check(Overwrite::to_lower_case())
    }

    pub fn to_upper_case(&self) -> Schema {
        self.check(Overwrite::to_upper_case())
    }

    /// Adds a custom predicate. Failures are continuable `custom` issues.
    pub fn refine<F>(&self, predicate: F) -> Schema
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.check(Refine::new(predicate))
    }

    /// Adds an asynchronous predicate.
    ///
    /// The node can then only be parsed with [`parse_async`](Self::parse_async)
    /// and friends; a synchronous parse faults with
    /// [`SchemaFault::UnexpectedAsync`].
    pub fn refine_async<F>(&self, predicate: F) -> Schema
    where
        F: Fn(Value) -> BoxFuture<'static, bool> + Send + Sync + 'static,
    {
        self.check(Refine::new_async(predicate))
    }

    /// Adds a refinement that may push any number of issues.
    pub fn super_refine<F>(&self, f: F) -> Schema
    where
        F: Fn(&Value, &mut Vec<RawIssue>) + Send + Sync + 'static,
    {
        self.check(SuperRefine::new(f))
    }

    /// Also accepts `undefined`, which passes through without reaching this node.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// let schema = Schema::number().optional();
    /// assert_eq!(schema.parse(&Value::Undefined).unwrap(), Value::Undefined);
    /// assert!(schema.parse(&Value::from("x")).is_err());
    /// ```
    pub fn optional(&self) -> Schema {
        Schema::leaf(Def::Optional {
            inner: self.clone(),
        })
    }

    /// Also accepts `null`.
    pub fn nullable(&self) -> Schema {
        Schema::leaf(Def::Nullable {
            inner: self.clone(),
        })
    }

    /// Accepts `null` and `undefined`.
    pub fn nullish(&self) -> Schema {
        self.nullable().optional()
    }

    /// Replaces `undefined` with `value`. The default is not validated.
    pub fn default(&self, value: impl Into<Value>) -> Schema {
        let value = value.into();
        self.default_with(move || value.clone())
    }

    /// Like [`default`](Self::default), computing the value on each use.
    pub fn default_with<F>(&self, f: F) -> Schema
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Schema::leaf(Def::Default {
            inner: self.clone(),
            value: Arc::new(f),
        })
    }

    /// Replaces `undefined` with `value` before validating.
    pub fn prefault(&self, value: impl Into<Value>) -> Schema {
        let value = value.into();
        Schema::leaf(Def::Prefault {
            inner: self.clone(),
            value: Arc::new(move || value.clone()),
        })
    }

    /// Rejects `undefined` even when the inner node would accept it.
    pub fn nonoptional(&self) -> Schema {
        Schema::leaf(Def::NonOptional {
            inner: self.clone(),
        })
    }

    /// Replaces any failure with `value`, dropping every issue.
    pub fn catch(&self, value: impl Into<Value>) -> Schema {
        let value = value.into();
        self.catch_with(move |_| value.clone())
    }

    /// Like [`catch`](Self::catch), computing the fallback from the failed input and its issues.
    pub fn catch_with<F>(&self, f: F) -> Schema
    where
        F: Fn(&CatchInput) -> Value + Send + Sync + 'static,
    {
        Schema::leaf(Def::Catch {
            inner: self.clone(),
            value: Arc::new(f),
        })
    }

    /// Marks the output read-only. Values pass through unchanged.
    pub fn readonly(&self) -> Schema {
        Schema::leaf(Def::Readonly {
            inner: self.clone(),
        })
    }

    /// Outputs whether this node accepts the input.
    pub fn success(&self) -> Schema {
        Schema::leaf(Def::Success {
            inner: self.clone(),
        })
    }

    /// Feeds this node's output into `next`.
    pub fn pipe(&self, next: impl Into<Schema>) -> Schema {
        Schema::leaf(Def::Pipe {
            input: self.clone(),
            output: next.into(),
        })
    }

    /// Rewrites this node's output with `f`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// let len = Schema::string().transform(|v| {
    ///     Ok(Value::from(v.as_str().map_or(0, |s| s.len() as i64)))
    /// });
    /// assert_eq!(len.parse(&Value::from("abc")).unwrap(), Value::from(3));
    /// ```
    pub fn transform<F>(&self, f: F) -> Schema
    where
        F: Fn(Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.pipe(Schema::transformer(f))
    }

    /// Async variant of [`transform`](Self::transform).
    pub fn transform_async<F>(&self, f: F) -> Schema
    where
        F: Fn(Value) -> BoxFuture<'static, Result<Value, BoxError>> + Send + Sync + 'static,
    {
        self.pipe(Schema::transformer_async(f))
    }

    /// Intersection with `other`.
    pub fn and(&self, other: impl Into<Schema>) -> Schema {
        Schema::intersection(self.clone(), other.into())
    }

    /// Union with `other`.
    pub fn or(&self, other: impl Into<Schema>) -> Schema {
        Schema::union([self.clone(), other.into()])
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Schema").field(&self.0).finish()
    }
}
