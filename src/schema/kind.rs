//! Node definitions: the closed set of kinds and their configuration.

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use indexmap::IndexMap;

use super::Schema;
use crate::check::{Check, StringFormat};
use crate::error::{BoxError, ErrorMap, Issue, SchemaFault};
use crate::value::Value;

/// The kind tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Number,
    Boolean,
    BigInt,
    Date,
    Null,
    Undefined,
    Void,
    Any,
    Unknown,
    Never,
    NaN,
    Literal,
    Enum,
    TemplateLiteral,
    Object,
    Interface,
    Array,
    Tuple,
    Record,
    Map,
    Set,
    Union,
    DiscriminatedUnion,
    Intersection,
    Pipe,
    Transform,
    Optional,
    Nullable,
    Default,
    Prefault,
    NonOptional,
    Catch,
    Readonly,
    Success,
    Promise,
    Lazy,
    Custom,
}

impl Kind {
    pub const ALL: [Kind; 38] = [
        Kind::String,
        Kind::Number,
        Kind::Boolean,
        Kind::BigInt,
        Kind::Date,
        Kind::Null,
        Kind::Undefined,
        Kind::Void,
        Kind::Any,
        Kind::Unknown,
        Kind::Never,
        Kind::NaN,
        Kind::Literal,
        Kind::Enum,
        Kind::TemplateLiteral,
        Kind::Object,
        Kind::Interface,
        Kind::Array,
        Kind::Tuple,
        Kind::Record,
        Kind::Map,
        Kind::Set,
        Kind::Union,
        Kind::DiscriminatedUnion,
        Kind::Intersection,
        Kind::Pipe,
        Kind::Transform,
        Kind::Optional,
        Kind::Nullable,
        Kind::Default,
        Kind::Prefault,
        Kind::NonOptional,
        Kind::Catch,
        Kind::Readonly,
        Kind::Success,
        Kind::Promise,
        Kind::Lazy,
        Kind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::BigInt => "bigint",
            Kind::Date => "date",
            Kind::Null => "null",
            Kind::Undefined => "undefined",
            Kind::Void => "void",
            Kind::Any => "any",
            Kind::Unknown => "unknown",
            Kind::Never => "never",
            Kind::NaN => "nan",
            Kind::Literal => "literal",
            Kind::Enum => "enum",
            Kind::TemplateLiteral => "template_literal",
            Kind::Object => "object",
            Kind::Interface => "interface",
            Kind::Array => "array",
            Kind::Tuple => "tuple",
            Kind::Record => "record",
            Kind::Map => "map",
            Kind::Set => "set",
            Kind::Union => "union",
            Kind::DiscriminatedUnion => "discriminated_union",
            Kind::Intersection => "intersection",
            Kind::Pipe => "pipe",
            Kind::Transform => "transform",
            Kind::Optional => "optional",
            Kind::Nullable => "nullable",
            Kind::Default => "default",
            Kind::Prefault => "prefault",
            Kind::NonOptional => "nonoptional",
            Kind::Catch => "catch",
            Kind::Readonly => "readonly",
            Kind::Success => "success",
            Kind::Promise => "promise",
            Kind::Lazy => "lazy",
            Kind::Custom => "custom",
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = SchemaFault;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| SchemaFault::UnknownKind {
                name: name.to_string(),
            })
    }
}

pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;
pub type CatchFn = Arc<dyn Fn(&CatchInput) -> Value + Send + Sync>;
pub type LazyFn = Arc<dyn Fn() -> Schema + Send + Sync>;
pub type CustomFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
pub type SyncTransformFn = Arc<dyn Fn(Value) -> Result<Value, BoxError> + Send + Sync>;
pub type AsyncTransformFn =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, BoxError>> + Send + Sync>;

/// What a catch callback sees when the inner node fails.
#[derive(Debug, Clone)]
pub struct CatchInput {
    pub input: Value,
    pub issues: Vec<Issue>,
}

#[derive(Clone)]
pub enum TransformFn {
    Sync(SyncTransformFn),
    Async(AsyncTransformFn),
}

/// One piece of a template literal.
#[derive(Clone)]
pub enum TemplatePart {
    Literal(Value),
    Schema(Schema),
}

impl From<&str> for TemplatePart {
    fn from(s: &str) -> Self {
        TemplatePart::Literal(Value::from(s))
    }
}

impl From<Schema> for TemplatePart {
    fn from(schema: Schema) -> Self {
        TemplatePart::Schema(schema)
    }
}

/// Shape of an object-like node, normalized.
#[derive(Clone, Default)]
pub struct ObjectDef {
    pub shape: IndexMap<String, Schema>,
    /// Keys that are optional regardless of their node, from a trailing `?`.
    pub optional: Vec<String>,
    /// `None` strips unknown keys.
    pub catchall: Option<Schema>,
}

impl ObjectDef {
    pub fn is_marked_optional(&self, key: &str) -> bool {
        self.optional.iter().any(|k| k == key)
    }
}

/// Kind-specific configuration.
#[derive(Clone)]
pub enum Def {
    String {
        coerce: bool,
        format: Option<StringFormat>,
    },
    Number {
        coerce: bool,
    },
    Boolean {
        coerce: bool,
    },
    BigInt {
        coerce: bool,
    },
    Date {
        coerce: bool,
    },
    Null,
    Undefined,
    Void,
    Any,
    Unknown,
    Never,
    NaN,
    Literal {
        values: Vec<Value>,
    },
    Enum {
        values: Vec<Value>,
    },
    TemplateLiteral {
        parts: Vec<TemplatePart>,
    },
    Object(ObjectDef),
    Interface(ObjectDef),
    Array {
        element: Schema,
    },
    Tuple {
        items: Vec<Schema>,
        rest: Option<Schema>,
    },
    Record {
        key: Schema,
        value: Schema,
    },
    Map {
        key: Schema,
        value: Schema,
    },
    Set {
        value: Schema,
    },
    Union {
        options: Vec<Schema>,
    },
    DiscriminatedUnion {
        options: Vec<Schema>,
        /// Try every option when routing finds zero or several matches.
        fallback: bool,
    },
    Intersection {
        left: Schema,
        right: Schema,
    },
    Pipe {
        input: Schema,
        output: Schema,
    },
    Transform {
        func: TransformFn,
    },
    Optional {
        inner: Schema,
    },
    Nullable {
        inner: Schema,
    },
    Default {
        inner: Schema,
        value: DefaultFn,
    },
    Prefault {
        inner: Schema,
        value: DefaultFn,
    },
    NonOptional {
        inner: Schema,
    },
    Catch {
        inner: Schema,
        value: CatchFn,
    },
    Readonly {
        inner: Schema,
    },
    Success {
        inner: Schema,
    },
    Promise {
        inner: Schema,
    },
    Lazy {
        getter: LazyFn,
    },
    Custom {
        predicate: CustomFn,
    },
}

impl Def {
    pub fn kind(&self) -> Kind {
        match self {
            Def::String { .. } => Kind::String,
            Def::Number { .. } => Kind::Number,
            Def::Boolean { .. } => Kind::Boolean,
            Def::BigInt { .. } => Kind::BigInt,
            Def::Date { .. } => Kind::Date,
            Def::Null => Kind::Null,
            Def::Undefined => Kind::Undefined,
            Def::Void => Kind::Void,
            Def::Any => Kind::Any,
            Def::Unknown => Kind::Unknown,
            Def::Never => Kind::Never,
            Def::NaN => Kind::NaN,
            Def::Literal { .. } => Kind::Literal,
            Def::Enum { .. } => Kind::Enum,
            Def::TemplateLiteral { .. } => Kind::TemplateLiteral,
            Def::Object(_) => Kind::Object,
            Def::Interface(_) => Kind::Interface,
            Def::Array { .. } => Kind::Array,
            Def::Tuple { .. } => Kind::Tuple,
            Def::Record { .. } => Kind::Record,
            Def::Map { .. } => Kind::Map,
            Def::Set { .. } => Kind::Set,
            Def::Union { .. } => Kind::Union,
            Def::DiscriminatedUnion { .. } => Kind::DiscriminatedUnion,
            Def::Intersection { .. } => Kind::Intersection,
            Def::Pipe { .. } => Kind::Pipe,
            Def::Transform { .. } => Kind::Transform,
            Def::Optional { .. } => Kind::Optional,
            Def::Nullable { .. } => Kind::Nullable,
            Def::Default { .. } => Kind::Default,
            Def::Prefault { .. } => Kind::Prefault,
            Def::NonOptional { .. } => Kind::NonOptional,
            Def::Catch { .. } => Kind::Catch,
            Def::Readonly { .. } => Kind::Readonly,
            Def::Success { .. } => Kind::Success,
            Def::Promise { .. } => Kind::Promise,
            Def::Lazy { .. } => Kind::Lazy,
            Def::Custom { .. } => Kind::Custom,
        }
    }

    /// The single wrapped node of a modifier kind.
    pub fn inner(&self) -> Option<&Schema> {
        match self {
            Def::Optional { inner }
            | Def::Nullable { inner }
            | Def::Default { inner, .. }
            | Def::Prefault { inner, .. }
            | Def::NonOptional { inner }
            | Def::Catch { inner, .. }
            | Def::Readonly { inner }
            | Def::Success { inner }
            | Def::Promise { inner } => Some(inner),
            _ => None,
        }
    }
}

/// Immutable configuration of a node.
#[derive(Clone)]
pub struct Definition {
    pub def: Def,
    pub checks: Vec<Arc<dyn Check>>,
    /// Resolver for messages of issues raised by the node itself.
    pub error: Option<ErrorMap>,
}

impl Definition {
    pub fn new(def: Def) -> Self {
        Self {
            def,
            checks: Vec::new(),
            error: None,
        }
    }

    pub fn kind(&self) -> Kind {
        self.def.kind()
    }
}

impl From<Def> for Definition {
    fn from(def: Def) -> Self {
        Definition::new(def)
    }
}
