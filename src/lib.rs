//! # Inquest
//!
//! A runtime validation engine that reports ALL issues in one pass instead
//! of stopping at the first one.
//!
//! ## Overview
//!
//! Schemas are immutable graphs of validator nodes built with a fluent API.
//! Parsing an input walks the graph, threads a `{ value, issues }` payload
//! through every node and its refinement checks, and returns either the
//! (possibly transformed) output value or every issue found, each with the
//! path to the offending value and a resolved message. Results are exposed
//! as stillwater's `Validation` so they compose with applicative error
//! accumulation.
//!
//! Validation may be synchronous or asynchronous. Async refinements,
//! transforms and promise nodes make the graph asynchronous; the
//! synchronous entry points then fail with
//! [`SchemaFault::UnexpectedAsync`] rather than block.
//!
//! ## Core Types
//!
//! - [`Value`]: the dynamic input/output value model
//! - [`Schema`]: a shareable handle to a validator node, with builders
//! - [`Issue`]: one finalized problem with its [`JsonPath`] and message
//! - [`ValidationError`]: a non-empty collection of issues
//! - [`SchemaFault`]: errors in the schema itself or its callbacks
//!
//! ## Example
//!
//! ```rust
//! use inquest::{Schema, Value};
//!
//! let user = Schema::object([
//!     ("email", Schema::email()),
//!     ("age", Schema::number().int().gte(18.0)),
//!     ("tags", Schema::array(Schema::string()).max_length(3)),
//! ]);
//!
//! let input = Value::object([
//!     ("email", Value::from("not-an-email")),
//!     ("age", Value::from(12)),
//!     ("tags", Value::Array(vec![Value::from("a")])),
//! ]);
//!
//! let err = user.parse(&input).unwrap_err();
//! let issues = err.issues().unwrap();
//! assert_eq!(issues.len(), 2);
//! assert_eq!(issues.first().path.to_string(), "email");
//! ```

#[cfg(feature = "parallel")]
pub mod batch;
pub mod check;
pub mod config;
pub mod error;
pub mod path;
pub mod schema;
pub mod standard;
pub mod validation;
pub mod value;

pub use check::{Check, CheckParams, Refine, StringFormat, SuperRefine};
pub use config::GlobalConfig;
pub use error::{
    BoxError, ErrorMap, Issue, IssueKind, Origin, ParseError, RawIssue, SchemaFault,
    ValidationError,
};
pub use path::{JsonPath, PathSegment};
pub use schema::{Kind, Mask, ObjectSchema, Schema, TemplatePart};
pub use validation::{ParseConfig, ParseContext, ParsePayload, Step};
pub use value::Value;

/// Type alias for safe-parse results.
pub type ParseResult = stillwater::Validation<Value, ValidationError>;
