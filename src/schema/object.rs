//! Object and interface kinds.
//!
//! Both validate a plain object against a shape. Fields run independently
//! and their issues are accumulated under the field name; unknown keys are
//! handled by the catchall (stripped when there is none, rejected when it is
//! `never`). [`ObjectSchema`] adds the shape edits (`pick`, `omit`,
//! `extend`, `partial`, ...), each of which yields a fresh node without the
//! original's checks.

use std::ops::Deref;

use indexmap::IndexMap;

use super::kind::{Def, Definition, Kind, ObjectDef};
use super::node::Node;
use super::Schema;
use crate::error::{IssueKind, SchemaFault};
use crate::path::PathSegment;
use crate::validation::{ParseContext, ParsePayload, Step};
use crate::value::Value;

pub(super) fn parse<'a>(
    node: &'a Node,
    def: &'a ObjectDef,
    mut payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    let input = match std::mem::take(&mut payload.value) {
        Value::Object(map) => map,
        other => {
            let issue = node.invalid_type("object", other.clone());
            payload.value = other;
            payload.push(issue);
            return Step::ok(payload);
        }
    };

    let mut steps = Vec::with_capacity(input.len().max(def.shape.len()));
    for (key, field) in &def.shape {
        let value = input.get(key).cloned().unwrap_or_default();
        steps.push(field.node().run(ParsePayload::new(value), ctx));
    }

    let extra: Vec<String> = input
        .keys()
        .filter(|k| !def.shape.contains_key(k.as_str()))
        .cloned()
        .collect();
    let strict = def
        .catchall
        .as_ref()
        .is_some_and(|c| c.kind() == Kind::Never);
    let catchall = def.catchall.as_ref().filter(|_| !strict);
    if let Some(catchall) = catchall {
        for key in &extra {
            let value = input.get(key).cloned().unwrap_or_default();
            steps.push(catchall.node().run(ParsePayload::new(value), ctx));
        }
    }

    Step::join(steps, move |results| {
        let mut out = IndexMap::with_capacity(def.shape.len());
        let mut results = results.into_iter();

        for ((key, field), result) in def.shape.iter().zip(results.by_ref()) {
            let raw = input.get(key);
            let optional = def.is_marked_optional(key) || field.node().optionality().output;
            if result.has_issues() {
                if optional && raw.map_or(true, Value::is_undefined) {
                    if raw.is_some() {
                        out.insert(key.clone(), Value::Undefined);
                    }
                    continue;
                }
                payload.absorb(result.issues, Some(&PathSegment::field(key.as_str())));
            }
            if !result.value.is_undefined() {
                out.insert(key.clone(), result.value);
            } else if optional && raw.is_some() {
                out.insert(key.clone(), Value::Undefined);
            }
        }

        if catchall.is_some() {
            for (key, result) in extra.iter().zip(results) {
                payload.absorb(result.issues, Some(&PathSegment::field(key.as_str())));
                out.insert(key.clone(), result.value);
            }
        } else if strict && !extra.is_empty() {
            let issue = node.issue(
                IssueKind::UnrecognizedKeys { keys: extra },
                Value::Object(input.clone()),
            );
            payload.push(issue);
        }

        payload.value = Value::Object(out);
        Step::ok(payload)
    })
}

/// A key selection for `pick`, `omit`, `partial` and `required`.
///
/// Keys mapped to `false` are ignored.
#[derive(Debug, Clone, Default)]
pub struct Mask(IndexMap<String, bool>);

impl Mask {
    fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.iter().filter(|(_, on)| **on).map(|(k, _)| k)
    }

    fn contains(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }
}

impl<const N: usize> From<[&str; N]> for Mask {
    fn from(keys: [&str; N]) -> Self {
        Mask(keys.into_iter().map(|k| (k.to_string(), true)).collect())
    }
}

impl From<&[&str]> for Mask {
    fn from(keys: &[&str]) -> Self {
        Mask(keys.iter().map(|k| (k.to_string(), true)).collect())
    }
}

impl From<Vec<String>> for Mask {
    fn from(keys: Vec<String>) -> Self {
        Mask(keys.into_iter().map(|k| (k, true)).collect())
    }
}

impl<const N: usize> From<[(&str, bool); N]> for Mask {
    fn from(entries: [(&str, bool); N]) -> Self {
        Mask(entries.into_iter().map(|(k, on)| (k.to_string(), on)).collect())
    }
}

/// An object or interface schema with shape-editing operations.
///
/// Derefs to [`Schema`], so every refinement and modifier is available; those
/// return a plain `Schema`.
///
/// # Example
///
/// ```rust
/// use inquest::{Schema, Value};
///
/// let user = Schema::object([
///     ("name", Schema::string()),
///     ("email", Schema::email()),
///     ("age", Schema::number()),
/// ]);
/// let contact = user.pick(["name", "email"]).unwrap().strict();
///
/// let input = Value::object([("name", "Ada"), ("email", "ada@example.com")]);
/// assert!(contact.parse(&input).is_ok());
///
/// let input = Value::object([("name", "Ada"), ("email", "ada@example.com"), ("age", "x")]);
/// let err = contact.parse(&input).unwrap_err();
/// assert_eq!(err.issues().unwrap().first().code(), "unrecognized_keys");
/// ```
#[derive(Clone)]
pub struct ObjectSchema {
    def: ObjectDef,
    interface: bool,
    schema: Schema,
}

impl ObjectSchema {
    pub(super) fn new(def: ObjectDef, interface: bool) -> Self {
        let schema = Schema::leaf(Self::wrap(def.clone(), interface));
        Self {
            def,
            interface,
            schema,
        }
    }

    fn wrap(def: ObjectDef, interface: bool) -> Def {
        if interface {
            Def::Interface(def)
        } else {
            Def::Object(def)
        }
    }

    /// A new object with the edited shape. Checks are not carried over.
    fn edited(&self, op: &str, edit: impl FnOnce(&mut ObjectDef)) -> ObjectSchema {
        let mut def = self.def.clone();
        edit(&mut def);
        let definition = Definition {
            def: Self::wrap(def.clone(), self.interface),
            checks: Vec::new(),
            error: self.schema.node().definition().error.clone(),
        };
        tracing::trace!(op, keys = def.shape.len(), "object shape edited");
        Self {
            def,
            interface: self.interface,
            schema: Schema::leaf(definition),
        }
    }

    fn known(&self, mask: &Mask) -> Result<(), SchemaFault> {
        match mask.keys().find(|k| !self.def.shape.contains_key(k.as_str())) {
            Some(key) => Err(SchemaFault::UnknownMaskKey { key: key.clone() }),
            None => Ok(()),
        }
    }

    pub fn shape(&self) -> &IndexMap<String, Schema> {
        &self.def.shape
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn into_schema(self) -> Schema {
        self.schema
    }

    /// Keeps only the masked keys, in mask order.
    pub fn pick(&self, mask: impl Into<Mask>) -> Result<ObjectSchema, SchemaFault> {
        let mask = mask.into();
        self.known(&mask)?;
        Ok(self.edited("pick", |def| {
            def.shape = mask
                .keys()
                .filter_map(|k| def.shape.get(k).map(|s| (k.clone(), s.clone())))
                .collect();
            def.optional.retain(|k| mask.contains(k));
        }))
    }

    /// Drops the masked keys.
    pub fn omit(&self, mask: impl Into<Mask>) -> Result<ObjectSchema, SchemaFault> {
        let mask = mask.into();
        self.known(&mask)?;
        Ok(self.edited("omit", |def| {
            def.shape.retain(|k, _| !mask.contains(k));
            def.optional.retain(|k| !mask.contains(k));
        }))
    }

    /// Adds or overrides fields. Overridden keys keep their position.
    pub fn extend<K, I>(&self, fields: I) -> ObjectSchema
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        let fields: Vec<(String, Schema)> = fields.into_iter().map(|(k, s)| (k.into(), s)).collect();
        self.edited("extend", |def| {
            for (key, schema) in fields {
                def.optional.retain(|k| *k != key);
                def.shape.insert(key, schema);
            }
        })
    }

    /// Extends with another object's shape and adopts its catchall.
    pub fn merge(&self, other: &ObjectSchema) -> ObjectSchema {
        self.edited("merge", |def| {
            for (key, schema) in &other.def.shape {
                def.optional.retain(|k| k != key);
                def.shape.insert(key.clone(), schema.clone());
            }
            def.optional.extend(other.def.optional.iter().cloned());
            def.catchall = other.def.catchall.clone();
        })
    }

    /// Makes every field optional.
    pub fn partial(&self) -> ObjectSchema {
        self.edited("partial", |def| {
            for schema in def.shape.values_mut() {
                *schema = schema.optional();
            }
        })
    }

    /// Makes the masked fields optional.
    pub fn partial_mask(&self, mask: impl Into<Mask>) -> Result<ObjectSchema, SchemaFault> {
        let mask = mask.into();
        self.known(&mask)?;
        Ok(self.edited("partial", |def| {
            for (key, schema) in def.shape.iter_mut() {
                if mask.contains(key) {
                    *schema = schema.optional();
                }
            }
        }))
    }

    /// Makes every field required.
    pub fn required(&self) -> ObjectSchema {
        self.edited("required", |def| {
            for schema in def.shape.values_mut() {
                *schema = schema.nonoptional();
            }
            def.optional.clear();
        })
    }

    /// Makes the masked fields required.
    pub fn required_mask(&self, mask: impl Into<Mask>) -> Result<ObjectSchema, SchemaFault> {
        let mask = mask.into();
        self.known(&mask)?;
        Ok(self.edited("required", |def| {
            for (key, schema) in def.shape.iter_mut() {
                if mask.contains(key) {
                    *schema = schema.nonoptional();
                }
            }
            def.optional.retain(|k| !mask.contains(k));
        }))
    }

    /// Rejects unknown keys.
    pub fn strict(&self) -> ObjectSchema {
        self.edited("strict", |def| def.catchall = Some(Schema::never()))
    }

    /// Drops unknown keys from the output.
    pub fn strip(&self) -> ObjectSchema {
        self.edited("strip", |def| def.catchall = None)
    }

    /// Keeps unknown keys as they are.
    pub fn passthrough(&self) -> ObjectSchema {
        self.edited("passthrough", |def| def.catchall = Some(Schema::unknown()))
    }

    /// Validates unknown keys against `schema`.
    pub fn catchall(&self, schema: Schema) -> ObjectSchema {
        self.edited("catchall", |def| def.catchall = Some(schema))
    }

    /// An enum of the shape's keys.
    pub fn keyof(&self) -> Schema {
        Schema::enumeration(self.def.shape.keys().map(|k| Value::String(k.clone())))
    }
}

impl Deref for ObjectSchema {
    type Target = Schema;

    fn deref(&self) -> &Schema {
        &self.schema
    }
}

impl From<ObjectSchema> for Schema {
    fn from(object: ObjectSchema) -> Self {
        object.schema
    }
}

impl std::fmt::Debug for ObjectSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("keys", &self.def.shape.keys().collect::<Vec<_>>())
            .field("interface", &self.interface)
            .finish()
    }
}
