//! Parallel validation of many inputs against one shared graph.

use rayon::prelude::*;
use stillwater::Validation;

use crate::error::{SchemaFault, ValidationError};
use crate::schema::Schema;
use crate::value::Value;

/// Runs [`Schema::safe_parse`] over `inputs` on the rayon pool. Results come
/// back in input order.
///
/// # Example
///
/// ```rust
/// use inquest::{batch, Schema, Value};
///
/// let schema = Schema::number().positive();
/// let inputs = vec![Value::from(1), Value::from(-1), Value::from(2)];
///
/// let results = batch::safe_parse_many(&schema, &inputs);
/// let ok: Vec<bool> = results
///     .iter()
///     .map(|r| r.as_ref().map(|v| v.is_success()).unwrap_or(false))
///     .collect();
/// assert_eq!(ok, vec![true, false, true]);
/// ```
pub fn safe_parse_many(
    schema: &Schema,
    inputs: &[Value],
) -> Vec<Result<Validation<Value, ValidationError>, SchemaFault>> {
    tracing::debug!(inputs = inputs.len(), kind = %schema.kind(), "batch parse");
    inputs
        .par_iter()
        .map(|input| schema.safe_parse(input))
        .collect()
}
