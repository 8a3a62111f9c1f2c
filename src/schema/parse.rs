//! Top-level entry points.
//!
//! The throwing-style variants (`parse*`) return the validated value or a
//! [`ParseError`]. The safe variants return a stillwater [`Validation`] and
//! only use `Err` for faults, which no input can cause on a well-formed
//! graph.

use stillwater::Validation;

use super::Schema;
use crate::error::{ParseError, SchemaFault, ValidationError};
use crate::validation::{Mode, ParseConfig, ParseContext, ParsePayload, Step};
use crate::value::Value;

impl Schema {
    /// Runs the node's full contract (own validation, then checks) on a
    /// payload.
    pub fn run<'a>(&'a self, payload: ParsePayload, ctx: &'a ParseContext) -> Step<'a> {
        self.node().run(payload, ctx)
    }

    /// Runs only the node's own validation, skipping attached checks.
    pub fn parse_node<'a>(&'a self, payload: ParsePayload, ctx: &'a ParseContext) -> Step<'a> {
        self.node().parse(payload, ctx)
    }

    /// Validates `input` synchronously.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    ///
    /// let age = Schema::number().int().nonnegative();
    ///
    /// assert_eq!(age.parse(&Value::from(42)).unwrap(), Value::from(42));
    /// assert!(age.parse(&Value::from(-1)).is_err());
    /// ```
    pub fn parse(&self, input: &Value) -> Result<Value, ParseError> {
        self.parse_with(input, &ParseConfig::default())
    }

    pub fn parse_with(&self, input: &Value, config: &ParseConfig) -> Result<Value, ParseError> {
        match self.safe_parse_with(input, config)? {
            Validation::Success(value) => Ok(value),
            Validation::Failure(error) => Err(ParseError::Invalid(error)),
        }
    }

    /// Validates `input` synchronously, reporting issues as a failed
    /// [`Validation`].
    ///
    /// Fails with [`SchemaFault::UnexpectedAsync`] when the graph needs to
    /// wait on an async refinement, transform or promise node.
    pub fn safe_parse(&self, input: &Value) -> Result<Validation<Value, ValidationError>, SchemaFault> {
        self.safe_parse_with(input, &ParseConfig::default())
    }

    pub fn safe_parse_with(
        &self,
        input: &Value,
        config: &ParseConfig,
    ) -> Result<Validation<Value, ValidationError>, SchemaFault> {
        let ctx = ParseContext::new(Mode::Sync, config);
        let result = match self.node().run(ParsePayload::new(input.clone()), &ctx) {
            Step::Ready(parsed) => Ok(conclude(parsed?, &ctx)),
            Step::Pending(_) => {
                tracing::warn!(kind = %self.kind(), "synchronous parse produced a pending result");
                Err(SchemaFault::UnexpectedAsync)
            }
        };
        result
    }

    pub async fn parse_async(&self, input: &Value) -> Result<Value, ParseError> {
        match self.safe_parse_async(input).await? {
            Validation::Success(value) => Ok(value),
            Validation::Failure(error) => Err(ParseError::Invalid(error)),
        }
    }

    pub async fn safe_parse_async(
        &self,
        input: &Value,
    ) -> Result<Validation<Value, ValidationError>, SchemaFault> {
        self.safe_parse_async_with(input, &ParseConfig::default())
            .await
    }

    pub async fn safe_parse_async_with(
        &self,
        input: &Value,
        config: &ParseConfig,
    ) -> Result<Validation<Value, ValidationError>, SchemaFault> {
        let ctx = ParseContext::new(Mode::Async, config);
        tracing::debug!(kind = %self.kind(), "async parse started");
        let payload = self
            .node()
            .run(ParsePayload::new(input.clone()), &ctx)
            .resolve()
            .await?;
        Ok(conclude(payload, &ctx))
    }
}

/// Finalizes the issues of a completed pass.
fn conclude(payload: ParsePayload, ctx: &ParseContext) -> Validation<Value, ValidationError> {
    match ValidationError::from_vec(ctx.finalize(payload.issues)) {
        None => Validation::Success(payload.value),
        Some(error) => {
            tracing::debug!(issues = error.len(), "validation failed");
            Validation::Failure(error)
        }
    }
}
