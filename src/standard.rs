//! A minimal validation interface for interoperating with other libraries.
//!
//! [`Schema::validate_standard`] tries a synchronous pass first and only
//! upgrades to a deferred result when the graph turns out to need async
//! work.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use stillwater::Validation;

use crate::error::{Issue, SchemaFault, ValidationError};
use crate::schema::Schema;
use crate::value::Value;

/// `{ value }` or `{ issues }`.
#[derive(Debug, Clone, PartialEq)]
pub enum StandardOutcome {
    Success { value: Value },
    Failure { issues: Vec<Issue> },
}

impl StandardOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StandardOutcome::Success { .. })
    }
}

impl From<Validation<Value, ValidationError>> for StandardOutcome {
    fn from(validation: Validation<Value, ValidationError>) -> Self {
        match validation {
            Validation::Success(value) => StandardOutcome::Success { value },
            Validation::Failure(error) => StandardOutcome::Failure {
                issues: error.into_vec(),
            },
        }
    }
}

pub enum StandardResult {
    Ready(Result<StandardOutcome, SchemaFault>),
    Pending(BoxFuture<'static, Result<StandardOutcome, SchemaFault>>),
}

impl StandardResult {
    pub fn is_ready(&self) -> bool {
        matches!(self, StandardResult::Ready(_))
    }

    pub async fn resolve(self) -> Result<StandardOutcome, SchemaFault> {
        match self {
            StandardResult::Ready(result) => result,
            StandardResult::Pending(future) => future.await,
        }
    }
}

impl std::fmt::Debug for StandardResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StandardResult::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            StandardResult::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

impl Schema {
    /// Validates `input` through the interoperable interface.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::{Schema, Value};
    /// use inquest::standard::{StandardOutcome, StandardResult};
    ///
    /// match Schema::number().validate_standard(&Value::from(1)) {
    ///     StandardResult::Ready(Ok(outcome)) => assert!(outcome.is_success()),
    ///     other => panic!("unexpected {:?}", other),
    /// }
    /// ```
    pub fn validate_standard(&self, input: &Value) -> StandardResult {
        match self.safe_parse(input) {
            Ok(validation) => StandardResult::Ready(Ok(validation.into())),
            Err(SchemaFault::UnexpectedAsync) => {
                tracing::debug!(kind = %self.kind(), "standard validation deferred");
                let schema = self.clone();
                let input = input.clone();
                StandardResult::Pending(
                    async move { schema.safe_parse_async(&input).await.map(Into::into) }.boxed(),
                )
            }
            Err(fault) => StandardResult::Ready(Err(fault)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_graph_is_ready() {
        let result = Schema::string().validate_standard(&Value::from(1));
        match result {
            StandardResult::Ready(Ok(StandardOutcome::Failure { issues })) => {
                assert_eq!(issues.len(), 1)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_async_graph_is_deferred() {
        let schema = Schema::string().refine_async(|v| async move { v.as_str() == Some("ok") }.boxed());
        let result = schema.validate_standard(&Value::from("ok"));
        assert!(!result.is_ready());
        assert!(result.resolve().await.unwrap().is_success());
    }
}
