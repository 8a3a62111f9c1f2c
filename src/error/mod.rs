//! Issue and error types.
//!
//! Validation problems with the *data* are issues: they accumulate on the
//! parse payload and are only turned into an error by the throwing entry
//! points. Problems with the *schema* itself, or with how it is executed, are
//! [`SchemaFault`]s and abort validation immediately.

mod fault;
mod issue;
mod validation_error;

pub use fault::{BoxError, ParseError, SchemaFault};
pub use issue::{ErrorMap, Issue, IssueKind, Origin, RawIssue};
pub use validation_error::ValidationError;
