//! Error types for statement construction and rendering.

use std::fmt;

use crate::field::FieldKind;

/// Errors reported by the builder and the renderer.
///
/// None of these are retried inside the crate. Construction errors are
/// raised at the call that caused them, so a malformed statement never
/// reaches the renderer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A bound value disagrees with the declared kind of its field.
    #[error("type mismatch on `{field}`: expected {expected}, got {found}")]
    TypeMismatch {
        /// Name of the field the value was bound to.
        field: String,
        /// Kind the field was declared with.
        expected: FieldKind,
        /// Runtime type of the offending value.
        found: &'static str,
    },

    /// A builder stage was invoked in violation of the staged protocol.
    #[error("invalid usage: {0}")]
    Usage(String),

    /// The alias generator could not issue a fresh alias.
    #[error("could not allocate a subquery alias: {0}")]
    AliasAllocation(String),
}

impl Error {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Returns true for [`Error::TypeMismatch`].
    #[must_use]
    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Returns true for [`Error::Usage`].
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

/// Result type for builder and renderer operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A failed builder transition.
///
/// Builder stages are consumed by their transitions. When a transition
/// fails, the stage is handed back untouched so the caller can continue
/// with a corrected call.
///
/// ```rust
/// use sqlc_core::{insert_into, Dialect, Table};
/// use sqlc_core::field::Int;
///
/// let books = Table::new("books");
/// let id = books.column::<Int>("id").unwrap();
///
/// let rejected = insert_into(&books).set_value(&id, "abc").unwrap_err();
/// assert!(rejected.error().is_type_mismatch());
///
/// let insert = rejected.into_inner().set(&id, 1).unwrap();
/// let (sql, _) = insert.render(Dialect::Sqlite).into_parts();
/// assert_eq!(sql, "INSERT INTO books (id) VALUES (?)");
/// ```
pub struct Rejected<B> {
    error: Error,
    builder: B,
}

impl<B> Rejected<B> {
    pub(crate) fn new(error: Error, builder: B) -> Self {
        tracing::debug!(%error, "builder step rejected");
        Self { error, builder }
    }

    /// Returns the reason the step was rejected.
    #[must_use]
    pub const fn error(&self) -> &Error {
        &self.error
    }

    /// Returns the builder as it was before the rejected call.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.builder
    }

    /// Discards the builder and keeps the error.
    #[must_use]
    pub fn into_error(self) -> Error {
        self.error
    }
}

impl<B> fmt::Debug for Rejected<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<B> fmt::Display for Rejected<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<B> std::error::Error for Rejected<B> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl<B> From<Rejected<B>> for Error {
    fn from(rejected: Rejected<B>) -> Self {
        rejected.error
    }
}
