//! Unique aliases for anonymous subqueries.
//!
//! A subquery used as a source without an explicit alias is named by an
//! [`AliasSource`] each time it is rendered. The process-wide
//! [`AliasGenerator::global`] never reissues a value. Tests that need
//! stable output inject their own generator through
//! [`Renderer::with_aliases`](crate::render::Renderer::with_aliases).

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};

/// Issues fresh subquery aliases.
///
/// Implementations must be safe to call from concurrent renders and must
/// not block.
pub trait AliasSource: Send + Sync {
    /// Returns an alias not issued before by this source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AliasAllocation`] when the source is exhausted.
    fn next_alias(&self) -> Result<String>;
}

/// Lock-free counter producing `<prefix>_<n>`.
#[derive(Debug)]
pub struct AliasGenerator {
    prefix: Cow<'static, str>,
    next: AtomicU64,
}

static GLOBAL: AliasGenerator = AliasGenerator::new();

impl AliasGenerator {
    /// Creates a generator issuing `alias_1`, `alias_2`, ...
    #[must_use]
    pub const fn new() -> Self {
        Self {
            prefix: Cow::Borrowed("alias"),
            next: AtomicU64::new(1),
        }
    }

    /// Creates a generator issuing `<prefix>_<first>`, then counting up.
    #[must_use]
    pub fn starting_at(prefix: impl Into<Cow<'static, str>>, first: u64) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(first),
        }
    }

    /// Returns the process-wide generator.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns the prefix of issued aliases.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for AliasGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl AliasSource for AliasGenerator {
    fn next_alias(&self) -> Result<String> {
        let n = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
            .map_err(|_| {
                tracing::error!(prefix = %self.prefix, "alias counter exhausted");
                Error::AliasAllocation(format!("`{}` counter exhausted", self.prefix))
            })?;
        let alias = format!("{}_{n}", self.prefix);
        tracing::trace!(%alias, "allocated subquery alias");
        Ok(alias)
    }
}
