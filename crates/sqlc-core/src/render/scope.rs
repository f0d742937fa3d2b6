//! Qualifier resolution for field references.

use std::sync::Arc;

use crate::alias::AliasSource;
use crate::error::Result;
use crate::field::{Field, Owner};
use crate::statement::{SelectNode, Selectable};

enum Key<'n> {
    Table(&'n str),
    Subquery(&'n Arc<SelectNode>),
}

struct Entry<'n> {
    key: Key<'n>,
    alias: Option<String>,
}

/// The sources visible to one SELECT (or the target of a DML statement),
/// with the alias each carries in this rendering.
pub(super) struct Scope<'n> {
    entries: Vec<Entry<'n>>,
    target: Option<&'n str>,
}

impl<'n> Scope<'n> {
    /// Scope of a SELECT: its FROM source followed by each join target.
    ///
    /// Anonymous subqueries get a fresh alias here, before any text is
    /// written, so the projection can refer to them.
    pub(super) fn of_select(node: &'n SelectNode, aliases: &dyn AliasSource) -> Result<Self> {
        let mut entries = Vec::with_capacity(node.joins.len() + 1);
        for source in node.sources() {
            let entry = match source {
                Selectable::Table(t) => Entry {
                    key: Key::Table(t.name()),
                    alias: t.alias().map(str::to_owned),
                },
                Selectable::Subquery(q) => Entry {
                    key: Key::Subquery(&q.node),
                    alias: match q.alias() {
                        Some(alias) => Some(alias.to_owned()),
                        None => Some(aliases.next_alias()?),
                    },
                },
            };
            entries.push(entry);
        }
        Ok(Self {
            entries,
            target: None,
        })
    }

    /// Scope of an UPDATE or DELETE: fields of `table` are qualified by
    /// its bare name.
    pub(super) const fn of_target(table: &'n str) -> Self {
        Self {
            entries: Vec::new(),
            target: Some(table),
        }
    }

    /// Alias of the `index`-th source (0 is the FROM source).
    pub(super) fn alias_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).and_then(|e| e.alias.as_deref())
    }

    /// Resolves the qualifier written before `field`.
    ///
    /// In order: the alias the owning source carries in this query, the
    /// field's own alias, the owner's default, nothing.
    pub(super) fn qualifier<'a>(&'a self, field: &'a Field) -> Option<&'a str> {
        let Some(owner) = field.owner() else {
            return field.alias();
        };
        match owner {
            Owner::Table(t) => {
                if self.target == Some(t.name()) {
                    return Some(t.name());
                }
                t.alias()
                    .or_else(|| self.table_alias(t.name()))
                    .or_else(|| field.alias())
                    .or(Some(t.name()))
            }
            Owner::Subquery(q) => self
                .entries
                .iter()
                .find(|e| matches!(e.key, Key::Subquery(node) if q.points_to(node)))
                .and_then(|e| e.alias.as_deref())
                .or_else(|| field.alias())
                .or_else(|| q.alias()),
        }
    }

    fn table_alias(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| matches!(e.key, Key::Table(n) if n == name))
            .and_then(|e| e.alias.as_deref())
    }
}
