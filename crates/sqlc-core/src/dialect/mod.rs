//! SQL dialect support.
//!
//! The dialects differ only in placeholder style, identifier quoting and
//! RETURNING support. Everything else renders the same.

use std::borrow::Cow;
use std::fmt;

/// Keywords written quoted when used as identifiers.
const RESERVED_WORDS: &[&str] = &[
    "all", "alter", "and", "as", "asc", "between", "by", "case", "check", "column",
    "constraint", "create", "cross", "current_user", "default", "delete", "desc", "distinct",
    "drop", "else", "end", "exists", "false", "for", "foreign", "from", "full", "group",
    "having", "in", "index", "inner", "insert", "into", "is", "join", "key", "left", "like",
    "limit", "natural", "not", "null", "offset", "on", "or", "order", "outer", "primary",
    "references", "right", "select", "set", "table", "then", "to", "true", "union", "unique",
    "update", "user", "using", "values", "when", "where", "with",
];

/// Target database dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// SQLite: `?` placeholders, `"` quoting.
    #[default]
    Sqlite,
    /// MySQL: `?` placeholders, `` ` `` quoting, no RETURNING.
    MySql,
    /// PostgreSQL: `$n` placeholders, `"` quoting.
    Postgres,
}

impl Dialect {
    /// Returns the driver name of the dialect.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite3",
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
        }
    }

    /// Returns the identifier quote character.
    #[must_use]
    pub const fn identifier_quote(self) -> char {
        match self {
            Self::MySql => '`',
            Self::Sqlite | Self::Postgres => '"',
        }
    }

    /// Returns the placeholder for the `n`-th parameter (1-based).
    #[must_use]
    pub fn placeholder(self, n: usize) -> Cow<'static, str> {
        match self {
            Self::Postgres => Cow::Owned(format!("${n}")),
            Self::Sqlite | Self::MySql => Cow::Borrowed("?"),
        }
    }

    /// Returns whether INSERT ... RETURNING is supported.
    #[must_use]
    pub const fn supports_returning(self) -> bool {
        !matches!(self, Self::MySql)
    }

    /// Quotes an identifier if it is a reserved word or not a plain
    /// identifier.
    ///
    /// ```rust
    /// use sqlc_core::Dialect;
    ///
    /// assert_eq!(Dialect::Sqlite.quote_identifier("books"), "books");
    /// assert_eq!(Dialect::Sqlite.quote_identifier("order"), "\"order\"");
    /// assert_eq!(Dialect::MySql.quote_identifier("Order"), "`Order`");
    /// assert_eq!(Dialect::MySql.quote_identifier("first name"), "`first name`");
    /// assert_eq!(Dialect::Postgres.quote_identifier("a\"b"), "\"a\"\"b\"");
    /// ```
    #[must_use]
    pub fn quote_identifier(self, name: &str) -> Cow<'_, str> {
        if is_plain_identifier(name) && !is_reserved(name) {
            return Cow::Borrowed(name);
        }
        let quote = self.identifier_quote();
        let escaped = name.replace(quote, &format!("{quote}{quote}"));
        Cow::Owned(format!("{quote}{escaped}{quote}"))
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_reserved(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
