//! Statement rendering.
//!
//! The renderer walks a [`Statement`] once, writing SQL text and pushing
//! each bound value as its placeholder is written. The i-th placeholder
//! in the text is therefore always the i-th entry of
//! [`Rendered::params`], nested subqueries included.
//!
//! Values are never inlined. Identifiers are written bare unless they
//! need quoting in the target dialect.

mod scope;

use std::collections::HashSet;

use self::scope::Scope;
use crate::alias::{AliasGenerator, AliasSource};
use crate::condition::{Bound, Condition, JoinCondition, Predicate};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::field::Field;
use crate::statement::{
    Assignment, DeleteNode, InsertNode, Order, SelectNode, Selectable, Statement, UpdateNode,
};
use crate::value::SqlValue;

/// SQL text with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    sql: String,
    params: Vec<SqlValue>,
}

impl Rendered {
    /// Returns the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the parameters in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Returns the parameters written as SQL literals, comma separated.
    ///
    /// Meant for logs. The statement itself never carries inlined values.
    #[must_use]
    pub fn params_inline(&self) -> String {
        self.params
            .iter()
            .map(SqlValue::to_sql_inline)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Splits into text and parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }
}

impl From<Rendered> for (String, Vec<SqlValue>) {
    fn from(rendered: Rendered) -> Self {
        rendered.into_parts()
    }
}

/// Renders statements for one dialect.
///
/// ```rust
/// use sqlc_core::alias::AliasGenerator;
/// use sqlc_core::render::Renderer;
/// use sqlc_core::{select_all, Dialect, Table};
///
/// let books = Table::new("books");
/// let inner = select_all().from(&books).into_subquery();
/// let outer = select_all().from(&inner).into_statement();
///
/// let aliases = AliasGenerator::starting_at("q", 1);
/// let rendered = Renderer::new(Dialect::Postgres)
///     .with_aliases(&aliases)
///     .render(&outer)
///     .unwrap();
/// assert_eq!(rendered.sql(), "SELECT * FROM (SELECT * FROM books) AS q_1");
/// ```
#[derive(Clone, Copy)]
pub struct Renderer<'a> {
    dialect: Dialect,
    aliases: &'a dyn AliasSource,
}

impl Renderer<'static> {
    /// Creates a renderer that names subqueries from
    /// [`AliasGenerator::global`].
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            aliases: AliasGenerator::global(),
        }
    }
}

impl<'a> Renderer<'a> {
    /// Uses `aliases` to name anonymous subqueries.
    #[must_use]
    pub fn with_aliases<'b>(self, aliases: &'b dyn AliasSource) -> Renderer<'b> {
        Renderer {
            dialect: self.dialect,
            aliases,
        }
    }

    /// Returns the target dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Renders any statement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AliasAllocation`](crate::Error::AliasAllocation)
    /// if an anonymous subquery cannot be named.
    pub fn render(&self, statement: &Statement) -> Result<Rendered> {
        match statement {
            Statement::Select(node) => self.render_select(node),
            Statement::Insert(node) => Ok(self.render_insert(node)),
            Statement::Update(node) => Ok(self.render_update(node)),
            Statement::Delete(node) => Ok(self.render_delete(node)),
        }
    }

    /// Renders a SELECT.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AliasAllocation`](crate::Error::AliasAllocation)
    /// if an anonymous subquery cannot be named.
    pub fn render_select(&self, node: &SelectNode) -> Result<Rendered> {
        let mut w = self.writer();
        w.select(node, false)?;
        Ok(w.finish())
    }

    /// Renders an INSERT.
    #[must_use]
    pub fn render_insert(&self, node: &InsertNode) -> Rendered {
        let mut w = self.writer();
        w.insert(node);
        w.finish()
    }

    /// Renders an UPDATE.
    #[must_use]
    pub fn render_update(&self, node: &UpdateNode) -> Rendered {
        let mut w = self.writer();
        w.update(node);
        w.finish()
    }

    /// Renders a DELETE.
    #[must_use]
    pub fn render_delete(&self, node: &DeleteNode) -> Rendered {
        let mut w = self.writer();
        w.delete(node);
        w.finish()
    }

    fn writer(&self) -> Writer<'a> {
        Writer {
            dialect: self.dialect,
            aliases: self.aliases,
            sql: String::with_capacity(64),
            params: Vec::new(),
        }
    }
}

impl std::fmt::Debug for Renderer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

/// Renders `statement` with the process-wide alias generator.
///
/// ```rust
/// use sqlc_core::field::Int;
/// use sqlc_core::value::SqlValue;
/// use sqlc_core::{render, select_all, Dialect, Table};
///
/// let t = Table::new("T");
/// let id = t.column::<Int>("id").unwrap();
/// let stmt = select_all().from(&t).where_clause([id.eq(3)]).into_statement();
///
/// let (sql, params) = render(&stmt, Dialect::Sqlite).unwrap().into_parts();
/// assert_eq!(sql, "SELECT * FROM T WHERE T.id = ?");
/// assert_eq!(params, [SqlValue::Int(3)]);
/// ```
///
/// # Errors
///
/// Returns [`Error::AliasAllocation`](crate::Error::AliasAllocation) if an
/// anonymous subquery cannot be named.
pub fn render(statement: &Statement, dialect: Dialect) -> Result<Rendered> {
    Renderer::new(dialect).render(statement)
}

struct Writer<'a> {
    dialect: Dialect,
    aliases: &'a dyn AliasSource,
    sql: String,
    params: Vec<SqlValue>,
}

impl Writer<'_> {
    fn finish(self) -> Rendered {
        let rendered = Rendered {
            sql: self.sql,
            params: self.params,
        };
        tracing::trace!(
            dialect = %self.dialect,
            sql = %rendered.sql,
            params = %rendered.params_inline(),
            "rendered statement"
        );
        rendered
    }

    fn push(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    fn ident(&mut self, name: &str) {
        let quoted = self.dialect.quote_identifier(name);
        self.sql.push_str(&quoted);
    }

    fn operator(&mut self, predicate: Predicate) {
        self.push(" ");
        self.push(predicate.as_sql());
        self.push(" ");
    }

    fn bind(&mut self, value: &SqlValue) {
        self.params.push(value.clone());
        let placeholder = self.dialect.placeholder(self.params.len());
        self.sql.push_str(&placeholder);
    }

    fn field(&mut self, scope: &Scope<'_>, field: &Field) {
        if let Some(function) = field.as_function() {
            self.push(function.name());
            self.push("(");
            self.field(scope, function.child());
            for arg in function.args() {
                self.push(", ");
                self.bind(arg);
            }
            self.push(")");
            return;
        }
        if let Some(qualifier) = scope.qualifier(field) {
            self.ident(qualifier);
            self.push(".");
        }
        self.ident(field.name());
    }

    fn field_list<'f>(&mut self, scope: &Scope<'_>, fields: impl IntoIterator<Item = &'f Field>) {
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.field(scope, field);
        }
    }

    fn condition(&mut self, scope: &Scope<'_>, condition: &Condition) {
        self.field(scope, condition.field());
        self.operator(condition.predicate());
        match condition.bound() {
            Bound::One(value) => self.bind(value),
            Bound::Many(values) => {
                self.push("(");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.bind(value);
                }
                self.push(")");
            }
        }
    }

    fn where_clause(&mut self, scope: &Scope<'_>, conditions: &[Condition]) {
        for (i, condition) in conditions.iter().enumerate() {
            self.push(if i == 0 { " WHERE " } else { " AND " });
            self.condition(scope, condition);
        }
    }

    fn join_condition(&mut self, scope: &Scope<'_>, condition: &JoinCondition) {
        debug_assert_ne!(condition.predicate(), Predicate::In);
        self.field(scope, condition.lhs());
        self.operator(condition.predicate());
        self.field(scope, condition.rhs());
    }

    fn source(&mut self, source: &Selectable, alias: Option<&str>) -> Result<()> {
        match source {
            Selectable::Table(t) => self.ident(t.name()),
            Selectable::Subquery(q) => {
                self.push("(");
                self.select(&q.node, true)?;
                self.push(")");
            }
        }
        if let Some(alias) = alias {
            self.push(" AS ");
            self.ident(alias);
        }
        Ok(())
    }

    fn select(&mut self, node: &SelectNode, nested: bool) -> Result<()> {
        if nested {
            check_labels(&node.projection)?;
        }
        let scope = Scope::of_select(node, self.aliases)?;

        self.push("SELECT ");
        if node.count {
            self.push("COUNT(*)");
        } else if node.projection.is_empty() {
            self.push("*");
        } else {
            for (i, field) in node.projection.iter().enumerate() {
                if i > 0 {
                    self.push(", ");
                }
                self.field(&scope, field);
                // Enclosing queries refer to derived columns by label.
                if nested && field.as_function().is_some() {
                    self.push(" AS ");
                    self.ident(field.name());
                }
            }
        }

        self.push(" FROM ");
        self.source(&node.source, scope.alias_at(0))?;

        for (i, join) in node.joins.iter().enumerate() {
            self.push(" ");
            self.push(join.kind.as_sql());
            self.push(" ");
            self.source(&join.target, scope.alias_at(i + 1))?;
            let parenthesize = join.conditions.len() > 1;
            for (n, condition) in join.conditions.iter().enumerate() {
                self.push(match (n, parenthesize) {
                    (0, true) => " ON (",
                    (0, false) => " ON ",
                    _ => " AND ",
                });
                self.join_condition(&scope, condition);
            }
            if parenthesize {
                self.push(")");
            }
        }

        self.where_clause(&scope, &node.conditions);

        if !node.groups.is_empty() {
            self.push(" GROUP BY ");
            self.field_list(&scope, &node.groups);
        }

        for (i, term) in node.ordering.iter().enumerate() {
            self.push(if i == 0 { " ORDER BY " } else { ", " });
            self.field(&scope, &term.field);
            if term.order == Order::Desc {
                self.push(" DESC");
            }
        }
        Ok(())
    }

    fn assignments(&mut self, bindings: &[Assignment]) {
        for (i, binding) in bindings.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.ident(binding.field.name());
            self.push(" = ");
            self.bind(&binding.value);
        }
    }

    fn insert(&mut self, node: &InsertNode) {
        self.push("INSERT INTO ");
        self.ident(node.table.name());
        if node.bindings.is_empty() {
            self.push(" DEFAULT VALUES");
        } else {
            self.push(" (");
            for (i, binding) in node.bindings.iter().enumerate() {
                if i > 0 {
                    self.push(", ");
                }
                self.ident(binding.field.name());
            }
            self.push(") VALUES (");
            for (i, binding) in node.bindings.iter().enumerate() {
                if i > 0 {
                    self.push(", ");
                }
                self.bind(&binding.value);
            }
            self.push(")");
        }
        if let Some(returning) = &node.returning {
            if self.dialect.supports_returning() {
                self.push(" RETURNING ");
                self.ident(returning.name());
            } else {
                tracing::warn!(
                    dialect = %self.dialect,
                    table = node.table.name(),
                    column = returning.name(),
                    "dialect has no RETURNING; clause omitted"
                );
            }
        }
    }

    fn update(&mut self, node: &UpdateNode) {
        let scope = Scope::of_target(node.table.name());
        self.push("UPDATE ");
        self.ident(node.table.name());
        self.push(" SET ");
        self.assignments(&node.bindings);
        self.where_clause(&scope, &node.conditions);
    }

    fn delete(&mut self, node: &DeleteNode) {
        let scope = Scope::of_target(node.table.name());
        self.push("DELETE FROM ");
        self.ident(node.table.name());
        self.where_clause(&scope, &node.conditions);
    }
}

/// Derived columns of a nested select are exposed by label, so two of
/// them may not share one.
fn check_labels(projection: &[Field]) -> Result<()> {
    let mut seen = HashSet::new();
    for field in projection.iter().filter(|f| f.as_function().is_some()) {
        if !seen.insert(field.name()) {
            return Err(Error::usage(format!(
                "derived column label `{}` is used twice in a nested select; \
                 rename one with `labelled`",
                field.name()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{func, FieldKind, Int, Text};
    use crate::schema::Table;
    use crate::statement::{Join, JoinKind, OrderTerm, Subquery};

    fn books() -> Table {
        Table::new("books")
            .with_column("id", FieldKind::Int)
            .with_column("title", FieldKind::Text)
    }

    #[test]
    fn test_postgres_numbers_placeholders_across_nesting() {
        let books = books();
        let id = books.column::<Int>("id").unwrap();
        let mut inner = SelectNode::new(Vec::new(), (&books).into(), false);
        inner.conditions.push(id.gt(1));
        inner.alias = Some(String::from("b"));
        let inner = Subquery::new(inner);
        let outer_id = inner.column::<Int>("id").unwrap();
        let mut outer = SelectNode::new(Vec::new(), inner.into(), false);
        outer.conditions.push(outer_id.lt(9));

        let rendered = Renderer::new(Dialect::Postgres)
            .render_select(&outer)
            .unwrap();
        assert_eq!(
            rendered.sql(),
            "SELECT * FROM (SELECT * FROM books WHERE books.id > $1) AS b WHERE b.id < $2"
        );
        assert_eq!(rendered.params(), &[SqlValue::Int(1), SqlValue::Int(9)]);
    }

    #[test]
    fn test_in_list_binds_one_placeholder_per_value() {
        let books = books();
        let title = books.column::<Text>("title").unwrap();
        let mut node = SelectNode::new(Vec::new(), (&books).into(), false);
        node.conditions.push(title.is_in(["a", "b", "c"]).unwrap());
        let (sql, params) = Renderer::new(Dialect::Sqlite)
            .render_select(&node)
            .unwrap()
            .into_parts();
        assert_eq!(sql, "SELECT * FROM books WHERE books.title IN (?, ?, ?)");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_single_join_condition_is_not_parenthesized() {
        let books = books();
        let authors = Table::new("authors");
        let mut node = SelectNode::new(Vec::new(), (&books).into(), false);
        node.joins.push(Join {
            target: (&authors).into(),
            kind: JoinKind::LeftOuter,
            conditions: vec![books
                .column::<Int>("author_id")
                .unwrap()
                .eq_col(&authors.column::<Int>("id").unwrap())],
        });
        node.ordering.push(OrderTerm {
            field: books.column::<Text>("title").unwrap().into_field(),
            order: Order::Desc,
        });
        let rendered = Renderer::new(Dialect::Sqlite).render_select(&node).unwrap();
        assert_eq!(
            rendered.sql(),
            "SELECT * FROM books LEFT OUTER JOIN authors ON books.author_id = authors.id \
             ORDER BY books.title DESC"
        );
    }

    #[test]
    fn test_mysql_drops_returning() {
        let books = books();
        let node = InsertNode {
            table: books.clone(),
            bindings: vec![Assignment {
                field: books.column::<Text>("title").unwrap().into_field(),
                value: SqlValue::Text(String::from("Dune")),
            }],
            returning: Some(books.column::<Int>("id").unwrap().into_field()),
        };
        let mysql = Renderer::new(Dialect::MySql).render_insert(&node);
        assert_eq!(mysql.sql(), "INSERT INTO books (title) VALUES (?)");
        let pg = Renderer::new(Dialect::Postgres).render_insert(&node);
        assert_eq!(pg.sql(), "INSERT INTO books (title) VALUES ($1) RETURNING id");
    }

    #[test]
    fn test_dml_where_uses_table_name_even_for_aliased_columns() {
        let books = books();
        let b = books.aliased("b");
        let node = DeleteNode {
            table: books,
            conditions: vec![b.column::<Int>("id").unwrap().eq(4)],
        };
        let rendered = Renderer::new(Dialect::Sqlite).render_delete(&node);
        assert_eq!(rendered.sql(), "DELETE FROM books WHERE books.id = ?");
        assert!(matches!(
            node.conditions[0].bound(),
            Bound::One(SqlValue::Int(4))
        ));
    }

    #[test]
    fn test_nested_derived_columns_need_distinct_labels() {
        let books = books();
        let id = books.column::<Int>("id").unwrap();
        let title = books.column::<Text>("title").unwrap();
        let clashing = Subquery::new(SelectNode::new(
            vec![func::count(&id).into_field(), func::count(&title).into_field()],
            (&books).into(),
            false,
        ));
        let outer = SelectNode::new(Vec::new(), clashing.into(), false);
        let err = Renderer::new(Dialect::Sqlite).render_select(&outer).unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("`count`"));

        let labelled = Subquery::new(SelectNode::new(
            vec![
                func::count(&id).into_field(),
                func::count(&title).labelled("titles").into_field(),
            ],
            (&books).into(),
            false,
        ));
        assert!(labelled.field("titles").is_some());
        let outer = SelectNode::new(Vec::new(), labelled.into(), false);
        let rendered = Renderer::new(Dialect::Sqlite).render_select(&outer).unwrap();
        assert!(rendered.sql().starts_with(
            "SELECT * FROM (SELECT COUNT(books.id) AS count, \
             COUNT(books.title) AS titles FROM books) AS "
        ));
    }

    #[test]
    fn test_params_are_inlined_for_logs() {
        let books = books();
        let title = books.column::<Text>("title").unwrap();
        let mut node = SelectNode::new(Vec::new(), (&books).into(), false);
        node.conditions.push(title.eq("O'Brien"));
        node.conditions.push(books.column::<Int>("id").unwrap().is_in([1, 2]).unwrap());
        let rendered = Renderer::new(Dialect::Sqlite).render_select(&node).unwrap();
        assert_eq!(rendered.params_inline(), "'O''Brien', 1, 2");
        assert!(!rendered.sql().contains("Brien"));
    }

    #[test]
    fn test_mysql_quotes_awkward_names_with_backticks() {
        let t = Table::new("order items");
        let node = SelectNode::new(Vec::new(), (&t).into(), true);
        let rendered = Renderer::new(Dialect::MySql).render_select(&node).unwrap();
        assert_eq!(rendered.sql(), "SELECT COUNT(*) FROM `order items`");
    }
}
